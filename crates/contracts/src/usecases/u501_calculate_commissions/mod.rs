pub mod request;
pub mod response;

pub use request::CalculateRequest;
pub use response::{CalculateResponse, OrderOutcome, OutcomeKind};

use crate::usecases::common::UseCaseMetadata;

pub struct CalculateCommissions;

impl UseCaseMetadata for CalculateCommissions {
    const INDEX: &'static str = "u501";
    const NAME: &'static str = "calculate_commissions";
    const DISPLAY_NAME: &'static str = "Расчёт комиссий агентов";
    const DESCRIPTION: &'static str =
        "Расчёт начислений по заказам с назначенным агентом по активным правилам";
}
