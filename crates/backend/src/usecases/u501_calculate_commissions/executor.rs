use crate::domain::{a001_commission_rule, a003_shop_order, a004_commission};
use crate::shared::commission::{CommissionEngine, ProductMetadataSource, RuleSet};
use crate::shared::format::round_money;
use crate::shared::shopify::product_source;
use crate::system::auth::Actor;
use anyhow::Result;
use contracts::domain::a003_shop_order::aggregate::ShopOrder;
use contracts::domain::a004_commission::aggregate::CommissionRecord;
use contracts::enums::commission_status::CommissionStatus;
use contracts::usecases::common::{UseCaseError, UseCaseMetadata, UseCaseResult};
use contracts::usecases::u501_calculate_commissions::{
    CalculateCommissions, CalculateRequest, CalculateResponse, OrderOutcome, OutcomeKind,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Что сделать с начислением по заказу
#[derive(Debug, Clone, PartialEq)]
enum Plan {
    Create,
    Refresh,
    Unchanged,
    Skip(String),
}

/// Скорректированные и вышедшие из pending начисления не пересчитываются
fn plan(existing: Option<&CommissionRecord>, amount: Decimal) -> Plan {
    match existing {
        None => Plan::Create,
        Some(record) if record.is_adjusted() => {
            Plan::Skip("начисление скорректировано вручную".to_string())
        }
        Some(record) if record.status != CommissionStatus::Pending => {
            Plan::Skip(format!("начисление в статусе {}", record.status.code()))
        }
        Some(record) if record.amount == amount => Plan::Unchanged,
        Some(_) => Plan::Refresh,
    }
}

/// Pending-начисления других агентов по заказу: остались от прежнего назначения
fn stale_pending<'a>(
    records: &'a [CommissionRecord],
    agent_id: &str,
) -> impl Iterator<Item = &'a CommissionRecord> + 'a {
    let agent_id = agent_id.to_string();
    records
        .iter()
        .filter(move |r| r.agent_id != agent_id && r.status == CommissionStatus::Pending)
}

/// Executor для UseCase расчёта комиссий
pub struct CalculateExecutor {
    source: Arc<dyn ProductMetadataSource>,
}

impl CalculateExecutor {
    pub fn new() -> Self {
        Self {
            source: product_source(),
        }
    }

    /// Рассчитать начисления по заказам (последовательно, каждый заказ отдельно)
    pub async fn execute(&self, actor: &Actor, request: CalculateRequest) -> Result<CalculateResponse> {
        actor.require_admin()?;
        tracing::info!(
            "{} started by {} ({} order ids)",
            CalculateCommissions::full_name(),
            actor.user_id,
            request.order_ids.len()
        );

        let rules = a001_commission_rule::service::load_rule_set().await?;
        let mut response = CalculateResponse::default();

        let orders: Vec<(String, UseCaseResult<ShopOrder>)> = if request.order_ids.is_empty() {
            a003_shop_order::service::list_with_agent()
                .await?
                .into_iter()
                .map(|o| (o.to_string_id(), Ok(o)))
                .collect()
        } else {
            let mut loaded = Vec::with_capacity(request.order_ids.len());
            for raw_id in &request.order_ids {
                loaded.push((raw_id.clone(), load_order(raw_id).await));
            }
            loaded
        };

        for (order_id, order) in orders {
            let outcome = match order {
                Ok(order) => self.process_order(actor, &order, &rules).await,
                Err(e) => Err(e),
            };
            response.push(match outcome {
                Ok(outcome) => outcome,
                Err(e) => failed_outcome(order_id, e),
            });
        }

        tracing::info!(
            "{} finished: created={}, refreshed={}, unchanged={}, skipped={}, failed={}",
            CalculateCommissions::full_name(),
            response.created,
            response.refreshed,
            response.unchanged,
            response.skipped,
            response.failed
        );
        Ok(response)
    }

    async fn process_order(
        &self,
        actor: &Actor,
        order: &ShopOrder,
        rules: &RuleSet,
    ) -> UseCaseResult<OrderOutcome> {
        let order_id = order.to_string_id();
        let agent_id = order
            .header
            .agent_id
            .clone()
            .ok_or_else(|| UseCaseError::skipped("заказу не назначен агент"))?;

        let engine = CommissionEngine::new(rules, self.source.as_ref());
        let result = engine.aggregate(order, None).await;
        let amount = round_money(result.total_commission);

        let records = a004_commission::service::list_for_order(&order_id).await?;
        self.cancel_stale(actor, order, &records, &agent_id).await?;
        let existing = records.into_iter().find(|r| r.agent_id == agent_id);

        let outcome = match (plan(existing.as_ref(), amount), existing) {
            (Plan::Create, _) => {
                let mut record = CommissionRecord::new_pending(
                    order_id.clone(),
                    &order.header.order_name,
                    agent_id,
                    amount,
                );
                let id = a004_commission::service::save_new(&mut record).await?;
                tracing::info!(
                    "Commission {} created for order {}: {}",
                    record.base.code,
                    order.header.order_name,
                    amount
                );
                make_outcome(order_id, OutcomeKind::Created, Some(id.to_string()), Some(amount), None)
            }
            (Plan::Refresh, Some(mut record)) => {
                let previous = record.amount;
                record
                    .refresh_amount(amount)
                    .map_err(|e| UseCaseError::skipped(e.to_string()))?;
                a004_commission::service::save(&mut record).await?;
                tracing::info!(
                    "Commission {} refreshed for order {}: {} -> {}",
                    record.base.code,
                    order.header.order_name,
                    previous,
                    amount
                );
                make_outcome(
                    order_id,
                    OutcomeKind::Refreshed,
                    Some(record.to_string_id()),
                    Some(amount),
                    None,
                )
            }
            (Plan::Unchanged, Some(record)) => make_outcome(
                order_id,
                OutcomeKind::Unchanged,
                Some(record.to_string_id()),
                Some(amount),
                None,
            ),
            (Plan::Skip(reason), record) => make_outcome(
                order_id,
                OutcomeKind::Skipped,
                record.map(|r| r.to_string_id()),
                None,
                Some(reason),
            ),
            (_, None) => {
                return Err(UseCaseError::internal("commission record disappeared"));
            }
        };
        Ok(outcome)
    }
}

impl CalculateExecutor {
    /// Отменить pending-начисления прежних агентов после переназначения заказа
    async fn cancel_stale(
        &self,
        actor: &Actor,
        order: &ShopOrder,
        records: &[CommissionRecord],
        agent_id: &str,
    ) -> UseCaseResult<()> {
        for stale in stale_pending(records, agent_id) {
            let mut record = stale.clone();
            record
                .cancel(&actor.user_id, Some(REASSIGNED_REASON.to_string()))
                .map_err(|e| UseCaseError::internal(e.to_string()))?;
            a004_commission::service::save(&mut record).await?;
            tracing::info!(
                "Commission {} of agent {} cancelled: order {} reassigned to {}",
                record.base.code,
                record.agent_id,
                order.header.order_name,
                agent_id
            );
        }
        Ok(())
    }
}

const REASSIGNED_REASON: &str = "заказ переназначен другому агенту";

impl Default for CalculateExecutor {
    fn default() -> Self {
        Self::new()
    }
}

async fn load_order(raw_id: &str) -> UseCaseResult<ShopOrder> {
    let id = Uuid::parse_str(raw_id.trim())
        .map_err(|_| UseCaseError::invalid_input(format!("Некорректный ID заказа: '{}'", raw_id)))?;
    a003_shop_order::service::get_by_id(id)
        .await?
        .ok_or_else(|| UseCaseError::not_found(format!("Заказ {} не найден", raw_id)))
}

fn make_outcome(
    order_id: String,
    kind: OutcomeKind,
    commission_id: Option<String>,
    amount: Option<Decimal>,
    message: Option<String>,
) -> OrderOutcome {
    OrderOutcome {
        order_id,
        kind,
        commission_id,
        amount,
        message,
    }
}

fn failed_outcome(order_id: String, error: UseCaseError) -> OrderOutcome {
    if error.is_skip() {
        return make_outcome(order_id, OutcomeKind::Skipped, None, None, Some(error.message));
    }
    tracing::error!("Commission calculation failed for order {}: {}", order_id, error);
    make_outcome(order_id, OutcomeKind::Failed, None, None, Some(error.to_string()))
}
