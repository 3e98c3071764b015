use crate::domain::common::{AggregateId, AggregateRoot, BaseAggregate, EntityMetadata};
use crate::enums::commission_status::CommissionStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

crate::uuid_aggregate_id!(
    /// Уникальный идентификатор начисления комиссии
    CommissionId
);

/// Ошибка перехода статуса начисления
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommissionTransitionError {
    #[error("transition {from} -> {to} is not allowed")]
    InvalidTransition {
        from: CommissionStatus,
        to: CommissionStatus,
    },
    #[error("paid commission is immutable")]
    PaidIsImmutable,
    #[error("amount cannot be adjusted in status {0}")]
    AdjustmentNotAllowed(CommissionStatus),
    #[error("adjusted commission cannot be recalculated from rules")]
    AdjustedIsSticky,
    #[error("payment reference is required")]
    MissingPaymentReference,
    #[error("adjustment reason is required")]
    MissingAdjustmentReason,
    #[error("amount must not be negative")]
    NegativeAmount,
}

/// Начисление комиссии агенту по заказу
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommissionRecord {
    #[serde(flatten)]
    pub base: BaseAggregate<CommissionId>,

    /// Ссылка на заказ (a003_shop_order.id)
    pub order_id: String,
    /// Ссылка на агента (a002_agent.id)
    pub agent_id: String,

    pub amount: Decimal,
    pub status: CommissionStatus,

    pub adjusted_by: Option<String>,
    pub adjustment_reason: Option<String>,
    pub adjusted_at: Option<DateTime<Utc>>,

    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,

    pub paid_by: Option<String>,
    /// Ссылка на платёжный документ / чек
    pub payment_reference: Option<String>,
    pub payment_note: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,

    pub cancelled_by: Option<String>,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl CommissionRecord {
    /// Новое начисление в статусе pending с суммой, рассчитанной по правилам
    pub fn new_pending(order_id: String, order_code: &str, agent_id: String, amount: Decimal) -> Self {
        let base = BaseAggregate::with_generated_code(
            CommissionId::new_v4(),
            "COM",
            format!("Комиссия по заказу {}", order_code),
        );
        Self {
            base,
            order_id,
            agent_id,
            amount,
            status: CommissionStatus::Pending,
            adjusted_by: None,
            adjustment_reason: None,
            adjusted_at: None,
            approved_by: None,
            approved_at: None,
            paid_by: None,
            payment_reference: None,
            payment_note: None,
            paid_at: None,
            cancelled_by: None,
            cancellation_reason: None,
            cancelled_at: None,
        }
    }

    pub fn to_string_id(&self) -> String {
        self.base.id.as_string()
    }

    /// Сумма задана администратором вручную и не пересчитывается по правилам
    pub fn is_adjusted(&self) -> bool {
        self.adjusted_by.is_some()
    }

    fn transition(&mut self, to: CommissionStatus) -> Result<(), CommissionTransitionError> {
        if self.status == CommissionStatus::Paid {
            return Err(CommissionTransitionError::PaidIsImmutable);
        }
        if !self.status.can_transition_to(to) {
            return Err(CommissionTransitionError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// pending → approved, сумма не пересчитывается
    pub fn approve(&mut self, actor_id: &str) -> Result<(), CommissionTransitionError> {
        self.transition(CommissionStatus::Approved)?;
        self.approved_by = Some(actor_id.to_string());
        self.approved_at = Some(Utc::now());
        Ok(())
    }

    /// approved → paid, требуется ссылка на платёж
    pub fn pay(
        &mut self,
        actor_id: &str,
        payment_reference: &str,
        payment_note: Option<String>,
    ) -> Result<(), CommissionTransitionError> {
        if payment_reference.trim().is_empty() {
            return Err(CommissionTransitionError::MissingPaymentReference);
        }
        self.transition(CommissionStatus::Paid)?;
        self.paid_by = Some(actor_id.to_string());
        self.payment_reference = Some(payment_reference.trim().to_string());
        self.payment_note = payment_note.filter(|n| !n.trim().is_empty());
        self.paid_at = Some(Utc::now());
        Ok(())
    }

    /// pending | approved → cancelled
    pub fn cancel(
        &mut self,
        actor_id: &str,
        reason: Option<String>,
    ) -> Result<(), CommissionTransitionError> {
        self.transition(CommissionStatus::Cancelled)?;
        self.cancelled_by = Some(actor_id.to_string());
        self.cancellation_reason = reason.filter(|r| !r.trim().is_empty());
        self.cancelled_at = Some(Utc::now());
        Ok(())
    }

    /// Ручная корректировка суммы; статус не меняется
    pub fn adjust(
        &mut self,
        actor_id: &str,
        amount: Decimal,
        reason: &str,
    ) -> Result<(), CommissionTransitionError> {
        if self.status == CommissionStatus::Paid {
            return Err(CommissionTransitionError::PaidIsImmutable);
        }
        if !self.status.allows_adjustment() {
            return Err(CommissionTransitionError::AdjustmentNotAllowed(self.status));
        }
        if reason.trim().is_empty() {
            return Err(CommissionTransitionError::MissingAdjustmentReason);
        }
        if amount < Decimal::ZERO {
            return Err(CommissionTransitionError::NegativeAmount);
        }
        self.amount = amount;
        self.adjusted_by = Some(actor_id.to_string());
        self.adjustment_reason = Some(reason.trim().to_string());
        self.adjusted_at = Some(Utc::now());
        Ok(())
    }

    /// Обновить сумму по правилам: только pending и без ручной корректировки
    pub fn refresh_amount(&mut self, amount: Decimal) -> Result<bool, CommissionTransitionError> {
        if self.is_adjusted() {
            return Err(CommissionTransitionError::AdjustedIsSticky);
        }
        if self.status != CommissionStatus::Pending {
            return Err(CommissionTransitionError::InvalidTransition {
                from: self.status,
                to: CommissionStatus::Pending,
            });
        }
        if self.amount == amount {
            return Ok(false);
        }
        self.amount = amount;
        Ok(true)
    }

    /// Выплаченные начисления не удаляются
    pub fn ensure_deletable(&self) -> Result<(), CommissionTransitionError> {
        if self.status == CommissionStatus::Paid {
            return Err(CommissionTransitionError::PaidIsImmutable);
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
    }
}

impl AggregateRoot for CommissionRecord {
    type Id = CommissionId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a004"
    }

    fn collection_name() -> &'static str {
        "commission"
    }

    fn element_name() -> &'static str {
        "Начисление комиссии"
    }

    fn list_name() -> &'static str {
        "Начисления комиссий"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> CommissionRecord {
        CommissionRecord::new_pending("order-1".into(), "#1001", "agent-1".into(), Decimal::from(20))
    }

    #[test]
    fn test_happy_path() {
        let mut r = record();
        assert_eq!(r.status, CommissionStatus::Pending);
        assert!(r.base.code.starts_with("COM-"));

        r.approve("admin").unwrap();
        assert_eq!(r.status, CommissionStatus::Approved);
        assert_eq!(r.approved_by.as_deref(), Some("admin"));

        r.pay("admin", " RCPT-42 ", Some("bank transfer".into())).unwrap();
        assert_eq!(r.status, CommissionStatus::Paid);
        assert_eq!(r.payment_reference.as_deref(), Some("RCPT-42"));
        assert!(r.paid_at.is_some());
    }

    #[test]
    fn test_pay_requires_approval_and_reference() {
        let mut r = record();
        assert_eq!(
            r.pay("admin", "RCPT", None),
            Err(CommissionTransitionError::InvalidTransition {
                from: CommissionStatus::Pending,
                to: CommissionStatus::Paid
            })
        );
        r.approve("admin").unwrap();
        assert_eq!(
            r.pay("admin", "  ", None),
            Err(CommissionTransitionError::MissingPaymentReference)
        );
        assert_eq!(r.status, CommissionStatus::Approved);
    }

    #[test]
    fn test_paid_is_immutable() {
        let mut r = record();
        r.approve("admin").unwrap();
        r.pay("admin", "RCPT", None).unwrap();

        assert_eq!(
            r.adjust("admin", Decimal::from(5), "goodwill"),
            Err(CommissionTransitionError::PaidIsImmutable)
        );
        assert_eq!(
            r.cancel("admin", None),
            Err(CommissionTransitionError::PaidIsImmutable)
        );
        assert_eq!(
            r.ensure_deletable(),
            Err(CommissionTransitionError::PaidIsImmutable)
        );
        assert_eq!(r.amount, Decimal::from(20));
    }

    #[test]
    fn test_adjust_keeps_status_and_is_sticky() {
        let mut r = record();
        r.approve("admin").unwrap();
        r.adjust("admin-2", Decimal::from(15), "dispute").unwrap();

        assert_eq!(r.status, CommissionStatus::Approved);
        assert!(r.is_adjusted());
        assert_eq!(r.amount, Decimal::from(15));
        assert_eq!(r.adjusted_by.as_deref(), Some("admin-2"));

        let mut pending = record();
        pending.adjust("admin", Decimal::from(1), "x").unwrap();
        assert_eq!(
            pending.refresh_amount(Decimal::from(30)),
            Err(CommissionTransitionError::AdjustedIsSticky)
        );
        assert_eq!(pending.amount, Decimal::from(1));
    }

    #[test]
    fn test_adjust_validation() {
        let mut r = record();
        assert_eq!(
            r.adjust("admin", Decimal::from(5), " "),
            Err(CommissionTransitionError::MissingAdjustmentReason)
        );
        assert_eq!(
            r.adjust("admin", Decimal::from(-5), "oops"),
            Err(CommissionTransitionError::NegativeAmount)
        );
        r.cancel("admin", Some("duplicate".into())).unwrap();
        assert_eq!(
            r.adjust("admin", Decimal::from(5), "late"),
            Err(CommissionTransitionError::AdjustmentNotAllowed(
                CommissionStatus::Cancelled
            ))
        );
    }

    #[test]
    fn test_refresh_amount_only_for_pending() {
        let mut r = record();
        assert_eq!(r.refresh_amount(Decimal::from(20)), Ok(false));
        assert_eq!(r.refresh_amount(Decimal::from(25)), Ok(true));
        r.approve("admin").unwrap();
        assert!(r.refresh_amount(Decimal::from(30)).is_err());
        assert_eq!(r.amount, Decimal::from(25));
    }
}
