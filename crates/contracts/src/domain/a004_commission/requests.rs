use crate::enums::commission_status::CommissionStatus;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustRequest {
    pub amount: Decimal,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayRequest {
    pub payment_reference: String,
    #[serde(default)]
    pub payment_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkActionRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkPayRequest {
    pub ids: Vec<String>,
    pub payment_reference: String,
    #[serde(default)]
    pub payment_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkFailure {
    pub id: String,
    pub reason: String,
}

/// Результат массовой операции: пакет не атомарен, каждая запись сохраняется отдельно
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BulkActionResult {
    pub succeeded: Vec<String>,
    pub failed: Vec<BulkFailure>,
}

impl BulkActionResult {
    pub fn record_success(&mut self, id: impl Into<String>) {
        self.succeeded.push(id.into());
    }

    pub fn record_failure(&mut self, id: impl Into<String>, reason: impl Into<String>) {
        self.failed.push(BulkFailure {
            id: id.into(),
            reason: reason.into(),
        });
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Фильтр списка начислений
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CommissionListQuery {
    pub status: Option<CommissionStatus>,
    pub agent_id: Option<String>,
}

/// Итоги по агенту; отменённые начисления не входят ни в одну сумму
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AgentCommissionSummary {
    pub agent_id: String,
    pub pending_total: Decimal,
    pub approved_total: Decimal,
    pub paid_total: Decimal,
    pub record_count: usize,
    pub cancelled_count: usize,
}

impl AgentCommissionSummary {
    pub fn total(&self) -> Decimal {
        self.pending_total + self.approved_total + self.paid_total
    }
}
