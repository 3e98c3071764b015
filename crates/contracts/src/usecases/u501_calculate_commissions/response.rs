use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Создано новое начисление в статусе pending
    Created,
    /// Сумма pending-начисления пересчитана
    Refreshed,
    /// Начисление существует и не требует изменений
    Unchanged,
    /// Заказ пропущен (нет агента, начисление скорректировано/одобрено и т.п.)
    Skipped,
    Failed,
}

/// Результат обработки одного заказа
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderOutcome {
    pub order_id: String,
    pub kind: OutcomeKind,
    pub commission_id: Option<String>,
    pub amount: Option<Decimal>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CalculateResponse {
    pub outcomes: Vec<OrderOutcome>,
    pub created: usize,
    pub refreshed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl CalculateResponse {
    pub fn push(&mut self, outcome: OrderOutcome) {
        match outcome.kind {
            OutcomeKind::Created => self.created += 1,
            OutcomeKind::Refreshed => self.refreshed += 1,
            OutcomeKind::Unchanged => self.unchanged += 1,
            OutcomeKind::Skipped => self.skipped += 1,
            OutcomeKind::Failed => self.failed += 1,
        }
        self.outcomes.push(outcome);
    }
}
