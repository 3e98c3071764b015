use serde::{Deserialize, Serialize};

/// Статус начисления комиссии
///
/// pending → approved → paid; cancelled достижим из pending и approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Approved,
    Paid,
    Cancelled,
}

impl CommissionStatus {
    pub fn code(&self) -> &'static str {
        match self {
            CommissionStatus::Pending => "pending",
            CommissionStatus::Approved => "approved",
            CommissionStatus::Paid => "paid",
            CommissionStatus::Cancelled => "cancelled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CommissionStatus::Pending => "Ожидает",
            CommissionStatus::Approved => "Одобрено",
            CommissionStatus::Paid => "Выплачено",
            CommissionStatus::Cancelled => "Отменено",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "pending" => Some(CommissionStatus::Pending),
            "approved" => Some(CommissionStatus::Approved),
            "paid" => Some(CommissionStatus::Paid),
            "cancelled" | "canceled" => Some(CommissionStatus::Cancelled),
            _ => None,
        }
    }

    /// Допустим ли переход в статус `to`
    pub fn can_transition_to(&self, to: CommissionStatus) -> bool {
        use CommissionStatus::*;
        matches!(
            (self, to),
            (Pending, Approved) | (Approved, Paid) | (Pending, Cancelled) | (Approved, Cancelled)
        )
    }

    /// Можно ли вручную корректировать сумму в этом статусе
    pub fn allows_adjustment(&self) -> bool {
        matches!(self, CommissionStatus::Pending | CommissionStatus::Approved)
    }

    /// Участвует ли запись в итоговых суммах
    pub fn counts_in_totals(&self) -> bool {
        !matches!(self, CommissionStatus::Cancelled)
    }
}

impl std::fmt::Display for CommissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::CommissionStatus::*;

    #[test]
    fn test_transitions() {
        assert!(Pending.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Approved.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Paid));
        assert!(!Paid.can_transition_to(Cancelled));
        assert!(!Paid.can_transition_to(Approved));
        assert!(!Cancelled.can_transition_to(Pending));
    }

    #[test]
    fn test_adjustment_allowed_only_before_payment() {
        assert!(Pending.allows_adjustment());
        assert!(Approved.allows_adjustment());
        assert!(!Paid.allows_adjustment());
        assert!(!Cancelled.allows_adjustment());
    }
}
