use serde::{Deserialize, Serialize};

pub type UseCaseResult<T> = Result<T, UseCaseError>;

/// Категория ошибки обработки одной записи
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UseCaseErrorKind {
    /// Запись пропущена по бизнес-причине
    Skipped,
    NotFound,
    InvalidInput,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseError {
    pub kind: UseCaseErrorKind,
    pub message: String,
}

impl UseCaseError {
    pub fn new(kind: UseCaseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self::new(UseCaseErrorKind::Skipped, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(UseCaseErrorKind::NotFound, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(UseCaseErrorKind::InvalidInput, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(UseCaseErrorKind::Internal, message)
    }

    /// Пропуск, а не сбой: запись отсутствует или не подлежит обработке
    pub fn is_skip(&self) -> bool {
        matches!(
            self.kind,
            UseCaseErrorKind::Skipped | UseCaseErrorKind::NotFound
        )
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

impl std::error::Error for UseCaseError {}

impl From<anyhow::Error> for UseCaseError {
    fn from(err: anyhow::Error) -> Self {
        UseCaseError::internal(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_classification() {
        assert!(UseCaseError::skipped("adjusted").is_skip());
        assert!(UseCaseError::not_found("order").is_skip());
        assert!(!UseCaseError::invalid_input("bad id").is_skip());

        let err: UseCaseError = anyhow::anyhow!("db is down").into();
        assert_eq!(err.kind, UseCaseErrorKind::Internal);
        assert_eq!(err.to_string(), "[Internal] db is down");
    }
}
