use axum::http::StatusCode;
use contracts::domain::a004_commission::aggregate::CommissionTransitionError;
use thiserror::Error;

/// Ошибка валидации входных данных
#[derive(Debug, Error)]
#[error("validation failed: {0}")]
pub struct ValidationError(pub String);

#[derive(Debug, Error)]
#[error("{entity} {id} not found")]
pub struct NotFound {
    pub entity: &'static str,
    pub id: String,
}

impl NotFound {
    pub fn new(entity: &'static str, id: impl Into<String>) -> Self {
        Self {
            entity,
            id: id.into(),
        }
    }
}

/// Запись изменена другим запросом между чтением и записью
#[derive(Debug, Error)]
#[error("{entity} {id} was modified concurrently (expected version {expected_version})")]
pub struct ConcurrentModification {
    pub entity: &'static str,
    pub id: String,
    pub expected_version: i32,
}

#[derive(Debug, Error)]
#[error("action requires administrator role")]
pub struct Forbidden;

/// HTTP-статус для ошибки сервиса
pub fn status_code_for(err: &anyhow::Error) -> StatusCode {
    if err.downcast_ref::<ValidationError>().is_some() {
        StatusCode::BAD_REQUEST
    } else if err.downcast_ref::<NotFound>().is_some() {
        StatusCode::NOT_FOUND
    } else if err.downcast_ref::<Forbidden>().is_some() {
        StatusCode::FORBIDDEN
    } else if err.downcast_ref::<ConcurrentModification>().is_some()
        || err.downcast_ref::<CommissionTransitionError>().is_some()
    {
        StatusCode::CONFLICT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Залогировать ошибку и вернуть статус для ответа
pub fn log_and_map(context: &str, err: anyhow::Error) -> StatusCode {
    let status = status_code_for(&err);
    if status.is_server_error() {
        tracing::error!("{}: {:#}", context, err);
    } else {
        tracing::warn!("{}: {}", context, err);
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_code_for(&ValidationError("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_code_for(&NotFound::new("commission", "1").into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_code_for(&Forbidden.into()), StatusCode::FORBIDDEN);
        assert_eq!(
            status_code_for(&CommissionTransitionError::PaidIsImmutable.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_code_for(
                &ConcurrentModification {
                    entity: "commission",
                    id: "1".into(),
                    expected_version: 2
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_code_for(&anyhow::anyhow!("db is down")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
