use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, StatusCode},
};

use crate::shared::errors::Forbidden;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Пользователь, выполняющий запрос.
///
/// Заголовки выставляет внешний слой (сессии/авторизация); здесь только чтение.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub is_admin: bool,
}

impl Actor {
    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: true,
        }
    }

    pub fn require_admin(&self) -> Result<(), Forbidden> {
        if self.is_admin {
            Ok(())
        } else {
            Err(Forbidden)
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let user_id = headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())?;
        let is_admin = headers
            .get(USER_ROLE_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(|role| role.trim().eq_ignore_ascii_case("admin"))
            .unwrap_or(false);
        Some(Self {
            user_id: user_id.to_string(),
            is_admin,
        })
    }
}

/// Usage in handlers: `async fn handler(actor: Actor) -> Response`
#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Actor::from_headers(&parts.headers).ok_or(StatusCode::UNAUTHORIZED)
    }
}
