use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // A001 Commission rules
        .route(
            "/api/a001/commission-rules",
            get(handlers::a001_commission_rule::list_all)
                .post(handlers::a001_commission_rule::upsert),
        )
        .route(
            "/api/a001/commission-rules/resolve",
            post(handlers::a001_commission_rule::resolve),
        )
        .route(
            "/api/a001/commission-rules/:id",
            get(handlers::a001_commission_rule::get_by_id)
                .delete(handlers::a001_commission_rule::delete),
        )
        .route(
            "/api/a001/commission-rules/:id/status",
            post(handlers::a001_commission_rule::set_status),
        )
        // A002 Agents
        .route(
            "/api/a002/agents",
            get(handlers::a002_agent::list_all).post(handlers::a002_agent::upsert),
        )
        .route(
            "/api/a002/agents/:id",
            get(handlers::a002_agent::get_by_id).delete(handlers::a002_agent::delete),
        )
        // A003 Shop orders
        .route(
            "/api/a003/orders",
            get(handlers::a003_shop_order::list).post(handlers::a003_shop_order::import),
        )
        .route(
            "/api/a003/orders/:id",
            get(handlers::a003_shop_order::get_by_id),
        )
        .route(
            "/api/a003/orders/:id/agent",
            post(handlers::a003_shop_order::assign_agent),
        )
        // A004 Commissions
        .route(
            "/api/a004/commissions",
            get(handlers::a004_commission::list),
        )
        .route(
            "/api/a004/commissions/bulk/approve",
            post(handlers::a004_commission::bulk_approve),
        )
        .route(
            "/api/a004/commissions/bulk/pay",
            post(handlers::a004_commission::bulk_pay),
        )
        .route(
            "/api/a004/commissions/bulk/cancel",
            post(handlers::a004_commission::bulk_cancel),
        )
        .route(
            "/api/a004/commissions/:id",
            get(handlers::a004_commission::get_by_id).delete(handlers::a004_commission::delete),
        )
        .route(
            "/api/a004/commissions/:id/breakdown",
            get(handlers::a004_commission::breakdown),
        )
        .route(
            "/api/a004/commissions/:id/approve",
            post(handlers::a004_commission::approve),
        )
        .route(
            "/api/a004/commissions/:id/adjust",
            post(handlers::a004_commission::adjust),
        )
        .route(
            "/api/a004/commissions/:id/pay",
            post(handlers::a004_commission::pay),
        )
        .route(
            "/api/a004/commissions/:id/cancel",
            post(handlers::a004_commission::cancel),
        )
        .route(
            "/api/a004/agents/:agent_id/summary",
            get(handlers::a004_commission::agent_summary),
        )
        // UseCase u501: Calculate commissions
        .route("/api/u501/calculate", post(handlers::usecases::u501_calculate))
}
