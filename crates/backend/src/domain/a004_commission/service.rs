use super::repository;
use crate::domain::{a001_commission_rule, a003_shop_order};
use crate::shared::commission::CommissionEngine;
use crate::shared::errors::{NotFound, ValidationError};
use crate::shared::format::round_money;
use crate::shared::shopify::product_source;
use crate::system::auth::Actor;
use contracts::domain::a004_commission::aggregate::{CommissionRecord, CommissionTransitionError};
use contracts::domain::a004_commission::breakdown::CommissionBreakdown;
use contracts::domain::a004_commission::requests::{
    AdjustRequest, AgentCommissionSummary, BulkActionRequest, BulkActionResult, BulkPayRequest,
    CancelRequest, CommissionListQuery, PayRequest,
};
use contracts::enums::commission_status::CommissionStatus;
use uuid::Uuid;

fn parse_id(raw: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ValidationError(format!("Некорректный ID: '{}'", raw)).into())
}

async fn load(id: Uuid) -> anyhow::Result<CommissionRecord> {
    repository::get_by_id(id)
        .await?
        .ok_or_else(|| NotFound::new("commission", id.to_string()).into())
}

/// Сохранить изменённое начисление с проверкой версии
pub async fn save(record: &mut CommissionRecord) -> anyhow::Result<()> {
    let expected_version = record.base.metadata.bump();
    repository::update(record, expected_version).await
}

/// Сохранить новое начисление
pub async fn save_new(record: &mut CommissionRecord) -> anyhow::Result<Uuid> {
    record.before_write();
    repository::insert(record).await
}

/// Загрузить, изменить и сохранить одно начисление
async fn apply<F>(
    actor: &Actor,
    id: Uuid,
    action_name: &str,
    action: F,
) -> anyhow::Result<CommissionRecord>
where
    F: FnOnce(&mut CommissionRecord) -> Result<(), CommissionTransitionError>,
{
    actor.require_admin()?;
    let mut record = load(id).await?;
    let from = record.status;
    action(&mut record)?;
    save(&mut record).await?;
    tracing::info!(
        "Commission {} {} by {}: {} -> {}, amount {}",
        record.base.code,
        action_name,
        actor.user_id,
        from.code(),
        record.status.code(),
        record.amount
    );
    Ok(record)
}

pub async fn approve(actor: &Actor, id: Uuid) -> anyhow::Result<CommissionRecord> {
    apply(actor, id, "approved", |r| r.approve(&actor.user_id)).await
}

pub async fn pay(actor: &Actor, id: Uuid, request: PayRequest) -> anyhow::Result<CommissionRecord> {
    apply(actor, id, "paid", |r| {
        r.pay(&actor.user_id, &request.payment_reference, request.payment_note)
    })
    .await
}

pub async fn cancel(
    actor: &Actor,
    id: Uuid,
    request: CancelRequest,
) -> anyhow::Result<CommissionRecord> {
    apply(actor, id, "cancelled", |r| r.cancel(&actor.user_id, request.reason)).await
}

/// Ручная корректировка суммы; статус не меняется
pub async fn adjust(
    actor: &Actor,
    id: Uuid,
    request: AdjustRequest,
) -> anyhow::Result<CommissionRecord> {
    let amount = round_money(request.amount);
    apply(actor, id, "adjusted", |r| {
        r.adjust(&actor.user_id, amount, &request.reason)
    })
    .await
}

/// Удаление начисления (оплаченные не удаляются)
pub async fn delete(actor: &Actor, id: Uuid) -> anyhow::Result<bool> {
    actor.require_admin()?;
    let record = match repository::get_by_id(id).await? {
        Some(record) => record,
        None => return Ok(false),
    };
    record.ensure_deletable()?;
    let deleted = repository::delete(id).await?;
    if deleted {
        tracing::info!("Commission {} deleted by {}", record.base.code, actor.user_id);
    }
    Ok(deleted)
}

/// Массовая операция: записи обрабатываются по одной, ошибки не прерывают пакет
async fn bulk<F, Fut>(ids: &[String], action_name: &str, mut action: F) -> BulkActionResult
where
    F: FnMut(Uuid) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<CommissionRecord>>,
{
    let mut result = BulkActionResult::default();
    for raw_id in ids {
        let outcome = match parse_id(raw_id) {
            Ok(id) => action(id).await.map(|_| ()),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(()) => result.record_success(raw_id.clone()),
            Err(e) => {
                tracing::warn!("Bulk {} failed for {}: {}", action_name, raw_id, e);
                result.record_failure(raw_id.clone(), e.to_string());
            }
        }
    }
    tracing::info!(
        "Bulk {}: {} succeeded, {} failed",
        action_name,
        result.succeeded.len(),
        result.failed.len()
    );
    result
}

pub async fn bulk_approve(
    actor: &Actor,
    request: BulkActionRequest,
) -> anyhow::Result<BulkActionResult> {
    actor.require_admin()?;
    Ok(bulk(&request.ids, "approve", |id| approve(actor, id)).await)
}

pub async fn bulk_pay(actor: &Actor, request: BulkPayRequest) -> anyhow::Result<BulkActionResult> {
    actor.require_admin()?;
    if request.payment_reference.trim().is_empty() {
        return Err(ValidationError("Не указан номер платёжного документа".into()).into());
    }
    let reference = request.payment_reference.clone();
    let note = request.payment_note.clone();
    Ok(bulk(&request.ids, "pay", |id| {
        pay(
            actor,
            id,
            PayRequest {
                payment_reference: reference.clone(),
                payment_note: note.clone(),
            },
        )
    })
    .await)
}

pub async fn bulk_cancel(
    actor: &Actor,
    request: BulkActionRequest,
) -> anyhow::Result<BulkActionResult> {
    actor.require_admin()?;
    Ok(bulk(&request.ids, "cancel", |id| {
        cancel(actor, id, CancelRequest::default())
    })
    .await)
}

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<CommissionRecord>> {
    repository::get_by_id(id).await
}

pub async fn list_for_order(order_id: &str) -> anyhow::Result<Vec<CommissionRecord>> {
    repository::list_for_order(order_id).await
}

pub async fn list(query: &CommissionListQuery) -> anyhow::Result<Vec<CommissionRecord>> {
    repository::list(query).await
}

/// Данные для счёта: расшифровка начисления по строкам заказа
pub async fn breakdown(id: Uuid) -> anyhow::Result<CommissionBreakdown> {
    let record = load(id).await?;
    let order_id = parse_id(&record.order_id)?;
    let order = a003_shop_order::service::get_by_id(order_id)
        .await?
        .ok_or_else(|| NotFound::new("order", record.order_id.clone()))?;

    let rules = a001_commission_rule::service::load_rule_set().await?;
    let source = product_source();
    let engine = CommissionEngine::new(&rules, source.as_ref());
    let result = engine.aggregate(&order, Some(&record)).await;

    Ok(CommissionBreakdown {
        commission_id: record.to_string_id(),
        order_id: record.order_id.clone(),
        order_name: order.header.order_name.clone(),
        currency: order.header.currency.clone(),
        agent_id: record.agent_id.clone(),
        status: record.status,
        result,
    })
}

/// Итоги по статусам; отменённые не входят в суммы
pub fn summarize(agent_id: &str, records: &[CommissionRecord]) -> AgentCommissionSummary {
    let mut summary = AgentCommissionSummary {
        agent_id: agent_id.to_string(),
        ..Default::default()
    };
    for record in records.iter().filter(|r| r.agent_id == agent_id) {
        summary.record_count += 1;
        match record.status {
            CommissionStatus::Pending => summary.pending_total += record.amount,
            CommissionStatus::Approved => summary.approved_total += record.amount,
            CommissionStatus::Paid => summary.paid_total += record.amount,
            CommissionStatus::Cancelled => summary.cancelled_count += 1,
        }
    }
    summary
}

pub async fn agent_summary(agent_id: &str) -> anyhow::Result<AgentCommissionSummary> {
    let records = repository::list(&CommissionListQuery {
        status: None,
        agent_id: Some(agent_id.to_string()),
    })
    .await?;
    Ok(summarize(agent_id, &records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn record(agent: &str, amount: i64) -> CommissionRecord {
        CommissionRecord::new_pending("order".into(), "#1", agent.into(), Decimal::from(amount))
    }

    #[test]
    fn test_summarize_excludes_cancelled() {
        let mut approved = record("a1", 30);
        approved.approve("admin").unwrap();
        let mut paid = record("a1", 50);
        paid.approve("admin").unwrap();
        paid.pay("admin", "R-1", None).unwrap();
        let mut cancelled = record("a1", 1000);
        cancelled.cancel("admin", None).unwrap();
        let records = vec![record("a1", 20), approved, paid, cancelled, record("a2", 7)];

        let summary = summarize("a1", &records);

        assert_eq!(summary.pending_total, Decimal::from(20));
        assert_eq!(summary.approved_total, Decimal::from(30));
        assert_eq!(summary.paid_total, Decimal::from(50));
        assert_eq!(summary.total(), Decimal::from(100));
        assert_eq!(summary.record_count, 4);
        assert_eq!(summary.cancelled_count, 1);
    }

    #[test]
    fn test_parse_id() {
        assert!(parse_id("not-a-uuid").is_err());
        assert!(parse_id(&format!(" {} ", Uuid::nil())).is_ok());
    }
}
