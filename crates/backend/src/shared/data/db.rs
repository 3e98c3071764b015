use contracts::domain::a001_commission_rule::aggregate::CommissionRule;
use contracts::domain::a002_agent::aggregate::Agent;
use contracts::domain::a003_shop_order::aggregate::ShopOrder;
use contracts::domain::a004_commission::aggregate::CommissionRecord;
use contracts::domain::common::AggregateRoot;
use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

const CREATE_COMMISSION_RULE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS a001_commission_rule (
        id TEXT PRIMARY KEY NOT NULL,
        code TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL,
        comment TEXT,
        rule_type TEXT NOT NULL,
        rule_value TEXT NOT NULL DEFAULT '',
        rule_key TEXT NOT NULL DEFAULT '',
        commission_percentage TEXT NOT NULL DEFAULT '0',
        status TEXT NOT NULL DEFAULT 'active',
        is_deleted INTEGER NOT NULL DEFAULT 0,
        is_posted INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT,
        version INTEGER NOT NULL DEFAULT 0
    );
"#;

/// Одно активное правило на (тип, значение без учёта регистра).
///
/// `lower()` в SQLite приводит к нижнему регистру только ASCII, поэтому индекс
/// строится по `rule_key`, который приложение заполняет через Unicode `to_lowercase`.
const CREATE_COMMISSION_RULE_UNIQUE_INDEX: &str = r#"
    CREATE UNIQUE INDEX IF NOT EXISTS ux_a001_commission_rule_active_key
    ON a001_commission_rule (rule_type, rule_key)
    WHERE status = 'active' AND is_deleted = 0;
"#;

const CREATE_AGENT_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS a002_agent (
        id TEXT PRIMARY KEY NOT NULL,
        code TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL,
        comment TEXT,
        customer_id TEXT NOT NULL,
        email TEXT,
        is_active INTEGER NOT NULL DEFAULT 1,
        is_deleted INTEGER NOT NULL DEFAULT 0,
        is_posted INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT,
        version INTEGER NOT NULL DEFAULT 0
    );
"#;

const CREATE_SHOP_ORDER_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS a003_shop_order (
        id TEXT PRIMARY KEY NOT NULL,
        code TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL,
        comment TEXT,
        shopify_order_id TEXT NOT NULL UNIQUE,
        agent_id TEXT,
        header_json TEXT NOT NULL,
        lines_json TEXT NOT NULL,
        is_deleted INTEGER NOT NULL DEFAULT 0,
        is_posted INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT,
        version INTEGER NOT NULL DEFAULT 0
    );
"#;

const CREATE_COMMISSION_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS a004_commission (
        id TEXT PRIMARY KEY NOT NULL,
        code TEXT NOT NULL DEFAULT '',
        description TEXT NOT NULL,
        comment TEXT,
        order_id TEXT NOT NULL,
        agent_id TEXT NOT NULL,
        amount TEXT NOT NULL DEFAULT '0',
        status TEXT NOT NULL DEFAULT 'pending',
        adjusted_by TEXT,
        adjustment_reason TEXT,
        adjusted_at TEXT,
        approved_by TEXT,
        approved_at TEXT,
        paid_by TEXT,
        payment_reference TEXT,
        payment_note TEXT,
        paid_at TEXT,
        cancelled_by TEXT,
        cancellation_reason TEXT,
        cancelled_at TEXT,
        is_deleted INTEGER NOT NULL DEFAULT 0,
        is_posted INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT,
        version INTEGER NOT NULL DEFAULT 0
    );
"#;

const CREATE_COMMISSION_ORDER_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS ix_a004_commission_order_agent
    ON a004_commission (order_id, agent_id);
"#;

fn build_sqlite_url(path: &Path) -> String {
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

async fn execute_sql(conn: &DatabaseConnection, sql: &str) -> anyhow::Result<()> {
    conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
        .await?;
    Ok(())
}

pub async fn initialize_database(db_file: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    let db_url = build_sqlite_url(&absolute_path);
    tracing::info!("Connecting to database: {}", db_url);
    let conn = Database::connect(&db_url).await?;

    // Minimal schema bootstrap
    let tables = [
        (CommissionRule::full_name(), CREATE_COMMISSION_RULE_TABLE),
        (Agent::full_name(), CREATE_AGENT_TABLE),
        (ShopOrder::full_name(), CREATE_SHOP_ORDER_TABLE),
        (CommissionRecord::full_name(), CREATE_COMMISSION_TABLE),
    ];
    for (name, sql) in tables {
        tracing::info!("Ensuring table {}", name);
        execute_sql(&conn, sql).await?;
    }
    execute_sql(&conn, CREATE_COMMISSION_RULE_UNIQUE_INDEX).await?;
    execute_sql(&conn, CREATE_COMMISSION_ORDER_INDEX).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Database connection already initialized"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_sqlite_url() {
        assert_eq!(
            build_sqlite_url(Path::new("/var/db/app.db")),
            "sqlite:///var/db/app.db?mode=rwc"
        );
        assert_eq!(
            build_sqlite_url(Path::new("C:\\data\\app.db")),
            "sqlite:///C:/data/app.db?mode=rwc"
        );
    }
}
