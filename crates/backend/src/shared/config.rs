use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub shopify: ShopifyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

/// Доступ к Shopify Admin API (источник типа/тегов товара)
#[derive(Debug, Deserialize, Clone)]
pub struct ShopifyConfig {
    /// Домен магазина, например "my-store.myshopify.com"; пусто: запросы отключены
    #[serde(default)]
    pub shop_domain: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            shop_domain: String::new(),
            access_token: String::new(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ShopifyConfig {
    pub fn is_configured(&self) -> bool {
        !self.shop_domain.trim().is_empty() && !self.access_token.trim().is_empty()
    }
}

fn default_api_version() -> String {
    "2024-01".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/app.db"

[server]
port = 3000

[shopify]
shop_domain = ""
access_token = ""
api_version = "2024-01"
timeout_secs = 5
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// `SHOPIFY_ACCESS_TOKEN` overrides `shopify.access_token` in both cases.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = read_config_file()?;
    apply_env_overrides(&mut config, std::env::var("SHOPIFY_ACCESS_TOKEN").ok());
    Ok(config)
}

fn read_config_file() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut Config, access_token: Option<String>) {
    if let Some(token) = access_token.filter(|t| !t.trim().is_empty()) {
        config.shopify.access_token = token;
    }
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/app.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.shopify.timeout_secs, 5);
        assert!(!config.shopify.is_configured());
    }

    #[test]
    fn test_sections_are_optional() {
        let config: Config = toml::from_str(
            r#"
            [database]
            path = "/var/lib/commissions.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.shopify.api_version, "2024-01");
        assert_eq!(
            get_database_path(&config).unwrap(),
            PathBuf::from("/var/lib/commissions.db")
        );
    }

    #[test]
    fn test_env_token_override() {
        let mut config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        config.shopify.shop_domain = "demo.myshopify.com".into();

        apply_env_overrides(&mut config, Some("  ".into()));
        assert!(!config.shopify.is_configured());

        apply_env_overrides(&mut config, Some("shpat_123".into()));
        assert_eq!(config.shopify.access_token, "shpat_123");
        assert!(config.shopify.is_configured());
    }
}
