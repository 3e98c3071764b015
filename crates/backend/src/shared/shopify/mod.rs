use crate::shared::commission::{NoProductMetadata, ProductMetadata, ProductMetadataSource};
use crate::shared::config::ShopifyConfig;
use async_trait::async_trait;
use contracts::shared::lenient;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::sync::Arc;

static PRODUCT_SOURCE: OnceCell<Arc<dyn ProductMetadataSource>> = OnceCell::new();

/// Установить глобальный источник метаданных товаров (один раз при старте)
pub fn initialize_product_source(config: &ShopifyConfig) -> anyhow::Result<()> {
    let source: Arc<dyn ProductMetadataSource> = if config.is_configured() {
        tracing::info!(
            "Shopify product lookups enabled for {} (timeout {}s)",
            config.shop_domain,
            config.timeout_secs
        );
        Arc::new(ShopifyProductClient::new(config)?)
    } else {
        tracing::warn!("Shopify is not configured, product types come from title heuristics");
        Arc::new(NoProductMetadata)
    };
    PRODUCT_SOURCE
        .set(source)
        .map_err(|_| anyhow::anyhow!("Product metadata source already initialized"))?;
    Ok(())
}

/// Текущий источник метаданных; до инициализации: источник без запросов
pub fn product_source() -> Arc<dyn ProductMetadataSource> {
    PRODUCT_SOURCE
        .get()
        .cloned()
        .unwrap_or_else(|| Arc::new(NoProductMetadata))
}

/// HTTP-клиент Shopify Admin REST API для чтения типа и тегов товара
pub struct ShopifyProductClient {
    client: reqwest::Client,
    shop_domain: String,
    access_token: String,
    api_version: String,
}

#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    product: ShopifyProduct,
}

#[derive(Debug, Deserialize)]
struct ShopifyProduct {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    product_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::tags")]
    tags: Vec<String>,
}

impl ShopifyProductClient {
    pub fn new(config: &ShopifyConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            shop_domain: normalize_domain(&config.shop_domain),
            access_token: config.access_token.clone(),
            api_version: config.api_version.clone(),
        })
    }

    fn product_url(&self, product_id: &str) -> String {
        format!(
            "https://{}/admin/api/{}/products/{}.json?fields=id,product_type,tags",
            self.shop_domain, self.api_version, product_id
        )
    }

    async fn fetch(&self, product_id: &str) -> anyhow::Result<ProductMetadata> {
        let url = self.product_url(product_id);
        let response = self
            .client
            .get(&url)
            .header("X-Shopify-Access-Token", &self.access_token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            anyhow::bail!("Shopify API returned {}: {}", status, preview);
        }

        let envelope: ProductEnvelope = response.json().await?;
        Ok(ProductMetadata {
            product_type: envelope.product.product_type,
            tags: envelope.product.tags,
        })
    }
}

#[async_trait]
impl ProductMetadataSource for ShopifyProductClient {
    async fn lookup(&self, product_id: &str) -> Option<ProductMetadata> {
        if !product_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            tracing::warn!("Skipping product lookup for malformed id {:?}", product_id);
            return None;
        }
        match self.fetch(product_id).await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                tracing::warn!("Product metadata lookup failed for {}: {}", product_id, e);
                None
            }
        }
    }
}

/// "https://shop.myshopify.com/" -> "shop.myshopify.com"
fn normalize_domain(raw: &str) -> String {
    raw.trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}
