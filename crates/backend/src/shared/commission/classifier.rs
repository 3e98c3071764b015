use super::{ProductMetadata, ProductMetadataSource};
use contracts::domain::a003_shop_order::line_item::LineItem;
use std::collections::HashMap;

/// Тип для услуг, оказываемых офлайн (покрытия, тонировка)
pub const OFFLINE_SERVICE: &str = "OFFLINE SERVICE";
/// Тип по умолчанию
pub const TRAPO_CLASSIC: &str = "TRAPO CLASSIC";

const OFFLINE_KEYWORDS: [&str; 2] = ["coating", "tint"];

/// Входные данные для поиска правила по строке заказа
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub product_type: String,
    pub tags: Vec<String>,
}

/// Классификатор строк заказа.
///
/// Порядок: тип из источника метаданных (в верхнем регистре) →
/// ключевые слова в названии → TRAPO CLASSIC.
/// Ответы источника кешируются на время жизни классификатора.
pub struct Classifier<'a> {
    source: &'a dyn ProductMetadataSource,
    cache: HashMap<String, Option<ProductMetadata>>,
}

impl<'a> Classifier<'a> {
    pub fn new(source: &'a dyn ProductMetadataSource) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    pub async fn classify(&mut self, item: &LineItem) -> Classification {
        let metadata = match item
            .product_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        {
            Some(product_id) => self.lookup(product_id).await,
            None => None,
        };

        let product_type = metadata
            .as_ref()
            .and_then(|m| m.product_type.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| heuristic_type(&item.title).to_string());

        let tags = if item.tags.is_empty() {
            metadata.map(|m| m.tags).unwrap_or_default()
        } else {
            item.tags.clone()
        };

        Classification { product_type, tags }
    }

    async fn lookup(&mut self, product_id: &str) -> Option<ProductMetadata> {
        if let Some(cached) = self.cache.get(product_id) {
            return cached.clone();
        }
        let metadata = self.source.lookup(product_id).await;
        if metadata.is_none() {
            tracing::debug!(
                "No product metadata for {}, falling back to title heuristic",
                product_id
            );
        }
        self.cache.insert(product_id.to_string(), metadata.clone());
        metadata
    }
}

/// Тип по названию товара, когда источник ничего не вернул
pub fn heuristic_type(title: &str) -> &'static str {
    let title = title.to_lowercase();
    if OFFLINE_KEYWORDS.iter().any(|kw| title.contains(kw)) {
        OFFLINE_SERVICE
    } else {
        TRAPO_CLASSIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::commission::test_support::StubSource;
    use crate::shared::commission::NoProductMetadata;

    fn item(title: &str, product_id: Option<&str>) -> LineItem {
        LineItem {
            title: title.into(),
            product_id: product_id.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_heuristic_type() {
        assert_eq!(heuristic_type("Ceramic COATING kit"), OFFLINE_SERVICE);
        assert_eq!(heuristic_type("Window tint"), OFFLINE_SERVICE);
        assert_eq!(heuristic_type("Floor mat"), TRAPO_CLASSIC);
        assert_eq!(heuristic_type(""), TRAPO_CLASSIC);
    }

    #[tokio::test]
    async fn test_metadata_type_is_uppercased() {
        let source = StubSource::with("42", Some("  Trapo Pro "), &["premium"]);
        let mut classifier = Classifier::new(&source);

        let c = classifier.classify(&item("Tint film", Some("42"))).await;
        assert_eq!(c.product_type, "TRAPO PRO");
        assert_eq!(c.tags, vec!["premium".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_metadata_type_falls_through() {
        let source = StubSource::with("42", Some(""), &[]);
        let mut classifier = Classifier::new(&source);

        let c = classifier.classify(&item("Tint film", Some("42"))).await;
        assert_eq!(c.product_type, OFFLINE_SERVICE);

        let c = classifier.classify(&item("Mat", Some("unknown"))).await;
        assert_eq!(c.product_type, TRAPO_CLASSIC);
    }

    #[tokio::test]
    async fn test_item_tags_take_precedence() {
        let source = StubSource::with("42", Some("Mats"), &["from-source"]);
        let mut classifier = Classifier::new(&source);
        let mut line = item("Mat", Some("42"));
        line.tags = vec!["vip".into()];

        let c = classifier.classify(&line).await;
        assert_eq!(c.tags, vec!["vip".to_string()]);
    }

    #[tokio::test]
    async fn test_lookups_are_memoised() {
        let source = StubSource::with("42", Some("Mats"), &[]);
        let mut classifier = Classifier::new(&source);

        classifier.classify(&item("A", Some("42"))).await;
        classifier.classify(&item("B", Some("42"))).await;
        classifier.classify(&item("C", Some("7"))).await;
        classifier.classify(&item("D", Some("7"))).await;
        classifier.classify(&item("E", None)).await;

        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_without_product_id_no_lookup() {
        let mut classifier = Classifier::new(&NoProductMetadata);
        let c = classifier.classify(&item("Graphene Coating", None)).await;
        assert_eq!(c.product_type, OFFLINE_SERVICE);
        assert!(c.tags.is_empty());
    }
}
