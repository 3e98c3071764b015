use crate::shared::lenient;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Строка заказа из снимка Shopify
///
/// Все поля необязательны: отсутствующие числа считаются нулём, строки пустыми.
/// При разборе payload'а Shopify принимается поле `price` как синоним `unit_price`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub variant_title: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub sku: Option<String>,

    /// ID товара Shopify (число или строка в источнике)
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub product_id: Option<String>,

    #[serde(default, alias = "price", deserialize_with = "lenient::decimal")]
    pub unit_price: Decimal,

    #[serde(default, deserialize_with = "lenient::quantity")]
    pub quantity: u32,

    /// Скидка на строку (вычитается из price × quantity)
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub total_discount: Decimal,

    #[serde(default, deserialize_with = "lenient::tags")]
    pub tags: Vec<String>,
}

impl LineItem {
    /// price × quantity; `None` при переполнении
    pub fn checked_gross_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }

    /// price × quantity − total_discount, не меньше нуля; `None` при переполнении
    pub fn checked_net_total(&self) -> Option<Decimal> {
        self.checked_gross_total()?
            .checked_sub(self.total_discount)
            .map(|net| net.max(Decimal::ZERO))
    }

    /// price × quantity (0 при переполнении)
    pub fn gross_total(&self) -> Decimal {
        self.checked_gross_total().unwrap_or(Decimal::ZERO)
    }

    /// price × quantity − total_discount, не меньше нуля (0 при переполнении)
    pub fn net_total(&self) -> Decimal {
        self.checked_net_total().unwrap_or(Decimal::ZERO)
    }

    /// Отображаемое имя: "Товар - Вариант"
    pub fn display_name(&self) -> String {
        match self.variant_title.as_deref() {
            Some(variant) if !variant.trim().is_empty() => format!("{} - {}", self.title, variant),
            _ => self.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_shopify_line_item() {
        let item: LineItem = serde_json::from_value(json!({
            "title": "Ceramic Coating",
            "variant_title": "Large",
            "sku": "CC-L",
            "product_id": 632910392,
            "price": "199.00",
            "quantity": 2,
            "total_discount": "10.50"
        }))
        .unwrap();

        assert_eq!(item.product_id.as_deref(), Some("632910392"));
        assert_eq!(item.unit_price, Decimal::new(19900, 2));
        assert_eq!(item.quantity, 2);
        assert_eq!(item.net_total(), Decimal::new(38750, 2));
        assert_eq!(item.display_name(), "Ceramic Coating - Large");
    }

    #[test]
    fn test_missing_and_null_fields_are_zero() {
        let item: LineItem = serde_json::from_value(json!({
            "title": null,
            "price": null,
            "product_id": null,
            "tags": "a, b"
        }))
        .unwrap();

        assert_eq!(item.title, "");
        assert_eq!(item.quantity, 0);
        assert_eq!(item.net_total(), Decimal::ZERO);
        assert_eq!(item.product_id, None);
        assert_eq!(item.tags, vec!["a", "b"]);
    }

    #[test]
    fn test_net_total_clamped_at_zero() {
        let item = LineItem {
            unit_price: Decimal::from(10),
            quantity: 1,
            total_discount: Decimal::from(15),
            ..Default::default()
        };
        assert_eq!(item.gross_total(), Decimal::from(10));
        assert_eq!(item.net_total(), Decimal::ZERO);
    }

    #[test]
    fn test_stored_form_roundtrips_through_unit_price() {
        let item = LineItem {
            title: "Tint".into(),
            unit_price: Decimal::new(4999, 2),
            quantity: 3,
            ..Default::default()
        };
        let stored = serde_json::to_string(&item).unwrap();
        let loaded: LineItem = serde_json::from_str(&stored).unwrap();
        assert_eq!(loaded, item);
    }

    #[test]
    fn test_overflowing_totals_are_none() {
        let item: LineItem = serde_json::from_value(json!({
            "title": "Broken",
            "price": "79228162514264337593543950335",
            "quantity": 2
        }))
        .unwrap();
        assert_eq!(item.unit_price, Decimal::MAX);
        assert_eq!(item.checked_gross_total(), None);
        assert_eq!(item.checked_net_total(), None);
        assert_eq!(item.net_total(), Decimal::ZERO);

        let negative_discount = LineItem {
            unit_price: Decimal::MAX,
            quantity: 1,
            total_discount: Decimal::MIN,
            ..Default::default()
        };
        assert_eq!(negative_discount.checked_net_total(), None);
    }
}
