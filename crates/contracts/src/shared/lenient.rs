//! Терпимые к ошибкам десериализаторы для JSON из Shopify.
//!
//! Снимки заказов приходят из внешнего API и хранятся как есть: числа бывают
//! строками, поля отсутствуют или равны `null`. Всё, что не удалось разобрать,
//! превращается в значение по умолчанию (ноль / пустая строка), без ошибки.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// Преобразовать произвольное JSON-значение в Decimal (ошибка → 0)
pub fn value_to_decimal(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Decimal::from(i)
            } else {
                Decimal::from_str(&n.to_string())
                    .or_else(|_| Decimal::from_scientific(&n.to_string()))
                    .unwrap_or(Decimal::ZERO)
            }
        }
        Value::String(s) => Decimal::from_str(s.trim()).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(value_to_decimal).unwrap_or(Decimal::ZERO))
}

/// Количество: отрицательные и дробные значения отбрасываются до целого ≥ 0
pub fn quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let qty = value.as_ref().map(value_to_decimal).unwrap_or(Decimal::ZERO);
    if qty <= Decimal::ZERO {
        return Ok(0);
    }
    Ok(qty.trunc().to_u32().unwrap_or(u32::MAX))
}

pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_string).unwrap_or_default())
}

/// Необязательная строка; пустая строка считается отсутствующей
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_to_string)
        .filter(|s| !s.trim().is_empty()))
}

/// Теги: массив строк или строка через запятую (формат Shopify)
pub fn tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => split_tags(&s),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(value_to_string)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    })
}

pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
