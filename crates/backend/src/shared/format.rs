use rust_decimal::{Decimal, RoundingStrategy};

/// Форматирует число с разделителями тысяч (точками)
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push('.');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Округление денежной суммы до копеек (половина от нуля)
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Процент с двумя знаками после запятой: 7.5 -> "7.50"
pub fn format_rate(rate: Decimal) -> String {
    format!("{:.2}", round_money(rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(42), "42");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1.000");
        assert_eq!(format_number(1234567), "1.234.567");
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
        assert_eq!(round_money(Decimal::new(-12345, 3)), Decimal::new(-1235, 2));
        assert_eq!(round_money(Decimal::new(20, 0)), Decimal::new(20, 0));
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(Decimal::new(75, 1)), "7.50");
        assert_eq!(format_rate(Decimal::ZERO), "0.00");
        assert_eq!(format_rate(Decimal::new(33333, 4)), "3.33");
    }
}
