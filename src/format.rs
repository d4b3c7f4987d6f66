// format.rs: price text for tables and the product dialog

use serde::{Deserialize, Serialize};

pub const CURRENCY_PREFIX: &str = "USD";
pub const NOT_APPLICABLE: &str = "N/A";

const SPECIAL_MARKERS: [&str; 3] = ["Consultar", "SIN STOCK", "Proximamente"];

/// A catalog price: either an amount or a placeholder such as "Consultar".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Label(String),
}

impl Price {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Price::Amount(v) => Some(*v),
            Price::Label(_) => None,
        }
    }
}

/// `USD 12.345`: zero decimals, '.' as thousands separator (es-AR).
pub fn format_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return NOT_APPLICABLE.to_string();
    }

    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("{CURRENCY_PREFIX} -{grouped}")
    } else {
        format!("{CURRENCY_PREFIX} {grouped}")
    }
}

/// Labels pass through untouched.
pub fn format_price(price: &Price) -> String {
    match price {
        Price::Amount(v) => format_usd(*v),
        Price::Label(s) => s.clone(),
    }
}

pub fn is_special_price(text: &str) -> bool {
    SPECIAL_MARKERS.iter().any(|m| text.contains(m))
}

/// Percent with one decimal, or N/A for a zero purchase price.
pub fn format_percent(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.1}%")
    } else {
        NOT_APPLICABLE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_with_dots() {
        assert_eq!(format_usd(0.0), "USD 0");
        assert_eq!(format_usd(999.0), "USD 999");
        assert_eq!(format_usd(1000.0), "USD 1.000");
        assert_eq!(format_usd(1234567.0), "USD 1.234.567");
    }

    #[test]
    fn rounds_to_whole_dollars() {
        assert_eq!(format_usd(883.5), "USD 884");
        assert_eq!(format_usd(735.99), "USD 736");
        assert_eq!(format_usd(-1500.2), "USD -1.500");
    }

    #[test]
    fn non_finite_is_not_applicable() {
        assert_eq!(format_usd(f64::NAN), "N/A");
        assert_eq!(format_percent(f64::NAN), "N/A");
        assert_eq!(format_percent(30.0), "30.0%");
    }

    #[test]
    fn labels_pass_through() {
        assert_eq!(format_price(&Price::Label("Consultar".into())), "Consultar");
        assert_eq!(format_price(&Price::Amount(2500.0)), "USD 2.500");
    }

    #[test]
    fn special_markers_are_detected() {
        assert!(is_special_price("Consultar"));
        assert!(is_special_price("SIN STOCK - marzo"));
        assert!(!is_special_price("USD 1.000"));
    }

    #[test]
    fn price_deserialises_from_number_or_text() {
        let a: Price = serde_json::from_str("1500").unwrap();
        let b: Price = serde_json::from_str("\"Consultar\"").unwrap();
        assert_eq!(a, Price::Amount(1500.0));
        assert_eq!(b, Price::Label("Consultar".into()));
    }
}
