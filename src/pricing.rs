// pricing.rs: purchase / sale / margin breakdown for a catalog product

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BONUS: f64 = 0.0;
pub const DEFAULT_CASH_DISCOUNT: f64 = 8.0;
pub const DEFAULT_IVA_RATE: f64 = 10.5;

/// Fixed share of the purchase price reported as profit.
pub const PROFIT_RATE: f64 = 0.30;

/// Residential gas units are bought at a flat 80% of list, whatever the bonus.
pub const RESIDENTIAL_GAS_FACTOR: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    GasResidencial,
    GasIndustrial,
    Other(String),
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.as_str() {
            "gas-residencial" => Category::GasResidencial,
            "gas-industrial" => Category::GasIndustrial,
            _ => Category::Other(s),
        }
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.as_str().to_string()
    }
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::GasResidencial => "gas-residencial",
            Category::GasIndustrial => "gas-industrial",
            Category::Other(s) => s,
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other(String::new())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductRecord {
    pub price: Option<f64>,
    pub bonus: Option<f64>,
    pub cash_discount: Option<f64>,
    pub iva_rate: Option<f64>,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceVariant {
    pub purchase: f64,
    pub sale: f64,
    pub profit_margin: f64,
    /// Non-finite when `purchase` is zero.
    pub profit_percent: f64,
}

impl PriceVariant {
    fn from_purchase(purchase: f64, iva_rate: f64) -> Self {
        let profit_margin = purchase * PROFIT_RATE;
        Self {
            purchase,
            sale: purchase * (1.0 + iva_rate / 100.0),
            profit_margin,
            profit_percent: (profit_margin / purchase) * 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBreakdown {
    pub list_price: f64,
    pub base: PriceVariant,
    pub cash: PriceVariant,
    pub financed: PriceVariant,
    pub bonus: f64,
    pub cash_discount: f64,
    pub iva_rate: f64,
}

impl PriceBreakdown {
    /// Public sale price: list plus VAT.
    pub fn public_price(&self) -> f64 {
        self.list_price * (1.0 + self.iva_rate / 100.0)
    }

    pub fn iva_amount(&self) -> f64 {
        self.list_price * (self.iva_rate / 100.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PricingError {
    #[error("invalid product record: {0}")]
    InvalidRecord(String),
}

pub fn calculate_prices(record: &ProductRecord) -> Result<PriceBreakdown, PricingError> {
    let list_price = match record.price {
        Some(p) if p.is_finite() => p,
        Some(p) => return Err(PricingError::InvalidRecord(format!("price is not a number ({p})"))),
        None => return Err(PricingError::InvalidRecord("price is missing".into())),
    };

    let bonus = record.bonus.unwrap_or(DEFAULT_BONUS);
    let cash_discount = record.cash_discount.unwrap_or(DEFAULT_CASH_DISCOUNT);
    let iva_rate = record.iva_rate.unwrap_or(DEFAULT_IVA_RATE);

    let purchase = match record.category {
        Category::GasResidencial => list_price * RESIDENTIAL_GAS_FACTOR,
        Category::GasIndustrial | Category::Other(_) => list_price * (1.0 - bonus / 100.0),
    };
    let purchase_cash = purchase * (1.0 - cash_discount / 100.0);

    Ok(PriceBreakdown {
        list_price,
        base: PriceVariant::from_purchase(purchase, iva_rate),
        cash: PriceVariant::from_purchase(purchase_cash, iva_rate),
        financed: PriceVariant::from_purchase(purchase, iva_rate),
        bonus,
        cash_discount,
        iva_rate,
    })
}
