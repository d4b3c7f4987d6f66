// catalog.rs: product list, category tabs and the product dialog state

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::format::Price;
use crate::pricing::{calculate_prices, Category, PriceBreakdown, PricingError, ProductRecord};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One product row, in the camelCase shape the price list publishes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogEntry {
    pub name: String,
    pub price: Option<Price>,
    pub bonus: Option<f64>,
    pub cash_discount: Option<f64>,
    pub iva_rate: Option<f64>,
    pub category: Category,

    pub power: Option<String>,
    pub voltage: Option<String>,
    pub motor: Option<String>,
    pub start: Option<String>,
    pub weight: Option<String>,
    pub image: Option<String>,
    pub dollar_type: Option<String>,
    pub fuel: Option<String>,
    pub soundproof: Option<String>,
    pub cabin: Option<String>,
    pub control_panel: Option<String>,
    pub accessories: Option<String>,
    pub warranty: Option<String>,
    pub financing: Option<String>,
}

fn or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    match value.as_deref() {
        Some(s) if !s.is_empty() => s,
        _ => default,
    }
}

impl CatalogEntry {
    pub fn pricing_record(&self) -> ProductRecord {
        ProductRecord {
            price: self.price.as_ref().and_then(Price::amount),
            bonus: self.bonus,
            cash_discount: self.cash_discount,
            iva_rate: self.iva_rate,
            category: self.category.clone(),
        }
    }

    pub fn prices(&self) -> Result<PriceBreakdown, PricingError> {
        calculate_prices(&self.pricing_record())
    }

    pub fn power(&self) -> &str {
        or_default(&self.power, "N/A")
    }
    pub fn voltage(&self) -> &str {
        or_default(&self.voltage, "N/A")
    }
    pub fn motor(&self) -> &str {
        or_default(&self.motor, "N/A")
    }
    pub fn start(&self) -> &str {
        or_default(&self.start, "N/A")
    }
    pub fn weight(&self) -> &str {
        or_default(&self.weight, "N/A")
    }
    pub fn fuel(&self) -> &str {
        or_default(&self.fuel, "N/A")
    }
    pub fn dollar_type(&self) -> &str {
        or_default(&self.dollar_type, "BNA")
    }
    pub fn soundproof(&self) -> &str {
        or_default(&self.soundproof, "No")
    }
    pub fn cabin(&self) -> &str {
        or_default(&self.cabin, "No")
    }
    pub fn control_panel(&self) -> &str {
        or_default(&self.control_panel, "No")
    }
    pub fn accessories(&self) -> &str {
        or_default(&self.accessories, "No incluye")
    }
    pub fn warranty(&self) -> &str {
        or_default(&self.warranty, "Consultar")
    }
    pub fn financing(&self) -> &str {
        or_default(&self.financing, "Consultar")
    }
}

pub fn parse_product(json: &str) -> Result<CatalogEntry, CatalogError> {
    Ok(serde_json::from_str(json)?)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogTab {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub products: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tabs: Vec<CatalogTab>,
    /// Directory product image paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Catalog {
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut catalog = Self::from_json(&text)?;
        catalog.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        log::info!(
            "catalog loaded from {}: {} tabs, {} products",
            path.display(),
            catalog.tabs.len(),
            catalog.product_count()
        );
        Ok(catalog)
    }

    pub fn tab(&self, id: &str) -> Option<&CatalogTab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    /// Location of the entry's picture; absolute paths are kept as given.
    pub fn image_path(&self, entry: &CatalogEntry) -> Option<PathBuf> {
        entry
            .image
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| self.base_dir.join(s))
    }

    pub fn product_count(&self) -> usize {
        self.tabs.iter().map(|t| t.products.len()).sum()
    }
}

/// Exactly one active tab at a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabSelection {
    active: Option<String>,
}

impl TabSelection {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            active: catalog.tabs.first().map(|t| t.id.clone()),
        }
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Unknown ids leave the current tab active.
    pub fn select(&mut self, catalog: &Catalog, id: &str) -> bool {
        if catalog.tab(id).is_none() {
            return false;
        }
        self.active = Some(id.to_string());
        true
    }

    pub fn active_tab<'a>(&self, catalog: &'a Catalog) -> Option<&'a CatalogTab> {
        self.active.as_deref().and_then(|id| catalog.tab(id))
    }
}

/// Detail dialog for the clicked product row.
#[derive(Debug, Clone, Default)]
pub struct ProductDialog {
    current: Option<(CatalogEntry, Result<PriceBreakdown, PricingError>)>,
}

impl ProductDialog {
    pub fn open(&mut self, entry: CatalogEntry) {
        let prices = entry.prices();
        if let Err(e) = &prices {
            log::warn!("{}: {e}", entry.name);
        }
        self.current = Some((entry, prices));
    }

    /// Opens from a raw product JSON string. Malformed data leaves the dialog
    /// untouched.
    pub fn open_json(&mut self, json: &str) -> Result<(), CatalogError> {
        match parse_product(json) {
            Ok(entry) => {
                self.open(entry);
                Ok(())
            }
            Err(e) => {
                log::error!("cannot parse product data: {e}");
                Err(e)
            }
        }
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn entry(&self) -> Option<&CatalogEntry> {
        self.current.as_ref().map(|(e, _)| e)
    }

    pub fn prices(&self) -> Option<&Result<PriceBreakdown, PricingError>> {
        self.current.as_ref().map(|(_, p)| p)
    }
}
