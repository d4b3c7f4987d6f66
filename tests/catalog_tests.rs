use std::path::Path;

use catalog360::catalog::{Catalog, ProductDialog, TabSelection};
use catalog360::format::{format_price, format_usd, is_special_price};
use catalog360::pricing::Category;

fn bundled_catalog() -> Catalog {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets").join("catalog.json");
    Catalog::load(&path).expect("bundled catalog parses")
}

#[test]
fn bundled_catalog_has_a_tab_per_category() {
    let catalog = bundled_catalog();
    let ids: Vec<_> = catalog.tabs.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["gas-residencial", "gas-industrial", "nafta"]);
    assert!(catalog.product_count() >= 6);
}

#[test]
fn clicking_a_residential_row_prices_it_at_eighty_percent() {
    let catalog = bundled_catalog();
    let entry = catalog.tab("gas-residencial").unwrap().products[0].clone();
    assert_eq!(entry.category, Category::GasResidencial);

    let mut dialog = ProductDialog::default();
    dialog.open(entry);
    let prices = dialog.prices().unwrap().as_ref().unwrap();
    assert_eq!(format_usd(prices.base.purchase), "USD 3.400");
    assert_eq!(format_usd(prices.cash.purchase), "USD 3.128");
}

#[test]
fn placeholder_prices_render_unchanged_and_highlighted() {
    let catalog = bundled_catalog();
    let labels: Vec<String> = catalog
        .tabs
        .iter()
        .flat_map(|t| &t.products)
        .filter_map(|p| p.price.as_ref())
        .map(format_price)
        .filter(|s| is_special_price(s))
        .collect();
    assert_eq!(labels, ["Consultar", "SIN STOCK"]);
}

#[test]
fn tab_switching_keeps_one_active_tab() {
    let catalog = bundled_catalog();
    let mut tabs = TabSelection::new(&catalog);
    assert_eq!(tabs.active(), Some("gas-residencial"));
    tabs.select(&catalog, "nafta");
    assert_eq!(tabs.active(), Some("nafta"));
    tabs.select(&catalog, "missing");
    assert_eq!(tabs.active(), Some("nafta"));
}

#[test]
fn missing_catalog_file_is_an_io_error() {
    let err = Catalog::load(Path::new("no/such/catalog.json")).unwrap_err();
    assert!(err.to_string().contains("no/such/catalog.json"));
}

#[test]
fn missing_product_pictures_fall_back_to_a_named_placeholder() {
    use catalog360::texture::{resolve_product_image, ProductImage};

    let catalog = bundled_catalog();
    assert!(catalog.base_dir.ends_with("assets"));

    let mut entry = catalog.tabs[0].products[0].clone();
    entry.image = Some("img/no-such-picture.jpg".into());
    let path = catalog.image_path(&entry);
    assert_eq!(
        resolve_product_image(path.as_deref(), &entry.name),
        ProductImage::Placeholder(entry.name.clone())
    );
}
