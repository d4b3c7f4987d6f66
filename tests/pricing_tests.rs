use catalog360::pricing::{calculate_prices, Category, PricingError, ProductRecord};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn record(price: f64, category: Category) -> ProductRecord {
    ProductRecord {
        price: Some(price),
        category,
        ..Default::default()
    }
}

#[test]
fn residential_gas_ignores_bonus() {
    for bonus in [None, Some(0.0), Some(20.0), Some(55.0)] {
        let mut r = record(1000.0, Category::GasResidencial);
        r.bonus = bonus;
        let b = calculate_prices(&r).unwrap();
        assert_close(b.base.purchase, 800.0);
        assert_close(b.financed.purchase, 800.0);
    }
}

#[test]
fn industrial_gas_applies_bonus_then_cash_discount() {
    let mut r = record(1000.0, Category::GasIndustrial);
    r.bonus = Some(20.0);
    let b = calculate_prices(&r).unwrap();

    assert_close(b.base.purchase, 800.0);
    assert_close(b.cash.purchase, 736.0);
    assert_close(b.financed.purchase, 800.0);
    assert_eq!(b.cash_discount, 8.0);
}

#[test]
fn other_categories_share_the_bonus_rule() {
    let mut r = record(2000.0, Category::Other("nafta".into()));
    r.bonus = Some(15.0);
    let b = calculate_prices(&r).unwrap();
    assert_close(b.base.purchase, 1700.0);
}

#[test]
fn sale_price_adds_vat() {
    let b = calculate_prices(&record(1000.0, Category::GasResidencial)).unwrap();
    assert_eq!(b.iva_rate, 10.5);
    assert_close(b.base.sale, 884.0);
    assert_close(b.cash.sale, 736.0 * 1.105);
}

#[test]
fn profit_is_thirty_percent_of_every_variant() {
    let mut r = record(1234.0, Category::GasIndustrial);
    r.bonus = Some(7.0);
    r.iva_rate = Some(21.0);
    let b = calculate_prices(&r).unwrap();

    for v in [b.base, b.cash, b.financed] {
        assert_close(v.profit_margin, v.purchase * 0.30);
        assert_close(v.profit_percent, 30.0);
    }
}

#[test]
fn defaults_are_echoed() {
    let b = calculate_prices(&record(500.0, Category::default())).unwrap();
    assert_eq!((b.bonus, b.cash_discount, b.iva_rate), (0.0, 8.0, 10.5));
    assert_eq!(b.list_price, 500.0);
}

#[test]
fn public_price_and_vat_amount_come_from_list_price() {
    let b = calculate_prices(&record(1000.0, Category::GasResidencial)).unwrap();
    assert_close(b.public_price(), 1105.0);
    assert_close(b.iva_amount(), 105.0);
}

#[test]
fn zero_list_price_gives_non_finite_percent() {
    let b = calculate_prices(&record(0.0, Category::GasIndustrial)).unwrap();
    assert_eq!(b.base.purchase, 0.0);
    assert!(!b.base.profit_percent.is_finite());
    assert!(!b.cash.profit_percent.is_finite());
}

#[test]
fn missing_price_is_an_invalid_record() {
    let r = ProductRecord {
        category: Category::GasIndustrial,
        ..Default::default()
    };
    assert!(matches!(calculate_prices(&r), Err(PricingError::InvalidRecord(_))));
}

#[test]
fn engine_is_reentrant_across_threads() {
    let handles: Vec<_> = (1..=8)
        .map(|i| {
            std::thread::spawn(move || {
                let r = record(100.0 * i as f64, Category::GasResidencial);
                calculate_prices(&r).unwrap().base.purchase
            })
        })
        .collect();

    for (i, h) in handles.into_iter().enumerate() {
        assert_close(h.join().unwrap(), 80.0 * (i + 1) as f64);
    }
}
