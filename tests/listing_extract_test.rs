use vehicle_scout::catalog::TrimCatalog;
use vehicle_scout::{extract, extract_with_trace, ListingExtractor};

const DEALER_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en-CA">
<head>
  <title>Used 2019 Honda Civic LX for sale in Mississauga | Maple Motors</title>
  <style>.price{color:#c00}</style>
  <script>window.dataLayer = [{"vin": "JUNKJUNKJUNKJUNK1"}];</script>
</head>
<body>
  <nav>Inventory | Financing | Contact</nav>
  <h1>2019 Honda Civic LX</h1>
  <div class="price">
    <span class="label">Sale price</span> <span>$24,995</span>
    <span class="payment">$139 bi-weekly</span>
  </div>
  <ul class="specs">
    <li>Kilometres: 45,000 km</li>
    <li>Stock #: 24-1032</li>
    <li>VIN: 2HGFC2F59KH512345</li>
    <li>Exterior Colour: Crystal Black Pearl</li>
    <li>Interior Colour: Grey</li>
  </ul>
  <section class="similar">
    <h2>Similar vehicles</h2>
    <p>2017 Toyota Corolla CE - $16,495 - 88,000 km</p>
  </section>
</body>
</html>"#;

#[test]
fn dealer_page_yields_primary_vehicle() {
    let l = extract(DEALER_PAGE);
    assert_eq!(l.year, Some(2019));
    assert_eq!(l.make.as_deref(), Some("Honda"));
    assert_eq!(l.model.as_deref(), Some("Civic"));
    assert_eq!(l.vin.as_deref(), Some("2HGFC2F59KH512345"));
    assert_eq!(l.price, Some(24_995));
    assert_eq!(l.kilometers, Some(45_000));
    assert_eq!(l.stock_number.as_deref(), Some("24-1032"));
    assert_eq!(l.color.as_deref(), Some("Black"));
}

#[test]
fn trace_keeps_secondary_candidates() {
    let trace = extract_with_trace(DEALER_PAGE);
    assert!(trace.matches.price.len() >= 2);
    assert!(trace.matches.kilometers.iter().any(|m| m.contains("88,000")));
    assert!(trace.matches.year.contains(&"2017".to_string()));
    assert!(trace.matches.structured_data.is_empty());
}

#[test]
fn empty_and_garbage_input_yield_empty_listing() {
    assert!(extract("").is_empty());
    assert!(extract("<<<>>> \u{0} </div></div>").is_empty());
    assert!(extract("<p>Call today for our best deals!</p>").is_empty());
}

#[test]
fn french_canadian_listing() {
    let html = r#"<h1>2021 Toyota RAV4 LE AWD</h1>
        <p>Prix : 31 450 $</p>
        <p>Kilométrage : 28 300 km</p>
        <p>Couleur : Blanc</p>"#;
    let l = extract(html);
    assert_eq!(l.year, Some(2021));
    assert_eq!(l.make.as_deref(), Some("Toyota"));
    assert_eq!(l.model.as_deref(), Some("RAV4"));
    assert_eq!(l.price, Some(31_450));
    assert_eq!(l.kilometers, Some(28_300));
}

#[test]
fn vin_in_data_attribute_is_found() {
    let html = r#"<div class="vehicle" data-vin="1FTEW1EP5KFA12345">
        <h2>2019 Ford F-150 XLT</h2><p>CA$38,900</p></div>"#;
    let l = extract(html);
    assert_eq!(l.vin.as_deref(), Some("1FTEW1EP5KFA12345"));
    assert_eq!(l.make.as_deref(), Some("Ford"));
    assert_eq!(l.model.as_deref(), Some("F-150"));
    assert_eq!(l.price, Some(38_900));
}

#[test]
fn json_ld_fills_what_text_misses() {
    let html = r#"<html><head><script type="application/ld+json">
        {"@context": "https://schema.org", "@type": "Car",
         "vehicleIdentificationNumber": "5YJ3E1EA7KF317000",
         "brand": {"@type": "Brand", "name": "Tesla"},
         "model": "Model 3",
         "vehicleModelDate": "2019",
         "mileageFromOdometer": {"@type": "QuantitativeValue", "value": 52000, "unitCode": "KMT"},
         "offers": {"@type": "Offer", "price": 38500, "priceCurrency": "CAD"}}
        </script></head><body><p>Contact our EV specialists.</p></body></html>"#;
    let trace = extract_with_trace(html);
    let l = &trace.listing;
    assert_eq!(l.vin.as_deref(), Some("5YJ3E1EA7KF317000"));
    assert_eq!(l.make.as_deref(), Some("Tesla"));
    assert_eq!(l.model.as_deref(), Some("Model 3"));
    assert_eq!(l.year, Some(2019));
    assert_eq!(l.kilometers, Some(52_000));
    assert_eq!(l.price, Some(38_500));
    assert_eq!(trace.matches.structured_data, vec!["Car"]);
}

#[test]
fn custom_catalog_limits_recognized_makes() {
    let catalog = TrimCatalog::from_json_str(
        r#"[{"make": "Lada", "trims": ["Niva"]}, {"make": "Other", "trims": ["Base"]}]"#,
    )
    .unwrap();
    let extractor = ListingExtractor::new(&catalog);

    let l = extractor.extract("<h1>1987 Lada Niva 4x4</h1>");
    assert_eq!(l.make.as_deref(), Some("Lada"));
    assert_eq!(l.model.as_deref(), Some("Niva"));

    let l = extractor.extract("<h1>2019 Honda Civic</h1>");
    assert_eq!(l.make, None);
    assert_eq!(l.year, Some(2019));
}

#[test]
fn deeply_nested_markup_is_walked_without_recursion() {
    // Warm the shared extractor on the main thread.
    extract("<p>warm-up</p>");

    let depth = 8_000;
    let html = format!(
        "{}<p>VIN: 1HGCM82633A004352</p>{}",
        "<div>".repeat(depth),
        "</div>".repeat(depth)
    );
    let listing = std::thread::Builder::new()
        .stack_size(512 * 1024)
        .spawn(move || extract(&html))
        .unwrap()
        .join()
        .unwrap();
    assert_eq!(listing.vin.as_deref(), Some("1HGCM82633A004352"));
}

#[test]
fn price_survives_dealer_names_after_it() {
    let l = extract("<h1>2019 Honda Civic</h1><p>$24,995 Downtown Honda</p>");
    assert_eq!(l.price, Some(24_995));

    let l = extract("<p>$21,400 Bwood Motors</p>");
    assert_eq!(l.price, Some(21_400));
}
