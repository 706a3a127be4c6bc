//! Vehicle fields from arbitrary dealer and marketplace listing pages.
//!
//! Extraction is a pure function of the HTML: independent detectors run over
//! the visible text, JSON-LD fills whatever they leave absent, and nothing
//! here ever fails. An all-absent listing means nothing was recognized.

pub mod detectors;
pub mod jsonld;
pub mod text;

use crate::catalog::TrimCatalog;
use crate::core::types::{DetectorMatches, ExtractResponse, ExtractedListing};
use chrono::Datelike;
use detectors::{MakeDetector, MAX_PLAUSIBLE_KILOMETERS, MAX_PLAUSIBLE_PRICE, MIN_PLAUSIBLE_PRICE};
use scraper::Html;
use std::ops::RangeInclusive;
use std::sync::OnceLock;
use tracing::debug;

pub const EARLIEST_MODEL_YEAR: u16 = 1950;

/// 1950 through next year's models.
pub fn default_year_range() -> RangeInclusive<u16> {
    let next = u16::try_from(chrono::Utc::now().year() + 1).unwrap_or(u16::MAX);
    EARLIEST_MODEL_YEAR..=next
}

#[derive(Debug, Clone)]
pub struct ListingExtractor {
    makes: MakeDetector,
    /// `None` tracks the calendar: 1950 through next year as of each call.
    years: Option<RangeInclusive<u16>>,
}

impl Default for ListingExtractor {
    fn default() -> Self {
        Self::new(&TrimCatalog::builtin())
    }
}

impl ListingExtractor {
    /// Recognizes the catalog's makes and their common aliases.
    pub fn new(catalog: &TrimCatalog) -> Self {
        Self {
            makes: MakeDetector::new(&catalog.make_spellings()),
            years: None,
        }
    }

    pub fn with_year_range(mut self, years: RangeInclusive<u16>) -> Self {
        self.years = Some(years);
        self
    }

    fn year_range(&self) -> RangeInclusive<u16> {
        self.years.clone().unwrap_or_else(default_year_range)
    }

    /// Catalog key for a make spelling (`BMW`, `bmw`, `Chevy`), if known.
    pub fn canonical_make(&self, make: &str) -> Option<String> {
        self.makes.canonical_make(make)
    }

    pub fn extract(&self, html: &str) -> ExtractedListing {
        self.extract_with_trace(html).listing
    }

    /// The listing plus every detector's raw candidates, for diagnostics.
    pub fn extract_with_trace(&self, html: &str) -> ExtractResponse {
        if html.trim().is_empty() {
            return ExtractResponse {
                listing: ExtractedListing::default(),
                matches: DetectorMatches::default(),
            };
        }

        let document = Html::parse_document(html);
        let text = text::visible_text(html);
        let years = self.year_range();

        let vin = detectors::detect_vin(&text, html);
        let year = detectors::detect_year(&text, &years);
        let make_model = self.makes.detect(&text);
        let price = detectors::detect_price(&text);
        let kilometers = detectors::detect_kilometers(&text);
        let stock = detectors::detect_stock_number(&text);
        let color = detectors::detect_color(&text);

        let (make, model) = match make_model.value {
            Some((make, model)) => (Some(make), model),
            None => (None, None),
        };

        let mut listing = ExtractedListing {
            year: year.value,
            make,
            model,
            vin: vin.value,
            price: price.value,
            kilometers: kilometers.value,
            stock_number: stock.value,
            color: color.value,
        };

        let structured = jsonld::structured_vehicle(&document);
        let from_text = listing.field_count();
        self.fill_from_structured(&mut listing, structured.listing, &years);
        if listing.field_count() > from_text {
            debug!(
                "JSON-LD filled {} field(s) from {:?}",
                listing.field_count() - from_text,
                structured.types
            );
        }

        ExtractResponse {
            listing,
            matches: DetectorMatches {
                vin: vin.raw,
                year: year.raw,
                make_model: make_model.raw,
                price: price.raw,
                kilometers: kilometers.raw,
                stock_number: stock.raw,
                color: color.raw,
                structured_data: structured.types,
            },
        }
    }

    /// Only absent fields are filled, and only with plausible values.
    fn fill_from_structured(
        &self,
        listing: &mut ExtractedListing,
        found: ExtractedListing,
        years: &RangeInclusive<u16>,
    ) {
        if listing.vin.is_none() {
            listing.vin = found.vin;
        }
        if listing.year.is_none() {
            listing.year = found.year.filter(|y| years.contains(y));
        }
        if listing.make.is_none() {
            listing.make = found
                .make
                .map(|m| self.makes.canonical_make(&m).unwrap_or(m));
        }
        if listing.model.is_none() {
            listing.model = found.model;
        }
        if listing.price.is_none() {
            listing.price = found
                .price
                .filter(|p| (MIN_PLAUSIBLE_PRICE..=MAX_PLAUSIBLE_PRICE).contains(p));
        }
        if listing.kilometers.is_none() {
            listing.kilometers = found.kilometers.filter(|k| *k < MAX_PLAUSIBLE_KILOMETERS);
        }
        if listing.stock_number.is_none() {
            listing.stock_number = found.stock_number;
        }
        if listing.color.is_none() {
            listing.color = found.color;
        }
    }
}

fn default_extractor() -> &'static ListingExtractor {
    static EXTRACTOR: OnceLock<ListingExtractor> = OnceLock::new();
    EXTRACTOR.get_or_init(ListingExtractor::default)
}

/// Extract with the built-in catalog's makes.
pub fn extract(html: &str) -> ExtractedListing {
    default_extractor().extract(html)
}

pub fn extract_with_trace(html: &str) -> ExtractResponse {
    default_extractor().extract_with_trace(html)
}
