//! Independent field detectors over flattened listing text.
//!
//! Every detector scans the whole text, records raw candidates in document
//! order, and keeps the first plausible one.

use regex::{Captures, Regex};
use std::ops::RangeInclusive;
use std::sync::OnceLock;

/// Raw candidates kept per detector for diagnostics.
pub const MAX_RAW_MATCHES: usize = 10;

pub const MIN_PLAUSIBLE_PRICE: u64 = 500;
pub const MAX_PLAUSIBLE_PRICE: u64 = 10_000_000;
pub const MAX_PLAUSIBLE_KILOMETERS: u64 = 2_000_000;

/// Canonical spelling for every recognized color word.
const COLOR_WORDS: &[(&str, &str)] = &[
    ("black", "Black"),
    ("white", "White"),
    ("silver", "Silver"),
    ("grey", "Grey"),
    ("gray", "Grey"),
    ("red", "Red"),
    ("blue", "Blue"),
    ("green", "Green"),
    ("brown", "Brown"),
    ("beige", "Beige"),
    ("gold", "Gold"),
    ("orange", "Orange"),
    ("yellow", "Yellow"),
    ("purple", "Purple"),
    ("maroon", "Maroon"),
    ("burgundy", "Burgundy"),
    ("tan", "Tan"),
    ("bronze", "Bronze"),
    ("charcoal", "Charcoal"),
];

/// Text right before a price that marks it as a discount.
const DISCOUNT_MARKERS: &[&str] = &["save", "rebate", "discount", "savings", "off msrp"];

/// Text right after a distance that marks it as a dealer distance.
const DISTANCE_MARKERS: &[&str] = &["away", "from"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection<T> {
    pub value: Option<T>,
    pub raw: Vec<String>,
}

impl<T> Default for Detection<T> {
    fn default() -> Self {
        Self {
            value: None,
            raw: Vec::new(),
        }
    }
}

impl<T> Detection<T> {
    fn record(&mut self, raw: &str) {
        if self.raw.len() < MAX_RAW_MATCHES {
            self.raw.push(raw.to_string());
        }
    }

    fn offer(&mut self, value: Option<T>) {
        if self.value.is_none() {
            self.value = value;
        }
    }
}

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("detector pattern compiles"))
}

fn vin_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // ASCII-only case folding: `(?i)` alone would admit the Kelvin sign and long s.
    compiled(&RE, r"(?i-u)\b[A-HJ-NPR-Z0-9]{17}\b")
}

fn labelled_vin_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(
        &RE,
        r#"(?i-u)(?:vin|vehicleIdentificationNumber)["'\s:=>]+([A-HJ-NPR-Z0-9]{17})\b"#,
    )
}

/// Text right after a price that marks it as a payment, not a sticker price.
/// Whole words only: `$24,995 Downtown Honda` is a sticker price.
fn payment_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(
        &RE,
        r"^(?:/|per\b|bi-?weekly\b|weekly\b|monthly\b|a month\b|down\b|b/w\b|bw\b)",
    )
}

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(&RE, r"\b(19\d{2}|20\d{2})\b")
}

fn price_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(
        &RE,
        r"(?i)(?:(?:\bCA?\$|\bCAD\s?|\$)\s?(?P<pre>\d{1,3}(?:,\d{3})+|\d+)(?:\.(?P<pre_cents>\d{1,2}))?)|(?:\b(?P<suf>\d{1,3}(?: \d{3})+|\d+)(?:,(?P<suf_cents>\d{2}))?\s?\$)",
    )
}

fn kilometers_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(
        &RE,
        r"(?i)\b(?:(?P<unit>\d{1,3}(?:[,. ]\d{3})+|\d+)\s?(?:kms?|kilometers|kilometres|kilomètres)\b|(?:kilometers|kilometres|kilometrage|odometer|mileage)\s*[:\-]?\s*(?P<label>\d{1,3}(?:[,. ]\d{3})+|\d+))",
    )
}

fn stock_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(
        &RE,
        r"(?i)\b(?:stock|stk)\s*(?:(?:#|no\.?|number|num\.?)\s*:?|:)\s*([A-Z0-9][A-Z0-9\-]{1,19})",
    )
}

fn labelled_color_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(
        &RE,
        r"(?i)\b(?:exterior\s+colou?r|ext\.?\s+colou?r|colou?r)\s*:\s*([A-Za-z][A-Za-z \-]{0,40})",
    )
}

fn color_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    compiled(
        &RE,
        r"(?i)\b(black|white|silver|grey|gray|red|blue|green|brown|beige|gold|orange|yellow|purple|maroon|burgundy|tan|bronze|charcoal)\b",
    )
}

/// Digits-only integer from a token that may carry `,` `.` or space separators.
fn parse_grouped(token: &str) -> Option<u64> {
    let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn following(text: &str, end: usize, chars: usize) -> String {
    text[end..]
        .chars()
        .take(chars)
        .collect::<String>()
        .trim_start()
        .to_lowercase()
}

fn preceding(text: &str, start: usize, chars: usize) -> String {
    let before: Vec<char> = text[..start].chars().collect();
    let from = before.len().saturating_sub(chars);
    before[from..]
        .iter()
        .collect::<String>()
        .trim_end()
        .to_lowercase()
}

pub fn canonical_color(word: &str) -> Option<&'static str> {
    let lower = word.to_lowercase();
    COLOR_WORDS
        .iter()
        .find(|(w, _)| *w == lower)
        .map(|(_, canonical)| *canonical)
}

fn is_vin_shaped(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit()) && token.chars().any(|c| c.is_ascii_alphabetic())
}

/// 17-character VIN token. Falls back to labelled tokens in `markup`
/// (attributes, hidden inputs) when the visible text has none.
pub fn detect_vin(text: &str, markup: &str) -> Detection<String> {
    let mut d = Detection::default();
    for m in vin_re().find_iter(text) {
        d.record(m.as_str());
        if is_vin_shaped(m.as_str()) {
            d.offer(Some(m.as_str().to_uppercase()));
        }
    }
    if d.value.is_none() {
        for caps in labelled_vin_re().captures_iter(markup) {
            let token = &caps[1];
            d.record(token);
            if is_vin_shaped(token) {
                d.offer(Some(token.to_uppercase()));
            }
        }
    }
    d
}

pub fn detect_year(text: &str, range: &RangeInclusive<u16>) -> Detection<u16> {
    let mut d = Detection::default();
    for caps in year_re().captures_iter(text) {
        let token = &caps[1];
        d.record(token);
        let year = token.parse::<u16>().ok().filter(|y| range.contains(y));
        d.offer(year);
    }
    d
}

/// `2019 $24,995`: a bare number directly before a prefixed price is not a
/// suffix-style price.
fn swallows_prefixed_price(text: &str, caps: &Captures) -> bool {
    match (caps.name("suf"), caps.get(0)) {
        (Some(_), Some(whole)) => following(text, whole.end(), 3).starts_with(|c: char| c.is_ascii_digit()),
        _ => false,
    }
}

fn price_candidate(text: &str, caps: &Captures) -> Option<u64> {
    let whole = caps.get(0)?;
    let (amount, cents) = match caps.name("pre") {
        Some(pre) => (pre.as_str(), caps.name("pre_cents")),
        None => (caps.name("suf")?.as_str(), caps.name("suf_cents")),
    };

    let mut dollars = parse_grouped(amount)?;
    if let Some(cents) = cents {
        let cents: u64 = cents.as_str().parse().ok()?;
        if cents >= 50 {
            dollars += 1;
        }
    }

    let after = following(text, whole.end(), 16);
    if payment_marker_re().is_match(&after) {
        return None;
    }
    let before = preceding(text, whole.start(), 16);
    if DISCOUNT_MARKERS.iter().any(|m| before.ends_with(m)) {
        return None;
    }

    (MIN_PLAUSIBLE_PRICE..=MAX_PLAUSIBLE_PRICE)
        .contains(&dollars)
        .then_some(dollars)
}

pub fn detect_price(text: &str) -> Detection<u64> {
    let mut d = Detection::default();
    let mut pos = 0;
    while let Some(caps) = price_re().captures_at(text, pos) {
        let Some(whole) = caps.get(0) else { break };
        if swallows_prefixed_price(text, &caps) {
            // Rescan from the currency sign so the prefixed price is seen.
            pos = caps.name("suf").map(|m| m.end()).unwrap_or(whole.end());
            continue;
        }
        d.record(whole.as_str().trim());
        d.offer(price_candidate(text, &caps));
        pos = whole.end();
    }
    d
}

fn kilometers_candidate(text: &str, caps: &Captures) -> Option<u64> {
    let whole = caps.get(0)?;
    let after = following(text, whole.end(), 12);
    let value = if let Some(unit) = caps.name("unit") {
        if DISTANCE_MARKERS.iter().any(|m| after.starts_with(m)) {
            return None;
        }
        parse_grouped(unit.as_str())?
    } else {
        // `Mileage: 30,000 miles` is not kilometres.
        if after.starts_with("mi") {
            return None;
        }
        parse_grouped(caps.name("label")?.as_str())?
    };
    (value < MAX_PLAUSIBLE_KILOMETERS).then_some(value)
}

/// Space-grouped number that ran into a preceding token (`$24,995 145,000 km`).
/// Returns where to resume scanning.
fn overlong_group_restart(text: &str, caps: &Captures) -> Option<usize> {
    let number = caps.name("unit").or_else(|| caps.name("label"))?;
    let space = number.as_str().find(' ')?;
    let value = parse_grouped(number.as_str())?;
    (value >= MAX_PLAUSIBLE_KILOMETERS && text.is_char_boundary(number.start() + space))
        .then_some(number.start() + space)
}

pub fn detect_kilometers(text: &str) -> Detection<u64> {
    let mut d = Detection::default();
    let mut pos = 0;
    while let Some(caps) = kilometers_re().captures_at(text, pos) {
        let Some(whole) = caps.get(0) else { break };
        if let Some(restart) = overlong_group_restart(text, &caps) {
            pos = restart;
            continue;
        }
        d.record(whole.as_str());
        d.offer(kilometers_candidate(text, &caps));
        pos = whole.end();
    }
    d
}

pub fn detect_stock_number(text: &str) -> Detection<String> {
    let mut d = Detection::default();
    for caps in stock_re().captures_iter(text) {
        let token = caps[1].trim_end_matches('-');
        d.record(token);
        if token.chars().any(|c| c.is_ascii_digit()) {
            d.offer(Some(token.to_string()));
        }
    }
    d
}

/// Labelled exterior colour first, then the first bare color word.
pub fn detect_color(text: &str) -> Detection<String> {
    let mut d = Detection::default();

    // A label's value can run into the next label, so each scan resumes at
    // the start of the previous value.
    let mut pos = 0;
    while let Some(caps) = labelled_color_re().captures_at(text, pos) {
        let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else { break };
        pos = value.start();
        if preceding(text, whole.start(), 10).ends_with("interior") {
            continue;
        }
        d.record(whole.as_str().trim());
        if let Some(word) = color_word_re().find(value.as_str()) {
            d.offer(canonical_color(word.as_str()).map(str::to_string));
        }
        if d.value.is_some() {
            break;
        }
    }

    if d.value.is_none() {
        for m in color_word_re().find_iter(text) {
            d.record(m.as_str());
            d.offer(canonical_color(m.as_str()).map(str::to_string));
        }
    }
    d
}

/// Make and model detection over a catalog's spellings.
#[derive(Debug, Clone)]
pub struct MakeDetector {
    /// `YEAR MAKE MODEL` phrases.
    phrase: Option<Regex>,
    /// Bare make mentions.
    mention: Option<Regex>,
    /// Lower-cased spelling → canonical make.
    canonical: Vec<(String, String)>,
}

impl MakeDetector {
    /// `spellings` are `(spelling, canonical make)` pairs.
    pub fn new(spellings: &[(String, String)]) -> Self {
        let mut ordered: Vec<&(String, String)> = spellings.iter().collect();
        // Longest first so "Mercedes-Benz" wins over "Mercedes" at the same offset.
        ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let alternation = ordered
            .iter()
            .map(|(spelling, _)| regex::escape(spelling).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");

        let (phrase, mention) = if alternation.is_empty() {
            (None, None)
        } else {
            (
                Regex::new(&format!(
                    r"(?i)\b(?:19|20)\d{{2}}\s+(?P<make>{})\s+(?P<model>[A-Za-z0-9][A-Za-z0-9\-]*)",
                    alternation
                ))
                .ok(),
                Regex::new(&format!(r"(?i)\b(?P<make>{})\b", alternation)).ok(),
            )
        };

        Self {
            phrase,
            mention,
            canonical: spellings
                .iter()
                .map(|(s, c)| (s.to_lowercase(), c.clone()))
                .collect(),
        }
    }

    /// Canonical catalog make for a spelling, ignoring case and spacing.
    pub fn canonical_make(&self, matched: &str) -> Option<String> {
        let wanted = matched.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        self.canonical
            .iter()
            .find(|(spelling, _)| *spelling == wanted)
            .map(|(_, canonical)| canonical.clone())
    }

    /// `(make, model)`. Model is only known from a `YEAR MAKE MODEL` phrase.
    pub fn detect(&self, text: &str) -> Detection<(String, Option<String>)> {
        let mut d = Detection::default();

        if let Some(phrase) = &self.phrase {
            for caps in phrase.captures_iter(text) {
                d.record(&caps[0]);
                let make = caps.name("make").and_then(|m| self.canonical_make(m.as_str()));
                let model = caps.name("model").map(|m| m.as_str().to_string());
                d.offer(make.map(|make| (make, model)));
            }
        }

        if d.value.is_none() {
            if let Some(mention) = &self.mention {
                for caps in mention.captures_iter(text) {
                    d.record(&caps[0]);
                    let make = caps.name("make").and_then(|m| self.canonical_make(m.as_str()));
                    d.offer(make.map(|make| (make, None)));
                }
            }
        }
        d
    }
}
