use super::{CatalogEntry, TrimCatalog};
use crate::core::types::TrimResolution;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// A single make-matching tier. Returns the matched catalog entry, if any.
pub type MakeMatcher = for<'c> fn(&'c TrimCatalog, &str) -> Option<&'c CatalogEntry>;

#[derive(Clone, Copy)]
pub struct MatchTier {
    pub name: &'static str,
    pub matcher: MakeMatcher,
}

impl std::fmt::Debug for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchTier").field("name", &self.name).finish()
    }
}

pub const FALLBACK_TIER: &str = "fallback";

fn exact<'c>(catalog: &'c TrimCatalog, make: &str) -> Option<&'c CatalogEntry> {
    catalog.get(make)
}

fn case_insensitive<'c>(catalog: &'c TrimCatalog, make: &str) -> Option<&'c CatalogEntry> {
    let wanted = make.to_lowercase();
    catalog
        .entries()
        .iter()
        .find(|e| e.make.to_lowercase() == wanted)
}

/// First catalog key (in catalog order) contained in `make`. Not the longest.
fn substring<'c>(catalog: &'c TrimCatalog, make: &str) -> Option<&'c CatalogEntry> {
    let haystack = make.to_lowercase();
    catalog
        .entries()
        .iter()
        .filter(|e| e.make != super::FALLBACK_MAKE)
        .find(|e| haystack.contains(&e.make.to_lowercase()))
}

pub const DEFAULT_TIERS: [MatchTier; 3] = [
    MatchTier {
        name: "exact",
        matcher: exact,
    },
    MatchTier {
        name: "case_insensitive",
        matcher: case_insensitive,
    },
    MatchTier {
        name: "substring",
        matcher: substring,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimMatch {
    pub tier: &'static str,
    pub catalog_key: String,
    /// Sorted, deduplicated, never empty.
    pub trims: Vec<String>,
}

/// Resolves a free-form make string to a Canadian trim set.
///
/// Tiers run in order and the first hit wins; when none hit (or the make is
/// blank) the catalog's `"Other"` entry is returned.
#[derive(Debug, Clone)]
pub struct TrimResolver {
    catalog: Arc<TrimCatalog>,
    tiers: Vec<MatchTier>,
}

impl TrimResolver {
    pub fn new(catalog: Arc<TrimCatalog>) -> Self {
        Self {
            catalog,
            tiers: DEFAULT_TIERS.to_vec(),
        }
    }

    /// Append a tier. It runs after the existing tiers and before the fallback.
    pub fn with_tier(mut self, tier: MatchTier) -> Self {
        self.tiers.push(tier);
        self
    }

    pub fn catalog(&self) -> &Arc<TrimCatalog> {
        &self.catalog
    }

    pub fn tier_names(&self) -> Vec<&'static str> {
        self.tiers.iter().map(|t| t.name).collect()
    }

    pub fn resolve(&self, make: &str) -> Vec<String> {
        self.resolve_detailed(make).trims
    }

    pub fn resolve_detailed(&self, make: &str) -> TrimMatch {
        let make = make.trim();
        if !make.is_empty() {
            for tier in &self.tiers {
                if let Some(entry) = (tier.matcher)(&self.catalog, make) {
                    if entry.trims.is_empty() {
                        continue;
                    }
                    debug!("make '{}' matched '{}' via {}", make, entry.make, tier.name);
                    return Self::to_match(tier.name, entry);
                }
            }
        }
        Self::to_match(FALLBACK_TIER, self.catalog.fallback())
    }

    pub fn resolution(&self, make: &str) -> TrimResolution {
        let m = self.resolve_detailed(make);
        TrimResolution {
            make: make.to_string(),
            tier: m.tier.to_string(),
            catalog_key: m.catalog_key,
            trims: m.trims,
        }
    }

    fn to_match(tier: &'static str, entry: &CatalogEntry) -> TrimMatch {
        // BTreeSet iteration is already sorted and unique.
        TrimMatch {
            tier,
            catalog_key: entry.make.clone(),
            trims: entry.trims.iter().cloned().collect(),
        }
    }
}

impl Default for TrimResolver {
    fn default() -> Self {
        Self::new(Arc::new(TrimCatalog::builtin()))
    }
}

/// Resolve against the built-in catalog.
pub fn resolve_trims(make: &str) -> Vec<String> {
    static BUILTIN: OnceLock<TrimResolver> = OnceLock::new();
    BUILTIN.get_or_init(TrimResolver::default).resolve(make)
}
