mod builtin;
pub mod resolver;

pub use resolver::{MakeMatcher, MatchTier, TrimMatch, TrimResolver};

use crate::core::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use tracing::info;

/// Reserved key for the universal fallback trim set.
pub const FALLBACK_MAKE: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub make: String,
    pub trims: BTreeSet<String>,
}

/// On-disk shape of one catalog entry (`[{"make": "Ford", "trims": [...]}, ...]`).
#[derive(Debug, Serialize, Deserialize)]
struct RawEntry {
    make: String,
    #[serde(default)]
    trims: Vec<String>,
}

/// Make → Canadian trim names, in authoring order.
///
/// Always holds a non-empty `"Other"` entry; construction fails otherwise.
#[derive(Debug, Clone)]
pub struct TrimCatalog {
    entries: Vec<CatalogEntry>,
    fallback_index: usize,
}

impl TrimCatalog {
    pub fn builtin() -> Self {
        let entries = builtin::BUILTIN_TRIMS
            .iter()
            .map(|(make, trims)| {
                (
                    make.to_string(),
                    trims.iter().map(|t| t.to_string()).collect::<Vec<_>>(),
                )
            })
            .collect::<Vec<_>>();
        // The built-in table always carries a populated fallback entry.
        Self::from_entries(entries).unwrap_or_else(|_| Self::fallback_only())
    }

    fn fallback_only() -> Self {
        Self {
            entries: vec![CatalogEntry {
                make: FALLBACK_MAKE.to_string(),
                trims: builtin::OTHER_TRIMS.iter().map(|t| t.to_string()).collect(),
            }],
            fallback_index: 0,
        }
    }

    pub fn from_entries<I, S>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (make, trims) in entries {
            let make = make.into();
            if !seen.insert(make.clone()) {
                return Err(CatalogError::DuplicateMake(make));
            }
            let trims = trims
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect::<BTreeSet<_>>();
            out.push(CatalogEntry { make, trims });
        }

        let fallback_index = out
            .iter()
            .position(|e| e.make == FALLBACK_MAKE)
            .ok_or(CatalogError::MissingFallback)?;
        if out[fallback_index].trims.is_empty() {
            return Err(CatalogError::EmptyFallback);
        }

        Ok(Self {
            entries: out,
            fallback_index,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let raw: Vec<RawEntry> =
            serde_json::from_str(json).map_err(|e| CatalogError::Unreadable(e.to_string()))?;
        Self::from_entries(raw.into_iter().map(|e| (e.make, e.trims)))
    }

    pub fn load_from_path(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::Unreadable(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_json_str(&contents)?;
        info!(
            "Trim catalog loaded from {} ({} makes)",
            path.display(),
            catalog.entries.len()
        );
        Ok(catalog)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, make: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.make == make)
    }

    pub fn fallback(&self) -> &CatalogEntry {
        &self.entries[self.fallback_index]
    }

    /// Catalog makes excluding the fallback, in catalog order.
    pub fn makes(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.make != FALLBACK_MAKE)
            .map(|e| e.make.as_str())
    }

    /// Listing spellings for each make: the key itself plus known aliases
    /// whose target is in this catalog. Pairs are `(spelling, canonical make)`.
    pub fn make_spellings(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .makes()
            .map(|m| (m.to_string(), m.to_string()))
            .collect();
        for (alias, target) in builtin::MAKE_ALIASES {
            if self.get(target).is_some() {
                out.push((alias.to_string(), target.to_string()));
            }
        }
        out
    }
}

impl Default for TrimCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
