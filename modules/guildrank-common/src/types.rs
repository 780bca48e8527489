use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

/// Storefront the rankings are collected from.
pub const MARKETPLACE_ORIGIN: &str = "https://www.dmsguild.com";

/// Affiliate id appended to every product link in the dataset.
pub const AFFILIATE_ID: &str = "2038543";

/// Public product page for `product_id`, carrying the affiliate parameter.
pub fn product_url(product_id: &str) -> String {
    format!("{MARKETPLACE_ORIGIN}/product/{product_id}?affiliate_id={AFFILIATE_ID}")
}

// ---------------------------------------------------------------------------
// Extraction output
// ---------------------------------------------------------------------------

/// One ranked product as read off a capture. Position in the surrounding
/// `Vec` is its rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingEntry {
    pub product_id: String,
    pub product_name: String,
}

impl RankingEntry {
    pub fn new(product_id: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
        }
    }
}

/// Product ids of a ranking in rank order, the key used for dedup.
pub fn ranking_ids(entries: &[RankingEntry]) -> Vec<String> {
    entries.iter().map(|e| e.product_id.clone()).collect()
}

// ---------------------------------------------------------------------------
// Output dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRecord {
    pub timestamp: u64,
    #[serde(rename = "titleIds")]
    pub product_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRecord {
    pub name: String,
    pub url: String,
    #[serde(rename = "img", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// The persisted aggregate read by the visualization client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub name: String,
    pub rankings: Vec<RankingRecord>,
    pub titles: BTreeMap<String, TitleRecord>,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rankings: Vec::new(),
            titles: BTreeMap::new(),
        }
    }

    /// Merge one extracted ranking.
    ///
    /// Titles are only ever added: a product keeps the name and url it had
    /// when first seen. Repeated ids inside `entries` keep their first
    /// position. The record is inserted after any existing record with the
    /// same or an earlier timestamp so `rankings` stays sorted.
    pub fn record(&mut self, timestamp: u64, entries: &[RankingEntry]) -> &RankingRecord {
        let mut seen = HashSet::new();
        let mut product_ids = Vec::with_capacity(entries.len());

        for entry in entries {
            if !seen.insert(entry.product_id.as_str()) {
                continue;
            }
            self.titles
                .entry(entry.product_id.clone())
                .or_insert_with(|| TitleRecord {
                    name: entry.product_name.clone(),
                    url: product_url(&entry.product_id),
                    image: None,
                });
            product_ids.push(entry.product_id.clone());
        }

        let at = self.rankings.partition_point(|r| r.timestamp <= timestamp);
        self.rankings.insert(
            at,
            RankingRecord {
                timestamp,
                product_ids,
            },
        );
        &self.rankings[at]
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_compact_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
