use serde::Deserialize;

use guildrank_common::RankingEntry;

use super::RankingExtractor;
use crate::error::{ArchiveError, Result};

#[derive(Debug, Deserialize)]
struct ProductListing {
    results: Vec<ListedProduct>,
}

#[derive(Debug, Deserialize)]
struct ListedProduct {
    products_id: ProductId,
    products_name: String,
}

/// The listing API has served ids both as strings and as numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProductId {
    Text(String),
    Number(u64),
}

impl ProductId {
    fn into_string(self) -> String {
        match self {
            ProductId::Text(s) => s,
            ProductId::Number(n) => n.to_string(),
        }
    }
}

/// Reads the `hottest_filtered` listing API: `{ "results": [ { "products_id",
/// "products_name", ... } ] }` in rank order.
///
/// Anything that is not JSON of that shape is an error. Blank content (a
/// cached "nothing usable" entry) is an empty ranking.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredApiExtractor;

impl RankingExtractor for StructuredApiExtractor {
    fn extract(&self, content: &str) -> Result<Vec<RankingEntry>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let listing: ProductListing = serde_json::from_str(content)
            .map_err(|e| ArchiveError::Parse(format!("product listing: {e}")))?;

        Ok(listing
            .results
            .into_iter()
            .map(|p| RankingEntry {
                product_id: p.products_id.into_string(),
                product_name: p.products_name,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_results_in_array_order() {
        let json = r#"{"results":[
            {"products_id":"111","products_name":"A","price":"1.00"},
            {"products_id":222,"products_name":"B"}
        ],"total":2}"#;
        let entries = StructuredApiExtractor.extract(json).unwrap();
        assert_eq!(
            entries,
            vec![RankingEntry::new("111", "A"), RankingEntry::new("222", "B")]
        );
    }

    #[test]
    fn empty_results_is_empty_ranking() {
        let entries = StructuredApiExtractor.extract(r#"{"results":[]}"#).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn blank_content_is_empty_ranking() {
        assert!(StructuredApiExtractor.extract("  \n").unwrap().is_empty());
    }

    #[test]
    fn html_is_an_error() {
        let err = StructuredApiExtractor
            .extract("<html><body>Wayback Machine</body></html>")
            .unwrap_err();
        assert!(matches!(err, ArchiveError::Parse(_)));
    }

    #[test]
    fn wrong_shape_is_an_error() {
        assert!(StructuredApiExtractor.extract(r#"{"items":[]}"#).is_err());
        assert!(StructuredApiExtractor
            .extract(r#"{"results":[{"products_id":"1"}]}"#)
            .is_err());
    }
}
