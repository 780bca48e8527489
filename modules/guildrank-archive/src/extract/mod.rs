// Extraction strategies: raw captured content in, ordered ranking out.

mod api;
mod markup;

pub use api::StructuredApiExtractor;
pub use markup::StaticMarkupExtractor;

use guildrank_common::RankingEntry;

use crate::error::Result;

/// Turns captured content into a ranking. Index 0 of the result is rank 1.
/// Content without a ranking yields an empty `Vec`, not an error.
pub trait RankingExtractor: Send + Sync {
    fn extract(&self, content: &str) -> Result<Vec<RankingEntry>>;
}

/// Parse an intercepted feed body, which is either a JSON listing or a
/// markup fragment depending on the era that served it.
///
/// JSON that is not a product listing is searched for markup in its string
/// values; a body with no ranking in it yields an empty `Vec`.
pub fn extract_feed_body(content: &str) -> Result<Vec<RankingEntry>> {
    if !content.trim_start().starts_with('{') {
        return StaticMarkupExtractor.extract(content);
    }
    if let Ok(entries) = StructuredApiExtractor.extract(content) {
        return Ok(entries);
    }

    match serde_json::from_str::<serde_json::Value>(content) {
        Ok(value) => {
            let mut fragments = String::new();
            collect_strings(&value, &mut fragments);
            StaticMarkupExtractor.extract(&fragments)
        }
        Err(_) => StaticMarkupExtractor.extract(content),
    }
}

fn collect_strings(value: &serde_json::Value, out: &mut String) {
    match value {
        serde_json::Value::String(s) => {
            out.push_str(s);
            out.push('\n');
        }
        serde_json::Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        serde_json::Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}
