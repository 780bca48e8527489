use std::sync::LazyLock;

use regex::{Captures, Regex};

use guildrank_common::RankingEntry;

use super::RankingExtractor;
use crate::error::Result;

static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\s+([^>]*?)>(.*?)</a>").expect("valid regex"));
static PRODUCT_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*"[^"]*/product/(\d+)/[^"]*""#).expect("valid regex")
});
static OLDTITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\boldtitle\s*=\s*"([^"]+)""#).expect("valid regex"));
static NUMERIC_ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#([xX]?)([0-9a-fA-F]+);").expect("valid regex"));

/// Regex scan for product-detail links in captured HTML.
///
/// A link counts when its `href` contains `/product/<digits>/`. The product
/// name is the `oldtitle` attribute when the anchor has one (the tooltip
/// markup used by some storefront layouts), otherwise the anchor's text,
/// provided that text has no nested tags. Links are returned in document
/// order.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMarkupExtractor;

impl RankingExtractor for StaticMarkupExtractor {
    fn extract(&self, content: &str) -> Result<Vec<RankingEntry>> {
        let entries = ANCHOR_RE
            .captures_iter(content)
            .filter_map(|anchor| {
                let attrs = anchor.get(1)?.as_str();
                let inner = anchor.get(2)?.as_str();
                let product_id = PRODUCT_HREF_RE.captures(attrs)?.get(1)?.as_str();

                let raw_name = match OLDTITLE_RE.captures(attrs) {
                    Some(title) => title.get(1)?.as_str(),
                    None if inner.contains('<') => return None,
                    None => inner,
                };
                let product_name = clean_text(raw_name);
                if product_name.is_empty() {
                    return None;
                }
                Some(RankingEntry::new(product_id, product_name))
            })
            .collect();
        Ok(entries)
    }
}

fn clean_text(raw: &str) -> String {
    decode_entities(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(raw: &str) -> String {
    let numeric = NUMERIC_ENTITY_RE.replace_all(raw, |caps: &Captures| {
        let radix = if caps[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&caps[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });
    numeric
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
