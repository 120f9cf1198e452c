//! Resolves "replaced page" indirections back to their original URL.
//!
//! Lazy-restored tabs point at an internal `replaced/index.html` page that
//! carries the real destination in its `url` query parameter. Captures must
//! record the destination, not the shim.

use url::Url;

const REPLACED_PAGE_PATH: &str = "/replaced/index.html";

/// Returns the original URL when `url` is a replaced page, `None` otherwise.
pub fn resolve_replaced_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if !parsed.path().ends_with(REPLACED_PAGE_PATH) {
        return None;
    }

    parsed
        .query_pairs()
        .find_map(|(key, value)| (key == "url" && !value.is_empty()).then(|| value.into_owned()))
}
