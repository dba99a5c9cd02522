use scraper::{Html, Selector};
use std::collections::HashSet;

/// Extracts the distinct `src` values of every `<img>` element.
///
/// Values are returned in document order with later duplicates dropped.
/// html5ever recovers from any markup, so malformed or empty input simply
/// yields fewer (or no) references.
pub fn extract_image_sources(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);

    let Ok(img_selector) = Selector::parse("img[src]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let sources = doc
        .select(&img_selector)
        .filter_map(|e| e.value().attr("src"))
        .filter(|src| seen.insert(*src))
        .map(|src| src.to_string())
        .collect::<Vec<String>>();

    ::log::debug!("HTML parser found {} image references", sources.len());
    if !sources.is_empty() {
        ::log::trace!(
            "First few references: {:?}",
            sources.iter().take(5).collect::<Vec<_>>()
        );
    }

    sources
}
