pub mod html;


/// Kind of document a response carries, judged by its declared content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    /// `text/html` or `application/xhtml+xml`
    Html,
    /// Anything else, including a missing header
    Other,
}

impl DocumentType {
    /// Classifies a `Content-Type` header value. Parameters such as
    /// `charset` and letter case are ignored.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let Some(value) = content_type else {
            ::log::debug!("No content type declared, classifying as Other");
            return DocumentType::Other;
        };

        let essence = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "text/html" | "application/xhtml+xml" => DocumentType::Html,
            _ => {
                ::log::debug!("Classifying content type {:?} as Other", value);
                DocumentType::Other
            }
        }
    }

    /// Returns if image references should be extracted from this document
    pub fn should_extract_references(&self) -> bool {
        matches!(self, DocumentType::Html)
    }
}

/// Extracts the raw image references from an HTML document.
///
/// Never fails: malformed markup yields a best-effort (possibly empty) result.
pub fn extract_references(html: &str) -> Vec<String> {
    if html.trim().is_empty() {
        return Vec::new();
    }
    html::extract_image_sources(html)
}
