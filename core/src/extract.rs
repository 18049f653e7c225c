use scraper::Html;

/// Converts a raw document into plain text for tokenization.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, raw: &str) -> String;
}

/// Concatenates every text node of the parsed HTML, with no separator between nodes.
/// Script and style contents are included, and plain text passes through unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlExtractor;

impl TextExtractor for HtmlExtractor {
    fn extract(&self, raw: &str) -> String {
        let doc = Html::parse_document(raw);
        doc.root_element().text().collect::<String>()
    }
}

/// Uses the raw content as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, raw: &str) -> String { raw.to_string() }
}
