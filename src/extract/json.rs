use serde_json::Value;

use crate::extract::{Extractor, Format};

/// Strict whole-document JSON. Leading/trailing whitespace and a UTF-8 BOM
/// are tolerated; anything else around the document is a miss.
pub struct JsonExtractor;

impl Extractor for JsonExtractor {
    fn format(&self) -> Format {
        Format::Json
    }

    fn extract(&self, stdout: &str) -> Option<Value> {
        let text = stdout.trim_start_matches('\u{feff}').trim();
        if text.is_empty() {
            return None;
        }
        serde_json::from_str(text).ok()
    }
}
