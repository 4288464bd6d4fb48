//! JSON rendering of documents and tables.

use serde::Serialize;

use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize a document, a table list or any model value to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Block, Document, DocumentVariant, Table};

    #[test]
    fn test_to_json_pretty() {
        let mut doc = Document::new(DocumentVariant::HowTo);
        doc.push(Block::heading("Guide", 1));

        let json = to_json(&doc, JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"variant\": \"howto\""));
        assert!(json.contains("\"kind\": \"main_title\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact_tables() {
        let tables = vec![Table::from_rows(vec![vec!["Item"], vec!["a"]], true)];
        let json = to_json(&tables[..], JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.starts_with('['));
        assert!(json.contains("\"Item\""));
    }
}
