//! Serialization of a built document to bytes.

use crate::error::{Error, Result};

use super::document::WordDocument;

/// Turns a [`WordDocument`] into the bytes of an output file.
pub trait DocumentSerializer {
    /// Encode the document.
    fn serialize(&self, doc: &WordDocument) -> Result<Vec<u8>>;

    /// File extension of the produced format, without the dot.
    fn extension(&self) -> &str;
}

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serializes the document model as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer {
    format: JsonFormat,
}

impl JsonSerializer {
    /// Create a serializer with the given format.
    pub fn new(format: JsonFormat) -> Self {
        Self { format }
    }

    /// Compact output.
    pub fn compact() -> Self {
        Self::new(JsonFormat::Compact)
    }
}

impl DocumentSerializer for JsonSerializer {
    fn serialize(&self, doc: &WordDocument) -> Result<Vec<u8>> {
        let result = match self.format {
            JsonFormat::Pretty => serde_json::to_vec_pretty(doc),
            JsonFormat::Compact => serde_json::to_vec(doc),
        };

        result.map_err(|e| Error::Serialization(format!("JSON serialization error: {}", e)))
    }

    fn extension(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BodyElement, Paragraph};

    fn doc() -> WordDocument {
        let mut doc = WordDocument::new();
        doc.push(BodyElement::Paragraph(Paragraph::heading("Test", 1)));
        doc
    }

    #[test]
    fn test_pretty_json() {
        let bytes = JsonSerializer::default().serialize(&doc()).unwrap();
        let json = String::from_utf8(bytes).unwrap();
        assert!(json.contains("\"heading_level\": 1"));
        assert!(json.contains("\"type\": \"paragraph\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_compact_json() {
        let bytes = JsonSerializer::compact().serialize(&doc()).unwrap();
        assert!(!bytes.contains(&b'\n'));

        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["margins"]["left"], 720);
        assert_eq!(value["body"][0]["runs"][0]["text"], "Test");
    }
}
