//! PDF backend abstraction layer.
//!
//! Provides the PDF collaborator of the pipeline: raw page text from
//! `pdf-extract`, and per-page drawing operators and positioned text
//! fragments decoded from the content streams with `lopdf`. Nothing here
//! interprets document structure.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object};

use crate::convert::ContentSource;
use crate::detect::detect_format_from_bytes;
use crate::error::{Error, Result};
use crate::model::{DrawOp, PageContent, TextFragment};

use super::geometry::Matrix;

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// A value from a PDF content stream operand.
#[derive(Debug, Clone)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    /// All operands as numbers, or `None` if any is not numeric.
    fn numbers<const N: usize>(&self) -> Option<[f32; N]> {
        if self.operands.len() < N {
            return None;
        }
        let mut out = [0.0; N];
        for (slot, value) in out.iter_mut().zip(&self.operands) {
            *slot = get_number_from_value(value)?;
        }
        Some(out)
    }
}

/// Abstract interface for PDF document access.
///
/// Implementations provide page enumeration, content stream decoding and
/// text decoding without exposing any concrete PDF library types.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Plain text of the whole document in reading order.
    fn extract_text(&self) -> Result<String>;
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// LopdfSource: concrete implementation backed by lopdf and pdf-extract
// ---------------------------------------------------------------------------

/// PDF collaborator backed by `lopdf::Document`.
pub struct LopdfSource {
    doc: LopdfDocument,
    bytes: Vec<u8>,
}

impl LopdfSource {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::load_bytes(bytes)
    }

    /// Load from in-memory bytes, validating the PDF header first.
    pub fn load_bytes(bytes: Vec<u8>) -> Result<Self> {
        detect_format_from_bytes(&bytes)?;
        let doc = LopdfDocument::load_mem(&bytes)?;
        if doc.is_encrypted() {
            return Err(Error::ExtractionFailed("document is encrypted".to_string()));
        }
        Ok(Self { doc, bytes })
    }

    /// Load from a reader.
    pub fn load_reader<R: std::io::Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load_bytes(data)
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }
}

impl PdfBackend for LopdfSource {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_content(&self, page_id: PageId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        let contents = page_dict.get(b"Contents")?;

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r)? {
                Object::Stream(s) => Ok(s.decompressed_content()?),
                _ => Err(Error::ExtractionFailed("invalid content stream".to_string())),
            },
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            if let Ok(data) = s.decompressed_content() {
                                content.extend_from_slice(&data);
                                content.push(b' ');
                            }
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::ExtractionFailed("invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content = lopdf::content::Content::decode(data)?;
        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(fonts) = self.doc.get_page_fonts(page) {
            if let Some(font_dict) = fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn extract_text(&self) -> Result<String> {
        Ok(pdf_extract::extract_text_from_mem(&self.bytes)?)
    }
}

impl ContentSource for LopdfSource {
    fn text(&self) -> Result<String> {
        self.extract_text()
    }

    fn pages(&self) -> Result<Vec<PageContent>> {
        page_contents(self)
    }
}

/// Decode every page of a backend into drawing operators and text fragments.
///
/// A page whose content stream cannot be read is logged and skipped.
pub fn page_contents(backend: &dyn PdfBackend) -> Result<Vec<PageContent>> {
    let mut pages = Vec::new();
    for (number, id) in backend.pages() {
        let data = match backend.page_content(id) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("page {number}: unreadable content stream: {e}");
                continue;
            }
        };
        let ops = backend.decode_content(&data)?;
        let mut interpreter = ContentInterpreter::new(number);
        for op in &ops {
            interpreter.apply(op, |font, bytes| backend.decode_text(id, font, bytes));
        }
        pages.push(interpreter.finish());
    }
    Ok(pages)
}

/// Walks one page's operators, tracking graphics and text state.
#[derive(Debug)]
pub struct ContentInterpreter {
    page: PageContent,
    ctm: Matrix,
    stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    leading: f32,
    font: Vec<u8>,
}

impl ContentInterpreter {
    pub fn new(number: u32) -> Self {
        Self {
            page: PageContent::new(number),
            ctm: Matrix::IDENTITY,
            stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            leading: 0.0,
            font: Vec::new(),
        }
    }

    /// Apply one operator; `decode` turns string bytes into text for the current font.
    pub fn apply<F>(&mut self, op: &ContentOp, decode: F)
    where
        F: Fn(&[u8], &[u8]) -> String,
    {
        match op.operator.as_str() {
            "q" => {
                self.stack.push(self.ctm);
                self.page.ops.push(DrawOp::Save);
            }
            "Q" => {
                self.ctm = self.stack.pop().unwrap_or(Matrix::IDENTITY);
                self.page.ops.push(DrawOp::Restore);
            }
            "cm" => {
                if let Some(m) = op.numbers::<6>() {
                    self.ctm = self.ctm.concat(&Matrix(m));
                    self.page.ops.push(DrawOp::Transform(m));
                }
            }
            "w" => {
                if let Some([w]) = op.numbers::<1>() {
                    self.page.ops.push(DrawOp::SetLineWidth(w));
                }
            }
            "re" => {
                if let Some([x, y, width, height]) = op.numbers::<4>() {
                    self.page.ops.push(DrawOp::Rect {
                        x,
                        y,
                        width,
                        height,
                    });
                }
            }
            "m" => {
                if let Some([x, y]) = op.numbers::<2>() {
                    self.page.ops.push(DrawOp::MoveTo { x, y });
                }
            }
            "l" => {
                if let Some([x, y]) = op.numbers::<2>() {
                    self.page.ops.push(DrawOp::LineTo { x, y });
                }
            }
            "BT" => {
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "Tf" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    self.font = name.clone();
                }
            }
            "TL" => {
                if let Some([leading]) = op.numbers::<1>() {
                    self.leading = leading;
                }
            }
            "Tm" => {
                if let Some(m) = op.numbers::<6>() {
                    self.line_matrix = Matrix(m);
                    self.text_matrix = self.line_matrix;
                }
            }
            "Td" => {
                if let Some([tx, ty]) = op.numbers::<2>() {
                    self.move_line(tx, ty);
                }
            }
            "TD" => {
                if let Some([tx, ty]) = op.numbers::<2>() {
                    self.leading = -ty;
                    self.move_line(tx, ty);
                }
            }
            "T*" => self.move_line(0.0, -self.leading),
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    let text = decode(&self.font, bytes);
                    self.show(text);
                }
            }
            "'" => {
                self.move_line(0.0, -self.leading);
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    let text = decode(&self.font, bytes);
                    self.show(text);
                }
            }
            "\"" => {
                self.move_line(0.0, -self.leading);
                if let Some(PdfValue::Str(bytes)) = op.operands.get(2) {
                    let text = decode(&self.font, bytes);
                    self.show(text);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    let mut text = String::new();
                    for item in items {
                        match item {
                            PdfValue::Str(bytes) => text.push_str(&decode(&self.font, bytes)),
                            // Large negative kerning is a word gap.
                            other => {
                                if get_number_from_value(other).is_some_and(|n| n < -200.0) {
                                    text.push(' ');
                                }
                            }
                        }
                    }
                    self.show(text);
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        let translate = Matrix([1.0, 0.0, 0.0, 1.0, tx, ty]);
        self.line_matrix = self.line_matrix.concat(&translate);
        self.text_matrix = self.line_matrix;
    }

    fn show(&mut self, text: String) {
        if text.trim().is_empty() {
            return;
        }
        let (x, y) = self.ctm.concat(&self.text_matrix).apply(0.0, 0.0);
        self.page.fragments.push(TextFragment { text, x, y });
    }

    /// The decoded page.
    pub fn finish(self) -> PageContent {
        self.page
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(v: f32) -> PdfValue {
        PdfValue::Real(v)
    }

    fn run(ops: &[ContentOp]) -> PageContent {
        let mut interpreter = ContentInterpreter::new(1);
        for op in ops {
            interpreter.apply(op, |_, bytes| decode_text_simple(bytes));
        }
        interpreter.finish()
    }

    #[test]
    fn test_decode_text_simple_utf8() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
    }

    #[test]
    fn test_decode_text_simple_latin1() {
        // 0xE9 = 'é' in Latin-1
        let bytes = vec![0x48, 0x65, 0x6C, 0x6C, 0xE9];
        assert_eq!(decode_text_simple(&bytes), "Hellé");
    }

    #[test]
    fn test_decode_text_simple_utf16be() {
        let bytes = vec![0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_text_simple(&bytes), "Hi");
    }

    #[test]
    fn test_get_number_from_value() {
        assert_eq!(get_number_from_value(&PdfValue::Integer(42)), Some(42.0));
        assert_eq!(get_number_from_value(&PdfValue::Real(2.5)), Some(2.5));
        assert_eq!(get_number_from_value(&PdfValue::Other), None);
    }

    #[test]
    fn test_drawing_operators_mapped() {
        let page = run(&[
            ContentOp::new("q", vec![]),
            ContentOp::new("cm", [1.0, 0.0, 0.0, 1.0, 10.0, 20.0].map(num).to_vec()),
            ContentOp::new("w", vec![PdfValue::Integer(1)]),
            ContentOp::new("re", [0.0, 0.0, 100.0, 0.5].map(num).to_vec()),
            ContentOp::new("m", [0.0, 0.0].map(num).to_vec()),
            ContentOp::new("l", [0.0, 50.0].map(num).to_vec()),
            ContentOp::new("S", vec![]),
            ContentOp::new("Q", vec![]),
        ]);
        assert_eq!(page.ops.len(), 7);
        assert_eq!(page.ops[0], DrawOp::Save);
        assert_eq!(page.ops[2], DrawOp::SetLineWidth(1.0));
        assert_eq!(page.ops[6], DrawOp::Restore);
    }

    #[test]
    fn test_malformed_operands_ignored() {
        let page = run(&[ContentOp::new("re", vec![num(1.0), PdfValue::Other])]);
        assert!(page.ops.is_empty());
    }

    #[test]
    fn test_text_positions_follow_matrices() {
        let page = run(&[
            ContentOp::new("cm", [1.0, 0.0, 0.0, 1.0, 0.0, 100.0].map(num).to_vec()),
            ContentOp::new("BT", vec![]),
            ContentOp::new("Tm", [1.0, 0.0, 0.0, 1.0, 50.0, 600.0].map(num).to_vec()),
            ContentOp::new("Tj", vec![PdfValue::Str(b"Feature".to_vec())]),
            ContentOp::new("TD", [0.0, -14.0].map(num).to_vec()),
            ContentOp::new(
                "TJ",
                vec![PdfValue::Array(vec![
                    PdfValue::Str(b"Split".to_vec()),
                    PdfValue::Integer(-250),
                    PdfValue::Str(b"tunnel".to_vec()),
                ])],
            ),
            ContentOp::new("T*", vec![]),
            ContentOp::new("'", vec![PdfValue::Str(b"next".to_vec())]),
            ContentOp::new("ET", vec![]),
        ]);
        let texts: Vec<_> = page
            .fragments
            .iter()
            .map(|f| (f.text.as_str(), f.x, f.y))
            .collect();
        assert_eq!(
            texts,
            vec![
                ("Feature", 50.0, 700.0),
                ("Split tunnel", 50.0, 686.0),
                ("next", 50.0, 658.0),
            ]
        );
    }

    #[test]
    fn test_load_rejects_non_pdf() {
        let err = LopdfSource::load_bytes(b"<html></html>".to_vec()).err().unwrap();
        assert!(matches!(err, Error::UnknownFormat));
    }
}
