//! Minimal PDF writer: monospaced text lines on A4 pages.
//!
//! Uses the built-in Courier font, so no font data is embedded. Characters
//! outside printable ASCII are replaced with `?`.

use std::fmt::Write as _;

use super::{DocumentRenderer, DocumentSnapshot};
use crate::error::AppResult;

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const MARGIN: u32 = 50;

/// First object id used for pages; 1-3 are catalog, page tree and font
const FIRST_PAGE_OBJECT: usize = 4;

#[derive(Debug, Clone)]
pub struct PdfRenderer {
    font_size: u32,
    leading: u32,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self {
            font_size: 10,
            leading: 13,
        }
    }
}

impl PdfRenderer {
    fn lines_per_page(&self) -> usize {
        ((PAGE_HEIGHT - 2 * MARGIN) / self.leading) as usize
    }

    /// Serialize pages of text into a complete PDF file
    pub fn write_pages(&self, lines: &[String]) -> Vec<u8> {
        let per_page = self.lines_per_page().max(1);
        let mut pages: Vec<&[String]> = lines.chunks(per_page).collect();
        if pages.is_empty() {
            pages.push(&[]);
        }

        let mut writer = ObjectWriter::default();
        writer.object(1, "<< /Type /Catalog /Pages 2 0 R >>");

        let kids: Vec<String> = (0..pages.len())
            .map(|i| format!("{} 0 R", FIRST_PAGE_OBJECT + 2 * i))
            .collect();
        writer.object(
            2,
            &format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                pages.len()
            ),
        );
        writer.object(3, "<< /Type /Font /Subtype /Type1 /BaseFont /Courier >>");

        for (i, page) in pages.iter().enumerate() {
            let page_id = FIRST_PAGE_OBJECT + 2 * i;
            let content_id = page_id + 1;
            writer.object(
                page_id,
                &format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                     /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
                    PAGE_WIDTH, PAGE_HEIGHT, content_id
                ),
            );

            let stream = self.content_stream(page);
            writer.object(
                content_id,
                &format!("<< /Length {} >>\nstream\n{}\nendstream", stream.len(), stream),
            );
        }

        writer.finish()
    }

    fn content_stream(&self, lines: &[String]) -> String {
        let mut stream = String::new();
        let _ = write!(
            stream,
            "BT\n/F1 {} Tf\n{} TL\n{} {} Td\n",
            self.font_size,
            self.leading,
            MARGIN,
            PAGE_HEIGHT - MARGIN
        );
        for line in lines {
            let _ = writeln!(stream, "({}) Tj T*", escape_text(line));
        }
        stream.push_str("ET");
        stream
    }
}

impl DocumentRenderer for PdfRenderer {
    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, document: &DocumentSnapshot) -> AppResult<Vec<u8>> {
        Ok(self.write_pages(&document.text_lines()))
    }
}

/// Objects are written in id order; offsets feed the cross-reference table
#[derive(Default)]
struct ObjectWriter {
    out: Vec<u8>,
    offsets: Vec<usize>,
}

impl ObjectWriter {
    fn object(&mut self, id: usize, body: &str) {
        if self.out.is_empty() {
            self.out.extend_from_slice(b"%PDF-1.4\n");
        }
        debug_assert_eq!(id, self.offsets.len() + 1);
        self.offsets.push(self.out.len());
        self.out
            .extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_offset = self.out.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for offset in &self.offsets {
            let _ = write!(tail, "{:010} 00000 n \n", offset);
        }
        let _ = write!(
            tail,
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            self.offsets.len() + 1,
            xref_offset
        );
        self.out.extend_from_slice(tail.as_bytes());
        self.out
    }
}

/// Escape a string for a PDF literal
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            ' '..='~' => escaped.push(c),
            _ => escaped.push('?'),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("Rate (LKR)"), "Rate \\(LKR\\)");
        assert_eq!(escape_text("a\\b"), "a\\\\b");
        assert_eq!(escape_text("café"), "caf?");
    }

    #[test]
    fn test_single_page_structure() {
        let renderer = PdfRenderer::default();
        let pdf = as_text(&renderer.write_pages(&["Hello".to_string()]));

        assert!(pdf.starts_with("%PDF-1.4\n"));
        assert!(pdf.ends_with("%%EOF\n"));
        assert!(pdf.contains("/Count 1"));
        assert!(pdf.contains("(Hello) Tj T*"));
        assert!(pdf.contains("xref\n0 6\n"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let renderer = PdfRenderer::default();
        let bytes = renderer.write_pages(&["x".to_string()]);
        let pdf = as_text(&bytes);

        let xref = pdf.find("xref\n").unwrap();
        let entries: Vec<usize> = pdf[xref..]
            .lines()
            .skip(3)
            .take_while(|line| line.ends_with(" n "))
            .map(|line| line[..10].parse().unwrap())
            .collect();
        assert_eq!(entries.len(), 5);
        for (i, offset) in entries.iter().enumerate() {
            assert!(pdf[*offset..].starts_with(&format!("{} 0 obj", i + 1)));
        }

        let startxref: usize = pdf
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(startxref, xref);
    }

    #[test]
    fn test_long_documents_paginate() {
        let renderer = PdfRenderer::default();
        let lines: Vec<String> = (0..renderer.lines_per_page() * 2 + 1)
            .map(|i| format!("line {}", i))
            .collect();
        let pdf = as_text(&renderer.write_pages(&lines));
        assert!(pdf.contains("/Count 3"));

        let empty = as_text(&renderer.write_pages(&[]));
        assert!(empty.contains("/Count 1"));
    }
}
