//! DOCX extractor.
//!
//! A `.docx` file is a zip archive whose main body lives in
//! `word/document.xml`. Paragraph text is the concatenation of the `w:t`
//! runs inside each `w:p` element; empty paragraphs are skipped.

use async_trait::async_trait;
use docrag_core::{DocumentFormat, ExtractError, TextExtractor};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Extractor for word-processor documents.
pub struct DocxExtractor;

impl DocxExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextExtractor for DocxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    async fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let bytes = tokio::fs::read(path).await?;

        tokio::task::spawn_blocking(move || extract_docx(&bytes))
            .await
            .map_err(|e| ExtractError::Corrupt(format!("task join error: {e}")))?
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let cursor = std::io::Cursor::new(bytes);
    let mut archive = zip::ZipArchive::new(cursor)
        .map_err(|e| ExtractError::Corrupt(format!("not a docx archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Corrupt(format!("missing word/document.xml: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Corrupt(format!("unreadable document.xml: {e}")))?;

    let paragraphs = collect_paragraphs(&xml)?;
    debug!(paragraph_count = paragraphs.len(), "extracted docx paragraphs");

    Ok(paragraphs.join("\n"))
}

/// Walk the document XML and gather per-paragraph text.
fn collect_paragraphs(xml: &str) -> Result<Vec<String>, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    let para = current.trim();
                    if !para.is_empty() {
                        paragraphs.push(para.to_string());
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let piece = t
                    .unescape()
                    .map_err(|e| ExtractError::Corrupt(format!("docx xml text: {e}")))?;
                current.push_str(&piece);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Corrupt(format!("docx xml: {e}"))),
            Ok(_) => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    fn write_docx(path: &Path, document_xml: &str) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(document_xml.as_bytes()).unwrap();
        writer.finish().unwrap();
    }

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>First paragraph.</w:t></w:r></w:p>
    <w:p><w:r><w:t>Second </w:t></w:r><w:r><w:t>paragraph.</w:t></w:r></w:p>
    <w:p><w:r><w:t>   </w:t></w:r></w:p>
    <w:p><w:r><w:t>Third.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    #[tokio::test]
    async fn test_paragraphs_joined_by_newlines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("letter.docx");
        write_docx(&path, SAMPLE);

        let extractor = DocxExtractor::new();
        let text = extractor.extract(&path).await.unwrap();
        assert_eq!(text, "First paragraph.\nSecond paragraph.\nThird.");
    }

    #[tokio::test]
    async fn test_empty_paragraphs_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sparse.docx");
        write_docx(
            &path,
            r#"<w:document xmlns:w="x"><w:body><w:p/><w:p><w:r><w:t>only</w:t></w:r></w:p></w:body></w:document>"#,
        );

        let extractor = DocxExtractor::new();
        assert_eq!(extractor.extract(&path).await.unwrap(), "only");
    }

    #[tokio::test]
    async fn test_escaped_entities_are_unescaped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("entities.docx");
        write_docx(
            &path,
            r#"<w:document xmlns:w="x"><w:body><w:p><w:r><w:t>a &amp; b &lt; c</w:t></w:r></w:p></w:body></w:document>"#,
        );

        let extractor = DocxExtractor::new();
        assert_eq!(extractor.extract(&path).await.unwrap(), "a & b < c");
    }

    #[tokio::test]
    async fn test_not_a_zip_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fake.docx");
        std::fs::write(&path, "this is not a zip archive").unwrap();

        let extractor = DocxExtractor::new();
        let err = extractor.extract(&path).await.unwrap_err();
        assert!(matches!(err, ExtractError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_zip_without_document_xml_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hollow.docx");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("unrelated.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"nothing").unwrap();
        writer.finish().unwrap();

        let extractor = DocxExtractor::new();
        let err = extractor.extract(&path).await.unwrap_err();
        assert!(matches!(err, ExtractError::Corrupt(_)));
    }

    #[test]
    fn test_format() {
        assert_eq!(DocxExtractor::new().format(), DocumentFormat::Docx);
    }
}
