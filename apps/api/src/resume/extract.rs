//! Plain-text extraction from uploaded CV documents.

use std::io::{Cursor, Read};

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported document type: {0}")]
    Unsupported(String),

    #[error("document contains no readable text")]
    Empty,

    #[error("PDF could not be read: {0}")]
    Pdf(String),

    #[error("DOCX could not be read: {0}")]
    Docx(String),

    #[error("DOCX body expands past {limit} bytes")]
    DocxTooLarge { limit: u64 },
}

/// Cap on the uncompressed size of `word/document.xml`.
pub const MAX_DOCX_XML_BYTES: u64 = 8 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    /// Decides by extension first, then by declared content type.
    pub fn detect(file_name: &str, content_type: Option<&str>) -> Option<Self> {
        let extension = std::path::Path::new(file_name)
            .extension()
            .and_then(|v| v.to_str())
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => return Some(DocumentKind::Pdf),
            "docx" => return Some(DocumentKind::Docx),
            "txt" | "md" | "text" => return Some(DocumentKind::PlainText),
            _ => {}
        }

        match content_type.map(|c| c.split(';').next().unwrap_or("").trim()) {
            Some("application/pdf") => Some(DocumentKind::Pdf),
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document") => {
                Some(DocumentKind::Docx)
            }
            Some(ct) if ct.starts_with("text/") => Some(DocumentKind::PlainText),
            _ => None,
        }
    }
}

/// Extracts text from `data`. PDF and DOCX decoding run on the blocking pool and a
/// panicking decoder is reported as a document error rather than taking the worker down.
pub async fn extract_text(
    file_name: &str,
    content_type: Option<&str>,
    data: bytes::Bytes,
) -> Result<String, ExtractError> {
    let kind = DocumentKind::detect(file_name, content_type)
        .ok_or_else(|| ExtractError::Unsupported(file_name.to_string()))?;

    let text = match kind {
        DocumentKind::Pdf => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&data).map_err(|e| ExtractError::Pdf(e.to_string()))
        })
        .await
        .map_err(|e| ExtractError::Pdf(format!("decoder aborted: {e}")))??,
        DocumentKind::Docx => tokio::task::spawn_blocking(move || {
            extract_docx_text(&data, MAX_DOCX_XML_BYTES)
        })
        .await
        .map_err(|e| ExtractError::Docx(format!("decoder aborted: {e}")))??,
        DocumentKind::PlainText => String::from_utf8_lossy(&data).into_owned(),
    };

    let text = normalize_text(&text);
    if text.trim().is_empty() {
        return Err(ExtractError::Empty);
    }
    Ok(text)
}

/// Collapses `\r\n`, strips NULs and trailing whitespace, and caps blank runs at one line.
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.replace("\r\n", "\n").replace('\r', "\n").lines() {
        let line = line.replace('\u{0}', "");
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push('\n');
            continue;
        }
        blank_run = 0;
        out.push_str(line);
        out.push('\n');
    }
    out.trim_matches('\n').to_string()
}

/// Reads `word/document.xml` and rejects it once more than `limit` bytes come out
/// of the decompressor, whatever size the archive header claims.
fn extract_docx_text(data: &[u8], limit: u64) -> Result<String, ExtractError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let entry = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    if entry.size() > limit {
        return Err(ExtractError::DocxTooLarge { limit });
    }

    let mut xml = Vec::new();
    entry
        .take(limit + 1)
        .read_to_end(&mut xml)
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    if xml.len() as u64 > limit {
        return Err(ExtractError::DocxTooLarge { limit });
    }

    let xml = String::from_utf8(xml).map_err(|e| ExtractError::Docx(e.to_string()))?;
    docx_paragraphs(&xml)
}

/// Joins the text runs of each `<w:p>` paragraph, one paragraph per line.
fn docx_paragraphs(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    // Keep whitespace: `xml:space="preserve"` runs carry the spaces between words.
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut current = String::new();
    let mut lines = Vec::new();
    let mut in_paragraph = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"w:p" {
                    in_paragraph = true;
                    current.clear();
                }
            }
            Ok(Event::Empty(e)) => {
                if in_paragraph && matches!(e.name().as_ref(), b"w:tab" | b"w:br") {
                    current.push(' ');
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"w:p" {
                    // Empty paragraphs keep section breaks visible to the splitter.
                    lines.push(current.trim().to_string());
                    current.clear();
                    in_paragraph = false;
                }
            }
            Ok(Event::Text(e)) => {
                if in_paragraph {
                    let value = e
                        .xml_content()
                        .map_err(|err| ExtractError::Docx(err.to_string()))?;
                    current.push_str(&value);
                }
            }
            // Entity references arrive as their own events.
            Ok(Event::GeneralRef(e)) => {
                if in_paragraph {
                    let resolved = e
                        .resolve_char_ref()
                        .map_err(|err| ExtractError::Docx(err.to_string()))?;
                    match resolved {
                        Some(c) => current.push(c),
                        None => {
                            let name = e
                                .decode()
                                .map_err(|err| ExtractError::Docx(err.to_string()))?;
                            if let Some(value) = resolve_predefined_entity(&name) {
                                current.push_str(value);
                            }
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(ExtractError::Docx(err.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_detect_by_extension_and_content_type() {
        assert_eq!(DocumentKind::detect("cv.PDF", None), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::detect("cv.docx", None), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::detect("cv.txt", None), Some(DocumentKind::PlainText));
        assert_eq!(
            DocumentKind::detect("upload", Some("application/pdf")),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            DocumentKind::detect("upload", Some("text/plain; charset=utf-8")),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(DocumentKind::detect("photo.png", Some("image/png")), None);
    }

    #[test]
    fn test_normalize_text_collapses_blank_runs() {
        let raw = "Ada Lovelace\r\n\r\n\r\n\r\nExperience  \n\u{0}Engineer";
        assert_eq!(normalize_text(raw), "Ada Lovelace\n\nExperience\nEngineer");
    }

    #[tokio::test]
    async fn test_plain_text_extraction() {
        let text = extract_text("cv.txt", None, bytes::Bytes::from_static(b"Ada\nLovelace\n"))
            .await
            .unwrap();
        assert_eq!(text, "Ada\nLovelace");
    }

    #[tokio::test]
    async fn test_blank_document_is_empty_error() {
        let err = extract_text("cv.txt", None, bytes::Bytes::from_static(b"  \n \n"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Empty));
    }

    #[tokio::test]
    async fn test_unsupported_type() {
        let err = extract_text("cv.png", Some("image/png"), bytes::Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_garbage_pdf_is_reported_not_panicking() {
        let result = extract_text("cv.pdf", None, bytes::Bytes::from_static(b"not a pdf")).await;
        assert!(matches!(result, Err(ExtractError::Pdf(_))));
    }

    #[test]
    fn test_docx_paragraphs_joins_runs() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>Ada</w:t></w:r><w:r><w:t xml:space="preserve"> Lovelace</w:t></w:r></w:p>
            <w:p><w:r><w:t>Experience</w:t></w:r></w:p>
        </w:body></w:document>"#;
        let text = docx_paragraphs(xml).unwrap();
        assert_eq!(text, "Ada Lovelace\nExperience");
    }

    #[test]
    fn test_docx_paragraphs_resolves_entities() {
        let xml = "<w:document><w:body><w:p><w:r><w:t>R&amp;D &lt;Lead&gt; &#233;quipe</w:t></w:r></w:p></w:body></w:document>";
        assert_eq!(docx_paragraphs(xml).unwrap(), "R&D <Lead> équipe");
    }

    fn docx_with_body(xml: &[u8]) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut zip = zip::ZipWriter::new(&mut buf);
            zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(xml).unwrap();
            zip.finish().unwrap();
        }
        buf.into_inner()
    }

    #[tokio::test]
    async fn test_docx_archive_extraction() {
        let docx = docx_with_body(
            br#"<w:document><w:body><w:p><w:r><w:t>Grace Hopper</w:t></w:r></w:p></w:body></w:document>"#,
        );
        let text = extract_text("cv.docx", None, bytes::Bytes::from(docx))
            .await
            .unwrap();
        assert_eq!(text, "Grace Hopper");
    }

    #[test]
    fn test_docx_body_over_limit_is_rejected() {
        let mut xml = b"<w:document><w:body><w:p><w:r><w:t>".to_vec();
        xml.extend(std::iter::repeat(b'a').take(4096));
        xml.extend_from_slice(b"</w:t></w:r></w:p></w:body></w:document>");
        let docx = docx_with_body(&xml);
        // Deflate squeezes the repeated run far below the limit it expands past.
        assert!((docx.len() as u64) < 1024);

        let err = extract_docx_text(&docx, 1024).unwrap_err();
        assert!(matches!(err, ExtractError::DocxTooLarge { limit: 1024 }));
        assert!(extract_docx_text(&docx, 8192).is_ok());
    }

    #[tokio::test]
    async fn test_highly_compressed_docx_upload_is_rejected() {
        let mut xml = b"<w:document><w:body><w:p><w:r><w:t>".to_vec();
        xml.extend(std::iter::repeat(b'a').take(MAX_DOCX_XML_BYTES as usize));
        xml.extend_from_slice(b"</w:t></w:r></w:p></w:body></w:document>");
        let docx = docx_with_body(&xml);

        let err = extract_text("bomb.docx", None, bytes::Bytes::from(docx))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::DocxTooLarge { .. }));
    }
}
