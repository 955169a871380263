//! Text extraction from uploaded briefs.

use std::io::{Cursor, Read, Write};

use pdf_oxide::PdfDocument;
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};
use vidscript_core::{Error, Result};

/// Upload formats the service knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    PlainText,
    Docx,
    LegacyDoc,
    Pdf,
    Unknown,
}

impl FileType {
    /// Detect file type from extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "txt" | "md" | "" => Self::PlainText,
            "docx" => Self::Docx,
            "doc" => Self::LegacyDoc,
            "pdf" => Self::Pdf,
            _ => Self::Unknown,
        }
    }

    pub fn from_filename(filename: &str) -> Self {
        let ext = std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        Self::from_extension(ext)
    }
}

const PARSE_FAILED: &str = "文件解析失败，请检查文件格式";

/// Decode an uploaded file into plain text.
pub fn decode_upload(filename: &str, bytes: &[u8]) -> Result<String> {
    match FileType::from_filename(filename) {
        FileType::PlainText => Ok(String::from_utf8_lossy(bytes).into_owned()),
        FileType::Docx => extract_docx_text(bytes),
        FileType::Pdf => extract_pdf_text(bytes),
        FileType::LegacyDoc => {
            warn!("No text extractor for legacy Word file {}", filename);
            Err(Error::UnsupportedFormat(format!(
                "暂不支持解析doc文件，请另存为docx后上传: {}",
                filename
            )))
        }
        FileType::Unknown => Err(Error::UnsupportedFormat(
            "不支持的文件格式，请上传txt、pdf、docx或doc文件".into(),
        )),
    }
}

/// Pull paragraph text out of `word/document.xml`.
fn extract_docx_text(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| Error::UnsupportedFormat(format!("Invalid DOCX file: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| Error::UnsupportedFormat(format!("DOCX has no document body: {}", e)))?
        .read_to_string(&mut xml)?;

    docx_body_text(&xml)
}

/// Text runs (`w:t`) joined per paragraph; breaks and tabs kept.
fn docx_body_text(xml: &str) -> Result<String> {
    let malformed = |e: quick_xml::Error| {
        Error::UnsupportedFormat(format!("{}: {}", PARSE_FAILED, e))
    };

    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_run_text = false;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_run_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_run_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:br" | b"w:cr" | b"w:p" => text.push('\n'),
                b"w:tab" => text.push('\t'),
                _ => {}
            },
            Event::Text(t) if in_run_text => text.push_str(&t.unescape().map_err(malformed)?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text.trim().to_string())
}

/// Text of every PDF page, pages separated by newlines.
fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    let unreadable = |e: pdf_oxide::Error| {
        debug!("PDF parse error: {}", e);
        Error::UnsupportedFormat(PARSE_FAILED.into())
    };

    // The PDF reader opens documents by path.
    let mut file = tempfile::Builder::new().suffix(".pdf").tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;

    let mut doc = PdfDocument::open(file.path()).map_err(unreadable)?;
    let page_count = doc.page_count().map_err(unreadable)?;

    let mut pages = Vec::with_capacity(page_count);
    for page in 0..page_count {
        pages.push(doc.extract_text(page).map_err(unreadable)?);
    }
    debug!("Extracted text from {} PDF pages", page_count);

    Ok(pages.join("\n").trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(body.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_file_type_detection() {
        assert_eq!(FileType::from_filename("brief.TXT"), FileType::PlainText);
        assert_eq!(FileType::from_filename("brief.docx"), FileType::Docx);
        assert_eq!(FileType::from_filename("brief.pdf"), FileType::Pdf);
        assert_eq!(FileType::from_filename("brief"), FileType::PlainText);
        assert_eq!(FileType::from_filename("brief.png"), FileType::Unknown);
    }

    #[test]
    fn test_decode_plain_text() {
        let text = decode_upload("brief.txt", "品牌：斐萃".as_bytes()).unwrap();
        assert_eq!(text, "品牌：斐萃");
    }

    #[test]
    fn test_decode_docx() {
        let body = r#"<w:document><w:body><w:p><w:r><w:t>品牌：斐萃</w:t></w:r></w:p><w:p><w:r><w:t>卖点：A&amp;B</w:t></w:r></w:p></w:body></w:document>"#;
        let text = decode_upload("brief.docx", &docx_with_body(body)).unwrap();
        assert_eq!(text, "品牌：斐萃\n卖点：A&B");
    }

    #[test]
    fn test_decode_docx_numeric_references_and_breaks() {
        let body = r#"<w:document><w:body><w:p><w:r><w:t>品牌：&#26000;&#x8403;</w:t><w:tab/><w:t xml:space="preserve">A &lt;B&gt;</w:t></w:r></w:p><w:p><w:r><w:t>行业：</w:t><w:br/><w:t>&#20445;&#x5065;&#21697;</w:t></w:r></w:p></w:body></w:document>"#;
        let text = decode_upload("brief.docx", &docx_with_body(body)).unwrap();
        assert_eq!(text, "品牌：斐萃\tA <B>\n行业：\n保健品");
    }

    #[test]
    fn test_decode_docx_ignores_non_text_elements() {
        let body = r#"<w:document><w:body><w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>斐萃</w:t></w:r></w:p><w:p/><w:p><w:r><w:instrText>PAGE</w:instrText></w:r></w:p></w:body></w:document>"#;
        let text = decode_upload("brief.docx", &docx_with_body(body)).unwrap();
        assert_eq!(text, "斐萃");
    }

    #[test]
    fn test_decode_pdf() {
        let bytes = pdf_oxide::api::Pdf::from_text("Brand Acme\n\nFast charging")
            .unwrap()
            .into_bytes();
        let text = decode_upload("brief.pdf", &bytes).unwrap();
        assert!(text.contains("Acme"), "unexpected PDF text: {:?}", text);
    }

    #[test]
    fn test_decode_rejects_unsupported() {
        assert!(matches!(
            decode_upload("brief.pdf", b"not a pdf"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(
            decode_upload("brief.doc", b"\xD0\xCF\x11\xE0"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(
            decode_upload("brief.exe", b"MZ"),
            Err(Error::UnsupportedFormat(_))
        ));
        assert!(matches!(
            decode_upload("brief.docx", b"not a zip"),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
