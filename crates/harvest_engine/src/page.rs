//! Turn a downloaded HTML page into readable text.
//!
//! Bytes are decoded (BOM, then Content-Type charset, then `chardetng`
//! detection), the main content region is selected, and the result is rendered
//! as Markdown, which is plain enough to read and to feed to a summarizer.

use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use scraper::{Html, Selector};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub title: Option<String>,
    pub text: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}")]
    DecodeFailure { encoding: String },
}

/// Decode, extract and render one page. Plain-text bodies are passed through.
pub fn page_to_text(bytes: &[u8], content_type: Option<&str>) -> Result<PageText, DecodeError> {
    let (decoded, encoding_label) = decode(bytes, content_type)?;

    if content_type.is_some_and(|ct| mime_of(ct).eq_ignore_ascii_case("text/plain")) {
        return Ok(PageText {
            title: None,
            text: decoded.trim().to_string(),
            encoding_label,
        });
    }

    let (title, content_html) = extract_main_content(&decoded);
    let body = html2md::parse_html(&content_html);
    let body = body.trim();
    let text = match &title {
        Some(title) if !body.is_empty() => format!("# {title}\n\n{body}"),
        Some(title) => format!("# {title}"),
        None => body.to_string(),
    };

    Ok(PageText {
        title,
        text,
        encoding_label,
    })
}

/// Media type without parameters, e.g. `text/html` for `text/html; charset=utf-8`.
pub(crate) fn mime_of(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim()
}

fn decode(bytes: &[u8], content_type: Option<&str>) -> Result<(String, String), DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .filter_map(|part| {
            let (key, value) = part.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim_matches([' ', '"', '\''].as_ref()).to_string())
        })
        .next()
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<(String, String), DecodeError> {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: enc.name().to_string(),
        });
    }
    Ok((text.into_owned(), enc.name().to_string()))
}

/// Pick `<article>`, then `<main>`, then `<body>`, falling back to the whole document.
fn extract_main_content(html: &str) -> (Option<String>, String) {
    let doc = Html::parse_document(html);

    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| {
            doc.select(&sel)
                .next()
                .map(|t| t.text().collect::<String>().trim().to_string())
        })
        .filter(|t| !t.is_empty());

    let content = ["article", "main", "body"]
        .iter()
        .filter_map(|tag| Selector::parse(tag).ok())
        .find_map(|sel| doc.select(&sel).next().map(|node| node.inner_html()))
        .unwrap_or_else(|| doc.root_element().html());

    (title, content)
}
