// src/core/charset.rs
//! Saved pages come in whatever encoding the shop served them in. The byte
//! order mark wins, then a `<meta charset>` or `http-equiv` declaration near
//! the top of the page, then UTF-8. Undecodable bytes become U+FFFD.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252, X_USER_DEFINED};

/// How far into the page a charset declaration is looked for.
const PRESCAN_LEN: usize = 1024;

/// Page text plus the encoding it was decoded with.
pub fn decode_page(bytes: &[u8]) -> (Cow<'_, str>, &'static Encoding) {
    let encoding = Encoding::for_bom(bytes)
        .map(|(enc, _)| enc)
        .or_else(|| declared_encoding(bytes))
        .unwrap_or(UTF_8);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        logd!("charset: malformed {} input replaced", used.name());
    }
    (text, used)
}

/// Encoding named by the first `<meta>` tag that declares one.
pub fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(PRESCAN_LEN)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(at) = rest.find("<meta") {
        let tag = &rest[at + 5..];
        let tag = &tag[..tag.find('>').unwrap_or(tag.len())];
        if let Some(enc) = charset_in(tag).and_then(|l| Encoding::for_label(l.as_bytes())) {
            return Some(html_override(enc));
        }
        rest = &rest[at + 5..];
    }
    None
}

/// Label after `charset=` in a meta tag's text, quotes stripped.
fn charset_in(tag: &str) -> Option<&str> {
    let at = tag.find("charset")?;
    let rest = tag[at + 7..].trim_start();
    let rest = rest.strip_prefix('=')?.trim_start();
    let rest = rest.trim_start_matches(['"', '\'']);
    let end = rest
        .find(|c: char| matches!(c, '"' | '\'' | ';' | '/' | '>') || c.is_whitespace())
        .unwrap_or(rest.len());
    let label = &rest[..end];
    (!label.is_empty()).then_some(label)
}

/// A page that says UTF-16 in ASCII is not UTF-16; browsers read it as UTF-8.
fn html_override(enc: &'static Encoding) -> &'static Encoding {
    if enc == UTF_16LE || enc == UTF_16BE {
        UTF_8
    } else if enc == X_USER_DEFINED {
        WINDOWS_1252
    } else {
        enc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1251;

    fn cp1251_page(head: &str, name: &str) -> Vec<u8> {
        let html = format!("<html><head>{head}</head><body><td>{name}</td></body></html>");
        WINDOWS_1251.encode(&html).0.into_owned()
    }

    #[test]
    fn meta_charset_selects_encoding() {
        let bytes = cp1251_page(r#"<meta charset="windows-1251">"#, "Помада");
        let (text, enc) = decode_page(&bytes);
        assert_eq!(enc, WINDOWS_1251);
        assert!(text.contains("<td>Помада</td>"));
    }

    #[test]
    fn http_equiv_content_type() {
        let bytes = cp1251_page(
            r#"<META HTTP-EQUIV="Content-Type" CONTENT="text/html; charset=cp1251">"#,
            "Тушь",
        );
        let (text, enc) = decode_page(&bytes);
        assert_eq!(enc, WINDOWS_1251);
        assert!(text.contains("Тушь"));
    }

    #[test]
    fn no_declaration_is_lossy_utf8() {
        let (text, enc) = decode_page(b"<td>Cr\xE8me</td>");
        assert_eq!(enc, UTF_8);
        assert_eq!(text, "<td>Cr\u{FFFD}me</td>");
    }

    #[test]
    fn bom_beats_declaration() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice("<meta charset=windows-1251><td>Помада</td>".as_bytes());
        let (text, enc) = decode_page(&bytes);
        assert_eq!(enc, UTF_8);
        assert!(text.contains("Помада"));
    }

    #[test]
    fn unusable_labels_fall_back() {
        assert_eq!(declared_encoding(b"<meta charset=\"no-such-thing\">"), None);
        assert_eq!(declared_encoding(b"<meta charset=utf-16>"), Some(UTF_8));
        assert_eq!(declared_encoding(b"<meta name=viewport><meta charset='koi8-r'>"), Some(encoding_rs::KOI8_R));
        assert_eq!(declared_encoding(b"<p>charset=windows-1251</p>"), None);
    }
}
