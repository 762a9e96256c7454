//! Integration tests for charset detection and byte-level loading.

use encoding_rs::{UTF_8, WINDOWS_1252};
use tagsoup_html::{HtmlDocument, HtmlError, ParseErrorCode, ParseOptions};

const HTTP_EQUIV_UTF8: &str = r#"<html><head><meta http-equiv="Content-Type" content="text/html; charset=utf8"></head><body>x</body></html>"#;

// ========== Detection ==========

#[test]
fn test_detect_http_equiv_declaration() {
    let mut doc = HtmlDocument::new();
    assert_eq!(doc.detect_encoding(HTTP_EQUIV_UTF8).unwrap(), Some(UTF_8));

    // Detection stops at the declaration: nothing after it is built and
    // the elements left open are not reported.
    let body = doc.tree().descendants_named(doc.root(), "body").unwrap();
    assert!(body.is_empty());
    assert!(doc.errors().is_empty());
}

#[test]
fn test_detect_charset_attribute() {
    let mut doc = HtmlDocument::new();
    let found = doc
        .detect_encoding(r#"<head><meta charset="ISO-8859-1"></head>"#)
        .unwrap();
    assert_eq!(found, Some(WINDOWS_1252));
}

#[test]
fn test_detect_without_declaration() {
    let mut doc = HtmlDocument::new();
    assert_eq!(doc.detect_encoding("<p>plain</p>").unwrap(), None);
}

#[test]
fn test_detect_ignores_other_http_equiv() {
    let mut doc = HtmlDocument::new();
    let found = doc
        .detect_encoding(r#"<meta http-equiv="refresh" content="5; charset=utf-8">"#)
        .unwrap();
    assert_eq!(found, None);
}

#[test]
fn test_detect_unknown_charset() {
    let mut doc = HtmlDocument::new();
    let found = doc.detect_encoding(r#"<meta charset="x-klingon">"#).unwrap();
    assert_eq!(found, None);
}

// ========== Declared vs stream encoding ==========

#[test]
fn test_declared_encoding_is_recorded() {
    let mut doc = HtmlDocument::new();
    doc.load_html(HTTP_EQUIV_UTF8).unwrap();

    assert_eq!(doc.declared_encoding(), Some(UTF_8));
    assert_eq!(doc.stream_encoding(), None);
    assert!(doc.errors().is_empty());
}

#[test]
fn test_charset_mismatch() {
    let mut doc = HtmlDocument::new();
    doc.load_with_encoding(r#"<meta charset="iso-8859-1"><p>x"#, Some(UTF_8))
        .unwrap();

    assert_eq!(doc.declared_encoding(), Some(WINDOWS_1252));
    let errors = doc.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ParseErrorCode::CharsetMismatch);
    assert_eq!(
        errors[0].reason,
        "Encoding mismatch between StreamEncoding: UTF-8 and DeclaredEncoding: windows-1252"
    );
}

#[test]
fn test_matching_charset_is_not_an_error() {
    let mut doc = HtmlDocument::new();
    doc.load_with_encoding(HTTP_EQUIV_UTF8, Some(UTF_8)).unwrap();
    assert!(doc.errors().is_empty());
}

#[test]
fn test_read_encoding_disabled() {
    let mut options = ParseOptions::default();
    options.read_encoding = false;
    let mut doc = HtmlDocument::with_options(options);
    doc.load_with_encoding(r#"<meta charset="iso-8859-1">"#, Some(UTF_8))
        .unwrap();

    assert_eq!(doc.declared_encoding(), None);
    assert!(doc.errors().is_empty());
}

// ========== Byte loading ==========

#[test]
fn test_load_bytes_with_bom() {
    let mut doc = HtmlDocument::new();
    doc.load_bytes(b"\xEF\xBB\xBF<b>hi</b>").unwrap();

    assert_eq!(doc.text(), "<b>hi</b>");
    assert_eq!(doc.stream_encoding(), Some(UTF_8));
}

#[test]
fn test_load_bytes_uses_declaration() {
    let mut doc = HtmlDocument::new();
    doc.load_bytes(b"<meta charset=\"windows-1252\"><b>caf\xE9</b>")
        .unwrap();

    assert_eq!(doc.stream_encoding(), Some(WINDOWS_1252));
    assert_eq!(doc.inner_text(doc.root()).unwrap(), "caf\u{e9}");
    assert!(doc.errors().is_empty());
}

#[test]
fn test_load_bytes_falls_back_to_default() {
    let mut doc = HtmlDocument::new();
    doc.load_bytes("<b>\u{e9}t\u{e9}</b>".as_bytes()).unwrap();

    assert_eq!(doc.stream_encoding(), Some(UTF_8));
    assert_eq!(doc.inner_text(doc.root()).unwrap(), "\u{e9}t\u{e9}");
}

#[test]
fn test_load_bytes_unknown_default() {
    let mut options = ParseOptions::default();
    options.default_encoding = "bogus".to_owned();
    let mut doc = HtmlDocument::with_options(options);

    assert_eq!(
        doc.load_bytes(b"<p>x"),
        Err(HtmlError::UnknownEncoding("bogus".to_owned()))
    );
}
