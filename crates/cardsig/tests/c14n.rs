use cardsig::c14n::{self, CanonicalizationMode};
use cardsig::Error;

#[test]
fn test_end_to_end_prefixed_document() {
    let input = r#"<a:Foo xmlns:a="urn:x" xmlns:b="urn:y" b:id="1"><a:Bar/></a:Foo>"#;
    let out = c14n::canonicalize_str(input).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        r#"<a:Foo xmlns:a="urn:x" xmlns:b="urn:y" b:id="1"><a:Bar></a:Bar></a:Foo>"#
    );
}

#[test]
fn test_unused_namespaces_are_not_rendered() {
    let out = c14n::canonicalize_str(r#"<r xmlns:n1="u1" xmlns:n2="u2"><n1:e/></r>"#).unwrap();
    assert_eq!(out, br#"<r><n1:e xmlns:n1="u1"></n1:e></r>"#);
}

#[test]
fn test_token_canonicalizes_like_its_reformatted_twin() {
    let a = r#"<?xml version="1.0" encoding="UTF-8"?>
<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:1.0:assertion" MinorVersion="1" MajorVersion="1" AssertionID="uuid-1"><!-- issued --><saml:Conditions NotBefore="2026-01-01T00:00:00Z"/></saml:Assertion>"#;
    let b = r#"<saml:Assertion
    MajorVersion='1'   MinorVersion='1'
    AssertionID='uuid-1' xmlns:saml='urn:oasis:names:tc:SAML:1.0:assertion'><saml:Conditions NotBefore="2026-01-01T00:00:00Z"></saml:Conditions></saml:Assertion>"#;
    assert_eq!(
        c14n::canonicalize_str(a).unwrap(),
        c14n::canonicalize_str(b).unwrap()
    );
}

#[test]
fn test_with_comments_mode_keeps_comments() {
    let xml = "<r><!--note--></r>";
    let out = c14n::canonicalize(xml, CanonicalizationMode::ExclusiveWithComments, None, &[])
        .unwrap();
    assert_eq!(out, b"<r><!--note--></r>");
    assert_eq!(c14n::canonicalize_str(xml).unwrap(), b"<r></r>");
}

#[test]
fn test_malformed_is_a_data_fault() {
    let err = c14n::canonicalize_bytes(b"<a><b></a>").unwrap_err();
    assert!(matches!(err, Error::MalformedInput(_)));
    assert!(!err.is_environment_fault());
}
