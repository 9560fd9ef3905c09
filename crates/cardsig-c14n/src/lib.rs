#![forbid(unsafe_code)]

//! Exclusive XML Canonicalization (exc-C14N 1.0) for cardsig.
//!
//! The canonicalizer is compiled in through the default `exc-c14n`
//! feature. A build without it still links, but every call fails with
//! [`Error::CapabilityUnavailable`] before the input is looked at.

pub mod escape;
#[cfg(feature = "exc-c14n")]
pub mod exclusive;
pub mod render;

use cardsig_core::{algorithm, Error};
use cardsig_xml::NodeSet;

/// The canonicalization mode.
///
/// Both variants are exclusive; they differ only in whether comment nodes
/// are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanonicalizationMode {
    /// Exclusive Canonical XML 1.0
    #[default]
    Exclusive,
    /// Exclusive Canonical XML 1.0 with comments
    ExclusiveWithComments,
}

impl CanonicalizationMode {
    /// Get the algorithm URI for this mode.
    pub fn uri(&self) -> &'static str {
        match self {
            Self::Exclusive => algorithm::EXC_C14N,
            Self::ExclusiveWithComments => algorithm::EXC_C14N_WITH_COMMENTS,
        }
    }

    /// Parse a mode from an algorithm URI.
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            algorithm::EXC_C14N => Some(Self::Exclusive),
            algorithm::EXC_C14N_WITH_COMMENTS => Some(Self::ExclusiveWithComments),
            _ => None,
        }
    }

    /// Whether comment nodes are kept in the output.
    pub fn with_comments(&self) -> bool {
        matches!(self, Self::ExclusiveWithComments)
    }
}

/// Whether this build can canonicalize.
pub const fn is_available() -> bool {
    cfg!(feature = "exc-c14n")
}

/// Canonicalize XML text with exclusive C14N, no comments.
pub fn canonicalize_str(xml: &str) -> Result<Vec<u8>, Error> {
    canonicalize(xml, CanonicalizationMode::Exclusive, None, &[])
}

/// Canonicalize raw XML bytes with exclusive C14N, no comments.
pub fn canonicalize_bytes(data: &[u8]) -> Result<Vec<u8>, Error> {
    ensure_available()?;
    canonicalize_str(cardsig_xml::decode_input(data)?)
}

/// Canonicalize an XML document.
///
/// - `xml`: the raw XML text
/// - `mode`: keep or strip comments
/// - `node_set`: optional node set (for document-subset canonicalization)
/// - `inclusive_prefixes`: the InclusiveNamespaces PrefixList
pub fn canonicalize(
    xml: &str,
    mode: CanonicalizationMode,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    ensure_available()?;
    let doc = cardsig_xml::parse_dom(xml)?;
    canonicalize_doc(&doc, mode, node_set, inclusive_prefixes)
}

/// Canonicalize a document parsed with [`cardsig_xml::parse_dom`].
pub fn canonicalize_doc(
    doc: &uppsala::Document<'_>,
    mode: CanonicalizationMode,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    ensure_available()?;
    render_exclusive(doc, mode, node_set, inclusive_prefixes)
}

fn ensure_available() -> Result<(), Error> {
    if is_available() {
        Ok(())
    } else {
        Err(Error::CapabilityUnavailable(
            "built without the exc-c14n feature".into(),
        ))
    }
}

#[cfg(feature = "exc-c14n")]
fn render_exclusive(
    doc: &uppsala::Document<'_>,
    mode: CanonicalizationMode,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    let output = exclusive::canonicalize(doc, mode.with_comments(), node_set, inclusive_prefixes)?;
    tracing::debug!(
        mode = mode.uri(),
        subset = node_set.is_some(),
        bytes = output.len(),
        "canonicalized document"
    );
    Ok(output)
}

#[cfg(not(feature = "exc-c14n"))]
fn render_exclusive(
    _doc: &uppsala::Document<'_>,
    _mode: CanonicalizationMode,
    _node_set: Option<&NodeSet>,
    _inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    Err(Error::CapabilityUnavailable(
        "built without the exc-c14n feature".into(),
    ))
}

#[cfg(all(test, feature = "exc-c14n"))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn c14n(xml: &str) -> String {
        String::from_utf8(canonicalize_str(xml).unwrap()).unwrap()
    }

    #[test]
    fn test_mode_uris() {
        for mode in [
            CanonicalizationMode::Exclusive,
            CanonicalizationMode::ExclusiveWithComments,
        ] {
            assert_eq!(CanonicalizationMode::from_uri(mode.uri()), Some(mode));
        }
        assert!(!CanonicalizationMode::default().with_comments());
        assert_eq!(
            CanonicalizationMode::from_uri("http://www.w3.org/TR/2001/REC-xml-c14n-20010315"),
            None
        );
    }

    #[test]
    fn test_end_to_end_scenario() {
        let xml = r#"<a:Foo xmlns:a="urn:x" xmlns:b="urn:y" b:id="1"><a:Bar/></a:Foo>"#;
        let out = c14n(xml);
        assert_eq!(
            out,
            r#"<a:Foo xmlns:a="urn:x" xmlns:b="urn:y" b:id="1"><a:Bar></a:Bar></a:Foo>"#
        );
        assert!(out.contains("<a:Bar>"));
    }

    #[test]
    fn test_malformed_input() {
        for xml in ["<a><b></a>", "<a>", "", "<a x='1' x='2'/>", "<p:a/>", "<a>&bogus;</a>"] {
            let err = canonicalize_str(xml).unwrap_err();
            assert!(matches!(err, Error::MalformedInput(_)), "{xml}: {err}");
        }
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let err = canonicalize_bytes(b"<a>\xC3\x28</a>").unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
        assert!(!err.is_environment_fault());
    }

    #[test]
    fn test_comment_stripping() {
        let with = "<!-- lead --><r><!-- a --><c>t<!-- b -->u</c></r><!-- tail -->";
        let without = "<r><c>tu</c></r>";
        assert_eq!(c14n(with), c14n(without));
    }

    #[test]
    fn test_lexical_invariance() {
        let a = r#"<?xml version="1.0" encoding="UTF-8"?>
<p:root xmlns:p="urn:p" xmlns:unused="urn:u" b='2'   a="1"><p:leaf>x1</p:leaf></p:root>"#;
        let b = r#"<p:root a="1" b="2" xmlns:p="urn:p"><p:leaf xmlns:p="urn:p">x1</p:leaf></p:root>"#;
        let c = r#"<p:root xmlns:p="urn:p" a="1" b="&#50;" ><p:leaf
            >x&#x31;</p:leaf></p:root>"#;
        assert_eq!(c14n(a), c14n(b));
        assert_eq!(c14n(a), c14n(c));
    }

    #[test]
    fn test_bom_accepted() {
        let out = canonicalize_bytes(b"\xEF\xBB\xBF<r/>").unwrap();
        assert_eq!(out, b"<r></r>");
    }

    #[test]
    fn test_concurrent_calls() {
        let xml = r#"<a:Foo xmlns:a="urn:x" xmlns:b="urn:y" b:id="1"><a:Bar/></a:Foo>"#;
        let expected = c14n(xml);
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(move || canonicalize_str(xml).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(String::from_utf8(handle.join().unwrap()).unwrap(), expected);
        }
    }

    // ── Property tests ───────────────────────────────────────────────

    #[derive(Debug, Clone)]
    enum Tree {
        Text(String),
        Element {
            name: String,
            attrs: Vec<(String, String)>,
            children: Vec<Tree>,
        },
    }

    fn escape_markup(s: &str) -> String {
        s.replace('&', "&amp;").replace('<', "&lt;")
    }

    /// Render with double quotes and attributes in the given order.
    fn render_plain(tree: &Tree, out: &mut String) {
        match tree {
            Tree::Text(t) => out.push_str(&escape_markup(t)),
            Tree::Element { name, attrs, children } => {
                out.push('<');
                out.push_str(name);
                for (k, v) in attrs {
                    out.push_str(&format!(" {k}=\"{}\"", escape_markup(v)));
                }
                out.push('>');
                for c in children {
                    render_plain(c, out);
                }
                out.push_str(&format!("</{name}>"));
            }
        }
    }

    /// Render with reversed attributes, single quotes, extra whitespace,
    /// empty-element tags and sprinkled comments.
    fn render_variant(tree: &Tree, out: &mut String) {
        match tree {
            Tree::Text(t) => out.push_str(&escape_markup(t).replace('>', "&gt;")),
            Tree::Element { name, attrs, children } => {
                out.push('<');
                out.push_str(name);
                for (k, v) in attrs.iter().rev() {
                    out.push_str(&format!("\n  {k} = '{}'", escape_markup(v)));
                }
                if children.is_empty() {
                    out.push_str(" />");
                    return;
                }
                out.push_str(" >");
                out.push_str("<!-- c -->");
                for c in children {
                    render_variant(c, out);
                }
                out.push_str(&format!("</{name} >"));
            }
        }
    }

    fn tree_strategy() -> impl Strategy<Value = Tree> {
        let text = "[a-z &<>]{1,6}".prop_map(Tree::Text);
        let attrs = prop::collection::btree_map("[a-d]", "[a-z0-9 &<>]{0,6}", 0..4)
            .prop_map(|m| m.into_iter().collect::<Vec<_>>());
        let leaf = ("[a-c]", attrs.clone()).prop_map(|(name, attrs)| Tree::Element {
            name,
            attrs,
            children: Vec::new(),
        });
        leaf.prop_recursive(3, 24, 4, move |inner| {
            (
                "[a-c]",
                attrs.clone(),
                prop::collection::vec(prop_oneof![inner, text.clone()], 0..4),
            )
                .prop_map(|(name, attrs, children)| Tree::Element {
                    name,
                    attrs,
                    children,
                })
        })
    }

    proptest! {
        #[test]
        fn prop_deterministic(tree in tree_strategy()) {
            let mut xml = String::new();
            render_plain(&tree, &mut xml);
            prop_assert_eq!(canonicalize_str(&xml).unwrap(), canonicalize_str(&xml).unwrap());
        }

        #[test]
        fn prop_lexically_invariant(tree in tree_strategy()) {
            let mut plain = String::new();
            render_plain(&tree, &mut plain);
            let mut variant = String::new();
            render_variant(&tree, &mut variant);
            prop_assert_eq!(canonicalize_str(&plain).unwrap(), canonicalize_str(&variant).unwrap());
        }

        #[test]
        fn prop_idempotent(tree in tree_strategy()) {
            let mut xml = String::new();
            render_variant(&tree, &mut xml);
            let once = canonicalize_str(&xml).unwrap();
            let twice = canonicalize_bytes(&once).unwrap();
            prop_assert_eq!(once, twice);
        }
    }
}
