#![forbid(unsafe_code)]

//! Reference digest checking.
//!
//! For each `<ds:Reference>` in the first `<ds:Signature>`:
//! 1. Resolve the `URI` to the referenced content
//! 2. Run the `<ds:Transforms>` chain over it
//! 3. Digest the result with `<ds:DigestMethod>`
//! 4. Compare with `<ds:DigestValue>`
//!
//! Keys, `SignatureValue` and certificates are not looked at.

use crate::context::ReferenceContext;
use base64::Engine;
use cardsig_c14n::CanonicalizationMode;
use cardsig_core::{algorithm, ns, Error};
use cardsig_crypto::digest;
use cardsig_transforms::{
    EnvelopedSignatureTransform, ExcC14nTransform, TransformChain, TransformData,
};
use cardsig_xml::document::{
    find_child_element, find_child_elements, find_dom_element, find_element,
};
use cardsig_xml::{NodeSet, XmlDocument};
use roxmltree::Node;
use std::collections::HashMap;
use uppsala::NodeId;

/// Result of a reference check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyResult {
    /// Every reference digest matches.
    Valid,
    /// A reference digest does not match.
    Invalid { reason: String },
}

impl VerifyResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerifyResult::Valid)
    }
}

/// Check every reference digest of the first signature in `xml`.
pub fn verify_references(ctx: &ReferenceContext, xml: &str) -> Result<VerifyResult, Error> {
    let mut xdoc = XmlDocument::parse(xml.to_owned())?;
    for attr in &ctx.id_attrs {
        xdoc.add_id_attr(attr);
    }
    let doc = xdoc.parse_doc()?;
    let dom = cardsig_xml::parse_dom(xdoc.text())?;
    let id_map = xdoc.build_id_map(&dom);

    let sig_node = find_element(&doc, ns::DSIG, ns::node::SIGNATURE)
        .ok_or_else(|| Error::MissingElement("Signature".into()))?;
    // The same element, addressed in the DOM that node sets refer to.
    let sig_id = find_dom_element(&dom, ns::DSIG, ns::node::SIGNATURE)
        .ok_or_else(|| Error::MissingElement("Signature".into()))?;
    let signed_info = find_child_element(sig_node, ns::DSIG, ns::node::SIGNED_INFO)
        .ok_or_else(|| Error::MissingElement("SignedInfo".into()))?;

    let references = find_child_elements(signed_info, ns::DSIG, ns::node::REFERENCE);
    if references.is_empty() {
        return Err(Error::MissingElement("Reference".into()));
    }

    for reference in references {
        let uri = reference.attribute(ns::attr::URI).unwrap_or("");
        let expected = expected_digest(reference)?;
        let computed = reference_digest(reference, xdoc.text(), &dom, &id_map, sig_id)?;
        if computed != expected {
            tracing::debug!(uri, "reference digest mismatch");
            return Ok(VerifyResult::Invalid {
                reason: format!("URI={uri}: expected digest does not match computed digest"),
            });
        }
        tracing::debug!(uri, "reference digest matches");
    }
    Ok(VerifyResult::Valid)
}

/// Compute the digest of one `<ds:Reference>`.
///
/// `dom` is `xml` parsed with [`cardsig_xml::parse_dom`]; `id_map` and
/// `sig_id`, the `Signature` element an enveloped-signature transform
/// removes, refer to its nodes.
pub fn reference_digest(
    reference: Node<'_, '_>,
    xml: &str,
    dom: &uppsala::Document<'_>,
    id_map: &HashMap<String, NodeId>,
    sig_id: NodeId,
) -> Result<Vec<u8>, Error> {
    let uri = reference.attribute(ns::attr::URI).unwrap_or("");
    let digest_uri = find_child_element(reference, ns::DSIG, ns::node::DIGEST_METHOD)
        .ok_or_else(|| Error::MissingElement("DigestMethod".into()))?
        .attribute(ns::attr::ALGORITHM)
        .ok_or_else(|| Error::MissingAttribute("Algorithm on DigestMethod".into()))?;

    let node_set = resolve_reference_uri(uri, dom, id_map)?;
    let chain = build_chain(reference, sig_id)?;
    tracing::debug!(uri, transforms = ?chain, "running reference transforms");

    let data = chain.execute(TransformData::Xml {
        xml_text: xml.to_owned(),
        node_set,
    })?;
    let bytes = data.into_binary()?;
    tracing::trace!(uri, pre_digest = %String::from_utf8_lossy(&bytes), "pre-digest data");

    digest::digest(digest_uri, &bytes)
}

/// Resolve a same-document reference URI to the node set it selects.
fn resolve_reference_uri(
    uri: &str,
    dom: &uppsala::Document<'_>,
    id_map: &HashMap<String, NodeId>,
) -> Result<Option<NodeSet>, Error> {
    if uri.is_empty() {
        Ok(Some(NodeSet::all_without_comments(dom)))
    } else if let Some(id) = uri.strip_prefix('#') {
        let node = id_map
            .get(id)
            .ok_or_else(|| Error::InvalidUri(format!("ID not found: {id}")))?;
        Ok(Some(NodeSet::tree_without_comments(*node, dom)))
    } else {
        Err(Error::InvalidUri(format!("external URI not supported: {uri}")))
    }
}

/// Build the transform chain listed under `<ds:Transforms>`.
fn build_chain(reference: Node<'_, '_>, sig_id: NodeId) -> Result<TransformChain, Error> {
    let mut chain = TransformChain::new();
    let Some(transforms) = find_child_element(reference, ns::DSIG, ns::node::TRANSFORMS) else {
        return Ok(chain);
    };

    for transform in find_child_elements(transforms, ns::DSIG, ns::node::TRANSFORM) {
        let uri = transform
            .attribute(ns::attr::ALGORITHM)
            .ok_or_else(|| Error::MissingAttribute("Algorithm on Transform".into()))?;
        if uri == algorithm::ENVELOPED_SIGNATURE {
            chain.push(Box::new(EnvelopedSignatureTransform::for_node(sig_id)));
        } else if let Some(mode) = CanonicalizationMode::from_uri(uri) {
            let prefixes = read_inclusive_prefixes(transform);
            chain.push(Box::new(
                ExcC14nTransform::with_mode(mode).with_inclusive_prefixes(prefixes),
            ));
        } else {
            return Err(Error::UnsupportedAlgorithm(format!(
                "unknown or unsupported transform: {uri}"
            )));
        }
    }
    Ok(chain)
}

/// Read the PrefixList of an `<ec:InclusiveNamespaces>` child.
fn read_inclusive_prefixes(transform: Node<'_, '_>) -> Vec<String> {
    find_child_element(transform, ns::EXC_C14N, ns::node::INCLUSIVE_NAMESPACES)
        .and_then(|n| n.attribute(ns::attr::PREFIX_LIST))
        .map(|list| list.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}

fn expected_digest(reference: Node<'_, '_>) -> Result<Vec<u8>, Error> {
    let value = find_child_element(reference, ns::DSIG, ns::node::DIGEST_VALUE)
        .ok_or_else(|| Error::MissingElement("DigestValue".into()))?
        .text()
        .unwrap_or("");
    let cleaned: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|e| Error::Base64(format!("DigestValue: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_prefixes() {
        let xml = r#"<ds:Transform xmlns:ds="http://www.w3.org/2000/09/xmldsig#" Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#"><ec:InclusiveNamespaces xmlns:ec="http://www.w3.org/2001/10/xml-exc-c14n#" PrefixList="saml #default"/></ds:Transform>"#;
        let doc = cardsig_xml::parse(xml).unwrap();
        assert_eq!(
            read_inclusive_prefixes(doc.root_element()),
            vec!["saml".to_owned(), "#default".to_owned()]
        );
    }

    #[test]
    fn test_external_uri_rejected() {
        let dom = cardsig_xml::parse_dom("<r/>").unwrap();
        let err = resolve_reference_uri("http://example.com/doc.xml", &dom, &HashMap::new())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUri(_)));
    }

    #[test]
    fn test_unknown_id_rejected() {
        let dom = cardsig_xml::parse_dom("<r/>").unwrap();
        let err = resolve_reference_uri("#missing", &dom, &HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidUri(_)));
    }
}
