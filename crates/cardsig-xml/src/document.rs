#![forbid(unsafe_code)]

//! Owned XML document with ID attribute registration.

use cardsig_core::{ns, Error};
use std::collections::HashMap;
use uppsala::NodeId;

/// An owned XML document.  Stores the validated text.
///
/// To work with the parsed tree, call [`XmlDocument::parse_doc`] for
/// signature structure lookups or [`crate::parse_dom`] for node ids that
/// canonicalization understands. Neither tree is cached here.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    text: String,
    /// Additional ID attribute names to register (beyond `Id`, `ID`, `id`).
    extra_id_attrs: Vec<String>,
}

impl XmlDocument {
    /// Parse and validate XML from a string, taking ownership.
    pub fn parse(text: String) -> Result<Self, Error> {
        crate::parse(&text)?;
        Ok(Self {
            text,
            extra_id_attrs: Vec::new(),
        })
    }

    /// Get the raw XML text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Register an additional ID attribute name (e.g. `AssertionID`).
    pub fn add_id_attr(&mut self, name: &str) {
        self.extra_id_attrs.push(name.to_owned());
    }

    /// Parse the stored text into a roxmltree tree.
    pub fn parse_doc(&self) -> Result<roxmltree::Document<'_>, Error> {
        crate::parse(&self.text)
    }

    /// Build the ID value → NodeId mapping over the canonicalization DOM.
    ///
    /// Only unprefixed attributes count as IDs.
    pub fn build_id_map(&self, dom: &uppsala::Document<'_>) -> HashMap<String, NodeId> {
        let names: Vec<&str> = ns::DEFAULT_ID_ATTRS
            .iter()
            .copied()
            .chain(self.extra_id_attrs.iter().map(String::as_str))
            .collect();

        let mut map = HashMap::new();
        for id in dom.descendants(dom.root()) {
            let Some(elem) = dom.element(id) else {
                continue;
            };
            for attr in &elem.attributes {
                if attr.name.prefix.is_none()
                    && names.iter().any(|n| *n == &*attr.name.local_name)
                {
                    map.insert(attr.value.to_string(), id);
                }
            }
        }
        map
    }
}

/// Find the first DOM element, in document order, with the given namespace
/// ("" for none) and local name.
pub fn find_dom_element(
    dom: &uppsala::Document<'_>,
    ns_uri: &str,
    local_name: &str,
) -> Option<NodeId> {
    for id in dom.descendants(dom.root()) {
        if let Some(elem) = dom.element(id) {
            if &*elem.name.local_name == local_name
                && elem.name.namespace_uri.as_deref().unwrap_or("") == ns_uri
            {
                return Some(id);
            }
        }
    }
    None
}

/// Find the first descendant element with the given namespace and local name.
pub fn find_element<'a, 'input>(
    doc: &'a roxmltree::Document<'input>,
    ns_uri: &str,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    doc.descendants().find(|n| is_element_named(n, ns_uri, local_name))
}

/// Find the first child element with the given namespace and local name.
pub fn find_child_element<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    ns_uri: &str,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    parent.children().find(|n| is_element_named(n, ns_uri, local_name))
}

/// Find all child elements with the given namespace and local name.
pub fn find_child_elements<'a, 'input>(
    parent: roxmltree::Node<'a, 'input>,
    ns_uri: &str,
    local_name: &str,
) -> Vec<roxmltree::Node<'a, 'input>> {
    parent
        .children()
        .filter(|n| is_element_named(n, ns_uri, local_name))
        .collect()
}

fn is_element_named(node: &roxmltree::Node<'_, '_>, ns_uri: &str, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace().unwrap_or("") == ns_uri
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = r#"<saml:Assertion xmlns:saml="urn:oasis:names:tc:SAML:1.0:assertion" AssertionID="uuid-1">
  <ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#" Id="sig"><ds:SignedInfo/></ds:Signature>
</saml:Assertion>"#;

    #[test]
    fn test_parse_rejects_malformed() {
        let err = XmlDocument::parse("<a><b></a>".to_owned()).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_id_map_with_extra_attr() {
        let mut xdoc = XmlDocument::parse(TOKEN.to_owned()).unwrap();
        {
            let dom = crate::parse_dom(xdoc.text()).unwrap();
            let map = xdoc.build_id_map(&dom);
            assert_eq!(map.len(), 1);
            assert!(map.contains_key("sig"));
        }

        xdoc.add_id_attr("AssertionID");
        let dom = crate::parse_dom(xdoc.text()).unwrap();
        let map = xdoc.build_id_map(&dom);
        let assertion = find_dom_element(&dom, "urn:oasis:names:tc:SAML:1.0:assertion", "Assertion")
            .unwrap();
        assert_eq!(map.get("uuid-1").map(|id| id.index()), Some(assertion.index()));
    }

    #[test]
    fn test_find_dom_element() {
        let dom = crate::parse_dom(TOKEN).unwrap();
        assert!(find_dom_element(&dom, ns::DSIG, ns::node::SIGNED_INFO).is_some());
        assert!(find_dom_element(&dom, "", ns::node::SIGNED_INFO).is_none());
    }

    #[test]
    fn test_find_signature() {
        let xdoc = XmlDocument::parse(TOKEN.to_owned()).unwrap();
        let doc = xdoc.parse_doc().unwrap();
        let sig = find_element(&doc, ns::DSIG, ns::node::SIGNATURE).unwrap();
        assert!(find_child_element(sig, ns::DSIG, ns::node::SIGNED_INFO).is_some());
        assert_eq!(find_child_elements(sig, ns::DSIG, ns::node::REFERENCE).len(), 0);
    }
}
