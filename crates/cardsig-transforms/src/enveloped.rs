#![forbid(unsafe_code)]

//! Enveloped signature transform.
//!
//! Removes the `<ds:Signature>` element and its descendants from the node
//! set, so the signature does not cover itself.

use crate::pipeline::{Transform, TransformData};
use cardsig_core::{algorithm, ns, Error};
use cardsig_xml::{document, NodeSet};
use uppsala::NodeId;

/// The enveloped signature transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnvelopedSignatureTransform {
    /// Node index of the `<Signature>` element to remove; `None` selects
    /// the first XML-DSig `Signature` element in the document.
    signature_node_index: Option<usize>,
}

impl EnvelopedSignatureTransform {
    /// Remove the first `ds:Signature` element found in document order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove the given `Signature` element of the DOM parsed from the
    /// same text.
    pub fn for_node(signature: NodeId) -> Self {
        Self {
            signature_node_index: Some(signature.index()),
        }
    }
}

impl Transform for EnvelopedSignatureTransform {
    fn uri(&self) -> &str {
        algorithm::ENVELOPED_SIGNATURE
    }

    fn execute(&self, input: TransformData) -> Result<TransformData, Error> {
        let (xml_text, node_set) = input.into_xml()?;

        let node_set = {
            let doc = cardsig_xml::parse_dom(&xml_text)?;
            let signature = match self.signature_node_index {
                Some(index) => Some(NodeId::new(index)).filter(|id| doc.element(*id).is_some()),
                None => document::find_dom_element(&doc, ns::DSIG, ns::node::SIGNATURE),
            }
            .ok_or_else(|| Error::MissingElement("Signature".into()))?;

            let mut node_set = node_set.unwrap_or_else(|| NodeSet::all(&doc));
            node_set.remove_subtree(signature, &doc);
            tracing::debug!(
                signature = signature.index(),
                remaining = node_set.len(),
                "removed enveloped signature"
            );
            node_set
        };

        Ok(TransformData::Xml {
            xml_text,
            node_set: Some(node_set),
        })
    }
}
