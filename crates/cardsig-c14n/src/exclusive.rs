#![forbid(unsafe_code)]

//! Exclusive Canonical XML 1.0 (exc-C14N).
//!
//! Algorithm URI: `http://www.w3.org/2001/10/xml-exc-c14n#`
//! With comments: `http://www.w3.org/2001/10/xml-exc-c14n#WithComments`
//!
//! Unlike inclusive C14N, only "visibly utilized" namespace declarations
//! are output.  A prefix is visibly utilized by an element if:
//! 1. it is the prefix of the element's tag name (the empty prefix when
//!    the element is unprefixed), OR
//! 2. it is the prefix of one of the element's attributes, OR
//! 3. it appears in the InclusiveNamespaces PrefixList.
//!
//! A utilized prefix is declared only when its in-scope binding differs
//! from the one rendered by the nearest output ancestor.

use crate::escape;
use crate::render::{Attr, NsDecl};
use cardsig_core::{ns, Error};
use cardsig_xml::NodeSet;
use std::collections::{BTreeMap, BTreeSet};
use uppsala::{Document, NodeId, NodeKind};

/// Canonicalize using Exclusive C14N 1.0.
pub fn canonicalize(
    doc: &Document<'_>,
    with_comments: bool,
    node_set: Option<&NodeSet>,
    inclusive_prefixes: &[String],
) -> Result<Vec<u8>, Error> {
    let forced_prefixes = inclusive_prefixes
        .iter()
        .map(|p| {
            if p == ns::DEFAULT_PREFIX_TOKEN {
                String::new()
            } else {
                p.clone()
            }
        })
        .collect();
    let ctx = ExcC14nContext {
        doc,
        with_comments,
        node_set,
        forced_prefixes,
    };
    let mut output = Vec::new();
    ctx.process_node(doc.root(), &mut output, &BTreeMap::new())?;
    Ok(output)
}

struct ExcC14nContext<'a, 'doc> {
    doc: &'a Document<'doc>,
    with_comments: bool,
    node_set: Option<&'a NodeSet>,
    /// PrefixList entries, with `#default` mapped to "".
    forced_prefixes: BTreeSet<String>,
}

impl ExcC14nContext<'_, '_> {
    fn is_visible(&self, id: NodeId) -> bool {
        self.node_set.map_or(true, |ns| ns.contains_id(id))
    }

    fn process_node(
        &self,
        id: NodeId,
        output: &mut Vec<u8>,
        rendered_ns: &BTreeMap<String, String>,
    ) -> Result<(), Error> {
        match self.doc.node_kind(id) {
            Some(NodeKind::Document) => {
                for child in self.doc.children(id) {
                    self.process_node(child, output, rendered_ns)?;
                }
            }
            Some(NodeKind::Element(_)) => {
                self.process_element(id, output, rendered_ns)?;
            }
            Some(NodeKind::Text(text)) | Some(NodeKind::CData(text)) => {
                // Character data outside the document element is not part
                // of the canonical form.
                if self.is_visible(id) && !self.at_document_level(id) {
                    escape::push_text(output, text);
                }
            }
            Some(NodeKind::Comment(text)) => {
                if self.with_comments && self.is_visible(id) {
                    self.with_document_level_breaks(id, output, |out| {
                        out.extend_from_slice(b"<!--");
                        out.extend_from_slice(text.as_bytes());
                        out.extend_from_slice(b"-->");
                    });
                }
            }
            Some(NodeKind::ProcessingInstruction(pi)) => {
                // The XML declaration is not a processing instruction.
                if self.is_visible(id) && !pi.target.eq_ignore_ascii_case("xml") {
                    self.with_document_level_breaks(id, output, |out| {
                        out.extend_from_slice(b"<?");
                        out.extend_from_slice(pi.target.as_bytes());
                        if let Some(value) = pi.data.as_deref().filter(|v| !v.is_empty()) {
                            out.push(b' ');
                            escape::push_pi(out, value);
                        }
                        out.extend_from_slice(b"?>");
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn process_element(
        &self,
        id: NodeId,
        output: &mut Vec<u8>,
        rendered_ns: &BTreeMap<String, String>,
    ) -> Result<(), Error> {
        let elem = match self.doc.element(id) {
            Some(elem) if self.is_visible(id) => elem,
            _ => {
                // Output nothing for the element itself; visible descendants
                // are still measured against the nearest output ancestor.
                for child in self.doc.children(id) {
                    self.process_node(child, output, rendered_ns)?;
                }
                return Ok(());
            }
        };

        let elem_prefix = elem.name.prefix.as_deref().unwrap_or("");
        let attrs = collect_attributes(self.doc, id);

        let mut utilized: BTreeSet<&str> = BTreeSet::new();
        utilized.insert(elem_prefix);
        for attr in &attrs {
            if let Some((prefix, _)) = attr.qualified_name.split_once(':') {
                utilized.insert(prefix);
            }
        }
        utilized.extend(self.forced_prefixes.iter().map(String::as_str));

        let inscope_ns = collect_inscope_namespaces(self.doc, id);

        let mut ns_decls: Vec<NsDecl> = Vec::new();
        for prefix in utilized {
            if prefix == ns::XML_PREFIX {
                continue;
            }
            match inscope_ns.get(prefix) {
                Some(uri) => {
                    if rendered_ns.get(prefix) != Some(uri) {
                        ns_decls.push(NsDecl {
                            prefix: prefix.to_owned(),
                            uri: uri.clone(),
                        });
                    }
                }
                None if prefix.is_empty() => {
                    // No default namespace here, but an output ancestor
                    // rendered one: undeclare it.
                    if rendered_ns.get("").is_some_and(|uri| !uri.is_empty()) {
                        ns_decls.push(NsDecl {
                            prefix: String::new(),
                            uri: String::new(),
                        });
                    }
                }
                None => {}
            }
        }
        ns_decls.sort();

        let elem_name = qualified_name(elem_prefix, &elem.name.local_name);

        output.push(b'<');
        output.extend_from_slice(elem_name.as_bytes());
        for ns_decl in &ns_decls {
            ns_decl.write_to(output);
        }
        for attr in &attrs {
            attr.write_to(output);
        }
        output.push(b'>');

        let child_rendered_ns = if ns_decls.is_empty() {
            None
        } else {
            let mut next = rendered_ns.clone();
            for ns_decl in ns_decls {
                next.insert(ns_decl.prefix, ns_decl.uri);
            }
            Some(next)
        };
        let child_rendered_ns = child_rendered_ns.as_ref().unwrap_or(rendered_ns);

        for child in self.doc.children(id) {
            self.process_node(child, output, child_rendered_ns)?;
        }

        output.extend_from_slice(b"</");
        output.extend_from_slice(elem_name.as_bytes());
        output.push(b'>');
        Ok(())
    }

    fn at_document_level(&self, id: NodeId) -> bool {
        self.doc
            .parent(id)
            .is_some_and(|p| matches!(self.doc.node_kind(p), Some(NodeKind::Document)))
    }

    /// Comments and PIs outside the document element are separated from it
    /// by a line feed.
    fn with_document_level_breaks(
        &self,
        id: NodeId,
        output: &mut Vec<u8>,
        render: impl FnOnce(&mut Vec<u8>),
    ) {
        let at_document_level = self.at_document_level(id);
        if at_document_level && self.has_element_sibling(id, false) {
            output.push(b'\n');
        }
        render(output);
        if at_document_level && self.has_element_sibling(id, true) {
            output.push(b'\n');
        }
    }

    fn has_element_sibling(&self, id: NodeId, following: bool) -> bool {
        let step = |n: NodeId| {
            if following {
                self.doc.next_sibling(n)
            } else {
                self.doc.previous_sibling(n)
            }
        };
        let mut sibling = step(id);
        while let Some(s) = sibling {
            if self.doc.element(s).is_some() {
                return true;
            }
            sibling = step(s);
        }
        false
    }
}

/// The element's attributes in canonical order, without namespace
/// declarations.
fn collect_attributes(doc: &Document<'_>, id: NodeId) -> Vec<Attr> {
    let mut attrs = Vec::new();
    let Some(elem) = doc.element(id) else {
        return attrs;
    };
    for attr in &elem.attributes {
        let local_name: &str = &attr.name.local_name;
        let prefix = attr.name.prefix.as_deref();
        if prefix == Some("xmlns") || (prefix.is_none() && local_name == "xmlns") {
            continue;
        }
        let ns_uri = attr.name.namespace_uri.as_deref().unwrap_or("");
        let prefix = if ns_uri == ns::XML {
            ns::XML_PREFIX
        } else if ns_uri.is_empty() {
            ""
        } else {
            prefix.unwrap_or("")
        };
        attrs.push(Attr {
            ns_uri: ns_uri.to_owned(),
            local_name: local_name.to_owned(),
            qualified_name: qualified_name(prefix, local_name),
            value: attr.value.to_string(),
        });
    }
    attrs.sort();
    attrs
}

/// In-scope namespace bindings of an element, "" for the default namespace.
/// An empty URI undeclares the default namespace.
fn collect_inscope_namespaces(doc: &Document<'_>, id: NodeId) -> BTreeMap<String, String> {
    let mut levels = Vec::new();
    let mut current = Some(id);
    while let Some(n) = current {
        if let Some(elem) = doc.element(n) {
            levels.push(elem);
        }
        current = doc.parent(n);
    }

    let mut inscope = BTreeMap::new();
    for elem in levels.into_iter().rev() {
        for (prefix, uri) in &elem.namespace_declarations {
            let (prefix, uri) = (prefix.to_string(), uri.to_string());
            if uri.is_empty() {
                inscope.remove(&prefix);
            } else {
                inscope.insert(prefix, uri);
            }
        }
    }
    inscope
}

fn qualified_name(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_owned()
    } else {
        format!("{prefix}:{local}")
    }
}
