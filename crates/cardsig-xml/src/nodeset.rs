#![forbid(unsafe_code)]

//! NodeSet type for document-subset canonicalization.
//!
//! A `NodeSet` selects nodes of one parsed document by `NodeId` index.
//! Node ids are stable across re-parses of the same text, so a set can
//! travel with the document text through a transform chain.

use std::collections::HashSet;
use uppsala::{Document, NodeId, NodeKind};

/// A set of XML document nodes identified by `NodeId`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSet {
    nodes: HashSet<usize>,
}

impl NodeSet {
    /// Create a node set containing all nodes in the document.
    pub fn all(doc: &Document<'_>) -> Self {
        let mut nodes = HashSet::new();
        collect_subtree(doc.root(), doc, &mut nodes, true);
        Self { nodes }
    }

    /// Create a node set containing all nodes except comments.
    ///
    /// This is what a same-document reference with `URI=""` selects.
    pub fn all_without_comments(doc: &Document<'_>) -> Self {
        let mut nodes = HashSet::new();
        collect_subtree(doc.root(), doc, &mut nodes, false);
        Self { nodes }
    }

    /// Create a node set for the subtree rooted at `root`, without comments.
    pub fn tree_without_comments(root: NodeId, doc: &Document<'_>) -> Self {
        let mut nodes = HashSet::new();
        collect_subtree(root, doc, &mut nodes, false);
        Self { nodes }
    }

    /// Check if a node is in this set.
    pub fn contains_id(&self, id: NodeId) -> bool {
        self.nodes.contains(&id.index())
    }

    /// Remove `root` and all of its descendants.
    pub fn remove_subtree(&mut self, root: NodeId, doc: &Document<'_>) {
        self.nodes.remove(&root.index());
        for child in doc.children(root) {
            self.remove_subtree(child, doc);
        }
    }

    /// Check if this set is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes in the set.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

fn collect_subtree(id: NodeId, doc: &Document<'_>, set: &mut HashSet<usize>, comments: bool) {
    if !comments && matches!(doc.node_kind(id), Some(NodeKind::Comment(_))) {
        return;
    }
    set.insert(id.index());
    for child in doc.children(id) {
        collect_subtree(child, doc, set, comments);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::find_dom_element;

    const XML: &str = "<r><!--c--><a><b/></a><s><t/></s></r>";

    #[test]
    fn test_all_without_comments() {
        let doc = crate::parse_dom(XML).unwrap();
        let all = NodeSet::all(&doc);
        let no_comments = NodeSet::all_without_comments(&doc);
        assert_eq!(all.len(), no_comments.len() + 1);
        assert!(all.contains_id(doc.root()));
    }

    #[test]
    fn test_remove_subtree() {
        let doc = crate::parse_dom(XML).unwrap();
        let mut set = NodeSet::all(&doc);
        let s = find_dom_element(&doc, "", "s").unwrap();
        let t = find_dom_element(&doc, "", "t").unwrap();
        let r = find_dom_element(&doc, "", "r").unwrap();
        set.remove_subtree(s, &doc);
        assert!(!set.contains_id(s));
        assert!(!set.contains_id(t));
        assert!(set.contains_id(r));
    }

    #[test]
    fn test_tree_without_comments() {
        let doc = crate::parse_dom(XML).unwrap();
        let a = find_dom_element(&doc, "", "a").unwrap();
        let set = NodeSet::tree_without_comments(a, &doc);
        assert_eq!(set.len(), 2);
        assert!(set.contains_id(a));
        assert!(!set.contains_id(find_dom_element(&doc, "", "r").unwrap()));
        assert!(!set.is_empty());
    }
}
