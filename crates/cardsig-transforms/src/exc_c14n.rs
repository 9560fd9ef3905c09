#![forbid(unsafe_code)]

//! Exclusive canonicalization transform.

use crate::pipeline::{Transform, TransformData};
use cardsig_c14n::CanonicalizationMode;
use cardsig_core::Error;

/// Exclusive C14N as a chain step.
///
/// The default instance is pinned to exclusive canonicalization without
/// comments. Output is always binary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcC14nTransform {
    mode: CanonicalizationMode,
    inclusive_prefixes: Vec<String>,
}

impl ExcC14nTransform {
    /// Exclusive C14N without comments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive C14N in the given mode.
    pub fn with_mode(mode: CanonicalizationMode) -> Self {
        Self {
            mode,
            inclusive_prefixes: Vec::new(),
        }
    }

    /// Set the InclusiveNamespaces PrefixList.
    pub fn with_inclusive_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.inclusive_prefixes = prefixes;
        self
    }

    pub fn mode(&self) -> CanonicalizationMode {
        self.mode
    }

    pub fn inclusive_prefixes(&self) -> &[String] {
        &self.inclusive_prefixes
    }
}

impl Transform for ExcC14nTransform {
    fn uri(&self) -> &str {
        self.mode.uri()
    }

    fn execute(&self, input: TransformData) -> Result<TransformData, Error> {
        let (xml_text, node_set) = input.into_xml()?;
        let bytes = cardsig_c14n::canonicalize(
            &xml_text,
            self.mode,
            node_set.as_ref(),
            &self.inclusive_prefixes,
        )?;
        Ok(TransformData::Binary(bytes))
    }
}
