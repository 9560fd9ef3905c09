#![forbid(unsafe_code)]

//! Transform chain and trait definitions.

use cardsig_c14n::CanonicalizationMode;
use cardsig_core::Error;
use cardsig_xml::NodeSet;

/// Data flowing through a transform chain.
#[derive(Debug, Clone)]
pub enum TransformData {
    /// XML text plus an optional node set selecting the visible nodes.
    Xml {
        xml_text: String,
        node_set: Option<NodeSet>,
    },
    /// Raw octets.
    Binary(Vec<u8>),
}

impl TransformData {
    /// Convert to octets.
    ///
    /// XML data is serialized with exclusive C14N without comments; binary
    /// data is returned as is.
    pub fn into_binary(self) -> Result<Vec<u8>, Error> {
        match self {
            TransformData::Binary(data) => Ok(data),
            TransformData::Xml { xml_text, node_set } => cardsig_c14n::canonicalize(
                &xml_text,
                CanonicalizationMode::Exclusive,
                node_set.as_ref(),
                &[],
            ),
        }
    }

    /// View the data as XML text and node set, parsing octets as UTF-8.
    pub fn into_xml(self) -> Result<(String, Option<NodeSet>), Error> {
        match self {
            TransformData::Xml { xml_text, node_set } => Ok((xml_text, node_set)),
            TransformData::Binary(data) => {
                Ok((cardsig_xml::decode_input(&data)?.to_owned(), None))
            }
        }
    }
}

/// Trait for individual transforms.
///
/// Transforms hold no mutable state, so one instance may be shared by
/// any number of threads.
pub trait Transform: Send + Sync {
    /// The algorithm URI for this transform.
    fn uri(&self) -> &str;

    /// Execute the transform on the given data.
    fn execute(&self, input: TransformData) -> Result<TransformData, Error>;

    /// Run the transform over raw bytes and return octets.
    fn apply(&self, input: &[u8]) -> Result<Vec<u8>, Error> {
        self.execute(TransformData::Binary(input.to_vec()))?
            .into_binary()
    }
}

/// An ordered chain of transforms executed in sequence.
#[derive(Default)]
pub struct TransformChain {
    transforms: Vec<Box<dyn Transform>>,
}

impl TransformChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a transform to the end of the chain.
    pub fn push(&mut self, transform: Box<dyn Transform>) {
        self.transforms.push(transform);
    }

    /// Builder form of [`TransformChain::push`].
    pub fn with(mut self, transform: impl Transform + 'static) -> Self {
        self.push(Box::new(transform));
        self
    }

    /// Execute all transforms in order, stopping at the first error.
    pub fn execute(&self, input: TransformData) -> Result<TransformData, Error> {
        let mut data = input;
        for (step, transform) in self.transforms.iter().enumerate() {
            tracing::debug!(step, uri = transform.uri(), "applying transform");
            data = transform.execute(data)?;
        }
        Ok(data)
    }

    /// Run the chain over raw bytes and return octets.
    pub fn apply(&self, input: &[u8]) -> Result<Vec<u8>, Error> {
        self.execute(TransformData::Binary(input.to_vec()))?
            .into_binary()
    }

    /// Algorithm URIs of the transforms, in order.
    pub fn uris(&self) -> Vec<&str> {
        self.transforms.iter().map(|t| t.uri()).collect()
    }

    /// Number of transforms in the chain.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Check if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl std::fmt::Debug for TransformChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.uris()).finish()
    }
}
