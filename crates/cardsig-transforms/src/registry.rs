#![forbid(unsafe_code)]

//! Build transforms from their algorithm URIs.

use crate::enveloped::EnvelopedSignatureTransform;
use crate::exc_c14n::ExcC14nTransform;
use crate::pipeline::{Transform, TransformChain};
use cardsig_c14n::CanonicalizationMode;
use cardsig_core::{algorithm, Error};

/// Algorithm URIs this crate can build a transform for.
pub const SUPPORTED_URIS: [&str; 3] = [
    algorithm::ENVELOPED_SIGNATURE,
    algorithm::EXC_C14N,
    algorithm::EXC_C14N_WITH_COMMENTS,
];

/// Create a transform from its URI.
///
/// `inclusive_prefixes` is the InclusiveNamespaces PrefixList; it only
/// applies to the canonicalization transforms.
pub fn from_uri(uri: &str, inclusive_prefixes: &[String]) -> Result<Box<dyn Transform>, Error> {
    if uri == algorithm::ENVELOPED_SIGNATURE {
        return Ok(Box::new(EnvelopedSignatureTransform::new()));
    }
    match CanonicalizationMode::from_uri(uri) {
        Some(mode) => Ok(Box::new(
            ExcC14nTransform::with_mode(mode).with_inclusive_prefixes(inclusive_prefixes.to_vec()),
        )),
        None => Err(Error::UnsupportedAlgorithm(format!(
            "unknown or unsupported transform: {uri}"
        ))),
    }
}

impl TransformChain {
    /// Build a chain from algorithm URIs, in order.
    pub fn from_uris<S: AsRef<str>>(uris: &[S]) -> Result<Self, Error> {
        let mut chain = TransformChain::new();
        for uri in uris {
            chain.push(from_uri(uri.as_ref(), &[])?);
        }
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_uris_build() {
        for uri in SUPPORTED_URIS {
            assert_eq!(from_uri(uri, &[]).unwrap().uri(), uri);
        }
    }

    #[test]
    fn test_unknown_uri() {
        let result = from_uri("http://www.w3.org/TR/1999/REC-xpath-19991116", &[]);
        assert!(matches!(result, Err(Error::UnsupportedAlgorithm(_))));
        assert!(TransformChain::from_uris(&[algorithm::EXC_C14N, "urn:nope"]).is_err());
    }

    #[test]
    fn test_chain_from_uris() {
        let chain =
            TransformChain::from_uris(&[algorithm::ENVELOPED_SIGNATURE, algorithm::EXC_C14N]).unwrap();
        assert_eq!(chain.uris(), [algorithm::ENVELOPED_SIGNATURE, algorithm::EXC_C14N]);
        let out = chain
            .apply(br#"<r xmlns:ds="http://www.w3.org/2000/09/xmldsig#"><a/><ds:Signature/></r>"#)
            .unwrap();
        assert_eq!(out, b"<r><a></a></r>");
    }

    #[test]
    fn test_prefix_list_passed_through() {
        let t = from_uri(algorithm::EXC_C14N, &["p".to_owned()]).unwrap();
        let out = t.apply(br#"<r xmlns:p="urn:p"/>"#).unwrap();
        assert_eq!(out, br#"<r xmlns:p="urn:p"></r>"#);
    }
}
