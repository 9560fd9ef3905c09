#![forbid(unsafe_code)]

//! Transform chain engine for cardsig.
//!
//! Implements the transform chain model from XML-DSig: each reference
//! carries a sequence of transforms that are applied in order before the
//! result is digested.

pub mod enveloped;
pub mod exc_c14n;
pub mod pipeline;
pub mod registry;

pub use enveloped::EnvelopedSignatureTransform;
pub use exc_c14n::ExcC14nTransform;
pub use pipeline::{Transform, TransformChain, TransformData};
