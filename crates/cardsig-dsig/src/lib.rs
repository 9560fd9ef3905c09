#![forbid(unsafe_code)]

//! Reference digest checking for XML-DSig signed InfoCard tokens.

pub mod context;
pub mod reference;

pub use context::ReferenceContext;
pub use reference::{verify_references, VerifyResult};
