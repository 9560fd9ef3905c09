#![forbid(unsafe_code)]

//! Digest algorithms for cardsig.
//!
//! Only hashing is provided: transform output is digested and compared
//! with a reference's `DigestValue`.

pub mod digest;

pub use self::digest::{digest, from_uri, DigestAlgorithm};
