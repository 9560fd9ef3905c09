#![forbid(unsafe_code)]

//! Core types for cardsig: the shared error type and the XML-DSig
//! algorithm and namespace constants.

pub mod algorithm;
pub mod error;
pub mod ns;

pub use error::{Error, Result};
