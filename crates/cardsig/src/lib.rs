#![forbid(unsafe_code)]

pub use cardsig_c14n as c14n;
pub use cardsig_core as core;
pub use cardsig_crypto as crypto;
pub use cardsig_dsig as dsig;
pub use cardsig_transforms as transforms;
pub use cardsig_xml as xml;

pub use cardsig_core::Error;
