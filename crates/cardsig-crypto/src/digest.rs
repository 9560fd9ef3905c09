#![forbid(unsafe_code)]

//! Digest (hash) algorithms addressed by XML-DSig URI.

use cardsig_core::{algorithm, Error};
use digest::Digest;

/// Trait for digest algorithms.
pub trait DigestAlgorithm: Send {
    /// Feed data into the hash.
    fn update(&mut self, data: &[u8]);
    /// Finalize and return the hash value.
    fn finalize(self: Box<Self>) -> Vec<u8>;
    /// Algorithm URI.
    fn uri(&self) -> &'static str;
}

/// Create a digest algorithm from its URI.
pub fn from_uri(uri: &str) -> Result<Box<dyn DigestAlgorithm>, Error> {
    match uri {
        algorithm::SHA1 => Ok(Box::new(Hasher::<sha1::Sha1>::new(algorithm::SHA1))),
        algorithm::SHA224 => Ok(Box::new(Hasher::<sha2::Sha224>::new(algorithm::SHA224))),
        algorithm::SHA256 => Ok(Box::new(Hasher::<sha2::Sha256>::new(algorithm::SHA256))),
        algorithm::SHA384 => Ok(Box::new(Hasher::<sha2::Sha384>::new(algorithm::SHA384))),
        algorithm::SHA512 => Ok(Box::new(Hasher::<sha2::Sha512>::new(algorithm::SHA512))),
        algorithm::SHA3_224 => Ok(Box::new(Hasher::<sha3::Sha3_224>::new(algorithm::SHA3_224))),
        algorithm::SHA3_256 => Ok(Box::new(Hasher::<sha3::Sha3_256>::new(algorithm::SHA3_256))),
        algorithm::SHA3_384 => Ok(Box::new(Hasher::<sha3::Sha3_384>::new(algorithm::SHA3_384))),
        algorithm::SHA3_512 => Ok(Box::new(Hasher::<sha3::Sha3_512>::new(algorithm::SHA3_512))),
        _ => Err(Error::UnsupportedAlgorithm(format!("digest algorithm: {uri}"))),
    }
}

/// Compute a digest in one shot.
pub fn digest(uri: &str, data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut hasher = from_uri(uri)?;
    hasher.update(data);
    Ok(hasher.finalize())
}

struct Hasher<D> {
    inner: D,
    uri: &'static str,
}

impl<D: Digest> Hasher<D> {
    fn new(uri: &'static str) -> Self {
        Self { inner: D::new(), uri }
    }
}

impl<D: Digest + Send> DigestAlgorithm for Hasher<D> {
    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.inner, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        Digest::finalize(self.inner).to_vec()
    }

    fn uri(&self) -> &'static str {
        self.uri
    }
}
