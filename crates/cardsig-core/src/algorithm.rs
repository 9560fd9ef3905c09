#![forbid(unsafe_code)]

//! Algorithm URI constants.
//!
//! Each constant is the URI string that appears in an `Algorithm` attribute
//! of a `Transform`, `CanonicalizationMethod` or `DigestMethod` element.

// ── Canonicalization ─────────────────────────────────────────────────

pub const EXC_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
pub const EXC_C14N_WITH_COMMENTS: &str = "http://www.w3.org/2001/10/xml-exc-c14n#WithComments";

// ── Digest algorithms ────────────────────────────────────────────────

pub const SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
pub const SHA224: &str = "http://www.w3.org/2001/04/xmldsig-more#sha224";
pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
pub const SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#sha384";
pub const SHA512: &str = "http://www.w3.org/2001/04/xmlenc#sha512";
pub const SHA3_224: &str = "http://www.w3.org/2007/05/xmldsig-more#sha3-224";
pub const SHA3_256: &str = "http://www.w3.org/2007/05/xmldsig-more#sha3-256";
pub const SHA3_384: &str = "http://www.w3.org/2007/05/xmldsig-more#sha3-384";
pub const SHA3_512: &str = "http://www.w3.org/2007/05/xmldsig-more#sha3-512";

// ── Transform algorithms ─────────────────────────────────────────────

pub const ENVELOPED_SIGNATURE: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

/// Map a short digest name (`sha1`, `sha256`, `sha3-256`, ...) to its URI.
pub fn digest_uri_from_name(name: &str) -> Option<&'static str> {
    match name.to_ascii_lowercase().as_str() {
        "sha1" | "sha-1" => Some(SHA1),
        "sha224" | "sha-224" => Some(SHA224),
        "sha256" | "sha-256" => Some(SHA256),
        "sha384" | "sha-384" => Some(SHA384),
        "sha512" | "sha-512" => Some(SHA512),
        "sha3-224" => Some(SHA3_224),
        "sha3-256" => Some(SHA3_256),
        "sha3-384" => Some(SHA3_384),
        "sha3-512" => Some(SHA3_512),
        _ => None,
    }
}
