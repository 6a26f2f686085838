//! Salted one-way digest of credential secrets.
//!
//! The construction is `hash(salt + secret)`, hex-encoded. The salt is a
//! fixed per-deployment value, not per-user; determinism is what makes the
//! stored digest comparable.

use aws_lc_rs::digest;

/// Named digest strategies, selected by the stored credential format tag.
///
/// `SaltedSha1` reproduces the legacy directory's digest byte-for-byte and
/// must be kept for verifying credentials issued before migration. New
/// deployments should issue `SaltedSha256` credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestAlgorithm {
    /// Single-round salted SHA-1, 40-char lowercase hex.
    ///
    /// **WARNING**: retained solely for compatibility with digests already
    /// stored in the directory.
    #[default]
    SaltedSha1,

    /// Single-round salted SHA-256, 64-char lowercase hex.
    SaltedSha256,
}

impl DigestAlgorithm {
    /// Resolves a strategy from its stored format tag.
    ///
    /// Returns `None` for unknown tags; callers treat an unresolvable
    /// strategy as "no digest computable" and fail closed.
    #[must_use]
    pub fn from_format(tag: &str) -> Option<Self> {
        match tag {
            "sha1" => Some(Self::SaltedSha1),
            "sha256" => Some(Self::SaltedSha256),
            _ => None,
        }
    }

    /// Returns the stored format tag for this strategy.
    #[must_use]
    pub const fn format_tag(self) -> &'static str {
        match self {
            Self::SaltedSha1 => "sha1",
            Self::SaltedSha256 => "sha256",
        }
    }

    /// Returns the width of the hex-encoded digest.
    #[must_use]
    pub const fn hex_len(self) -> usize {
        match self {
            Self::SaltedSha1 => 40,
            Self::SaltedSha256 => 64,
        }
    }

    /// Computes the salted digest of a secret.
    ///
    /// Deterministic and pure: identical inputs always yield the identical
    /// fixed-width lowercase hex string. Returns `None` instead of
    /// propagating if the hash primitive is unavailable, so that any
    /// comparison against the result fails closed.
    #[must_use]
    pub fn encode_with_salt(self, secret: &str, salt: &str) -> Option<String> {
        let alg = match self {
            Self::SaltedSha1 => &digest::SHA1_FOR_LEGACY_USE_ONLY,
            Self::SaltedSha256 => &digest::SHA256,
        };

        let mut salted = String::with_capacity(salt.len() + secret.len());
        salted.push_str(salt);
        salted.push_str(secret);

        let out = digest::digest(alg, salted.as_bytes());
        Some(to_hex(out.as_ref()))
    }
}

/// Encodes bytes as lowercase hex.
fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_known_vector() {
        // SHA-1("abc") split across salt and secret.
        let digest = DigestAlgorithm::SaltedSha1.encode_with_salt("bc", "a");
        assert_eq!(
            digest.as_deref(),
            Some("a9993e364706816aba3e25717850c26c9cd0d89d")
        );
    }

    #[test]
    fn sha1_empty_input() {
        let digest = DigestAlgorithm::SaltedSha1.encode_with_salt("", "");
        assert_eq!(
            digest.as_deref(),
            Some("da39a3ee5e6b4b0d3255bfef95601890afd80709")
        );
    }

    #[test]
    fn sha256_known_vector() {
        let digest = DigestAlgorithm::SaltedSha256.encode_with_salt("bc", "a");
        assert_eq!(
            digest.as_deref(),
            Some("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
        );
    }

    #[test]
    fn digest_is_deterministic() {
        let a = DigestAlgorithm::SaltedSha1.encode_with_salt("secret", "pepper");
        let b = DigestAlgorithm::SaltedSha1.encode_with_salt("secret", "pepper");
        assert_eq!(a, b);
    }

    #[test]
    fn different_inputs_produce_different_digests() {
        let a = DigestAlgorithm::SaltedSha1.encode_with_salt("secret", "pepper");
        let b = DigestAlgorithm::SaltedSha1.encode_with_salt("secres", "pepper");
        let c = DigestAlgorithm::SaltedSha1.encode_with_salt("secret", "peppes");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn digest_width_and_case() {
        let digest = DigestAlgorithm::SaltedSha1
            .encode_with_salt("secret", "pepper")
            .unwrap();
        assert_eq!(digest.len(), DigestAlgorithm::SaltedSha1.hex_len());
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        let digest = DigestAlgorithm::SaltedSha256
            .encode_with_salt("secret", "pepper")
            .unwrap();
        assert_eq!(digest.len(), DigestAlgorithm::SaltedSha256.hex_len());
    }

    #[test]
    fn format_tag_round_trip() {
        for alg in [DigestAlgorithm::SaltedSha1, DigestAlgorithm::SaltedSha256] {
            assert_eq!(DigestAlgorithm::from_format(alg.format_tag()), Some(alg));
        }
        assert_eq!(DigestAlgorithm::from_format("md5"), None);
        assert_eq!(DigestAlgorithm::from_format(""), None);
    }

    #[test]
    fn digest_depends_only_on_concatenation() {
        // The construction is hash(salt + secret): splitting the same bytes
        // differently across the two arguments yields the same digest.
        let a = DigestAlgorithm::SaltedSha1.encode_with_salt("ab", "c");
        let b = DigestAlgorithm::SaltedSha1.encode_with_salt("c", "ab");
        assert_eq!(a, b);
    }
}
