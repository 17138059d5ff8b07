use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use super::{DigestAlgorithm, DigestEngine};

/// One of the closed set of built-in hash functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinDigest {
    algorithm: DigestAlgorithm,
}

impl BuiltinDigest {
    pub fn new(algorithm: DigestAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }
}

impl From<DigestAlgorithm> for BuiltinDigest {
    fn from(algorithm: DigestAlgorithm) -> Self {
        Self::new(algorithm)
    }
}

impl DigestEngine for BuiltinDigest {
    fn name(&self) -> &str {
        self.algorithm.as_str()
    }

    fn output_length(&self) -> usize {
        self.algorithm.output_length()
    }

    fn hash_hex(&self, bytes: &[u8]) -> String {
        match self.algorithm {
            DigestAlgorithm::Md5 => hex::encode(Md5::digest(bytes)),
            DigestAlgorithm::Sha1 => hex::encode(Sha1::digest(bytes)),
            DigestAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
            DigestAlgorithm::Sha512 => hex::encode(Sha512::digest(bytes)),
            DigestAlgorithm::Blake3 => blake3::hash(bytes).to_hex().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_known_vectors() {
        let hello = b"hello";
        assert_eq!(
            BuiltinDigest::new(DigestAlgorithm::Md5).digest(hello).unwrap(),
            "5d41402abc4b2a76b9719d911017c592"
        );
        assert_eq!(
            BuiltinDigest::new(DigestAlgorithm::Sha1).digest(hello).unwrap(),
            "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
        );
        assert_eq!(
            BuiltinDigest::new(DigestAlgorithm::Sha256).digest(hello).unwrap(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_output_lengths_match() {
        for alg in DigestAlgorithm::ALL {
            let engine = BuiltinDigest::new(alg);
            let digest = engine.digest(b"length check").unwrap();
            assert_eq!(digest.len(), engine.output_length(), "{alg}");
            assert!(engine.validate(&digest));
        }
    }

    #[test]
    fn test_empty_input_rejected() {
        let engine = BuiltinDigest::new(DigestAlgorithm::Blake3);
        assert!(matches!(engine.digest(b""), Err(CoreError::EmptyInput)));
    }

    #[test]
    fn test_validate_rejects_other_algorithms() {
        let sha1 = BuiltinDigest::new(DigestAlgorithm::Sha1);
        let md5_digest = BuiltinDigest::new(DigestAlgorithm::Md5).digest(b"x").unwrap();
        assert!(!sha1.validate(&md5_digest));
        assert!(!sha1.validate(&"g".repeat(40)));
    }
}
