//! Content hashing used as the deduplication key.

use sha2::{Digest, Sha256};

/// Computes the SHA-256 digest of file bytes as lowercase hex.
///
/// No salt and no timestamp: the same bytes produce the same digest on
/// every machine, which is what lets the digest stand in for the content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentHasher;

impl ContentHasher {
    /// Hex length of a digest.
    pub const DIGEST_LEN: usize = 64;

    /// Hashes `bytes`.
    #[must_use]
    pub fn digest(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    /// Returns true if `value` looks like a digest produced by [`ContentHasher::digest`].
    #[must_use]
    pub fn is_digest(value: &str) -> bool {
        value.len() == Self::DIGEST_LEN
            && value
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, 'a'..='f'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_vector() {
        assert_eq!(
            ContentHasher::digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            ContentHasher::digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    proptest! {
        #[test]
        fn prop_digest_is_deterministic(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
            let first = ContentHasher::digest(&bytes);
            let second = ContentHasher::digest(&bytes.clone());
            prop_assert_eq!(&first, &second);
            prop_assert!(ContentHasher::is_digest(&first));
        }

        #[test]
        fn prop_single_byte_change_changes_digest(
            mut bytes in proptest::collection::vec(any::<u8>(), 1..256),
            index in any::<proptest::sample::Index>(),
        ) {
            let before = ContentHasher::digest(&bytes);
            let i = index.index(bytes.len());
            bytes[i] = bytes[i].wrapping_add(1);
            prop_assert_ne!(before, ContentHasher::digest(&bytes));
        }
    }
}
