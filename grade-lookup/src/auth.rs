use sha2::{Digest as _, Sha256};

use crate::types::{Digest, DIGEST_LEN};

/// Salts the password with the student id and hashes both.
///
/// The client sends this digest instead of the credentials themselves, and the
/// server computes the same value for every roster row when it loads the CSV.
pub fn credential_digest(id: &str, password: &str) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    hasher.update(password.as_bytes());

    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_sha256_of_id_then_password() {
        // sha256("abc")
        assert_eq!(
            hex::encode(credential_digest("a", "bc")),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn id_salts_the_password() {
        assert_ne!(
            credential_digest("1803933", "xyz"),
            credential_digest("1884159", "xyz")
        );
    }
}
