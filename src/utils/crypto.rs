use p256::ecdsa::{signature::hazmat::PrehashVerifier, Signature, VerifyingKey};

use crate::constants::{ECDSA_PUBKEY_LEN, ECDSA_SIGNATURE_LEN};
use crate::error::Error;

/// Builds a P-256 verifying key from the raw x || y coordinates carried in a quote.
///
/// The coordinates are turned into the SEC1 uncompressed form ([4][x][y]) first; a point
/// that does not satisfy the curve equation is rejected here.
pub fn verifying_key_from_coordinates(
    public_key: &[u8; ECDSA_PUBKEY_LEN],
) -> Result<VerifyingKey, Error> {
    let mut sec1 = [4u8; ECDSA_PUBKEY_LEN + 1];
    sec1[1..].copy_from_slice(public_key);
    VerifyingKey::from_sec1_bytes(&sec1).map_err(|_| Error::PublicKeyNotOnCurve)
}

// verify_p256_prehash verifies a raw r || s signature over an already computed SHA-256
// digest. Scalars outside the group order make the signature invalid, not an error.
pub fn verify_p256_prehash(
    verifying_key: &VerifyingKey,
    digest: &[u8; 32],
    signature: &[u8; ECDSA_SIGNATURE_LEN],
) -> bool {
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    verifying_key.verify_prehash(digest, &signature).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hash::sha256sum;
    use p256::ecdsa::{signature::Signer, SigningKey};

    fn signing_key() -> SigningKey {
        SigningKey::from_slice(&[0x42; 32]).unwrap()
    }

    fn raw_public_key(key: &SigningKey) -> [u8; 64] {
        let point = key.verifying_key().to_encoded_point(false);
        point.as_bytes()[1..].try_into().unwrap()
    }

    #[test]
    fn accepts_signature_over_digest() {
        let key = signing_key();
        let signature: Signature = key.sign(b"payload");
        let vk = verifying_key_from_coordinates(&raw_public_key(&key)).unwrap();

        let sig: [u8; 64] = signature.to_bytes()[..].try_into().unwrap();
        assert!(verify_p256_prehash(&vk, &sha256sum(b"payload"), &sig));
        assert!(!verify_p256_prehash(&vk, &sha256sum(b"payloae"), &sig));
    }

    #[test]
    fn zero_scalars_are_invalid() {
        let key = signing_key();
        let vk = verifying_key_from_coordinates(&raw_public_key(&key)).unwrap();
        assert!(!verify_p256_prehash(&vk, &sha256sum(b"payload"), &[0; 64]));
    }

    #[test]
    fn rejects_point_off_curve() {
        let mut coordinates = [0u8; 64];
        coordinates[31] = 1;
        coordinates[63] = 1;
        assert!(matches!(
            verifying_key_from_coordinates(&coordinates),
            Err(Error::PublicKeyNotOnCurve)
        ));
    }
}
