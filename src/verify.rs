//! Offline check of the quote signature against the attestation key embedded in the quote.
//!
//! This says nothing about whether the attestation key itself is trustworthy; that needs
//! the PCK certificate chain and collateral.

use serde::Serialize;
use tracing::{debug, warn};

use crate::constants::{ECDSA_PUBKEY_LEN, ECDSA_SIGNATURE_LEN};
use crate::error::{Error, Result};
use crate::quote::abi;
use crate::types::Quote;
use crate::utils::{crypto, hash::sha256sum};

/// Outcome of a signature check that got as far as the ECDSA verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignatureCheck {
    pub payload_len: usize,
    #[serde(serialize_with = "hex::serialize")]
    pub payload_hash: [u8; 32],
    pub valid: bool,
}

/// Verdict reported for a quote. Verification failures are advisory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SignatureVerdict {
    Passed(SignatureCheck),
    Failed(SignatureCheck),
    /// Verification could not be carried out, e.g. the key is not a curve point.
    Aborted { reason: String },
}

impl SignatureVerdict {
    pub fn passed(&self) -> bool {
        matches!(self, SignatureVerdict::Passed(_))
    }
}

impl From<Result<SignatureCheck>> for SignatureVerdict {
    fn from(result: Result<SignatureCheck>) -> Self {
        match result {
            Ok(check) if check.valid => SignatureVerdict::Passed(check),
            Ok(check) => SignatureVerdict::Failed(check),
            Err(e) => SignatureVerdict::Aborted {
                reason: e.to_string(),
            },
        }
    }
}

/// Rebuilds the exact bytes the attestation key signed: header || TD quote body, both in
/// their wire encoding.
pub fn signed_payload(quote: &Quote) -> Result<Vec<u8>> {
    let header = quote.header.as_ref().ok_or_else(|| {
        Error::PayloadReconstructionFailed("quote has no header".to_string())
    })?;
    let body = quote.td_quote_body.as_ref().ok_or_else(|| {
        Error::PayloadReconstructionFailed("quote has no td quote body".to_string())
    })?;

    let header_bytes = abi::header_to_abi_bytes(header)
        .map_err(|e| Error::PayloadReconstructionFailed(format!("{e:#}")))?;
    let body_bytes = abi::td_quote_body_to_abi_bytes(body)
        .map_err(|e| Error::PayloadReconstructionFailed(format!("{e:#}")))?;

    let mut payload = Vec::with_capacity(header_bytes.len() + body_bytes.len());
    payload.extend_from_slice(&header_bytes);
    payload.extend_from_slice(&body_bytes);
    Ok(payload)
}

/// Verifies the ECDSA P-256 quote signature over SHA-256(header || body).
///
/// The public key is checked to be a curve point before the payload is rebuilt, so an
/// off-curve key yields [`Error::PublicKeyNotOnCurve`] without any ECDSA work.
pub fn verify_quote_signature(quote: &Quote) -> Result<SignatureCheck> {
    let signed_data = quote.signed_data.as_ref().ok_or_else(|| {
        Error::PayloadReconstructionFailed("quote has no signed data".to_string())
    })?;

    let signature: &[u8; ECDSA_SIGNATURE_LEN] = signed_data
        .signature
        .as_slice()
        .try_into()
        .map_err(|_| Error::UnexpectedLength {
            field: "signature",
            expected: ECDSA_SIGNATURE_LEN,
            actual: signed_data.signature.len(),
        })?;
    let public_key: &[u8; ECDSA_PUBKEY_LEN] = signed_data
        .ecdsa_attestation_key
        .as_slice()
        .try_into()
        .map_err(|_| Error::UnexpectedLength {
            field: "public key",
            expected: ECDSA_PUBKEY_LEN,
            actual: signed_data.ecdsa_attestation_key.len(),
        })?;

    let (r, s) = signature.split_at(32);
    debug!(r = %hex::encode(r), s = %hex::encode(s), "signature scalars");
    let (x, y) = public_key.split_at(32);
    debug!(x = %hex::encode(x), y = %hex::encode(y), "attestation key");

    let verifying_key = crypto::verifying_key_from_coordinates(public_key)?;

    let payload = signed_payload(quote)?;
    let payload_hash = sha256sum(&payload);
    debug!(
        payload_len = payload.len(),
        hash = %hex::encode(payload_hash),
        "signed payload"
    );

    let valid = crypto::verify_p256_prehash(&verifying_key, &payload_hash, signature);
    if !valid {
        warn!("quote signature verification failed");
    }

    Ok(SignatureCheck {
        payload_len: payload.len(),
        payload_hash,
        valid,
    })
}
