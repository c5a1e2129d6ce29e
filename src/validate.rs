//! Sanity checks on the quote structure. Nothing here is fatal: every problem becomes a
//! [`Finding`] and processing continues.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::constants::{ECDSA_PUBKEY_LEN, ECDSA_SIGNATURE_LEN, QUOTE_V4, TDX_TEE_TYPE, TD_REPORT_END};
use crate::quote::abi::RawQuoteHeader;
use crate::types::{Quote, QuoteHeader};
use crate::utils;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    MissingHeader,
    MissingSignedData,
    UnexpectedKeyMaterialSize { signature: usize, public_key: usize },
    RawQuoteTooShort { len: usize },
    RawUnsupportedVersion { version: u16 },
    RawUnsupportedTeeType { tee_type: u32 },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::MissingHeader => write!(f, "No header found"),
            Finding::MissingSignedData => write!(f, "No signed data found"),
            Finding::UnexpectedKeyMaterialSize {
                signature,
                public_key,
            } => write!(
                f,
                "Unexpected signature/key sizes: sig={signature}, key={public_key}"
            ),
            Finding::RawQuoteTooShort { len } => write!(f, "raw quote too short: {len} bytes"),
            Finding::RawUnsupportedVersion { version } => {
                write!(f, "raw quote has unsupported version {version}")
            }
            Finding::RawUnsupportedTeeType { tee_type } => {
                write!(f, "raw quote has unsupported tee type {tee_type:#010x}")
            }
        }
    }
}

/// Signature material carried by the quote, as found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyMaterial {
    #[serde(serialize_with = "hex::serialize")]
    pub signature: Vec<u8>,
    #[serde(serialize_with = "hex::serialize")]
    pub public_key: Vec<u8>,
}

impl KeyMaterial {
    /// Raw r || s signature and x || y key, the only encoding that can be verified.
    pub fn is_ecdsa_p256(&self) -> bool {
        self.signature.len() == ECDSA_SIGNATURE_LEN && self.public_key.len() == ECDSA_PUBKEY_LEN
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructureReport {
    pub header: Option<QuoteHeader>,
    pub key_material: Option<KeyMaterial>,
    pub findings: Vec<Finding>,
}

impl StructureReport {
    pub fn is_ecdsa_p256(&self) -> bool {
        self.key_material
            .as_ref()
            .is_some_and(KeyMaterial::is_ecdsa_p256)
    }

    fn flag(&mut self, finding: Finding) {
        warn!("{finding}");
        self.findings.push(finding);
    }
}

/// Checks header presence and the sizes of the signature material of a structured quote.
///
/// Without a header the signed data is not inspected.
pub fn validate_quote_structure(quote: &Quote) -> StructureReport {
    let mut report = StructureReport::default();

    let Some(header) = &quote.header else {
        report.flag(Finding::MissingHeader);
        return report;
    };
    report.header = Some(header.clone());

    let Some(signed_data) = &quote.signed_data else {
        report.flag(Finding::MissingSignedData);
        return report;
    };

    let key_material = KeyMaterial {
        signature: signed_data.signature.clone(),
        public_key: signed_data.ecdsa_attestation_key.clone(),
    };
    if !key_material.is_ecdsa_p256() {
        report.flag(Finding::UnexpectedKeyMaterialSize {
            signature: key_material.signature.len(),
            public_key: key_material.public_key.len(),
        });
    }
    report.key_material = Some(key_material);

    report
}

/// Best-effort checks on a quote that could only be read through the raw layout.
pub fn validate_raw_layout(raw: &[u8]) -> Vec<Finding> {
    let mut findings = Vec::new();

    if raw.len() < TD_REPORT_END {
        findings.push(Finding::RawQuoteTooShort { len: raw.len() });
    }

    let mut bytes = raw;
    if let Some(header) = utils::read_from_bytes::<RawQuoteHeader>(&mut bytes) {
        if header.version.get() != QUOTE_V4 {
            findings.push(Finding::RawUnsupportedVersion {
                version: header.version.get(),
            });
        }
        if header.tee_type.get() != TDX_TEE_TYPE {
            findings.push(Finding::RawUnsupportedTeeType {
                tee_type: header.tee_type.get(),
            });
        }
    }

    for finding in &findings {
        warn!("quote verification failed: {finding}");
    }
    findings
}
