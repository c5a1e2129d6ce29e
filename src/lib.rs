pub mod constants;
pub mod error;
pub mod extract;
pub mod logging;
pub mod measurement;
pub mod quote;
pub mod report;
pub mod types;
pub mod utils;
pub mod validate;
pub mod verify;

#[cfg(test)]
mod test_utils;

use serde::Serialize;
use tracing::warn;

pub use error::{Error, Result};
use quote::DecodedQuote;
use types::{QuoteFormat, TdReport};
use validate::{Finding, StructureReport};
use verify::SignatureVerdict;

/// Everything learned from one quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteInspection {
    pub size: usize,
    pub format: QuoteFormat,
    /// Structure checks; only available for structured quotes.
    pub structure: Option<StructureReport>,
    /// Signature verdict; `None` when the quote carries no verifiable ECDSA P-256 material.
    pub signature: Option<SignatureVerdict>,
    /// Best-effort checks of quotes read through the raw layout.
    pub raw_findings: Vec<Finding>,
    pub td_report: TdReport,
}

impl QuoteInspection {
    /// Turns a non-passing signature verdict into an error, for callers that do not
    /// accept unauthenticated measurements.
    pub fn require_valid_signature(&self) -> Result<()> {
        match &self.signature {
            Some(verdict) if verdict.passed() => Ok(()),
            _ => Err(Error::SignatureVerificationFailed),
        }
    }
}

/// Decodes a quote blob, checks its structure and signature, and extracts the TD report.
///
/// 1. Decode the blob with the first strategy that accepts it.
/// 2. For structured quotes, validate the structure and, when the key material is ECDSA
///    P-256, verify the signature. A failed verification is reported, not returned.
/// 3. Extract the TD report. This is the only step whose failure is fatal.
pub fn inspect_quote(raw: &[u8]) -> Result<QuoteInspection> {
    let decoded = quote::decode(raw)?;
    let format = decoded.format();

    match decoded {
        DecodedQuote::Structured { quote, .. } => {
            let structure = validate::validate_quote_structure(&quote);

            let signature = structure
                .is_ecdsa_p256()
                .then(|| SignatureVerdict::from(verify::verify_quote_signature(&quote)));
            if let Some(verdict) = &signature {
                if !verdict.passed() {
                    warn!("continuing with unauthenticated quote measurements");
                }
            }

            let td_report = extract::td_report_from_quote(&quote)?;

            Ok(QuoteInspection {
                size: raw.len(),
                format,
                structure: Some(structure),
                signature,
                raw_findings: Vec::new(),
                td_report,
            })
        }
        DecodedQuote::Raw(bytes) => {
            let raw_findings = validate::validate_raw_layout(bytes);
            if !raw_findings.is_empty() {
                warn!("attempting to extract RTMR values anyway");
            }

            let td_report = extract::td_report_from_raw_quote(bytes)?;

            Ok(QuoteInspection {
                size: raw.len(),
                format,
                structure: None,
                signature: None,
                raw_findings,
                td_report,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::QuoteBuilder;
    use crate::types::MeasurementRegister;
    use assert_matches::assert_matches;

    #[test]
    fn inspect_raw_tdx_quote() {
        let inspection = inspect_quote(&QuoteBuilder::new().build()).unwrap();

        assert_eq!(inspection.format, QuoteFormat::RawAbi);
        assert!(inspection.structure.as_ref().unwrap().findings.is_empty());
        assert!(inspection.signature.as_ref().unwrap().passed());
        assert!(inspection.require_valid_signature().is_ok());
        assert_eq!(inspection.td_report.rtmr[1], MeasurementRegister([0x31; 48]));
    }

    #[test]
    fn inspect_protobuf_quote() {
        let builder = QuoteBuilder::new().with_extra_bytes(b"trailer");
        let inspection = inspect_quote(&builder.protobuf()).unwrap();

        assert_eq!(inspection.format, QuoteFormat::Protobuf);
        assert!(inspection.signature.as_ref().unwrap().passed());
        assert_eq!(inspection.td_report.mr_td, MeasurementRegister([0x20; 48]));
    }

    #[test]
    fn failed_signature_still_extracts_measurements() {
        let raw = QuoteBuilder::new().with_flipped_signature().build();
        let inspection = inspect_quote(&raw).unwrap();

        assert_matches!(inspection.signature, Some(SignatureVerdict::Failed(_)));
        assert_eq!(inspection.td_report.rtmr[0], MeasurementRegister([0x30; 48]));
        assert_matches!(
            inspection.require_valid_signature(),
            Err(Error::SignatureVerificationFailed)
        );
    }

    #[test]
    fn off_curve_key_aborts_only_verification() {
        let raw = QuoteBuilder::new().with_public_key([0x01; 64]).build();
        let inspection = inspect_quote(&raw).unwrap();

        assert_matches!(inspection.signature, Some(SignatureVerdict::Aborted { .. }));
        assert_eq!(inspection.td_report.rtmr[2], MeasurementRegister([0x32; 48]));
    }

    #[test]
    fn unparseable_quote_uses_raw_layout() {
        let mut raw = QuoteBuilder::new().build();
        raw[0] = 0x05;
        let inspection = inspect_quote(&raw).unwrap();

        assert_eq!(inspection.format, QuoteFormat::RawManual);
        assert!(inspection.signature.is_none());
        assert_eq!(
            inspection.raw_findings,
            vec![Finding::RawUnsupportedVersion { version: 5 }]
        );
        assert_eq!(inspection.td_report.report_type, [0x01; 4]);
    }

    #[test]
    fn short_raw_quote_is_fatal() {
        assert_matches!(
            inspect_quote(&[0x05u8; 100]),
            Err(Error::QuoteTooShort { len: 100 })
        );
        assert_matches!(inspect_quote(&[]), Err(Error::UnrecognizedFormat));
    }

    #[test]
    fn inspection_serializes_to_json() {
        let inspection = inspect_quote(&QuoteBuilder::new().build()).unwrap();
        let json = serde_json::to_value(&inspection).unwrap();

        assert_eq!(json["format"], "raw_abi");
        assert_eq!(json["signature"]["status"], "passed");
        assert_eq!(json["td_report"]["rtmr"][1], "31".repeat(48));
        assert_eq!(json["structure"]["header"]["qe_svn"], "0a00");
    }
}
