//! Human readable rendering of an inspection. Pure formatting: no parsing or checking
//! happens here.

use std::fmt;

use crate::types::{MeasurementRegister, TdReport};
use crate::validate::StructureReport;
use crate::verify::SignatureVerdict;
use crate::QuoteInspection;

pub const RTMR_ROLES: [&str; 4] = [
    "Static/dynamic configuration data",
    "OS kernel, boot parameters, initrd",
    "Additional boot components, ACPI tables",
    "Application-specific measurements",
];

fn section(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{title}")?;
    writeln!(f, "{}", "=".repeat(title.len()))
}

impl fmt::Display for QuoteInspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quote file size: {} bytes", self.size)?;
        writeln!(f, "Detected {}", self.format.description())?;

        if let Some(structure) = &self.structure {
            writeln!(f)?;
            write!(f, "{structure}")?;
        }
        if let Some(verdict) = &self.signature {
            writeln!(f)?;
            write!(f, "{verdict}")?;
        }
        for finding in &self.raw_findings {
            writeln!(f, "Warning: Quote verification failed: {finding}")?;
        }

        writeln!(f)?;
        write!(f, "{}", self.td_report.display_registers())
    }
}

impl fmt::Display for StructureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section(f, "Quote Structure Validation:")?;

        if let Some(header) = &self.header {
            writeln!(f, "Quote Version: {}", header.version)?;
            writeln!(f, "Attestation Key Type: {}", header.attestation_key_type)?;
            writeln!(f, "TEE Type: {:#010x}", header.tee_type)?;
            writeln!(f, "QE SVN: {}", hex::encode(&header.qe_svn))?;
            writeln!(f, "PCE SVN: {}", hex::encode(&header.pce_svn))?;
        }

        if let Some(keys) = &self.key_material {
            writeln!(
                f,
                "Signature present: {} ({} bytes)",
                !keys.signature.is_empty(),
                keys.signature.len()
            )?;
            writeln!(
                f,
                "Public key present: {} ({} bytes)",
                !keys.public_key.is_empty(),
                keys.public_key.len()
            )?;
            if keys.is_ecdsa_p256() {
                writeln!(f, "ECDSA P-256 signature format detected")?;
            }
        }

        for finding in &self.findings {
            writeln!(f, "{finding}")?;
        }

        if let Some(keys) = &self.key_material {
            if !keys.signature.is_empty() {
                writeln!(f, "Signature: {}", hex::encode(&keys.signature))?;
            }
            if !keys.public_key.is_empty() {
                writeln!(f, "Public Key: {}", hex::encode(&keys.public_key))?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for SignatureVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        section(f, "Signature Validation (Offline Check):")?;
        match self {
            SignatureVerdict::Passed(check) => {
                writeln!(f, "Public key is valid P-256 point")?;
                writeln!(f, "Signed payload length: {} bytes", check.payload_len)?;
                writeln!(f, "Signed data hash: {}", hex::encode(check.payload_hash))?;
                writeln!(f, "Signature verification PASSED - Quote structure is valid!")
            }
            SignatureVerdict::Failed(check) => {
                writeln!(f, "Public key is valid P-256 point")?;
                writeln!(f, "Signed payload length: {} bytes", check.payload_len)?;
                writeln!(f, "Signed data hash: {}", hex::encode(check.payload_hash))?;
                writeln!(f, "Signature verification FAILED")?;
                writeln!(f, "   This could mean:")?;
                writeln!(f, "   - Incorrect signed data construction")?;
                writeln!(f, "   - Quote has been tampered with")?;
                writeln!(f, "   - Different signing algorithm used")
            }
            SignatureVerdict::Aborted { reason } => {
                writeln!(f, "Signature verification not performed: {reason}")
            }
        }
    }
}

/// Display adapter listing the registers and TD measurements of a report.
pub struct RegisterListing<'a>(&'a TdReport);

impl TdReport {
    pub fn display_registers(&self) -> RegisterListing<'_> {
        RegisterListing(self)
    }
}

impl fmt::Display for RegisterListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        section(f, "Runtime TD Report RTMR Values:")?;
        for (i, rtmr) in report.rtmr.iter().enumerate() {
            writeln!(f, "RTMR[{i}]: {rtmr}")?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "MrTd (Trust Domain Measurement): {}",
            report.mr_td.to_hex()
        )?;
        writeln!(f, "MrConfigId: {}", report.mr_config_id.to_hex())?;
        writeln!(f, "MrOwner: {}", report.mr_owner.to_hex())?;
        writeln!(f, "MrOwnerConfig: {}", report.mr_owner_config.to_hex())?;

        writeln!(f)?;
        writeln!(f, "RTMR Meanings:")?;
        for (i, role) in RTMR_ROLES.iter().enumerate() {
            writeln!(f, "RTMR[{i}]: {role}")?;
        }
        Ok(())
    }
}

/// `RTMR[1] = <hex>` line printed by the replayer.
pub struct ReplayedRegister<'a>(pub &'a MeasurementRegister);

impl fmt::Display for ReplayedRegister<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RTMR[1] = {}", self.0.to_hex())
    }
}
