use std::fmt;

use serde::{Serialize, Serializer};

use crate::constants::{REGISTER_LEN, RTMR_COUNT};
use crate::utils;

/// A 48-byte measurement register value (SHA-384 width).
///
/// All zeros is the value of a register nothing has been extended into yet.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeasurementRegister(pub [u8; REGISTER_LEN]);

impl MeasurementRegister {
    pub const ZERO: Self = Self([0; REGISTER_LEN]);

    pub fn is_uninitialized(&self) -> bool {
        utils::is_all_zero(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8; REGISTER_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Builds a register from a byte slice the way a fixed-size copy would:
    /// shorter input leaves trailing zeros, longer input is truncated.
    pub fn from_prefix(bytes: &[u8]) -> Self {
        let mut value = [0; REGISTER_LEN];
        utils::copy_prefix(&mut value, bytes);
        Self(value)
    }
}

impl Default for MeasurementRegister {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[u8; REGISTER_LEN]> for MeasurementRegister {
    fn from(value: [u8; REGISTER_LEN]) -> Self {
        Self(value)
    }
}

impl fmt::Debug for MeasurementRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MeasurementRegister({})", self.to_hex())
    }
}

impl fmt::Display for MeasurementRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_uninitialized() {
            f.write_str("<all zeros - uninitialized>")
        } else {
            f.write_str(&self.to_hex())
        }
    }
}

impl Serialize for MeasurementRegister {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        hex::serialize(self.0, serializer)
    }
}

/// Byte offsets of every [`TdReport`] field, relative to the start of the report.
pub mod offsets {
    pub const REPORT_TYPE: usize = 0;
    pub const RESERVED1: usize = 4;
    pub const CPU_SVN: usize = 16;
    pub const TEE_TCB_INFO_HASH: usize = 32;
    pub const TEE_INFO_HASH: usize = 80;
    pub const REPORT_DATA: usize = 128;
    pub const RESERVED2: usize = 192;
    pub const MAC_STRUCT: usize = 224;
    pub const TEE_TCB_SVN: usize = 480;
    pub const MR_SEAM: usize = 496;
    pub const MR_SIGNER_SEAM: usize = 544;
    pub const SEAM_ATTRIBUTES: usize = 592;
    pub const TD_ATTRIBUTES: usize = 600;
    pub const XFAM: usize = 608;
    pub const MR_TD: usize = 616;
    pub const MR_CONFIG_ID: usize = 664;
    pub const MR_OWNER: usize = 712;
    pub const MR_OWNER_CONFIG: usize = 760;
    pub const RTMR: [usize; 4] = [808, 856, 904, 952];
    pub const SERV_TD_HASH: usize = 1000;

    /// Size of the declared layout. Only the first 584 bytes are the TD report window of a
    /// quote; see [`crate::extract::td_report_from_raw_quote`].
    pub const DECLARED_LEN: usize = 1048;
}

/// Runtime TD report of a trust domain.
///
/// Every field is an opaque byte array; multi-byte values are never byte-swapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TdReport {
    #[serde(serialize_with = "hex::serialize")]
    pub report_type: [u8; 4],
    #[serde(skip)]
    pub reserved1: [u8; 12],
    #[serde(serialize_with = "hex::serialize")]
    pub cpu_svn: [u8; 16],
    #[serde(serialize_with = "hex::serialize")]
    pub tee_tcb_info_hash: [u8; 48],
    #[serde(serialize_with = "hex::serialize")]
    pub tee_info_hash: [u8; 48],
    #[serde(serialize_with = "hex::serialize")]
    pub report_data: [u8; 64],
    #[serde(skip)]
    pub reserved2: [u8; 32],
    #[serde(serialize_with = "hex::serialize")]
    pub mac_struct: [u8; 256],
    #[serde(serialize_with = "hex::serialize")]
    pub tee_tcb_svn: [u8; 16],
    #[serde(serialize_with = "hex::serialize")]
    pub mr_seam: [u8; 48],
    #[serde(serialize_with = "hex::serialize")]
    pub mr_signer_seam: [u8; 48],
    #[serde(serialize_with = "hex::serialize")]
    pub seam_attributes: [u8; 8],
    #[serde(serialize_with = "hex::serialize")]
    pub td_attributes: [u8; 8],
    #[serde(serialize_with = "hex::serialize")]
    pub xfam: [u8; 8],
    pub mr_td: MeasurementRegister,
    pub mr_config_id: MeasurementRegister,
    pub mr_owner: MeasurementRegister,
    pub mr_owner_config: MeasurementRegister,
    pub rtmr: [MeasurementRegister; RTMR_COUNT],
    #[serde(serialize_with = "hex::serialize")]
    pub serv_td_hash: [u8; 48],
}

impl Default for TdReport {
    fn default() -> Self {
        Self {
            report_type: [0; 4],
            reserved1: [0; 12],
            cpu_svn: [0; 16],
            tee_tcb_info_hash: [0; 48],
            tee_info_hash: [0; 48],
            report_data: [0; 64],
            reserved2: [0; 32],
            mac_struct: [0; 256],
            tee_tcb_svn: [0; 16],
            mr_seam: [0; 48],
            mr_signer_seam: [0; 48],
            seam_attributes: [0; 8],
            td_attributes: [0; 8],
            xfam: [0; 8],
            mr_td: MeasurementRegister::ZERO,
            mr_config_id: MeasurementRegister::ZERO,
            mr_owner: MeasurementRegister::ZERO,
            mr_owner_config: MeasurementRegister::ZERO,
            rtmr: [MeasurementRegister::ZERO; RTMR_COUNT],
            serv_td_hash: [0; 48],
        }
    }
}

impl TdReport {
    /// RTMR[1]: kernel, initrd and command line.
    pub fn boot_register(&self) -> &MeasurementRegister {
        &self.rtmr[1]
    }
}
