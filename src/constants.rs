// https://github.com/intel/SGX-TDX-DCAP-QuoteVerificationLibrary/blob/16b7291a7a86e486fdfcf1dfb4be885c0cc00b4e/Src/AttestationLibrary/src/QuoteVerification/QuoteConstants.h

pub const QUOTE_V4: u16 = 4;

pub const TDX_TEE_TYPE: u32 = 0x00000081;

pub const ECDSA_256_WITH_P256_CURVE: u16 = 2;

pub const HEADER_LEN: usize = 48;
pub const TD10_REPORT_LEN: usize = 584;

/// End of the TD report window inside a raw quote (header + TD 1.0 report body).
pub const TD_REPORT_END: usize = HEADER_LEN + TD10_REPORT_LEN;

pub const ENCLAVE_REPORT_LEN: usize = 384;

/// Raw r || s encoding of an ECDSA P-256 signature.
pub const ECDSA_SIGNATURE_LEN: usize = 64;
/// Raw x || y encoding of an uncompressed P-256 point.
pub const ECDSA_PUBKEY_LEN: usize = 64;

/// Width of a SHA-384 digest, and so of every RTMR.
pub const REGISTER_LEN: usize = 48;
pub const RTMR_COUNT: usize = 4;

pub const PCK_CERT_CHAIN: u16 = 5;
pub const QE_REPORT_CERT_DATA: u16 = 6;
