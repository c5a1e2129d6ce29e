//! Canonical structured form of a TDX v4 quote.
//!
//! These messages are also the protobuf container format: a quote that arrives already
//! encoded as protobuf decodes straight into them, and a raw ABI quote is translated into
//! them by [`crate::quote::abi`]. Byte fields are kept as plain vectors because the
//! container does not constrain their length; the ABI encoder checks widths when the exact
//! signed bytes have to be rebuilt.

use serde::Serialize;

/// A TDX quote, version 4.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Quote {
    /// Header of the Quote data structure.
    #[prost(message, optional, tag = "1")]
    pub header: Option<QuoteHeader>,

    /// TD 1.0 report body. This is the part of the quote signed together with the header.
    #[prost(message, optional, tag = "2")]
    pub td_quote_body: Option<TdQuoteBody>,

    /// Size of the Quote Signature Data structure in bytes.
    #[prost(uint32, tag = "3")]
    pub signed_data_size: u32,

    /// ECDSA 256-bit quote signature data.
    #[prost(message, optional, tag = "4")]
    pub signed_data: Option<SignedData>,

    /// Bytes trailing the signature data in the raw quote.
    #[prost(bytes = "vec", tag = "5")]
    pub extra_bytes: Vec<u8>,
}

/// Header of the Quote data structure.
#[derive(Clone, PartialEq, Serialize, ::prost::Message)]
pub struct QuoteHeader {
    /// Version of the quote data structure.
    /// [2 bytes]
    #[prost(uint32, tag = "1")]
    pub version: u32,

    /// Type of attestation key used by the quoting enclave.
    /// 2 (ECDSA-256-with-P-256 curve)
    /// 3 (ECDSA-384-with-P-384 curve)
    /// [2 bytes]
    #[prost(uint32, tag = "2")]
    pub attestation_key_type: u32,

    /// TEE for this Attestation
    /// 0x00000000: SGX
    /// 0x00000081: TDX
    /// [4 bytes]
    #[prost(uint32, tag = "3")]
    pub tee_type: u32,

    /// Security Version of the Quoting Enclave
    /// [2 bytes]
    #[prost(bytes = "vec", tag = "4")]
    #[serde(serialize_with = "hex::serialize")]
    pub qe_svn: Vec<u8>,

    /// Security Version of the PCE
    /// [2 bytes]
    #[prost(bytes = "vec", tag = "5")]
    #[serde(serialize_with = "hex::serialize")]
    pub pce_svn: Vec<u8>,

    /// Unique identifier of the QE Vendor.
    /// Value: 939A7233F79C4CA9940A0DB3957F0607 (Intel® SGX QE Vendor)
    /// [16 bytes]
    #[prost(bytes = "vec", tag = "6")]
    #[serde(serialize_with = "hex::serialize")]
    pub qe_vendor_id: Vec<u8>,

    /// Custom user-defined data.
    /// [20 bytes]
    #[prost(bytes = "vec", tag = "7")]
    #[serde(serialize_with = "hex::serialize")]
    pub user_data: Vec<u8>,
}

/// TD 1.0 quote body: the TD report fields the quoting enclave signs.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TdQuoteBody {
    /// Describes the TCB of TDX.
    /// [16 bytes]
    #[prost(bytes = "vec", tag = "1")]
    pub tee_tcb_svn: Vec<u8>,

    /// Measurement of the TDX Module.
    /// [48 bytes]
    #[prost(bytes = "vec", tag = "2")]
    pub mr_seam: Vec<u8>,

    /// Zero for Intel TDX Module.
    /// [48 bytes]
    #[prost(bytes = "vec", tag = "3")]
    pub mr_signer_seam: Vec<u8>,

    /// [8 bytes]
    #[prost(bytes = "vec", tag = "4")]
    pub seam_attributes: Vec<u8>,

    /// [8 bytes]
    #[prost(bytes = "vec", tag = "5")]
    pub td_attributes: Vec<u8>,

    /// eXtended Features Available Mask, same format as XCR0.
    /// [8 bytes]
    #[prost(bytes = "vec", tag = "6")]
    pub xfam: Vec<u8>,

    /// (SHA384) Measurement of the initial contents of the TD.
    /// [48 bytes]
    #[prost(bytes = "vec", tag = "7")]
    pub mr_td: Vec<u8>,

    /// [48 bytes]
    #[prost(bytes = "vec", tag = "8")]
    pub mr_config_id: Vec<u8>,

    /// [48 bytes]
    #[prost(bytes = "vec", tag = "9")]
    pub mr_owner: Vec<u8>,

    /// [48 bytes]
    #[prost(bytes = "vec", tag = "10")]
    pub mr_owner_config: Vec<u8>,

    /// Runtime measurement registers, RTMR0 first.
    /// [4 x 48 bytes]
    #[prost(bytes = "vec", repeated, tag = "11")]
    pub rtmrs: Vec<Vec<u8>>,

    /// [64 bytes]
    #[prost(bytes = "vec", tag = "12")]
    pub report_data: Vec<u8>,
}

/// In the intel docs, this is A 4.4: "ECDSA 256-bit Quote Signature Data Structure".
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignedData {
    /// Signature of the header + TD quote body by the attestation key, r || s.
    #[prost(bytes = "vec", tag = "1")]
    pub signature: Vec<u8>,

    /// The public key used to generate the signature, x || y.
    #[prost(bytes = "vec", tag = "2")]
    pub ecdsa_attestation_key: Vec<u8>,

    #[prost(message, optional, tag = "3")]
    pub certification_data: Option<CertificationData>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CertificationData {
    #[prost(uint32, tag = "1")]
    pub certificate_data_type: u32,

    #[prost(uint32, tag = "2")]
    pub size: u32,

    #[prost(message, optional, tag = "3")]
    pub qe_report_certification_data: Option<QeReportCertificationData>,
}

/// Certification data of type 6: the quoting enclave report, its signature by the PCK
/// and the PCK certificate chain. Everything here is kept opaque; establishing trust in
/// the attestation key is left to collateral-based verification.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QeReportCertificationData {
    /// Raw 384-byte SGX report of the quoting enclave.
    #[prost(bytes = "vec", tag = "1")]
    pub qe_report: Vec<u8>,

    #[prost(bytes = "vec", tag = "2")]
    pub qe_report_signature: Vec<u8>,

    #[prost(message, optional, tag = "3")]
    pub qe_auth_data: Option<QeAuthData>,

    #[prost(message, optional, tag = "4")]
    pub pck_certificate_chain_data: Option<PckCertificateChainData>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QeAuthData {
    #[prost(uint32, tag = "1")]
    pub parsed_data_size: u32,

    #[prost(bytes = "vec", tag = "2")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PckCertificateChainData {
    #[prost(uint32, tag = "1")]
    pub certificate_data_type: u32,

    #[prost(uint32, tag = "2")]
    pub size: u32,

    /// PEM encoded certificate chain, PCK leaf first.
    #[prost(bytes = "vec", tag = "3")]
    pub pck_cert_chain: Vec<u8>,
}

/// The encoding a quote was recognised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteFormat {
    /// Protobuf `QuoteV4` container.
    Protobuf,
    /// Raw v4 quote, translated into the canonical form.
    RawAbi,
    /// Raw bytes that could not be translated; only the fixed layout is read.
    RawManual,
}

impl QuoteFormat {
    pub fn description(&self) -> &'static str {
        match self {
            QuoteFormat::Protobuf => "protobuf QuoteV4 format",
            QuoteFormat::RawAbi => "raw QuoteV4 format, converted to protobuf",
            QuoteFormat::RawManual => "raw quote format, manual parsing",
        }
    }
}
