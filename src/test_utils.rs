//! Synthetic quote fixtures signed with a fixed attestation key.

use p256::ecdsa::{signature::Signer, Signature, SigningKey};
use prost::Message;
use zerocopy::{little_endian, AsBytes};

use crate::constants::{
    ECDSA_256_WITH_P256_CURVE, ENCLAVE_REPORT_LEN, PCK_CERT_CHAIN, QE_REPORT_CERT_DATA, QUOTE_V4,
    TDX_TEE_TYPE,
};
use crate::quote::abi::{self, RawQuoteHeader, RawTdQuoteBody};
use crate::types::Quote;

pub const INTEL_QE_VENDOR_ID: [u8; 16] = [
    0x93, 0x9A, 0x72, 0x33, 0xF7, 0x9C, 0x4C, 0xA9, 0x94, 0x0A, 0x0D, 0xB3, 0x95, 0x7F, 0x06, 0x07,
];

pub const PCK_PEM: &[u8] = b"-----BEGIN CERTIFICATE-----";

/// Builds raw v4 TDX quotes. Every body field is filled with its own byte pattern so
/// misplaced offsets show up as wrong values.
pub struct QuoteBuilder {
    pub header: RawQuoteHeader,
    pub body: RawTdQuoteBody,
    key: SigningKey,
    public_key: Option<[u8; 64]>,
    flip_signature_bit: bool,
    extra_bytes: Vec<u8>,
}

impl QuoteBuilder {
    pub fn new() -> Self {
        let header = RawQuoteHeader {
            version: little_endian::U16::new(QUOTE_V4),
            attestation_key_type: little_endian::U16::new(ECDSA_256_WITH_P256_CURVE),
            tee_type: little_endian::U32::new(TDX_TEE_TYPE),
            qe_svn: [0x0a, 0x00],
            pce_svn: [0x0b, 0x00],
            qe_vendor_id: INTEL_QE_VENDOR_ID,
            user_data: [0; 20],
        };
        let body = RawTdQuoteBody {
            tee_tcb_svn: [0x01; 16],
            mr_seam: [0x02; 48],
            mr_signer_seam: [0x03; 48],
            seam_attributes: [0x04; 8],
            td_attributes: [0x05; 8],
            xfam: [0x06; 8],
            mr_td: [0x20; 48],
            mr_config_id: [0x21; 48],
            mr_owner: [0x22; 48],
            mr_owner_config: [0x23; 48],
            rtmrs: [[0x30; 48], [0x31; 48], [0x32; 48], [0x33; 48]],
            report_data: [0x40; 64],
        };

        Self {
            header,
            body,
            key: SigningKey::from_slice(&[0x17; 32]).unwrap(),
            public_key: None,
            flip_signature_bit: false,
            extra_bytes: Vec::new(),
        }
    }

    pub fn public_key(&self) -> [u8; 64] {
        if let Some(key) = self.public_key {
            return key;
        }
        let point = self.key.verifying_key().to_encoded_point(false);
        point.as_bytes()[1..].try_into().unwrap()
    }

    pub fn with_public_key(mut self, key: [u8; 64]) -> Self {
        self.public_key = Some(key);
        self
    }

    pub fn with_flipped_signature(mut self) -> Self {
        self.flip_signature_bit = true;
        self
    }

    pub fn with_extra_bytes(mut self, extra: &[u8]) -> Self {
        self.extra_bytes = extra.to_vec();
        self
    }

    pub fn signed_region(&self) -> Vec<u8> {
        let mut data = self.header.as_bytes().to_vec();
        data.extend_from_slice(self.body.as_bytes());
        data
    }

    pub fn signature(&self) -> [u8; 64] {
        let signature: Signature = self.key.sign(&self.signed_region());
        let mut raw: [u8; 64] = signature.to_bytes()[..].try_into().unwrap();
        if self.flip_signature_bit {
            raw[63] ^= 0x01;
        }
        raw
    }

    pub fn build(&self) -> Vec<u8> {
        let mut auth_data = Vec::new();
        auth_data.extend_from_slice(&[0x50; ENCLAVE_REPORT_LEN]);
        auth_data.extend_from_slice(&[0x51; 64]);
        auth_data.extend_from_slice(&32u16.to_le_bytes());
        auth_data.extend_from_slice(&[0x52; 32]);
        auth_data.extend_from_slice(&PCK_CERT_CHAIN.to_le_bytes());
        auth_data.extend_from_slice(&(PCK_PEM.len() as u32).to_le_bytes());
        auth_data.extend_from_slice(PCK_PEM);

        let mut signed_data = Vec::new();
        signed_data.extend_from_slice(&self.signature());
        signed_data.extend_from_slice(&self.public_key());
        signed_data.extend_from_slice(&QE_REPORT_CERT_DATA.to_le_bytes());
        signed_data.extend_from_slice(&(auth_data.len() as u32).to_le_bytes());
        signed_data.extend_from_slice(&auth_data);

        let mut quote = self.signed_region();
        quote.extend_from_slice(&(signed_data.len() as u32).to_le_bytes());
        quote.extend_from_slice(&signed_data);
        quote.extend_from_slice(&self.extra_bytes);
        quote
    }

    /// Canonical form of [`Self::build`].
    pub fn quote(&self) -> Quote {
        abi::quote_from_abi_bytes(&self.build()).unwrap()
    }

    /// Protobuf container encoding of [`Self::build`].
    pub fn protobuf(&self) -> Vec<u8> {
        self.quote().encode_to_vec()
    }
}
