//! Translation between the raw v4 quote wire layout and the canonical [`Quote`].
//!
//! high level tdx quote structure
//! [48 - header] [584 - td quote body] [4 - quote signature length] [var - quote signature]

use anyhow::{anyhow, bail, Context};
use zerocopy::{little_endian, AsBytes};

use crate::constants::{
    ECDSA_PUBKEY_LEN, ECDSA_SIGNATURE_LEN, ENCLAVE_REPORT_LEN, HEADER_LEN, QE_REPORT_CERT_DATA,
    QUOTE_V4, REGISTER_LEN, RTMR_COUNT, TD10_REPORT_LEN, TDX_TEE_TYPE,
};
use crate::types::{
    CertificationData, PckCertificateChainData, QeAuthData, QeReportCertificationData, Quote,
    QuoteHeader, SignedData, TdQuoteBody,
};
use crate::utils;

/// Wire layout of the quote header.
#[derive(Debug, Clone, Copy, zerocopy::FromBytes, zerocopy::FromZeroes, zerocopy::AsBytes)]
#[repr(C)]
pub struct RawQuoteHeader {
    pub version: little_endian::U16,
    pub attestation_key_type: little_endian::U16,
    pub tee_type: little_endian::U32,
    pub qe_svn: [u8; 2],
    pub pce_svn: [u8; 2],
    pub qe_vendor_id: [u8; 16],
    pub user_data: [u8; 20],
}

/// Wire layout of the TD 1.0 quote body.
#[derive(Debug, Clone, Copy, zerocopy::FromBytes, zerocopy::FromZeroes, zerocopy::AsBytes)]
#[repr(C)]
pub struct RawTdQuoteBody {
    pub tee_tcb_svn: [u8; 16],
    pub mr_seam: [u8; 48],
    pub mr_signer_seam: [u8; 48],
    pub seam_attributes: [u8; 8],
    pub td_attributes: [u8; 8],
    pub xfam: [u8; 8],
    pub mr_td: [u8; 48],
    pub mr_config_id: [u8; 48],
    pub mr_owner: [u8; 48],
    pub mr_owner_config: [u8; 48],
    pub rtmrs: [[u8; REGISTER_LEN]; RTMR_COUNT],
    pub report_data: [u8; 64],
}

const _: () = assert!(std::mem::size_of::<RawQuoteHeader>() == HEADER_LEN);
const _: () = assert!(std::mem::size_of::<RawTdQuoteBody>() == TD10_REPORT_LEN);

impl From<&RawQuoteHeader> for QuoteHeader {
    fn from(raw: &RawQuoteHeader) -> Self {
        QuoteHeader {
            version: raw.version.get().into(),
            attestation_key_type: raw.attestation_key_type.get().into(),
            tee_type: raw.tee_type.get(),
            qe_svn: raw.qe_svn.to_vec(),
            pce_svn: raw.pce_svn.to_vec(),
            qe_vendor_id: raw.qe_vendor_id.to_vec(),
            user_data: raw.user_data.to_vec(),
        }
    }
}

impl TryFrom<&QuoteHeader> for RawQuoteHeader {
    type Error = anyhow::Error;

    fn try_from(header: &QuoteHeader) -> anyhow::Result<Self> {
        Ok(RawQuoteHeader {
            version: narrow_u16("version", header.version)?.into(),
            attestation_key_type: narrow_u16("attestation_key_type", header.attestation_key_type)?
                .into(),
            tee_type: header.tee_type.into(),
            qe_svn: fixed("qe_svn", &header.qe_svn)?,
            pce_svn: fixed("pce_svn", &header.pce_svn)?,
            qe_vendor_id: fixed("qe_vendor_id", &header.qe_vendor_id)?,
            user_data: fixed("user_data", &header.user_data)?,
        })
    }
}

impl From<&RawTdQuoteBody> for TdQuoteBody {
    fn from(raw: &RawTdQuoteBody) -> Self {
        TdQuoteBody {
            tee_tcb_svn: raw.tee_tcb_svn.to_vec(),
            mr_seam: raw.mr_seam.to_vec(),
            mr_signer_seam: raw.mr_signer_seam.to_vec(),
            seam_attributes: raw.seam_attributes.to_vec(),
            td_attributes: raw.td_attributes.to_vec(),
            xfam: raw.xfam.to_vec(),
            mr_td: raw.mr_td.to_vec(),
            mr_config_id: raw.mr_config_id.to_vec(),
            mr_owner: raw.mr_owner.to_vec(),
            mr_owner_config: raw.mr_owner_config.to_vec(),
            rtmrs: raw.rtmrs.iter().map(|rtmr| rtmr.to_vec()).collect(),
            report_data: raw.report_data.to_vec(),
        }
    }
}

impl TryFrom<&TdQuoteBody> for RawTdQuoteBody {
    type Error = anyhow::Error;

    fn try_from(body: &TdQuoteBody) -> anyhow::Result<Self> {
        if body.rtmrs.len() != RTMR_COUNT {
            bail!("expected {RTMR_COUNT} rtmrs, got {}", body.rtmrs.len());
        }
        let mut rtmrs = [[0u8; REGISTER_LEN]; RTMR_COUNT];
        for (i, (dst, src)) in rtmrs.iter_mut().zip(&body.rtmrs).enumerate() {
            *dst = fixed("rtmr", src).with_context(|| format!("rtmr[{i}]"))?;
        }

        Ok(RawTdQuoteBody {
            tee_tcb_svn: fixed("tee_tcb_svn", &body.tee_tcb_svn)?,
            mr_seam: fixed("mr_seam", &body.mr_seam)?,
            mr_signer_seam: fixed("mr_signer_seam", &body.mr_signer_seam)?,
            seam_attributes: fixed("seam_attributes", &body.seam_attributes)?,
            td_attributes: fixed("td_attributes", &body.td_attributes)?,
            xfam: fixed("xfam", &body.xfam)?,
            mr_td: fixed("mr_td", &body.mr_td)?,
            mr_config_id: fixed("mr_config_id", &body.mr_config_id)?,
            mr_owner: fixed("mr_owner", &body.mr_owner)?,
            mr_owner_config: fixed("mr_owner_config", &body.mr_owner_config)?,
            rtmrs,
            report_data: fixed("report_data", &body.report_data)?,
        })
    }
}

/// Wire encoding of the header, exactly as it is signed.
pub fn header_to_abi_bytes(header: &QuoteHeader) -> anyhow::Result<[u8; HEADER_LEN]> {
    let raw = RawQuoteHeader::try_from(header).context("header")?;
    let mut out = [0u8; HEADER_LEN];
    out.copy_from_slice(raw.as_bytes());
    Ok(out)
}

/// Wire encoding of the TD quote body, exactly as it is signed.
pub fn td_quote_body_to_abi_bytes(body: &TdQuoteBody) -> anyhow::Result<Vec<u8>> {
    let raw = RawTdQuoteBody::try_from(body).context("td quote body")?;
    Ok(raw.as_bytes().to_vec())
}

/// Translates a raw v4 TDX quote into its canonical form.
pub fn quote_from_abi_bytes(raw: &[u8]) -> anyhow::Result<Quote> {
    let mut bytes = raw;

    let header = utils::read_from_bytes::<RawQuoteHeader>(&mut bytes)
        .ok_or_else(|| anyhow!("underflow reading quote header"))?;

    if header.version.get() != QUOTE_V4 {
        bail!("unsupported quote version {}", header.version.get());
    }
    if header.tee_type.get() != TDX_TEE_TYPE {
        bail!("unsupported tee type {:#010x}", header.tee_type.get());
    }

    let body = utils::read_from_bytes::<RawTdQuoteBody>(&mut bytes)
        .ok_or_else(|| anyhow!("underflow reading td quote body"))?;

    let signed_data_size = utils::read_from_bytes::<little_endian::U32>(&mut bytes)
        .ok_or_else(|| anyhow!("underflow reading signature length"))?
        .get();

    let signed_data = utils::read_bytes(&mut bytes, signed_data_size as usize)
        .ok_or_else(|| anyhow!("underflow reading signature"))?;
    let signed_data = read_signed_data(signed_data).context("signed data")?;

    Ok(Quote {
        header: Some(QuoteHeader::from(&header)),
        td_quote_body: Some(TdQuoteBody::from(&body)),
        signed_data_size,
        signed_data: Some(signed_data),
        extra_bytes: bytes.to_vec(),
    })
}

fn read_signed_data(mut bytes: &[u8]) -> anyhow::Result<SignedData> {
    let signature = utils::read_array::<ECDSA_SIGNATURE_LEN>(&mut bytes)
        .ok_or_else(|| anyhow!("underflow reading quote signature"))?;
    let attestation_key = utils::read_array::<ECDSA_PUBKEY_LEN>(&mut bytes)
        .ok_or_else(|| anyhow!("underflow reading attestation key"))?;

    let cert_key_type = utils::read_from_bytes::<little_endian::U16>(&mut bytes)
        .ok_or_else(|| anyhow!("underflow reading certification data type"))?
        .get();
    if cert_key_type != QE_REPORT_CERT_DATA {
        bail!("unsupported certification data type {cert_key_type}");
    }

    let cert_data_size = utils::read_from_bytes::<little_endian::U32>(&mut bytes)
        .ok_or_else(|| anyhow!("underflow reading certification data size"))?
        .get();
    let cert_data = utils::read_bytes(&mut bytes, cert_data_size as usize)
        .ok_or_else(|| anyhow!("underflow reading certification data"))?;

    let qe_report_certification_data =
        read_qe_report_cert_data(cert_data).context("QE report certification data")?;

    Ok(SignedData {
        signature: signature.to_vec(),
        ecdsa_attestation_key: attestation_key.to_vec(),
        certification_data: Some(CertificationData {
            certificate_data_type: cert_key_type.into(),
            size: cert_data_size,
            qe_report_certification_data: Some(qe_report_certification_data),
        }),
    })
}

fn read_qe_report_cert_data(mut data: &[u8]) -> anyhow::Result<QeReportCertificationData> {
    let qe_report = utils::read_bytes(&mut data, ENCLAVE_REPORT_LEN)
        .ok_or_else(|| anyhow!("underflow reading QE report"))?;

    let qe_report_signature = utils::read_array::<ECDSA_SIGNATURE_LEN>(&mut data)
        .ok_or_else(|| anyhow!("underflow reading QE report signature"))?;

    let auth_data_size = utils::read_from_bytes::<little_endian::U16>(&mut data)
        .ok_or_else(|| anyhow!("Failed to read auth data size"))?
        .get();
    let auth_data = utils::read_bytes(&mut data, auth_data_size as usize)
        .ok_or_else(|| anyhow!("buffer underflow reading auth data"))?;

    let pck_cert_type = utils::read_from_bytes::<little_endian::U16>(&mut data)
        .ok_or_else(|| anyhow!("incorrect buffer size"))?
        .get();
    let pck_cert_size = utils::read_from_bytes::<little_endian::U32>(&mut data)
        .ok_or_else(|| anyhow!("incorrect buffer size"))?
        .get();
    let pck_cert_chain = utils::read_bytes(&mut data, pck_cert_size as usize)
        .ok_or_else(|| anyhow!("buffer underflow reading PCK certificate chain"))?;

    Ok(QeReportCertificationData {
        qe_report: qe_report.to_vec(),
        qe_report_signature: qe_report_signature.to_vec(),
        qe_auth_data: Some(QeAuthData {
            parsed_data_size: auth_data_size.into(),
            data: auth_data.to_vec(),
        }),
        pck_certificate_chain_data: Some(PckCertificateChainData {
            certificate_data_type: pck_cert_type.into(),
            size: pck_cert_size,
            pck_cert_chain: pck_cert_chain.to_vec(),
        }),
    })
}

fn fixed<const N: usize>(field: &'static str, value: &[u8]) -> anyhow::Result<[u8; N]> {
    value
        .try_into()
        .map_err(|_| anyhow!("{field} must be {N} bytes, got {}", value.len()))
}

fn narrow_u16(field: &'static str, value: u32) -> anyhow::Result<u16> {
    u16::try_from(value).map_err(|_| anyhow!("{field} {value} does not fit in 2 bytes"))
}
