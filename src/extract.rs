//! Extraction of the runtime TD report out of a decoded quote.

use crate::constants::{HEADER_LEN, RTMR_COUNT, TD10_REPORT_LEN, TD_REPORT_END};
use crate::error::{Error, Result};
use crate::types::report::offsets;
use crate::types::{MeasurementRegister, Quote, TdReport};
use crate::utils;

/// Builds a TD report from the named fields of a structured quote body.
///
/// Registers are only taken when the body carries at least four of them; otherwise they
/// are left uninitialized. Fields of the wrong width are copied as far as they fit.
pub fn td_report_from_quote(quote: &Quote) -> Result<TdReport> {
    let body = quote.td_quote_body.as_ref().ok_or(Error::MissingBody)?;
    let mut report = TdReport::default();

    if body.rtmrs.len() >= RTMR_COUNT {
        for (dst, src) in report.rtmr.iter_mut().zip(&body.rtmrs) {
            *dst = MeasurementRegister::from_prefix(src);
        }
    }

    report.mr_td = MeasurementRegister::from_prefix(&body.mr_td);
    report.mr_config_id = MeasurementRegister::from_prefix(&body.mr_config_id);
    report.mr_owner = MeasurementRegister::from_prefix(&body.mr_owner);
    report.mr_owner_config = MeasurementRegister::from_prefix(&body.mr_owner_config);

    utils::copy_prefix(&mut report.tee_tcb_svn, &body.tee_tcb_svn);
    utils::copy_prefix(&mut report.mr_seam, &body.mr_seam);
    utils::copy_prefix(&mut report.mr_signer_seam, &body.mr_signer_seam);
    utils::copy_prefix(&mut report.seam_attributes, &body.seam_attributes);
    utils::copy_prefix(&mut report.td_attributes, &body.td_attributes);
    utils::copy_prefix(&mut report.xfam, &body.xfam);
    utils::copy_prefix(&mut report.report_data, &body.report_data);

    Ok(report)
}

/// Maps the TD report out of a raw quote by fixed offsets.
///
/// The report window is `raw[48..632]` and must be exactly 584 bytes. The declared report
/// layout is 1048 bytes long, so fields past the window are read from the bytes that follow
/// it in the quote when they are present and stay zero when the quote ends first.
pub fn td_report_from_raw_quote(raw: &[u8]) -> Result<TdReport> {
    if raw.len() < TD_REPORT_END {
        return Err(Error::QuoteTooShort { len: raw.len() });
    }

    let window = &raw[HEADER_LEN..TD_REPORT_END];
    if window.len() != TD10_REPORT_LEN {
        return Err(Error::InvalidTdReportSize { len: window.len() });
    }

    let declared_end = raw.len().min(HEADER_LEN + offsets::DECLARED_LEN);
    let layout = FieldReader(&raw[HEADER_LEN..declared_end]);

    Ok(TdReport {
        report_type: layout.field(offsets::REPORT_TYPE),
        reserved1: layout.field(offsets::RESERVED1),
        cpu_svn: layout.field(offsets::CPU_SVN),
        tee_tcb_info_hash: layout.field(offsets::TEE_TCB_INFO_HASH),
        tee_info_hash: layout.field(offsets::TEE_INFO_HASH),
        report_data: layout.field(offsets::REPORT_DATA),
        reserved2: layout.field(offsets::RESERVED2),
        mac_struct: layout.field(offsets::MAC_STRUCT),
        tee_tcb_svn: layout.field(offsets::TEE_TCB_SVN),
        mr_seam: layout.field(offsets::MR_SEAM),
        mr_signer_seam: layout.field(offsets::MR_SIGNER_SEAM),
        seam_attributes: layout.field(offsets::SEAM_ATTRIBUTES),
        td_attributes: layout.field(offsets::TD_ATTRIBUTES),
        xfam: layout.field(offsets::XFAM),
        mr_td: layout.register(offsets::MR_TD),
        mr_config_id: layout.register(offsets::MR_CONFIG_ID),
        mr_owner: layout.register(offsets::MR_OWNER),
        mr_owner_config: layout.register(offsets::MR_OWNER_CONFIG),
        rtmr: offsets::RTMR.map(|offset| layout.register(offset)),
        serv_td_hash: layout.field(offsets::SERV_TD_HASH),
    })
}

struct FieldReader<'a>(&'a [u8]);

impl FieldReader<'_> {
    /// `N` bytes at `offset`, or zeros when the field does not lie entirely in the buffer.
    fn field<const N: usize>(&self, offset: usize) -> [u8; N] {
        self.0
            .get(offset..offset + N)
            .and_then(|bytes| bytes.try_into().ok())
            .unwrap_or([0; N])
    }

    fn register(&self, offset: usize) -> MeasurementRegister {
        MeasurementRegister(self.field(offset))
    }
}
