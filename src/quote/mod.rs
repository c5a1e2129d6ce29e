//! Classifies an opaque quote blob and decodes it into the canonical form.
//!
//! Strategies are tried in a fixed order and the first one that succeeds wins:
//! the protobuf container, then translation of a raw v4 quote, then the raw fixed
//! layout, which accepts any non-empty buffer and defers failures to extraction.

pub mod abi;

use prost::Message;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::{Quote, QuoteFormat};

/// Result of decoding a quote blob.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedQuote<'a> {
    /// Fully decoded into the canonical form, either from the protobuf container or
    /// through ABI translation.
    Structured { format: QuoteFormat, quote: Quote },
    /// Bytes that could only be interpreted through the raw fixed layout.
    Raw(&'a [u8]),
}

impl DecodedQuote<'_> {
    pub fn format(&self) -> QuoteFormat {
        match self {
            DecodedQuote::Structured { format, .. } => *format,
            DecodedQuote::Raw(_) => QuoteFormat::RawManual,
        }
    }

    pub fn as_structured(&self) -> Option<&Quote> {
        match self {
            DecodedQuote::Structured { quote, .. } => Some(quote),
            DecodedQuote::Raw(_) => None,
        }
    }
}

/// Strategies that decode a blob into the canonical form. Bytes rejected by all of them
/// are read through the raw fixed layout instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStrategy {
    Protobuf,
    AbiTranslation,
}

impl DecodeStrategy {
    pub const ORDER: [DecodeStrategy; 2] = [DecodeStrategy::Protobuf, DecodeStrategy::AbiTranslation];

    pub fn format(&self) -> QuoteFormat {
        match self {
            DecodeStrategy::Protobuf => QuoteFormat::Protobuf,
            DecodeStrategy::AbiTranslation => QuoteFormat::RawAbi,
        }
    }

    pub fn attempt(&self, raw: &[u8]) -> anyhow::Result<Quote> {
        match self {
            DecodeStrategy::Protobuf => Ok(Quote::decode(raw)?),
            DecodeStrategy::AbiTranslation => abi::quote_from_abi_bytes(raw),
        }
    }
}

/// Decodes `raw` with the first strategy in [`DecodeStrategy::ORDER`] that accepts it,
/// falling back to the raw fixed layout.
///
/// Any well-formed protobuf message is taken as the container, even one without a header
/// or body; missing parts surface during extraction. Empty input is not a quote.
pub fn decode(raw: &[u8]) -> Result<DecodedQuote<'_>> {
    if raw.is_empty() {
        return Err(Error::UnrecognizedFormat);
    }

    for strategy in DecodeStrategy::ORDER {
        match strategy.attempt(raw) {
            Ok(quote) => {
                let format = strategy.format();
                info!(?format, "detected {}", format.description());
                return Ok(DecodedQuote::Structured { format, quote });
            }
            Err(e) => debug!(?strategy, "strategy rejected quote: {e:#}"),
        }
    }

    info!("detected {}", QuoteFormat::RawManual.description());
    Ok(DecodedQuote::Raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::QuoteBuilder;
    use assert_matches::assert_matches;

    #[test]
    fn protobuf_container_is_preferred() {
        let builder = QuoteBuilder::new();
        let bytes = builder.protobuf();
        let decoded = decode(&bytes).unwrap();

        assert_eq!(decoded.format(), QuoteFormat::Protobuf);
        assert_eq!(decoded.as_structured(), Some(&builder.quote()));
    }

    #[test]
    fn raw_quote_is_translated() {
        let builder = QuoteBuilder::new();
        let bytes = builder.build();
        let decoded = decode(&bytes).unwrap();

        assert_eq!(decoded.format(), QuoteFormat::RawAbi);
        assert_eq!(decoded.as_structured(), Some(&builder.quote()));
    }

    #[test]
    fn raw_quote_is_not_protobuf() {
        let bytes = QuoteBuilder::new().build();
        assert!(DecodeStrategy::Protobuf.attempt(&bytes).is_err());
    }

    #[test]
    fn protobuf_without_header_or_body_stays_protobuf() {
        let bytes = Quote {
            signed_data_size: 7,
            extra_bytes: vec![0x11; 700],
            ..Default::default()
        }
        .encode_to_vec();
        assert!(bytes.len() > crate::constants::TD_REPORT_END);

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.format(), QuoteFormat::Protobuf);
        assert_matches!(
            decoded.as_structured(),
            Some(quote) if quote.header.is_none() && quote.td_quote_body.is_none()
        );

        assert_matches!(crate::inspect_quote(&bytes), Err(Error::MissingBody));
    }

    #[test]
    fn unparseable_bytes_fall_through_to_raw_layout() {
        let mut raw = QuoteBuilder::new().build();
        // Unsupported version: neither protobuf nor a translatable quote.
        raw[0] = 0x05;
        raw[1] = 0x00;
        assert!(DecodeStrategy::Protobuf.attempt(&raw).is_err());

        let decoded = decode(&raw).unwrap();
        assert_eq!(decoded.format(), QuoteFormat::RawManual);
        assert_matches!(decoded, DecodedQuote::Raw(bytes) if bytes == &raw[..]);
    }

    #[test]
    fn short_garbage_decodes_as_raw() {
        let raw = [0xffu8; 10];
        assert_matches!(decode(&raw), Ok(DecodedQuote::Raw(_)));
    }

    #[test]
    fn empty_input_is_not_a_quote() {
        assert_matches!(decode(&[]), Err(Error::UnrecognizedFormat));
    }
}
