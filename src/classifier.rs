//! Turns raw datagrams into classified [`Pdu`]s.

use std::fmt::Debug;

use dis_ingest_types::{Pdu, PduBody, PduHeader, PduKind};

use crate::error::DecodeError;
use crate::wire::DecodeFault;

/// Smallest datagram handed to a decoder: one DIS header.
pub const MIN_PDU_SIZE: usize = 12;

/// Output of a [`PduDecoder`], before classification.
///
/// `timestamp` is the signed 32-bit read found on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedPdu {
    pub protocol_version: u8,
    pub exercise_id: u8,
    pub pdu_type: u8,
    pub timestamp: i32,
    pub body: PduBody,
}

/// Trait for decoding DIS datagrams.
///
/// Implementations return `Ok(None)` when the bytes are not a PDU they
/// recognize, and `Err` when a recognized PDU cannot be read.
pub trait PduDecoder: Send + Sync + Debug {
    fn decode(&self, bytes: &[u8]) -> Result<Option<DecodedPdu>, DecodeFault>;
}

/// Validates datagrams, invokes a decoder, and tags the result with its kind.
#[derive(Debug, Clone, Default)]
pub struct Classifier<D> {
    decoder: D,
}

impl<D: PduDecoder> Classifier<D> {
    pub fn new(decoder: D) -> Self {
        Self { decoder }
    }

    /// Classify one datagram.
    ///
    /// # Example
    ///
    /// ```
    /// use dis_ingest::{Classifier, DecodeError, DisDecoder};
    ///
    /// let classifier = Classifier::new(DisDecoder::new());
    /// let err = classifier.classify(&[0u8; 4]).unwrap_err();
    /// assert_eq!(err, DecodeError::TooSmall { length: 4 });
    /// ```
    pub fn classify(&self, bytes: &[u8]) -> Result<Pdu, DecodeError> {
        let length = bytes.len();
        if length < MIN_PDU_SIZE {
            return Err(DecodeError::TooSmall { length });
        }

        let decoded = match self.decoder.decode(bytes) {
            Ok(Some(decoded)) => decoded,
            Ok(None) => return Err(DecodeError::Unrecognized { length }),
            Err(fault) => {
                return Err(DecodeError::Malformed {
                    length,
                    cause: fault.to_string(),
                })
            }
        };

        let kind = PduKind::from_code(decoded.pdu_type);
        if decoded.body.kind() != kind {
            return Err(DecodeError::Malformed {
                length,
                cause: format!(
                    "{} body for PDU type {}",
                    decoded.body.kind(),
                    decoded.pdu_type
                ),
            });
        }

        let header = PduHeader::new(
            decoded.protocol_version,
            decoded.exercise_id,
            decoded.pdu_type,
            decoded.timestamp as u32,
        );
        Ok(Pdu::new(header, decoded.body))
    }
}
