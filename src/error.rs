//! Error types for the ingestion pipeline.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Why a datagram could not be turned into a [`Pdu`](dis_ingest_types::Pdu).
///
/// Every variant is recoverable: the receive loop logs it, counts a decode
/// failure, and publishes an error record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Shorter than the DIS header.
    #[error("PDU data too small to be valid")]
    TooSmall { length: usize },

    /// The decoder failed on the datagram.
    #[error("Error decoding PDU: {cause}")]
    Malformed { length: usize, cause: String },

    /// The decoder did not recognize the datagram as any PDU.
    #[error("Unknown PDU type")]
    Unrecognized { length: usize },
}

impl DecodeError {
    /// Size of the offending datagram in bytes.
    pub fn length(&self) -> usize {
        match self {
            DecodeError::TooSmall { length }
            | DecodeError::Malformed { length, .. }
            | DecodeError::Unrecognized { length } => *length,
        }
    }
}

/// Failures of the UDP receive loop. Both are fatal.
#[derive(Debug, Error)]
pub enum ReceiverError {
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("UDP socket is unusable: {0}")]
    Socket(#[source] io::Error),
}
