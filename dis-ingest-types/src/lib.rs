//! # dis-ingest-types
//!
//! Core types shared by the DIS ingestion pipeline. This crate defines the
//! decoded PDU model that flows from the classifier to the encoder, and the
//! real-time metrics snapshot served to external readers.
//!
//! ## Features
//!
//! - `serde`: JSON serialization via serde. The field names match the record
//!   and metrics wire shapes (camelCase, `exerciseID`, etc).
//!
//! ## Example
//!
//! ```rust
//! use dis_ingest_types::{EntityId, Pdu, PduBody, PduHeader, PduKind, Vector3};
//! use dis_ingest_types::EntityStateBody;
//!
//! let pdu = Pdu::new(
//!     PduHeader::new(7, 1, 1, 1_234_567_890),
//!     PduBody::EntityState(EntityStateBody {
//!         entity_id: EntityId::new(18, 23, 1001),
//!         location: Vector3::new(10.0, 20.0, 30.0),
//!     }),
//! );
//!
//! assert_eq!(pdu.kind(), PduKind::EntityState);
//! assert_eq!(pdu.kind().type_name(), "EntityStatePdu");
//! ```

mod kind;
mod metrics;
mod pdu;
mod time;

pub use kind::*;
pub use metrics::*;
pub use pdu::*;
pub use time::*;

/// Length of the sliding metrics window in milliseconds.
pub const WINDOW_MS: u64 = 60_000;
