//! Bundled DIS 7 wire decoder.
//!
//! Reads the 12-byte PDU header and, for the kinds the pipeline projects,
//! the handful of body fields the encoder emits. It is not a general DIS
//! codec: fields the records never carry are skipped by offset.
//!
//! All multi-byte values are big-endian.

use bytes::Buf;
use dis_ingest_types::{
    ActionRequestBody, CollisionBody, DesignatorBody, EmissionsBody, EntityId, EntityStateBody,
    EventId, PduBody, PduKind, SimulationManagementBody, Vector3, WarfareBody,
};
use thiserror::Error;

use crate::classifier::{DecodedPdu, PduDecoder};

/// Length of the DIS PDU header in bytes.
pub const HEADER_LEN: usize = 12;

/// Highest PDU type code defined by DIS 7.
pub const MAX_DIS7_TYPE: u8 = 72;

const ENTITY_ID_LEN: usize = 6;
const VECTOR3_F64_LEN: usize = 24;

/// A failure reading a datagram the decoder otherwise accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeFault {
    #[error("buffer underflow: need {needed} bytes at offset {offset}, have {available}")]
    Underflow {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

/// DIS 7 decoder for the header and the projected body fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisDecoder;

impl DisDecoder {
    pub fn new() -> Self {
        DisDecoder
    }
}

impl PduDecoder for DisDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Option<DecodedPdu>, DecodeFault> {
        let mut header = field(bytes, 0, HEADER_LEN)?;
        let protocol_version = header.get_u8();
        let exercise_id = header.get_u8();
        let pdu_type = header.get_u8();
        let _protocol_family = header.get_u8();
        let timestamp = header.get_i32();
        let _length = header.get_u16();

        if pdu_type == 0 || pdu_type > MAX_DIS7_TYPE {
            return Ok(None);
        }

        let body = decode_body(PduKind::from_code(pdu_type), bytes)?;

        Ok(Some(DecodedPdu {
            protocol_version,
            exercise_id,
            pdu_type,
            timestamp,
            body,
        }))
    }
}

fn decode_body(kind: PduKind, bytes: &[u8]) -> Result<PduBody, DecodeFault> {
    let body = match kind {
        PduKind::EntityState => PduBody::EntityState(EntityStateBody {
            entity_id: entity_id(bytes, 12)?,
            location: location(bytes, 48)?,
        }),
        PduKind::Fire => PduBody::Fire(warfare(bytes, 40)?),
        PduKind::Detonation => PduBody::Detonation(warfare(bytes, 48)?),
        PduKind::Collision => PduBody::Collision(CollisionBody {
            issuing_entity_id: entity_id(bytes, 12)?,
            colliding_entity_id: entity_id(bytes, 18)?,
        }),
        PduKind::Data => PduBody::Data(simulation_management(bytes, 24)?),
        PduKind::SetData => PduBody::SetData(simulation_management(bytes, 24)?),
        // Real-world and simulation time precede the request id.
        PduKind::StartResume => PduBody::StartResume(simulation_management(bytes, 40)?),
        PduKind::ActionRequest => PduBody::ActionRequest(ActionRequestBody {
            originating_entity_id: entity_id(bytes, 12)?,
            receiving_entity_id: entity_id(bytes, 18)?,
            request_id: u32_at(bytes, 24)?,
            action_id: u32_at(bytes, 28)?,
        }),
        PduKind::Designator => PduBody::Designator(DesignatorBody {
            designating_entity_id: entity_id(bytes, 12)?,
            // code name (u16) sits between the two ids
            designated_entity_id: entity_id(bytes, 20)?,
        }),
        PduKind::ElectromagneticEmissions => {
            let emitting_entity_id = entity_id(bytes, 12)?;
            let mut event = field(bytes, 18, ENTITY_ID_LEN)?;
            PduBody::ElectromagneticEmissions(EmissionsBody {
                emitting_entity_id,
                event_id: EventId::new(event.get_u16(), event.get_u16(), event.get_u16()),
            })
        }
        PduKind::Other => PduBody::Other,
    };
    Ok(body)
}

/// Firing, target, and munition ids followed by a location at `location_at`.
fn warfare(bytes: &[u8], location_at: usize) -> Result<WarfareBody, DecodeFault> {
    Ok(WarfareBody {
        firing_entity_id: entity_id(bytes, 12)?,
        target_entity_id: entity_id(bytes, 18)?,
        munition_id: entity_id(bytes, 24)?,
        location: location(bytes, location_at)?,
    })
}

fn simulation_management(
    bytes: &[u8],
    request_id_at: usize,
) -> Result<SimulationManagementBody, DecodeFault> {
    Ok(SimulationManagementBody {
        originating_entity_id: entity_id(bytes, 12)?,
        receiving_entity_id: entity_id(bytes, 18)?,
        request_id: u32_at(bytes, request_id_at)?,
    })
}

fn entity_id(bytes: &[u8], offset: usize) -> Result<EntityId, DecodeFault> {
    let mut buf = field(bytes, offset, ENTITY_ID_LEN)?;
    Ok(EntityId::new(buf.get_u16(), buf.get_u16(), buf.get_u16()))
}

fn location(bytes: &[u8], offset: usize) -> Result<Vector3, DecodeFault> {
    let mut buf = field(bytes, offset, VECTOR3_F64_LEN)?;
    Ok(Vector3::new(buf.get_f64(), buf.get_f64(), buf.get_f64()))
}

fn u32_at(bytes: &[u8], offset: usize) -> Result<u32, DecodeFault> {
    Ok(field(bytes, offset, 4)?.get_u32())
}

/// Exactly `len` bytes starting at `offset`, or an underflow.
fn field(bytes: &[u8], offset: usize, len: usize) -> Result<&[u8], DecodeFault> {
    offset
        .checked_add(len)
        .and_then(|end| bytes.get(offset..end))
        .ok_or(DecodeFault::Underflow {
            offset,
            needed: len,
            available: bytes.len().saturating_sub(offset),
        })
}
