//! Decoded PDU model.
//!
//! A [`Pdu`] is the tagged, already-corrected view of one datagram. The
//! header timestamp is unsigned here; the classifier performs the
//! reinterpretation of the decoder's signed read before building one.

use crate::PduKind;

/// A `{site, application, entity}` identifier triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId {
    pub site: u16,
    pub application: u16,
    pub entity: u16,
}

impl EntityId {
    pub const fn new(site: u16, application: u16, entity: u16) -> Self {
        Self {
            site,
            application,
            entity,
        }
    }
}

/// A `{site, application, eventNumber}` identifier triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EventId {
    pub site: u16,
    pub application: u16,
    pub event_number: u16,
}

impl EventId {
    pub const fn new(site: u16, application: u16, event_number: u16) -> Self {
        Self {
            site,
            application,
            event_number,
        }
    }
}

/// A world coordinate `{x, y, z}`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Fields common to every PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduHeader {
    pub protocol_version: u8,
    pub exercise_id: u8,
    /// Numeric DIS type code as found on the wire.
    pub pdu_type: u8,
    /// Wire timestamp, reinterpreted as unsigned.
    pub timestamp: u32,
}

impl PduHeader {
    pub const fn new(protocol_version: u8, exercise_id: u8, pdu_type: u8, timestamp: u32) -> Self {
        Self {
            protocol_version,
            exercise_id,
            pdu_type,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EntityStateBody {
    pub entity_id: EntityId,
    pub location: Vector3,
}

/// Body shared by Fire and Detonation PDUs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct WarfareBody {
    pub firing_entity_id: EntityId,
    pub target_entity_id: EntityId,
    pub munition_id: EntityId,
    pub location: Vector3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CollisionBody {
    /// The issuing entity.
    #[cfg_attr(feature = "serde", serde(rename = "entityId"))]
    pub issuing_entity_id: EntityId,
    pub colliding_entity_id: EntityId,
}

/// Body shared by the simulation-management PDUs (Data, SetData, StartResume).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SimulationManagementBody {
    pub originating_entity_id: EntityId,
    pub receiving_entity_id: EntityId,
    pub request_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ActionRequestBody {
    pub originating_entity_id: EntityId,
    pub receiving_entity_id: EntityId,
    pub request_id: u32,
    pub action_id: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DesignatorBody {
    pub designating_entity_id: EntityId,
    pub designated_entity_id: EntityId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct EmissionsBody {
    pub emitting_entity_id: EntityId,
    pub event_id: EventId,
}

/// Kind-specific payload of a PDU.
///
/// With the `serde` feature, each variant serializes as its bare fields so
/// the encoder can flatten them into the record.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum PduBody {
    EntityState(EntityStateBody),
    Fire(WarfareBody),
    Collision(CollisionBody),
    Detonation(WarfareBody),
    Data(SimulationManagementBody),
    ActionRequest(ActionRequestBody),
    StartResume(SimulationManagementBody),
    SetData(SimulationManagementBody),
    Designator(DesignatorBody),
    ElectromagneticEmissions(EmissionsBody),
    /// Header-only PDU; no kind-specific fields are projected.
    Other,
}

impl PduBody {
    /// The kind this body belongs to.
    pub const fn kind(&self) -> PduKind {
        match self {
            PduBody::EntityState(_) => PduKind::EntityState,
            PduBody::Fire(_) => PduKind::Fire,
            PduBody::Collision(_) => PduKind::Collision,
            PduBody::Detonation(_) => PduKind::Detonation,
            PduBody::Data(_) => PduKind::Data,
            PduBody::ActionRequest(_) => PduKind::ActionRequest,
            PduBody::StartResume(_) => PduKind::StartResume,
            PduBody::SetData(_) => PduKind::SetData,
            PduBody::Designator(_) => PduKind::Designator,
            PduBody::ElectromagneticEmissions(_) => PduKind::ElectromagneticEmissions,
            PduBody::Other => PduKind::Other,
        }
    }
}

/// A decoded, classified PDU.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pdu {
    pub header: PduHeader,
    pub body: PduBody,
}

impl Pdu {
    pub const fn new(header: PduHeader, body: PduBody) -> Self {
        Self { header, body }
    }

    /// The kind tag used for dispatch and metrics.
    pub const fn kind(&self) -> PduKind {
        self.body.kind()
    }
}
