//! PDU kind enumeration.

use core::fmt;

/// The semantic type of a decoded PDU.
///
/// Every DIS type code maps to exactly one kind. Codes that the pipeline
/// does not project in detail map to [`PduKind::Other`], which is never
/// treated as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PduKind {
    EntityState,
    Fire,
    Collision,
    Detonation,
    Data,
    ActionRequest,
    StartResume,
    SetData,
    Designator,
    ElectromagneticEmissions,
    Other,
}

impl PduKind {
    /// Number of kinds, including `Other`.
    pub const COUNT: usize = 11;

    /// All kinds in index order.
    pub const ALL: [PduKind; Self::COUNT] = [
        PduKind::EntityState,
        PduKind::Fire,
        PduKind::Collision,
        PduKind::Detonation,
        PduKind::Data,
        PduKind::ActionRequest,
        PduKind::StartResume,
        PduKind::SetData,
        PduKind::Designator,
        PduKind::ElectromagneticEmissions,
        PduKind::Other,
    ];

    /// Map a DIS PDU type code to a kind.
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => PduKind::EntityState,
            2 => PduKind::Fire,
            3 => PduKind::Detonation,
            4 => PduKind::Collision,
            13 => PduKind::StartResume,
            16 => PduKind::ActionRequest,
            19 => PduKind::SetData,
            20 => PduKind::Data,
            23 => PduKind::ElectromagneticEmissions,
            24 => PduKind::Designator,
            _ => PduKind::Other,
        }
    }

    /// The DIS type code for this kind, if it has a single one.
    pub const fn code(self) -> Option<u8> {
        match self {
            PduKind::EntityState => Some(1),
            PduKind::Fire => Some(2),
            PduKind::Detonation => Some(3),
            PduKind::Collision => Some(4),
            PduKind::StartResume => Some(13),
            PduKind::ActionRequest => Some(16),
            PduKind::SetData => Some(19),
            PduKind::Data => Some(20),
            PduKind::ElectromagneticEmissions => Some(23),
            PduKind::Designator => Some(24),
            PduKind::Other => None,
        }
    }

    /// Position of this kind in [`PduKind::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The record `type` name emitted by the encoder.
    pub const fn type_name(self) -> &'static str {
        match self {
            PduKind::EntityState => "EntityStatePdu",
            PduKind::Fire => "FirePdu",
            PduKind::Collision => "CollisionPdu",
            PduKind::Detonation => "DetonationPdu",
            PduKind::Data => "DataPdu",
            PduKind::ActionRequest => "ActionRequestPdu",
            PduKind::StartResume => "StartResumePdu",
            PduKind::SetData => "SetDataPdu",
            PduKind::Designator => "DesignatorPdu",
            PduKind::ElectromagneticEmissions => "ElectromagneticEmissionsPdu",
            PduKind::Other => "Pdu",
        }
    }

    /// Short snake_case label, used for log fields and Prometheus labels.
    pub const fn label(self) -> &'static str {
        match self {
            PduKind::EntityState => "entity_state",
            PduKind::Fire => "fire",
            PduKind::Collision => "collision",
            PduKind::Detonation => "detonation",
            PduKind::Data => "data",
            PduKind::ActionRequest => "action_request",
            PduKind::StartResume => "start_resume",
            PduKind::SetData => "set_data",
            PduKind::Designator => "designator",
            PduKind::ElectromagneticEmissions => "electromagnetic_emissions",
            PduKind::Other => "other",
        }
    }
}

impl fmt::Display for PduKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}
