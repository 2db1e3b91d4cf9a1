//! Real-time metrics snapshot types.

use crate::PduKind;

/// A point-in-time view of PDU arrivals over the last sixty seconds.
///
/// Snapshots are built fresh on every read and never cached. With the
/// `serde` feature the field names follow the metrics read surface, e.g.
/// `pdusInLastSixtySeconds` and `fireEventPdusInLastSixtySeconds`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RealTimeMetrics {
    /// Timestamp of the most recent PDU, or the snapshot time if none arrived yet.
    pub last_pdu_received_timestamp_ms: u64,

    /// PDUs of any kind received within the window.
    pub pdus_in_last_sixty_seconds: u64,

    /// `pdus_in_last_sixty_seconds / 60.0`.
    pub average_pdu_rate_per_second_last_sixty_seconds: f64,

    pub entity_state_pdus_in_last_sixty_seconds: u64,
    pub fire_event_pdus_in_last_sixty_seconds: u64,
    pub collision_pdus_in_last_sixty_seconds: u64,
    pub detonation_pdus_in_last_sixty_seconds: u64,
    pub data_pdus_in_last_sixty_seconds: u64,
    pub action_request_pdus_in_last_sixty_seconds: u64,
    pub start_resume_pdus_in_last_sixty_seconds: u64,
    pub set_data_pdus_in_last_sixty_seconds: u64,
    pub designator_pdus_in_last_sixty_seconds: u64,
    pub electromagnetic_emissions_pdus_in_last_sixty_seconds: u64,
    pub other_pdus_in_last_sixty_seconds: u64,
}

impl RealTimeMetrics {
    /// Build a snapshot from window sizes.
    ///
    /// `per_kind` is indexed by [`PduKind::index`].
    pub fn from_counts(
        last_pdu_received_timestamp_ms: u64,
        aggregate: u64,
        per_kind: &[u64; PduKind::COUNT],
    ) -> Self {
        let count = |kind: PduKind| per_kind[kind.index()];
        Self {
            last_pdu_received_timestamp_ms,
            pdus_in_last_sixty_seconds: aggregate,
            average_pdu_rate_per_second_last_sixty_seconds: aggregate as f64 / 60.0,
            entity_state_pdus_in_last_sixty_seconds: count(PduKind::EntityState),
            fire_event_pdus_in_last_sixty_seconds: count(PduKind::Fire),
            collision_pdus_in_last_sixty_seconds: count(PduKind::Collision),
            detonation_pdus_in_last_sixty_seconds: count(PduKind::Detonation),
            data_pdus_in_last_sixty_seconds: count(PduKind::Data),
            action_request_pdus_in_last_sixty_seconds: count(PduKind::ActionRequest),
            start_resume_pdus_in_last_sixty_seconds: count(PduKind::StartResume),
            set_data_pdus_in_last_sixty_seconds: count(PduKind::SetData),
            designator_pdus_in_last_sixty_seconds: count(PduKind::Designator),
            electromagnetic_emissions_pdus_in_last_sixty_seconds: count(
                PduKind::ElectromagneticEmissions,
            ),
            other_pdus_in_last_sixty_seconds: count(PduKind::Other),
        }
    }

    /// Window count for a single kind.
    pub fn count(&self, kind: PduKind) -> u64 {
        match kind {
            PduKind::EntityState => self.entity_state_pdus_in_last_sixty_seconds,
            PduKind::Fire => self.fire_event_pdus_in_last_sixty_seconds,
            PduKind::Collision => self.collision_pdus_in_last_sixty_seconds,
            PduKind::Detonation => self.detonation_pdus_in_last_sixty_seconds,
            PduKind::Data => self.data_pdus_in_last_sixty_seconds,
            PduKind::ActionRequest => self.action_request_pdus_in_last_sixty_seconds,
            PduKind::StartResume => self.start_resume_pdus_in_last_sixty_seconds,
            PduKind::SetData => self.set_data_pdus_in_last_sixty_seconds,
            PduKind::Designator => self.designator_pdus_in_last_sixty_seconds,
            PduKind::ElectromagneticEmissions => {
                self.electromagnetic_emissions_pdus_in_last_sixty_seconds
            }
            PduKind::Other => self.other_pdus_in_last_sixty_seconds,
        }
    }
}

/// Monotonic pipeline totals since startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PipelineCounters {
    /// Datagrams that failed classification.
    pub decode_failures: u64,
    /// Records accepted by the publisher queue.
    pub published: u64,
    /// Records acknowledged by the sink.
    pub delivered: u64,
    /// Records the sink rejected or failed to send.
    pub publish_failures: u64,
    /// Records dropped because the publisher queue was full.
    pub dropped: u64,
}
