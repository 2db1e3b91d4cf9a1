//! JSON projection of classified PDUs.
//!
//! Both entry points are total: a record string comes back for every input.

use dis_ingest_types::{Pdu, PduBody};
use serde::Serialize;

use crate::error::DecodeError;

/// `details` value for PDUs without projected fields.
pub const OTHER_DETAILS: &str = "Unhandled PDU type, basic metadata only";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Record<'a> {
    #[serde(rename = "type")]
    type_name: &'static str,
    protocol_version: u8,
    #[serde(rename = "exerciseID")]
    exercise_id: u8,
    pdu_type: u8,
    timestamp: u32,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    body: Option<&'a PduBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'static str>,
    processed_at: u64,
}

#[derive(Serialize)]
struct ErrorRecord<'a> {
    error: &'a str,
    length: usize,
}

/// Encode a classified PDU as a JSON record.
///
/// `length` is the datagram size, reported only if serialization fails.
///
/// # Example
///
/// ```
/// use dis_ingest::encoder::encode;
/// use dis_ingest_types::{Pdu, PduBody, PduHeader};
///
/// let pdu = Pdu::new(PduHeader::new(7, 1, 5, 42), PduBody::Other);
/// let json = encode(&pdu, 12, 1_700_000_000_000);
/// assert!(json.contains(r#""type":"Pdu""#));
/// assert!(json.contains(r#""details":"Unhandled PDU type, basic metadata only""#));
/// ```
pub fn encode(pdu: &Pdu, length: usize, processed_at_ms: u64) -> String {
    let (body, details) = match &pdu.body {
        PduBody::Other => (None, Some(OTHER_DETAILS)),
        body => (Some(body), None),
    };

    let record = Record {
        type_name: pdu.kind().type_name(),
        protocol_version: pdu.header.protocol_version,
        exercise_id: pdu.header.exercise_id,
        pdu_type: pdu.header.pdu_type,
        timestamp: pdu.header.timestamp,
        body,
        details,
        processed_at: processed_at_ms,
    };

    match serde_json::to_string(&record) {
        Ok(json) => json,
        Err(e) => error_record(&format!("Error encoding PDU: {e}"), length),
    }
}

/// Encode a classification failure as an error record.
pub fn encode_error(err: &DecodeError) -> String {
    error_record(&err.to_string(), err.length())
}

fn error_record(message: &str, length: usize) -> String {
    let record = ErrorRecord {
        error: message,
        length,
    };
    // A struct of a string and an integer always serializes.
    serde_json::to_string(&record).unwrap_or_else(|_| format!("{{\"length\":{length}}}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dis_ingest_types::{
        ActionRequestBody, CollisionBody, DesignatorBody, EmissionsBody, EntityId, EntityStateBody,
        EventId, PduHeader, PduKind, SimulationManagementBody, Vector3, WarfareBody,
    };
    use serde_json::Value;

    const COMMON_KEYS: [&str; 6] = [
        "type",
        "protocolVersion",
        "exerciseID",
        "pduType",
        "timestamp",
        "processedAt",
    ];

    fn sample_body(kind: PduKind) -> PduBody {
        let a = EntityId::new(18, 23, 1001);
        let b = EntityId::new(18, 23, 1002);
        let warfare = WarfareBody {
            firing_entity_id: a,
            target_entity_id: b,
            munition_id: EntityId::new(0, 0, 7),
            location: Vector3::new(1.0, 2.0, 3.0),
        };
        let sim = SimulationManagementBody {
            originating_entity_id: a,
            receiving_entity_id: b,
            request_id: 9,
        };
        match kind {
            PduKind::EntityState => PduBody::EntityState(EntityStateBody {
                entity_id: a,
                location: Vector3::new(10.0, 20.0, 30.0),
            }),
            PduKind::Fire => PduBody::Fire(warfare),
            PduKind::Detonation => PduBody::Detonation(warfare),
            PduKind::Collision => PduBody::Collision(CollisionBody {
                issuing_entity_id: a,
                colliding_entity_id: b,
            }),
            PduKind::Data => PduBody::Data(sim),
            PduKind::SetData => PduBody::SetData(sim),
            PduKind::StartResume => PduBody::StartResume(sim),
            PduKind::ActionRequest => PduBody::ActionRequest(ActionRequestBody {
                originating_entity_id: a,
                receiving_entity_id: b,
                request_id: 9,
                action_id: 4,
            }),
            PduKind::Designator => PduBody::Designator(DesignatorBody {
                designating_entity_id: a,
                designated_entity_id: b,
            }),
            PduKind::ElectromagneticEmissions => {
                PduBody::ElectromagneticEmissions(EmissionsBody {
                    emitting_entity_id: a,
                    event_id: EventId::new(18, 23, 5),
                })
            }
            PduKind::Other => PduBody::Other,
        }
    }

    fn encode_kind(kind: PduKind) -> Value {
        let code = kind.code().unwrap_or(5);
        let pdu = Pdu::new(PduHeader::new(7, 1, code, 3_000_000_000), sample_body(kind));
        serde_json::from_str(&encode(&pdu, 144, 1_700_000_000_000)).unwrap()
    }

    #[test]
    fn every_kind_has_common_keys() {
        for kind in PduKind::ALL {
            let value = encode_kind(kind);
            for key in COMMON_KEYS {
                assert!(value.get(key).is_some(), "{kind} missing {key}");
            }
            assert_eq!(value["type"], kind.type_name());
            assert_eq!(value["protocolVersion"], 7);
            assert_eq!(value["exerciseID"], 1);
            assert_eq!(value["timestamp"], 3_000_000_000u64);
            assert_eq!(value["processedAt"], 1_700_000_000_000u64);
        }
    }

    #[test]
    fn entity_state_fields() {
        let value = encode_kind(PduKind::EntityState);
        assert_eq!(value["entityId"]["site"], 18);
        assert_eq!(value["entityId"]["application"], 23);
        assert_eq!(value["entityId"]["entity"], 1001);
        assert_eq!(value["location"]["x"], 10.0);
        assert_eq!(value["location"]["z"], 30.0);
        assert!(value.get("details").is_none());
    }

    #[test]
    fn fire_fields() {
        let value = encode_kind(PduKind::Fire);
        assert_eq!(value["firingEntityId"]["entity"], 1001);
        assert_eq!(value["targetEntityId"]["entity"], 1002);
        assert_eq!(value["munitionId"]["entity"], 7);
        assert_eq!(value["location"]["y"], 2.0);
    }

    #[test]
    fn collision_uses_entity_id_for_issuer() {
        let value = encode_kind(PduKind::Collision);
        assert_eq!(value["entityId"]["entity"], 1001);
        assert_eq!(value["collidingEntityId"]["entity"], 1002);
    }

    #[test]
    fn designator_fields() {
        let value = encode_kind(PduKind::Designator);
        assert_eq!(value["type"], "DesignatorPdu");
        assert_eq!(value["designatingEntityId"]["entity"], 1001);
        assert_eq!(value["designatedEntityId"]["entity"], 1002);
    }

    #[test]
    fn simulation_management_fields() {
        let value = encode_kind(PduKind::ActionRequest);
        assert_eq!(value["originatingEntityId"]["entity"], 1001);
        assert_eq!(value["receivingEntityId"]["entity"], 1002);
        assert_eq!(value["requestId"], 9);
        assert_eq!(value["actionId"], 4);

        let value = encode_kind(PduKind::StartResume);
        assert_eq!(value["requestId"], 9);
        assert!(value.get("actionId").is_none());
    }

    #[test]
    fn emissions_fields() {
        let value = encode_kind(PduKind::ElectromagneticEmissions);
        assert_eq!(value["emittingEntityId"]["entity"], 1001);
        assert_eq!(value["eventId"]["eventNumber"], 5);
    }

    #[test]
    fn other_has_only_metadata_and_details() {
        let value = encode_kind(PduKind::Other);
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), COMMON_KEYS.len() + 1);
        assert_eq!(value["type"], "Pdu");
        assert_eq!(value["pduType"], 5);
        assert_eq!(value["details"], OTHER_DETAILS);
    }

    #[test]
    fn too_small_error_record_is_exact() {
        let json = encode_error(&DecodeError::TooSmall { length: 10 });
        assert_eq!(json, r#"{"error":"PDU data too small to be valid","length":10}"#);
    }

    #[test]
    fn unrecognized_and_malformed_error_records() {
        let value: Value =
            serde_json::from_str(&encode_error(&DecodeError::Unrecognized { length: 12 })).unwrap();
        assert_eq!(value["error"], "Unknown PDU type");
        assert_eq!(value["length"], 12);

        let value: Value = serde_json::from_str(&encode_error(&DecodeError::Malformed {
            length: 30,
            cause: "buffer underflow".into(),
        }))
        .unwrap();
        assert_eq!(value["error"], "Error decoding PDU: buffer underflow");
        assert_eq!(value["length"], 30);
    }

    #[test]
    fn error_message_is_escaped() {
        let json = encode_error(&DecodeError::Malformed {
            length: 1,
            cause: "quote \" and newline \n".into(),
        });
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"], "Error decoding PDU: quote \" and newline \n");
    }
}
