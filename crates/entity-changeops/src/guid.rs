//! Entity-scoped claim guids.
//!
//! A claim guid has the form `<entity id>$<uuid>`, for example
//! `Q42$F078E5B3-F9A8-480E-B7AC-D97778CBBEF9`. The entity id part always names
//! the entity that owns the claim.

use std::fmt;

use uuid::Uuid;

use crate::error::{ChangeOpError, GuidError};
use crate::limits::GUID_SEPARATOR;
use crate::model::EntityId;

/// A parsed claim guid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimGuid {
    entity_id: EntityId,
    serialization: String,
}

impl ClaimGuid {
    /// The entity the claim belongs to.
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// The original string form.
    pub fn as_str(&self) -> &str {
        &self.serialization
    }

    /// The uuid part after the separator.
    pub fn uuid_part(&self) -> &str {
        self.serialization
            .split_once(GUID_SEPARATOR)
            .map(|(_, uuid)| uuid)
            .unwrap_or_default()
    }
}

impl fmt::Display for ClaimGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialization)
    }
}

/// Length of a hyphenated 8-4-4-4-12 uuid.
const HYPHENATED_UUID_LEN: usize = 36;

/// Parses `<entity id>$<uuid>`.
///
/// The entity id is matched case-insensitively; the uuid must be in
/// hyphenated 8-4-4-4-12 form (either case).
pub fn parse_claim_guid(guid: &str) -> Result<ClaimGuid, GuidError> {
    let (entity, uuid) = guid
        .split_once(GUID_SEPARATOR)
        .ok_or_else(|| GuidError::MissingSeparator { guid: guid.to_string() })?;

    let entity_id: EntityId = entity
        .parse()
        .map_err(|_| GuidError::MalformedEntityId { guid: guid.to_string() })?;

    if uuid.len() != HYPHENATED_UUID_LEN || Uuid::parse_str(uuid).is_err() {
        return Err(GuidError::MalformedUuid { guid: guid.to_string() });
    }

    Ok(ClaimGuid {
        entity_id,
        serialization: guid.to_string(),
    })
}

/// Parses `guid` and checks that it names `entity_id`.
pub fn check_guid_owner(guid: &str, entity_id: EntityId) -> Result<ClaimGuid, ChangeOpError> {
    let parsed = parse_claim_guid(guid)?;
    if parsed.entity_id() != entity_id {
        return Err(ChangeOpError::ForeignClaimGuid {
            guid: guid.to_string(),
            entity: entity_id,
        });
    }
    Ok(parsed)
}

/// Generates fresh claim guids.
///
/// Stateless; every call draws a new random (v4) uuid.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimGuidGenerator;

impl ClaimGuidGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Returns `<entity id>$<UUID>` with an upper-case hyphenated uuid.
    pub fn new_guid(&self, entity_id: EntityId) -> String {
        format!("{}{}{:X}", entity_id, GUID_SEPARATOR, Uuid::new_v4())
    }
}
