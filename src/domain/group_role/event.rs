//! Group role domain events

use crate::domain::shared::events::{DomainEvent, EventMetadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Group role created event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRoleCreated {
    pub metadata: EventMetadata,
    pub role_id: String,
    pub is_admin: bool,
    pub permission_count: usize,
}

impl DomainEvent for GroupRoleCreated {
    fn event_type(&self) -> &'static str {
        "group_role.created"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.metadata.occurred_at
    }
}

/// Group role updated event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRoleUpdated {
    pub metadata: EventMetadata,
    pub role_id: String,
    pub granted: Vec<String>,
    pub revoked: Vec<String>,
}

impl DomainEvent for GroupRoleUpdated {
    fn event_type(&self) -> &'static str {
        "group_role.updated"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.metadata.occurred_at
    }
}

/// Group role deleted event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRoleDeleted {
    pub metadata: EventMetadata,
    pub role_id: String,
}

impl DomainEvent for GroupRoleDeleted {
    fn event_type(&self) -> &'static str {
        "group_role.deleted"
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.metadata.occurred_at
    }
}

/// Enum wrapping all group role events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GroupRoleEvent {
    Created(GroupRoleCreated),
    Updated(GroupRoleUpdated),
    Deleted(GroupRoleDeleted),
}

impl GroupRoleEvent {
    pub fn created(role_id: impl Into<String>, is_admin: bool, permission_count: usize) -> Self {
        GroupRoleEvent::Created(GroupRoleCreated {
            metadata: EventMetadata::new("group_role.created"),
            role_id: role_id.into(),
            is_admin,
            permission_count,
        })
    }

    pub fn updated(role_id: impl Into<String>, granted: Vec<String>, revoked: Vec<String>) -> Self {
        GroupRoleEvent::Updated(GroupRoleUpdated {
            metadata: EventMetadata::new("group_role.updated"),
            role_id: role_id.into(),
            granted,
            revoked,
        })
    }

    pub fn deleted(role_id: impl Into<String>) -> Self {
        GroupRoleEvent::Deleted(GroupRoleDeleted {
            metadata: EventMetadata::new("group_role.deleted"),
            role_id: role_id.into(),
        })
    }

    pub fn role_id(&self) -> &str {
        match self {
            GroupRoleEvent::Created(e) => &e.role_id,
            GroupRoleEvent::Updated(e) => &e.role_id,
            GroupRoleEvent::Deleted(e) => &e.role_id,
        }
    }

    fn inner(&self) -> &dyn DomainEvent {
        match self {
            GroupRoleEvent::Created(e) => e,
            GroupRoleEvent::Updated(e) => e,
            GroupRoleEvent::Deleted(e) => e,
        }
    }
}

impl DomainEvent for GroupRoleEvent {
    fn event_type(&self) -> &'static str {
        self.inner().event_type()
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.inner().occurred_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_types() {
        let created = GroupRoleEvent::created("node-group-administrator", true, 5);
        assert_eq!(created.event_type(), "group_role.created");
        assert_eq!(created.role_id(), "node-group-administrator");

        let deleted = GroupRoleEvent::deleted("node-group-member");
        assert_eq!(deleted.event_type(), "group_role.deleted");
    }

    #[test]
    fn test_event_serializes_with_tag() {
        let event = GroupRoleEvent::updated(
            "node-group-member",
            vec!["view group".to_string()],
            vec![],
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Updated");
        assert_eq!(json["role_id"], "node-group-member");
        assert_eq!(json["metadata"]["event_type"], "group_role.updated");
    }
}
