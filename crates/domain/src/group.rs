use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::{AppResult, NonEmptyString};

use crate::{GroupId, UserId};

/// A named bundle of users that collectively inherits a bundle of roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    id: GroupId,
    name: NonEmptyString,
    display_name: NonEmptyString,
    description: String,
    creator_id: UserId,
    created_at: DateTime<Utc>,
}

/// Validated scalar changes for a group; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupChanges {
    /// New unique name.
    pub name: Option<NonEmptyString>,
    /// New display name.
    pub display_name: Option<NonEmptyString>,
    /// New description.
    pub description: Option<String>,
}

impl UserGroup {
    /// Creates a group with validated fields.
    pub fn new(
        id: GroupId,
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        creator_id: UserId,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::for_field("group name", name)?,
            display_name: NonEmptyString::for_field("group display name", display_name)?,
            description: description.into(),
            creator_id,
            created_at,
        })
    }

    /// Returns a copy with `changes` applied.
    #[must_use]
    pub fn with_changes(&self, changes: &GroupChanges) -> Self {
        Self {
            id: self.id,
            name: changes.name.clone().unwrap_or_else(|| self.name.clone()),
            display_name: changes
                .display_name
                .clone()
                .unwrap_or_else(|| self.display_name.clone()),
            description: changes
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            creator_id: self.creator_id.clone(),
            created_at: self.created_at,
        }
    }

    /// Returns the group identifier.
    #[must_use]
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Returns the unique group name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &NonEmptyString {
        &self.display_name
    }

    /// Returns the description, possibly empty.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the user who created the group. Attribution only.
    #[must_use]
    pub fn creator_id(&self) -> &UserId {
        &self.creator_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
