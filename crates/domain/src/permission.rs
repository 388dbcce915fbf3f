use serde::{Deserialize, Serialize};
use tessera_core::{AppResult, NonEmptyString};

use crate::{Action, PermissionId, PermissionKey, Resource};

/// A named `(resource, action)` grant that roles can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: PermissionId,
    name: NonEmptyString,
    key: PermissionKey,
    display_name: NonEmptyString,
    description: String,
}

impl Permission {
    /// Creates a permission with validated fields.
    pub fn new(
        id: PermissionId,
        name: impl Into<String>,
        key: PermissionKey,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::for_field("permission name", name)?,
            key,
            display_name: NonEmptyString::for_field("permission display name", display_name)?,
            description: description.into(),
        })
    }

    /// Returns the permission identifier.
    #[must_use]
    pub fn id(&self) -> PermissionId {
        self.id
    }

    /// Returns the unique permission name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the `(resource, action)` pair.
    #[must_use]
    pub fn key(&self) -> PermissionKey {
        self.key
    }

    /// Returns the resource tag.
    #[must_use]
    pub fn resource(&self) -> Resource {
        self.key.resource
    }

    /// Returns the action tag as stored.
    #[must_use]
    pub fn action(&self) -> Action {
        self.key.action
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
}
