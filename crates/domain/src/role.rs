use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tessera_core::{AppError, AppResult, NonEmptyString};

use crate::{Action, PermissionKey, Resource, RoleId};

/// A named, reusable bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    id: RoleId,
    name: NonEmptyString,
    display_name: NonEmptyString,
    description: String,
    is_system: bool,
    created_at: DateTime<Utc>,
}

/// Validated scalar changes for a role; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleChanges {
    /// New unique name.
    pub name: Option<NonEmptyString>,
    /// New display name.
    pub display_name: Option<NonEmptyString>,
    /// New description.
    pub description: Option<String>,
}

impl Role {
    /// Creates a role with validated fields.
    pub fn new(
        id: RoleId,
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        is_system: bool,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            name: NonEmptyString::for_field("role name", name)?,
            display_name: NonEmptyString::for_field("role display name", display_name)?,
            description: description.into(),
            is_system,
            created_at,
        })
    }

    /// Fails with `Forbidden` when the role is system-protected.
    ///
    /// Every role-mutating operation calls this before touching the store.
    pub fn ensure_mutable(&self) -> AppResult<()> {
        if self.is_system {
            return Err(AppError::Forbidden(format!(
                "system role '{}' cannot be modified or deleted",
                self.name
            )));
        }

        Ok(())
    }

    /// Returns a copy with `changes` applied, rejecting system roles.
    pub fn with_changes(&self, changes: &RoleChanges) -> AppResult<Self> {
        self.ensure_mutable()?;

        Ok(Self {
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
            is_system: self.is_system,
            created_at: self.created_at,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the unique role name.
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

    /// Indicates a protected built-in role.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.is_system
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// The five built-in roles seeded at bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemRole {
    /// Holds every permission.
    SuperAdmin,
    /// Manages everything except system settings.
    Admin,
    /// Runs projects, strategy and team communication.
    Manager,
    /// Regular team member.
    Member,
    /// Read-only visitor.
    Guest,
}

impl SystemRole {
    /// Returns the unique role name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Member => "member",
            Self::Guest => "guest",
        }
    }

    /// Returns the display name used when the role is first created.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Administrator",
            Self::Admin => "Administrator",
            Self::Manager => "Manager",
            Self::Member => "Member",
            Self::Guest => "Guest",
        }
    }

    /// Returns the description used when the role is first created.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Holds every permission in the system",
            Self::Admin => "Holds most administrative permissions",
            Self::Manager => "Manages projects and teams",
            Self::Member => "Regular team member",
            Self::Guest => "Read-only access",
        }
    }

    /// Returns all built-in roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[SystemRole] = &[
            SystemRole::SuperAdmin,
            SystemRole::Admin,
            SystemRole::Manager,
            SystemRole::Member,
            SystemRole::Guest,
        ];

        ALL
    }

    /// Returns whether bootstrap grants `key` to this role.
    #[must_use]
    pub fn includes(&self, key: PermissionKey) -> bool {
        let PermissionKey { resource, action } = key;
        match self {
            Self::SuperAdmin => true,
            Self::Admin => {
                (action == Action::Manage && resource != Resource::Settings)
                    || action == Action::Read
            }
            Self::Manager => {
                (matches!(
                    resource,
                    Resource::Project
                        | Resource::Strategy
                        | Resource::Chat
                        | Resource::Announcement
                ) && matches!(
                    action,
                    Action::Read | Action::Create | Action::Update | Action::Manage
                )) || key == PermissionKey::new(Resource::Analytics, Action::Read)
                    || key == PermissionKey::new(Resource::User, Action::Read)
            }
            Self::Member => {
                (matches!(
                    resource,
                    Resource::Project | Resource::Chat | Resource::Announcement
                ) && matches!(action, Action::Read | Action::Create | Action::Update))
                    || key == PermissionKey::new(Resource::User, Action::Read)
            }
            Self::Guest => action == Action::Read,
        }
    }
}
