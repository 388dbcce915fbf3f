//! The closed permission catalog and the manage-implication rule.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tessera_core::AppError;

/// Domain object categories that permissions apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    /// User accounts.
    User,
    /// Projects and their milestones, comments and ratings.
    Project,
    /// Strategy goals.
    Strategy,
    /// Finance records.
    Finance,
    /// Points ledger.
    Points,
    /// Analytics dashboards.
    Analytics,
    /// Team chat.
    Chat,
    /// Announcements.
    Announcement,
    /// System settings.
    Settings,
}

impl Resource {
    /// Returns a stable storage value for this resource.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Project => "project",
            Self::Strategy => "strategy",
            Self::Finance => "finance",
            Self::Points => "points",
            Self::Analytics => "analytics",
            Self::Chat => "chat",
            Self::Announcement => "announcement",
            Self::Settings => "settings",
        }
    }

    /// Returns all known resources.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Resource] = &[
            Resource::User,
            Resource::Project,
            Resource::Strategy,
            Resource::Finance,
            Resource::Points,
            Resource::Analytics,
            Resource::Chat,
            Resource::Announcement,
            Resource::Settings,
        ];

        ALL
    }
}

impl Display for Resource {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|resource| resource.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown resource '{value}'")))
    }
}

/// Operation categories applicable to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create new objects.
    Create,
    /// Read objects.
    Read,
    /// Modify objects.
    Update,
    /// Remove objects.
    Delete,
    /// Full rights; implies every other action on the same resource.
    Manage,
}

impl Action {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Manage => "manage",
        }
    }

    /// Returns all known actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Action] = &[
            Action::Create,
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::Manage,
        ];

        ALL
    }

    /// Returns every action that holding `self` grants.
    ///
    /// `manage` implies all actions including itself; any other action
    /// implies only itself.
    #[must_use]
    pub fn implied_actions(&self) -> &'static [Self] {
        match self {
            Self::Manage => Self::all(),
            Self::Create => &[Self::Create],
            Self::Read => &[Self::Read],
            Self::Update => &[Self::Update],
            Self::Delete => &[Self::Delete],
        }
    }

    /// Returns whether holding `self` satisfies a request for `requested`.
    #[must_use]
    pub fn grants(&self, requested: Self) -> bool {
        self.implied_actions().contains(&requested)
    }
}

impl Display for Action {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown action '{value}'")))
    }
}

/// A `(resource, action)` pair, rendered as `"resource:action"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionKey {
    /// Resource the permission applies to.
    pub resource: Resource,
    /// Action the permission grants as stored.
    pub action: Action,
}

impl PermissionKey {
    /// Creates a key from its parts.
    #[must_use]
    pub fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }

    /// Returns whether this stored grant satisfies a check for `resource`/`action`.
    #[must_use]
    pub fn allows(&self, resource: Resource, action: Action) -> bool {
        self.resource == resource && self.action.grants(action)
    }
}

impl Display for PermissionKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.resource, self.action)
    }
}

impl FromStr for PermissionKey {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((resource, action)) = value.split_once(':') else {
            return Err(AppError::Validation(format!(
                "permission key '{value}' must have the form 'resource:action'"
            )));
        };

        Ok(Self::new(resource.parse()?, action.parse()?))
    }
}

/// Seed entry of the built-in permission catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionSeed {
    /// Resource and action of the seeded permission.
    pub key: PermissionKey,
    /// Human-readable label.
    pub display_name: &'static str,
    /// Longer description shown in administration screens.
    pub description: &'static str,
}

impl PermissionSeed {
    const fn new(
        resource: Resource,
        action: Action,
        display_name: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            key: PermissionKey { resource, action },
            display_name,
            description,
        }
    }

    /// Returns the unique permission name (`"resource:action"`).
    #[must_use]
    pub fn name(&self) -> String {
        self.key.to_string()
    }
}

/// Permissions created by the bootstrap procedure.
pub const PERMISSION_CATALOG: &[PermissionSeed] = &[
    PermissionSeed::new(
        Resource::User,
        Action::Create,
        "Create users",
        "Create new user accounts",
    ),
    PermissionSeed::new(
        Resource::User,
        Action::Read,
        "View users",
        "View user information",
    ),
    PermissionSeed::new(
        Resource::User,
        Action::Update,
        "Update users",
        "Modify user information",
    ),
    PermissionSeed::new(
        Resource::User,
        Action::Delete,
        "Delete users",
        "Delete user accounts",
    ),
    PermissionSeed::new(
        Resource::User,
        Action::Manage,
        "Manage users",
        "Full control over users",
    ),
    PermissionSeed::new(
        Resource::Project,
        Action::Create,
        "Create projects",
        "Create new projects",
    ),
    PermissionSeed::new(
        Resource::Project,
        Action::Read,
        "View projects",
        "View project information",
    ),
    PermissionSeed::new(
        Resource::Project,
        Action::Update,
        "Update projects",
        "Modify project information",
    ),
    PermissionSeed::new(
        Resource::Project,
        Action::Delete,
        "Delete projects",
        "Delete projects",
    ),
    PermissionSeed::new(
        Resource::Project,
        Action::Manage,
        "Manage projects",
        "Full control over projects",
    ),
    PermissionSeed::new(
        Resource::Strategy,
        Action::Create,
        "Create strategy",
        "Create strategy goals",
    ),
    PermissionSeed::new(
        Resource::Strategy,
        Action::Read,
        "View strategy",
        "View strategy information",
    ),
    PermissionSeed::new(
        Resource::Strategy,
        Action::Update,
        "Update strategy",
        "Modify strategy information",
    ),
    PermissionSeed::new(
        Resource::Strategy,
        Action::Delete,
        "Delete strategy",
        "Delete strategy goals",
    ),
    PermissionSeed::new(
        Resource::Strategy,
        Action::Manage,
        "Manage strategy",
        "Full control over strategy",
    ),
    PermissionSeed::new(
        Resource::Finance,
        Action::Read,
        "View finance",
        "View finance data",
    ),
    PermissionSeed::new(
        Resource::Finance,
        Action::Update,
        "Update finance",
        "Modify finance data",
    ),
    PermissionSeed::new(
        Resource::Finance,
        Action::Manage,
        "Manage finance",
        "Full control over finance",
    ),
    PermissionSeed::new(
        Resource::Points,
        Action::Read,
        "View points",
        "View points balances",
    ),
    PermissionSeed::new(
        Resource::Points,
        Action::Update,
        "Update points",
        "Adjust points",
    ),
    PermissionSeed::new(
        Resource::Points,
        Action::Manage,
        "Manage points",
        "Full control over points",
    ),
    PermissionSeed::new(
        Resource::Analytics,
        Action::Read,
        "View analytics",
        "View analytics dashboards",
    ),
    PermissionSeed::new(
        Resource::Analytics,
        Action::Manage,
        "Manage analytics",
        "Manage analytics dashboards",
    ),
    PermissionSeed::new(
        Resource::Chat,
        Action::Read,
        "View chat",
        "Read chat history",
    ),
    PermissionSeed::new(
        Resource::Chat,
        Action::Create,
        "Send messages",
        "Send chat messages",
    ),
    PermissionSeed::new(
        Resource::Chat,
        Action::Manage,
        "Manage chat",
        "Moderate the chat system",
    ),
    PermissionSeed::new(
        Resource::Announcement,
        Action::Read,
        "View announcements",
        "Read announcements",
    ),
    PermissionSeed::new(
        Resource::Announcement,
        Action::Create,
        "Publish announcements",
        "Publish announcements",
    ),
    PermissionSeed::new(
        Resource::Announcement,
        Action::Manage,
        "Manage announcements",
        "Manage the announcement system",
    ),
    PermissionSeed::new(
        Resource::Settings,
        Action::Read,
        "View settings",
        "View system settings",
    ),
    PermissionSeed::new(
        Resource::Settings,
        Action::Manage,
        "Manage settings",
        "Manage system settings",
    ),
];

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::{Action, PERMISSION_CATALOG, PermissionKey, Resource};

    fn resource_strategy() -> impl Strategy<Value = Resource> {
        proptest::sample::select(Resource::all().to_vec())
    }

    fn action_strategy() -> impl Strategy<Value = Action> {
        proptest::sample::select(Action::all().to_vec())
    }

    #[test]
    fn manage_implies_every_action() {
        let implied = Action::Manage.implied_actions();
        assert_eq!(implied.len(), Action::all().len());
        for action in Action::all() {
            assert!(Action::Manage.grants(*action));
        }
    }

    #[test]
    fn read_does_not_imply_update() {
        assert!(Action::Read.grants(Action::Read));
        assert!(!Action::Read.grants(Action::Update));
        assert!(!Action::Read.grants(Action::Manage));
    }

    #[test]
    fn permission_key_renders_resource_colon_action() {
        let key = PermissionKey::new(Resource::Project, Action::Manage);
        assert_eq!(key.to_string(), "project:manage");
    }

    #[test]
    fn permission_key_rejects_unknown_parts() {
        assert!(PermissionKey::from_str("project").is_err());
        assert!(PermissionKey::from_str("project:approve").is_err());
        assert!(PermissionKey::from_str("invoice:read").is_err());
    }

    #[test]
    fn catalog_names_are_unique() {
        let names = PERMISSION_CATALOG
            .iter()
            .map(|seed| seed.name())
            .collect::<HashSet<_>>();
        assert_eq!(names.len(), PERMISSION_CATALOG.len());
        assert_eq!(PERMISSION_CATALOG.len(), 31);
    }

    proptest! {
        /// A stored manage grant satisfies every action on its own resource.
        #[test]
        fn manage_grant_allows_all_actions_on_same_resource(
            resource in resource_strategy(),
            action in action_strategy(),
        ) {
            let key = PermissionKey::new(resource, Action::Manage);
            prop_assert!(key.allows(resource, action));
        }

        /// No grant ever leaks onto a different resource.
        #[test]
        fn grants_never_cross_resources(
            held_resource in resource_strategy(),
            held_action in action_strategy(),
            requested_resource in resource_strategy(),
            requested_action in action_strategy(),
        ) {
            prop_assume!(held_resource != requested_resource);
            let key = PermissionKey::new(held_resource, held_action);
            prop_assert!(!key.allows(requested_resource, requested_action));
        }

        /// A non-manage grant satisfies exactly its own action.
        #[test]
        fn plain_grant_allows_only_itself(
            resource in resource_strategy(),
            held_action in action_strategy(),
            requested_action in action_strategy(),
        ) {
            prop_assume!(held_action != Action::Manage);
            let key = PermissionKey::new(resource, held_action);
            prop_assert_eq!(
                key.allows(resource, requested_action),
                held_action == requested_action
            );
        }

        /// Every key parses back from its rendered form.
        #[test]
        fn permission_key_parses_its_display(
            resource in resource_strategy(),
            action in action_strategy(),
        ) {
            let key = PermissionKey::new(resource, action);
            let parsed = PermissionKey::from_str(key.to_string().as_str());
            prop_assert!(parsed.is_ok());
            prop_assert_eq!(parsed.ok(), Some(key));
        }
    }
}
