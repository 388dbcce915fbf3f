use std::collections::BTreeSet;

use crate::{Action, PermissionKey, Resource};

/// Union of every permission reachable from a user through direct and
/// group-inherited roles.
///
/// Keys are kept exactly as stored: a held `manage` is not expanded into
/// the other actions. Expansion happens only in [`EffectivePermissions::allows`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectivePermissions {
    keys: BTreeSet<PermissionKey>,
}

impl EffectivePermissions {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every key from `keys`.
    pub fn merge(&mut self, keys: impl IntoIterator<Item = PermissionKey>) {
        self.keys.extend(keys);
    }

    /// Returns whether any held key satisfies `resource`/`action`.
    #[must_use]
    pub fn allows(&self, resource: Resource, action: Action) -> bool {
        self.keys.iter().any(|key| key.allows(resource, action))
    }

    /// Returns held keys rendered as `"resource:action"`.
    #[must_use]
    pub fn to_strings(&self) -> BTreeSet<String> {
        self.keys.iter().map(ToString::to_string).collect()
    }

    /// Returns the number of distinct held keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns whether no key is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl FromIterator<PermissionKey> for EffectivePermissions {
    fn from_iter<T: IntoIterator<Item = PermissionKey>>(iter: T) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}
