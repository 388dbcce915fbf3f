use std::collections::BTreeSet;
use std::sync::Arc;

use tessera_core::{AppResult, NonEmptyString};

use crate::RbacAdminRepository;

mod bootstrap;
mod groups;
mod permissions;
mod roles;

pub use bootstrap::BootstrapReport;

/// Application service for role, group and permission administration.
///
/// Callers are trusted: the service performs no actor permission checks.
/// Route handlers are expected to call
/// [`crate::AuthorizationService::require_permission`] first.
#[derive(Clone)]
pub struct RbacAdminService {
    repository: Arc<dyn RbacAdminRepository>,
}

impl RbacAdminService {
    /// Creates a new administration service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn RbacAdminRepository>) -> Self {
        Self { repository }
    }
}

/// Removes repeated ids while keeping first-seen order.
fn dedupe<T: Ord + Clone>(values: Vec<T>) -> Vec<T> {
    let mut seen = BTreeSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

fn optional_field(field: &str, value: Option<String>) -> AppResult<Option<NonEmptyString>> {
    value
        .map(|value| NonEmptyString::for_field(field, value))
        .transpose()
}
