//! Domain entities and invariants for role-based access control.

#![forbid(unsafe_code)]

mod access;
mod catalog;
mod group;
mod ids;
mod permission;
mod role;

pub use access::EffectivePermissions;
pub use catalog::{Action, PERMISSION_CATALOG, PermissionKey, PermissionSeed, Resource};
pub use group::{GroupChanges, UserGroup};
pub use ids::{GroupId, PermissionId, RoleId, UserId};
pub use permission::Permission;
pub use role::{Role, RoleChanges, SystemRole};
