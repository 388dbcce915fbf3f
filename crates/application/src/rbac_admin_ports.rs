mod groups;
mod permissions;
mod repository;
mod roles;

pub use groups::{CreateUserGroupInput, GroupDefinition, UpdateUserGroupInput};
pub use permissions::{CreatePermissionInput, PermissionListing};
pub use repository::RbacAdminRepository;
pub use roles::{CreateRoleInput, RoleDefinition, RoleListing, UpdateRoleInput, UserRoleAssignment};
