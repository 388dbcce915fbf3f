//! Application services and ports for role-based access control.

#![forbid(unsafe_code)]

mod authorization_service;
mod rbac_admin_ports;
mod rbac_admin_service;

pub use authorization_service::{AuthorizationRepository, AuthorizationService};
pub use rbac_admin_ports::{
    CreatePermissionInput, CreateRoleInput, CreateUserGroupInput, GroupDefinition,
    PermissionListing, RbacAdminRepository, RoleDefinition, RoleListing, UpdateRoleInput,
    UpdateUserGroupInput, UserRoleAssignment,
};
pub use rbac_admin_service::{BootstrapReport, RbacAdminService};
