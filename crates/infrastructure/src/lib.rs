//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_rbac_store;
mod postgres_authorization_repository;
mod postgres_rbac_admin_repository;

pub use in_memory_rbac_store::InMemoryRbacStore;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_rbac_admin_repository::PostgresRbacAdminRepository;
