//! `galeria-auth`: authorization guard consumed by the catalog sync layer.
//!
//! Authentication itself (sessions, tokens) lives outside this workspace; this
//! crate only answers "may this principal perform this operation?" before any
//! remote call is made.

pub mod authorize;
pub mod permissions;
pub mod principal;
pub mod roles;

pub use authorize::{authorize, AuthzError, PermissionGuard, Principal};
pub use permissions::Permission;
pub use principal::PrincipalId;
pub use roles::Role;
