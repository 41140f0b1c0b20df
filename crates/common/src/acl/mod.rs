//! Permission resolution over hierarchies
//!
//! - **[`PermissionLookup`]**: the external store of own access control entries
//! - **[`PermissionResolver`]**: computes effective masks and prunes a tree for one identity
//! - **[`flatten`]**: turns a resolved tree into per-class lists of visible objects

mod flatten;
mod lookup;
mod resolver;

pub use flatten::{flatten, AvailableEntities};
pub use lookup::{AclSnapshot, PermissionLookup};
pub use resolver::{PermissionResolver, Visibility};
