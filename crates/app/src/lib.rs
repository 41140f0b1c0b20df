/**
 * Operator configuration: log level and
 *  resolver knobs, read from TOML.
 */
pub mod config;
/**
 * JSON snapshots of trees, access control
 *  entries and role memberships, and the
 *  in-memory service built over them.
 */
pub mod snapshot;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::config::{AppConfig, ConfigError};
    pub use crate::snapshot::{AclEntry, Snapshot, SnapshotError};
    pub use crate::version::{build_info, BuildInfo};
}
