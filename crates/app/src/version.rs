use std::fmt;

use serde::Serialize;

/// Build metadata captured by the build script
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub repo_version: &'static str,
    pub build_profile: &'static str,
    pub build_timestamp: &'static str,
    pub rust_version: &'static str,
    pub target: Option<&'static str>,
    pub host: Option<&'static str>,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        repo_version: env!("REPO_VERSION"),
        build_profile: env!("BUILD_PROFILE"),
        build_timestamp: env!("BUILD_TIMESTAMP"),
        rust_version: env!("RUST_VERSION"),
        target: option_env!("BUILD_TARGET"),
        host: option_env!("BUILD_HOST"),
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "canopy {} ({})", self.version, self.repo_version)?;
        writeln!(f, "profile: {}", self.build_profile)?;
        writeln!(f, "built:   {}", self.build_timestamp)?;
        write!(f, "rustc:   {}", self.rust_version)?;
        if let Some(target) = self.target {
            write!(f, "\ntarget:  {}", target)?;
        }
        Ok(())
    }
}
