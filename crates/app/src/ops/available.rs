use std::path::PathBuf;

use clap::Args;

use canopy::snapshot::{Snapshot, SnapshotError};
use common::error::AccessError;
use common::security::AclClass;

#[derive(Args, Debug, Clone)]
pub struct Available {
    /// JSON snapshot to resolve against
    #[arg(long)]
    pub snapshot: PathBuf,

    /// Principal to resolve for
    #[arg(long)]
    pub user: String,

    /// Extra role held by the user, on top of those recorded in the snapshot
    #[arg(long = "role")]
    pub roles: Vec<String>,

    /// Only report objects of this class (e.g. TOOL, configuration)
    #[arg(long)]
    pub class: Option<AclClass>,
}

#[derive(Debug, thiserror::Error)]
pub enum AvailableError {
    #[error("failed to load snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("failed to render result: {0}")]
    Render(#[from] serde_json::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for Available {
    type Error = AvailableError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let snapshot = Snapshot::load(&self.snapshot)?;
        tracing::debug!(
            path = %self.snapshot.display(),
            folders = snapshot.folders.len(),
            registries = snapshot.registries.len(),
            entries = snapshot.acl.len(),
            "loaded snapshot"
        );

        let sids = snapshot.sids_for(&self.user, &self.roles);
        let available = snapshot
            .service(ctx.config.resolver.clone())
            .load_available(&sids, self.class)
            .await?;

        Ok(serde_json::to_string_pretty(&available)?)
    }
}
