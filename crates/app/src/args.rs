pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "canopy")]
#[command(about = "Inspect what an identity can see in an access control snapshot")]
pub struct Args {
    /// Path to a TOML config file (defaults apply when absent)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
