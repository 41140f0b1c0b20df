// CLI modules
mod args;
mod op;
mod ops;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use args::{Args, Parser};
use canopy::config::AppConfig;
use canopy::version::build_info;
use clap::Subcommand;
use op::Op;
use ops::{Available, Version};

command_enum! {
    (Available, Available),
    (Version, Version),
}

/// Logs go to stderr so stdout only ever carries command output.
///  The returned guard flushes pending lines when dropped.
fn init_logging(config: &AppConfig) -> WorkerGuard {
    let (stderr_writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let env_filter = EnvFilter::builder()
        .with_default_directive(config.level().into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stderr_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();

    let build = build_info();
    tracing::debug!(
        build_profile = build.build_profile,
        version = build.repo_version,
        "canopy starting up"
    );

    guard
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let guard = init_logging(&config);
    let ctx = op::OpContext::new(config);

    let code = match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {}", e);
            1
        }
    };

    drop(guard);
    std::process::exit(code);
}
