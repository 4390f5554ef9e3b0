use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use release_runner::actions::{self, Level};
use release_runner::cli::Args;
use release_runner::download::GitHubClient;
use release_runner::exec::ProcessLauncher;
use release_runner::version::Manifest;
use release_runner::{RunPlan, RunnerConfig};

fn main() {
    init_logging();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("FATAL: Failed to create Tokio runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(real_main()) {
        if actions::is_actions() {
            actions::fail(format!("{e:#}"));
        }
        error!("{e:#}");
        std::process::exit(1);
    }
}

/// Plain `[ts level file:line]` lines locally, workflow commands inside Actions
fn init_logging() {
    let default_level = if actions::is_debug() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(default_level).parse_default_env();

    if actions::is_actions() {
        builder
            .target(env_logger::Target::Stdout)
            .format(|buf, record| match Level::from_log(record.level()) {
                Some(level) => writeln!(
                    buf,
                    "{}",
                    actions::Command::new(level, record.args())
                ),
                None => writeln!(buf, "{}", record.args()),
            });
    } else {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        });
    }
    builder.init();
}

async fn real_main() -> Result<()> {
    let args = Args::parse();
    let config = RunnerConfig::from_args(args, |key| std::env::var(key).ok())?;

    // read once at startup and handed to version resolution explicitly
    let manifest = Manifest::load(&config.manifest);

    let client = GitHubClient::new(config.repo.clone(), &config.api_url, config.token.clone())
        .context("Failed to set up GitHub client")?;

    let plan = RunPlan::from(&config);
    let summary = release_runner::run(&plan, manifest, &client, &ProcessLauncher).await?;
    info!("{} ({}) finished successfully", summary.asset, summary.tag);
    Ok(())
}
