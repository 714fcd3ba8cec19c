use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};

use pidcat_adb::AdbClient;
use pidcat_logs::{EntryFilter, LogcatPipeline, PidWatchdog, PlainTextSink, Tee, WatchedPids};
use pidcat_term::{EntryRenderer, TerminalOutput};

mod cli;
mod config;

use cli::Args;
use config::{PipelineConfig, Settings};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Diagnostics go to stderr; stdout carries the log stream
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("FATAL: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let settings = Settings::load(args.config.as_deref())?;

    let adb_path = args.adb_path.as_deref().or(settings.adb_path.as_deref());
    let client = AdbClient::new(adb_path, &args.connection()).await?;
    info!("Using adb at {}", client.adb_path().display());

    if let Some(third_party_only) = args.listing() {
        for package in client.list_packages(third_party_only).await? {
            println!("{}", package);
        }
        return Ok(());
    }

    let packages = resolve_packages(&args, &client).await?;
    let config = PipelineConfig::new(&args, &settings, packages)?;

    if args.clear {
        client.clear_log().await?;
    }

    let sink = config
        .log_file
        .as_ref()
        .map(|path| {
            PlainTextSink::open(path).with_context(|| format!("opening {}", path.display()))
        })
        .transpose()?;

    let pids = WatchedPids::new();
    let filter = EntryFilter::new(pids.clone())
        .with_min_level(config.min_level)
        .with_tags(config.tags.iter().cloned())
        .with_ignored_tags(config.ignore_tags.iter().cloned());

    let client = Arc::new(client);
    let watchdog = if config.packages.is_empty() {
        None
    } else {
        info!(packages = ?config.packages, "Watching packages");
        Some(PidWatchdog::new(
            Arc::clone(&client),
            config.packages.clone(),
            pids,
        ))
    };

    let pipeline = LogcatPipeline::new(client.logcat_command(), filter);

    let cancel = pipeline.cancel_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        cancel.cancel();
    });

    let output = Tee(
        TerminalOutput::stdout(
            EntryRenderer::new(config.tag_width).with_color(pidcat_term::color_enabled()),
        ),
        sink,
    );
    pipeline.run(watchdog, output).await?;

    Ok(())
}

/// Packages to watch: none for --all, plus the foreground app for --current
async fn resolve_packages(args: &Args, client: &AdbClient) -> Result<Vec<String>> {
    if args.all {
        return Ok(Vec::new());
    }

    let mut packages = args.packages.clone();
    if args.current {
        let foreground = client.current_app().await?;
        info!("Foreground app is {}", foreground);
        packages.push(foreground);
    }

    if packages.is_empty() {
        bail!("no package names supplied");
    }
    Ok(packages)
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
