use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use classmap::cli::{ClassmapArgs, ClassmapSubCommand};
use classmap::commands::{handle_inspect, handle_scan};
use classmap::errors::AppError;
use tracing::warn;

fn main() {
    let args = ClassmapArgs::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(args.log_level())
        .init();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run_app(args)) {
        tracing::error!("Application failed: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run_app(args: ClassmapArgs) -> Result<(), AppError> {
    let cancel = Arc::new(AtomicBool::new(false));
    let signal_flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling scan");
            signal_flag.store(true, Ordering::SeqCst);
        }
    });

    match args.command {
        ClassmapSubCommand::Scan(scan_args) => handle_scan(scan_args, cancel).await,
        ClassmapSubCommand::Inspect(inspect_args) => handle_inspect(inspect_args).await,
    }
}
