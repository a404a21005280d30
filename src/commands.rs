use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tracing::{debug, info};

use crate::cli::{InspectArgs, ScanArgs};
use crate::config::{AppConfig, OutputFormat};
use crate::errors::AppError;
use crate::extractor::assemble_class;
use crate::report::render_summary;
use crate::scanner::{ProjectScanner, ScanOutcome};

/// Handles `classmap scan`.
pub async fn handle_scan(args: ScanArgs, cancel: Arc<AtomicBool>) -> Result<(), AppError> {
    let config = AppConfig::load(args.config.as_deref())?;
    let format = args.format.unwrap_or(config.output.format);
    let pretty = args.pretty || config.output.pretty;
    debug!("Output format {:?}, pretty: {}", format, pretty);

    let scanner = ProjectScanner::new(config.scan);
    let outcome = scanner.scan(&args.root, cancel).await?;
    let rendered = render_output(&outcome, format, pretty)?;

    match &args.output {
        Some(path) => {
            write_output(path, &rendered).await?;
            info!("Wrote project structure to {:?}", path);
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Handles `classmap inspect`.
pub async fn handle_inspect(args: InspectArgs) -> Result<(), AppError> {
    let text = tokio::fs::read_to_string(&args.file)
        .await
        .map_err(|e| AppError::IO(format!("reading {}", args.file.display()), e))?;
    let path = args.file.to_string_lossy();
    match inspect_source(&path, &text, args.pretty)? {
        Some(json) => println!("{}", json),
        None => println!("No class declaration found in {}", path),
    }
    Ok(())
}

/// Renders a scan outcome in the requested format.
pub fn render_output(
    outcome: &ScanOutcome,
    format: OutputFormat,
    pretty: bool,
) -> Result<String, AppError> {
    match format {
        OutputFormat::Json => Ok(outcome.structure.to_json(pretty)?),
        OutputFormat::Summary => Ok(render_summary(outcome)),
    }
}

/// Class record JSON for a single file, or `None` when it declares no class.
pub fn inspect_source(path: &str, text: &str, pretty: bool) -> Result<Option<String>, AppError> {
    let Some(class) = assemble_class(path, text) else {
        return Ok(None);
    };
    let json = if pretty {
        serde_json::to_string_pretty(&class)?
    } else {
        serde_json::to_string(&class)?
    };
    Ok(Some(json))
}

async fn write_output(path: &Path, rendered: &str) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::IO(format!("creating {}", parent.display()), e))?;
    }
    tokio::fs::write(path, rendered)
        .await
        .map_err(|e| AppError::IO(format!("writing {}", path.display()), e))
}
