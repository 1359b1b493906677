/// Command module for the `runscan` CLI.
///
/// Each submodule implements one subcommand. The `run` function in each
/// module takes the parsed arguments and returns `Ok(())` on success or
/// a [`crate::error::CliError`] on failure.
use std::path::Path;

use runscan_core::{ExtractConfig, Extractor, MemoryRegistry};

use crate::cli::ExtractArgs;
use crate::error::CliError;

pub mod check_digit;
pub mod extract;
pub mod screen;
pub mod stats;
pub mod unban;
pub mod validate;
pub mod visits;

/// Builds the [`Extractor`] described by `--config` and `--context-radius`.
///
/// Without either flag the default extractor is returned.
///
/// # Errors
///
/// Returns [`CliError`] with exit code 2 if the config file cannot be read,
/// is not a valid settings document, or holds a pattern that fails to
/// compile.
pub fn build_extractor(args: &ExtractArgs, max_size: u64) -> Result<Extractor, CliError> {
    if args.config.is_none() && args.context_radius.is_none() {
        return Ok(Extractor::default());
    }

    let (mut config, source) = match &args.config {
        Some(path) => {
            let source = path.display().to_string();
            let content = crate::io::read_file(path, max_size)?;
            let config =
                ExtractConfig::from_json(&content).map_err(|e| CliError::ConfigInvalid {
                    source: source.clone(),
                    detail: e.to_string(),
                })?;
            (config, source)
        }
        None => (ExtractConfig::default(), "--context-radius".to_owned()),
    };

    if let Some(radius) = args.context_radius {
        config.context_radius = radius;
    }
    tracing::debug!(
        context_radius = config.context_radius,
        document_label = %config.document_label,
        run_label = %config.run_label,
        "extraction settings"
    );

    Extractor::new(&config).map_err(|e| CliError::ConfigInvalid {
        source,
        detail: e.to_string(),
    })
}

/// Loads a [`MemoryRegistry`] from `path`.
///
/// # Errors
///
/// Returns [`CliError`] with exit code 2 if the file cannot be read or is not
/// a valid registry.
pub fn load_registry(path: &Path, max_size: u64) -> Result<MemoryRegistry, CliError> {
    let content = crate::io::read_file(path, max_size)?;
    let registry = MemoryRegistry::from_json(&content).map_err(|e| CliError::RegistryInvalid {
        source: path.display().to_string(),
        detail: e.to_string(),
    })?;
    tracing::debug!(
        clients = registry.clients.len(),
        guests = registry.guests.len(),
        visits = registry.visits.len(),
        "registry loaded"
    );
    Ok(registry)
}

/// Writes `registry` back to `path`.
///
/// # Errors
///
/// Returns [`CliError::IoError`] (exit code 2) if the file cannot be written.
pub fn save_registry(path: &Path, registry: &MemoryRegistry) -> Result<(), CliError> {
    let source = path.display().to_string();
    let mut json = registry.to_json().map_err(|e| CliError::IoError {
        source: source.clone(),
        detail: e.to_string(),
    })?;
    json.push('\n');
    std::fs::write(path, json).map_err(|e| CliError::IoError {
        source,
        detail: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), "registry saved");
    Ok(())
}

/// Maps a stdout write failure to [`CliError::IoError`].
pub fn stdout_error(e: &std::io::Error) -> CliError {
    CliError::IoError {
        source: "stdout".to_owned(),
        detail: e.to_string(),
    }
}
