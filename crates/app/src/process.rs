use anyhow::{Context, Result};
use qbofix_engine::{repair_statement, NoiseFilter};
use qbofix_ingest::convert_csv;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;

/// Repair every statement file waiting in the download directory. Failures
/// are logged and skipped so one bad download does not strand the rest.
/// Returns the number of files repaired.
pub fn sweep(config: &Config, filter: &NoiseFilter) -> Result<usize> {
    let entries = fs::read_dir(&config.download_dir)
        .with_context(|| format!("read directory {}", config.download_dir.display()))?;

    let mut repaired = 0;
    for entry in entries {
        let path = entry
            .with_context(|| format!("read directory {}", config.download_dir.display()))?
            .path();
        if !is_statement(&path, &config.statement_ext) {
            continue;
        }
        match repair_file(&path, config, filter) {
            Ok(output) => {
                info!("repaired {} -> {}", path.display(), output.display());
                repaired += 1;
            }
            Err(e) => warn!("skipping {}: {e:#}", path.display()),
        }
    }
    if repaired == 0 {
        info!(
            "no statement files found in {}",
            config.download_dir.display()
        );
    }
    Ok(repaired)
}

/// Repair one statement file and write the result into the output
/// directory, named `{file_date}_{account_number}{ext}` from the header
/// fields. The original is removed only after the output is written.
pub fn repair_file(path: &Path, config: &Config, filter: &NoiseFilter) -> Result<PathBuf> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read statement {}", path.display()))?;

    let repaired = repair_statement(contents.lines(), filter)
        .with_context(|| format!("repair statement {}", path.display()))?;

    let output = config
        .output_dir
        .join(repaired.header.output_filename(&config.statement_ext));
    write_lines(&output, &repaired.lines)?;

    if config.remove_originals {
        fs::remove_file(path).with_context(|| format!("remove original {}", path.display()))?;
    }
    Ok(output)
}

/// Convert a CSV export into a QBO statement in the output directory.
pub fn convert_file(path: &Path, config: &Config, filter: &NoiseFilter) -> Result<PathBuf> {
    let file =
        fs::File::open(path).with_context(|| format!("read export {}", path.display()))?;

    let converted = convert_csv(file, filter, &config.bank)
        .with_context(|| format!("convert export {}", path.display()))?;

    let output = config
        .output_dir
        .join(converted.header.output_filename(&config.statement_ext));
    write_lines(&output, &converted.lines)?;
    Ok(output)
}

pub fn is_statement(path: &Path, ext: &str) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(ext))
}

fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let mut contents = lines.join("\n");
    contents.push('\n');
    fs::write(path, contents).with_context(|| format!("write statement {}", path.display()))
}
