//! Reading and writing `data.js`, the file the benchmark dashboard loads.
//!
//! The file is a single JavaScript assignment, `window.BENCHMARK_DATA = {...}`,
//! whose right-hand side is JSON pretty-printed with two-space indentation.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Utc;
use tracing::{debug, info};

use crate::{models::BenchmarkData, Error, Result};

pub const ASSIGNMENT: &str = "window.BENCHMARK_DATA = ";

/// Decode a data file. Bare JSON without the assignment is accepted too.
pub fn parse(text: &str) -> Result<BenchmarkData> {
    let text = text.trim();
    let payload = match text.strip_prefix("window.BENCHMARK_DATA") {
        Some(rest) => rest
            .trim_start()
            .strip_prefix('=')
            .ok_or(Error::MissingPayload)?,
        None => text,
    };
    let payload = payload.trim().trim_end_matches(';').trim_end();
    if payload.is_empty() {
        return Err(Error::MissingPayload);
    }
    Ok(serde_json::from_str(payload)?)
}

pub fn render(data: &BenchmarkData) -> Result<String> {
    let json = serde_json::to_string_pretty(data)?;
    Ok(format!("{ASSIGNMENT}{json}"))
}

pub fn load(path: impl AsRef<Path>) -> Result<BenchmarkData> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let data = parse(&text)?;
    debug!(
        path = %path.display(),
        suites = data.entries.len(),
        entries = data.entry_count(),
        "loaded benchmark data"
    );
    Ok(data)
}

/// Like [`load`], but a missing file yields an empty data set for `repo_url`.
pub fn load_or_new(path: impl AsRef<Path>, repo_url: &str) -> Result<BenchmarkData> {
    let path = path.as_ref();
    if path.exists() {
        load(path)
    } else {
        info!(path = %path.display(), "no data file yet, starting a new history");
        Ok(BenchmarkData::new(repo_url, Utc::now()))
    }
}

/// Write through a sibling temporary file so readers never see a partial file.
pub fn save(path: impl AsRef<Path>, data: &BenchmarkData) -> Result<()> {
    let path = path.as_ref();
    let text = render(data)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let tmp = temporary_path(path);
    fs::write(&tmp, text).map_err(|e| Error::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| Error::io(path, e))?;

    info!(path = %path.display(), entries = data.entry_count(), "saved benchmark data");
    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "data.js".into());
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}
