//! Golden-file JSON snapshots.
//!
//! Values are serialized as pretty JSON with object keys sorted, so snapshots
//! diff cleanly. Rerun with `FOLIO_UPDATE_SNAPSHOTS=1` to rewrite goldens.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable that enables snapshot updates.
pub const UPDATE_SNAPSHOTS_ENV: &str = "FOLIO_UPDATE_SNAPSHOTS";

/// Assert that `value` matches the JSON snapshot stored at `path`.
///
/// With updates enabled the file is written instead of compared.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    compare_snapshot(path.as_ref(), value, should_update_snapshots())
}

fn compare_snapshot<T: Serialize>(path: &Path, value: &T, update: bool) -> Result<()> {
    let actual = canonical_json(value)?;

    if update {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create snapshot directory {}", parent.display())
            })?;
        }
        fs::write(path, &actual)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        info!(path = %path.display(), "snapshot updated");
        return Ok(());
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "Snapshot missing at {} (run with {}=1 to create it)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        )
    })?;

    if let Some((line, (want, got))) = expected
        .lines()
        .zip(actual.lines())
        .enumerate()
        .find(|(_, (a, b))| a != b)
    {
        anyhow::bail!(
            "Snapshot mismatch at {} line {}: expected `{}`, got `{}` (run with {}=1 to update)",
            path.display(),
            line + 1,
            want.trim(),
            got.trim(),
            UPDATE_SNAPSHOTS_ENV
        );
    }
    if expected.lines().count() != actual.lines().count() {
        anyhow::bail!(
            "Snapshot length mismatch at {} (run with {}=1 to update)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        );
    }
    debug!(path = %path.display(), "snapshot matched");
    Ok(())
}

fn should_update_snapshots() -> bool {
    matches!(
        std::env::var(UPDATE_SNAPSHOTS_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

/// Pretty JSON with sorted object keys and a trailing newline.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("Failed to serialize snapshot value")?;
    let mut s = serde_json::to_string_pretty(&sort_keys(value))
        .context("Failed to format snapshot JSON")?;
    s.push('\n');
    Ok(s)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sort_keys(v))).collect())
        }
        Value::Array(values) => Value::Array(values.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
