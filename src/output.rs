//! Output naming and JSON rendering for fetched records.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

/// Where one record is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OutputTarget {
    Stdout,
    File(PathBuf),
}

/// Resolves an output pattern for `id`: `-` is stdout, `{id}` is substituted.
pub(crate) fn resolve_target(pattern: &str, id: &str) -> OutputTarget {
    if pattern == "-" {
        OutputTarget::Stdout
    } else {
        OutputTarget::File(PathBuf::from(pattern.replace("{id}", id)))
    }
}

/// Serializes a record, compact or indented with four spaces.
pub(crate) fn render<T: Serialize>(value: &T, pretty: bool) -> Result<Vec<u8>> {
    if !pretty {
        return serde_json::to_vec(value).context("failed to serialize record");
    }
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value
        .serialize(&mut serializer)
        .context("failed to serialize record")?;
    Ok(buf)
}

/// Writes records to files or stdout following one output pattern.
#[derive(Debug, Clone)]
pub(crate) struct OutputWriter {
    pattern: String,
    pretty: bool,
}

impl OutputWriter {
    pub(crate) fn new(pattern: impl Into<String>, pretty: bool) -> Self {
        Self {
            pattern: pattern.into(),
            pretty,
        }
    }

    pub(crate) fn write<T: Serialize>(&self, id: &str, value: &T) -> Result<()> {
        let bytes = render(value, self.pretty)?;
        match resolve_target(&self.pattern, id) {
            OutputTarget::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(&bytes)
                    .and_then(|()| stdout.write_all(b"\n"))
                    .and_then(|()| stdout.flush())
                    .context("failed to write to stdout")?;
            }
            OutputTarget::File(path) => {
                std::fs::write(&path, &bytes)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                info!(id, path = %path.display(), "Wrote record");
            }
        }
        Ok(())
    }
}
