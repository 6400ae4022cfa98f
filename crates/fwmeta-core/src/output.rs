//! Output plumbing shared by every command.
//!
//! JSON is always emitted with sorted keys and two-space indentation. Values
//! are routed through `serde_json::Value`, whose object map is a `BTreeMap`
//! as long as the `preserve_order` feature of `serde_json` stays off, so key
//! order does not depend on struct field order or `#[serde(flatten)]`.

use std::fmt::Write as _;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use fwmeta_schema::BuildInfo;
use serde::Serialize;

use crate::error::Result;

/// Where a command writes its output: standard output (`-`) or a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    /// Standard output.
    Stdout,
    /// A file, replaced atomically.
    File(PathBuf),
}

impl FromStr for Sink {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(if s == "-" {
            Self::Stdout
        } else {
            Self::File(PathBuf::from(s))
        })
    }
}

impl Sink {
    /// Write `content` to this sink.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if stdout is closed or the file cannot be written.
    pub fn write(&self, content: &str) -> Result<()> {
        match self {
            Self::Stdout => {
                let mut out = std::io::stdout().lock();
                out.write_all(content.as_bytes())?;
                out.flush()?;
            }
            Self::File(path) => write_atomic(path, content.as_bytes())?,
        }
        Ok(())
    }
}

/// Serialize `value` as key-sorted, 2-space-indented JSON with a trailing newline.
///
/// # Errors
///
/// Returns an error if `value` cannot be represented as JSON.
pub fn to_sorted_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value)?;
    let mut json = serde_json::to_string_pretty(&value)?;
    json.push('\n');
    Ok(json)
}

/// Render the C source fragment declaring the build info constants.
///
/// Absent fields become empty strings.
pub fn render_c_fragment(bi: &BuildInfo) -> String {
    let mut out = String::from("/* Auto-generated, do not edit. */\n");
    for (name, value) in [
        ("build_id", &bi.build_id),
        ("build_timestamp", &bi.build_timestamp),
        ("build_version", &bi.build_version),
    ] {
        let value = c_escape(value.as_deref().unwrap_or_default());
        let _ = writeln!(out, "const char *{name} = \"{value}\";");
    }
    out
}

fn c_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Emit build info to the requested sinks: JSON first, then the C fragment.
///
/// # Errors
///
/// Returns an error if serialization or writing to either sink fails.
pub fn write_build_info(
    bi: &BuildInfo,
    json_output: Option<&Sink>,
    c_output: Option<&Sink>,
) -> Result<()> {
    if let Some(sink) = json_output {
        sink.write(&to_sorted_json(bi)?)?;
    }
    if let Some(sink) = c_output {
        sink.write(&render_c_fragment(bi))?;
    }
    Ok(())
}

/// Replace `path` with `content` so readers never see a partial file.
///
/// The content goes to a temporary file in the same directory, which is then
/// renamed over the target.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created, written or
/// renamed.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(parent_dir(path))?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Directory a new file at `path` would be created in.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}
