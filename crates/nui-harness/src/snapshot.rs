#![forbid(unsafe_code)]

//! JSON tree snapshots.
//!
//! Rendered trees are serialized with [`rendered_to_json`] and stored as
//! pretty JSON in `tests/snapshots/<name>.json` under the crate being tested.
//! Stored and fresh trees are compared as JSON values, so formatting changes
//! in a hand-edited file do not count as a mismatch.
//!
//! Run tests with `BLESS=1` to create or update snapshot files:
//!
//! ```sh
//! BLESS=1 cargo test
//! ```

use std::io;
use std::path::{Path, PathBuf};

use nui_core::Rendered;
use pretty_assertions::StrComparison;
use serde_json::Value;

use crate::element::{Element, rendered_to_json};

/// Why a tree did not match its stored snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// No file exists for the snapshot.
    #[error("no snapshot at {}; run with BLESS=1 to create it\n\nActual tree:\n{actual}", .path.display())]
    Missing {
        /// Expected location.
        path: PathBuf,
        /// Pretty JSON of the fresh tree.
        actual: String,
    },
    /// The stored tree differs from the fresh one.
    #[error("snapshot {} differs; set BLESS=1 to update\n\n{diff}", .path.display())]
    Mismatch {
        /// Snapshot file.
        path: PathBuf,
        /// Rendered comparison of stored (left) and fresh (right) JSON.
        diff: String,
    },
    /// The stored file is not valid JSON.
    #[error("snapshot {} is not valid JSON: {source}", .path.display())]
    Corrupt {
        /// Snapshot file.
        path: PathBuf,
        /// Parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// Reading or writing the file failed.
    #[error("snapshot {}: {source}", .path.display())]
    Io {
        /// Snapshot file.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: io::Error,
    },
}

/// Pretty JSON text of a tree value, as stored in snapshot files.
fn pretty(value: &Value) -> String {
    let mut text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    text.push('\n');
    text
}

/// Pretty JSON text of a rendered tree, as stored in snapshot files.
pub fn snapshot_text(rendered: &Rendered<Element>) -> String {
    pretty(&rendered_to_json(rendered))
}

/// Location of snapshot `name` under `base_dir`.
pub fn snapshot_path(base_dir: &Path, name: &str) -> PathBuf {
    base_dir
        .join("tests")
        .join("snapshots")
        .join(format!("{name}.json"))
}

fn is_bless() -> bool {
    std::env::var("BLESS").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Write `rendered` as snapshot `name`, creating directories as needed.
pub fn bless_tree_snapshot(
    name: &str,
    rendered: &Rendered<Element>,
    base_dir: &Path,
) -> Result<PathBuf, SnapshotError> {
    let path = snapshot_path(base_dir, name);
    let io_err = |source| SnapshotError::Io {
        path: path.clone(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(&path, snapshot_text(rendered)).map_err(io_err)?;
    Ok(path)
}

/// Compare `rendered` with snapshot `name` without touching the file.
pub fn check_tree_snapshot(
    name: &str,
    rendered: &Rendered<Element>,
    base_dir: &Path,
) -> Result<(), SnapshotError> {
    let path = snapshot_path(base_dir, name);
    let actual = rendered_to_json(rendered);

    let stored = match std::fs::read_to_string(&path) {
        Ok(stored) => stored,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(SnapshotError::Missing {
                path,
                actual: pretty(&actual),
            });
        }
        Err(source) => return Err(SnapshotError::Io { path, source }),
    };
    let expected: Value = match serde_json::from_str(&stored) {
        Ok(value) => value,
        Err(source) => return Err(SnapshotError::Corrupt { path, source }),
    };

    if expected == actual {
        return Ok(());
    }
    let (left, right) = (pretty(&expected), pretty(&actual));
    Err(SnapshotError::Mismatch {
        diff: StrComparison::new(&left, &right).to_string(),
        path,
    })
}

/// Assert that a rendered tree matches a stored snapshot, or store it when
/// `BLESS` is set.
///
/// # Panics
///
/// When the snapshot is missing, differs or cannot be read, unless blessing.
pub fn assert_tree_snapshot(name: &str, rendered: &Rendered<Element>, base_dir: &str) {
    let base_dir = Path::new(base_dir);
    let result = if is_bless() {
        bless_tree_snapshot(name, rendered, base_dir).map(drop)
    } else {
        check_tree_snapshot(name, rendered, base_dir)
    };
    if let Err(err) = result {
        panic!("\n=== Snapshot '{name}' ===\n{err}");
    }
}

/// Assert that a rendered tree matches a stored JSON snapshot.
///
/// Uses `CARGO_MANIFEST_DIR` to locate the snapshot directory automatically.
///
/// ```ignore
/// assert_tree_snapshot!("counter_initial", &tree);
/// ```
#[macro_export]
macro_rules! assert_tree_snapshot {
    ($name:expr, $rendered:expr) => {
        $crate::snapshot::assert_tree_snapshot($name, $rendered, env!("CARGO_MANIFEST_DIR"))
    };
}
