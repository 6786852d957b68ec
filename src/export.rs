use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::error::{HyperError, Result};
use crate::math::HyperValue;

pub const DEFAULT_EXPORT_FILE: &str = "MathOut.md";

/// Appends `* <value>` as one markdown bullet to `path`, creating the file
/// when it does not exist yet. Existing content is never truncated.
pub fn append_markdown(value: &impl Display, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let io_error = |source| HyperError::Io {
        path: path.to_path_buf(),
        source,
    };
    // the handle is dropped on every return path, including a failed write
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error)?;
    file.write_all(format!("* {value}\n").as_bytes())
        .and_then(|_| file.flush())
        .map_err(io_error)?;
    info!("This expression has been exported to {}", path.display());
    Ok(())
}

impl HyperValue {
    pub fn export_markdown(&self, path: impl AsRef<Path>) -> Result<()> {
        append_markdown(self, path)
    }
}

#[cfg(test)]
use crate::math::Term;

#[test]
fn append_test() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_EXPORT_FILE);
    let e = Term::new(num!(1), num!(1)) - HyperValue::Real(num!(5)) - Term::new(num!(1), num!(2));
    e.export_markdown(&path).unwrap();
    Term::new(num!(2), num!(-1)).export_markdown(&path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "* -5 + ε + -ε²\n* 2ω\n");
}

#[test]
fn append_keeps_existing_content_test() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.md");
    std::fs::write(&path, "# results\n").unwrap();
    append_markdown(&HyperValue::Real(num!(3, 4)), &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "# results\n* 3/4\n");
}

#[test]
fn unwritable_path_test() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("out.md");
    let err = append_markdown(&HyperValue::zero(), &path).unwrap_err();
    match err {
        HyperError::Io { path: failed, .. } => assert_eq!(failed, path),
        other => panic!("expected an io error, got {other}"),
    }
    assert!(!path.exists());
}
