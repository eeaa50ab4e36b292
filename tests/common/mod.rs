//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::path::PathBuf;
use tempfile::TempDir;

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times; subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// A short annotated manuscript exercising every annotation form.
#[allow(dead_code)]
pub const MANUSCRIPT: &str = r#"@@.(# The Gift)

@@(1905-12-24 12:00).Event
One dollar and eighty-seven cents. That was all. @@Della.Color(#c04000) counted it three times.
@@(Young family).Type(Family)
@@@(Jim_Young).ChildOf(@@Young_family).Alias(Jim) came home late; Della smiled at Jim.

## A Christmas Eve

@@@@(comb).Object.PartOf(Della) lay in the window of @@@(Madame_Sofronie).Place.
@@Della.DIALOG[Will you buy my hair?] asked Della.
@@Jim_Young.DIALOG(Della, where is your hair?).Mood(stunned)

@@(1905-12-25).Event
"#;

/// Write `content` as `musetag.toml` inside `temp_dir` and return its path.
#[allow(dead_code)]
pub fn write_config(temp_dir: &TempDir, content: &str) -> PathBuf {
    let path = temp_dir.path().join("musetag.toml");
    std::fs::write(&path, content).unwrap();
    path
}
