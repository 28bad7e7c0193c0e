//! Directory filters for the tree walk.
//!
//! Both checks are applied to every directory independently. A rejected
//! directory is not pruned; its children are still visited and judged on
//! their own paths.

use std::io;
use std::path::Path;

use tracing::debug;

/// File-name suffix marking a Go test source file.
pub const TEST_FILE_SUFFIX: &str = "_test.go";

/// Directory name reserved for vendored dependencies.
pub const VENDOR_DIR: &str = "vendor";

/// Check whether a slash-delimited relative path is worth analyzing.
///
/// Returns `false` if any segment is hidden (starts with `.`) or is the
/// vendor directory. Note the walk root is spelled `"."` and is therefore
/// rejected too.
#[must_use]
pub fn is_valid_path(path: &str) -> bool {
    !path
        .split('/')
        .any(|segment| segment.starts_with('.') || segment == VENDOR_DIR)
}

/// Check whether a directory directly contains Go test files.
///
/// Only direct entries are inspected. Any entry kind counts, so a
/// subdirectory named `x_test.go` also qualifies.
///
/// # Errors
///
/// Returns the underlying I/O error if the directory cannot be listed.
/// Callers treat that as "not testable" rather than aborting.
pub fn is_testable_dir(dir: &Path) -> io::Result<bool> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry
            .file_name()
            .to_string_lossy()
            .ends_with(TEST_FILE_SUFFIX)
        {
            debug!(dir = %dir.display(), file = ?entry.file_name(), "found test file");
            return Ok(true);
        }
    }
    Ok(false)
}
