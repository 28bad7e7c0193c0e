// Common test infrastructure for memscan tests
#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// File in a package directory holding the canned `pprof -list` output.
pub const LISTING_FILE: &str = "PPROF_LISTING";

/// Marker file making the package's tests fail.
pub const FAIL_FILE: &str = "FAIL_TESTS";

/// A throwaway Go-like source tree.
pub struct GoTree {
    dir: TempDir,
}

impl GoTree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Directory with a test file whose profile listing reports `total`.
    pub fn package(&self, rel: &str, total: &str) -> &Self {
        let dir = self.dir_at(rel);
        fs::write(dir.join(format!("{}_test.go", leaf(rel))), "package x\n").unwrap();
        fs::write(
            dir.join(LISTING_FILE),
            format!("Total: {total}\nROUTINE ======================== x.Alloc\n"),
        )
        .unwrap();
        self
    }

    /// Directory with a test file whose listing has no Total line.
    pub fn package_without_total(&self, rel: &str) -> &Self {
        let dir = self.dir_at(rel);
        fs::write(dir.join(format!("{}_test.go", leaf(rel))), "package x\n").unwrap();
        fs::write(dir.join(LISTING_FILE), "no matches found\n").unwrap();
        self
    }

    /// Directory with a test file whose tests fail.
    pub fn failing_package(&self, rel: &str) -> &Self {
        let dir = self.dir_at(rel);
        fs::write(dir.join(format!("{}_test.go", leaf(rel))), "package x\n").unwrap();
        fs::write(dir.join(FAIL_FILE), "").unwrap();
        self
    }

    /// Directory with Go sources but no tests.
    pub fn plain_dir(&self, rel: &str) -> &Self {
        let dir = self.dir_at(rel);
        fs::write(dir.join("main.go"), "package main\n").unwrap();
        self
    }

    fn dir_at(&self, rel: &str) -> PathBuf {
        let dir = self.dir.path().join(rel);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// Install a fake `go` script outside the tree and return its path.
    ///
    /// `go test` fails when the package has a [`FAIL_FILE`], otherwise writes
    /// `profile-of-<pkg>` to the profile path. `go tool pprof -list` prints
    /// the package's [`LISTING_FILE`]. Every invocation is appended to
    /// `calls.log` next to the script.
    #[cfg(unix)]
    pub fn fake_go(&self, bin_dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let log = bin_dir.join("calls.log");
        let script = format!(
            r#"#!/bin/sh
echo "$*" >> "{log}"
case "$1" in
  test)
    profile="$5"
    pkg="${{6#./}}"
    if [ -f "$pkg/{fail}" ]; then
      echo "--- FAIL: TestAlloc"
      printf 'FAIL\texample.com/%s\n' "$pkg" >&2
      exit 1
    fi
    printf 'profile-of-%s' "$pkg" > "$profile"
    printf 'ok  \texample.com/%s\t0.01s\n' "$pkg"
    ;;
  tool)
    pkg="${{4%.test}}"
    cat "$pkg/{listing}" 2>/dev/null
    ;;
  *)
    exit 2
    ;;
esac
"#,
            log = log.display(),
            fail = FAIL_FILE,
            listing = LISTING_FILE,
        );

        let path = bin_dir.join("go");
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}

fn leaf(rel: &str) -> &str {
    rel.rsplit('/').next().unwrap_or(rel)
}

/// Lines of the fake go call log, empty if go never ran.
pub fn read_calls(bin_dir: &Path) -> Vec<String> {
    fs::read_to_string(bin_dir.join("calls.log"))
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
