//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_descriptor(descriptors::TWO_SUBMODULES);
//!     fixture.command().arg("status").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::descriptors;
    #[allow(unused_imports)]
    pub use super::git;
    pub use super::TestFixture;
}

/// Descriptor file snippets for testing.
#[allow(dead_code)]
pub mod descriptors {
    /// Two enabled submodules and a disabled one, with a comment.
    pub const THREE_SUBMODULES: &str = "\
# Nested repositories
[submodule \"lib/x\"]
   source = https://example.com/x.git
   commit = 1111111111111111111111111111111111111111
[submodule \"lib/y\"]
   source = https://example.com/y.git
   commit = 2222222222222222222222222222222222222222
   target = branch main
[submodule \"vendor/z\"]
   source = https://example.com/z.git
   commit = 3333333333333333333333333333333333333333
   enable = False
";

    /// A stanza whose target cannot be parsed.
    pub const INVALID_TARGET: &str = "\
[submodule \"lib/x\"]
   commit = abc
   target = revision 12
";
}

/// Run `git` in a directory, panicking on failure. For fixtures only.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A test fixture that provides a temporary repository root with an
/// optional `.gitsubmodules` descriptor.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new()
///     .with_descriptor(descriptors::THREE_SUBMODULES)
///     .with_file("lib/x/README", "hello");
///
/// fixture.command().args(["disable", "lib/x"]).assert().success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a `.gitsubmodules` descriptor with the given content.
    pub fn with_descriptor(self, content: &str) -> Self {
        self.with_file(".gitsubmodules", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.temp_dir.path().join(".gitsubmodules")
    }

    /// Current descriptor text.
    #[allow(dead_code)]
    pub fn descriptor(&self) -> String {
        std::fs::read_to_string(self.descriptor_path()).expect("Failed to read descriptor")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command whose repository root is this fixture.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("git-submodules");
        cmd.current_dir(self.path())
            .env("GIT_SUBMODULES_ROOT", self.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_temp_dir() {
        let fixture = TestFixture::new();
        assert!(fixture.path().exists());
    }

    #[test]
    fn test_fixture_with_descriptor() {
        let fixture = TestFixture::new().with_descriptor(descriptors::THREE_SUBMODULES);
        assert!(fixture.descriptor_path().exists());
        assert_eq!(fixture.descriptor(), descriptors::THREE_SUBMODULES);
    }

    #[test]
    fn test_fixture_with_file() {
        let fixture = TestFixture::new().with_file("lib/x/README", "hello");
        assert!(fixture.path().join("lib/x/README").exists());
    }
}
