//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create an executable shell script in the test project
    #[cfg(unix)]
    pub fn create_script(&self, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        self.create_file(name, &format!("#!/bin/sh\n{body}\n"));
        let path = self.dir.path().join(name);
        let mut perms = std::fs::metadata(&path)
            .expect("Failed to stat script")
            .permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).expect("Failed to make script executable");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Run the build driver in this project with `args`
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_armadillo-build"))
            .current_dir(self.path())
            .env_remove("ARMADILLO_BUILD_CONFIG")
            .env_remove("RUST_LOG")
            .args(args)
            .output()
            .expect("Failed to execute armadillo-build")
    }

    /// Lay out a front-end with two units and two static resources
    pub fn with_frontend(self) -> Self {
        self.create_file("web_frontend/util.js", "var util = {};\n");
        self.create_file("web_frontend/main.js", "util.start();");
        self.create_file("web_frontend/index.html", "<html></html>\n");
        self.create_file("web_frontend/screen.css", "body { margin: 0; }\n");
        self
    }

    /// Lay out a back-end with two units and a fake compiler that
    /// concatenates its inputs into the `-o` file
    #[cfg(unix)]
    pub fn with_backend(self) -> Self {
        self.create_file("src/paths.go", "package main // paths\n");
        self.create_file("src/main.go", "package main // main\n");
        self.create_script("tools/cc.sh", CONCAT_TOOL);
        self
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Shell body of a tool invoked as `tool -o OUT IN...`
pub const CONCAT_TOOL: &str = r#"out="$2"
shift 2
cat "$@" > "$out""#;

/// Shell body of a tool that always fails
pub const FAILING_TOOL: &str = r#"echo "paths.go:3: syntax error near unexpected token" >&2
exit 3"#;

/// Front-end only manifest without dependency or version stamping
pub const FRONTEND_MANIFEST: &str = r#"
[frontend]
sources = ["util.js", "main.js"]
resources = ["index.html", "screen.css"]
"#;

/// Back-end manifest using the fake compiler in `tools/cc.sh`
pub const BACKEND_MANIFEST: &str = r#"
[project]
product = "armadillo"

[backend]
sources = ["paths.go", "main.go"]
object_extension = "o"
compile = ["tools/cc.sh", "-o", "{object}", "{source}"]
link = ["tools/cc.sh", "-o", "{output}", "{each_object}"]

[frontend]
sources = ["util.js", "main.js"]
resources = ["index.html", "screen.css"]
"#;

/// Version template in the shape the stamp stage rewrites
pub const VERSION_TEMPLATE: &str = "goog.provide('armadillo.Version');\n\
armadillo.Version.BUILD = 7;\n\
armadillo.Version.STAMP = 1280000000;\n";
