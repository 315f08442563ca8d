//! Test utilities
//!
//! Fakes for the external-tool seam, a sample project on disk, and proptest
//! generators shared across module tests.

/// Scripted stand-ins for external tools
pub mod fake {
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use crate::core::pipeline::{PipelineObserver, Stage};
    use crate::error::ToolError;
    use crate::infra::process::{Invocation, ToolOutput, ToolRunner};

    type Handler = Box<dyn Fn(&Invocation) -> ToolOutput>;

    /// Runner that answers every invocation from a closure and records it
    pub struct ScriptedRunner {
        handler: Handler,
        calls: RefCell<Vec<Invocation>>,
        missing: Vec<String>,
    }

    impl ScriptedRunner {
        pub fn new(handler: impl Fn(&Invocation) -> ToolOutput + 'static) -> Self {
            Self {
                handler: Box::new(handler),
                calls: RefCell::new(Vec::new()),
                missing: Vec::new(),
            }
        }

        /// Make `locate` fail for `program`
        #[must_use]
        pub fn with_missing_tool(mut self, program: &str) -> Self {
            self.missing.push(program.to_string());
            self
        }

        /// Every invocation so far, in order
        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.borrow().clone()
        }

        /// Every invocation so far, rendered as a command line
        pub fn command_lines(&self) -> Vec<String> {
            self.calls.borrow().iter().map(ToString::to_string).collect()
        }
    }

    impl ToolRunner for ScriptedRunner {
        fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
            self.calls.borrow_mut().push(invocation.clone());
            Ok((self.handler)(invocation))
        }

        fn locate(&self, program: &str, base: &Path) -> Result<PathBuf, ToolError> {
            if self.missing.iter().any(|m| m == program) {
                return Err(ToolError::NotFound {
                    program: program.to_string(),
                    error: "cannot find binary path".to_string(),
                });
            }
            Ok(base.join(program))
        }
    }

    /// Successful exit with `stdout`
    pub fn ok(stdout: &str) -> ToolOutput {
        ToolOutput {
            status: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    /// Exit with `code` and `stderr`
    pub fn failed(code: i32, stderr: &str) -> ToolOutput {
        ToolOutput {
            status: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    /// Succeed after creating the file named by `-o` or `--output_file`.
    /// Relative names (the bundler's `-o compiled` mode flag) are ignored.
    pub fn touch_outputs(invocation: &Invocation) -> ToolOutput {
        let mut args = invocation.args.iter();
        while let Some(arg) = args.next() {
            if arg == "-o" || arg == "--output_file" {
                if let Some(path) = args.next() {
                    let path = Path::new(path);
                    if path.is_relative() {
                        continue;
                    }
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent).unwrap();
                    }
                    std::fs::write(path, format!("built by {}\n", invocation.program)).unwrap();
                }
            }
        }
        ok("")
    }

    /// Well-behaved tools for the sample project
    ///
    /// The dependency checkout reports the pinned revision, the build
    /// counter answers 100, and the working tree is clean.
    pub fn project_tools(invocation: &Invocation) -> ToolOutput {
        let first = invocation.args.first().map(String::as_str);
        match (invocation.program.as_str(), first) {
            ("svn", Some("info")) => ok("Path: closure\nURL: http://closure-library.googlecode.com/svn/trunk\nRevision: 235\nNode Kind: directory\n"),
            ("gitcrement", _) => ok("100\n"),
            ("git", Some("ls-files")) => ok(""),
            _ => touch_outputs(invocation),
        }
    }

    /// Observer that remembers every transition
    #[derive(Debug, Default)]
    pub struct RecordingObserver {
        pub started: Vec<Stage>,
        pub finished: Vec<Stage>,
        pub skipped: Vec<Stage>,
        pub failed: Vec<Stage>,
    }

    impl PipelineObserver for RecordingObserver {
        fn stage_started(&mut self, stage: Stage) {
            self.started.push(stage);
        }

        fn stage_finished(&mut self, stage: Stage, _elapsed: Duration) {
            self.finished.push(stage);
        }

        fn stage_skipped(&mut self, stage: Stage) {
            self.skipped.push(stage);
        }

        fn stage_failed(&mut self, stage: Stage) {
            self.failed.push(stage);
        }
    }
}

/// A complete project tree in a temporary directory
pub mod fixture {
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    use crate::config::urls;
    use crate::core::config::{BuildConfiguration, RunMode};
    use crate::core::manifest::BuildManifest;

    pub const VERSION_TEMPLATE: &str = "goog.provide('armadillo.Version');\n\
\n\
armadillo.Version.MAJOR = 0;\n\
armadillo.Version.MINOR = 1;\n\
armadillo.Version.BUILD = 12;\n\
armadillo.Version.STAMP = 1280000000;\n";

    /// Project laid out with the built-in defaults, dependency already
    /// checked out
    pub struct SampleProject {
        temp: TempDir,
    }

    impl SampleProject {
        pub fn new() -> Self {
            let project = Self {
                temp: TempDir::new().unwrap(),
            };
            let manifest = BuildManifest::default();

            for unit in &manifest.backend.sources {
                project.write(&format!("src/{unit}"), "package main\n");
            }
            for unit in &manifest.frontend.sources {
                if unit != "version.js" {
                    project.write(&format!("web_frontend/{unit}"), &format!("// {unit}\n"));
                }
            }
            project.write("web_frontend/version.js", VERSION_TEMPLATE);
            project.write("web_frontend/version.js.proto", VERSION_TEMPLATE);
            for resource in &manifest.frontend.resources {
                project.write(&format!("web_frontend/{resource}"), &format!("<{resource}>\n"));
            }
            for css in urls::CLOSURE_STYLESHEETS {
                project.write(&format!("{}/{css}", urls::CLOSURE_DEST), &format!(".{css} {{}}\n"));
            }
            project
        }

        pub fn root(&self) -> &Path {
            self.temp.path()
        }

        pub fn path(&self, rel: &str) -> PathBuf {
            self.temp.path().join(rel)
        }

        pub fn write(&self, rel: &str, content: &str) {
            let path = self.path(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }

        pub fn read(&self, rel: &str) -> String {
            std::fs::read_to_string(self.path(rel)).unwrap()
        }

        /// Default manifest under `mode`
        pub fn config(&self, mode: RunMode) -> BuildConfiguration {
            BuildConfiguration::new(self.root(), BuildManifest::default(), mode).unwrap()
        }
    }
}

/// Proptest generators
pub mod generators {
    use proptest::prelude::*;

    /// A source unit file name
    pub fn unit_name() -> impl Strategy<Value = String> {
        ("[a-z][a-z0-9_]{0,12}", prop_oneof!["go", "js", "css"])
            .prop_map(|(stem, ext)| format!("{stem}.{ext}"))
    }

    /// An ordered list of distinct unit names
    pub fn unit_list() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::btree_set(unit_name(), 1..8).prop_flat_map(|set| {
            let units: Vec<String> = set.into_iter().collect();
            Just(units).prop_shuffle()
        })
    }

    /// A full git commit SHA
    pub fn commit_sha() -> impl Strategy<Value = String> {
        "[0-9a-f]{40}"
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_unit_list_is_distinct(units in unit_list()) {
            let unique: HashSet<&String> = units.iter().collect();
            prop_assert_eq!(unique.len(), units.len());
            prop_assert!(units.iter().all(|u| u.contains('.')));
        }

        #[test]
        fn test_commit_sha_generator(sha in commit_sha()) {
            prop_assert_eq!(sha.len(), 40);
            prop_assert!(sha.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
