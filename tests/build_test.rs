//! Integration tests for the build pipeline
//!
//! Runs the real binary against throwaway projects whose external tools
//! are small shell scripts.

mod common;

use common::{TestProject, BACKEND_MANIFEST, FAILING_TOOL, FRONTEND_MANIFEST, VERSION_TEMPLATE};

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================
// Front-end debug builds
// ============================================

#[test]
fn test_frontend_only_debug_build() {
    let project = TestProject::new().with_frontend();
    project.create_file("armadillo-build.toml", FRONTEND_MANIFEST);

    let output = project.run(&["--frontend-only"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    assert_eq!(
        project.read_file("out/fe/armadillo.js"),
        "/*=== File: util.js ===*/\nvar util = {};\n/*=== File: main.js ===*/\nutil.start();\n"
    );
    assert_eq!(project.read_file("out/fe/index.html"), "<html></html>\n");
    assert_eq!(project.read_file("out/fe/screen.css"), "body { margin: 0; }\n");
    assert!(!project.file_exists("out/fe/closure.css"));
    assert!(!project.file_exists("out/armadillo"));
}

#[test]
fn test_rerun_removes_stale_resources() {
    let project = TestProject::new().with_frontend();
    project.create_file("armadillo-build.toml", FRONTEND_MANIFEST);
    assert!(project.run(&["-f"]).status.success());

    project.create_file("out/fe/leftover.css", "stale");
    project.create_file(
        "armadillo-build.toml",
        "[frontend]\nsources = [\"util.js\", \"main.js\"]\nresources = [\"index.html\"]\n",
    );
    assert!(project.run(&["-f"]).status.success());

    assert!(project.file_exists("out/fe/index.html"));
    assert!(!project.file_exists("out/fe/screen.css"));
    assert!(!project.file_exists("out/fe/leftover.css"));
}

#[test]
fn test_missing_resource_fails_resources_stage() {
    let project = TestProject::new().with_frontend();
    project.create_file(
        "armadillo-build.toml",
        "[frontend]\nsources = [\"main.js\"]\nresources = [\"index.html\", \"missing.png\"]\n",
    );

    let output = project.run(&["-f"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Stage 'resources' failed"), "stderr: {err}");
    assert!(err.contains("missing.png"), "stderr: {err}");
    // Reported before any stage writes output
    assert!(!project.file_exists("out"));
}

#[cfg(unix)]
#[test]
fn test_version_stamp_in_debug_build() {
    let project = TestProject::new().with_frontend();
    project.create_file("web_frontend/version.js.proto", VERSION_TEMPLATE);
    project.create_script("tools/counter.sh", "echo 41");
    project.create_file(
        "armadillo-build.toml",
        r#"
[frontend]
sources = ["util.js", "main.js"]
resources = []

[version]
template = "web_frontend/version.js.proto"
counter = ["tools/counter.sh"]
"#,
    );

    let output = project.run(&["-f"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let stamped = project.read_file("web_frontend/version.js.proto");
    assert!(stamped.starts_with("goog.provide('armadillo.Version');\n"));
    assert!(stamped.contains("armadillo.Version.BUILD = 41;\n"));
    assert!(!stamped.contains("STAMP = 1280000000;"));
    // Debug builds never publish
    assert!(!project.file_exists("web_frontend/version.js"));
}

#[cfg(unix)]
#[test]
fn test_counter_failure_stops_before_assembly() {
    let project = TestProject::new().with_frontend();
    project.create_file("web_frontend/version.js.proto", VERSION_TEMPLATE);
    project.create_script("tools/counter.sh", "echo 'no history' >&2\nexit 1");
    project.create_file(
        "armadillo-build.toml",
        r#"
[frontend]
sources = ["util.js", "main.js"]
resources = ["index.html"]

[version]
counter = ["tools/counter.sh"]
"#,
    );

    let output = project.run(&["-f"]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Stage 'version_stamp' failed"), "stderr: {err}");
    assert!(err.contains("no history"), "stderr: {err}");
    assert_eq!(project.read_file("web_frontend/version.js.proto"), VERSION_TEMPLATE);
    assert!(project.file_exists("out/fe/index.html"));
    assert!(!project.file_exists("out/fe/armadillo.js"));
}

// ============================================
// Back-end builds
// ============================================

#[cfg(unix)]
#[test]
fn test_backend_only_build_links_objects_in_order() {
    let project = TestProject::new().with_frontend().with_backend();
    project.create_file("armadillo-build.toml", BACKEND_MANIFEST);

    let output = project.run(&["--backend-only"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    assert_eq!(project.read_file("out/paths.o"), "package main // paths\n");
    assert_eq!(project.read_file("out/main.o"), "package main // main\n");
    assert_eq!(
        project.read_file("out/armadillo"),
        "package main // paths\npackage main // main\n"
    );
    assert!(!project.file_exists("out/fe"));
}

#[cfg(unix)]
#[test]
fn test_full_debug_build_without_dependency() {
    let project = TestProject::new().with_frontend().with_backend();
    project.create_file("armadillo-build.toml", BACKEND_MANIFEST);

    let output = project.run(&[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(project.file_exists("out/armadillo"));
    assert!(project.file_exists("out/fe/armadillo.js"));
}

#[cfg(unix)]
#[test]
fn test_compile_failure_stops_pipeline() {
    let project = TestProject::new().with_frontend().with_backend();
    project.create_script("tools/cc.sh", FAILING_TOOL);
    project.create_file("out/armadillo", "previous build");
    project.create_file("armadillo-build.toml", BACKEND_MANIFEST);

    let output = project.run(&[]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Stage 'compile' failed"), "stderr: {err}");
    assert!(err.contains("syntax error near unexpected token"), "stderr: {err}");
    assert!(!project.file_exists("out/armadillo"));
    assert!(!project.file_exists("out/fe"));
}

#[cfg(unix)]
#[test]
fn test_link_failure_leaves_no_executable() {
    let project = TestProject::new().with_frontend().with_backend();
    project.create_script("tools/ld.sh", FAILING_TOOL);
    project.create_file(
        "armadillo-build.toml",
        &BACKEND_MANIFEST.replace(
            r#"link = ["tools/cc.sh""#,
            r#"link = ["tools/ld.sh""#,
        ),
    );

    let output = project.run(&["-b"]);
    assert!(!output.status.success());
    assert!(project.file_exists("out/main.o"));
    assert!(!project.file_exists("out/armadillo"));
}

#[test]
fn test_missing_tool_fails_before_any_stage() {
    let project = TestProject::new().with_frontend();
    project.create_file("src/main.go", "package main\n");
    project.create_file(
        "armadillo-build.toml",
        r#"
[backend]
sources = ["main.go"]
compile = ["armadillo-no-such-compiler", "-o", "{object}", "{source}"]
link = ["armadillo-no-such-linker", "-o", "{output}", "{each_object}"]
"#,
    );

    let output = project.run(&[]);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("Preflight check failed"), "stderr: {err}");
    assert!(err.contains("armadillo-no-such-compiler"), "stderr: {err}");
    assert!(!project.file_exists("out"));
}

#[cfg(unix)]
#[test]
fn test_release_build_uses_bundler() {
    let project = TestProject::new().with_frontend();
    // calcdeps-style: -i<input>... --output_file OUT
    project.create_script(
        "tools/bundle.sh",
        r#"out=""
for arg in "$@"; do
  case "$prev" in --output_file) out="$arg";; esac
  prev="$arg"
done
printf 'compiled(%s)\n' "$*" > "$out""#,
    );
    project.create_file(
        "armadillo-build.toml",
        r#"
[frontend]
sources = ["util.js", "main.js"]
resources = ["index.html"]
bundle = ["tools/bundle.sh", "-i{each_input}", "--output_file", "{output}"]
"#,
    );

    let output = project.run(&["-f", "--optimize"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let script = project.read_file("out/fe/armadillo.js");
    assert!(script.starts_with("compiled("));
    let util = script.find("util.js").unwrap();
    let main = script.find("main.js").unwrap();
    assert!(util < main, "inputs must keep declared order: {script}");
    assert!(!script.contains("/*=== File:"));
}

#[cfg(unix)]
#[test]
fn test_release_bundler_failure_removes_stale_script() {
    let project = TestProject::new().with_frontend();
    project.create_script("tools/bundle.sh", FAILING_TOOL);
    project.create_file(
        "armadillo-build.toml",
        r#"
[frontend]
sources = ["util.js", "main.js"]
resources = []
bundle = ["tools/bundle.sh", "--output_file", "{output}", "{each_input}"]
"#,
    );
    assert!(project.run(&["-f"]).status.success());
    assert!(project.file_exists("out/fe/armadillo.js"));

    let output = project.run(&["-f", "-c"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Stage 'assemble' failed"));
    assert!(!project.file_exists("out/fe/armadillo.js"));
}

