//! Default configuration values
//!
//! These reproduce the layout of the Armadillo source tree so that a project
//! without a build manifest still builds.

/// Build manifest file name, looked up in the project root
pub const MANIFEST_FILE: &str = "armadillo-build.toml";

/// Environment variable overriding the manifest path
pub const MANIFEST_ENV: &str = "ARMADILLO_BUILD_CONFIG";

/// Name of the linked executable and of the front-end script
pub const PRODUCT_NAME: &str = "armadillo";

/// Back-end sources directory
pub const SOURCE_DIR: &str = "src";

/// Output root
pub const OUTPUT_DIR: &str = "out";

/// Front-end sources directory
pub const FRONTEND_DIR: &str = "web_frontend";

/// Resource directory under the output root
pub const RESOURCE_DIR: &str = "fe";

/// Back-end units, compile order, entry point last
pub const BACKEND_SOURCES: &[&str] = &["paths.go", "server.go", "main.go"];

/// Front-end units, script-load order
pub const FRONTEND_SOURCES: &[&str] = &[
    "version.js",
    "path_control.js",
    "actor.js",
    "file.js",
    "main.js",
];

/// Static front-end files copied verbatim
pub const FRONTEND_RESOURCES: &[&str] = &["index.html", "screen.css", "reset.css"];

/// Aggregate stylesheet written into the resource directory
pub const STYLESHEET_NAME: &str = "closure.css";

/// Object file extension produced by the compiler
pub const OBJECT_EXTENSION: &str = "8";

/// Compiler command template
pub const COMPILE_COMMAND: &[&str] = &["8g", "-o", "{object}", "{source}"];

/// Linker command template
pub const LINK_COMMAND: &[&str] = &["8l", "-o", "{output}", "{each_object}"];

/// Optimizing bundler command template, run from the project root
pub const BUNDLE_COMMAND: &[&str] = &[
    "python",
    "closure/closure/bin/calcdeps.py",
    "-i{each_input}",
    "-p",
    "closure/closure/goog",
    "-o",
    "compiled",
    "-c",
    "closure-compiler.jar",
    "--output_file",
    "{output}",
];

/// Version template, relative to the project root
pub const VERSION_TEMPLATE: &str = "web_frontend/version.js.proto";

/// Suffix stripped from the template to get the published file
pub const TEMPLATE_SUFFIX: &str = ".proto";

/// Command printing the next build number
pub const COUNTER_COMMAND: &[&str] = &["gitcrement", "next"];

/// Assignment holding the build counter
pub const COUNTER_FIELD: &str = "BUILD";

/// Assignment holding the stamp time
pub const TIMESTAMP_FIELD: &str = "STAMP";

/// Author of automated stamp commits
pub const STAMP_AUTHOR: &str = "Armadillo Build Script <armadillo@bluestatic.org>";

/// Stamp commit message, `{build}` is replaced by the counter
pub const STAMP_MESSAGE: &str = "Stamp version.js @ {build}.";
