//! Tool command templates
//!
//! The manifest declares each external tool as an argument list with
//! placeholders. `{source}`, `{object}` and `{output}` are substituted in
//! place; an argument containing `{each_object}` or `{each_input}` is
//! repeated once per item of the corresponding list.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;
use crate::infra::process::Invocation;

/// Declared command line for an external tool
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CommandTemplate(Vec<String>);

impl CommandTemplate {
    /// Build a template from its program and argument templates
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    /// Program to execute, `None` for an empty template
    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Anchor a relative program path (one containing a separator) at `base`.
    /// Bare program names are left for `PATH` lookup.
    #[must_use]
    pub fn rooted_at(mut self, base: &Path) -> Self {
        if let Some(program) = self.0.first_mut() {
            let path = Path::new(program.as_str());
            if program.contains('/') && path.is_relative() {
                *program = base.join(path).display().to_string();
            }
        }
        self
    }

    /// Expand into a concrete invocation.
    ///
    /// `values` are `(name, value)` pairs for single placeholders; `each` is
    /// an optional `(name, items)` pair for the repeated placeholder.
    pub fn expand(
        &self,
        name: &str,
        values: &[(&str, &str)],
        each: Option<(&str, &[String])>,
        cwd: &Path,
    ) -> Result<Invocation, ConfigError> {
        let (program, templates) = self.0.split_first().ok_or_else(|| ConfigError::EmptyCommand {
            name: name.to_string(),
        })?;

        let mut invocation = Invocation::new(program.clone()).current_dir(cwd);
        for template in templates {
            match each {
                Some((key, items)) if template.contains(&placeholder(key)) => {
                    for item in items {
                        let arg = template.replace(&placeholder(key), item);
                        invocation = invocation.arg(substitute(&arg, values));
                    }
                }
                _ => invocation = invocation.arg(substitute(template, values)),
            }
        }
        Ok(invocation)
    }
}

fn placeholder(name: &str) -> String {
    format!("{{{name}}}")
}

fn substitute(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (key, value)| {
            acc.replace(&placeholder(key), value)
        })
}
