// src/command/mod.rs

//! Child-process execution for the watch callback.
//!
//! The engine hands the binary a changed path; this module turns the
//! configured command tokens into a concrete command line and runs it
//! through the platform shell. The command itself is never parsed here —
//! quoting, pipes and the rest are the shell's business.

use std::fmt;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

use log::debug;

/// Placeholder replaced with the changed path wherever it appears in a
/// command token.
const PATH_PLACEHOLDER: &str = "{}";

/// A tokenized shell command with `{}` placeholders.
pub struct CommandTemplate {
    tokens: Vec<String>,
}

impl CommandTemplate {
    /// Wrap the given command tokens.
    #[must_use]
    pub fn new(tokens: Vec<String>) -> Self {
        CommandTemplate { tokens }
    }

    /// Render the command line for `path`: substitute every placeholder and
    /// join the tokens with spaces.
    #[must_use]
    pub fn render(&self, path: &Path) -> String {
        let path = path.to_string_lossy();
        self.tokens
            .iter()
            .map(|token| token.replace(PATH_PLACEHOLDER, &path))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the rendered command through `/bin/sh` and wait for it.
    ///
    /// # Errors
    ///
    /// Propagates any `io::Error` from spawning or waiting on the shell. The
    /// command's own failure is not an error here; it is reported through the
    /// returned [`ExitStatus`].
    pub fn run(&self, path: &Path) -> io::Result<ExitStatus> {
        let rendered = self.render(path);
        debug!("running `{}`", rendered);
        Command::new("/bin/sh").arg("-c").arg(&rendered).status()
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::test;

    use super::CommandTemplate;

    fn template(tokens: &[&str]) -> CommandTemplate {
        CommandTemplate::new(tokens.iter().map(|token| (*token).to_string()).collect())
    }

    #[test]
    fn render_substitutes_placeholders() {
        let template = template(&["echo", "{}", "--log={}.log"]);
        assert_eq!(
            template.render(Path::new("/tmp/a.txt")),
            "echo /tmp/a.txt --log=/tmp/a.txt.log"
        );
    }

    #[test]
    fn render_without_placeholder_is_a_plain_join() {
        let template = template(&["cargo", "test"]);
        assert_eq!(template.render(Path::new("/tmp/a.txt")), "cargo test");
    }

    #[test]
    fn run_reports_the_shell_exit_status() -> test::Result {
        let status = template(&["exit", "7"]).run(Path::new("/unused"))?;
        assert_eq!(status.code(), Some(7));

        let status = template(&["true"]).run(Path::new("/unused"))?;
        assert!(status.success());

        Ok(())
    }
}
