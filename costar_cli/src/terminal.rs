//! Terminal detection and capability utilities

use is_terminal::IsTerminal;
use std::env;
use std::io::{stderr, stdout};

const CI_VARS: [&str; 9] = [
    "CI",
    "CONTINUOUS_INTEGRATION",
    "JENKINS_URL",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "TRAVIS",
    "CIRCLECI",
    "BUILDKITE",
    "DRONE",
];

/// What the attached terminal can do, detected once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCapabilities {
    pub stdout_tty: bool,
    pub stderr_tty: bool,
    pub ci: bool,
    pub dumb: bool,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        let term = env::var("TERM").unwrap_or_default();
        Self {
            stdout_tty: stdout().is_terminal(),
            stderr_tty: stderr().is_terminal(),
            ci: is_ci_environment(),
            dumb: term == "dumb" || (cfg!(unix) && term.is_empty()),
        }
    }

    /// Stdout is a terminal a person is looking at
    pub fn is_interactive(&self) -> bool {
        self.stdout_tty
            && !self.ci
            && env::var("DEBIAN_FRONTEND").unwrap_or_default() != "noninteractive"
    }

    /// Colors are only written to interactive terminals that understand ANSI
    pub fn supports_color(&self) -> bool {
        self.is_interactive() && !self.dumb && env::var_os("NO_COLOR").is_none()
    }

    /// Spinners draw on stderr, so stdout stays clean for piping
    pub fn supports_progress(&self) -> bool {
        self.stderr_tty && !self.ci && !self.dumb
    }
}

fn is_ci_environment() -> bool {
    CI_VARS.iter().any(|var| env::var_os(var).is_some())
}
