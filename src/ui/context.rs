//! Terminal detection for choosing between fancy and plain output

use std::io::IsTerminal;

/// Set to any value to force plain output even on a TTY
pub const PLAIN_ENV: &str = "DLOCK_PLAIN";

/// Environment variables set by common CI providers
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "JENKINS_URL",
    "BUILDKITE",
    "TF_BUILD",
];

/// Output mode for one CLI invocation
#[derive(Debug, Clone, Copy)]
pub struct UiContext {
    interactive: bool,
}

impl UiContext {
    pub fn detect() -> Self {
        let on_tty = std::io::stdout().is_terminal() && std::io::stdin().is_terminal();
        Self {
            interactive: on_tty && !Self::plain_requested(|var| std::env::var_os(var).is_some()),
        }
    }

    pub fn non_interactive() -> Self {
        Self { interactive: false }
    }

    /// Prompts are allowed
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Spinners, progress bars and cliclack log lines are allowed
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }

    fn plain_requested(is_set: impl Fn(&str) -> bool) -> bool {
        is_set(PLAIN_ENV) || CI_VARS.iter().any(|var| is_set(*var))
    }
}
