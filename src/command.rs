//! Renders a resolved [`DaemonConfig`] into the scheduler's command line.
//!
//! Values are emitted verbatim without quoting. The supervisor consumes the
//! result as a single line, so callers must not pass values containing
//! whitespace.
use std::{fmt, path::Path};

use serde::Serialize;

use crate::options::{DaemonConfig, EmitRule};

/// Executable path followed by `--flag=value` tokens in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RenderedCommand {
    tokens: Vec<String>,
}

impl RenderedCommand {
    /// All tokens, the executable first.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Only the flag tokens.
    pub fn flags(&self) -> &[String] {
        &self.tokens[1..]
    }
}

impl fmt::Display for RenderedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens.join(" "))
    }
}

/// Builds the command line for `executable` from `config`.
pub fn generate(executable: &Path, config: &DaemonConfig) -> RenderedCommand {
    let mut tokens = Vec::with_capacity(config.options().len() + 1);
    tokens.push(executable.display().to_string());

    for option in config.options() {
        // Always-emitted options carry a default, so only unset optional flags land here.
        let Some(value) = &option.value else {
            debug_assert_eq!(option.spec.emit, EmitRule::IfSet);
            continue;
        };
        tokens.push(format!("--{}={}", option.spec.flag_name(), value));
    }

    RenderedCommand { tokens }
}
