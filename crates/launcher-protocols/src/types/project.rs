//! Read-only view of a user project.

use serde::{Deserialize, Serialize};

use super::run::ExecutionMode;

/// A project as stored by the launcher UI (`projects.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub command_names: Vec<String>,
    #[serde(default)]
    pub command_modes: Vec<ExecutionMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_command: Option<String>,
    #[serde(default)]
    pub result_path: String,
    #[serde(default)]
    pub order: Option<u32>,
}

impl Project {
    /// Fill in fields older files may lack: `commands` from
    /// `default_command`, and a `terminal` mode for every command.
    pub fn normalized(mut self) -> Self {
        if self.commands.is_empty() {
            if let Some(cmd) = self.default_command.as_ref().filter(|c| !c.is_empty()) {
                self.commands = vec![cmd.clone()];
            }
        }
        if self.command_modes.len() < self.commands.len() {
            self.command_modes
                .resize(self.commands.len(), ExecutionMode::Terminal);
        }
        self
    }

    pub fn command(&self, index: usize) -> Option<&str> {
        self.commands.get(index).map(String::as_str)
    }

    /// Display name for a command, empty when unnamed.
    pub fn command_name(&self, index: usize) -> &str {
        self.command_names.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn command_mode(&self, index: usize) -> ExecutionMode {
        self.command_modes.get(index).copied().unwrap_or_default()
    }
}
