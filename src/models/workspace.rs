use serde::{Deserialize, Serialize};

/// Whether a project or category belongs to a personal or a team workspace.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceType {
    Personal,
    Team,
}

impl WorkspaceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceType::Personal => "personal",
            WorkspaceType::Team => "team",
        }
    }
}
