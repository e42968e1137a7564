//! Data structures for the lab world
//!
//! Defines lab status, objectives, the lab catalogue and the command table.

pub mod commands;
pub mod labs;

pub use commands::CommandEntry;
pub use labs::{LabDefinition, ObjectiveTemplate, TargetApp};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a lab session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabStatus {
    Starting,
    Running,
    Completed,
    Error,
}

impl LabStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            LabStatus::Starting => "◌",
            LabStatus::Running => "●",
            LabStatus::Completed => "✔",
            LabStatus::Error => "✖",
        }
    }

    /// Whether the lab accepts commands in this status
    pub fn accepts_input(&self) -> bool {
        matches!(self, LabStatus::Running)
    }
}

impl std::fmt::Display for LabStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabStatus::Starting => write!(f, "STARTING"),
            LabStatus::Running => write!(f, "RUNNING"),
            LabStatus::Completed => write!(f, "COMPLETED"),
            LabStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// A single completion criterion shown to the learner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    pub description: String,
    pub completed: bool,
}

impl Objective {
    pub fn new(id: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            completed: false,
        }
    }

    pub fn checkbox(&self) -> &'static str {
        if self.completed {
            "[x]"
        } else {
            "[ ]"
        }
    }
}

/// Unique identifier of one lab run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First block of the uuid, enough to tell runs apart in logs
    pub fn short(&self) -> String {
        self.0.to_string().chars().take(8).collect()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_running_accepts_input() {
        assert!(LabStatus::Running.accepts_input());
        assert!(!LabStatus::Starting.accepts_input());
        assert!(!LabStatus::Completed.accepts_input());
        assert!(!LabStatus::Error.accepts_input());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&LabStatus::Running).unwrap();
        assert_eq!(json, "\"running\"");
    }

    #[test]
    fn new_objective_starts_incomplete() {
        let objective = Objective::new("obj1", "Scan the target");
        assert!(!objective.completed);
        assert_eq!(objective.checkbox(), "[ ]");
    }

    #[test]
    fn session_ids_differ() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
        assert_eq!(a.short().len(), 8);
    }
}
