//! Lab session state and the simulator engine
//!
//! `LabSession` is the plain state machine: boot, submit, deliver, stop,
//! finish. It knows nothing about time. The `engine` module owns a session
//! inside a tokio task and decides when deferred work is applied.

pub mod engine;
pub mod latency;

pub use engine::{spawn, LabEvent, LabHandle};
pub use latency::{FixedLatency, Latency, UniformLatency};

use crate::data::commands;
use crate::data::labs::{self, LabDefinition};
use crate::data::{LabStatus, Objective, SessionId};
use crate::LabError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default shell prompt echoed in front of every command
pub const DEFAULT_PROMPT: &str = "student@cyberlab:~$";

/// One run of a lab
#[derive(Debug, Clone)]
pub struct LabSession {
    pub id: SessionId,

    /// Id as requested by the caller (may not exist in the catalogue)
    pub lab_id: String,

    /// Resolved catalogue entry
    pub lab: &'static LabDefinition,

    pub status: LabStatus,

    /// Append-only log of terminal lines, display order
    pub transcript: Vec<String>,

    pub objectives: Vec<Objective>,

    pub started_at: DateTime<Utc>,

    pub prompt: String,

    /// Bumped on every boot so a superseded boot timer can be recognised
    boot_epoch: u64,
}

/// What the session made of a submitted line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Transcript wiped; nothing further happens
    Cleared,
    /// Empty input: prompt echoed, no response
    Blank,
    /// Prompt echoed; the response is applied later
    Deferred(Response),
}

/// Output waiting to be appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub command: String,
    pub lines: Vec<String>,
    pub objective: Option<&'static str>,
}

/// Immutable view of a session handed to observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabSnapshot {
    pub session_id: SessionId,
    pub lab_id: String,
    pub title: String,
    pub status: LabStatus,
    pub transcript: Vec<String>,
    pub objectives: Vec<Objective>,
    pub started_at: DateTime<Utc>,
}

impl LabSnapshot {
    /// Non-empty objective set with every flag set
    pub fn all_objectives_complete(&self) -> bool {
        all_complete(&self.objectives)
    }

    /// (completed, total)
    pub fn progress(&self) -> (usize, usize) {
        progress(&self.objectives)
    }
}

fn all_complete(objectives: &[Objective]) -> bool {
    !objectives.is_empty() && objectives.iter().all(|o| o.completed)
}

fn progress(objectives: &[Objective]) -> (usize, usize) {
    let done = objectives.iter().filter(|o| o.completed).count();
    (done, objectives.len())
}

impl LabSession {
    /// Create a session in `Starting` with the boot banner shown
    pub fn new(lab_id: &str, prompt: &str) -> Self {
        let mut session = Self {
            id: SessionId::new(),
            lab_id: lab_id.to_string(),
            lab: labs::lookup(lab_id),
            status: LabStatus::Starting,
            transcript: Vec::new(),
            objectives: Vec::new(),
            started_at: Utc::now(),
            prompt: prompt.to_string(),
            boot_epoch: 0,
        };
        session.begin_boot();
        session
    }

    /// Enter `Starting` and show the boot banner. Returns the boot epoch the
    /// matching `finish_boot` call must present.
    pub fn begin_boot(&mut self) -> u64 {
        self.boot_epoch += 1;
        self.status = LabStatus::Starting;
        self.started_at = Utc::now();
        self.transcript = vec![
            format!("[*] Provisioning lab environment: {}", self.lab.title),
            "[*] Starting target services ...".to_string(),
            "[*] Please wait, this may take a few seconds.".to_string(),
        ];
        self.boot_epoch
    }

    /// Epoch of the boot currently in progress (or last completed)
    pub fn boot_epoch(&self) -> u64 {
        self.boot_epoch
    }

    /// Complete a boot. Stale epochs are ignored and return false.
    pub fn finish_boot(&mut self, epoch: u64) -> bool {
        if epoch != self.boot_epoch {
            return false;
        }

        self.status = LabStatus::Running;
        self.transcript.push("[+] Lab environment ready.".to_string());
        self.transcript.push(format!("[+] Target: {} ({})", self.lab.target.name, self.lab.target.url));
        self.transcript.push("Type 'help' to list available commands.".to_string());
        self.transcript.push(String::new());
        self.objectives = self.lab.objectives();
        true
    }

    /// Handle one line of user input
    pub fn submit(&mut self, input: &str) -> Result<Submission, LabError> {
        let normalized = commands::normalize(input);

        if normalized == commands::CLEAR {
            self.transcript.clear();
            return Ok(Submission::Cleared);
        }

        if !self.status.accepts_input() {
            return Err(LabError::NotRunning(self.status));
        }

        self.transcript.push(format!("{} {}", self.prompt, input));

        if normalized.is_empty() {
            return Ok(Submission::Blank);
        }

        let response = match commands::lookup(&normalized) {
            Some(entry) => Response {
                command: normalized,
                lines: commands::response_lines(entry),
                objective: entry.objective,
            },
            None => Response {
                command: normalized,
                lines: vec![commands::not_found(input)],
                objective: None,
            },
        };

        Ok(Submission::Deferred(response))
    }

    /// Append a deferred response. Returns the objective id if this delivery
    /// flipped it from incomplete to complete. Output that lands outside
    /// `Running` (after a reset or stop) is shown but completes nothing.
    pub fn deliver(&mut self, response: &Response) -> Option<&'static str> {
        self.transcript.extend(response.lines.iter().cloned());
        self.transcript.push(String::new());

        if self.status != LabStatus::Running {
            return None;
        }
        let id = response.objective?;
        if self.complete_objective(id) {
            Some(id)
        } else {
            None
        }
    }

    /// Mark an objective complete. Idempotent; unknown ids are ignored.
    pub fn complete_objective(&mut self, id: &str) -> bool {
        match self.objectives.iter_mut().find(|o| o.id == id) {
            Some(objective) if !objective.completed => {
                objective.completed = true;
                true
            }
            _ => false,
        }
    }

    /// Wipe the transcript and objective flags, then boot again
    pub fn reset(&mut self) -> u64 {
        self.transcript.clear();
        for objective in &mut self.objectives {
            objective.completed = false;
        }
        self.begin_boot()
    }

    /// Shut the lab down. Only allowed while running.
    pub fn stop(&mut self) -> Result<(), LabError> {
        if self.status != LabStatus::Running {
            return Err(LabError::NotRunning(self.status));
        }

        self.status = LabStatus::Completed;
        self.transcript.push("[*] Stopping lab environment ...".to_string());
        self.transcript.push("[*] Target services halted. Session ended.".to_string());
        Ok(())
    }

    /// Confirm completion once every objective is done
    pub fn finish(&mut self) -> Result<(), LabError> {
        if self.status != LabStatus::Running {
            return Err(LabError::NotRunning(self.status));
        }
        if !self.all_objectives_complete() {
            let (done, total) = self.progress();
            return Err(LabError::ObjectivesIncomplete { remaining: total - done });
        }

        self.status = LabStatus::Completed;
        self.transcript.push("[+] All objectives complete.".to_string());
        self.transcript.push(format!("[+] Lab '{}' finished. Well done!", self.lab.title));
        Ok(())
    }

    pub fn all_objectives_complete(&self) -> bool {
        all_complete(&self.objectives)
    }

    pub fn progress(&self) -> (usize, usize) {
        progress(&self.objectives)
    }

    /// Seconds since the current boot began
    pub fn elapsed_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    pub fn snapshot(&self) -> LabSnapshot {
        LabSnapshot {
            session_id: self.id,
            lab_id: self.lab_id.clone(),
            title: self.lab.title.to_string(),
            status: self.status,
            transcript: self.transcript.clone(),
            objectives: self.objectives.clone(),
            started_at: self.started_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(lab_id: &str) -> LabSession {
        let mut session = LabSession::new(lab_id, DEFAULT_PROMPT);
        let epoch = session.boot_epoch;
        assert!(session.finish_boot(epoch));
        session
    }

    fn deliver_command(session: &mut LabSession, input: &str) -> Option<&'static str> {
        match session.submit(input) {
            Ok(Submission::Deferred(response)) => session.deliver(&response),
            other => panic!("expected deferred response, got {:?}", other),
        }
    }

    #[test]
    fn new_session_shows_boot_banner() {
        let session = LabSession::new("injection", DEFAULT_PROMPT);
        assert_eq!(session.status, LabStatus::Starting);
        assert_eq!(session.transcript.len(), 3);
        assert!(session.objectives.is_empty());
        assert_eq!(session.boot_epoch(), 1);
    }

    #[test]
    fn boot_populates_objectives_for_lab() {
        let session = running("injection");
        assert_eq!(session.status, LabStatus::Running);
        let ids: Vec<&str> = session.objectives.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["obj1", "obj2", "obj3", "obj4"]);
        assert!(session.transcript.iter().any(|l| l.contains("ready")));
    }

    #[test]
    fn unknown_lab_gets_default_objectives() {
        let session = running("no-such-lab");
        assert_eq!(session.lab.id, labs::DEFAULT_LAB_ID);
        assert_eq!(session.objectives, labs::default_lab().objectives());
        assert_eq!(session.lab_id, "no-such-lab");
    }

    #[test]
    fn stale_boot_epoch_is_ignored() {
        let mut session = LabSession::new("injection", DEFAULT_PROMPT);
        let stale = session.boot_epoch;
        let fresh = session.reset();
        assert!(!session.finish_boot(stale));
        assert_eq!(session.status, LabStatus::Starting);
        assert!(session.finish_boot(fresh));
    }

    #[test]
    fn input_rejected_while_starting() {
        let mut session = LabSession::new("injection", DEFAULT_PROMPT);
        let before = session.transcript.clone();
        assert_eq!(
            session.submit("nmap"),
            Err(LabError::NotRunning(LabStatus::Starting))
        );
        assert_eq!(session.transcript, before);
    }

    #[test]
    fn echo_keeps_original_input() {
        let mut session = running("injection");
        session.submit("  SQLMap ").unwrap();
        assert_eq!(
            session.transcript.last().map(String::as_str),
            Some("student@cyberlab:~$   SQLMap ")
        );
    }

    #[test]
    fn sqlmap_completes_obj2_once() {
        let mut session = running("injection");
        assert_eq!(deliver_command(&mut session, "sqlmap"), Some("obj2"));
        assert_eq!(deliver_command(&mut session, "SQLMAP"), None);

        let completed: Vec<&str> = session
            .objectives
            .iter()
            .filter(|o| o.completed)
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(completed, ["obj2"]);
    }

    #[test]
    fn unmatched_command_adds_one_not_found_line() {
        let mut session = running("injection");
        let before_objectives = session.objectives.clone();
        let before_len = session.transcript.len();

        deliver_command(&mut session, "hydra -l admin");

        // prompt echo + not found + blank
        assert_eq!(session.transcript.len(), before_len + 3);
        let not_found: Vec<&String> = session
            .transcript
            .iter()
            .filter(|l| l.contains("command not found"))
            .collect();
        assert_eq!(not_found.len(), 1);
        assert_eq!(session.objectives, before_objectives);
    }

    #[test]
    fn response_is_followed_by_blank_line() {
        let mut session = running("injection");
        deliver_command(&mut session, "whoami");
        let n = session.transcript.len();
        assert_eq!(session.transcript[n - 2], "student");
        assert_eq!(session.transcript[n - 1], "");
    }

    #[test]
    fn clear_empties_transcript() {
        let mut session = running("injection");
        deliver_command(&mut session, "nmap");
        assert_eq!(session.submit("  CLEAR "), Ok(Submission::Cleared));
        assert!(session.transcript.is_empty());
    }

    #[test]
    fn clear_works_after_stop() {
        let mut session = running("injection");
        session.stop().unwrap();
        assert_eq!(session.submit("clear"), Ok(Submission::Cleared));
        assert!(session.transcript.is_empty());
    }

    #[test]
    fn blank_input_only_echoes_prompt() {
        let mut session = running("injection");
        let before = session.transcript.len();
        assert_eq!(session.submit("   "), Ok(Submission::Blank));
        assert_eq!(session.transcript.len(), before + 1);
    }

    #[test]
    fn stop_requires_running() {
        let mut session = LabSession::new("injection", DEFAULT_PROMPT);
        assert!(session.stop().is_err());

        let mut session = running("injection");
        session.stop().unwrap();
        assert_eq!(session.status, LabStatus::Completed);
        assert!(session.transcript.last().unwrap().contains("Session ended"));
        assert_eq!(session.stop(), Err(LabError::NotRunning(LabStatus::Completed)));
    }

    #[test]
    fn reset_restores_initial_state() {
        let mut session = running("injection");
        deliver_command(&mut session, "sqlmap");
        let epoch = session.reset();

        assert_eq!(session.status, LabStatus::Starting);
        assert_eq!(session.transcript.len(), 3);
        assert!(session.objectives.iter().all(|o| !o.completed));

        session.finish_boot(epoch);
        let fresh = running("injection");
        assert_eq!(session.transcript, fresh.transcript);
        assert_eq!(session.objectives, fresh.objectives);
    }

    #[test]
    fn all_complete_needs_non_empty_set() {
        let starting = LabSession::new("injection", DEFAULT_PROMPT);
        assert!(!starting.all_objectives_complete());

        let mut session = running("default");
        assert!(!session.all_objectives_complete());
        session.complete_objective("obj1");
        session.complete_objective("obj2");
        assert!(session.all_objectives_complete());
    }

    #[test]
    fn finish_requires_every_objective() {
        let mut session = running("injection");
        deliver_command(&mut session, "scan");
        assert_eq!(
            session.finish(),
            Err(LabError::ObjectivesIncomplete { remaining: 3 })
        );

        for cmd in ["sqlmap", "sqlmap --dbs", "sqlmap --dump"] {
            deliver_command(&mut session, cmd);
        }
        session.finish().unwrap();
        assert_eq!(session.status, LabStatus::Completed);
    }

    #[test]
    fn late_output_after_reset_completes_nothing() {
        let mut session = running("injection");
        let response = match session.submit("sqlmap") {
            Ok(Submission::Deferred(response)) => response,
            other => panic!("expected deferred response, got {:?}", other),
        };
        let epoch = session.reset();

        assert_eq!(session.deliver(&response), None);
        assert!(session.objectives.iter().all(|o| !o.completed));
        assert!(session.transcript.iter().any(|l| l.contains("sqlmap")));

        session.finish_boot(epoch);
        assert!(session.objectives.iter().all(|o| !o.completed));
    }

    #[test]
    fn objective_outside_lab_is_ignored() {
        let mut session = running("recon");
        assert_eq!(deliver_command(&mut session, "sqlmap"), None);
        assert!(session.objectives.iter().all(|o| !o.completed));
    }
}
