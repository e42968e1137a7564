//! Command history with Up/Down recall

/// Bounded list of submitted commands plus a recall cursor
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: Vec<String>,
    limit: usize,
    cursor: Option<usize>,
}

impl CommandHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit: limit.max(1),
            cursor: None,
        }
    }

    /// Record a submitted line. Blank lines and immediate repeats are skipped.
    pub fn push(&mut self, line: &str) {
        self.cursor = None;
        if line.trim().is_empty() || self.entries.last().map(String::as_str) == Some(line) {
            return;
        }
        self.entries.push(line.to_string());
        if self.entries.len() > self.limit {
            self.entries.remove(0);
        }
    }

    /// Step back to an older entry
    pub fn previous(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let index = match self.cursor {
            None => self.entries.len() - 1,
            Some(0) => 0,
            Some(i) => i - 1,
        };
        self.cursor = Some(index);
        self.entries.get(index).map(String::as_str)
    }

    /// Step forward; `None` once past the newest entry
    pub fn newer(&mut self) -> Option<&str> {
        match self.cursor {
            Some(i) if i + 1 < self.entries.len() => {
                self.cursor = Some(i + 1);
                self.entries.get(i + 1).map(String::as_str)
            }
            _ => {
                self.cursor = None;
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recalls_newest_first() {
        let mut history = CommandHistory::new(10);
        history.push("scan");
        history.push("sqlmap");
        assert_eq!(history.previous(), Some("sqlmap"));
        assert_eq!(history.previous(), Some("scan"));
        assert_eq!(history.previous(), Some("scan"));
        assert_eq!(history.newer(), Some("sqlmap"));
        assert_eq!(history.newer(), None);
    }

    #[test]
    fn skips_blanks_and_repeats() {
        let mut history = CommandHistory::new(10);
        history.push("nmap");
        history.push("nmap");
        history.push("   ");
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn drops_oldest_over_limit() {
        let mut history = CommandHistory::new(2);
        for cmd in ["a", "b", "c"] {
            history.push(cmd);
        }
        assert_eq!(history.previous(), Some("c"));
        assert_eq!(history.previous(), Some("b"));
        assert_eq!(history.previous(), Some("b"));
    }

    #[test]
    fn empty_history_recalls_nothing() {
        let mut history = CommandHistory::new(5);
        assert!(history.is_empty());
        assert_eq!(history.previous(), None);
        assert_eq!(history.newer(), None);
    }
}
