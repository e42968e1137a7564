//! Lab catalogue
//!
//! Every lab is a fixed briefing, a fixed list of objectives and a static
//! mock of the target application shown next to the terminal. Unknown lab
//! ids resolve to the default lab.

use super::Objective;

/// Objective as declared in the catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectiveTemplate {
    pub id: &'static str,
    pub description: &'static str,
}

/// Static mock of the vulnerable application under test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetApp {
    pub name: &'static str,
    pub url: &'static str,
    pub body: &'static [&'static str],
}

/// A complete lab entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub difficulty: u8, // 1-5
    pub briefing: &'static str,
    pub objectives: &'static [ObjectiveTemplate],
    pub target: TargetApp,
}

impl LabDefinition {
    /// Fresh, incomplete objective set for a new session
    pub fn objectives(&self) -> Vec<Objective> {
        self.objectives
            .iter()
            .map(|t| Objective::new(t.id, t.description))
            .collect()
    }

    pub fn difficulty_stars(&self) -> String {
        let filled = self.difficulty.min(5) as usize;
        format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }
}

/// Id used when the requested lab is not in the catalogue
pub const DEFAULT_LAB_ID: &str = "default";

const SHOPFRONT: TargetApp = TargetApp {
    name: "ShopFront Admin",
    url: "http://10.10.0.5/login.php",
    body: &[
        "┌──────────────────────────────┐",
        "│     ShopFront Admin Login    │",
        "├──────────────────────────────┤",
        "│ Username: [              ]   │",
        "│ Password: [              ]   │",
        "│                              │",
        "│          [ Sign in ]         │",
        "└──────────────────────────────┘",
        "",
        "GET /login.php?user=<input>",
        "Server: Apache/2.4.41 (Ubuntu)",
        "X-Powered-By: PHP/7.4.3",
    ],
};

const INTRANET: TargetApp = TargetApp {
    name: "Acme Intranet",
    url: "http://10.10.0.8/",
    body: &[
        "┌──────────────────────────────┐",
        "│   Acme Corp Intranet Portal  │",
        "├──────────────────────────────┤",
        "│  > News                      │",
        "│  > Staff directory           │",
        "│  > IT helpdesk               │",
        "└──────────────────────────────┘",
        "",
        "<!-- dev note: /backup still reachable -->",
        "Server: nginx/1.18.0",
    ],
};

static LABS: &[LabDefinition] = &[
    LabDefinition {
        id: "injection",
        title: "SQL Injection Fundamentals",
        difficulty: 2,
        briefing: "The ShopFront admin portal builds its login query by string \
                   concatenation. Find the injectable parameter, enumerate the \
                   backend database and extract the administrator credentials.",
        objectives: &[
            ObjectiveTemplate { id: "obj1", description: "Scan the target to discover the web service" },
            ObjectiveTemplate { id: "obj2", description: "Confirm the login form is injectable with sqlmap" },
            ObjectiveTemplate { id: "obj3", description: "Enumerate the backend databases" },
            ObjectiveTemplate { id: "obj4", description: "Dump the users table and recover the admin hash" },
        ],
        target: SHOPFRONT,
    },
    LabDefinition {
        id: "recon",
        title: "Network Reconnaissance",
        difficulty: 1,
        briefing: "Before attacking anything you need a map. Identify the open \
                   services on the intranet host, look for known weaknesses in \
                   the web server and find content that was never meant to be \
                   published.",
        objectives: &[
            ObjectiveTemplate { id: "obj1", description: "Map open ports and services on the target" },
            ObjectiveTemplate { id: "obj5", description: "Run a web vulnerability scan with nikto" },
            ObjectiveTemplate { id: "obj6", description: "Discover hidden directories with gobuster" },
        ],
        target: INTRANET,
    },
    LabDefinition {
        id: DEFAULT_LAB_ID,
        title: "Getting Started",
        difficulty: 1,
        briefing: "Get comfortable with the lab terminal. Type 'help' to see the \
                   available tools, scan the target and probe it for a weakness.",
        objectives: &[
            ObjectiveTemplate { id: "obj1", description: "Run an initial scan of the target" },
            ObjectiveTemplate { id: "obj2", description: "Probe the target for an injection flaw" },
        ],
        target: SHOPFRONT,
    },
];

/// All labs in display order
pub fn catalogue() -> &'static [LabDefinition] {
    LABS
}

/// Look up a lab by id, falling back to the default lab
pub fn lookup(lab_id: &str) -> &'static LabDefinition {
    find(lab_id).unwrap_or_else(default_lab)
}

/// Exact lookup without fallback
pub fn find(lab_id: &str) -> Option<&'static LabDefinition> {
    LABS.iter().find(|lab| lab.id == lab_id)
}

pub fn default_lab() -> &'static LabDefinition {
    // The default entry is part of the static table above.
    LABS.iter()
        .find(|lab| lab.id == DEFAULT_LAB_ID)
        .unwrap_or(&LABS[LABS.len() - 1])
}
