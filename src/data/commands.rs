//! Command table for the lab terminal
//!
//! Commands are matched by exact string after trimming and lowercasing.
//! There is no tokenizer: `sqlmap --dbs` is a different entry from `sqlmap`.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Canned response for one recognised command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandEntry {
    pub command: &'static str,
    pub summary: &'static str,
    pub response: &'static [&'static str],
    pub objective: Option<&'static str>,
}

/// Synchronously wipes the transcript; never reaches the table
pub const CLEAR: &str = "clear";

static ENTRIES: &[CommandEntry] = &[
    CommandEntry {
        command: "help",
        summary: "List available commands",
        response: &[],
        objective: None,
    },
    CommandEntry {
        command: "whoami",
        summary: "Show the current user",
        response: &["student"],
        objective: None,
    },
    CommandEntry {
        command: "ls",
        summary: "List files in the working directory",
        response: &[
            "notes.txt  wordlists/  reports/",
        ],
        objective: None,
    },
    CommandEntry {
        command: "ifconfig",
        summary: "Show network interfaces",
        response: &[
            "eth0: flags=4163<UP,BROADCAST,RUNNING,MULTICAST>  mtu 1500",
            "        inet 10.10.0.2  netmask 255.255.255.0  broadcast 10.10.0.255",
            "lo: flags=73<UP,LOOPBACK,RUNNING>  mtu 65536",
            "        inet 127.0.0.1  netmask 255.0.0.0",
        ],
        objective: None,
    },
    CommandEntry {
        command: "curl",
        summary: "Fetch the target landing page",
        response: &[
            "HTTP/1.1 200 OK",
            "Server: Apache/2.4.41 (Ubuntu)",
            "Content-Type: text/html; charset=UTF-8",
            "",
            "<form action=\"login.php\" method=\"GET\">",
            "  <input name=\"user\"> <input name=\"pass\" type=\"password\">",
            "</form>",
        ],
        objective: None,
    },
    CommandEntry {
        command: "scan",
        summary: "Quick scan of the lab target",
        response: &[
            "[*] Scanning target 10.10.0.5 ...",
            "[+] Host is up (0.0012s latency)",
            "[+] 22/tcp   open  ssh",
            "[+] 80/tcp   open  http",
            "[+] 3306/tcp open  mysql",
            "[*] Scan complete: 3 open ports",
        ],
        objective: Some("obj1"),
    },
    CommandEntry {
        command: "nmap",
        summary: "Port and service scan",
        response: &[
            "Starting Nmap 7.94 ( https://nmap.org )",
            "Nmap scan report for target (10.10.0.5)",
            "Host is up (0.0011s latency).",
            "",
            "PORT     STATE SERVICE VERSION",
            "22/tcp   open  ssh     OpenSSH 8.2p1 Ubuntu",
            "80/tcp   open  http    Apache httpd 2.4.41",
            "3306/tcp open  mysql   MySQL 5.7.33",
            "",
            "Nmap done: 1 IP address (1 host up) scanned in 8.21 seconds",
        ],
        objective: Some("obj1"),
    },
    CommandEntry {
        command: "nikto",
        summary: "Web server vulnerability scan",
        response: &[
            "- Nikto v2.5.0",
            "+ Target IP:          10.10.0.8",
            "+ Server: nginx/1.18.0",
            "+ /: The X-Frame-Options header is not present.",
            "+ /backup/: Directory indexing found.",
            "+ /admin/: Admin login page found.",
            "+ 7962 requests: 0 error(s) and 3 item(s) reported",
        ],
        objective: Some("obj5"),
    },
    CommandEntry {
        command: "gobuster",
        summary: "Brute-force web directories",
        response: &[
            "===============================================================",
            "Gobuster v3.6",
            "===============================================================",
            "/admin                (Status: 302) [--> /admin/login]",
            "/backup               (Status: 200) [Size: 1432]",
            "/images               (Status: 301) [--> /images/]",
            "/server-status        (Status: 403) [Size: 277]",
            "===============================================================",
            "Finished",
        ],
        objective: Some("obj6"),
    },
    CommandEntry {
        command: "sqlmap",
        summary: "Test the login form for SQL injection",
        response: &[
            "[*] starting sqlmap against http://10.10.0.5/login.php?user=admin",
            "[INFO] testing connection to the target URL",
            "[INFO] testing 'AND boolean-based blind - WHERE or HAVING clause'",
            "[INFO] GET parameter 'user' appears to be 'AND boolean-based blind' injectable",
            "[INFO] GET parameter 'user' is 'MySQL >= 5.0 UNION query' injectable",
            "[+] back-end DBMS: MySQL >= 5.0",
        ],
        objective: Some("obj2"),
    },
    CommandEntry {
        command: "sqlmap --dbs",
        summary: "Enumerate databases through the injection",
        response: &[
            "[INFO] fetching database names",
            "available databases [3]:",
            "[*] information_schema",
            "[*] mysql",
            "[*] shopfront",
        ],
        objective: Some("obj3"),
    },
    CommandEntry {
        command: "sqlmap --dump",
        summary: "Dump the users table",
        response: &[
            "[INFO] fetching entries for table 'users' in database 'shopfront'",
            "Database: shopfront",
            "Table: users",
            "+----+----------+----------------------------------+",
            "| id | username | password                         |",
            "+----+----------+----------------------------------+",
            "| 1  | admin    | 21232f297a57a5a743894a0e4a801fc3 |",
            "| 2  | jdoe     | 5f4dcc3b5aa765d61d8327deb882cf99 |",
            "+----+----------+----------------------------------+",
        ],
        objective: Some("obj4"),
    },
];

static TABLE: Lazy<HashMap<&'static str, &'static CommandEntry>> =
    Lazy::new(|| ENTRIES.iter().map(|entry| (entry.command, entry)).collect());

/// Normalize raw input for matching
pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// Exact lookup of an already-normalized command
pub fn lookup(normalized: &str) -> Option<&'static CommandEntry> {
    TABLE.get(normalized).copied()
}

/// All recognised commands in table order
pub fn available() -> &'static [CommandEntry] {
    ENTRIES
}

/// Response lines for a recognised command
pub fn response_lines(entry: &CommandEntry) -> Vec<String> {
    if entry.command == "help" {
        return help_lines();
    }
    entry.response.iter().map(|line| line.to_string()).collect()
}

/// The single line printed for anything not in the table
pub fn not_found(original: &str) -> String {
    format!(
        "bash: {}: command not found. Type 'help' to list available commands.",
        original.trim()
    )
}

fn help_lines() -> Vec<String> {
    let mut lines = vec!["Available commands:".to_string()];
    for entry in ENTRIES {
        lines.push(format!("  {:<16} {}", entry.command, entry.summary));
    }
    lines.push(format!("  {:<16} {}", CLEAR, "Clear the terminal"));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize("  SQLMap --DBS \n"), "sqlmap --dbs");
    }

    #[test]
    fn matching_is_exact() {
        assert!(lookup("sqlmap").is_some());
        assert!(lookup("sqlmap --dbs").is_some());
        assert!(lookup("sqlmap  --dbs").is_none());
        assert!(lookup("sqlmap -u http://x").is_none());
    }

    #[test]
    fn sqlmap_completes_obj2() {
        assert_eq!(lookup("sqlmap").and_then(|e| e.objective), Some("obj2"));
    }

    #[test]
    fn bare_curl_fetches_the_landing_page() {
        let entry = lookup(&normalize(" CURL ")).map(response_lines).unwrap_or_default();
        assert_eq!(entry.first().map(String::as_str), Some("HTTP/1.1 200 OK"));
        assert!(lookup("curl target").is_none());
    }

    #[test]
    fn clear_is_not_a_table_entry() {
        assert!(lookup(CLEAR).is_none());
    }

    #[test]
    fn help_lists_every_command() {
        let help = lookup("help").map(response_lines).unwrap_or_default();
        for entry in available() {
            assert!(help.iter().any(|line| line.contains(entry.command)));
        }
        assert!(help.iter().any(|line| line.contains(CLEAR)));
    }

    #[test]
    fn not_found_mentions_original_input() {
        let line = not_found("  Hydra ");
        assert!(line.starts_with("bash: Hydra: command not found"));
        assert!(line.contains("help"));
    }
}
