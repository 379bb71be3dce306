//! Simulated server console.

use serde::Serialize;

const BOOT_LINES: &[&str] = &[
    "[Server] Starting Minecraft server...",
    "[Server] Loading world...",
    "[Server] Server started successfully!",
    "[Server] Ready for players",
];

/// Append-only console output. Lives only as long as the control session.
#[derive(Debug, Clone, Serialize)]
pub struct ConsoleLog {
    lines: Vec<String>,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self {
            lines: BOOT_LINES.iter().map(|line| line.to_string()).collect(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Echo `command` and append its canned response.
    ///
    /// Blank input is ignored and returns `None`; otherwise returns the
    /// response line.
    pub fn execute(&mut self, command: &str, online: usize, max_players: u32) -> Option<&str> {
        if command.trim().is_empty() {
            return None;
        }

        self.lines.push(format!("> {}", command));
        self.lines.push(respond(command, online, max_players));
        self.lines.last().map(String::as_str)
    }
}

impl Default for ConsoleLog {
    fn default() -> Self {
        Self::new()
    }
}

fn respond(command: &str, online: usize, max_players: u32) -> String {
    if command == "help" {
        "[Server] Available commands: stop, list, say, tp, gamemode".to_string()
    } else if command == "list" {
        format!("[Server] Online players: {}/{}", online, max_players)
    } else if let Some(message) = command.strip_prefix("say ") {
        format!("[Server] Broadcast: {}", message)
    } else {
        "[Server] Command executed".to_string()
    }
}
