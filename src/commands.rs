//! Shell command parsing.

use crate::catalog::{latest_version, BuildVariant};
use crate::control::{
    AdvancedSettings, BackupInterval, CpuPriority, DdosProtection, Difficulty, GameMode,
    PlayerAction, VipUpdate,
};
use crate::error::{AppError, Result};

pub const USAGE: &str = "\
Servers:
  create <name> [--version <v>] [--build <b>]   create a server
  list                                          list servers
  delete <id>                                   delete a server
  power <id>                                    toggle power
  restart <id>                                  restart a server
  plan <id> <tariff>                            move a server to a tariff
  open <id> | close                             open/close the control panel
Control panel:
  console <command>    run a console command
  log                  show console output
  plugins              list plugins
  plugin <name>        toggle a plugin
  upload <file>        upload a server build (.jar/.zip)
  players              list online players
  player <name> <donate|op|ban|unban>
  files                list server files
  vip                  show VIP settings
  vip <ip|whitelist|domain|backup|cpu|ddos> <value>
  vip advanced <max_players> <difficulty> <game_mode> <pvp on|off>
Catalog and billing:
  versions | tariffs
  buy <tariff> <nickname>
Other:
  snapshot | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Versions,
    Tariffs,
    Snapshot,
    Create {
        name: String,
        version: String,
        build: BuildVariant,
    },
    List,
    Delete(String),
    Power(String),
    Restart(String),
    Plan { server: String, tariff: String },
    Open(String),
    Close,
    Console(String),
    Log,
    Plugins,
    TogglePlugin(String),
    Upload(String),
    Players,
    Player { name: String, action: PlayerAction },
    Files,
    Vip(Option<VipUpdate>),
    Buy { tariff: String, nickname: String },
}

fn usage_error(usage: &str) -> AppError {
    AppError::other(format!("usage: {}", usage))
}

fn single_arg(args: &[&str], usage: &str) -> Result<String> {
    match args {
        [arg] => Ok((*arg).to_string()),
        _ => Err(usage_error(usage)),
    }
}

fn parse_create(args: &[&str]) -> Result<Command> {
    let mut name_parts = Vec::new();
    let mut version = latest_version().to_string();
    let mut build = BuildVariant::Vanilla;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match *arg {
            "--version" => {
                version = iter
                    .next()
                    .ok_or_else(|| usage_error("create <name> --version <v>"))?
                    .to_string();
            }
            "--build" => {
                let value = iter
                    .next()
                    .ok_or_else(|| usage_error("create <name> --build <b>"))?;
                build = BuildVariant::parse(value)?;
            }
            other => name_parts.push(other),
        }
    }

    Ok(Command::Create {
        name: name_parts.join(" "),
        version,
        build,
    })
}

fn parse_vip(args: &[&str]) -> Result<Command> {
    let Some((setting, rest)) = args.split_first() else {
        return Ok(Command::Vip(None));
    };
    let value = rest.join(" ");
    let invalid = || AppError::other(format!("invalid value for {}: {}", setting, value));

    let update = match *setting {
        "ip" => VipUpdate::DedicatedIp(rest.join(" ")),
        "whitelist" => VipUpdate::Whitelist(rest.join(" ")),
        "domain" => VipUpdate::CustomDomain(rest.join(" ")),
        "backup" => {
            VipUpdate::BackupInterval(BackupInterval::parse(&value).ok_or_else(invalid)?)
        }
        "cpu" => VipUpdate::CpuPriority(CpuPriority::parse(&value).ok_or_else(invalid)?),
        "ddos" => {
            VipUpdate::DdosProtection(DdosProtection::parse(&value).ok_or_else(invalid)?)
        }
        "advanced" => {
            let [max_players, difficulty, game_mode, pvp] = rest else {
                return Err(usage_error(
                    "vip advanced <max_players> <difficulty> <game_mode> <pvp on|off>",
                ));
            };
            VipUpdate::Advanced(AdvancedSettings {
                max_players: max_players.parse().map_err(|_| invalid())?,
                difficulty: Difficulty::parse(difficulty).ok_or_else(invalid)?,
                game_mode: GameMode::parse(game_mode).ok_or_else(invalid)?,
                pvp: match *pvp {
                    "on" => true,
                    "off" => false,
                    _ => return Err(invalid()),
                },
            })
        }
        _ => {
            return Err(usage_error(
                "vip <ip|whitelist|domain|backup|cpu|ddos|advanced> <value>",
            ))
        }
    };
    Ok(Command::Vip(Some(update)))
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match head {
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            "versions" => Self::Versions,
            "tariffs" => Self::Tariffs,
            "snapshot" => Self::Snapshot,
            "create" => parse_create(&args)?,
            "list" | "ls" => Self::List,
            "delete" | "rm" => Self::Delete(single_arg(&args, "delete <id>")?),
            "power" => Self::Power(single_arg(&args, "power <id>")?),
            "restart" => Self::Restart(single_arg(&args, "restart <id>")?),
            "plan" => match args.as_slice() {
                [server, tariff] => Self::Plan {
                    server: (*server).to_string(),
                    tariff: (*tariff).to_string(),
                },
                _ => return Err(usage_error("plan <id> <tariff>")),
            },
            "open" => Self::Open(single_arg(&args, "open <id>")?),
            "close" => Self::Close,
            // Console input is passed through untrimmed past the keyword.
            "console" => Self::Console(
                line.trim_start()
                    .strip_prefix("console")
                    .map(|rest| {
                        let mut chars = rest.chars();
                        match chars.next() {
                            Some(sep) if sep.is_whitespace() => chars.as_str(),
                            _ => rest,
                        }
                    })
                    .unwrap_or_default()
                    .to_string(),
            ),
            "log" => Self::Log,
            "plugins" => Self::Plugins,
            "plugin" => Self::TogglePlugin(single_arg(&args, "plugin <name>")?),
            "upload" => Self::Upload(args.join(" ")),
            "players" => Self::Players,
            "player" => match args.as_slice() {
                [name, action] => Self::Player {
                    name: (*name).to_string(),
                    action: PlayerAction::parse(action)
                        .ok_or_else(|| usage_error("player <name> <donate|op|ban|unban>"))?,
                },
                _ => return Err(usage_error("player <name> <donate|op|ban|unban>")),
            },
            "files" => Self::Files,
            "vip" => parse_vip(&args)?,
            "buy" => match args.as_slice() {
                [tariff, nickname @ ..] => Self::Buy {
                    tariff: (*tariff).to_string(),
                    nickname: nickname.join(" "),
                },
                [] => return Err(usage_error("buy <tariff> <nickname>")),
            },
            other => return Err(AppError::other(format!("unknown command: {}", other))),
        };
        Ok(Some(command))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Command::parse(line).expect("parse").expect("command")
    }

    #[test]
    fn blank_line_is_no_command() {
        assert_eq!(Command::parse("   ").expect("parse"), None);
    }

    #[test]
    fn create_collects_name_and_flags() {
        assert_eq!(
            parse("create My Lobby --version 1.19.4 --build paper"),
            Command::Create {
                name: "My Lobby".to_string(),
                version: "1.19.4".to_string(),
                build: BuildVariant::Paper,
            }
        );
        assert_eq!(
            parse("create Solo"),
            Command::Create {
                name: "Solo".to_string(),
                version: "1.20.4".to_string(),
                build: BuildVariant::Vanilla,
            }
        );
    }

    #[test]
    fn create_without_name_still_parses() {
        // Name validation belongs to the registry, not the parser.
        assert!(matches!(parse("create"), Command::Create { name, .. } if name.is_empty()));
    }

    #[test]
    fn console_keeps_text_after_keyword() {
        assert_eq!(
            parse("console say hello  world"),
            Command::Console("say hello  world".to_string())
        );
        assert_eq!(parse("console"), Command::Console(String::new()));
        assert_eq!(parse("console\tsay hi"), Command::Console("say hi".to_string()));
        assert_eq!(parse("  console  x"), Command::Console(" x".to_string()));
    }

    #[test]
    fn vip_updates_are_typed() {
        assert_eq!(
            parse("vip cpu 75"),
            Command::Vip(Some(VipUpdate::CpuPriority(CpuPriority::High)))
        );
        assert_eq!(parse("vip"), Command::Vip(None));
        assert!(Command::parse("vip backup weekly").is_err());
        assert!(Command::parse("vip advanced 10 hard creative maybe").is_err());
    }

    #[test]
    fn bad_arity_and_unknown_commands_fail() {
        assert!(Command::parse("delete").is_err());
        assert!(Command::parse("player Steve").is_err());
        assert!(Command::parse("launch").is_err());
    }
}
