//! Line-oriented front end over the registry, control panel and checkout.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt as _, AsyncWrite, AsyncWriteExt as _, BufReader,
};
use tokio::sync::{broadcast, mpsc};

use crate::catalog::{supported_versions, tariffs, TariffPlan};
use crate::checkout::{Checkout, CheckoutOutcome, PaymentCallback, PaymentWidget, Route};
use crate::commands::{Command, USAGE};
use crate::config::PaymentConfig;
use crate::control::{ServerControl, VipSettings};
use crate::error::{AppError, Result};
use crate::notification::Notification;
use crate::registry::{RegistryEvent, RegistryEventReason, ServerRegistry};
use crate::server::{self, ServerRecord};

const PROMPT: &str = "mchost> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Work scheduled by a command to run after a delay.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Deferred {
    Navigate(Route),
    Notify(Notification),
}

/// Receivers the shell loop drains besides its input.
pub struct ShellInbox {
    callbacks: mpsc::UnboundedReceiver<PaymentCallback>,
    deferred: mpsc::UnboundedReceiver<Deferred>,
}

#[derive(Debug, Serialize)]
pub struct AppSnapshot {
    pub servers: Vec<ServerRecord>,
    pub tariffs: &'static [TariffPlan],
    pub versions: Vec<&'static str>,
}

pub fn build_app_snapshot(registry: &ServerRegistry) -> AppSnapshot {
    AppSnapshot {
        servers: server::list_servers(registry),
        tariffs: tariffs(),
        versions: supported_versions(),
    }
}

pub struct Shell {
    registry: Arc<ServerRegistry>,
    checkout: Checkout,
    session: Option<ServerControl>,
    deferred: mpsc::UnboundedSender<Deferred>,
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn render_servers(servers: &[ServerRecord]) -> Vec<String> {
    if servers.is_empty() {
        return vec!["No servers yet. Use `create <name>` to add one.".to_string()];
    }
    servers
        .iter()
        .map(|s| {
            format!(
                "{}  {:<24} {:<8} {:<8} {:>7}  {:<14} {:<8} {}",
                short_id(&s.id),
                s.name,
                s.version,
                s.build.display_name(),
                s.player_count(),
                s.plan,
                s.status,
                s.address
            )
        })
        .collect()
}

fn render_tariff(plan: &TariffPlan) -> String {
    let players = plan
        .max_players
        .map_or_else(|| "unlimited".to_string(), |n| n.to_string());
    let badge = plan.badge.map(|b| format!(" [{}]", b)).unwrap_or_default();
    format!(
        "{:<16} {:<14} {:>5}/mo  {} GB disk, {} GB RAM, CPU {}%, players: {}{}",
        plan.id, plan.name, plan.price, plan.disk_gb, plan.ram_gb, plan.cpu_percent, players, badge
    )
}

fn render_vip(vip: &VipSettings) -> Vec<String> {
    vec![
        format!(
            "dedicated ip:  {}",
            vip.dedicated_ip.as_deref().unwrap_or("not configured")
        ),
        format!("whitelist:     {}", vip.whitelist.join(", ")),
        format!("backups:       {:?}", vip.backup_interval),
        format!("cpu priority:  {}%", vip.cpu_priority.percent()),
        format!("ddos:          {:?}", vip.ddos_protection),
        format!(
            "domain:        {}",
            vip.custom_domain.as_deref().unwrap_or("not configured")
        ),
        format!(
            "advanced:      max {} players, {:?}, {:?}, pvp {}",
            vip.advanced.max_players,
            vip.advanced.difficulty,
            vip.advanced.game_mode,
            if vip.advanced.pvp { "on" } else { "off" }
        ),
    ]
}

impl Shell {
    pub fn new(
        registry: Arc<ServerRegistry>,
        widget: Option<Arc<dyn PaymentWidget>>,
        payment: PaymentConfig,
    ) -> (Self, ShellInbox) {
        let (checkout, callbacks) = Checkout::new(widget, payment);
        let (deferred_tx, deferred) = mpsc::unbounded_channel();
        let shell = Self {
            registry,
            checkout,
            session: None,
            deferred: deferred_tx,
        };
        let inbox = ShellInbox {
            callbacks,
            deferred,
        };
        (shell, inbox)
    }

    fn defer(&self, after: Duration, work: Deferred) {
        let tx = self.deferred.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = tx.send(work);
        });
    }

    #[cfg(test)]
    fn session(&self) -> Option<&ServerControl> {
        self.session.as_ref()
    }

    /// Accept a full id or an unambiguous prefix of one.
    fn resolve_id(&self, input: &str) -> Result<String> {
        let matches: Vec<String> = self
            .registry
            .list()
            .into_iter()
            .map(|s| s.id)
            .filter(|id| id.starts_with(input))
            .collect();
        match matches.as_slice() {
            [id] => Ok(id.clone()),
            [] => Ok(input.to_string()),
            _ if matches.iter().any(|id| id == input) => Ok(input.to_string()),
            _ => Err(AppError::other(format!("ambiguous server id: {}", input))),
        }
    }

    fn session_mut(&mut self) -> Result<&mut ServerControl> {
        self.session
            .as_mut()
            .ok_or_else(|| AppError::other("no control panel open, use `open <id>`"))
    }

    /// Parse and run one input line. Errors are rendered, never returned.
    pub fn handle_line(&mut self, line: &str) -> (Vec<String>, Flow) {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return (Vec::new(), Flow::Continue),
            Err(e) => return (vec![Notification::from(&e).to_string()], Flow::Continue),
        };
        if command == Command::Quit {
            return (Vec::new(), Flow::Quit);
        }
        let output = self.execute(command).unwrap_or_else(|e| {
            log::debug!("Command failed: {}", e);
            vec![Notification::from(&e).to_string()]
        });
        (output, Flow::Continue)
    }

    fn execute(&mut self, command: Command) -> Result<Vec<String>> {
        let ok = |note: Notification| Ok(vec![note.to_string()]);

        match command {
            Command::Help => Ok(USAGE.lines().map(str::to_string).collect()),
            Command::Quit => Ok(Vec::new()),
            Command::Versions => Ok(vec![supported_versions().join(", ")]),
            Command::Tariffs => Ok(tariffs().iter().map(render_tariff).collect()),
            Command::Snapshot => {
                let snapshot = build_app_snapshot(&self.registry);
                Ok(vec![serde_json::to_string_pretty(&snapshot)?])
            }
            Command::Create {
                name,
                version,
                build,
            } => {
                let record = server::create_server(&self.registry, &name, &version, build)?;
                ok(Notification::success(format!(
                    "Server \"{}\" is being created ({})",
                    record.name,
                    short_id(&record.id)
                )))
            }
            Command::List => Ok(render_servers(&server::list_servers(&self.registry))),
            Command::Delete(id) => {
                let id = self.resolve_id(&id)?;
                let record = server::delete_server(&self.registry, &id)?;
                ok(Notification::success(format!(
                    "Server \"{}\" deleted",
                    record.name
                )))
            }
            Command::Power(id) => {
                let id = self.resolve_id(&id)?;
                let status = server::toggle_server_power(&self.registry, &id)?;
                ok(Notification::success(format!("Server is now {}", status)))
            }
            Command::Restart(id) => {
                let id = self.resolve_id(&id)?;
                server::restart_server(&self.registry, &id)?;
                ok(Notification::success("Server is restarting..."))
            }
            Command::Plan { server: id, tariff } => {
                let id = self.resolve_id(&id)?;
                server::change_plan(&self.registry, &id, &tariff)?;
                ok(Notification::success(format!("Plan changed to {}", tariff)))
            }
            Command::Open(id) => {
                let id = self.resolve_id(&id)?;
                let mut control = ServerControl::open(Arc::clone(&self.registry), &id)?;
                let mut lines = render_servers(std::slice::from_ref(control.server()));
                lines.extend(control.console().lines().iter().cloned());
                self.session = Some(control);
                Ok(lines)
            }
            Command::Close => {
                self.session = None;
                Ok(Vec::new())
            }
            Command::Console(text) => {
                let control = self.session_mut()?;
                Ok(control.execute_command(&text).into_iter().collect())
            }
            Command::Log => Ok(self.session_mut()?.console().lines().to_vec()),
            Command::Plugins => Ok(self
                .session_mut()?
                .plugins()
                .iter()
                .map(|p| {
                    format!(
                        "{:<12} {:<10} {:<8} {}",
                        p.name,
                        p.version,
                        if p.enabled { "enabled" } else { "disabled" },
                        p.description
                    )
                })
                .collect()),
            Command::TogglePlugin(name) => ok(self.session_mut()?.toggle_plugin(&name)?),
            Command::Upload(file) => {
                let receipt = self.session_mut()?.upload_build(&file)?;
                self.defer(receipt.after, Deferred::Notify(receipt.completed));
                ok(receipt.started)
            }
            Command::Players => Ok(self
                .session_mut()?
                .players()
                .iter()
                .map(|p| format!("{:<12} {:>4} ms  {}", p.name, p.ping_ms, p.playtime))
                .collect()),
            Command::Player { name, action } => {
                ok(self.session_mut()?.player_action(&name, action)?)
            }
            Command::Files => Ok(self
                .session_mut()?
                .files()
                .iter()
                .map(|f| format!("{:<20} {:>8}  {}", f.name, f.size, f.modified))
                .collect()),
            Command::Vip(None) => Ok(render_vip(self.session_mut()?.vip()?)),
            Command::Vip(Some(update)) => ok(self.session_mut()?.apply_vip(update)?),
            Command::Buy { tariff, nickname } => {
                match self.checkout.checkout(&tariff, &nickname)? {
                    CheckoutOutcome::AlreadyActive(note) => ok(note),
                    CheckoutOutcome::Submitted { invoice_id } => ok(Notification::info(format!(
                        "Invoice {} submitted, waiting for payment",
                        invoice_id
                    ))),
                }
            }
        }
    }

    /// Feed a widget callback through checkout. A requested redirect comes
    /// back through the inbox once its delay elapses.
    pub fn handle_callback(&mut self, callback: PaymentCallback) -> Vec<String> {
        let response = self.checkout.handle_callback(callback);
        if let Some(redirect) = response.redirect {
            self.defer(redirect.after, Deferred::Navigate(redirect.to));
        }
        response
            .notification
            .map(|note| note.to_string())
            .into_iter()
            .collect()
    }

    fn run_deferred(&mut self, work: Deferred) -> Vec<String> {
        match work {
            Deferred::Navigate(route) => self.navigate(route),
            Deferred::Notify(note) => vec![note.to_string()],
        }
    }

    pub fn navigate(&mut self, route: Route) -> Vec<String> {
        match route {
            Route::Home => {
                if let Some(control) = self.session.take() {
                    log::debug!("Closed control panel for server {}", control.server_id());
                }
                render_servers(&server::list_servers(&self.registry))
            }
        }
    }

    fn describe_event(event: &RegistryEvent) -> Option<String> {
        match &event.reason {
            RegistryEventReason::StatusChanged(status) => Some(format!(
                "* server {} is now {}",
                short_id(&event.server_id),
                status
            )),
            RegistryEventReason::Created | RegistryEventReason::Deleted => {
                log::debug!("Registry event {:?} for {}", event.reason, event.server_id);
                None
            }
        }
    }

    /// Run on stdin/stdout until `quit` or end of input.
    pub async fn run(self, inbox: ShellInbox) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        self.run_with(inbox, stdin, tokio::io::stdout()).await
    }

    /// Run against any line source and sink. Pending transitions are
    /// cancelled however the loop ends.
    pub async fn run_with<R, W>(
        mut self,
        mut inbox: ShellInbox,
        mut input: R,
        mut output: W,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let result = self.drive(&mut inbox, &mut input, &mut output).await;
        self.registry.shutdown();
        match &result {
            Ok(()) => log::info!("Shell closed"),
            Err(e) => log::error!("Shell stopped: {}", e),
        }
        result
    }

    async fn drive<R, W>(
        &mut self,
        inbox: &mut ShellInbox,
        input: &mut R,
        output: &mut W,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut events = self.registry.subscribe();
        let mut buf = Vec::new();

        write_text(output, PROMPT).await?;

        loop {
            // `from_input` answers a typed line; background output without
            // any lines is not worth a fresh prompt.
            let (lines, flow, from_input) = tokio::select! {
                read = input.read_until(b'\n', &mut buf) => {
                    if read? == 0 {
                        (Vec::new(), Flow::Quit, true)
                    } else {
                        let line = decode_line(&buf);
                        buf.clear();
                        let (lines, flow) = self.handle_line(&line);
                        (lines, flow, true)
                    }
                }
                Some(callback) = inbox.callbacks.recv() => {
                    (self.handle_callback(callback), Flow::Continue, false)
                }
                Some(work) = inbox.deferred.recv() => {
                    (self.run_deferred(work), Flow::Continue, false)
                }
                event = events.recv() => match event {
                    Ok(event) => {
                        let lines: Vec<String> = Self::describe_event(&event).into_iter().collect();
                        (lines, Flow::Continue, false)
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        log::warn!("Registry event listener lagged, skipped {} events", skipped);
                        (Vec::new(), Flow::Continue, false)
                    }
                    Err(broadcast::error::RecvError::Closed) => (Vec::new(), Flow::Quit, false),
                },
            };

            if lines.is_empty() && !from_input && flow == Flow::Continue {
                continue;
            }

            let mut text = String::new();
            for line in lines {
                text.push_str(&line);
                text.push('\n');
            }
            if flow == Flow::Quit {
                write_text(output, &text).await?;
                return Ok(());
            }
            text.push_str(PROMPT);
            write_text(output, &text).await?;
        }
    }
}

/// Undecodable bytes become U+FFFD so one bad line cannot stop the shell.
fn decode_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(['\n', '\r'])
        .to_string()
}

async fn write_text<W>(output: &mut W, text: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}
