use std::{io::Write, net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use gateway::ActuatorGateway;
use shared::{
    domain::{ActuatorState, Mode},
    protocol::parse_mode_line,
};
use thiserror::Error;
use tokio::{
    sync::mpsc,
    time::{sleep_until, Instant},
};
use tracing::{info, warn};

use crate::{
    debounce::{DebounceTimings, KeyDebouncer},
    normalizer::normalize,
    session::Session,
};

const EVENT_QUEUE_CAPACITY: usize = 256;
const CTRL_C: char = '\u{3}';
const CARRIAGE_RETURN: char = '\r';

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start web interface: {0}")]
    WebStartup(#[source] std::io::Error),
}

/// Starts the web front end. Must not report success before it is listening.
#[async_trait]
pub trait WebFrontEnd: Send + Sync {
    async fn start(&self) -> std::io::Result<SocketAddr>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// One decoded console character.
    Input(char),
    /// A slash command submitted by the web front end.
    Command(String),
    Shutdown,
}

/// Cloneable sender side of the engine's event queue.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineEvent>,
}

impl EngineHandle {
    pub fn channel() -> (Self, mpsc::Receiver<EngineEvent>) {
        let (tx, rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        (Self { tx }, rx)
    }

    /// Returns false once the engine has stopped.
    pub async fn send_input(&self, ch: char) -> bool {
        self.tx.send(EngineEvent::Input(ch)).await.is_ok()
    }

    pub async fn submit_command(&self, text: impl Into<String>) -> bool {
        self.tx.send(EngineEvent::Command(text.into())).await.is_ok()
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(EngineEvent::Shutdown).await;
    }
}

enum Flow {
    Continue,
    Exit,
}

/// Owns all dispatch state and processes events one at a time.
pub struct Engine {
    session: Session,
    debouncer: KeyDebouncer,
    line: String,
    gateway: Arc<dyn ActuatorGateway>,
    web: Arc<dyn WebFrontEnd>,
    console: Box<dyn Write + Send>,
}

impl Engine {
    pub fn new(
        gateway: Arc<dyn ActuatorGateway>,
        web: Arc<dyn WebFrontEnd>,
        console: Box<dyn Write + Send>,
        timings: DebounceTimings,
    ) -> Self {
        Self {
            session: Session::new(),
            debouncer: KeyDebouncer::new(timings),
            line: String::new(),
            gateway,
            web,
            console,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Runs until Ctrl-C, an explicit shutdown, or every handle is dropped.
    ///
    /// Timer firings and events share this one task, so arming or replacing
    /// the timer slot can never interleave with another handler.
    pub async fn run(mut self, mut events: mpsc::Receiver<EngineEvent>) -> Result<(), EngineError> {
        loop {
            let deadline = self.debouncer.deadline();
            tokio::select! {
                biased;
                _ = wait_for(deadline) => self.fire_timer(),
                event = events.recv() => {
                    let Some(event) = event else {
                        return Ok(());
                    };
                    if let Flow::Exit = self.handle_event(event).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    async fn handle_event(&mut self, event: EngineEvent) -> Result<Flow, EngineError> {
        match event {
            EngineEvent::Input(CTRL_C) | EngineEvent::Shutdown => {
                info!("terminating");
                Ok(Flow::Exit)
            }
            EngineEvent::Input(CARRIAGE_RETURN) => {
                self.write_console("\r\n");
                self.submit_line().await?;
                Ok(Flow::Continue)
            }
            EngineEvent::Input(ch) => {
                self.on_char(ch);
                Ok(Flow::Continue)
            }
            EngineEvent::Command(text) => {
                self.submit_command(&text);
                Ok(Flow::Continue)
            }
        }
    }

    fn on_char(&mut self, ch: char) {
        if !self.session.is_ready() {
            self.session.push_char(ch);
            let mut encoded = [0u8; 4];
            self.write_console(ch.encode_utf8(&mut encoded));
            return;
        }

        self.line.push(ch);
        if self.session.mode() == Mode::Cli {
            if let Some(state) = self.debouncer.on_key(ch, Instant::now()) {
                self.dispatch(state);
            }
        }
    }

    async fn submit_line(&mut self) -> Result<(), EngineError> {
        if self.session.is_ready() {
            let line = std::mem::take(&mut self.line);
            let tag = self.session.mode().tag();
            self.write_console(&format!("[{tag}] {line}\r\n"));
            if line.starts_with('/') {
                self.submit_command(&line);
            }
            return Ok(());
        }

        let line = self.session.take_buffer();
        match parse_mode_line(&line) {
            Ok(None) => Ok(()),
            Ok(Some(mode)) => self.activate(mode).await,
            Err(err) => {
                warn!(%err, "[IMP] mode selection failed");
                self.write_console(&format!("[IMP] {err}\r\n"));
                Ok(())
            }
        }
    }

    async fn activate(&mut self, mode: Mode) -> Result<(), EngineError> {
        match mode {
            Mode::Web => {
                info!("[IMP] Loading web server interface...");
                let addr = self.web.start().await.map_err(EngineError::WebStartup)?;
                info!(%addr, "[IMP] web interface listening");
            }
            Mode::Cli => info!("[IMP] Command line interface started."),
            Mode::Unselected => return Ok(()),
        }

        if let Err(err) = self.session.lock_mode(mode) {
            warn!(%err, "[IMP] mode change ignored");
        }
        Ok(())
    }

    fn submit_command(&mut self, text: &str) {
        match normalize(&self.session, text) {
            Ok(state) => self.dispatch(state),
            Err(err) => warn!(command = text.trim(), %err, "command dropped"),
        }
    }

    fn fire_timer(&mut self) {
        if let Some(state) = self.debouncer.fire() {
            self.dispatch(state);
        }
    }

    fn dispatch(&self, state: ActuatorState) {
        match state {
            ActuatorState::On => info!("turning on LED"),
            ActuatorState::Off => info!("turning off LED"),
        }

        let gateway = Arc::clone(&self.gateway);
        tokio::spawn(async move {
            match gateway.set_state(state).await {
                Ok(body) => info!(?state, "[SERVER] {body}"),
                Err(err) => warn!(?state, %err, "[SERVER] actuator request failed"),
            }
        });
    }

    fn write_console(&mut self, text: &str) {
        let _ = self.console.write_all(text.as_bytes());
        let _ = self.console.flush();
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "tests/engine_tests.rs"]
mod tests;
