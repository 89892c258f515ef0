//! Length-prefixed JSON message host.
//!
//! Each frame is a 4-byte little-endian length followed by a UTF-8 JSON
//! body, the framing browser extensions use for native messaging. Every
//! request gets exactly one response.

pub mod messages;

pub use messages::{IncomingMessage, OutgoingMessage};

use crate::blocker::DistractionList;
use crate::constants::{DEFAULT_RECENT_LIMIT, MAX_MESSAGE_SIZE, TICK_INTERVAL};
use crate::error::AppError;
use crate::models::{SessionMode, Settings, StudySession};
use crate::session::{default_timer_mode, ActiveSession};
use crate::sessions::SessionStore;
use crate::settings::SettingsStore;
use crate::storage::Storage;
use crate::timer::{TimerEvent, TimerMode};
use crate::validation::validate_session_name;
use log::{error, info, warn};
use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub struct Host {
    sessions: SessionStore,
    settings: SettingsStore,
    blocker: DistractionList,
    active: Option<ActiveSession>,
    /// Timer events not yet reported to the front end
    pending_events: Vec<TimerEvent>,
    tick_interval: Duration,
}

impl Host {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            sessions: SessionStore::new(Arc::clone(&storage)),
            settings: SettingsStore::new(storage),
            blocker: DistractionList::with_defaults(),
            active: None,
            pending_events: Vec::new(),
            tick_interval: TICK_INTERVAL,
        }
    }

    /// Use a different timer tick length.
    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Serve requests until the reader reaches end of input.
    ///
    /// Frames are read on a separate thread so timer progress is folded in
    /// and saved while the front end is quiet. An active session is saved
    /// before returning.
    pub fn run<R, W>(&mut self, reader: R, writer: &mut W) -> io::Result<()>
    where
        R: Read + Send + 'static,
        W: Write,
    {
        let requests = spawn_reader(reader);
        let result = self.serve(&requests, writer);
        if let Some(active) = self.active.as_mut() {
            if let Err(e) = active.stop(&self.sessions) {
                error!("Failed to save active session on shutdown: {e}");
            }
        }
        result
    }

    /// Answer frames from `requests` until its sender hangs up.
    ///
    /// Between requests the active session is pumped once per tick interval.
    pub fn serve<W: Write>(
        &mut self,
        requests: &Receiver<io::Result<Vec<u8>>>,
        writer: &mut W,
    ) -> io::Result<()> {
        loop {
            match requests.recv_timeout(self.tick_interval) {
                Ok(Ok(body)) => {
                    let response = self.handle_frame(&body);
                    write_message(writer, &response)?;
                }
                Ok(Err(e)) => return Err(e),
                Err(RecvTimeoutError::Timeout) => self.pump_active(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!("Input closed, host exiting");
        Ok(())
    }

    /// Decode and answer one request body. Malformed bodies get an error reply.
    pub fn handle_frame(&mut self, body: &[u8]) -> OutgoingMessage {
        match serde_json::from_slice::<IncomingMessage>(body) {
            Ok(message) => self.handle_message(message),
            Err(e) => {
                warn!("Rejected malformed message: {e}");
                OutgoingMessage::error(format!("Malformed message: {e}"))
            }
        }
    }

    pub fn handle_message(&mut self, message: IncomingMessage) -> OutgoingMessage {
        // Fold in timer progress before anything reads session state
        self.pump_active();
        self.dispatch(message).unwrap_or_else(OutgoingMessage::error)
    }

    fn pump_active(&mut self) {
        if let Some(active) = self.active.as_mut() {
            match active.pump(&self.sessions) {
                Ok(events) => self.pending_events.extend(events),
                Err(e) => error!("Failed to save active session: {e}"),
            }
        }
    }

    fn dispatch(&mut self, message: IncomingMessage) -> Result<OutgoingMessage, AppError> {
        match message {
            IncomingMessage::ListSessions { mode, limit } => {
                let sessions = match (mode, limit) {
                    (None, None) => self.sessions.list_all()?,
                    (Some(mode), None) => self.sessions.list_by_mode(mode)?,
                    (mode, Some(limit)) => self.sessions.list_recent_filtered(mode, limit)?,
                };
                Ok(OutgoingMessage::Sessions { sessions })
            }
            IncomingMessage::RecentSessions { limit } => Ok(OutgoingMessage::Sessions {
                sessions: self.sessions.list_recent(limit.unwrap_or(DEFAULT_RECENT_LIMIT))?,
            }),
            IncomingMessage::GetSession { id } => Ok(OutgoingMessage::Session {
                session: self.sessions.get(&id)?,
            }),
            IncomingMessage::SaveSession { session } => Ok(OutgoingMessage::Session {
                session: Some(self.sessions.save(&session)?),
            }),
            IncomingMessage::DeleteSession { id } => {
                let deleted = self.sessions.delete(&id)?;
                if self.active.as_ref().is_some_and(|a| a.session().id == id) {
                    info!("Deleted the active session {id}");
                    self.active = None;
                    self.pending_events.clear();
                }
                Ok(OutgoingMessage::Deleted { deleted })
            }
            IncomingMessage::GetSettings => Ok(OutgoingMessage::Settings {
                settings: self.settings.load(),
            }),
            IncomingMessage::UpdateSettings { patch } => {
                let settings = self.settings.update(&patch)?;
                Ok(self.settings_changed(settings))
            }
            IncomingMessage::ResetSettings => {
                let settings = self.settings.reset()?;
                Ok(self.settings_changed(settings))
            }
            IncomingMessage::ListBlockedSites => Ok(OutgoingMessage::BlockedSites {
                sites: self.blocker.sites().to_vec(),
            }),
            IncomingMessage::AddBlockedSite { name, url } => Ok(OutgoingMessage::BlockedSite {
                site: Some(self.blocker.add(&name, &url)?),
            }),
            IncomingMessage::ToggleBlockedSite { id } => Ok(OutgoingMessage::BlockedSite {
                site: self.blocker.toggle(id),
            }),
            IncomingMessage::RemoveBlockedSite { id } => Ok(OutgoingMessage::Deleted {
                deleted: self.blocker.remove(id),
            }),
            IncomingMessage::CheckSite { url } => {
                let blocked = self.blocker.is_blocked(&url);
                Ok(OutgoingMessage::SiteStatus { url, blocked })
            }
            IncomingMessage::StartSession { mode, name, resume_id } => {
                self.start_session(mode, name.as_deref(), resume_id.as_deref())?;
                Ok(self.active_state())
            }
            IncomingMessage::ToggleTimer { timer } => {
                let active = require_active(&mut self.active)?;
                let mode = timer.unwrap_or_else(|| default_timer_mode(active.session().mode));
                active.toggle_timer(mode, &self.sessions)?;
                Ok(self.active_state())
            }
            IncomingMessage::AddGoal { text } => {
                require_active(&mut self.active)?.add_goal(&text, &self.sessions)?;
                Ok(self.active_state())
            }
            IncomingMessage::ToggleGoal { id } => {
                require_active(&mut self.active)?.toggle_goal(&id, &self.sessions)?;
                Ok(self.active_state())
            }
            IncomingMessage::RemoveGoal { id } => {
                require_active(&mut self.active)?.remove_goal(&id, &self.sessions)?;
                Ok(self.active_state())
            }
            IncomingMessage::UpdateNotes { name, description, reflection } => {
                require_active(&mut self.active)?.update_notes(
                    name.as_deref(),
                    description.as_deref(),
                    reflection.as_deref(),
                )?;
                Ok(self.active_state())
            }
            IncomingMessage::ListMaterials => Ok(OutgoingMessage::Materials {
                materials: require_active(&mut self.active)?.materials().to_vec(),
            }),
            IncomingMessage::AddMaterial { name, url } => Ok(OutgoingMessage::Material {
                material: require_active(&mut self.active)?.add_material(&name, &url)?,
            }),
            IncomingMessage::RemoveMaterial { id } => Ok(OutgoingMessage::Deleted {
                deleted: require_active(&mut self.active)?.remove_material(id),
            }),
            IncomingMessage::SaveActiveSession => {
                require_active(&mut self.active)?.save(&self.sessions)?;
                Ok(self.active_state())
            }
            IncomingMessage::FinishSession => {
                let session = require_active(&mut self.active)?.finish(&self.sessions)?;
                self.active = None;
                self.pending_events.clear();
                Ok(OutgoingMessage::Session { session: Some(session) })
            }
            IncomingMessage::SessionState => Ok(self.active_state()),
        }
    }

    fn start_session(
        &mut self,
        mode: SessionMode,
        name: Option<&str>,
        resume_id: Option<&str>,
    ) -> Result<(), AppError> {
        let session = match resume_id {
            Some(id) => self
                .sessions
                .get(id)?
                .ok_or(AppError::NotFound { entity: "Session" })?,
            None => StudySession::new(&validate_session_name(name.unwrap_or_default())?, mode),
        };

        // The previous session is only replaced once it has been saved
        if let Some(previous) = self.active.as_mut() {
            previous.stop(&self.sessions)?;
        }
        self.pending_events.clear();

        let settings = self.settings.load();
        info!("Starting {} session '{}'", session.mode.as_str(), session.name);
        self.active = Some(ActiveSession::resume(session, &settings, self.tick_interval));
        Ok(())
    }

    fn settings_changed(&mut self, settings: Settings) -> OutgoingMessage {
        if let Some(active) = self.active.as_mut() {
            active.apply_settings(&settings);
        }
        OutgoingMessage::Settings { settings }
    }

    fn active_state(&mut self) -> OutgoingMessage {
        let events = std::mem::take(&mut self.pending_events);
        OutgoingMessage::ActiveSession {
            state: self.active.as_ref().map(|a| a.view(events)),
        }
    }

    pub fn active_timer(&self) -> Option<TimerMode> {
        self.active.as_ref().and_then(ActiveSession::active_timer)
    }
}

fn require_active(active: &mut Option<ActiveSession>) -> Result<&mut ActiveSession, AppError> {
    active
        .as_mut()
        .ok_or_else(|| AppError::InvalidState("no active session".into()))
}

/// Read frames on a background thread. The returned channel closes at end
/// of input; a read error is sent once and ends the thread.
pub fn spawn_reader<R: Read + Send + 'static>(mut reader: R) -> Receiver<io::Result<Vec<u8>>> {
    let (frames, receiver) = mpsc::channel();
    thread::spawn(move || loop {
        let frame = match read_frame(&mut reader) {
            Ok(Some(body)) => Ok(body),
            Ok(None) => break,
            Err(e) => Err(e),
        };
        let failed = frame.is_err();
        if frames.send(frame).is_err() || failed {
            break;
        }
    });
    receiver
}

/// Read one frame body. Returns `None` on a clean end of input.
pub fn read_frame<R: Read>(reader: &mut R) -> io::Result<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; 4];
    let mut filled = 0;
    while let Some(rest) = len_bytes.get_mut(filled..) {
        if rest.is_empty() {
            break;
        }
        match reader.read(rest) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed inside a length prefix",
                ))
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }

    let len = usize::try_from(u32::from_le_bytes(len_bytes))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if len > MAX_MESSAGE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Message too large: {len} bytes (max: {MAX_MESSAGE_SIZE} bytes)"),
        ));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(Some(body))
}

/// Write one frame. A reply over the size limit is replaced by an error reply.
pub fn write_message<W: Write>(writer: &mut W, message: &OutgoingMessage) -> io::Result<()> {
    let mut json = serde_json::to_vec(message)?;
    if json.len() > MAX_MESSAGE_SIZE {
        warn!("Reply of {} bytes exceeds the message limit", json.len());
        json = serde_json::to_vec(&OutgoingMessage::error(format!(
            "Response too large: {} bytes (max: {MAX_MESSAGE_SIZE} bytes)",
            json.len()
        )))?;
    }
    let len = u32::try_from(json.len())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&json)?;
    writer.flush()
}
