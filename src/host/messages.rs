use crate::models::{BlockedSite, SessionMode, Settings, SettingsPatch, StudyMaterial, StudySession};
use crate::session::ActiveSessionView;
use crate::timer::TimerMode;
use serde::{Deserialize, Serialize};

/// Requests from the front end.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomingMessage {
    ListSessions {
        #[serde(default)]
        mode: Option<SessionMode>,
        #[serde(default)]
        limit: Option<usize>,
    },
    /// Most recently updated sessions first
    RecentSessions {
        #[serde(default)]
        limit: Option<usize>,
    },
    GetSession { id: String },
    SaveSession { session: StudySession },
    DeleteSession { id: String },
    GetSettings,
    UpdateSettings { patch: SettingsPatch },
    ResetSettings,
    ListBlockedSites,
    AddBlockedSite { name: String, url: String },
    ToggleBlockedSite { id: u64 },
    RemoveBlockedSite { id: u64 },
    CheckSite { url: String },
    /// Begin a new session, or continue a stored one when `resume_id` is
    /// given. A resumed session keeps its stored mode.
    StartSession {
        mode: SessionMode,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        resume_id: Option<String>,
    },
    ToggleTimer {
        #[serde(default)]
        timer: Option<TimerMode>,
    },
    AddGoal { text: String },
    ToggleGoal { id: String },
    RemoveGoal { id: String },
    UpdateNotes {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        reflection: Option<String>,
    },
    ListMaterials,
    AddMaterial { name: String, url: String },
    RemoveMaterial { id: u64 },
    SaveActiveSession,
    FinishSession,
    SessionState,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingMessage {
    Sessions { sessions: Vec<StudySession> },
    /// `None` when the requested session does not exist
    Session { session: Option<StudySession> },
    Deleted { deleted: bool },
    Settings { settings: Settings },
    BlockedSites { sites: Vec<BlockedSite> },
    /// `None` when the site id is unknown
    BlockedSite { site: Option<BlockedSite> },
    SiteStatus { url: String, blocked: bool },
    Materials { materials: Vec<StudyMaterial> },
    Material { material: StudyMaterial },
    /// `None` when no session is active
    ActiveSession { state: Option<ActiveSessionView> },
    Error { message: String },
}

impl OutgoingMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }
}
