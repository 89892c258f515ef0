use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionMode {
    /// Goal and Pomodoro driven
    Guided,
    /// Free-form timing
    NonGuided,
}

impl SessionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionMode::Guided => "guided",
            SessionMode::NonGuided => "non-guided",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyGoal {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl StudyGoal {
    pub fn new(text: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            completed: false,
        }
    }
}

/// One study period as persisted under the `sessions` key.
///
/// Timestamps are milliseconds since the Unix epoch; `duration` is elapsed
/// timer seconds. An empty `id` marks a session that has never been saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub mode: SessionMode,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub duration: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub goals: Vec<StudyGoal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pomodoro_count: Option<u32>,
}

impl StudySession {
    pub fn new(name: &str, mode: SessionMode) -> Self {
        Self {
            id: String::new(),
            name: name.to_string(),
            mode,
            created_at: 0,
            updated_at: 0,
            duration: 0,
            goals: Vec::new(),
            description: None,
            reflection: None,
            is_completed: false,
            pomodoro_count: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn goal_mut(&mut self, goal_id: &str) -> Option<&mut StudyGoal> {
        self.goals.iter_mut().find(|g| g.id == goal_id)
    }

    pub fn completed_goal_count(&self) -> usize {
        self.goals.iter().filter(|g| g.completed).count()
    }
}
