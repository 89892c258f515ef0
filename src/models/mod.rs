pub mod study_session;
pub mod blocked_site;
pub mod settings;
pub mod study_material;

pub use study_session::{SessionMode, StudyGoal, StudySession};
pub use blocked_site::BlockedSite;
pub use study_material::StudyMaterial;
pub use settings::{PomodoroSettings, PomodoroSettingsPatch, Settings, SettingsPatch};
