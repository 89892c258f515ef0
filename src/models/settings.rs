use crate::constants::{
    DEFAULT_LONG_BREAK_INTERVAL, DEFAULT_LONG_BREAK_SECS, DEFAULT_SHORT_BREAK_SECS,
    DEFAULT_STANDARD_TIMER_SECS, DEFAULT_WORK_SECS,
};
use serde::{Deserialize, Serialize};

/// Pomodoro durations in seconds.
///
/// Missing fields in stored JSON fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PomodoroSettings {
    pub work_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
    /// Work phases completed before a long break
    pub long_break_interval: u32,
}

impl Default for PomodoroSettings {
    fn default() -> Self {
        Self {
            work_duration: DEFAULT_WORK_SECS,
            short_break_duration: DEFAULT_SHORT_BREAK_SECS,
            long_break_duration: DEFAULT_LONG_BREAK_SECS,
            long_break_interval: DEFAULT_LONG_BREAK_INTERVAL,
        }
    }
}

impl PomodoroSettings {
    pub fn apply(&mut self, patch: &PomodoroSettingsPatch) {
        if let Some(v) = patch.work_duration {
            self.work_duration = v;
        }
        if let Some(v) = patch.short_break_duration {
            self.short_break_duration = v;
        }
        if let Some(v) = patch.long_break_duration {
            self.long_break_duration = v;
        }
        if let Some(v) = patch.long_break_interval {
            self.long_break_interval = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub show_tips_on_homepage: bool,
    pub auto_start_timers: bool,
    /// Standard countdown length in seconds
    pub standard_timer_duration: u32,
    pub pomodoro_settings: PomodoroSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_tips_on_homepage: true,
            auto_start_timers: true,
            standard_timer_duration: DEFAULT_STANDARD_TIMER_SECS,
            pomodoro_settings: PomodoroSettings::default(),
        }
    }
}

impl Settings {
    /// Merge the provided fields, leaving everything else untouched.
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.show_tips_on_homepage {
            self.show_tips_on_homepage = v;
        }
        if let Some(v) = patch.auto_start_timers {
            self.auto_start_timers = v;
        }
        if let Some(v) = patch.standard_timer_duration {
            self.standard_timer_duration = v;
        }
        if let Some(pomodoro) = &patch.pomodoro_settings {
            self.pomodoro_settings.apply(pomodoro);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_break_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_break_interval: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_tips_on_homepage: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_start_timers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_timer_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pomodoro_settings: Option<PomodoroSettingsPatch>,
}
