//! The session currently being studied.
//!
//! [`ActiveSession`] owns a draft [`StudySession`] and the one timer that
//! measures it. Timer events arrive over a channel and are folded into the
//! draft by [`ActiveSession::pump`].

use crate::constants::AUTOSAVE_INTERVAL_SECS;
use crate::error::AppError;
use crate::materials::MaterialList;
use crate::models::{SessionMode, Settings, StudyGoal, StudyMaterial, StudySession};
use crate::sessions::SessionStore;
use crate::timer::{Phase, Timer, TimerConfig, TimerEvent, TimerMode, TimerService, TimerSnapshot};
use crate::validation::{validate_goal_text, validate_notes, validate_session_name};
use log::{info, warn};
use serde::Serialize;
use std::sync::mpsc::Receiver;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSessionView {
    pub session: StudySession,
    pub timer: TimerSnapshot,
    pub materials: Vec<StudyMaterial>,
    /// Timer events since the previous view
    pub events: Vec<TimerEvent>,
}

pub struct ActiveSession {
    session: StudySession,
    settings: Settings,
    timer: TimerService,
    events: Receiver<TimerEvent>,
    materials: MaterialList,
    /// Ticks folded in since the last save
    unsaved_secs: u64,
}

impl ActiveSession {
    /// A fresh, unsaved session.
    pub fn start(mode: SessionMode, name: &str, settings: &Settings, tick_interval: Duration) -> Self {
        Self::resume(StudySession::new(name, mode), settings, tick_interval)
    }

    /// Continue a stored session, keeping its elapsed time. Its cycle count
    /// seeds the Pomodoro timer whenever that timer is switched to.
    pub fn resume(session: StudySession, settings: &Settings, tick_interval: Duration) -> Self {
        let mode = default_timer_mode(session.mode);
        let timer = Timer::new(TimerConfig::from_settings(mode, settings));
        let (timer, events) = TimerService::new(timer, tick_interval);

        Self {
            session,
            settings: settings.clone(),
            timer,
            events,
            materials: MaterialList::default(),
            unsaved_secs: 0,
        }
    }

    pub fn session(&self) -> &StudySession {
        &self.session
    }

    pub fn timer(&self) -> TimerSnapshot {
        self.timer.snapshot()
    }

    /// The running timer's mode, if any. Only one timer runs at a time.
    pub fn active_timer(&self) -> Option<TimerMode> {
        let snapshot = self.timer.snapshot();
        snapshot.running.then_some(snapshot.mode)
    }

    /// Start or stop the given timer.
    ///
    /// Toggling the running timer pauses it. Toggling a different mode stops
    /// the current timer and starts the requested one. An unsaved session is
    /// saved before its timer first starts. Returns whether a timer is now
    /// running.
    pub fn toggle_timer(&mut self, mode: TimerMode, store: &SessionStore) -> Result<bool, AppError> {
        self.check_timer_mode(mode)?;

        if let Some(active) = self.active_timer() {
            self.timer.pause();
            self.drain(store)?;
            if active == mode {
                self.save(store)?;
                return Ok(false);
            }
        }

        let current = self.timer.snapshot();
        if current.mode != mode {
            self.timer.reconfigure(TimerConfig::from_settings(mode, &self.settings))?;
            if mode == TimerMode::Pomodoro {
                // Keep the long-break cadence of earlier sittings
                self.timer
                    .set_completed_cycles(self.session.pomodoro_count.unwrap_or(0))?;
            }
        } else if mode.is_countdown() && current.remaining == 0 {
            self.timer.reset();
        }

        if !self.session.is_persisted() {
            self.save(store)?;
        }
        self.timer.start()?;
        Ok(true)
    }

    /// Fold pending timer events into the draft and save when due.
    ///
    /// Returns the events that were applied.
    pub fn pump(&mut self, store: &SessionStore) -> Result<Vec<TimerEvent>, AppError> {
        self.drain(store)
    }

    /// Apply one timer event. Returns whether the draft should be saved.
    pub fn apply_event(&mut self, event: &TimerEvent) -> bool {
        match *event {
            TimerEvent::Tick { .. } => {
                self.session.duration = self.session.duration.saturating_add(1);
                self.unsaved_secs = self.unsaved_secs.saturating_add(1);
                self.unsaved_secs >= AUTOSAVE_INTERVAL_SECS
            }
            TimerEvent::Completed { phase, .. } => {
                // Counted here rather than copied from the timer, whose
                // cycle count restarts when the mode is switched
                if phase == Some(Phase::Work) {
                    let count = self.session.pomodoro_count.unwrap_or(0);
                    self.session.pomodoro_count = Some(count.saturating_add(1));
                }
                true
            }
            TimerEvent::PhaseChanged { .. } => false,
        }
    }

    pub fn add_goal(&mut self, text: &str, store: &SessionStore) -> Result<StudyGoal, AppError> {
        let text = validate_goal_text(text)?;
        let goal = StudyGoal::new(text);
        self.session.goals.push(goal.clone());
        self.save_if_persisted(store)?;
        Ok(goal)
    }

    pub fn toggle_goal(&mut self, goal_id: &str, store: &SessionStore) -> Result<StudyGoal, AppError> {
        let goal = self
            .session
            .goal_mut(goal_id)
            .ok_or(AppError::NotFound { entity: "Goal" })?;
        goal.completed = !goal.completed;
        let goal = goal.clone();
        self.save_if_persisted(store)?;
        Ok(goal)
    }

    pub fn remove_goal(&mut self, goal_id: &str, store: &SessionStore) -> Result<bool, AppError> {
        let before = self.session.goals.len();
        self.session.goals.retain(|g| g.id != goal_id);
        if self.session.goals.len() == before {
            return Ok(false);
        }
        self.save_if_persisted(store)?;
        Ok(true)
    }

    pub fn materials(&self) -> &[StudyMaterial] {
        self.materials.materials()
    }

    pub fn add_material(&mut self, name: &str, url: &str) -> Result<StudyMaterial, AppError> {
        self.materials.add(name, url)
    }

    pub fn remove_material(&mut self, id: u64) -> bool {
        self.materials.remove(id)
    }

    /// Edit the free-text fields. Changes are kept in the draft until saved.
    pub fn update_notes(
        &mut self,
        name: Option<&str>,
        description: Option<&str>,
        reflection: Option<&str>,
    ) -> Result<(), AppError> {
        if let Some(name) = name {
            self.session.name = validate_session_name(name)?;
        }
        if let Some(description) = description {
            validate_notes("description", description)?;
            self.session.description = Some(description.to_string());
        }
        if let Some(reflection) = reflection {
            validate_notes("reflection", reflection)?;
            self.session.reflection = Some(reflection.to_string());
        }
        Ok(())
    }

    /// New settings apply to an idle timer right away. A running timer
    /// picks them up the next time it is switched.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.settings = settings.clone();
        let mode = self.timer.snapshot().mode;
        if let Err(e) = self.timer.reconfigure(TimerConfig::from_settings(mode, settings)) {
            info!("Deferring settings change for active session: {e}");
        }
    }

    pub fn save(&mut self, store: &SessionStore) -> Result<&StudySession, AppError> {
        self.session = store.save(&self.session)?;
        self.unsaved_secs = 0;
        Ok(&self.session)
    }

    /// Stop the timer and keep what it measured. A session that was never
    /// saved stays unsaved.
    pub fn stop(&mut self, store: &SessionStore) -> Result<(), AppError> {
        self.timer.pause();
        self.drain(store)?;
        self.save_if_persisted(store)
    }

    fn save_if_persisted(&mut self, store: &SessionStore) -> Result<(), AppError> {
        if self.session.is_persisted() {
            self.save(store)?;
        }
        Ok(())
    }

    /// Stop the timer, mark the session completed and save it.
    pub fn finish(&mut self, store: &SessionStore) -> Result<StudySession, AppError> {
        self.timer.pause();
        self.drain(store)?;
        self.session.is_completed = true;
        self.save(store)?;
        info!(
            "Finished session {} ({} of {} goals done)",
            self.session.id,
            self.session.completed_goal_count(),
            self.session.goals.len()
        );
        Ok(self.session.clone())
    }

    /// Snapshot for a front end, including events applied by `pump`.
    pub fn view(&self, events: Vec<TimerEvent>) -> ActiveSessionView {
        ActiveSessionView {
            session: self.session.clone(),
            timer: self.timer.snapshot(),
            materials: self.materials.materials().to_vec(),
            events,
        }
    }

    fn drain(&mut self, store: &SessionStore) -> Result<Vec<TimerEvent>, AppError> {
        let events: Vec<TimerEvent> = self.events.try_iter().collect();
        let mut needs_save = false;
        for event in &events {
            needs_save |= self.apply_event(event);
        }
        if needs_save {
            self.save(store)?;
        }
        Ok(events)
    }

    fn check_timer_mode(&self, mode: TimerMode) -> Result<(), AppError> {
        let allowed = match self.session.mode {
            SessionMode::Guided => mode.is_countdown(),
            SessionMode::NonGuided => mode == TimerMode::Stopwatch,
        };
        if allowed {
            Ok(())
        } else {
            warn!(
                "Rejected {mode:?} timer for {} session",
                self.session.mode.as_str()
            );
            Err(AppError::InvalidInput {
                field: "timer",
                reason: format!("not available in {} sessions", self.session.mode.as_str()),
            })
        }
    }
}

/// Timer a session uses when none is requested.
pub fn default_timer_mode(mode: SessionMode) -> TimerMode {
    match mode {
        SessionMode::Guided => TimerMode::Standard,
        SessionMode::NonGuided => TimerMode::Stopwatch,
    }
}
