//! Countdown and Pomodoro phase state machine.
//!
//! [`Timer`] is pure: it only changes when [`Timer::tick`] is called and it
//! reports what happened as [`TimerEvent`]s. Real-time driving lives in
//! [`service::TimerService`].

pub mod service;

pub use service::TimerService;

use crate::error::AppError;
use crate::models::{PomodoroSettings, Settings};
use log::info;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Work,
    ShortBreak,
    LongBreak,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Work => "work",
            Phase::ShortBreak => "short-break",
            Phase::LongBreak => "long-break",
        }
    }

    /// Configured length of this phase in seconds.
    pub fn duration(self, config: &PomodoroSettings) -> u32 {
        match self {
            Phase::Work => config.work_duration,
            Phase::ShortBreak => config.short_break_duration,
            Phase::LongBreak => config.long_break_duration,
        }
    }
}

/// Phase that follows `finished`, given the work phases completed so far.
pub fn next_phase(finished: Phase, completed_cycles: u32, long_break_interval: u32) -> Phase {
    match finished {
        Phase::Work => match completed_cycles.checked_rem(long_break_interval) {
            Some(0) => Phase::LongBreak,
            Some(_) | None => Phase::ShortBreak,
        },
        Phase::ShortBreak | Phase::LongBreak => Phase::Work,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerMode {
    /// Single countdown, no phases
    Standard,
    /// Work and break countdowns
    Pomodoro,
    /// Elapsing counter that never completes
    Stopwatch,
}

impl TimerMode {
    pub fn is_countdown(self) -> bool {
        match self {
            TimerMode::Standard | TimerMode::Pomodoro => true,
            TimerMode::Stopwatch => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    /// One second elapsed. `seconds` is the remaining time for countdowns
    /// and the elapsed time for the stopwatch.
    Tick { seconds: u32 },
    /// A countdown reached zero. `phase` is the Pomodoro phase that ended.
    Completed {
        phase: Option<Phase>,
        #[serde(rename = "completedCycles")]
        completed_cycles: u32,
    },
    /// Pomodoro moved to a new phase with a fresh countdown.
    PhaseChanged { phase: Phase, remaining: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    pub mode: TimerMode,
    /// Countdown length for standard mode
    pub standard_secs: u32,
    pub pomodoro: PomodoroSettings,
    /// Keep running into the next Pomodoro phase
    pub auto_continue: bool,
}

impl TimerConfig {
    pub fn from_settings(mode: TimerMode, settings: &Settings) -> Self {
        Self {
            mode,
            standard_secs: settings.standard_timer_duration,
            pomodoro: settings.pomodoro_settings,
            auto_continue: settings.auto_start_timers,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub mode: TimerMode,
    pub running: bool,
    pub remaining: u32,
    pub elapsed: u32,
    pub phase: Option<Phase>,
    pub completed_cycles: u32,
}

#[derive(Debug, Clone)]
pub struct Timer {
    config: TimerConfig,
    running: bool,
    remaining: u32,
    /// Seconds ticked since the last reset
    elapsed: u32,
    phase: Phase,
    completed_cycles: u32,
}

impl Timer {
    pub fn new(config: TimerConfig) -> Self {
        let mut timer = Self {
            config,
            running: false,
            remaining: 0,
            elapsed: 0,
            phase: Phase::Work,
            completed_cycles: 0,
        };
        timer.remaining = timer.initial_remaining();
        timer
    }

    /// Continue a Pomodoro count from an earlier sitting. Only an idle
    /// timer can be seeded.
    pub fn set_completed_cycles(&mut self, completed_cycles: u32) -> Result<(), AppError> {
        if self.running {
            return Err(AppError::InvalidState(
                "cannot change the cycle count of a running timer".into(),
            ));
        }
        self.completed_cycles = completed_cycles;
        Ok(())
    }

    pub fn mode(&self) -> TimerMode {
        self.config.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn completed_cycles(&self) -> u32 {
        self.completed_cycles
    }

    /// Current phase; `None` outside Pomodoro mode.
    pub fn phase(&self) -> Option<Phase> {
        match self.config.mode {
            TimerMode::Pomodoro => Some(self.phase),
            TimerMode::Standard | TimerMode::Stopwatch => None,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            mode: self.config.mode,
            running: self.running,
            remaining: self.remaining,
            elapsed: self.elapsed,
            phase: self.phase(),
            completed_cycles: self.completed_cycles,
        }
    }

    /// Begin or resume ticking. A countdown with nothing left cannot start.
    pub fn start(&mut self) -> Result<(), AppError> {
        if self.config.mode.is_countdown() && self.remaining == 0 {
            return Err(AppError::InvalidState(
                "timer has no time remaining; reset it first".into(),
            ));
        }
        self.running = true;
        Ok(())
    }

    /// Stop ticking. Returns whether the timer was running.
    pub fn pause(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    /// Advance one second. A paused timer emits nothing.
    pub fn tick(&mut self) -> Vec<TimerEvent> {
        if !self.running {
            return Vec::new();
        }
        self.elapsed = self.elapsed.saturating_add(1);

        match self.config.mode {
            TimerMode::Stopwatch => vec![TimerEvent::Tick { seconds: self.elapsed }],
            TimerMode::Standard => {
                let mut events = self.count_down();
                if self.remaining == 0 {
                    self.running = false;
                    events.push(TimerEvent::Completed {
                        phase: None,
                        completed_cycles: self.completed_cycles,
                    });
                }
                events
            }
            TimerMode::Pomodoro => {
                let mut events = self.count_down();
                if self.remaining == 0 {
                    events.extend(self.advance_phase());
                }
                events
            }
        }
    }

    /// Apply a new configuration to an idle timer.
    ///
    /// The remaining time is reset to the new configuration without
    /// completing anything. Changing mode also restarts the Pomodoro cycle.
    pub fn reconfigure(&mut self, config: TimerConfig) -> Result<(), AppError> {
        if self.running {
            return Err(AppError::InvalidState(
                "cannot reconfigure a running timer".into(),
            ));
        }
        if config.mode != self.config.mode {
            self.phase = Phase::Work;
            self.completed_cycles = 0;
            self.elapsed = 0;
        }
        self.config = config;
        self.remaining = self.initial_remaining();
        Ok(())
    }

    /// Stop and return to the start of the current mode.
    pub fn reset(&mut self) {
        self.running = false;
        self.phase = Phase::Work;
        self.completed_cycles = 0;
        self.elapsed = 0;
        self.remaining = self.initial_remaining();
    }

    fn count_down(&mut self) -> Vec<TimerEvent> {
        self.remaining = self.remaining.saturating_sub(1);
        vec![TimerEvent::Tick { seconds: self.remaining }]
    }

    fn advance_phase(&mut self) -> Vec<TimerEvent> {
        let finished = self.phase;
        if finished == Phase::Work {
            self.completed_cycles = self.completed_cycles.saturating_add(1);
        }

        let next = next_phase(
            finished,
            self.completed_cycles,
            self.config.pomodoro.long_break_interval,
        );
        self.phase = next;
        self.remaining = next.duration(&self.config.pomodoro);
        self.running = self.config.auto_continue && self.remaining > 0;

        info!(
            "Pomodoro {} finished ({} cycles), next: {}",
            finished.as_str(),
            self.completed_cycles,
            next.as_str()
        );

        vec![
            TimerEvent::Completed {
                phase: Some(finished),
                completed_cycles: self.completed_cycles,
            },
            TimerEvent::PhaseChanged {
                phase: next,
                remaining: self.remaining,
            },
        ]
    }

    fn initial_remaining(&self) -> u32 {
        match self.config.mode {
            TimerMode::Standard => self.config.standard_secs,
            TimerMode::Pomodoro => self.phase.duration(&self.config.pomodoro),
            TimerMode::Stopwatch => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pomodoro_config(interval: u32) -> TimerConfig {
        TimerConfig {
            mode: TimerMode::Pomodoro,
            standard_secs: 10,
            pomodoro: PomodoroSettings {
                work_duration: 3,
                short_break_duration: 1,
                long_break_duration: 2,
                long_break_interval: interval,
            },
            auto_continue: true,
        }
    }

    fn standard_config(secs: u32) -> TimerConfig {
        TimerConfig {
            mode: TimerMode::Standard,
            standard_secs: secs,
            pomodoro: PomodoroSettings::default(),
            auto_continue: true,
        }
    }

    /// Tick until the current phase completes, returning the phase that follows.
    fn finish_phase(timer: &mut Timer) -> Phase {
        loop {
            for event in timer.tick() {
                if let TimerEvent::PhaseChanged { phase, .. } = event {
                    return phase;
                }
            }
        }
    }

    #[test]
    fn test_last_second_completes_exactly_once() {
        let mut timer = Timer::new(standard_config(1));
        timer.start().unwrap();

        let events = timer.tick();

        assert_eq!(
            events,
            vec![
                TimerEvent::Tick { seconds: 0 },
                TimerEvent::Completed { phase: None, completed_cycles: 0 },
            ]
        );
        assert_eq!(timer.remaining(), 0);
        assert!(!timer.is_running());
        assert!(timer.tick().is_empty(), "no second completion");
    }

    #[test]
    fn test_standard_counts_down() {
        let mut timer = Timer::new(standard_config(3));
        timer.start().unwrap();

        assert_eq!(timer.tick(), vec![TimerEvent::Tick { seconds: 2 }]);
        assert_eq!(timer.tick(), vec![TimerEvent::Tick { seconds: 1 }]);
        assert_eq!(timer.remaining(), 1);
        assert_eq!(timer.elapsed(), 2);
        assert!(timer.phase().is_none());
    }

    #[test]
    fn test_paused_timer_does_not_tick() {
        let mut timer = Timer::new(standard_config(5));
        timer.start().unwrap();
        timer.tick();

        assert!(timer.pause());
        assert!(!timer.pause(), "second pause is a no-op");
        assert!(timer.tick().is_empty());
        assert_eq!(timer.remaining(), 4);

        timer.start().unwrap();
        assert_eq!(timer.tick(), vec![TimerEvent::Tick { seconds: 3 }]);
    }

    #[test]
    fn test_start_refused_when_countdown_exhausted() {
        let mut timer = Timer::new(standard_config(1));
        timer.start().unwrap();
        timer.tick();

        assert!(matches!(timer.start(), Err(AppError::InvalidState(_))));

        timer.reset();
        assert_eq!(timer.remaining(), 1);
        assert!(timer.start().is_ok());
    }

    #[test]
    fn test_stopwatch_counts_up_and_never_completes() {
        let mut timer = Timer::new(TimerConfig {
            mode: TimerMode::Stopwatch,
            ..standard_config(0)
        });
        timer.start().unwrap();

        for expected in 1..=5 {
            assert_eq!(timer.tick(), vec![TimerEvent::Tick { seconds: expected }]);
        }
        assert!(timer.is_running());
        assert_eq!(timer.elapsed(), 5);
    }

    #[test]
    fn test_work_completion_goes_to_short_break() {
        let mut timer = Timer::new(pomodoro_config(4));
        timer.start().unwrap();
        timer.tick();
        timer.tick();

        let events = timer.tick();

        assert_eq!(
            events,
            vec![
                TimerEvent::Tick { seconds: 0 },
                TimerEvent::Completed { phase: Some(Phase::Work), completed_cycles: 1 },
                TimerEvent::PhaseChanged { phase: Phase::ShortBreak, remaining: 1 },
            ]
        );
        assert_eq!(timer.phase(), Some(Phase::ShortBreak));
        assert_eq!(timer.remaining(), 1);
    }

    #[test]
    fn test_long_break_after_interval_work_phases() {
        let mut timer = Timer::new(pomodoro_config(4));
        timer.start().unwrap();

        let mut breaks = Vec::new();
        for _ in 0..8 {
            let after_work = finish_phase(&mut timer);
            breaks.push(after_work);
            assert_eq!(finish_phase(&mut timer), Phase::Work);
        }

        assert_eq!(
            breaks,
            vec![
                Phase::ShortBreak,
                Phase::ShortBreak,
                Phase::ShortBreak,
                Phase::LongBreak,
                Phase::ShortBreak,
                Phase::ShortBreak,
                Phase::ShortBreak,
                Phase::LongBreak,
            ]
        );
        assert_eq!(timer.completed_cycles(), 8);
    }

    #[test]
    fn test_break_completion_does_not_count_cycle() {
        let mut timer = Timer::new(pomodoro_config(4));
        timer.start().unwrap();
        finish_phase(&mut timer);
        assert_eq!(timer.completed_cycles(), 1);

        let events = timer.tick();
        assert!(events.contains(&TimerEvent::Completed {
            phase: Some(Phase::ShortBreak),
            completed_cycles: 1,
        }));
        assert_eq!(timer.phase(), Some(Phase::Work));
        assert_eq!(timer.remaining(), 3);
    }

    #[test]
    fn test_without_auto_continue_stops_after_phase() {
        let mut timer = Timer::new(TimerConfig {
            auto_continue: false,
            ..pomodoro_config(4)
        });
        timer.start().unwrap();

        assert_eq!(finish_phase(&mut timer), Phase::ShortBreak);
        assert!(!timer.is_running());
        assert_eq!(timer.remaining(), 1);
        assert!(timer.tick().is_empty());
    }

    #[test]
    fn test_resumed_cycle_count_drives_long_break() {
        let mut timer = Timer::new(pomodoro_config(4));
        timer.set_completed_cycles(3).unwrap();
        timer.start().unwrap();
        assert_eq!(finish_phase(&mut timer), Phase::LongBreak);
        assert!(timer.set_completed_cycles(0).is_err());
    }

    #[test]
    fn test_next_phase() {
        assert_eq!(next_phase(Phase::Work, 1, 4), Phase::ShortBreak);
        assert_eq!(next_phase(Phase::Work, 4, 4), Phase::LongBreak);
        assert_eq!(next_phase(Phase::Work, 2, 1), Phase::LongBreak);
        assert_eq!(next_phase(Phase::Work, 3, 0), Phase::ShortBreak);
        assert_eq!(next_phase(Phase::ShortBreak, 1, 4), Phase::Work);
        assert_eq!(next_phase(Phase::LongBreak, 4, 4), Phase::Work);
    }

    #[test]
    fn test_reconfigure_idle_resets_remaining_without_completion() {
        let mut timer = Timer::new(standard_config(60));
        timer.start().unwrap();
        timer.tick();
        timer.pause();

        timer.reconfigure(standard_config(90)).unwrap();

        assert_eq!(timer.remaining(), 90);
        assert!(!timer.is_running());
        assert!(timer.tick().is_empty());
    }

    #[test]
    fn test_reconfigure_switching_mode_restarts_cycle() {
        let mut timer = Timer::new(pomodoro_config(4));
        timer.set_completed_cycles(2).unwrap();

        timer.reconfigure(standard_config(30)).unwrap();
        assert_eq!(timer.remaining(), 30);
        assert!(timer.phase().is_none());

        timer.reconfigure(pomodoro_config(4)).unwrap();
        assert_eq!(timer.phase(), Some(Phase::Work));
        assert_eq!(timer.remaining(), 3);
        assert_eq!(timer.completed_cycles(), 0);
    }

    #[test]
    fn test_reconfigure_pomodoro_durations_keeps_phase() {
        let mut timer = Timer::new(TimerConfig {
            auto_continue: false,
            ..pomodoro_config(4)
        });
        timer.start().unwrap();
        finish_phase(&mut timer);

        let mut config = pomodoro_config(4);
        config.pomodoro.short_break_duration = 7;
        timer.reconfigure(config).unwrap();

        assert_eq!(timer.phase(), Some(Phase::ShortBreak));
        assert_eq!(timer.remaining(), 7);
        assert_eq!(timer.completed_cycles(), 1);
    }

    #[test]
    fn test_reconfigure_running_is_rejected() {
        let mut timer = Timer::new(standard_config(60));
        timer.start().unwrap();

        assert!(timer.reconfigure(standard_config(10)).is_err());
        assert_eq!(timer.remaining(), 60);
    }

    #[test]
    fn test_config_from_settings() {
        let settings = Settings::default();
        let config = TimerConfig::from_settings(TimerMode::Pomodoro, &settings);

        assert_eq!(config.standard_secs, 25 * 60);
        assert_eq!(config.pomodoro, settings.pomodoro_settings);
        assert!(config.auto_continue);
        assert_eq!(Timer::new(config).remaining(), 25 * 60);
    }

    #[test]
    fn test_event_serialization() {
        let value = serde_json::to_value(TimerEvent::Completed {
            phase: Some(Phase::LongBreak),
            completed_cycles: 4,
        })
        .unwrap();

        assert_eq!(value["event"], "completed");
        assert_eq!(value["phase"], "long-break");
        assert_eq!(value["completedCycles"], 4);
    }
}
