use std::path::PathBuf;
use std::time::Duration;

use crate::clock::{MonotonicTime, SessionClock, TimeSource};
use crate::config::{Config, CORRECT_PROBABILITY, CROSS_PROBABILITY};
use crate::error::{PersistError, SessionError};
use crate::event_log::{EventDetail, EventKind, EventLog, LogEntry};
use crate::palette::OptionPool;
use crate::persistence::{LogSink, SaveKind};
use crate::random::{RandomSource, StdRandom};
use crate::summary::{Answer, SessionSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    /// Start screen, before the first slide
    Idle,
    AwaitingSelection,
    Locked,
    Transitioning,
    Ended,
}

/// Corner symbol shown during the transition window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Cross,
    Tick,
}

/// What a clock tick caused, if anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Expired,
    Advanced(usize),
    Ended(SessionSummary),
}

/// Outcome of the save made when the session ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoSave {
    Written(PathBuf),
    /// No sink attached, or nothing logged
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, Copy)]
enum LockCause {
    Agreed,
    Expired,
}

/// Everything the session mutates. Owned by `SlideMachine` alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub phase: Phase,
    pub slide: usize,
    pub selection: Option<usize>,
    pub answers: Vec<Option<Answer>>,
}

impl SessionState {
    fn new(prompt_count: usize) -> Self {
        Self {
            phase: Phase::Idle,
            slide: 0,
            selection: None,
            answers: vec![None; prompt_count],
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.phase, Phase::Locked | Phase::Transitioning)
    }

    pub fn has_ended(&self) -> bool {
        self.phase == Phase::Ended
    }
}

/// Drives one colour-matching session: slides, countdown, selection,
/// answer recording and the click log.
pub struct SlideMachine<T: TimeSource = MonotonicTime, R: RandomSource = StdRandom> {
    state: SessionState,
    prompts: Vec<String>,
    pool: OptionPool,
    clock: SessionClock<T>,
    random: R,
    log: EventLog,
    slide_duration: Duration,
    feedback_duration: Duration,
    transition_due_ms: Option<u64>,
    feedback: Option<Feedback>,
    sink: Option<Box<dyn LogSink>>,
    auto_save: Option<AutoSave>,
}

impl<T: TimeSource, R: RandomSource> SlideMachine<T, R> {
    pub fn new(config: &Config, time: T, random: R) -> Self {
        Self {
            state: SessionState::new(config.prompts.len()),
            prompts: config.prompts.clone(),
            pool: OptionPool::new(config.option_count),
            clock: SessionClock::new(time),
            random,
            log: EventLog::new(),
            slide_duration: Duration::from_millis(config.slide_ms()),
            feedback_duration: Duration::from_millis(config.feedback_ms),
            transition_due_ms: None,
            feedback: None,
            sink: None,
            auto_save: None,
        }
    }

    /// Hand the log to `sink` when the session ends and on `save_now`
    pub fn with_sink(mut self, sink: Box<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn slide_index(&self) -> usize {
        self.state.slide
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn prompt(&self) -> &str {
        &self.prompts[self.state.slide]
    }

    pub fn selection(&self) -> Option<usize> {
        self.state.selection
    }

    pub fn answers(&self) -> &[Option<Answer>] {
        &self.state.answers
    }

    pub fn pool(&self) -> &OptionPool {
        &self.pool
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Visible only while the transition window is open
    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    pub fn remaining(&self) -> Duration {
        match self.state.phase {
            Phase::Idle => self.slide_duration,
            Phase::Ended => Duration::ZERO,
            _ => self.clock.remaining(),
        }
    }

    pub fn remaining_secs(&self) -> u64 {
        match self.state.phase {
            Phase::Idle => self.slide_duration.as_secs(),
            Phase::Ended => 0,
            _ => self.clock.remaining_secs_ceil(),
        }
    }

    /// Set once the session has ended, cleared by `reset`
    pub fn auto_save(&self) -> Option<&AutoSave> {
        self.auto_save.as_ref()
    }

    /// Whether the "all agree" control should be offered
    pub fn can_confirm(&self) -> bool {
        self.state.phase == Phase::AwaitingSelection
            && (self.state.selection.is_some() || self.clock.expired())
    }

    /// Only available once the session has ended
    pub fn summary(&self) -> Option<SessionSummary> {
        self.state
            .has_ended()
            .then(|| SessionSummary::from_answers(&self.state.answers))
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state.phase != Phase::Idle {
            return Err(self.refuse("start"));
        }
        self.record(EventKind::StartGame, EventDetail::Plain {});
        self.begin_slide();
        tracing::info!(prompts = self.prompts.len(), options = self.pool.len(), "session started");
        Ok(())
    }

    /// Make `id` the pending choice. Nothing is consumed until the slide locks.
    pub fn select(&mut self, id: usize) -> Result<(), SessionError> {
        if self.state.phase != Phase::AwaitingSelection {
            return Err(self.refuse("select"));
        }
        let name = self.pool.check_available(id)?.name.clone();
        self.state.selection = Some(id);
        self.record(
            EventKind::ColourClick,
            EventDetail::ColourClick {
                colour_index: id,
                colour_name: name,
            },
        );
        Ok(())
    }

    /// The "all agree" action. Allowed with or without a selection.
    pub fn confirm(&mut self) -> Result<(), SessionError> {
        if self.state.phase != Phase::AwaitingSelection {
            return Err(self.refuse("confirm"));
        }
        self.lock(LockCause::Agreed);
        Ok(())
    }

    /// Called on every scheduling tick
    pub fn tick(&mut self) -> Option<Progress> {
        match self.state.phase {
            Phase::AwaitingSelection if self.clock.expired() => {
                self.lock(LockCause::Expired);
                Some(Progress::Expired)
            }
            Phase::Transitioning
                if self
                    .transition_due_ms
                    .is_some_and(|due| self.clock.now_ms() >= due) =>
            {
                Some(self.finish_transition())
            }
            _ => None,
        }
    }

    /// Back to slide 0 with every colour available. The log is kept.
    pub fn reset(&mut self) {
        self.record(EventKind::Restart, EventDetail::Plain {});
        self.state.answers.iter_mut().for_each(|a| *a = None);
        self.pool.reset();
        self.auto_save = None;
        self.state.slide = 0;
        self.begin_slide();
        tracing::info!("session restarted");
    }

    /// Returns the written path, or `None` with no sink or an empty log
    pub fn save_now(&mut self) -> Result<Option<PathBuf>, PersistError> {
        self.persist(SaveKind::Manual)
    }

    fn persist(&mut self, kind: SaveKind) -> Result<Option<PathBuf>, PersistError> {
        match self.sink.as_mut() {
            Some(sink) if !self.log.is_empty() => sink.persist(self.log.all(), kind).map(Some),
            _ => Ok(None),
        }
    }

    fn refuse(&self, action: &'static str) -> SessionError {
        tracing::debug!(action, phase = %self.state.phase, "ignored");
        SessionError::InvalidTransition {
            action,
            phase: self.state.phase,
        }
    }

    fn record(&mut self, event: EventKind, detail: EventDetail) {
        self.log.append(LogEntry {
            event,
            time_ms: self.clock.now_ms(),
            slide_index: self.state.slide,
            selected_index: self.state.selection,
            detail,
        });
    }

    fn begin_slide(&mut self) {
        self.state.selection = None;
        self.state.phase = Phase::AwaitingSelection;
        self.feedback = None;
        self.transition_due_ms = None;
        self.clock.start(self.slide_duration);
    }

    fn lock(&mut self, cause: LockCause) {
        self.state.phase = Phase::Locked;
        let chosen = self.state.selection;
        let event = match cause {
            LockCause::Agreed => EventKind::AllAgree,
            LockCause::Expired => EventKind::TimerExpired,
        };
        let detail = EventDetail::Decision {
            had_selection: chosen.is_some(),
            chosen_colour_index: chosen,
            chosen_colour_name: chosen
                .and_then(|id| self.pool.get(id))
                .map(|o| o.name.clone()),
        };
        self.record(event, detail);

        // a silent timeout leaves the slide unanswered
        match (chosen, cause) {
            (Some(id), _) => self.resolve(id),
            (None, LockCause::Agreed) => self.store_answer(Answer::Skipped),
            (None, LockCause::Expired) => {}
        }

        self.feedback = Some(if self.random.chance(CROSS_PROBABILITY) {
            Feedback::Cross
        } else {
            Feedback::Tick
        });
        let window_ms = u64::try_from(self.feedback_duration.as_millis()).unwrap_or(u64::MAX);
        self.transition_due_ms = Some(self.clock.now_ms().saturating_add(window_ms));
        self.state.phase = Phase::Transitioning;
    }

    fn resolve(&mut self, id: usize) {
        match self.pool.mark_consumed(id) {
            Ok(()) => {
                let correct = self.random.chance(CORRECT_PROBABILITY);
                self.store_answer(Answer::Chosen { option: id, correct });
            }
            Err(e) => tracing::warn!(error = %e, slide = self.state.slide, "answer not recorded"),
        }
    }

    fn store_answer(&mut self, answer: Answer) {
        let slot = &mut self.state.answers[self.state.slide];
        if slot.is_none() {
            *slot = Some(answer);
        }
    }

    fn finish_transition(&mut self) -> Progress {
        self.transition_due_ms = None;
        self.feedback = None;

        let last_slide = self.state.slide + 1 >= self.prompts.len();
        if self.pool.is_exhausted() || last_slide {
            return self.end();
        }

        self.state.slide += 1;
        self.begin_slide();
        tracing::debug!(slide = self.state.slide, "advanced");
        Progress::Advanced(self.state.slide)
    }

    fn end(&mut self) -> Progress {
        self.state.phase = Phase::Ended;
        self.state.selection = None;
        let summary = SessionSummary::from_answers(&self.state.answers);
        tracing::info!(
            answered = summary.answered,
            correct = summary.correct,
            percentage = summary.percentage,
            "session ended"
        );
        self.auto_save = Some(match self.persist(SaveKind::Auto) {
            Ok(Some(path)) => AutoSave::Written(path),
            Ok(None) => AutoSave::Skipped,
            Err(e) => {
                tracing::warn!(error = %e, "automatic save of click log failed");
                AutoSave::Failed(e.to_string())
            }
        });
        Progress::Ended(summary)
    }
}
