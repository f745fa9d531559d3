//! Session clock
//!
//! Three countdowns (whole game, memorize window, answer window) plus the
//! one-shot grace delays, all driven by a single millisecond scheduler.
//!
//! Every scheduled task is owned by the phase that armed it. Leaving a phase
//! cancels its owner's tasks, so a stale task can never fire into a later
//! phase. Due tasks are handed out one at a time; a handler that cancels a
//! sibling due at the same instant prevents it from firing.

use serde::{Deserialize, Serialize};

use crate::consts::COUNTDOWN_INTERVAL_MS;

/// Phase that armed a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerOwner {
    /// Whole-game countdown
    Global,
    /// Memorize sub-phase countdown
    Memorize,
    /// Answer sub-phase countdown
    Answer,
    /// Post-answer feedback window
    Feedback,
    /// Delay between the last recall click and level completion
    RecallComplete,
}

/// Handle for cancelling a single task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScheduledTask {
    id: TaskId,
    owner: TimerOwner,
    due_ms: u64,
    /// Re-arm period for repeating tasks
    interval_ms: Option<u64>,
}

/// A task that came due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTask {
    pub id: TaskId,
    pub owner: TimerOwner,
    pub at_ms: u64,
}

/// Millisecond task scheduler
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    now_ms: u64,
    next_id: u64,
    tasks: Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scheduler time
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn push(&mut self, owner: TimerOwner, delay_ms: u64, interval_ms: Option<u64>) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(ScheduledTask {
            id,
            owner,
            due_ms: self.now_ms.saturating_add(delay_ms),
            interval_ms,
        });
        id
    }

    /// Fire once after `delay_ms`
    pub fn schedule_once(&mut self, owner: TimerOwner, delay_ms: u64) -> TaskId {
        self.push(owner, delay_ms, None)
    }

    /// Fire every `interval_ms`, first after one interval
    pub fn schedule_every(&mut self, owner: TimerOwner, interval_ms: u64) -> TaskId {
        let interval_ms = interval_ms.max(1);
        self.push(owner, interval_ms, Some(interval_ms))
    }

    pub fn cancel(&mut self, id: TaskId) {
        self.tasks.retain(|t| t.id != id);
    }

    /// Drop every task armed by `owner`
    pub fn cancel_owner(&mut self, owner: TimerOwner) {
        self.tasks.retain(|t| t.owner != owner);
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn has_pending(&self, owner: TimerOwner) -> bool {
        self.tasks.iter().any(|t| t.owner == owner)
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Pop the earliest task due at or before `until_ms`
    ///
    /// Time moves to the task's due instant. Repeating tasks are re-armed
    /// before returning. Ties go to the task scheduled first. Due times
    /// saturate at `u64::MAX` and a task is never re-armed past it.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<FiredTask> {
        let index = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= until_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;

        let task = self.tasks[index].clone();
        self.now_ms = self.now_ms.max(task.due_ms);

        let next_due = task.interval_ms.and_then(|i| task.due_ms.checked_add(i));
        match next_due {
            Some(due_ms) => self.tasks[index].due_ms = due_ms,
            // One-shot, or a repeating task that has run off the end of time
            None => {
                self.tasks.swap_remove(index);
            }
        }

        Some(FiredTask {
            id: task.id,
            owner: task.owner,
            at_ms: task.due_ms,
        })
    }

    /// Move time forward once no more tasks are due
    pub fn settle(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}

/// One-second countdown over a millisecond budget
///
/// Each tick takes 1000 ms off; the tick that starts at or below 1000 ms
/// expires it. A 2500 ms window therefore expires on its third tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Countdown {
    remaining_ms: u64,
    duration_ms: u64,
}

impl Countdown {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            remaining_ms: duration_ms,
            duration_ms,
        }
    }

    /// Refill to a (possibly new) duration
    pub fn reset(&mut self, duration_ms: u64) {
        *self = Self::new(duration_ms);
    }

    /// Refill to the current duration
    pub fn restart(&mut self) {
        self.remaining_ms = self.duration_ms;
    }

    /// Count one second down; returns true when this tick expires the countdown
    pub fn tick(&mut self) -> bool {
        if self.remaining_ms <= COUNTDOWN_INTERVAL_MS {
            self.remaining_ms = 0;
            true
        } else {
            self.remaining_ms -= COUNTDOWN_INTERVAL_MS;
            false
        }
    }

    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_ms == 0
    }

    /// Elapsed fraction of the window, 0 at start and 1 when expired
    pub fn progress(&self) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        1.0 - self.remaining_ms as f32 / self.duration_ms as f32
    }
}

/// Everything time-related in a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionClock {
    pub scheduler: Scheduler,
    pub global: Countdown,
    pub memorize: Countdown,
    pub answer: Countdown,
}

impl SessionClock {
    pub fn new(total_game_time_secs: u32) -> Self {
        Self {
            scheduler: Scheduler::new(),
            global: Countdown::new(u64::from(total_game_time_secs) * 1000),
            memorize: Countdown::default(),
            answer: Countdown::default(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Whole seconds left in the game
    pub fn time_remaining_secs(&self) -> u32 {
        (self.global.remaining_ms() / 1000) as u32
    }

    /// Arm the whole-game countdown
    pub fn start_global(&mut self, total_game_time_secs: u32) {
        self.scheduler.cancel_owner(TimerOwner::Global);
        self.global.reset(u64::from(total_game_time_secs) * 1000);
        self.scheduler
            .schedule_every(TimerOwner::Global, COUNTDOWN_INTERVAL_MS);
    }

    /// Enter the memorize window, dropping any answer-side timers
    pub fn start_memorize(&mut self, duration_ms: u64) {
        self.scheduler.cancel_owner(TimerOwner::Memorize);
        self.scheduler.cancel_owner(TimerOwner::Answer);
        self.memorize.reset(duration_ms);
        self.scheduler
            .schedule_every(TimerOwner::Memorize, COUNTDOWN_INTERVAL_MS);
    }

    /// Enter the answer window, dropping the memorize countdown
    pub fn start_answer(&mut self, duration_ms: u64) {
        self.scheduler.cancel_owner(TimerOwner::Memorize);
        self.scheduler.cancel_owner(TimerOwner::Answer);
        self.answer.reset(duration_ms);
        self.scheduler
            .schedule_every(TimerOwner::Answer, COUNTDOWN_INTERVAL_MS);
    }

    /// Cancel every timer except the whole-game countdown
    pub fn cancel_level_timers(&mut self) {
        for owner in [
            TimerOwner::Memorize,
            TimerOwner::Answer,
            TimerOwner::Feedback,
            TimerOwner::RecallComplete,
        ] {
            self.scheduler.cancel_owner(owner);
        }
    }

    pub fn stop_all(&mut self) {
        self.scheduler.cancel_all();
    }
}
