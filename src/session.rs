use crate::domain::{Phase, Task, TaskPatch};
use crate::registry::TaskRegistry;
use serde::{Deserialize, Serialize};

/// Fallback phase lengths in minutes when no task is current
pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;

/// Focus sessions per cycle for tasks created without an explicit count
pub const DEFAULT_REPEATS: u32 = 4;

/// Phase lengths in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseDurations {
    pub work: u32,
    pub short_break: u32,
    pub long_break: u32,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            work: DEFAULT_WORK_MINUTES,
            short_break: DEFAULT_SHORT_BREAK_MINUTES,
            long_break: DEFAULT_LONG_BREAK_MINUTES,
        }
    }
}

impl PhaseDurations {
    pub fn from_task(task: &Task) -> Self {
        Self {
            work: task.focus_time,
            short_break: task.short_break,
            long_break: task.long_break,
        }
    }

    /// Durations of the current task, else `fallback`
    pub fn resolve(current: Option<&Task>, fallback: PhaseDurations) -> Self {
        current.map(Self::from_task).unwrap_or(fallback)
    }

    pub fn minutes_for(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work,
            Phase::ShortBreak => self.short_break,
            Phase::LongBreak => self.long_break,
        }
    }

    pub fn seconds_for(&self, phase: Phase) -> u32 {
        self.minutes_for(phase).saturating_mul(60)
    }
}

/// What a finished phase led to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseCompletion {
    pub finished: Phase,
    pub next: Phase,
    /// Post-increment session count of the current task, if a work phase
    /// finished while a task was current
    pub completed_sessions: Option<u32>,
    /// Name of the task the session was credited to
    pub task_name: Option<String>,
}

/// Result of a single tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The machine is paused; nothing changed
    Stopped,
    /// One second was counted down
    Counted { remaining_seconds: u32 },
    /// The countdown reached zero and the machine moved to the next phase
    Completed(PhaseCompletion),
}

/// Persisted part of the session (the running flag is never restored)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub remaining_seconds: u32,
    pub phase: Phase,
}

/// The work/short-break/long-break countdown engine
///
/// A step counter: each call to [`SessionMachine::tick`] while running takes
/// exactly one second off the countdown, independent of wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMachine {
    remaining_seconds: u32,
    phase: Phase,
    running: bool,
}

impl SessionMachine {
    /// Fresh machine at the start of a work phase
    pub fn new(durations: PhaseDurations) -> Self {
        Self {
            remaining_seconds: durations.seconds_for(Phase::Work),
            phase: Phase::Work,
            running: false,
        }
    }

    /// Rebuild from the stored countdown and phase
    ///
    /// A stored countdown is kept only when positive; otherwise the phase
    /// starts over with the length from `durations`. The machine always comes
    /// back paused.
    pub fn restore(remaining_seconds: Option<u32>, phase: Option<Phase>, durations: PhaseDurations) -> Self {
        let phase = phase.unwrap_or_default();
        let remaining_seconds = match remaining_seconds {
            Some(seconds) if seconds > 0 => seconds,
            _ => durations.seconds_for(phase),
        };
        Self {
            remaining_seconds,
            phase,
            running: false,
        }
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            remaining_seconds: self.remaining_seconds,
            phase: self.phase,
        }
    }

    /// Begin counting down; `false` if already running or nothing is left
    pub fn start(&mut self) -> bool {
        if self.running || self.remaining_seconds == 0 {
            return false;
        }
        self.running = true;
        true
    }

    /// Stop counting down; `false` if already paused
    pub fn pause(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// Back to a full, paused work phase
    pub fn reset(&mut self, durations: PhaseDurations) {
        self.running = false;
        self.phase = Phase::Work;
        self.remaining_seconds = durations.seconds_for(Phase::Work);
    }

    /// Restart the current phase at its full length from `durations`, paused
    pub fn rewind(&mut self, durations: PhaseDurations) {
        self.running = false;
        self.remaining_seconds = durations.seconds_for(self.phase);
    }

    /// Whether the countdown sits untouched at the start of its phase
    pub fn is_fresh(&self, durations: PhaseDurations) -> bool {
        !self.running && self.remaining_seconds == durations.seconds_for(self.phase)
    }

    /// Count one second down, completing the phase when it reaches zero
    ///
    /// On completion of a work phase the current task's session counter is
    /// incremented through `registry`. The next phase takes its own length
    /// from the current task (or `fallback`) and is left paused.
    pub fn tick(&mut self, registry: &mut TaskRegistry, fallback: PhaseDurations) -> TickOutcome {
        if !self.running {
            return TickOutcome::Stopped;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return TickOutcome::Counted {
                remaining_seconds: self.remaining_seconds,
            };
        }
        TickOutcome::Completed(self.complete_phase(registry, fallback))
    }

    fn complete_phase(&mut self, registry: &mut TaskRegistry, fallback: PhaseDurations) -> PhaseCompletion {
        self.running = false;
        let finished = self.phase;
        let credit = match finished {
            Phase::Work => credit_current_task(registry),
            Phase::ShortBreak | Phase::LongBreak => None,
        };

        let next = match (finished, &credit) {
            (Phase::Work, Some(credit)) if credit.count % credit.repeats.max(1) == 0 => Phase::LongBreak,
            (Phase::Work, _) => Phase::ShortBreak,
            (Phase::ShortBreak | Phase::LongBreak, _) => Phase::Work,
        };

        let durations = PhaseDurations::resolve(registry.current(), fallback);
        self.phase = next;
        self.remaining_seconds = durations.seconds_for(next);

        tracing::info!(
            finished = finished.name(),
            next = next.name(),
            remaining_seconds = self.remaining_seconds,
            "phase completed"
        );

        PhaseCompletion {
            finished,
            next,
            completed_sessions: credit.as_ref().map(|credit| credit.count),
            task_name: credit.map(|credit| credit.name),
        }
    }
}

struct SessionCredit {
    count: u32,
    repeats: u32,
    name: String,
}

/// Add one completed session to the current task, if any
fn credit_current_task(registry: &mut TaskRegistry) -> Option<SessionCredit> {
    let task = registry.current()?;
    let id = task.id;
    let credit = SessionCredit {
        count: task.completed_sessions.saturating_add(1),
        repeats: task.repeats,
        name: task.name.clone(),
    };
    if let Err(error) = registry.update(id, &TaskPatch::completed_sessions(credit.count)) {
        tracing::error!(task_id = %id, %error, "failed to record completed session");
    }
    Some(credit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskDraft;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn registry_with_current(focus: u32, short: u32, long: u32, repeats: u32) -> TaskRegistry {
        let mut registry = TaskRegistry::new();
        let task = registry
            .create(TaskDraft::new("Deep work", focus, short, long, repeats))
            .unwrap();
        registry.set_current(Some(task.id));
        registry
    }

    /// Tick until the running phase completes
    fn run_phase(machine: &mut SessionMachine, registry: &mut TaskRegistry) -> PhaseCompletion {
        assert!(machine.start());
        loop {
            match machine.tick(registry, PhaseDurations::default()) {
                TickOutcome::Completed(completion) => return completion,
                TickOutcome::Counted { .. } => {}
                TickOutcome::Stopped => panic!("machine stopped before completing"),
            }
        }
    }

    #[test]
    fn test_new_starts_paused_work() {
        let machine = SessionMachine::new(PhaseDurations::default());
        assert_eq!(machine.phase(), Phase::Work);
        assert_eq!(machine.remaining_seconds(), 25 * 60);
        assert!(!machine.is_running());
    }

    #[test]
    fn test_start_and_pause_are_idempotent() {
        let mut machine = SessionMachine::new(PhaseDurations::default());
        assert!(machine.start());
        assert!(!machine.start());
        assert!(machine.pause());
        assert!(!machine.pause());
    }

    #[test]
    fn test_start_refuses_empty_countdown() {
        let mut machine = SessionMachine::new(PhaseDurations::default());
        machine.remaining_seconds = 0;
        assert!(!machine.start());
        assert!(!machine.is_running());
    }

    #[test]
    fn test_pause_resume_without_ticks_keeps_remaining() {
        let mut registry = TaskRegistry::new();
        let mut machine = SessionMachine::new(PhaseDurations::default());
        machine.start();
        machine.tick(&mut registry, PhaseDurations::default());
        let before = machine.remaining_seconds();

        machine.pause();
        machine.start();
        machine.pause();
        assert_eq!(machine.remaining_seconds(), before);
    }

    #[test]
    fn test_tick_while_paused_does_nothing() {
        let mut registry = TaskRegistry::new();
        let mut machine = SessionMachine::new(PhaseDurations::default());
        assert_eq!(
            machine.tick(&mut registry, PhaseDurations::default()),
            TickOutcome::Stopped
        );
        assert_eq!(machine.remaining_seconds(), 25 * 60);
    }

    #[test]
    fn test_tick_counts_down_one_second() {
        let mut registry = TaskRegistry::new();
        let mut machine = SessionMachine::new(PhaseDurations::default());
        machine.start();
        assert_eq!(
            machine.tick(&mut registry, PhaseDurations::default()),
            TickOutcome::Counted {
                remaining_seconds: 25 * 60 - 1
            }
        );
    }

    #[test]
    fn test_work_completion_credits_current_task() {
        let mut registry = registry_with_current(1, 2, 3, 4);
        let mut machine = SessionMachine::new(PhaseDurations::from_task(registry.current().unwrap()));

        let completion = run_phase(&mut machine, &mut registry);
        assert_eq!(completion.finished, Phase::Work);
        assert_eq!(completion.next, Phase::ShortBreak);
        assert_eq!(completion.completed_sessions, Some(1));
        assert_eq!(registry.current().unwrap().completed_sessions, 1);

        // Next phase uses its own duration and does not auto-start
        assert_eq!(machine.phase(), Phase::ShortBreak);
        assert_eq!(machine.remaining_seconds(), 2 * 60);
        assert!(!machine.is_running());
    }

    #[test]
    fn test_long_break_every_repeats_sessions() {
        let mut registry = registry_with_current(1, 2, 3, 4);
        let mut machine = SessionMachine::new(PhaseDurations::from_task(registry.current().unwrap()));

        let mut next_after_work = Vec::new();
        for _ in 0..8 {
            let work = run_phase(&mut machine, &mut registry);
            next_after_work.push(work.next);
            let expected_break_seconds = match work.next {
                Phase::LongBreak => 3 * 60,
                _ => 2 * 60,
            };
            assert_eq!(machine.remaining_seconds(), expected_break_seconds);

            let rest = run_phase(&mut machine, &mut registry);
            assert_eq!(rest.next, Phase::Work);
            assert_eq!(rest.completed_sessions, None);
            assert_eq!(machine.remaining_seconds(), 60);
        }

        use Phase::{LongBreak as L, ShortBreak as S};
        assert_eq!(next_after_work, vec![S, S, S, L, S, S, S, L]);
        assert_eq!(registry.current().unwrap().completed_sessions, 8);
    }

    #[test]
    fn test_work_completion_without_task_goes_to_short_break() {
        let mut registry = TaskRegistry::new();
        let fallback = PhaseDurations {
            work: 1,
            short_break: 7,
            long_break: 20,
        };
        let mut machine = SessionMachine::new(fallback);
        machine.start();
        let mut outcome = TickOutcome::Stopped;
        for _ in 0..60 {
            outcome = machine.tick(&mut registry, fallback);
        }
        match outcome {
            TickOutcome::Completed(completion) => {
                assert_eq!(completion.next, Phase::ShortBreak);
                assert_eq!(completion.completed_sessions, None);
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(machine.remaining_seconds(), 7 * 60);
    }

    #[test]
    fn test_changing_current_task_does_not_rescale_countdown() {
        let mut registry = registry_with_current(10, 2, 3, 4);
        let mut machine = SessionMachine::new(PhaseDurations::from_task(registry.current().unwrap()));
        machine.start();
        machine.tick(&mut registry, PhaseDurations::default());

        let other = registry
            .create(TaskDraft::new("Other", 50, 9, 30, 2))
            .unwrap();
        registry.set_current(Some(other.id));
        assert_eq!(machine.remaining_seconds(), 10 * 60 - 1);

        // The next phase picks up the new task's values
        machine.remaining_seconds = 1;
        machine.tick(&mut registry, PhaseDurations::default());
        assert_eq!(machine.phase(), Phase::ShortBreak);
        assert_eq!(machine.remaining_seconds(), 9 * 60);
        assert_eq!(registry.get(other.id).unwrap().completed_sessions, 1);
    }

    #[test]
    fn test_reset_returns_to_full_work_phase() {
        let mut registry = registry_with_current(1, 2, 3, 4);
        let durations = PhaseDurations::from_task(registry.current().unwrap());
        let mut machine = SessionMachine::new(durations);
        run_phase(&mut machine, &mut registry);
        machine.start();

        machine.reset(durations);
        assert_eq!(machine.phase(), Phase::Work);
        assert_eq!(machine.remaining_seconds(), 60);
        assert!(!machine.is_running());
    }

    #[test]
    fn test_rewind_keeps_phase() {
        let mut registry = TaskRegistry::new();
        let mut machine = SessionMachine::restore(Some(100), Some(Phase::LongBreak), PhaseDurations::default());
        assert!(!machine.is_fresh(PhaseDurations::default()));
        machine.start();
        machine.tick(&mut registry, PhaseDurations::default());

        let longer = PhaseDurations {
            long_break: 20,
            ..PhaseDurations::default()
        };
        machine.rewind(longer);
        assert_eq!(machine.phase(), Phase::LongBreak);
        assert_eq!(machine.remaining_seconds(), 20 * 60);
        assert!(!machine.is_running());
        assert!(machine.is_fresh(longer));
    }

    #[test]
    fn test_restore_keeps_positive_countdown() {
        let machine = SessionMachine::restore(Some(42), Some(Phase::LongBreak), PhaseDurations::default());
        assert_eq!(machine.remaining_seconds(), 42);
        assert_eq!(machine.phase(), Phase::LongBreak);
        assert!(!machine.is_running());
    }

    #[test]
    fn test_restore_without_countdown_uses_phase_duration() {
        let durations = PhaseDurations {
            work: 30,
            short_break: 6,
            long_break: 18,
        };
        let machine = SessionMachine::restore(Some(0), Some(Phase::ShortBreak), durations);
        assert_eq!(machine.remaining_seconds(), 6 * 60);

        let machine = SessionMachine::restore(None, None, durations);
        assert_eq!(machine.phase(), Phase::Work);
        assert_eq!(machine.remaining_seconds(), 30 * 60);
    }

    proptest! {
        #[test]
        fn prop_long_break_iff_multiple_of_repeats(repeats in 1u32..7, sessions in 1usize..20) {
            let mut registry = registry_with_current(1, 1, 1, repeats);
            let mut machine = SessionMachine::new(PhaseDurations::from_task(registry.current().unwrap()));
            let mut previous = 0;
            for _ in 0..sessions {
                let work = run_phase(&mut machine, &mut registry);
                let count = work.completed_sessions.unwrap();
                prop_assert_eq!(count, previous + 1);
                previous = count;
                let expect_long = count % repeats == 0;
                prop_assert_eq!(work.next == Phase::LongBreak, expect_long);
                run_phase(&mut machine, &mut registry);
            }
        }
    }
}
