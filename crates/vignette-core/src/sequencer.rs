//! Ordered step runner with explicit completion signalling.
//!
//! A sequence is a list of [`Step`]s. Each step receives a single-use
//! [`Completion`] and must call [`Completion::complete`] once it is done,
//! either immediately or later (typically from an interpolator's completion
//! callback). The next step starts only after that.
//!
//! Synchronous completion does not recurse: the dispatch loop notices the
//! step already finished and moves on, so long chains of instant steps run in
//! constant stack depth.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::SequenceError;

/// One step of a sequence.
pub type Step = Box<dyn FnOnce(Completion)>;

#[derive(Default)]
struct SequencerState {
    label: String,
    steps: VecDeque<Step>,
    /// Index of the step currently running (or about to run)
    cursor: usize,
    running: bool,
    /// Current step was started and has not signalled yet
    awaiting: bool,
    /// A dispatch loop is on the stack
    dispatching: bool,
    /// Distinguishes completions of an earlier sequence from the current one
    generation: u64,
}

/// Runs one sequence at a time. Cloning shares the same sequencer.
#[derive(Clone, Default)]
pub struct ActionSequencer {
    state: Rc<RefCell<SequencerState>>,
}

impl ActionSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start running `steps`. The first step is invoked before this returns.
    ///
    /// Returns [`SequenceError::Busy`] if a sequence is already running; steps
    /// of two sequences are never interleaved.
    pub fn run(&self, label: impl Into<String>, steps: Vec<Step>) -> Result<(), SequenceError> {
        {
            let mut state = self.state.borrow_mut();
            if state.running {
                log::warn!(
                    "Rejected sequence while '{}' is at step {}",
                    state.label,
                    state.cursor
                );
                return Err(SequenceError::Busy);
            }
            state.label = label.into();
            state.steps = steps.into();
            state.cursor = 0;
            state.running = true;
            state.awaiting = false;
            state.generation = state.generation.wrapping_add(1);
            log::debug!(
                "Sequence '{}' started with {} steps",
                state.label,
                state.steps.len()
            );
        }
        Self::dispatch(&self.state);
        Ok(())
    }

    /// Abandon the running sequence, if any. Steps not yet started are
    /// dropped and the completion handed to the current step goes stale.
    ///
    /// Returns whether a sequence was running.
    pub fn abort(&self) -> bool {
        let dropped = {
            let mut state = self.state.borrow_mut();
            if !state.running {
                return false;
            }
            log::info!(
                "Sequence '{}' aborted at step {}",
                state.label,
                state.cursor
            );
            state.running = false;
            state.awaiting = false;
            state.generation = state.generation.wrapping_add(1);
            std::mem::take(&mut state.steps)
        };
        // Steps may own handles to us; drop them outside the borrow
        drop(dropped);
        true
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    /// Index of the step currently running.
    pub fn cursor(&self) -> usize {
        self.state.borrow().cursor
    }

    /// Steps not yet started.
    pub fn remaining(&self) -> usize {
        self.state.borrow().steps.len()
    }

    fn dispatch(state: &Rc<RefCell<SequencerState>>) {
        loop {
            let (step, completion) = {
                let mut s = state.borrow_mut();
                if s.dispatching || s.awaiting {
                    return;
                }
                match s.steps.pop_front() {
                    None => {
                        s.running = false;
                        log::debug!("Sequence '{}' finished after {} steps", s.label, s.cursor);
                        return;
                    }
                    Some(step) => {
                        s.dispatching = true;
                        s.awaiting = true;
                        log::debug!("Sequence '{}' step {}", s.label, s.cursor);
                        let completion = Completion {
                            sequencer: Rc::downgrade(state),
                            generation: s.generation,
                            step: s.cursor,
                            signalled: false,
                        };
                        (step, completion)
                    }
                }
            };

            step(completion);

            let mut s = state.borrow_mut();
            s.dispatching = false;
            if s.awaiting {
                // Completes later; `Completion::complete` resumes dispatch
                return;
            }
        }
    }
}

impl fmt::Debug for ActionSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ActionSequencer")
            .field("label", &state.label)
            .field("running", &state.running)
            .field("cursor", &state.cursor)
            .field("remaining", &state.steps.len())
            .finish()
    }
}

/// Single-use handle a step calls to let the sequencer advance.
///
/// `complete` consumes the handle, so a step cannot signal twice through the
/// same handle. A handle that belongs to a step the sequencer has already
/// moved past is rejected with [`SequenceError::StaleCompletion`].
#[must_use = "the sequence stalls until the step completes"]
pub struct Completion {
    sequencer: Weak<RefCell<SequencerState>>,
    generation: u64,
    step: usize,
    signalled: bool,
}

impl Completion {
    /// Index of the step this handle belongs to.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Signal that the step is done and start the next one.
    pub fn complete(mut self) -> Result<(), SequenceError> {
        self.signalled = true;
        let state = self
            .sequencer
            .upgrade()
            .ok_or(SequenceError::Detached { step: self.step })?;

        {
            let mut s = state.borrow_mut();
            if s.generation != self.generation || s.cursor != self.step || !s.awaiting {
                log::error!(
                    "Step {} of '{}' signalled completion out of turn (cursor {})",
                    self.step,
                    s.label,
                    s.cursor
                );
                return Err(SequenceError::StaleCompletion {
                    step: self.step,
                    cursor: s.cursor,
                });
            }
            s.awaiting = false;
            s.cursor += 1;
            if s.dispatching {
                // Completed inside the step call; the running loop continues
                return Ok(());
            }
        }

        ActionSequencer::dispatch(&state);
        Ok(())
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.signalled {
            return;
        }
        let Some(state) = self.sequencer.upgrade() else {
            return;
        };
        // Handles of an aborted or finished sequence are dropped silently
        let stalls = state
            .try_borrow()
            .map(|s| s.generation == self.generation && s.awaiting && s.cursor == self.step)
            .unwrap_or(true);
        if stalls {
            log::warn!(
                "Completion for step {} dropped without signalling; the sequence will stall",
                self.step
            );
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("step", &self.step)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn step(f: impl FnOnce(Completion) + 'static) -> Step {
        Box::new(f)
    }

    fn recording(log: &Log, name: &'static str) -> Step {
        let log = log.clone();
        step(move |done| {
            log.borrow_mut().push(name);
            done.complete().unwrap();
        })
    }

    #[test]
    fn test_synchronous_steps_run_in_order() {
        let log: Log = Rc::default();
        let seq = ActionSequencer::new();
        seq.run(
            "sync",
            vec![recording(&log, "a"), recording(&log, "b"), recording(&log, "c")],
        )
        .unwrap();
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert!(!seq.is_running());
        assert_eq!(seq.cursor(), 3);
    }

    #[test]
    fn test_asynchronous_step_blocks_successor() {
        let log: Log = Rc::default();
        let parked: Rc<RefCell<Option<Completion>>> = Rc::default();

        let seq = ActionSequencer::new();
        let park = parked.clone();
        let log_b = log.clone();
        seq.run(
            "async",
            vec![
                recording(&log, "a"),
                step(move |done| {
                    log_b.borrow_mut().push("b");
                    *park.borrow_mut() = Some(done);
                }),
                recording(&log, "c"),
            ],
        )
        .unwrap();

        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert!(seq.is_running());
        assert_eq!(seq.cursor(), 1);
        assert_eq!(seq.remaining(), 1);

        let done = parked.borrow_mut().take().unwrap();
        done.complete().unwrap();
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert!(!seq.is_running());
    }

    #[test]
    fn test_busy_rejects_second_sequence() {
        let parked: Rc<RefCell<Option<Completion>>> = Rc::default();
        let seq = ActionSequencer::new();
        let park = parked.clone();
        seq.run(
            "first",
            vec![step(move |done| *park.borrow_mut() = Some(done))],
        )
        .unwrap();

        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        let err = seq
            .run(
                "second",
                vec![step(move |done| {
                    flag.set(true);
                    done.complete().unwrap();
                })],
            )
            .unwrap_err();
        assert_eq!(err, SequenceError::Busy);
        assert!(!ran.get());

        parked.borrow_mut().take().unwrap().complete().unwrap();
        assert!(!seq.is_running());
    }

    #[test]
    fn test_empty_sequence_finishes_immediately() {
        let seq = ActionSequencer::new();
        seq.run("empty", Vec::new()).unwrap();
        assert!(!seq.is_running());
    }

    #[test]
    fn test_stale_completion_rejected() {
        let parked: Rc<RefCell<Vec<Completion>>> = Rc::default();
        let seq = ActionSequencer::new();

        let park = parked.clone();
        seq.run(
            "one",
            vec![step(move |done| park.borrow_mut().push(done))],
        )
        .unwrap();
        let first = parked.borrow_mut().pop().unwrap();
        first.complete().unwrap();

        // A completion left over from an earlier sequence cannot advance a new one
        let park = parked.clone();
        seq.run(
            "two",
            vec![
                step(move |done| park.borrow_mut().push(done)),
                step(|done| done.complete().unwrap()),
            ],
        )
        .unwrap();
        let current = parked.borrow_mut().pop().unwrap();
        let forged = Completion {
            sequencer: current.sequencer.clone(),
            generation: current.generation - 1,
            step: 0,
            signalled: false,
        };
        assert_eq!(
            forged.complete().unwrap_err(),
            SequenceError::StaleCompletion { step: 0, cursor: 0 }
        );
        assert!(seq.is_running());
        current.complete().unwrap();
        assert!(!seq.is_running());
    }

    #[test]
    fn test_detached_when_sequencer_dropped() {
        let parked: Rc<RefCell<Option<Completion>>> = Rc::default();
        let park = parked.clone();
        {
            let seq = ActionSequencer::new();
            seq.run("dropped", vec![step(move |done| *park.borrow_mut() = Some(done))])
                .unwrap();
        }
        let done = parked.borrow_mut().take().unwrap();
        assert_eq!(done.complete().unwrap_err(), SequenceError::Detached { step: 0 });
    }

    #[test]
    fn test_abort_frees_sequencer_and_stales_handle() {
        let log: Log = Rc::default();
        let parked: Rc<RefCell<Option<Completion>>> = Rc::default();
        let seq = ActionSequencer::new();

        let park = parked.clone();
        seq.run(
            "interrupted",
            vec![
                step(move |done| *park.borrow_mut() = Some(done)),
                recording(&log, "never"),
            ],
        )
        .unwrap();
        assert!(seq.is_running());

        assert!(seq.abort());
        assert!(!seq.is_running());
        assert_eq!(seq.remaining(), 0);
        assert!(!seq.abort());

        let leftover = parked.borrow_mut().take().unwrap();
        assert_eq!(
            leftover.complete().unwrap_err(),
            SequenceError::StaleCompletion { step: 0, cursor: 0 }
        );

        seq.run("next", vec![recording(&log, "fresh")]).unwrap();
        assert_eq!(*log.borrow(), vec!["fresh"]);
        assert!(!seq.is_running());
    }

    #[test]
    fn test_step_may_start_follow_up_sequence_after_finish() {
        let seq = ActionSequencer::new();
        let log: Log = Rc::default();
        seq.run("first", vec![recording(&log, "a")]).unwrap();
        seq.run("second", vec![recording(&log, "b")]).unwrap();
        assert_eq!(*log.borrow(), vec!["a", "b"]);
    }
}
