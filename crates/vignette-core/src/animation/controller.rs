//! Owner of all running interpolators, advanced once per frame.

use std::cell::RefCell;
use std::rc::Rc;

use super::interpolator::Interpolator;

/// Identifier handed out by [`InterpolatorController::add`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct InterpolatorId(pub u64);

#[derive(Debug, Default)]
struct ControllerState {
    /// Interpolators swept by the next tick
    active: Vec<(InterpolatorId, Interpolator)>,
    /// Added since the last sweep began; promoted at the start of the next tick
    pending: Vec<(InterpolatorId, Interpolator)>,
    next_id: u64,
    ticking: bool,
    /// Bumped by `clear` so a sweep in progress knows to discard its set
    epoch: u64,
}

/// Handle to the set of active interpolators.
///
/// Cloning the handle shares the same set, so sequencer steps can register
/// interpolators while the owning game loop drives [`tick`](Self::tick).
///
/// Each tick advances every interpolator exactly once. The active set is
/// taken out of the shared state for the sweep, so completion callbacks that
/// add new interpolators (or start new sequences) never disturb it: anything
/// added mid-tick waits for the next tick. Finished interpolators are removed
/// after the sweep.
#[derive(Clone, Debug, Default)]
pub struct InterpolatorController {
    state: Rc<RefCell<ControllerState>>,
}

impl InterpolatorController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an interpolator. It is first advanced by the next tick.
    ///
    /// Ownership moves into the controller, so the same instance can never be
    /// registered twice.
    pub fn add(&self, interpolator: Interpolator) -> InterpolatorId {
        let mut state = self.state.borrow_mut();
        let id = InterpolatorId(state.next_id);
        state.next_id = state.next_id.wrapping_add(1);
        log::trace!("add interpolator {:?} on {}", id, interpolator.target().name());
        state.pending.push((id, interpolator));
        id
    }

    /// Advance every active interpolator by `dt` seconds and drop the ones
    /// that finished.
    pub fn tick(&self, dt: f32) {
        let (mut sweep, epoch) = {
            let mut state = self.state.borrow_mut();
            if state.ticking {
                log::warn!("InterpolatorController::tick re-entered from a completion callback, ignoring");
                return;
            }
            state.ticking = true;
            let pending = std::mem::take(&mut state.pending);
            state.active.extend(pending);
            (std::mem::take(&mut state.active), state.epoch)
        };

        // No borrow is held here: callbacks may call `add` or `clear`.
        for (_, interpolator) in sweep.iter_mut() {
            if self.state.borrow().epoch != epoch {
                // Cleared by a callback; the rest of the sweep is discarded
                break;
            }
            interpolator.advance(dt);
        }
        sweep.retain(|(_, interpolator)| !interpolator.is_finished());

        let mut state = self.state.borrow_mut();
        state.ticking = false;
        if state.epoch == epoch {
            state.active = sweep;
        }
    }

    /// Number of registered interpolators, including ones waiting for their
    /// first tick.
    pub fn len(&self) -> usize {
        let state = self.state.borrow();
        state.active.len() + state.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: InterpolatorId) -> bool {
        let state = self.state.borrow();
        state
            .active
            .iter()
            .chain(state.pending.iter())
            .any(|(i, _)| *i == id)
    }

    /// Drop every interpolator without firing completion callbacks.
    pub fn clear(&self) {
        let (active, pending) = {
            let mut state = self.state.borrow_mut();
            state.epoch = state.epoch.wrapping_add(1);
            (
                std::mem::take(&mut state.active),
                std::mem::take(&mut state.pending),
            )
        };
        // Dropped outside the borrow; callbacks may own handles to us
        drop(active);
        drop(pending);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Property;
    use std::cell::Cell;

    #[test]
    fn test_each_interpolator_advanced_once_per_tick() {
        let controller = InterpolatorController::new();
        let props: Vec<Property> = (0..5).map(|i| Property::new(format!("p{}", i), 0.0)).collect();
        for p in &props {
            controller.add(Interpolator::new(p.clone(), 0.0, 10.0, 1.0).unwrap());
        }
        controller.tick(0.1);
        for p in &props {
            assert!((p.get() - 1.0).abs() < 1e-4);
        }
        assert_eq!(controller.len(), 5);
    }

    #[test]
    fn test_completed_removed_after_tick() {
        let controller = InterpolatorController::new();
        let short = Property::new("short", 0.0);
        let long = Property::new("long", 0.0);
        let short_id = controller.add(Interpolator::new(short.clone(), 0.0, 1.0, 0.1).unwrap());
        let long_id = controller.add(Interpolator::new(long.clone(), 0.0, 1.0, 1.0).unwrap());

        controller.tick(0.2);
        assert!(!controller.contains(short_id));
        assert!(controller.contains(long_id));
        assert_eq!(short.get(), 1.0);

        // The finished one is not touched again
        short.set(5.0);
        controller.tick(0.2);
        assert_eq!(short.get(), 5.0);
    }

    #[test]
    fn test_additions_from_callbacks_wait_for_next_tick() {
        let controller = InterpolatorController::new();
        let first = Property::new("first", 0.0);
        let second = Property::new("second", 0.0);

        let handle = controller.clone();
        let chained = second.clone();
        controller.add(
            Interpolator::new(first.clone(), 0.0, 1.0, 0.5)
                .unwrap()
                .on_complete(move || {
                    handle.add(Interpolator::new(chained, 0.0, 1.0, 1.0).unwrap());
                }),
        );

        controller.tick(0.5);
        assert_eq!(first.get(), 1.0);
        // Added mid-tick: registered but not yet advanced
        assert_eq!(second.get(), 0.0);
        assert_eq!(controller.len(), 1);

        controller.tick(0.5);
        assert!((second.get() - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_sibling_not_skipped_when_neighbour_completes() {
        let controller = InterpolatorController::new();
        let values: Vec<Property> = (0..4).map(|i| Property::new(format!("v{}", i), 0.0)).collect();
        let durations = [0.1, 1.0, 0.1, 1.0];
        for (p, d) in values.iter().zip(durations) {
            controller.add(Interpolator::new(p.clone(), 0.0, 1.0, d).unwrap());
        }

        controller.tick(0.1);
        assert_eq!(values[0].get(), 1.0);
        assert!((values[1].get() - 0.1).abs() < 1e-4);
        assert_eq!(values[2].get(), 1.0);
        assert!((values[3].get() - 0.1).abs() < 1e-4);
        assert_eq!(controller.len(), 2);
    }

    #[test]
    fn test_clear_from_callback_stops_sweep() {
        let controller = InterpolatorController::new();
        let sibling_fired = Rc::new(Cell::new(0));
        let sibling = Property::new("sibling", 0.0);

        let handle = controller.clone();
        controller.add(
            Interpolator::new(Property::new("first", 0.0), 0.0, 1.0, 0.1)
                .unwrap()
                .on_complete(move || handle.clear()),
        );
        let count = sibling_fired.clone();
        controller.add(
            Interpolator::new(sibling.clone(), 0.0, 1.0, 0.1)
                .unwrap()
                .on_complete(move || count.set(count.get() + 1)),
        );

        controller.tick(0.5);
        assert_eq!(sibling_fired.get(), 0);
        assert_eq!(sibling.get(), 0.0);
        assert!(controller.is_empty());
    }

    #[test]
    fn test_clear_drops_without_callbacks() {
        let controller = InterpolatorController::new();
        let fired = std::rc::Rc::new(Cell::new(false));
        let flag = fired.clone();
        controller.add(
            Interpolator::new(Property::new("p", 0.0), 0.0, 1.0, 0.1)
                .unwrap()
                .on_complete(move || flag.set(true)),
        );
        controller.clear();
        controller.tick(1.0);
        assert!(controller.is_empty());
        assert!(!fired.get());
    }
}
