//! Input routing to the active scene.

use std::cell::RefCell;
use std::rc::Rc;

use super::SceneId;

/// The process-wide "current scene" for input routing, passed to the
/// orchestrator as an explicit dependency.
///
/// `set_active_scene` is the only mutation path. During a transition the
/// orchestrator is its only caller.
pub trait SceneRouter {
    fn set_active_scene(&mut self, scene: Option<&SceneId>);

    fn active_scene(&self) -> Option<SceneId>;
}

#[derive(Debug, Default)]
struct RoutingState {
    active: Option<SceneId>,
    history: Vec<Option<SceneId>>,
}

/// Default [`SceneRouter`]: remembers the routed scene and every change.
///
/// Clones share state, so the host can keep one handle while the orchestrator
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    state: Rc<RefCell<RoutingState>>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every value passed to `set_active_scene`, oldest first.
    pub fn history(&self) -> Vec<Option<SceneId>> {
        self.state.borrow().history.clone()
    }

    pub fn is_detached(&self) -> bool {
        self.state.borrow().active.is_none()
    }
}

impl SceneRouter for RoutingTable {
    fn set_active_scene(&mut self, scene: Option<&SceneId>) {
        let mut state = self.state.borrow_mut();
        match scene {
            Some(id) => log::debug!("Input routed to '{}'", id),
            None => log::debug!("Input routing detached"),
        }
        state.active = scene.cloned();
        state.history.push(scene.cloned());
    }

    fn active_scene(&self) -> Option<SceneId> {
        self.state.borrow().active.clone()
    }
}
