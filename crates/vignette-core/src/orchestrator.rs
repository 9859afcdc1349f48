//! Scene transition state machine.
//!
//! [`SceneOrchestrator::notify`] builds a three-step sequence on the
//! [`ActionSequencer`]. Steps that wait on an animation register an
//! [`Interpolator`] whose completion callback signals the step's
//! [`Completion`], so the sequence advances from inside
//! [`SceneOrchestrator::tick`].
//!
//! Cross-fade:
//! 1. detach input, fade the overlay in
//! 2. save, exit the outgoing scene, load the incoming one, fade the overlay out
//! 3. route input to the new scene
//!
//! Slide (incoming scene built off-screen and paused beforehand):
//! 1. detach input, pause the outgoing scene, slide both scenes over `2 * fade_time`
//! 2. save, exit the outgoing scene, resume the incoming one
//! 3. route input to the new scene
//!
//! The incoming scene is always built before anything is torn down, so a
//! content error leaves the current scene active and routed.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::animation::{Interpolator, InterpolatorController, Property};
use crate::error::{SequenceError, TransitionError};
use crate::scene::{
    ContextMenu, Direction, GameSession, InputEvent, Scene, SceneId, SceneRegistry, SceneRouter,
    TransitionRequest,
};
use crate::sequencer::{ActionSequencer, Completion, Step};

/// Timing and geometry of transitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitionSettings {
    /// Seconds for each half of a cross-fade; slides take twice as long
    pub fade_time: f32,
    /// Viewport size in screen pixels; slides travel one full extent
    pub viewport: Vec2,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            fade_time: 0.5,
            viewport: Vec2::new(1280.0, 720.0),
        }
    }
}

impl TransitionSettings {
    pub fn validate(&self) -> Result<(), TransitionError> {
        if !(self.fade_time > 0.0) {
            return Err(TransitionError::InvalidSettings(format!(
                "fade_time must be positive, got {}",
                self.fade_time
            )));
        }
        if !(self.viewport.x > 0.0 && self.viewport.y > 0.0) {
            return Err(TransitionError::InvalidSettings(format!(
                "viewport must be positive, got {}x{}",
                self.viewport.x, self.viewport.y
            )));
        }
        Ok(())
    }
}

/// Where the orchestrator is in the transition state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionState {
    /// A scene is active, routed and accepting input
    Idle,
    TransitioningOut,
    Swapping,
    TransitioningIn,
    /// `notify` was called without a next scene; the session shows its prompt
    AwaitingQuitConfirmation,
}

/// Full-screen fade overlay. Opacity runs from 0 (clear) to 255 (opaque).
#[derive(Debug, Clone)]
pub struct Overlay {
    pub opacity: Property,
}

impl Overlay {
    pub const OPAQUE: f32 = 255.0;
    pub const CLEAR: f32 = 0.0;

    fn new() -> Self {
        Self {
            opacity: Property::new("overlay.opacity", Self::CLEAR),
        }
    }
}

struct StagedScene {
    scene: Box<dyn Scene>,
    paused: bool,
}

impl StagedScene {
    fn new(scene: Box<dyn Scene>) -> Self {
        Self {
            scene,
            paused: false,
        }
    }

    fn pause(&mut self) {
        if !self.paused {
            self.paused = true;
            self.scene.pause();
        }
    }

    fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.scene.resume();
        }
    }
}

/// State mutated by sequencer steps.
struct Stage {
    active: Option<StagedScene>,
    /// Slide target, built and paused before the sequence starts
    incoming: Option<StagedScene>,
    state: TransitionState,
    session: Box<dyn GameSession>,
    router: Box<dyn SceneRouter>,
    menu: Option<Box<dyn ContextMenu>>,
    save_failures: usize,
    transitions_completed: usize,
}

impl Stage {
    fn set_state(&mut self, state: TransitionState) {
        if self.state != state {
            log::info!("Transition state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn active_id(&self) -> Option<SceneId> {
        self.active.as_ref().map(|s| s.scene.id().clone())
    }

    fn save(&mut self) {
        if let Err(e) = self.session.save() {
            self.save_failures += 1;
            log::error!("Save before scene swap failed: {:#}", e);
        }
    }

    /// Exit the outgoing scene, returning its id.
    fn retire_active(&mut self) -> Option<SceneId> {
        let mut outgoing = self.active.take()?;
        let id = outgoing.scene.id().clone();
        outgoing.scene.exit();
        log::debug!("Scene '{}' exited", id);
        Some(id)
    }

    fn reattach(&mut self) {
        let id = self.active_id();
        self.router.set_active_scene(id.as_ref());
    }
}

/// Signal a step from a context that cannot propagate errors.
fn signal(done: Completion) {
    if let Err(e) = done.complete() {
        log::error!("Transition step completion rejected: {}", e);
    }
}

/// Animate `property` and complete `done` when it arrives.
fn animate_then(
    animations: &InterpolatorController,
    property: Property,
    start: f32,
    end: f32,
    duration: f32,
    done: Completion,
) {
    match Interpolator::new(property.clone(), start, end, duration) {
        Ok(interpolator) => {
            animations.add(interpolator.on_complete(move || signal(done)));
        }
        Err(e) => {
            log::error!("Skipping animation of {}: {}", property.name(), e);
            property.set(end);
            signal(done);
        }
    }
}

/// Coordinates scene transitions and owns the active scene.
pub struct SceneOrchestrator {
    stage: Rc<RefCell<Stage>>,
    registry: SceneRegistry,
    sequencer: ActionSequencer,
    animations: InterpolatorController,
    overlay: Overlay,
    settings: TransitionSettings,
}

impl SceneOrchestrator {
    pub fn new(
        settings: TransitionSettings,
        registry: SceneRegistry,
        session: Box<dyn GameSession>,
        router: Box<dyn SceneRouter>,
    ) -> Result<Self, TransitionError> {
        settings.validate()?;
        Ok(Self {
            stage: Rc::new(RefCell::new(Stage {
                active: None,
                incoming: None,
                state: TransitionState::Idle,
                session,
                router,
                menu: None,
                save_failures: 0,
                transitions_completed: 0,
            })),
            registry,
            sequencer: ActionSequencer::new(),
            animations: InterpolatorController::new(),
            overlay: Overlay::new(),
            settings,
        })
    }

    /// Attach the context menu hidden at the start of each transition.
    pub fn with_menu(self, menu: Box<dyn ContextMenu>) -> Self {
        self.stage.borrow_mut().menu = Some(menu);
        self
    }

    /// Activate `initial` immediately, without a transition or a save.
    pub fn start(&mut self, initial: impl Into<SceneId>) -> Result<(), TransitionError> {
        if self.sequencer.is_running() {
            return Err(SequenceError::Busy.into());
        }
        let id = initial.into();
        let mut scene = self.registry.build(&id)?;
        scene.load();

        let mut stage = self.stage.borrow_mut();
        stage.retire_active();
        stage.active = Some(StagedScene::new(scene));
        stage.router.set_active_scene(Some(&id));
        stage.set_state(TransitionState::Idle);
        log::info!("Started in scene '{}'", id);
        Ok(())
    }

    /// Hand over to `next`, or ask the session to quit when `next` is `None`.
    ///
    /// Fails without side effects if another transition is in flight or the
    /// incoming scene cannot be built.
    pub fn notify(
        &mut self,
        next: Option<SceneId>,
        direction: Direction,
    ) -> Result<(), TransitionError> {
        if self.sequencer.is_running() {
            log::warn!("Transition requested while another is in flight");
            return Err(SequenceError::Busy.into());
        }

        let Some(next) = next else {
            let mut stage = self.stage.borrow_mut();
            stage.router.set_active_scene(None);
            stage.set_state(TransitionState::AwaitingQuitConfirmation);
            stage.session.prompt_quit();
            return Ok(());
        };

        let incoming = match self.registry.build(&next) {
            Ok(scene) => scene,
            Err(e) => {
                log::error!("Transition to '{}' aborted: {}", next, e);
                return Err(e.into());
            }
        };

        if let Some(menu) = self.stage.borrow_mut().menu.as_mut() {
            menu.hide();
        }

        log::info!(
            "Transition {:?} -> '{}' ({:?})",
            self.stage.borrow().active_id().map(|id| id.0),
            next,
            direction
        );
        let steps = if direction.is_slide() {
            self.slide_steps(incoming, direction)
        } else {
            self.cross_fade_steps(incoming)
        };
        self.sequencer.run(format!("transition to {}", next), steps)?;
        Ok(())
    }

    /// [`notify`](Self::notify) with the numeric direction convention
    /// (0 fade, 1 up, 2 right, 3 down, 4 left).
    pub fn notify_code(&mut self, next: Option<SceneId>, direction: u8) -> Result<(), TransitionError> {
        let direction = Direction::try_from(direction)?;
        self.notify(next, direction)
    }

    fn cross_fade_steps(&self, mut incoming: Box<dyn Scene>) -> Vec<Step> {
        let fade_time = self.settings.fade_time;

        let stage = self.stage.clone();
        let animations = self.animations.clone();
        let opacity = self.overlay.opacity.clone();
        let fade_in: Step = Box::new(move |done| {
            {
                let mut stage = stage.borrow_mut();
                stage.router.set_active_scene(None);
                stage.set_state(TransitionState::TransitioningOut);
            }
            animate_then(&animations, opacity, Overlay::CLEAR, Overlay::OPAQUE, fade_time, done);
        });

        let stage = self.stage.clone();
        let animations = self.animations.clone();
        let opacity = self.overlay.opacity.clone();
        let swap: Step = Box::new(move |done| {
            {
                let mut stage = stage.borrow_mut();
                stage.set_state(TransitionState::Swapping);
                stage.save();
                let previous = stage.retire_active();
                incoming.load();
                if let Some(previous) = &previous {
                    incoming.transition_from(previous);
                }
                stage.active = Some(StagedScene::new(incoming));
                stage.set_state(TransitionState::TransitioningIn);
            }
            animate_then(&animations, opacity, Overlay::OPAQUE, Overlay::CLEAR, fade_time, done);
        });

        vec![fade_in, swap, self.reattach_step()]
    }

    fn slide_steps(&self, mut incoming: Box<dyn Scene>, direction: Direction) -> Vec<Step> {
        let viewport = self.settings.viewport;
        let duration = 2.0 * self.settings.fade_time;
        let entry = direction.entry_offset(viewport);
        let exit = direction.exit_offset(viewport);
        let horizontal = matches!(direction, Direction::Left | Direction::Right);

        incoming.offset().set(entry);
        incoming.load();
        let mut staged = StagedScene::new(incoming);
        staged.pause();
        self.stage.borrow_mut().incoming = Some(staged);

        let stage = self.stage.clone();
        let animations = self.animations.clone();
        let slide: Step = Box::new(move |done| {
            let (outgoing, entering) = {
                let mut stage = stage.borrow_mut();
                stage.router.set_active_scene(None);
                stage.set_state(TransitionState::TransitioningOut);
                let outgoing = stage.active.as_mut().map(|out| {
                    out.pause();
                    out.scene.offset().clone()
                });
                let entering = stage.incoming.as_ref().map(|s| s.scene.offset().clone());
                (outgoing, entering)
            };
            let axis = |offset: &crate::scene::SceneOffset| {
                if horizontal {
                    offset.x.clone()
                } else {
                    offset.y.clone()
                }
            };
            let (exit_to, entry_from) = if horizontal {
                (exit.x, entry.x)
            } else {
                (exit.y, entry.y)
            };

            if let Some(out) = outgoing {
                match Interpolator::new(axis(&out), 0.0, exit_to, duration) {
                    Ok(interpolator) => {
                        animations.add(interpolator);
                    }
                    Err(e) => log::error!("Outgoing slide skipped: {}", e),
                }
            }
            match entering {
                Some(entering) => {
                    animate_then(&animations, axis(&entering), entry_from, 0.0, duration, done)
                }
                None => {
                    log::error!("Slide started without an incoming scene");
                    signal(done);
                }
            }
        });

        let stage = self.stage.clone();
        let swap: Step = Box::new(move |done| {
            {
                let mut stage = stage.borrow_mut();
                stage.set_state(TransitionState::Swapping);
                stage.save();
                let previous = stage.retire_active();
                if let Some(mut entering) = stage.incoming.take() {
                    if let Some(previous) = &previous {
                        entering.scene.transition_from(previous);
                    }
                    entering.resume();
                    stage.active = Some(entering);
                }
                stage.set_state(TransitionState::TransitioningIn);
            }
            signal(done);
        });

        vec![slide, swap, self.reattach_step()]
    }

    fn reattach_step(&self) -> Step {
        let stage = self.stage.clone();
        Box::new(move |done| {
            {
                let mut stage = stage.borrow_mut();
                stage.reattach();
                stage.transitions_completed += 1;
                stage.set_state(TransitionState::Idle);
            }
            signal(done);
        })
    }

    /// Leave the quit prompt and give input back to the active scene.
    pub fn cancel_quit(&mut self) -> bool {
        let mut stage = self.stage.borrow_mut();
        if stage.state != TransitionState::AwaitingQuitConfirmation {
            return false;
        }
        stage.reattach();
        stage.set_state(TransitionState::Idle);
        true
    }

    /// Advance animations (and through them any transition in flight), then
    /// update the active scene unless it is paused.
    pub fn tick(&mut self, dt: f32) -> Result<(), TransitionError> {
        self.animations.tick(dt);

        let request = {
            let mut stage = self.stage.borrow_mut();
            let request = match stage.active.as_mut() {
                Some(staged) if !staged.paused => staged.scene.update(dt),
                _ => None,
            };
            request
        };
        match request {
            Some(request) => self.apply(request),
            None => Ok(()),
        }
    }

    /// Deliver an input event to the active scene if input is routed to it.
    ///
    /// Returns whether the scene received the event.
    pub fn handle_input(&mut self, event: &InputEvent) -> Result<bool, TransitionError> {
        let (delivered, request) = {
            let mut guard = self.stage.borrow_mut();
            let stage = &mut *guard;
            let routed = stage.router.active_scene();
            let outcome = match (stage.active.as_mut(), routed) {
                (Some(staged), Some(routed)) if staged.scene.id() == &routed => {
                    (true, staged.scene.handle_input(event))
                }
                _ => (false, None),
            };
            outcome
        };
        if let Some(request) = request {
            self.apply(request)?;
        }
        Ok(delivered)
    }

    fn apply(&mut self, request: TransitionRequest) -> Result<(), TransitionError> {
        log::debug!("Scene requested {:?}", request);
        self.notify(request.next, request.direction)
    }

    /// Abandon any transition in flight, drop pending animations and exit
    /// every scene. The orchestrator can be started again afterwards.
    pub fn shutdown(&mut self) {
        if self.sequencer.abort() {
            log::warn!("Shutting down mid-transition");
        }
        self.animations.clear();
        self.overlay.opacity.set(Overlay::CLEAR);
        let mut stage = self.stage.borrow_mut();
        if let Some(mut incoming) = stage.incoming.take() {
            incoming.scene.exit();
        }
        stage.retire_active();
        stage.router.set_active_scene(None);
        stage.set_state(TransitionState::Idle);
        log::info!("Orchestrator shut down");
    }

    pub fn state(&self) -> TransitionState {
        self.stage.borrow().state
    }

    pub fn is_transitioning(&self) -> bool {
        self.sequencer.is_running()
    }

    pub fn active_scene_id(&self) -> Option<SceneId> {
        self.stage.borrow().active_id()
    }

    pub fn incoming_scene_id(&self) -> Option<SceneId> {
        self.stage
            .borrow()
            .incoming
            .as_ref()
            .map(|s| s.scene.id().clone())
    }

    /// Offset of the active scene, for drawing.
    pub fn active_offset(&self) -> Option<Vec2> {
        self.stage
            .borrow()
            .active
            .as_ref()
            .map(|s| s.scene.offset().get())
    }

    pub fn is_active_paused(&self) -> bool {
        self.stage
            .borrow()
            .active
            .as_ref()
            .map(|s| s.paused)
            .unwrap_or(false)
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn overlay_opacity(&self) -> f32 {
        self.overlay.opacity.get()
    }

    pub fn save_failures(&self) -> usize {
        self.stage.borrow().save_failures
    }

    pub fn transitions_completed(&self) -> usize {
        self.stage.borrow().transitions_completed
    }

    /// Shared animation controller; hosts may register their own interpolators.
    pub fn animations(&self) -> &InterpolatorController {
        &self.animations
    }

    pub fn settings(&self) -> &TransitionSettings {
        &self.settings
    }

    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }
}
