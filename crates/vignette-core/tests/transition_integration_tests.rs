//! Integration tests for scene transitions
//!
//! The orchestrator is driven only through its public interface, with
//! recording scenes and a recording session standing in for game content.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use vignette_core::prelude::*;
use vignette_core::{
    ActionSequencer, Completion, Interpolator, InterpolatorController, Property, RoutingTable,
    SceneError, SceneOrchestrator, SceneRegistry, SceneRouter, SequenceError, Step,
    TransitionError, TransitionSettings, TransitionState,
};

// ============================================================================
// Recording fakes
// ============================================================================

#[derive(Default)]
struct Journal {
    events: RefCell<Vec<String>>,
    saves: Cell<usize>,
    quit_prompts: Cell<usize>,
    menu_hides: Cell<usize>,
}

impl Journal {
    fn record(&self, event: impl Into<String>) {
        self.events.borrow_mut().push(event.into());
    }

    fn count(&self, event: &str) -> usize {
        self.events.borrow().iter().filter(|e| *e == event).count()
    }

    fn position(&self, event: &str) -> Option<usize> {
        self.events.borrow().iter().position(|e| e == event)
    }
}

struct RecordingScene {
    id: SceneId,
    offset: SceneOffset,
    journal: Rc<Journal>,
    exit_on_click: Option<(SceneId, Direction)>,
}

impl Scene for RecordingScene {
    fn id(&self) -> &SceneId {
        &self.id
    }

    fn load(&mut self) {
        self.journal.record(format!("{}.load", self.id));
    }

    fn exit(&mut self) {
        self.journal.record(format!("{}.exit", self.id));
    }

    fn pause(&mut self) {
        self.journal.record(format!("{}.pause", self.id));
    }

    fn resume(&mut self) {
        self.journal.record(format!("{}.resume", self.id));
    }

    fn transition_from(&mut self, previous: &SceneId) {
        self.journal
            .record(format!("{}.from.{}", self.id, previous));
    }

    fn offset(&self) -> &SceneOffset {
        &self.offset
    }

    fn handle_input(&mut self, event: &InputEvent) -> Option<TransitionRequest> {
        self.journal.record(format!("{}.input", self.id));
        match (event, &self.exit_on_click) {
            (InputEvent::PointerDown { .. }, Some((next, direction))) => {
                Some(TransitionRequest::to(next.clone(), *direction))
            }
            _ => None,
        }
    }
}

struct RecordingSession {
    journal: Rc<Journal>,
}

impl GameSession for RecordingSession {
    fn save(&mut self) -> anyhow::Result<()> {
        self.journal.saves.set(self.journal.saves.get() + 1);
        self.journal.record("save");
        Ok(())
    }

    fn prompt_quit(&mut self) {
        self.journal
            .quit_prompts
            .set(self.journal.quit_prompts.get() + 1);
    }
}

struct RecordingMenu {
    journal: Rc<Journal>,
}

impl ContextMenu for RecordingMenu {
    fn hide(&mut self) {
        self.journal.menu_hides.set(self.journal.menu_hides.get() + 1);
    }
}

struct Fixture {
    orchestrator: SceneOrchestrator,
    router: RoutingTable,
    journal: Rc<Journal>,
}

fn fixture() -> Fixture {
    let journal = Rc::new(Journal::default());
    let mut registry = SceneRegistry::new();

    for (name, exit) in [
        ("a", Some(("b", Direction::Right))),
        ("b", None),
        ("c", None),
    ] {
        let journal = journal.clone();
        registry
            .register(name, move |id: &SceneId| -> anyhow::Result<Box<dyn Scene>> {
                Ok(Box::new(RecordingScene {
                    id: id.clone(),
                    offset: SceneOffset::new(id.as_str()),
                    journal: journal.clone(),
                    exit_on_click: exit.map(|(next, dir)| (SceneId::from(next), dir)),
                }))
            })
            .unwrap();
    }
    registry
        .register("broken", |_: &SceneId| -> anyhow::Result<Box<dyn Scene>> {
            anyhow::bail!("backdrop texture missing")
        })
        .unwrap();

    let router = RoutingTable::new();
    let settings = TransitionSettings {
        fade_time: 1.0,
        viewport: Vec2::new(800.0, 600.0),
    };
    let orchestrator = SceneOrchestrator::new(
        settings,
        registry,
        Box::new(RecordingSession {
            journal: journal.clone(),
        }),
        Box::new(router.clone()),
    )
    .unwrap()
    .with_menu(Box::new(RecordingMenu {
        journal: journal.clone(),
    }));

    Fixture {
        orchestrator,
        router,
        journal,
    }
}

fn settle(orchestrator: &mut SceneOrchestrator, dt: f32) {
    for _ in 0..100 {
        if !orchestrator.is_transitioning() {
            return;
        }
        orchestrator.tick(dt).unwrap();
    }
    panic!("transition did not settle");
}

// ============================================================================
// Cross-fade Tests
// ============================================================================

#[test]
fn test_cross_fade_swaps_scene() {
    let Fixture {
        mut orchestrator,
        router,
        journal,
    } = fixture();
    orchestrator.start("a").unwrap();

    orchestrator
        .notify(Some("b".into()), Direction::Fade)
        .unwrap();
    settle(&mut orchestrator, 0.25);

    assert_eq!(orchestrator.active_scene_id(), Some(SceneId::from("b")));
    assert_eq!(journal.count("a.exit"), 1);
    assert_eq!(journal.saves.get(), 1);
    assert_eq!(orchestrator.overlay_opacity(), 0.0);
    assert_eq!(orchestrator.state(), TransitionState::Idle);
    assert_eq!(router.active_scene(), Some(SceneId::from("b")));
    assert_eq!(journal.count("b.from.a"), 1);
    assert_eq!(journal.menu_hides.get(), 1);
}

#[test]
fn test_cross_fade_saves_before_teardown() {
    let Fixture {
        mut orchestrator,
        journal,
        ..
    } = fixture();
    orchestrator.start("a").unwrap();
    orchestrator
        .notify(Some("b".into()), Direction::Fade)
        .unwrap();
    settle(&mut orchestrator, 0.5);

    let save = journal.position("save").unwrap();
    let exit = journal.position("a.exit").unwrap();
    let load = journal.position("b.load").unwrap();
    assert!(save < exit);
    assert!(exit < load);
}

#[test]
fn test_input_detached_for_whole_transition() {
    let Fixture {
        mut orchestrator,
        router,
        ..
    } = fixture();
    orchestrator.start("a").unwrap();
    orchestrator
        .notify(Some("b".into()), Direction::Fade)
        .unwrap();

    let click = InputEvent::PointerDown { x: 1.0, y: 1.0 };
    while orchestrator.is_transitioning() {
        assert!(router.is_detached());
        assert!(!orchestrator.handle_input(&click).unwrap());
        orchestrator.tick(0.3).unwrap();
    }
    assert!(orchestrator.handle_input(&click).unwrap());

    // routing only ever went a -> detached -> b
    assert_eq!(
        router.history(),
        vec![Some(SceneId::from("a")), None, Some(SceneId::from("b"))]
    );
}

// ============================================================================
// Misuse and Failure Tests
// ============================================================================

#[test]
fn test_second_transition_rejected_while_busy() {
    let Fixture {
        mut orchestrator,
        journal,
        ..
    } = fixture();
    orchestrator.start("a").unwrap();
    orchestrator
        .notify(Some("b".into()), Direction::Fade)
        .unwrap();

    let err = orchestrator
        .notify(Some("c".into()), Direction::Fade)
        .unwrap_err();
    assert!(err.is_busy());
    assert_eq!(journal.count("c.load"), 0);

    settle(&mut orchestrator, 0.5);
    assert_eq!(orchestrator.active_scene_id(), Some(SceneId::from("b")));

    // accepted again once idle
    orchestrator
        .notify(Some("c".into()), Direction::Fade)
        .unwrap();
    settle(&mut orchestrator, 0.5);
    assert_eq!(orchestrator.active_scene_id(), Some(SceneId::from("c")));
    assert_eq!(orchestrator.transitions_completed(), 2);
}

#[test]
fn test_broken_scene_keeps_previous_active() {
    let Fixture {
        mut orchestrator,
        router,
        journal,
    } = fixture();
    orchestrator.start("a").unwrap();

    let err = orchestrator
        .notify(Some("broken".into()), Direction::Fade)
        .unwrap_err();
    assert!(matches!(
        err,
        TransitionError::Scene(SceneError::Construction { .. })
    ));

    assert_eq!(orchestrator.active_scene_id(), Some(SceneId::from("a")));
    assert_eq!(router.active_scene(), Some(SceneId::from("a")));
    assert_eq!(orchestrator.state(), TransitionState::Idle);
    assert!(!orchestrator.is_transitioning());
    assert_eq!(journal.count("a.exit"), 0);
    assert_eq!(journal.saves.get(), 0);

    // a retry with a valid target still works
    orchestrator
        .notify(Some("b".into()), Direction::Down)
        .unwrap();
    settle(&mut orchestrator, 0.5);
    assert_eq!(orchestrator.active_scene_id(), Some(SceneId::from("b")));
}

#[test]
fn test_unknown_scene_rejected() {
    let Fixture {
        mut orchestrator, ..
    } = fixture();
    orchestrator.start("a").unwrap();
    assert!(matches!(
        orchestrator.notify(Some("nowhere".into()), Direction::Fade),
        Err(TransitionError::Scene(SceneError::UnknownScene(_)))
    ));
}

// ============================================================================
// Slide Tests
// ============================================================================

#[test]
fn test_slide_right_offsets() {
    let Fixture {
        mut orchestrator,
        journal,
        ..
    } = fixture();
    orchestrator.start("a").unwrap();
    orchestrator
        .notify(Some("b".into()), Direction::Right)
        .unwrap();

    assert_eq!(journal.count("a.pause"), 1);
    assert_eq!(journal.count("b.pause"), 1);
    assert_eq!(
        orchestrator.incoming_scene_id(),
        Some(SceneId::from("b"))
    );

    // slides run over twice the fade time
    orchestrator.tick(1.0).unwrap();
    assert_eq!(orchestrator.active_scene_id(), Some(SceneId::from("a")));
    assert_eq!(orchestrator.active_offset(), Some(Vec2::new(-400.0, 0.0)));

    orchestrator.tick(1.0).unwrap();
    assert_eq!(orchestrator.active_scene_id(), Some(SceneId::from("b")));
    assert_eq!(orchestrator.active_offset(), Some(Vec2::ZERO));
    assert_eq!(journal.count("b.resume"), 1);
    assert_eq!(journal.count("a.exit"), 1);
    assert_eq!(orchestrator.state(), TransitionState::Idle);
    // slides never touch the overlay
    assert_eq!(orchestrator.overlay_opacity(), 0.0);
}

#[test]
fn test_slide_up_offsets() {
    let Fixture {
        mut orchestrator,
        journal,
        ..
    } = fixture();
    orchestrator.start("a").unwrap();
    orchestrator.notify(Some("b".into()), Direction::Up).unwrap();

    // outgoing scene leaves through the bottom, half way at the midpoint
    orchestrator.tick(1.0).unwrap();
    assert_eq!(orchestrator.active_scene_id(), Some(SceneId::from("a")));
    assert_eq!(orchestrator.active_offset(), Some(Vec2::new(0.0, 300.0)));

    orchestrator.tick(1.0).unwrap();
    assert_eq!(orchestrator.active_scene_id(), Some(SceneId::from("b")));
    assert_eq!(orchestrator.active_offset(), Some(Vec2::ZERO));
    assert_eq!(journal.count("a.pause"), 1);
    assert_eq!(journal.count("b.pause"), 1);
    assert_eq!(journal.count("b.resume"), 1);
    assert_eq!(journal.count("a.exit"), 1);
    assert_eq!(orchestrator.state(), TransitionState::Idle);
}

#[test]
fn test_slide_down_offsets() {
    let Fixture {
        mut orchestrator,
        journal,
        ..
    } = fixture();
    orchestrator.start("a").unwrap();
    orchestrator.notify_code(Some("b".into()), 3).unwrap();

    orchestrator.tick(1.0).unwrap();
    assert_eq!(orchestrator.active_offset(), Some(Vec2::new(0.0, -300.0)));

    orchestrator.tick(1.0).unwrap();
    assert_eq!(orchestrator.active_scene_id(), Some(SceneId::from("b")));
    assert_eq!(orchestrator.active_offset(), Some(Vec2::ZERO));
    assert_eq!(journal.count("b.resume"), 1);
    assert_eq!(journal.count("a.exit"), 1);
}

// ============================================================================
// Shutdown Tests
// ============================================================================

#[test]
fn test_shutdown_mid_fade_then_restart() {
    let Fixture {
        mut orchestrator,
        router,
        journal,
    } = fixture();
    orchestrator.start("a").unwrap();
    orchestrator
        .notify(Some("b".into()), Direction::Fade)
        .unwrap();
    orchestrator.tick(0.5).unwrap();

    orchestrator.shutdown();
    assert!(!orchestrator.is_transitioning());
    assert_eq!(orchestrator.state(), TransitionState::Idle);
    assert_eq!(orchestrator.active_scene_id(), None);
    assert_eq!(journal.count("a.exit"), 1);
    assert_eq!(journal.count("b.load"), 0);

    orchestrator.start("a").unwrap();
    assert_eq!(router.active_scene(), Some(SceneId::from("a")));
    orchestrator
        .notify(Some("c".into()), Direction::Fade)
        .unwrap();
    settle(&mut orchestrator, 0.5);
    assert_eq!(orchestrator.active_scene_id(), Some(SceneId::from("c")));
}

#[test]
fn test_scene_requested_transition_from_input() {
    let Fixture {
        mut orchestrator,
        router,
        ..
    } = fixture();
    orchestrator.start("a").unwrap();

    let delivered = orchestrator
        .handle_input(&InputEvent::PointerDown { x: 10.0, y: 10.0 })
        .unwrap();
    assert!(delivered);
    assert!(orchestrator.is_transitioning());
    assert!(router.is_detached());

    settle(&mut orchestrator, 0.5);
    assert_eq!(orchestrator.active_scene_id(), Some(SceneId::from("b")));
}

// ============================================================================
// Quit Tests
// ============================================================================

#[test]
fn test_notify_without_scene_prompts_quit() {
    let Fixture {
        mut orchestrator,
        journal,
        ..
    } = fixture();
    orchestrator.start("a").unwrap();

    orchestrator.notify_code(None, 0).unwrap();
    assert_eq!(journal.quit_prompts.get(), 1);
    assert_eq!(
        orchestrator.state(),
        TransitionState::AwaitingQuitConfirmation
    );
    assert_eq!(journal.saves.get(), 0);
    assert_eq!(orchestrator.active_scene_id(), Some(SceneId::from("a")));

    assert!(orchestrator.cancel_quit());
    assert_eq!(orchestrator.state(), TransitionState::Idle);
}

// ============================================================================
// Sequencer + Controller Tests
// ============================================================================

#[test]
fn test_steps_run_in_order_across_ticks() {
    let controller = InterpolatorController::new();
    let sequencer = ActionSequencer::new();
    let started: Rc<RefCell<Vec<&'static str>>> = Rc::default();
    let value = Property::new("b.progress", 0.0);

    let log = started.clone();
    let a: Step = Box::new(move |done: Completion| {
        log.borrow_mut().push("A");
        done.complete().unwrap();
    });

    let log = started.clone();
    let animations = controller.clone();
    let target = value.clone();
    let b: Step = Box::new(move |done: Completion| {
        log.borrow_mut().push("B");
        let tween = Interpolator::new(target, 0.0, 1.0, 2.0)
            .unwrap()
            .on_complete(move || done.complete().unwrap());
        animations.add(tween);
    });

    let log = started.clone();
    let c: Step = Box::new(move |done: Completion| {
        log.borrow_mut().push("C");
        done.complete().unwrap();
    });

    sequencer.run("abc", vec![a, b, c]).unwrap();
    assert_eq!(*started.borrow(), vec!["A", "B"]);
    assert!(matches!(
        sequencer.run("again", Vec::new()),
        Err(SequenceError::Busy)
    ));

    controller.tick(1.0);
    assert_eq!(*started.borrow(), vec!["A", "B"]);
    assert_eq!(value.get(), 0.5);

    controller.tick(1.0);
    assert_eq!(*started.borrow(), vec!["A", "B", "C"]);
    assert_eq!(value.get(), 1.0);
    assert!(!sequencer.is_running());
    assert!(controller.is_empty());
}
