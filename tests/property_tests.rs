//! Property-based tests for scopes, bindings and sequencers.
//!
//! These tests use proptest to drive components with randomly generated
//! input through the headless engine.

use proptest::prelude::*;
use stagehand::anim::{EngineEvent, HeadlessEngine, Stage};
use stagehand::config::{MenuConfig, NavConfig, ParallaxConfig, TextRevealConfig, TransitionConfig};
use stagehand::lifecycle::{Scope, Signal, TimerQueue};
use stagehand::menu::{ContextMenu, MenuPhase};
use stagehand::transition::{
    ClickOutcome, IgnoreReason, LinkClick, MemoryRouter, TransitionPhase, TransitionSequencer,
};
use stagehand::trigger::{
    panel_index, Direction, DirectionTracker, ElementBox, NavVisibility, Parallax, ScrollRegion,
    TextReveal, TitleSlot,
};
use stagehand::{Phase, Theme};
use std::cell::RefCell;
use std::rc::Rc;

fn quiet_transition() -> TransitionConfig {
    TransitionConfig {
        blocks: 6,
        reveal_on_mount: false,
        ..TransitionConfig::default()
    }
}

fn sequencer_at(path: &str) -> (Rc<HeadlessEngine>, Rc<MemoryRouter>, TransitionSequencer, Scope) {
    let engine = Rc::new(HeadlessEngine::new());
    let router = Rc::new(MemoryRouter::new(path));
    let sequencer = TransitionSequencer::new(engine.clone(), router.clone(), quiet_transition());
    let mut scope = Scope::new("layout");
    scope.mount(&sequencer);
    (engine, router, sequencer, scope)
}

prop_compose! {
    fn arbitrary_path()(index in 0..5usize) -> String {
        ["/", "/work", "/about", "/contact", "/work/case-study"][index].to_string()
    }
}

#[derive(Clone, Debug)]
enum Op {
    Advance(f64),
    Click(String),
    ContentMounted,
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0.0..0.5f64).prop_map(Op::Advance),
        arbitrary_path().prop_map(Op::Click),
        Just(Op::ContentMounted),
    ]
}

proptest! {
    #[test]
    fn every_registration_is_cancelled_on_unmount(
        which in prop::collection::vec(0..5u8, 1..8),
        scrolls in prop::collection::vec(0.0..3000.0f64, 0..20),
        run in 0.0..2.0f64,
    ) {
        let engine = Rc::new(HeadlessEngine::new());
        let timers = TimerQueue::new();
        let scroll = Signal::new();
        let theme = Theme::default();
        let router = Rc::new(MemoryRouter::new("/"));
        let mut scope = Scope::new("page");

        let mut menus = Vec::new();
        for kind in which {
            match kind {
                0 => {
                    let reveal = TextReveal::new(
                        engine.clone(),
                        timers.clone(),
                        scroll.clone(),
                        "Motion that means something",
                        ElementBox::new(1200.0, 300.0),
                        800.0,
                        TextRevealConfig::default(),
                    )
                    .unwrap();
                    scope.mount(&reveal);
                }
                1 => {
                    let bar = engine.spawn("nav");
                    let nav = NavVisibility::new(engine.clone(), bar, scroll.clone(), NavConfig::default());
                    scope.mount(&nav);
                }
                2 => {
                    let image = engine.spawn("image");
                    let parallax = Parallax::new(
                        engine.clone(),
                        image,
                        scroll.clone(),
                        ElementBox::new(900.0, 400.0),
                        800.0,
                        ParallaxConfig::default(),
                    )
                    .unwrap();
                    scope.mount(&parallax);
                }
                3 => {
                    let sequencer = TransitionSequencer::new(
                        engine.clone(),
                        router.clone(),
                        TransitionConfig::default(),
                    );
                    scope.mount(&sequencer);
                }
                _ => {
                    let menu = ContextMenu::new(engine.clone(), theme.clone(), MenuConfig::default());
                    scope.mount(&menu);
                    menu.open_at(50.0, 50.0);
                    menus.push(menu);
                }
            }
        }

        for y in scrolls {
            scroll.emit(&y);
        }
        engine.advance(run);
        timers.advance(run);
        scope.unmount();

        prop_assert_eq!(scope.registered(), scope.cancelled());
        prop_assert_eq!(scope.outstanding(), 0);
        prop_assert_eq!(scroll.subscriber_count(), 0);
        prop_assert_eq!(theme.listener_count(), 0);
        prop_assert_eq!(timers.pending_count(), 0);

        engine.advance(3.0);
        prop_assert_eq!(engine.detached_writes(), 0);
        for menu in menus {
            prop_assert_eq!(menu.element(), None);
        }
    }

    #[test]
    fn navigation_waits_for_cover_completion(steps in prop::collection::vec(0.0..0.2f64, 1..40)) {
        let (engine, router, sequencer, mut scope) = sequencer_at("/");
        let violations = Rc::new(RefCell::new(0usize));
        {
            let engine = Rc::clone(&engine);
            let violations = Rc::clone(&violations);
            sequencer.on_phase(&mut scope, move |phase| {
                if *phase != TransitionPhase::Navigating {
                    return;
                }
                let journal = engine.journal();
                let cover = journal.iter().find_map(|event| match event {
                    EngineEvent::Play { handle, label } if label.as_deref() == Some("cover") => Some(*handle),
                    _ => None,
                });
                let completed = cover.is_some_and(|handle| {
                    journal.iter().any(|event| *event == EngineEvent::Complete(handle))
                });
                if !completed {
                    *violations.borrow_mut() += 1;
                }
            });
        }

        prop_assert!(sequencer.click(&mut LinkClick::new("/work")).is_started());
        for dt in steps {
            if sequencer.phase() == TransitionPhase::Covering {
                prop_assert!(router.pushes().is_empty());
            }
            engine.advance(dt);
        }
        engine.settle(5.0);

        prop_assert_eq!(*violations.borrow(), 0);
        prop_assert_eq!(router.pushes(), vec!["/work".to_string()]);
    }

    #[test]
    fn clicks_during_a_run_never_navigate_twice(ops in prop::collection::vec(arbitrary_op(), 1..40)) {
        let (engine, router, sequencer, _scope) = sequencer_at("/");
        let mut started = 0usize;
        for op in ops {
            match op {
                Op::Advance(dt) => engine.advance(dt),
                Op::ContentMounted => {
                    sequencer.content_mounted();
                }
                Op::Click(path) => {
                    let busy = matches!(
                        sequencer.phase(),
                        TransitionPhase::Covering | TransitionPhase::Navigating | TransitionPhase::Revealing
                    );
                    let outcome = sequencer.click(&mut LinkClick::new(path));
                    if busy {
                        prop_assert_eq!(outcome.clone(), ClickOutcome::Ignored(IgnoreReason::InFlight));
                    }
                    if outcome.is_started() {
                        started += 1;
                    }
                }
            }
            prop_assert!(router.pushes().len() <= started);
        }
        engine.settle(5.0);
        prop_assert_eq!(router.pushes().len(), started);
        let history = sequencer.history();
        prop_assert_eq!(history.count_entries(&TransitionPhase::Navigating), started);
    }

    #[test]
    fn self_links_change_nothing(path in arbitrary_path(), suffix in "(\\?[a-z]{1,4})?(#[a-z]{1,4})?") {
        let (engine, router, sequencer, _scope) = sequencer_at(&path);
        let mut click = LinkClick::new(format!("{path}{suffix}"));
        let outcome = sequencer.click(&mut click);

        prop_assert_eq!(outcome, ClickOutcome::Ignored(IgnoreReason::SamePath));
        prop_assert!(click.default_prevented());
        prop_assert!(sequencer.history().is_empty());
        prop_assert!(sequencer.phase().is_resting());
        engine.settle(2.0);
        prop_assert!(router.pushes().is_empty());
    }

    #[test]
    fn tracker_follows_the_sign_of_each_step(values in prop::collection::vec(0.0..1.0f64, 1..30)) {
        let mut tracker = DirectionTracker::default();
        let mut last = 0.0;
        for value in values {
            let expected = if value > last {
                Direction::Forward
            } else if value < last {
                Direction::Reverse
            } else {
                Direction::Still
            };
            prop_assert_eq!(tracker.classify(value), expected);
            last = value;
        }
    }

    #[test]
    fn dismissed_menu_is_removed_exactly_once(
        x in 0.0..1920.0f64,
        y in 0.0..1080.0f64,
        dismiss_after in 0.0..0.8f64,
    ) {
        let engine = Rc::new(HeadlessEngine::new());
        let menu = ContextMenu::new(engine.clone(), Theme::default(), MenuConfig::default());
        let mut scope = Scope::new("menu");
        scope.mount(&menu);

        menu.open_at(x, y);
        let element = menu.element().unwrap();
        engine.advance(dismiss_after);
        prop_assert!(menu.document_click());
        engine.settle(5.0);

        prop_assert_eq!(menu.phase(), MenuPhase::Hidden);
        prop_assert_eq!(engine.removals_of(element), 1);
        scope.unmount();
        prop_assert_eq!(engine.removals_of(element), 1);
        prop_assert_eq!(engine.detached_writes(), 0);
    }

    #[test]
    fn region_progress_is_clamped_and_monotonic(
        top in 0.0..5000.0f64,
        height in 1.0..2000.0f64,
        a in -2000.0..8000.0f64,
        b in -2000.0..8000.0f64,
    ) {
        let region = ScrollRegion::parse("top 90%", "top 10%")
            .unwrap()
            .resolve(ElementBox::new(top, height), 800.0);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (p_lo, p_hi) = (region.progress(lo), region.progress(hi));
        prop_assert!((0.0..=1.0).contains(&p_lo));
        prop_assert!((0.0..=1.0).contains(&p_hi));
        prop_assert!(p_lo <= p_hi);
    }

    #[test]
    fn showcase_index_never_moves_against_the_scroll(
        panels in 1..8usize,
        duration in 0.2..2.0f64,
        a in -1.0..20.0f64,
        b in -1.0..20.0f64,
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let (i_lo, i_hi) = (panel_index(lo, panels, duration), panel_index(hi, panels, duration));
        prop_assert!(i_lo <= i_hi);
        prop_assert!(i_hi < panels);

        let slots: Vec<TitleSlot> = (0..panels).map(|i| TitleSlot::of(i, i_hi)).collect();
        prop_assert_eq!(slots.iter().filter(|s| **s == TitleSlot::Current).count(), 1);
    }
}

#[test]
fn progress_sequence_classifies_forward_forward_reverse() {
    let mut tracker = DirectionTracker::default();
    let seen: Vec<Direction> = [0.5, 1.0, 0.5]
        .into_iter()
        .map(|p| tracker.classify(p))
        .collect();
    assert_eq!(
        seen,
        vec![Direction::Forward, Direction::Forward, Direction::Reverse]
    );
    assert!(!Direction::Still.is_reverse());
}
