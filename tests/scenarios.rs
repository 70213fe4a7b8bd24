//! End-to-end scenarios: a whole page wired to one ticker, one scroll signal
//! and one headless engine.

use stagehand::anim::{HeadlessEngine, Property, Stage};
use stagehand::config::Config;
use stagehand::lifecycle::{
    FrameSource, Scope, Signal, SmoothScroll, Theme, ThemeOverlay, Ticker,
};
use stagehand::menu::{ContextMenu, MenuAction, MenuPhase, NavClick, NavItem, NavMenu};
use stagehand::transition::{LinkClick, MemoryRouter, Router, TransitionPhase, TransitionSequencer};
use stagehand::trigger::{
    CharShade, ElementBox, NavVisibility, Showcase, TextReveal, TitleReveal,
};
use stagehand::ThemeMode;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Clone, Default)]
struct Hook {
    installs: Rc<Cell<usize>>,
    uninstalls: Rc<Cell<usize>>,
}

impl FrameSource for Hook {
    fn install(&self) {
        self.installs.set(self.installs.get() + 1);
    }

    fn uninstall(&self) {
        self.uninstalls.set(self.uninstalls.get() + 1);
    }
}

/// Scrolls linearly towards a requested position and reports every frame's
/// offset on `scroll`.
struct LinearScroll {
    scroll: Signal<f64>,
    position: Cell<f64>,
    target: Cell<f64>,
    speed: f64,
    last_ms: Cell<Option<f64>>,
}

impl LinearScroll {
    fn new(scroll: Signal<f64>) -> Self {
        Self {
            scroll,
            position: Cell::new(0.0),
            target: Cell::new(0.0),
            speed: 2000.0,
            last_ms: Cell::new(None),
        }
    }
}

impl SmoothScroll for LinearScroll {
    fn raf(&self, time_ms: f64) {
        let dt = self
            .last_ms
            .replace(Some(time_ms))
            .map_or(0.0, |last| (time_ms - last) / 1000.0);
        let (position, target) = (self.position.get(), self.target.get());
        let step = (self.speed * dt).min((target - position).abs());
        let next = position + step * (target - position).signum();
        self.position.set(next);
        self.scroll.emit(&next);
    }

    fn scroll_to(&self, position: f64, _duration: f64, _ease: stagehand::anim::Ease) {
        self.target.set(position);
    }
}

struct Page {
    engine: Rc<HeadlessEngine>,
    ticker: Ticker,
    hook: Hook,
    router: Rc<MemoryRouter>,
    scroll: Rc<LinearScroll>,
    theme: Theme,
    time: Cell<f64>,
    scope: RefCell<Scope>,
}

impl Page {
    fn new(config: &Config) -> Self {
        let engine = Rc::new(HeadlessEngine::new());
        let hook = Hook::default();
        let ticker = Ticker::new(hook.clone());
        let scroll = Rc::new(LinearScroll::new(Signal::new()));
        let mut scope = Scope::new("page");

        let driven = Rc::clone(&engine);
        scope.mount(&Nothing);
        ticker.subscribe_delta(&mut scope, move |dt| driven.tick(dt));
        ticker.attach_smooth_scroll(&mut scope, scroll.clone());

        Self {
            engine,
            ticker,
            hook,
            router: Rc::new(MemoryRouter::new("/")),
            scroll,
            theme: Theme::new(config.theme.initial),
            time: Cell::new(0.0),
            scope: RefCell::new(scope),
        }
    }

    fn mount(&self, component: &dyn stagehand::Lifecycle) {
        self.scope.borrow_mut().mount(component);
    }

    fn run(&self, seconds: f64) {
        let frames = (seconds * 60.0).ceil() as usize;
        for _ in 0..frames {
            let time = self.time.get() + 1.0 / 60.0;
            self.time.set(time);
            self.ticker.pump(time);
        }
    }
}

struct Nothing;

impl stagehand::Lifecycle for Nothing {
    fn activate(&self, _: &mut Scope) {}
}

#[test]
fn page_transition_closes_the_nav_and_reveals_the_new_page() {
    let config = Config::default();
    let page = Page::new(&config);

    let sequencer = TransitionSequencer::new(
        page.engine.clone(),
        page.router.clone(),
        config.transition.clone(),
    );
    let nav = NavMenu::new(
        vec![
            NavItem::simple("Work", "/work"),
            NavItem::expandable("Services", ["Design", "Development"]),
        ],
        page.ticker.timers().clone(),
        page.router.changes(),
        &config.nav,
    );
    page.mount(&sequencer);
    page.mount(&nav);

    // Intro reveal on first mount.
    assert_eq!(sequencer.phase(), TransitionPhase::Revealing);
    page.run(1.0);
    assert_eq!(sequencer.phase(), TransitionPhase::Idle);

    assert_eq!(nav.click("Services"), NavClick::Toggled { open: true });
    let NavClick::Navigate(path) = nav.click("Work") else {
        panic!("simple item should navigate");
    };
    let mut click = LinkClick::new(path);
    assert!(sequencer.click(&mut click).is_started());
    nav.hover("Services", 100.0, 80.0, 0.0);

    page.run(0.2);
    assert_eq!(sequencer.phase(), TransitionPhase::Covering);
    assert_eq!(page.router.current_path(), "/");
    assert!(nav.is_open());

    page.run(1.0);
    assert_eq!(sequencer.phase(), TransitionPhase::Navigating);
    assert_eq!(page.router.current_path(), "/work");
    assert!(!nav.is_open(), "route change closes the menu");
    for block in sequencer.blocks() {
        assert_eq!(page.engine.number(block.target, Property::ScaleX), Some(1.0));
    }

    assert!(sequencer.content_mounted());
    page.run(1.0);
    assert_eq!(sequencer.phase(), TransitionPhase::Idle);
    for block in sequencer.blocks() {
        assert_eq!(page.engine.number(block.target, Property::ScaleX), Some(0.0));
    }

    let history = sequencer.history();
    assert_eq!(
        history.path(),
        vec![
            &TransitionPhase::Idle,
            &TransitionPhase::Revealing,
            &TransitionPhase::Idle,
            &TransitionPhase::Covering,
            &TransitionPhase::Navigating,
            &TransitionPhase::Revealing,
            &TransitionPhase::Idle,
        ]
    );
    assert_eq!(page.router.pushes(), vec!["/work".to_string()]);
}

#[test]
fn scrolling_reveals_text_and_hides_the_header() {
    let config = Config::default();
    let page = Page::new(&config);

    let bar = page.engine.spawn("header");
    let nav = NavVisibility::new(page.engine.clone(), bar, page.scroll.scroll.clone(), config.nav.clone());
    // Region "top 90%" -> "top 10%" for a block at 1600 in an 800px viewport
    // runs from 880 to 1520.
    let reveal = TextReveal::new(
        page.engine.clone(),
        page.ticker.timers().clone(),
        page.scroll.scroll.clone(),
        "We build calm interfaces",
        ElementBox::new(1600.0, 200.0),
        800.0,
        config.text_reveal.clone(),
    )
    .unwrap();
    page.mount(&nav);
    page.mount(&reveal);
    assert!(reveal.shades().iter().all(|s| *s == CharShade::Initial));

    page.scroll.scroll_to(1200.0, 1.0, Default::default());
    page.run(1.0);
    assert!(!nav.state().shown);
    let shades = reveal.shades();
    let touched = shades.iter().filter(|s| **s != CharShade::Initial).count();
    assert!(touched > 0 && touched < shades.len());

    page.scroll.scroll_to(3000.0, 1.0, Default::default());
    page.run(2.0);
    assert!(reveal.shades().iter().all(|s| *s == CharShade::Settled));
    assert_eq!(reveal.pending_settles(), 0);

    page.scroll.scroll_to(0.0, 1.0, Default::default());
    page.run(2.0);
    assert!(nav.state().shown);
    assert!(nav.state().transparent);
    assert!(reveal.shades().iter().all(|s| *s == CharShade::Initial));
}

#[test]
fn home_page_title_drifts_while_the_showcase_pins() {
    let config = Config::default();
    let page = Page::new(&config);

    let title = TitleReveal::new(
        page.engine.clone(),
        page.scroll.scroll.clone(),
        "Selected work",
        ElementBox::new(0.0, 600.0),
        800.0,
        config.title.clone(),
    )
    .unwrap()
    .seeded(11);
    // Pinned from 1200 for 5.5 viewports, up to 5600.
    let showcase = Showcase::new(
        page.engine.clone(),
        page.scroll.scroll.clone(),
        ["CapsuleCorps", "Kitse.in", "Xernia", "UGRFR", "Episodes"],
        ElementBox::new(1200.0, 4400.0),
        800.0,
        config.showcase.clone(),
    )
    .unwrap();
    page.mount(&title);
    page.mount(&showcase);

    page.run(3.0);
    assert_eq!(title.drifting(), 12);
    assert_eq!(showcase.current(), 0);

    page.scroll.scroll_to(3600.0, 1.0, Default::default());
    page.run(2.5);
    assert_eq!(showcase.current(), 2);
    assert_eq!(showcase.current_link().as_deref(), Some("/work/xernia"));
    for letter in title.letters() {
        assert_eq!(page.engine.number(letter, Property::YPercent), Some(-30.0));
    }

    page.scope.borrow_mut().unmount();
    assert_eq!(page.engine.active_timelines(), 0);
    assert!(page.engine.attached_with_role("title-letter").is_empty());
    assert!(page.engine.attached_with_role("showcase-title").is_empty());
    assert_eq!(page.engine.detached_writes(), 0);
}

#[test]
fn context_menu_theme_toggle_runs_the_overlay() {
    let config = Config::default();
    let page = Page::new(&config);

    let overlay = ThemeOverlay::new(
        page.engine.clone(),
        page.ticker.timers().clone(),
        page.theme.clone(),
        config.theme.clone(),
    );
    let menu = ContextMenu::new(page.engine.clone(), page.theme.clone(), config.menu.clone());
    page.mount(&overlay);
    page.mount(&menu);

    menu.open_at(120.0, 240.0);
    page.run(0.1);
    assert!(menu.select(MenuAction::ToggleTheme));
    assert_eq!(page.theme.mode(), ThemeMode::Dark);
    assert!(overlay.is_showing());
    assert_eq!(menu.phase(), MenuPhase::Exiting);

    page.run(2.0);
    assert_eq!(menu.phase(), MenuPhase::Hidden);
    assert!(!overlay.is_showing());
    assert!(page.engine.attached_with_role("theme-overlay").is_empty());
    assert!(page.engine.attached_with_role("context-menu").is_empty());
}

#[test]
fn unmounting_the_page_releases_the_frame_hook() {
    let config = Config::default();
    let page = Page::new(&config);
    let sequencer = TransitionSequencer::new(
        page.engine.clone(),
        page.router.clone(),
        config.transition.clone(),
    );
    page.mount(&sequencer);
    assert!(page.ticker.is_installed());
    assert_eq!(page.hook.installs.get(), 1);

    sequencer.click(&mut LinkClick::new("/about"));
    page.run(0.1);
    page.scope.borrow_mut().unmount();

    assert!(!page.ticker.is_installed());
    assert_eq!(page.hook.uninstalls.get(), 1);
    assert_eq!(page.engine.active_timelines(), 0);
    assert!(page.engine.attached_with_role("transition-block").is_empty());

    page.engine.advance(2.0);
    assert!(page.router.pushes().is_empty());
    assert_eq!(page.engine.detached_writes(), 0);
}
