//! Builders for the sequenced components.

use crate::anim::{Ease, Host};
use crate::builder::error::BuildError;
use crate::config::{MenuConfig, TransitionConfig};
use crate::core::Guard;
use crate::lifecycle::Theme;
use crate::menu::{ContextMenu, MenuAction};
use crate::transition::{Router, TransitionPhase, TransitionSequencer};
use std::rc::Rc;

fn check_timing(duration: f64, stagger: f64) -> Result<(), BuildError> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(BuildError::InvalidDuration(duration));
    }
    if !stagger.is_finite() || stagger < 0.0 {
        return Err(BuildError::InvalidStagger(stagger));
    }
    Ok(())
}

/// Builder for a [`TransitionSequencer`].
///
/// # Example
///
/// ```rust
/// use stagehand::anim::{Ease, HeadlessEngine};
/// use stagehand::builder::SequencerBuilder;
/// use stagehand::transition::MemoryRouter;
/// use std::rc::Rc;
///
/// let sequencer = SequencerBuilder::new()
///     .host(Rc::new(HeadlessEngine::new()))
///     .router(Rc::new(MemoryRouter::new("/")))
///     .blocks(12)
///     .cover(0.5, 0.03, Ease::Power2Out)
///     .reveal_on_mount(false)
///     .build()
///     .unwrap();
///
/// assert!(!sequencer.is_mounted());
/// ```
#[derive(Default)]
pub struct SequencerBuilder {
    host: Option<Rc<dyn Host>>,
    router: Option<Rc<dyn Router>>,
    config: TransitionConfig,
    guard: Option<Guard<TransitionPhase>>,
}

impl SequencerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine and stage (required).
    pub fn host(mut self, host: Rc<dyn Host>) -> Self {
        self.host = Some(host);
        self
    }

    /// Set the router (required).
    pub fn router(mut self, router: Rc<dyn Router>) -> Self {
        self.router = Some(router);
        self
    }

    /// Start from a loaded configuration.
    pub fn config(mut self, config: TransitionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn blocks(mut self, count: usize) -> Self {
        self.config.blocks = count;
        self
    }

    pub fn cover(mut self, duration: f64, stagger: f64, ease: Ease) -> Self {
        self.config.cover_duration = duration;
        self.config.cover_stagger = stagger;
        self.config.cover_ease = ease;
        self
    }

    pub fn reveal(mut self, duration: f64, stagger: f64, ease: Ease) -> Self {
        self.config.reveal_duration = duration;
        self.config.reveal_stagger = stagger;
        self.config.reveal_ease = ease;
        self
    }

    pub fn reveal_on_mount(mut self, reveal: bool) -> Self {
        self.config.reveal_on_mount = reveal;
        self
    }

    /// Extra condition a phase must meet before a click is accepted, on top
    /// of the in-flight check.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&TransitionPhase) -> bool + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    pub fn build(self) -> Result<TransitionSequencer, BuildError> {
        let host = self.host.ok_or(BuildError::MissingHost)?;
        let router = self.router.ok_or(BuildError::MissingRouter)?;
        if self.config.blocks == 0 {
            return Err(BuildError::NoBlocks);
        }
        check_timing(self.config.cover_duration, self.config.cover_stagger)?;
        check_timing(self.config.reveal_duration, self.config.reveal_stagger)?;

        let guard = self.guard.unwrap_or_else(Guard::always);
        Ok(TransitionSequencer::with_guard(
            host,
            router,
            self.config,
            guard,
        ))
    }
}

/// Builder for a [`ContextMenu`].
#[derive(Default)]
pub struct ContextMenuBuilder {
    host: Option<Rc<dyn Host>>,
    theme: Theme,
    config: MenuConfig,
    actions: Option<Vec<MenuAction>>,
}

impl ContextMenuBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine and stage (required).
    pub fn host(mut self, host: Rc<dyn Host>) -> Self {
        self.host = Some(host);
        self
    }

    /// Theme flag the toggle item flips. Defaults to a private light theme.
    pub fn theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn config(mut self, config: MenuConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default items.
    pub fn actions(mut self, actions: impl IntoIterator<Item = MenuAction>) -> Self {
        self.actions = Some(actions.into_iter().collect());
        self
    }

    pub fn build(self) -> Result<ContextMenu, BuildError> {
        let host = self.host.ok_or(BuildError::MissingHost)?;
        let actions = self.actions.unwrap_or_else(MenuAction::defaults);
        if actions.is_empty() {
            return Err(BuildError::NoItems);
        }
        check_timing(self.config.enter_duration, self.config.enter_stagger)?;
        check_timing(self.config.exit_duration, self.config.exit_stagger)?;
        Ok(ContextMenu::with_actions(
            host,
            self.theme,
            self.config,
            actions,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::HeadlessEngine;
    use crate::transition::MemoryRouter;

    fn host() -> Rc<dyn Host> {
        Rc::new(HeadlessEngine::new())
    }

    #[test]
    fn sequencer_requires_host_and_router() {
        assert!(matches!(
            SequencerBuilder::new().build(),
            Err(BuildError::MissingHost)
        ));
        assert!(matches!(
            SequencerBuilder::new().host(host()).build(),
            Err(BuildError::MissingRouter)
        ));
    }

    #[test]
    fn sequencer_rejects_zero_blocks_and_bad_timing() {
        let base = || {
            SequencerBuilder::new()
                .host(host())
                .router(Rc::new(MemoryRouter::new("/")))
        };
        assert!(matches!(
            base().blocks(0).build(),
            Err(BuildError::NoBlocks)
        ));
        assert!(matches!(
            base().cover(-0.1, 0.02, Ease::None).build(),
            Err(BuildError::InvalidDuration(_))
        ));
        assert!(matches!(
            base().reveal(0.4, f64::INFINITY, Ease::None).build(),
            Err(BuildError::InvalidStagger(_))
        ));
        assert!(base().build().is_ok());
    }

    #[test]
    fn menu_rejects_empty_item_list() {
        assert!(matches!(
            ContextMenuBuilder::new().host(host()).actions(Vec::new()).build(),
            Err(BuildError::NoItems)
        ));
        assert!(matches!(
            ContextMenuBuilder::new().build(),
            Err(BuildError::MissingHost)
        ));
        let menu = ContextMenuBuilder::new()
            .host(host())
            .actions([MenuAction::Close])
            .build()
            .unwrap();
        assert!(menu.items().is_empty());
    }
}
