//! Scroll-scrubbed parallax for images.

use super::binding::{ScrollBinding, UpdateOutcome};
use super::region::{ElementBox, TriggerParseError};
use crate::anim::{
    AnimationTimeline, Ease, Host, Playback, Property, Props, TargetId, TimelineHandle, TweenStep,
};
use crate::config::ParallaxConfig;
use crate::lifecycle::{Lifecycle, Scope, Signal};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

struct ParallaxInner {
    host: Rc<dyn Host>,
    image: TargetId,
    scroll: Signal<f64>,
    layout: ElementBox,
    viewport_height: f64,
    initial_scroll: Cell<f64>,
    config: ParallaxConfig,
    handle: Cell<Option<TimelineHandle>>,
    binding: RefCell<Option<ScrollBinding>>,
}

/// Slides an image from `+offset` to `-offset` percent of its height while
/// its container crosses the viewport, slightly scaled up so the edges never
/// show.
#[derive(Clone)]
pub struct Parallax {
    inner: Rc<ParallaxInner>,
}

impl Parallax {
    pub fn new(
        host: Rc<dyn Host>,
        image: TargetId,
        scroll: Signal<f64>,
        layout: ElementBox,
        viewport_height: f64,
        config: ParallaxConfig,
    ) -> Result<Self, TriggerParseError> {
        config.region()?;
        Ok(Self {
            inner: Rc::new(ParallaxInner {
                host,
                image,
                scroll,
                layout,
                viewport_height,
                initial_scroll: Cell::new(0.0),
                config,
                handle: Cell::new(None),
                binding: RefCell::new(None),
            }),
        })
    }

    pub fn starting_at(self, scroll: f64) -> Self {
        self.inner.initial_scroll.set(scroll);
        self
    }

    pub fn handle(&self) -> Option<TimelineHandle> {
        self.inner.handle.get()
    }

    pub fn scroll_to(&self, scroll: f64) -> UpdateOutcome {
        self.inner.scroll_to(scroll)
    }
}

impl ParallaxInner {
    fn scroll_to(&self, scroll: f64) -> UpdateOutcome {
        let mut binding = self.binding.borrow_mut();
        match binding.as_mut() {
            Some(binding) => binding.scroll_to(scroll),
            None => UpdateOutcome::Inactive,
        }
    }

    fn teardown(&self) {
        if let Some(binding) = self.binding.borrow_mut().as_mut() {
            binding.deactivate();
        }
        if let Some(handle) = self.handle.take() {
            self.host.cancel(handle);
        }
        if self.host.is_attached(self.image) {
            self.host.set(
                &[self.image],
                &Props::new()
                    .with(Property::YPercent, Property::YPercent.resting_value())
                    .with(Property::Scale, Property::Scale.resting_value()),
            );
        }
    }
}

impl Lifecycle for Parallax {
    fn activate(&self, scope: &mut Scope) {
        let inner = &self.inner;
        let offset = inner.config.offset;
        inner.host.set(
            &[inner.image],
            &Props::new().with(Property::Scale, inner.config.scale),
        );
        let mut step = TweenStep::new(
            vec![inner.image],
            Props::new().with(Property::YPercent, -offset),
            1.0,
        );
        step.from = Some(Props::new().with(Property::YPercent, offset));
        step.ease = Ease::None;
        let handle = inner.host.play(
            AnimationTimeline::labeled("parallax").then(step),
            Playback::Scrubbed,
            None,
        );
        inner.handle.set(Some(handle));

        let region = match inner.config.region() {
            Ok(region) => region.resolve(inner.layout, inner.viewport_height),
            Err(error) => {
                tracing::warn!(%error, "parallax region rejected after construction");
                return;
            }
        };
        let host = Rc::clone(&inner.host);
        let binding = ScrollBinding::new(Rc::clone(&inner.host), inner.image, move |update| {
            host.seek(handle, update.progress);
        })
        .with_region(region);
        *inner.binding.borrow_mut() = Some(binding);

        inner.scroll_to(inner.initial_scroll.get());

        let weak = Rc::downgrade(inner);
        inner.scroll.subscribe_in(scope, move |&scroll| {
            if let Some(inner) = weak.upgrade() {
                inner.scroll_to(scroll);
            }
        });

        let owned = Rc::clone(inner);
        scope.register(move || owned.teardown());
    }
}

impl fmt::Debug for Parallax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parallax")
            .field("image", &self.inner.image)
            .field("handle", &self.inner.handle.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::{HeadlessEngine, Stage};

    // Container at 1000..1500 in an 800px viewport: the region runs from
    // scroll 200 ("top bottom") to 1500 ("bottom top").
    fn fixture() -> (Rc<HeadlessEngine>, Signal<f64>, Parallax) {
        let engine = Rc::new(HeadlessEngine::new());
        let image = engine.spawn("image");
        let scroll = Signal::new();
        let parallax = Parallax::new(
            engine.clone(),
            image,
            scroll.clone(),
            ElementBox::new(1000.0, 500.0),
            800.0,
            ParallaxConfig::default(),
        )
        .unwrap();
        (engine, scroll, parallax)
    }

    #[test]
    fn mount_shows_the_start_position() {
        let (engine, _scroll, parallax) = fixture();
        let mut scope = Scope::new("parallax");
        scope.mount(&parallax);
        let image = parallax.inner.image;
        assert_eq!(engine.number(image, Property::YPercent), Some(20.0));
        assert_eq!(engine.number(image, Property::Scale), Some(1.1));
    }

    #[test]
    fn scroll_scrubs_through_the_region() {
        let (engine, scroll, parallax) = fixture();
        let mut scope = Scope::new("parallax");
        scope.mount(&parallax);
        let image = parallax.inner.image;

        scroll.emit(&850.0);
        let mid = engine.number(image, Property::YPercent).unwrap();
        assert!(mid.abs() < 1e-9);

        scroll.emit(&5000.0);
        assert_eq!(engine.number(image, Property::YPercent), Some(-20.0));
    }

    #[test]
    fn unmount_reverts_the_image() {
        let (engine, scroll, parallax) = fixture();
        let mut scope = Scope::new("parallax");
        scope.mount(&parallax);
        scroll.emit(&900.0);
        scope.unmount();

        let image = parallax.inner.image;
        assert_eq!(engine.active_timelines(), 0);
        assert_eq!(engine.number(image, Property::YPercent), Some(0.0));
        assert_eq!(engine.number(image, Property::Scale), Some(1.0));
    }

    #[test]
    fn removed_image_is_not_touched_on_unmount() {
        let (engine, _scroll, parallax) = fixture();
        let mut scope = Scope::new("parallax");
        scope.mount(&parallax);
        engine.remove(parallax.inner.image);
        scope.unmount();
        assert_eq!(engine.detached_writes(), 0);
    }
}
