//! Stagehand: lifecycle-scoped animation orchestration for client front ends
//!
//! Stagehand sits between a rendering host and an animation engine. It owns
//! none of the interpolation maths and none of the routing: it decides *when*
//! timelines start, what they are chained to, and guarantees that everything
//! a component started is cancelled when the component goes away.
//!
//! # Core Concepts
//!
//! - **Scope**: registrations made while a component is mounted, all
//!   cancelled together on unmount
//! - **Trigger bindings**: visual properties driven by scroll position or
//!   pointer input
//! - **Sequencers**: multi-step choreographies (page transitions, context
//!   menus) where each phase is entered from the previous phase's completion
//! - **Phases and history**: every sequencer records its phase changes
//!
//! # Example
//!
//! ```rust
//! use stagehand::anim::HeadlessEngine;
//! use stagehand::builder::SequencerBuilder;
//! use stagehand::lifecycle::Scope;
//! use stagehand::transition::{LinkClick, MemoryRouter, Router, TransitionPhase};
//! use std::rc::Rc;
//!
//! let engine = Rc::new(HeadlessEngine::new());
//! let router = Rc::new(MemoryRouter::new("/"));
//! let sequencer = SequencerBuilder::new()
//!     .host(engine.clone())
//!     .router(router.clone())
//!     .reveal_on_mount(false)
//!     .build()
//!     .unwrap();
//!
//! let mut scope = Scope::new("layout");
//! scope.mount(&sequencer);
//!
//! let mut click = LinkClick::new("/work");
//! assert!(sequencer.click(&mut click).is_started());
//! assert!(click.default_prevented());
//!
//! engine.settle(5.0);
//! assert_eq!(router.current_path(), "/work");
//! assert_eq!(sequencer.phase(), TransitionPhase::Navigating);
//!
//! sequencer.content_mounted();
//! engine.settle(5.0);
//! assert_eq!(sequencer.phase(), TransitionPhase::Idle);
//! ```

pub mod anim;
pub mod builder;
pub mod config;
pub mod core;
pub mod lifecycle;
pub mod menu;
pub mod transition;
pub mod trigger;

// Re-export commonly used types
pub use crate::core::{Guard, Phase, PhaseChange, PhaseHistory};
pub use config::{Config, ConfigError};
pub use lifecycle::{Lifecycle, Scope, Signal, Theme, ThemeMode};
pub use menu::{ContextMenu, NavMenu};
pub use transition::{ClickOutcome, TransitionPhase, TransitionSequencer};
pub use trigger::{ScrollBinding, ScrollRegion, UpdateOutcome};
