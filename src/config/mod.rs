//! Serde-loadable configuration with accumulated validation.
//!
//! Every field has a default, so a config file only names what it changes.
//! Validation uses Stillwater's `Validation` and reports ALL violations in
//! one pass rather than stopping at the first.
//!
//! # Example
//!
//! ```rust
//! use stagehand::config::{Config, ConfigError};
//!
//! let config = Config::from_json(r#"{ "transition": { "blocks": 12 } }"#).unwrap();
//! assert_eq!(config.transition.blocks, 12);
//! assert_eq!(config.transition.cover_duration, 0.6);
//!
//! let err = Config::from_json(r#"{ "transition": { "blocks": 0 } }"#).unwrap_err();
//! assert!(matches!(err, ConfigError::Invalid(v) if v.len() == 1));
//! ```

mod rules;
mod violations;

pub use rules::Checked;
pub use violations::{ConfigError, ConfigViolation};

use crate::anim::{Ease, Rgba};
use crate::lifecycle::ThemeMode;
use crate::trigger::{ScrollRegion, TriggerParseError, TriggerPoint};
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;

/// Page cover/reveal choreography.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub blocks: usize,
    pub cover_duration: f64,
    pub cover_stagger: f64,
    pub cover_ease: Ease,
    pub reveal_duration: f64,
    pub reveal_stagger: f64,
    pub reveal_ease: Ease,
    /// Play the reveal when the sequencer first mounts.
    pub reveal_on_mount: bool,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            blocks: 20,
            cover_duration: 0.6,
            cover_stagger: 0.02,
            cover_ease: Ease::Power2Out,
            reveal_duration: 0.4,
            reveal_stagger: 0.02,
            reveal_ease: Ease::Power2Out,
            reveal_on_mount: true,
        }
    }
}

/// Context menu entrance, exit and hover.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub enter_duration: f64,
    pub enter_stagger: f64,
    pub enter_ease: Ease,
    pub enter_from_y: f64,
    pub icon_from_rotate: f64,
    pub exit_duration: f64,
    pub exit_stagger: f64,
    pub exit_ease: Ease,
    pub exit_to_y: f64,
    pub hover_background: Rgba,
    pub hover_duration: f64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            enter_duration: 0.4,
            enter_stagger: 0.08,
            enter_ease: Ease::Power3Out,
            enter_from_y: -20.0,
            icon_from_rotate: -90.0,
            exit_duration: 0.25,
            exit_stagger: 0.05,
            exit_ease: Ease::Power2In,
            exit_to_y: -10.0,
            hover_background: Rgba {
                r: 255,
                g: 255,
                b: 255,
                a: 0x33,
            },
            hover_duration: 0.15,
        }
    }
}

/// Per-character colour reveal.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextRevealConfig {
    pub initial: Rgba,
    pub accent: Rgba,
    #[serde(rename = "final")]
    pub settled: Rgba,
    pub settle_delay: f64,
    pub settle_duration: f64,
    pub start: String,
    pub end: String,
}

impl Default for TextRevealConfig {
    fn default() -> Self {
        Self {
            initial: Rgba::rgb(0xdd, 0xdd, 0xdd),
            accent: Rgba::rgb(0xab, 0xff, 0x02),
            settled: Rgba::BLACK,
            settle_delay: 0.1,
            settle_duration: 0.1,
            start: "top 90%".to_string(),
            end: "top 10%".to_string(),
        }
    }
}

impl TextRevealConfig {
    pub fn region(&self) -> Result<ScrollRegion, TriggerParseError> {
        ScrollRegion::parse(&self.start, &self.end)
    }
}

/// Desktop navigation bar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    /// Scroll offset under which the bar is transparent and always shown.
    pub reveal_threshold: f64,
    pub hidden_offset: f64,
    pub slide_duration: f64,
    pub slide_ease: Ease,
    pub pill_hide_delay: f64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            reveal_threshold: 10.0,
            hidden_offset: -100.0,
            slide_duration: 0.3,
            slide_ease: Ease::Power1Out,
            pill_hide_delay: 0.1,
        }
    }
}

/// Light/dark theme and its change overlay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub initial: ThemeMode,
    pub overlay_hold: f64,
    pub overlay_fade: f64,
    pub overlay_ease: Ease,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            initial: ThemeMode::Light,
            overlay_hold: 0.2,
            overlay_fade: 0.6,
            overlay_ease: Ease::Power1InOut,
        }
    }
}

/// Scrubbed image parallax.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    /// Travel in percent of the image height, each way.
    pub offset: f64,
    pub scale: f64,
    pub start: String,
    pub end: String,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            offset: 20.0,
            scale: 1.1,
            start: "top bottom".to_string(),
            end: "bottom top".to_string(),
        }
    }
}

impl ParallaxConfig {
    pub fn region(&self) -> Result<ScrollRegion, TriggerParseError> {
        ScrollRegion::parse(&self.start, &self.end)
    }
}

/// Pinned work showcase: background fade, sliding panels and title states.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowcaseConfig {
    pub fade_start: String,
    pub fade_end: String,
    /// Where the pinned panel timeline starts; it runs for
    /// `panels + pause` viewport heights from there.
    pub pin_start: String,
    pub panel_duration: f64,
    pub panel_ease: Ease,
    pub pause: f64,
    pub image_from_y: f64,
    pub image_scale: f64,
    /// How much earlier than its panel the inner image settles.
    pub image_lead: f64,
    pub image_ease: Ease,
    pub title_duration: f64,
    pub title_ease: Ease,
    /// Route prefix for the current item's link.
    pub link_prefix: String,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            fade_start: "top bottom".to_string(),
            fade_end: "top+=10 top".to_string(),
            pin_start: "top top".to_string(),
            panel_duration: 1.0,
            panel_ease: Ease::Power2InOut,
            pause: 0.5,
            image_from_y: -500.0,
            image_scale: 1.05,
            image_lead: 0.1,
            image_ease: Ease::Power1InOut,
            title_duration: 0.2,
            title_ease: Ease::Power1Out,
            link_prefix: "/work/".to_string(),
        }
    }
}

impl ShowcaseConfig {
    pub fn fade_region(&self) -> Result<ScrollRegion, TriggerParseError> {
        ScrollRegion::parse(&self.fade_start, &self.fade_end)
    }

    pub fn pin_point(&self) -> Result<TriggerPoint, TriggerParseError> {
        self.pin_start.parse()
    }
}

/// Per-letter title entrance followed by scroll drift and scale.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    pub letter_duration: f64,
    pub letter_stagger: f64,
    pub letter_ease: Ease,
    /// Entrance distance range; each letter starts this far above or below.
    pub min_offset: f64,
    pub max_offset: f64,
    /// `yPercent` each letter drifts to while the title scrolls past.
    pub drift: f64,
    pub drift_start: String,
    pub drift_end: String,
    pub scale: f64,
    pub scale_ease: Ease,
    pub scale_start: String,
    pub scale_end: String,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            letter_duration: 1.8,
            letter_stagger: 0.05,
            letter_ease: Ease::Power4Out,
            min_offset: 100.0,
            max_offset: 500.0,
            drift: -30.0,
            drift_start: "top".to_string(),
            drift_end: "bottom".to_string(),
            scale: 2.5,
            scale_ease: Ease::Power2Out,
            scale_start: "top +=100px".to_string(),
            scale_end: "bottom".to_string(),
        }
    }
}

impl TitleConfig {
    pub fn drift_region(&self) -> Result<ScrollRegion, TriggerParseError> {
        ScrollRegion::parse(&self.drift_start, &self.drift_end)
    }

    pub fn scale_region(&self) -> Result<ScrollRegion, TriggerParseError> {
        ScrollRegion::parse(&self.scale_start, &self.scale_end)
    }
}

/// Complete configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub transition: TransitionConfig,
    pub menu: MenuConfig,
    pub text_reveal: TextRevealConfig,
    pub nav: NavConfig,
    pub theme: ThemeConfig,
    pub parallax: ParallaxConfig,
    pub showcase: ShowcaseConfig,
    pub title: TitleConfig,
}

impl Config {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.into_valid()
    }

    /// Validate, converting accumulated violations into an error.
    pub fn into_valid(self) -> Result<Self, ConfigError> {
        match self.validate() {
            Validation::Success(_) => Ok(self),
            Validation::Failure(errors) => {
                let violations: Vec<ConfigViolation> = errors.iter().cloned().collect();
                tracing::debug!(count = violations.len(), "configuration rejected");
                Err(ConfigError::Invalid(violations))
            }
        }
    }
}
