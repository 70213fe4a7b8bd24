//! Validation rules for configuration, accumulating every violation.

use super::violations::ConfigViolation;
use super::{
    Config, MenuConfig, NavConfig, ParallaxConfig, ShowcaseConfig, TextRevealConfig,
    ThemeConfig, TitleConfig, TransitionConfig,
};
use crate::trigger::TriggerPoint;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

pub type Checked = Validation<(), NonEmptyVec<ConfigViolation>>;

fn duration(field: &'static str, value: f64) -> Checked {
    if !value.is_finite() {
        Validation::fail(ConfigViolation::NotFinite { field, value })
    } else if value <= 0.0 {
        Validation::fail(ConfigViolation::NonPositiveDuration { field, value })
    } else {
        Validation::success(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Checked {
    if !value.is_finite() {
        Validation::fail(ConfigViolation::NotFinite { field, value })
    } else if value < 0.0 {
        Validation::fail(ConfigViolation::Negative { field, value })
    } else {
        Validation::success(())
    }
}

fn finite(field: &'static str, value: f64) -> Checked {
    if value.is_finite() {
        Validation::success(())
    } else {
        Validation::fail(ConfigViolation::NotFinite { field, value })
    }
}

fn trigger_point(field: &'static str, raw: &str) -> Checked {
    match raw.parse::<TriggerPoint>() {
        Ok(_) => Validation::success(()),
        Err(e) => Validation::fail(ConfigViolation::BadTriggerPoint {
            field,
            reason: e.to_string(),
        }),
    }
}

fn range(field: &'static str, min: f64, max: f64) -> Checked {
    if min <= max {
        Validation::success(())
    } else {
        Validation::fail(ConfigViolation::InvertedRange { field, min, max })
    }
}

fn all(checks: Vec<Checked>) -> Checked {
    Validation::all_vec(checks).map(|_| ())
}

impl TransitionConfig {
    pub fn validate(&self) -> Checked {
        let blocks = if self.blocks == 0 {
            Validation::fail(ConfigViolation::NoBlocks)
        } else {
            Validation::success(())
        };
        all(vec![
            blocks,
            duration("transition.cover_duration", self.cover_duration),
            non_negative("transition.cover_stagger", self.cover_stagger),
            duration("transition.reveal_duration", self.reveal_duration),
            non_negative("transition.reveal_stagger", self.reveal_stagger),
        ])
    }
}

impl MenuConfig {
    pub fn validate(&self) -> Checked {
        all(vec![
            duration("menu.enter_duration", self.enter_duration),
            non_negative("menu.enter_stagger", self.enter_stagger),
            finite("menu.enter_from_y", self.enter_from_y),
            finite("menu.icon_from_rotate", self.icon_from_rotate),
            duration("menu.exit_duration", self.exit_duration),
            non_negative("menu.exit_stagger", self.exit_stagger),
            finite("menu.exit_to_y", self.exit_to_y),
            duration("menu.hover_duration", self.hover_duration),
        ])
    }
}

impl TextRevealConfig {
    pub fn validate(&self) -> Checked {
        all(vec![
            non_negative("text_reveal.settle_delay", self.settle_delay),
            duration("text_reveal.settle_duration", self.settle_duration),
            trigger_point("text_reveal.start", &self.start),
            trigger_point("text_reveal.end", &self.end),
        ])
    }
}

impl NavConfig {
    pub fn validate(&self) -> Checked {
        all(vec![
            non_negative("nav.reveal_threshold", self.reveal_threshold),
            finite("nav.hidden_offset", self.hidden_offset),
            duration("nav.slide_duration", self.slide_duration),
            non_negative("nav.pill_hide_delay", self.pill_hide_delay),
        ])
    }
}

impl ThemeConfig {
    pub fn validate(&self) -> Checked {
        all(vec![
            non_negative("theme.overlay_hold", self.overlay_hold),
            duration("theme.overlay_fade", self.overlay_fade),
        ])
    }
}

impl ParallaxConfig {
    pub fn validate(&self) -> Checked {
        all(vec![
            finite("parallax.offset", self.offset),
            finite("parallax.scale", self.scale),
            trigger_point("parallax.start", &self.start),
            trigger_point("parallax.end", &self.end),
        ])
    }
}

impl ShowcaseConfig {
    pub fn validate(&self) -> Checked {
        all(vec![
            trigger_point("showcase.fade_start", &self.fade_start),
            trigger_point("showcase.fade_end", &self.fade_end),
            trigger_point("showcase.pin_start", &self.pin_start),
            duration("showcase.panel_duration", self.panel_duration),
            non_negative("showcase.pause", self.pause),
            finite("showcase.image_from_y", self.image_from_y),
            finite("showcase.image_scale", self.image_scale),
            range("showcase.image_lead", self.image_lead, self.panel_duration),
            non_negative("showcase.image_lead", self.image_lead),
            duration("showcase.title_duration", self.title_duration),
        ])
    }
}

impl TitleConfig {
    pub fn validate(&self) -> Checked {
        all(vec![
            duration("title.letter_duration", self.letter_duration),
            non_negative("title.letter_stagger", self.letter_stagger),
            non_negative("title.min_offset", self.min_offset),
            finite("title.max_offset", self.max_offset),
            range("title.offset", self.min_offset, self.max_offset),
            finite("title.drift", self.drift),
            finite("title.scale", self.scale),
            trigger_point("title.drift_start", &self.drift_start),
            trigger_point("title.drift_end", &self.drift_end),
            trigger_point("title.scale_start", &self.scale_start),
            trigger_point("title.scale_end", &self.scale_end),
        ])
    }
}

impl Config {
    /// Validate every section, collecting ALL violations.
    pub fn validate(&self) -> Checked {
        all(vec![
            self.transition.validate(),
            self.menu.validate(),
            self.text_reveal.validate(),
            self.nav.validate(),
            self.theme.validate(),
            self.parallax.validate(),
            self.showcase.validate(),
            self.title.validate(),
        ])
    }
}
