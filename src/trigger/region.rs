//! Scroll regions and trigger-point parsing.
//!
//! A trigger point pairs a spot on the trigger element with a spot on the
//! viewport: `"top 90%"` fires when the element's top edge reaches 90% of
//! the viewport height. Each side may carry a relative pixel offset, either
//! glued to the anchor (`"top+=10"`) or on its own (`"+=100px"`, measured
//! from the top). A lone element part (`"bottom"`) meets the top of the
//! viewport.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TriggerParseError {
    #[error("trigger point is empty")]
    Empty,

    #[error("trigger point '{0}' has more than an element part and a viewport part")]
    TokenCount(String),

    #[error("unknown anchor '{0}'")]
    BadAnchor(String),

    #[error("malformed offset '{0}'")]
    BadOffset(String),
}

/// Spot along one axis of a box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Anchor {
    Top,
    Center,
    Bottom,
    Percent(f64),
    Pixels(f64),
}

impl Anchor {
    /// Distance from the top of a box of height `length`.
    pub fn resolve(self, length: f64) -> f64 {
        match self {
            Self::Top => 0.0,
            Self::Center => length / 2.0,
            Self::Bottom => length,
            Self::Percent(p) => length * p / 100.0,
            Self::Pixels(px) => px,
        }
    }
}

/// Anchor plus relative pixel offset.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub anchor: Anchor,
    pub offset: f64,
}

impl Position {
    pub fn resolve(self, length: f64) -> f64 {
        self.anchor.resolve(length) + self.offset
    }
}

impl FromStr for Position {
    type Err = TriggerParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (head, offset) = match token.find("+=").or_else(|| token.find("-=")) {
            Some(at) => (&token[..at], Some(&token[at..])),
            None => (token, None),
        };

        let anchor = if head.is_empty() {
            Anchor::Top
        } else {
            parse_anchor(head)?
        };
        let offset = match offset {
            Some(raw) => parse_offset(raw)?,
            None => 0.0,
        };
        Ok(Self { anchor, offset })
    }
}

fn parse_anchor(raw: &str) -> Result<Anchor, TriggerParseError> {
    let bad = || TriggerParseError::BadAnchor(raw.to_string());
    match raw {
        "top" => Ok(Anchor::Top),
        "center" => Ok(Anchor::Center),
        "bottom" => Ok(Anchor::Bottom),
        _ => {
            if let Some(number) = raw.strip_suffix('%') {
                number.parse().map(Anchor::Percent).map_err(|_| bad())
            } else {
                let number = raw.strip_suffix("px").unwrap_or(raw);
                number.parse().map(Anchor::Pixels).map_err(|_| bad())
            }
        }
    }
}

fn parse_offset(raw: &str) -> Result<f64, TriggerParseError> {
    let bad = || TriggerParseError::BadOffset(raw.to_string());
    let sign = if raw.starts_with('-') { -1.0 } else { 1.0 };
    let digits = raw.get(2..).ok_or_else(bad)?;
    let digits = digits.strip_suffix("px").unwrap_or(digits);
    let value: f64 = digits.parse().map_err(|_| bad())?;
    if !value.is_finite() {
        return Err(bad());
    }
    Ok(sign * value)
}

/// `"<element> <viewport>"` pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TriggerPoint {
    pub element: Position,
    pub viewport: Position,
}

impl TriggerPoint {
    /// Scroll offset at which the two spots meet.
    pub fn scroll_offset(&self, element: ElementBox, viewport_height: f64) -> f64 {
        element.top + self.element.resolve(element.height) - self.viewport.resolve(viewport_height)
    }
}

impl FromStr for TriggerPoint {
    type Err = TriggerParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        match tokens.as_slice() {
            [] => Err(TriggerParseError::Empty),
            [element] => Ok(Self {
                element: element.parse()?,
                viewport: Position {
                    anchor: Anchor::Top,
                    offset: 0.0,
                },
            }),
            [element, viewport] => Ok(Self {
                element: element.parse()?,
                viewport: viewport.parse()?,
            }),
            _ => Err(TriggerParseError::TokenCount(s.to_string())),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.anchor {
            Anchor::Top => f.write_str("top")?,
            Anchor::Center => f.write_str("center")?,
            Anchor::Bottom => f.write_str("bottom")?,
            Anchor::Percent(p) => write!(f, "{p}%")?,
            Anchor::Pixels(px) => write!(f, "{px}px")?,
        }
        if self.offset > 0.0 {
            write!(f, "+={}", self.offset)?;
        } else if self.offset < 0.0 {
            write!(f, "-={}", -self.offset)?;
        }
        Ok(())
    }
}

impl fmt::Display for TriggerPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

/// Layout of the trigger element in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementBox {
    pub top: f64,
    pub height: f64,
}

impl ElementBox {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }
}

/// Start and end trigger points bounding a scroll-linked binding.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollRegion {
    pub start: TriggerPoint,
    pub end: TriggerPoint,
}

impl ScrollRegion {
    pub fn new(start: TriggerPoint, end: TriggerPoint) -> Self {
        Self { start, end }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, TriggerParseError> {
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
        })
    }

    pub fn resolve(&self, element: ElementBox, viewport_height: f64) -> ResolvedRegion {
        ResolvedRegion {
            start: self.start.scroll_offset(element, viewport_height),
            end: self.end.scroll_offset(element, viewport_height),
        }
    }
}

/// Region in scroll pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRegion {
    pub start: f64,
    pub end: f64,
}

impl ResolvedRegion {
    /// Progress through the region at `scroll`, clamped to [0,1].
    pub fn progress(&self, scroll: f64) -> f64 {
        let span = self.end - self.start;
        if span <= 0.0 || !span.is_finite() {
            return if scroll >= self.start { 1.0 } else { 0.0 };
        }
        ((scroll - self.start) / span).clamp(0.0, 1.0)
    }
}
