//! Animatable properties and their values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Visual property of a target element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Property {
    Opacity,
    X,
    Y,
    XPercent,
    YPercent,
    Scale,
    ScaleX,
    Rotate,
    RotateX,
    Color,
    BackgroundColor,
    TransformOrigin,
    ZIndex,
}

impl Property {
    /// Value an element has before anything touched this property.
    pub fn resting_value(self) -> Value {
        match self {
            Self::Opacity | Self::Scale | Self::ScaleX => Value::Number(1.0),
            Self::Color => Value::Color(Rgba::BLACK),
            Self::BackgroundColor => Value::Color(Rgba::TRANSPARENT),
            Self::TransformOrigin => Value::Origin(Origin::Center),
            _ => Value::Number(0.0),
        }
    }
}

/// Transform origin keyword.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    Left,
    Right,
    Center,
    TopLeft,
}

/// Straight RGBA colour, serialized as `#rrggbb` / `#rrggbbaa`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ColorParseError {
    #[error("colour '{0}' must start with '#'")]
    MissingHash(String),

    #[error("colour '{0}' must have 3, 6 or 8 hex digits")]
    BadLength(String),

    #[error("colour '{0}' contains a non-hex digit")]
    BadDigit(String),
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn lerp(self, other: Rgba, t: f64) -> Rgba {
        let mix = |a: u8, b: u8| -> u8 {
            let v = f64::from(a) + (f64::from(b) - f64::from(a)) * t;
            v.round().clamp(0.0, 255.0) as u8
        };
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

impl FromStr for Rgba {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| ColorParseError::MissingHash(s.to_string()))?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::BadDigit(s.to_string()));
        }
        let digits: Vec<u8> = hex
            .chars()
            .filter_map(|c| c.to_digit(16))
            .map(|d| d as u8)
            .collect();
        let pair = |i: usize| digits[i] * 16 + digits[i + 1];
        match digits.len() {
            3 => Ok(Rgba::rgb(digits[0] * 17, digits[1] * 17, digits[2] * 17)),
            6 => Ok(Rgba::rgb(pair(0), pair(2), pair(4))),
            8 => Ok(Rgba {
                a: pair(6),
                ..Rgba::rgb(pair(0), pair(2), pair(4))
            }),
            _ => Err(ColorParseError::BadLength(s.to_string())),
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgba> for String {
    fn from(value: Rgba) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

/// Value of a single property.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Color(Rgba),
    Origin(Origin),
}

impl Value {
    /// Interpolate towards `to`. Values of different kinds, and origins,
    /// switch to `to` as soon as `t` leaves zero.
    pub fn lerp(self, to: Value, t: f64) -> Value {
        match (self, to) {
            (Value::Number(a), Value::Number(b)) => Value::Number(a + (b - a) * t),
            (Value::Color(a), Value::Color(b)) => Value::Color(a.lerp(b, t)),
            _ if t > 0.0 => to,
            _ => self,
        }
    }

    pub fn as_number(self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_color(self) -> Option<Rgba> {
        match self {
            Value::Color(c) => Some(c),
            _ => None,
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<Rgba> for Value {
    fn from(value: Rgba) -> Self {
        Value::Color(value)
    }
}

impl From<Origin> for Value {
    fn from(value: Origin) -> Self {
        Value::Origin(value)
    }
}

/// Ordered set of property values; setting a property twice keeps the last.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Props(Vec<(Property, Value)>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: Property, value: impl Into<Value>) -> Self {
        self.insert(property, value.into());
        self
    }

    pub fn insert(&mut self, property: Property, value: Value) {
        match self.0.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.0.push((property, value)),
        }
    }

    pub fn get(&self, property: Property) -> Option<Value> {
        self.0
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| *v)
    }

    pub fn number(&self, property: Property) -> Option<f64> {
        self.get(property).and_then(Value::as_number)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, Value)> + '_ {
        self.0.iter().copied()
    }

    pub fn properties(&self) -> impl Iterator<Item = Property> + '_ {
        self.0.iter().map(|(p, _)| *p)
    }

    /// Overlay `other` on top of `self`.
    pub fn merge(&mut self, other: &Props) {
        for (p, v) in other.iter() {
            self.insert(p, v);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
