//! Easing curves, named the way timeline configs spell them (`"power2.out"`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Easing functions used to map normalized animation progress.
///
/// `powerN` curves are polynomial with exponent `N + 1`, so `power1` is
/// quadratic and `power4` is quintic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Ease {
    /// Linear interpolation.
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "power1.in")]
    Power1In,
    #[serde(rename = "power1.out")]
    Power1Out,
    #[serde(rename = "power1.inOut")]
    Power1InOut,
    #[serde(rename = "power2.in")]
    Power2In,
    #[serde(rename = "power2.out")]
    Power2Out,
    #[serde(rename = "power2.inOut")]
    Power2InOut,
    #[serde(rename = "power3.in")]
    Power3In,
    #[serde(rename = "power3.out")]
    Power3Out,
    #[serde(rename = "power3.inOut")]
    Power3InOut,
    #[serde(rename = "power4.in")]
    Power4In,
    #[serde(rename = "power4.out")]
    Power4Out,
    #[serde(rename = "power4.inOut")]
    Power4InOut,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Shape {
    In,
    Out,
    InOut,
}

impl Ease {
    const ALL: [Ease; 13] = [
        Ease::None,
        Ease::Power1In,
        Ease::Power1Out,
        Ease::Power1InOut,
        Ease::Power2In,
        Ease::Power2Out,
        Ease::Power2InOut,
        Ease::Power3In,
        Ease::Power3Out,
        Ease::Power3InOut,
        Ease::Power4In,
        Ease::Power4Out,
        Ease::Power4InOut,
    ];

    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        let Some((exponent, shape)) = self.curve() else {
            return t;
        };
        match shape {
            Shape::In => t.powi(exponent),
            Shape::Out => 1.0 - (1.0 - t).powi(exponent),
            Shape::InOut => {
                if t < 0.5 {
                    (2.0 * t).powi(exponent) / 2.0
                } else {
                    1.0 - (2.0 * (1.0 - t)).powi(exponent) / 2.0
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Power1In => "power1.in",
            Self::Power1Out => "power1.out",
            Self::Power1InOut => "power1.inOut",
            Self::Power2In => "power2.in",
            Self::Power2Out => "power2.out",
            Self::Power2InOut => "power2.inOut",
            Self::Power3In => "power3.in",
            Self::Power3Out => "power3.out",
            Self::Power3InOut => "power3.inOut",
            Self::Power4In => "power4.in",
            Self::Power4Out => "power4.out",
            Self::Power4InOut => "power4.inOut",
        }
    }

    fn curve(self) -> Option<(i32, Shape)> {
        let curve = match self {
            Self::None => return None,
            Self::Power1In => (2, Shape::In),
            Self::Power1Out => (2, Shape::Out),
            Self::Power1InOut => (2, Shape::InOut),
            Self::Power2In => (3, Shape::In),
            Self::Power2Out => (3, Shape::Out),
            Self::Power2InOut => (3, Shape::InOut),
            Self::Power3In => (4, Shape::In),
            Self::Power3Out => (4, Shape::Out),
            Self::Power3InOut => (4, Shape::InOut),
            Self::Power4In => (5, Shape::In),
            Self::Power4Out => (5, Shape::Out),
            Self::Power4InOut => (5, Shape::InOut),
        };
        Some(curve)
    }
}

impl fmt::Display for Ease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("unknown ease '{0}'")]
pub struct EaseParseError(pub String);

impl FromStr for Ease {
    type Err = EaseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "linear" {
            return Ok(Ease::None);
        }
        Ease::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| EaseParseError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_fixed() {
        for ease in Ease::ALL {
            assert!(ease.apply(0.0).abs() < 1e-12, "{ease} at 0");
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-12, "{ease} at 1");
        }
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(Ease::Power2Out.apply(-3.0), 0.0);
        assert_eq!(Ease::Power2Out.apply(7.0), 1.0);
    }

    #[test]
    fn out_curves_lead_in_curves() {
        assert!(Ease::Power2Out.apply(0.3) > Ease::None.apply(0.3));
        assert!(Ease::Power2In.apply(0.3) < Ease::None.apply(0.3));
        assert!((Ease::Power3InOut.apply(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn power2_out_is_cubic() {
        let t: f64 = 0.25;
        assert!((Ease::Power2Out.apply(t) - (1.0 - (1.0 - t).powi(3))).abs() < 1e-12);
    }

    #[test]
    fn parses_dotted_names() {
        assert_eq!("power3.out".parse::<Ease>(), Ok(Ease::Power3Out));
        assert_eq!("power1.inOut".parse::<Ease>(), Ok(Ease::Power1InOut));
        assert_eq!("linear".parse::<Ease>(), Ok(Ease::None));
        assert!("elastic".parse::<Ease>().is_err());
    }

    #[test]
    fn serde_uses_dotted_names() {
        let json = serde_json::to_string(&Ease::Power2In).unwrap();
        assert_eq!(json, "\"power2.in\"");
        let back: Ease = serde_json::from_str("\"power4.out\"").unwrap();
        assert_eq!(back, Ease::Power4Out);
    }
}
