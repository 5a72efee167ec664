//! Capabilities: what a device can do, fixed once at creation.
//!
//! Feature bitsets use the same bit values as the host platform's
//! `supported_features` attribute so snapshots can be compared directly.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

macro_rules! define_features {
    ($(#[doc = $doc:expr])* $name:ident { $($(#[doc = $fdoc:expr])* $flag:ident = $bit:expr),+ $(,)? }) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(u32);

        impl $name {
            $(
                $(#[doc = $fdoc])*
                pub const $flag: Self = Self($bit);
            )+

            /// No features at all.
            #[must_use]
            pub const fn empty() -> Self {
                Self(0)
            }

            /// Raw bit representation.
            #[must_use]
            pub const fn bits(self) -> u32 {
                self.0
            }

            /// Whether every bit of `other` is set in `self`.
            #[must_use]
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            /// Set the bits of `other`.
            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }
        }

        impl BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }
    };
}

define_features!(
    /// Optional light capabilities.
    LightFeatures {
        /// Dimmable.
        BRIGHTNESS = 1,
        /// White color temperature.
        COLOR_TEMP = 2,
        /// Named effects.
        EFFECT = 4,
        /// Hue/saturation color.
        COLOR = 16,
    }
);

define_features!(
    /// Optional fan capabilities.
    FanFeatures {
        SET_SPEED = 1,
        OSCILLATE = 2,
        DIRECTION = 4,
        PRESET_MODE = 8,
    }
);

/// How a light's color is currently expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    Onoff,
    Brightness,
    Hs,
    ColorTemp,
}

impl ColorMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Onoff => "onoff",
            Self::Brightness => "brightness",
            Self::Hs => "hs",
            Self::ColorTemp => "color_temp",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hue (0–360) and saturation (0–100), carried as a `[hue, saturation]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct HsColor {
    pub hue: f64,
    pub saturation: f64,
}

impl From<(f64, f64)> for HsColor {
    fn from((hue, saturation): (f64, f64)) -> Self {
        Self { hue, saturation }
    }
}

impl From<HsColor> for (f64, f64) {
    fn from(color: HsColor) -> Self {
        (color.hue, color.saturation)
    }
}

/// Rotation direction of a fan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanDirection {
    #[default]
    Forward,
    Reverse,
}

impl FanDirection {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
        }
    }
}

impl fmt::Display for FanDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
