//! Per-level height increments.

use std::path::Path;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How much height each rule level adds on top of its tallest parent.
///
/// Loaded from JSON; every key is optional and unknown keys are ignored:
///
/// ```json
/// { "lv1_depth1": 1, "lv4": 5, "lv5": "6.5" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightConfig {
    /// Level 1 at generation depth 1.
    #[serde(default = "default_lv1_depth1")]
    pub lv1_depth1: Decimal,
    /// Level 1 at any deeper generation.
    #[serde(default = "default_lv1_other")]
    pub lv1_other: Decimal,
    #[serde(default = "default_lv2")]
    pub lv2: Decimal,
    #[serde(default = "default_lv3")]
    pub lv3: Decimal,
    #[serde(default = "default_lv4")]
    pub lv4: Decimal,
    #[serde(default = "default_lv5")]
    pub lv5: Decimal,
    #[serde(default = "default_lv6")]
    pub lv6: Decimal,
}

/// Largest increment a config may set.
pub const MAX_INCREMENT: Decimal = dec!(1000000);

fn default_lv1_depth1() -> Decimal { dec!(1) }
fn default_lv1_other() -> Decimal { dec!(0) }
fn default_lv2() -> Decimal { dec!(1) }
fn default_lv3() -> Decimal { dec!(2) }
fn default_lv4() -> Decimal { dec!(6) }
fn default_lv5() -> Decimal { dec!(6.6) }
fn default_lv6() -> Decimal { dec!(7.2) }

impl Default for HeightConfig {
    fn default() -> Self {
        Self {
            lv1_depth1: default_lv1_depth1(),
            lv1_other: default_lv1_other(),
            lv2: default_lv2(),
            lv3: default_lv3(),
            lv4: default_lv4(),
            lv5: default_lv5(),
            lv6: default_lv6(),
        }
    }
}

impl HeightConfig {
    /// Parse a JSON override table on top of the defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: HeightConfig =
            serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON override file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Read `path` when it exists, otherwise fall back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => {
                tracing::info!(path = %p.display(), "loading height config");
                Self::load(p)
            }
            Some(p) => {
                tracing::warn!(path = %p.display(), "height config not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Increments must lie in `0..=MAX_INCREMENT`. Heights never decrease
    /// along an edge.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.entries() {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(Error::Config(format!("{key} must be non-negative, got {value}")));
            }
            if value > MAX_INCREMENT {
                return Err(Error::Config(format!(
                    "{key} must not exceed {MAX_INCREMENT}, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Height added by a deduction of `level` made at `depth`.
    ///
    /// Level 1 distinguishes depth 1 from deeper steps; levels 2–6 read their
    /// own key; any other level weighs its own number.
    pub fn increment(&self, level: u8, depth: u32) -> Decimal {
        match level {
            1 if depth == 1 => self.lv1_depth1,
            1 => self.lv1_other,
            2 => self.lv2,
            3 => self.lv3,
            4 => self.lv4,
            5 => self.lv5,
            6 => self.lv6,
            other => Decimal::from(other),
        }
    }

    fn entries(&self) -> [(&'static str, Decimal); 7] {
        [
            ("lv1_depth1", self.lv1_depth1),
            ("lv1_other", self.lv1_other),
            ("lv2", self.lv2),
            ("lv3", self.lv3),
            ("lv4", self.lv4),
            ("lv5", self.lv5),
            ("lv6", self.lv6),
        ]
    }
}
