//! Network-aware quality and density ceilings.
//!
//! Connection information is never measured here; it arrives as hints from the
//! host environment (for HTTP clients, the `ECT` and `Save-Data` client-hint
//! headers).

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ParseValueError;

/// Quality used when the caller gives none.
pub const DEFAULT_BASE_QUALITY: u8 = 85;

/// Coarse network classification reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EffectiveType {
    #[serde(rename = "slow-2g")]
    Slow2g,
    #[serde(rename = "2g")]
    TwoG,
    #[serde(rename = "3g")]
    ThreeG,
    #[serde(rename = "4g")]
    FourG,
}

impl EffectiveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow2g => "slow-2g",
            Self::TwoG => "2g",
            Self::ThreeG => "3g",
            Self::FourG => "4g",
        }
    }
}

impl fmt::Display for EffectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectiveType {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_matches('"').to_lowercase().as_str() {
            "slow-2g" => Ok(Self::Slow2g),
            "2g" => Ok(Self::TwoG),
            "3g" => Ok(Self::ThreeG),
            "4g" => Ok(Self::FourG),
            _ => Err(ParseValueError::new("effective connection type", s)),
        }
    }
}

/// Ambient connection hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub effective_type: Option<EffectiveType>,
    pub save_data: bool,
}

impl ConnectionInfo {
    pub fn new(effective_type: Option<EffectiveType>, save_data: bool) -> Self {
        Self {
            effective_type,
            save_data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.effective_type.is_none() && !self.save_data
    }
}

/// Lower the quality for slow or metered connections.
///
/// An explicit `connection_override` wins over every ambient hint, data-saver
/// included. Otherwise data-saver takes precedence over the effective type.
/// The result is `max(base - delta, floor)`, so a base below the floor is
/// raised to it.
pub fn adjust_quality_for_connection(
    base_quality: u8,
    connection_override: Option<EffectiveType>,
    ambient: Option<&ConnectionInfo>,
) -> u8 {
    let (delta, floor) = match connection_override {
        Some(effective_type) => reduction_for(Some(effective_type)),
        None => match ambient {
            Some(info) if info.save_data => (30, 40),
            Some(info) => reduction_for(info.effective_type),
            None => (0, 0),
        },
    };

    base_quality.saturating_sub(delta).max(floor)
}

fn reduction_for(effective_type: Option<EffectiveType>) -> (u8, u8) {
    match effective_type {
        Some(EffectiveType::Slow2g) | Some(EffectiveType::TwoG) => (40, 30),
        Some(EffectiveType::ThreeG) => (20, 50),
        Some(EffectiveType::FourG) | None => (0, 0),
    }
}

/// Highest DPR worth requesting on this connection.
pub fn max_dpr_for_connection(connection: Option<&ConnectionInfo>) -> f64 {
    match connection {
        Some(info) if info.save_data => 1.0,
        Some(info) => match info.effective_type {
            Some(EffectiveType::Slow2g) | Some(EffectiveType::TwoG) => 1.0,
            Some(EffectiveType::ThreeG) => 2.0,
            Some(EffectiveType::FourG) | None => 3.0,
        },
        None => 3.0,
    }
}
