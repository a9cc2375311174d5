//! Device-pixel-ratio selection.
//!
//! Decides which density multiples (`1x`, `2x`, ...) a descriptor set offers.
//! Selection order:
//!
//! 1. a forced DPR short-circuits to a single entry
//! 2. a custom list is filtered to `0 < dpr <= max_dpr` and sorted
//! 3. without auto-detection (or without a known device ratio) the standard
//!    ladder `[1, 2, 3]` is capped by `max_dpr`
//! 4. otherwise the device ratio picks the ladder; 3x is only offered to
//!    devices at 2.75 or above, since the gain past 2x is small

use super::network::{max_dpr_for_connection, ConnectionInfo};

/// Highest DPR requested by default.
pub const DEFAULT_MAX_DPR: f64 = 3.0;

/// Devices below this ratio never get 3x assets.
const THREE_X_THRESHOLD: f64 = 2.75;

/// Inputs to DPR selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DprOptions {
    /// Use exactly this DPR
    pub force_dpr: Option<f64>,
    /// Offer exactly these DPRs (after filtering)
    pub custom_dprs: Option<Vec<f64>>,
    /// Upper bound on offered DPRs
    pub max_dpr: f64,
    /// Use the device ratio to pick the ladder
    pub auto_detect: bool,
    /// Device pixel ratio reported by the client, if known
    pub device_pixel_ratio: Option<f64>,
    /// Connection hints; caps `max_dpr` with the network ceiling when set
    pub connection: Option<ConnectionInfo>,
}

impl Default for DprOptions {
    fn default() -> Self {
        Self {
            force_dpr: None,
            custom_dprs: None,
            max_dpr: DEFAULT_MAX_DPR,
            auto_detect: true,
            device_pixel_ratio: None,
            connection: None,
        }
    }
}

impl DprOptions {
    pub fn forced(dpr: f64) -> Self {
        Self {
            force_dpr: Some(dpr),
            ..Default::default()
        }
    }

    pub fn custom(dprs: Vec<f64>, max_dpr: f64) -> Self {
        Self {
            custom_dprs: Some(dprs),
            max_dpr,
            ..Default::default()
        }
    }

    pub fn for_device(device_pixel_ratio: f64) -> Self {
        Self {
            device_pixel_ratio: Some(device_pixel_ratio),
            ..Default::default()
        }
    }

    fn effective_max_dpr(&self) -> f64 {
        match &self.connection {
            Some(info) => self.max_dpr.min(max_dpr_for_connection(Some(info))),
            None => self.max_dpr,
        }
    }
}

/// Pick the DPR multiples to offer, ascending.
pub fn get_optimal_dpr_values(options: &DprOptions) -> Vec<f64> {
    if let Some(dpr) = options.force_dpr {
        return vec![dpr];
    }

    let max_dpr = options.effective_max_dpr();

    if let Some(custom) = &options.custom_dprs {
        let mut dprs: Vec<f64> = custom
            .iter()
            .copied()
            .filter(|d| *d > 0.0 && *d <= max_dpr)
            .collect();
        dprs.sort_by(|a, b| a.total_cmp(b));
        return dprs;
    }

    let device = match options.device_pixel_ratio {
        Some(ratio) if options.auto_detect && ratio.is_finite() && ratio > 0.0 => ratio,
        _ => return standard_ladder(max_dpr),
    };

    let ladder: Vec<f64> = if device <= 1.0 {
        vec![1.0]
    } else if device <= 1.5 {
        vec![1.0, 1.5]
    } else if device <= 2.5 {
        vec![1.0, 2.0]
    } else if max_dpr >= 3.0 && device >= THREE_X_THRESHOLD {
        vec![1.0, 2.0, 3.0]
    } else {
        vec![1.0, 2.0]
    };

    ladder
        .into_iter()
        .filter(|d| *d == 1.0 || *d <= max_dpr)
        .collect()
}

fn standard_ladder(max_dpr: f64) -> Vec<f64> {
    if max_dpr >= 3.0 {
        vec![1.0, 2.0, 3.0]
    } else if max_dpr >= 2.0 {
        vec![1.0, 2.0]
    } else {
        vec![1.0]
    }
}

/// Whether 3x assets are worth requesting at all.
///
/// Refused for low-density devices, when the connection cannot carry them,
/// and when AVIF is available (its compression already shrinks 2x assets
/// enough that 3x adds little).
pub fn should_use_3x_images(
    device_pixel_ratio: Option<f64>,
    connection: Option<&ConnectionInfo>,
    avif_supported: bool,
) -> bool {
    let dense_enough = device_pixel_ratio.is_some_and(|ratio| ratio >= THREE_X_THRESHOLD);
    dense_enough && max_dpr_for_connection(connection) >= 3.0 && !avif_supported
}
