//! Pass depth generation.

use crate::error::{CamError, Result};
use crate::model::depth::DepthOpParams;

/// Depths of successive passes from `start_depth` down to `final_depth`.
///
/// Empty when the parameters cannot produce passes (start not above final,
/// a depth that is not finite, or a step that is not positive). Otherwise strictly decreasing and ending
/// exactly at `final_depth`.
pub fn get_depths(params: &DepthOpParams) -> Vec<f64> {
    step_depths(params.start_depth, params.final_depth, params.step_down)
}

/// Stepped depths strictly below `start` ending exactly at `end`.
pub fn step_depths(start: f64, end: f64, step: f64) -> Vec<f64> {
    if !start.is_finite() || !end.is_finite() || start <= end || !(step > 0.0) {
        return Vec::new();
    }

    let mut depths = Vec::new();
    let mut pass = 1.0;
    loop {
        let depth = start - step * pass;
        if depth <= end {
            break;
        }
        depths.push(depth);
        pass += 1.0;
    }

    // Every stepped depth is above `end`, so the bottom pass is always added
    depths.push(end);
    depths
}

/// Depths actually cut, honouring user depths, finishing and through depths.
///
/// Explicit user depths win. Otherwise passes step down to
/// `final_depth - z_thru_depth`; with a finish allowance the stepped passes
/// stop that far above the bottom and a separate finishing pass follows.
pub fn pass_depths(params: &DepthOpParams) -> Vec<f64> {
    if let Some(user_depths) = params.user_depths.as_ref().filter(|d| !d.is_empty()) {
        return user_depths.clone();
    }

    if !(params.step_down > 0.0) {
        return Vec::new();
    }

    let bottom = params.final_depth - params.z_thru_depth;
    let finish = params.z_finish_depth;
    if finish > 0.0 && params.start_depth > bottom + finish {
        let mut depths = step_depths(params.start_depth, bottom + finish, params.step_down);
        depths.push(bottom);
        depths
    } else {
        step_depths(params.start_depth, bottom, params.step_down)
    }
}

/// Parse a comma-separated list of depths such as `"-1, -2.5, -4"`.
pub fn parse_user_depths(text: &str) -> Result<Vec<f64>> {
    text.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| match piece.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(CamError::InvalidNumber {
                value: piece.to_string(),
            }),
        })
        .collect()
}

/// Inverse of [`parse_user_depths`].
pub fn format_user_depths(depths: &[f64]) -> String {
    depths
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
