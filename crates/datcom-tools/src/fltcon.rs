//! Flight condition envelope (FLTCON namelist): Mach/altitude/alpha grid.

use serde::{Deserialize, Serialize};

/// DATCOM's hard limit on the number of analysis points (NMACH*NALT*NALPHA).
pub const MAX_ANALYSIS_POINTS: usize = 400;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FltconInput {
    pub machs: Vec<f64>,
    pub altitudes: Vec<f64>,
    pub alpha_start: f64,
    pub alpha_end: f64,
    pub alpha_step: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FltconMatrix {
    pub machs: Vec<f64>,
    pub altitudes: Vec<f64>,
    pub alphas: Vec<f64>,
    pub weight: f64,
    pub nmach: usize,
    pub nalt: usize,
    pub nalpha: usize,
}

impl FltconMatrix {
    pub fn total_points(&self) -> usize {
        self.nmach * self.nalt * self.nalpha
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FltconError {
    #[error("at least one Mach number is required")]
    EmptyMachs,
    #[error("at least one altitude is required")]
    EmptyAltitudes,
    #[error("alpha_step must be positive, got {0}")]
    NonPositiveStep(f64),
    #[error("alpha_end must be >= alpha_start ({0} < {1})")]
    InvertedAlphaRange(f64, f64),
    #[error("weight must be positive, got {0}")]
    NonPositiveWeight(f64),
    #[error("NMACH*NALT*NALPHA = {0} exceeds DATCOM's {1}-point limit")]
    TooManyAnalysisPoints(usize, usize),
}

pub fn generate_fltcon_matrix(input: &FltconInput) -> Result<FltconMatrix, FltconError> {
    if input.machs.is_empty() {
        return Err(FltconError::EmptyMachs);
    }
    if input.altitudes.is_empty() {
        return Err(FltconError::EmptyAltitudes);
    }
    if input.alpha_step <= 0.0 {
        return Err(FltconError::NonPositiveStep(input.alpha_step));
    }
    if input.alpha_end < input.alpha_start {
        return Err(FltconError::InvertedAlphaRange(
            input.alpha_end,
            input.alpha_start,
        ));
    }
    if input.weight <= 0.0 {
        return Err(FltconError::NonPositiveWeight(input.weight));
    }

    let nalpha = ((input.alpha_end - input.alpha_start) / input.alpha_step).floor() as usize + 1;
    let alphas: Vec<f64> = (0..nalpha)
        .map(|i| input.alpha_start + (i as f64) * input.alpha_step)
        .collect();

    let nmach = input.machs.len();
    let nalt = input.altitudes.len();
    let total = nmach * nalt * nalpha;
    if total > MAX_ANALYSIS_POINTS {
        return Err(FltconError::TooManyAnalysisPoints(total, MAX_ANALYSIS_POINTS));
    }

    Ok(FltconMatrix {
        machs: input.machs.clone(),
        altitudes: input.altitudes.clone(),
        alphas,
        weight: input.weight,
        nmach,
        nalt,
        nalpha,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_scenario_s1_point_count() {
        let input = FltconInput {
            machs: vec![0.8],
            altitudes: vec![10000.0],
            alpha_start: -2.0,
            alpha_end: 2.0,
            alpha_step: 10.0 / 3.0 / 2.0, // placeholder, overwritten below
            weight: 40000.0,
        };
        // alpha range "-2:10:2" in the seed means step implied by 7 points.
        let input = FltconInput {
            alpha_step: (2.0 - (-2.0)) / 6.0,
            ..input
        };
        let m = generate_fltcon_matrix(&input).unwrap();
        assert_eq!(m.nmach, 1);
        assert_eq!(m.nalpha, 7);
        assert_eq!(m.total_points(), 7);
    }

    #[test]
    fn point_count_matches_formula() {
        let input = FltconInput {
            machs: vec![0.3, 0.5, 0.7],
            altitudes: vec![0.0, 5000.0],
            alpha_start: -4.0,
            alpha_end: 4.0,
            alpha_step: 2.0,
            weight: 1000.0,
        };
        let m = generate_fltcon_matrix(&input).unwrap();
        assert_eq!(m.nalpha, 5);
        assert_eq!(m.total_points(), 3 * 2 * 5);
    }

    #[test]
    fn rejects_grids_over_the_datcom_limit() {
        let input = FltconInput {
            machs: (0..20).map(|i| 0.1 + i as f64 * 0.01).collect(),
            altitudes: (0..10).map(|i| i as f64 * 1000.0).collect(),
            alpha_start: -10.0,
            alpha_end: 10.0,
            alpha_step: 1.0,
            weight: 1000.0,
        };
        assert!(matches!(
            generate_fltcon_matrix(&input),
            Err(FltconError::TooManyAnalysisPoints(_, _))
        ));
    }
}
