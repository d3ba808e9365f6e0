//! Cross-field sanity checks over an aggregated DATCOM parameter record.
//!
//! A validation failure is reported, never fatal: the spec requires the
//! formatter to still run and the report to be appended to the answer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValidationInput {
    pub wing_aspect_ratio: Option<f64>,
    pub wing_taper_ratio: Option<f64>,
    pub wing_sweep_deg: Option<f64>,
    pub nmach: Option<usize>,
    pub nalt: Option<usize>,
    pub nalpha: Option<usize>,
    pub fuselage_length: Option<f64>,
    pub xcg: Option<f64>,
    pub xw: Option<f64>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    pub passed: bool,
    pub issues: Vec<ValidationIssue>,
}

fn issue(field: &str, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        field: field.to_string(),
        message: message.into(),
    }
}

pub fn validate_datcom_parameters(input: &ValidationInput) -> ValidationReport {
    let mut issues = Vec::new();

    if let Some(ar) = input.wing_aspect_ratio {
        if !(1.0..=20.0).contains(&ar) {
            issues.push(issue(
                "wing_aspect_ratio",
                format!("{} is outside the plausible range [1, 20]", ar),
            ));
        }
    }

    if let Some(lambda) = input.wing_taper_ratio {
        if !(0.0..=1.0).contains(&lambda) || lambda == 0.0 {
            issues.push(issue(
                "wing_taper_ratio",
                format!("{} must be in (0, 1]", lambda),
            ));
        }
    }

    if let Some(sweep) = input.wing_sweep_deg {
        if !(-60.0..=60.0).contains(&sweep) {
            issues.push(issue(
                "wing_sweep_deg",
                format!("{} is outside the plausible range [-60, 60]", sweep),
            ));
        }
    }

    if let (Some(nmach), Some(nalt), Some(nalpha)) = (input.nmach, input.nalt, input.nalpha) {
        let total = nmach * nalt * nalpha;
        if total > crate::fltcon::MAX_ANALYSIS_POINTS {
            issues.push(issue(
                "flight_matrix",
                format!(
                    "NMACH*NALT*NALPHA = {} exceeds the {}-point limit",
                    total,
                    crate::fltcon::MAX_ANALYSIS_POINTS
                ),
            ));
        }
    }

    if let (Some(fuselage_length), Some(xcg)) = (input.fuselage_length, input.xcg) {
        if xcg < 0.0 || xcg > fuselage_length {
            issues.push(issue(
                "xcg",
                format!(
                    "center of gravity station {} lies outside the fuselage length {}",
                    xcg, fuselage_length
                ),
            ));
        }
    }

    if let (Some(fuselage_length), Some(xw)) = (input.fuselage_length, input.xw) {
        if xw < 0.0 || xw > fuselage_length {
            issues.push(issue(
                "xw",
                format!(
                    "wing station {} lies outside the fuselage length {}",
                    xw, fuselage_length
                ),
            ));
        }
    }

    if let Some(weight) = input.weight {
        if weight <= 0.0 {
            issues.push(issue("weight", format!("{} must be positive", weight)));
        }
    }

    ValidationReport {
        passed: issues.is_empty(),
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_on_a_well_formed_record() {
        let input = ValidationInput {
            wing_aspect_ratio: Some(8.0),
            wing_taper_ratio: Some(0.5),
            wing_sweep_deg: Some(25.0),
            nmach: Some(1),
            nalt: Some(1),
            nalpha: Some(7),
            fuselage_length: Some(63.0),
            xcg: Some(25.0),
            xw: Some(18.5),
            weight: Some(40000.0),
        };
        let report = validate_datcom_parameters(&input);
        assert!(report.passed);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn flags_cg_outside_fuselage() {
        let input = ValidationInput {
            fuselage_length: Some(50.0),
            xcg: Some(75.0),
            ..Default::default()
        };
        let report = validate_datcom_parameters(&input);
        assert!(!report.passed);
        assert_eq!(report.issues[0].field, "xcg");
    }

    #[test]
    fn flags_oversized_flight_matrix() {
        let input = ValidationInput {
            nmach: Some(20),
            nalt: Some(10),
            nalpha: Some(10),
            ..Default::default()
        };
        let report = validate_datcom_parameters(&input);
        assert!(!report.passed);
    }
}
