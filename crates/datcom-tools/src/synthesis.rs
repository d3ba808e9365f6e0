//! Component station positions (SYNTHS namelist), as fractions of fuselage
//! length unless a station is given directly.

use serde::{Deserialize, Serialize};

/// Documented defaults from the DATCOM pipeline's synthesis-position stage:
/// wing 40%, htail 90%, vtail 65%, cg 35% of fuselage length.
pub const DEFAULT_WING_STATION_PCT: f64 = 0.40;
pub const DEFAULT_HTAIL_STATION_PCT: f64 = 0.90;
pub const DEFAULT_VTAIL_STATION_PCT: f64 = 0.65;
pub const DEFAULT_CG_STATION_PCT: f64 = 0.35;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SynthesisInput {
    pub fuselage_length: f64,
    pub wing_station_pct: Option<f64>,
    pub htail_station_pct: Option<f64>,
    pub vtail_station_pct: Option<f64>,
    pub cg_station_pct: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SynthesisStations {
    pub xw: f64,
    pub xh: f64,
    pub xv: f64,
    pub xcg: f64,
    pub used_wing_default: bool,
    pub used_htail_default: bool,
    pub used_vtail_default: bool,
    pub used_cg_default: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("fuselage_length must be positive, got {0}")]
    NonPositiveLength(f64),
}

pub fn calculate_synthesis_positions(
    input: &SynthesisInput,
) -> Result<SynthesisStations, SynthesisError> {
    if input.fuselage_length <= 0.0 {
        return Err(SynthesisError::NonPositiveLength(input.fuselage_length));
    }
    let l = input.fuselage_length;

    let (xw, used_wing_default) = match input.wing_station_pct {
        Some(pct) => (l * pct, false),
        None => (l * DEFAULT_WING_STATION_PCT, true),
    };
    let (xh, used_htail_default) = match input.htail_station_pct {
        Some(pct) => (l * pct, false),
        None => (l * DEFAULT_HTAIL_STATION_PCT, true),
    };
    let (xv, used_vtail_default) = match input.vtail_station_pct {
        Some(pct) => (l * pct, false),
        None => (l * DEFAULT_VTAIL_STATION_PCT, true),
    };
    let (xcg, used_cg_default) = match input.cg_station_pct {
        Some(pct) => (l * pct, false),
        None => (l * DEFAULT_CG_STATION_PCT, true),
    };

    Ok(SynthesisStations {
        xw,
        xh,
        xv,
        xcg,
        used_wing_default,
        used_htail_default,
        used_vtail_default,
        used_cg_default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_explicit_percentages() {
        let input = SynthesisInput {
            fuselage_length: 63.0,
            wing_station_pct: Some(18.5 / 63.0),
            htail_station_pct: Some(49.0 / 63.0),
            vtail_station_pct: None,
            cg_station_pct: Some(25.0 / 63.0),
        };
        let s = calculate_synthesis_positions(&input).unwrap();
        assert!((s.xw - 18.5).abs() < 1e-6);
        assert!((s.xh - 49.0).abs() < 1e-6);
        assert!(s.used_vtail_default);
        assert!(!s.used_wing_default);
    }

    #[test]
    fn falls_back_to_documented_defaults() {
        let input = SynthesisInput {
            fuselage_length: 100.0,
            wing_station_pct: None,
            htail_station_pct: None,
            vtail_station_pct: None,
            cg_station_pct: None,
        };
        let s = calculate_synthesis_positions(&input).unwrap();
        assert_eq!(s.xw, 40.0);
        assert_eq!(s.xh, 90.0);
        assert_eq!(s.xv, 65.0);
        assert_eq!(s.xcg, 35.0);
    }

    #[test]
    fn rejects_non_positive_fuselage_length() {
        let input = SynthesisInput {
            fuselage_length: 0.0,
            wing_station_pct: None,
            htail_station_pct: None,
            vtail_station_pct: None,
            cg_station_pct: None,
        };
        assert!(calculate_synthesis_positions(&input).is_err());
    }
}
