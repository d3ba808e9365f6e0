//! `DatcomParams` (spec section 3): a sparse record produced by extraction
//! and consumed by the converter stages. An unset field means "not
//! specified by the user" — never hallucinated by the extractor.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WingParams {
    pub area: Option<f64>,
    pub aspect_ratio: Option<f64>,
    pub taper_ratio: Option<f64>,
    pub sweep_deg: Option<f64>,
    pub airfoil: Option<String>,
    pub dihedral_deg: Option<f64>,
    pub twist_deg: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TailParams {
    pub area: Option<f64>,
    pub aspect_ratio: Option<f64>,
    pub taper_ratio: Option<f64>,
    pub sweep_deg: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FuselageParams {
    pub length: f64,
    pub max_diameter: f64,
    pub nose_length: f64,
    pub tail_length: f64,
    pub n_stations: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FlightParams {
    pub machs: Option<Vec<f64>>,
    pub altitudes: Option<Vec<f64>>,
    pub alpha_start: Option<f64>,
    pub alpha_end: Option<f64>,
    pub alpha_step: Option<f64>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SynthesisFractions {
    pub wing_pct: Option<f64>,
    pub htail_pct: Option<f64>,
    pub vtail_pct: Option<f64>,
    pub cg_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DatcomParams {
    pub aircraft_id: Option<String>,
    pub wing: Option<WingParams>,
    pub htail: Option<TailParams>,
    pub vtail: Option<TailParams>,
    pub fuselage: Option<FuselageParams>,
    pub flight: Option<FlightParams>,
    pub synthesis: Option<SynthesisFractions>,
}

impl DatcomParams {
    /// Gate requirement (spec section 4.6 stage 2): wing block and flight
    /// conditions must be present. Returns the names of missing fields.
    ///
    /// Every sub-field here is `Option` (the extractor only emits what the
    /// user actually stated), so a partial reply like `{"wing":{"area":530}}`
    /// deserializes successfully and lands here for precise reporting,
    /// rather than failing JSON parsing outright.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        match &self.wing {
            Some(w) => {
                if w.area.map_or(true, |v| v <= 0.0) {
                    missing.push("wing area (S)");
                }
                if w.aspect_ratio.map_or(true, |v| v <= 0.0) {
                    missing.push("wing aspect ratio (A)");
                }
                if w.taper_ratio.map_or(true, |v| v <= 0.0) {
                    missing.push("wing taper ratio (lambda)");
                }
                if w.sweep_deg.is_none() {
                    missing.push("wing sweep angle (sweep)");
                }
            }
            None => missing.push("wing geometry (S, A, lambda, sweep)"),
        }

        match &self.flight {
            Some(f) => {
                if f.machs.as_ref().map_or(true, |v| v.is_empty()) {
                    missing.push("at least one Mach number");
                }
                if f.altitudes.as_ref().map_or(true, |v| v.is_empty()) {
                    missing.push("at least one altitude");
                }
                if f.alpha_start.is_none() || f.alpha_end.is_none() || f.alpha_step.map_or(true, |v| v <= 0.0) {
                    missing.push("angle-of-attack range");
                }
                if f.weight.map_or(true, |v| v <= 0.0) {
                    missing.push("aircraft weight");
                }
            }
            None => missing.push("flight conditions (Mach, altitude, alpha range)"),
        }

        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_all_missing_fields_on_empty_record() {
        let params = DatcomParams::default();
        let missing = params.missing_required_fields();
        assert!(missing.contains(&"wing geometry (S, A, lambda, sweep)"));
        assert!(missing.contains(&"flight conditions (Mach, altitude, alpha range)"));
    }

    #[test]
    fn passes_gate_when_wing_and_flight_are_complete() {
        let params = DatcomParams {
            wing: Some(WingParams {
                area: Some(530.0),
                aspect_ratio: Some(2.8),
                taper_ratio: Some(0.3),
                sweep_deg: Some(45.0),
                ..Default::default()
            }),
            flight: Some(FlightParams {
                machs: Some(vec![0.8]),
                altitudes: Some(vec![10000.0]),
                alpha_start: Some(-2.0),
                alpha_end: Some(2.0),
                alpha_step: Some(4.0 / 6.0),
                weight: Some(40000.0),
            }),
            ..Default::default()
        };
        assert!(params.missing_required_fields().is_empty());
    }

    #[test]
    fn reports_exact_missing_fields_on_a_partial_wing_only_reply() {
        let params = DatcomParams {
            wing: Some(WingParams {
                area: Some(530.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let missing = params.missing_required_fields();
        assert!(!missing.contains(&"wing area (S)"));
        assert!(missing.contains(&"wing aspect ratio (A)"));
        assert!(missing.contains(&"wing taper ratio (lambda)"));
        assert!(missing.contains(&"wing sweep angle (sweep)"));
    }
}
