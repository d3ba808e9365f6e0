//! Stages 2-9: the fixed, linear DATCOM generation sequence. No branching
//! or LLM-driven tool selection happens here — this is the whole reason
//! the pipeline exists as a separate component from the reasoning agent.

use datcom_tools::{
    body::{self, BodyInput},
    fltcon::{self, FltconInput},
    geometry::{
        self, Planform, DEFAULT_HTAIL_ASPECT_RATIO, DEFAULT_HTAIL_TAPER_RATIO,
        DEFAULT_VTAIL_ASPECT_RATIO, DEFAULT_VTAIL_TAPER_RATIO,
    },
    synthesis::{self, SynthesisInput},
    validate::{self, ValidationInput},
};

use crate::datcom::format;
use crate::datcom::params::DatcomParams;

/// Chinese-language clarification used when the gate fails (spec section
/// 4.6 stage 2's literal wording). See DESIGN.md for the rationale.
pub fn gate_failure_message(missing: &[&str]) -> String {
    format!(
        "无法生成 DATCOM 输入文件，缺少以下必需字段：{}。请提供这些信息后重试。",
        missing.join("、")
    )
}

pub enum PipelineResult {
    GateFailed(String),
    Generated(String),
}

pub fn run_pipeline(params: &DatcomParams) -> PipelineResult {
    let missing = params.missing_required_fields();
    if !missing.is_empty() {
        return PipelineResult::GateFailed(gate_failure_message(&missing));
    }

    let wing = params.wing.as_ref().expect("gate guarantees wing is set");
    let flight = params.flight.as_ref().expect("gate guarantees flight is set");

    let wing_area = wing.area.expect("gate guarantees wing area is set");
    let wing_aspect_ratio = wing.aspect_ratio.expect("gate guarantees wing aspect ratio is set");
    let wing_taper_ratio = wing.taper_ratio.expect("gate guarantees wing taper ratio is set");
    let wing_sweep_deg = wing.sweep_deg.expect("gate guarantees wing sweep is set");

    let flight_machs = flight.machs.clone().expect("gate guarantees mach numbers are set");
    let flight_altitudes = flight.altitudes.clone().expect("gate guarantees altitudes are set");
    let flight_alpha_start = flight.alpha_start.expect("gate guarantees alpha start is set");
    let flight_alpha_end = flight.alpha_end.expect("gate guarantees alpha end is set");
    let flight_alpha_step = flight.alpha_step.expect("gate guarantees alpha step is set");
    let flight_weight = flight.weight.expect("gate guarantees weight is set");

    let mut errors: Vec<String> = Vec::new();
    let mut provenance = Vec::new();
    if let Some(id) = &params.aircraft_id {
        provenance.push(format!("identifier: {}", id));
    }

    // Stage 3: wing conversion.
    let wing_planform = Planform {
        area: wing_area,
        aspect_ratio: wing_aspect_ratio,
        taper_ratio: wing_taper_ratio,
        sweep_deg: wing_sweep_deg,
        airfoil: wing.airfoil.clone(),
        dihedral_deg: wing.dihedral_deg,
        twist_deg: wing.twist_deg,
    };
    let wing_geometry = match geometry::surface_from_planform(&wing_planform) {
        Ok(g) => g,
        Err(e) => {
            errors.push(format!("wing conversion failed: {}", e));
            return PipelineResult::Generated(assemble_error_report(&provenance, &errors));
        }
    };

    // Stage 4: flight matrix.
    let fltcon_input = FltconInput {
        machs: flight_machs,
        altitudes: flight_altitudes,
        alpha_start: flight_alpha_start,
        alpha_end: flight_alpha_end,
        alpha_step: flight_alpha_step,
        weight: flight_weight,
    };
    let fltcon_matrix = match fltcon::generate_fltcon_matrix(&fltcon_input) {
        Ok(m) => m,
        Err(e) => {
            errors.push(format!("flight matrix generation failed: {}", e));
            return PipelineResult::Generated(assemble_error_report(&provenance, &errors));
        }
    };

    // Stage 5: synthesis positions. A fuselage length is required to turn
    // percentages into absolute stations; if the user never gave one, fall
    // back to 10x the wing root chord (documented fallback, DESIGN.md).
    let fuselage_length = params
        .fuselage
        .as_ref()
        .map(|f| f.length)
        .filter(|l| *l > 0.0)
        .unwrap_or_else(|| {
            provenance.push("fuselage length inferred as 10x wing root chord (not specified)".to_string());
            wing_geometry.root_chord * 10.0
        });

    let synth_fractions = params.synthesis.clone().unwrap_or_default();
    let synthesis_input = SynthesisInput {
        fuselage_length,
        wing_station_pct: synth_fractions.wing_pct,
        htail_station_pct: synth_fractions.htail_pct,
        vtail_station_pct: synth_fractions.vtail_pct,
        cg_station_pct: synth_fractions.cg_pct,
    };
    let stations = match synthesis::calculate_synthesis_positions(&synthesis_input) {
        Ok(s) => s,
        Err(e) => {
            errors.push(format!("synthesis position calculation failed: {}", e));
            return PipelineResult::Generated(assemble_error_report(&provenance, &errors));
        }
    };
    if stations.used_wing_default {
        provenance.push("wing station used documented 40% default".to_string());
    }

    // Stage 6: body geometry, only if the user gave fuselage data.
    let body_geometry = params.fuselage.as_ref().and_then(|f| {
        if f.length > 0.0 && f.max_diameter > 0.0 {
            let input = BodyInput {
                length: f.length,
                max_diameter: f.max_diameter,
                nose_length: f.nose_length,
                tail_length: f.tail_length,
                n_stations: f.n_stations.unwrap_or(10),
            };
            match body::define_body_geometry(&input) {
                Ok(g) => Some(g),
                Err(e) => {
                    errors.push(format!("body geometry failed: {}", e));
                    None
                }
            }
        } else {
            None
        }
    });

    // Stage 7: tail conversions, inferring area/AR/taper from the wing when
    // the user didn't specify a tail at all.
    let htail_geometry = convert_tail(
        params.htail.as_ref(),
        wing_area,
        geometry::infer_htail_area,
        DEFAULT_HTAIL_ASPECT_RATIO,
        DEFAULT_HTAIL_TAPER_RATIO,
        wing_sweep_deg,
        &mut provenance,
        "htail",
    );
    let vtail_geometry = convert_tail(
        params.vtail.as_ref(),
        wing_area,
        geometry::infer_vtail_area,
        DEFAULT_VTAIL_ASPECT_RATIO,
        DEFAULT_VTAIL_TAPER_RATIO,
        wing_sweep_deg,
        &mut provenance,
        "vtail",
    );

    // Stage 8: validate. Never aborts; the report is appended regardless.
    let validation_input = ValidationInput {
        wing_aspect_ratio: Some(wing_aspect_ratio),
        wing_taper_ratio: Some(wing_taper_ratio),
        wing_sweep_deg: Some(wing_sweep_deg),
        nmach: Some(fltcon_matrix.nmach),
        nalt: Some(fltcon_matrix.nalt),
        nalpha: Some(fltcon_matrix.nalpha),
        fuselage_length: Some(fuselage_length),
        xcg: Some(stations.xcg),
        xw: Some(stations.xw),
        weight: Some(flight_weight),
    };
    let validation_report = validate::validate_datcom_parameters(&validation_input);

    // Stage 9: format.
    let header = format::render_header(
        params.aircraft_id.as_deref().unwrap_or("UNNAMED"),
        &provenance,
    );
    let mut blocks = vec![
        header,
        format::render_fltcon(&fltcon_matrix),
        format::render_synths(&stations),
    ];
    if let Some(body) = &body_geometry {
        blocks.push(format::render_body(body));
    }
    blocks.push(format::render_wgplnf(&wing_geometry));
    if let Some(geometry) = &htail_geometry {
        blocks.push(format::render_htplnf(geometry));
    }
    if let Some(geometry) = &vtail_geometry {
        blocks.push(format::render_vtplnf(geometry));
    }

    let mut generation = blocks.join("\n");
    generation.push_str("\n\n* Validation report:\n");
    if validation_report.passed {
        generation.push_str("* PASS: no issues found\n");
    } else {
        for issue in &validation_report.issues {
            generation.push_str(&format!("* FAIL [{}]: {}\n", issue.field, issue.message));
        }
    }
    if !errors.is_empty() {
        generation.push_str("\n* Errors encountered during generation:\n");
        for e in &errors {
            generation.push_str(&format!("* {}\n", e));
        }
    }

    PipelineResult::Generated(generation)
}

#[allow(clippy::too_many_arguments)]
fn convert_tail(
    tail: Option<&crate::datcom::params::TailParams>,
    wing_area: f64,
    infer_area: fn(f64) -> f64,
    default_ar: f64,
    default_taper: f64,
    wing_sweep_deg: f64,
    provenance: &mut Vec<String>,
    label: &str,
) -> Option<datcom_tools::geometry::SurfaceGeometry> {
    let (area, aspect_ratio, taper_ratio, sweep_deg, inferred) = match tail {
        Some(t) if t.area.is_some() => (
            t.area.unwrap(),
            t.aspect_ratio.unwrap_or(default_ar),
            t.taper_ratio.unwrap_or(default_taper),
            t.sweep_deg.unwrap_or(wing_sweep_deg),
            false,
        ),
        _ => (
            infer_area(wing_area),
            default_ar,
            default_taper,
            wing_sweep_deg,
            true,
        ),
    };

    if inferred {
        provenance.push(format!("{} geometry inferred from wing area (documented default)", label));
    }

    let planform = Planform {
        area,
        aspect_ratio,
        taper_ratio,
        sweep_deg,
        airfoil: None,
        dihedral_deg: None,
        twist_deg: None,
    };
    geometry::surface_from_planform(&planform).ok()
}

fn assemble_error_report(provenance: &[String], errors: &[String]) -> String {
    let header = format::render_header("UNNAMED", provenance);
    let mut report = header;
    report.push_str("\n\n* Partial generation failed:\n");
    for e in errors {
        report.push_str(&format!("* {}\n", e));
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datcom::params::{FlightParams, WingParams};

    fn scenario_s1_params() -> DatcomParams {
        DatcomParams {
            aircraft_id: Some("F-4".to_string()),
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
            fuselage: Some(crate::datcom::params::FuselageParams {
                length: 63.0,
                max_diameter: 3.0,
                nose_length: 0.0,
                tail_length: 0.0,
                n_stations: None,
            }),
            synthesis: Some(crate::datcom::params::SynthesisFractions {
                wing_pct: Some(18.5 / 63.0),
                htail_pct: Some(49.0 / 63.0),
                vtail_pct: None,
                cg_pct: Some(25.0 / 63.0),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn scenario_s1_produces_expected_blocks_and_geometry() {
        let result = run_pipeline(&scenario_s1_params());
        match result {
            PipelineResult::Generated(text) => {
                assert!(text.contains("$FLTCON"));
                assert!(text.contains("$SYNTHS"));
                assert!(text.contains("$WGPLNF"));
                assert!(text.contains("NMACH=1"));
                assert!(text.contains("NALPHA=7"));
            }
            PipelineResult::GateFailed(_) => panic!("expected a generated result"),
        }
    }

    #[test]
    fn scenario_s3_gate_failure_produces_clarification_with_no_dat_block() {
        let params = DatcomParams::default();
        match run_pipeline(&params) {
            PipelineResult::GateFailed(message) => {
                assert!(!message.is_empty());
                assert!(!message.contains("$FLTCON"));
            }
            PipelineResult::Generated(_) => panic!("expected gate failure"),
        }
    }
}
