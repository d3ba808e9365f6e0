//! Tool Registry (C4).
//!
//! Directly generalizes `sage_agent.rs`'s `Tool`/`ToolRegistry`/`ToolResult`
//! trio: a process-wide, read-only-after-construction map from tool name to
//! an `Arc<dyn Tool>`. Pure tools here are thin JSON-argument wrappers over
//! the plain functions in `datcom_tools`, mirroring how `shell_tool.rs`
//! wraps `std::process::Command`. DB/LLM-backed tools live alongside the
//! clients they need in `retrieval_tools.rs`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::chat_client::ToolSpec;
use crate::errors::ToolError;
use datcom_tools::{body, calculator, fltcon, geometry, synthesis, validate};

#[derive(Debug, Clone)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> Value;
    async fn execute(&self, args: &Value) -> Result<ToolResult, ToolError>;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn to_tool_specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self
            .tools
            .values()
            .map(|t| ToolSpec {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema(),
            })
            .collect();
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }
}

fn required_f64(args: &Value, field: &str, tool: &str) -> Result<f64, ToolError> {
    args.get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| ToolError::BadArguments {
            tool: tool.to_string(),
            reason: format!("missing or non-numeric field '{}'", field),
        })
}

fn optional_f64(args: &Value, field: &str) -> Option<f64> {
    args.get(field).and_then(Value::as_f64)
}

fn required_str<'a>(args: &'a Value, field: &str, tool: &str) -> Result<&'a str, ToolError> {
    args.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolError::BadArguments {
            tool: tool.to_string(),
            reason: format!("missing or non-string field '{}'", field),
        })
}

fn required_f64_array(args: &Value, field: &str, tool: &str) -> Result<Vec<f64>, ToolError> {
    args.get(field)
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_f64).collect())
        .ok_or_else(|| ToolError::BadArguments {
            tool: tool.to_string(),
            reason: format!("missing or non-array field '{}'", field),
        })
}

struct PythonCalculatorTool;

#[async_trait]
impl Tool for PythonCalculatorTool {
    fn name(&self) -> &str {
        "python_calculator"
    }
    fn description(&self) -> &str {
        "Evaluate an arithmetic or symbolic expression (<=500 chars). No code execution."
    }
    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {"expression": {"type": "string"}}, "required": ["expression"]})
    }
    async fn execute(&self, args: &Value) -> Result<ToolResult, ToolError> {
        let expression = required_str(args, "expression", self.name())?;
        match calculator::python_calculator(expression) {
            Ok(value) => Ok(ToolResult::success(value)),
            Err(e) => Ok(ToolResult::error(format!("illegal or rejected expression: {}", e))),
        }
    }
}

struct ConvertWingToDatcomTool;

fn planform_from_args(args: &Value, tool: &str) -> Result<geometry::Planform, ToolError> {
    Ok(geometry::Planform {
        area: required_f64(args, "S", tool)?,
        aspect_ratio: required_f64(args, "A", tool)?,
        taper_ratio: required_f64(args, "lambda", tool)?,
        sweep_deg: required_f64(args, "sweep", tool)?,
        airfoil: args.get("airfoil").and_then(Value::as_str).map(String::from),
        dihedral_deg: optional_f64(args, "dihedral"),
        twist_deg: optional_f64(args, "twist"),
    })
}

fn surface_geometry_json(g: &geometry::SurfaceGeometry) -> Value {
    json!({
        "b": g.span,
        "CHRDR": g.root_chord,
        "CHRDTP": g.tip_chord,
        "SSPN": g.semi_span,
        "MAC": g.mean_aero_chord,
        "SAVSI": g.sweep_deg,
        "DHDADI": g.dihedral_deg,
        "TWISTA": g.twist_deg,
    })
}

#[async_trait]
impl Tool for ConvertWingToDatcomTool {
    fn name(&self) -> &str {
        "convert_wing_to_datcom"
    }
    fn description(&self) -> &str {
        "Convert wing planform geometry (S, A, lambda, sweep) into a WGPLNF namelist dict."
    }
    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {
            "S": {"type": "number"}, "A": {"type": "number"},
            "lambda": {"type": "number"}, "sweep": {"type": "number"},
            "airfoil": {"type": "string"}, "dihedral": {"type": "number"}, "twist": {"type": "number"}
        }, "required": ["S", "A", "lambda", "sweep"]})
    }
    async fn execute(&self, args: &Value) -> Result<ToolResult, ToolError> {
        let planform = planform_from_args(args, self.name())?;
        match geometry::surface_from_planform(&planform) {
            Ok(g) => Ok(ToolResult::success(surface_geometry_json(&g).to_string())),
            Err(e) => Ok(ToolResult::error(e.to_string())),
        }
    }
}

struct ConvertTailToDatcomTool;

#[async_trait]
impl Tool for ConvertTailToDatcomTool {
    fn name(&self) -> &str {
        "convert_tail_to_datcom"
    }
    fn description(&self) -> &str {
        "Convert a horizontal or vertical tail's geometry into an HTPLNF/VTPLNF namelist dict."
    }
    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {
            "component": {"type": "string"}, "S": {"type": "number"}, "A": {"type": "number"},
            "lambda": {"type": "number"}, "sweep": {"type": "number"}, "is_vertical": {"type": "boolean"}
        }, "required": ["component", "S", "A", "lambda", "sweep", "is_vertical"]})
    }
    async fn execute(&self, args: &Value) -> Result<ToolResult, ToolError> {
        let planform = planform_from_args(args, self.name())?;
        match geometry::surface_from_planform(&planform) {
            Ok(g) => Ok(ToolResult::success(surface_geometry_json(&g).to_string())),
            Err(e) => Ok(ToolResult::error(e.to_string())),
        }
    }
}

struct CalculateSynthesisPositionsTool;

#[async_trait]
impl Tool for CalculateSynthesisPositionsTool {
    fn name(&self) -> &str {
        "calculate_synthesis_positions"
    }
    fn description(&self) -> &str {
        "Compute component station positions (SYNTHS) from fuselage length and percentage fractions."
    }
    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {
            "fuselage_length": {"type": "number"},
            "wing_pct": {"type": "number"}, "htail_pct": {"type": "number"},
            "vtail_pct": {"type": "number"}, "cg_pct": {"type": "number"}
        }, "required": ["fuselage_length"]})
    }
    async fn execute(&self, args: &Value) -> Result<ToolResult, ToolError> {
        let input = synthesis::SynthesisInput {
            fuselage_length: required_f64(args, "fuselage_length", self.name())?,
            wing_station_pct: optional_f64(args, "wing_pct"),
            htail_station_pct: optional_f64(args, "htail_pct"),
            vtail_station_pct: optional_f64(args, "vtail_pct"),
            cg_station_pct: optional_f64(args, "cg_pct"),
        };
        match synthesis::calculate_synthesis_positions(&input) {
            Ok(s) => Ok(ToolResult::success(
                json!({"XW": s.xw, "XH": s.xh, "XV": s.xv, "XCG": s.xcg}).to_string(),
            )),
            Err(e) => Ok(ToolResult::error(e.to_string())),
        }
    }
}

struct DefineBodyGeometryTool;

#[async_trait]
impl Tool for DefineBodyGeometryTool {
    fn name(&self) -> &str {
        "define_body_geometry"
    }
    fn description(&self) -> &str {
        "Define an axisymmetric fuselage body (BODY) from length, max diameter, and nose/tail lengths."
    }
    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {
            "length": {"type": "number"}, "diameter": {"type": "number"},
            "nose_len": {"type": "number"}, "tail_len": {"type": "number"},
            "n_stations": {"type": "integer"}
        }, "required": ["length", "diameter", "nose_len", "tail_len"]})
    }
    async fn execute(&self, args: &Value) -> Result<ToolResult, ToolError> {
        let input = body::BodyInput {
            length: required_f64(args, "length", self.name())?,
            max_diameter: required_f64(args, "diameter", self.name())?,
            nose_length: required_f64(args, "nose_len", self.name())?,
            tail_length: required_f64(args, "tail_len", self.name())?,
            n_stations: args
                .get("n_stations")
                .and_then(Value::as_u64)
                .unwrap_or(10) as usize,
        };
        match body::define_body_geometry(&input) {
            Ok(g) => Ok(ToolResult::success(
                json!({"X": g.x, "R": g.r}).to_string(),
            )),
            Err(e) => Ok(ToolResult::error(e.to_string())),
        }
    }
}

struct GenerateFltconMatrixTool;

#[async_trait]
impl Tool for GenerateFltconMatrixTool {
    fn name(&self) -> &str {
        "generate_fltcon_matrix"
    }
    fn description(&self) -> &str {
        "Build the FLTCON Mach/altitude/alpha analysis matrix; enforces the 400-point DATCOM limit."
    }
    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {
            "machs": {"type": "array", "items": {"type": "number"}},
            "alts": {"type": "array", "items": {"type": "number"}},
            "alpha0": {"type": "number"}, "alpha1": {"type": "number"}, "dalpha": {"type": "number"},
            "weight": {"type": "number"}
        }, "required": ["machs", "alts", "alpha0", "alpha1", "dalpha", "weight"]})
    }
    async fn execute(&self, args: &Value) -> Result<ToolResult, ToolError> {
        let input = fltcon::FltconInput {
            machs: required_f64_array(args, "machs", self.name())?,
            altitudes: required_f64_array(args, "alts", self.name())?,
            alpha_start: required_f64(args, "alpha0", self.name())?,
            alpha_end: required_f64(args, "alpha1", self.name())?,
            alpha_step: required_f64(args, "dalpha", self.name())?,
            weight: required_f64(args, "weight", self.name())?,
        };
        match fltcon::generate_fltcon_matrix(&input) {
            Ok(m) => Ok(ToolResult::success(
                json!({
                    "MACH": m.machs, "ALT": m.altitudes, "ALSCHD": m.alphas, "WT": m.weight,
                    "NMACH": m.nmach, "NALT": m.nalt, "NALPHA": m.nalpha
                })
                .to_string(),
            )),
            Err(e) => Ok(ToolResult::error(e.to_string())),
        }
    }
}

struct ValidateDatcomParametersTool;

#[async_trait]
impl Tool for ValidateDatcomParametersTool {
    fn name(&self) -> &str {
        "validate_datcom_parameters"
    }
    fn description(&self) -> &str {
        "Cross-field sanity check over an aggregated DATCOM parameter record; never fatal."
    }
    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {
            "wing_aspect_ratio": {"type": "number"}, "wing_taper_ratio": {"type": "number"},
            "wing_sweep_deg": {"type": "number"}, "nmach": {"type": "integer"},
            "nalt": {"type": "integer"}, "nalpha": {"type": "integer"},
            "fuselage_length": {"type": "number"}, "xcg": {"type": "number"},
            "xw": {"type": "number"}, "weight": {"type": "number"}
        }})
    }
    async fn execute(&self, args: &Value) -> Result<ToolResult, ToolError> {
        let input = validate::ValidationInput {
            wing_aspect_ratio: optional_f64(args, "wing_aspect_ratio"),
            wing_taper_ratio: optional_f64(args, "wing_taper_ratio"),
            wing_sweep_deg: optional_f64(args, "wing_sweep_deg"),
            nmach: args.get("nmach").and_then(Value::as_u64).map(|v| v as usize),
            nalt: args.get("nalt").and_then(Value::as_u64).map(|v| v as usize),
            nalpha: args.get("nalpha").and_then(Value::as_u64).map(|v| v as usize),
            fuselage_length: optional_f64(args, "fuselage_length"),
            xcg: optional_f64(args, "xcg"),
            xw: optional_f64(args, "xw"),
            weight: optional_f64(args, "weight"),
        };
        let report = validate::validate_datcom_parameters(&input);
        let result = if report.passed {
            ToolResult::success("PASS: no issues found")
        } else {
            let issues: Vec<String> = report
                .issues
                .iter()
                .map(|i| format!("{}: {}", i.field, i.message))
                .collect();
            ToolResult::success(format!("FAIL:\n{}", issues.join("\n")))
        };
        Ok(result)
    }
}

/// Registers the seven pure (DB-free) required tools. DB/LLM-backed tools
/// are registered separately by `retrieval_tools::register_all`.
pub fn register_pure_tools(registry: &mut ToolRegistry) {
    registry.register(Arc::new(PythonCalculatorTool));
    registry.register(Arc::new(ConvertWingToDatcomTool));
    registry.register(Arc::new(ConvertTailToDatcomTool));
    registry.register(Arc::new(CalculateSynthesisPositionsTool));
    registry.register(Arc::new(DefineBodyGeometryTool));
    registry.register(Arc::new(GenerateFltconMatrixTool));
    registry.register(Arc::new(ValidateDatcomParametersTool));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_starts_empty() {
        let registry = ToolRegistry::new();
        assert!(!registry.has("python_calculator"));
    }

    #[tokio::test]
    async fn pure_tools_are_reachable_by_name() {
        let mut registry = ToolRegistry::new();
        register_pure_tools(&mut registry);
        assert!(registry.has("python_calculator"));
        assert!(registry.has("convert_wing_to_datcom"));

        let tool = registry.get("python_calculator").unwrap();
        let result = tool.execute(&json!({"expression": "1+1"})).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "2");
    }

    #[tokio::test]
    async fn calculator_tool_rejects_blocked_expression() {
        let mut registry = ToolRegistry::new();
        register_pure_tools(&mut registry);
        let tool = registry.get("python_calculator").unwrap();
        let result = tool
            .execute(&json!({"expression": "__import__('os')"}))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("illegal"));
    }
}
