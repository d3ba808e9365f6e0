//! Planform geometry conversion: wing and tail surfaces share one formula set.
//!
//! Span `b = sqrt(A*S)`, root chord `Croot = 2S/(b(1+lambda))`, tip chord
//! `Ctip = lambda*Croot`, semi-span `SSPN = b/2`, mean aerodynamic chord
//! `MAC = (2/3)*Croot*(1+lambda+lambda^2)/(1+lambda)`. Applied identically
//! to the wing and both tails; no per-surface specialization.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Planform {
    /// Reference area, ft^2.
    pub area: f64,
    /// Aspect ratio.
    pub aspect_ratio: f64,
    /// Taper ratio, 0 < lambda <= 1.
    pub taper_ratio: f64,
    /// Quarter-chord sweep, degrees.
    pub sweep_deg: f64,
    pub airfoil: Option<String>,
    pub dihedral_deg: Option<f64>,
    pub twist_deg: Option<f64>,
}

/// Derived namelist-ready surface quantities.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SurfaceGeometry {
    pub span: f64,
    pub root_chord: f64,
    pub tip_chord: f64,
    pub semi_span: f64,
    pub mean_aero_chord: f64,
    pub sweep_deg: f64,
    pub dihedral_deg: f64,
    pub twist_deg: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("aspect ratio must be positive, got {0}")]
    NonPositiveAspectRatio(f64),
    #[error("taper ratio must be in (0, 1], got {0}")]
    InvalidTaperRatio(f64),
    #[error("area must be positive, got {0}")]
    NonPositiveArea(f64),
}

/// The one shared formula set used for the wing and both tail surfaces.
pub fn surface_from_planform(p: &Planform) -> Result<SurfaceGeometry, GeometryError> {
    if p.area <= 0.0 {
        return Err(GeometryError::NonPositiveArea(p.area));
    }
    if p.aspect_ratio <= 0.0 {
        return Err(GeometryError::NonPositiveAspectRatio(p.aspect_ratio));
    }
    if p.taper_ratio <= 0.0 || p.taper_ratio > 1.0 {
        return Err(GeometryError::InvalidTaperRatio(p.taper_ratio));
    }

    let span = (p.aspect_ratio * p.area).sqrt();
    let root_chord = 2.0 * p.area / (span * (1.0 + p.taper_ratio));
    let tip_chord = p.taper_ratio * root_chord;
    let semi_span = span / 2.0;
    let lambda = p.taper_ratio;
    let mean_aero_chord =
        (2.0 / 3.0) * root_chord * (1.0 + lambda + lambda * lambda) / (1.0 + lambda);

    Ok(SurfaceGeometry {
        span,
        root_chord,
        tip_chord,
        semi_span,
        mean_aero_chord,
        sweep_deg: p.sweep_deg,
        dihedral_deg: p.dihedral_deg.unwrap_or(0.0),
        twist_deg: p.twist_deg.unwrap_or(0.0),
    })
}

/// Area inferred from the wing when a tail surface is not specified.
/// Documented defaults from the DATCOM pipeline's tail-conversion stage.
pub fn infer_htail_area(wing_area: f64) -> f64 {
    wing_area * 0.20
}

pub fn infer_vtail_area(wing_area: f64) -> f64 {
    wing_area * 0.15
}

/// Documented defaults used when a tail's aspect ratio / taper aren't given.
pub const DEFAULT_HTAIL_ASPECT_RATIO: f64 = 4.0;
pub const DEFAULT_HTAIL_TAPER_RATIO: f64 = 0.4;
pub const DEFAULT_VTAIL_ASPECT_RATIO: f64 = 1.5;
pub const DEFAULT_VTAIL_TAPER_RATIO: f64 = 0.6;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wing_only_math_matches_scenario_s4() {
        let p = Planform {
            area: 100.0,
            aspect_ratio: 8.0,
            taper_ratio: 0.5,
            sweep_deg: 25.0,
            airfoil: None,
            dihedral_deg: None,
            twist_deg: None,
        };
        let g = surface_from_planform(&p).unwrap();
        assert!((g.span - 28.284271).abs() < 1e-4);
        assert!((g.root_chord - 4.714045).abs() < 1e-4);
        assert!((g.tip_chord - 2.357023).abs() < 1e-4);
        assert!((g.semi_span - 14.142136).abs() < 1e-4);
    }

    #[test]
    fn round_trip_holds_for_any_valid_planform() {
        for (area, ar, lambda) in [(530.0, 2.8, 0.3), (250.0, 6.0, 0.8), (50.0, 12.0, 0.15)] {
            let p = Planform {
                area,
                aspect_ratio: ar,
                taper_ratio: lambda,
                sweep_deg: 0.0,
                airfoil: None,
                dihedral_deg: None,
                twist_deg: None,
            };
            let g = surface_from_planform(&p).unwrap();
            let reconstructed = g.root_chord * (1.0 + lambda) * g.semi_span;
            assert!((reconstructed - area).abs() / area < 1e-6);
            assert!((g.tip_chord / g.root_chord - lambda).abs() < 1e-9);
        }
    }

    #[test]
    fn rejects_non_positive_aspect_ratio() {
        let p = Planform {
            area: 100.0,
            aspect_ratio: 0.0,
            taper_ratio: 0.5,
            sweep_deg: 0.0,
            airfoil: None,
            dihedral_deg: None,
            twist_deg: None,
        };
        assert!(matches!(
            surface_from_planform(&p),
            Err(GeometryError::NonPositiveAspectRatio(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_taper_ratio() {
        let p = Planform {
            area: 100.0,
            aspect_ratio: 8.0,
            taper_ratio: 1.5,
            sweep_deg: 0.0,
            airfoil: None,
            dihedral_deg: None,
            twist_deg: None,
        };
        assert!(matches!(
            surface_from_planform(&p),
            Err(GeometryError::InvalidTaperRatio(_))
        ));
    }
}
