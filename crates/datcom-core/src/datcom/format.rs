//! Stage 9 (Format): assemble the `.dat` namelist text (spec sections 4.6, 6).
//!
//! ASCII, LF line endings. Each block: ` $NAME` ... `$`. Real literals
//! always carry a decimal point; arrays are comma-separated `KEY(i)=...`.
//! Block order is fixed: FLTCON, SYNTHS, BODY, WGPLNF, HTPLNF, VTPLNF,
//! omitting absent sections.

use datcom_tools::{body::BodyGeometry, fltcon::FltconMatrix, geometry::SurfaceGeometry, synthesis::SynthesisStations};

/// Format an f64 as a FORTRAN-style real literal: always includes a `.`.
fn real(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        let s = format!("{}", value);
        if s.contains('.') {
            s
        } else {
            format!("{}.0", s)
        }
    }
}

fn scalar_field(key: &str, value: f64) -> String {
    format!("  {}={},", key, real(value))
}

fn array_field(key: &str, values: &[f64]) -> String {
    let joined = values
        .iter()
        .map(|v| real(*v))
        .collect::<Vec<_>>()
        .join(",");
    format!("  {}={},", key, joined)
}

fn int_field(key: &str, value: usize) -> String {
    format!("  {}={},", key, value)
}

pub fn render_header(aircraft_id: &str, provenance: &[String]) -> String {
    let mut lines = vec![format!("* Aircraft: {}", aircraft_id)];
    for p in provenance {
        lines.push(format!("* {}", p));
    }
    lines.join("\n")
}

pub fn render_fltcon(matrix: &FltconMatrix) -> String {
    let mut lines = vec![" $FLTCON".to_string()];
    lines.push(int_field("NMACH", matrix.nmach));
    lines.push(array_field("MACH", &matrix.machs));
    lines.push(int_field("NALT", matrix.nalt));
    lines.push(array_field("ALT", &matrix.altitudes));
    lines.push(int_field("NALPHA", matrix.nalpha));
    lines.push(array_field("ALSCHD", &matrix.alphas));
    lines.push(scalar_field("WT", matrix.weight));
    lines.push("$".to_string());
    lines.join("\n")
}

pub fn render_synths(stations: &SynthesisStations) -> String {
    let mut lines = vec![" $SYNTHS".to_string()];
    lines.push(scalar_field("XW", stations.xw));
    lines.push(scalar_field("XH", stations.xh));
    lines.push(scalar_field("XV", stations.xv));
    lines.push(scalar_field("XCG", stations.xcg));
    lines.push("$".to_string());
    lines.join("\n")
}

pub fn render_body(geometry: &BodyGeometry) -> String {
    let mut lines = vec![" $BODY".to_string()];
    lines.push(int_field("NX", geometry.x.len()));
    lines.push(array_field("X", &geometry.x));
    lines.push(array_field("R", &geometry.r));
    lines.push("$".to_string());
    lines.join("\n")
}

fn render_surface(name: &str, geometry: &SurfaceGeometry) -> String {
    let mut lines = vec![format!(" ${}", name)];
    lines.push(scalar_field("CHRDR", geometry.root_chord));
    lines.push(scalar_field("CHRDTP", geometry.tip_chord));
    lines.push(scalar_field("SSPN", geometry.semi_span));
    lines.push(scalar_field("SAVSI", geometry.sweep_deg));
    lines.push(scalar_field("CHSTAT", 0.25));
    lines.push(scalar_field("DHDADI", geometry.dihedral_deg));
    lines.push(scalar_field("TWISTA", geometry.twist_deg));
    lines.push("$".to_string());
    lines.join("\n")
}

pub fn render_wgplnf(geometry: &SurfaceGeometry) -> String {
    render_surface("WGPLNF", geometry)
}

pub fn render_htplnf(geometry: &SurfaceGeometry) -> String {
    render_surface("HTPLNF", geometry)
}

pub fn render_vtplnf(geometry: &SurfaceGeometry) -> String {
    render_surface("VTPLNF", geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use datcom_tools::geometry::{surface_from_planform, Planform};

    #[test]
    fn real_literal_always_has_a_decimal_point() {
        assert_eq!(real(5.0), "5.0");
        assert_eq!(real(5.25), "5.25");
    }

    #[test]
    fn surface_block_is_well_formed() {
        let p = Planform {
            area: 530.0,
            aspect_ratio: 2.8,
            taper_ratio: 0.3,
            sweep_deg: 45.0,
            airfoil: None,
            dihedral_deg: None,
            twist_deg: None,
        };
        let g = surface_from_planform(&p).unwrap();
        let block = render_wgplnf(&g);
        assert!(block.starts_with(" $WGPLNF"));
        assert!(block.ends_with('$'));
        assert!(block.contains("CHRDR="));
        for line in block.lines() {
            if let Some(eq) = line.find('=') {
                let value_part = &line[eq + 1..];
                if value_part.chars().next().map(|c| c.is_ascii_digit() || c == '-').unwrap_or(false) {
                    assert!(value_part.contains('.'), "line missing decimal point: {}", line);
                }
            }
        }
    }
}
