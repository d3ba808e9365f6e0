//! Axisymmetric fuselage body geometry (BODY namelist).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BodyInput {
    pub length: f64,
    pub max_diameter: f64,
    pub nose_length: f64,
    pub tail_length: f64,
    /// Number of longitudinal stations to emit in the BODY table (>= 2).
    pub n_stations: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BodyGeometry {
    /// Station locations, ft, from nose.
    pub x: Vec<f64>,
    /// Cross-sectional radius at each station, ft.
    pub r: Vec<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("length must be positive, got {0}")]
    NonPositiveLength(f64),
    #[error("n_stations must be at least 2, got {0}")]
    TooFewStations(usize),
    #[error("nose_length + tail_length ({0}) exceeds total length ({1})")]
    SectionsExceedLength(f64, f64),
}

/// A simple tangent-ogive nose / cylindrical midbody / conical tail model,
/// sampled at evenly spaced stations.
pub fn define_body_geometry(input: &BodyInput) -> Result<BodyGeometry, BodyError> {
    if input.length <= 0.0 {
        return Err(BodyError::NonPositiveLength(input.length));
    }
    if input.n_stations < 2 {
        return Err(BodyError::TooFewStations(input.n_stations));
    }
    if input.nose_length + input.tail_length > input.length {
        return Err(BodyError::SectionsExceedLength(
            input.nose_length + input.tail_length,
            input.length,
        ));
    }

    let max_r = input.max_diameter / 2.0;
    let mid_start = input.nose_length;
    let mid_end = input.length - input.tail_length;

    let mut x = Vec::with_capacity(input.n_stations);
    let mut r = Vec::with_capacity(input.n_stations);

    for i in 0..input.n_stations {
        let station = input.length * (i as f64) / ((input.n_stations - 1) as f64);
        let radius = if station < mid_start && input.nose_length > 0.0 {
            max_r * (station / input.nose_length).sqrt()
        } else if station > mid_end && input.tail_length > 0.0 {
            let frac = (input.length - station) / input.tail_length;
            max_r * frac
        } else {
            max_r
        };
        x.push(station);
        r.push(radius.max(0.0));
    }

    Ok(BodyGeometry { x, r })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_requested_station_count() {
        let input = BodyInput {
            length: 63.0,
            max_diameter: 3.0,
            nose_length: 10.0,
            tail_length: 15.0,
            n_stations: 10,
        };
        let g = define_body_geometry(&input).unwrap();
        assert_eq!(g.x.len(), 10);
        assert_eq!(g.r.len(), 10);
        assert_eq!(g.x[0], 0.0);
        assert!((g.x[9] - 63.0).abs() < 1e-9);
        assert_eq!(g.r[0], 0.0);
    }

    #[test]
    fn rejects_sections_longer_than_body() {
        let input = BodyInput {
            length: 10.0,
            max_diameter: 2.0,
            nose_length: 6.0,
            tail_length: 6.0,
            n_stations: 5,
        };
        assert!(matches!(
            define_body_geometry(&input),
            Err(BodyError::SectionsExceedLength(_, _))
        ));
    }
}
