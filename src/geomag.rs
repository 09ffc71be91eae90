//! Geomagnetic field model provider.
//!
//! Spherical-harmonic synthesis of the Earth's main magnetic field from
//! WMM/IGRF-style coefficient files, following the algorithm of the WMM
//! technical reports: Schmidt semi-normalized associated Legendre functions,
//! evaluation in geocentric spherical coordinates, and rotation of the result
//! back onto the local geodetic axes.
//!
//! ## Coefficient files
//!
//! Models are read from `*.cof` text files in a data directory (one or more
//! models per file). The layout per model is one header line
//!
//! ```text
//! WMM2010  2010.00  12  2010.00  2015.00  -1.0  600.0
//! ```
//!
//! (name, model epoch, maximum degree, validity start/end as decimal years,
//! altitude validity bounds in km) followed by one line per coefficient:
//!
//! ```text
//! n  m  g[nT]  h[nT]  dg[nT/yr]  dh[nT/yr]
//! ```
//!
//! `dg`/`dh` are the secular-variation rates used to shift the model from its
//! reference epoch to a requested decimal year within the validity interval.
//!
//! ## Validity
//!
//! Field models of this family are valid for altitudes up to ~600 km; the
//! altitude bounds of the coefficient file are enforced on every evaluation.

use std::fs;

use camino::Utf8Path;
use log::debug;
use nalgebra::Vector3;

use crate::constants::{
    DecimalYear, Degree, Kilometer, Nanotesla, EARTH_FLATTENING, EARTH_MAJOR_AXIS,
    GEOMAG_REFERENCE_RADIUS,
};
use crate::errors::GeomagError;

/// Derived geomagnetic quantities at one evaluation point.
///
/// The field vector `b` is expressed on the local geodetic axes:
/// X north, Y east, Z down, in nanotesla.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoMagneticElements {
    /// Field vector (X north, Y east, Z down) in nT
    pub b: Vector3<Nanotesla>,
    /// Horizontal intensity `H = √(X² + Y²)` in nT
    pub horizontal_intensity: Nanotesla,
    /// Total intensity `F = √(X² + Y² + Z²)` in nT
    pub total_intensity: Nanotesla,
    /// Inclination (dip angle) in degrees, positive down
    pub inclination: Degree,
    /// Declination (magnetic variation) in degrees, positive east
    pub declination: Degree,
}

impl GeoMagneticElements {
    /// Derive the classical field elements from a raw field vector.
    pub fn from_field_vector(b: Vector3<Nanotesla>) -> Self {
        let horizontal = b.x.hypot(b.y);
        Self {
            b,
            horizontal_intensity: horizontal,
            total_intensity: horizontal.hypot(b.z),
            inclination: b.z.atan2(horizontal).to_degrees(),
            declination: b.y.atan2(b.x).to_degrees(),
        }
    }
}

/// One geomagnetic main-field model at a fixed epoch.
///
/// Coefficients are Schmidt semi-normalized, stored flat with index
/// `n (n + 1) / 2 + m`.
#[derive(Debug, Clone)]
pub struct GeoMagneticField {
    name: String,
    epoch: DecimalYear,
    max_degree: usize,
    g: Vec<f64>,
    h: Vec<f64>,
    dg: Vec<f64>,
    dh: Vec<f64>,
    validity_start: DecimalYear,
    validity_end: DecimalYear,
    altitude_min: Kilometer,
    altitude_max: Kilometer,
}

#[inline]
fn coeff_index(n: usize, m: usize) -> usize {
    n * (n + 1) / 2 + m
}

impl GeoMagneticField {
    /// Model name as declared in the coefficient file (e.g. `WMM2010`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Validity interval of the model, as decimal years.
    pub fn validity(&self) -> (DecimalYear, DecimalYear) {
        (self.validity_start, self.validity_end)
    }

    /// Whether the model covers `year`.
    pub fn supports(&self, year: DecimalYear) -> bool {
        year >= self.validity_start && year < self.validity_end
    }

    /// Shift the model to `year` using its secular-variation rates.
    ///
    /// Errors
    /// ------
    /// * [`GeomagError::FieldModel`] if `year` lies outside the validity
    ///   interval of this model.
    pub fn at_epoch(&self, year: DecimalYear) -> Result<GeoMagneticField, GeomagError> {
        if !self.supports(year) {
            return Err(GeomagError::FieldModel {
                model: self.name.clone(),
                reason: format!(
                    "epoch {year:.2} outside validity [{:.2}, {:.2})",
                    self.validity_start, self.validity_end
                ),
            });
        }

        let dt = year - self.epoch;
        let mut shifted = self.clone();
        shifted.epoch = year;
        for i in 0..shifted.g.len() {
            shifted.g[i] += self.dg[i] * dt;
            shifted.h[i] += self.dh[i] * dt;
        }
        Ok(shifted)
    }

    /// Evaluate the field at a geodetic point.
    ///
    /// The geodetic input is first converted to geocentric spherical
    /// coordinates on the WGS84 ellipsoid, the harmonic series is summed
    /// there, and the resulting vector is rotated back onto the geodetic
    /// north/east/down axes.
    ///
    /// Arguments
    /// ---------
    /// * `longitude`: degrees, positive east.
    /// * `latitude`: geodetic latitude in degrees.
    /// * `altitude`: height above the WGS84 ellipsoid, kilometers.
    ///
    /// Errors
    /// ------
    /// * [`GeomagError::FieldModel`] when the altitude is outside the model
    ///   validity bounds.
    pub fn calculate_field(
        &self,
        longitude: Degree,
        latitude: Degree,
        altitude: Kilometer,
    ) -> Result<GeoMagneticElements, GeomagError> {
        if altitude < self.altitude_min || altitude > self.altitude_max {
            return Err(GeomagError::FieldModel {
                model: self.name.clone(),
                reason: format!(
                    "altitude {altitude:.1} km outside validity [{:.1}, {:.1}] km",
                    self.altitude_min, self.altitude_max
                ),
            });
        }

        let lat_gd = latitude.to_radians();
        let lon = longitude.to_radians();

        // Geodetic -> geocentric spherical on WGS84 (work in kilometers)
        let a = EARTH_MAJOR_AXIS / 1000.0;
        let e2 = EARTH_FLATTENING * (2.0 - EARTH_FLATTENING);
        let (sin_gd, cos_gd) = lat_gd.sin_cos();
        let rc = a / (1.0 - e2 * sin_gd * sin_gd).sqrt();
        let p = (rc + altitude) * cos_gd;
        let z = (rc * (1.0 - e2) + altitude) * sin_gd;
        let r = p.hypot(z);
        let lat_gc = z.atan2(p);

        // Colatitude terms: ct = cos θ, st = sin θ with θ = 90° - geocentric latitude
        let ct = lat_gc.sin();
        let st = lat_gc.cos();

        let (pnm, dpnm) = self.legendre(ct, st);

        // Longitude harmonics
        let mut sin_m = vec![0.0; self.max_degree + 1];
        let mut cos_m = vec![0.0; self.max_degree + 1];
        for m in 0..=self.max_degree {
            let ml = m as f64 * lon;
            sin_m[m] = ml.sin();
            cos_m[m] = ml.cos();
        }

        let ar = GEOMAG_REFERENCE_RADIUS / r;
        let mut bx = 0.0; // geocentric north
        let mut by = 0.0; // east (to be divided by sin θ)
        let mut bz = 0.0; // down

        let mut arn = ar * ar; // becomes (a/r)^(n+2) inside the loop
        for n in 1..=self.max_degree {
            arn *= ar;
            for m in 0..=n {
                let i = coeff_index(n, m);
                let angular = self.g[i] * cos_m[m] + self.h[i] * sin_m[m];
                bx += arn * angular * dpnm[i];
                by += arn * (m as f64) * (self.g[i] * sin_m[m] - self.h[i] * cos_m[m]) * pnm[i];
                bz -= arn * (n + 1) as f64 * angular * pnm[i];
            }
        }
        // The sectoral terms carry a sin θ factor for m >= 1, so the ratio
        // stays finite at the geographic poles; the clamp only guards the
        // last ~1e-10 rad around the axis.
        by /= st.abs().max(1e-10);

        // Rotate from geocentric to geodetic axes (ψ = geocentric - geodetic latitude)
        let psi = lat_gc - lat_gd;
        let (sin_psi, cos_psi) = psi.sin_cos();
        let x_gd = bx * cos_psi - bz * sin_psi;
        let z_gd = bx * sin_psi + bz * cos_psi;

        Ok(GeoMagneticElements::from_field_vector(Vector3::new(
            x_gd, by, z_gd,
        )))
    }

    /// Schmidt semi-normalized associated Legendre functions `P̄(cos θ)` and
    /// their colatitude derivatives `dP̄/dθ`, flat-indexed like the
    /// coefficients.
    fn legendre(&self, ct: f64, st: f64) -> (Vec<f64>, Vec<f64>) {
        let size = coeff_index(self.max_degree, self.max_degree) + 1;
        let mut p = vec![0.0; size];
        let mut dp = vec![0.0; size];
        p[0] = 1.0;

        for n in 1..=self.max_degree {
            for m in 0..=n {
                let i = coeff_index(n, m);
                if m == n {
                    // Diagonal recursion
                    let c = if n == 1 {
                        1.0
                    } else {
                        ((2 * n - 1) as f64 / (2 * n) as f64).sqrt()
                    };
                    let j = coeff_index(n - 1, n - 1);
                    p[i] = c * st * p[j];
                    dp[i] = c * (st * dp[j] + ct * p[j]);
                } else {
                    // Vertical recursion; the 2-back term vanishes for m = n - 1
                    let norm = ((n * n - m * m) as f64).sqrt();
                    let k1 = (2 * n - 1) as f64 / norm;
                    let k2 = (((n - 1) * (n - 1) - m * m) as f64).sqrt() / norm;
                    let j = coeff_index(n - 1, m);
                    let (p2, dp2) = if n >= m + 2 {
                        let j2 = coeff_index(n - 2, m);
                        (p[j2], dp[j2])
                    } else {
                        (0.0, 0.0)
                    };
                    p[i] = k1 * ct * p[j] - k2 * p2;
                    dp[i] = k1 * (ct * dp[j] - st * p[j]) - k2 * dp2;
                }
            }
        }
        (p, dp)
    }
}

/// Loaded geomagnetic models, selected per decimal year.
#[derive(Debug, Default)]
pub struct GeoMagneticModelStore {
    models: Vec<GeoMagneticField>,
}

impl GeoMagneticModelStore {
    /// Load every `*.cof` file of a data directory.
    ///
    /// Errors
    /// ------
    /// * [`GeomagError::Io`] if the directory cannot be read.
    /// * [`GeomagError::InvalidModelFile`] on a malformed coefficient file.
    /// * [`GeomagError::Configuration`] when the directory holds no model.
    pub fn load_dir(dir: &Utf8Path) -> Result<Self, GeomagError> {
        let mut models = Vec::new();
        for entry in dir.read_dir_utf8()? {
            let entry = entry?;
            let path = entry.path();
            if path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("cof"))
            {
                models.extend(Self::parse_file(path)?);
            }
        }
        if models.is_empty() {
            return Err(GeomagError::Configuration(format!(
                "no geomagnetic coefficient file (*.cof) found in {dir}"
            )));
        }
        for model in &models {
            debug!(
                "loaded geomagnetic model {} (epoch {:.2}, degree {})",
                model.name, model.epoch, model.max_degree
            );
        }
        Ok(Self { models })
    }

    /// Parse one coefficient file; several models may be concatenated.
    pub fn parse_file(path: &Utf8Path) -> Result<Vec<GeoMagneticField>, GeomagError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|reason| GeomagError::InvalidModelFile {
            path: path.to_owned(),
            reason,
        })
    }

    fn parse(content: &str) -> Result<Vec<GeoMagneticField>, String> {
        let mut models: Vec<GeoMagneticField> = Vec::new();

        for (lineno, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let leading_degree = tokens[0].parse::<usize>();

            if leading_degree.is_err() {
                // Header line: name epoch nmax start end altmin altmax
                if tokens.len() != 7 {
                    return Err(format!(
                        "line {}: expected 7 header fields, got {}",
                        lineno + 1,
                        tokens.len()
                    ));
                }
                let num = |s: &str| -> Result<f64, String> {
                    s.parse()
                        .map_err(|_| format!("line {}: invalid number \"{s}\"", lineno + 1))
                };
                let max_degree: usize = tokens[2]
                    .parse()
                    .map_err(|_| format!("line {}: invalid degree \"{}\"", lineno + 1, tokens[2]))?;
                let size = coeff_index(max_degree, max_degree) + 1;
                models.push(GeoMagneticField {
                    name: tokens[0].to_string(),
                    epoch: num(tokens[1])?,
                    max_degree,
                    g: vec![0.0; size],
                    h: vec![0.0; size],
                    dg: vec![0.0; size],
                    dh: vec![0.0; size],
                    validity_start: num(tokens[3])?,
                    validity_end: num(tokens[4])?,
                    altitude_min: num(tokens[5])?,
                    altitude_max: num(tokens[6])?,
                });
            } else {
                // Coefficient line: n m g h dg dh
                let model = models
                    .last_mut()
                    .ok_or_else(|| format!("line {}: coefficients before header", lineno + 1))?;
                if tokens.len() != 6 {
                    return Err(format!(
                        "line {}: expected 6 coefficient fields, got {}",
                        lineno + 1,
                        tokens.len()
                    ));
                }
                let n = leading_degree
                    .map_err(|_| format!("line {}: invalid degree \"{}\"", lineno + 1, tokens[0]))?;
                let m: usize = tokens[1]
                    .parse()
                    .map_err(|_| format!("line {}: invalid order \"{}\"", lineno + 1, tokens[1]))?;
                if n == 0 || n > model.max_degree || m > n {
                    return Err(format!("line {}: degree/order ({n},{m}) out of range", lineno + 1));
                }
                let num = |s: &str| -> Result<f64, String> {
                    s.parse()
                        .map_err(|_| format!("line {}: invalid number \"{s}\"", lineno + 1))
                };
                let i = coeff_index(n, m);
                model.g[i] = num(tokens[2])?;
                model.h[i] = num(tokens[3])?;
                model.dg[i] = num(tokens[4])?;
                model.dh[i] = num(tokens[5])?;
            }
        }

        if models.is_empty() {
            return Err("no model header found".to_string());
        }
        Ok(models)
    }

    /// Number of loaded models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the store holds no model.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Select the model covering `year` and shift it there with its
    /// secular-variation rates.
    ///
    /// Errors
    /// ------
    /// * [`GeomagError::NoModelForEpoch`] when no loaded model covers `year`.
    pub fn field_for(&self, year: DecimalYear) -> Result<GeoMagneticField, GeomagError> {
        self.models
            .iter()
            .find(|model| model.supports(year))
            .ok_or(GeomagError::NoModelForEpoch(year))?
            .at_epoch(year)
    }
}
