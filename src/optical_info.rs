/*
MIT License
Copyright (c) 2021 Germán Molina
Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:
The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.
THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/
use crate::scene::Boundary;
use crate::simulation::SolarOptions;
use crate::solar_surface::SolarSurface;
use crate::{Float, ReinhartSky, Scene, SolarError};
use log::{info, warn};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The fraction of the view that goes to the front and back sides of
/// some other surface (or fenestration)
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetView {
    /// Fraction of the view that hits the front side
    pub front: Float,
    /// Fraction of the view that hits the back side
    pub back: Float,
}

/// A set of view factors as seen by one side of a surface.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct IRViewFactorSet {
    /// The fraction of the view that corresponds to the sky
    pub sky: Float,

    /// The fraction of the view that corresponds to the ground
    pub ground: Float,

    /// The fraction of the view that corresponds to obstructions, which
    /// are assumed to be at air temperature
    pub air: Float,

    /// The view towards each surface of the scene
    pub surfaces: Vec<TargetView>,

    /// The view towards each fenestration of the scene
    pub fenestrations: Vec<TargetView>,
}

impl IRViewFactorSet {
    /// The sum of all the view factors. Should be `1.0`.
    pub fn total(&self) -> Float {
        let targets = |v: &[TargetView]| v.iter().map(|t| t.front + t.back).sum::<Float>();
        self.sky + self.ground + self.air + targets(&self.surfaces) + targets(&self.fenestrations)
    }

    /// Checks that no fraction is negative and that they add up to one
    /// within a tolerance
    pub fn validate(&self, tolerance: Float) -> Result<(), SolarError> {
        let any_negative = [self.sky, self.ground, self.air]
            .iter()
            .chain(self.surfaces.iter().flat_map(|t| [&t.front, &t.back]))
            .chain(self.fenestrations.iter().flat_map(|t| [&t.front, &t.back]))
            .any(|v| *v < 0.0 || v.is_nan());
        if any_negative {
            return Err(SolarError::SamplingInconsistency(format!(
                "found negative view factors in {:?}",
                self
            )));
        }
        let total = self.total();
        if (total - 1.0).abs() > tolerance {
            return Err(SolarError::SamplingInconsistency(format!(
                "view factors add up to {} (tolerance is {})",
                total, tolerance
            )));
        }
        Ok(())
    }
}

/// The matrices needed for calculating the solar irradiance on
/// one side of a surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolarCoefficients {
    /// Daylight Coefficients (points x sky bins)
    pub dc: DMatrix<Float>,

    /// Whether each sky bin can be seen from each point (points x sky bins)
    pub sun_visibility: DMatrix<Float>,
}

/// Everything we know about one side of a surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideOpticalInfo {
    /// Its view factors
    pub view_factors: IRViewFactorSet,

    /// The solar matrices. `None` if this side does not receive sun.
    pub solar: Option<SolarCoefficients>,
}

impl SideOpticalInfo {
    /// Puts the pieces together
    pub fn new(view_factors: IRViewFactorSet, solar: Option<SolarCoefficients>) -> Self {
        Self {
            view_factors,
            solar,
        }
    }
}

/// The optical information of both sides of a surface (or fenestration)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpticalInfo {
    /// The front side
    pub front: SideOpticalInfo,
    /// The back side
    pub back: SideOpticalInfo,
}

impl OpticalInfo {
    /// Assembles the optical information of a surface
    pub fn new(front: SideOpticalInfo, back: SideOpticalInfo) -> Self {
        Self { front, back }
    }
}

/// The whole precomputation, plus the parameters it was calculated with.
/// It can be cached on disk, as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpticalData {
    /// The MF of the sky
    pub sky_discretization: usize,

    /// Sample points per surface
    pub n_solar_irradiance_points: usize,

    /// Rays per sample point
    pub solar_ambient_divisions: usize,

    /// Seed used for sampling
    pub seed: u64,

    /// Distance between the sample points and their surface
    pub sampling_offset: Float,

    /// The [`Scene::fingerprint`] of the geometry that was ray-traced
    pub scene_fingerprint: u64,

    /// One element per surface in the scene
    pub surfaces: Vec<OpticalInfo>,

    /// One element per fenestration in the scene
    pub fenestrations: Vec<OpticalInfo>,
}

impl OpticalData {
    /// Writes into a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SolarError> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)?;
        info!("Optical data written to '{}'", path.display());
        Ok(())
    }

    /// Reads from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SolarError> {
        let file = std::fs::File::open(path)?;
        let ret = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(ret)
    }

    /// Checks whether this data can be used with a certain
    /// scene and options.
    pub fn is_compatible(&self, scene: &Scene, options: &SolarOptions) -> bool {
        let checks = [
            (
                "sky discretization",
                self.sky_discretization == options.solar_sky_discretization,
            ),
            (
                "number of points",
                self.n_solar_irradiance_points == options.n_solar_irradiance_points,
            ),
            (
                "ambient divisions",
                self.solar_ambient_divisions == options.solar_ambient_divisions,
            ),
            ("seed", self.seed == options.seed),
            (
                "sampling offset",
                self.sampling_offset == options.sampling_offset,
            ),
            ("geometry", self.scene_fingerprint == scene.fingerprint()),
            ("surfaces", self.surfaces.len() == scene.surfaces.len()),
            (
                "fenestrations",
                self.fenestrations.len() == scene.fenestrations.len(),
            ),
        ];
        let mut ret = true;
        for (what, ok) in checks {
            if !ok {
                warn!("Cached optical data does not match the current {}", what);
                ret = false;
            }
        }
        if !ret {
            return false;
        }

        let n_bins = match ReinhartSky::new(options.solar_sky_discretization) {
            Ok(sky) => sky.n_bins,
            Err(_) => return false,
        };
        let elements = scene.surfaces.iter().zip(self.surfaces.iter());
        let elements =
            elements.chain(scene.fenestrations.iter().zip(self.fenestrations.iter()));
        for (element, info) in elements {
            let sides = [
                (&element.front_boundary, &info.front),
                (&element.back_boundary, &info.back),
            ];
            for (boundary, side) in sides {
                let n_points = options.n_solar_irradiance_points;
                if !Self::side_matches(side, boundary, scene, n_points, n_bins) {
                    warn!(
                        "Cached optical data of '{}' does not match its current boundaries or size",
                        element.name
                    );
                    return false;
                }
            }
        }
        true
    }

    fn side_matches(
        side: &SideOpticalInfo,
        boundary: &Boundary,
        scene: &Scene,
        n_points: usize,
        n_bins: usize,
    ) -> bool {
        let vf = &side.view_factors;
        if vf.surfaces.len() != scene.surfaces.len()
            || vf.fenestrations.len() != scene.fenestrations.len()
        {
            return false;
        }
        match (&side.solar, SolarSurface::boundary_receives_sun(boundary)) {
            (None, false) => true,
            (Some(c), true) => {
                let shape = (n_points, n_bins);
                c.dc.shape() == shape && c.sun_visibility.shape() == shape
            }
            _ => false,
        }
    }

    /// Checks that every set of view factors adds up to one
    pub fn validate(&self, tolerance: Float) -> Result<(), SolarError> {
        for info in self.surfaces.iter().chain(self.fenestrations.iter()) {
            info.front.view_factors.validate(tolerance)?;
            info.back.view_factors.validate(tolerance)?;
        }
        Ok(())
    }
}
