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
use crate::scene::Scene;
use crate::state::{SimulationState, SimulationStateHeader};
use crate::weather::Weather;
use crate::{Date, Float, ReinhartSky, SolarError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Information about the site that is shared by every
/// simulation module.
///
/// Angles are in radians and follow the EPW convention: East is
/// positive for both the longitude and the standard meridian.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct MetaOptions {
    /// Latitude, in radians. North is positive.
    pub latitude: Float,

    /// Longitude, in radians. East is positive.
    pub longitude: Float,

    /// Standard meridian of the time zone, in radians
    /// (e.g., GMT+1 is `15.0` degrees). East is positive.
    pub standard_meridian: Float,

    /// Elevation above sea level, in m
    pub elevation: Float,
}

/// The options that drive the calculation of a [`crate::SolarModel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarOptions {
    /// Number of points sampled on each surface
    pub n_solar_irradiance_points: usize,

    /// Number of rays cast from each of those points
    pub solar_ambient_divisions: usize,

    /// The MF of the Reinhart sky (`1` means a Tregenza sky)
    pub solar_sky_discretization: usize,

    /// Number of inter-reflections between surfaces
    pub solar_bounces: usize,

    /// Reflectance of the ground
    pub ground_albedo: Float,

    /// Distance (m) by which sample points are pushed away from their surface
    pub sampling_offset: Float,

    /// Seed for every random process in the precomputation
    pub seed: u64,

    /// Where the precomputed optical data is cached, if anywhere
    pub optical_data_path: Option<PathBuf>,
}

impl Default for SolarOptions {
    fn default() -> Self {
        Self {
            n_solar_irradiance_points: 10,
            solar_ambient_divisions: 3000,
            solar_sky_discretization: 1,
            solar_bounces: 0,
            ground_albedo: 0.2,
            sampling_offset: 0.001,
            seed: 0,
            optical_data_path: None,
        }
    }
}

impl SolarOptions {
    /// Creates the default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of sample points per surface
    pub fn set_n_solar_irradiance_points(&mut self, v: usize) -> &mut Self {
        self.n_solar_irradiance_points = v;
        self
    }

    /// Sets the number of rays cast from each sample point
    pub fn set_solar_ambient_divisions(&mut self, v: usize) -> &mut Self {
        self.solar_ambient_divisions = v;
        self
    }

    /// Sets the MF of the sky subdivision
    pub fn set_solar_sky_discretization(&mut self, v: usize) -> &mut Self {
        self.solar_sky_discretization = v;
        self
    }

    /// Sets the number of inter-reflections
    pub fn set_solar_bounces(&mut self, v: usize) -> &mut Self {
        self.solar_bounces = v;
        self
    }

    /// Sets the reflectance of the ground
    pub fn set_ground_albedo(&mut self, v: Float) -> &mut Self {
        self.ground_albedo = v;
        self
    }

    /// Sets the offset of the sample points
    pub fn set_sampling_offset(&mut self, v: Float) -> &mut Self {
        self.sampling_offset = v;
        self
    }

    /// Sets the random seed
    pub fn set_seed(&mut self, v: u64) -> &mut Self {
        self.seed = v;
        self
    }

    /// Sets the location of the optical data cache
    pub fn set_optical_data_path<P: AsRef<Path>>(&mut self, v: P) -> &mut Self {
        self.optical_data_path = Some(v.as_ref().to_path_buf());
        self
    }

    /// Checks that these options can be used for building a model
    pub fn validate(&self) -> Result<(), SolarError> {
        ReinhartSky::new(self.solar_sky_discretization)?;
        if self.n_solar_irradiance_points == 0 {
            return Err(SolarError::InvalidGeometry(
                "surfaces need at least one sample point".into(),
            ));
        }
        if self.solar_ambient_divisions == 0 {
            return Err(SolarError::InvalidOptions(
                "at least one ray needs to be cast from each sample point".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.ground_albedo) {
            return Err(SolarError::InvalidOptions(format!(
                "ground albedo needs to be between 0 and 1... found {}",
                self.ground_albedo
            )));
        }
        if !(self.sampling_offset > 0.0) {
            return Err(SolarError::InvalidOptions(format!(
                "sampling offset needs to be positive... found {}",
                self.sampling_offset
            )));
        }
        Ok(())
    }
}

/// The protocol followed by simulation modules: they are built once, registering
/// what they need in the simulation state, and then they march through time.
pub trait SimulationModel: Sized {
    /// The options required for building the module
    type OptionType;

    /// Builds the module
    fn new(
        meta_options: &MetaOptions,
        options: Self::OptionType,
        scene: &Scene,
        state: &mut SimulationStateHeader,
    ) -> Result<Self, SolarError>;

    /// Advances one timestep, writing the results into the `state`
    fn march(
        &self,
        date: Date,
        weather: &dyn Weather,
        state: &mut SimulationState,
    ) -> Result<(), SolarError>;
}
