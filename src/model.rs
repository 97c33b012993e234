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
use crate::daylight_coefficients::{sampling_tolerance, DCFactory, Reflections, SlotLayout};
use crate::geometry::SurfaceSide;
use crate::optical_info::{IRViewFactorSet, OpticalData, OpticalInfo, SideOpticalInfo};
use crate::perez::NIGHT_THRESHOLD;
use crate::solar::Solar;
use crate::solar_surface::SolarSurface;
use crate::state::{SimulationState, SimulationStateHeader};
use crate::weather::{CurrentWeather, Weather};
use crate::{
    Date, Float, MetaOptions, PerezSky, ReinhartSky, Scene, SimulationModel, SolarError,
    SolarOptions, SIGMA,
};
use log::{debug, info, warn};
use nalgebra::DMatrix;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The main model
pub struct SolarModel {
    /// The options for the model.
    options: SolarOptions,

    /// The calculator for solar position and other solar variables
    solar: Solar,

    /// The discretization of the sky, frozen when building the model
    sky: ReinhartSky,

    surfaces: Vec<SolarSurface>,
    fenestrations: Vec<SolarSurface>,

    /// View factors, DC and sun visibility matrices of every side
    optical_data: OpticalData,

    /// How the light bounces between sides
    reflections: Reflections,

    /// The DC matrix of each slot (see [`SlotLayout`]), with the
    /// inter-reflections already added.
    composed_dc: Vec<Option<DMatrix<Float>>>,
}

/// Iterates the sides of a list of surfaces, in slot order
fn side_iter<'a>(
    surfaces: &'a [SolarSurface],
    infos: &'a [OpticalInfo],
) -> impl Iterator<Item = (&'a SolarSurface, SurfaceSide, &'a SideOpticalInfo)> + 'a {
    surfaces.iter().zip(infos.iter()).flat_map(|(s, info)| {
        [
            (s, SurfaceSide::Front, &info.front),
            (s, SurfaceSide::Back, &info.back),
        ]
    })
}

/// Gets an irradiance from the weather, failing if it is missing or meaningless
fn irradiance(date: Date, value: Option<Float>, what: &str) -> Result<Float, SolarError> {
    match value {
        None => Err(SolarError::MarchFailure {
            date,
            reason: format!("no {} in weather data", what),
        }),
        Some(v) if !v.is_finite() || v < 0.0 => Err(SolarError::MarchFailure {
            date,
            reason: format!("invalid {} ({})", what, v),
        }),
        Some(v) => Ok(v),
    }
}

impl SolarModel {
    /// Ray-traces the scene
    fn calc_optical_data(
        scene: &Scene,
        options: &SolarOptions,
        surfaces: &[SolarSurface],
        fenestrations: &[SolarSurface],
    ) -> Result<OpticalData, SolarError> {
        let factory = DCFactory::new(
            options.solar_sky_discretization,
            options.solar_ambient_divisions,
            options.seed,
        )?;
        info!(
            "Calculating optical information: {} surfaces, {} fenestrations, {} points x {} rays",
            surfaces.len(),
            fenestrations.len(),
            options.n_solar_irradiance_points,
            options.solar_ambient_divisions
        );

        let calc = |list: &[SolarSurface]| -> Result<Vec<OpticalInfo>, SolarError> {
            #[cfg(feature = "parallel")]
            let iter = list.par_iter();
            #[cfg(not(feature = "parallel"))]
            let iter = list.iter();

            iter.map(|s| s.calc_optical_info(scene, &factory)).collect()
        };

        Ok(OpticalData {
            sky_discretization: options.solar_sky_discretization,
            n_solar_irradiance_points: options.n_solar_irradiance_points,
            solar_ambient_divisions: options.solar_ambient_divisions,
            seed: options.seed,
            sampling_offset: options.sampling_offset,
            scene_fingerprint: scene.fingerprint(),
            surfaces: calc(surfaces)?,
            fenestrations: calc(fenestrations)?,
        })
    }

    /// Loads the optical data from the cache, if possible, or calculates it
    /// (and then caches it, if there is a path)
    fn get_optical_data(
        scene: &Scene,
        options: &SolarOptions,
        surfaces: &[SolarSurface],
        fenestrations: &[SolarSurface],
    ) -> Result<OpticalData, SolarError> {
        let path = match &options.optical_data_path {
            None => return Self::calc_optical_data(scene, options, surfaces, fenestrations),
            Some(p) => p,
        };
        if path.exists() {
            match OpticalData::load(path) {
                Ok(data) if data.is_compatible(scene, options) => {
                    info!("Reusing optical data from '{}'", path.display());
                    return Ok(data);
                }
                Ok(_) => warn!(
                    "Optical data in '{}' cannot be reused... it will be overwritten",
                    path.display()
                ),
                Err(e) => warn!(
                    "Could not read optical data in '{}' ({})... it will be overwritten",
                    path.display(),
                    e
                ),
            }
        }
        let data = Self::calc_optical_data(scene, options, surfaces, fenestrations)?;
        data.save(path)?;
        Ok(data)
    }

    /// Every side in the model, in slot order
    fn sides(&self) -> impl Iterator<Item = (&SolarSurface, SurfaceSide, &SideOpticalInfo)> + '_ {
        side_iter(&self.surfaces, &self.optical_data.surfaces).chain(side_iter(
            &self.fenestrations,
            &self.optical_data.fenestrations,
        ))
    }

    /// The MF of the sky used by this model
    pub fn solar_sky_discretization(&self) -> usize {
        self.sky.mf()
    }

    /// All the precomputed information
    pub fn optical_data(&self) -> &OpticalData {
        &self.optical_data
    }

    /// The optical information of the `i`th surface
    pub fn surface_optical_info(&self, i: usize) -> Option<&OpticalInfo> {
        self.optical_data.surfaces.get(i)
    }

    /// The optical information of the `i`th fenestration
    pub fn fenestration_optical_info(&self, i: usize) -> Option<&OpticalInfo> {
        self.optical_data.fenestrations.get(i)
    }

    /// The surfaces, as seen by this model
    pub fn surfaces(&self) -> &[SolarSurface] {
        &self.surfaces
    }

    /// The fenestrations, as seen by this model
    pub fn fenestrations(&self) -> &[SolarSurface] {
        &self.fenestrations
    }

    /// The options this model was built with
    pub fn options(&self) -> &SolarOptions {
        &self.options
    }

    /// Sets the incident IR irradiance of every side whose temperature is in the state.
    ///
    /// For now, everything a side sees is assumed to be at its own temperature,
    /// so the net IR exchange is zero.
    pub fn update_ir_radiation(&self, state: &mut SimulationState) -> Result<(), SolarError> {
        for (surface, side, info) in self.sides() {
            let temperature = match state.value_of(surface.temperature_element(side)) {
                Some(t) => t,
                None => continue,
            };
            let ir = info.view_factors.total() * SIGMA * (temperature + 273.15).powi(4);
            state.set(surface.ir_irradiance_index(side), ir)?;
        }
        Ok(())
    }

    /// Sets the incident solar irradiance of every side
    pub fn update_solar_radiation(
        &self,
        date: Date,
        weather_data: &CurrentWeather,
        state: &mut SimulationState,
    ) -> Result<(), SolarError> {
        let direct_normal_irrad = irradiance(
            date,
            weather_data.direct_normal_radiation,
            "direct normal irradiance",
        )?;
        let diffuse_horizontal_irrad = irradiance(
            date,
            weather_data.diffuse_horizontal_radiation,
            "diffuse horizontal irradiance",
        )?;

        let sun = match self.solar.sun_position_from_standard_time(date) {
            Some(s) if direct_normal_irrad + diffuse_horizontal_irrad >= NIGHT_THRESHOLD => s,
            _ => {
                for (surface, side, _) in self.sides() {
                    state.set(surface.solar_irradiance_index(side), 0.0)?;
                }
                return Ok(());
            }
        };

        let vec = PerezSky::sky_vec(
            &self.sky,
            &self.solar,
            date,
            direct_normal_irrad,
            diffuse_horizontal_irrad,
            self.options.ground_albedo,
        );
        let patches = PerezSky::sun_patches(&self.sky, sun);

        // Direct sun, before bouncing
        let direct_sun: Vec<Float> = self
            .sides()
            .map(|(surface, side, info)| {
                let coefficients = match &info.solar {
                    Some(c) => c,
                    None => return 0.0,
                };
                let cos_theta = surface.side_normal(side).dot(&sun);
                if cos_theta <= 0.0 {
                    return 0.0;
                }
                let visible: Float = patches
                    .iter()
                    .map(|(bin, w)| w * coefficients.sun_visibility.column(*bin).mean())
                    .sum();
                direct_normal_irrad * cos_theta * visible
            })
            .collect();
        let sun_irradiance = self.reflections.bounce(&direct_sun, self.options.solar_bounces);

        for (slot, (surface, side, info)) in self.sides().enumerate() {
            let v = match (&self.composed_dc[slot], &info.solar) {
                (Some(dc), Some(_)) => (dc * &vec).mean() + sun_irradiance[slot],
                _ => 0.0,
            };
            state.set(surface.solar_irradiance_index(side), v)?;
        }
        Ok(())
    }
}

impl SimulationModel for SolarModel {
    type OptionType = SolarOptions;

    fn new(
        meta_options: &MetaOptions,
        options: SolarOptions,
        scene: &Scene,
        state: &mut SimulationStateHeader,
    ) -> Result<Self, SolarError> {
        options.validate()?;
        for element in scene.surfaces.iter().chain(scene.fenestrations.iter()) {
            let rho = [
                element.front_solar_reflectance,
                element.back_solar_reflectance,
            ];
            if !rho.iter().all(|r| (0.0..=1.0).contains(r)) {
                return Err(SolarError::InvalidOptions(format!(
                    "solar reflectances of '{}' must be between 0 and 1 (found {:?})",
                    element.name, rho
                )));
            }
        }
        let sky = ReinhartSky::new(options.solar_sky_discretization)?;
        let solar = Solar::new(
            meta_options.latitude,
            -meta_options.longitude,
            -meta_options.standard_meridian,
        );

        // Nothing is registered unless the whole model can be built
        let mut header = state.clone();
        let surfaces = SolarSurface::make_surfaces(&scene.surfaces, &mut header, &options)?;
        let fenestrations =
            SolarSurface::make_fenestrations(&scene.fenestrations, &mut header, &options)?;

        let accelerated;
        let scene = if scene.has_accelerator() {
            scene
        } else {
            warn!("Scene has no ray accelerator... building one");
            let mut s = scene.clone();
            s.build_accelerator();
            accelerated = s;
            &accelerated
        };

        let optical_data = Self::get_optical_data(scene, &options, &surfaces, &fenestrations)?;
        optical_data.validate(sampling_tolerance(options.solar_ambient_divisions))?;

        /* **************** */
        /* INTERREFLECTIONS */
        /* **************** */
        let layout = SlotLayout {
            n_surfaces: surfaces.len(),
            n_fenestrations: fenestrations.len(),
        };
        let all_sides: Vec<&SideOpticalInfo> = side_iter(&surfaces, &optical_data.surfaces)
            .chain(side_iter(&fenestrations, &optical_data.fenestrations))
            .map(|(_, _, info)| info)
            .collect();
        let view_factors: Vec<&IRViewFactorSet> =
            all_sides.iter().map(|info| &info.view_factors).collect();
        let reflectances: Vec<Float> = scene
            .surfaces
            .iter()
            .chain(scene.fenestrations.iter())
            .flat_map(|e| [e.front_solar_reflectance, e.back_solar_reflectance])
            .collect();
        let reflections = Reflections::new(layout, &view_factors, &reflectances);
        let direct_dc: Vec<Option<DMatrix<Float>>> = all_sides
            .iter()
            .map(|info| info.solar.as_ref().map(|c| c.dc.clone()))
            .collect();
        let composed_dc = reflections.bounce_dc(&direct_dc, options.solar_bounces);
        debug!(
            "{} sides, {} inter-reflections",
            layout.len(),
            options.solar_bounces
        );

        *state = header;
        info!("Solar model ready (MF = {})", sky.mf());
        Ok(Self {
            options,
            solar,
            sky,
            surfaces,
            fenestrations,
            optical_data,
            reflections,
            composed_dc,
        })
    }

    fn march(
        &self,
        date: Date,
        weather: &dyn Weather,
        state: &mut SimulationState,
    ) -> Result<(), SolarError> {
        let weather_data = weather.get_weather_data(date);
        self.update_solar_radiation(date, &weather_data, state)?;
        self.update_ir_radiation(state)
    }
}
