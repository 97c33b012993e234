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
#![deny(missing_docs)]

//! This is [SIMPLE's](https://www.simplesim.tools) solar and long-wave exchange module.
//! It is responsible for:
//!
//! * **Calculating Incident Solar Radiation in each surface**: Contrary to EnergyPlus
//! (and probably other tools), this module uses Daylight Coefficients for performing
//! this simulation. All the ray-tracing happens once, when the [`SolarModel`] is built.
//! Then, every timestep only multiplies the frozen Daylight Coefficient matrices by a
//! sky vector built from the current weather, which is cheap.
//! * **Calculating view factors for Infrared calculations**: Each side of each surface
//! knows which fraction of its view goes to the sky, the ground, obstructions ("air")
//! and every other surface and fenestration. For now, the long-wave exchange assumes
//! everything is at the temperature of the emitting side (i.e., zero net exchange).
//! * **Sun position and sky models**: A Reinhart/Tregenza sky discretization, solar
//! position and a Perez sky, which are needed to build the sky vectors.

/// The kind of Floating point number used in the
/// library... the `"float"` feature means it becomes `f32`
/// and `f64` is used otherwise.
#[cfg(feature = "float")]
pub type Float = f32;
/// Well, Pi.
#[cfg(feature = "float")]
pub const PI: Float = std::f32::consts::PI;

/// The kind of Floating point number used in the
/// library... the `"float"` feature means it becomes `f32`
/// and `f64` is used otherwise.
#[cfg(not(feature = "float"))]
pub type Float = f64;

/// Well, Pi.
#[cfg(not(feature = "float"))]
pub const PI: Float = std::f64::consts::PI;

/// Stefan-Boltzmann constant, in W/m2.K4
pub const SIGMA: Float = 5.670374419e-8;

mod error;
pub use error::SolarError;

/// Points, vectors, rays, polygons and triangles.
pub mod geometry;

/// Random number generation and the samplers used for
/// distributing points and directions.
pub mod sampling;

mod date;
pub use date::Date;

/// Weather data consumed at every timestep.
pub mod weather;

/// The values that are shared between the different
/// simulation modules.
pub mod state;

/// Options and the protocol shared by simulation modules.
pub mod simulation;
pub use simulation::{MetaOptions, SimulationModel, SolarOptions};

/// The geometry that is ray-traced when building the model.
pub mod scene;
pub use scene::{Boundary, Scene, SceneElement};

mod reinhart_sky;
pub use reinhart_sky::ReinhartSky;

/// Solar position calculations.
pub mod solar;

mod perez;
pub use perez::PerezSky;

/// Ray-casting, Daylight Coefficients and view factors.
pub mod daylight_coefficients;

/// The surfaces, as seen by the solar calculations.
pub mod solar_surface;

/// The frozen results of the precomputation.
pub mod optical_info;

/// The main export of this module: A Simulation Model for
/// calculating solar and long-wave radiation.
pub mod model;
pub use model::SolarModel;
