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
use crate::Date;
use thiserror::Error;

/// Everything that can go wrong when building or marching a [`crate::SolarModel`].
///
/// All errors produced while building the model are fatal: no partially
/// built model is ever returned. A [`SolarError::MarchFailure`] only affects the
/// timestep that produced it.
#[derive(Debug, Error)]
pub enum SolarError {
    /// A polygon that cannot be sampled (e.g., zero area) or a surface
    /// that would end up without sample points.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The requested sky subdivision is not supported.
    #[error("Invalid sky discretization: {0}")]
    InvalidDiscretization(String),

    /// The view factors of a surface do not add up to one.
    #[error("Sampling inconsistency: {0}")]
    SamplingInconsistency(String),

    /// The data required for advancing one timestep was not available.
    #[error("Could not march at {date}: {reason}")]
    MarchFailure {
        /// The date that was being simulated
        date: Date,
        /// What was missing
        reason: String,
    },

    /// The options make no sense (e.g., zero rays)
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Problems reading or writing the simulation state
    #[error("Simulation state error: {0}")]
    State(String),

    /// Reading or writing cached optical data failed
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Cached optical data could not be (de)serialized
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}
