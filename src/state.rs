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
use crate::{Float, SolarError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The pieces of information that live in the simulation state. The
/// `usize` in each variant is the index of the surface (or fenestration)
/// within the [`crate::Scene`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationStateElement {
    /// Solar irradiance on the front side of a surface, in W/m2
    SurfaceFrontSolarIrradiance(usize),
    /// Solar irradiance on the back side of a surface, in W/m2
    SurfaceBackSolarIrradiance(usize),
    /// Incident infrared irradiance on the front side of a surface, in W/m2
    SurfaceFrontIRIrradiance(usize),
    /// Incident infrared irradiance on the back side of a surface, in W/m2
    SurfaceBackIRIrradiance(usize),
    /// Temperature of the front side of a surface, in C
    SurfaceFrontTemperature(usize),
    /// Temperature of the back side of a surface, in C
    SurfaceBackTemperature(usize),

    /// Solar irradiance on the front side of a fenestration, in W/m2
    FenestrationFrontSolarIrradiance(usize),
    /// Solar irradiance on the back side of a fenestration, in W/m2
    FenestrationBackSolarIrradiance(usize),
    /// Incident infrared irradiance on the front side of a fenestration, in W/m2
    FenestrationFrontIRIrradiance(usize),
    /// Incident infrared irradiance on the back side of a fenestration, in W/m2
    FenestrationBackIRIrradiance(usize),
    /// Temperature of the front side of a fenestration, in C
    FenestrationFrontTemperature(usize),
    /// Temperature of the back side of a fenestration, in C
    FenestrationBackTemperature(usize),
}

/// Describes the layout of a [`SimulationState`]. Each simulation
/// module registers the elements it needs while it is being built, and
/// the header is then turned into the actual state.
#[derive(Debug, Default, Clone)]
pub struct SimulationStateHeader {
    elements: Vec<SimulationStateElement>,
    initial_values: Vec<Float>,
    index: HashMap<SimulationStateElement, usize>,
}

impl SimulationStateHeader {
    /// Creates an empty header
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new element with an initial value, returning its index.
    /// Registering the same element twice is an error.
    pub fn push(
        &mut self,
        element: SimulationStateElement,
        value: Float,
    ) -> Result<usize, SolarError> {
        if self.index.contains_key(&element) {
            return Err(SolarError::State(format!(
                "element {:?} has already been registered",
                element
            )));
        }
        let i = self.elements.len();
        self.elements.push(element);
        self.initial_values.push(value);
        self.index.insert(element, i);
        Ok(i)
    }

    /// The index of an element, if registered
    pub fn index_of(&self, element: SimulationStateElement) -> Option<usize> {
        self.index.get(&element).copied()
    }

    /// The number of registered elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Checks whether anything has been registered
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Creates a state with the initial values
    pub fn build_state(&self) -> SimulationState {
        SimulationState {
            values: self.initial_values.clone(),
            index: self.index.clone(),
        }
    }
}

/// The values shared by all simulation modules at a given timestep
#[derive(Debug, Clone)]
pub struct SimulationState {
    values: Vec<Float>,
    index: HashMap<SimulationStateElement, usize>,
}

impl SimulationState {
    /// Gets the value at index `i`
    pub fn get(&self, i: usize) -> Option<Float> {
        self.values.get(i).copied()
    }

    /// Sets the value at index `i`
    pub fn set(&mut self, i: usize, v: Float) -> Result<(), SolarError> {
        let n = self.values.len();
        match self.values.get_mut(i) {
            Some(old) => {
                *old = v;
                Ok(())
            }
            None => Err(SolarError::State(format!(
                "index {} out of bounds in a state with {} elements",
                i, n
            ))),
        }
    }

    /// The index of an element, if it exists
    pub fn index_of(&self, element: SimulationStateElement) -> Option<usize> {
        self.index.get(&element).copied()
    }

    /// The current value of an element, if it exists
    pub fn value_of(&self, element: SimulationStateElement) -> Option<Float> {
        self.index_of(element).and_then(|i| self.get(i))
    }

    /// The number of elements in the state
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks whether the state is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
