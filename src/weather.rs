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
use crate::{Date, Float};
use serde::{Deserialize, Serialize};

/// The weather at a certain point in time. All the fields
/// are optional, because not every source has all of them.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// The date this data corresponds to
    pub date: Option<Date>,

    /// Direct normal irradiance, in W/m2
    pub direct_normal_radiation: Option<Float>,

    /// Diffuse horizontal irradiance, in W/m2
    pub diffuse_horizontal_radiation: Option<Float>,

    /// Dry bulb temperature, in C
    pub dry_bulb_temperature: Option<Float>,

    /// Dew point temperature, in C
    pub dew_point_temperature: Option<Float>,
}

/// Anything that can tell us what the weather looks like
/// at a certain date.
pub trait Weather {
    /// Returns the weather for a certain date
    fn get_weather_data(&self, date: Date) -> CurrentWeather;
}

type WeatherFn = Box<dyn Fn(Date) -> Option<Float> + Sync>;

/// A weather made of functions of the date. Useful
/// for testing, or for idealized climates.
pub struct SyntheticWeather {
    /// Direct normal irradiance, in W/m2
    pub direct_normal_radiation: WeatherFn,

    /// Diffuse horizontal irradiance, in W/m2
    pub diffuse_horizontal_radiation: WeatherFn,

    /// Dry bulb temperature, in C
    pub dry_bulb_temperature: WeatherFn,

    /// Dew point temperature, in C
    pub dew_point_temperature: WeatherFn,
}

impl Default for SyntheticWeather {
    fn default() -> Self {
        Self {
            direct_normal_radiation: Box::new(|_| None),
            diffuse_horizontal_radiation: Box::new(|_| None),
            dry_bulb_temperature: Box::new(|_| None),
            dew_point_temperature: Box::new(|_| None),
        }
    }
}

impl Weather for SyntheticWeather {
    fn get_weather_data(&self, date: Date) -> CurrentWeather {
        CurrentWeather {
            date: Some(date),
            direct_normal_radiation: (self.direct_normal_radiation)(date),
            diffuse_horizontal_radiation: (self.diffuse_horizontal_radiation)(date),
            dry_bulb_temperature: (self.dry_bulb_temperature)(date),
            dew_point_temperature: (self.dew_point_temperature)(date),
        }
    }
}
