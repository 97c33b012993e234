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
use crate::geometry::Vector3D;
use crate::{Date, Float, PI};

/// W/m2
const SOLAR_CONSTANT: Float = 1367.7;

/// Air mass for a given solar zenith (in radians).
///
/// Uses the same expression as Radiance, which differs from the
/// plain `1/cos(zenith)` close to the horizon.
pub fn air_mass(solar_zenith: Float) -> Float {
    1. / (solar_zenith.cos() + 0.15 * (93.885 - solar_zenith.to_degrees()).powf(-1.253))
}

/// A day of the year (with decimals), tagged with the
/// kind of time it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Time {
    /// Solar time
    Solar(Float),

    /// Standard (i.e., clock) time
    Standard(Float),
}

/// Calculates the position of the sun and related quantities,
/// mostly following Duffie and Beckman's "Solar Engineering of
/// Thermal Processes".
#[derive(Debug, Clone, Copy)]
pub struct Solar {
    /// Latitude in radians. North is positive.
    latitude: Float,

    /// Longitude in radians. West is positive (i.e., Radiance's
    /// convention, the opposite of EPW files)
    longitude: Float,

    /// Standard meridian in radians. West is positive.
    standard_meridian: Float,
}

impl Solar {
    /// Creates a new calculator. Longitude and standard meridian
    /// are positive towards the West.
    pub fn new(latitude: Float, longitude: Float, standard_meridian: Float) -> Self {
        Self {
            latitude,
            longitude,
            standard_meridian,
        }
    }

    /// Duffie and Beckman's `B`, in radians
    fn b(n: Float) -> Float {
        (n - 1.) * 2. * PI / 365.
    }

    /// Equation of time, in minutes
    pub fn equation_of_time(&self, n: Float) -> Float {
        let b = Self::b(n);
        229.2
            * (0.000075 + 0.001868 * b.cos()
                - 0.032077 * b.sin()
                - 0.014615 * (2. * b).cos()
                - 0.04089 * (2. * b).sin())
    }

    /// Minutes to add to the standard time for getting the solar time
    pub fn solar_standard_time_difference(&self, n: Float) -> Float {
        4. * (self.standard_meridian - self.longitude).to_degrees() + self.equation_of_time(n)
    }

    /// The day of the year, in solar time
    pub fn unwrap_solar_time(&self, n: Time) -> Float {
        match n {
            Time::Solar(t) => t,
            Time::Standard(t) => t + self.solar_standard_time_difference(t) / 60. / 24.,
        }
    }

    /// The day of the year, in standard time
    pub fn unwrap_standard_time(&self, n: Time) -> Float {
        match n {
            Time::Solar(t) => t - self.solar_standard_time_difference(t) / 60. / 24.,
            Time::Standard(t) => t,
        }
    }

    /// Declination (in radians)
    pub fn declination(&self, n: Float) -> Float {
        let b = Self::b(n);
        0.006918 - 0.399912 * b.cos() + 0.070257 * b.sin() - 0.006758 * (2. * b).cos()
            + 0.000907 * (2. * b).sin()
            - 0.002697 * (3. * b).cos()
            + 0.001480 * (3. * b).sin()
    }

    /// Extraterrestrial irradiance on a plane normal to the sun, in W/m2
    pub fn normal_extraterrestrial_radiation(&self, n: Float) -> Float {
        let b = Self::b(n);
        SOLAR_CONSTANT
            * (1.000110
                + 0.034221 * b.cos()
                + 0.001280 * b.sin()
                + 0.000719 * (2. * b).cos()
                + 0.000077 * (2. * b).sin())
    }

    /// Hour angle, in radians. Negative in the morning.
    pub fn hour_angle(&self, n: Time) -> Float {
        let n = self.unwrap_solar_time(n);
        let solar_hour = 24. * n.rem_euclid(1.);
        ((solar_hour - 12.) * 15.).to_radians()
    }

    /// Sunrise and sunset of day `n`, in solar time. Under the
    /// midnight sun they span the whole day, and in polar nights
    /// both are midday.
    pub fn sunrise_sunset(&self, n: Float) -> (Time, Time) {
        let delta = self.declination(n);
        let cos_w = (-self.latitude.tan() * delta.tan()).clamp(-1., 1.);
        let half_day = cos_w.acos().to_degrees() / 15. / 24.;
        let midday = n.floor() + 0.5;
        (Time::Solar(midday - half_day), Time::Solar(midday + half_day))
    }

    /// Position of the sun, for a date in standard time
    pub fn sun_position_from_standard_time(&self, date: Date) -> Option<Vector3D> {
        self.sun_position(Time::Standard(date.day_of_year()))
    }

    /// Position of the sun, for a date in solar time
    pub fn sun_position_from_solar_time(&self, date: Date) -> Option<Vector3D> {
        self.sun_position(Time::Solar(date.day_of_year()))
    }

    /// A unit vector pointing towards the sun, or `None` if the
    /// sun is below the horizon. Z is up, Y is North and X is East.
    pub fn sun_position(&self, n: Time) -> Option<Vector3D> {
        let n = self.unwrap_solar_time(n);

        let (sin_phi, cos_phi) = self.latitude.sin_cos();
        let (sin_delta, cos_delta) = self.declination(n).sin_cos();
        let omega = self.hour_angle(Time::Solar(n));

        let cos_zenith = cos_phi * cos_delta * omega.cos() + sin_phi * sin_delta;
        if cos_zenith <= 0. {
            return None;
        }
        // practically vertical
        if cos_zenith > 0.9999 {
            return Some(Vector3D::new(0., 0., 1.));
        }
        let sin_zenith = (1. - cos_zenith * cos_zenith).sqrt();

        // Azimuth measured from the South, as in Duffie and Beckman
        let cos_azimuth =
            ((cos_zenith * sin_phi - sin_delta) / (sin_zenith * cos_phi)).clamp(-1., 1.);
        let sin_azimuth = (1. - cos_azimuth * cos_azimuth).sqrt();

        let mut x = sin_azimuth * sin_zenith;
        let y = -cos_azimuth * sin_zenith;
        // afternoon sun is in the West
        if omega > 0. {
            x = -x;
        }
        Some(Vector3D::new(x, y, cos_zenith).normalize())
    }
}
