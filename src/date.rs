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
use crate::Float;
use serde::{Deserialize, Serialize};

/// Number of days in each month of a non-leap year
const MONTH_LENGTHS: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// A date within a (non-leap) year.
///
/// The year itself is irrelevant for radiation purposes, so it
/// is not stored. When adding hours beyond December 31st, the date
/// wraps back into January.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Date {
    /// Month of the year, starting from 1 (January)
    pub month: u8,

    /// Day of the month, starting from 1
    pub day: u8,

    /// Hour of the day, between 0.0 and 24.0 (excluded)
    pub hour: Float,
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hours = self.hour.floor() as u32;
        let minutes = (self.hour.fract() * 60.).floor() as u32;
        write!(
            f,
            "{:02}/{:02} {:02}:{:02}",
            self.day, self.month, hours, minutes
        )
    }
}

impl Date {
    /// Returns the day of the year, with decimals. January 1st
    /// at midnight is `0.0`; January 1st at midday is `0.5`.
    pub fn day_of_year(&self) -> Float {
        let month_index = (self.month.clamp(1, 12) - 1) as usize;
        let previous_days: u16 = MONTH_LENGTHS[..month_index]
            .iter()
            .map(|d| *d as u16)
            .sum();
        previous_days as Float + (self.day as Float - 1.) + self.hour / 24.
    }

    /// Builds a date from a day of the year (see [`Date::day_of_year`])
    pub fn from_day_of_year(n: Float) -> Self {
        let n = n.rem_euclid(365.);
        let mut day_index = n.floor() as u16;
        let hour = (n - n.floor()) * 24.;

        let mut month = 1;
        for length in MONTH_LENGTHS.iter() {
            let length = *length as u16;
            if day_index < length {
                break;
            }
            day_index -= length;
            month += 1;
        }

        Self {
            month,
            day: day_index as u8 + 1,
            hour,
        }
    }

    /// Advances the date by a number of hours (it can be negative)
    pub fn add_hours(&mut self, hours: Float) {
        *self = Self::from_day_of_year(self.day_of_year() + hours / 24.);
    }
}
