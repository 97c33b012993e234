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
use crate::solar::{air_mass, Solar, Time};
use crate::{Date, Float, ReinhartSky, PI};
use nalgebra::DVector;

/// Below this (W/m2) of direct plus diffuse irradiance, it is night.
pub const NIGHT_THRESHOLD: Float = 1e-4;

/// Number of sky patches among which the sun is distributed
pub const N_SUN_PATCHES: usize = 4;

/// Perez's all-weather sky.
///
/// Based on Perez, R., Ineichen, P., Seals, R., Michalsky, J. and Stewart, R. (1990),
/// "Modeling daylight availability and irradiance components from direct and
/// global irradiance" and Perez, R., R. Seals, and J. Michalsky (1993), "All-Weather
/// Model for Sky Luminance Distribution". The limits applied to brightness and
/// clearness follow Radiance's `gendaymtx`.
pub struct PerezSky;

impl PerezSky {
    /// Perez's sky clearness (epsilon). `solar_zenith` in radians.
    pub fn sky_clearness(
        diffuse_horizontal_irrad: Float,
        direct_normal_irrad: Float,
        solar_zenith: Float,
    ) -> Float {
        const K: Float = 1.041;
        let z3 = solar_zenith.powi(3);
        ((diffuse_horizontal_irrad + direct_normal_irrad) / diffuse_horizontal_irrad + K * z3)
            / (1. + K * z3)
    }

    /// Perez's sky brightness (delta). Never lower than `0.01`.
    pub fn sky_brightness(
        diffuse_horizontal_irrad: Float,
        air_mass: Float,
        extraterrestrial_irradiance: Float,
    ) -> Float {
        (diffuse_horizontal_irrad * air_mass / extraterrestrial_irradiance).max(0.01)
    }

    /// The clearness bin, from `0` (overcast) to `7` (clear)
    pub fn clearness_category(clearness: Float) -> usize {
        const LIMITS: [Float; 7] = [1.065, 1.230, 1.5, 1.95, 2.8, 4.5, 6.2];
        LIMITS
            .iter()
            .position(|limit| clearness < *limit)
            .unwrap_or(LIMITS.len())
    }

    /// The five coefficients (a, b, c, d, e) of the sky luminance
    /// distribution. `zenith` in radians.
    pub fn calc_params(zenith: Float, epsilon: Float, delta: Float) -> [Float; 5] {
        // One row per clearness category
        const TABLE: [[Float; 20]; 8] = [
            [
                1.3525, -0.2576, -0.2690, -1.4366, -0.7670, 0.0007, 1.2734, -0.1233, 2.8000,
                0.6004, 1.2375, 1.0000, 1.8734, 0.6297, 0.9738, 0.2809, 0.0356, -0.1246, -0.5718,
                0.9938,
            ],
            [
                -1.2219, -0.7730, 1.4148, 1.1016, -0.2054, 0.0367, -3.9128, 0.9156, 6.9750, 0.1774,
                6.4477, -0.1239, -1.5798, -0.5081, -1.7812, 0.1080, 0.2624, 0.0672, -0.2190,
                -0.4285,
            ],
            [
                -1.1000, -0.2515, 0.8952, 0.0156, 0.2782, -0.1812, -4.5000, 1.1766, 24.7219,
                -13.0812, -37.7000, 34.8438, -5.0000, 1.5218, 3.9229, -2.6204, -0.0156, 0.1597,
                0.4199, -0.5562,
            ],
            [
                -0.5484, -0.6654, -0.2672, 0.7117, 0.7234, -0.6219, -5.6812, 2.6297, 33.3389,
                -18.3000, -62.2500, 52.0781, -3.5000, 0.0016, 1.1477, 0.1062, 0.4659, -0.3296,
                -0.0876, -0.0329,
            ],
            [
                -0.6000, -0.3566, -2.5000, 2.3250, 0.2937, 0.0496, -5.6812, 1.8415, 21.0000,
                -4.7656, -21.5906, 7.2492, -3.5000, -0.1554, 1.4062, 0.3988, 0.0032, 0.0766,
                -0.0656, -0.1294,
            ],
            [
                -1.0156, -0.3670, 1.0078, 1.4051, 0.2875, -0.5328, -3.8500, 3.3750, 14.0000,
                -0.9999, -7.1406, 7.5469, -3.4000, -0.1078, -1.0750, 1.5702, -0.0672, 0.4016,
                0.3017, -0.4844,
            ],
            [
                -1.0000, 0.0211, 0.5025, -0.5119, -0.3000, 0.1922, 0.7023, -1.6317, 19.0000,
                -5.0000, 1.2438, -1.9094, -4.0000, 0.0250, 0.3844, 0.2656, 1.0468, -0.3788,
                -2.4517, 1.4656,
            ],
            [
                -1.0500, 0.0289, 0.4260, 0.3590, -0.3250, 0.1156, 0.7781, 0.0025, 31.0625,
                -14.5000, -46.1148, 55.3750, -7.2312, 0.4050, 13.3500, 0.6234, 1.5000, -0.6426,
                1.8564, 0.5636,
            ],
        ];

        let category = Self::clearness_category(epsilon);
        let delta = if epsilon > 1.065 && epsilon < 2.8 {
            delta.max(0.2)
        } else {
            delta
        };
        let x = |i: usize, j: usize| TABLE[category][4 * i + j];
        let linear = |i: usize| x(i, 0) + x(i, 1) * zenith + delta * (x(i, 2) + x(i, 3) * zenith);

        if category == 0 {
            [
                linear(0),
                linear(1),
                (delta * (x(2, 0) + x(2, 1) * zenith)).powf(x(2, 2)).exp() - x(2, 3),
                -(delta * (x(3, 0) + x(3, 1) * zenith)).exp() + x(3, 2) + delta * x(3, 3),
                linear(4),
            ]
        } else {
            [linear(0), linear(1), linear(2), linear(3), linear(4)]
        }
    }

    /// Relative luminance of the sky in direction `dir` (normalized)
    fn relative_luminance(params: &[Float; 5], sun: Vector3D, dir: Vector3D) -> Float {
        const MIN_COS_ZETA: Float = 0.01;
        let cos_gamma = sun.dot(&dir).clamp(-1., 1.);
        let gamma = cos_gamma.acos();
        let cos_zeta = dir.z.max(MIN_COS_ZETA);
        let [a, b, c, d, e] = *params;
        let ret = (1. + a * (b / cos_zeta).exp())
            * (1. + c * (d * gamma).exp() + e * cos_gamma * cos_gamma);
        if ret.is_nan() {
            0.0
        } else {
            ret.max(0.0)
        }
    }

    /// Builds the sky vector: the radiance (W/m2.sr) of every bin of `sky`, for a `date`
    /// in standard time.
    ///
    /// The radiance of the sky patches is normalized so that a horizontal plane
    /// seeing the whole sky receives exactly `diffuse_horizontal_irrad`. The ground
    /// (bin 0) is a lambertian reflector of the global horizontal irradiance. The sun
    /// itself is not included (see [`PerezSky::sun_patches`]). At night, all values are zero.
    pub fn sky_vec(
        sky: &ReinhartSky,
        solar: &Solar,
        date: Date,
        direct_normal_irrad: Float,
        diffuse_horizontal_irrad: Float,
        albedo: Float,
    ) -> DVector<Float> {
        let mut vec = DVector::zeros(sky.n_bins);
        if direct_normal_irrad + diffuse_horizontal_irrad < NIGHT_THRESHOLD {
            return vec;
        }
        let sun = match solar.sun_position_from_standard_time(date) {
            Some(s) => s,
            None => return vec,
        };
        let n = Time::Standard(date.day_of_year());

        let min_zenith = (3. as Float).to_radians();
        let zenith = sun.z.clamp(0., 1.).acos().clamp(min_zenith, PI / 2.);
        let extraterrestrial = solar.normal_extraterrestrial_radiation(solar.unwrap_solar_time(n));
        let brightness = Self::sky_brightness(
            diffuse_horizontal_irrad,
            air_mass(zenith),
            extraterrestrial,
        )
        .clamp(0.01, 9e9);
        let clearness =
            Self::sky_clearness(diffuse_horizontal_irrad, direct_normal_irrad, zenith).min(11.9);
        let params = Self::calc_params(zenith, clearness, brightness);

        let mut norm = 0.0;
        for bin in 1..sky.n_bins {
            let dir = sky.bin_dir(bin);
            let v = Self::relative_luminance(&params, sun, dir);
            vec[bin] = v;
            norm += v * sky.bin_solid_angle(bin) * dir.z;
        }
        if norm > 1e-9 && diffuse_horizontal_irrad > 0.0 {
            let k = diffuse_horizontal_irrad / norm;
            for bin in 1..sky.n_bins {
                vec[bin] *= k;
            }
        } else {
            vec.fill(0.0);
        }

        let global_horizontal = diffuse_horizontal_irrad + direct_normal_irrad * sun.z.max(0.0);
        vec[0] = albedo * global_horizontal / PI;
        vec
    }

    /// The sky patches closest to the sun, with weights that add up
    /// to one. Closer patches weigh more.
    pub fn sun_patches(sky: &ReinhartSky, sun: Vector3D) -> [(usize, Float); N_SUN_PATCHES] {
        let mut closest: [(usize, Float); N_SUN_PATCHES] = [(0, -2.); N_SUN_PATCHES];
        for bin in 1..sky.n_bins {
            let dot = sky.bin_dir(bin).dot(&sun);
            if let Some(pos) = closest.iter().position(|(_, d)| dot > *d) {
                for k in (pos + 1..N_SUN_PATCHES).rev() {
                    closest[k] = closest[k - 1];
                }
                closest[pos] = (bin, dot);
            }
        }

        let mut total = 0.0;
        for item in closest.iter_mut() {
            item.1 = 1. / (1.002 - item.1);
            total += item.1;
        }
        for item in closest.iter_mut() {
            item.1 /= total;
        }
        closest
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn barcelona() -> Solar {
        Solar::new(
            (41.28 as Float).to_radians(),
            -(2.07 as Float).to_radians(),
            -(15. as Float).to_radians(),
        )
    }

    #[test]
    fn test_clearness_category() {
        assert_eq!(PerezSky::clearness_category(1.0), 0);
        assert_eq!(PerezSky::clearness_category(1.1), 1);
        assert_eq!(PerezSky::clearness_category(2.0), 4);
        assert_eq!(PerezSky::clearness_category(6.5), 7);
        assert_eq!(PerezSky::clearness_category(11.9), 7);
    }

    #[test]
    fn test_night() {
        let sky = ReinhartSky::new(1).unwrap();
        let date = Date {
            month: 6,
            day: 21,
            hour: 2.,
        };
        // sun below the horizon
        let v = PerezSky::sky_vec(&sky, &barcelona(), date, 300., 100., 0.2);
        assert!(v.iter().all(|x| *x == 0.0));

        // no radiation
        let date = Date {
            month: 6,
            day: 21,
            hour: 12.,
        };
        let v = PerezSky::sky_vec(&sky, &barcelona(), date, 0., 0., 0.2);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_horizontal_normalization() {
        let solar = barcelona();
        for mf in 1..3 {
            let sky = ReinhartSky::new(mf).unwrap();
            for (hour, dni, dhi) in [(13., 700., 100.), (9., 100., 300.), (17., 0., 50.)] {
                let date = Date {
                    month: 5,
                    day: 10,
                    hour,
                };
                let v = PerezSky::sky_vec(&sky, &solar, date, dni, dhi, 0.2);
                let horizontal: Float = (1..sky.n_bins)
                    .map(|b| v[b] * sky.bin_solid_angle(b) * sky.bin_dir(b).z)
                    .sum();
                assert_abs_diff_eq!(horizontal, dhi, epsilon = 1e-6);
                assert!(v.iter().all(|x| *x >= 0.0));

                let sun = solar.sun_position_from_standard_time(date).unwrap();
                assert_abs_diff_eq!(v[0], 0.2 * (dhi + dni * sun.z) / PI, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_sun_patches() {
        let sky = ReinhartSky::new(1).unwrap();
        let sun = Vector3D::new(0.3, -0.5, 0.6).normalize();
        let patches = PerezSky::sun_patches(&sky, sun);
        let total: Float = patches.iter().map(|(_, w)| w).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
        assert!(patches.iter().all(|(bin, _)| *bin > 0));
        for w in patches.windows(2) {
            assert!(w[0].1 >= w[1].1);
        }

        // sun right at the center of a patch
        let sun = sky.bin_dir(40);
        let patches = PerezSky::sun_patches(&sky, sun);
        assert_eq!(patches[0].0, 40);
    }
}
