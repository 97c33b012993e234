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
use crate::{Float, SolarError, PI};

/// The number of patches in each row of a Tregenza sky (MF = 1)
const TNAZ: [usize; 7] = [30, 30, 24, 24, 18, 12, 6];

/// The largest subdivision accepted
pub const MAX_MF: usize = 12;

/// A Reinhart subdivision of the sky.
///
/// Bin `0` is the ground. Then come the patches of each row, starting
/// from the horizon and, for each row, from the North going towards the
/// East. The last bin is the cap at the zenith. With `MF = 1` this is
/// the 145-patch Tregenza sky (146 bins, counting the ground).
#[derive(Debug, Clone, PartialEq)]
pub struct ReinhartSky {
    mf: usize,

    /// The total number of bins, including the ground
    pub n_bins: usize,

    /// Number of patches in each row
    row_patches: Vec<usize>,

    /// The index of the first bin of each row
    row_starts: Vec<usize>,

    /// Angular height of each row, in radians
    row_height: Float,
}

impl ReinhartSky {
    /// Subdivides the sky by a factor `mf`, which needs to be
    /// between `1` and [`MAX_MF`]
    pub fn new(mf: usize) -> Result<Self, SolarError> {
        if mf == 0 || mf > MAX_MF {
            return Err(SolarError::InvalidDiscretization(format!(
                "MF needs to be between 1 and {}... found {}",
                MAX_MF, mf
            )));
        }
        let row_patches: Vec<usize> = TNAZ
            .iter()
            .flat_map(|n| std::iter::repeat(n * mf).take(mf))
            .collect();
        let mut row_starts = Vec::with_capacity(row_patches.len());
        let mut acc = 1;
        for n in row_patches.iter() {
            row_starts.push(acc);
            acc += n;
        }
        let n_rows = row_patches.len() as Float;
        Ok(Self {
            mf,
            n_bins: acc + 1,
            row_patches,
            row_starts,
            row_height: PI / 2. / (n_rows + 0.5),
        })
    }

    /// The subdivision factor
    pub fn mf(&self) -> usize {
        self.mf
    }

    fn n_rows(&self) -> usize {
        self.row_patches.len()
    }

    fn zenith_bin(&self) -> usize {
        self.n_bins - 1
    }

    /// Finds the row and the position within it of a bin. Returns
    /// `None` for the ground and the zenith.
    fn row_of(&self, bin: usize) -> Option<(usize, usize)> {
        if bin == 0 || bin >= self.zenith_bin() {
            return None;
        }
        let row = self.row_starts.partition_point(|start| *start <= bin) - 1;
        Some((row, bin - self.row_starts[row]))
    }

    /// The direction of the center of a bin
    pub fn bin_dir(&self, bin: usize) -> Vector3D {
        if bin == 0 {
            return Vector3D::new(0., 0., -1.);
        }
        match self.row_of(bin) {
            None => Vector3D::new(0., 0., 1.),
            Some((row, k)) => {
                let alt = (row as Float + 0.5) * self.row_height;
                let azimuth = 2. * PI * k as Float / self.row_patches[row] as Float;
                let (sin_alt, cos_alt) = alt.sin_cos();
                Vector3D::new(cos_alt * azimuth.sin(), cos_alt * azimuth.cos(), sin_alt)
            }
        }
    }

    /// The solid angle of a bin, in sr
    pub fn bin_solid_angle(&self, bin: usize) -> Float {
        if bin == 0 {
            return 2. * PI;
        }
        match self.row_of(bin) {
            None => {
                let lower = self.n_rows() as Float * self.row_height;
                2. * PI * (1. - lower.sin())
            }
            Some((row, _)) => {
                let lower = row as Float * self.row_height;
                let upper = lower + self.row_height;
                2. * PI * (upper.sin() - lower.sin()) / self.row_patches[row] as Float
            }
        }
    }

    /// The bin that contains a certain direction (which needs to be normalized)
    pub fn dir_to_bin(&self, dir: Vector3D) -> usize {
        if dir.z <= 0.0 {
            return 0;
        }
        let alt = dir.z.min(1.).asin();
        let row = (alt / self.row_height).floor() as usize;
        if row >= self.n_rows() {
            return self.zenith_bin();
        }
        let mut azimuth = dir.x.atan2(dir.y);
        if azimuth < 0.0 {
            azimuth += 2. * PI;
        }
        let n = self.row_patches[row];
        let dphi = 2. * PI / n as Float;
        let k = (azimuth / dphi + 0.5).floor() as usize % n;
        self.row_starts[row] + k
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_invalid_mf() {
        assert!(matches!(
            ReinhartSky::new(0),
            Err(SolarError::InvalidDiscretization(_))
        ));
        assert!(ReinhartSky::new(MAX_MF + 1).is_err());
        assert!(ReinhartSky::new(MAX_MF).is_ok());
    }

    #[test]
    fn test_n_bins() {
        assert_eq!(ReinhartSky::new(1).unwrap().n_bins, 146);
        assert_eq!(ReinhartSky::new(2).unwrap().n_bins, 578);
        assert_eq!(ReinhartSky::new(4).unwrap().n_bins, 2306);
    }

    #[test]
    fn test_solid_angles() {
        for mf in 1..4 {
            let sky = ReinhartSky::new(mf).unwrap();
            let total: Float = (1..sky.n_bins).map(|b| sky.bin_solid_angle(b)).sum();
            assert_abs_diff_eq!(total, 2. * PI, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_bin_dir_roundtrip() {
        for mf in 1..4 {
            let sky = ReinhartSky::new(mf).unwrap();
            for bin in 0..sky.n_bins {
                let dir = sky.bin_dir(bin);
                assert_abs_diff_eq!(dir.norm(), 1.0, epsilon = 1e-9);
                assert_eq!(sky.dir_to_bin(dir), bin);
            }
        }
    }

    #[test]
    fn test_known_directions() {
        let sky = ReinhartSky::new(1).unwrap();
        assert_eq!(sky.dir_to_bin(Vector3D::new(0., 0., 1.)), 145);
        assert_eq!(sky.dir_to_bin(Vector3D::new(0., 1., -0.1).normalize()), 0);
        // Just above the horizon, looking North, is the first patch
        assert_eq!(sky.dir_to_bin(Vector3D::new(0., 1., 0.01).normalize()), 1);
        // ... and looking slightly South of East (azimuth ~96 degrees) is the
        // ninth patch of the first row, which has 12 degrees per patch
        assert_eq!(sky.dir_to_bin(Vector3D::new(1., -0.1, 0.01).normalize()), 1 + 8);
    }
}
