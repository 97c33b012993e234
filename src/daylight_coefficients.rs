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
use crate::geometry::{Ray3D, SurfaceSide, Vector3D};
use crate::optical_info::{IRViewFactorSet, TargetView};
use crate::sampling::{cosine_weighted_sample_hemisphere, derive_seed, get_rng, local_basis};
use crate::scene::{ObjectId, Scene};
use crate::{Float, ReinhartSky, SolarError, PI};
use nalgebra::{DMatrix, RowDVector};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// The largest acceptable difference between the sum of the
/// view factors of a side and `1.0`, when `n` rays are cast from
/// each sample point.
pub fn sampling_tolerance(n: usize) -> Float {
    1. / (n.max(1) as Float).sqrt()
}

/// Where a ray ends up
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RayTermination {
    /// It escaped towards this sky bin (never `0`)
    Sky(usize),
    /// It escaped downwards
    Ground,
    /// It hit an obstruction, which is assumed to be at air temperature
    Air,
    /// It hit a side of a surface
    Surface {
        /// The index of the surface
        index: usize,
        /// The side that was hit
        side: SurfaceSide,
    },
    /// It hit a side of a fenestration
    Fenestration {
        /// The index of the fenestration
        index: usize,
        /// The side that was hit
        side: SurfaceSide,
    },
}

/// Maps the front or back side into `0` or `1`
pub(crate) fn side_index(side: SurfaceSide) -> usize {
    match side {
        SurfaceSide::Front => 0,
        SurfaceSide::Back => 1,
    }
}

/// How many of the rays cast from a single sample point ended up where
#[derive(Debug, Clone, PartialEq)]
pub struct RayCounts {
    /// Rays reaching each sky bin. Bin `0` is the ground.
    pub bins: Vec<u32>,
    /// Rays hitting obstructions
    pub air: u32,
    /// Rays hitting the front and back of each surface
    pub surfaces: Vec<[u32; 2]>,
    /// Rays hitting the front and back of each fenestration
    pub fenestrations: Vec<[u32; 2]>,
    /// Total number of rays cast
    pub n_rays: usize,
}

impl RayCounts {
    fn new(n_bins: usize, n_surfaces: usize, n_fenestrations: usize) -> Self {
        Self {
            bins: vec![0; n_bins],
            air: 0,
            surfaces: vec![[0; 2]; n_surfaces],
            fenestrations: vec![[0; 2]; n_fenestrations],
            n_rays: 0,
        }
    }

    fn register(&mut self, termination: RayTermination) {
        self.n_rays += 1;
        match termination {
            RayTermination::Sky(bin) => self.bins[bin] += 1,
            RayTermination::Ground => self.bins[0] += 1,
            RayTermination::Air => self.air += 1,
            RayTermination::Surface { index, side } => self.surfaces[index][side_index(side)] += 1,
            RayTermination::Fenestration { index, side } => {
                self.fenestrations[index][side_index(side)] += 1
            }
        }
    }
}

/// The ray counts of every sample point on one side of a surface
#[derive(Debug, Clone)]
pub struct SideSamples {
    /// One element per sample point
    pub points: Vec<RayCounts>,
}

impl SideSamples {
    /// The Daylight Coefficient matrix. Each row corresponds to a sample
    /// point and each column to a bin of the sky (column `0` is the ground).
    ///
    /// Multiplying a row by a sky vector (in W/m2.sr) gives the
    /// irradiance (W/m2) at the point.
    pub fn dc_matrix(&self) -> DMatrix<Float> {
        let n_bins = self.points.first().map_or(0, |p| p.bins.len());
        DMatrix::from_fn(self.points.len(), n_bins, |row, col| {
            let p = &self.points[row];
            PI * p.bins[col] as Float / p.n_rays as Float
        })
    }

    /// The view factors, averaged over all the sample points
    pub fn view_factors(&self) -> IRViewFactorSet {
        let n_points = self.points.len();
        let mut ret = IRViewFactorSet {
            surfaces: vec![
                TargetView::default();
                self.points.first().map_or(0, |p| p.surfaces.len())
            ],
            fenestrations: vec![
                TargetView::default();
                self.points.first().map_or(0, |p| p.fenestrations.len())
            ],
            ..IRViewFactorSet::default()
        };
        if n_points == 0 {
            return ret;
        }
        let weight = |count: u32, n: usize| count as Float / n as Float / n_points as Float;
        for p in &self.points {
            let n = p.n_rays;
            ret.ground += weight(p.bins[0], n);
            ret.sky += p.bins.iter().skip(1).map(|c| weight(*c, n)).sum::<Float>();
            ret.air += weight(p.air, n);
            for (view, counts) in ret.surfaces.iter_mut().zip(p.surfaces.iter()) {
                view.front += weight(counts[0], n);
                view.back += weight(counts[1], n);
            }
            for (view, counts) in ret.fenestrations.iter_mut().zip(p.fenestrations.iter()) {
                view.front += weight(counts[0], n);
                view.back += weight(counts[1], n);
            }
        }
        ret
    }
}

/// A structure meant to calculate Daylight Coefficient matrices, sun
/// visibility and view factors.
#[derive(Debug, Clone)]
pub struct DCFactory {
    /// The discretization of the sky
    pub sky: ReinhartSky,

    /// Number of rays cast from each sample point
    pub n_ambient_samples: usize,

    /// Base seed for all the random numbers
    pub seed: u64,
}

impl DCFactory {
    /// Creates a new factory with a Reinhart subdivision `mf`
    pub fn new(mf: usize, n_ambient_samples: usize, seed: u64) -> Result<Self, SolarError> {
        if n_ambient_samples == 0 {
            return Err(SolarError::InvalidOptions(
                "at least one ray needs to be cast from each sample point".into(),
            ));
        }
        Ok(Self {
            sky: ReinhartSky::new(mf)?,
            n_ambient_samples,
            seed,
        })
    }

    /// Follows a ray until it hits something or escapes
    pub fn trace(&self, scene: &Scene, ray: &Ray3D) -> RayTermination {
        match scene.cast_ray(ray) {
            None => {
                if ray.direction.z > 0.0 {
                    RayTermination::Sky(self.sky.dir_to_bin(ray.direction))
                } else {
                    RayTermination::Ground
                }
            }
            Some(hit) => match hit.object {
                ObjectId::Surface(index) => RayTermination::Surface {
                    index,
                    side: hit.side,
                },
                ObjectId::Fenestration(index) => RayTermination::Fenestration {
                    index,
                    side: hit.side,
                },
                ObjectId::Obstruction(_) => RayTermination::Air,
            },
        }
    }

    /// Returns a closure that casts [`DCFactory::n_ambient_samples`] rays
    /// from the origin of a ray, distributed (cosine-weighted) over the
    /// hemisphere around its direction, and counts where they end up.
    ///
    /// The second argument of the closure is the seed, so that
    /// every sample point can be processed independently.
    pub fn get_sampler<'a>(
        &'a self,
        scene: &'a Scene,
    ) -> impl Fn(&Ray3D, u64) -> RayCounts + Sync + 'a {
        move |ray: &Ray3D, seed: u64| -> RayCounts {
            let mut rng = get_rng(seed);
            let normal = ray.direction;
            let (e1, e2) = local_basis(normal);
            let mut counts = RayCounts::new(
                self.sky.n_bins,
                scene.surfaces.len(),
                scene.fenestrations.len(),
            );
            for _ in 0..self.n_ambient_samples {
                let direction = cosine_weighted_sample_hemisphere(&mut rng, e1, e2, normal);
                let new_ray = Ray3D {
                    origin: ray.origin,
                    direction,
                };
                counts.register(self.trace(scene, &new_ray));
            }
            counts
        }
    }

    /// Samples the hemisphere of each ray in `rays` (one per sample point).
    /// `key` identifies the side being sampled, and is mixed with the index of
    /// each point for seeding.
    pub fn sample_side(&self, scene: &Scene, rays: &[Ray3D], key: &[u64]) -> SideSamples {
        let sampler = self.get_sampler(scene);
        let seed_of = |i: usize| -> u64 {
            let mut ids = key.to_vec();
            ids.push(i as u64);
            derive_seed(self.seed, &ids)
        };

        #[cfg(feature = "parallel")]
        let iter = rays.par_iter().enumerate();
        #[cfg(not(feature = "parallel"))]
        let iter = rays.iter().enumerate();

        let points: Vec<RayCounts> = iter.map(|(i, ray)| sampler(ray, seed_of(i))).collect();
        SideSamples { points }
    }

    /// Calculates the Daylight Coefficient matrix for a set of rays
    /// (see [`SideSamples::dc_matrix`])
    pub fn calc_solar_dc_matrix(
        &self,
        scene: &Scene,
        rays: &[Ray3D],
        key: &[u64],
    ) -> DMatrix<Float> {
        self.sample_side(scene, rays, key).dc_matrix()
    }

    /// Calculates the view factors seen by a set of rays, checking that they add up to one.
    pub fn calc_view_factors(
        &self,
        scene: &Scene,
        rays: &[Ray3D],
        key: &[u64],
    ) -> Result<IRViewFactorSet, SolarError> {
        let ret = self.sample_side(scene, rays, key).view_factors();
        ret.validate(sampling_tolerance(self.n_ambient_samples))?;
        Ok(ret)
    }

    /// For each ray (i.e., sample point) and each sky bin, checks whether the
    /// centre of the bin can be seen from the origin of the ray. Rows are points and
    /// columns are bins; the ground column is always `0`.
    pub fn calc_sun_visibility(&self, scene: &Scene, rays: &[Ray3D]) -> DMatrix<Float> {
        let n_bins = self.sky.n_bins;
        let dirs: Vec<Vector3D> = (0..n_bins).map(|b| self.sky.bin_dir(b)).collect();
        let visible_row = |ray: &Ray3D| -> Vec<Float> {
            dirs.iter()
                .enumerate()
                .map(|(bin, dir)| {
                    if bin == 0 || dir.dot(&ray.direction) <= 0.0 {
                        return 0.0;
                    }
                    let to_sky = Ray3D {
                        origin: ray.origin,
                        direction: *dir,
                    };
                    if scene.cast_ray(&to_sky).is_none() {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect()
        };

        #[cfg(feature = "parallel")]
        let iter = rays.par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = rays.iter();

        let rows: Vec<Vec<Float>> = iter.map(visible_row).collect();
        DMatrix::from_fn(rays.len(), n_bins, |r, c| rows[r][c])
    }
}

/// Identifies each side of each surface and fenestration
/// with a single index (a "slot").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotLayout {
    /// Number of surfaces
    pub n_surfaces: usize,
    /// Number of fenestrations
    pub n_fenestrations: usize,
}

impl SlotLayout {
    /// The slot of a side of a surface
    pub fn surface(&self, index: usize, side: SurfaceSide) -> usize {
        2 * index + side_index(side)
    }

    /// The slot of a side of a fenestration
    pub fn fenestration(&self, index: usize, side: SurfaceSide) -> usize {
        2 * self.n_surfaces + 2 * index + side_index(side)
    }

    /// Total number of slots
    pub fn len(&self) -> usize {
        2 * (self.n_surfaces + self.n_fenestrations)
    }

    /// Checks whether there are no slots at all
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How much of the irradiance on each side is reflected towards every
/// other side. Row `i` lists `(j, w)` pairs meaning that side `i` receives `w`
/// times the irradiance on side `j`, where `w` is the view factor from `i` to `j`
/// times the solar reflectance of `j`.
#[derive(Debug, Clone, Default)]
pub struct Reflections {
    rows: Vec<Vec<(usize, Float)>>,
}

impl Reflections {
    /// Builds the operator. `view_factors[slot]` and `reflectances[slot]`
    /// describe every side in the `layout`.
    pub fn new(
        layout: SlotLayout,
        view_factors: &[&IRViewFactorSet],
        reflectances: &[Float],
    ) -> Self {
        let rows = view_factors
            .iter()
            .map(|vf| {
                let mut row = Vec::new();
                let mut add = |target: usize, fraction: Float| {
                    let w = fraction * reflectances[target];
                    if w > 0.0 {
                        row.push((target, w));
                    }
                };
                for (j, view) in vf.surfaces.iter().enumerate() {
                    add(layout.surface(j, SurfaceSide::Front), view.front);
                    add(layout.surface(j, SurfaceSide::Back), view.back);
                }
                for (j, view) in vf.fenestrations.iter().enumerate() {
                    add(layout.fenestration(j, SurfaceSide::Front), view.front);
                    add(layout.fenestration(j, SurfaceSide::Back), view.back);
                }
                row
            })
            .collect();
        Self { rows }
    }

    /// Checks whether nothing is ever reflected
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.is_empty())
    }

    /// Adds `bounces` inter-reflections to some per-side irradiance `direct`:
    /// `E(n+1) = direct + R * E(n)`, with `E(0) = direct`.
    pub fn bounce(&self, direct: &[Float], bounces: usize) -> Vec<Float> {
        let mut current = direct.to_vec();
        for _ in 0..bounces {
            current = self
                .rows
                .iter()
                .zip(direct.iter())
                .map(|(row, d)| d + row.iter().map(|(j, w)| w * current[*j]).sum::<Float>())
                .collect();
        }
        current
    }

    /// The same as [`Reflections::bounce`], but for Daylight Coefficient matrices.
    ///
    /// The light reflected by a side is assumed to come from the mean of its rows, and
    /// it is added to every row of the receiving side. Sides without matrix do not reflect.
    pub fn bounce_dc(
        &self,
        direct: &[Option<DMatrix<Float>>],
        bounces: usize,
    ) -> Vec<Option<DMatrix<Float>>> {
        let mut current: Vec<Option<DMatrix<Float>>> = direct.to_vec();
        for _ in 0..bounces {
            let means: Vec<Option<RowDVector<Float>>> = current
                .iter()
                .map(|dc| dc.as_ref().map(|m| m.row_mean()))
                .collect();
            current = self
                .rows
                .iter()
                .zip(direct.iter())
                .map(|(row, d)| {
                    let d = d.as_ref()?;
                    let mut reflected = RowDVector::<Float>::zeros(d.ncols());
                    for (j, w) in row {
                        if let Some(m) = &means[*j] {
                            reflected += m * *w;
                        }
                    }
                    let mut ret = d.clone();
                    for (col, v) in reflected.iter().enumerate() {
                        ret.column_mut(col).add_scalar_mut(*v);
                    }
                    Some(ret)
                })
                .collect();
        }
        current
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use crate::geometry::{Point3D, Polygon3D};
    use crate::scene::SceneElement;
    use approx::assert_abs_diff_eq;

    fn up_rays() -> Vec<Ray3D> {
        vec![
            Ray3D {
                origin: Point3D::new(2., 0.5, 0.8),
                direction: Vector3D::new(0., 0., 1.),
            },
            Ray3D {
                origin: Point3D::new(2., 2.5, 0.8),
                direction: Vector3D::new(0., 0., 1.),
            },
        ]
    }

    fn horizontal_square(z: Float, facing_up: bool) -> Polygon3D {
        let mut v = vec![
            Point3D::new(-10., -10., z),
            Point3D::new(10., -10., z),
            Point3D::new(10., 10., z),
            Point3D::new(-10., 10., z),
        ];
        if !facing_up {
            v.reverse();
        }
        Polygon3D::new(v).unwrap()
    }

    #[test]
    fn test_tolerance() {
        assert_abs_diff_eq!(sampling_tolerance(10_000), 0.01, epsilon = 1e-12);
        assert_abs_diff_eq!(sampling_tolerance(100), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_scene() {
        let mut scene = Scene::new();
        scene.build_accelerator();
        let factory = DCFactory::new(1, 3000, 0).unwrap();
        let rays = up_rays();

        let samples = factory.sample_side(&scene, &rays, &[0]);
        let views = samples.view_factors();
        assert_abs_diff_eq!(views.sky, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(views.ground, 0.0);
        assert_abs_diff_eq!(views.air, 0.0);

        // Sum of the sky coefficients is PI times the sky view
        let dc = samples.dc_matrix();
        assert_eq!(dc.nrows(), 2);
        assert_eq!(dc.ncols(), 146);
        for row in dc.row_iter() {
            let sky: Float = row.iter().skip(1).sum();
            assert_abs_diff_eq!(sky, PI, epsilon = 1e-9);
            assert_abs_diff_eq!(row[0], 0.0);
        }

        // A uniform sky of radiance 1 produces an irradiance of PI
        let sky_vec = nalgebra::DVector::from_fn(146, |i, _| if i == 0 { 0.0 } else { 1.0 });
        let irradiance = &dc * &sky_vec;
        for v in irradiance.iter() {
            assert_abs_diff_eq!(*v, PI, epsilon = 1e-9);
        }

        // every column gets roughly Omega * cos(theta) (i.e., PI * the fraction)
        let mean = dc.row_mean();
        let mut max_err: Float = 0.0;
        for bin in 1..factory.sky.n_bins {
            let expected = factory.sky.bin_solid_angle(bin) * factory.sky.bin_dir(bin).z;
            max_err = max_err.max((mean[bin] - expected).abs());
        }
        assert!(max_err < 0.03, "max_err = {}", max_err);
    }

    #[test]
    fn test_vertical_empty_scene() {
        let scene = Scene::new();
        let factory = DCFactory::new(1, 10_000, 2).unwrap();
        let rays: Vec<Ray3D> = (0..10)
            .map(|i| Ray3D {
                origin: Point3D::new(i as Float, 0., 1.),
                direction: Vector3D::new(0., -1., 0.),
            })
            .collect();
        let views = factory.calc_view_factors(&scene, &rays, &[1, 2]).unwrap();
        let tol = sampling_tolerance(10_000);
        assert_abs_diff_eq!(views.sky, 0.5, epsilon = tol);
        assert_abs_diff_eq!(views.ground, 0.5, epsilon = tol);
        assert_abs_diff_eq!(views.total(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_classification() {
        let mut scene = Scene::new();
        // a ceiling facing down, and an obstruction further up
        scene
            .push_surface(SceneElement::new("ceiling", horizontal_square(3., false)))
            .unwrap();
        scene.push_obstruction(horizontal_square(10., false)).unwrap();
        scene.build_accelerator();

        let factory = DCFactory::new(1, 10, 0).unwrap();
        let up = Ray3D {
            origin: Point3D::new(0., 0., 1.),
            direction: Vector3D::new(0., 0., 1.),
        };
        assert_eq!(
            factory.trace(&scene, &up),
            RayTermination::Surface {
                index: 0,
                side: SurfaceSide::Front
            }
        );
        let between = Ray3D {
            origin: Point3D::new(0., 0., 5.),
            direction: Vector3D::new(0., 0., 1.),
        };
        assert_eq!(factory.trace(&scene, &between), RayTermination::Air);
        let down = Ray3D {
            origin: Point3D::new(0., 0., 1.),
            direction: Vector3D::new(0., 0., -1.),
        };
        assert_eq!(factory.trace(&scene, &down), RayTermination::Ground);
        let away = Ray3D {
            origin: Point3D::new(0., 0., 11.),
            direction: Vector3D::new(0., 0., 1.),
        };
        assert_eq!(factory.trace(&scene, &away), RayTermination::Sky(145));
    }

    #[test]
    fn test_deterministic() {
        let scene = Scene::new();
        let factory = DCFactory::new(2, 500, 42).unwrap();
        let a = factory.calc_solar_dc_matrix(&scene, &up_rays(), &[0, 1, 2]);
        let b = factory.calc_solar_dc_matrix(&scene, &up_rays(), &[0, 1, 2]);
        assert_eq!(a, b);
        let c = factory.calc_solar_dc_matrix(&scene, &up_rays(), &[0, 1, 3]);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sun_visibility() {
        let mut scene = Scene::new();
        scene
            .push_obstruction(horizontal_square(3., false))
            .unwrap();
        let factory = DCFactory::new(1, 10, 0).unwrap();
        let rays = up_rays();
        let shaded = factory.calc_sun_visibility(&scene, &rays);
        // everything above is blocked, apart from very low patches
        assert_abs_diff_eq!(shaded[(0, 145)], 0.0);
        assert_abs_diff_eq!(shaded[(0, 0)], 0.0);

        let open = factory.calc_sun_visibility(&Scene::new(), &rays);
        assert_abs_diff_eq!(open[(0, 145)], 1.0);
        assert_abs_diff_eq!(open.row(1).iter().sum::<Float>(), 145.0);

        // vertical, facing South: only Southern patches
        let south = vec![Ray3D {
            origin: Point3D::new(0., 0., 1.),
            direction: Vector3D::new(0., -1., 0.),
        }];
        let vis = factory.calc_sun_visibility(&Scene::new(), &south);
        for bin in 1..factory.sky.n_bins {
            let expected = if factory.sky.bin_dir(bin).y < 0.0 { 1.0 } else { 0.0 };
            assert_abs_diff_eq!(vis[(0, bin)], expected);
        }
    }

    #[test]
    fn test_reflections() {
        let layout = SlotLayout {
            n_surfaces: 2,
            n_fenestrations: 0,
        };
        assert_eq!(layout.len(), 4);
        assert_eq!(layout.surface(1, SurfaceSide::Back), 3);

        // Two parallel surfaces facing each other through their front sides,
        // seeing each other half of the time
        let half = IRViewFactorSet {
            sky: 0.5,
            surfaces: vec![
                TargetView::default(),
                TargetView {
                    front: 0.5,
                    back: 0.0,
                },
            ],
            ..IRViewFactorSet::default()
        };
        let other = IRViewFactorSet {
            sky: 0.5,
            surfaces: vec![
                TargetView {
                    front: 0.5,
                    back: 0.0,
                },
                TargetView::default(),
            ],
            ..IRViewFactorSet::default()
        };
        let nothing = IRViewFactorSet {
            sky: 1.0,
            surfaces: vec![TargetView::default(); 2],
            ..IRViewFactorSet::default()
        };
        let views = [&half, &nothing, &other, &nothing];
        let reflectances = [0.4, 0.4, 0.4, 0.4];
        let r = Reflections::new(layout, &views, &reflectances);
        assert!(!r.is_empty());

        let direct = [100., 0., 0., 0.];
        assert_eq!(r.bounce(&direct, 0), direct.to_vec());
        let once = r.bounce(&direct, 1);
        assert_abs_diff_eq!(once[2], 20., epsilon = 1e-9);
        assert_abs_diff_eq!(once[0], 100., epsilon = 1e-9);
        let twice = r.bounce(&direct, 2);
        assert_abs_diff_eq!(twice[0], 104., epsilon = 1e-9);
        assert_abs_diff_eq!(twice[2], 20., epsilon = 1e-9);

        // The same, through DC matrices
        let dc = |v: Float| Some(DMatrix::from_element(2, 3, v));
        let direct_dc = vec![dc(1.), None, dc(0.), None];
        let composed = r.bounce_dc(&direct_dc, 2);
        assert!(composed[1].is_none());
        let m0 = composed[0].as_ref().unwrap();
        let m2 = composed[2].as_ref().unwrap();
        assert_abs_diff_eq!(m2[(1, 2)], 0.2, epsilon = 1e-9);
        assert_abs_diff_eq!(m0[(0, 0)], 1.04, epsilon = 1e-9);
    }
}
