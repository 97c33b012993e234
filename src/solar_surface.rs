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
use crate::daylight_coefficients::{sampling_tolerance, DCFactory};
use crate::geometry::{Point3D, Polygon3D, Ray3D, SurfaceSide, Vector3D};
use crate::optical_info::{OpticalInfo, SideOpticalInfo, SolarCoefficients};
use crate::sampling::{derive_seed, get_rng, sample_triangle_surface, triangle_sampler, RandGen};
use crate::scene::{Boundary, Scene, SceneElement};
use crate::simulation::SolarOptions;
use crate::state::{SimulationStateElement, SimulationStateHeader};
use crate::{Float, SolarError};
use log::debug;

/// Whether a [`SolarSurface`] comes from a surface or a fenestration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// An opaque surface
    Surface,
    /// A window, skylight, etc.
    Fenestration,
}

impl SurfaceKind {
    /// Used for deriving random seeds
    fn id(&self) -> u64 {
        match self {
            Self::Surface => 0,
            Self::Fenestration => 1,
        }
    }
}

/// Structure that can help calculate solar radiation
///
/// It contains the normal of the original Surface and the points
/// randomly sampled in each surface.
#[derive(Debug, Clone)]
pub struct SolarSurface {
    points: Vec<Point3D>,

    /// The normal of the surface
    pub normal: Vector3D,

    /// Whether the front side can receive sunlight
    pub receives_sun_front: bool,

    /// Whether the back side can receive sunlight
    pub receives_sun_back: bool,

    /// Distance by which the starting point of the rays is
    /// moved away from the surface
    delta: Float,

    kind: SurfaceKind,
    index: usize,

    pub(crate) front_solar_irradiance_index: usize,
    pub(crate) back_solar_irradiance_index: usize,
    pub(crate) front_ir_irradiance_index: usize,
    pub(crate) back_ir_irradiance_index: usize,
}

/// The slots in the state where the results of a surface
/// (or fenestration) go
struct StateSlots {
    front_solar: usize,
    back_solar: usize,
    front_ir: usize,
    back_ir: usize,
}

impl SolarSurface {
    /// Samples `n_points` on a polygon, returning them together with the normal
    fn sample_polygon(
        n_points: usize,
        polygon: &Polygon3D,
        rng: &mut RandGen,
    ) -> Result<(Vec<Point3D>, Vector3D), SolarError> {
        if n_points == 0 {
            return Err(SolarError::InvalidGeometry(
                "surfaces need at least one sample point".into(),
            ));
        }
        let triangles = polygon.triangulate();
        if triangles.is_empty() {
            return Err(SolarError::InvalidGeometry(format!(
                "cannot sample a polygon with an area of {} m2",
                polygon.area()
            )));
        }
        let sampler = triangle_sampler(triangles.iter().map(|t| t.area()).collect());
        let points = (0..n_points)
            .map(|_| {
                let i = sampler(rng);
                sample_triangle_surface(&triangles[i], rng)
            })
            .collect();
        Ok((points, polygon.normal()))
    }

    /// Whether a side facing a certain boundary can be reached by the sun
    pub fn boundary_receives_sun(boundary: &Boundary) -> bool {
        !matches!(boundary, Boundary::AmbientTemperature { .. } | Boundary::Ground)
    }

    /// Registers the irradiance slots of an element in the state (unless
    /// they are already there)
    fn register_slots(
        header: &mut SimulationStateHeader,
        elements: [SimulationStateElement; 4],
    ) -> Result<StateSlots, SolarError> {
        let mut indices = [0; 4];
        for (index, element) in indices.iter_mut().zip(elements.into_iter()) {
            *index = match header.index_of(element) {
                Some(i) => i,
                None => header.push(element, 0.0)?,
            };
        }
        let [front_solar, back_solar, front_ir, back_ir] = indices;
        Ok(StateSlots {
            front_solar,
            back_solar,
            front_ir,
            back_ir,
        })
    }

    fn make(
        kind: SurfaceKind,
        list: &[SceneElement],
        header: &mut SimulationStateHeader,
        options: &SolarOptions,
    ) -> Result<Vec<SolarSurface>, SolarError> {
        let mut ret: Vec<SolarSurface> = Vec::with_capacity(list.len());
        for (i, s) in list.iter().enumerate() {
            let elements = match kind {
                SurfaceKind::Surface => [
                    SimulationStateElement::SurfaceFrontSolarIrradiance(i),
                    SimulationStateElement::SurfaceBackSolarIrradiance(i),
                    SimulationStateElement::SurfaceFrontIRIrradiance(i),
                    SimulationStateElement::SurfaceBackIRIrradiance(i),
                ],
                SurfaceKind::Fenestration => [
                    SimulationStateElement::FenestrationFrontSolarIrradiance(i),
                    SimulationStateElement::FenestrationBackSolarIrradiance(i),
                    SimulationStateElement::FenestrationFrontIRIrradiance(i),
                    SimulationStateElement::FenestrationBackIRIrradiance(i),
                ],
            };
            let slots = Self::register_slots(header, elements)?;

            let mut rng = get_rng(derive_seed(options.seed, &[kind.id(), i as u64]));
            let (points, normal) =
                Self::sample_polygon(options.n_solar_irradiance_points, &s.polygon, &mut rng)
                    .map_err(|e| match e {
                        SolarError::InvalidGeometry(msg) => {
                            SolarError::InvalidGeometry(format!("{:?} '{}': {}", kind, s.name, msg))
                        }
                        other => other,
                    })?;
            debug!(
                "{:?} '{}' sampled with {} points",
                kind,
                s.name,
                points.len()
            );

            ret.push(SolarSurface {
                points,
                normal,
                receives_sun_front: Self::boundary_receives_sun(&s.front_boundary),
                receives_sun_back: Self::boundary_receives_sun(&s.back_boundary),
                delta: options.sampling_offset,
                kind,
                index: i,
                front_solar_irradiance_index: slots.front_solar,
                back_solar_irradiance_index: slots.back_solar,
                front_ir_irradiance_index: slots.front_ir,
                back_ir_irradiance_index: slots.back_ir,
            })
        }
        Ok(ret)
    }

    /// Builds a set of SolarSurfaces from Surfaces
    ///
    /// Adds the necessary elements to the `SimulationStateHeader`
    pub fn make_surfaces(
        list: &[SceneElement],
        header: &mut SimulationStateHeader,
        options: &SolarOptions,
    ) -> Result<Vec<SolarSurface>, SolarError> {
        Self::make(SurfaceKind::Surface, list, header, options)
    }

    /// Builds a set of SolarSurfaces from Fenestrations
    ///
    /// Adds the necessary elements to the `SimulationStateHeader`
    pub fn make_fenestrations(
        list: &[SceneElement],
        header: &mut SimulationStateHeader,
        options: &SolarOptions,
    ) -> Result<Vec<SolarSurface>, SolarError> {
        Self::make(SurfaceKind::Fenestration, list, header, options)
    }

    /// The sample points, on the surface itself
    pub fn points(&self) -> &[Point3D] {
        &self.points
    }

    /// Whether this is a surface or a fenestration
    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    /// Its index within the scene
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether the sun can reach a side of this surface
    pub fn receives_sun(&self, side: SurfaceSide) -> bool {
        match side {
            SurfaceSide::Front => self.receives_sun_front,
            SurfaceSide::Back => self.receives_sun_back,
        }
    }

    /// Where the solar irradiance of a side goes in the state
    pub fn solar_irradiance_index(&self, side: SurfaceSide) -> usize {
        match side {
            SurfaceSide::Front => self.front_solar_irradiance_index,
            SurfaceSide::Back => self.back_solar_irradiance_index,
        }
    }

    /// Where the IR irradiance of a side goes in the state
    pub fn ir_irradiance_index(&self, side: SurfaceSide) -> usize {
        match side {
            SurfaceSide::Front => self.front_ir_irradiance_index,
            SurfaceSide::Back => self.back_ir_irradiance_index,
        }
    }

    /// The state element holding the temperature of a side. It is
    /// registered by some other module (if at all).
    pub fn temperature_element(&self, side: SurfaceSide) -> SimulationStateElement {
        let i = self.index;
        match (self.kind, side) {
            (SurfaceKind::Surface, SurfaceSide::Front) => {
                SimulationStateElement::SurfaceFrontTemperature(i)
            }
            (SurfaceKind::Surface, SurfaceSide::Back) => {
                SimulationStateElement::SurfaceBackTemperature(i)
            }
            (SurfaceKind::Fenestration, SurfaceSide::Front) => {
                SimulationStateElement::FenestrationFrontTemperature(i)
            }
            (SurfaceKind::Fenestration, SurfaceSide::Back) => {
                SimulationStateElement::FenestrationBackTemperature(i)
            }
        }
    }

    /// The outward normal of one side
    pub fn side_normal(&self, side: SurfaceSide) -> Vector3D {
        match side {
            SurfaceSide::Front => self.normal,
            SurfaceSide::Back => -self.normal,
        }
    }

    /// Gets the front rays of a surface
    pub fn front_rays(&self) -> impl Iterator<Item = Ray3D> + '_ {
        self.rays(SurfaceSide::Front)
    }

    /// Gets the back rays of a surface
    pub fn back_rays(&self) -> impl Iterator<Item = Ray3D> + '_ {
        self.rays(SurfaceSide::Back)
    }

    /// Rays starting slightly off one side of the surface, pointing away from it
    pub fn rays(&self, side: SurfaceSide) -> impl Iterator<Item = Ray3D> + '_ {
        let direction = self.side_normal(side);
        self.points.iter().map(move |p| Ray3D {
            direction,
            origin: p + direction * self.delta,
        })
    }

    /// Calculates the view factors of a side and, if it receives sun,
    /// its Daylight Coefficient and sun visibility matrices.
    pub fn calc_side_optical_info(
        &self,
        scene: &Scene,
        factory: &DCFactory,
        side: SurfaceSide,
    ) -> Result<SideOpticalInfo, SolarError> {
        let rays: Vec<Ray3D> = self.rays(side).collect();
        let side_id = match side {
            SurfaceSide::Front => 0,
            SurfaceSide::Back => 1,
        };
        let key = [self.kind.id(), self.index as u64, side_id];
        let samples = factory.sample_side(scene, &rays, &key);
        let view_factors = samples.view_factors();
        view_factors
            .validate(sampling_tolerance(factory.n_ambient_samples))
            .map_err(|e| {
                SolarError::SamplingInconsistency(format!(
                    "{:?} {} ({:?} side): {}",
                    self.kind, self.index, side, e
                ))
            })?;

        let solar = if self.receives_sun(side) {
            Some(SolarCoefficients {
                dc: samples.dc_matrix(),
                sun_visibility: factory.calc_sun_visibility(scene, &rays),
            })
        } else {
            None
        };
        Ok(SideOpticalInfo::new(view_factors, solar))
    }

    /// Calculates the [`OpticalInfo`] of both sides
    pub fn calc_optical_info(
        &self,
        scene: &Scene,
        factory: &DCFactory,
    ) -> Result<OpticalInfo, SolarError> {
        let front = self.calc_side_optical_info(scene, factory, SurfaceSide::Front)?;
        let back = self.calc_side_optical_info(scene, factory, SurfaceSide::Back)?;
        debug!(
            "{:?} {}: front sky view = {:.3}, back sky view = {:.3}",
            self.kind, self.index, front.view_factors.sky, back.view_factors.sky
        );
        Ok(OpticalInfo::new(front, back))
    }
}

#[cfg(test)]
mod testing {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn triangle() -> Polygon3D {
        Polygon3D::new(vec![
            Point3D::new(0., 0., 0.),
            Point3D::new(0., 1., 0.),
            Point3D::new(0., 0., 1.),
        ])
        .unwrap()
    }

    fn one_point() -> SolarOptions {
        let mut options = SolarOptions::new();
        options.set_n_solar_irradiance_points(1);
        options
    }

    #[test]
    fn test_points_on_polygon() {
        let poly = Polygon3D::new(vec![
            Point3D::new(0., 0., 0.),
            Point3D::new(2., 0., 0.),
            Point3D::new(2., 0., 1.),
            Point3D::new(0., 0., 1.),
        ])
        .unwrap();
        let list = vec![SceneElement::new("wall", poly)];
        let mut header = SimulationStateHeader::new();
        let mut options = SolarOptions::new();
        options.set_n_solar_irradiance_points(50).set_sampling_offset(0.01);
        let surfaces = SolarSurface::make_surfaces(&list, &mut header, &options).unwrap();
        let s = &surfaces[0];
        assert_eq!(s.points().len(), 50);
        assert_abs_diff_eq!(s.normal.y, -1.0, epsilon = 1e-9);
        for p in s.points() {
            assert!(p.x >= 0. && p.x <= 2. && p.z >= 0. && p.z <= 1.);
            assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-12);
        }
        for r in s.front_rays() {
            assert_abs_diff_eq!(r.origin.y, -0.01, epsilon = 1e-12);
            assert_abs_diff_eq!(r.direction.y, -1.0, epsilon = 1e-12);
        }
        for r in s.back_rays() {
            assert_abs_diff_eq!(r.origin.y, 0.01, epsilon = 1e-12);
            assert_abs_diff_eq!(r.direction.y, 1.0, epsilon = 1e-12);
        }
        assert_eq!(header.len(), 4);

        // Same seed, same points
        let mut other = SimulationStateHeader::new();
        let again = SolarSurface::make_surfaces(&list, &mut other, &options).unwrap();
        assert_eq!(again[0].points(), s.points());
    }

    #[test]
    fn test_degenerate() {
        let degenerate = Polygon3D::new(vec![
            Point3D::new(0., 0., 0.),
            Point3D::new(1., 0., 0.),
            Point3D::new(2., 0., 0.),
        ])
        .unwrap();
        let list = vec![SceneElement::new("line", degenerate)];
        let mut header = SimulationStateHeader::new();
        assert!(matches!(
            SolarSurface::make_surfaces(&list, &mut header, &one_point()),
            Err(SolarError::InvalidGeometry(_))
        ));

        let list = vec![SceneElement::new("triangle", triangle())];
        let mut options = SolarOptions::new();
        options.set_n_solar_irradiance_points(0);
        let mut header = SimulationStateHeader::new();
        assert!(matches!(
            SolarSurface::make_fenestrations(&list, &mut header, &options),
            Err(SolarError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_existing_slots_are_reused() {
        let list = vec![SceneElement::new("triangle", triangle())];
        let mut header = SimulationStateHeader::new();
        let i = header
            .push(SimulationStateElement::SurfaceFrontSolarIrradiance(0), 0.0)
            .unwrap();
        let surfaces = SolarSurface::make_surfaces(&list, &mut header, &one_point()).unwrap();
        assert_eq!(surfaces[0].front_solar_irradiance_index, i);
        assert_eq!(header.len(), 4);
    }

    fn boundary_list() -> Vec<SceneElement> {
        let poly = triangle();
        let mut list = Vec::with_capacity(6);

        // 0: outdoor on front and back
        list.push(SceneElement::new("0", poly.clone()));

        // 1: outdoor on front, space at the back
        let mut e = SceneElement::new("1", poly.clone());
        e.set_back_boundary(Boundary::Space {
            space: "some space".into(),
        });
        list.push(e);

        // 2: outdoor on back, space at the front
        let mut e = SceneElement::new("2", poly.clone());
        e.set_front_boundary(Boundary::Space {
            space: "some space".into(),
        });
        list.push(e);

        // 3: Ambient Temp at the back, space at the front
        let mut e = SceneElement::new("3", poly.clone());
        e.set_front_boundary(Boundary::Space {
            space: "some space".into(),
        })
        .set_back_boundary(Boundary::AmbientTemperature { temperature: 1. });
        list.push(e);

        // 4: Ambient Temp at the back and front
        let mut e = SceneElement::new("4", poly.clone());
        e.set_front_boundary(Boundary::AmbientTemperature { temperature: 1. })
            .set_back_boundary(Boundary::AmbientTemperature { temperature: 1. });
        list.push(e);

        // 5: Ground at the back and front
        let mut e = SceneElement::new("5", poly);
        e.set_front_boundary(Boundary::Ground)
            .set_back_boundary(Boundary::Ground);
        list.push(e);

        list
    }

    fn check_boundaries(items: &[SolarSurface]) {
        assert!(items[0].receives_sun_back);
        assert!(items[0].receives_sun_front);

        assert!(items[1].receives_sun_back);
        assert!(items[1].receives_sun_front);

        assert!(items[2].receives_sun_back);
        assert!(items[2].receives_sun_front);

        assert!(!items[3].receives_sun_back);
        assert!(items[3].receives_sun_front);

        assert!(!items[4].receives_sun_back);
        assert!(!items[4].receives_sun_front);

        assert!(!items[5].receives_sun_back);
        assert!(!items[5].receives_sun_front);
    }

    #[test]
    fn test_new_boundary_fenestrations() {
        let mut header = SimulationStateHeader::new();
        let fens =
            SolarSurface::make_fenestrations(&boundary_list(), &mut header, &one_point()).unwrap();
        check_boundaries(&fens);
        assert_eq!(header.len(), 24);
    }

    #[test]
    fn test_new_boundary_surfaces() {
        let mut header = SimulationStateHeader::new();
        let surfaces =
            SolarSurface::make_surfaces(&boundary_list(), &mut header, &one_point()).unwrap();
        check_boundaries(&surfaces);
    }

    #[test]
    fn test_optical_info_horizontal() {
        let poly = Polygon3D::new(vec![
            Point3D::new(0., 0., 0.),
            Point3D::new(1., 0., 0.),
            Point3D::new(1., 1., 0.),
            Point3D::new(0., 1., 0.),
        ])
        .unwrap();
        let mut scene = Scene::new();
        scene
            .push_surface(SceneElement::new("roof", poly))
            .unwrap();
        scene.build_accelerator();

        let mut header = SimulationStateHeader::new();
        let surfaces =
            SolarSurface::make_surfaces(&scene.surfaces, &mut header, &SolarOptions::new())
                .unwrap();
        let factory = DCFactory::new(1, 1000, 0).unwrap();
        let info = surfaces[0].calc_optical_info(&scene, &factory).unwrap();

        assert_abs_diff_eq!(info.front.view_factors.sky, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(info.back.view_factors.ground, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(info.front.view_factors.surfaces[0].front, 0.0);

        let front = info.front.solar.as_ref().unwrap();
        assert_eq!(front.dc.nrows(), 10);
        assert_eq!(front.sun_visibility.ncols(), 146);
        let back = info.back.solar.as_ref().unwrap();
        // The back only sees the ground
        for row in back.dc.row_iter() {
            assert_abs_diff_eq!(row[0], crate::PI, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(back.sun_visibility.sum(), 0.0);
    }
}
