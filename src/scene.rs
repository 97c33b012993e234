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
use crate::geometry::{Point3D, Polygon3D, Ray3D, SurfaceSide, Triangle};
use crate::sampling::derive_seed;
use crate::{Float, SolarError};
use serde::{Deserialize, Serialize};

/// What is on the other side of a surface
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Boundary {
    /// The outdoors. This is the default.
    #[default]
    Outdoor,

    /// A space (i.e., a room) of the building
    Space {
        /// The name of the space
        space: String,
    },

    /// The ground
    Ground,

    /// Some place at a fixed temperature
    AmbientTemperature {
        /// The temperature, in C
        temperature: Float,
    },

    /// A boundary that does not exchange heat
    Adiabatic,
}

/// A surface or a fenestration, as seen by the solar calculations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneElement {
    /// The name of the element
    pub name: String,

    /// Its geometry
    pub polygon: Polygon3D,

    /// What is in front of the element
    #[serde(default)]
    pub front_boundary: Boundary,

    /// What is behind the element
    #[serde(default)]
    pub back_boundary: Boundary,

    /// Solar reflectance of the front side
    #[serde(default = "default_reflectance")]
    pub front_solar_reflectance: Float,

    /// Solar reflectance of the back side
    #[serde(default = "default_reflectance")]
    pub back_solar_reflectance: Float,
}

fn default_reflectance() -> Float {
    0.2
}

impl SceneElement {
    /// Creates a new element with outdoor boundaries
    pub fn new<S: Into<String>>(name: S, polygon: Polygon3D) -> Self {
        Self {
            name: name.into(),
            polygon,
            front_boundary: Boundary::Outdoor,
            back_boundary: Boundary::Outdoor,
            front_solar_reflectance: default_reflectance(),
            back_solar_reflectance: default_reflectance(),
        }
    }

    /// Sets the front boundary
    pub fn set_front_boundary(&mut self, boundary: Boundary) -> &mut Self {
        self.front_boundary = boundary;
        self
    }

    /// Sets the back boundary
    pub fn set_back_boundary(&mut self, boundary: Boundary) -> &mut Self {
        self.back_boundary = boundary;
        self
    }

    /// Sets the solar reflectance of both sides
    pub fn set_solar_reflectance(&mut self, front: Float, back: Float) -> &mut Self {
        self.front_solar_reflectance = front;
        self.back_solar_reflectance = back;
        self
    }
}

/// Identifies which object in the [`Scene`] was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectId {
    /// The surface with this index
    Surface(usize),
    /// The fenestration with this index
    Fenestration(usize),
    /// The obstruction with this index
    Obstruction(usize),
}

/// The nearest intersection between a ray and the [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Distance from the origin of the ray
    pub t: Float,
    /// The object hit
    pub object: ObjectId,
    /// The side of the object that was hit
    pub side: SurfaceSide,
}

/// The geometry of a building and its context
#[derive(Debug, Default, Clone)]
pub struct Scene {
    /// The opaque surfaces
    pub surfaces: Vec<SceneElement>,

    /// Windows, skylights and other fenestrations
    pub fenestrations: Vec<SceneElement>,

    /// Geometry that casts shadows but is not simulated
    /// (e.g., neighbouring buildings)
    pub obstructions: Vec<Polygon3D>,

    triangles: Vec<Triangle>,
    owners: Vec<ObjectId>,
    accelerator: Option<Bvh>,
}

impl Scene {
    /// Creates an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    fn add_triangles(&mut self, polygon: &Polygon3D, owner: ObjectId) -> Result<(), SolarError> {
        let triangles = polygon.triangulate();
        if triangles.is_empty() {
            return Err(SolarError::InvalidGeometry(format!(
                "{:?} has no area",
                owner
            )));
        }
        for t in triangles {
            self.triangles.push(t);
            self.owners.push(owner);
        }
        // needs rebuilding
        self.accelerator = None;
        Ok(())
    }

    /// Adds a surface, returning its index
    pub fn push_surface(&mut self, element: SceneElement) -> Result<usize, SolarError> {
        let i = self.surfaces.len();
        self.add_triangles(&element.polygon, ObjectId::Surface(i))?;
        self.surfaces.push(element);
        Ok(i)
    }

    /// Adds a fenestration, returning its index
    pub fn push_fenestration(&mut self, element: SceneElement) -> Result<usize, SolarError> {
        let i = self.fenestrations.len();
        self.add_triangles(&element.polygon, ObjectId::Fenestration(i))?;
        self.fenestrations.push(element);
        Ok(i)
    }

    /// Adds an obstruction, returning its index
    pub fn push_obstruction(&mut self, polygon: Polygon3D) -> Result<usize, SolarError> {
        let i = self.obstructions.len();
        self.add_triangles(&polygon, ObjectId::Obstruction(i))?;
        self.obstructions.push(polygon);
        Ok(i)
    }

    /// Builds the structure that accelerates ray-casting. Should
    /// be called after all the objects have been added.
    pub fn build_accelerator(&mut self) {
        self.accelerator = Some(Bvh::new(&self.triangles));
    }

    /// Checks whether [`Scene::build_accelerator`] has been called
    /// since the last object was added
    pub fn has_accelerator(&self) -> bool {
        self.accelerator.is_some()
    }

    /// A number that changes whenever the geometry changes: the vertices
    /// of every surface, fenestration and obstruction, in order. Stable
    /// across runs, so it can be stored next to cached results.
    pub fn fingerprint(&self) -> u64 {
        let mut ids: Vec<u64> = vec![
            self.surfaces.len() as u64,
            self.fenestrations.len() as u64,
            self.obstructions.len() as u64,
        ];
        let polygons = self
            .surfaces
            .iter()
            .chain(self.fenestrations.iter())
            .map(|e| &e.polygon)
            .chain(self.obstructions.iter());
        for polygon in polygons {
            ids.push(polygon.vertices().len() as u64);
            for v in polygon.vertices() {
                ids.extend(v.coords.iter().map(|x| (*x as f64).to_bits()));
            }
        }
        derive_seed(0, &ids)
    }

    /// Finds the nearest object hit by a ray
    pub fn cast_ray(&self, ray: &Ray3D) -> Option<Hit> {
        let (t, side, i) = match &self.accelerator {
            Some(bvh) => bvh.intersect(&self.triangles, ray)?,
            None => brute_force(&self.triangles, ray)?,
        };
        Some(Hit {
            t,
            side,
            object: self.owners[i],
        })
    }
}

fn brute_force(triangles: &[Triangle], ray: &Ray3D) -> Option<(Float, SurfaceSide, usize)> {
    let mut ret: Option<(Float, SurfaceSide, usize)> = None;
    for (i, tri) in triangles.iter().enumerate() {
        if let Some((t, side)) = tri.intersect(ray) {
            if ret.map_or(true, |(best, ..)| t < best) {
                ret = Some((t, side, i));
            }
        }
    }
    ret
}

#[derive(Debug, Clone, Copy)]
struct BBox {
    min: Point3D,
    max: Point3D,
}

impl BBox {
    fn empty() -> Self {
        Self {
            min: Point3D::new(Float::MAX, Float::MAX, Float::MAX),
            max: Point3D::new(Float::MIN, Float::MIN, Float::MIN),
        }
    }

    fn grow(&mut self, p: &Point3D) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    fn from_triangle(t: &Triangle) -> Self {
        let mut ret = Self::empty();
        ret.grow(&t.a);
        ret.grow(&t.b);
        ret.grow(&t.c);
        ret
    }

    fn merge(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Slab test. Returns the distance at which the ray enters the box.
    fn intersect(&self, ray: &Ray3D, t_max: Float) -> Option<Float> {
        let mut t_enter: Float = 0.0;
        let mut t_exit = t_max;
        for axis in 0..3 {
            let inv = 1. / ray.direction[axis];
            let t0 = (self.min[axis] - ray.origin[axis]) * inv;
            let t1 = (self.max[axis] - ray.origin[axis]) * inv;
            t_enter = t_enter.max(t0.min(t1));
            t_exit = t_exit.min(t0.max(t1));
            if t_exit < t_enter {
                return None;
            }
        }
        Some(t_enter)
    }
}

#[derive(Debug, Clone)]
enum BvhNode {
    Leaf {
        bounds: BBox,
        start: usize,
        count: usize,
    },
    Interior {
        bounds: BBox,
        left: usize,
        right: usize,
    },
}

impl BvhNode {
    fn bounds(&self) -> &BBox {
        match self {
            Self::Leaf { bounds, .. } | Self::Interior { bounds, .. } => bounds,
        }
    }
}

/// A Bounding Volume Hierarchy over the triangles of a [`Scene`]
#[derive(Debug, Clone)]
struct Bvh {
    nodes: Vec<BvhNode>,
    /// Triangle indices, ordered so that each leaf is a contiguous range
    order: Vec<usize>,
}

const MAX_LEAF_SIZE: usize = 4;

impl Bvh {
    fn new(triangles: &[Triangle]) -> Self {
        let boxes: Vec<BBox> = triangles.iter().map(BBox::from_triangle).collect();
        let centroids: Vec<Point3D> = triangles
            .iter()
            .map(|t| Point3D::from((t.a.coords + t.b.coords + t.c.coords) / 3.))
            .collect();
        let mut order: Vec<usize> = (0..triangles.len()).collect();
        let mut nodes = Vec::with_capacity(2 * triangles.len() / MAX_LEAF_SIZE + 1);
        if !triangles.is_empty() {
            Self::build(&mut nodes, &mut order, 0, &boxes, &centroids);
        }
        Self { nodes, order }
    }

    /// Builds the node for `order[start..]`, returning its index
    fn build(
        nodes: &mut Vec<BvhNode>,
        order: &mut [usize],
        start: usize,
        boxes: &[BBox],
        centroids: &[Point3D],
    ) -> usize {
        let bounds = order
            .iter()
            .fold(BBox::empty(), |acc, i| acc.merge(&boxes[*i]));
        let count = order.len();
        let index = nodes.len();
        if count <= MAX_LEAF_SIZE {
            nodes.push(BvhNode::Leaf {
                bounds,
                start,
                count,
            });
            return index;
        }

        // split along the largest extent of the centroids, at the median
        let mut centroid_box = BBox::empty();
        for i in order.iter() {
            centroid_box.grow(&centroids[*i]);
        }
        let (axis, _) = (centroid_box.max - centroid_box.min).argmax();
        let mid = count / 2;
        order.select_nth_unstable_by(mid, |a, b| {
            centroids[*a][axis].total_cmp(&centroids[*b][axis])
        });

        // placeholder, replaced once the children exist
        nodes.push(BvhNode::Leaf {
            bounds,
            start,
            count,
        });
        let (left_order, right_order) = order.split_at_mut(mid);
        let left = Self::build(nodes, left_order, start, boxes, centroids);
        let right = Self::build(nodes, right_order, start + mid, boxes, centroids);
        nodes[index] = BvhNode::Interior {
            bounds,
            left,
            right,
        };
        index
    }

    fn intersect(
        &self,
        triangles: &[Triangle],
        ray: &Ray3D,
    ) -> Option<(Float, SurfaceSide, usize)> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut best: Option<(Float, SurfaceSide, usize)> = None;
        let mut stack = vec![0];
        while let Some(node_index) = stack.pop() {
            let node = &self.nodes[node_index];
            let t_max = best.map_or(Float::MAX, |(t, ..)| t);
            if node.bounds().intersect(ray, t_max).is_none() {
                continue;
            }
            match node {
                BvhNode::Leaf { start, count, .. } => {
                    for &tri_index in &self.order[*start..*start + *count] {
                        if let Some((t, side)) = triangles[tri_index].intersect(ray) {
                            if best.map_or(true, |(b, ..)| t < b) {
                                best = Some((t, side, tri_index));
                            }
                        }
                    }
                }
                BvhNode::Interior { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
            }
        }
        best
    }
}
