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

/// A direction (or displacement) in 3D space
pub type Vector3D = nalgebra::Vector3<Float>;

/// A position in 3D space
pub type Point3D = nalgebra::Point3<Float>;

/// Intersections closer than this are ignored, so rays leaving a
/// surface do not hit it again.
const T_MIN: Float = 1e-6;

/// Polygons with an area below this (in m2) are considered degenerate
pub const MIN_AREA: Float = 1e-8;

/// A half-line, starting at `origin` and going towards `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray3D {
    /// The starting point
    pub origin: Point3D,
    /// The direction. It is expected to be normalized.
    pub direction: Vector3D,
}

/// The side of a surface that is hit by a ray (or that
/// is being looked at).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceSide {
    /// The side the normal points towards
    Front,
    /// The side opposite to the normal
    Back,
}

/// A planar polygon without holes. The normal follows the
/// right-hand rule on the order of the vertices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon3D {
    vertices: Vec<Point3D>,
}

impl Polygon3D {
    /// Builds a new polygon. It fails if fewer than three vertices are
    /// given; degenerate (e.g., zero-area) polygons are accepted here, and
    /// rejected by whoever needs to sample them.
    pub fn new(vertices: Vec<Point3D>) -> Result<Self, SolarError> {
        if vertices.len() < 3 {
            return Err(SolarError::InvalidGeometry(format!(
                "a polygon needs at least 3 vertices... found {}",
                vertices.len()
            )));
        }
        Ok(Self { vertices })
    }

    /// Borrows the vertices
    pub fn vertices(&self) -> &[Point3D] {
        &self.vertices
    }

    /// Newell's vector: its direction is the normal and its
    /// length is twice the area.
    fn newell(&self) -> Vector3D {
        let n = self.vertices.len();
        let mut ret = Vector3D::zeros();
        for i in 0..n {
            let current = self.vertices[i];
            let next = self.vertices[(i + 1) % n];
            ret.x += (current.y - next.y) * (current.z + next.z);
            ret.y += (current.z - next.z) * (current.x + next.x);
            ret.z += (current.x - next.x) * (current.y + next.y);
        }
        ret
    }

    /// The area of the polygon
    pub fn area(&self) -> Float {
        self.newell().norm() / 2.
    }

    /// The unit normal of the polygon. A zero vector is returned
    /// for degenerate polygons.
    pub fn normal(&self) -> Vector3D {
        let n = self.newell();
        let l = n.norm();
        if l < MIN_AREA {
            Vector3D::zeros()
        } else {
            n / l
        }
    }

    /// The average of the vertices
    pub fn centroid(&self) -> Point3D {
        let sum = self
            .vertices
            .iter()
            .fold(Vector3D::zeros(), |acc, p| acc + p.coords);
        Point3D::from(sum / self.vertices.len() as Float)
    }

    /// Splits the polygon into triangles using ear-clipping. The triangles
    /// keep the orientation (i.e., the normal) of the polygon. Degenerate
    /// polygons produce no triangles.
    pub fn triangulate(&self) -> Vec<Triangle> {
        let normal = self.normal();
        if normal.norm() < 0.5 {
            return Vec::new();
        }

        // Project onto the plane in which the polygon looks largest. The
        // cyclic choice of axes keeps counter-clockwise polygons
        // counter-clockwise when the dropped component of the normal is positive.
        let (axis, _) = normal.abs().argmax();
        let project = |p: &Point3D| -> (Float, Float) {
            match axis {
                0 => (p.y, p.z),
                1 => (p.z, p.x),
                _ => (p.x, p.y),
            }
        };
        let sign = normal[axis].signum();
        let points: Vec<(Float, Float)> = self.vertices.iter().map(project).collect();

        let orient = |a: usize, b: usize, c: usize| -> Float {
            let (ax, ay) = points[a];
            let (bx, by) = points[b];
            let (cx, cy) = points[c];
            sign * ((bx - ax) * (cy - ay) - (by - ay) * (cx - ax))
        };

        let mut remaining: Vec<usize> = (0..self.vertices.len()).collect();
        let mut ret = Vec::with_capacity(self.vertices.len() - 2);
        let tri = |i: usize, j: usize, k: usize| -> Triangle {
            Triangle::new(self.vertices[i], self.vertices[j], self.vertices[k])
        };

        while remaining.len() > 3 {
            let m = remaining.len();
            let mut clipped = false;
            for i in 0..m {
                let prev = remaining[(i + m - 1) % m];
                let current = remaining[i];
                let next = remaining[(i + 1) % m];
                if orient(prev, current, next) <= 0.0 {
                    // reflex or collinear
                    continue;
                }
                let contains_other = remaining.iter().any(|&other| {
                    other != prev
                        && other != current
                        && other != next
                        && orient(prev, current, other) >= 0.0
                        && orient(current, next, other) >= 0.0
                        && orient(next, prev, other) >= 0.0
                });
                if contains_other {
                    continue;
                }
                ret.push(tri(prev, current, next));
                remaining.remove(i);
                clipped = true;
                break;
            }

            if !clipped {
                // Only collinear vertices are blocking us
                let m = remaining.len();
                let collinear = (0..m).find(|&i| {
                    let prev = remaining[(i + m - 1) % m];
                    let next = remaining[(i + 1) % m];
                    orient(prev, remaining[i], next).abs() < MIN_AREA
                });
                match collinear {
                    Some(i) => {
                        remaining.remove(i);
                    }
                    None => {
                        // Should not happen for simple polygons... fan the rest
                        for w in 1..remaining.len() - 1 {
                            ret.push(tri(remaining[0], remaining[w], remaining[w + 1]));
                        }
                        return ret;
                    }
                }
            }
        }
        if orient(remaining[0], remaining[1], remaining[2]).abs() > 0.0 {
            ret.push(tri(remaining[0], remaining[1], remaining[2]));
        }
        ret
    }
}

/// A triangle in 3D space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex
    pub a: Point3D,
    /// Second vertex
    pub b: Point3D,
    /// Third vertex
    pub c: Point3D,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(a: Point3D, b: Point3D, c: Point3D) -> Self {
        Self { a, b, c }
    }

    /// The area of the triangle
    pub fn area(&self) -> Float {
        (self.b - self.a).cross(&(self.c - self.a)).norm() / 2.
    }

    /// The (unit) normal of the triangle
    pub fn normal(&self) -> Vector3D {
        (self.b - self.a).cross(&(self.c - self.a)).normalize()
    }

    /// Moves to a point inside the triangle, using barycentric
    /// coordinates `u` and `v`
    pub fn point_at(&self, u: Float, v: Float) -> Point3D {
        self.a + (self.b - self.a) * u + (self.c - self.a) * v
    }

    /// Intersects a ray with this triangle (Möller–Trumbore), returning
    /// the distance to the hit and the side that was hit.
    pub fn intersect(&self, ray: &Ray3D) -> Option<(Float, SurfaceSide)> {
        let e1 = self.b - self.a;
        let e2 = self.c - self.a;
        let p = ray.direction.cross(&e2);
        let det = e1.dot(&p);
        if det.abs() < 1e-12 {
            return None;
        }
        let inv_det = 1. / det;
        let s = ray.origin - self.a;
        let u = s.dot(&p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(&e1);
        let v = ray.direction.dot(&q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = e2.dot(&q) * inv_det;
        if t <= T_MIN {
            return None;
        }

        // det = -direction·(e1 x e2); so a positive determinant means
        // the ray is travelling against the normal.
        let side = if det > 0.0 {
            SurfaceSide::Front
        } else {
            SurfaceSide::Back
        };
        Some((t, side))
    }
}
