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
use crate::geometry::{Point3D, Triangle, Vector3D};
use crate::{Float, PI};
use rand::{Rng, SeedableRng};

/// The random number generator used all over the crate.
pub type RandGen = rand::rngs::SmallRng;

/// Creates a new seeded generator
pub fn get_rng(seed: u64) -> RandGen {
    RandGen::seed_from_u64(seed)
}

/// One round of splitmix64
fn splitmix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Mixes a base seed with a number of identifiers (e.g., the index
/// of an element, its side and the index of a sample point) into a
/// new seed. The same inputs always produce the same seed, regardless
/// of the order in which the work is scheduled.
pub fn derive_seed(base: u64, ids: &[u64]) -> u64 {
    ids.iter().fold(splitmix(base), |acc, id| splitmix(acc ^ splitmix(*id)))
}

/// Returns a closure that chooses a triangle index with a
/// probability proportional to its area.
pub fn triangle_sampler(triangles_areas: Vec<Float>) -> impl Fn(&mut RandGen) -> usize {
    let total_area: Float = triangles_areas.iter().sum();
    let last = triangles_areas.len().saturating_sub(1);

    move |rng: &mut RandGen| -> usize {
        let r: Float = rng.gen::<Float>() * total_area;
        let mut acc = 0.0;
        for (i, area) in triangles_areas.iter().enumerate() {
            acc += area;
            if r <= acc {
                return i;
            }
        }
        // rounding errors
        last
    }
}

/// Samples a point uniformly distributed on the surface of a triangle
pub fn sample_triangle_surface(triangle: &Triangle, rng: &mut RandGen) -> Point3D {
    let mut u: Float = rng.gen();
    let mut v: Float = rng.gen();
    if u + v > 1. {
        u = 1. - u;
        v = 1. - v;
    }
    triangle.point_at(u, v)
}

/// Builds two unit vectors that, together with `normal`, make
/// an orthonormal basis.
pub fn local_basis(normal: Vector3D) -> (Vector3D, Vector3D) {
    let helper = if normal.x.abs() < 0.9 {
        Vector3D::new(1., 0., 0.)
    } else {
        Vector3D::new(0., 1., 0.)
    };
    let e1 = normal.cross(&helper).normalize();
    let e2 = normal.cross(&e1);
    (e1, e2)
}

/// Samples a direction in the hemisphere around `normal` with a probability
/// proportional to the cosine of the angle with it (Malley's method).
///
/// `e1` and `e2` must make an orthonormal basis with `normal`
/// (see [`local_basis`]).
pub fn cosine_weighted_sample_hemisphere(
    rng: &mut RandGen,
    e1: Vector3D,
    e2: Vector3D,
    normal: Vector3D,
) -> Vector3D {
    let r1: Float = rng.gen();
    let r2: Float = rng.gen();
    let radius = r1.sqrt();
    let phi = 2. * PI * r2;
    let local_x = radius * phi.cos();
    let local_y = radius * phi.sin();
    let local_z = (1. - r1).max(0.0).sqrt();

    (e1 * local_x + e2 * local_y + normal * local_z).normalize()
}
