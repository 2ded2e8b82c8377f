//! Geometry kernel
//!
//! Pure functions on triangles: closest point, barycentric coordinates,
//! normal and tangent frames, and inverse-distance weighting. Degenerate
//! (zero-area) triangles never divide by zero; they fall back to their
//! edges and vertices.

use glam::{Mat4, Vec3};

/// Distances below this are treated as coincident in [`inverse_distance_weights`]
pub const COINCIDENT_DISTANCE: f32 = 1e-4;

/// Added to every `distance^(2σ)` so weights stay finite
pub const WEIGHT_EPSILON: f32 = 1e-8;

/// Closest point to `p` on segment `a`-`b`
pub fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::MIN_POSITIVE {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Closest point to `p` on triangle `a`, `b`, `c`.
///
/// Region-based projection (vertex, edge and face regions). Zero-area
/// triangles are handled as their three edges.
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;

    if ab.cross(ac).length_squared() <= f32::MIN_POSITIVE {
        return closest_point_on_degenerate_triangle(p, a, b, c);
    }

    // Vertex region A
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    // Vertex region B
    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    // Edge region AB
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    // Vertex region C
    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    // Edge region AC
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    // Edge region BC
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    // Face region
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

fn closest_point_on_degenerate_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    [
        closest_point_on_segment(p, a, b),
        closest_point_on_segment(p, b, c),
        closest_point_on_segment(p, c, a),
    ]
    .into_iter()
    .min_by(|x, y| x.distance_squared(p).total_cmp(&y.distance_squared(p)))
    .unwrap_or(a)
}

/// Barycentric coordinates `(u, v, w)` of `p` with respect to `a`, `b`, `c`.
///
/// `u + v + w == 1` and `u*a + v*b + w*c` is the projection of `p` onto the
/// triangle's plane. Collinear triangles use the longest edge; fully
/// collapsed triangles return `(1, 0, 0)`.
pub fn barycentric_coordinates(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;
    let d00 = v0.dot(v0);
    let d01 = v0.dot(v1);
    let d11 = v1.dot(v1);
    let d20 = v2.dot(v0);
    let d21 = v2.dot(v1);
    let denom = d00 * d11 - d01 * d01;

    if denom <= f32::EPSILON * d00 * d11 || denom <= f32::MIN_POSITIVE {
        return degenerate_barycentric(p, [a, b, c]);
    }

    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    Vec3::new(1.0 - v - w, v, w)
}

fn degenerate_barycentric(p: Vec3, corners: [Vec3; 3]) -> Vec3 {
    let edges = [(0, 1), (1, 2), (2, 0)];
    let (i, j) = edges
        .into_iter()
        .max_by(|&(a0, a1), &(b0, b1)| {
            corners[a0]
                .distance_squared(corners[a1])
                .total_cmp(&corners[b0].distance_squared(corners[b1]))
        })
        .unwrap_or((0, 1));

    let edge = corners[j] - corners[i];
    let len_sq = edge.length_squared();
    let mut coords = [0.0f32; 3];
    if len_sq <= f32::MIN_POSITIVE {
        coords[0] = 1.0;
    } else {
        let t = ((p - corners[i]).dot(edge) / len_sq).clamp(0.0, 1.0);
        coords[i] = 1.0 - t;
        coords[j] = t;
    }
    Vec3::from_array(coords)
}

/// Point at barycentric coordinates `coords` of triangle `a`, `b`, `c`
#[inline]
pub fn point_at_barycentric(a: Vec3, b: Vec3, c: Vec3, coords: Vec3) -> Vec3 {
    a * coords.x + b * coords.y + c * coords.z
}

/// Unnormalized triangle normal `(b - a) × (c - a)`; depends on winding order
#[inline]
pub fn triangle_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a)
}

/// Corner used as the tangent direction of the frame at `p`.
///
/// The corner furthest from `p` is chosen so the tangent never collapses
/// when `p` sits on a vertex.
pub fn triangle_tangent_corner(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> u8 {
    let distances = [p.distance_squared(a), p.distance_squared(b), p.distance_squared(c)];
    let mut best = 0;
    for i in 1..3 {
        if distances[i] > distances[best] {
            best = i;
        }
    }
    best as u8
}

/// Orthonormal frame anchored at `p` on triangle `a`, `b`, `c`.
///
/// Columns: tangent (towards `tangent_corner`), bitangent, unit normal,
/// origin `p`.
pub fn triangle_frame(p: Vec3, a: Vec3, b: Vec3, c: Vec3, tangent_corner: u8) -> Mat4 {
    let corner = match tangent_corner {
        0 => a,
        1 => b,
        _ => c,
    };

    let mut normal = triangle_normal(a, b, c).normalize_or_zero();
    let raw_tangent = (corner - p).normalize_or_zero();

    if normal == Vec3::ZERO {
        normal = if raw_tangent == Vec3::ZERO {
            Vec3::Z
        } else {
            raw_tangent.any_orthonormal_vector()
        };
    }

    let mut tangent = (raw_tangent - normal * raw_tangent.dot(normal)).normalize_or_zero();
    if tangent == Vec3::ZERO {
        tangent = normal.any_orthonormal_vector();
    }
    let bitangent = normal.cross(tangent);

    Mat4::from_cols(
        tangent.extend(0.0),
        bitangent.extend(0.0),
        normal.extend(0.0),
        p.extend(1.0),
    )
}

/// Inverse-distance weights of `points` as seen from `p`.
///
/// `weight_i = 1 / (distance_i^(2σ) + ε)`, normalized to sum to 1. A point
/// coincident with `p` takes the full weight.
pub fn inverse_distance_weights(p: Vec3, points: &[Vec3], sigma: f32) -> Vec<f32> {
    let mut weights = vec![0.0f32; points.len()];

    if let Some(index) = points
        .iter()
        .position(|q| q.distance(p) < COINCIDENT_DISTANCE)
    {
        weights[index] = 1.0;
        return weights;
    }

    for (weight, q) in weights.iter_mut().zip(points) {
        *weight = 1.0 / (q.distance_squared(p).powf(sigma) + WEIGHT_EPSILON);
    }

    let total: f32 = weights.iter().sum();
    if total > 0.0 && total.is_finite() {
        for weight in &mut weights {
            *weight /= total;
        }
    } else if !weights.is_empty() {
        // Every weight underflowed: fall back to an even split
        let even = 1.0 / weights.len() as f32;
        weights.fill(even);
    }

    weights
}
