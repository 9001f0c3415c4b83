//! UV sphere generation for the planet, cloud and atmosphere shells.

use glam::{Mat4, Vec3};
use terra_render::VertexPositionNormalUv;

/// Unit UV sphere with equirectangular texture coordinates.
///
/// Longitude runs from the -X axis through +Z, so `u = 0.5` faces -X; V is 0 at the north pole.
pub struct SphereMesh {
    pub vertices: Vec<VertexPositionNormalUv>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Generate a unit sphere with `width_segments` around and `height_segments` pole to pole.
///
/// Segment counts are clamped to at least 3 and 2. Each ring carries a duplicate seam
/// vertex so U runs cleanly from 0 to 1; pole triangles are emitted once, not as slivers.
pub fn generate_uv_sphere(width_segments: u32, height_segments: u32) -> SphereMesh {
    let width = width_segments.max(3);
    let height = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((width + 1) * (height + 1)) as usize);
    for iy in 0..=height {
        let v = iy as f32 / height as f32;
        let theta = v * std::f32::consts::PI;
        for ix in 0..=width {
            let u = ix as f32 / width as f32;
            let phi = u * std::f32::consts::TAU;

            let position = Vec3::new(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            );
            vertices.push(VertexPositionNormalUv {
                position: position.to_array(),
                normal: position.normalize_or_zero().to_array(),
                uv: [u, v],
            });
        }
    }

    let stride = width + 1;
    let mut indices = Vec::with_capacity((width * (height - 1) * 6) as usize);
    for iy in 0..height {
        for ix in 0..width {
            let a = iy * stride + ix + 1;
            let b = iy * stride + ix;
            let c = (iy + 1) * stride + ix;
            let d = (iy + 1) * stride + ix + 1;

            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    SphereMesh { vertices, indices }
}

/// Model matrix for a shell of `radius` spun `rotation_y` radians about +Y.
pub fn shell_model_matrix(radius: f32, rotation_y: f32) -> Mat4 {
    Mat4::from_rotation_y(rotation_y) * Mat4::from_scale(Vec3::splat(radius))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertices_on_unit_sphere() {
        let mesh = generate_uv_sphere(32, 16);
        for v in &mesh.vertices {
            let len = Vec3::from_array(v.position).length();
            assert!((len - 1.0).abs() < 1e-5, "vertex off the unit sphere: {len}");
        }
    }

    #[test]
    fn test_vertex_and_triangle_counts() {
        let mesh = generate_uv_sphere(128, 64);
        assert_eq!(mesh.vertices.len(), 129 * 65);
        // Two triangles per quad, minus one per quad on each pole ring.
        assert_eq!(mesh.triangle_count(), 128 * 64 * 2 - 2 * 128);
    }

    #[test]
    fn test_indices_in_bounds() {
        let mesh = generate_uv_sphere(64, 32);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn test_uvs_in_range() {
        let mesh = generate_uv_sphere(32, 16);
        for v in &mesh.vertices {
            assert!((0.0..=1.0).contains(&v.uv[0]));
            assert!((0.0..=1.0).contains(&v.uv[1]));
        }
    }

    #[test]
    fn test_north_pole_at_v_zero() {
        let mesh = generate_uv_sphere(8, 4);
        let first = mesh.vertices[0];
        assert_eq!(first.uv[1], 0.0);
        assert!((first.position[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_triangles_face_outward() {
        let mesh = generate_uv_sphere(16, 8);
        for tri in mesh.indices.chunks(3) {
            let p = |i: u32| Vec3::from_array(mesh.vertices[i as usize].position);
            let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
            let face_normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(
                face_normal.dot(centroid) > 0.0,
                "triangle {tri:?} winds inward"
            );
        }
    }

    #[test]
    fn test_degenerate_segments_are_clamped() {
        let mesh = generate_uv_sphere(0, 0);
        assert_eq!(mesh.vertices.len(), 4 * 3);
        assert!(mesh.triangle_count() > 0);
    }

    #[test]
    fn test_shell_model_matrix_scales_and_spins() {
        let m = shell_model_matrix(1.5, std::f32::consts::FRAC_PI_2);
        let p = m.transform_point3(Vec3::X);
        assert!((p.length() - 1.5).abs() < 1e-5);
        assert!((p - Vec3::new(0.0, 0.0, -1.5)).length() < 1e-5);
    }
}
