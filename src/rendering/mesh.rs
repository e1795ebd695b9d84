use glam::Vec4;

// Unit UV sphere for the collider draw. Positions double as normals.

/// Ring-and-meridian wireframe: `stacks + 1` rings of `slices` vertices.
pub(crate) fn uv_sphere_wire(stacks: u32, slices: u32) -> (Vec<Vec4>, Vec<u32>) {
    let mut positions = Vec::with_capacity(((stacks + 1) * slices) as usize);
    for i in 0..=stacks {
        let phi = std::f32::consts::PI * i as f32 / stacks as f32;
        for j in 0..slices {
            let theta = std::f32::consts::TAU * j as f32 / slices as f32;
            positions.push(Vec4::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin(), 1.0));
        }
    }

    let vid = |i: u32, j: u32| i * slices + (j % slices);
    let mut lines = Vec::new();
    for i in 0..=stacks {
        for j in 0..slices {
            lines.extend_from_slice(&[vid(i, j), vid(i, j + 1)]);
        }
    }
    for i in 0..stacks {
        for j in 0..slices {
            lines.extend_from_slice(&[vid(i, j), vid(i + 1, j)]);
        }
    }

    (positions, lines)
}

/// Triangle surface with a duplicated seam column (`slices + 1` per ring).
pub(crate) fn uv_sphere_triangles(stacks: u32, slices: u32) -> (Vec<Vec4>, Vec<u32>) {
    let stride = slices + 1;
    let mut positions = Vec::with_capacity(((stacks + 1) * stride) as usize);
    for i in 0..=stacks {
        let phi = std::f32::consts::PI * i as f32 / stacks as f32;
        for j in 0..=slices {
            let theta = std::f32::consts::TAU * j as f32 / slices as f32;
            positions.push(Vec4::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin(), 1.0));
        }
    }

    let mut triangles = Vec::with_capacity((stacks * slices * 6) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * stride + j;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            triangles.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    (positions, triangles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4Swizzles;

    #[test]
    fn sphere_vertices_are_on_unit_sphere() {
        let (positions, _) = uv_sphere_triangles(8, 16);
        assert!(positions.iter().all(|p| (p.xyz().length() - 1.0).abs() < 1e-5));
    }

    #[test]
    fn index_counts() {
        let (positions, lines) = uv_sphere_wire(4, 8);
        assert_eq!(positions.len(), 5 * 8);
        assert_eq!(lines.len(), (5 * 8 + 4 * 8) * 2);

        let (positions, triangles) = uv_sphere_triangles(4, 8);
        assert_eq!(positions.len(), 5 * 9);
        assert_eq!(triangles.len(), 4 * 8 * 6);
        assert!(triangles.iter().all(|&i| (i as usize) < positions.len()));
    }
}
