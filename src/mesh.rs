// mesh.rs: UV sphere used as the panorama display surface

use std::f32::consts::PI;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl SphereVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub radius: f32,
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
}

/// Builds an outward-facing sphere. `lat` rings from the north pole (+Y) to
/// the south pole, `lon` segments around the Y axis.
///
/// UVs use the wgpu convention: `v = 0` is the top row of the image.
pub fn build_sphere(radius: f32, lat: usize, lon: usize) -> SphereMesh {
    let mut vertices = Vec::with_capacity((lat + 1) * (lon + 1));
    let mut indices = Vec::with_capacity(lat * lon * 6);

    for i in 0..=lat {
        let v = i as f32 / lat as f32;
        let theta = PI * v;
        let y = radius * theta.cos();
        let sin_t = theta.sin();

        for j in 0..=lon {
            let u = j as f32 / lon as f32;
            let phi = 2.0 * PI * u;

            let x = -radius * phi.cos() * sin_t;
            let z = radius * phi.sin() * sin_t;

            vertices.push(SphereVertex {
                position: [x, y, z],
                uv: [u, v],
            });
        }
    }

    for i in 0..lat {
        for j in 0..lon {
            let a = (i * (lon + 1) + j) as u32;
            let b = a + (lon + 1) as u32;

            indices.extend_from_slice(&[
                a, b, a + 1,
                b, b + 1, a + 1,
            ]);
        }
    }

    SphereMesh {
        radius,
        vertices,
        indices,
    }
}

impl SphereMesh {
    /// Mirrors the sphere on X. The mirror reverses every triangle's
    /// handedness, so the counter-clockwise faces now point at the centre and
    /// the texture reads left to right from inside.
    pub fn inverted(mut self) -> Self {
        for vertex in &mut self.vertices {
            vertex.position[0] = -vertex.position[0];
        }
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}
