use glam::Vec3;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Debug, Clone)]
pub struct MeshData {
    /// 9 floats per vertex: position(3) + normal(3) + color(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

const STRIDE: usize = 9;

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * STRIDE;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        let base = index * STRIDE + 3;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    pub fn color(&self, index: usize) -> [f32; 3] {
        let base = index * STRIDE + 6;
        [
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        ]
    }

    /// Corner vertex indices of triangle `tri`
    pub fn triangle(&self, tri: usize) -> [usize; 3] {
        [
            self.indices[tri * 3] as usize,
            self.indices[tri * 3 + 1] as usize,
            self.indices[tri * 3 + 2] as usize,
        ]
    }

    /// Corner positions of triangle `tri`
    pub fn triangle_positions(&self, tri: usize) -> [Vec3; 3] {
        self.triangle(tri).map(|i| self.position(i))
    }
}

/// Axis-aligned box centered at `center`
pub fn cuboid(center: Vec3, size: Vec3, color: [f32; 3]) -> MeshData {
    let h = size * 0.5;
    let c = center;

    let faces: [([Vec3; 4], Vec3); 6] = [
        // Front (+Z)
        ([Vec3::new(-h.x, -h.y, h.z), Vec3::new(h.x, -h.y, h.z), Vec3::new(h.x, h.y, h.z), Vec3::new(-h.x, h.y, h.z)], Vec3::Z),
        // Back (-Z)
        ([Vec3::new(h.x, -h.y, -h.z), Vec3::new(-h.x, -h.y, -h.z), Vec3::new(-h.x, h.y, -h.z), Vec3::new(h.x, h.y, -h.z)], Vec3::NEG_Z),
        // Right (+X)
        ([Vec3::new(h.x, -h.y, h.z), Vec3::new(h.x, -h.y, -h.z), Vec3::new(h.x, h.y, -h.z), Vec3::new(h.x, h.y, h.z)], Vec3::X),
        // Left (-X)
        ([Vec3::new(-h.x, -h.y, -h.z), Vec3::new(-h.x, -h.y, h.z), Vec3::new(-h.x, h.y, h.z), Vec3::new(-h.x, h.y, -h.z)], Vec3::NEG_X),
        // Top (+Y)
        ([Vec3::new(-h.x, h.y, h.z), Vec3::new(h.x, h.y, h.z), Vec3::new(h.x, h.y, -h.z), Vec3::new(-h.x, h.y, -h.z)], Vec3::Y),
        // Bottom (-Y)
        ([Vec3::new(-h.x, -h.y, -h.z), Vec3::new(h.x, -h.y, -h.z), Vec3::new(h.x, -h.y, h.z), Vec3::new(-h.x, -h.y, h.z)], Vec3::NEG_Y),
    ];

    let mut vertices = Vec::with_capacity(24 * STRIDE);
    let mut indices = Vec::with_capacity(36);

    for (quad, normal) in &faces {
        let base = (vertices.len() / STRIDE) as u32;
        for v in quad {
            let p = c + *v;
            vertices.extend_from_slice(&[p.x, p.y, p.z, normal.x, normal.y, normal.z, color[0], color[1], color[2]]);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData { vertices, indices }
}
