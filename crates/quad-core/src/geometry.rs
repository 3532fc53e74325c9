/// How the vertex list is assembled into triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
    TriangleStrip,
}

/// A fixed list of vertex positions, uploaded once and never updated.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    positions: &'static [f32],
    components: u32,
    topology: Topology,
}

/// Full-screen quad, drawn as a 4-vertex strip.
pub const QUAD: Geometry = Geometry {
    positions: &[
        1.0, -1.0, //
        1.0, 1.0, //
        -1.0, -1.0, //
        -1.0, 1.0,
    ],
    components: 2,
    topology: Topology::TriangleStrip,
};

/// A single triangle four units in front of the camera.
pub const TRIANGLE: Geometry = Geometry {
    positions: &[
        0.0, 1.0, -4.0, //
        -1.0, -1.0, -4.0, //
        1.0, -1.0, -4.0,
    ],
    components: 3,
    topology: Topology::TriangleList,
};

impl Geometry {
    pub fn positions(&self) -> &'static [f32] {
        self.positions
    }

    /// Floats per vertex (2 or 3).
    pub fn components(&self) -> u32 {
        self.components
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn vertex_count(&self) -> u32 {
        self.positions.len() as u32 / self.components
    }
}
