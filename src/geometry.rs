//! Full-screen quad geometry and texture-coordinate sets.
//!
//! Every stage draws a single quad. The quad is described by four vertex
//! positions in clip space and four matching texture coordinates, both in
//! triangle-strip order:
//!
//! ```text
//!  2 ──── 3        (-1, 1) ──── (1, 1)
//!  │ ╲    │           │   ╲       │
//!  │   ╲  │           │     ╲     │
//!  0 ──── 1        (-1,-1) ──── (1,-1)
//! ```
//!
//! Texture coordinates follow the classic convention where `v = 1` addresses
//! the bottom of the source image, so [`TexCoords::NO_ROTATION`] shows an
//! uploaded image upright.

/// Four clip-space vertex positions in triangle-strip order.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Quad {
    pub vertices: [[f32; 2]; 4],
}

impl Quad {
    /// The canonical quad covering the whole target.
    pub const CUBE: Self = Self {
        vertices: [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]],
    };

    /// Returns the quad mirrored across the horizontal axis.
    ///
    /// Used when drawing into a target with a bottom-left origin.
    pub fn flipped_y(&self) -> Self {
        let mut out = *self;
        for vertex in &mut out.vertices {
            vertex[1] = -vertex[1];
        }
        out
    }

    /// Interleaves positions with `tex_coords` into GPU vertices.
    pub fn with_tex_coords(&self, tex_coords: &TexCoords) -> [QuadVertex; 4] {
        std::array::from_fn(|i| QuadVertex {
            position: self.vertices[i],
            tex_coord: tex_coords.coords[i],
        })
    }
}

impl Default for Quad {
    fn default() -> Self {
        Self::CUBE
    }
}

/// Four texture coordinates matching the vertices of a [`Quad`].
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TexCoords {
    pub coords: [[f32; 2]; 4],
}

impl TexCoords {
    pub const NO_ROTATION: Self = Self {
        coords: [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]],
    };

    pub const ROTATED_90: Self = Self {
        coords: [[1.0, 1.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]],
    };

    pub const ROTATED_180: Self = Self {
        coords: [[1.0, 0.0], [0.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
    };

    pub const ROTATED_270: Self = Self {
        coords: [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]],
    };

    /// Coordinates for `rotation`, optionally mirrored on either axis.
    ///
    /// Mirroring maps each component `c` to `1 - c`.
    pub fn rotated(rotation: Rotation, flip_horizontal: bool, flip_vertical: bool) -> Self {
        let mut out = match rotation {
            Rotation::Normal => Self::NO_ROTATION,
            Rotation::Rotate90 => Self::ROTATED_90,
            Rotation::Rotate180 => Self::ROTATED_180,
            Rotation::Rotate270 => Self::ROTATED_270,
        };
        if flip_horizontal {
            out = out.flipped_horizontally();
        }
        if flip_vertical {
            out = out.flipped_vertically();
        }
        out
    }

    pub fn flipped_horizontally(&self) -> Self {
        let mut out = *self;
        for coord in &mut out.coords {
            coord[0] = 1.0 - coord[0];
        }
        out
    }

    pub fn flipped_vertically(&self) -> Self {
        let mut out = *self;
        for coord in &mut out.coords {
            coord[1] = 1.0 - coord[1];
        }
        out
    }
}

impl Default for TexCoords {
    fn default() -> Self {
        Self::NO_ROTATION
    }
}

/// Image rotation in 90 degree steps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    Normal,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Rotation {
    /// Maps a multiple of 90 degrees (any sign) to a rotation.
    /// Returns `None` for angles that are not a multiple of 90.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        Some(match degrees.rem_euclid(360) {
            0 => Rotation::Normal,
            90 => Rotation::Rotate90,
            180 => Rotation::Rotate180,
            _ => Rotation::Rotate270,
        })
    }
}

/// Interleaved vertex uploaded for a quad draw.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

impl QuadVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

    /// Vertex buffer layout matching `@location(0) position`, `@location(1) tex_coord`.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}
