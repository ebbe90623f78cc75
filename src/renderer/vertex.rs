//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex with position and color, laid out for a GPU vertex buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    /// Bytes per vertex (stride of the buffer)
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();

    /// View a vertex slice as raw bytes for upload
    pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
        bytemuck::cast_slice(vertices)
    }
}

/// Convert 0xRRGGBB to linear-ish RGBA floats
pub fn rgb(hex: u32, alpha: f32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        alpha,
    ]
}

/// Fixed colors for game elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.0, 0.0, 0.02, 1.0];
    pub const PADDLE: [f32; 4] = [0.0, 1.0, 1.0, 1.0];
    /// Inner band showing a tough brick still has two hits
    pub const TOUGH_CORE: [f32; 4] = [1.0, 1.0, 1.0, 0.35];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_channels() {
        assert_eq!(rgb(0xff0000, 1.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(rgb(0x00ff00, 0.5), [0.0, 1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_byte_view() {
        let verts = [Vertex::new(1.0, 2.0, [0.0; 4]); 3];
        assert_eq!(Vertex::as_bytes(&verts).len(), 3 * Vertex::STRIDE);
        assert_eq!(Vertex::STRIDE, 24);
    }
}
