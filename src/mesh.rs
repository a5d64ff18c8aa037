use glium::index::{NoIndices, PrimitiveType};
use glium::uniforms::Uniforms;
use glium::{implement_vertex, Display, DrawError, DrawParameters, IndexBuffer, Program, Surface, VertexBuffer};

use crate::error::ResourceError;

/// Position, normal and texture coordinate, the layout every lit recipe uses.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

implement_vertex!(Vertex, position, normal, tex_coords);

/// Per-vertex color, used by the unlit triangle and texture recipes.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub tex_coords: [f32; 2],
}

implement_vertex!(ColorVertex, position, color, tex_coords);

pub const LIT_STRIDE: usize = 8;
pub const COLOR_STRIDE: usize = 6;
pub const COLOR_UV_STRIDE: usize = 8;

fn check_stride(data: &[f32], stride: usize) -> Result<(), ResourceError> {
    if data.is_empty() || data.len() % stride != 0 {
        return Err(ResourceError::VertexLayout {
            len: data.len(),
            stride,
        });
    }
    Ok(())
}

/// Splits `x y z nx ny nz u v` rows into vertices.
pub fn lit_vertices(data: &[f32]) -> Result<Vec<Vertex>, ResourceError> {
    check_stride(data, LIT_STRIDE)?;
    Ok(data
        .chunks_exact(LIT_STRIDE)
        .map(|c| Vertex {
            position: [c[0], c[1], c[2]],
            normal: [c[3], c[4], c[5]],
            tex_coords: [c[6], c[7]],
        })
        .collect())
}

/// Splits `x y z r g b` rows, or `x y z r g b u v` rows when `textured`.
pub fn colored_vertices(data: &[f32], textured: bool) -> Result<Vec<ColorVertex>, ResourceError> {
    let stride = if textured { COLOR_UV_STRIDE } else { COLOR_STRIDE };
    check_stride(data, stride)?;
    Ok(data
        .chunks_exact(stride)
        .map(|c| ColorVertex {
            position: [c[0], c[1], c[2]],
            color: [c[3], c[4], c[5]],
            tex_coords: if textured { [c[6], c[7]] } else { [0.0, 0.0] },
        })
        .collect())
}

/// Vertex buffer plus optional index buffer, uploaded once.
pub struct Mesh<V: Copy> {
    vertices: VertexBuffer<V>,
    indices: Option<IndexBuffer<u32>>,
}

impl<V: glium::Vertex> Mesh<V> {
    pub fn new(display: &Display, vertices: &[V], indices: Option<&[u32]>) -> Result<Self, ResourceError> {
        let vertices = VertexBuffer::new(display, vertices)?;
        let indices = match indices {
            Some(indices) => Some(IndexBuffer::new(display, PrimitiveType::TrianglesList, indices)?),
            None => None,
        };
        Ok(Mesh { vertices, indices })
    }

    pub fn draw<S: Surface, U: Uniforms>(
        &self,
        target: &mut S,
        program: &Program,
        uniforms: &U,
        params: &DrawParameters<'_>,
    ) -> Result<(), DrawError> {
        match &self.indices {
            Some(indices) => target.draw(&self.vertices, indices, program, uniforms, params),
            None => target.draw(
                &self.vertices,
                NoIndices(PrimitiveType::TrianglesList),
                program,
                uniforms,
                params,
            ),
        }
    }
}

impl Mesh<Vertex> {
    pub fn cube(display: &Display) -> Result<Self, ResourceError> {
        Mesh::new(display, &lit_vertices(&CUBE_VERTICES)?, None)
    }
}

impl Mesh<ColorVertex> {
    pub fn triangle(display: &Display) -> Result<Self, ResourceError> {
        Mesh::new(display, &colored_vertices(&TRIANGLE_VERTICES, false)?, None)
    }

    pub fn quad(display: &Display) -> Result<Self, ResourceError> {
        Mesh::new(
            display,
            &colored_vertices(&QUAD_VERTICES, true)?,
            Some(&QUAD_INDICES[..]),
        )
    }
}

pub fn depth_tested<'a>() -> DrawParameters<'a> {
    DrawParameters {
        depth: glium::Depth {
            test: glium::draw_parameters::DepthTest::IfLess,
            write: true,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[rustfmt::skip]
pub const TRIANGLE_VERTICES: [f32; 18] = [
    // positions        // colors
     0.5, -0.5, 0.0,    1.0, 0.0, 0.0,
    -0.5, -0.5, 0.0,    0.0, 1.0, 0.0,
     0.0,  0.5, 0.0,    0.0, 0.0, 1.0,
];

#[rustfmt::skip]
pub const QUAD_VERTICES: [f32; 32] = [
    // positions        // colors          // uv
     0.5,  0.5, 0.0,    1.0, 0.0, 0.0,     1.0, 1.0,
     0.5, -0.5, 0.0,    0.0, 1.0, 0.0,     1.0, 0.0,
    -0.5, -0.5, 0.0,    0.0, 0.0, 1.0,     0.0, 0.0,
    -0.5,  0.5, 0.0,    1.0, 1.0, 0.0,     0.0, 1.0,
];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

#[rustfmt::skip]
pub const CUBE_VERTICES: [f32; 288] = [
    // positions          // normals          // uv
    -0.5, -0.5, -0.5,     0.0,  0.0, -1.0,    0.0, 0.0,
     0.5, -0.5, -0.5,     0.0,  0.0, -1.0,    1.0, 0.0,
     0.5,  0.5, -0.5,     0.0,  0.0, -1.0,    1.0, 1.0,
     0.5,  0.5, -0.5,     0.0,  0.0, -1.0,    1.0, 1.0,
    -0.5,  0.5, -0.5,     0.0,  0.0, -1.0,    0.0, 1.0,
    -0.5, -0.5, -0.5,     0.0,  0.0, -1.0,    0.0, 0.0,

    -0.5, -0.5,  0.5,     0.0,  0.0,  1.0,    0.0, 0.0,
     0.5, -0.5,  0.5,     0.0,  0.0,  1.0,    1.0, 0.0,
     0.5,  0.5,  0.5,     0.0,  0.0,  1.0,    1.0, 1.0,
     0.5,  0.5,  0.5,     0.0,  0.0,  1.0,    1.0, 1.0,
    -0.5,  0.5,  0.5,     0.0,  0.0,  1.0,    0.0, 1.0,
    -0.5, -0.5,  0.5,     0.0,  0.0,  1.0,    0.0, 0.0,

    -0.5,  0.5,  0.5,    -1.0,  0.0,  0.0,    1.0, 0.0,
    -0.5,  0.5, -0.5,    -1.0,  0.0,  0.0,    1.0, 1.0,
    -0.5, -0.5, -0.5,    -1.0,  0.0,  0.0,    0.0, 1.0,
    -0.5, -0.5, -0.5,    -1.0,  0.0,  0.0,    0.0, 1.0,
    -0.5, -0.5,  0.5,    -1.0,  0.0,  0.0,    0.0, 0.0,
    -0.5,  0.5,  0.5,    -1.0,  0.0,  0.0,    1.0, 0.0,

     0.5,  0.5,  0.5,     1.0,  0.0,  0.0,    1.0, 0.0,
     0.5,  0.5, -0.5,     1.0,  0.0,  0.0,    1.0, 1.0,
     0.5, -0.5, -0.5,     1.0,  0.0,  0.0,    0.0, 1.0,
     0.5, -0.5, -0.5,     1.0,  0.0,  0.0,    0.0, 1.0,
     0.5, -0.5,  0.5,     1.0,  0.0,  0.0,    0.0, 0.0,
     0.5,  0.5,  0.5,     1.0,  0.0,  0.0,    1.0, 0.0,

    -0.5, -0.5, -0.5,     0.0, -1.0,  0.0,    0.0, 1.0,
     0.5, -0.5, -0.5,     0.0, -1.0,  0.0,    1.0, 1.0,
     0.5, -0.5,  0.5,     0.0, -1.0,  0.0,    1.0, 0.0,
     0.5, -0.5,  0.5,     0.0, -1.0,  0.0,    1.0, 0.0,
    -0.5, -0.5,  0.5,     0.0, -1.0,  0.0,    0.0, 0.0,
    -0.5, -0.5, -0.5,     0.0, -1.0,  0.0,    0.0, 1.0,

    -0.5,  0.5, -0.5,     0.0,  1.0,  0.0,    0.0, 1.0,
     0.5,  0.5, -0.5,     0.0,  1.0,  0.0,    1.0, 1.0,
     0.5,  0.5,  0.5,     0.0,  1.0,  0.0,    1.0, 0.0,
     0.5,  0.5,  0.5,     0.0,  1.0,  0.0,    1.0, 0.0,
    -0.5,  0.5,  0.5,     0.0,  1.0,  0.0,    0.0, 0.0,
    -0.5,  0.5, -0.5,     0.0,  1.0,  0.0,    0.0, 1.0,
];

pub const CUBE_POSITIONS: [[f32; 3]; 10] = [
    [0.0, 0.0, 0.0],
    [2.0, 5.0, -15.0],
    [-1.5, -2.2, -2.5],
    [-3.8, -2.0, -12.3],
    [2.4, -0.4, -3.5],
    [-1.7, 3.0, -7.5],
    [1.3, -2.0, -2.5],
    [1.5, 2.0, -2.5],
    [1.5, 0.2, -1.5],
    [-1.3, 1.0, -1.5],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_36_unit_normal_vertices() {
        let vertices = lit_vertices(&CUBE_VERTICES).unwrap();
        assert_eq!(vertices.len(), 36);
        for v in &vertices {
            let n = v.normal;
            assert_eq!(n[0] * n[0] + n[1] * n[1] + n[2] * n[2], 1.0);
            assert!(v.position.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn interleaved_fields_land_in_order() {
        let vertices = lit_vertices(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]).unwrap();
        assert_eq!(
            vertices[0],
            Vertex {
                position: [1.0, 2.0, 3.0],
                normal: [4.0, 5.0, 6.0],
                tex_coords: [7.0, 8.0],
            }
        );
    }

    #[test]
    fn ragged_data_is_rejected() {
        match lit_vertices(&[0.0; 12]) {
            Err(ResourceError::VertexLayout { len, stride }) => assert_eq!((len, stride), (12, 8)),
            other => panic!("unexpected {:?}", other.map(|v| v.len())),
        }
        assert!(colored_vertices(&[], false).is_err());
    }

    #[test]
    fn triangle_colors_are_primaries() {
        let vertices = colored_vertices(&TRIANGLE_VERTICES, false).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0].color, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[2].tex_coords, [0.0, 0.0]);
    }

    #[test]
    fn quad_indices_address_four_corners() {
        let vertices = colored_vertices(&QUAD_VERTICES, true).unwrap();
        assert_eq!(vertices.len(), 4);
        assert!(QUAD_INDICES.iter().all(|&i| (i as usize) < vertices.len()));
        assert_eq!(vertices[0].tex_coords, [1.0, 1.0]);
    }
}
