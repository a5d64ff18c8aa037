use anyhow::{Context, Result};
use cgmath::{Deg, Matrix4, Vector3};
use glium::texture::Texture2d;
use glium::{Display, DrawParameters, Frame};

use crate::app::{FrameTime, Recipe};
use crate::config::AppConfig;
use crate::mat_helpers::mat4_array;
use crate::mesh::{ColorVertex, Mesh};
use crate::shaders::{ShaderProgram, UniformSet};
use crate::texture::sampler_behavior;

use super::load_shader;
use super::textures::{load_pair, DEFAULT_MIX};

pub const TITLE: &str = "GL Cook Book - Transform";

/// Degrees per second.
const SPIN_RATE: f32 = 100.0;
const OFFSETS: [[f32; 2]; 2] = [[0.75, -0.75], [-0.75, 0.75]];

pub struct Transform {
    quad: Mesh<ColorVertex>,
    shader: ShaderProgram,
    container: Texture2d,
    face: Texture2d,
}

pub fn build(display: &Display, config: &AppConfig) -> Result<Box<dyn Recipe>> {
    let shader = load_shader(display, config, "textured", "textured")?;
    let quad = Mesh::quad(display).context("uploading quad")?;
    let (container, face) = load_pair(display, config)?;
    Ok(Box::new(Transform {
        quad,
        shader,
        container,
        face,
    }))
}

/// Spins around z at the origin, after halving and pushing out by `offset`.
pub fn quad_transform(elapsed: f32, offset: [f32; 2]) -> Matrix4<f32> {
    Matrix4::from_angle_z(Deg(elapsed * SPIN_RATE))
        * Matrix4::from_scale(0.5)
        * Matrix4::from_translation(Vector3::new(offset[0], offset[1], 0.0))
}

impl Recipe for Transform {
    fn title(&self) -> &str {
        TITLE
    }

    fn draw(&self, target: &mut Frame, frame: &FrameTime) -> Result<()> {
        let sampler = sampler_behavior();
        let base = UniformSet::new()
            .texture("texture1", &self.container, sampler)
            .texture("texture2", &self.face, sampler)
            .float("mix_ratio", DEFAULT_MIX)
            .float("tint", 0.0);
        for offset in OFFSETS.iter() {
            let uniforms = base
                .clone()
                .mat4("transform", mat4_array(&quad_transform(frame.elapsed, *offset)));
            self.quad
                .draw(target, self.shader.program(), &uniforms, &DrawParameters::default())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn quads_start_in_opposite_corners() {
        let first = quad_transform(0.0, OFFSETS[0]) * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let second = quad_transform(0.0, OFFSETS[1]) * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((first.x - 0.375).abs() < 1e-6 && (first.y + 0.375).abs() < 1e-6);
        assert!((second.x + 0.375).abs() < 1e-6 && (second.y - 0.375).abs() < 1e-6);
    }

    #[test]
    fn quads_orbit_the_origin() {
        // a quarter turn after 0.9 s at 100 degrees per second
        let centre = quad_transform(0.9, OFFSETS[0]) * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((centre.x - 0.375).abs() < 1e-5);
        assert!((centre.y - 0.375).abs() < 1e-5);
    }
}
