use anyhow::{Context, Result};
use glium::uniforms::EmptyUniforms;
use glium::{Display, DrawParameters, Frame};

use crate::app::{FrameTime, Recipe};
use crate::config::AppConfig;
use crate::mesh::{ColorVertex, Mesh};
use crate::shaders::ShaderProgram;

use super::load_shader;

pub const TITLE: &str = "GL Cook Book - Triangle";

pub struct Triangle {
    mesh: Mesh<ColorVertex>,
    shader: ShaderProgram,
}

pub fn build(display: &Display, config: &AppConfig) -> Result<Box<dyn Recipe>> {
    let shader = load_shader(display, config, "triangle", "triangle")?;
    let mesh = Mesh::triangle(display).context("uploading triangle")?;
    Ok(Box::new(Triangle { mesh, shader }))
}

impl Recipe for Triangle {
    fn title(&self) -> &str {
        TITLE
    }

    fn draw(&self, target: &mut Frame, _frame: &FrameTime) -> Result<()> {
        self.mesh
            .draw(target, self.shader.program(), &EmptyUniforms, &DrawParameters::default())?;
        Ok(())
    }
}
