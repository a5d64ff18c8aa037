use anyhow::{Context, Result};
use cgmath::{Matrix4, SquareMatrix};
use glium::texture::Texture2d;
use glium::{Display, DrawParameters, Frame};
use imgui_glium_renderer::imgui::Ui;
use log::debug;
use winit::event::VirtualKeyCode;
use winit_input_helper::WinitInputHelper;

use crate::app::{FrameTime, Recipe};
use crate::config::AppConfig;
use crate::mat_helpers::mat4_array;
use crate::mesh::{ColorVertex, Mesh};
use crate::shaders::{ShaderProgram, UniformSet};
use crate::texture::{load_texture, sampler_behavior};

use super::load_shader;

pub const TITLE: &str = "GL Cook Book - Textures";

pub const DEFAULT_MIX: f32 = 0.2;
/// Mix change per second while Up or Down is held.
const MIX_RATE: f32 = 1.0;

pub struct Textures {
    quad: Mesh<ColorVertex>,
    shader: ShaderProgram,
    container: Texture2d,
    face: Texture2d,
    mix_ratio: f32,
}

/// The container and face textures shared with the transform recipe.
pub(crate) fn load_pair(display: &Display, config: &AppConfig) -> Result<(Texture2d, Texture2d)> {
    let container = load_texture(display, config.asset("textures/container.jpg")).context("loading container texture")?;
    let face = load_texture(display, config.asset("textures/awesomeface.png")).context("loading face texture")?;
    Ok((container, face))
}

pub fn build(display: &Display, config: &AppConfig) -> Result<Box<dyn Recipe>> {
    let shader = load_shader(display, config, "textured", "textured")?;
    let quad = Mesh::quad(display).context("uploading quad")?;
    let (container, face) = load_pair(display, config)?;
    Ok(Box::new(Textures {
        quad,
        shader,
        container,
        face,
        mix_ratio: DEFAULT_MIX,
    }))
}

/// Up and Down held together cancel out.
pub fn step_mix(current: f32, up: bool, down: bool, delta: f32) -> f32 {
    let next = match (up, down) {
        (true, false) => current + MIX_RATE * delta,
        (false, true) => current - MIX_RATE * delta,
        _ => current,
    };
    next.max(0.0).min(1.0)
}

impl Recipe for Textures {
    fn title(&self) -> &str {
        TITLE
    }

    fn update(&mut self, input: &WinitInputHelper, frame: &FrameTime) {
        let next = step_mix(
            self.mix_ratio,
            input.key_held(VirtualKeyCode::Up),
            input.key_held(VirtualKeyCode::Down),
            frame.delta,
        );
        if (next - self.mix_ratio).abs() > f32::EPSILON {
            debug!("texture mix {:.2}", next);
        }
        self.mix_ratio = next;
    }

    fn draw(&self, target: &mut Frame, _frame: &FrameTime) -> Result<()> {
        let sampler = sampler_behavior();
        let uniforms = UniformSet::new()
            .mat4("transform", mat4_array(&Matrix4::identity()))
            .texture("texture1", &self.container, sampler)
            .texture("texture2", &self.face, sampler)
            .float("mix_ratio", self.mix_ratio)
            .float("tint", 1.0);
        self.quad
            .draw(target, self.shader.program(), &uniforms, &DrawParameters::default())?;
        Ok(())
    }

    fn overlay(&self, ui: &Ui) {
        ui.text(format!("mix {:.2} (Up/Down)", self.mix_ratio));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix_moves_with_held_keys() {
        assert!((step_mix(0.2, true, false, 0.1) - 0.3).abs() < 1e-6);
        assert!((step_mix(0.2, false, true, 0.1) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn both_keys_leave_mix_untouched() {
        assert_eq!(step_mix(0.2, true, true, 0.1), 0.2);
        assert_eq!(step_mix(0.7, true, true, 0.016), 0.7);
        assert_eq!(step_mix(0.2, false, false, 0.1), 0.2);
    }

    #[test]
    fn mix_stays_in_unit_range() {
        assert_eq!(step_mix(0.95, true, false, 1.0), 1.0);
        assert_eq!(step_mix(0.05, false, true, 1.0), 0.0);
    }
}
