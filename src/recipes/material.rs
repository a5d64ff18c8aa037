use anyhow::{Context, Result};
use cgmath::Vector3;
use glium::{Display, Frame};
use imgui_glium_renderer::imgui::Ui;
use log::debug;
use winit::event::VirtualKeyCode;
use winit_input_helper::WinitInputHelper;

use crate::app::{FrameTime, Recipe};
use crate::camera::FlyCamera;
use crate::config::AppConfig;
use crate::lighting::{Light, Material, PRESETS};
use crate::mesh::{depth_tested, Mesh, Vertex};
use crate::shaders::ShaderProgram;

use super::camera::spinning_cube;
use super::{camera_overlay, light_uniforms, load_shader, material_uniforms, projection_for, transforms, Lamp};

pub const TITLE: &str = "GL Cook Book - Material";

const FIRST_PRESET: &str = "cyan_plastic";

/// Index into `PRESETS`, advanced with Tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetCursor(usize);

impl PresetCursor {
    pub fn starting_at(name: &str) -> Self {
        PresetCursor(PRESETS.iter().position(|(n, _)| *n == name).unwrap_or(0))
    }

    pub fn next(self) -> Self {
        PresetCursor((self.0 + 1) % PRESETS.len())
    }

    pub fn name(self) -> &'static str {
        PRESETS[self.0].0
    }

    pub fn material(self) -> Material {
        PRESETS[self.0].1
    }
}

pub struct MaterialRecipe {
    cube: Mesh<Vertex>,
    shader: ShaderProgram,
    lamp: Lamp,
    light: Light,
    preset: PresetCursor,
    camera: FlyCamera,
}

pub fn build(display: &Display, config: &AppConfig) -> Result<Box<dyn Recipe>> {
    let shader = load_shader(display, config, "phong", "material")?;
    let lamp = Lamp::load(display, config)?;
    let cube = Mesh::cube(display).context("uploading cube")?;
    Ok(Box::new(MaterialRecipe {
        cube,
        shader,
        lamp,
        light: Light {
            ambient: [1.0; 3],
            ..Light::default()
        },
        preset: PresetCursor::starting_at(FIRST_PRESET),
        camera: FlyCamera::with_position(Vector3::new(0.5, 0.0, 5.0)),
    }))
}

impl Recipe for MaterialRecipe {
    fn title(&self) -> &str {
        TITLE
    }

    fn clear_color(&self) -> (f32, f32, f32, f32) {
        (0.1, 0.1, 0.1, 1.0)
    }

    fn grabs_cursor(&self) -> bool {
        true
    }

    fn update(&mut self, input: &WinitInputHelper, frame: &FrameTime) {
        self.camera.update(input, frame);
        self.light.orbit(frame.elapsed);
        if input.key_pressed(VirtualKeyCode::Tab) {
            self.preset = self.preset.next();
            debug!("material preset {}", self.preset.name());
        }
    }

    fn draw(&self, target: &mut Frame, frame: &FrameTime) -> Result<()> {
        let view = self.camera.view_matrix();
        let projection = projection_for(target);

        let model = spinning_cube([0.0; 3], frame.elapsed);
        let uniforms = transforms(&model, &view, &projection).vec3("view_pos", self.camera.position().into());
        let uniforms = light_uniforms(material_uniforms(uniforms, &self.preset.material()), "light", &self.light);
        self.cube
            .draw(target, self.shader.program(), &uniforms, &depth_tested())?;

        self.lamp
            .draw(target, &self.cube, self.light.position, &view, &projection)?;
        Ok(())
    }

    fn overlay(&self, ui: &Ui) {
        camera_overlay(ui, &self.camera);
        ui.text(format!("material: {} (Tab)", self.preset.name()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::CYAN_PLASTIC;

    #[test]
    fn cursor_starts_at_named_preset() {
        let cursor = PresetCursor::starting_at(FIRST_PRESET);
        assert_eq!(cursor.material(), CYAN_PLASTIC);
        assert_eq!(PresetCursor::starting_at("unknown"), PresetCursor(0));
    }

    #[test]
    fn cursor_wraps_after_last_preset() {
        let mut cursor = PresetCursor::starting_at(PRESETS[0].0);
        for _ in 0..PRESETS.len() {
            cursor = cursor.next();
        }
        assert_eq!(cursor.name(), PRESETS[0].0);
    }
}
