use anyhow::{Context, Result};
use cgmath::Vector3;
use glium::{Display, Frame};
use imgui_glium_renderer::imgui::Ui;
use winit_input_helper::WinitInputHelper;

use crate::app::{FrameTime, Recipe};
use crate::camera::FlyCamera;
use crate::config::AppConfig;
use crate::lighting::Light;
use crate::mesh::{depth_tested, Mesh, Vertex};
use crate::shaders::ShaderProgram;

use super::camera::spinning_cube;
use super::{camera_overlay, load_shader, mvp, projection_for, Lamp};

pub const TITLE: &str = "GL Cook Book - Color";

pub const OBJECT_COLOR: [f32; 3] = [1.0, 0.5, 0.31];
pub const LIGHT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

pub struct Color {
    cube: Mesh<Vertex>,
    shader: ShaderProgram,
    lamp: Lamp,
    light: Light,
    camera: FlyCamera,
}

pub fn build(display: &Display, config: &AppConfig) -> Result<Box<dyn Recipe>> {
    let shader = load_shader(display, config, "basic", "color")?;
    let lamp = Lamp::load(display, config)?;
    let cube = Mesh::cube(display).context("uploading cube")?;
    Ok(Box::new(Color {
        cube,
        shader,
        lamp,
        light: Light::default(),
        camera: FlyCamera::with_position(Vector3::new(0.5, 0.0, 5.0)),
    }))
}

impl Recipe for Color {
    fn title(&self) -> &str {
        TITLE
    }

    fn grabs_cursor(&self) -> bool {
        true
    }

    fn update(&mut self, input: &WinitInputHelper, frame: &FrameTime) {
        self.camera.update(input, frame);
    }

    fn draw(&self, target: &mut Frame, frame: &FrameTime) -> Result<()> {
        let view = self.camera.view_matrix();
        let projection = projection_for(target);

        let model = spinning_cube([0.0; 3], frame.elapsed);
        let uniforms = mvp(&model, &view, &projection)
            .vec3("object_color", OBJECT_COLOR)
            .vec3("light_color", LIGHT_COLOR);
        self.cube
            .draw(target, self.shader.program(), &uniforms, &depth_tested())?;

        self.lamp
            .draw(target, &self.cube, self.light.position, &view, &projection)?;
        Ok(())
    }

    fn overlay(&self, ui: &Ui) {
        camera_overlay(ui, &self.camera);
    }
}
