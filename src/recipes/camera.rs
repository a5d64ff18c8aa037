use anyhow::{Context, Result};
use cgmath::{Deg, Matrix4, Vector3};
use glium::texture::Texture2d;
use glium::{Display, Frame};
use imgui_glium_renderer::imgui::Ui;
use winit_input_helper::WinitInputHelper;

use crate::app::{FrameTime, Recipe};
use crate::camera::FlyCamera;
use crate::config::AppConfig;
use crate::mat_helpers::{model_matrix, print_mat_ui, vec_from_array3};
use crate::mesh::{depth_tested, Mesh, Vertex, CUBE_POSITIONS};
use crate::shaders::ShaderProgram;
use crate::texture::sampler_behavior;

use super::textures::{load_pair, DEFAULT_MIX};
use super::{camera_overlay, load_shader, mvp, projection_for};

pub const TITLE: &str = "GL Cook Book - Camera";

/// Degrees per second, negative spins clockwise.
pub const SPIN_RATE: f32 = -55.0;

pub fn spin_axis() -> Vector3<f32> {
    Vector3::new(1.0, 0.3, 0.5)
}

/// Model matrix of a cube at `position` spun for `elapsed` seconds.
pub fn spinning_cube(position: [f32; 3], elapsed: f32) -> Matrix4<f32> {
    model_matrix(vec_from_array3(&position), spin_axis(), Deg(elapsed * SPIN_RATE), 1.0)
}

pub struct CameraRecipe {
    cube: Mesh<Vertex>,
    shader: ShaderProgram,
    container: Texture2d,
    face: Texture2d,
    camera: FlyCamera,
}

pub fn build(display: &Display, config: &AppConfig) -> Result<Box<dyn Recipe>> {
    let shader = load_shader(display, config, "cube", "cube")?;
    let cube = Mesh::cube(display).context("uploading cube")?;
    let (container, face) = load_pair(display, config)?;
    Ok(Box::new(CameraRecipe {
        cube,
        shader,
        container,
        face,
        camera: FlyCamera::with_position(Vector3::new(0.0, 0.0, 10.0)),
    }))
}

impl Recipe for CameraRecipe {
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
        let sampler = sampler_behavior();
        let params = depth_tested();
        for position in CUBE_POSITIONS.iter() {
            let model = spinning_cube(*position, frame.elapsed);
            let uniforms = mvp(&model, &view, &projection)
                .texture("texture1", &self.container, sampler)
                .texture("texture2", &self.face, sampler)
                .float("mix_ratio", DEFAULT_MIX);
            self.cube.draw(target, self.shader.program(), &uniforms, &params)?;
        }
        Ok(())
    }

    fn overlay(&self, ui: &Ui) {
        camera_overlay(ui, &self.camera);
        ui.separator();
        ui.text("view");
        print_mat_ui(&self.camera.view_matrix(), ui);
    }
}
