use anyhow::{Context, Result};
use cgmath::Vector3;
use glium::texture::Texture2d;
use glium::{Display, Frame};
use imgui_glium_renderer::imgui::Ui;
use winit_input_helper::WinitInputHelper;

use crate::app::{FrameTime, Recipe};
use crate::camera::FlyCamera;
use crate::config::AppConfig;
use crate::lighting::{Light, MATERIAL_CUBES};
use crate::mesh::{depth_tested, Mesh, Vertex};
use crate::shaders::ShaderProgram;
use crate::texture::{load_texture, sampler_behavior};

use super::camera::spinning_cube;
use super::{camera_overlay, light_uniforms, load_shader, projection_for, transforms, Lamp};

pub const TITLE: &str = "GL Cook Book - Lightmaps";

/// Ten crates sharing a diffuse map, each with the specular tint of its preset.
pub struct Lightmaps {
    cube: Mesh<Vertex>,
    shader: ShaderProgram,
    lamp: Lamp,
    diffuse: Texture2d,
    light: Light,
    camera: FlyCamera,
}

pub fn build(display: &Display, config: &AppConfig) -> Result<Box<dyn Recipe>> {
    let shader = load_shader(display, config, "phong", "lightmap")?;
    let lamp = Lamp::load(display, config)?;
    let cube = Mesh::cube(display).context("uploading cube")?;
    let diffuse = load_texture(display, config.asset("textures/box.png")).context("loading diffuse map")?;
    Ok(Box::new(Lightmaps {
        cube,
        shader,
        lamp,
        diffuse,
        light: Light::default(),
        camera: FlyCamera::with_position(Vector3::new(0.5, 0.0, 5.0)),
    }))
}

impl Recipe for Lightmaps {
    fn title(&self) -> &str {
        TITLE
    }

    fn clear_color(&self) -> (f32, f32, f32, f32) {
        (0.15, 0.15, 0.15, 1.0)
    }

    fn grabs_cursor(&self) -> bool {
        true
    }

    fn update(&mut self, input: &WinitInputHelper, frame: &FrameTime) {
        self.camera.update(input, frame);
        self.light.orbit(frame.elapsed);
    }

    fn draw(&self, target: &mut Frame, frame: &FrameTime) -> Result<()> {
        let view = self.camera.view_matrix();
        let projection = projection_for(target);
        let params = depth_tested();
        let sampler = sampler_behavior();

        for (material, position) in MATERIAL_CUBES.iter() {
            let model = spinning_cube(*position, frame.elapsed);
            let uniforms = transforms(&model, &view, &projection)
                .vec3("view_pos", self.camera.position().into())
                .texture("material.diffuse", &self.diffuse, sampler)
                .vec3("material.specular", material.specular)
                .float("material.shininess", material.shininess);
            let uniforms = light_uniforms(uniforms, "light", &self.light);
            self.cube.draw(target, self.shader.program(), &uniforms, &params)?;
        }

        self.lamp
            .draw(target, &self.cube, self.light.position, &view, &projection)?;
        Ok(())
    }

    fn overlay(&self, ui: &Ui) {
        camera_overlay(ui, &self.camera);
    }
}
