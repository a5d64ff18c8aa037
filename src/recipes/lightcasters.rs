use anyhow::{Context, Result};
use cgmath::{Deg, Matrix4, Vector3};
use glium::texture::Texture2d;
use glium::{Display, Frame, Surface};
use imgui_glium_renderer::imgui::Ui;
use winit_input_helper::WinitInputHelper;

use crate::app::{FrameTime, Recipe};
use crate::camera::FlyCamera;
use crate::config::AppConfig;
use crate::lighting::{DirectionalLight, PointLight, SpotLight};
use crate::mat_helpers::{model_matrix, vec_from_array3};
use crate::mesh::{depth_tested, Mesh, Vertex, CUBE_POSITIONS};
use crate::shaders::ShaderProgram;
use crate::texture::{load_texture, sampler_behavior};

use super::camera::spin_axis;
use super::{camera_overlay, caster_uniforms, load_shader, projection_for, transforms, Lamp};

pub const TITLE: &str = "GL Cook Book - Light Casters";

pub const CRATE_SHININESS: f32 = 64.0;

/// Sun, orbiting bulb and a flashlight held by the camera.
#[derive(Debug, Clone, Copy, Default)]
pub struct Casters {
    pub directional: DirectionalLight,
    pub point: PointLight,
    pub spot: SpotLight,
}

impl Casters {
    pub fn update(&mut self, camera: &FlyCamera, elapsed: f32) {
        self.point.light.orbit(elapsed);
        self.spot.attach_to(camera.position(), camera.direction());
    }
}

/// Cube tilted by a fixed -55 degrees around the shared spin axis.
pub fn tilted_cube(position: [f32; 3]) -> Matrix4<f32> {
    model_matrix(vec_from_array3(&position), spin_axis(), Deg(-55.0), 1.0)
}

/// The ten crates with diffuse and specular maps.
pub(crate) struct CrateScene {
    cube: Mesh<Vertex>,
    shader: ShaderProgram,
    diffuse: Texture2d,
    specular: Texture2d,
}

impl CrateScene {
    pub fn load(display: &Display, config: &AppConfig) -> Result<Self> {
        let shader = load_shader(display, config, "phong", "casters")?;
        let cube = Mesh::cube(display).context("uploading cube")?;
        let diffuse = load_texture(display, config.asset("textures/box.png")).context("loading diffuse map")?;
        let specular =
            load_texture(display, config.asset("textures/box_specular.png")).context("loading specular map")?;
        Ok(CrateScene {
            cube,
            shader,
            diffuse,
            specular,
        })
    }

    pub fn cube(&self) -> &Mesh<Vertex> {
        &self.cube
    }

    pub fn draw<S: Surface>(
        &self,
        target: &mut S,
        camera: &FlyCamera,
        casters: &Casters,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Result<()> {
        let sampler = sampler_behavior();
        let params = depth_tested();
        let lights = caster_uniforms(Default::default(), &casters.directional, &casters.point, &casters.spot)
            .vec3("view_pos", camera.position().into())
            .texture("material.diffuse", &self.diffuse, sampler)
            .texture("material.specular", &self.specular, sampler)
            .float("material.shininess", CRATE_SHININESS);
        for position in CUBE_POSITIONS.iter() {
            let uniforms = transforms(&tilted_cube(*position), view, projection).extend(&lights);
            self.cube.draw(target, self.shader.program(), &uniforms, &params)?;
        }
        Ok(())
    }
}

pub struct LightCasters {
    crates: CrateScene,
    lamp: Lamp,
    casters: Casters,
    camera: FlyCamera,
}

pub fn build(display: &Display, config: &AppConfig) -> Result<Box<dyn Recipe>> {
    let crates = CrateScene::load(display, config)?;
    let lamp = Lamp::load(display, config)?;
    let camera = FlyCamera::with_position(Vector3::new(0.5, 0.0, 5.0));
    let mut casters = Casters::default();
    casters.update(&camera, 0.0);
    Ok(Box::new(LightCasters {
        crates,
        lamp,
        casters,
        camera,
    }))
}

impl Recipe for LightCasters {
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
        self.casters.update(&self.camera, frame.elapsed);
    }

    fn draw(&self, target: &mut Frame, _frame: &FrameTime) -> Result<()> {
        let view = self.camera.view_matrix();
        let projection = projection_for(target);
        self.crates
            .draw(target, &self.camera, &self.casters, &view, &projection)?;
        self.lamp.draw(
            target,
            self.crates.cube(),
            self.casters.point.light.position,
            &view,
            &projection,
        )?;
        Ok(())
    }

    fn overlay(&self, ui: &Ui) {
        camera_overlay(ui, &self.camera);
    }
}
