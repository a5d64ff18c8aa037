use anyhow::{Context, Result};
use cgmath::{Matrix4, SquareMatrix, Vector3};
use glium::{Display, Frame};
use imgui_glium_renderer::imgui::Ui;
use log::{debug, info};
use winit::event::VirtualKeyCode;
use winit_input_helper::WinitInputHelper;

use crate::app::{FrameTime, Recipe};
use crate::camera::FlyCamera;
use crate::config::AppConfig;
use crate::lighting::{DirectionalLight, Light, MATERIAL_CUBES};
use crate::mat_helpers::print_mat;
use crate::mesh::{depth_tested, Mesh, Vertex};
use crate::model::Model;
use crate::shaders::ShaderProgram;

use super::camera::spinning_cube;
use super::lightcasters::{Casters, CrateScene, CRATE_SHININESS};
use super::{camera_overlay, caster_uniforms, light_uniforms, load_shader, material_uniforms, projection_for, transforms, Lamp};

pub const TITLE: &str = "GL Cook Book - Models";

/// glTF scene drawn by the `N` view, relative to the asset root.
pub const MODEL_PATH: &str = "models/nanosuit/nanosuit.gltf";

const OVERLAY_MESH_NAMES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    /// Textured crates under the three light casters.
    Basic,
    /// Cubes in the material presets around an orbiting lamp.
    Bio,
    /// The imported model.
    Nano,
}

impl SceneKind {
    pub fn for_key(key: VirtualKeyCode) -> Option<Self> {
        match key {
            VirtualKeyCode::B => Some(SceneKind::Basic),
            VirtualKeyCode::O => Some(SceneKind::Bio),
            VirtualKeyCode::N => Some(SceneKind::Nano),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SceneKind::Basic => "crates (B)",
            SceneKind::Bio => "materials (O)",
            SceneKind::Nano => "model (N)",
        }
    }

    pub fn clear_color(self) -> (f32, f32, f32, f32) {
        match self {
            SceneKind::Basic => (0.15, 0.15, 0.15, 1.0),
            SceneKind::Bio | SceneKind::Nano => (0.1, 0.1, 0.1, 1.0),
        }
    }
}

/// Scene switch from the keys held this frame; later keys in B, O, N order win.
pub fn selected_scene(current: SceneKind, held: impl Fn(VirtualKeyCode) -> bool) -> SceneKind {
    [VirtualKeyCode::B, VirtualKeyCode::O, VirtualKeyCode::N]
        .iter()
        .filter(|key| held(**key))
        .filter_map(|key| SceneKind::for_key(*key))
        .last()
        .unwrap_or(current)
}

/// Dimmer sun than the crate scene so the flashlight dominates.
pub fn model_sun() -> DirectionalLight {
    DirectionalLight {
        ambient: [0.1; 3],
        diffuse: [0.1; 3],
        specular: [0.1; 3],
        ..DirectionalLight::default()
    }
}

pub struct Models {
    scene: SceneKind,
    crates: CrateScene,
    presets: ShaderProgram,
    phong: ShaderProgram,
    cube: Mesh<Vertex>,
    lamp: Lamp,
    model: Model,
    casters: Casters,
    light: Light,
    camera: FlyCamera,
}

pub fn build(display: &Display, config: &AppConfig) -> Result<Box<dyn Recipe>> {
    let crates = CrateScene::load(display, config)?;
    let presets = load_shader(display, config, "phong", "material")?;
    let phong = load_shader(display, config, "phong", "model")?;
    let cube = Mesh::cube(display).context("uploading cube")?;
    let lamp = Lamp::load(display, config)?;
    let model_path = config.asset(MODEL_PATH);
    let model = Model::load(display, &model_path).with_context(|| format!("loading {}", model_path.display()))?;
    let stats = model.stats();
    info!(
        "{}: {} sub-meshes, {} indices",
        model.path().display(),
        stats.sub_meshes,
        stats.indices
    );

    let camera = FlyCamera::with_position(Vector3::new(0.5, 0.0, 5.0));
    let mut casters = Casters::default();
    casters.update(&camera, 0.0);
    Ok(Box::new(Models {
        scene: SceneKind::Basic,
        crates,
        presets,
        phong,
        cube,
        lamp,
        model,
        casters,
        light: Light::default(),
        camera,
    }))
}

impl Models {
    fn draw_bio(&self, target: &mut Frame, elapsed: f32, view: &Matrix4<f32>, projection: &Matrix4<f32>) -> Result<()> {
        let params = depth_tested();
        for (material, position) in MATERIAL_CUBES.iter() {
            let model = spinning_cube(*position, elapsed);
            let uniforms = transforms(&model, view, projection).vec3("view_pos", self.camera.position().into());
            let uniforms = light_uniforms(material_uniforms(uniforms, material), "light", &self.light);
            self.cube
                .draw(target, self.presets.program(), &uniforms, &params)?;
        }
        self.lamp
            .draw(target, &self.cube, self.light.position, view, projection)?;
        Ok(())
    }

    fn draw_nano(&self, target: &mut Frame, view: &Matrix4<f32>, projection: &Matrix4<f32>) -> Result<()> {
        let base = transforms(&Matrix4::identity(), view, projection)
            .vec3("view_pos", self.camera.position().into())
            .float("material.shininess", CRATE_SHININESS);
        let base = caster_uniforms(base, &model_sun(), &self.casters.point, &self.casters.spot);
        self.model
            .draw(target, &self.phong, &base, &depth_tested())?;
        Ok(())
    }
}

impl Recipe for Models {
    fn title(&self) -> &str {
        TITLE
    }

    fn clear_color(&self) -> (f32, f32, f32, f32) {
        self.scene.clear_color()
    }

    fn grabs_cursor(&self) -> bool {
        true
    }

    fn update(&mut self, input: &WinitInputHelper, frame: &FrameTime) {
        let scene = selected_scene(self.scene, |key| input.key_held(key));
        if scene != self.scene {
            debug!("switched to {} scene, view:{}", scene.label(), print_mat(&self.camera.view_matrix()));
            self.scene = scene;
        }
        self.camera.update(input, frame);
        self.casters.update(&self.camera, frame.elapsed);
        self.light.orbit(frame.elapsed);
    }

    fn draw(&self, target: &mut Frame, frame: &FrameTime) -> Result<()> {
        let view = self.camera.view_matrix();
        let projection = projection_for(target);
        match self.scene {
            SceneKind::Basic => {
                self.crates
                    .draw(target, &self.camera, &self.casters, &view, &projection)?;
                self.lamp.draw(
                    target,
                    self.crates.cube(),
                    self.casters.point.light.position,
                    &view,
                    &projection,
                )?;
            }
            SceneKind::Bio => self.draw_bio(target, frame.elapsed, &view, &projection)?,
            SceneKind::Nano => self.draw_nano(target, &view, &projection)?,
        }
        Ok(())
    }

    fn overlay(&self, ui: &Ui) {
        camera_overlay(ui, &self.camera);
        ui.text(format!("scene: {}", self.scene.label()));
        if self.scene == SceneKind::Nano {
            let stats = self.model.stats();
            ui.text(format!(
                "{} meshes, {} vertices, {} textures",
                stats.sub_meshes, stats.vertices, stats.textures
            ));
            for sub_mesh in self.model.meshes().iter().take(OVERLAY_MESH_NAMES) {
                ui.text(format!("  {}", sub_mesh.name));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_scenes() {
        assert_eq!(SceneKind::for_key(VirtualKeyCode::B), Some(SceneKind::Basic));
        assert_eq!(SceneKind::for_key(VirtualKeyCode::O), Some(SceneKind::Bio));
        assert_eq!(SceneKind::for_key(VirtualKeyCode::N), Some(SceneKind::Nano));
        assert_eq!(SceneKind::for_key(VirtualKeyCode::W), None);
    }

    #[test]
    fn no_key_keeps_current_scene() {
        assert_eq!(selected_scene(SceneKind::Bio, |_| false), SceneKind::Bio);
    }

    #[test]
    fn last_checked_key_wins() {
        let held = |key: VirtualKeyCode| key == VirtualKeyCode::B || key == VirtualKeyCode::N;
        assert_eq!(selected_scene(SceneKind::Bio, held), SceneKind::Nano);
        assert_eq!(selected_scene(SceneKind::Nano, |key| key == VirtualKeyCode::O), SceneKind::Bio);
    }

    #[test]
    fn model_sun_keeps_direction() {
        let sun = model_sun();
        assert_eq!(sun.direction, DirectionalLight::default().direction);
        assert_eq!(sun.diffuse, [0.1; 3]);
    }
}
