//! The cookbook recipes, one module each, plus the registry the launcher picks from.

use anyhow::Result;
use cgmath::{Matrix4, Vector3};
use glium::{Display, DrawError, Surface};
use imgui_glium_renderer::imgui::Ui;

use crate::app::Recipe;
use crate::camera::FlyCamera;
use crate::config::AppConfig;
use crate::error::ShaderError;
use crate::lighting::{DirectionalLight, Light, Material, PointLight, SpotLight};
use crate::mat_helpers::{mat3_array, mat4_array, normal_matrix, perspective_projection};
use crate::mesh::{depth_tested, Mesh, Vertex};
use crate::shaders::{ShaderProgram, UniformSet};

pub mod basic_lighting;
pub mod camera;
pub mod color;
pub mod lightcasters;
pub mod lightmaps;
pub mod material;
pub mod models;
pub mod textures;
pub mod transform;
pub mod triangle;
pub mod window_creation;

pub const DEFAULT_RECIPE: &str = "models";

pub type BuildFn = fn(&Display, &AppConfig) -> Result<Box<dyn Recipe>>;

pub struct RecipeEntry {
    pub name: &'static str,
    pub title: &'static str,
    pub build: BuildFn,
}

/// Every recipe in tutorial order.
pub static RECIPES: &[RecipeEntry] = &[
    RecipeEntry {
        name: "window_creation",
        title: window_creation::TITLE,
        build: window_creation::build,
    },
    RecipeEntry {
        name: "triangle",
        title: triangle::TITLE,
        build: triangle::build,
    },
    RecipeEntry {
        name: "textures",
        title: textures::TITLE,
        build: textures::build,
    },
    RecipeEntry {
        name: "transform",
        title: transform::TITLE,
        build: transform::build,
    },
    RecipeEntry {
        name: "camera",
        title: camera::TITLE,
        build: camera::build,
    },
    RecipeEntry {
        name: "color",
        title: color::TITLE,
        build: color::build,
    },
    RecipeEntry {
        name: "basic_lighting",
        title: basic_lighting::TITLE,
        build: basic_lighting::build,
    },
    RecipeEntry {
        name: "material",
        title: material::TITLE,
        build: material::build,
    },
    RecipeEntry {
        name: "lightmaps",
        title: lightmaps::TITLE,
        build: lightmaps::build,
    },
    RecipeEntry {
        name: "lightcasters",
        title: lightcasters::TITLE,
        build: lightcasters::build,
    },
    RecipeEntry {
        name: "models",
        title: models::TITLE,
        build: models::build,
    },
];

pub fn find(name: &str) -> Option<&'static RecipeEntry> {
    RECIPES.iter().find(|entry| entry.name == name)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    RECIPES.iter().map(|entry| entry.name)
}

/// Loads `shaders/<vertex>-vt.glsl` and `shaders/<fragment>-fm.glsl` from the asset root.
pub(crate) fn load_shader(
    display: &Display,
    config: &AppConfig,
    vertex: &str,
    fragment: &str,
) -> Result<ShaderProgram, ShaderError> {
    let paths = [
        config.asset(format!("shaders/{}-vt.glsl", vertex)),
        config.asset(format!("shaders/{}-fm.glsl", fragment)),
    ];
    ShaderProgram::from_paths(display, &paths)
}

pub(crate) fn projection_for<S: Surface>(target: &S) -> Matrix4<f32> {
    let (width, height) = target.get_dimensions();
    perspective_projection(width, height)
}

/// `model`, `view`, `projection` and the matching `normal_matrix`.
pub(crate) fn transforms<'a>(
    model: &Matrix4<f32>,
    view: &Matrix4<f32>,
    projection: &Matrix4<f32>,
) -> UniformSet<'a> {
    UniformSet::new()
        .mat4("model", mat4_array(model))
        .mat4("view", mat4_array(view))
        .mat4("projection", mat4_array(projection))
        .mat3("normal_matrix", mat3_array(&normal_matrix(model)))
}

/// Same as [`transforms`] without the normal matrix, for unlit shaders.
pub(crate) fn mvp<'a>(model: &Matrix4<f32>, view: &Matrix4<f32>, projection: &Matrix4<f32>) -> UniformSet<'a> {
    UniformSet::new()
        .mat4("model", mat4_array(model))
        .mat4("view", mat4_array(view))
        .mat4("projection", mat4_array(projection))
}

pub(crate) fn material_uniforms<'a>(set: UniformSet<'a>, material: &Material) -> UniformSet<'a> {
    set.vec3("material.ambient", material.ambient)
        .vec3("material.diffuse", material.diffuse)
        .vec3("material.specular", material.specular)
        .float("material.shininess", material.shininess)
}

pub(crate) fn light_uniforms<'a>(set: UniformSet<'a>, name: &str, light: &Light) -> UniformSet<'a> {
    set.vec3(&format!("{}.position", name), light.position.into())
        .vec3(&format!("{}.ambient", name), light.ambient)
        .vec3(&format!("{}.diffuse", name), light.diffuse)
        .vec3(&format!("{}.specular", name), light.specular)
}

/// Directional, point and spot light blocks as declared by the caster shaders.
pub(crate) fn caster_uniforms<'a>(
    set: UniformSet<'a>,
    directional: &DirectionalLight,
    point: &PointLight,
    spot: &SpotLight,
) -> UniformSet<'a> {
    let (cut_in, cut_off) = spot.cutoff_cosines();
    let set = set
        .vec3("dir_light.direction", directional.direction)
        .vec3("dir_light.ambient", directional.ambient)
        .vec3("dir_light.diffuse", directional.diffuse)
        .vec3("dir_light.specular", directional.specular);
    light_uniforms(set, "point_light", &point.light)
        .float("point_light.constant", point.attenuation.constant)
        .float("point_light.linear", point.attenuation.linear)
        .float("point_light.quadratic", point.attenuation.quadratic)
        .vec3("spot_light.position", spot.position.into())
        .vec3("spot_light.direction", spot.direction.into())
        .vec3("spot_light.ambient", spot.ambient)
        .vec3("spot_light.diffuse", spot.diffuse)
        .vec3("spot_light.specular", spot.specular)
        .float("spot_light.cut_in", cut_in)
        .float("spot_light.cut_off", cut_off)
}

pub(crate) fn camera_overlay(ui: &Ui, camera: &FlyCamera) {
    let position = camera.position();
    ui.text(format!(
        "camera: ({:+.2}, {:+.2}, {:+.2})",
        position.x, position.y, position.z
    ));
    ui.text(format!("yaw {:.1}  pitch {:.1}", camera.yaw(), camera.pitch()));
}

/// The lamp cube: light position, shrunk to a fifth.
pub(crate) fn lamp_model(position: Vector3<f32>) -> Matrix4<f32> {
    Matrix4::from_translation(position) * Matrix4::from_scale(0.2)
}

/// White cube marking the light source.
pub(crate) struct Lamp {
    shader: ShaderProgram,
}

impl Lamp {
    pub fn load(display: &Display, config: &AppConfig) -> Result<Self, ShaderError> {
        Ok(Lamp {
            shader: load_shader(display, config, "basic", "lamp")?,
        })
    }

    pub fn draw<S: Surface>(
        &self,
        target: &mut S,
        cube: &Mesh<Vertex>,
        position: Vector3<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Result<(), DrawError> {
        let uniforms = mvp(&lamp_model(position), view, projection);
        cube.draw(target, self.shader.program(), &uniforms, &depth_tested())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glium::uniforms::UniformValue;

    #[test]
    fn registry_names_are_unique() {
        let all: Vec<_> = names().collect();
        for (i, name) in all.iter().enumerate() {
            assert!(!all[i + 1..].contains(name), "{} registered twice", name);
        }
        assert_eq!(all.len(), 11);
    }

    #[test]
    fn default_recipe_is_registered() {
        assert!(find(DEFAULT_RECIPE).is_some());
        assert!(find("nope").is_none());
    }

    #[test]
    fn titles_follow_the_cookbook_prefix() {
        for entry in RECIPES {
            assert!(entry.title.starts_with("GL Cook Book - "), "{}", entry.title);
        }
    }

    #[test]
    fn caster_uniforms_cover_every_light_field() {
        let set = caster_uniforms(
            UniformSet::new(),
            &DirectionalLight::default(),
            &PointLight::default(),
            &SpotLight::default(),
        );
        assert_eq!(set.len(), 4 + 7 + 7);
        match set.get("point_light.quadratic") {
            Some(UniformValue::Float(v)) => assert_eq!(*v, 0.032),
            _ => panic!("quadratic term missing"),
        }
        match set.get("spot_light.cut_in") {
            Some(UniformValue::Float(v)) => assert!((*v - 12.5f32.to_radians().cos()).abs() < 1e-6),
            _ => panic!("inner cutoff missing"),
        }
    }

    #[test]
    fn lamp_is_scaled_around_light() {
        let model = lamp_model(Vector3::new(1.2, 1.0, 2.0));
        assert_eq!(model.w.truncate(), Vector3::new(1.2, 1.0, 2.0));
        assert_eq!(model.x.x, 0.2);
    }

    #[test]
    fn transforms_include_normal_matrix() {
        let identity = Matrix4::from_scale(1.0);
        let set = transforms(&identity, &identity, &identity);
        assert_eq!(
            set.names().collect::<Vec<_>>(),
            vec!["model", "view", "projection", "normal_matrix"]
        );
        assert_eq!(mvp(&identity, &identity, &identity).len(), 3);
    }
}
