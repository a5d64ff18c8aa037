//! Progressive OpenGL recipes on glium: window, triangle, textures, transforms,
//! fly camera, Phong lighting, materials, light maps, light casters and glTF models.

pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod lighting;
pub mod mat_helpers;
pub mod mesh;
pub mod model;
pub mod recipes;
pub mod shaders;
pub mod texture;
