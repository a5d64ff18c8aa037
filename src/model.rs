//! glTF model loading.
//!
//! The scene hierarchy is flattened into one GPU mesh per triangle primitive,
//! with node transforms baked into the vertices. Images referenced by several
//! materials are uploaded once and shared.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4};
use glium::texture::Texture2d;
use glium::{Display, DrawParameters, Surface};
use log::{debug, info, warn};

use crate::error::{ModelError, ResourceError};
use crate::mat_helpers::normal_matrix;
use crate::mesh::{Mesh, Vertex};
use crate::shaders::{ShaderProgram, UniformSet};
use crate::texture::{expand_to_rgba, sampler_behavior, texture_from_rgba};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
}

impl TextureKind {
    /// Sampler uniform for the `n`th texture of this kind, counting from 1.
    pub fn uniform_name(self, n: usize) -> String {
        match self {
            TextureKind::Diffuse => format!("material.diffuse{}", n),
            TextureKind::Specular => format!("material.specular{}", n),
        }
    }
}

/// Uploads each source image at most once.
pub struct TextureCache<T> {
    loaded: HashMap<usize, Rc<T>>,
}

impl<T> Default for TextureCache<T> {
    fn default() -> Self {
        TextureCache { loaded: HashMap::new() }
    }
}

impl<T> TextureCache<T> {
    pub fn get_or_load<E, F>(&mut self, image_index: usize, load: F) -> Result<Rc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(texture) = self.loaded.get(&image_index) {
            return Ok(Rc::clone(texture));
        }
        let texture = Rc::new(load()?);
        self.loaded.insert(image_index, Rc::clone(&texture));
        Ok(texture)
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }
}

/// Builds vertices from separate attribute streams, applying `transform`.
/// Returns `None` when there is not exactly one normal per position.
///
/// glTF puts `v = 0` on the top image row while textures are uploaded bottom
/// row first, so `v` is flipped. Missing texture coordinates become `(0, 1)`,
/// the flipped origin.
pub fn assemble_vertices(
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
    tex_coords: Option<&[[f32; 2]]>,
    transform: &Matrix4<f32>,
) -> Option<Vec<Vertex>> {
    if positions.len() != normals.len() {
        return None;
    }
    let normal_mat = normal_matrix(transform);
    let vertices = positions
        .iter()
        .zip(normals)
        .enumerate()
        .map(|(i, (p, n))| {
            let position = *transform * Vector4::new(p[0], p[1], p[2], 1.0);
            let normal = normal_mat * Vector3::new(n[0], n[1], n[2]);
            let normal = if normal.magnitude2() > 0.0 { normal.normalize() } else { normal };
            Vertex {
                position: [position.x, position.y, position.z],
                normal: normal.into(),
                tex_coords: flip_v(tex_coords.and_then(|uv| uv.get(i)).copied().unwrap_or([0.0, 0.0])),
            }
        })
        .collect();
    Some(vertices)
}

fn flip_v([u, v]: [f32; 2]) -> [f32; 2] {
    [u, 1.0 - v]
}

pub fn sequential_indices(count: usize) -> Vec<u32> {
    (0..count as u32).collect()
}

pub struct SubMesh {
    pub name: String,
    mesh: Mesh<Vertex>,
    diffuse: Vec<Rc<Texture2d>>,
    specular: Vec<Rc<Texture2d>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelStats {
    pub sub_meshes: usize,
    pub vertices: usize,
    pub indices: usize,
    pub textures: usize,
}

pub struct Model {
    path: PathBuf,
    meshes: Vec<SubMesh>,
    fallback: Rc<Texture2d>,
    stats: ModelStats,
}

impl Model {
    pub fn load<P: AsRef<Path>>(display: &Display, path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let (document, buffers, images) = gltf::import(path).map_err(|e| ModelError::Import {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| ModelError::Import {
                path: path.to_path_buf(),
                message: "file contains no scene".to_owned(),
            })?;

        let mut loader = Loader {
            display,
            path,
            buffers: &buffers,
            images: &images,
            textures: TextureCache::default(),
            meshes: Vec::new(),
            stats: ModelStats::default(),
        };
        for node in scene.nodes() {
            loader.process_node(&node, &Matrix4::identity())?;
        }

        let Loader {
            meshes,
            mut stats,
            textures,
            ..
        } = loader;
        stats.textures = textures.len();
        info!(
            "loaded model {}: {} meshes, {} vertices, {} textures",
            path.display(),
            stats.sub_meshes,
            stats.vertices,
            stats.textures
        );

        let fallback = Rc::new(texture_from_rgba(display, vec![255; 4], (1, 1))?);
        Ok(Model {
            path: path.to_path_buf(),
            meshes,
            fallback,
            stats,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stats(&self) -> ModelStats {
        self.stats
    }

    pub fn meshes(&self) -> &[SubMesh] {
        &self.meshes
    }

    /// Draws every sub-mesh with `base` plus its `material.diffuseN` and
    /// `material.specularN` samplers. Every name must exist in `shader`.
    pub fn draw<S: Surface>(
        &self,
        target: &mut S,
        shader: &ShaderProgram,
        base: &UniformSet<'_>,
        params: &DrawParameters<'_>,
    ) -> Result<(), ModelError> {
        let sampler = sampler_behavior();
        for sub_mesh in &self.meshes {
            let mut uniforms = UniformSet::new().extend(base);
            for (kind, textures) in [
                (TextureKind::Diffuse, &sub_mesh.diffuse),
                (TextureKind::Specular, &sub_mesh.specular),
            ]
            .iter()
            {
                if textures.is_empty() {
                    uniforms.insert(
                        &kind.uniform_name(1),
                        glium::uniforms::UniformValue::Texture2d(&*self.fallback, Some(sampler)),
                    );
                }
                for (i, texture) in textures.iter().enumerate() {
                    uniforms.insert(
                        &kind.uniform_name(i + 1),
                        glium::uniforms::UniformValue::Texture2d(&**texture, Some(sampler)),
                    );
                }
            }
            shader.check(&uniforms)?;
            sub_mesh.mesh.draw(target, shader.program(), &uniforms, params)?;
        }
        Ok(())
    }
}

struct Loader<'a> {
    display: &'a Display,
    path: &'a Path,
    buffers: &'a [gltf::buffer::Data],
    images: &'a [gltf::image::Data],
    textures: TextureCache<Texture2d>,
    meshes: Vec<SubMesh>,
    stats: ModelStats,
}

impl<'a> Loader<'a> {
    fn process_node(&mut self, node: &gltf::Node<'_>, parent: &Matrix4<f32>) -> Result<(), ModelError> {
        let transform = *parent * Matrix4::from(node.transform().matrix());
        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                self.process_primitive(&mesh, &primitive, &transform)?;
            }
        }
        for child in node.children() {
            self.process_node(&child, &transform)?;
        }
        Ok(())
    }

    fn process_primitive(
        &mut self,
        mesh: &gltf::Mesh<'_>,
        primitive: &gltf::Primitive<'_>,
        transform: &Matrix4<f32>,
    ) -> Result<(), ModelError> {
        let name = mesh
            .name()
            .map(String::from)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            warn!("{}: skipping non-triangle primitive in {}", self.path.display(), name);
            return Ok(());
        }

        let buffers = self.buffers;
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .map(|iter| iter.collect())
            .ok_or_else(|| self.missing(&name, "POSITION"))?;
        let normals: Vec<[f32; 3]> = reader
            .read_normals()
            .map(|iter| iter.collect())
            .ok_or_else(|| self.missing(&name, "NORMAL"))?;
        let tex_coords: Option<Vec<[f32; 2]>> = reader.read_tex_coords(0).map(|iter| iter.into_f32().collect());
        let indices: Vec<u32> = reader
            .read_indices()
            .map(|iter| iter.into_u32().collect())
            .unwrap_or_else(|| sequential_indices(positions.len()));

        let vertices = assemble_vertices(&positions, &normals, tex_coords.as_deref(), transform).ok_or_else(|| {
            ModelError::AttributeCount {
                path: self.path.to_path_buf(),
                mesh: name.clone(),
                positions: positions.len(),
                normals: normals.len(),
            }
        })?;

        let material = primitive.material();
        let pbr = material.pbr_metallic_roughness();
        let mut diffuse = Vec::new();
        if let Some(info) = pbr.base_color_texture() {
            diffuse.extend(self.texture(info.texture().source().index())?);
        }
        let mut specular = Vec::new();
        if let Some(info) = pbr.metallic_roughness_texture() {
            specular.extend(self.texture(info.texture().source().index())?);
        }

        debug!(
            "{}: {} vertices, {} indices, {} diffuse, {} specular",
            name,
            vertices.len(),
            indices.len(),
            diffuse.len(),
            specular.len()
        );
        self.stats.sub_meshes += 1;
        self.stats.vertices += vertices.len();
        self.stats.indices += indices.len();
        self.meshes.push(SubMesh {
            name,
            mesh: Mesh::new(self.display, &vertices, Some(indices.as_slice()))?,
            diffuse,
            specular,
        });
        Ok(())
    }

    /// Uploads image `index` once; formats wider than 8 bits per channel are skipped.
    fn texture(&mut self, index: usize) -> Result<Option<Rc<Texture2d>>, ResourceError> {
        let images = self.images;
        let image = match images.get(index) {
            Some(image) => image,
            None => return Ok(None),
        };
        let channels = match image.format {
            gltf::image::Format::R8 => 1,
            gltf::image::Format::R8G8 => 2,
            gltf::image::Format::R8G8B8 => 3,
            gltf::image::Format::R8G8B8A8 => 4,
            other => {
                warn!("{}: unsupported image format {:?}", self.path.display(), other);
                return Ok(None);
            }
        };
        let display = self.display;
        let dimensions = (image.width, image.height);
        self.textures
            .get_or_load(index, || {
                let pixels = expand_to_rgba(&image.pixels, channels).ok_or(ResourceError::ChannelCount(channels))?;
                texture_from_rgba(display, pixels, dimensions)
            })
            .map(Some)
    }

    fn missing(&self, mesh: &str, attribute: &'static str) -> ModelError {
        ModelError::MissingAttribute {
            path: self.path.to_path_buf(),
            mesh: mesh.to_owned(),
            attribute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn sampler_names_count_from_one() {
        assert_eq!(TextureKind::Diffuse.uniform_name(1), "material.diffuse1");
        assert_eq!(TextureKind::Specular.uniform_name(2), "material.specular2");
    }

    #[test]
    fn cache_loads_each_image_once() {
        let loads = Cell::new(0);
        let mut cache: TextureCache<String> = TextureCache::default();
        let load = |name: &str| {
            loads.set(loads.get() + 1);
            Ok::<_, ()>(name.to_owned())
        };

        let first = cache.get_or_load(3, || load("body")).unwrap();
        let second = cache.get_or_load(3, || load("ignored")).unwrap();
        let other = cache.get_or_load(4, || load("helmet")).unwrap();

        assert_eq!(loads.get(), 2);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(*second, "body");
        assert_eq!(*other, "helmet");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let mut cache: TextureCache<u8> = TextureCache::default();
        assert!(cache.get_or_load(0, || Err("decode")).is_err());
        assert!(cache.is_empty());
        assert_eq!(*cache.get_or_load::<&str, _>(0, || Ok(7)).unwrap(), 7);
    }

    #[test]
    fn vertices_without_uvs_sample_the_top_left_texel() {
        let vertices = assemble_vertices(
            &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]],
            &[[0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            None,
            &Matrix4::identity(),
        )
        .unwrap();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[1].position, [4.0, 5.0, 6.0]);
        assert_eq!(vertices[0].tex_coords, [0.0, 1.0]);
    }

    #[test]
    fn top_row_uvs_map_to_last_uploaded_row() {
        // 1x2 image, red on top: uploaded bottom row first, so red sits at t = 1
        let rows: Vec<[u8; 4]> = vec![[255, 0, 0, 255], [0, 0, 255, 255]];
        let uploaded: Vec<[u8; 4]> = rows.iter().rev().copied().collect();

        let vertices = assemble_vertices(
            &[[0.0; 3], [0.0; 3]],
            &[[0.0, 0.0, 1.0]; 2],
            Some(&[[0.0, 0.0], [0.5, 1.0]][..]),
            &Matrix4::identity(),
        )
        .unwrap();
        assert_eq!(vertices[0].tex_coords, [0.0, 1.0]);
        assert_eq!(vertices[1].tex_coords, [0.5, 0.0]);

        let texel = |t: f32| uploaded[((t * 2.0) as usize).min(1)];
        assert_eq!(texel(vertices[0].tex_coords[1]), [255, 0, 0, 255]);
        assert_eq!(texel(vertices[1].tex_coords[1]), [0, 0, 255, 255]);
    }

    #[test]
    fn short_normal_stream_is_rejected() {
        let vertices = assemble_vertices(
            &[[0.0; 3], [1.0; 3], [2.0; 3]],
            &[[0.0, 1.0, 0.0]; 2],
            None,
            &Matrix4::identity(),
        );
        assert!(vertices.is_none());
    }

    #[test]
    fn node_transform_is_baked_in() {
        let transform = Matrix4::from_translation(Vector3::new(0.0, 10.0, 0.0)) * Matrix4::from_scale(2.0);
        let vertices = assemble_vertices(
            &[[1.0, 0.0, 0.0]],
            &[[0.0, 0.0, 1.0]],
            Some(&[[0.25, 0.75]][..]),
            &transform,
        )
        .unwrap();
        assert_eq!(vertices[0].position, [2.0, 10.0, 0.0]);
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[0].tex_coords, [0.25, 0.25]);
    }

    #[test]
    fn unindexed_primitives_get_sequential_indices() {
        assert_eq!(sequential_indices(4), vec![0, 1, 2, 3]);
        assert!(sequential_indices(0).is_empty());
    }
}
