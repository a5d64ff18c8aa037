use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use glium::program::ProgramCreationError;
use glium::texture::Texture2d;
use glium::uniforms::{SamplerBehavior, UniformValue, Uniforms};
use glium::{Display, Program};
use log::{debug, error};

use crate::error::{ResourceError, ShaderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

/// Reads shader text, mapping a missing file to a typed error.
pub fn read_source(path: &Path) -> Result<String, ResourceError> {
    fs::read_to_string(path).map_err(|source| ResourceError::FileAccess {
        path: path.to_path_buf(),
        source,
    })
}

/// Infers the stage from names of the form `<name>-vt.glsl` or `<name>-fm.glsl`.
pub fn stage_from_name(path: &Path) -> Result<Stage, ShaderError> {
    let malformed = || ShaderError::MalformedName {
        path: path.to_path_buf(),
    };
    let file_name = path.file_name().and_then(|n| n.to_str()).ok_or_else(malformed)?;
    let stem = file_name.strip_suffix(".glsl").ok_or_else(malformed)?;
    let (name, tag) = stem.rsplit_once('-').ok_or_else(malformed)?;
    if name.is_empty() {
        return Err(malformed());
    }
    match tag {
        "vt" => Ok(Stage::Vertex),
        "fm" => Ok(Stage::Fragment),
        _ => Err(malformed()),
    }
}

/// A linked program and a lazily filled cache of uniform locations.
pub struct ShaderProgram {
    label: String,
    program: Program,
    locations: RefCell<HashMap<String, Option<i32>>>,
}

impl ShaderProgram {
    pub fn from_source(display: &Display, vertex_src: &str, fragment_src: &str, label: &str) -> Result<Self, ShaderError> {
        let program = Program::from_source(display, vertex_src, fragment_src, None).map_err(|err| {
            let err = describe_error(label, err);
            error!("{}", err);
            err
        })?;
        debug!("linked shader program {}", label);
        Ok(ShaderProgram {
            label: label.to_owned(),
            program,
            locations: RefCell::new(HashMap::new()),
        })
    }

    pub fn from_files<P: AsRef<Path>>(display: &Display, vertex_path: P, fragment_path: P) -> Result<Self, ShaderError> {
        let vertex_path = vertex_path.as_ref();
        let fragment_path = fragment_path.as_ref();
        let vertex_src = read_source(vertex_path)?;
        let fragment_src = read_source(fragment_path)?;
        let label = format!("{} + {}", vertex_path.display(), fragment_path.display());
        Self::from_source(display, &vertex_src, &fragment_src, &label)
    }

    /// Builds a program from a vertex and a fragment file named by stage tag.
    pub fn from_paths<P: AsRef<Path>>(display: &Display, paths: &[P]) -> Result<Self, ShaderError> {
        let mut vertex: Option<PathBuf> = None;
        let mut fragment: Option<PathBuf> = None;
        for path in paths {
            let path = path.as_ref();
            match stage_from_name(path)? {
                Stage::Vertex => vertex = Some(path.to_path_buf()),
                Stage::Fragment => fragment = Some(path.to_path_buf()),
            }
        }
        match (vertex, fragment) {
            (Some(vertex), Some(fragment)) => Self::from_files(display, vertex, fragment),
            (None, _) => Err(ShaderError::Creation {
                label: describe_paths(paths),
                message: "no vertex stage".to_owned(),
            }),
            (_, None) => Err(ShaderError::Creation {
                label: describe_paths(paths),
                message: "no fragment stage".to_owned(),
            }),
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Location of an active uniform; misses are cached too.
    pub fn uniform_location(&self, name: &str) -> Option<i32> {
        if let Some(location) = self.locations.borrow().get(name) {
            return *location;
        }
        let location = self.program.get_uniform(name).map(|uniform| uniform.location);
        self.locations.borrow_mut().insert(name.to_owned(), location);
        location
    }

    pub fn require_uniform(&self, name: &str) -> Result<i32, ShaderError> {
        self.uniform_location(name).ok_or_else(|| ShaderError::UniformNotFound {
            label: self.label.clone(),
            name: name.to_owned(),
        })
    }

    /// Fails on the first name in `uniforms` the program does not declare.
    pub fn check(&self, uniforms: &UniformSet<'_>) -> Result<(), ShaderError> {
        for name in uniforms.names() {
            self.require_uniform(name)?;
        }
        Ok(())
    }
}

fn describe_error(label: &str, err: ProgramCreationError) -> ShaderError {
    match err {
        ProgramCreationError::CompilationError(..) => ShaderError::Compile {
            label: label.to_owned(),
            log: err.to_string(),
        },
        ProgramCreationError::LinkingError(..) => ShaderError::Link {
            label: label.to_owned(),
            log: err.to_string(),
        },
        other => ShaderError::Creation {
            label: label.to_owned(),
            message: other.to_string(),
        },
    }
}

fn describe_paths<P: AsRef<Path>>(paths: &[P]) -> String {
    paths
        .iter()
        .map(|p| p.as_ref().display().to_string())
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Uniform values addressed by their full GLSL name, e.g. `light.position`.
#[derive(Clone, Default)]
pub struct UniformSet<'a> {
    values: Vec<(String, UniformValue<'a>)>,
}

impl<'a> UniformSet<'a> {
    pub fn new() -> Self {
        UniformSet { values: Vec::new() }
    }

    /// Inserts or replaces `name`.
    pub fn set(mut self, name: &str, value: UniformValue<'a>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: UniformValue<'a>) {
        match self.values.iter_mut().find(|(existing, _)| existing == name) {
            Some(slot) => slot.1 = value,
            None => self.values.push((name.to_owned(), value)),
        }
    }

    pub fn float(self, name: &str, value: f32) -> Self {
        self.set(name, UniformValue::Float(value))
    }

    pub fn int(self, name: &str, value: i32) -> Self {
        self.set(name, UniformValue::SignedInt(value))
    }

    pub fn vec3(self, name: &str, value: [f32; 3]) -> Self {
        self.set(name, UniformValue::Vec3(value))
    }

    pub fn mat3(self, name: &str, value: [[f32; 3]; 3]) -> Self {
        self.set(name, UniformValue::Mat3(value))
    }

    pub fn mat4(self, name: &str, value: [[f32; 4]; 4]) -> Self {
        self.set(name, UniformValue::Mat4(value))
    }

    pub fn texture(self, name: &str, texture: &'a Texture2d, sampler: SamplerBehavior) -> Self {
        self.set(name, UniformValue::Texture2d(texture, Some(sampler)))
    }

    /// Appends every value of `other`, replacing names present in both.
    pub fn extend(mut self, other: &UniformSet<'a>) -> Self {
        for (name, value) in &other.values {
            self.insert(name, *value);
        }
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue<'a>> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

impl<'a> Uniforms for UniformSet<'a> {
    fn visit_values<'b, F: FnMut(&str, UniformValue<'b>)>(&'b self, mut output: F) {
        for (name, value) in &self.values {
            output(name, *value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_tags() {
        assert_eq!(stage_from_name(Path::new("res/phong-vt.glsl")).unwrap(), Stage::Vertex);
        assert_eq!(stage_from_name(Path::new("res/lamp-post-fm.glsl")).unwrap(), Stage::Fragment);
    }

    #[test]
    fn malformed_stage_names() {
        for name in &["phong.glsl", "phong-gt.glsl", "phong-vt.txt", "-vt.glsl", "phong-vt"] {
            match stage_from_name(Path::new(name)) {
                Err(ShaderError::MalformedName { path }) => assert_eq!(path, Path::new(name)),
                other => panic!("{} parsed as {:?}", name, other.map(|_| ())),
            }
        }
    }

    #[test]
    fn missing_source_is_file_access() {
        let err = read_source(Path::new("definitely/not/here-vt.glsl")).unwrap_err();
        assert!(matches!(err, ResourceError::FileAccess { .. }));
        assert!(err.to_string().starts_with("path doesn't exist"));
    }

    #[test]
    fn uniform_set_replaces_existing_names() {
        let set = UniformSet::new()
            .float("material.shininess", 32.0)
            .vec3("light.position", [1.0, 2.0, 3.0])
            .float("material.shininess", 64.0);
        assert_eq!(set.len(), 2);
        match set.get("material.shininess") {
            Some(UniformValue::Float(v)) => assert_eq!(*v, 64.0),
            _ => panic!("shininess missing"),
        }
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["material.shininess", "light.position"]);
    }

    #[test]
    fn extend_merges_in_order() {
        let base = UniformSet::new().int("a", 1).int("b", 2);
        let extra = UniformSet::new().int("b", 3).int("c", 4);
        let merged = base.extend(&extra);
        assert_eq!(merged.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        match merged.get("b") {
            Some(UniformValue::SignedInt(v)) => assert_eq!(*v, 3),
            _ => panic!("b missing"),
        }
    }

    #[test]
    fn visit_values_reports_every_uniform() {
        let set = UniformSet::new()
            .mat4("model", [[0.0; 4]; 4])
            .mat3("normal_matrix", [[0.0; 3]; 3]);
        let mut seen = Vec::new();
        set.visit_values(|name, _| seen.push(name.to_owned()));
        assert_eq!(seen, vec!["model", "normal_matrix"]);
        assert!(!set.is_empty());
    }
}
