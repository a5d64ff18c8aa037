use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading assets from disk or handing them to the GPU.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("path doesn't exist: {}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {}", path.display())]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to create texture: {0}")]
    Texture(#[from] glium::texture::TextureCreationError),
    #[error("failed to create vertex buffer: {0}")]
    VertexBuffer(#[from] glium::vertex::BufferCreationError),
    #[error("failed to create index buffer: {0}")]
    IndexBuffer(#[from] glium::index::BufferCreationError),
    #[error("cannot expand {0}-channel pixels to RGBA")]
    ChannelCount(usize),
    #[error("interleaved vertex data of length {len} does not match stride {stride}")]
    VertexLayout { len: usize, stride: usize },
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("malformed shader name: {}", path.display())]
    MalformedName { path: PathBuf },
    #[error("{label}\n{log}")]
    Compile { label: String, log: String },
    #[error("failed to link {label}\n{log}")]
    Link { label: String, log: String },
    #[error("{label}: {message}")]
    Creation { label: String, message: String },
    #[error("uniform `{name}` not found in {label}")]
    UniformNotFound { label: String, name: String },
    #[error(transparent)]
    Resource(#[from] ResourceError),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{}: {message}", path.display())]
    Import { path: PathBuf, message: String },
    #[error("{}: mesh `{mesh}` has no {attribute} attribute", path.display())]
    MissingAttribute {
        path: PathBuf,
        mesh: String,
        attribute: &'static str,
    },
    #[error("{}: mesh `{mesh}` has {positions} positions but {normals} normals", path.display())]
    AttributeCount {
        path: PathBuf,
        mesh: String,
        positions: usize,
        normals: usize,
    },
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error(transparent)]
    Shader(#[from] ShaderError),
    #[error("draw failed: {0}")]
    Draw(#[from] glium::DrawError),
}
