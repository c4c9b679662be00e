//! Fatal setup failures
//!
//! Anything that goes wrong while building the scene stops the game: there is
//! no runtime recovery path for missing assets or an unusable GPU.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse mesh {path}: {source}")]
    Mesh {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("mesh {0} contains no geometry")]
    EmptyMesh(PathBuf),

    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("cube map faces in {0} differ in size")]
    CubeFaceMismatch(PathBuf),

    #[error("invalid settings file {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid setting: {0}")]
    InvalidSetting(&'static str),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("shader program {program} failed validation: {source}")]
    Shader {
        program: String,
        #[source]
        source: wgpu::Error,
    },

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    #[error("GPU ran out of memory while presenting")]
    OutOfMemory,

    #[error("GPU context used before initialization")]
    NotInitialized,
}
