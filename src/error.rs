use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a whole export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create output directory {path:?}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write scene file {path:?}")]
    WriteScene {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write geometry of {mesh}")]
    Geometry {
        mesh: String,
        #[source]
        source: GeometryError,
    },
    #[error("Malformed scene: {0}")]
    MalformedScene(String),
}

/// Why an external asset could not be copied next to the scene file.
/// Never fatal, callers fall back to a constant value.
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("Image texture node has no image assigned")]
    NoImage,
    #[error("Asset path {0:?} has no file name")]
    NoFileName(PathBuf),
    #[error("Failed to copy {source_path:?} to {destination:?}")]
    Copy {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A recognized node whose inputs do not look like we expect.
#[derive(Debug, Error)]
pub enum MaterialError {
    #[error("Node {node:?} has no input {input:?}")]
    MissingInput { node: String, input: String },
    #[error("Input {input:?} of node {node:?} is not a {expected}")]
    UnexpectedValue {
        node: String,
        input: String,
        expected: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Face {face} references vertex {index}, but the mesh only has {vertex_count} vertices")]
    InvalidIndex {
        face: usize,
        index: u32,
        vertex_count: usize,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures while turning a host scene file into a snapshot.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse scene snapshot {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Gltf(#[from] gltf::Error),
    #[error("glTF file {0:?} has no scene")]
    NoScene(PathBuf),
}
