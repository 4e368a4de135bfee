//! The normalized host scene consumed by the Nori exporter.
//!
//! Host adapters (the JSON snapshot reader, the glTF importer, or a plugin
//! living inside a DCC tool) fill a [`SceneSnapshot`] once, and the exporter
//! only ever reads it.

mod scene;
pub mod transform;

pub use scene::*;
