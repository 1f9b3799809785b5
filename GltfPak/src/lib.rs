//! # GltfPak
//!
//! Arena-backed glTF 2.0 export: typed arrays go into one binary buffer,
//! described by buffer views and accessors, and the result is written as a
//! linked `.gltf` + `.bin` pair or a single `.glb`.
//!
//! ## Features
//!
//! - **Packing** - Append-only byte arena with per-view alignment
//! - **Accessors** - Component and element tags chosen at compile time
//! - **Sparse accessors** - Index/value pairs over an implicit zero base
//! - **Extension pruning** - Undeclared extension payloads are dropped on output
//! - **Containers** - Linked-file and GLB output, plus a GLB reader
//!
//! ## Quick Start
//!
//! ```no_run
//! use gltfpak::prelude::*;
//!
//! let mut builder = GltfBuilder::new();
//!
//! let positions = [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
//! let position = builder
//!     .extend_buffer_and_get_accessor_index_with_bounds(&positions, Some(BufferTarget::ArrayBuffer))?;
//! let indices = builder
//!     .extend_buffer_and_get_accessor_index(&[0u16, 1, 2], Some(BufferTarget::ElementArrayBuffer))?;
//!
//! let mut primitive = Primitive::default();
//! primitive.attributes.insert("POSITION".into(), position.unwrap_or_default());
//! primitive.indices = indices;
//!
//! let mesh = builder.add_mesh(Mesh { primitives: vec![primitive], ..Mesh::default() });
//! let node = builder.add_node(Node { mesh: Some(mesh), ..Node::default() });
//! builder.add_scene(Scene { nodes: vec![node], ..Scene::default() });
//!
//! builder.export_glb("triangle.glb".as_ref())?;
//! # Ok::<(), gltfpak::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `gltfpak` command-line binary

pub mod arena;
pub mod builder;
pub mod convert;
pub mod document;
pub mod element;
pub mod error;
pub mod glb;
pub mod options;
pub mod prune;

// Re-exports for convenience
pub use arena::{ArenaBuffer, ArenaGrowth};
pub use builder::GltfBuilder;
pub use element::{AccessorType, BufferTarget, Component, ComponentType, Element};
pub use error::{Error, Result};
pub use options::ExportOptions;
pub use prune::{ExtensionsUsed, JsonStyle};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};

    pub use crate::arena::{ArenaBuffer, ArenaGrowth};
    pub use crate::builder::{GltfBuilder, LinkedExport, extract_sparse};
    pub use crate::convert::{LoadedAsset, load_asset, pack, prune_file, unpack};
    pub use crate::document::{Document, Mesh, Node, Primitive, Scene, Skin};
    pub use crate::element::{AccessorType, BufferTarget, ComponentType, Element};
    pub use crate::glb::{Glb, write_glb};
    pub use crate::options::ExportOptions;
    pub use crate::prune::{ExtensionsUsed, JsonStyle, write_pruned};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
