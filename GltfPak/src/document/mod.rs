//! glTF 2.0 document model.
//!
//! Typed records for everything the packer writes (buffers, views,
//! accessors, images) plus the scene records callers usually attach to them.
//! Anything this crate does not interpret stays an opaque JSON tree.

mod types;

pub use types::{
    Accessor, Asset, Attributes, Buffer, BufferView, Document, Extensions, Image, Mesh, Node,
    Primitive, Scene, Skin, Sparse, SparseIndices, SparseValues,
};

use serde_json::Value;

impl Document {
    /// Create an empty glTF 2.0 document.
    #[must_use]
    pub fn new(generator: Option<String>) -> Self {
        Self {
            asset: Asset {
                version: "2.0".to_string(),
                generator,
                copyright: None,
            },
            extensions_used: Vec::new(),
            extensions_required: Vec::new(),
            scene: None,
            scenes: Vec::new(),
            nodes: Vec::new(),
            meshes: Vec::new(),
            skins: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            samplers: Vec::new(),
            images: Vec::new(),
            animations: Vec::new(),
            accessors: Vec::new(),
            buffer_views: Vec::new(),
            buffers: Vec::new(),
            extensions: Extensions::new(),
            extras: None,
        }
    }

    /// Add `name` to `extensionsUsed` unless it is already declared.
    pub fn declare_extension(&mut self, name: &str) {
        if !self.extensions_used.iter().any(|used| used == name) {
            self.extensions_used.push(name.to_string());
        }
    }

    /// Declare `name` as both used and required.
    pub fn require_extension(&mut self, name: &str) {
        self.declare_extension(name);
        if !self.extensions_required.iter().any(|required| required == name) {
            self.extensions_required.push(name.to_string());
        }
    }

    /// Attach a root-level extension payload and declare it as used.
    pub fn set_extension(&mut self, name: &str, payload: Value) {
        self.declare_extension(name);
        self.extensions.insert(name.to_string(), payload);
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(None)
    }
}
