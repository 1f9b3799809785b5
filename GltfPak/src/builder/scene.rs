//! Scene graph methods for `GltfBuilder`
//!
//! Plain append-order bookkeeping for the records callers build around the
//! packed accessors. Nothing here touches the arena.

use serde_json::Value;

use crate::document::{Mesh, Node, Scene, Skin};

use super::GltfBuilder;

impl GltfBuilder {
    /// Add a mesh. Returns the mesh index.
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        let mesh_idx = self.document.meshes.len();
        self.document.meshes.push(mesh);
        mesh_idx
    }

    /// Add a node. Returns the node index.
    pub fn add_node(&mut self, node: Node) -> usize {
        let node_idx = self.document.nodes.len();
        self.document.nodes.push(node);
        node_idx
    }

    /// Add a skin. Returns the skin index.
    pub fn add_skin(&mut self, skin: Skin) -> usize {
        let skin_idx = self.document.skins.len();
        self.document.skins.push(skin);
        skin_idx
    }

    /// Add an opaque material record. Returns the material index.
    pub fn add_material(&mut self, material: Value) -> usize {
        let material_idx = self.document.materials.len();
        self.document.materials.push(material);
        material_idx
    }

    /// Add a scene. The first scene added becomes the default `scene`.
    pub fn add_scene(&mut self, scene: Scene) -> usize {
        let scene_idx = self.document.scenes.len();
        self.document.scenes.push(scene);
        if self.document.scene.is_none() {
            self.document.scene = Some(scene_idx);
        }
        scene_idx
    }

    /// Attach a root-level extension payload and declare it in `extensionsUsed`.
    pub fn set_extension(&mut self, name: &str, payload: Value) {
        self.document.set_extension(name, payload);
    }

    /// Declare an extension used by payloads attached elsewhere (nodes,
    /// materials, ...). Undeclared extension payloads are pruned on export.
    pub fn declare_extension(&mut self, name: &str) {
        self.document.declare_extension(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_indices_are_append_order() {
        let mut builder = GltfBuilder::new();
        assert_eq!(builder.add_node(Node::default()), 0);
        assert_eq!(builder.add_node(Node::default()), 1);
        assert_eq!(builder.add_mesh(Mesh::default()), 0);
        assert_eq!(builder.add_material(json!({ "name": "skin" })), 0);
        assert_eq!(builder.add_skin(Skin::default()), 0);
    }

    #[test]
    fn test_first_scene_is_default() {
        let mut builder = GltfBuilder::new();
        builder.add_scene(Scene::default());
        builder.add_scene(Scene::default());
        assert_eq!(builder.document().scene, Some(0));
    }
}
