//! Export methods for `GltfBuilder`

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde_json::Value;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::glb::write_glb;
use crate::prune::{JsonStyle, to_pruned_vec};

use super::{ARENA_BUFFER_INDEX, GltfBuilder};

/// One external binary file referenced by a linked document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferPayload {
    /// File name written into the buffer's `uri`.
    pub uri: String,
    pub data: Vec<u8>,
}

/// JSON text plus the buffer files it references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedExport {
    pub json: String,
    pub buffers: Vec<BufferPayload>,
}

impl LinkedExport {
    /// Write the JSON to `path` and every payload next to it.
    ///
    /// # Errors
    /// Returns an error if any file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let mut gltf_file = File::create(path)?;
        gltf_file.write_all(self.json.as_bytes())?;

        for payload in &self.buffers {
            let mut bin_file = File::create(path.with_file_name(&payload.uri))?;
            bin_file.write_all(&payload.data)?;
        }

        Ok(())
    }
}

/// Name of the binary file accompanying `path`: same stem, `.bin` extension.
///
/// # Errors
/// Returns [`Error::InvalidPath`] if `path` has no usable file stem.
pub fn bin_file_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|s| format!("{s}.bin"))
        .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))
}

/// Serialize a typed document, pruning undeclared extensions.
///
/// # Errors
/// Returns an error if JSON serialization fails.
pub fn render_document(document: &Document, style: JsonStyle) -> Result<Vec<u8>> {
    let value = serde_json::to_value(document)?;
    to_pruned_vec(&value, style)
}

fn buffer_count(document: &Value) -> usize {
    document
        .get("buffers")
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

/// Assemble a GLB from a generic glTF tree and its embedded buffer bytes.
///
/// The first buffer loses its `uri` when `bin` is given; other buffers are
/// left as external references.
///
/// # Errors
/// Returns an error if serialization or framing fails.
pub fn glb_from_value(mut document: Value, bin: Option<&[u8]>, style: JsonStyle) -> Result<Vec<u8>> {
    if bin.is_some() {
        if let Some(buffer) = document
            .get_mut("buffers")
            .and_then(|b| b.get_mut(ARENA_BUFFER_INDEX))
            .and_then(Value::as_object_mut)
        {
            buffer.remove("uri");
        }
    }

    let json = to_pruned_vec(&document, style)?;
    write_glb(&json, bin)
}

/// Produce linked-file output from a generic glTF tree and its buffer bytes.
///
/// The single buffer (if any) gets the `.bin` name derived from `path`.
///
/// # Errors
/// Returns [`Error::NotImplemented`] for documents with more than one
/// buffer, and [`Error::InvalidPath`] if `path` has no file stem.
pub fn linked_from_value(
    mut document: Value,
    bin: Vec<u8>,
    path: &Path,
    style: JsonStyle,
) -> Result<LinkedExport> {
    let count = buffer_count(&document);
    if count > 1 {
        return Err(Error::NotImplemented(format!(
            "linked-file export of {count} buffers"
        )));
    }

    let mut buffers = Vec::new();
    if let Some(buffer) = document
        .get_mut("buffers")
        .and_then(|b| b.get_mut(ARENA_BUFFER_INDEX))
        .and_then(Value::as_object_mut)
    {
        let uri = bin_file_name(path)?;
        buffer.insert("uri".to_string(), Value::String(uri.clone()));
        buffers.push(BufferPayload { uri, data: bin });
    }

    let json = to_pruned_vec(&document, style)?;
    let json = String::from_utf8(json).map_err(|e| Error::Utf8Error(e.utf8_error()))?;

    Ok(LinkedExport { json, buffers })
}

impl GltfBuilder {
    /// Close the arena and settle the arena buffer record.
    ///
    /// An empty arena drops the buffer record when it is the only one.
    fn finish(self) -> Result<(Value, Vec<u8>, JsonStyle)> {
        let Self {
            arena,
            mut document,
            options,
        } = self;

        let bin = arena.into_bytes();
        if bin.is_empty() && document.buffers.len() == 1 {
            document.buffers.clear();
        } else if let Some(buffer) = document.buffers.get_mut(ARENA_BUFFER_INDEX) {
            buffer.byte_length = bin.len();
        }

        Ok((serde_json::to_value(&document)?, bin, options.json_style))
    }

    /// Build `.gltf` text plus the `.bin` payload for `path`, without
    /// touching the filesystem.
    ///
    /// # Errors
    /// Returns [`Error::NotImplemented`] if the document holds more than one
    /// buffer, or a serialization error.
    pub fn build_gltf(self, path: &Path) -> Result<LinkedExport> {
        let count = self.document.buffers.len();
        if count != 1 {
            return Err(Error::NotImplemented(format!(
                "linked-file export of {count} buffers"
            )));
        }
        bin_file_name(path)?;

        let (document, bin, style) = self.finish()?;
        linked_from_value(document, bin, path, style)
    }

    /// Build GLB data and return as bytes.
    ///
    /// # Errors
    /// Returns an error if JSON serialization fails.
    pub fn build_glb(self) -> Result<Vec<u8>> {
        let (document, bin, style) = self.finish()?;
        let bin = (!bin.is_empty()).then_some(bin);
        glb_from_value(document, bin.as_deref(), style)
    }

    /// Export as a GLB file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn export_glb(self, path: &Path) -> Result<()> {
        let glb_data = self.build_glb()?;
        let mut file = File::create(path)?;
        file.write_all(&glb_data)?;

        tracing::info!("Exported {} ({} bytes)", path.display(), glb_data.len());
        Ok(())
    }

    /// Export as separate .gltf (JSON) and .bin (binary buffer) files.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn export_gltf(self, path: &Path) -> Result<()> {
        let linked = self.build_gltf(path)?;
        linked.write_to(path)?;

        tracing::info!(
            "Exported {} ({} bytes JSON, {} buffer files)",
            path.display(),
            linked.json.len(),
            linked.buffers.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Buffer;
    use crate::element::BufferTarget;
    use crate::glb::Glb;
    use crate::options::ExportOptions;
    use serde_json::json;

    fn twelve_byte_session() -> GltfBuilder {
        let mut builder = GltfBuilder::with_options(ExportOptions::new().with_json_style(JsonStyle::Compact)).unwrap();
        builder
            .extend_buffer_and_get_accessor_index(&[[0.0f32, 1.0, 2.0]], Some(BufferTarget::ArrayBuffer))
            .unwrap();
        builder
    }

    #[test]
    fn test_glb_from_session() {
        let glb = twelve_byte_session().build_glb().unwrap();
        let parsed = Glb::from_slice(&glb).unwrap();

        assert_eq!(parsed.json.len() % 4, 0);
        assert_eq!(parsed.bin.map(<[u8]>::len), Some(12));
        assert_eq!(glb.len(), 12 + 8 + parsed.json.len() + 8 + 12);

        let doc: Value = serde_json::from_slice(parsed.json).unwrap();
        assert_eq!(doc["buffers"], json!([{ "byteLength": 12 }]));
        assert_eq!(doc["bufferViews"][0]["byteLength"], json!(12));
    }

    #[test]
    fn test_linked_names_bin_after_stem() {
        let linked = twelve_byte_session()
            .build_gltf(Path::new("out/model.gltf"))
            .unwrap();

        assert_eq!(linked.buffers.len(), 1);
        assert_eq!(linked.buffers[0].uri, "model.bin");
        assert_eq!(linked.buffers[0].data.len(), 12);

        let doc: Value = serde_json::from_str(&linked.json).unwrap();
        assert_eq!(doc["buffers"][0]["uri"], json!("model.bin"));
        assert_eq!(doc["buffers"][0]["byteLength"], json!(12));
    }

    #[test]
    fn test_linked_rejects_second_buffer() {
        let mut builder = twelve_byte_session();
        builder.document_mut().buffers.push(Buffer {
            byte_length: 4,
            uri: Some("extra.bin".to_string()),
        });

        let result = builder.build_gltf(Path::new("model.gltf"));
        assert!(matches!(result, Err(Error::NotImplemented(_))));
    }

    #[test]
    fn test_empty_session_omits_binary() {
        let glb = GltfBuilder::new().build_glb().unwrap();
        let parsed = Glb::from_slice(&glb).unwrap();
        assert_eq!(parsed.bin, None);

        let doc: Value = serde_json::from_slice(parsed.json).unwrap();
        assert!(doc.get("buffers").is_none());

        let linked = GltfBuilder::new().build_gltf(Path::new("empty.gltf")).unwrap();
        assert!(linked.buffers.is_empty());
    }

    #[test]
    fn test_bin_name_needs_stem() {
        assert_eq!(bin_file_name(Path::new("a/b/scene.gltf")).unwrap(), "scene.bin");
        assert!(matches!(bin_file_name(Path::new("/")), Err(Error::InvalidPath(_))));
    }

    #[test]
    fn test_export_prunes_undeclared() {
        let mut builder = twelve_byte_session();
        builder.document_mut().extensions.insert("EXT_unused".into(), json!({}));
        builder.set_extension("EXT_kept", json!({ "level": 1 }));

        let glb = builder.build_glb().unwrap();
        let parsed = Glb::from_slice(&glb).unwrap();
        let doc: Value = serde_json::from_slice(parsed.json).unwrap();

        assert_eq!(doc["extensions"], json!({ "EXT_kept": { "level": 1 } }));
        assert_eq!(doc["extensionsUsed"], json!(["EXT_kept"]));
    }
}
