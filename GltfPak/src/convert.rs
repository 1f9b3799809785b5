//! File-level conversion between linked `.gltf` + `.bin` pairs and `.glb`.
//!
//! These work on generic JSON trees, so documents written by other tools
//! pass through with their records untouched. Extension pruning applies on
//! every write.
//!
//! SPDX-License-Identifier: MIT

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::builder::{ARENA_BUFFER_INDEX, glb_from_value, linked_from_value};
use crate::error::{Error, Result};
use crate::glb::Glb;
use crate::prune::{JsonStyle, to_pruned_vec};

/// A glTF tree together with the bytes of its first buffer, if resolved.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub document: Value,
    pub bin: Option<Vec<u8>>,
}

impl LoadedAsset {
    /// Parse GLB bytes. The binary chunk is trimmed to the first buffer's
    /// `byteLength`.
    pub fn from_glb(data: &[u8]) -> Result<Self> {
        let glb = Glb::from_slice(data)?;
        let document: Value = serde_json::from_slice(glb.json)?;

        let bin = glb.bin.map(|chunk| {
            let len = first_buffer_length(&document).unwrap_or(chunk.len()).min(chunk.len());
            chunk[..len].to_vec()
        });

        Ok(Self { document, bin })
    }

    /// Parse `.gltf` JSON, resolving a relative first-buffer `uri` against
    /// `base_dir`. `data:` URIs are left unresolved.
    pub fn from_gltf(json: &[u8], base_dir: &Path) -> Result<Self> {
        let document: Value = serde_json::from_slice(json)?;

        let uri = document
            .get("buffers")
            .and_then(|b| b.get(ARENA_BUFFER_INDEX))
            .and_then(|b| b.get("uri"))
            .and_then(Value::as_str);

        let bin = match uri {
            Some(uri) if !uri.starts_with("data:") => Some(fs::read(base_dir.join(uri))?),
            _ => None,
        };

        Ok(Self { document, bin })
    }

    /// Number of entries in `buffers`.
    pub fn buffer_count(&self) -> usize {
        self.document
            .get("buffers")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

fn first_buffer_length(document: &Value) -> Option<usize> {
    document
        .get("buffers")?
        .get(ARENA_BUFFER_INDEX)?
        .get("byteLength")?
        .as_u64()
        .and_then(|len| usize::try_from(len).ok())
}

fn is_glb(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("glb"))
}

/// Load a `.glb` or `.gltf` file, chosen by extension.
///
/// # Errors
/// Returns an error if the file or its buffer cannot be read or parsed.
pub fn load_asset(path: &Path) -> Result<LoadedAsset> {
    let data = fs::read(path)?;
    if is_glb(path) {
        LoadedAsset::from_glb(&data)
    } else {
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        LoadedAsset::from_gltf(&data, base_dir)
    }
}

/// Convert a `.gltf` (or `.glb`) file into a `.glb` file.
///
/// # Errors
/// Returns an error if reading, serialization, or writing fails.
pub fn pack(source: &Path, dest: &Path, style: JsonStyle) -> Result<()> {
    let asset = load_asset(source)?;
    let glb = glb_from_value(asset.document, asset.bin.as_deref(), style)?;
    fs::write(dest, &glb)?;

    tracing::info!("Packed {} -> {} ({} bytes)", source.display(), dest.display(), glb.len());
    Ok(())
}

/// Convert a `.glb` (or `.gltf`) file into a `.gltf` + `.bin` pair.
///
/// # Errors
/// Returns [`Error::NotImplemented`] for documents with several buffers,
/// [`Error::InvalidDocument`] if the first buffer has no data, or an I/O
/// error.
pub fn unpack(source: &Path, dest: &Path, style: JsonStyle) -> Result<()> {
    let asset = load_asset(source)?;

    let count = asset.buffer_count();
    let bin = match (asset.bin, count) {
        (Some(bin), _) => bin,
        (None, 0) => Vec::new(),
        (None, _) => {
            return Err(Error::InvalidDocument {
                message: "first buffer has no binary data".to_string(),
            });
        }
    };

    let linked = linked_from_value(asset.document, bin, dest, style)?;
    linked.write_to(dest)?;

    tracing::info!("Unpacked {} -> {}", source.display(), dest.display());
    Ok(())
}

/// Rewrite a document with undeclared extension payloads removed.
///
/// GLB input stays GLB; `.gltf` input keeps its buffer references.
///
/// # Errors
/// Returns an error if reading, serialization, or writing fails.
pub fn prune_file(source: &Path, dest: &Path, style: JsonStyle) -> Result<()> {
    if is_glb(source) {
        let asset = load_asset(source)?;
        let glb = glb_from_value(asset.document, asset.bin.as_deref(), style)?;
        fs::write(dest, glb)?;
    } else {
        let document: Value = serde_json::from_slice(&fs::read(source)?)?;
        fs::write(dest, to_pruned_vec(&document, style)?)?;
    }

    tracing::info!("Pruned {} -> {}", source.display(), dest.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glb::write_glb;
    use serde_json::json;

    #[test]
    fn test_glb_bin_trimmed_to_byte_length() {
        let json = serde_json::to_vec(&json!({ "buffers": [{ "byteLength": 5 }] })).unwrap();
        let glb = write_glb(&json, Some(&[1, 2, 3, 4, 5])).unwrap();

        let asset = LoadedAsset::from_glb(&glb).unwrap();
        assert_eq!(asset.bin, Some(vec![1, 2, 3, 4, 5]));
        assert_eq!(asset.buffer_count(), 1);
    }

    #[test]
    fn test_data_uri_left_unresolved() {
        let json = br#"{"buffers":[{"byteLength":4,"uri":"data:application/octet-stream;base64,AAAAAA=="}]}"#;
        let asset = LoadedAsset::from_gltf(json, Path::new(".")).unwrap();
        assert!(asset.bin.is_none());
    }

    #[test]
    fn test_unpack_glb_writes_pair() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("mesh.glb");
        let dest = dir.path().join("mesh.gltf");

        let json = serde_json::to_vec(&json!({ "buffers": [{ "byteLength": 4 }] })).unwrap();
        fs::write(&source, write_glb(&json, Some(&[9, 8, 7, 6])).unwrap()).unwrap();

        unpack(&source, &dest, JsonStyle::Compact).unwrap();

        assert_eq!(fs::read(dir.path().join("mesh.bin")).unwrap(), vec![9, 8, 7, 6]);
        let doc: Value = serde_json::from_slice(&fs::read(&dest).unwrap()).unwrap();
        assert_eq!(doc["buffers"], json!([{ "byteLength": 4, "uri": "mesh.bin" }]));
    }

    #[test]
    fn test_unpack_requires_binary_for_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("hollow.glb");

        let json = serde_json::to_vec(&json!({ "buffers": [{ "byteLength": 4 }] })).unwrap();
        fs::write(&source, write_glb(&json, None).unwrap()).unwrap();

        let result = unpack(&source, &dir.path().join("hollow.gltf"), JsonStyle::Compact);
        assert!(matches!(result, Err(Error::InvalidDocument { .. })));
    }
}
