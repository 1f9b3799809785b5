//! Inspect command
//!
//! Prints a summary of the buffer layout and extension declarations.

use std::path::Path;

use serde_json::Value;

use crate::convert::load_asset;
use crate::glb::Glb;
use crate::prune::{ExtensionsUsed, undeclared_extensions};

fn records<'a>(document: &'a Value, key: &str) -> &'a [Value] {
    document
        .get(key)
        .and_then(Value::as_array)
        .map_or(&[][..], Vec::as_slice)
}

fn field(record: &Value, key: &str) -> String {
    record
        .get(key)
        .map_or_else(|| "-".to_string(), ToString::to_string)
}

/// Inspect a .gltf or .glb file and display its structure.
pub fn execute(path: &Path) -> anyhow::Result<()> {
    println!("Inspecting glTF file: {}", path.display());
    println!();

    let asset = load_asset(path)?;
    let document = &asset.document;

    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("glb")) {
        let data = std::fs::read(path)?;
        let glb = Glb::from_slice(&data)?;
        println!("GLB Container");
        println!("=============");
        println!("Version:     {}", glb.version);
        println!("Length:      {} bytes", glb.length);
        println!("JSON chunk:  {} bytes", glb.json.len());
        match glb.bin {
            Some(bin) => println!("BIN chunk:   {} bytes", bin.len()),
            None => println!("BIN chunk:   none"),
        }
        println!();
    }

    println!("Asset");
    println!("=====");
    println!("Version:     {}", field(&document["asset"], "version"));
    println!("Generator:   {}", field(&document["asset"], "generator"));
    if let Some(bin) = &asset.bin {
        println!("Binary:      {} bytes", bin.len());
    }
    println!();

    let buffers = records(document, "buffers");
    println!("Buffers ({}):", buffers.len());
    for (i, buffer) in buffers.iter().enumerate() {
        println!(
            "  [{:2}] {:>10} bytes  uri={}",
            i,
            field(buffer, "byteLength"),
            field(buffer, "uri")
        );
    }
    println!();

    let views = records(document, "bufferViews");
    println!("Buffer views ({}):", views.len());
    for (i, view) in views.iter().enumerate() {
        println!(
            "  [{:2}] buffer {} | offset {:>8} | length {:>8} | stride {} | target {}",
            i,
            field(view, "buffer"),
            field(view, "byteOffset"),
            field(view, "byteLength"),
            field(view, "byteStride"),
            field(view, "target")
        );
    }
    println!();

    let accessors = records(document, "accessors");
    println!("Accessors ({}):", accessors.len());
    for (i, accessor) in accessors.iter().enumerate() {
        let sparse = accessor
            .get("sparse")
            .map(|s| format!(" | sparse {}", field(s, "count")))
            .unwrap_or_default();
        println!(
            "  [{:2}] view {} | {} x {} {}{}",
            i,
            field(accessor, "bufferView"),
            field(accessor, "count"),
            field(accessor, "type"),
            field(accessor, "componentType"),
            sparse
        );
    }
    println!();

    let used = ExtensionsUsed::from_value(document);
    println!("Extensions used ({}):", used.len());
    for name in used.iter() {
        println!("  - {name}");
    }

    let undeclared = undeclared_extensions(document, &used);
    if !undeclared.is_empty() {
        println!();
        println!("Undeclared (removed on write):");
        for name in &undeclared {
            println!("  - {name}");
        }
    }

    Ok(())
}
