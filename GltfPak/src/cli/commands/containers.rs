//! Container conversion commands

use std::path::Path;
use std::time::Instant;

use anyhow::Context;

use crate::cli::progress::{DISK, LOOKING_GLASS, PACKAGE, SCISSORS, print_done, print_step, simple_spinner};
use crate::convert;
use crate::prune::JsonStyle;

/// Convert a linked .gltf into a .glb.
pub fn pack(source: &Path, dest: &Path, style: JsonStyle, quiet: bool) -> anyhow::Result<()> {
    let start = Instant::now();

    if !quiet {
        print_step(1, 2, LOOKING_GLASS, &format!("Reading {}...", source.display()));
    }
    let spinner = (!quiet).then(|| simple_spinner("Packing..."));

    convert::pack(source, dest, style)
        .with_context(|| format!("failed to pack {}", source.display()))?;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    if !quiet {
        print_step(2, 2, PACKAGE, &format!("Wrote {}", dest.display()));
        print_done(start.elapsed());
    }

    Ok(())
}

/// Split a .glb into .gltf + .bin.
pub fn unpack(source: &Path, dest: &Path, style: JsonStyle, quiet: bool) -> anyhow::Result<()> {
    let start = Instant::now();

    if !quiet {
        print_step(1, 2, LOOKING_GLASS, &format!("Reading {}...", source.display()));
    }

    convert::unpack(source, dest, style)
        .with_context(|| format!("failed to unpack {}", source.display()))?;

    if !quiet {
        print_step(2, 2, DISK, &format!("Wrote {}", dest.display()));
        print_done(start.elapsed());
    }

    Ok(())
}

/// Rewrite a document without undeclared extension payloads.
pub fn prune(source: &Path, dest: &Path, style: JsonStyle, quiet: bool) -> anyhow::Result<()> {
    let start = Instant::now();

    if !quiet {
        print_step(1, 1, SCISSORS, &format!("Pruning {}...", source.display()));
    }

    convert::prune_file(source, dest, style)
        .with_context(|| format!("failed to prune {}", source.display()))?;

    if !quiet {
        print_done(start.elapsed());
    }

    Ok(())
}
