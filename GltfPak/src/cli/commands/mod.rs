use clap::Subcommand;
use std::path::PathBuf;

pub mod containers;
mod execute;
pub mod inspect;

#[derive(Subcommand)]
pub enum Commands {
    /// Show the buffers, views, accessors and extensions of a .gltf or .glb
    Inspect {
        /// Source .gltf or .glb file
        source: PathBuf,
    },

    /// Convert a .gltf + .bin pair into a single .glb
    Pack {
        /// Source .gltf file
        source: PathBuf,

        /// Output .glb file (defaults to the source name with .glb)
        destination: Option<PathBuf>,

        /// Write JSON without whitespace
        #[arg(long)]
        compact: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Split a .glb into a .gltf + .bin pair
    Unpack {
        /// Source .glb file
        source: PathBuf,

        /// Output .gltf file (defaults to the source name with .gltf)
        destination: Option<PathBuf>,

        /// Write JSON without whitespace
        #[arg(long)]
        compact: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Drop extension payloads not declared in extensionsUsed
    Prune {
        /// Source .gltf or .glb file
        source: PathBuf,

        /// Output file (same container type as the source)
        #[arg(short, long)]
        output: PathBuf,

        /// Write JSON without whitespace
        #[arg(long)]
        compact: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },
}
