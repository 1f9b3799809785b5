use crate::prune::JsonStyle;

use super::{Commands, containers, inspect};

fn json_style(compact: bool) -> JsonStyle {
    if compact {
        JsonStyle::Compact
    } else {
        JsonStyle::Pretty
    }
}

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying conversion fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Inspect { source } => inspect::execute(source),
            Commands::Pack {
                source,
                destination,
                compact,
                quiet,
            } => {
                let dest = destination
                    .clone()
                    .unwrap_or_else(|| source.with_extension("glb"));
                containers::pack(source, &dest, json_style(*compact), *quiet)
            }
            Commands::Unpack {
                source,
                destination,
                compact,
                quiet,
            } => {
                let dest = destination
                    .clone()
                    .unwrap_or_else(|| source.with_extension("gltf"));
                containers::unpack(source, &dest, json_style(*compact), *quiet)
            }
            Commands::Prune {
                source,
                output,
                compact,
                quiet,
            } => containers::prune(source, output, json_style(*compact), *quiet),
        }
    }
}
