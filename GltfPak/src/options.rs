//! Export session configuration
//!
//! Controls arena sizing and JSON formatting for a [`GltfBuilder`] session.
//!
//! [`GltfBuilder`]: crate::builder::GltfBuilder

use serde::Deserialize;

use crate::arena::{ArenaGrowth, DEFAULT_RESERVE_BYTES};
use crate::prune::JsonStyle;

/// Generator string written to `asset.generator` by default.
pub const DEFAULT_GENERATOR: &str = concat!("GltfPak ", env!("CARGO_PKG_VERSION"));

/// Options for one export session.
///
/// Deserializable so host applications can keep them in their own config
/// files; missing fields fall back to the defaults.
///
/// # Example
///
/// ```
/// use gltfpak::{ArenaGrowth, ExportOptions, JsonStyle};
///
/// let options = ExportOptions::new()
///     .with_reserve_bytes(64 * 1024)
///     .with_growth(ArenaGrowth::Fixed)
///     .with_json_style(JsonStyle::Compact);
/// assert_eq!(options.reserve_bytes, 64 * 1024);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Initial arena reservation in bytes
    /// Default: 1 MiB
    pub reserve_bytes: usize,

    /// Behaviour when the reservation is exhausted
    /// Default: grow
    pub growth: ArenaGrowth,

    /// Formatting of the emitted JSON (both linked and GLB output)
    /// Default: pretty
    pub json_style: JsonStyle,

    /// Value for `asset.generator`; `None` omits the field
    pub generator: Option<String>,
}

impl ExportOptions {
    /// Create options with the default reservation and formatting.
    #[must_use]
    pub fn new() -> Self {
        Self {
            reserve_bytes: DEFAULT_RESERVE_BYTES,
            growth: ArenaGrowth::Grow,
            json_style: JsonStyle::Pretty,
            generator: Some(DEFAULT_GENERATOR.to_string()),
        }
    }

    /// Set the initial arena reservation.
    #[must_use]
    pub fn with_reserve_bytes(mut self, reserve_bytes: usize) -> Self {
        self.reserve_bytes = reserve_bytes;
        self
    }

    /// Set the arena growth policy.
    #[must_use]
    pub fn with_growth(mut self, growth: ArenaGrowth) -> Self {
        self.growth = growth;
        self
    }

    /// Set the JSON formatting.
    #[must_use]
    pub fn with_json_style(mut self, json_style: JsonStyle) -> Self {
        self.json_style = json_style;
        self
    }

    /// Set the generator string.
    #[must_use]
    pub fn with_generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new()
    }
}
