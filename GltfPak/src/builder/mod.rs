//! glTF 2.0 export session.
//!
//! A [`GltfBuilder`] owns one [`ArenaBuffer`] and one [`Document`]. Typed
//! arrays are appended through the `extend_*` methods, which return dense,
//! append-ordered indices (or `None` for empty input). The session is
//! consumed by [`GltfBuilder::build_gltf`] or [`GltfBuilder::build_glb`].
//!
//! SPDX-License-Identifier: MIT

mod accessors;
mod export;
mod images;
mod scene;
mod sparse;

pub use export::{
    BufferPayload, LinkedExport, bin_file_name, glb_from_value, linked_from_value, render_document,
};
pub use sparse::extract_sparse;

use crate::arena::ArenaBuffer;
use crate::document::{Buffer, Document};
use crate::error::{Error, Result};
use crate::options::ExportOptions;

/// Index of the arena-backed buffer in `document.buffers`.
pub const ARENA_BUFFER_INDEX: usize = 0;

/// Builder for constructing glTF documents.
pub struct GltfBuilder {
    pub(crate) arena: ArenaBuffer,
    pub(crate) document: Document,
    pub(crate) options: ExportOptions,
}

impl GltfBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::from_parts(ArenaBuffer::new(), ExportOptions::default())
    }

    /// Start a session with custom options.
    ///
    /// # Errors
    /// Returns [`Error::ArenaCapacityExceeded`] if `options.reserve_bytes`
    /// cannot be allocated.
    pub fn with_options(options: ExportOptions) -> Result<Self> {
        let arena = ArenaBuffer::with_reserve(options.reserve_bytes, options.growth)?;
        Ok(Self::from_parts(arena, options))
    }

    fn from_parts(arena: ArenaBuffer, options: ExportOptions) -> Self {
        let mut document = Document::new(options.generator.clone());
        document.buffers.push(Buffer {
            byte_length: 0,
            uri: None,
        });

        Self {
            arena,
            document,
            options,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access for records the builder does not manage (materials,
    /// extension payloads, extras). Views and accessors handed out earlier
    /// must not be rewritten.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn arena(&self) -> &ArenaBuffer {
        &self.arena
    }

    /// Bytes packed so far. The borrow ends before the next append.
    pub fn bin_bytes(&self) -> &[u8] {
        self.arena.bin_bytes()
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub(crate) fn check_buffer_view(&self, index: usize) -> Result<()> {
        let count = self.document.buffer_views.len();
        if index < count {
            Ok(())
        } else {
            Err(Error::UnknownBufferView { index, count })
        }
    }

    pub(crate) fn check_accessor(&self, index: usize) -> Result<()> {
        let count = self.document.accessors.len();
        if index < count {
            Ok(())
        } else {
            Err(Error::UnknownAccessor { index, count })
        }
    }
}

impl Default for GltfBuilder {
    fn default() -> Self {
        Self::new()
    }
}
