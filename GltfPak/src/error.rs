//! Error types for `GltfPak`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `GltfPak` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Arena Errors ====================
    /// The arena reservation is exhausted and the growth policy is fixed.
    #[error("arena capacity exceeded: need {requested} bytes, reservation is {capacity} bytes")]
    ArenaCapacityExceeded {
        /// Total bytes the append would have required.
        requested: usize,
        /// The fixed reservation.
        capacity: usize,
    },

    // ==================== Indexer Errors ====================
    /// A buffer view index does not exist in the document.
    #[error("unknown buffer view {index} (document has {count})")]
    UnknownBufferView {
        /// The requested index.
        index: usize,
        /// Number of buffer views in the document.
        count: usize,
    },

    /// An accessor index does not exist in the document.
    #[error("unknown accessor {index} (document has {count})")]
    UnknownAccessor {
        /// The requested index.
        index: usize,
        /// Number of accessors in the document.
        count: usize,
    },

    /// Sparse indices and values do not describe a valid sparse accessor.
    #[error("invalid sparse accessor: {message}")]
    InvalidSparse {
        /// Description of what is inconsistent.
        message: String,
    },

    // ==================== Export Errors ====================
    /// The requested export configuration is deliberately unsupported.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A generic glTF document is missing data the export needs.
    #[error("invalid glTF document: {message}")]
    InvalidDocument {
        /// Description of what is missing or malformed.
        message: String,
    },

    // ==================== GLB Container Errors ====================
    /// The data does not start with the `glTF` magic.
    #[error("invalid GLB magic: expected glTF, found {0:?}")]
    InvalidGlbMagic([u8; 4]),

    /// The GLB container version is not 2.
    #[error("unsupported GLB version: {version} (supported: 2)")]
    UnsupportedGlbVersion {
        /// The version number found in the header.
        version: u32,
    },

    /// A GLB chunk is missing, misordered, or misaligned.
    #[error("invalid GLB chunk: {message}")]
    InvalidGlbChunk {
        /// Description of the chunk problem.
        message: String,
    },

    /// The header length does not match the data.
    #[error("GLB length mismatch: header declares {declared} bytes, found {actual}")]
    GlbLengthMismatch {
        /// Length from the GLB header.
        declared: usize,
        /// Actual number of bytes supplied.
        actual: usize,
    },

    // ==================== Parsing Errors ====================
    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// UTF-8 conversion error.
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),

    // ==================== File System Errors ====================
    /// Invalid file path.
    #[error("invalid path: {}", .0.display())]
    InvalidPath(PathBuf),
}

/// A specialized Result type for `GltfPak` operations.
pub type Result<T> = std::result::Result<T, Error>;
