//! GLB (binary glTF) container framing.
//!
//! Layout, all little-endian:
//!
//! ```text
//! [magic "glTF"][version 2][total length]
//! [chunk length]["JSON"][json bytes, space padded to 4]
//! [chunk length]["BIN\0"][binary bytes, zero padded to 4]   (optional)
//! ```
//!
//! SPDX-License-Identifier: MIT

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::arena::{BUFFER_ALIGNMENT, padding_for};
use crate::error::{Error, Result};

/// File magic.
pub const GLB_MAGIC: [u8; 4] = *b"glTF";

/// Container version.
pub const GLB_VERSION: u32 = 2;

/// Size of the file header.
pub const HEADER_SIZE: usize = 12;

/// Size of each chunk header.
pub const CHUNK_HEADER_SIZE: usize = 8;

/// Chunk type of the JSON chunk (`"JSON"`).
pub const CHUNK_JSON: u32 = 0x4E4F_534A;

/// Chunk type of the binary chunk (`"BIN\0"`).
pub const CHUNK_BIN: u32 = 0x004E_4942;

fn chunk_length(len: usize) -> usize {
    len + padding_for(len, BUFFER_ALIGNMENT)
}

fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::InvalidGlbChunk {
        message: format!("{value} bytes exceeds the 4 GiB container limit"),
    })
}

/// Assemble a GLB container from JSON text and an optional binary payload.
pub fn write_glb(json: &[u8], bin: Option<&[u8]>) -> Result<Vec<u8>> {
    let json_chunk_len = chunk_length(json.len());
    let bin_chunk_len = bin.map(|b| chunk_length(b.len()));

    let total_len = HEADER_SIZE
        + CHUNK_HEADER_SIZE
        + json_chunk_len
        + bin_chunk_len.map_or(0, |len| CHUNK_HEADER_SIZE + len);

    let mut output = Vec::with_capacity(total_len);

    // GLB header
    output.write_all(&GLB_MAGIC)?;
    output.write_u32::<LittleEndian>(GLB_VERSION)?;
    output.write_u32::<LittleEndian>(to_u32(total_len)?)?;

    // JSON chunk
    output.write_u32::<LittleEndian>(to_u32(json_chunk_len)?)?;
    output.write_u32::<LittleEndian>(CHUNK_JSON)?;
    output.write_all(json)?;
    output.extend(std::iter::repeat_n(b' ', json_chunk_len - json.len()));

    // Binary chunk
    if let (Some(bin), Some(bin_chunk_len)) = (bin, bin_chunk_len) {
        output.write_u32::<LittleEndian>(to_u32(bin_chunk_len)?)?;
        output.write_u32::<LittleEndian>(CHUNK_BIN)?;
        output.write_all(bin)?;
        output.extend(std::iter::repeat_n(0u8, bin_chunk_len - bin.len()));
    }

    debug_assert_eq!(output.len(), total_len);
    Ok(output)
}

/// A parsed GLB container borrowing its chunks from the input.
#[derive(Debug, Clone, Copy)]
pub struct Glb<'a> {
    pub version: u32,
    /// Total length from the header.
    pub length: usize,
    /// JSON chunk contents, including trailing padding.
    pub json: &'a [u8],
    /// Binary chunk contents, including trailing padding.
    pub bin: Option<&'a [u8]>,
}

impl<'a> Glb<'a> {
    /// Parse GLB bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidGlbMagic`], [`Error::UnsupportedGlbVersion`],
    /// [`Error::GlbLengthMismatch`] or [`Error::InvalidGlbChunk`] for malformed
    /// containers, and [`Error::Io`] for truncated data.
    pub fn from_slice(data: &'a [u8]) -> Result<Self> {
        let mut cursor = Cursor::new(data);

        let mut magic = [0u8; 4];
        cursor.read_exact(&mut magic)?;
        if magic != GLB_MAGIC {
            return Err(Error::InvalidGlbMagic(magic));
        }

        let version = cursor.read_u32::<LittleEndian>()?;
        if version != GLB_VERSION {
            return Err(Error::UnsupportedGlbVersion { version });
        }

        let length = cursor.read_u32::<LittleEndian>()? as usize;
        if length != data.len() {
            return Err(Error::GlbLengthMismatch {
                declared: length,
                actual: data.len(),
            });
        }

        let mut json = None;
        let mut bin = None;
        let mut offset = HEADER_SIZE;

        while offset < length {
            cursor.set_position(offset as u64);
            let chunk_len = cursor.read_u32::<LittleEndian>()? as usize;
            let chunk_type = cursor.read_u32::<LittleEndian>()?;

            let start = offset + CHUNK_HEADER_SIZE;
            let end = start
                .checked_add(chunk_len)
                .filter(|&end| end <= length)
                .ok_or_else(|| Error::InvalidGlbChunk {
                    message: format!("chunk at {offset} overruns the container"),
                })?;
            if chunk_len % BUFFER_ALIGNMENT != 0 {
                return Err(Error::InvalidGlbChunk {
                    message: format!("chunk at {offset} has unaligned length {chunk_len}"),
                });
            }

            let contents = &data[start..end];
            match chunk_type {
                CHUNK_JSON if json.is_none() && offset == HEADER_SIZE => json = Some(contents),
                CHUNK_BIN if json.is_some() && bin.is_none() => bin = Some(contents),
                CHUNK_JSON | CHUNK_BIN => {
                    return Err(Error::InvalidGlbChunk {
                        message: format!("unexpected chunk {chunk_type:#010x} at {offset}"),
                    });
                }
                // Unknown chunk types are skipped
                _ => tracing::debug!("Skipping GLB chunk {:#010x} at {}", chunk_type, offset),
            }

            offset = end;
        }

        let json = json.ok_or_else(|| Error::InvalidGlbChunk {
            message: "missing JSON chunk".to_string(),
        })?;

        Ok(Self {
            version,
            length,
            json,
            bin,
        })
    }

    /// The JSON chunk as text.
    pub fn json_str(&self) -> Result<&'a str> {
        Ok(std::str::from_utf8(self.json)?)
    }
}
