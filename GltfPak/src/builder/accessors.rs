//! Buffer view and accessor methods for `GltfBuilder`

use crate::document::{Accessor, BufferView};
use crate::element::{BufferTarget, Element, bounds};
use crate::error::Result;

use super::{ARENA_BUFFER_INDEX, GltfBuilder};

/// Largest `byteStride` glTF allows.
const MAX_BYTE_STRIDE: usize = 252;

/// Byte alignment for a view of `E` bound to `target`.
///
/// Components are aligned to their natural size; vertex attribute views are
/// additionally aligned to 4 bytes.
pub(crate) fn view_alignment<E: Element>(target: Option<BufferTarget>) -> usize {
    let natural = E::component_type().size();
    match target {
        Some(BufferTarget::ArrayBuffer) => natural.max(4),
        _ => natural,
    }
}

/// Stride recorded on a fresh vertex attribute view.
fn vertex_stride<E: Element>(target: Option<BufferTarget>) -> Option<usize> {
    let size = std::mem::size_of::<E>();
    let valid = size % 4 == 0 && (4..=MAX_BYTE_STRIDE).contains(&size);
    (target == Some(BufferTarget::ArrayBuffer) && valid).then_some(size)
}

impl GltfBuilder {
    /// Append `data` to the arena and record a buffer view over it.
    ///
    /// Returns the new view index, or `None` for an empty slice (no view is
    /// created).
    pub fn extend_buffer_and_get_view_index<E: Element>(
        &mut self,
        data: &[E],
        target: Option<BufferTarget>,
    ) -> Result<Option<usize>> {
        if data.is_empty() {
            return Ok(None);
        }

        let (byte_offset, byte_length) = self.arena.append(data, view_alignment::<E>(target))?;

        let bv_idx = self.document.buffer_views.len();
        self.document.buffer_views.push(BufferView {
            buffer: ARENA_BUFFER_INDEX,
            byte_offset,
            byte_length,
            byte_stride: vertex_stride::<E>(target),
            target,
        });

        tracing::debug!(
            "bufferView {}: {} x {:?} at {}..{}",
            bv_idx,
            data.len(),
            E::ACCESSOR_TYPE,
            byte_offset,
            byte_offset + byte_length
        );

        Ok(Some(bv_idx))
    }

    /// Append `data` and create an accessor over a new view.
    ///
    /// The view's `byteStride` is cleared: accessors created here describe
    /// tightly packed data. Returns `None` for an empty slice.
    pub fn extend_buffer_and_get_accessor_index<E: Element>(
        &mut self,
        data: &[E],
        target: Option<BufferTarget>,
    ) -> Result<Option<usize>> {
        self.push_accessor(data, target, false)
    }

    /// Like [`extend_buffer_and_get_accessor_index`], also recording the
    /// per-component `min`/`max` (required for `POSITION`).
    ///
    /// [`extend_buffer_and_get_accessor_index`]: Self::extend_buffer_and_get_accessor_index
    pub fn extend_buffer_and_get_accessor_index_with_bounds<E: Element>(
        &mut self,
        data: &[E],
        target: Option<BufferTarget>,
    ) -> Result<Option<usize>> {
        self.push_accessor(data, target, true)
    }

    /// Mark an integer accessor as normalized (e.g. `WEIGHTS_0` as `u8`).
    pub fn set_accessor_normalized(&mut self, accessor: usize) -> Result<()> {
        self.check_accessor(accessor)?;
        self.document.accessors[accessor].normalized = true;
        Ok(())
    }

    fn push_accessor<E: Element>(
        &mut self,
        data: &[E],
        target: Option<BufferTarget>,
        with_bounds: bool,
    ) -> Result<Option<usize>> {
        let Some(bv_idx) = self.extend_buffer_and_get_view_index(data, target)? else {
            return Ok(None);
        };

        // index buffers must not carry a vertex stride
        self.document.buffer_views[bv_idx].byte_stride = None;

        let (min, max) = if with_bounds {
            bounds(data).map_or((None, None), |(min, max)| (Some(min), Some(max)))
        } else {
            (None, None)
        };

        let acc_idx = self.document.accessors.len();
        self.document.accessors.push(Accessor {
            buffer_view: Some(bv_idx),
            byte_offset: 0,
            component_type: E::component_type(),
            normalized: false,
            count: data.len(),
            accessor_type: E::ACCESSOR_TYPE,
            max,
            min,
            sparse: None,
        });

        Ok(Some(acc_idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{AccessorType, ComponentType};
    use serde_json::json;

    #[test]
    fn test_accessor_indices_follow_call_order() {
        let mut builder = GltfBuilder::new();
        let a = builder.extend_buffer_and_get_accessor_index(&[1.0f32; 5], None).unwrap();
        let b = builder
            .extend_buffer_and_get_accessor_index(&[[0u16; 4]; 2], Some(BufferTarget::ArrayBuffer))
            .unwrap();
        let c = builder
            .extend_buffer_and_get_accessor_index(&[0u32, 1, 2], Some(BufferTarget::ElementArrayBuffer))
            .unwrap();

        assert_eq!((a, b, c), (Some(0), Some(1), Some(2)));
        assert_eq!(builder.document().buffer_views.len(), 3);
    }

    #[test]
    fn test_empty_input_is_sentinel() {
        let mut builder = GltfBuilder::new();
        builder.extend_buffer_and_get_accessor_index(&[1u8], None).unwrap();

        let empty: [[f32; 3]; 0] = [];
        assert_eq!(builder.extend_buffer_and_get_view_index(&empty, None).unwrap(), None);
        assert_eq!(builder.extend_buffer_and_get_accessor_index(&empty, None).unwrap(), None);
        assert_eq!(builder.document().buffer_views.len(), 1);
        assert_eq!(builder.document().accessors.len(), 1);
        assert_eq!(builder.arena().len(), 1);
    }

    #[test]
    fn test_accessor_tags_and_cleared_stride() {
        let mut builder = GltfBuilder::new();
        let normals = [[0.0f32, 1.0, 0.0]; 4];
        let acc = builder
            .extend_buffer_and_get_accessor_index(&normals, Some(BufferTarget::ArrayBuffer))
            .unwrap()
            .unwrap();

        let accessor = &builder.document().accessors[acc];
        assert_eq!(accessor.component_type, ComponentType::Float);
        assert_eq!(accessor.accessor_type, AccessorType::Vec3);
        assert_eq!(accessor.count, 4);
        assert!(accessor.min.is_none());

        let view = &builder.document().buffer_views[0];
        assert_eq!(view.byte_stride, None);
        assert_eq!(view.target, Some(BufferTarget::ArrayBuffer));
        assert_eq!(view.byte_length, 48);
    }

    #[test]
    fn test_view_keeps_vertex_stride() {
        let mut builder = GltfBuilder::new();
        let view = builder
            .extend_buffer_and_get_view_index(&[[1.0f32; 3]; 2], Some(BufferTarget::ArrayBuffer))
            .unwrap()
            .unwrap();
        assert_eq!(builder.document().buffer_views[view].byte_stride, Some(12));

        let indices = builder
            .extend_buffer_and_get_view_index(&[1u16, 2, 3], Some(BufferTarget::ElementArrayBuffer))
            .unwrap()
            .unwrap();
        assert_eq!(builder.document().buffer_views[indices].byte_stride, None);
    }

    #[test]
    fn test_views_never_overlap() {
        let mut builder = GltfBuilder::new();
        builder.extend_buffer_and_get_view_index(&[1u8, 2, 3], None).unwrap();
        builder.extend_buffer_and_get_view_index(&[1u16], None).unwrap();
        builder
            .extend_buffer_and_get_view_index(&[[1.0f32; 2]], Some(BufferTarget::ArrayBuffer))
            .unwrap();
        builder.extend_buffer_and_get_view_index(&[9u8], None).unwrap();
        builder.extend_buffer_and_get_view_index(&[glam::Mat4::IDENTITY], None).unwrap();

        let views = &builder.document().buffer_views;
        for pair in views.windows(2) {
            assert!(pair[0].end() <= pair[1].byte_offset);
        }
        for view in views {
            assert!(view.end() <= builder.arena().len());
        }
        assert_eq!(views[1].byte_offset % 2, 0);
        assert_eq!(views[2].byte_offset % 4, 0);
        assert_eq!(views[4].byte_offset % 4, 0);
    }

    #[test]
    fn test_bounds_recorded() {
        let mut builder = GltfBuilder::new();
        let positions = [glam::Vec3::new(-1.0, 0.0, 2.0), glam::Vec3::new(1.0, 0.5, -2.0)];
        let acc = builder
            .extend_buffer_and_get_accessor_index_with_bounds(&positions, Some(BufferTarget::ArrayBuffer))
            .unwrap()
            .unwrap();

        let accessor = &builder.document().accessors[acc];
        assert_eq!(accessor.min, Some(vec![json!(-1.0), json!(0.0), json!(-2.0)]));
        assert_eq!(accessor.max, Some(vec![json!(1.0), json!(0.5), json!(2.0)]));
    }

    #[test]
    fn test_set_normalized() {
        let mut builder = GltfBuilder::new();
        let acc = builder
            .extend_buffer_and_get_accessor_index(&[[255u8, 0, 0, 0]], Some(BufferTarget::ArrayBuffer))
            .unwrap()
            .unwrap();
        builder.set_accessor_normalized(acc).unwrap();
        assert!(builder.document().accessors[acc].normalized);
        assert!(builder.set_accessor_normalized(5).is_err());
    }
}
