//! Sparse accessor methods for `GltfBuilder`
//!
//! Index packing and value packing are separate steps so one index view can
//! back several sparse accessors with the same sparsity pattern (e.g. the
//! `POSITION` and `NORMAL` deltas of one morph target).

use serde_json::Value;

use crate::document::{Accessor, Attributes, Sparse, SparseIndices, SparseValues};
use crate::element::{BufferTarget, ComponentType, Element, bounds};
use crate::error::{Error, Result};

use super::GltfBuilder;

/// Split a dense array into the indices and values of its non-zero elements.
pub fn extract_sparse<E: Element + PartialEq>(logical: &[E]) -> (Vec<u32>, Vec<E>) {
    let zero = E::zeroed();
    logical
        .iter()
        .enumerate()
        .filter(|(_, value)| **value != zero)
        .map(|(i, value)| (i as u32, *value))
        .unzip()
}

/// Check that `indices` can address `values` inside `[0, logical_count)`.
fn validate_sparse(logical_count: usize, values: usize, indices: &[u32]) -> Result<()> {
    if indices.len() != values {
        return Err(Error::InvalidSparse {
            message: format!("{} indices for {} values", indices.len(), values),
        });
    }
    if indices.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(Error::InvalidSparse {
            message: "indices are not strictly increasing".to_string(),
        });
    }
    if let Some(&last) = indices.last() {
        if last as usize >= logical_count {
            return Err(Error::InvalidSparse {
                message: format!("index {last} out of range for count {logical_count}"),
            });
        }
    }
    Ok(())
}

impl GltfBuilder {
    /// Pack sparse indices as `UNSIGNED_INT` into a view usable by
    /// [`extend_sparse_buffer_and_get_accessor_index`].
    ///
    /// [`extend_sparse_buffer_and_get_accessor_index`]: Self::extend_sparse_buffer_and_get_accessor_index
    pub fn extend_sparse_indices(&mut self, indices: &[u32]) -> Result<Option<usize>> {
        self.extend_buffer_and_get_view_index(indices, None)
    }

    /// Create a sparse accessor of `logical_count` elements whose non-default
    /// elements are `sparse_values` at `sparse_indices`.
    ///
    /// Only the values are written here; `indices_view` must be a view the
    /// caller already packed from `sparse_indices`. Returns `None` when
    /// `sparse_values` is empty.
    pub fn extend_sparse_buffer_and_get_accessor_index<E: Element>(
        &mut self,
        logical_count: usize,
        sparse_values: &[E],
        sparse_indices: &[u32],
        indices_view: usize,
        target: Option<BufferTarget>,
    ) -> Result<Option<usize>> {
        self.push_sparse_accessor(
            logical_count,
            sparse_values,
            sparse_indices,
            indices_view,
            target,
            None,
        )
    }

    /// Pack one morph target from dense per-vertex deltas.
    ///
    /// Vertices where both deltas are zero are left implicit. Positions and
    /// normals share a single index view. Returns the target's attribute map,
    /// empty when every delta is zero.
    pub fn extend_morph_target<E: Element + PartialEq>(
        &mut self,
        position_deltas: &[E],
        normal_deltas: Option<&[E]>,
    ) -> Result<Attributes> {
        let vertex_count = position_deltas.len();
        if let Some(normals) = normal_deltas {
            if normals.len() != vertex_count {
                return Err(Error::InvalidSparse {
                    message: format!(
                        "{} normal deltas for {} position deltas",
                        normals.len(),
                        vertex_count
                    ),
                });
            }
        }

        let zero = E::zeroed();
        let indices: Vec<u32> = (0..vertex_count)
            .filter(|&i| {
                position_deltas[i] != zero || normal_deltas.is_some_and(|n| n[i] != zero)
            })
            .map(|i| i as u32)
            .collect();

        let mut attributes = Attributes::new();
        let Some(indices_view) = self.extend_sparse_indices(&indices)? else {
            return Ok(attributes);
        };

        let positions: Vec<E> = indices.iter().map(|&i| position_deltas[i as usize]).collect();
        // Bounds over the dense deltas include the implicit zeroes
        let position_bounds = bounds(position_deltas);

        if let Some(acc) = self.push_sparse_accessor(
            vertex_count,
            &positions,
            &indices,
            indices_view,
            None,
            position_bounds,
        )? {
            attributes.insert("POSITION".to_string(), acc);
        }

        if let Some(normal_deltas) = normal_deltas {
            let normals: Vec<E> = indices.iter().map(|&i| normal_deltas[i as usize]).collect();
            if let Some(acc) = self.extend_sparse_buffer_and_get_accessor_index(
                vertex_count,
                &normals,
                &indices,
                indices_view,
                None,
            )? {
                attributes.insert("NORMAL".to_string(), acc);
            }
        }

        Ok(attributes)
    }

    fn push_sparse_accessor<E: Element>(
        &mut self,
        logical_count: usize,
        sparse_values: &[E],
        sparse_indices: &[u32],
        indices_view: usize,
        target: Option<BufferTarget>,
        value_bounds: Option<(Vec<Value>, Vec<Value>)>,
    ) -> Result<Option<usize>> {
        if sparse_values.is_empty() {
            return Ok(None);
        }

        // All checks happen before the arena is touched
        self.check_buffer_view(indices_view)?;
        validate_sparse(logical_count, sparse_values.len(), sparse_indices)?;
        let indices_length = self.document.buffer_views[indices_view].byte_length;
        if indices_length != sparse_indices.len() * ComponentType::UnsignedInt.size() {
            return Err(Error::InvalidSparse {
                message: format!(
                    "indices view {indices_view} holds {indices_length} bytes, expected {} u32 indices",
                    sparse_indices.len()
                ),
            });
        }

        let Some(values_view) = self.extend_buffer_and_get_view_index(sparse_values, target)?
        else {
            return Ok(None);
        };
        // sparse values views carry neither target nor stride
        let view = &mut self.document.buffer_views[values_view];
        view.byte_stride = None;
        view.target = None;

        let (min, max) = value_bounds.map_or((None, None), |(min, max)| (Some(min), Some(max)));

        let acc_idx = self.document.accessors.len();
        self.document.accessors.push(Accessor {
            buffer_view: None,
            byte_offset: 0,
            component_type: E::component_type(),
            normalized: false,
            count: logical_count,
            accessor_type: E::ACCESSOR_TYPE,
            max,
            min,
            sparse: Some(Sparse {
                count: sparse_values.len(),
                indices: SparseIndices {
                    buffer_view: indices_view,
                    byte_offset: 0,
                    component_type: ComponentType::UnsignedInt,
                },
                values: SparseValues {
                    buffer_view: values_view,
                    byte_offset: 0,
                },
            }),
        });

        tracing::debug!(
            "sparse accessor {}: {} of {} elements stored",
            acc_idx,
            sparse_values.len(),
            logical_count
        );

        Ok(Some(acc_idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Decode a sparse accessor against a zero base.
    fn decode_sparse(builder: &GltfBuilder, accessor: usize) -> Vec<[f32; 3]> {
        let doc = builder.document();
        let bytes = builder.bin_bytes();
        let accessor = &doc.accessors[accessor];
        let sparse = accessor.sparse.as_ref().unwrap();

        let read_view = |view: usize| {
            let view = &doc.buffer_views[view];
            &bytes[view.byte_offset..view.end()]
        };
        let indices: Vec<u32> = read_view(sparse.indices.buffer_view)
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        let values: Vec<f32> = read_view(sparse.values.buffer_view)
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();

        let mut logical = vec![[0.0f32; 3]; accessor.count];
        for (k, &index) in indices.iter().enumerate() {
            logical[index as usize] = [values[k * 3], values[k * 3 + 1], values[k * 3 + 2]];
        }
        logical
    }

    #[test]
    fn test_extract_sparse() {
        let dense = [[0.0f32; 3], [1.0, 0.0, 0.0], [0.0; 3], [0.0, 0.0, -2.0]];
        let (indices, values) = extract_sparse(&dense);
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(values, vec![[1.0, 0.0, 0.0], [0.0, 0.0, -2.0]]);
    }

    #[test]
    fn test_sparse_round_trip() {
        let dense = [
            [0.0f32; 3],
            [0.5, 0.25, 0.0],
            [0.0; 3],
            [0.0; 3],
            [-1.0, 2.0, 3.0],
            [0.0; 3],
        ];
        let (indices, values) = extract_sparse(&dense);

        let mut builder = GltfBuilder::new();
        let view = builder.extend_sparse_indices(&indices).unwrap().unwrap();
        let acc = builder
            .extend_sparse_buffer_and_get_accessor_index(dense.len(), &values, &indices, view, None)
            .unwrap()
            .unwrap();

        let accessor = &builder.document().accessors[acc];
        assert_eq!(accessor.buffer_view, None);
        assert_eq!(accessor.count, 6);
        let sparse = accessor.sparse.as_ref().unwrap();
        assert_eq!(sparse.count, 2);
        assert_eq!(sparse.indices.component_type, ComponentType::UnsignedInt);
        assert_eq!(builder.document().buffer_views[sparse.values.buffer_view].byte_stride, None);

        assert_eq!(decode_sparse(&builder, acc), dense.to_vec());
    }

    #[test]
    fn test_index_view_is_shared() {
        let indices = [0u32, 2];
        let mut builder = GltfBuilder::new();
        let view = builder.extend_sparse_indices(&indices).unwrap().unwrap();

        let a = builder
            .extend_sparse_buffer_and_get_accessor_index(3, &[[1.0f32; 3]; 2], &indices, view, None)
            .unwrap()
            .unwrap();
        let b = builder
            .extend_sparse_buffer_and_get_accessor_index(3, &[[2.0f32; 3]; 2], &indices, view, None)
            .unwrap()
            .unwrap();

        let accessors = &builder.document().accessors;
        assert_eq!(accessors[a].sparse.as_ref().unwrap().indices.buffer_view, view);
        assert_eq!(accessors[b].sparse.as_ref().unwrap().indices.buffer_view, view);
        // one index view + two value views
        assert_eq!(builder.document().buffer_views.len(), 3);
    }

    #[test]
    fn test_values_view_has_no_target_or_stride() {
        let mut builder = GltfBuilder::new();
        let view = builder.extend_sparse_indices(&[1]).unwrap().unwrap();
        let acc = builder
            .extend_sparse_buffer_and_get_accessor_index(
                4,
                &[[1.0f32, 2.0, 3.0]],
                &[1],
                view,
                Some(BufferTarget::ArrayBuffer),
            )
            .unwrap()
            .unwrap();

        let values_view = builder.document().accessors[acc].sparse.as_ref().unwrap().values.buffer_view;
        let json = serde_json::to_value(&builder.document().buffer_views[values_view]).unwrap();
        assert!(json.get("target").is_none());
        assert!(json.get("byteStride").is_none());
    }

    #[test]
    fn test_empty_sparse_values_is_sentinel() {
        let mut builder = GltfBuilder::new();
        let empty: [[f32; 3]; 0] = [];
        assert_eq!(
            builder
                .extend_sparse_buffer_and_get_accessor_index(10, &empty, &[], 99, None)
                .unwrap(),
            None
        );
        assert!(builder.document().accessors.is_empty());
        assert_eq!(builder.extend_sparse_indices(&[]).unwrap(), None);
    }

    #[test]
    fn test_invalid_sparse_rejected_before_packing() {
        let mut builder = GltfBuilder::new();
        let view = builder.extend_sparse_indices(&[3, 1]).unwrap().unwrap();
        let arena_len = builder.arena().len();

        let unsorted = builder.extend_sparse_buffer_and_get_accessor_index(5, &[1.0f32, 2.0], &[3, 1], view, None);
        assert!(matches!(unsorted, Err(Error::InvalidSparse { .. })));

        let out_of_range = builder.extend_sparse_buffer_and_get_accessor_index(2, &[1.0f32, 2.0], &[0, 4], view, None);
        assert!(matches!(out_of_range, Err(Error::InvalidSparse { .. })));

        let mismatched = builder.extend_sparse_buffer_and_get_accessor_index(5, &[1.0f32], &[0, 1], view, None);
        assert!(matches!(mismatched, Err(Error::InvalidSparse { .. })));

        let unknown_view = builder.extend_sparse_buffer_and_get_accessor_index(5, &[1.0f32], &[0], 7, None);
        assert!(matches!(unknown_view, Err(Error::UnknownBufferView { index: 7, count: 1 })));

        let wrong_view_size = builder.extend_sparse_buffer_and_get_accessor_index(5, &[1.0f32], &[0], view, None);
        assert!(matches!(wrong_view_size, Err(Error::InvalidSparse { .. })));

        assert_eq!(builder.arena().len(), arena_len);
        assert!(builder.document().accessors.is_empty());
    }

    #[test]
    fn test_morph_target() {
        let positions = [[0.0f32; 3], [0.0, 1.0, 0.0], [0.0; 3], [0.0; 3]];
        let normals = [[0.0f32; 3], [0.0; 3], [0.0, 0.0, 1.0], [0.0; 3]];

        let mut builder = GltfBuilder::new();
        let target = builder.extend_morph_target(&positions, Some(&normals)).unwrap();

        assert_eq!(target.get("POSITION"), Some(&0));
        assert_eq!(target.get("NORMAL"), Some(&1));

        let accessors = &builder.document().accessors;
        let position_sparse = accessors[0].sparse.as_ref().unwrap();
        let normal_sparse = accessors[1].sparse.as_ref().unwrap();
        assert_eq!(position_sparse.count, 2);
        assert_eq!(position_sparse.indices.buffer_view, normal_sparse.indices.buffer_view);
        assert_eq!(accessors[0].min, Some(vec![json!(0.0), json!(0.0), json!(0.0)]));
        assert_eq!(accessors[0].max, Some(vec![json!(0.0), json!(1.0), json!(0.0)]));

        assert_eq!(decode_sparse(&builder, 0), positions.to_vec());
        assert_eq!(decode_sparse(&builder, 1), normals.to_vec());
    }

    #[test]
    fn test_all_zero_morph_target_is_empty() {
        let mut builder = GltfBuilder::new();
        let target = builder.extend_morph_target(&[[0.0f32; 3]; 8], None).unwrap();
        assert!(target.is_empty());
        assert!(builder.document().buffer_views.is_empty());
    }
}
