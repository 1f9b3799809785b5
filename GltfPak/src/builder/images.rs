//! Image methods for `GltfBuilder`

use crate::document::Image;
use crate::error::Result;

use super::GltfBuilder;

impl GltfBuilder {
    /// Add an embedded image (encoded PNG/JPEG bytes) through a buffer view.
    /// Returns the image index, or `None` if `data` is empty.
    pub fn extend_image(
        &mut self,
        data: &[u8],
        mime_type: &str,
        name: Option<String>,
    ) -> Result<Option<usize>> {
        // Images have no target and no stride
        let Some(bv_idx) = self.extend_buffer_and_get_view_index(data, None)? else {
            return Ok(None);
        };

        let img_idx = self.document.images.len();
        self.document.images.push(Image {
            name,
            buffer_view: Some(bv_idx),
            mime_type: Some(mime_type.to_string()),
            uri: None,
        });

        Ok(Some(img_idx))
    }
}
