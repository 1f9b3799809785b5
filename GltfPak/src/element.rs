//! Element-type dispatch for packed arrays.
//!
//! Every array handed to the builder is a slice of some [`Element`]. The
//! element fixes the accessor `type` (`SCALAR`, `VEC3`, `MAT4`, ...) and its
//! [`Component`] fixes the accessor `componentType`. The set of supported
//! elements is closed: scalars, 2/3/4-vectors, square float matrices, and the
//! matching `glam` types.
//!
//! SPDX-License-Identifier: MIT

use bytemuck::Pod;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// glTF accessor component types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    UnsignedInt,
    Float,
}

impl ComponentType {
    /// The GL enum value written to `componentType`.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Byte => 5120,
            Self::UnsignedByte => 5121,
            Self::Short => 5122,
            Self::UnsignedShort => 5123,
            Self::UnsignedInt => 5125,
            Self::Float => 5126,
        }
    }

    /// Size of one component in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::UnsignedInt | Self::Float => 4,
        }
    }

    /// Look up a component type from its GL enum value.
    #[must_use]
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            5120 => Some(Self::Byte),
            5121 => Some(Self::UnsignedByte),
            5122 => Some(Self::Short),
            5123 => Some(Self::UnsignedShort),
            5125 => Some(Self::UnsignedInt),
            5126 => Some(Self::Float),
            _ => None,
        }
    }
}

impl Serialize for ComponentType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.code())
    }
}

/// glTF accessor element shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessorType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorType {
    /// Number of components per element.
    #[must_use]
    pub const fn components(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }
}

/// Intended GPU binding of a buffer view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Vertex attributes (`ARRAY_BUFFER`, 34962).
    ArrayBuffer,
    /// Vertex indices (`ELEMENT_ARRAY_BUFFER`, 34963).
    ElementArrayBuffer,
}

impl BufferTarget {
    /// The GL enum value written to `target`.
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::ArrayBuffer => 34962,
            Self::ElementArrayBuffer => 34963,
        }
    }
}

impl Serialize for BufferTarget {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(self.code())
    }
}

/// A single numeric component that can be written to a glTF buffer.
pub trait Component: Pod + PartialOrd {
    const COMPONENT_TYPE: ComponentType;

    /// Append the little-endian encoding of `self`.
    fn write_le(self, out: &mut Vec<u8>);

    /// JSON number for accessor `min`/`max`.
    fn bound(self) -> Value;
}

macro_rules! impl_integer_component {
    ($($ty:ty => $component:ident),* $(,)?) => {
        $(
            impl Component for $ty {
                const COMPONENT_TYPE: ComponentType = ComponentType::$component;

                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                fn bound(self) -> Value {
                    Value::from(self)
                }
            }
        )*
    };
}

impl_integer_component! {
    i8 => Byte,
    u8 => UnsignedByte,
    i16 => Short,
    u16 => UnsignedShort,
    u32 => UnsignedInt,
}

impl Component for f32 {
    const COMPONENT_TYPE: ComponentType = ComponentType::Float;

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn bound(self) -> Value {
        // Shortest f32 representation, so 0.1f32 is written as 0.1
        self.to_string()
            .parse::<f64>()
            .map_or(Value::Null, Value::from)
    }
}

/// A fixed-size element of a packed array.
pub trait Element: Pod {
    type Component: Component;
    const ACCESSOR_TYPE: AccessorType;

    /// The `componentType` tag of this element.
    fn component_type() -> ComponentType {
        <Self::Component as Component>::COMPONENT_TYPE
    }

    /// View a slice of elements as its flat component slice.
    fn components(data: &[Self]) -> &[Self::Component] {
        bytemuck::cast_slice(data)
    }
}

macro_rules! impl_scalar_element {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Element for $ty {
                type Component = $ty;
                const ACCESSOR_TYPE: AccessorType = AccessorType::Scalar;
            }
        )*
    };
}

impl_scalar_element!(i8, u8, i16, u16, u32, f32);

impl<C: Component> Element for [C; 2] {
    type Component = C;
    const ACCESSOR_TYPE: AccessorType = AccessorType::Vec2;
}

impl<C: Component> Element for [C; 3] {
    type Component = C;
    const ACCESSOR_TYPE: AccessorType = AccessorType::Vec3;
}

impl<C: Component> Element for [C; 4] {
    type Component = C;
    const ACCESSOR_TYPE: AccessorType = AccessorType::Vec4;
}

impl Element for [f32; 9] {
    type Component = f32;
    const ACCESSOR_TYPE: AccessorType = AccessorType::Mat3;
}

impl Element for [f32; 16] {
    type Component = f32;
    const ACCESSOR_TYPE: AccessorType = AccessorType::Mat4;
}

macro_rules! impl_glam_element {
    ($($ty:ty => $shape:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                type Component = f32;
                const ACCESSOR_TYPE: AccessorType = AccessorType::$shape;
            }
        )*
    };
}

impl_glam_element! {
    glam::Vec2 => Vec2,
    glam::Vec3 => Vec3,
    glam::Vec4 => Vec4,
    glam::Quat => Vec4,
    glam::Mat3 => Mat3,
    glam::Mat4 => Mat4,
}

/// Per-component `(min, max)` over a non-empty element slice.
///
/// Returns `None` for an empty slice.
pub(crate) fn bounds<E: Element>(data: &[E]) -> Option<(Vec<Value>, Vec<Value>)> {
    let width = E::ACCESSOR_TYPE.components();
    let components = E::components(data);
    let first = components.get(..width)?;

    let mut min = first.to_vec();
    let mut max = first.to_vec();
    for element in components.chunks_exact(width) {
        for (i, &c) in element.iter().enumerate() {
            if c < min[i] {
                min[i] = c;
            }
            if c > max[i] {
                max[i] = c;
            }
        }
    }

    Some((
        min.into_iter().map(Component::bound).collect(),
        max.into_iter().map(Component::bound).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_tags() {
        assert_eq!(<[f32; 3]>::ACCESSOR_TYPE, AccessorType::Vec3);
        assert_eq!(<[f32; 3]>::component_type(), ComponentType::Float);
        assert_eq!(<u16 as Element>::ACCESSOR_TYPE, AccessorType::Scalar);
        assert_eq!(<u16 as Element>::component_type().code(), 5123);
        assert_eq!(<[u8; 4]>::ACCESSOR_TYPE, AccessorType::Vec4);
        assert_eq!(<glam::Mat4 as Element>::ACCESSOR_TYPE, AccessorType::Mat4);
        assert_eq!(<glam::Quat as Element>::ACCESSOR_TYPE, AccessorType::Vec4);
    }

    #[test]
    fn test_element_sizes_match_shape() {
        fn check<E: Element>() {
            assert_eq!(
                std::mem::size_of::<E>(),
                E::ACCESSOR_TYPE.components() * E::component_type().size()
            );
        }
        check::<f32>();
        check::<[u16; 4]>();
        check::<[f32; 9]>();
        check::<glam::Vec3>();
        check::<glam::Mat3>();
    }

    #[test]
    fn test_serialized_tags() {
        assert_eq!(serde_json::to_value(AccessorType::Mat4).unwrap(), json!("MAT4"));
        assert_eq!(serde_json::to_value(ComponentType::UnsignedInt).unwrap(), json!(5125));
        assert_eq!(serde_json::to_value(BufferTarget::ElementArrayBuffer).unwrap(), json!(34963));
        assert_eq!(ComponentType::from_code(5126), Some(ComponentType::Float));
        assert_eq!(ComponentType::from_code(5124), None);
    }

    #[test]
    fn test_bounds() {
        let data = [[1.0f32, -2.0, 0.5], [-1.0, 3.0, 0.1]];
        let (min, max) = bounds(&data).unwrap();
        assert_eq!(min, vec![json!(-1.0), json!(-2.0), json!(0.1)]);
        assert_eq!(max, vec![json!(1.0), json!(3.0), json!(0.5)]);

        let (min, max) = bounds(&[7u16, 2, 9]).unwrap();
        assert_eq!(min, vec![json!(2)]);
        assert_eq!(max, vec![json!(9)]);

        assert!(bounds::<f32>(&[]).is_none());
    }
}
