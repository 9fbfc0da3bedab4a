//! Mapping from native value types to storage descriptors.
//!
//! Scalars map to the predefined native descriptors. Complex numbers map to a
//! two-field compound (`"r"` then `"i"`) built once per component type and
//! kept for the life of the process, so every lookup returns the same
//! `&'static` descriptor.

use std::sync::OnceLock;

use ezhdf5_format::type_builders::{
    CompoundTypeBuilder, NATIVE_DOUBLE, NATIVE_FLOAT, NATIVE_INT16, NATIVE_INT32, NATIVE_INT64,
    NATIVE_INT8, NATIVE_UINT16, NATIVE_UINT32, NATIVE_UINT64, NATIVE_UINT8,
};
use ezhdf5_io::Datatype;
use log::debug;
use num_complex::Complex;

/// A plain-old-data type with a process-wide storage descriptor.
pub trait H5Type: bytemuck::Pod {
    fn type_descriptor() -> &'static Datatype;
}

macro_rules! impl_native {
    ($($ty:ty => $desc:ident),* $(,)?) => {
        $(
            impl H5Type for $ty {
                fn type_descriptor() -> &'static Datatype {
                    &$desc
                }
            }
        )*
    };
}

impl_native! {
    i8 => NATIVE_INT8,
    i16 => NATIVE_INT16,
    i32 => NATIVE_INT32,
    i64 => NATIVE_INT64,
    u8 => NATIVE_UINT8,
    u16 => NATIVE_UINT16,
    u32 => NATIVE_UINT32,
    u64 => NATIVE_UINT64,
    f32 => NATIVE_FLOAT,
    f64 => NATIVE_DOUBLE,
}

/// Compound of two `T` fields, `"r"` at 0 and `"i"` right after it.
///
/// # Panics
///
/// If the compound cannot be built, which would mean the native descriptor
/// for `T` is broken. This is a start-up failure with no recovery.
fn complex_descriptor<T: H5Type>() -> Datatype {
    let size = std::mem::size_of::<T>();
    let descriptor = CompoundTypeBuilder::new((2 * size) as u32)
        .insert("r", 0, T::type_descriptor().clone())
        .insert("i", size as u64, T::type_descriptor().clone())
        .build()
        .unwrap_or_else(|e| panic!("cannot build complex descriptor: {e}"));
    debug!("registered complex descriptor {descriptor}");
    descriptor
}

macro_rules! impl_complex {
    ($($ty:ty),*) => {
        $(
            impl H5Type for Complex<$ty> {
                fn type_descriptor() -> &'static Datatype {
                    static DESCRIPTOR: OnceLock<Datatype> = OnceLock::new();
                    DESCRIPTOR.get_or_init(complex_descriptor::<$ty>)
                }
            }
        )*
    };
}

impl_complex!(f32, f64);

/// Build every compound descriptor now instead of on first use.
pub fn init_type_registry() {
    Complex::<f32>::type_descriptor();
    Complex::<f64>::type_descriptor();
}

/// The descriptor for `T`.
pub fn descriptor_of<T: H5Type>() -> &'static Datatype {
    T::type_descriptor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezhdf5_format::CompoundMember;

    #[test]
    fn scalar_descriptors_match_sizes() {
        assert_eq!(descriptor_of::<i8>().type_size(), 1);
        assert_eq!(descriptor_of::<u16>().type_size(), 2);
        assert_eq!(descriptor_of::<i32>().type_size(), 4);
        assert_eq!(descriptor_of::<u64>().type_size(), 8);
        assert_eq!(descriptor_of::<f32>().to_string(), "f32");
        assert_eq!(descriptor_of::<f64>().to_string(), "f64");
    }

    #[test]
    fn complex_descriptor_layout() {
        match descriptor_of::<Complex<f64>>() {
            Datatype::Compound { size, members } => {
                assert_eq!(*size, 16);
                let fields: Vec<(&str, u64)> = members
                    .iter()
                    .map(|CompoundMember { name, byte_offset, .. }| (name.as_str(), *byte_offset))
                    .collect();
                assert_eq!(fields, vec![("r", 0), ("i", 8)]);
            }
            other => panic!("expected compound, got {other}"),
        }
        assert_eq!(descriptor_of::<Complex<f32>>().type_size(), 8);
    }

    #[test]
    fn complex_descriptor_is_built_once() {
        init_type_registry();
        let a = descriptor_of::<Complex<f32>>();
        let b = descriptor_of::<Complex<f32>>();
        assert!(std::ptr::eq(a, b));
        assert!(!std::ptr::eq(
            descriptor_of::<Complex<f32>>(),
            descriptor_of::<Complex<f64>>()
        ));
    }

    #[test]
    fn complex_memory_layout_matches_descriptor() {
        let z = Complex::new(3.0f64, -4.0);
        let bytes = bytemuck::bytes_of(&z);
        assert_eq!(&bytes[..8], &3.0f64.to_ne_bytes());
        assert_eq!(&bytes[8..], &(-4.0f64).to_ne_bytes());
    }
}
