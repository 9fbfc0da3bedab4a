//! Value shapes: how a native value is laid out as a dataset.

use ezhdf5_io::Datatype;
use num_complex::Complex;

use crate::registry::H5Type;

/// The storage layout chosen for a value by its static type.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    /// One element, stored as a zero-dimensional dataset.
    Scalar {
        datatype: &'static Datatype,
        bytes: &'a [u8],
    },
    /// `len` contiguous elements, stored as a 1-D dataset.
    Sequence {
        datatype: &'static Datatype,
        len: usize,
        bytes: &'a [u8],
    },
    /// A row-major `rows x cols` block, stored as a 2-D dataset.
    Block {
        datatype: &'static Datatype,
        rows: usize,
        cols: usize,
        bytes: &'a [u8],
    },
    /// A variable-length string.
    Text(&'a str),
}

/// A value that can be assigned to a node.
pub trait Storable {
    /// The layout of this value, or `None` if its elements are not
    /// contiguous in memory.
    fn shape(&self) -> Option<Shape<'_>>;
}

macro_rules! impl_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Storable for $ty {
                fn shape(&self) -> Option<Shape<'_>> {
                    Some(Shape::Scalar {
                        datatype: <$ty as H5Type>::type_descriptor(),
                        bytes: bytemuck::bytes_of(self),
                    })
                }
            }
        )*
    };
}

impl_scalar!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, Complex<f32>, Complex<f64>);

impl<T: H5Type> Storable for [T] {
    fn shape(&self) -> Option<Shape<'_>> {
        Some(Shape::Sequence {
            datatype: T::type_descriptor(),
            len: self.len(),
            bytes: bytemuck::cast_slice(self),
        })
    }
}

impl<T: H5Type> Storable for Vec<T> {
    fn shape(&self) -> Option<Shape<'_>> {
        self.as_slice().shape()
    }
}

impl<T: H5Type, const N: usize> Storable for [T; N] {
    fn shape(&self) -> Option<Shape<'_>> {
        self.as_slice().shape()
    }
}

impl Storable for str {
    fn shape(&self) -> Option<Shape<'_>> {
        Some(Shape::Text(self))
    }
}

impl Storable for String {
    fn shape(&self) -> Option<Shape<'_>> {
        Some(Shape::Text(self))
    }
}

/// A borrowed row-major 2-D view over a flat slice.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a, T> {
    rows: usize,
    cols: usize,
    data: &'a [T],
}

impl<'a, T: H5Type> Block<'a, T> {
    /// View `data` as `rows x cols`. Returns `None` unless
    /// `data.len() == rows * cols`.
    pub fn new(rows: usize, cols: usize, data: &'a [T]) -> Option<Self> {
        (rows.checked_mul(cols)? == data.len()).then_some(Block { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

impl<T: H5Type> Storable for Block<'_, T> {
    fn shape(&self) -> Option<Shape<'_>> {
        Some(Shape::Block {
            datatype: T::type_descriptor(),
            rows: self.rows,
            cols: self.cols,
            bytes: bytemuck::cast_slice(self.data),
        })
    }
}

#[cfg(feature = "ndarray")]
mod ndarray_impls {
    use ndarray::{ArrayBase, Data, Ix1, Ix2};

    use super::{Shape, Storable};
    use crate::registry::H5Type;

    impl<A: H5Type, S: Data<Elem = A>> Storable for ArrayBase<S, Ix1> {
        fn shape(&self) -> Option<Shape<'_>> {
            self.as_slice().map(|s| Shape::Sequence {
                datatype: A::type_descriptor(),
                len: s.len(),
                bytes: bytemuck::cast_slice(s),
            })
        }
    }

    impl<A: H5Type, S: Data<Elem = A>> Storable for ArrayBase<S, Ix2> {
        fn shape(&self) -> Option<Shape<'_>> {
            let (rows, cols) = self.dim();
            self.as_slice().map(|s| Shape::Block {
                datatype: A::type_descriptor(),
                rows,
                cols,
                bytes: bytemuck::cast_slice(s),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_shape() {
        match 42i32.shape() {
            Some(Shape::Scalar { datatype, bytes }) => {
                assert_eq!(datatype.to_string(), "i32");
                assert_eq!(bytes, &42i32.to_ne_bytes());
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn vec_and_array_are_sequences() {
        for shape in [vec![1.0f64, 2.0, 3.0].shape(), [1.0f64, 2.0, 3.0].shape()] {
            match shape {
                Some(Shape::Sequence { len, bytes, .. }) => {
                    assert_eq!(len, 3);
                    assert_eq!(bytes.len(), 24);
                }
                other => panic!("unexpected shape {other:?}"),
            }
        }
    }

    #[test]
    fn text_shape() {
        assert!(matches!("héllo".shape(), Some(Shape::Text("héllo"))));
        assert!(matches!(String::from("x").shape(), Some(Shape::Text("x"))));
    }

    #[test]
    fn block_requires_matching_length() {
        let data = [1u8, 2, 3, 4, 5, 6];
        assert!(Block::new(2, 3, &data).is_some());
        assert!(Block::new(4, 2, &data).is_none());
        assert!(Block::new(usize::MAX, 2, &data).is_none());
    }

    #[cfg(feature = "ndarray")]
    #[test]
    fn ndarray_layouts() {
        let a = ndarray::Array2::<f32>::zeros((2, 3));
        assert!(matches!(
            Storable::shape(&a),
            Some(Shape::Block { rows: 2, cols: 3, .. })
        ));
        let t = a.t();
        assert!(Storable::shape(&t).is_none());

        let v = ndarray::Array1::from(vec![1i64, 2, 3]);
        let strided = v.slice(ndarray::s![..;2]);
        assert!(Storable::shape(&strided).is_none());
        assert!(matches!(
            Storable::shape(&v),
            Some(Shape::Sequence { len: 3, .. })
        ));
    }
}
