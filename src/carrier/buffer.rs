//! In-memory sample carriers.

use crate::carrier::{Carrier, Shape};
use crate::error::{Error, Result};
use std::path::Path;

/// A primitive sample type that can serve as a carrier element.
///
/// Signed samples are offset by `2^(BITS-1)` onto the unsigned range. The
/// offset only flips the top bit, so low-order bits are the same in both
/// representations.
pub trait Sample: Copy + Send + Sync + 'static {
    /// Storage width in bits.
    const BITS: u32;

    /// Map onto `[0, 2^BITS - 1]`.
    fn to_unsigned(self) -> u64;

    /// Inverse of [`to_unsigned`](Sample::to_unsigned). Only the low `BITS` bits are used.
    fn from_unsigned(value: u64) -> Self;
}

macro_rules! impl_unsigned_sample {
    ($T:ty) => {
        impl Sample for $T {
            const BITS: u32 = <$T>::BITS;

            fn to_unsigned(self) -> u64 {
                u64::from(self)
            }

            fn from_unsigned(value: u64) -> Self {
                value as $T
            }
        }
    };
}

macro_rules! impl_signed_sample {
    ($S:ty, $U:ty) => {
        impl Sample for $S {
            const BITS: u32 = <$S>::BITS;

            fn to_unsigned(self) -> u64 {
                u64::from((self as $U) ^ (1 << (<$S>::BITS - 1)))
            }

            fn from_unsigned(value: u64) -> Self {
                ((value as $U) ^ (1 << (<$S>::BITS - 1))) as $S
            }
        }
    };
}

impl_unsigned_sample!(u8);
impl_unsigned_sample!(u16);
impl_unsigned_sample!(u32);
impl_signed_sample!(i8, u8);
impl_signed_sample!(i16, u16);
impl_signed_sample!(i32, u32);

/// A carrier backed by a vector of samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer<T: Sample> {
    data: Vec<T>,
    shape: Shape,
    bit_depth: u32,
}

impl<T: Sample> SampleBuffer<T> {
    /// Wrap samples laid out according to `shape`.
    pub fn new(data: Vec<T>, shape: Shape) -> Result<Self> {
        if data.len() != shape.len() {
            return Err(Error::ShapeMismatch {
                expected: shape.len(),
                found: data.len(),
            });
        }
        Ok(Self {
            data,
            shape,
            bit_depth: T::BITS,
        })
    }

    /// Wrap samples as a one-dimensional, single-channel carrier.
    pub fn from_flat(data: Vec<T>) -> Self {
        let shape = Shape::flat(data.len());
        Self {
            data,
            shape,
            bit_depth: T::BITS,
        }
    }

    /// Narrow the declared value range to `[0, 2^bit_depth - 1]`.
    ///
    /// Fails if any element is already outside the narrowed range.
    pub fn with_bit_depth(mut self, bit_depth: u32) -> Result<Self> {
        if bit_depth == 0 || bit_depth > T::BITS {
            return Err(Error::InvalidParameter(format!(
                "bit depth must be between 1 and {}, got {}",
                T::BITS,
                bit_depth
            )));
        }
        let max = (1u64 << bit_depth) - 1;
        if let Some((index, value)) = self
            .data
            .iter()
            .map(|s| s.to_unsigned())
            .enumerate()
            .find(|&(_, v)| v > max)
        {
            return Err(Error::ValueOutOfRange {
                index,
                value: value as i64,
                max,
            });
        }
        self.bit_depth = bit_depth;
        Ok(self)
    }

    /// Borrow the samples.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Take the samples back.
    pub fn into_inner(self) -> Vec<T> {
        self.data
    }
}

impl SampleBuffer<u8> {
    /// Read a file as a flat 8-bit carrier.
    pub fn read_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self::from_flat(data))
    }

    /// Write the carrier bytes to a file.
    pub fn write_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }
}

impl<T: Sample> Carrier for SampleBuffer<T> {
    fn shape(&self) -> &Shape {
        &self.shape
    }

    fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    fn get(&self, index: usize) -> u64 {
        self.data[index].to_unsigned()
    }

    fn set(&mut self, index: usize, value: u64) {
        debug_assert!(value <= self.max_value(), "write outside carrier range");
        self.data[index] = T::from_unsigned(value);
    }
}
