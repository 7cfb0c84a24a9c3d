//! Carrier abstraction.
//!
//! A carrier is any indexable sequence of non-negative integers with a known
//! bit depth: image channel values, audio samples, font-table bytes. Media
//! readers and writers live outside this crate; they hand the engine a
//! [`Carrier`] and take it back after embedding.

mod buffer;
mod shape;

pub use buffer::{Sample, SampleBuffer};
pub use shape::Shape;

/// Capability exposed by every carrier: a shaped sequence of elements in
/// `[0, 2^bit_depth - 1]`, addressed by flat row-major index.
pub trait Carrier {
    /// Layout of the elements.
    fn shape(&self) -> &Shape;

    /// Bits per element.
    fn bit_depth(&self) -> u32;

    /// Read an element.
    fn get(&self, index: usize) -> u64;

    /// Overwrite an element. `value` must not exceed [`max_value`](Carrier::max_value).
    fn set(&mut self, index: usize, value: u64);

    /// Largest representable element value.
    fn max_value(&self) -> u64 {
        (1u64 << self.bit_depth()) - 1
    }

    /// Number of elements.
    fn len(&self) -> usize {
        self.shape().len()
    }

    /// Whether the carrier holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
