//! Carrier geometry: positional axes plus a per-position channel depth.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Layout of a carrier.
///
/// `dims` are the positional axes (rows and columns of an image, frames of an
/// audio clip). `channels` is the number of elements stored at each position.
/// Elements are laid out row-major with the channel axis last, so the flat
/// index of `(site, channel)` is `site * channels + channel`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
    channels: usize,
}

impl Shape {
    /// Create a shape from positional axes and a channel count.
    pub fn new(dims: Vec<usize>, channels: usize) -> Result<Self> {
        if dims.is_empty() {
            return Err(Error::InvalidParameter(
                "shape needs at least one positional axis".to_string(),
            ));
        }
        if channels == 0 {
            return Err(Error::InvalidParameter(
                "shape needs at least one channel".to_string(),
            ));
        }
        dims.iter()
            .try_fold(channels, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| Error::InvalidParameter("shape size overflows usize".to_string()))?;
        Ok(Self { dims, channels })
    }

    /// A one-dimensional, single-channel shape.
    pub fn flat(len: usize) -> Self {
        Self {
            dims: vec![len],
            channels: 1,
        }
    }

    /// Positional axes.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Elements per position.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of positions (product of the positional axes).
    pub fn sites(&self) -> usize {
        self.dims.iter().product()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.sites() * self.channels
    }

    /// Whether the shape holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat element index of a channel at a position.
    pub fn flat_index(&self, site: usize, channel: usize) -> usize {
        site * self.channels + channel
    }

    /// Unravel a position into its row-major index tuple.
    pub fn coords(&self, site: usize) -> Vec<usize> {
        let mut coords = vec![0; self.dims.len()];
        let mut rest = site;
        for (axis, &extent) in self.dims.iter().enumerate().rev() {
            if extent == 0 {
                break;
            }
            coords[axis] = rest % extent;
            rest /= extent;
        }
        coords
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_shape() {
        let shape = Shape::new(vec![4, 5], 3).unwrap();
        assert_eq!(shape.sites(), 20);
        assert_eq!(shape.len(), 60);
        assert_eq!(shape.flat_index(7, 2), 23);
    }

    #[test]
    fn test_coords_row_major() {
        let shape = Shape::new(vec![2, 3, 4], 1).unwrap();
        assert_eq!(shape.coords(0), vec![0, 0, 0]);
        assert_eq!(shape.coords(5), vec![0, 1, 1]);
        assert_eq!(shape.coords(23), vec![1, 2, 3]);
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(Shape::new(vec![], 1).is_err());
        assert!(Shape::new(vec![4], 0).is_err());
        assert!(Shape::new(vec![usize::MAX, 2], 1).is_err());
    }

    #[test]
    fn test_flat_shape() {
        let shape = Shape::flat(8);
        assert_eq!(shape.dims(), &[8]);
        assert_eq!(shape.channels(), 1);
        assert!(!shape.is_empty());
        assert!(Shape::flat(0).is_empty());
    }
}
