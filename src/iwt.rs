//! Integer Haar wavelet transform.
//!
//! Turns a carrier into a carrier of `i32` coefficients that the codecs embed
//! into like any other carrier, and turns the coefficients back into samples.
//! The transform is a lifting scheme over the positional axes, applied to each
//! channel separately:
//!
//! ```text
//! approx = floor((even + odd) / 2)      even = approx + floor((detail + 1) / 2)
//! detail = even - odd                   odd  = even - detail
//! ```
//!
//! Coefficients stay in place: along each axis the approximation lands on the
//! even index and the detail on the odd one, so subband `key` is the lattice
//! of positions whose parity along each axis matches `key`. On an axis of odd
//! length the last slice is left out of the transform and passes through
//! unchanged, which makes `inverse(forward(c)) == c` for every carrier.

use crate::carrier::{Carrier, Sample, SampleBuffer, Shape};
use crate::error::{Error, Result};
use log::debug;

/// Half of a subband along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    /// Low-pass half (even positions).
    Approx,
    /// High-pass half (odd positions).
    Detail,
}

struct Layout {
    dims: Vec<usize>,
    even: Vec<usize>,
    site_strides: Vec<usize>,
    channels: usize,
}

impl Layout {
    fn new(shape: &Shape) -> Self {
        let dims = shape.dims().to_vec();
        let even = dims.iter().map(|d| d & !1).collect();
        let mut site_strides = vec![1; dims.len()];
        for axis in (0..dims.len().saturating_sub(1)).rev() {
            site_strides[axis] = site_strides[axis + 1] * dims[axis + 1];
        }
        Self {
            dims,
            even,
            site_strides,
            channels: shape.channels(),
        }
    }

    fn coord(&self, site: usize, axis: usize) -> usize {
        site / self.site_strides[axis] % self.dims[axis]
    }

    /// Sites holding the even member of a pair along `axis`.
    fn pair_heads(&self, axis: usize) -> Vec<usize> {
        let sites: usize = self.dims.iter().product();
        (0..sites)
            .filter(|&site| {
                self.coord(site, axis) % 2 == 0
                    && (0..self.dims.len()).all(|a| self.coord(site, a) < self.even[a])
            })
            .collect()
    }

    /// Apply `step` to every `(even, odd)` element pair along `axis`.
    fn lift(&self, values: &mut [i64], axis: usize, step: impl Fn(i64, i64) -> (i64, i64)) {
        let offset = self.site_strides[axis] * self.channels;
        for site in self.pair_heads(axis) {
            for c in 0..self.channels {
                let e = site * self.channels + c;
                let o = e + offset;
                let (a, b) = step(values[e], values[o]);
                values[e] = a;
                values[o] = b;
            }
        }
    }
}

/// Transform `carrier` into wavelet coefficients of the same shape.
///
/// Fails when the coefficients could outgrow `i32`, that is when
/// `bit_depth + axes >= 32`.
pub fn forward<T: Sample>(carrier: &SampleBuffer<T>) -> Result<SampleBuffer<i32>> {
    let shape = carrier.shape();
    let axes = shape.dims().len() as u32;
    if carrier.bit_depth() + axes >= i32::BITS {
        return Err(Error::InvalidParameter(format!(
            "{}-bit carrier over {} axes does not fit 32-bit coefficients",
            carrier.bit_depth(),
            axes
        )));
    }

    let layout = Layout::new(shape);
    let mut values: Vec<i64> = (0..carrier.len()).map(|i| carrier.get(i) as i64).collect();
    for axis in 0..layout.dims.len() {
        layout.lift(&mut values, axis, |even, odd| {
            ((even + odd).div_euclid(2), even - odd)
        });
    }

    let coefficients = values
        .into_iter()
        .map(|v| {
            i32::try_from(v)
                .map_err(|_| Error::InvalidParameter(format!("coefficient {} overflows i32", v)))
        })
        .collect::<Result<Vec<_>>>()?;
    debug!("iwt: forward over {:?} x {}", layout.dims, layout.channels);
    SampleBuffer::new(coefficients, shape.clone())
}

/// Rebuild samples of `bit_depth` bits from coefficients.
///
/// A reconstructed sample outside `[0, 2^bit_depth - 1]` is reported as
/// [`Error::ValueOutOfRange`], never clipped.
pub fn inverse<T: Sample>(coefficients: &SampleBuffer<i32>, bit_depth: u32) -> Result<SampleBuffer<T>> {
    if bit_depth == 0 || bit_depth > T::BITS {
        return Err(Error::InvalidParameter(format!(
            "bit depth must be between 1 and {}, got {}",
            T::BITS,
            bit_depth
        )));
    }

    let shape = coefficients.shape();
    let layout = Layout::new(shape);
    let mut values: Vec<i64> = coefficients.as_slice().iter().map(|&v| i64::from(v)).collect();
    for axis in (0..layout.dims.len()).rev() {
        layout.lift(&mut values, axis, |approx, detail| {
            let even = approx + (detail + 1).div_euclid(2);
            (even, even - detail)
        });
    }

    let max = (1u64 << bit_depth) - 1;
    let samples = values
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            u64::try_from(value)
                .ok()
                .filter(|&v| v <= max)
                .map(T::from_unsigned)
                .ok_or(Error::ValueOutOfRange { index, value, max })
        })
        .collect::<Result<Vec<T>>>()?;
    SampleBuffer::new(samples, shape.clone())?.with_bit_depth(bit_depth)
}

/// Flat indices and shape of subband `key`.
fn band_layout(shape: &Shape, key: &[Band]) -> Result<(Vec<usize>, Shape)> {
    if key.len() != shape.dims().len() {
        return Err(Error::InvalidParameter(format!(
            "band key has {} axes, carrier has {}",
            key.len(),
            shape.dims().len()
        )));
    }

    let layout = Layout::new(shape);
    let band_shape = Shape::new(layout.even.iter().map(|e| e / 2).collect(), layout.channels)?;
    let mut indices = Vec::with_capacity(band_shape.len());
    for band_site in 0..band_shape.sites() {
        let site: usize = band_shape
            .coords(band_site)
            .iter()
            .zip(key)
            .zip(&layout.site_strides)
            .map(|((&b, half), stride)| (2 * b + usize::from(*half == Band::Detail)) * stride)
            .sum();
        indices.extend((0..layout.channels).map(|c| site * layout.channels + c));
    }
    Ok((indices, band_shape))
}

/// Copy subband `key` out of `coefficients`, `key[axis]` picking the half
/// along each positional axis.
pub fn band(coefficients: &SampleBuffer<i32>, key: &[Band]) -> Result<SampleBuffer<i32>> {
    let (indices, shape) = band_layout(coefficients.shape(), key)?;
    let data = indices.iter().map(|&i| coefficients.as_slice()[i]).collect();
    SampleBuffer::new(data, shape)
}

/// Write a (modified) subband back into `coefficients`.
pub fn replace_band(
    coefficients: &mut SampleBuffer<i32>,
    key: &[Band],
    band: &SampleBuffer<i32>,
) -> Result<()> {
    let (indices, shape) = band_layout(coefficients.shape(), key)?;
    if band.shape() != &shape {
        return Err(Error::ShapeMismatch {
            expected: shape.len(),
            found: band.len(),
        });
    }
    for (k, &i) in indices.iter().enumerate() {
        coefficients.set(i, band.get(k));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Codec, LsbCodec};
    use crate::sequencer::Seed;

    fn mixed(len: usize) -> Vec<u8> {
        (0..len).map(|i| ((i * 73 + i * i / 5) % 256) as u8).collect()
    }

    #[test]
    fn test_pair_coefficients() {
        let coeffs = forward(&SampleBuffer::from_flat(vec![10u8, 12, 7])).unwrap();
        // Odd tail passes through.
        assert_eq!(coeffs.as_slice(), &[11, -2, 7]);
    }

    #[test]
    fn test_two_dimensional_coefficients() {
        let shape = Shape::new(vec![2, 2], 1).unwrap();
        let carrier = SampleBuffer::new(vec![1u8, 2, 3, 4], shape).unwrap();
        let coeffs = forward(&carrier).unwrap();
        assert_eq!(coeffs.as_slice(), &[2, -1, -2, 0]);

        assert_eq!(band(&coeffs, &[Band::Approx, Band::Approx]).unwrap().as_slice(), &[2]);
        assert_eq!(band(&coeffs, &[Band::Approx, Band::Detail]).unwrap().as_slice(), &[-1]);
        assert_eq!(band(&coeffs, &[Band::Detail, Band::Detail]).unwrap().as_slice(), &[0]);
        assert_eq!(inverse::<u8>(&coeffs, 8).unwrap(), carrier);
    }

    #[test]
    fn test_inverse_restores_exactly() {
        for dims in [vec![7, 9], vec![8, 8], vec![1, 5], vec![3, 4, 5]] {
            let shape = Shape::new(dims, 3).unwrap();
            let mut data = mixed(shape.len());
            data[0] = 0;
            data[1] = 255;
            let carrier = SampleBuffer::new(data, shape).unwrap();
            let coeffs = forward(&carrier).unwrap();
            assert_eq!(inverse::<u8>(&coeffs, 8).unwrap(), carrier);
        }

        let audio: Vec<i16> = (0..1001i32).map(|i| ((i * 611) % 60000 - 30000) as i16).collect();
        let carrier = SampleBuffer::from_flat(audio);
        let coeffs = forward(&carrier).unwrap();
        assert_eq!(inverse::<i16>(&coeffs, 16).unwrap(), carrier);
    }

    #[test]
    fn test_lsb_in_detail_band() {
        let shape = Shape::new(vec![32, 32], 1).unwrap();
        let data: Vec<u8> = mixed(shape.len()).iter().map(|v| 40 + v % 176).collect();
        let cover = SampleBuffer::new(data, shape).unwrap();
        let key = [Band::Detail, Band::Detail];
        let codec = LsbCodec::default().with_seed(Some(Seed::Number(42)));
        let message = b"wavelet domain";

        let mut coeffs = forward(&cover).unwrap();
        let stego_band = codec.embed(&band(&coeffs, &key).unwrap(), message).unwrap();
        replace_band(&mut coeffs, &key, &stego_band).unwrap();
        let stego = inverse::<u8>(&coeffs, 8).unwrap();

        for (a, b) in cover.as_slice().iter().zip(stego.as_slice()) {
            assert!(a.abs_diff(*b) <= 1);
        }
        let recovered = band(&forward(&stego).unwrap(), &key).unwrap();
        assert_eq!(codec.extract(&recovered).unwrap(), message);
    }

    #[test]
    fn test_out_of_range_reconstruction() {
        let coeffs = SampleBuffer::from_flat(vec![300i32, 0]);
        let err = inverse::<u8>(&coeffs, 8).unwrap_err();
        assert!(matches!(err, Error::ValueOutOfRange { index: 0, value: 300, max: 255 }));

        let coeffs = SampleBuffer::from_flat(vec![0i32, 2]);
        assert!(matches!(
            inverse::<u8>(&coeffs, 8),
            Err(Error::ValueOutOfRange { index: 1, value: -1, .. })
        ));
    }

    #[test]
    fn test_invalid_inputs() {
        let wide = SampleBuffer::from_flat(vec![1u32, 2]);
        assert!(forward(&wide).is_err());

        let mut coeffs = forward(&SampleBuffer::from_flat(mixed(16))).unwrap();
        assert!(band(&coeffs, &[Band::Detail, Band::Detail]).is_err());
        let wrong = SampleBuffer::from_flat(vec![0i32; 3]);
        assert!(matches!(
            replace_band(&mut coeffs, &[Band::Detail], &wrong),
            Err(Error::ShapeMismatch { expected: 8, found: 3 })
        ));
        assert!(inverse::<u8>(&coeffs, 9).is_err());
    }
}
