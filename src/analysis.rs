//! Distortion and accuracy metrics.

use crate::carrier::Carrier;
use crate::error::{Error, Result};
use crate::framing::BitStr;

fn check_same_len(expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::ShapeMismatch { expected, found });
    }
    Ok(())
}

/// Mean squared error between two carriers of the same size.
pub fn mse<A, B>(before: &A, after: &B) -> Result<f64>
where
    A: Carrier + ?Sized,
    B: Carrier + ?Sized,
{
    check_same_len(before.len(), after.len())?;
    if before.is_empty() {
        return Ok(0.0);
    }
    let sum: f64 = (0..before.len())
        .map(|i| {
            let d = before.get(i).abs_diff(after.get(i)) as f64;
            d * d
        })
        .sum();
    Ok(sum / before.len() as f64)
}

/// Peak signal-to-noise ratio in dB, with the peak at `before.max_value()`.
///
/// Identical carriers give `f64::INFINITY`.
pub fn psnr<A, B>(before: &A, after: &B) -> Result<f64>
where
    A: Carrier + ?Sized,
    B: Carrier + ?Sized,
{
    let mse = mse(before, after)?;
    if mse == 0.0 {
        return Ok(f64::INFINITY);
    }
    let peak = before.max_value() as f64;
    Ok(10.0 * (peak * peak / mse).log10())
}

/// Number of elements that differ.
pub fn changed_elements<A, B>(before: &A, after: &B) -> Result<usize>
where
    A: Carrier + ?Sized,
    B: Carrier + ?Sized,
{
    check_same_len(before.len(), after.len())?;
    Ok((0..before.len())
        .filter(|&i| before.get(i) != after.get(i))
        .count())
}

/// Number of positions at which two bit strings differ.
pub fn hamming_distance(a: &BitStr, b: &BitStr) -> Result<usize> {
    check_same_len(a.len(), b.len())?;
    Ok(a.iter().by_vals().zip(b.iter().by_vals()).filter(|(x, y)| x != y).count())
}

/// Fraction of differing bits; zero for empty input.
pub fn bit_error_rate(a: &BitStr, b: &BitStr) -> Result<f64> {
    let distance = hamming_distance(a, b)?;
    if a.is_empty() {
        return Ok(0.0);
    }
    Ok(distance as f64 / a.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carrier::SampleBuffer;
    use crate::codec::{Codec, LsbCodec};
    use crate::framing::bytes_to_bits;

    #[test]
    fn test_mse_and_psnr() {
        let a = SampleBuffer::from_flat(vec![10u8, 20, 30, 40]);
        let b = SampleBuffer::from_flat(vec![10u8, 22, 30, 38]);
        assert_eq!(mse(&a, &b).unwrap(), 2.0);
        let expected = 10.0 * (255.0f64 * 255.0 / 2.0).log10();
        assert!((psnr(&a, &b).unwrap() - expected).abs() < 1e-9);
        assert_eq!(psnr(&a, &a).unwrap(), f64::INFINITY);
        assert_eq!(changed_elements(&a, &b).unwrap(), 2);
    }

    #[test]
    fn test_size_mismatch() {
        let a = SampleBuffer::from_flat(vec![0u8; 4]);
        let b = SampleBuffer::from_flat(vec![0u8; 5]);
        assert!(matches!(mse(&a, &b), Err(Error::ShapeMismatch { expected: 4, found: 5 })));
        assert!(hamming_distance(&bytes_to_bits(b"ab"), &bytes_to_bits(b"a")).is_err());
    }

    #[test]
    fn test_bit_metrics() {
        let a = bytes_to_bits(&[0b1111_0000, 0x00]);
        let b = bytes_to_bits(&[0b1111_0011, 0x80]);
        assert_eq!(hamming_distance(&a, &b).unwrap(), 3);
        assert_eq!(bit_error_rate(&a, &b).unwrap(), 3.0 / 16.0);
        assert_eq!(bit_error_rate(&a[..0], &b[..0]).unwrap(), 0.0);
    }

    #[test]
    fn test_lsb_distortion_is_small() {
        let cover = SampleBuffer::from_flat((0..4096).map(|i| (i % 251) as u8).collect());
        let stego = LsbCodec::default().embed(&cover, &[0xA5; 200]).unwrap();
        assert!(mse(&cover, &stego).unwrap() <= 1.0);
        assert!(psnr(&cover, &stego).unwrap() > 48.0);
    }
}
