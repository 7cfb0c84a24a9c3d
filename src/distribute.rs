//! Spreading one payload over several carriers.
//!
//! Each carrier receives an independently framed chunk, so extraction needs
//! the same carriers in the same order and the same [`Split`], but no
//! side-channel chunk lengths. An optional seed scrambles the payload bytes
//! before splitting, so no single carrier holds a contiguous run of them.

use crate::carrier::Carrier;
use crate::codec::Codec;
use crate::error::{Error, Result};
use crate::sequencer::{Seed, Sequence};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// How payload bytes are assigned to carriers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "weights", rename_all = "snake_case")]
pub enum Split {
    /// Byte `i` goes to carrier `i mod n`.
    #[default]
    RoundRobin,
    /// Contiguous chunks of equal size; the last carrier takes the remainder.
    Even,
    /// Contiguous chunks proportional to the weights, one per carrier.
    Weighted(Vec<f64>),
}

impl Split {
    /// Check the split against a carrier count.
    pub fn validate(&self, carriers: usize) -> Result<()> {
        if carriers == 0 {
            return Err(Error::InvalidParameter("no carriers given".to_string()));
        }
        if let Split::Weighted(weights) = self {
            if weights.len() != carriers {
                return Err(Error::InvalidParameter(format!(
                    "{} weights for {} carriers",
                    weights.len(),
                    carriers
                )));
            }
            if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
                return Err(Error::InvalidParameter(
                    "weights must be finite and non-negative".to_string(),
                ));
            }
            let sum: f64 = weights.iter().sum();
            if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
                return Err(Error::InvalidParameter(format!(
                    "weights sum to {}, expected 1",
                    sum
                )));
            }
        }
        Ok(())
    }

    /// Cut `payload` into one chunk per carrier.
    pub fn split(&self, payload: &[u8], carriers: usize) -> Result<Vec<Vec<u8>>> {
        self.validate(carriers)?;
        let chunks = match self {
            Split::RoundRobin => {
                let mut chunks = vec![Vec::new(); carriers];
                for (i, &byte) in payload.iter().enumerate() {
                    chunks[i % carriers].push(byte);
                }
                chunks
            }
            Split::Even | Split::Weighted(_) => self
                .boundaries(payload.len(), carriers)
                .windows(2)
                .map(|w| payload[w[0]..w[1]].to_vec())
                .collect(),
        };
        Ok(chunks)
    }

    /// Reassemble chunks produced by [`split`](Split::split).
    pub fn join(&self, chunks: &[Vec<u8>]) -> Result<Vec<u8>> {
        self.validate(chunks.len())?;
        match self {
            Split::RoundRobin => {
                let n = chunks.len();
                let total: usize = chunks.iter().map(Vec::len).sum();
                for (i, chunk) in chunks.iter().enumerate() {
                    let expected = total / n + usize::from(i < total % n);
                    if chunk.len() != expected {
                        return Err(Error::Framing(format!(
                            "round-robin chunk {} has {} bytes, expected {}",
                            i,
                            chunk.len(),
                            expected
                        )));
                    }
                }
                Ok((0..total).map(|i| chunks[i % n][i / n]).collect())
            }
            Split::Even | Split::Weighted(_) => Ok(chunks.concat()),
        }
    }

    /// Chunk start offsets, followed by the payload length.
    fn boundaries(&self, len: usize, carriers: usize) -> Vec<usize> {
        let mut bounds = Vec::with_capacity(carriers + 1);
        bounds.push(0);
        match self {
            Split::Weighted(weights) => {
                let mut cumulative = 0.0;
                for w in &weights[..carriers - 1] {
                    cumulative += w;
                    let at = ((cumulative * len as f64).round() as usize).min(len);
                    bounds.push(at.max(bounds[bounds.len() - 1]));
                }
            }
            _ => {
                let size = len / carriers;
                bounds.extend((1..carriers).map(|i| i * size));
            }
        }
        bounds.push(len);
        bounds
    }
}

/// Byte `k` of the result is `payload[order[k]]`.
pub fn scramble(payload: &[u8], seed: Option<&Seed>) -> Vec<u8> {
    match seed {
        None => payload.to_vec(),
        Some(seed) => Sequence::new(payload.len(), Some(seed))
            .map(|i| payload[i])
            .collect(),
    }
}

/// Inverse of [`scramble`] under the same seed.
pub fn unscramble(scrambled: &[u8], seed: Option<&Seed>) -> Vec<u8> {
    match seed {
        None => scrambled.to_vec(),
        Some(seed) => {
            let mut payload = vec![0u8; scrambled.len()];
            for (&byte, i) in scrambled.iter().zip(Sequence::new(scrambled.len(), Some(seed))) {
                payload[i] = byte;
            }
            payload
        }
    }
}

/// Embed `payload` across `carriers`, returning modified copies.
///
/// Every chunk is checked against its carrier before any embedding happens,
/// so a capacity failure leaves all carriers untouched. With a `seed`, the
/// bytes are scrambled before splitting.
pub fn embed_across<K, C>(
    codec: &K,
    carriers: &[C],
    payload: &[u8],
    split: &Split,
    seed: Option<&Seed>,
) -> Result<Vec<C>>
where
    K: Codec,
    C: Carrier + Clone,
{
    let chunks = split.split(&scramble(payload, seed), carriers.len())?;

    for (i, (carrier, chunk)) in carriers.iter().zip(&chunks).enumerate() {
        let needed = codec.framing().frame(chunk)?.len();
        if let Err(e) = codec.capacity(carrier)?.ensure_fits(needed) {
            warn!("distribute: carrier {} cannot take {} bytes", i, chunk.len());
            return Err(e);
        }
    }

    let stego = carriers
        .iter()
        .zip(&chunks)
        .map(|(carrier, chunk)| codec.embed(carrier, chunk))
        .collect::<Result<Vec<_>>>()?;
    debug!(
        "distribute: {} bytes over {} carriers ({:?})",
        payload.len(),
        carriers.len(),
        chunks.iter().map(Vec::len).collect::<Vec<_>>()
    );
    Ok(stego)
}

/// Recover a payload written by [`embed_across`] with the same split and seed.
pub fn extract_across<K, C>(
    codec: &K,
    carriers: &[C],
    split: &Split,
    seed: Option<&Seed>,
) -> Result<Vec<u8>>
where
    K: Codec,
    C: Carrier,
{
    let chunks = carriers
        .iter()
        .map(|carrier| codec.extract(carrier))
        .collect::<Result<Vec<_>>>()?;
    Ok(unscramble(&split.join(&chunks)?, seed))
}
