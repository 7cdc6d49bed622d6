//! Nullable random: deterministic entropy.

use ballotguard_crypto::{CryptoError, Entropy};
use std::sync::Mutex;

/// A deterministic entropy source for testing.
///
/// Each `fill` call takes the next configured output (cycling), repeating
/// its bytes to cover the requested length.
pub struct NullRandom {
    outputs: Vec<Vec<u8>>,
    index: Mutex<usize>,
}

impl NullRandom {
    /// Create with a sequence of deterministic outputs.
    pub fn new(outputs: Vec<Vec<u8>>) -> Self {
        assert!(!outputs.is_empty(), "NullRandom needs at least one output");
        Self {
            outputs,
            index: Mutex::new(0),
        }
    }

    /// Create with a single byte pattern returned for every call.
    pub fn constant(byte: u8) -> Self {
        Self::new(vec![vec![byte]])
    }

    /// Create with a counter: the n-th call fills with byte `n` (wrapping).
    pub fn counting() -> Self {
        Self::new((0..=255u8).map(|b| vec![b]).collect())
    }

    /// Number of `fill` calls served so far.
    pub fn calls(&self) -> usize {
        *self.index.lock().unwrap()
    }
}

impl Entropy for NullRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), CryptoError> {
        let mut idx = self
            .index
            .lock()
            .map_err(|_| CryptoError::Entropy("null random lock poisoned".into()))?;
        let output = &self.outputs[*idx % self.outputs.len()];
        *idx += 1;
        for (i, b) in buf.iter_mut().enumerate() {
            *b = output[i % output.len()];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_cycle() {
        let r = NullRandom::new(vec![vec![1, 2], vec![3]]);
        let mut buf = [0u8; 4];
        r.fill(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 1, 2]);
        r.fill(&mut buf).unwrap();
        assert_eq!(buf, [3, 3, 3, 3]);
        r.fill(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 1, 2]);
        assert_eq!(r.calls(), 3);
    }

    #[test]
    fn constant_receipt_codes_collide() {
        let r = NullRandom::constant(0xAB);
        assert_eq!(r.receipt_code().unwrap(), r.receipt_code().unwrap());
    }
}
