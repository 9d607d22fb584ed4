//! Seeded randomness: a portable, string-seeded generator and the draws
//! built on top of it.
//!
//! The generator is ARC4 keyed the way the `seedrandom` JavaScript library
//! keys it, so for ASCII seeds the sequence matches the web client draw for
//! draw. Seed bytes are the UTF-8 encoding of the seed string.

use rand::RngCore;
use std::fmt;

const WIDTH: usize = 256;
const MASK: usize = WIDTH - 1;
/// Number of leading keystream bytes thrown away after keying.
const DISCARD: usize = 256;
/// 2^32, the denominator of a four-byte draw.
const UNIT_DENOM: f64 = 4_294_967_296.0;
/// 2^48, 2^52 and 2^53: bounds of the full-precision draw.
const START_DENOM: f64 = 281_474_976_710_656.0;
const SIGNIFICANCE: f64 = 4_503_599_627_370_496.0;
const OVERFLOW: f64 = 9_007_199_254_740_992.0;

/// ARC4 keystream generator seeded from a string.
#[derive(Clone)]
pub struct SeededRng {
    state: [u8; WIDTH],
    i: usize,
    j: usize,
}

impl SeededRng {
    pub fn from_seed_str(seed: &str) -> Self {
        let key = mix_key(seed.as_bytes());
        let mut rng = Self::from_key(&key);
        for _ in 0..DISCARD {
            rng.next_byte();
        }
        rng
    }

    fn from_key(key: &[u8]) -> Self {
        let key: &[u8] = if key.is_empty() { &[0] } else { key };

        let mut state = [0u8; WIDTH];
        for (i, slot) in state.iter_mut().enumerate() {
            *slot = i as u8;
        }

        let mut j = 0usize;
        for i in 0..WIDTH {
            let t = state[i];
            j = (j + key[i % key.len()] as usize + t as usize) & MASK;
            state[i] = state[j];
            state[j] = t;
        }

        Self { state, i: 0, j: 0 }
    }

    fn next_byte(&mut self) -> u8 {
        self.i = (self.i + 1) & MASK;
        let t = self.state[self.i];
        self.j = (self.j + t as usize) & MASK;
        self.state[self.i] = self.state[self.j];
        self.state[self.j] = t;
        self.state[(self.state[self.i] as usize + t as usize) & MASK]
    }

    /// Big-endian concatenation of the next `count` keystream bytes.
    fn next_bytes_be(&mut self, count: usize) -> u64 {
        (0..count).fold(0u64, |acc, _| (acc << 8) | self.next_byte() as u64)
    }

    /// Full-precision uniform draw in [0, 1) with 52 significant bits.
    pub fn next_double(&mut self) -> f64 {
        let mut n = self.next_bytes_be(6) as f64;
        let mut d = START_DENOM;
        let mut x = 0u64;
        while n < SIGNIFICANCE {
            n = (n + x as f64) * WIDTH as f64;
            d *= WIDTH as f64;
            x = self.next_byte() as u64;
        }
        while n >= OVERFLOW {
            n /= 2.0;
            d /= 2.0;
            x >>= 1;
        }
        (n + x as f64) / d
    }
}

impl fmt::Debug for SeededRng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeededRng")
            .field("i", &self.i)
            .field("j", &self.j)
            .finish_non_exhaustive()
    }
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.next_bytes_be(4) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let high = self.next_u32() as u64;
        let low = self.next_u32() as u64;
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            *byte = self.next_byte();
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Fold the seed into at most 256 key bytes.
///
/// Bytes past the 256th wrap around and are mixed with what is already in
/// the slot.
fn mix_key(seed: &[u8]) -> Vec<u8> {
    let mut key: Vec<u8> = Vec::with_capacity(seed.len().min(WIDTH));
    let mut smear: u32 = 0;

    for (j, &byte) in seed.iter().enumerate() {
        let slot = j & MASK;
        let existing = key.get(slot).copied().unwrap_or(0) as u32;
        smear ^= existing * 19;
        let mixed = (smear.wrapping_add(byte as u32) & MASK as u32) as u8;
        if slot < key.len() {
            key[slot] = mixed;
        } else {
            key.push(mixed);
        }
    }

    key
}

/// The draws the battle engine needs, available on every `RngCore`.
///
/// Every method consumes draws from [`RandomSource::next_unit`] in a fixed
/// pattern, so two sources that agree on `next_unit` agree on everything.
pub trait RandomSource {
    /// Uniform float in [0, 1).
    fn next_unit(&mut self) -> f64;

    /// Uniform integer in `[min, max]`, inclusive. Always consumes one draw.
    fn int(&mut self, min: i64, max: i64) -> i64 {
        (self.next_unit() * (max - min + 1) as f64).floor() as i64 + min
    }

    /// Uniform element of `items`. Consumes one draw even when `items` is
    /// empty, in which case it returns `None`.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        let index = self.int(0, items.len() as i64 - 1);
        usize::try_from(index).ok().and_then(|i| items.get(i))
    }

    /// In-place Fisher–Yates shuffle, walking from the last index down to 1.
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next_unit() * (i + 1) as f64).floor() as usize;
            items.swap(i, j);
        }
    }
}

impl<R: RngCore + ?Sized> RandomSource for R {
    fn next_unit(&mut self) -> f64 {
        self.next_u32() as f64 / UNIT_DENOM
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn full_precision_draw_matches_reference_value() {
        let mut rng = SeededRng::from_seed_str("hello.");
        assert_eq!(rng.next_double(), 0.9282578795792454);
    }

    #[test]
    fn unit_draws_match_reference_values() {
        let mut rng = SeededRng::from_seed_str("83811");
        let draws: Vec<f64> = (0..5).map(|_| rng.next_unit()).collect();
        assert_eq!(
            draws,
            vec![
                0.49363649683073163,
                0.46620311797596514,
                0.1844280743971467,
                0.32891577016562223,
                0.6024372286628932,
            ]
        );
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SeededRng::from_seed_str("18446744073709551615");
        let mut b = SeededRng::from_seed_str("18446744073709551615");
        for _ in 0..64 {
            assert_eq!(a.next_unit(), b.next_unit());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SeededRng::from_seed_str("1");
        let mut b = SeededRng::from_seed_str("2");
        let xs: Vec<f64> = (0..8).map(|_| a.next_unit()).collect();
        let ys: Vec<f64> = (0..8).map(|_| b.next_unit()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn unit_draws_stay_in_range() {
        let mut rng = SeededRng::from_seed_str("range");
        for _ in 0..10_000 {
            let x = rng.next_unit();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn empty_and_long_seeds_are_usable() {
        let mut empty = SeededRng::from_seed_str("");
        assert!(empty.next_unit() < 1.0);

        let long: String = "abcdefghij".repeat(40);
        let mut a = SeededRng::from_seed_str(&long);
        let mut b = SeededRng::from_seed_str(&long[..256]);
        let xs: Vec<u32> = (0..4).map(|_| a.next_u32()).collect();
        let ys: Vec<u32> = (0..4).map(|_| b.next_u32()).collect();
        assert_ne!(xs, ys, "bytes past 256 must still affect the key");
    }

    #[test]
    fn int_is_inclusive() {
        let mut rng = SeededRng::from_seed_str("dice");
        let mut seen = [false; 6];
        for _ in 0..2_000 {
            let roll = rng.int(0, 5);
            assert!((0..=5).contains(&roll));
            seen[roll as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn constant_half_draws() {
        let mut half = StepRng::new(1 << 31, 0);
        assert_eq!(half.next_unit(), 0.5);
        assert_eq!(half.int(0, 5), 3);
        assert_eq!(half.int(10, 30), 20);
        assert_eq!(half.pick(&["a", "b", "c", "d"]), Some(&"c"));
    }

    #[test]
    fn pick_on_empty_still_consumes_a_draw() {
        let mut a = SeededRng::from_seed_str("pick");
        let mut b = SeededRng::from_seed_str("pick");
        let empty: [u8; 0] = [];
        assert_eq!(a.pick(&empty), None);
        b.next_unit();
        assert_eq!(a.next_unit(), b.next_unit());
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = SeededRng::from_seed_str("shuffle");
        let mut items: Vec<u32> = (0..20).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }
}
