//! Random values for builders.
//!
//! Builders reach these through [`crate::Factory::helpers`]. A factory created
//! with a seed produces the same values on every run; its dates count back
//! from a fixed instant instead of the current time.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::Value;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";
const DAYS_BACK: i64 = 365;
// 2024-01-01T00:00:00Z
const SEEDED_ANCHOR: i64 = 1_704_067_200;

#[derive(Debug)]
pub struct Helpers {
    rng: Mutex<ChaCha8Rng>,
    anchor: Option<DateTime<Utc>>,
    sequences: Mutex<HashMap<String, u64>>,
}

impl Helpers {
    pub fn new(seed: Option<u64>) -> Self {
        let (rng, anchor) = match seed {
            Some(seed) => (
                ChaCha8Rng::seed_from_u64(seed),
                Utc.timestamp_opt(SEEDED_ANCHOR, 0).single(),
            ),
            None => (ChaCha8Rng::from_entropy(), None),
        };
        Self {
            rng: Mutex::new(rng),
            anchor,
            sequences: Mutex::new(HashMap::new()),
        }
    }

    // poisoning is ignored, the generator state is always usable
    fn rng(&self) -> MutexGuard<'_, ChaCha8Rng> {
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Lowercase hexadecimal string of exactly `len` characters.
    pub fn hex(&self, len: usize) -> String {
        let mut rng = self.rng();
        (0..len)
            .map(|_| HEX_DIGITS[rng.gen_range(0..HEX_DIGITS.len())] as char)
            .collect()
    }

    /// Integer in `min..=max`; the bounds may be given in either order.
    pub fn integer(&self, min: i64, max: i64) -> i64 {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        self.rng().gen_range(low..=high)
    }

    /// RFC 3339 timestamp somewhere in the year before now (or before the
    /// fixed anchor of a seeded factory).
    pub fn date(&self) -> String {
        let seconds = self.rng().gen_range(0..DAYS_BACK * 24 * 60 * 60);
        let anchor = self.anchor.unwrap_or_else(Utc::now);
        (anchor - Duration::seconds(seconds)).to_rfc3339()
    }

    /// One of `choices`, or null when there are none.
    pub fn pick(&self, choices: &[Value]) -> Value {
        if choices.is_empty() {
            return Value::Null;
        }
        let index = self.rng().gen_range(0..choices.len());
        choices[index].clone()
    }

    /// Next value of the counter `name`, starting at 1.
    pub fn sequence(&self, name: &str) -> u64 {
        let mut sequences = self.sequences.lock().unwrap_or_else(|e| e.into_inner());
        let next = sequences.entry(name.to_owned()).or_insert(0);
        *next += 1;
        *next
    }
}

impl Default for Helpers {
    fn default() -> Self {
        Self::new(None)
    }
}
