use unix_time::Instant;

use crate::{OtpError, Result};

/// Size of the block sent to the device, one SHA1 input block.
pub const CHALLENGE_LEN: usize = 64;

const COUNTER_LEN: usize = 8;

/// Number of whole time steps elapsed since `T0`.
///
/// Derived with integer division only, so there is no rounding near step
/// boundaries however large the timestamp gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeCounter(u64);

impl TimeCounter {
    /// `floor(timestamp / step)`, counting from the Unix epoch.
    pub fn derive(timestamp: i64, step: i64) -> Result<Self> {
        Self::derive_since(timestamp, 0, step)
    }

    /// `floor((timestamp - t0) / step)`.
    pub fn derive_since(timestamp: i64, t0: i64, step: i64) -> Result<Self> {
        let (elapsed, step) = elapsed(timestamp, t0, step)?;
        Ok(TimeCounter(elapsed / step))
    }

    /// Seconds left before the counter for `timestamp` moves on.
    pub fn remaining(timestamp: i64, t0: i64, step: i64) -> Result<u64> {
        let (elapsed, step) = elapsed(timestamp, t0, step)?;
        Ok(step - elapsed % step)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<TimeCounter> for Challenge {
    fn from(counter: TimeCounter) -> Self {
        Challenge::new(counter.value())
    }
}

fn elapsed(timestamp: i64, t0: i64, step: i64) -> Result<(u64, u64)> {
    if step <= 0 {
        return Err(OtpError::InvalidParameter(format!(
            "time step must be positive, got {step}"
        )));
    }
    if timestamp < 0 {
        return Err(OtpError::InvalidParameter(format!(
            "timestamp must not be negative, got {timestamp}"
        )));
    }
    if t0 < 0 || t0 > timestamp {
        return Err(OtpError::InvalidParameter(format!(
            "t0 must be between 0 and the timestamp {timestamp}, got {t0}"
        )));
    }
    // Both operands are non-negative here, so the difference is too.
    Ok(((timestamp - t0).unsigned_abs(), step.unsigned_abs()))
}

/// The block sent to the device: the big-endian counter followed by zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge([u8; CHALLENGE_LEN]);

impl Challenge {
    pub fn new(counter: u64) -> Self {
        let mut block = [0u8; CHALLENGE_LEN];
        block[..COUNTER_LEN].copy_from_slice(&counter.to_be_bytes());
        Challenge(block)
    }

    pub fn as_bytes(&self) -> &[u8; CHALLENGE_LEN] {
        &self.0
    }

    /// The leading eight bytes, i.e. the RFC 4226 counter encoding.
    pub fn counter_bytes(&self) -> [u8; COUNTER_LEN] {
        let mut counter = [0u8; COUNTER_LEN];
        counter.copy_from_slice(&self.0[..COUNTER_LEN]);
        counter
    }
}

/// Current Unix time in whole seconds.
pub fn now() -> Result<i64> {
    let elapsed = Instant::now() - Instant::at(0, 0);
    i64::try_from(elapsed.as_secs())
        .map_err(|_| OtpError::InvalidParameter("system clock is out of range".to_string()))
}
