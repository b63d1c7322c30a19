use std::fmt;

use crate::{OtpError, Result};

/// Shortest response dynamic truncation is defined for (one SHA1 digest).
pub const MIN_RESPONSE_LEN: usize = 20;

/// Number of decimal digits in a passcode, between 1 and 9.
///
/// The truncated value is a 31-bit number, so more than 9 digits would
/// no longer be uniformly distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digits(u32);

impl Digits {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 9;

    pub fn new(digits: u32) -> Result<Self> {
        if !(Self::MIN..=Self::MAX).contains(&digits) {
            return Err(OtpError::InvalidParameter(format!(
                "digits must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                digits
            )));
        }
        Ok(Digits(digits))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    fn modulus(self) -> u32 {
        10_u32.pow(self.0)
    }
}

/// A rendered passcode, always exactly as long as requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpCode(String);

impl OtpCode {
    fn render(code: u32, digits: Digits) -> Self {
        OtpCode(format!("{:0width$}", code, width = digits.get() as usize))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OtpCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Turn a raw HMAC into a passcode of `digits` digits (RFC 4226 section 5.3).
///
/// Step 1 of the RFC, the HMAC itself, is the device's job; `hs` is its output.
pub fn truncate(hs: &[u8], digits: Digits) -> Result<OtpCode> {
    // Step 2: Generate a 4-byte string (Dynamic Truncation)
    let sbits = dt(hs)?;

    // Step 3: Compute an HOTP value
    let snum = u32::from_be_bytes(sbits);

    Ok(OtpCode::render(snum % digits.modulus(), digits))
}

fn dt(hs: &[u8]) -> Result<[u8; 4]> {
    let offset = dt_offset(hs)?;
    let mut substr = dt_substr(hs, offset)?;
    substr[0] &= 0b0111_1111;
    Ok(substr)
}

fn dt_substr(hs: &[u8], offset: u8) -> Result<[u8; 4]> {
    let start = offset as usize;
    hs.get(start..start + 4)
        .and_then(|substr| substr.try_into().ok())
        .ok_or(OtpError::InvalidResponse { len: hs.len() })
}

fn dt_offset(hs: &[u8]) -> Result<u8> {
    match hs.last() {
        Some(last) if hs.len() >= MIN_RESPONSE_LEN => Ok(last & 0b1111),
        _ => Err(OtpError::InvalidResponse { len: hs.len() }),
    }
}
