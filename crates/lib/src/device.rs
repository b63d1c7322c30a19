use hmac::Mac;

use crate::totp::Challenge;

#[cfg(feature = "yubikey")]
pub mod yubikey;

type Sha1Hmac = hmac::Hmac<sha1::Sha1>;

/// Failure reported by a challenge-response device.
///
/// `reason` comes from the device and is passed on untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("device error: {reason}")]
pub struct DeviceError {
    pub reason: String,
}

impl DeviceError {
    pub fn new(reason: impl Into<String>) -> Self {
        DeviceError {
            reason: reason.into(),
        }
    }
}

/// Raw bytes a device returned for a challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HmacResponse(Vec<u8>);

impl HmacResponse {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for HmacResponse {
    fn from(bytes: Vec<u8>) -> Self {
        HmacResponse(bytes)
    }
}

impl From<&[u8]> for HmacResponse {
    fn from(bytes: &[u8]) -> Self {
        HmacResponse(bytes.to_vec())
    }
}

/// Something that computes a keyed HMAC over a challenge without revealing
/// the key.
///
/// One call is one blocking request/response. Implementations own any
/// retry, timeout and locking policy.
pub trait ChallengeResponse {
    /// Selects which key on the device to use (e.g. a slot number).
    type Slot;

    fn challenge_response(
        &mut self,
        slot: &Self::Slot,
        challenge: &Challenge,
    ) -> Result<HmacResponse, DeviceError>;
}

/// HMAC-SHA1 in software over the RFC 4226 counter bytes of the challenge.
///
/// Stands in for a hardware token when the secret is at hand.
pub struct SoftHmac {
    key: Vec<u8>,
}

impl SoftHmac {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        SoftHmac { key: key.into() }
    }
}

impl ChallengeResponse for SoftHmac {
    type Slot = ();

    fn challenge_response(
        &mut self,
        _slot: &(),
        challenge: &Challenge,
    ) -> Result<HmacResponse, DeviceError> {
        let mut mac = Sha1Hmac::new_from_slice(&self.key)
            .map_err(|e| DeviceError::new(e.to_string()))?;
        mac.update(&challenge.counter_bytes());
        Ok(HmacResponse::from(mac.finalize().into_bytes().to_vec()))
    }
}
