//! HMAC-SHA1 challenge-response on a YubiKey, over USB.

use std::ops::Deref;

use challenge_response::config::{Config, Mode, Slot};
use challenge_response::Yubico;
use log::debug;

use crate::device::{ChallengeResponse, DeviceError, HmacResponse};
use crate::totp::Challenge;
use crate::{OtpError, Result};

/// One of the two configuration slots of a YubiKey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YubiKeySlot {
    One,
    Two,
}

impl TryFrom<u8> for YubiKeySlot {
    type Error = OtpError;

    fn try_from(slot: u8) -> Result<Self> {
        match slot {
            1 => Ok(YubiKeySlot::One),
            2 => Ok(YubiKeySlot::Two),
            other => Err(OtpError::InvalidParameter(format!(
                "YubiKey slot must be 1 or 2, got {other}"
            ))),
        }
    }
}

impl From<YubiKeySlot> for Slot {
    fn from(slot: YubiKeySlot) -> Self {
        match slot {
            YubiKeySlot::One => Slot::Slot1,
            YubiKeySlot::Two => Slot::Slot2,
        }
    }
}

pub struct YubiKey {
    yubi: Yubico,
}

impl YubiKey {
    pub fn open() -> std::result::Result<Self, DeviceError> {
        let yubi = Yubico::new().map_err(|e| DeviceError::new(e.to_string()))?;
        Ok(YubiKey { yubi })
    }
}

impl ChallengeResponse for YubiKey {
    type Slot = YubiKeySlot;

    fn challenge_response(
        &mut self,
        slot: &YubiKeySlot,
        challenge: &Challenge,
    ) -> std::result::Result<HmacResponse, DeviceError> {
        let device = self
            .yubi
            .find_yubikey()
            .map_err(|e| DeviceError::new(format!("no YubiKey found: {e}")))?;
        debug!(
            "using YubiKey {:?}:{:?}, slot {:?}",
            device.vendor_id, device.product_id, slot
        );

        // In variable size mode the key drops the trailing zero padding
        // before computing the HMAC.
        let config = Config::new_from(device)
            .set_variable_size(true)
            .set_mode(Mode::Sha1)
            .set_slot((*slot).into());

        let hmac = self
            .yubi
            .challenge_response_hmac(challenge.as_bytes(), config)
            .map_err(|e| DeviceError::new(e.to_string()))?;
        Ok(HmacResponse::from(hmac.deref().to_vec()))
    }
}
