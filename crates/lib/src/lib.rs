//! One-time passcodes (RFC 4226 HOTP, RFC 6238 TOTP) whose HMAC-SHA1 is
//! computed by a challenge-response device instead of in process.
//!
//! The crate only prepares the device input and interprets its output:
//! a time-derived counter becomes a 64-byte [`Challenge`], the device answers
//! with an [`HmacResponse`] and dynamic truncation turns that into an
//! [`OtpCode`].

use log::{debug, trace};

pub mod device;
pub mod hotp;
pub mod totp;

pub use device::{ChallengeResponse, DeviceError, HmacResponse, SoftHmac};
pub use hotp::{Digits, OtpCode};
pub use totp::{Challenge, TimeCounter};

/// Default time step in seconds.
pub const DEFAULT_STEP: i64 = 30;

/// Default length of a generated passcode.
pub const DEFAULT_DIGITS: u32 = 6;

#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error("device response of {len} bytes is too short for dynamic truncation")]
    InvalidResponse { len: usize },
}

pub type Result<T> = std::result::Result<T, OtpError>;

/// Everything needed to compute one TOTP code.
///
/// `slot` is handed to the device untouched.
#[derive(Debug, Clone)]
pub struct Request<S> {
    /// Seconds since the Unix epoch, `None` for the current time.
    pub timestamp: Option<i64>,
    /// Unix time at which counting starts (RFC 6238 `T0`).
    pub t0: i64,
    pub step: i64,
    pub digits: u32,
    pub slot: S,
}

impl<S> Request<S> {
    /// A request for the current time with the default step and length.
    pub fn new(slot: S) -> Self {
        Request {
            timestamp: None,
            t0: 0,
            step: DEFAULT_STEP,
            digits: DEFAULT_DIGITS,
            slot,
        }
    }

    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_t0(mut self, t0: i64) -> Self {
        self.t0 = t0;
        self
    }

    pub fn with_step(mut self, step: i64) -> Self {
        self.step = step;
        self
    }

    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }
}

/// Compute a TOTP code, asking `device` for the HMAC.
///
/// All parameters are checked before the device is contacted, and the device
/// is asked exactly once. Any failure it reports is returned as is.
pub fn generate<D: ChallengeResponse>(device: &mut D, request: &Request<D::Slot>) -> Result<OtpCode> {
    let digits = Digits::new(request.digits)?;
    let timestamp = match request.timestamp {
        Some(timestamp) => timestamp,
        None => totp::now()?,
    };
    let counter = TimeCounter::derive_since(timestamp, request.t0, request.step)?;
    debug!(
        "timestamp {} with step {}s gives counter {}",
        timestamp,
        request.step,
        counter.value()
    );

    exchange(device, &request.slot, counter.value(), digits)
}

/// Compute an HOTP code for an explicit event counter.
pub fn generate_hotp<D: ChallengeResponse>(
    device: &mut D,
    counter: u64,
    digits: u32,
    slot: &D::Slot,
) -> Result<OtpCode> {
    let digits = Digits::new(digits)?;
    debug!("using event counter {}", counter);

    exchange(device, slot, counter, digits)
}

fn exchange<D: ChallengeResponse>(
    device: &mut D,
    slot: &D::Slot,
    counter: u64,
    digits: Digits,
) -> Result<OtpCode> {
    let challenge = Challenge::new(counter);
    let response = device.challenge_response(slot, &challenge)?;
    trace!("device answered with {} bytes", response.len());

    hotp::truncate(response.as_bytes(), digits)
}

#[cfg(test)]
mod test {
    use test_case::test_case;

    use crate::{
        generate, generate_hotp, Challenge, ChallengeResponse, DeviceError, HmacResponse,
        OtpError, Request, SoftHmac,
    };

    const RFC_KEY: &[u8] = b"12345678901234567890";

    /// Replays a fixed answer and remembers every challenge it saw.
    struct Scripted {
        answer: Result<Vec<u8>, DeviceError>,
        seen: Vec<(u8, Challenge)>,
    }

    impl Scripted {
        fn answering(answer: Vec<u8>) -> Self {
            Scripted {
                answer: Ok(answer),
                seen: Vec::new(),
            }
        }

        fn failing(reason: &str) -> Self {
            Scripted {
                answer: Err(DeviceError::new(reason)),
                seen: Vec::new(),
            }
        }
    }

    impl ChallengeResponse for Scripted {
        type Slot = u8;

        fn challenge_response(
            &mut self,
            slot: &u8,
            challenge: &Challenge,
        ) -> Result<HmacResponse, DeviceError> {
            self.seen.push((*slot, challenge.clone()));
            self.answer.clone().map(HmacResponse::from)
        }
    }

    // RFC 6238 appendix B, SHA1 column
    #[test_case(59, "94287082")]
    #[test_case(1111111109, "07081804")]
    #[test_case(1111111111, "14050471")]
    #[test_case(1234567890, "89005924")]
    #[test_case(2000000000, "69279037")]
    #[test_case(20000000000, "65353130")]
    fn it_computes_rfc_totp(timestamp: i64, expected: &str) {
        let mut device = SoftHmac::new(RFC_KEY);
        let request = Request::new(()).at(timestamp).with_digits(8);
        let code = generate(&mut device, &request).unwrap();
        assert_eq!(code.as_str(), expected);
    }

    #[test]
    fn it_sends_one_challenge_and_forwards_the_slot() {
        let answer = hex_literal::hex!("278c02e53610f84c40bd9135acd4101012410a14").to_vec();
        let mut device = Scripted::answering(answer);
        let request = Request::new(2).at(1111111109).with_digits(8);

        let code = generate(&mut device, &request).unwrap();

        assert_eq!(code.as_str(), "07081804");
        assert_eq!(device.seen.len(), 1);
        let (slot, challenge) = &device.seen[0];
        assert_eq!(*slot, 2);
        assert_eq!(challenge, &Challenge::new(37037036));
    }

    #[test_case(-1, 30, 6 ; "negative timestamp")]
    #[test_case(59, 0, 6 ; "zero step")]
    #[test_case(59, -30, 6 ; "negative step")]
    #[test_case(59, 30, 0 ; "zero digits")]
    #[test_case(59, 30, 10 ; "too many digits")]
    fn it_rejects_parameters_before_the_device(timestamp: i64, step: i64, digits: u32) {
        let mut device = Scripted::answering(vec![0; 20]);
        let request = Request::new(1)
            .at(timestamp)
            .with_step(step)
            .with_digits(digits);

        let err = generate(&mut device, &request).unwrap_err();

        assert!(matches!(err, OtpError::InvalidParameter(_)), "{err:?}");
        assert!(device.seen.is_empty());
    }

    #[test]
    fn it_rejects_timestamps_before_t0() {
        let mut device = Scripted::answering(vec![0; 20]);
        let request = Request::new(1).at(100).with_t0(200);
        let err = generate(&mut device, &request).unwrap_err();
        assert!(matches!(err, OtpError::InvalidParameter(_)));
        assert!(device.seen.is_empty());
    }

    #[test]
    fn it_propagates_device_errors_verbatim() {
        let mut device = Scripted::failing("key not inserted");
        let request = Request::new(2).at(59);

        let err = generate(&mut device, &request).unwrap_err();

        match err {
            OtpError::Device(e) => assert_eq!(e.reason, "key not inserted"),
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(device.seen.len(), 1);
    }

    #[test]
    fn it_rejects_short_responses() {
        let mut device = Scripted::answering(vec![0; 19]);
        let request = Request::new(2).at(59);
        let err = generate(&mut device, &request).unwrap_err();
        assert!(matches!(err, OtpError::InvalidResponse { len: 19 }));
    }

    #[test]
    fn it_uses_the_clock_when_no_timestamp_is_given() {
        let mut device = Scripted::answering(vec![0; 20]);
        let request = Request::new(1);
        let code = generate(&mut device, &request).unwrap();
        assert_eq!(code.as_str(), "000000");
        let (_, challenge) = &device.seen[0];
        assert_ne!(challenge.counter_bytes(), [0; 8]);
    }

    // RFC 4226 appendix D
    #[test_case(0, "755224")]
    #[test_case(1, "287082")]
    #[test_case(5, "254676")]
    #[test_case(9, "520489")]
    fn it_computes_rfc_hotp(counter: u64, expected: &str) {
        let mut device = SoftHmac::new(RFC_KEY);
        let code = generate_hotp(&mut device, counter, 6, &()).unwrap();
        assert_eq!(code.as_str(), expected);
    }
}
