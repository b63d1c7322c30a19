//! CLI argument definitions using clap.

use clap::{ArgAction, Parser};
use otp_chalresp::{Request, DEFAULT_DIGITS, DEFAULT_STEP};

#[derive(Parser, Debug)]
#[command(name = "otp-chalresp")]
#[command(version)]
#[command(about = "Print a TOTP code computed by an HMAC-SHA1 challenge-response device", long_about = None)]
pub struct Cli {
    /// Unix time to compute the code for (defaults to now)
    #[arg(short, long, allow_negative_numbers = true)]
    pub time: Option<i64>,

    /// Unix time at which the first time step starts
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub t0: i64,

    /// Length of a time step in seconds
    #[arg(short, long, default_value_t = DEFAULT_STEP, env = "OTP_CHALRESP_STEP", allow_negative_numbers = true)]
    pub step: i64,

    /// Number of digits in the code (1 to 9)
    #[arg(short, long, default_value_t = DEFAULT_DIGITS, env = "OTP_CHALRESP_DIGITS")]
    pub digits: u32,

    /// Device slot holding the HMAC key
    #[arg(long, default_value_t = 2, env = "OTP_CHALRESP_SLOT")]
    pub slot: u8,

    /// Compute an HOTP code for this event counter instead of the clock
    #[arg(short, long, conflicts_with_all = ["time", "t0", "remaining"])]
    pub counter: Option<u64>,

    /// Compute the HMAC in software with this hex encoded key
    #[arg(long, value_name = "HEX")]
    pub secret: Option<String>,

    /// Also print on stderr how many seconds the code stays valid
    #[arg(long, default_value = "false")]
    pub remaining: bool,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn request<S>(&self, timestamp: i64, slot: S) -> Request<S> {
        Request::new(slot)
            .at(timestamp)
            .with_t0(self.t0)
            .with_step(self.step)
            .with_digits(self.digits)
    }
}
