//! otp-chalresp - print a one-time passcode computed by a challenge-response device.
//!
//! Usage:
//!   otp-chalresp                        # TOTP from the YubiKey in slot 2
//!   otp-chalresp --slot 1 --digits 8
//!   otp-chalresp --secret 3132333435 --time 59
//!   otp-chalresp --counter 7            # HOTP
//!
//! Exits 0 after printing the code on stdout, 1 after printing an error on
//! stderr.

mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use log::{info, LevelFilter};
use otp_chalresp::{totp, ChallengeResponse, OtpCode, SoftHmac, TimeCounter};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_logger(cli.verbose);

    match run(&cli) {
        Ok(code) => {
            println!("{code}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(cli: &Cli) -> Result<OtpCode> {
    match &cli.secret {
        Some(secret) => {
            let key = hex::decode(secret).context("--secret must be hex encoded")?;
            info!("computing the HMAC in software");
            compute(&mut SoftHmac::new(key), cli, ())
        }
        None => hardware(cli),
    }
}

#[cfg(feature = "yubikey")]
fn hardware(cli: &Cli) -> Result<OtpCode> {
    use otp_chalresp::device::yubikey::{YubiKey, YubiKeySlot};

    let slot = YubiKeySlot::try_from(cli.slot)?;
    let mut device = YubiKey::open()?;
    compute(&mut device, cli, slot)
}

#[cfg(not(feature = "yubikey"))]
fn hardware(_cli: &Cli) -> Result<OtpCode> {
    anyhow::bail!("built without YubiKey support; rebuild with `--features yubikey` or pass --secret")
}

fn compute<D: ChallengeResponse>(device: &mut D, cli: &Cli, slot: D::Slot) -> Result<OtpCode> {
    if let Some(counter) = cli.counter {
        return Ok(otp_chalresp::generate_hotp(device, counter, cli.digits, &slot)?);
    }

    let timestamp = match cli.time {
        Some(timestamp) => timestamp,
        None => totp::now()?,
    };
    let code = otp_chalresp::generate(device, &cli.request(timestamp, slot))?;

    if cli.remaining {
        let seconds = TimeCounter::remaining(timestamp, cli.t0, cli.step)?;
        eprintln!("valid for {seconds}s");
    }

    Ok(code)
}
