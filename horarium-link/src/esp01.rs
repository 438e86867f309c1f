//! AT command set for the ESP-01 companion module
//!
//! Each builder yields a [`Command`]: the text to transmit, the
//! acknowledgement substring that means the module accepted it, and a
//! per-command outer timeout (joining an access point takes seconds; a
//! liveness probe should not). Feed the result to
//! [`Coordinator::exchange`](crate::coordinator::Coordinator::exchange) or
//! drive it manually through `send`/`check`.

use core::fmt::Write as _;

use heapless::String;

/// Longest command the builders can produce
///
/// Sized for `AT+CWJAP` with a 32-byte SSID and a 63-byte WPA2 passphrase.
pub const MAX_COMMAND_LEN: usize = 128;

pub const PROBE_TIMEOUT_US: u64 = 1_000_000;
pub const RESET_TIMEOUT_US: u64 = 5_000_000;
pub const MODE_TIMEOUT_US: u64 = 1_000_000;
pub const JOIN_TIMEOUT_US: u64 = 20_000_000;
pub const CONNECT_TIMEOUT_US: u64 = 10_000_000;

/// Errors building a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Interpolated arguments exceed [`MAX_COMMAND_LEN`]
    TooLong,
}

/// A prepared command/acknowledgement pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    text: String<MAX_COMMAND_LEN>,
    /// Substring whose presence in the response means success
    pub expect: &'static str,
    /// Outer bound for the whole exchange, in microseconds
    pub timeout_us: u64,
}

impl Command {
    fn fixed(text: &'static str, expect: &'static str, timeout_us: u64) -> Self {
        let mut s = String::new();
        // Fixed command texts are all far below MAX_COMMAND_LEN
        let _ = s.push_str(text);
        Self {
            text: s,
            expect,
            timeout_us,
        }
    }

    /// The command text, without line terminator
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// `AT` - liveness probe
pub fn probe() -> Command {
    Command::fixed("AT", "OK", PROBE_TIMEOUT_US)
}

/// `AT+RST` - soft reset; the boot banner ends in "ready"
pub fn reset() -> Command {
    Command::fixed("AT+RST", "ready", RESET_TIMEOUT_US)
}

/// `AT+CWMODE=1` - station (client) mode
pub fn station_mode() -> Command {
    Command::fixed("AT+CWMODE=1", "OK", MODE_TIMEOUT_US)
}

/// `AT+CWJAP` - join an access point
pub fn join(ssid: &str, password: &str) -> Result<Command, CommandError> {
    let mut text = String::new();
    write!(text, "AT+CWJAP=\"{}\",\"{}\"", ssid, password).map_err(|_| CommandError::TooLong)?;
    Ok(Command {
        text,
        expect: "OK",
        timeout_us: JOIN_TIMEOUT_US,
    })
}

/// `AT+CIPSTART` - open a TCP connection
pub fn tcp_connect(host: &str, port: u16) -> Result<Command, CommandError> {
    let mut text = String::new();
    write!(text, "AT+CIPSTART=\"TCP\",\"{}\",{}", host, port).map_err(|_| CommandError::TooLong)?;
    Ok(Command {
        text,
        expect: "OK",
        timeout_us: CONNECT_TIMEOUT_US,
    })
}
