//! Command/response coordination
//!
//! The single entry point application code uses to talk to the companion
//! module: transmit a command line, wait (bounded) for the framer to declare
//! the response settled, drain it and check for the expected
//! acknowledgement substring.
//!
//! The wait is split into [`send`](Coordinator::send) and
//! [`check`](Coordinator::check) steps so the caller chooses its own idle
//! behavior between polls - a bare-metal main loop spins, an async task
//! yields. [`send_and_expect`](Coordinator::send_and_expect) is the
//! spinning composition. Every wait is bounded: a silent module means the
//! countdown never starts, so the outer timeout is the only thing standing
//! between the caller and a hung loop.

use horarium_hal::clock::Clock;
use horarium_hal::uart::UartTx;

use crate::clip::Clip;
use crate::esp01::Command;
use crate::link::SharedRxLink;
use crate::ring::RingError;

/// Line terminator appended to every outgoing command
const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Outcome of a failed exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExchangeError<E> {
    /// No settled response within the bounded wait
    Timeout,
    /// A response settled but did not contain the expected substring
    Mismatch,
    /// The transmit primitive failed
    Tx(E),
}

/// Result of one completion poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub enum ExchangeStatus {
    /// Response not settled yet; poll again
    Pending,
    /// Response settled and contained the expected substring
    Matched,
    /// Response settled without the expected substring
    Mismatched,
}

/// Drives command/response exchanges over the shared receive link
///
/// Owns the transmit half of the UART, a monotonic clock, and the clip the
/// responses are drained into. The receive half is the [`SharedRxLink`]
/// the platform's receive path feeds.
pub struct Coordinator<'a, TX, C, const N: usize, const M: usize> {
    tx: TX,
    clock: C,
    link: &'a SharedRxLink<N>,
    clip: Clip<M>,
}

impl<'a, TX, C, const N: usize, const M: usize> Coordinator<'a, TX, C, N, M>
where
    TX: UartTx,
    C: Clock,
{
    /// Create a coordinator over the given transmit half and receive link
    pub fn new(tx: TX, clock: C, link: &'a SharedRxLink<N>) -> Self {
        Self {
            tx,
            clock,
            link,
            clip: Clip::new(),
        }
    }

    /// Start an exchange: re-arm reception and transmit `command` + CRLF
    ///
    /// Re-arming drops whatever stale bytes the previous exchange left
    /// behind; the reset runs inside one critical section, before reception
    /// comes back on, so it cannot race the producer.
    pub fn send(&mut self, command: &str) -> Result<(), TX::Error> {
        self.link.lock(|cell| cell.borrow_mut().rearm());
        self.clip.reset();
        self.tx.write_blocking(command.as_bytes())?;
        self.tx.write_blocking(LINE_TERMINATOR)?;
        self.tx.flush()
    }

    /// Poll once for a settled response and match it against `expected`
    ///
    /// Returns [`ExchangeStatus::Pending`] until the quiet period expires;
    /// after that, drains the message and reports the comparison. A
    /// non-pending status ends the exchange - issue a new
    /// [`send`](Self::send) before polling again.
    pub fn check(&mut self, expected: &str) -> ExchangeStatus {
        let now = self.clock.now_us();
        let clip = &mut self.clip;
        let drained = self.link.lock(|cell| {
            let mut rx = cell.borrow_mut();
            if !rx.poll_complete(now) {
                return None;
            }
            Some(rx.take_into(clip))
        });
        match drained {
            None => ExchangeStatus::Pending,
            // Empty only happens when polling continues after the exchange
            // already finished; there is no message, so no match.
            Some(Err(RingError::Empty)) => ExchangeStatus::Mismatched,
            Some(Ok(_)) => {
                if self.clip.contains(expected.as_bytes()) {
                    ExchangeStatus::Matched
                } else {
                    ExchangeStatus::Mismatched
                }
            }
        }
    }

    /// Send `command` and busy-poll for a response within `timeout_us`
    ///
    /// The main-loop composition of [`send`](Self::send) and
    /// [`check`](Self::check): spins on the completion flag and the clock,
    /// never blocking unboundedly. Async callers should drive the two
    /// halves themselves and yield between polls.
    pub fn send_and_expect(
        &mut self,
        command: &str,
        expected: &str,
        timeout_us: u64,
    ) -> Result<(), ExchangeError<TX::Error>> {
        self.send(command).map_err(ExchangeError::Tx)?;
        let start = self.clock.now_us();
        loop {
            match self.check(expected) {
                ExchangeStatus::Matched => return Ok(()),
                ExchangeStatus::Mismatched => return Err(ExchangeError::Mismatch),
                ExchangeStatus::Pending => {
                    if self.clock.elapsed_us(start) >= timeout_us {
                        return Err(ExchangeError::Timeout);
                    }
                }
            }
        }
    }

    /// Run a prepared companion-module command
    pub fn exchange(&mut self, command: &Command) -> Result<(), ExchangeError<TX::Error>> {
        self.send_and_expect(command.text(), command.expect, command.timeout_us)
    }

    /// The most recently drained response
    ///
    /// Valid until the next [`send`](Self::send) resets it.
    pub fn last_response(&self) -> &Clip<M> {
        &self.clip
    }
}
