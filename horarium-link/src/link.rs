//! Shared receive-side state
//!
//! [`RxLink`] is the unit of state the receive interrupt and the main loop
//! both touch: the ring buffer plus its framer. The system has exactly one
//! genuine data-race surface and this is it, so the composition is wrapped
//! in a critical-section mutex ([`SharedRxLink`]) and every operation that
//! reads or writes more than one cursor runs as a single locked unit. The
//! critical sections are short (a byte push, a cursor check, one bounded
//! copy), well inside what the UART byte rate tolerates.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::clip::Clip;
use crate::framer::QuietFramer;
use crate::ring::{RingBuffer, RingError};

/// Ring buffer plus framer, as mutated from interrupt context
#[derive(Debug)]
pub struct RxLink<const N: usize> {
    ring: RingBuffer<N>,
    framer: QuietFramer,
}

/// An `RxLink` behind a critical-section mutex, shareable with an ISR
pub type SharedRxLink<const N: usize> = Mutex<CriticalSectionRawMutex, RefCell<RxLink<N>>>;

impl<const N: usize> RxLink<N> {
    /// Create a link with the given framing quiet period
    pub const fn new(quiet_period_us: u64) -> Self {
        Self {
            ring: RingBuffer::new(),
            framer: QuietFramer::new(quiet_period_us),
        }
    }

    /// Producer entry point: store a received byte at time `now_us`
    ///
    /// Pushes the byte and restarts the inactivity countdown in one step.
    /// Bytes arriving while reception is gated off (a completed message not
    /// yet drained) are discarded. Returns `true` if the push evicted an
    /// unread byte.
    pub fn on_byte(&mut self, byte: u8, now_us: u64) -> bool {
        if !self.framer.rx_enabled() {
            return false;
        }
        let evicted = self.ring.write(byte);
        self.framer.on_byte(now_us);
        evicted
    }

    /// Consumer side: advance the countdown and report completion
    ///
    /// Level-triggered: keeps returning `true` until the message is taken
    /// and the link re-armed.
    pub fn poll_complete(&mut self, now_us: u64) -> bool {
        self.framer.poll(now_us);
        self.framer.is_complete()
    }

    /// Consumer side: drain the settled message into `clip`
    pub fn take_into<const M: usize>(&mut self, clip: &mut Clip<M>) -> Result<usize, RingError> {
        self.ring.drain_into(clip)
    }

    /// Drop any stale state and enable reception for a fresh exchange
    ///
    /// The cursor reset happens while reception is still gated off and
    /// inside the caller's critical section, which is the only context
    /// where the consumer may write the ring.
    pub fn rearm(&mut self) {
        self.ring.clear();
        self.framer.rearm();
    }

    /// Reception phase of the current exchange
    pub fn phase(&self) -> crate::framer::LinkPhase {
        self.framer.phase()
    }

    /// Bytes currently pending in the ring
    pub fn pending(&self) -> usize {
        self.ring.len()
    }

    /// Lifetime count of bytes lost to ring overflow
    pub fn overwrites(&self) -> u32 {
        self.ring.overwrites()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framer::{LinkPhase, DEFAULT_QUIET_PERIOD_US};

    const QUIET: u64 = DEFAULT_QUIET_PERIOD_US;

    fn feed(link: &mut RxLink<16>, bytes: &[u8], start_us: u64) {
        for (i, &b) in bytes.iter().enumerate() {
            // ~87 µs per byte at 115200 baud
            link.on_byte(b, start_us + i as u64 * 87);
        }
    }

    #[test]
    fn test_bytes_become_one_message_after_quiet_period() {
        let mut link: RxLink<16> = RxLink::new(QUIET);
        feed(&mut link, b"OK\r\n", 0);
        assert_eq!(link.phase(), LinkPhase::Receiving);
        assert!(!link.poll_complete(3 * 87 + QUIET - 1));
        assert!(link.poll_complete(3 * 87 + QUIET));

        let mut clip: Clip<16> = Clip::new();
        assert_eq!(link.take_into(&mut clip), Ok(4));
        assert_eq!(clip.as_bytes(), b"OK\r\n");
        assert_eq!(link.pending(), 0);
    }

    #[test]
    fn test_completion_is_level_triggered_until_rearm() {
        let mut link: RxLink<16> = RxLink::new(QUIET);
        link.on_byte(b'x', 0);
        assert!(link.poll_complete(QUIET));
        assert!(link.poll_complete(QUIET + 1));
        link.rearm();
        assert!(!link.poll_complete(QUIET + 2));
        assert_eq!(link.phase(), LinkPhase::Idle);
    }

    #[test]
    fn test_gated_bytes_are_discarded() {
        let mut link: RxLink<16> = RxLink::new(QUIET);
        feed(&mut link, b"OK\r\n", 0);
        link.poll_complete(10 * 87 + QUIET);
        // An unrelated transmission lands before the consumer drains
        feed(&mut link, b"+IPD,4:late", 500_000);
        let mut clip: Clip<16> = Clip::new();
        assert_eq!(link.take_into(&mut clip), Ok(4));
        assert_eq!(clip.as_bytes(), b"OK\r\n");
    }

    #[test]
    fn test_rearm_clears_pending_bytes() {
        let mut link: RxLink<16> = RxLink::new(QUIET);
        feed(&mut link, b"stale", 0);
        link.rearm();
        assert_eq!(link.pending(), 0);
        assert_eq!(link.phase(), LinkPhase::Idle);
    }

    #[test]
    fn test_overflow_is_counted() {
        let mut link: RxLink<4> = RxLink::new(QUIET);
        let mut evicted = false;
        for (i, &b) in b"abcdef".iter().enumerate() {
            evicted |= link.on_byte(b, i as u64 * 87);
        }
        assert!(evicted);
        assert_eq!(link.overwrites(), 2);
        assert_eq!(link.pending(), 4);
    }

    #[test]
    fn test_shared_link_locks_on_host() {
        // Same shape the firmware uses for its static; exercises the
        // critical-section path via the dev-dependency's std implementation.
        static LINK: SharedRxLink<16> = Mutex::new(RefCell::new(RxLink::new(QUIET)));
        LINK.lock(|cell| {
            let mut link = cell.borrow_mut();
            link.on_byte(b'A', 0);
            assert_eq!(link.pending(), 1);
            link.rearm();
        });
    }
}
