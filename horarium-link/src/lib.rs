//! Serial link core for the Wi-Fi companion module
//!
//! The desk clock talks to an ESP-01 over a plain UART: commands go out as
//! ASCII lines, responses come back as human-readable text of unpredictable
//! length with no terminator that can be trusted up front. This crate owns
//! everything between the receive interrupt and the application's "did the
//! module say OK?" question:
//!
//! ```text
//! ┌──────────────┐  byte   ┌────────────┐  drain  ┌──────┐
//! │ rx interrupt │ ──────► │ RingBuffer │ ──────► │ Clip │ ──► match
//! └──────────────┘         └────────────┘         └──────┘
//!        │ restarts countdown              ▲
//!        ▼                                 │
//! ┌─────────────┐   quiet period expired   │
//! │ QuietFramer │ ───► Complete ───────────┘
//! └─────────────┘
//! ```
//!
//! The interrupt side only ever pushes bytes and restarts the inactivity
//! countdown; the main-loop side polls for completion, drains the ring into
//! a [`Clip`] snapshot, and matches the expected acknowledgement. All state
//! shared between the two sides lives in a [`SharedRxLink`] and is touched
//! only inside critical sections, so every multi-cursor operation is atomic
//! with respect to reception.
//!
//! Nothing here depends on real hardware: the transmit path and the clock
//! come in through `horarium-hal` traits, so the whole crate runs in host
//! tests with fake collaborators.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod clip;
pub mod coordinator;
pub mod esp01;
pub mod framer;
pub mod link;
pub mod ring;

pub use clip::Clip;
pub use coordinator::{Coordinator, ExchangeError, ExchangeStatus};
pub use framer::{LinkPhase, QuietFramer, DEFAULT_QUIET_PERIOD_US};
pub use link::{RxLink, SharedRxLink};
pub use ring::{RingBuffer, RingError};
