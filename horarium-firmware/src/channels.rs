//! Inter-task communication statics
//!
//! The shared receive link and the signals tasks use to coordinate.
//! Everything lives behind critical-section primitives so the rx pump,
//! the bring-up task and (eventually) the UI task can touch them from
//! any context.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use horarium_link::{RxLink, DEFAULT_QUIET_PERIOD_US};

/// Ring capacity for bytes from the ESP-01
///
/// Sized for the module's longest chatter between drains (the AT+CWJAP
/// response with its status lines).
pub const WIFI_RX_CAPACITY: usize = 128;

/// Snapshot capacity the coordinator drains into
pub const WIFI_CLIP_CAPACITY: usize = 128;

/// Shared receive state: fed by the rx pump, drained by the coordinator
pub static WIFI_LINK: horarium_link::SharedRxLink<WIFI_RX_CAPACITY> =
    Mutex::new(RefCell::new(RxLink::new(DEFAULT_QUIET_PERIOD_US)));

/// Signals the outcome of the Wi-Fi bring-up handshake (true = joined)
pub static WIFI_READY: Signal<CriticalSectionRawMutex, bool> = Signal::new();
