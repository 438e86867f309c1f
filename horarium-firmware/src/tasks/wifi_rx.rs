//! ESP-01 UART receive pump
//!
//! Plays the producer role of the shared link: every received byte goes
//! into the ring buffer and restarts the inactivity countdown, timestamped
//! with the moment it was pulled off the wire.

use defmt::*;
use embassy_stm32::mode::Async;
use embassy_stm32::usart::UartRx;
use embassy_time::Instant;

use crate::channels::WIFI_LINK;

/// Wi-Fi RX pump - feeds the shared link one byte at a time
#[embassy_executor::task]
pub async fn rx_pump_task(mut rx: UartRx<'static, Async>) {
    info!("Wi-Fi RX pump started");

    let mut byte = [0u8; 1];
    loop {
        match rx.read(&mut byte).await {
            Ok(()) => {
                let now_us = Instant::now().as_micros();
                let evicted = WIFI_LINK.lock(|cell| cell.borrow_mut().on_byte(byte[0], now_us));
                if evicted {
                    // Oldest unread byte lost; the exchange will likely mismatch
                    warn!("wifi rx ring full, dropped oldest byte");
                }
            }
            Err(e) => {
                warn!("wifi uart read error: {:?}", e);
            }
        }
    }
}
