//! UART serial transmit abstraction
//!
//! The Wi-Fi companion module is driven over a plain byte-oriented UART.
//! There is no backpressure protocol at this layer, so a blocking
//! wait-for-transmit-ready per byte is acceptable and expected.
//!
//! Reception is deliberately not a trait here: received bytes are pushed
//! into the link core by the platform's receive interrupt (or its async
//! equivalent), not pulled by the consumer.

/// UART transmitter
///
/// Implemented by chip HALs and by test fakes that record what was sent.
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Write data to the UART
    ///
    /// Blocks until all data has been handed to the hardware or an error
    /// occurs.
    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Block until everything written has actually left the shift register
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// UART configuration
///
/// The companion module link is fixed at 8N1; only the baud rate varies
/// between module firmware revisions.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115_200, // ESP-01 factory default
        }
    }
}
