//! Horarium Desk Clock Firmware
//!
//! Firmware for the STM32F7-based battery desk clock. This binary wires the
//! serial link core up to real hardware: the ESP-01 Wi-Fi companion module
//! hangs off UART7 (PE7 = RX, PE8 = TX) and is brought up at boot by the
//! wifi task. The RTC, displays and buttons attach to their own
//! peripherals and are handled by their own tasks as those are ported.

#![no_std]
#![no_main]

mod channels;
mod tasks;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::bind_interrupts;
use embassy_stm32::peripherals::UART7;
use embassy_stm32::usart::{self, Uart};
use {defmt_rtt as _, panic_probe as _};

use horarium_hal::uart::UartConfig;

bind_interrupts!(struct Irqs {
    UART7 => usart::InterruptHandler<UART7>;
});

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Horarium firmware starting...");

    let p = embassy_stm32::init(Default::default());

    // UART7 to the ESP-01, 8N1 at the module's factory baud rate
    let link_config = UartConfig::default();
    let mut uart_config = usart::Config::default();
    uart_config.baudrate = link_config.baudrate;

    let uart = Uart::new(
        p.UART7,
        p.PE7, // RX
        p.PE8, // TX
        Irqs,
        p.DMA1_CH1,
        p.DMA1_CH3,
        uart_config,
    )
    .unwrap();
    let (tx, rx) = uart.split();

    spawner.spawn(tasks::wifi_rx::rx_pump_task(rx)).unwrap();
    spawner.spawn(tasks::wifi::wifi_task(tx)).unwrap();

    // Wait for bring-up so the outcome lands in the boot log
    let joined = channels::WIFI_READY.wait().await;
    info!("boot complete, wifi={}", joined);
}
