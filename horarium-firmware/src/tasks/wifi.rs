//! ESP-01 bring-up
//!
//! Runs the boot handshake (probe, station mode, join) through the
//! command/response coordinator. The coordinator's own `send_and_expect`
//! spins, which would starve the rx pump under a cooperative executor, so
//! this task drives the split `send`/`check` halves and yields between
//! completion polls.

use defmt::*;
use embassy_stm32::mode::Async;
use embassy_stm32::usart;
use embassy_time::{Duration, Instant, Timer};

use horarium_hal::clock::Clock;
use horarium_hal::uart::UartTx;
use horarium_link::esp01::{self, Command};
use horarium_link::{Coordinator, ExchangeError, ExchangeStatus};

use crate::channels::{WIFI_CLIP_CAPACITY, WIFI_LINK, WIFI_READY, WIFI_RX_CAPACITY};

/// Network credentials; the settings UI does not provision these yet
const WIFI_SSID: &str = "horarium";
const WIFI_PASSWORD: &str = "eight-bells";

/// Attempts per handshake step before giving up
const MAX_ATTEMPTS: u8 = 3;

/// Idle time between completion polls
const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Blocking transmit half of the ESP-01 UART
struct WifiTx(usart::UartTx<'static, Async>);

impl UartTx for WifiTx {
    type Error = usart::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.blocking_write(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.blocking_flush()
    }
}

/// Microsecond uptime clock
struct Uptime;

impl Clock for Uptime {
    fn now_us(&self) -> u64 {
        Instant::now().as_micros()
    }
}

type WifiCoordinator =
    Coordinator<'static, WifiTx, Uptime, WIFI_RX_CAPACITY, WIFI_CLIP_CAPACITY>;

/// Wi-Fi bring-up - probes the module and joins the configured network
#[embassy_executor::task]
pub async fn wifi_task(tx: usart::UartTx<'static, Async>) {
    info!("Wi-Fi bring-up started");
    let mut coord: WifiCoordinator = Coordinator::new(WifiTx(tx), Uptime, &WIFI_LINK);

    let joined = bring_up(&mut coord).await.is_ok();
    WIFI_READY.signal(joined);
    if joined {
        info!("Wi-Fi joined \"{}\"", WIFI_SSID);
    } else {
        error!("Wi-Fi bring-up failed; clock continues on the RTC alone");
    }
}

async fn bring_up(
    coord: &mut WifiCoordinator,
) -> Result<(), ExchangeError<usart::Error>> {
    step(coord, &esp01::probe()).await?;
    step(coord, &esp01::station_mode()).await?;
    // Credentials are compile-time constants that fit MAX_COMMAND_LEN
    let join = unwrap!(esp01::join(WIFI_SSID, WIFI_PASSWORD).ok());
    step(coord, &join).await
}

/// Run one handshake command with bounded retries
async fn step(
    coord: &mut WifiCoordinator,
    command: &Command,
) -> Result<(), ExchangeError<usart::Error>> {
    let mut last = ExchangeError::Timeout;
    for attempt in 1..=MAX_ATTEMPTS {
        match exchange(coord, command).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                warn!(
                    "{} attempt {}/{} failed: {}",
                    command.text(),
                    attempt,
                    MAX_ATTEMPTS,
                    e
                );
                last = e;
            }
        }
    }
    Err(last)
}

/// One command/response exchange, yielding between completion polls
async fn exchange(
    coord: &mut WifiCoordinator,
    command: &Command,
) -> Result<(), ExchangeError<usart::Error>> {
    coord.send(command.text()).map_err(ExchangeError::Tx)?;
    let deadline = Instant::now() + Duration::from_micros(command.timeout_us);
    loop {
        match coord.check(command.expect) {
            ExchangeStatus::Matched => return Ok(()),
            ExchangeStatus::Mismatched => return Err(ExchangeError::Mismatch),
            ExchangeStatus::Pending => {
                if Instant::now() >= deadline {
                    return Err(ExchangeError::Timeout);
                }
                Timer::after(POLL_INTERVAL).await;
            }
        }
    }
}
