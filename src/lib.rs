#![cfg_attr(not(test), no_std)]

use embedded_hal_async::delay::DelayNs;
use embedded_io_async::{Read, ReadReady, Write};
use log::debug;

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod config;
pub use config::*;

mod command;
pub use command::*;

mod frame;
pub use frame::*;

mod timing;
pub use timing::*;

#[cfg(test)]
mod mock;

/// CO2 detection range of the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Range {
    /// 0 to 2000 ppm.
    Ppm2000,
    /// 0 to 5000 ppm, factory default.
    #[default]
    Ppm5000,
}

impl Range {
    /// Upper bound of the range in ppm.
    pub const fn ppm(self) -> u16 {
        match self {
            Range::Ppm2000 => 2000,
            Range::Ppm5000 => 5000,
        }
    }

    /// Returns the range for a documented ppm value, `None` for anything else.
    pub const fn from_ppm(ppm: u16) -> Option<Range> {
        match ppm {
            2000 => Some(Range::Ppm2000),
            5000 => Some(Range::Ppm5000),
            _ => None,
        }
    }
}

impl TryFrom<u16> for Range {
    type Error = Error;

    fn try_from(ppm: u16) -> Result<Self, Self::Error> {
        Range::from_ppm(ppm).ok_or(Error::InvalidArg)
    }
}

/// Firmware version reported by the sensor, four ASCII characters such as `"0443"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion(pub [u8; 4]);

impl FirmwareVersion {
    /// The version as text, `None` if the sensor sent non UTF-8 bytes.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.0).ok()
    }
}

/// Whether a CO2 reading is physically possible. Outdoor fresh air is about 400 ppm.
///
/// The driver reports whatever the sensor returned; filtering is left to the caller.
pub fn is_plausible(ppm: u16) -> bool {
    ppm >= MIN_PLAUSIBLE_PPM
}

/// Represents an MH-Z19B CO2 sensor.
///
/// The protocol is half-duplex: every operation writes one command frame and waits for
/// exactly one response frame. The handle is not internally synchronized, share it across
/// tasks behind a mutex.
///
/// # Type Parameters
///
/// * `Serial`: The serial interface connected to the sensor UART (9600 baud, 8N1).
///   It must implement `embedded_io_async::Read`, `ReadReady` and `Write`.
/// * `Delay`: Pause between two readiness checks while waiting for a response.
/// * `Clk`: Monotonic time source for the response timeout and the timing gates.
pub struct Mhz19b<Serial, Delay, Clk> {
    serial: Option<Serial>,
    delay: Delay,
    clock: Clk,
    config: Config,
    timing: TimingState,
}

impl<S, D, C> Mhz19b<S, D, C>
where
    S: Read + ReadReady + Write,
    D: DelayNs,
    C: Clock,
{
    /// Creates a new `Mhz19b` sensor instance.
    ///
    /// The warm-up period is counted from this call, so create the handle when the sensor
    /// is powered on.
    ///
    /// # Arguments
    ///
    /// * `serial`: The serial interface for communication with the sensor.
    /// * `delay`: Delay provider used while polling for a response.
    /// * `clock`: Time source.
    /// * `config`: Timing configuration.
    pub fn new(serial: S, delay: D, clock: C, config: Config) -> Self {
        let timing = TimingState::new(clock.now_ms());
        Self {
            serial: Some(serial),
            delay,
            clock,
            config,
            timing,
        }
    }

    /// Returns the configuration the handle was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Detaches and returns the serial interface.
    ///
    /// Every later operation on this handle fails with `Error::InvalidArg`.
    pub fn release(&mut self) -> Option<S> {
        self.serial.take()
    }

    /// Detects the sensor by checking it reports a documented detection range.
    ///
    /// Transport failures and invalid ranges both report `false`.
    pub async fn detect(&mut self) -> bool {
        match self.get_range().await {
            Ok(range) => {
                debug!("MH-Z19B detected, range {} ppm", range.ppm());
                true
            }
            Err(e) => {
                log::warn!("MH-Z19B not detected: {:?}", e);
                false
            }
        }
    }

    /// Checks whether the sensor is still pre-heating after power-on.
    ///
    /// With smart warm-up enabled, each call during the pre-heating time also reads CO2
    /// (which restarts the read-interval gate). Two consecutive different values end the
    /// warm-up immediately.
    pub async fn is_warming_up(&mut self) -> bool {
        let now = self.clock.now_ms();
        if self.timing.update_warm_up(now, self.config.warm_up_ms) == WarmUpState::Ready {
            return false;
        }

        if self.config.smart_warm_up {
            match self.read_co2().await {
                Ok(ppm) => {
                    if self.timing.observe_co2(ppm) {
                        debug!("CO2 changed to {} ppm during warm-up, sensor already stable", ppm);
                        return false;
                    }
                }
                Err(e) => log::warn!("CO2 read during warm-up failed: {:?}", e),
            }
        }
        true
    }

    /// Warm-up state as of the last `is_warming_up` call.
    pub fn warm_up_state(&self) -> WarmUpState {
        self.timing.warm_up_state()
    }

    /// Checks whether the minimum interval since the last CO2 read has elapsed.
    ///
    /// Advisory only, `read_co2` does not enforce it.
    pub fn is_ready(&self) -> bool {
        self.timing
            .is_ready(self.clock.now_ms(), self.config.read_interval_ms)
    }

    /// Reads the CO2 concentration in ppm.
    ///
    /// Values below 400 ppm are returned as-is, see [`is_plausible`]. The read-interval
    /// timestamp is recorded when the attempt starts, whether or not it succeeds.
    pub async fn read_co2(&mut self) -> Result<u16, Error> {
        self.timing.mark_read_attempt(self.clock.now_ms());
        let response = self.execute(Command::ReadCo2, [0; PAYLOAD_LEN]).await?;
        let ppm = response.be_u16(2);
        debug!("CO2: {} ppm", ppm);
        Ok(ppm)
    }

    /// Reads the firmware version into `version` (not documented).
    ///
    /// `version` must hold at least 5 bytes: 4 ASCII characters such as `"0443"` followed
    /// by a NUL terminator. The first 5 bytes are cleared before the request is sent.
    ///
    /// # Returns
    ///
    /// * `Ok(())` with the version copied into `version`.
    /// * `Err(Error::InvalidArg)` if `version` is shorter than 5 bytes, no I/O is done.
    /// * `Err(Error)` for any transaction failure.
    pub async fn get_version(&mut self, version: &mut [u8]) -> Result<(), Error> {
        if version.len() < 5 {
            log::error!("Version buffer too small: {} bytes", version.len());
            return Err(Error::InvalidArg);
        }
        version[..5].fill(0);

        let firmware = self.firmware_version().await?;
        version[..4].copy_from_slice(&firmware.0);
        Ok(())
    }

    /// Reads the firmware version (not documented).
    pub async fn firmware_version(&mut self) -> Result<FirmwareVersion, Error> {
        let response = self.execute(Command::GetVersion, [0; PAYLOAD_LEN]).await?;
        let mut ascii = [0u8; 4];
        ascii.copy_from_slice(&response.as_bytes()[2..6]);
        debug!("Firmware version: {:02X?}", ascii);
        Ok(FirmwareVersion(ascii))
    }

    /// Sets the detection range.
    pub async fn set_range(&mut self, range: Range) -> Result<(), Error> {
        debug!("Setting detection range to {} ppm", range.ppm());
        let [high, low] = range.ppm().to_be_bytes();
        self.execute(Command::SetRange, [0x00, 0x00, 0x00, high, low])
            .await?;
        Ok(())
    }

    /// Sets the detection range from a ppm value.
    ///
    /// Only 2000 and 5000 are accepted, anything else returns `Error::InvalidArg` without
    /// talking to the sensor.
    pub async fn set_range_ppm(&mut self, ppm: u16) -> Result<(), Error> {
        let range = Range::try_from(ppm).map_err(|e| {
            log::error!("Unsupported detection range {} ppm", ppm);
            e
        })?;
        self.set_range(range).await
    }

    /// Reads the detection range (not documented).
    ///
    /// # Returns
    ///
    /// * `Ok(Range)` for 2000 or 5000 ppm.
    /// * `Err(Error::InvalidRange(ppm))` when a valid response carries another value.
    /// * `Err(Error)` for any transaction failure.
    pub async fn get_range(&mut self) -> Result<Range, Error> {
        let response = self.execute(Command::GetRange, [0; PAYLOAD_LEN]).await?;
        let ppm = response.be_u16(4);
        Range::from_ppm(ppm).ok_or_else(|| {
            log::warn!("Sensor reported undocumented range {} ppm", ppm);
            Error::InvalidRange(ppm)
        })
    }

    /// Enables or disables automatic baseline correction (ABC).
    pub async fn set_auto_calibration(&mut self, enabled: bool) -> Result<(), Error> {
        debug!("Setting auto calibration: {}", enabled);
        let flag = if enabled { AUTO_CAL_ON } else { AUTO_CAL_OFF };
        self.execute(Command::SetAutoCalibration, [flag, 0, 0, 0, 0])
            .await?;
        Ok(())
    }

    /// Reads the automatic baseline correction status (not documented).
    ///
    /// Only the lowest bit of the status byte is significant.
    pub async fn get_auto_calibration(&mut self) -> Result<bool, Error> {
        let response = self
            .execute(Command::GetAutoCalibration, [0; PAYLOAD_LEN])
            .await?;
        let status = response.as_bytes()[7];
        if status > 1 {
            log::warn!("Unexpected auto calibration status byte {:02X}", status);
        }
        Ok(status & 0x01 == 0x01)
    }

    /// Starts a zero point calibration.
    ///
    /// The sensor must have been running for at least 20 minutes in fresh air (400 ppm).
    /// Mostly useful with automatic calibration disabled.
    pub async fn calibrate_zero_point(&mut self) -> Result<(), Error> {
        debug!("Starting zero point calibration");
        self.execute(Command::CalibrateZeroPoint, [0; PAYLOAD_LEN])
            .await?;
        Ok(())
    }

    /// Starts a span point calibration against a reference gas of `span_ppm`.
    ///
    /// Run a zero point calibration first. `span_ppm` must be between 1 and 5000.
    pub async fn calibrate_span_point(&mut self, span_ppm: u16) -> Result<(), Error> {
        if span_ppm == 0 || span_ppm > Range::Ppm5000.ppm() {
            log::error!("Span point {} ppm out of range (1-5000)", span_ppm);
            return Err(Error::InvalidArg);
        }
        debug!("Starting span point calibration at {} ppm", span_ppm);
        let [high, low] = span_ppm.to_be_bytes();
        self.execute(Command::CalibrateSpanPoint, [high, low, 0, 0, 0])
            .await?;
        Ok(())
    }

    /// Sends one command frame and returns the validated response frame.
    ///
    /// Stale input is discarded before the command is written, then the driver polls until
    /// a full 9-byte response arrived or the receive timeout expired.
    ///
    /// # Returns
    ///
    /// * `Ok(ResponseFrame)` if the response echoes `command` and its checksum is valid.
    /// * `Err(Error::InvalidArg)` if the serial interface was released.
    /// * `Err(Error::Timeout)` if 9 bytes did not arrive in time.
    /// * `Err(Error::InvalidFrame)` or `Err(Error::BadChecksum)` for a rejected response.
    /// * `Err(Error::WriteFailure)` or `Err(Error::ReadFailure)` for serial errors.
    pub async fn execute(
        &mut self,
        command: Command,
        payload: [u8; PAYLOAD_LEN],
    ) -> Result<ResponseFrame, Error> {
        let Some(serial) = self.serial.as_mut() else {
            log::error!("No serial interface, cannot send {:?}", command);
            return Err(Error::InvalidArg);
        };

        let frame = CommandFrame::new(command, payload);
        debug!("Executing command: {:02X?}", frame.as_bytes());

        discard_input(serial).await?;
        serial
            .write_all(frame.as_bytes())
            .await
            .map_err(write_failure)?;
        serial.flush().await.map_err(write_failure)?;

        let mut buffer = [0u8; FRAME_LEN];
        let timeout = self.config.rx_timeout_ms;
        let started = self.clock.now_ms();
        let mut filled = 0;
        while filled < FRAME_LEN {
            if serial.read_ready().map_err(read_failure)? {
                let n = serial
                    .read(&mut buffer[filled..])
                    .await
                    .map_err(read_failure)?;
                if n > 0 {
                    filled += n;
                    continue;
                }
            }
            if self.clock.now_ms().saturating_sub(started) >= timeout {
                log::warn!(
                    "Timeout waiting for {:?} response ({} of {} bytes)",
                    command,
                    filled,
                    FRAME_LEN
                );
                return Err(Error::Timeout);
            }
            self.delay.delay_us(POLL_INTERVAL_US).await;
        }

        debug!("Received response: {:02X?}", buffer);
        ResponseFrame::parse(buffer, command).map_err(|e| {
            log::warn!("Rejected {:?} response {:02X?}: {:?}", command, buffer, e);
            e
        })
    }
}

// Drops whatever is buffered on the receive side so a late reply cannot be taken for the
// answer to the next command.
async fn discard_input<S: Read + ReadReady>(serial: &mut S) -> Result<(), Error> {
    let mut scratch = [0u8; FRAME_LEN];
    let mut discarded = 0;
    while serial.read_ready().map_err(read_failure)? {
        let n = serial.read(&mut scratch).await.map_err(read_failure)?;
        if n == 0 {
            break;
        }
        discarded += n;
    }
    if discarded > 0 {
        log::warn!("Discarded {} stale bytes", discarded);
    }
    Ok(())
}

fn read_failure<E: core::fmt::Debug>(e: E) -> Error {
    log::error!("Serial read error: {:?}", e);
    Error::ReadFailure
}

fn write_failure<E: core::fmt::Debug>(e: E) -> Error {
    log::error!("Serial write error: {:?}", e);
    Error::WriteFailure
}
