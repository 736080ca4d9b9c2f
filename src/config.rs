use crate::constants::{READ_INTERVAL_MS, RX_TIMEOUT_MS, WARM_UP_TIME_MS};

/// Configuration settings for the MH-Z19B sensor driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// End warm-up early when two consecutive CO2 reads differ.
    ///
    /// Useful when the MCU resets while the sensor stays powered. Keep it disabled in
    /// deployments where the full pre-heating time must be honored.
    pub smart_warm_up: bool,
    /// Pre-heating time after power-on, in milliseconds.
    pub warm_up_ms: u64,
    /// Minimum interval between CO2 reads, in milliseconds.
    pub read_interval_ms: u64,
    /// Maximum wait for a complete response, in milliseconds.
    pub rx_timeout_ms: u64,
}

impl Config {
    /// Creates a new `Config` with the default timings.
    ///
    /// # Arguments
    ///
    /// * `smart_warm_up` - Whether a changing CO2 value may end the warm-up early.
    pub fn new(smart_warm_up: bool) -> Config {
        Config {
            smart_warm_up,
            ..Config::default()
        }
    }
    /// Enables or disables smart warm-up.
    pub fn smart_warm_up(mut self, enabled: bool) -> Self {
        self.smart_warm_up = enabled;
        self
    }
    /// Sets the warm-up duration in milliseconds.
    pub fn warm_up_ms(mut self, ms: u64) -> Self {
        self.warm_up_ms = ms;
        self
    }
    /// Sets the minimum read interval in milliseconds.
    pub fn read_interval_ms(mut self, ms: u64) -> Self {
        self.read_interval_ms = ms;
        self
    }
    /// Sets the response timeout in milliseconds.
    pub fn rx_timeout_ms(mut self, ms: u64) -> Self {
        self.rx_timeout_ms = ms;
        self
    }
}

/// Provides default configuration values for the MH-Z19B sensor.
impl Default for Config {
    /// Returns the default configuration.
    ///
    /// Smart warm-up is disabled, warm-up lasts 3 minutes, reads are spaced by 5 seconds
    /// and responses must arrive within 120 ms.
    fn default() -> Config {
        Config {
            smart_warm_up: false,
            warm_up_ms: WARM_UP_TIME_MS,
            read_interval_ms: READ_INTERVAL_MS,
            rx_timeout_ms: RX_TIMEOUT_MS,
        }
    }
}
