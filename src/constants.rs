// START_BYTE is the first byte of every frame, in both directions.
pub const START_BYTE: u8 = 0xFF;

// SENSOR_ADDRESS is the fixed address byte sent in position 1 of a command frame.
// The sensor echoes the command code in that position of its reply.
pub const SENSOR_ADDRESS: u8 = 0x01;

// FRAME_LEN is the fixed size of command and response frames.
pub const FRAME_LEN: usize = 9;

// PAYLOAD_LEN is the number of argument bytes following the command code.
pub const PAYLOAD_LEN: usize = 5;

// WARM_UP_TIME_MS is the pre-heating time after power-on before readings are valid.
pub const WARM_UP_TIME_MS: u64 = 3 * 60 * 1000;

// READ_INTERVAL_MS is the minimum time between CO2 reads. Not in the datasheet, it
// matches the blink period of the on-board LED.
pub const READ_INTERVAL_MS: u64 = 5 * 1000;

// RX_TIMEOUT_MS bounds the wait for a complete response. 15..120 ms is reliable at 9600 baud.
pub const RX_TIMEOUT_MS: u64 = 120;

// POLL_INTERVAL_US is the pause between two readiness checks while waiting for a response.
pub const POLL_INTERVAL_US: u32 = 1_000;

// MIN_PLAUSIBLE_PPM is the outdoor fresh air baseline. Lower readings are not physical.
pub const MIN_PLAUSIBLE_PPM: u16 = 400;

// AUTO_CAL_ON is the argument byte enabling automatic baseline correction.
pub const AUTO_CAL_ON: u8 = 0xA0;

// AUTO_CAL_OFF is the argument byte disabling automatic baseline correction.
pub const AUTO_CAL_OFF: u8 = 0x00;
