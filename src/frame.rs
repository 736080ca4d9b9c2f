//! Encoding and validation of the fixed 9-byte frames exchanged with the sensor.
//!
//! Command: `FF 01 CMD B3 B4 B5 B6 B7 CS`
//! Response: `FF CMD D2 D3 D4 D5 D6 D7 CS`
//!
//! `CS` is the two's complement of the sum of bytes 1 to 7.

use crate::command::Command;
use crate::constants::{FRAME_LEN, PAYLOAD_LEN, SENSOR_ADDRESS, START_BYTE};
use crate::error::Error;

/// Computes the checksum of the protocol bytes of a frame (bytes 1 to 7).
pub fn checksum(protocol_bytes: &[u8]) -> u8 {
    protocol_bytes
        .iter()
        .fold(0u8, |sum, &b| sum.wrapping_add(b))
        .wrapping_neg()
}

fn frame_checksum(frame: &[u8; FRAME_LEN]) -> u8 {
    checksum(&frame[1..FRAME_LEN - 1])
}

/// Outcome of checking a received frame against the command that was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Header and checksum are correct.
    Accepted,
    /// Missing start byte or command code not echoed.
    ProtocolMismatch,
    /// Header is correct but the checksum byte is not.
    ChecksumMismatch,
}

/// Checks start byte, echoed command code and checksum of a received frame.
pub fn validate_response(frame: &[u8; FRAME_LEN], expected: Command) -> Validation {
    if frame[0] != START_BYTE || frame[1] != expected.code() {
        Validation::ProtocolMismatch
    } else if frame[FRAME_LEN - 1] != frame_checksum(frame) {
        Validation::ChecksumMismatch
    } else {
        Validation::Accepted
    }
}

/// A command frame ready to be written to the serial port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    bytes: [u8; FRAME_LEN],
}

impl CommandFrame {
    /// Builds a command frame with its five argument bytes and appends the checksum.
    pub fn new(command: Command, payload: [u8; PAYLOAD_LEN]) -> Self {
        let mut bytes = [0u8; FRAME_LEN];
        bytes[0] = START_BYTE;
        bytes[1] = SENSOR_ADDRESS;
        bytes[2] = command.code();
        bytes[3..3 + PAYLOAD_LEN].copy_from_slice(&payload);
        bytes[FRAME_LEN - 1] = frame_checksum(&bytes);
        Self { bytes }
    }

    /// The 9 bytes to write, checksum included.
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }
}

/// A response frame that passed validation against the command it answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseFrame {
    bytes: [u8; FRAME_LEN],
}

impl ResponseFrame {
    /// Validates raw bytes received in reply to `expected`.
    ///
    /// # Returns
    ///
    /// * `Ok(ResponseFrame)` when the header and checksum are correct.
    /// * `Err(Error::InvalidFrame)` when the start byte or echoed command is wrong.
    /// * `Err(Error::BadChecksum)` when only the checksum is wrong.
    pub fn parse(bytes: [u8; FRAME_LEN], expected: Command) -> Result<Self, Error> {
        match validate_response(&bytes, expected) {
            Validation::Accepted => Ok(Self { bytes }),
            Validation::ProtocolMismatch => Err(Error::InvalidFrame),
            Validation::ChecksumMismatch => Err(Error::BadChecksum),
        }
    }

    /// The raw 9 bytes as received.
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    // Big-endian 16-bit value stored at `index` and `index + 1`, `index` at most 6.
    pub(crate) fn be_u16(&self, index: usize) -> u16 {
        u16::from_be_bytes([self.bytes[index], self.bytes[index + 1]])
    }
}
