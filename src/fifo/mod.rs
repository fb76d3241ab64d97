//! FIFO packet layout used by bias calibration
//!
//! With `FIFO_EN = 0x78` (accelerometer plus the three gyro axes) the MPU9250
//! writes one 12-byte packet per sample:
//!
//! | Bytes | Content                   |
//! |-------|---------------------------|
//! | 0-5   | Accel X, Y, Z (big endian) |
//! | 6-11  | Gyro X, Y, Z (big endian)  |
//!
//! The FIFO holds at most [`FIFO_SIZE`] bytes.

/// FIFO buffer size in bytes
pub const FIFO_SIZE: u16 = 512;

/// Size of one accel + gyro packet
pub const PACKET_SIZE: usize = 12;

/// One accel + gyro sample read from the FIFO
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FifoPacket {
    /// Raw accelerometer counts (x, y, z)
    pub accel: [i16; 3],
    /// Raw gyroscope counts (x, y, z)
    pub gyro: [i16; 3],
}

impl FifoPacket {
    /// Decode a packet
    #[must_use]
    pub const fn parse(data: &[u8; PACKET_SIZE]) -> Self {
        Self {
            accel: [
                i16::from_be_bytes([data[0], data[1]]),
                i16::from_be_bytes([data[2], data[3]]),
                i16::from_be_bytes([data[4], data[5]]),
            ],
            gyro: [
                i16::from_be_bytes([data[6], data[7]]),
                i16::from_be_bytes([data[8], data[9]]),
                i16::from_be_bytes([data[10], data[11]]),
            ],
        }
    }
}

/// Number of complete packets in `fifo_count` bytes
///
/// A trailing partial packet is ignored.
#[must_use]
pub const fn packet_count(fifo_count: u16) -> u16 {
    fifo_count / PACKET_SIZE as u16
}
