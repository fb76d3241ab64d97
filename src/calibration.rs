//! Calibration and self-test math
//!
//! The bus-facing procedures live on [`Mpu9250Driver`](crate::Mpu9250Driver)
//! (`self_test`, `calibrate`, `calibrate_magnetometer`). This module holds the
//! arithmetic they share, so it can be checked without a device:
//!
//! - factory trim and self-test deviation,
//! - averaging of raw triples with integer truncation,
//! - gravity removal and hardware offset register encoding,
//! - magnetometer min/max sweep (hard-iron and soft-iron).

use crate::sensors::{AccelCalibration, GyroCalibration, MagCalibration, MagSensitivity};

/// Samples averaged per self-test phase
pub const SELF_TEST_SAMPLES: u16 = 200;

/// Settling time after toggling the self-test bits
pub const SELF_TEST_SETTLE_MS: u32 = 25;

/// Upper bound on the self-test deviation in percent
pub const SELF_TEST_TOLERANCE: f32 = 14.0;

/// Accelerometer counts per g at ±2 g, the range used during calibration
pub const CALIBRATION_ACCEL_SENSITIVITY: i32 = 16384;

/// Gyroscope counts per dps at ±250 dps, the range used during calibration
pub const CALIBRATION_GYRO_SENSITIVITY: i32 = 131;

/// Factory self-test response for a trim code
///
/// `trim = (2620 / 2^fs) * 1.01^(code - 1)`
#[must_use]
pub fn factory_trim(code: u8, full_scale_code: u8) -> f32 {
    let base = 2620.0 / f32::from(1u16 << full_scale_code.min(3));
    base * libm::powf(1.01, f32::from(code) - 1.0)
}

/// Percent deviation of a self-test response from its factory trim
///
/// `100 * (self_test_mean - normal_mean) / trim - 100`
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn self_test_deviation(self_test_mean: i32, normal_mean: i32, trim: f32) -> f32 {
    100.0 * (self_test_mean - normal_mean) as f32 / trim - 100.0
}

/// Running per-axis sum of raw triples
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AxisSum {
    sum: [i32; 3],
    count: u32,
}

impl AxisSum {
    /// Empty sum
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sum: [0; 3],
            count: 0,
        }
    }

    /// Add one sample
    pub fn add(&mut self, sample: [i16; 3]) {
        for (sum, value) in self.sum.iter_mut().zip(sample) {
            *sum += i32::from(value);
        }
        self.count += 1;
    }

    /// Number of samples added
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Per-axis mean, truncated toward zero; `None` when empty
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn mean(&self) -> Option<[i32; 3]> {
        if self.count == 0 {
            return None;
        }
        let count = self.count as i32;
        Some(self.sum.map(|sum| sum / count))
    }
}

/// Outcome of the factory self-test
///
/// Deviations are percentages of the factory trim, per axis (x, y, z).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SelfTestResult {
    /// Accelerometer deviation in percent
    pub accel_deviation: [f32; 3],
    /// Gyroscope deviation in percent
    pub gyro_deviation: [f32; 3],
}

impl SelfTestResult {
    /// Compute deviations from the averaged readings and the factory codes
    ///
    /// All averages were taken at the lowest full-scale range (code 0).
    #[must_use]
    pub fn from_averages(
        accel_normal: [i32; 3],
        accel_self_test: [i32; 3],
        gyro_normal: [i32; 3],
        gyro_self_test: [i32; 3],
        accel_codes: [u8; 3],
        gyro_codes: [u8; 3],
    ) -> Self {
        let mut accel_deviation = [0.0; 3];
        let mut gyro_deviation = [0.0; 3];
        for axis in 0..3 {
            accel_deviation[axis] = self_test_deviation(
                accel_self_test[axis],
                accel_normal[axis],
                factory_trim(accel_codes[axis], 0),
            );
            gyro_deviation[axis] = self_test_deviation(
                gyro_self_test[axis],
                gyro_normal[axis],
                factory_trim(gyro_codes[axis], 0),
            );
        }
        Self {
            accel_deviation,
            gyro_deviation,
        }
    }

    /// `true` when every deviation is below [`SELF_TEST_TOLERANCE`]
    ///
    /// Only the upper bound is checked; large negative deviations pass.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.accel_deviation
            .iter()
            .chain(self.gyro_deviation.iter())
            .all(|&deviation| deviation < SELF_TEST_TOLERANCE)
    }
}

/// Axis and direction of gravity while the device rests for calibration
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReferenceGravity {
    /// +X points up
    XPositive,
    /// +X points down
    XNegative,
    /// +Y points up
    YPositive,
    /// +Y points down
    YNegative,
    /// +Z points up (device flat, component side up)
    #[default]
    ZPositive,
    /// +Z points down
    ZNegative,
}

impl ReferenceGravity {
    /// Index of the vertical axis (0 = x, 1 = y, 2 = z)
    #[must_use]
    pub const fn axis(self) -> usize {
        match self {
            Self::XPositive | Self::XNegative => 0,
            Self::YPositive | Self::YNegative => 1,
            Self::ZPositive | Self::ZNegative => 2,
        }
    }

    /// +1 if the axis points up, -1 if it points down
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            Self::XPositive | Self::YPositive | Self::ZPositive => 1,
            Self::XNegative | Self::YNegative | Self::ZNegative => -1,
        }
    }

    /// Remove the expected 1 g reading from averaged accelerometer counts
    #[must_use]
    pub fn remove_from(self, mut accel_counts: [i32; 3], counts_per_g: i32) -> [i32; 3] {
        accel_counts[self.axis()] -= self.sign() * counts_per_g;
        accel_counts
    }
}

/// Longest FIFO capture window: 42 packets of 12 bytes fit in the 512-byte FIFO
pub const MAX_FIFO_WINDOW_MS: u32 = 42;

/// Settings for the accelerometer/gyroscope bias calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BiasCalibrationConfig {
    /// Which axis carries gravity during calibration
    pub reference_gravity: ReferenceGravity,
    /// How long the FIFO collects samples (1 packet per ms, at most
    /// [`MAX_FIFO_WINDOW_MS`])
    pub fifo_window_ms: u32,
    /// Write the gyro bias into `XG/YG/ZG_OFFSET`
    pub push_gyro_offsets: bool,
    /// Adjust the factory `XA/YA/ZA_OFFSET` values by the accel bias
    pub push_accel_offsets: bool,
}

impl Default for BiasCalibrationConfig {
    fn default() -> Self {
        Self {
            reference_gravity: ReferenceGravity::ZPositive,
            fifo_window_ms: 40,
            push_gyro_offsets: true,
            push_accel_offsets: false,
        }
    }
}

/// Biases measured by bias calibration
///
/// These are the measured values. For a sensor whose offsets were pushed to
/// hardware the driver keeps a zero software bias instead.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BiasSet {
    /// Accelerometer bias in g
    pub accel: AccelCalibration,
    /// Gyroscope bias in dps
    pub gyro: GyroCalibration,
}

impl BiasSet {
    /// Convert averaged counts (gravity already removed) to physical biases
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_counts(accel_counts: [i32; 3], gyro_counts: [i32; 3]) -> Self {
        let accel = accel_counts.map(|c| c as f32 / CALIBRATION_ACCEL_SENSITIVITY as f32);
        let gyro = gyro_counts.map(|c| c as f32 / CALIBRATION_GYRO_SENSITIVITY as f32);
        Self {
            accel: AccelCalibration {
                bias_x: accel[0],
                bias_y: accel[1],
                bias_z: accel[2],
            },
            gyro: GyroCalibration {
                bias_x: gyro[0],
                bias_y: gyro[1],
                bias_z: gyro[2],
            },
        }
    }
}

/// Gyro offset register value for a bias measured at ±250 dps
///
/// The offset registers use 32.8 LSB/dps (±1000 dps), so the bias is divided
/// by 4 and negated.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn gyro_offset_register(bias_counts: i32) -> u16 {
    let offset = (-bias_counts / 4).clamp(i32::from(i16::MIN), i32::from(i16::MAX));
    offset as i16 as u16
}

/// Accelerometer offset register value after removing a bias measured at ±2 g
///
/// The register holds the factory offset at ±16 g (2048 LSB/g) in bits 15:1;
/// bit 0 is the temperature compensation flag and is preserved.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn accel_offset_register(factory: u16, bias_counts: i32) -> u16 {
    let temperature_bit = factory & 0x0001;
    let adjusted = i32::from(factory as i16) - bias_counts / 8;
    let adjusted = adjusted.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16 as u16;
    (adjusted & !0x0001) | temperature_bit
}

/// Per-axis min/max of raw magnetometer counts during a calibration sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagSweep {
    min: [i16; 3],
    max: [i16; 3],
}

impl Default for MagSweep {
    fn default() -> Self {
        Self::new()
    }
}

impl MagSweep {
    /// Start a sweep (max at -32767, min at 32767)
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min: [32767; 3],
            max: [-32767; 3],
        }
    }

    /// Track one sample
    pub fn update(&mut self, sample: [i16; 3]) {
        for axis in 0..3 {
            self.max[axis] = self.max[axis].max(sample[axis]);
            self.min[axis] = self.min[axis].min(sample[axis]);
        }
    }

    /// Smallest value seen per axis
    #[must_use]
    pub const fn min(&self) -> [i16; 3] {
        self.min
    }

    /// Largest value seen per axis
    #[must_use]
    pub const fn max(&self) -> [i16; 3] {
        self.max
    }

    /// Hard-iron offset in counts, `(max + min) / 2` truncated
    #[must_use]
    pub fn hard_iron_counts(&self) -> [i32; 3] {
        core::array::from_fn(|axis| (i32::from(self.max[axis]) + i32::from(self.min[axis])) / 2)
    }

    /// Half the peak-to-peak swing in counts, `(max - min) / 2` truncated
    #[must_use]
    pub fn half_swings(&self) -> [i32; 3] {
        core::array::from_fn(|axis| (i32::from(self.max[axis]) - i32::from(self.min[axis])) / 2)
    }

    /// Soft-iron scale per axis, mean half-swing over the axis half-swing
    ///
    /// An axis that never moved has a zero swing and yields an infinite scale.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn soft_iron_scale(&self) -> [f32; 3] {
        let swings = self.half_swings();
        let average = swings.iter().map(|&s| s as f32).sum::<f32>() / 3.0;
        swings.map(|swing| average / swing as f32)
    }

    /// Hard-iron bias (mG) and soft-iron scale for the given resolution and ASA
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn calibration(&self, resolution: f32, sensitivity: &MagSensitivity) -> MagCalibration {
        let bias = self.hard_iron_counts();
        let scale = self.soft_iron_scale();
        MagCalibration {
            bias_x: bias[0] as f32 * resolution * sensitivity.x,
            bias_y: bias[1] as f32 * resolution * sensitivity.y,
            bias_z: bias[2] as f32 * resolution * sensitivity.z,
            scale_x: scale[0],
            scale_y: scale[1],
            scale_z: scale[2],
        }
    }
}
