//! Sensor modules for the MPU9250
//!
//! This module provides types, enums, and configuration structures for each sensor
//! in the MPU9250:
//! - Accelerometer (3-axis)
//! - Gyroscope (3-axis)
//! - Magnetometer (3-axis, AK8963)
//!
//! All sensor operations are performed through methods on `Mpu9250Driver`.

pub mod accelerometer;
pub mod gyroscope;
pub mod magnetometer;

// Re-export main types
pub use accelerometer::{AccelCalibration, AccelConfig, AccelDataG, AccelDlpf, AccelFullScale};
pub use gyroscope::{
    GyroCalibration, GyroConfig, GyroDataDps, GyroDataRps, GyroDlpf, GyroFullScale,
};
pub use magnetometer::{
    MagCalibration, MagConfig, MagDataMilliGauss, MagMode, MagResolution, MagSensitivity,
    MagSweepSchedule,
};
