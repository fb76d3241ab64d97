//! Unit tests for accelerometer/gyroscope bias calibration

use crate::common::{assert_float_eq, create_mock_driver, MockDelay, RecordingDelay};
use mpu9250::calibration::MAX_FIFO_WINDOW_MS;
use mpu9250::{
    AccelCalibration, AccelFullScale, BiasCalibrationConfig, Error, GyroCalibration,
    GyroFullScale, ReferenceGravity,
};

fn no_push() -> BiasCalibrationConfig {
    BiasCalibrationConfig {
        push_gyro_offsets: false,
        push_accel_offsets: false,
        ..Default::default()
    }
}

#[test]
fn test_calibrate_measures_biases() {
    let (mut driver, interface) = create_mock_driver();
    interface.set_fifo_packets(&[([100, -200, 16384 + 300], [40, -80, 12]); 40]);

    let biases = driver.calibrate(&mut MockDelay, &no_push()).unwrap();

    assert_float_eq(biases.accel.bias_x, 100.0 / 16384.0, 1e-6);
    assert_float_eq(biases.accel.bias_y, -200.0 / 16384.0, 1e-6);
    assert_float_eq(biases.accel.bias_z, 300.0 / 16384.0, 1e-6);
    assert_float_eq(biases.gyro.bias_x, 40.0 / 131.0, 1e-6);
    assert_float_eq(biases.gyro.bias_y, -80.0 / 131.0, 1e-6);
    assert_float_eq(biases.gyro.bias_z, 12.0 / 131.0, 1e-6);

    // Without hardware push, the measured biases become the software correction
    assert_eq!(driver.accelerometer_calibration(), &biases.accel);
    assert_eq!(driver.gyroscope_calibration(), &biases.gyro);
}

#[test]
fn test_calibrate_truncates_mean() {
    let (mut driver, interface) = create_mock_driver();
    let mut packets = vec![([1, 0, 16384], [1, 0, 0]); 20];
    packets.extend(vec![([2, 0, 16384], [2, 0, 0]); 20]);
    interface.set_fifo_packets(&packets);

    let biases = driver.calibrate(&mut MockDelay, &no_push()).unwrap();

    // 60 / 40 truncates to 1
    assert_float_eq(biases.accel.bias_x, 1.0 / 16384.0, 1e-9);
    assert_float_eq(biases.gyro.bias_x, 1.0 / 131.0, 1e-9);
}

#[test]
fn test_calibrate_ignores_partial_packet() {
    let (mut driver, interface) = create_mock_driver();

    let mut bytes = Vec::new();
    for _ in 0..3 {
        for value in [0i16, 0, 16384, 131, 0, 0] {
            bytes.extend_from_slice(&value.to_be_bytes());
        }
    }
    bytes.extend_from_slice(&[0xFF; 5]);
    interface.set_fifo_bytes(bytes);

    let biases = driver.calibrate(&mut MockDelay, &no_push()).unwrap();

    assert_float_eq(biases.gyro.bias_x, 1.0, 1e-6);
    assert_eq!(interface.fifo_len(), 5);
}

#[test]
fn test_calibrate_without_samples() {
    let (mut driver, _interface) = create_mock_driver();

    let result = driver.calibrate(&mut MockDelay, &no_push());
    assert!(matches!(result, Err(Error::NoCalibrationSamples)));
}

#[test]
fn test_calibrate_with_only_partial_packet() {
    let (mut driver, interface) = create_mock_driver();
    interface.set_fifo_bytes(vec![0u8; 11]);

    let result = driver.calibrate(&mut MockDelay, &no_push());
    assert!(matches!(result, Err(Error::NoCalibrationSamples)));
}

#[test]
fn test_calibrate_pushes_gyro_offsets() {
    let (mut driver, interface) = create_mock_driver();
    interface.set_fifo_packets(&[([0, 0, 16384], [40, -80, 12]); 40]);

    let config = BiasCalibrationConfig::default();
    assert!(config.push_gyro_offsets);
    let biases = driver.calibrate(&mut MockDelay, &config).unwrap();

    // -bias / 4, two's complement, big endian
    assert_eq!(interface.get_register(0x13), 0xFF);
    assert_eq!(interface.get_register(0x14), 0xF6);
    assert_eq!(interface.get_register(0x15), 0x00);
    assert_eq!(interface.get_register(0x16), 0x14);
    assert_eq!(interface.get_register(0x17), 0xFF);
    assert_eq!(interface.get_register(0x18), 0xFD);

    // Hardware corrects the gyro; the software bias is zero
    assert_eq!(driver.gyroscope_calibration(), &GyroCalibration::default());
    assert_float_eq(biases.gyro.bias_x, 40.0 / 131.0, 1e-6);
}

#[test]
fn test_calibrate_pushes_accel_offsets() {
    let (mut driver, interface) = create_mock_driver();
    interface.set_fifo_packets(&[([80, 0, 16384], [0, 0, 0]); 40]);

    // Factory XA_OFFSET 0x1001, temperature compensation bit set
    interface.set_register(0x77, 0x10);
    interface.set_register(0x78, 0x01);

    let config = BiasCalibrationConfig {
        push_gyro_offsets: false,
        push_accel_offsets: true,
        ..Default::default()
    };
    driver.calibrate(&mut MockDelay, &config).unwrap();

    // 4097 - 80 / 8 = 4087, bit 0 preserved
    assert_eq!(interface.get_register(0x77), 0x0F);
    assert_eq!(interface.get_register(0x78), 0xF7);
    assert_eq!(driver.accelerometer_calibration(), &AccelCalibration::default());
}

#[test]
fn test_calibrate_reference_gravity() {
    let cases = [
        (ReferenceGravity::ZNegative, [0i16, 0, -16384 + 50], 2),
        (ReferenceGravity::XPositive, [16384 + 50, 0, 0], 0),
        (ReferenceGravity::YNegative, [0, -16384 + 50, 0], 1),
    ];

    for (gravity, accel, axis) in cases {
        let (mut driver, interface) = create_mock_driver();
        interface.set_fifo_packets(&[(accel, [0, 0, 0]); 10]);

        let config = BiasCalibrationConfig {
            reference_gravity: gravity,
            ..no_push()
        };
        let biases = driver.calibrate(&mut MockDelay, &config).unwrap();

        let bias = [biases.accel.bias_x, biases.accel.bias_y, biases.accel.bias_z];
        assert_float_eq(bias[axis], 50.0 / 16384.0, 1e-6);
    }
}

#[test]
fn test_calibrate_fifo_sequence() {
    let (mut driver, interface) = create_mock_driver();
    interface.set_fifo_packets(&[([0, 0, 16384], [0, 0, 0]); 40]);

    let config = BiasCalibrationConfig {
        fifo_window_ms: 30,
        ..no_push()
    };
    let mut delay = RecordingDelay::default();
    driver.calibrate(&mut delay, &config).unwrap();

    // FIFO_EN: off, accel + gyro, off
    assert_eq!(interface.writes_to(0x23), vec![0x00, 0x78, 0x00]);
    // USER_CTRL: clear, FIFO and DMP reset, FIFO enable
    assert_eq!(interface.writes_to(0x6A), vec![0x00, 0x0C, 0x40]);
    // CONFIG: stop-when-full FIFO during capture, then plain 184 Hz filter
    assert_eq!(interface.writes_to(0x1A), vec![0x41, 0x01]);
    assert_eq!(interface.get_register(0x19), 0x00);

    assert_eq!(delay.count_of(30), 1);
    assert_eq!(delay.count_of(100), 1);
    assert_eq!(delay.count_of(200), 1);
    assert_eq!(interface.fifo_len(), 0);
}

#[test]
fn test_calibrate_leaves_lowest_ranges() {
    let (mut driver, interface) = create_mock_driver();
    interface.set_fifo_packets(&[([0, 0, 16384], [0, 0, 0]); 10]);

    driver
        .configure_accelerometer(mpu9250::AccelConfig {
            full_scale: AccelFullScale::G16,
            ..Default::default()
        })
        .unwrap();

    driver.calibrate(&mut MockDelay, &no_push()).unwrap();

    assert_eq!(driver.accelerometer_config().full_scale, AccelFullScale::G2);
    assert_eq!(driver.gyroscope_config().full_scale, GyroFullScale::Dps250);
    assert_eq!(interface.get_register(0x1C), 0x00);
}

#[test]
fn test_calibration_applied_to_readings() {
    let (mut driver, interface) = create_mock_driver();
    interface.set_fifo_packets(&[([164, 0, 16384], [131, 0, 0]); 10]);

    driver.calibrate(&mut MockDelay, &no_push()).unwrap();

    interface.set_accel_data(164, 0, 16384);
    interface.set_gyro_data(131, 0, 0);

    let accel = driver.read_accelerometer().unwrap();
    assert_float_eq(accel.x, 0.0, 1e-4);
    assert_float_eq(accel.z, 1.0, 1e-4);

    // Biases use 131 LSB/dps, readings 250/32768 dps/LSB
    let gyro = driver.read_gyroscope().unwrap();
    assert_float_eq(gyro.x, 0.0, 1e-3);
}

#[test]
fn test_calibrate_rejects_long_window() {
    let (mut driver, interface) = create_mock_driver();
    interface.set_fifo_packets(&[([0, 0, 16384], [0, 0, 0]); 100]);

    let config = BiasCalibrationConfig {
        fifo_window_ms: 100,
        ..no_push()
    };
    let result = driver.calibrate(&mut MockDelay, &config);

    assert!(matches!(result, Err(Error::InvalidConfig)));
    // Rejected before touching the device
    assert!(interface.writes_to(0x6B).is_empty());
    assert!(interface.writes_to(0x23).is_empty());
}

#[test]
fn test_calibrate_full_fifo_keeps_packet_alignment() {
    let (mut driver, interface) = create_mock_driver();
    // More data than the FIFO holds; the late packets must never be read
    let mut packets = vec![([10, -20, 16384], [30, -40, 50]); MAX_FIFO_WINDOW_MS as usize];
    packets.extend(vec![([9999, 9999, 9999], [9999, 9999, 9999]); 20]);
    interface.set_fifo_packets(&packets);

    let config = BiasCalibrationConfig {
        fifo_window_ms: MAX_FIFO_WINDOW_MS,
        ..no_push()
    };
    let biases = driver.calibrate(&mut MockDelay, &config).unwrap();

    assert_float_eq(biases.accel.bias_x, 10.0 / 16384.0, 1e-6);
    assert_float_eq(biases.accel.bias_y, -20.0 / 16384.0, 1e-6);
    assert_float_eq(biases.accel.bias_z, 0.0, 1e-6);
    assert_float_eq(biases.gyro.bias_x, 30.0 / 131.0, 1e-6);
    assert_float_eq(biases.gyro.bias_y, -40.0 / 131.0, 1e-6);
    assert_float_eq(biases.gyro.bias_z, 50.0 / 131.0, 1e-6);

    // 512 bytes captured, 42 whole packets read, the partial tail left behind
    assert_eq!(interface.fifo_len(), 512 - 42 * 12);
}
