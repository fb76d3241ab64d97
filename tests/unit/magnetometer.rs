//! Unit tests for the AK8963 magnetometer

use crate::common::{
    assert_float_eq, create_mock_driver, create_mock_driver_with_mag, MockDelay, RecordingDelay,
};
use mpu9250::{Error, MagCalibration, MagConfig, MagMode, MagResolution};

/// mG per count at 16-bit resolution
const RES_16: f32 = 10.0 * 4912.0 / 32760.0;

#[test]
fn test_magnetometer_who_am_i() {
    let (mut driver, _interface) = create_mock_driver();
    assert_eq!(driver.read_magnetometer_who_am_i(&mut MockDelay).unwrap(), 0x48);
}

#[test]
fn test_init_magnetometer_sequence() {
    let (mut driver, interface) = create_mock_driver();

    driver
        .init_magnetometer(&mut MockDelay, MagConfig::default())
        .unwrap();

    // Power down, fuse ROM, power down, 16-bit continuous 100 Hz
    assert_eq!(
        interface.mag_writes(),
        vec![(0x0A, 0x00), (0x0A, 0x0F), (0x0A, 0x00), (0x0A, 0x16)]
    );

    // Slave 0 reads 8 bytes from ST1 of the AK8963
    assert_eq!(interface.get_register(0x25), 0x8C);
    assert_eq!(interface.get_register(0x26), 0x02);
    assert_eq!(interface.get_register(0x27), 0x88);

    // I2C master enabled
    assert_ne!(interface.get_register(0x6A) & 0x20, 0);
}

#[test]
fn test_init_magnetometer_14_bit_8hz() {
    let (mut driver, interface) = create_mock_driver();

    let config = MagConfig {
        resolution: MagResolution::Bits14,
        mode: MagMode::Continuous8Hz,
    };
    driver.init_magnetometer(&mut MockDelay, config).unwrap();

    assert_eq!(interface.get_mag_register(0x0A), 0x02);
    assert_eq!(driver.magnetometer_config(), &config);
}

#[test]
fn test_sensitivity_adjustment_from_fuse_rom() {
    let (mut driver, interface) = create_mock_driver();
    interface.set_mag_register(0x10, 176);
    interface.set_mag_register(0x11, 128);
    interface.set_mag_register(0x12, 0);

    driver
        .init_magnetometer(&mut MockDelay, MagConfig::default())
        .unwrap();

    let asa = driver.magnetometer_sensitivity_adjustment();
    assert_float_eq(asa.x, 1.1875, 1e-6);
    assert_float_eq(asa.y, 1.0, 1e-6);
    assert_float_eq(asa.z, 0.5, 1e-6);

    interface.set_mag_data(100, 100, 100);
    let mag = driver.read_magnetometer().unwrap();
    assert_float_eq(mag.x, 100.0 * RES_16 * 1.1875, 1e-2);
    assert_float_eq(mag.y, 100.0 * RES_16, 1e-2);
    assert_float_eq(mag.z, 50.0 * RES_16, 1e-2);
}

#[test]
fn test_read_magnetometer_raw_little_endian() {
    let (mut driver, interface) = create_mock_driver_with_mag();
    interface.set_mag_data(100, -200, 300);

    let raw = driver.read_magnetometer_raw().unwrap();
    assert_eq!((raw.x, raw.y, raw.z), (100, -200, 300));
}

#[test]
fn test_read_magnetometer_milligauss() {
    let (mut driver, interface) = create_mock_driver_with_mag();
    interface.set_mag_data(1000, -1000, 0);

    let mag = driver.read_magnetometer().unwrap();
    assert_float_eq(mag.x, 1499.39, 0.01);
    assert_float_eq(mag.y, -1499.39, 0.01);
    assert_float_eq(mag.z, 0.0, 1e-6);
}

#[test]
fn test_read_magnetometer_14_bit() {
    let (mut driver, interface) = create_mock_driver();
    let config = MagConfig {
        resolution: MagResolution::Bits14,
        mode: MagMode::Continuous100Hz,
    };
    driver.init_magnetometer(&mut MockDelay, config).unwrap();

    interface.set_mag_data(100, 0, 0);
    let mag = driver.read_magnetometer().unwrap();
    assert_float_eq(mag.x, 100.0 * 10.0 * 4912.0 / 8190.0, 0.01);
}

#[test]
fn test_overflow_keeps_previous_sample() {
    let (mut driver, interface) = create_mock_driver_with_mag();

    interface.set_mag_data(10, 20, 30);
    driver.read_magnetometer_raw().unwrap();

    // ST2 HOFL set
    interface.set_mag_data_with_status(999, 999, 999, 0x01, 0x08);
    let raw = driver.read_magnetometer_raw().unwrap();
    assert_eq!((raw.x, raw.y, raw.z), (10, 20, 30));

    interface.set_mag_data(-5, -6, -7);
    let raw = driver.read_magnetometer_raw().unwrap();
    assert_eq!((raw.x, raw.y, raw.z), (-5, -6, -7));
}

#[test]
fn test_overflow_on_first_sample() {
    let (mut driver, interface) = create_mock_driver_with_mag();

    interface.set_mag_data_with_status(999, 999, 999, 0x01, 0x08);
    let raw = driver.read_magnetometer_raw().unwrap();
    assert_eq!((raw.x, raw.y, raw.z), (0, 0, 0));
}

#[test]
fn test_read_before_init() {
    let (mut driver, _interface) = create_mock_driver();

    assert!(matches!(
        driver.read_magnetometer_raw(),
        Err(Error::Magnetometer)
    ));
    assert!(!driver.magnetometer_data_ready().unwrap());
}

#[test]
fn test_magnetometer_data_ready() {
    let (mut driver, interface) = create_mock_driver_with_mag();

    interface.set_mag_data_with_status(0, 0, 0, 0x01, 0x00);
    assert!(driver.magnetometer_data_ready().unwrap());

    interface.set_mag_data_with_status(0, 0, 0, 0x00, 0x00);
    assert!(!driver.magnetometer_data_ready().unwrap());
}

#[test]
fn test_calibrate_magnetometer_hard_and_soft_iron() {
    let (mut driver, interface) = create_mock_driver_with_mag();

    // x in [-100, 100], y in [0, 400], z in [-300, -100]
    interface.set_mag_sequence(vec![
        ([100, 400, -100], 0x00),
        ([-100, 0, -300], 0x00),
    ]);

    let calibration = driver.calibrate_magnetometer(&mut MockDelay).unwrap();

    assert_float_eq(calibration.bias_x, 0.0, 1e-3);
    assert_float_eq(calibration.bias_y, 200.0 * RES_16, 1e-2);
    assert_float_eq(calibration.bias_z, -200.0 * RES_16, 1e-2);

    // Half swings 100, 200, 100; average 133.3
    assert_float_eq(calibration.scale_x, 4.0 / 3.0, 1e-4);
    assert_float_eq(calibration.scale_y, 2.0 / 3.0, 1e-4);
    assert_float_eq(calibration.scale_z, 4.0 / 3.0, 1e-4);

    assert_eq!(driver.magnetometer_calibration(), &calibration);
}

#[test]
fn test_calibration_applied_to_readings() {
    let (mut driver, interface) = create_mock_driver_with_mag();
    interface.set_mag_sequence(vec![
        ([100, 400, -100], 0x00),
        ([-100, 0, -300], 0x00),
    ]);
    driver.calibrate_magnetometer(&mut MockDelay).unwrap();

    interface.set_mag_sequence(vec![([100, 400, -100], 0x00)]);
    let mag = driver.read_magnetometer().unwrap();

    assert_float_eq(mag.x, 100.0 * RES_16 * 4.0 / 3.0, 0.01);
    assert_float_eq(mag.y, 200.0 * RES_16 * 2.0 / 3.0, 0.01);
    assert_float_eq(mag.z, 100.0 * RES_16 * 4.0 / 3.0, 0.01);
}

#[test]
fn test_calibration_schedule_100hz() {
    let (mut driver, interface) = create_mock_driver_with_mag();
    interface.set_mag_sequence(vec![([1, 2, 3], 0x00), ([-1, -2, -3], 0x00)]);

    let mut delay = RecordingDelay::default();
    driver.calibrate_magnetometer(&mut delay).unwrap();

    assert_eq!(delay.delays_ms.len(), 1500);
    assert_eq!(delay.count_of(12), 1500);
}

#[test]
fn test_calibration_schedule_8hz() {
    let (mut driver, interface) = create_mock_driver();
    let config = MagConfig {
        resolution: MagResolution::Bits16,
        mode: MagMode::Continuous8Hz,
    };
    driver.init_magnetometer(&mut MockDelay, config).unwrap();
    interface.set_mag_sequence(vec![([1, 2, 3], 0x00), ([-1, -2, -3], 0x00)]);

    let mut delay = RecordingDelay::default();
    driver.calibrate_magnetometer(&mut delay).unwrap();

    assert_eq!(delay.delays_ms.len(), 128);
    assert_eq!(delay.count_of(135), 128);
}

#[test]
fn test_calibration_rejects_single_mode() {
    let (mut driver, _interface) = create_mock_driver();
    let config = MagConfig {
        resolution: MagResolution::Bits16,
        mode: MagMode::Single,
    };
    driver.init_magnetometer(&mut MockDelay, config).unwrap();

    let result = driver.calibrate_magnetometer(&mut MockDelay);
    assert!(matches!(result, Err(Error::InvalidConfig)));
    assert_eq!(driver.magnetometer_calibration(), &MagCalibration::default());
}

#[test]
fn test_calibration_stationary_axis() {
    let (mut driver, interface) = create_mock_driver_with_mag();
    interface.set_mag_sequence(vec![([100, 50, 0], 0x00), ([-100, 50, 0], 0x00)]);

    let calibration = driver.calibrate_magnetometer(&mut MockDelay).unwrap();

    // Axes that never moved have no swing
    assert!(calibration.scale_y.is_infinite());
    assert!(calibration.scale_z.is_infinite());
}

#[test]
fn test_set_magnetometer_calibration() {
    let (mut driver, interface) = create_mock_driver_with_mag();

    driver.set_magnetometer_calibration(MagCalibration {
        bias_x: RES_16 * 10.0,
        scale_x: 2.0,
        ..Default::default()
    });

    interface.set_mag_data(20, 0, 0);
    let mag = driver.read_magnetometer().unwrap();
    assert_float_eq(mag.x, RES_16 * 20.0, 0.01);
}

#[test]
fn test_slave4_nack() {
    let (mut driver, interface) = create_mock_driver();
    interface.set_mag_nack(true);

    assert!(matches!(
        driver.init_magnetometer(&mut MockDelay, MagConfig::default()),
        Err(Error::Magnetometer)
    ));
    assert!(matches!(
        driver.read_magnetometer_who_am_i(&mut MockDelay),
        Err(Error::Magnetometer)
    ));
}
