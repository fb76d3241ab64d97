//! Integration tests for basic workflow scenarios

use crate::common::mock_interface::MockInterface;
use crate::common::{
    assert_float_eq, create_mock_driver, setup_passing_self_test, MockDelay, RecordingDelay,
};
use mpu9250::{
    AccelConfig, AccelFullScale, BiasCalibrationConfig, DataReadyFlag, GyroConfig, GyroDlpf,
    GyroFullScale, MagConfig, MagMode, MagResolution, Mpu9250Config, Mpu9250Driver,
};

/// A resting device: gravity on +Z, small gyro bias, steady magnetic field
fn resting_device(interface: &MockInterface) {
    setup_passing_self_test(interface);
    interface.set_fifo_packets(&[([0, 0, 16384], [40, -80, 12]); 40]);
    interface.set_accel_data(0, 0, 16384);
    interface.set_gyro_data(40, -80, 12);
    interface.set_mag_data(100, -200, 300);
    interface.set_temperature_data(0);
}

#[test]
fn test_complete_initialization_workflow() {
    let (mut driver, interface) = create_mock_driver();
    resting_device(&interface);

    driver
        .begin(&mut MockDelay, &Mpu9250Config::default())
        .unwrap();

    // Sample rate divisor, filters, I2C master at 400 kHz, data-ready interrupt
    assert_eq!(interface.get_register(0x19), 4);
    assert_eq!(interface.get_register(0x1A), GyroDlpf::Hz41 as u8);
    assert_eq!(interface.get_register(0x24), 13);
    assert_eq!(interface.get_register(0x37), 0x10);
    assert_eq!(interface.get_register(0x38), 0x01);
    assert_ne!(interface.get_register(0x6A) & 0x20, 0);

    // Gyro offsets pushed during calibration survive configuration
    assert_eq!(interface.get_register(0x13), 0xFF);
    assert_eq!(interface.get_register(0x14), 0xF6);

    // Magnetometer in 16-bit continuous 100 Hz, fetched by slave 0
    assert_eq!(interface.get_mag_register(0x0A), 0x16);
    assert_eq!(interface.get_register(0x27), 0x88);

    let accel = driver.read_accelerometer().unwrap();
    assert_float_eq(accel.x, 0.0, 1e-4);
    assert_float_eq(accel.z, 1.0, 1e-4);

    let mag = driver.read_magnetometer().unwrap();
    assert_float_eq(mag.x, 100.0 * 10.0 * 4912.0 / 32760.0, 0.01);

    let temp = driver.read_temperature_celsius().unwrap();
    assert_float_eq(temp, 21.0, 1e-4);
}

#[test]
fn test_begin_with_custom_configuration() {
    let (mut driver, interface) = create_mock_driver();
    resting_device(&interface);

    let config = Mpu9250Config {
        accel: AccelConfig {
            full_scale: AccelFullScale::G8,
            ..Default::default()
        },
        gyro: GyroConfig {
            full_scale: GyroFullScale::Dps1000,
            dlpf: GyroDlpf::Hz92,
        },
        mag: MagConfig {
            resolution: MagResolution::Bits14,
            mode: MagMode::Continuous8Hz,
        },
        sample_rate_divisor: 9,
        calibration: BiasCalibrationConfig {
            push_gyro_offsets: false,
            ..Default::default()
        },
    };

    driver.begin(&mut MockDelay, &config).unwrap();

    assert_eq!(interface.get_register(0x1C), 0x10);
    assert_eq!(interface.get_register(0x1B), 0x10);
    assert_eq!(interface.get_mag_register(0x0A), 0x02);
    assert_float_eq(driver.sample_rate_hz(), 100.0, 1e-3);

    // Software gyro bias from calibration, applied at the configured range
    assert_float_eq(driver.gyroscope_calibration().bias_x, 40.0 / 131.0, 1e-6);
    assert_eq!(driver.accelerometer_config().full_scale, AccelFullScale::G8);

    interface.set_accel_data(0, 0, 4096);
    let accel = driver.read_accelerometer().unwrap();
    assert_float_eq(accel.z, 1.0, 1e-4);
}

#[test]
fn test_begin_delays() {
    let (mut driver, interface) = create_mock_driver();
    resting_device(&interface);

    let mut delay = RecordingDelay::default();
    driver.begin(&mut delay, &Mpu9250Config::default()).unwrap();

    // Self-test settling and the calibration capture window
    assert_eq!(delay.count_of(25), 2);
    assert_eq!(delay.count_of(40), 1);
}

#[test]
fn test_calibrate_magnetometer_after_begin() {
    let (mut driver, interface) = create_mock_driver();
    resting_device(&interface);
    driver
        .begin(&mut MockDelay, &Mpu9250Config::default())
        .unwrap();

    interface.set_mag_sequence(vec![
        ([200, 100, 50], 0x00),
        ([0, -100, -150], 0x00),
    ]);
    let calibration = driver.calibrate_magnetometer(&mut MockDelay).unwrap();
    assert_float_eq(calibration.scale_x, 1.0, 1e-5);

    interface.set_mag_sequence(vec![([100, 0, -50], 0x00)]);
    let mag = driver.read_magnetometer().unwrap();
    assert_float_eq(mag.x, 0.0, 1e-3);
    assert_float_eq(mag.y, 0.0, 1e-3);
    assert_float_eq(mag.z, 0.0, 1e-3);
}

#[test]
fn test_data_ready_flag_polling() {
    static IMU_READY: DataReadyFlag = DataReadyFlag::new();

    let (mut driver, interface) = create_mock_driver();
    interface.set_accel_data(0, 0, 16384);

    // Interrupt handler side
    IMU_READY.set();

    let mut samples = 0;
    for _ in 0..3 {
        if IMU_READY.take() {
            driver.read_accelerometer().unwrap();
            samples += 1;
        }
    }
    assert_eq!(samples, 1);
}

#[test]
fn test_spi_style_workflow() {
    let (mut driver, interface) = create_mock_driver();
    resting_device(&interface);

    driver
        .begin(&mut MockDelay, &Mpu9250Config::default())
        .unwrap();
    driver.enable_spi_mode().unwrap();

    assert_ne!(interface.get_register(0x6A) & 0x10, 0);
    assert!(driver.read_accelerometer().is_ok());
}

#[test]
fn test_release_and_recreate() {
    let (driver, _interface) = create_mock_driver();

    let interface = driver.release();
    let driver = Mpu9250Driver::new(interface);
    assert!(driver.is_ok());
}

#[test]
fn test_raw_register_access() {
    let (mut driver, interface) = create_mock_driver();
    interface.set_register(0x19, 7);

    let divisor = driver.device_mut().smplrt_div().read().unwrap().smplrt_div();
    assert_eq!(divisor, 7);
}
