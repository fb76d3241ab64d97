//! High-level driver API for the MPU9250
//!
//! This module provides a user-friendly interface to the MPU9250 sensor,
//! handling sensor configuration, calibration, data reading and access to the
//! AK8963 magnetometer through the auxiliary I2C master.

use device_driver::RegisterInterface;
use embedded_hal::delay::DelayNs;

use crate::calibration::{
    accel_offset_register, gyro_offset_register, AxisSum, BiasCalibrationConfig, BiasSet,
    MagSweep, SelfTestResult, CALIBRATION_ACCEL_SENSITIVITY, MAX_FIFO_WINDOW_MS,
    SELF_TEST_SAMPLES, SELF_TEST_SETTLE_MS,
};
use crate::fifo::{self, FifoPacket, PACKET_SIZE};
use crate::interrupt::{InterruptConfig, InterruptPinConfig, InterruptStatus};
use crate::power::{ClockSource, SensorPowerConfig, WakeOnMotionConfig};
use crate::registers::{addr, RegisterDevice};
use crate::sensors::magnetometer::{
    AK8963_I2C_ADDRESS, AK8963_REG_ASAX, AK8963_REG_CNTL1, AK8963_REG_ST1, AK8963_REG_WIA,
    AK8963_ST2_HOFL, AK8963_WIA_VALUE,
};
use crate::sensors::{
    AccelCalibration, AccelConfig, AccelDataG, AccelFullScale, GyroCalibration, GyroConfig,
    GyroDataDps, GyroDataRps, GyroDlpf, GyroFullScale, MagCalibration, MagConfig,
    MagDataMilliGauss, MagMode, MagSensitivity,
};
use crate::{Error, WHO_AM_I_VALUE};

/// `I2C_MST_CLK` divider for a 400 kHz auxiliary bus
const I2C_MST_CLK_400KHZ: u8 = 13;

/// Bytes fetched by slave 0: ST1, HXL..HZH, ST2
const MAG_FRAME_LEN: usize = 8;

/// `SMPLRT_DIV` through `ACCEL_CONFIG2`, saved around the self-test
const CONFIG_BLOCK_LEN: usize = 5;

/// Accelerometer data (raw 16-bit values)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelData {
    /// X-axis acceleration (raw)
    pub x: i16,
    /// Y-axis acceleration (raw)
    pub y: i16,
    /// Z-axis acceleration (raw)
    pub z: i16,
}

/// Gyroscope data (raw 16-bit values)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GyroData {
    /// X-axis rotation (raw)
    pub x: i16,
    /// Y-axis rotation (raw)
    pub y: i16,
    /// Z-axis rotation (raw)
    pub z: i16,
}

/// Magnetometer data (raw 16-bit values)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MagData {
    /// X-axis magnetic field (raw)
    pub x: i16,
    /// Y-axis magnetic field (raw)
    pub y: i16,
    /// Z-axis magnetic field (raw)
    pub z: i16,
}

/// Complete device configuration applied by [`Mpu9250Driver::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mpu9250Config {
    /// Accelerometer range and filter
    pub accel: AccelConfig,
    /// Gyroscope range and filter
    pub gyro: GyroConfig,
    /// Magnetometer resolution and mode
    pub mag: MagConfig,
    /// `SMPLRT_DIV`: output rate = internal rate / (1 + divisor)
    pub sample_rate_divisor: u8,
    /// Bias calibration settings
    pub calibration: BiasCalibrationConfig,
}

impl Default for Mpu9250Config {
    fn default() -> Self {
        Self {
            accel: AccelConfig::default(),
            gyro: GyroConfig::default(),
            mag: MagConfig::default(),
            sample_rate_divisor: 4,
            calibration: BiasCalibrationConfig::default(),
        }
    }
}

/// Main driver for the MPU9250
pub struct Mpu9250Driver<I> {
    device: RegisterDevice<I>,
    // Sensor configurations
    accel_config: AccelConfig,
    gyro_config: GyroConfig,
    mag_config: MagConfig,
    sample_rate_divisor: u8,
    // Sensor calibrations
    accel_calibration: AccelCalibration,
    gyro_calibration: GyroCalibration,
    mag_calibration: MagCalibration,
    mag_sensitivity: MagSensitivity,
    last_mag: MagData,
    mag_initialized: bool,
}

impl<I> Mpu9250Driver<I>
where
    I: RegisterInterface<AddressType = u8>,
{
    /// Create a new MPU9250 driver instance
    ///
    /// This will verify the `WHO_AM_I` register but will not initialize the device.
    /// Call [`begin`](Self::begin) after construction to bring the device up.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Communication with the device fails
    /// - The `WHO_AM_I` register contains an unexpected value
    pub fn new(interface: I) -> Result<Self, Error<I::Error>> {
        let device = RegisterDevice::new(interface);
        let mut driver = Self {
            device,
            accel_config: AccelConfig::default(),
            gyro_config: GyroConfig::default(),
            mag_config: MagConfig::default(),
            sample_rate_divisor: 0,
            accel_calibration: AccelCalibration::default(),
            gyro_calibration: GyroCalibration::default(),
            mag_calibration: MagCalibration::default(),
            mag_sensitivity: MagSensitivity::default(),
            last_mag: MagData::default(),
            mag_initialized: false,
        };

        let who_am_i = driver.read_who_am_i()?;
        if who_am_i != WHO_AM_I_VALUE {
            return Err(Error::InvalidDevice(who_am_i));
        }

        Ok(driver)
    }

    /// Bring the device up: identity, reset, self-test, bias calibration,
    /// configuration and magnetometer setup
    ///
    /// The device must rest still, oriented as
    /// `config.calibration.reference_gravity` describes.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDevice`] if `WHO_AM_I` is not 0x71
    /// - [`Error::SelfTestFailed`] if any self-test deviation reaches the tolerance
    /// - [`Error::NoCalibrationSamples`] if the FIFO collected nothing
    /// - [`Error::InvalidMagnetometer`] if the AK8963 `WIA` is not 0x48
    /// - [`Error::Magnetometer`] or [`Error::Bus`] on communication failures
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut imu = Mpu9250Driver::new(I2cInterface::default(i2c))?;
    /// imu.begin(&mut delay, &Mpu9250Config::default())?;
    /// ```
    pub fn begin<D>(&mut self, delay: &mut D, config: &Mpu9250Config) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        let who_am_i = self.read_who_am_i()?;
        if who_am_i != WHO_AM_I_VALUE {
            return Err(Error::InvalidDevice(who_am_i));
        }

        self.reset(delay)?;

        if !self.self_test(delay)?.passed() {
            return Err(Error::SelfTestFailed);
        }

        self.calibrate(delay, &config.calibration)?;
        self.configure(delay, config)?;

        let mag_id = self.read_magnetometer_who_am_i(delay)?;
        if mag_id != AK8963_WIA_VALUE {
            return Err(Error::InvalidMagnetometer(mag_id));
        }

        self.init_magnetometer(delay, config.mag)
    }

    /// Reset all registers to their defaults
    ///
    /// The auxiliary I2C master is disabled around the reset and enabled
    /// again afterwards. Waits 100 ms.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn reset<D>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        self.device.user_ctrl().write(|_| {})?;
        self.device.pwr_mgmt_1().write(|w| {
            w.set_h_reset(true);
        })?;
        self.device.user_ctrl().write(|w| {
            w.set_i_2_c_mst_en(true);
        })?;
        delay.delay_ms(100);
        Ok(())
    }

    /// Enable SPI mode by disabling the I2C slave interface
    ///
    /// Call this after [`begin`](Self::begin) when using the `SpiInterface`.
    /// Not needed for I2C.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn enable_spi_mode(&mut self) -> Result<(), Error<I::Error>> {
        self.device.user_ctrl().modify(|w| {
            w.set_i_2_c_if_dis(true);
        })?;
        Ok(())
    }

    /// Read the `WHO_AM_I` register
    ///
    /// Should return 0x71 for a valid MPU9250
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_who_am_i(&mut self) -> Result<u8, Error<I::Error>> {
        let reg = self.device.who_am_i().read()?;
        Ok(reg.who_am_i())
    }

    // ==================== SELF-TEST AND CALIBRATION ====================

    /// Run the factory self-test on accelerometer and gyroscope
    ///
    /// Averages 200 samples with and without the self-test excitation at the
    /// lowest ranges, and compares the response with the factory trim codes.
    /// The sample-rate, filter and range registers are restored afterwards.
    ///
    /// The returned [`SelfTestResult`] holds the per-axis deviations; use
    /// [`SelfTestResult::passed`] for the verdict.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn self_test<D>(&mut self, delay: &mut D) -> Result<SelfTestResult, Error<I::Error>>
    where
        D: DelayNs,
    {
        let mut saved = [0u8; CONFIG_BLOCK_LEN];
        self.device
            .interface
            .read_register(addr::SMPLRT_DIV, 8 * CONFIG_BLOCK_LEN as u32, &mut saved)?;

        // 1 kHz, 92 Hz filters, ±250 dps, ±2 g
        self.device.smplrt_div().write(|_| {})?;
        self.device.configuration().write(|w| {
            w.set_dlpf_cfg(GyroDlpf::Hz92 as u8);
        })?;
        self.device.gyro_config().write(|w| {
            w.set_gyro_fs_sel(GyroFullScale::Dps250 as u8);
        })?;
        self.device.accel_config_2().write(|w| {
            w.set_a_dlpfcfg(2);
        })?;
        self.device.accel_config().write(|w| {
            w.set_accel_fs_sel(AccelFullScale::G2 as u8);
        })?;

        let (accel_normal, gyro_normal) = self.average_accel_gyro(SELF_TEST_SAMPLES)?;

        self.device.accel_config().write(|w| {
            w.set_ax_st_en(true);
            w.set_ay_st_en(true);
            w.set_az_st_en(true);
        })?;
        self.device.gyro_config().write(|w| {
            w.set_xgyro_cten(true);
            w.set_ygyro_cten(true);
            w.set_zgyro_cten(true);
        })?;
        delay.delay_ms(SELF_TEST_SETTLE_MS);

        let (accel_self_test, gyro_self_test) = self.average_accel_gyro(SELF_TEST_SAMPLES)?;

        self.device.accel_config().write(|_| {})?;
        self.device.gyro_config().write(|_| {})?;
        delay.delay_ms(SELF_TEST_SETTLE_MS);

        self.device
            .interface
            .write_register(addr::SMPLRT_DIV, 8 * CONFIG_BLOCK_LEN as u32, &saved)?;

        let accel_codes = [
            self.device.self_test_x_accel().read()?.code(),
            self.device.self_test_y_accel().read()?.code(),
            self.device.self_test_z_accel().read()?.code(),
        ];
        let gyro_codes = [
            self.device.self_test_x_gyro().read()?.code(),
            self.device.self_test_y_gyro().read()?.code(),
            self.device.self_test_z_gyro().read()?.code(),
        ];

        let result = SelfTestResult::from_averages(
            accel_normal,
            accel_self_test,
            gyro_normal,
            gyro_self_test,
            accel_codes,
            gyro_codes,
        );

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Self-test deviation (%): accel={}, gyro={}",
            result.accel_deviation,
            result.gyro_deviation
        );

        Ok(result)
    }

    /// Average `samples` accel and gyro readings, accel read first each time
    fn average_accel_gyro(&mut self, samples: u16) -> Result<([i32; 3], [i32; 3]), Error<I::Error>> {
        let mut accel_sum = AxisSum::new();
        let mut gyro_sum = AxisSum::new();

        for _ in 0..samples {
            let accel = self.read_accel()?;
            accel_sum.add([accel.x, accel.y, accel.z]);
            let gyro = self.read_gyro()?;
            gyro_sum.add([gyro.x, gyro.y, gyro.z]);
        }

        Ok((
            accel_sum.mean().unwrap_or_default(),
            gyro_sum.mean().unwrap_or_default(),
        ))
    }

    /// Measure accelerometer and gyroscope biases with the FIFO
    ///
    /// The device must be at rest. This resets the device, captures
    /// accel + gyro packets for `config.fifo_window_ms` at 1 kHz with the 184 Hz
    /// filters, ±2 g and ±250 dps, and averages them. The gravity reading given
    /// by `config.reference_gravity` is removed from the accelerometer.
    ///
    /// Biases are optionally written to the hardware offset registers. A sensor
    /// corrected in hardware gets a zero software bias; otherwise the measured
    /// bias is stored and subtracted from every later reading.
    ///
    /// The device is left at ±2 g and ±250 dps; call
    /// [`configure`](Self::configure) to apply the final settings.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if `config.fifo_window_ms` exceeds
    ///   [`MAX_FIFO_WINDOW_MS`]
    /// - [`Error::NoCalibrationSamples`] if the FIFO held no complete packet
    /// - [`Error::Bus`] if communication with the device fails
    pub fn calibrate<D>(
        &mut self,
        delay: &mut D,
        config: &BiasCalibrationConfig,
    ) -> Result<BiasSet, Error<I::Error>>
    where
        D: DelayNs,
    {
        if config.fifo_window_ms > MAX_FIFO_WINDOW_MS {
            return Err(Error::InvalidConfig);
        }

        self.device.pwr_mgmt_1().write(|w| {
            w.set_h_reset(true);
        })?;
        delay.delay_ms(100);

        self.set_clock_source(ClockSource::AutoSelect)?;
        self.configure_sensor_power(&SensorPowerConfig::all_enabled())?;
        delay.delay_ms(200);

        // Quiet the device before capturing
        self.device.int_enable().write(|_| {})?;
        self.device.fifo_en().write(|_| {})?;
        self.set_clock_source(ClockSource::Internal20MHz)?;
        self.device.i_2_c_mst_ctrl().write(|_| {})?;
        self.device.user_ctrl().write(|_| {})?;
        self.device.user_ctrl().write(|w| {
            w.set_fifo_rst(true);
            w.set_dmp_rst(true);
        })?;
        delay.delay_ms(15);

        // Stop capture when the FIFO is full so packets stay aligned
        self.device.configuration().write(|w| {
            w.set_fifo_mode(true);
            w.set_dlpf_cfg(GyroDlpf::Hz184 as u8);
        })?;
        self.device.smplrt_div().write(|_| {})?;
        self.device.gyro_config().write(|w| {
            w.set_gyro_fs_sel(GyroFullScale::Dps250 as u8);
        })?;
        self.device.accel_config().write(|w| {
            w.set_accel_fs_sel(AccelFullScale::G2 as u8);
        })?;
        self.accel_config.full_scale = AccelFullScale::G2;
        self.gyro_config.full_scale = GyroFullScale::Dps250;
        self.gyro_config.dlpf = GyroDlpf::Hz184;

        // Capture
        self.device.user_ctrl().write(|w| {
            w.set_fifo_en(true);
        })?;
        self.device.fifo_en().write(|w| {
            w.set_accel(true);
            w.set_gyro_xout(true);
            w.set_gyro_yout(true);
            w.set_gyro_zout(true);
        })?;
        delay.delay_ms(config.fifo_window_ms);
        self.device.fifo_en().write(|_| {})?;
        self.device.configuration().modify(|w| {
            w.set_fifo_mode(false);
        })?;

        let fifo_count = self.device.fifo_count().read()?.fifo_count();
        let packets = fifo::packet_count(fifo_count);

        let mut accel_sum = AxisSum::new();
        let mut gyro_sum = AxisSum::new();
        for _ in 0..packets {
            let mut buffer = [0u8; PACKET_SIZE];
            self.device
                .interface
                .read_register(addr::FIFO_R_W, 8 * PACKET_SIZE as u32, &mut buffer)?;
            let packet = FifoPacket::parse(&buffer);
            accel_sum.add(packet.accel);
            gyro_sum.add(packet.gyro);
        }

        let (Some(accel_mean), Some(gyro_mean)) = (accel_sum.mean(), gyro_sum.mean()) else {
            return Err(Error::NoCalibrationSamples);
        };

        let accel_counts = config
            .reference_gravity
            .remove_from(accel_mean, CALIBRATION_ACCEL_SENSITIVITY);
        let biases = BiasSet::from_counts(accel_counts, gyro_mean);

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Bias calibration over {} packets: accel={} g, gyro={} dps",
            packets,
            [biases.accel.bias_x, biases.accel.bias_y, biases.accel.bias_z],
            [biases.gyro.bias_x, biases.gyro.bias_y, biases.gyro.bias_z]
        );

        if config.push_gyro_offsets {
            self.push_gyro_offsets(gyro_mean)?;
            self.gyro_calibration = GyroCalibration::default();
        } else {
            self.gyro_calibration = biases.gyro;
        }

        if config.push_accel_offsets {
            self.push_accel_offsets(accel_counts)?;
            self.accel_calibration = AccelCalibration::default();
        } else {
            self.accel_calibration = biases.accel;
        }

        Ok(biases)
    }

    fn push_gyro_offsets(&mut self, bias_counts: [i32; 3]) -> Result<(), Error<I::Error>> {
        self.device.xg_offset().write(|w| {
            w.set_offset(gyro_offset_register(bias_counts[0]));
        })?;
        self.device.yg_offset().write(|w| {
            w.set_offset(gyro_offset_register(bias_counts[1]));
        })?;
        self.device.zg_offset().write(|w| {
            w.set_offset(gyro_offset_register(bias_counts[2]));
        })?;
        Ok(())
    }

    fn push_accel_offsets(&mut self, bias_counts: [i32; 3]) -> Result<(), Error<I::Error>> {
        let factory_x = self.device.xa_offset().read()?.offset();
        let factory_y = self.device.ya_offset().read()?.offset();
        let factory_z = self.device.za_offset().read()?.offset();

        self.device.xa_offset().write(|w| {
            w.set_offset(accel_offset_register(factory_x, bias_counts[0]));
        })?;
        self.device.ya_offset().write(|w| {
            w.set_offset(accel_offset_register(factory_y, bias_counts[1]));
        })?;
        self.device.za_offset().write(|w| {
            w.set_offset(accel_offset_register(factory_z, bias_counts[2]));
        })?;
        Ok(())
    }

    // ==================== CONFIGURATION ====================

    /// Apply sample rate, ranges, filters, interrupts and the I2C master
    ///
    /// Selects the PLL clock, writes `SMPLRT_DIV`, configures both sensors,
    /// sets the interrupt pin to a pulse cleared by any read, enables the
    /// data-ready interrupt and the auxiliary I2C master at 400 kHz.
    ///
    /// No register reset is issued, so offsets written by
    /// [`calibrate`](Self::calibrate) stay in effect.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn configure<D>(
        &mut self,
        delay: &mut D,
        config: &Mpu9250Config,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        self.device.pwr_mgmt_1().write(|w| {
            w.set_clksel(ClockSource::AutoSelect as u8);
        })?;
        delay.delay_ms(200);

        self.set_sample_rate_divisor(config.sample_rate_divisor)?;
        self.configure_gyroscope(config.gyro)?;
        self.configure_accelerometer(config.accel)?;

        self.configure_interrupt_pin(&InterruptPinConfig::clear_on_read())?;

        self.device.user_ctrl().write(|w| {
            w.set_i_2_c_mst_en(true);
        })?;
        self.device.i_2_c_mst_ctrl().write(|w| {
            w.set_i_2_c_mst_clk(I2C_MST_CLK_400KHZ);
        })?;

        self.configure_interrupts(&InterruptConfig::data_ready_only())?;
        delay.delay_ms(100);

        Ok(())
    }

    /// Set `SMPLRT_DIV`
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_sample_rate_divisor(&mut self, divisor: u8) -> Result<(), Error<I::Error>> {
        self.device.smplrt_div().write(|w| {
            w.set_smplrt_div(divisor);
        })?;
        self.sample_rate_divisor = divisor;
        Ok(())
    }

    /// Output data rate in Hz derived from the gyro filter and `SMPLRT_DIV`
    #[must_use]
    pub fn sample_rate_hz(&self) -> f32 {
        self.gyro_config.sample_rate_hz(self.sample_rate_divisor)
    }

    /// Configure accelerometer range and filter
    ///
    /// # Arguments
    /// * `config` - Accelerometer configuration
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn configure_accelerometer(&mut self, config: AccelConfig) -> Result<(), Error<I::Error>> {
        self.device.accel_config().modify(|w| {
            w.set_accel_fs_sel(config.full_scale as u8);
        })?;

        self.device.accel_config_2().modify(|w| {
            w.set_a_dlpfcfg(config.dlpf as u8);
            w.set_accel_fchoice_b(config.fchoice_bypass);
        })?;

        self.accel_config = config;
        Ok(())
    }

    /// Configure gyroscope range and filter
    ///
    /// # Example
    ///
    /// ```ignore
    /// let gyro_config = GyroConfig {
    ///     full_scale: GyroFullScale::Dps500,
    ///     dlpf: GyroDlpf::Hz92,
    /// };
    /// imu.configure_gyroscope(gyro_config)?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn configure_gyroscope(&mut self, config: GyroConfig) -> Result<(), Error<I::Error>> {
        self.device.configuration().modify(|w| {
            w.set_dlpf_cfg(config.dlpf as u8);
        })?;

        self.device.gyro_config().modify(|w| {
            w.set_fchoice_b(0);
            w.set_gyro_fs_sel(config.full_scale as u8);
        })?;

        self.gyro_config = config;
        Ok(())
    }

    /// Current accelerometer configuration
    #[must_use]
    pub const fn accelerometer_config(&self) -> &AccelConfig {
        &self.accel_config
    }

    /// Current gyroscope configuration
    #[must_use]
    pub const fn gyroscope_config(&self) -> &GyroConfig {
        &self.gyro_config
    }

    /// Current magnetometer configuration
    #[must_use]
    pub const fn magnetometer_config(&self) -> &MagConfig {
        &self.mag_config
    }

    // ==================== RAW DATA ====================

    /// Read accelerometer data
    ///
    /// Returns raw 16-bit values for X, Y, Z axes.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_accel(&mut self) -> Result<AccelData, Error<I::Error>> {
        let [x, y, z] = self.read_triple(addr::ACCEL_XOUT_H)?;
        Ok(AccelData { x, y, z })
    }

    /// Read gyroscope data
    ///
    /// Returns raw 16-bit values for X, Y, Z axes.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_gyro(&mut self) -> Result<GyroData, Error<I::Error>> {
        let [x, y, z] = self.read_triple(addr::GYRO_XOUT_H)?;
        Ok(GyroData { x, y, z })
    }

    /// Burst read of three big-endian words, preventing torn reads
    fn read_triple(&mut self, address: u8) -> Result<[i16; 3], Error<I::Error>> {
        let mut buffer = [0u8; 6];
        self.device.interface.read_register(address, 48, &mut buffer)?;

        Ok([
            i16::from_be_bytes([buffer[0], buffer[1]]),
            i16::from_be_bytes([buffer[2], buffer[3]]),
            i16::from_be_bytes([buffer[4], buffer[5]]),
        ])
    }

    /// Read temperature sensor
    ///
    /// Returns raw 16-bit signed value.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_temperature(&mut self) -> Result<i16, Error<I::Error>> {
        let mut buffer = [0u8; 2];
        self.device
            .interface
            .read_register(addr::TEMP_OUT_H, 16, &mut buffer)?;

        Ok(i16::from_be_bytes(buffer))
    }

    /// Convert raw temperature to degrees Celsius
    ///
    /// `TEMP_degC = TEMP_OUT / 333.87 + 21`
    #[must_use]
    pub fn temperature_to_celsius(raw: i16) -> f32 {
        (f32::from(raw) / 333.87) + 21.0
    }

    /// Read die temperature in °C
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_temperature_celsius(&mut self) -> Result<f32, Error<I::Error>> {
        let raw = self.read_temperature()?;
        Ok(Self::temperature_to_celsius(raw))
    }

    /// Whether a new accel/gyro sample is available (`INT_STATUS` bit 0)
    ///
    /// With the pin configured by [`configure`](Self::configure), reading the
    /// status clears it.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn accel_data_ready(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.device.int_status().read()?.raw_data_rdy_int())
    }

    // ==================== ACCELEROMETER ====================

    /// Read raw accelerometer data (16-bit signed values)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_accelerometer_raw(&mut self) -> Result<(i16, i16, i16), Error<I::Error>> {
        let accel_data = self.read_accel()?;
        Ok((accel_data.x, accel_data.y, accel_data.z))
    }

    /// Read accelerometer data in g-force units
    ///
    /// Automatically applies calibration if set.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let accel_data = imu.read_accelerometer()?;
    /// println!("X: {}g, Y: {}g, Z: {}g", accel_data.x, accel_data.y, accel_data.z);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_accelerometer(&mut self) -> Result<AccelDataG, Error<I::Error>> {
        let accel_data = self.read_accel()?;
        Ok(self.accel_calibration.apply(
            accel_data.x,
            accel_data.y,
            accel_data.z,
            self.accel_config.full_scale.resolution(),
        ))
    }

    /// Set accelerometer calibration data
    ///
    /// The calibration will be automatically applied to all subsequent readings.
    pub const fn set_accelerometer_calibration(&mut self, calibration: AccelCalibration) {
        self.accel_calibration = calibration;
    }

    /// Get current accelerometer calibration data
    #[must_use]
    pub const fn accelerometer_calibration(&self) -> &AccelCalibration {
        &self.accel_calibration
    }

    // ==================== GYROSCOPE ====================

    /// Read raw gyroscope data (16-bit signed values)
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_gyroscope_raw(&mut self) -> Result<(i16, i16, i16), Error<I::Error>> {
        let gyro_data = self.read_gyro()?;
        Ok((gyro_data.x, gyro_data.y, gyro_data.z))
    }

    /// Read gyroscope data in degrees per second
    ///
    /// Automatically applies calibration if set.
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_gyroscope(&mut self) -> Result<GyroDataDps, Error<I::Error>> {
        let gyro_data = self.read_gyro()?;
        Ok(self.gyro_calibration.apply(
            gyro_data.x,
            gyro_data.y,
            gyro_data.z,
            self.gyro_config.full_scale.resolution(),
        ))
    }

    /// Read gyroscope data in radians per second
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn read_gyroscope_radians(&mut self) -> Result<GyroDataRps, Error<I::Error>> {
        Ok(self.read_gyroscope()?.to_radians_per_sec())
    }

    /// Set gyroscope calibration data
    ///
    /// The calibration will be automatically applied to all subsequent readings.
    pub const fn set_gyroscope_calibration(&mut self, calibration: GyroCalibration) {
        self.gyro_calibration = calibration;
    }

    /// Get current gyroscope calibration data
    #[must_use]
    pub const fn gyroscope_calibration(&self) -> &GyroCalibration {
        &self.gyro_calibration
    }

    // ==================== MAGNETOMETER ====================

    /// Read the AK8963 `WIA` register (expected 0x48)
    ///
    /// # Errors
    ///
    /// Returns an error if the auxiliary I2C transaction fails.
    pub fn read_magnetometer_who_am_i<D>(&mut self, delay: &mut D) -> Result<u8, Error<I::Error>>
    where
        D: DelayNs,
    {
        self.enable_i2c_master()?;
        self.read_mag_register(AK8963_REG_WIA, delay)
    }

    /// Initialize the AK8963 magnetometer
    ///
    /// Reads the factory sensitivity adjustment from the fuse ROM, then sets
    /// resolution and mode, and lets slave 0 fetch the measurement block into
    /// `EXT_SENS_DATA` on every sample.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mag_config = MagConfig {
    ///     resolution: MagResolution::Bits16,
    ///     mode: MagMode::Continuous100Hz,
    /// };
    /// imu.init_magnetometer(&mut delay, mag_config)?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if I2C communication fails or the magnetometer doesn't respond.
    pub fn init_magnetometer<D>(
        &mut self,
        delay: &mut D,
        config: MagConfig,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        self.enable_i2c_master()?;

        self.write_mag_register(AK8963_REG_CNTL1, MagMode::PowerDown as u8, delay)?;
        delay.delay_ms(10);
        self.write_mag_register(AK8963_REG_CNTL1, MagMode::FuseRom as u8, delay)?;
        delay.delay_ms(10);

        let mut asa = [0u8; 3];
        for (offset, value) in (0u8..).zip(asa.iter_mut()) {
            *value = self.read_mag_register(AK8963_REG_ASAX + offset, delay)?;
        }
        self.mag_sensitivity = MagSensitivity::from_asa(asa);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "AK8963 ASA raw={}, adjustment=({}, {}, {})",
            asa,
            self.mag_sensitivity.x,
            self.mag_sensitivity.y,
            self.mag_sensitivity.z
        );

        self.write_mag_register(AK8963_REG_CNTL1, MagMode::PowerDown as u8, delay)?;
        delay.delay_ms(10);
        self.write_mag_register(AK8963_REG_CNTL1, config.cntl1(), delay)?;
        delay.delay_ms(10);

        self.configure_slave0_for_magnetometer()?;

        self.mag_config = config;
        self.mag_initialized = true;
        Ok(())
    }

    /// Enable the auxiliary I2C master at 400 kHz, keeping other `USER_CTRL` bits
    fn enable_i2c_master(&mut self) -> Result<(), Error<I::Error>> {
        self.device.user_ctrl().modify(|w| {
            w.set_i_2_c_mst_en(true);
        })?;
        self.device.i_2_c_mst_ctrl().modify(|w| {
            w.set_i_2_c_mst_clk(I2C_MST_CLK_400KHZ);
        })?;
        Ok(())
    }

    /// Configure Slave 0 for automatic magnetometer data reads
    ///
    /// Reads 8 bytes: ST1, HXL, HXH, HYL, HYH, HZL, HZH, ST2. Reading ST2
    /// releases the AK8963 data registers for the next measurement.
    fn configure_slave0_for_magnetometer(&mut self) -> Result<(), Error<I::Error>> {
        self.device.i_2_c_slv_0_addr().write(|w| {
            w.set_slave_address(AK8963_I2C_ADDRESS);
            w.set_rnw(true);
        })?;

        self.device
            .i_2_c_slv_0_reg()
            .write(|w| w.set_slave_register(AK8963_REG_ST1))?;

        #[allow(clippy::cast_possible_truncation)]
        self.device.i_2_c_slv_0_ctrl().write(|w| {
            w.set_length(MAG_FRAME_LEN as u8);
            w.set_enable(true);
        })?;

        Ok(())
    }

    /// Read raw magnetometer counts
    ///
    /// If the AK8963 flags a magnetic overflow (ST2 bit 3) the sample is
    /// dropped and the previous one is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Magnetometer`] if the magnetometer was not initialized,
    /// or an error if communication fails.
    pub fn read_magnetometer_raw(&mut self) -> Result<MagData, Error<I::Error>> {
        if !self.mag_initialized {
            return Err(Error::Magnetometer);
        }

        let mut frame = [0u8; MAG_FRAME_LEN];
        self.device.interface.read_register(
            addr::EXT_SENS_DATA_00,
            8 * MAG_FRAME_LEN as u32,
            &mut frame,
        )?;

        let st2 = frame[7];
        if st2 & AK8963_ST2_HOFL != 0 {
            #[cfg(feature = "defmt")]
            defmt::warn!("AK8963 overflow, keeping previous sample");
            return Ok(self.last_mag);
        }

        // AK8963 data is little endian
        let sample = MagData {
            x: i16::from_le_bytes([frame[1], frame[2]]),
            y: i16::from_le_bytes([frame[3], frame[4]]),
            z: i16::from_le_bytes([frame[5], frame[6]]),
        };
        self.last_mag = sample;
        Ok(sample)
    }

    /// Read magnetometer data in milligauss
    ///
    /// Applies the factory sensitivity adjustment, then the hard-iron bias and
    /// soft-iron scale.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mag_data = imu.read_magnetometer()?;
    /// println!("X: {}mG, Y: {}mG, Z: {}mG", mag_data.x, mag_data.y, mag_data.z);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if not initialized or communication fails.
    pub fn read_magnetometer(&mut self) -> Result<MagDataMilliGauss, Error<I::Error>> {
        let raw = self.read_magnetometer_raw()?;
        Ok(self.mag_calibration.apply(
            raw.x,
            raw.y,
            raw.z,
            self.mag_config.resolution.resolution(),
            &self.mag_sensitivity,
        ))
    }

    /// Check if magnetometer data is ready (ST1 bit 0)
    ///
    /// # Errors
    ///
    /// Returns an error if communication fails.
    pub fn magnetometer_data_ready(&mut self) -> Result<bool, Error<I::Error>> {
        if !self.mag_initialized {
            return Ok(false);
        }

        let mut st1 = [0u8; 1];
        self.device
            .interface
            .read_register(addr::EXT_SENS_DATA_00, 8, &mut st1)?;

        Ok((st1[0] & 0x01) != 0)
    }

    /// Hard-iron and soft-iron calibration
    ///
    /// Wave the device through all orientations while this runs. The sweep
    /// length follows the magnetometer mode: 128 samples 135 ms apart at 8 Hz,
    /// 1500 samples 12 ms apart at 100 Hz (about 17 and 18 seconds).
    ///
    /// The result is stored and applied to all later readings.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if the magnetometer is not in a continuous mode
    /// - [`Error::Magnetometer`] if the magnetometer was not initialized
    /// - [`Error::Bus`] if communication fails
    pub fn calibrate_magnetometer<D>(
        &mut self,
        delay: &mut D,
    ) -> Result<MagCalibration, Error<I::Error>>
    where
        D: DelayNs,
    {
        let schedule = self
            .mag_config
            .mode
            .calibration_schedule()
            .ok_or(Error::InvalidConfig)?;

        let mut sweep = MagSweep::new();
        for _ in 0..schedule.samples {
            let sample = self.read_magnetometer_raw()?;
            sweep.update([sample.x, sample.y, sample.z]);
            delay.delay_ms(schedule.delay_ms);
        }

        let calibration =
            sweep.calibration(self.mag_config.resolution.resolution(), &self.mag_sensitivity);

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Mag calibration: bias=({}, {}, {}) mG, scale=({}, {}, {})",
            calibration.bias_x,
            calibration.bias_y,
            calibration.bias_z,
            calibration.scale_x,
            calibration.scale_y,
            calibration.scale_z
        );

        self.mag_calibration = calibration;
        Ok(calibration)
    }

    /// Set magnetometer calibration data
    ///
    /// The calibration will be automatically applied to all subsequent readings.
    pub const fn set_magnetometer_calibration(&mut self, calibration: MagCalibration) {
        self.mag_calibration = calibration;
    }

    /// Get current magnetometer calibration data
    #[must_use]
    pub const fn magnetometer_calibration(&self) -> &MagCalibration {
        &self.mag_calibration
    }

    /// Factory sensitivity adjustment read by [`init_magnetometer`](Self::init_magnetometer)
    #[must_use]
    pub const fn magnetometer_sensitivity_adjustment(&self) -> &MagSensitivity {
        &self.mag_sensitivity
    }

    /// Helper to wait for I2C Slave 4 transaction to complete
    ///
    /// Polls `I2C_MST_STATUS` until the transaction completes or fails
    /// (NACK, lost arbitration, or 50 ms timeout).
    fn wait_for_i2c_slv4_done<D>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        const MAX_I2C_SLV4_RETRIES: u32 = 50;

        let mut retries = 0;
        loop {
            let status = self.device.i_2_c_mst_status().read()?;

            if status.slave_4_nack() || status.lost_arb() {
                #[cfg(feature = "defmt")]
                defmt::warn!("Slave 4 transaction failed: nack={}", status.slave_4_nack());
                return Err(Error::Magnetometer);
            }

            if status.slave_4_done() {
                return Ok(());
            }
            if retries >= MAX_I2C_SLV4_RETRIES {
                return Err(Error::Magnetometer);
            }
            delay.delay_ms(1);
            retries += 1;
        }
    }

    /// Write an AK8963 register through Slave 4
    fn write_mag_register<D>(
        &mut self,
        reg: u8,
        value: u8,
        delay: &mut D,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        // Clear any previous status
        let _ = self.device.i_2_c_mst_status().read()?;

        self.device.i_2_c_slv_4_addr().write(|w| {
            w.set_slave_address(AK8963_I2C_ADDRESS);
            w.set_rnw(false);
        })?;

        self.device
            .i_2_c_slv_4_reg()
            .write(|w| w.set_slave_register(reg))?;

        self.device
            .i_2_c_slv_4_do()
            .write(|w| w.set_data_out(value))?;

        self.device.i_2_c_slv_4_ctrl().write(|w| {
            w.set_enable(true);
        })?;

        self.wait_for_i2c_slv4_done(delay)
    }

    /// Read an AK8963 register through Slave 4
    fn read_mag_register<D>(&mut self, reg: u8, delay: &mut D) -> Result<u8, Error<I::Error>>
    where
        D: DelayNs,
    {
        let _ = self.device.i_2_c_mst_status().read()?;

        self.device.i_2_c_slv_4_addr().write(|w| {
            w.set_slave_address(AK8963_I2C_ADDRESS);
            w.set_rnw(true);
        })?;

        self.device
            .i_2_c_slv_4_reg()
            .write(|w| w.set_slave_register(reg))?;

        self.device.i_2_c_slv_4_ctrl().write(|w| {
            w.set_enable(true);
        })?;

        self.wait_for_i2c_slv4_done(delay)?;

        Ok(self.device.i_2_c_slv_4_di().read()?.data_in())
    }

    // ==================== INTERRUPTS ====================

    /// Configure interrupt pin electrical properties
    ///
    /// The auxiliary bus bypass bit is always cleared.
    ///
    /// # Errors
    /// Returns an error if communication with the device fails.
    pub fn configure_interrupt_pin(
        &mut self,
        config: &InterruptPinConfig,
    ) -> Result<(), Error<I::Error>> {
        self.device.int_pin_cfg().write(|w| {
            w.set_actl(config.active_low);
            w.set_open(config.open_drain);
            w.set_latch_int_en(config.latch_enabled);
            w.set_int_anyrd_clear(config.clear_on_any_read);
        })?;

        Ok(())
    }

    /// Configure interrupt sources
    ///
    /// # Errors
    /// Returns an error if communication with the device fails.
    pub fn configure_interrupts(&mut self, config: &InterruptConfig) -> Result<(), Error<I::Error>> {
        self.device.int_enable().write(|w| {
            w.set_raw_rdy_en(config.raw_data_ready);
            w.set_fifo_overflow_en(config.fifo_overflow);
            w.set_fsync_int_en(config.fsync);
            w.set_wom_en(config.wake_on_motion);
        })?;

        Ok(())
    }

    /// Read interrupt status
    ///
    /// # Errors
    /// Returns an error if communication with the device fails.
    pub fn read_interrupt_status(&mut self) -> Result<InterruptStatus, Error<I::Error>> {
        let status = self.device.int_status().read()?;

        Ok(InterruptStatus {
            raw_data_ready: status.raw_data_rdy_int(),
            fifo_overflow: status.fifo_overflow_int(),
            fsync: status.fsync_int(),
            wake_on_motion: status.wom_int(),
        })
    }

    // ==================== POWER MANAGEMENT ====================

    /// Put the accelerometer into low-power cycling with wake-on-motion
    ///
    /// Sets the accelerometer filter to 184 Hz, enables the data-ready and
    /// wake-on-motion interrupts, programs threshold and wake-up rate, starts
    /// accelerometer cycling and puts gyro and magnetometer to sleep.
    ///
    /// # Errors
    /// Returns an error if communication with the device or the magnetometer fails.
    pub fn enable_wake_on_motion<D>(
        &mut self,
        delay: &mut D,
        config: &WakeOnMotionConfig,
    ) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        self.device.accel_config_2().modify(|w| {
            w.set_accel_fchoice_b(false);
            w.set_a_dlpfcfg(1);
        })?;

        self.configure_interrupt_pin(&InterruptPinConfig::clear_on_read())?;
        self.configure_interrupts(&InterruptConfig::wake_on_motion())?;

        self.device.mot_detect_ctrl().write(|w| {
            w.set_accel_intel_en(true);
            w.set_accel_intel_mode(true);
        })?;
        self.device.wom_thr().write(|w| {
            w.set_wom_threshold(config.threshold_register_value());
        })?;
        self.device.lp_accel_odr().write(|w| {
            w.set_lposc_clksel(config.rate.odr_value());
        })?;

        self.device.pwr_mgmt_1().modify(|w| {
            w.set_cycle(true);
        })?;

        self.gyro_mag_sleep(delay)?;
        delay.delay_ms(100);
        Ok(())
    }

    /// Whether motion woke the device (`INT_STATUS` bit 6)
    ///
    /// # Errors
    /// Returns an error if communication with the device fails.
    pub fn wake_on_motion_detected(&mut self) -> Result<bool, Error<I::Error>> {
        Ok(self.device.int_status().read()?.wom_int())
    }

    /// Power down the magnetometer and put the gyro into standby
    ///
    /// # Errors
    /// Returns an error if communication with the device or the magnetometer fails.
    pub fn gyro_mag_sleep<D>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        let cntl1 = self.read_mag_register(AK8963_REG_CNTL1, delay)?;
        self.write_mag_register(AK8963_REG_CNTL1, cntl1 & !0x0F, delay)?;

        self.device.pwr_mgmt_1().modify(|w| {
            w.set_gyro_standby(true);
        })?;
        delay.delay_ms(10);
        Ok(())
    }

    /// Restore the magnetometer mode and return gyro and accel to normal mode
    ///
    /// # Errors
    /// Returns an error if communication with the device or the magnetometer fails.
    pub fn gyro_mag_wake<D>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>>
    where
        D: DelayNs,
    {
        let cntl1 = self.read_mag_register(AK8963_REG_CNTL1, delay)?;
        self.write_mag_register(AK8963_REG_CNTL1, cntl1 | self.mag_config.mode as u8, delay)?;

        self.device.pwr_mgmt_1().write(|w| {
            w.set_clksel(ClockSource::AutoSelect as u8);
        })?;
        delay.delay_ms(10);
        Ok(())
    }

    /// Set sleep mode
    ///
    /// # Errors
    ///
    /// Returns an error if communication with the device fails.
    pub fn set_sleep(&mut self, enable: bool) -> Result<(), Error<I::Error>> {
        self.device.pwr_mgmt_1().modify(|w| {
            w.set_sleep(enable);
        })?;
        Ok(())
    }

    /// Select the clock source
    ///
    /// # Errors
    /// Returns an error if communication with the device fails.
    pub fn set_clock_source(&mut self, source: ClockSource) -> Result<(), Error<I::Error>> {
        self.device.pwr_mgmt_1().write(|w| {
            w.set_clksel(source as u8);
        })?;
        Ok(())
    }

    /// Enable or disable individual sensor axes
    ///
    /// # Errors
    /// Returns an error if communication with the device fails.
    pub fn configure_sensor_power(
        &mut self,
        config: &SensorPowerConfig,
    ) -> Result<(), Error<I::Error>> {
        self.device.pwr_mgmt_2().write(|w| {
            w.set_disable_xa(config.disable_accel_x);
            w.set_disable_ya(config.disable_accel_y);
            w.set_disable_za(config.disable_accel_z);
            w.set_disable_xg(config.disable_gyro_x);
            w.set_disable_yg(config.disable_gyro_y);
            w.set_disable_zg(config.disable_gyro_z);
        })?;
        Ok(())
    }

    /// Consume the driver and return the underlying interface
    pub fn release(self) -> I {
        self.device.interface
    }

    /// Get a reference to the underlying register device (for advanced usage)
    pub const fn device(&self) -> &RegisterDevice<I> {
        &self.device
    }

    /// Get a mutable reference to the underlying register device (for advanced usage)
    pub const fn device_mut(&mut self) -> &mut RegisterDevice<I> {
        &mut self.device
    }
}
