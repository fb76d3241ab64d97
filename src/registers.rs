//! Register definitions for the MPU9250
//!
//! The MPU9250 has a single flat register space (0x00-0x7E). Multi-byte sensor
//! outputs (`ACCEL_XOUT_H`, `GYRO_XOUT_H`, `TEMP_OUT_H`, `EXT_SENS_DATA_00`,
//! `FIFO_R_W`) are read as bursts through the interface and are listed in
//! [`addr`] rather than as typed registers.
//!
//! The AK8963 magnetometer lives behind the auxiliary I2C master and has its
//! own address space, see [`crate::sensors::magnetometer`].

device_driver::create_device!(
    device_name: Mpu9250,
    dsl: {
        config {
            type RegisterAddressType = u8;
            type DefaultByteOrder = BE;
        }

        // ==================== SELF-TEST AND OFFSETS ====================

        /// SELF_TEST_X_GYRO (0x00) - factory gyro self-test code, X axis
        register SelfTestXGyro {
            const ADDRESS = 0x00;
            const SIZE_BITS = 8;

            /// Factory trim code
            code: uint = 0..8,
        },

        /// SELF_TEST_Y_GYRO (0x01) - factory gyro self-test code, Y axis
        register SelfTestYGyro {
            const ADDRESS = 0x01;
            const SIZE_BITS = 8;

            /// Factory trim code
            code: uint = 0..8,
        },

        /// SELF_TEST_Z_GYRO (0x02) - factory gyro self-test code, Z axis
        register SelfTestZGyro {
            const ADDRESS = 0x02;
            const SIZE_BITS = 8;

            /// Factory trim code
            code: uint = 0..8,
        },

        /// SELF_TEST_X_ACCEL (0x0D) - factory accel self-test code, X axis
        register SelfTestXAccel {
            const ADDRESS = 0x0D;
            const SIZE_BITS = 8;

            /// Factory trim code
            code: uint = 0..8,
        },

        /// SELF_TEST_Y_ACCEL (0x0E) - factory accel self-test code, Y axis
        register SelfTestYAccel {
            const ADDRESS = 0x0E;
            const SIZE_BITS = 8;

            /// Factory trim code
            code: uint = 0..8,
        },

        /// SELF_TEST_Z_ACCEL (0x0F) - factory accel self-test code, Z axis
        register SelfTestZAccel {
            const ADDRESS = 0x0F;
            const SIZE_BITS = 8;

            /// Factory trim code
            code: uint = 0..8,
        },

        /// XG_OFFSET_H/L (0x13-0x14) - gyro X offset, 32.8 LSB/dps, subtracted in hardware
        register XgOffset {
            const ADDRESS = 0x13;
            const SIZE_BITS = 16;

            /// Two's complement offset
            offset: uint = 0..16,
        },

        /// YG_OFFSET_H/L (0x15-0x16) - gyro Y offset
        register YgOffset {
            const ADDRESS = 0x15;
            const SIZE_BITS = 16;

            /// Two's complement offset
            offset: uint = 0..16,
        },

        /// ZG_OFFSET_H/L (0x17-0x18) - gyro Z offset
        register ZgOffset {
            const ADDRESS = 0x17;
            const SIZE_BITS = 16;

            /// Two's complement offset
            offset: uint = 0..16,
        },

        // ==================== CONFIGURATION ====================

        /// SMPLRT_DIV (0x19) - Sample rate = internal rate / (1 + div)
        register SmplrtDiv {
            const ADDRESS = 0x19;
            const SIZE_BITS = 8;

            /// Sample rate divider
            smplrt_div: uint = 0..8,
        },

        /// CONFIG (0x1A) - FSYNC, FIFO mode and gyro/temperature DLPF
        register Configuration {
            const ADDRESS = 0x1A;
            const SIZE_BITS = 8;

            /// Gyro and temperature DLPF configuration
            dlpf_cfg: uint = 0..3,
            /// FSYNC pin sampling
            ext_sync_set: uint = 3..6,
            /// Stop writing when the FIFO is full instead of overwriting
            fifo_mode: bool = 6,
            reserved_7: uint = 7..8,
        },

        /// GYRO_CONFIG (0x1B)
        register GyroConfig {
            const ADDRESS = 0x1B;
            const SIZE_BITS = 8;

            /// Inverted FCHOICE, bypasses the DLPF when non-zero
            fchoice_b: uint = 0..2,
            reserved_2: uint = 2..3,
            /// Gyro full scale select (±250, ±500, ±1000, ±2000 dps)
            gyro_fs_sel: uint = 3..5,
            /// Z-axis self-test enable
            zgyro_cten: bool = 5,
            /// Y-axis self-test enable
            ygyro_cten: bool = 6,
            /// X-axis self-test enable
            xgyro_cten: bool = 7,
        },

        /// ACCEL_CONFIG (0x1C)
        register AccelConfig {
            const ADDRESS = 0x1C;
            const SIZE_BITS = 8;

            reserved_2_0: uint = 0..3,
            /// Accelerometer full scale select (±2g, ±4g, ±8g, ±16g)
            accel_fs_sel: uint = 3..5,
            /// Z-axis self-test enable
            az_st_en: bool = 5,
            /// Y-axis self-test enable
            ay_st_en: bool = 6,
            /// X-axis self-test enable
            ax_st_en: bool = 7,
        },

        /// ACCEL_CONFIG_2 (0x1D)
        register AccelConfig2 {
            const ADDRESS = 0x1D;
            const SIZE_BITS = 8;

            /// Accelerometer DLPF configuration
            a_dlpfcfg: uint = 0..3,
            /// Inverted FCHOICE, bypasses the DLPF when set
            accel_fchoice_b: bool = 3,
            reserved_7_4: uint = 4..8,
        },

        /// LP_ACCEL_ODR (0x1E) - Low power accelerometer output data rate
        register LpAccelOdr {
            const ADDRESS = 0x1E;
            const SIZE_BITS = 8;

            /// Wake-up frequency in low power mode
            lposc_clksel: uint = 0..4,
            reserved_7_4: uint = 4..8,
        },

        /// WOM_THR (0x1F) - Wake-on-motion threshold, 4 mg/LSB
        register WomThr {
            const ADDRESS = 0x1F;
            const SIZE_BITS = 8;

            /// Threshold
            wom_threshold: uint = 0..8,
        },

        /// FIFO_EN (0x23) - Sensors written to the FIFO
        register FifoEn {
            const ADDRESS = 0x23;
            const SIZE_BITS = 8;

            /// External sensor data of slave 0
            slave_0: bool = 0,
            /// External sensor data of slave 1
            slave_1: bool = 1,
            /// External sensor data of slave 2
            slave_2: bool = 2,
            /// Accelerometer X, Y, Z
            accel: bool = 3,
            /// Gyro Z
            gyro_zout: bool = 4,
            /// Gyro Y
            gyro_yout: bool = 5,
            /// Gyro X
            gyro_xout: bool = 6,
            /// Temperature
            temp_out: bool = 7,
        },

        // ==================== AUXILIARY I2C MASTER ====================

        /// I2C_MST_CTRL (0x24)
        register I2cMstCtrl {
            const ADDRESS = 0x24;
            const SIZE_BITS = 8;

            /// Master clock divider (13 = 400 kHz)
            i2c_mst_clk: uint = 0..4,
            /// Stop between reads instead of restart
            i2c_mst_p_nsr: bool = 4,
            /// Slave 3 data to FIFO
            slv_3_fifo_en: bool = 5,
            /// Delay data ready until external sensor data is loaded
            wait_for_es: bool = 6,
            /// Multi-master enable
            mult_mst_en: bool = 7,
        },

        /// I2C_SLV0_ADDR (0x25)
        register I2cSlv0Addr {
            const ADDRESS = 0x25;
            const SIZE_BITS = 8;

            /// Physical address of slave 0
            slave_address: uint = 0..7,
            /// Transfer is a read
            rnw: bool = 7,
        },

        /// I2C_SLV0_REG (0x26)
        register I2cSlv0Reg {
            const ADDRESS = 0x26;
            const SIZE_BITS = 8;

            /// Slave register where the transfer starts
            slave_register: uint = 0..8,
        },

        /// I2C_SLV0_CTRL (0x27)
        register I2cSlv0Ctrl {
            const ADDRESS = 0x27;
            const SIZE_BITS = 8;

            /// Number of bytes to read
            length: uint = 0..4,
            /// Word grouping
            grp: bool = 4,
            /// Transfer data only, no register address
            reg_dis: bool = 5,
            /// Byte swap words
            byte_sw: bool = 6,
            /// Enable slave 0
            enable: bool = 7,
        },

        /// I2C_SLV4_ADDR (0x31)
        register I2cSlv4Addr {
            const ADDRESS = 0x31;
            const SIZE_BITS = 8;

            /// Physical address of slave 4
            slave_address: uint = 0..7,
            /// Transfer is a read
            rnw: bool = 7,
        },

        /// I2C_SLV4_REG (0x32)
        register I2cSlv4Reg {
            const ADDRESS = 0x32;
            const SIZE_BITS = 8;

            /// Slave register to access
            slave_register: uint = 0..8,
        },

        /// I2C_SLV4_DO (0x33)
        register I2cSlv4Do {
            const ADDRESS = 0x33;
            const SIZE_BITS = 8;

            /// Byte written to slave 4
            data_out: uint = 0..8,
        },

        /// I2C_SLV4_CTRL (0x34)
        register I2cSlv4Ctrl {
            const ADDRESS = 0x34;
            const SIZE_BITS = 8;

            /// Sample-rate decimation for delayed slaves
            i2c_mst_dly: uint = 0..5,
            /// Transfer data only, no register address
            reg_dis: bool = 5,
            /// Interrupt on transfer completion
            int_en: bool = 6,
            /// Start the slave 4 transfer
            enable: bool = 7,
        },

        /// I2C_SLV4_DI (0x35)
        register I2cSlv4Di {
            const ADDRESS = 0x35;
            const SIZE_BITS = 8;

            /// Byte read from slave 4
            data_in: uint = 0..8,
        },

        /// I2C_MST_STATUS (0x36)
        register I2cMstStatus {
            const ADDRESS = 0x36;
            const SIZE_BITS = 8;

            /// Slave 0 NACK
            slave_0_nack: bool = 0,
            /// Slave 1 NACK
            slave_1_nack: bool = 1,
            /// Slave 2 NACK
            slave_2_nack: bool = 2,
            /// Slave 3 NACK
            slave_3_nack: bool = 3,
            /// Slave 4 NACK
            slave_4_nack: bool = 4,
            /// Lost arbitration
            lost_arb: bool = 5,
            /// Slave 4 transfer complete
            slave_4_done: bool = 6,
            /// FSYNC interrupt status
            pass_through: bool = 7,
        },

        // ==================== INTERRUPTS ====================

        /// INT_PIN_CFG (0x37)
        register IntPinCfg {
            const ADDRESS = 0x37;
            const SIZE_BITS = 8;

            reserved_0: uint = 0..1,
            /// Auxiliary I2C bus bypass
            bypass_en: bool = 1,
            /// FSYNC as interrupt input
            fsync_int_mode_en: bool = 2,
            /// FSYNC active low
            actl_fsync: bool = 3,
            /// Clear interrupt status on any read
            int_anyrd_clear: bool = 4,
            /// Hold INT level until cleared
            latch_int_en: bool = 5,
            /// Open drain
            open: bool = 6,
            /// Active low
            actl: bool = 7,
        },

        /// INT_ENABLE (0x38)
        register IntEnable {
            const ADDRESS = 0x38;
            const SIZE_BITS = 8;

            /// Raw sensor data ready
            raw_rdy_en: bool = 0,
            reserved_2_1: uint = 1..3,
            /// FSYNC interrupt
            fsync_int_en: bool = 3,
            /// FIFO overflow
            fifo_overflow_en: bool = 4,
            reserved_5: uint = 5..6,
            /// Wake on motion
            wom_en: bool = 6,
            reserved_7: uint = 7..8,
        },

        /// INT_STATUS (0x3A)
        register IntStatus {
            const ADDRESS = 0x3A;
            const SIZE_BITS = 8;

            /// Raw sensor data ready
            raw_data_rdy_int: bool = 0,
            reserved_2_1: uint = 1..3,
            /// FSYNC interrupt
            fsync_int: bool = 3,
            /// FIFO overflow
            fifo_overflow_int: bool = 4,
            reserved_5: uint = 5..6,
            /// Wake on motion
            wom_int: bool = 6,
            reserved_7: uint = 7..8,
        },

        /// I2C_SLV0_DO (0x63)
        register I2cSlv0Do {
            const ADDRESS = 0x63;
            const SIZE_BITS = 8;

            /// Byte written to slave 0
            data_out: uint = 0..8,
        },

        // ==================== CONTROL AND POWER ====================

        /// SIGNAL_PATH_RESET (0x68)
        register SignalPathReset {
            const ADDRESS = 0x68;
            const SIZE_BITS = 8;

            /// Reset temperature signal path
            temp_rst: bool = 0,
            /// Reset accelerometer signal path
            accel_rst: bool = 1,
            /// Reset gyro signal path
            gyro_rst: bool = 2,
            reserved_7_3: uint = 3..8,
        },

        /// MOT_DETECT_CTRL (0x69)
        register MotDetectCtrl {
            const ADDRESS = 0x69;
            const SIZE_BITS = 8;

            reserved_5_0: uint = 0..6,
            /// Compare current sample with previous sample
            accel_intel_mode: bool = 6,
            /// Enable wake-on-motion logic
            accel_intel_en: bool = 7,
        },

        /// USER_CTRL (0x6A)
        register UserCtrl {
            const ADDRESS = 0x6A;
            const SIZE_BITS = 8;

            /// Reset all signal paths and sensor registers
            sig_cond_rst: bool = 0,
            /// Reset the I2C master
            i2c_mst_rst: bool = 1,
            /// Reset the FIFO
            fifo_rst: bool = 2,
            /// Reset the DMP
            dmp_rst: bool = 3,
            /// Disable the I2C slave interface (SPI only)
            i2c_if_dis: bool = 4,
            /// Enable the auxiliary I2C master
            i2c_mst_en: bool = 5,
            /// Enable FIFO operation
            fifo_en: bool = 6,
            /// Enable the DMP
            dmp_en: bool = 7,
        },

        /// PWR_MGMT_1 (0x6B)
        register PwrMgmt1 {
            const ADDRESS = 0x6B;
            const SIZE_BITS = 8;

            /// Clock source (0 = 20 MHz internal, 1 = auto select PLL)
            clksel: uint = 0..3,
            /// Power down the PTAT voltage generator
            pd_ptat: bool = 3,
            /// Gyro drive and PLL on, sense paths off
            gyro_standby: bool = 4,
            /// Cycle between sleep and single samples
            cycle: bool = 5,
            /// Sleep mode
            sleep: bool = 6,
            /// Reset registers to default
            h_reset: bool = 7,
        },

        /// PWR_MGMT_2 (0x6C)
        register PwrMgmt2 {
            const ADDRESS = 0x6C;
            const SIZE_BITS = 8;

            /// Disable gyro Z
            disable_zg: bool = 0,
            /// Disable gyro Y
            disable_yg: bool = 1,
            /// Disable gyro X
            disable_xg: bool = 2,
            /// Disable accel Z
            disable_za: bool = 3,
            /// Disable accel Y
            disable_ya: bool = 4,
            /// Disable accel X
            disable_xa: bool = 5,
            reserved_7_6: uint = 6..8,
        },

        /// FIFO_COUNTH/L (0x72-0x73)
        register FifoCount {
            const ADDRESS = 0x72;
            const SIZE_BITS = 16;

            /// Number of bytes in the FIFO
            fifo_count: uint = 0..13,
            reserved_15_13: uint = 13..16,
        },

        /// WHO_AM_I (0x75) - Expected value: 0x71
        register WhoAmI {
            const ADDRESS = 0x75;
            const SIZE_BITS = 8;

            /// Device ID (should read 0x71)
            who_am_i: uint = 0..8,
        },

        /// XA_OFFSET_H/L (0x77-0x78) - accel X offset, 15 bit, bit 0 reserved
        register XaOffset {
            const ADDRESS = 0x77;
            const SIZE_BITS = 16;

            /// Offset with the temperature compensation bit in bit 0
            offset: uint = 0..16,
        },

        /// YA_OFFSET_H/L (0x7A-0x7B) - accel Y offset
        register YaOffset {
            const ADDRESS = 0x7A;
            const SIZE_BITS = 16;

            /// Offset with the temperature compensation bit in bit 0
            offset: uint = 0..16,
        },

        /// ZA_OFFSET_H/L (0x7D-0x7E) - accel Z offset
        register ZaOffset {
            const ADDRESS = 0x7D;
            const SIZE_BITS = 16;

            /// Offset with the temperature compensation bit in bit 0
            offset: uint = 0..16,
        }
    }
);

// Re-export commonly used types for convenience
pub use Mpu9250 as RegisterDevice;

/// Addresses of burst-accessed registers
pub mod addr {
    /// `SMPLRT_DIV`, first of the five sample-rate and range registers
    pub const SMPLRT_DIV: u8 = 0x19;
    /// First accelerometer output byte (6 bytes, big endian)
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    /// Temperature output (2 bytes, big endian)
    pub const TEMP_OUT_H: u8 = 0x41;
    /// First gyro output byte (6 bytes, big endian)
    pub const GYRO_XOUT_H: u8 = 0x43;
    /// Data fetched by the auxiliary I2C master
    pub const EXT_SENS_DATA_00: u8 = 0x49;
    /// FIFO read/write port
    pub const FIFO_R_W: u8 = 0x74;
}
