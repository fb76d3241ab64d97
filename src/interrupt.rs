//! Interrupt configuration and management
//!
//! The MPU9250 has a single interrupt pin (INT) that can be configured to trigger on:
//! - Raw data ready
//! - FIFO overflow
//! - FSYNC
//! - Wake-on-motion (`WoM`)
//!
//! The host interrupt handler and the main loop communicate through a
//! [`DataReadyFlag`].
//!
//! # Example
//!
//! ```ignore
//! # use mpu9250::{Mpu9250Driver, interrupt::{InterruptConfig, InterruptPinConfig}};
//! # let mut imu: Mpu9250Driver<_> = todo!();
//! // Active high push-pull pulse, cleared by any register read
//! imu.configure_interrupt_pin(&InterruptPinConfig::clear_on_read())?;
//!
//! // Enable data ready interrupt
//! let int_config = InterruptConfig {
//!     raw_data_ready: true,
//!     ..Default::default()
//! };
//! imu.configure_interrupts(&int_config)?;
//! # Ok::<(), mpu9250::Error<()>>(())
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

/// Interrupt pin electrical configuration (`INT_PIN_CFG`)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(clippy::struct_excessive_bools)]
pub struct InterruptPinConfig {
    /// Active low (true) or active high (false)
    pub active_low: bool,
    /// Open-drain (true) or push-pull (false)
    pub open_drain: bool,
    /// Latch interrupt until cleared
    pub latch_enabled: bool,
    /// Clear interrupt status on any register read (true) or only on status read (false)
    pub clear_on_any_read: bool,
}

impl InterruptPinConfig {
    /// Active high push-pull pulse, status cleared by any read
    ///
    /// This is the pin setup used by [`Mpu9250Driver::configure`](crate::Mpu9250Driver::configure).
    #[must_use]
    pub const fn clear_on_read() -> Self {
        Self {
            active_low: false,
            open_drain: false,
            latch_enabled: false,
            clear_on_any_read: true,
        }
    }

    /// Active-low, open-drain, latched until the status register is read
    #[must_use]
    pub const fn open_drain_latched() -> Self {
        Self {
            active_low: true,
            open_drain: true,
            latch_enabled: true,
            clear_on_any_read: false,
        }
    }
}

/// Interrupt source configuration (`INT_ENABLE`)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptConfig {
    /// Enable raw data ready interrupt (fires when new sensor data is available)
    pub raw_data_ready: bool,
    /// Enable FIFO overflow interrupt
    pub fifo_overflow: bool,
    /// Enable FSYNC interrupt
    pub fsync: bool,
    /// Enable wake-on-motion interrupt
    pub wake_on_motion: bool,
}

impl InterruptConfig {
    /// Create configuration with only data ready interrupt enabled
    #[must_use]
    pub const fn data_ready_only() -> Self {
        Self {
            raw_data_ready: true,
            fifo_overflow: false,
            fsync: false,
            wake_on_motion: false,
        }
    }

    /// Data ready and wake-on-motion, as used in wake-on-motion mode
    #[must_use]
    pub const fn wake_on_motion() -> Self {
        Self {
            raw_data_ready: true,
            fifo_overflow: false,
            fsync: false,
            wake_on_motion: true,
        }
    }

    /// Check if any interrupt is enabled
    #[must_use]
    pub const fn any_enabled(&self) -> bool {
        self.raw_data_ready || self.fifo_overflow || self.fsync || self.wake_on_motion
    }
}

/// Interrupt status flags (`INT_STATUS`)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptStatus {
    /// Raw data ready interrupt flag
    pub raw_data_ready: bool,
    /// FIFO overflow interrupt flag
    pub fifo_overflow: bool,
    /// FSYNC interrupt flag
    pub fsync: bool,
    /// Wake-on-motion interrupt flag
    pub wake_on_motion: bool,
}

impl InterruptStatus {
    /// Decode a raw `INT_STATUS` value
    #[must_use]
    pub const fn from_raw(value: u8) -> Self {
        Self {
            raw_data_ready: value & 0x01 != 0,
            fsync: value & 0x08 != 0,
            fifo_overflow: value & 0x10 != 0,
            wake_on_motion: value & 0x40 != 0,
        }
    }

    /// Check if any interrupt flag is set
    #[must_use]
    pub const fn any_set(&self) -> bool {
        self.raw_data_ready || self.fifo_overflow || self.fsync || self.wake_on_motion
    }

    /// Convert interrupt status to raw register value
    #[must_use]
    pub const fn to_raw(&self) -> u8 {
        let mut value = 0u8;
        if self.raw_data_ready {
            value |= 0x01;
        }
        if self.fsync {
            value |= 0x08;
        }
        if self.fifo_overflow {
            value |= 0x10;
        }
        if self.wake_on_motion {
            value |= 0x40;
        }
        value
    }
}

/// Data-ready signal between an interrupt handler and the main loop
///
/// The handler calls [`set`](Self::set); the polling side calls
/// [`take`](Self::take), which reports and clears the flag. One writer and one
/// reader; a second interrupt before `take` is merged into the first.
///
/// ```ignore
/// static IMU_READY: DataReadyFlag = DataReadyFlag::new();
///
/// #[interrupt]
/// fn EXTI0() {
///     IMU_READY.set();
/// }
///
/// loop {
///     if IMU_READY.take() {
///         let accel = imu.read_accelerometer()?;
///     }
/// }
/// ```
#[derive(Debug)]
pub struct DataReadyFlag {
    ready: AtomicBool,
}

impl DataReadyFlag {
    /// Create a cleared flag, usable in a `static`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
        }
    }

    /// Mark new data as available
    pub fn set(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Check the flag without consuming it
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Return whether the flag was set and clear it
    ///
    /// Uses a load followed by a store, so it also works on cores without
    /// atomic read-modify-write (Cortex-M0). A `set` that lands between the
    /// load and the store is dropped.
    pub fn take(&self) -> bool {
        let ready = self.ready.load(Ordering::Acquire);
        if ready {
            self.ready.store(false, Ordering::Release);
        }
        ready
    }
}

impl Default for DataReadyFlag {
    fn default() -> Self {
        Self::new()
    }
}
