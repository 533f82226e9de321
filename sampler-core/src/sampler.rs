//! Acquisition state machine bridging the conversion peripheral to the slot.
//!
//! A [`Sampler`] owns one conversion peripheral and one channel binding at a
//! time, and walks `Unconfigured → Configured → Running`. The trigger path
//! ([`Sampler::service`]) and the completion hook
//! ([`Sampler::complete_conversion`]) are the only writers of the shared
//! [`SampleSlot`]; everything else is normal-context configuration.

use core::convert::Infallible;
use core::fmt;

use heapless::Deque;

use crate::inputs::{LogicalPin, PinBinding, PinResolver, Resolution};
use crate::slot::SampleSlot;
use crate::trigger::TriggerConfig;

/// Lifecycle of a sampling channel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SamplerState {
    Unconfigured,
    Configured,
    Running,
}

impl SamplerState {
    /// Returns `true` once `setup` has bound a channel.
    pub const fn is_configured(self) -> bool {
        !matches!(self, SamplerState::Unconfigured)
    }

    /// Returns `true` while the trigger is armed.
    pub const fn is_running(self) -> bool {
        matches!(self, SamplerState::Running)
    }
}

/// Abstraction over the hardware conversion peripheral behind one input pin.
pub trait ConversionPeripheral {
    type Error;

    /// Applies the channel and resolution selected by `setup`.
    fn configure(&mut self, binding: &PinBinding) -> Result<(), Self::Error>;

    /// Enables the conversion-start path.
    fn enable(&mut self);

    /// Disables the conversion-start path.
    fn disable(&mut self);

    /// Runs one conversion to completion.
    ///
    /// Returns `None` when the peripheral is busy or not ready; the trigger
    /// simply tries again on its next firing.
    fn convert(&mut self) -> Option<u16>;
}

/// Configuration failure reported by [`Sampler::setup`].
///
/// All variants signal a wiring or programming mistake caught at startup;
/// none of them is a runtime condition to retry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConfigError<E> {
    /// The trigger is still armed; stop it before rebinding the channel.
    Busy,
    /// The pin has no conversion channel on this board.
    UnmappedPin(LogicalPin),
    /// The peripheral cannot convert at the requested bit width.
    UnsupportedResolution(u8),
    /// The peripheral rejected the configuration.
    Peripheral(E),
}

impl<E: fmt::Debug> fmt::Display for ConfigError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Failure reported when arming or disarming the trigger.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TriggerError {
    /// `setup` has not completed successfully.
    NotConfigured,
}

impl fmt::Display for TriggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Outcome of one completed conversion.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CapturedSample {
    /// The published value, masked to the bound resolution width.
    pub value: u16,
    /// `true` when the previous sample was still unconsumed.
    pub replaced_fresh: bool,
}

/// Single-channel acquisition driver.
///
/// Owns the peripheral and the channel binding; shares the [`SampleSlot`] by
/// reference with normal-context readers. One instance exists per configured
/// channel, and re-running [`setup`] rebinds it wholesale.
///
/// [`setup`]: Sampler::setup
pub struct Sampler<'s, P: ConversionPeripheral> {
    peripheral: P,
    slot: &'s SampleSlot,
    trigger: TriggerConfig,
    binding: Option<PinBinding>,
    state: SamplerState,
}

impl<'s, P: ConversionPeripheral> Sampler<'s, P> {
    /// Creates an unconfigured sampler around a peripheral and its slot.
    pub fn new(peripheral: P, slot: &'s SampleSlot, trigger: TriggerConfig) -> Self {
        Self {
            peripheral,
            slot,
            trigger,
            binding: None,
            state: SamplerState::Unconfigured,
        }
    }

    /// Binds a logical pin at the requested resolution.
    ///
    /// Resolves the pin to its conversion channel, configures the peripheral,
    /// and resets the slot to (0, not-fresh). Fails without touching the
    /// current binding when the pin is unrouted, the width unsupported, the
    /// peripheral refuses the configuration, or conversions are still running.
    pub fn setup<R: PinResolver>(
        &mut self,
        resolver: &R,
        pin: LogicalPin,
        resolution_bits: u8,
    ) -> Result<(), ConfigError<P::Error>> {
        if self.state.is_running() {
            return Err(ConfigError::Busy);
        }

        let resolution = Resolution::from_bits(resolution_bits)
            .ok_or(ConfigError::UnsupportedResolution(resolution_bits))?;
        let input = resolver.resolve(pin).ok_or(ConfigError::UnmappedPin(pin))?;
        let binding = PinBinding::new(input, resolution);

        self.peripheral
            .configure(&binding)
            .map_err(ConfigError::Peripheral)?;
        self.slot.reset();

        self.binding = Some(binding);
        self.state = SamplerState::Configured;
        Ok(())
    }

    /// Arms the trigger and enables the conversion-start path.
    ///
    /// Conversions begin only through this call; starting an already-running
    /// sampler is a no-op.
    pub fn start(&mut self) -> Result<(), TriggerError> {
        match self.state {
            SamplerState::Unconfigured => Err(TriggerError::NotConfigured),
            SamplerState::Configured => {
                self.peripheral.enable();
                self.state = SamplerState::Running;
                Ok(())
            }
            SamplerState::Running => Ok(()),
        }
    }

    /// Disarms the trigger and disables the conversion-start path.
    ///
    /// The binding and the last published sample survive; stopping an
    /// already-stopped sampler is a no-op.
    pub fn stop(&mut self) -> Result<(), TriggerError> {
        match self.state {
            SamplerState::Unconfigured => Err(TriggerError::NotConfigured),
            SamplerState::Configured => Ok(()),
            SamplerState::Running => {
                self.peripheral.disable();
                self.state = SamplerState::Configured;
                Ok(())
            }
        }
    }

    /// Services one trigger firing.
    ///
    /// When running, performs one conversion and publishes the result through
    /// [`complete_conversion`]. A not-ready peripheral publishes nothing and
    /// the slot stays stale until the next firing.
    ///
    /// [`complete_conversion`]: Sampler::complete_conversion
    pub fn service(&mut self) -> Option<CapturedSample> {
        if !self.state.is_running() {
            return None;
        }
        let raw = self.peripheral.convert()?;
        Some(self.complete_conversion(raw))
    }

    /// Conversion-complete hook, invoked once per finished conversion.
    ///
    /// Masks the raw reading to the bound resolution width and publishes it
    /// with a single atomic store. No locking, no allocation, bounded time;
    /// safe to call from interrupt context.
    pub fn complete_conversion(&self, raw: u16) -> CapturedSample {
        let value = match self.binding {
            Some(binding) => raw & binding.resolution.max_value(),
            None => raw,
        };
        let replaced_fresh = self.slot.publish(value);
        CapturedSample {
            value,
            replaced_fresh,
        }
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// Returns the active channel binding, if `setup` has run.
    pub fn binding(&self) -> Option<&PinBinding> {
        self.binding.as_ref()
    }

    /// Returns the trigger cadence.
    pub fn trigger(&self) -> TriggerConfig {
        self.trigger
    }

    /// Returns the shared slot handle for normal-context readers.
    pub fn slot(&self) -> &'s SampleSlot {
        self.slot
    }

    /// Returns an immutable handle to the wrapped peripheral.
    pub fn peripheral(&self) -> &P {
        &self.peripheral
    }

    /// Returns a mutable handle to the wrapped peripheral.
    pub fn peripheral_mut(&mut self) -> &mut P {
        &mut self.peripheral
    }
}

/// Conversion peripheral that replays queued readings.
///
/// Stands in for the hardware in host tests and the emulator: each queued
/// value is one simulated completion event, and an empty queue models a
/// peripheral that missed its trigger.
#[derive(Debug)]
pub struct ScriptedPeripheral<const N: usize = 8> {
    queued: Deque<u16, N>,
    binding: Option<PinBinding>,
    enabled: bool,
    conversions: u32,
}

impl<const N: usize> ScriptedPeripheral<N> {
    /// Creates a peripheral with an empty script.
    pub const fn new() -> Self {
        Self {
            queued: Deque::new(),
            binding: None,
            enabled: false,
            conversions: 0,
        }
    }

    /// Queues the next conversion result, returning it back when the script is full.
    pub fn queue_sample(&mut self, raw: u16) -> Result<(), u16> {
        self.queued.push_back(raw)
    }

    /// Returns the configuration last applied, if any.
    pub fn binding(&self) -> Option<&PinBinding> {
        self.binding.as_ref()
    }

    /// Returns `true` while the conversion-start path is enabled.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the number of completed conversions.
    pub const fn conversions(&self) -> u32 {
        self.conversions
    }
}

impl<const N: usize> Default for ScriptedPeripheral<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ConversionPeripheral for ScriptedPeripheral<N> {
    type Error = Infallible;

    fn configure(&mut self, binding: &PinBinding) -> Result<(), Self::Error> {
        self.binding = Some(*binding);
        Ok(())
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn convert(&mut self) -> Option<u16> {
        if !self.enabled {
            return None;
        }
        let raw = self.queued.pop_front()?;
        self.conversions += 1;
        Some(raw)
    }
}
