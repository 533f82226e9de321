#![cfg(target_os = "none")]

//! Embassy ADC binding for the acquisition core.
//!
//! Bridges the input catalog in `sampler_core::inputs` to the physical ADC1
//! peripheral. Every analog-capable pin is erased into a catalog-ordered
//! channel at startup; `setup` then claims the bound pin's channel and
//! applies the requested resolution to the converter.

use embassy_stm32::Peri;
use embassy_stm32::adc::{Adc, AdcChannel, AnyAdcChannel, Resolution as HalResolution, SampleTime};
use embassy_stm32::peripherals::{ADC1, PA0, PA1, PA2, PA3, PA4, PA5, PA6, PA7, PB0, PB1};
use sampler_core::inputs::{ALL_INPUTS, LogicalPin, PinBinding, Resolution};
use sampler_core::sampler::ConversionPeripheral;

/// Logical pin wired to the USB bus-voltage divider.
pub const VBUS_SENSE: LogicalPin = LogicalPin::new(0);

/// Sample time long enough for the meter's high-impedance dividers.
const SENSE_SAMPLE_TIME: SampleTime = SampleTime::CYCLES160_5;

/// Failure reported by the ADC binding.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AnalogError {
    /// The catalog pin's channel was already claimed.
    ChannelUnavailable,
}

/// Erased ADC channels for every pin in the input catalog.
pub struct AnalogBank {
    channels: [Option<AnyAdcChannel<ADC1>>; ALL_INPUTS.len()],
}

impl AnalogBank {
    /// Claims the board's analog pins in catalog order.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pa0: Peri<'static, PA0>,
        pa1: Peri<'static, PA1>,
        pa2: Peri<'static, PA2>,
        pa3: Peri<'static, PA3>,
        pa4: Peri<'static, PA4>,
        pa5: Peri<'static, PA5>,
        pa6: Peri<'static, PA6>,
        pa7: Peri<'static, PA7>,
        pb0: Peri<'static, PB0>,
        pb1: Peri<'static, PB1>,
    ) -> Self {
        Self {
            channels: [
                Some(pa0.degrade_adc()),
                Some(pa1.degrade_adc()),
                Some(pa2.degrade_adc()),
                Some(pa3.degrade_adc()),
                Some(pa4.degrade_adc()),
                Some(pa5.degrade_adc()),
                Some(pa6.degrade_adc()),
                Some(pa7.degrade_adc()),
                Some(pb0.degrade_adc()),
                Some(pb1.degrade_adc()),
            ],
        }
    }

    fn index_of(pin: LogicalPin) -> Option<usize> {
        ALL_INPUTS.iter().position(|input| input.pin == pin)
    }

    fn take(&mut self, pin: LogicalPin) -> Option<AnyAdcChannel<ADC1>> {
        Self::index_of(pin).and_then(|index| self.channels[index].take())
    }

    fn restore(&mut self, pin: LogicalPin, channel: AnyAdcChannel<ADC1>) {
        if let Some(index) = Self::index_of(pin) {
            self.channels[index] = Some(channel);
        }
    }
}

struct ActiveChannel {
    pin: LogicalPin,
    channel: AnyAdcChannel<ADC1>,
}

/// Conversion peripheral backed by the Embassy ADC driver.
pub struct AdcSampler {
    adc: Adc<'static, ADC1>,
    bank: AnalogBank,
    active: Option<ActiveChannel>,
}

impl AdcSampler {
    /// Wraps the converter and the pin bank.
    pub fn new(adc: Peri<'static, ADC1>, bank: AnalogBank) -> Self {
        let mut adc = Adc::new(adc);
        adc.set_sample_time(SENSE_SAMPLE_TIME);
        Self {
            adc,
            bank,
            active: None,
        }
    }
}

const fn hal_resolution(resolution: Resolution) -> HalResolution {
    match resolution {
        Resolution::Bits6 => HalResolution::BITS6,
        Resolution::Bits8 => HalResolution::BITS8,
        Resolution::Bits10 => HalResolution::BITS10,
        Resolution::Bits12 => HalResolution::BITS12,
    }
}

impl ConversionPeripheral for AdcSampler {
    type Error = AnalogError;

    fn configure(&mut self, binding: &PinBinding) -> Result<(), Self::Error> {
        if let Some(previous) = self.active.take() {
            self.bank.restore(previous.pin, previous.channel);
        }

        let channel = self
            .bank
            .take(binding.pin())
            .ok_or(AnalogError::ChannelUnavailable)?;
        self.adc.set_resolution(hal_resolution(binding.resolution));
        self.active = Some(ActiveChannel {
            pin: binding.pin(),
            channel,
        });
        Ok(())
    }

    fn enable(&mut self) {
        // The Embassy driver powers the converter at construction and arms
        // each conversion as it is issued; start/stop gating is the sampling
        // task's ticker.
    }

    fn disable(&mut self) {}

    fn convert(&mut self) -> Option<u16> {
        let active = self.active.as_mut()?;
        Some(self.adc.blocking_read(&mut active.channel))
    }
}
