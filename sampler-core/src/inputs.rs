//! Analog input catalog and binding types shared by firmware and host targets.
//!
//! The catalog records how each logical analog pin is routed on the board:
//! the MCU pin it lands on and the ADC input channel behind it. `setup`
//! resolves a logical pin through this table (or any other [`PinResolver`])
//! into an immutable [`PinBinding`]; pins without a conversion channel are a
//! configuration error, never a runtime condition.

use core::fmt;

/// Logical identifier for an analog-capable header pin.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LogicalPin(u8);

impl LogicalPin {
    /// Creates a logical pin from its header index.
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Returns the header index backing this pin.
    pub const fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Display for LogicalPin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

/// Metadata describing how an analog input is routed on the board.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct AnalogInput {
    pub pin: LogicalPin,
    pub name: &'static str,
    pub mcu_pin: &'static str,
    pub channel: u8,
}

impl AnalogInput {
    pub const fn new(pin: LogicalPin, name: &'static str, mcu_pin: &'static str, channel: u8) -> Self {
        Self {
            pin,
            name,
            mcu_pin,
            channel,
        }
    }
}

/// Compile-time catalog of every analog-capable input.
pub const ALL_INPUTS: [AnalogInput; 10] = [
    AnalogInput::new(LogicalPin::new(0), "VBUS", "PA0", 0),
    AnalogInput::new(LogicalPin::new(1), "ISENSE", "PA1", 1),
    AnalogInput::new(LogicalPin::new(2), "NTC", "PA2", 2),
    AnalogInput::new(LogicalPin::new(3), "EXP0", "PA3", 3),
    AnalogInput::new(LogicalPin::new(4), "EXP1", "PA4", 4),
    AnalogInput::new(LogicalPin::new(5), "EXP2", "PA5", 5),
    AnalogInput::new(LogicalPin::new(6), "EXP3", "PA6", 6),
    AnalogInput::new(LogicalPin::new(7), "EXP4", "PA7", 7),
    AnalogInput::new(LogicalPin::new(8), "EXP5", "PB0", 8),
    AnalogInput::new(LogicalPin::new(9), "EXP6", "PB1", 9),
];

/// Retrieve input metadata for a logical pin, if the board routes it to the ADC.
pub fn input_by_pin(pin: LogicalPin) -> Option<AnalogInput> {
    ALL_INPUTS.iter().copied().find(|input| input.pin == pin)
}

/// Maps logical pins to conversion channels.
///
/// The firmware and tests normally use [`BoardInputMap`]; alternate boards can
/// substitute their own routing without touching the sampler.
pub trait PinResolver {
    /// Resolves a logical pin into its input metadata.
    fn resolve(&self, pin: LogicalPin) -> Option<AnalogInput>;
}

/// Resolver backed by the compile-time input catalog.
#[derive(Copy, Clone, Debug, Default)]
pub struct BoardInputMap;

impl BoardInputMap {
    /// Creates a new catalog-backed resolver.
    pub const fn new() -> Self {
        Self
    }
}

impl PinResolver for BoardInputMap {
    fn resolve(&self, pin: LogicalPin) -> Option<AnalogInput> {
        input_by_pin(pin)
    }
}

/// Conversion widths supported by the peripheral.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Resolution {
    Bits6,
    Bits8,
    Bits10,
    Bits12,
}

impl Resolution {
    /// Maps a requested bit width onto a supported resolution.
    ///
    /// Unsupported widths return `None` so callers fail configuration instead
    /// of silently clamping.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            6 => Some(Resolution::Bits6),
            8 => Some(Resolution::Bits8),
            10 => Some(Resolution::Bits10),
            12 => Some(Resolution::Bits12),
            _ => None,
        }
    }

    /// Returns the conversion width in bits.
    pub const fn bits(self) -> u8 {
        match self {
            Resolution::Bits6 => 6,
            Resolution::Bits8 => 8,
            Resolution::Bits10 => 10,
            Resolution::Bits12 => 12,
        }
    }

    /// Returns the full-scale value for this width.
    pub const fn max_value(self) -> u16 {
        ((1u32 << self.bits()) - 1) as u16
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Channel binding produced by a successful `setup` call.
///
/// Immutable once created; a later `setup` replaces the binding wholesale.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PinBinding {
    pub input: AnalogInput,
    pub resolution: Resolution,
}

impl PinBinding {
    pub const fn new(input: AnalogInput, resolution: Resolution) -> Self {
        Self { input, resolution }
    }

    /// Returns the logical pin this binding was resolved from.
    pub const fn pin(&self) -> LogicalPin {
        self.input.pin
    }

    /// Returns the ADC input channel behind the pin.
    pub const fn channel(&self) -> u8 {
        self.input.channel
    }
}
