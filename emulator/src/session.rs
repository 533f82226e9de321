//! Interactive session driving the acquisition core without hardware.
//!
//! The session owns a [`Sampler`] bound to a synthetic triangle-wave
//! peripheral and a manually advanced clock: every `tick` stands in for one
//! hardware timer firing, so the full setup/start/poll/consume surface can be
//! walked from the terminal.

use std::convert::Infallible;
use std::time::Duration;

use sampler_core::inputs::{BoardInputMap, LogicalPin, PinBinding};
use sampler_core::sampler::{ConversionPeripheral, Sampler};
use sampler_core::slot::SampleSlot;
use sampler_core::telemetry::{SamplePayload, SampleRecorder, TelemetryInstant};
use sampler_core::trigger::TriggerConfig;

/// Microsecond timestamp advanced by the session's simulated timer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct EmulatedInstant(u64);

impl EmulatedInstant {
    fn micros(self) -> u64 {
        self.0
    }
}

impl TelemetryInstant for EmulatedInstant {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }
}

/// Conversion peripheral producing a deterministic triangle wave.
///
/// `hold_off` simulates a converter that misses trigger firings: while set,
/// conversions return nothing and the slot goes stale.
struct WaveformAdc {
    binding: Option<PinBinding>,
    enabled: bool,
    level: u16,
    rising: bool,
    hold_off: u32,
}

impl WaveformAdc {
    fn new() -> Self {
        Self {
            binding: None,
            enabled: false,
            level: 0,
            rising: true,
            hold_off: 0,
        }
    }

    fn full_scale(&self) -> u16 {
        self.binding
            .map_or(u16::MAX, |binding| binding.resolution.max_value())
    }
}

impl ConversionPeripheral for WaveformAdc {
    type Error = Infallible;

    fn configure(&mut self, binding: &PinBinding) -> Result<(), Self::Error> {
        self.binding = Some(*binding);
        self.level = 0;
        self.rising = true;
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
        if self.hold_off > 0 {
            self.hold_off -= 1;
            return None;
        }

        let full = self.full_scale();
        let step = (full / 16).max(1);
        let sample = self.level;

        if self.rising {
            self.level = self.level.saturating_add(step).min(full);
            if self.level == full {
                self.rising = false;
            }
        } else {
            self.level = self.level.saturating_sub(step);
            if self.level == 0 {
                self.rising = true;
            }
        }

        Some(sample)
    }
}

/// Line-oriented emulator session.
pub struct Session {
    sampler: Sampler<'static, WaveformAdc>,
    telemetry: SampleRecorder<EmulatedInstant>,
    clock_us: u64,
}

impl Session {
    pub fn new() -> Self {
        let slot: &'static SampleSlot = Box::leak(Box::new(SampleSlot::new()));
        Self {
            sampler: Sampler::new(WaveformAdc::new(), slot, TriggerConfig::default()),
            telemetry: SampleRecorder::new(),
            clock_us: 0,
        }
    }

    fn now(&self) -> EmulatedInstant {
        EmulatedInstant(self.clock_us)
    }

    fn period_us(&self) -> u64 {
        self.sampler.trigger().period().as_micros() as u64
    }

    /// Executes one command line and returns the responses to print.
    pub fn handle_command(&mut self, input: &str) -> Vec<String> {
        let mut parts = input.split_whitespace();
        let Some(command) = parts.next() else {
            return Vec::new();
        };

        match command {
            "help" => usage(),
            "setup" => self.handle_setup(parts.next(), parts.next()),
            "start" => self.handle_start(),
            "stop" => self.handle_stop(),
            "tick" => self.handle_tick(parts.next()),
            "busy" => self.handle_busy(parts.next()),
            "fresh" => vec![format!("fresh: {}", self.sampler.slot().fresh())],
            "read" => vec![format!("read: {}", self.sampler.slot().read())],
            "clear" => {
                self.sampler.slot().clear();
                vec!["freshness cleared".to_string()]
            }
            "status" => self.handle_status(),
            "history" => self.handle_history(),
            other => vec![format!("unknown command: {other}. Type `help` for commands.")],
        }
    }

    fn handle_setup(&mut self, pin: Option<&str>, bits: Option<&str>) -> Vec<String> {
        let (Some(pin), Some(bits)) = (pin, bits) else {
            return vec!["usage: setup <pin> <bits> (e.g. `setup A0 12`)".to_string()];
        };
        let Some(pin) = parse_pin(pin) else {
            return vec![format!("unrecognized pin `{pin}`")];
        };
        let Ok(bits) = bits.parse::<u8>() else {
            return vec![format!("unrecognized resolution `{bits}`")];
        };

        match self.sampler.setup(&BoardInputMap::new(), pin, bits) {
            Ok(()) => {
                let binding = *self.sampler.binding().expect("binding after setup");
                self.telemetry.record_channel_configured(
                    binding.pin(),
                    binding.resolution,
                    self.now(),
                );
                vec![format!(
                    "bound {} ({}, channel {}) at {}",
                    binding.input.name,
                    binding.input.mcu_pin,
                    binding.channel(),
                    binding.resolution,
                )]
            }
            Err(err) => vec![format!("setup failed: {err}")],
        }
    }

    fn handle_start(&mut self) -> Vec<String> {
        match self.sampler.start() {
            Ok(()) => {
                self.telemetry.record_trigger_started(self.now());
                vec![format!(
                    "trigger armed at {}ms per conversion",
                    self.sampler.trigger().period().as_millis()
                )]
            }
            Err(err) => vec![format!("start failed: {err}")],
        }
    }

    fn handle_stop(&mut self) -> Vec<String> {
        match self.sampler.stop() {
            Ok(()) => {
                self.telemetry.record_trigger_stopped(self.now());
                vec!["trigger disarmed".to_string()]
            }
            Err(err) => vec![format!("stop failed: {err}")],
        }
    }

    fn handle_tick(&mut self, count: Option<&str>) -> Vec<String> {
        let count = match count {
            None => 1,
            Some(token) => match token.parse::<u32>() {
                Ok(value) if value > 0 => value,
                _ => return vec![format!("unrecognized tick count `{token}`")],
            },
        };

        if !self.sampler.state().is_running() {
            return vec!["trigger is not armed; tick ignored".to_string()];
        }

        let mut responses = Vec::new();
        for _ in 0..count {
            self.clock_us += self.period_us();
            match self.sampler.service() {
                Some(captured) => {
                    self.telemetry
                        .record_sample(captured.value, captured.replaced_fresh, self.now());
                    let mut line =
                        format!("t={}us sample {} published", self.clock_us, captured.value);
                    if captured.replaced_fresh {
                        line.push_str(" (unconsumed sample lost)");
                    }
                    responses.push(line);
                }
                None => responses.push(format!("t={}us conversion missed", self.clock_us)),
            }
        }
        responses
    }

    fn handle_busy(&mut self, count: Option<&str>) -> Vec<String> {
        let count = match count {
            None => 1,
            Some(token) => match token.parse::<u32>() {
                Ok(value) => value,
                Err(_) => return vec![format!("unrecognized busy count `{token}`")],
            },
        };
        self.sampler.peripheral_mut().hold_off = count;
        vec![format!("peripheral will miss the next {count} conversion(s)")]
    }

    fn handle_status(&mut self) -> Vec<String> {
        let binding = match self.sampler.binding() {
            Some(binding) => format!(
                "{} ({}, channel {}) at {}",
                binding.input.name,
                binding.input.mcu_pin,
                binding.channel(),
                binding.resolution,
            ),
            None => "none".to_string(),
        };
        let (value, fresh) = self.sampler.slot().snapshot();

        vec![
            format!("state: {:?}", self.sampler.state()),
            format!("binding: {binding}"),
            format!(
                "trigger: every {}ms",
                self.sampler.trigger().period().as_millis()
            ),
            format!("slot: value={value} fresh={fresh}"),
        ]
    }

    fn handle_history(&mut self) -> Vec<String> {
        if self.telemetry.is_empty() {
            return vec!["history: empty".to_string()];
        }

        self.telemetry
            .oldest_first()
            .map(|record| {
                let mut line = format!(
                    "#{} t={}us {}",
                    record.id,
                    record.timestamp.micros(),
                    record.event
                );
                match record.details {
                    SamplePayload::Capture(details) => {
                        line.push_str(&format!(" value={}", details.value));
                        if let Some(elapsed) = details.elapsed_since_previous {
                            line.push_str(&format!(" dt={}us", elapsed.as_micros()));
                        }
                        if details.replaced_fresh {
                            line.push_str(" lost-previous");
                        }
                    }
                    SamplePayload::Channel(details) => {
                        line.push_str(&format!(" {}", details.resolution));
                    }
                    SamplePayload::None => {}
                }
                line
            })
            .collect()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_pin(token: &str) -> Option<LogicalPin> {
    let digits = token
        .strip_prefix('A')
        .or_else(|| token.strip_prefix('a'))
        .unwrap_or(token);
    digits.parse::<u8>().ok().map(LogicalPin::new)
}

fn usage() -> Vec<String> {
    [
        "setup <pin> <bits>  bind an analog pin (e.g. `setup A0 12`)",
        "start               arm the conversion trigger",
        "stop                disarm the conversion trigger",
        "tick [n]            simulate n timer firings (default 1)",
        "busy [n]            make the peripheral miss the next n conversions",
        "fresh               query the freshness flag",
        "read                read the latest sample (stale or fresh)",
        "clear               drop the freshness flag",
        "status              show sampler state and slot contents",
        "history             dump the telemetry ring",
        "exit                quit the emulator",
    ]
    .iter()
    .map(|line| (*line).to_string())
    .collect()
}
