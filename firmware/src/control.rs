#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Sampler command plumbing shared between firmware tasks.

use core::time::Duration;

#[cfg(target_os = "none")]
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
#[cfg(not(target_os = "none"))]
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::Instant;
use sampler_core::telemetry::TelemetryInstant;

/// Depth of the command queue shared between producers and the sampling task.
pub const COMMAND_QUEUE_DEPTH: usize = 4;

// The queue crosses executor priority levels (thread-mode producers, the
// interrupt-executor sampling task as consumer), so the target build needs a
// critical-section mutex rather than a thread-mode one.
#[cfg(target_os = "none")]
type SamplerMutex = CriticalSectionRawMutex;
#[cfg(not(target_os = "none"))]
type SamplerMutex = NoopRawMutex;

/// Commands accepted by the sampling task.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SamplerCommand {
    /// Arm the trigger and begin periodic conversions.
    Start,
    /// Disarm the trigger; the last sample stays readable.
    Stop,
}

/// Queue used to coordinate sampler commands.
pub type CommandQueue = Channel<SamplerMutex, SamplerCommand, COMMAND_QUEUE_DEPTH>;

/// Convenience sender type alias for the sampler command queue.
#[allow(dead_code)]
pub type CommandSender<'a> = Sender<'a, SamplerMutex, SamplerCommand, COMMAND_QUEUE_DEPTH>;

/// Convenience receiver type alias for the sampler command queue.
pub type CommandReceiver<'a> = Receiver<'a, SamplerMutex, SamplerCommand, COMMAND_QUEUE_DEPTH>;

/// Monotonic timestamp binding Embassy instants to the core telemetry types.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FirmwareInstant(Instant);

impl FirmwareInstant {
    /// Captures the current monotonic time.
    #[cfg(target_os = "none")]
    pub fn now() -> Self {
        Self(Instant::now())
    }
}

impl From<Instant> for FirmwareInstant {
    fn from(instant: Instant) -> Self {
        Self(instant)
    }
}

impl TelemetryInstant for FirmwareInstant {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        Duration::from_micros(self.0.saturating_duration_since(earlier.0).as_micros())
    }
}
