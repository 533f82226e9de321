//! Acquisition telemetry event catalog and ring recorder.
//!
//! Strongly typed events describing channel configuration, trigger arming,
//! and captured samples, retained in a fixed-capacity ring so diagnostics
//! never allocate. The recorder is generic over a monotonic instant wrapper
//! so the firmware (Embassy instants) and host tooling (fixed microsecond
//! fixtures) share the same bookkeeping.

use core::{fmt, time::Duration};

use heapless::{HistoryBuf, OldestOrdered};

use crate::inputs::{LogicalPin, Resolution};

/// Identifier used when tracking recorded telemetry events.
pub type EventId = u32;

/// Total number of telemetry entries retained in memory.
pub const TELEMETRY_RING_CAPACITY: usize = 64;

/// Discriminated acquisition events shared across targets.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SampleEventKind {
    ChannelConfigured(LogicalPin),
    TriggerStarted,
    TriggerStopped,
    SampleCaptured,
}

impl fmt::Display for SampleEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleEventKind::ChannelConfigured(pin) => write!(f, "channel-configured {pin}"),
            SampleEventKind::TriggerStarted => f.write_str("trigger-started"),
            SampleEventKind::TriggerStopped => f.write_str("trigger-stopped"),
            SampleEventKind::SampleCaptured => f.write_str("sample-captured"),
        }
    }
}

/// Payloads carried alongside acquisition events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SamplePayload {
    /// No additional metadata accompanies the event.
    None,
    /// Details describing a channel binding.
    Channel(ChannelTelemetry),
    /// Details describing a captured sample.
    Capture(CaptureTelemetry),
}

/// Channel binding payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChannelTelemetry {
    pub pin: LogicalPin,
    pub resolution: Resolution,
}

impl ChannelTelemetry {
    #[must_use]
    pub const fn new(pin: LogicalPin, resolution: Resolution) -> Self {
        Self { pin, resolution }
    }
}

/// Captured sample payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CaptureTelemetry {
    pub value: u16,
    /// The previous sample was overwritten before any reader consumed it.
    pub replaced_fresh: bool,
    pub elapsed_since_previous: Option<Duration>,
}

impl CaptureTelemetry {
    #[must_use]
    pub const fn new(
        value: u16,
        replaced_fresh: bool,
        elapsed_since_previous: Option<Duration>,
    ) -> Self {
        Self {
            value,
            replaced_fresh,
            elapsed_since_previous,
        }
    }
}

/// Trait implemented by monotonic instant wrappers used for telemetry tracking.
pub trait TelemetryInstant: Copy {
    /// Returns the saturating duration from `earlier` to `self`.
    fn saturating_duration_since(&self, earlier: Self) -> Duration;
}

/// Telemetry record stored in the ring buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SampleRecord<TInstant>
where
    TInstant: Copy,
{
    pub id: EventId,
    pub timestamp: TInstant,
    pub event: SampleEventKind,
    pub details: SamplePayload,
}

/// Telemetry ring buffer type alias.
pub type SampleRing<TInstant, const CAPACITY: usize = TELEMETRY_RING_CAPACITY> =
    HistoryBuf<SampleRecord<TInstant>, CAPACITY>;

/// Records acquisition events into a fixed-size ring buffer.
pub struct SampleRecorder<TInstant, const CAPACITY: usize = TELEMETRY_RING_CAPACITY>
where
    TInstant: Copy,
{
    ring: SampleRing<TInstant, CAPACITY>,
    last_capture_at: Option<TInstant>,
    next_event_id: EventId,
}

impl<TInstant, const CAPACITY: usize> SampleRecorder<TInstant, CAPACITY>
where
    TInstant: Copy + TelemetryInstant,
{
    /// Creates a new recorder with an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            last_capture_at: None,
            next_event_id: 0,
        }
    }

    /// Returns an iterator over the recorded telemetry in chronological order.
    pub fn oldest_first(&self) -> OldestOrdered<'_, SampleRecord<TInstant>> {
        self.ring.oldest_ordered()
    }

    /// Returns the most recent telemetry record, if available.
    pub fn latest(&self) -> Option<&SampleRecord<TInstant>> {
        self.ring.recent()
    }

    /// Returns the number of records currently stored.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` when no telemetry records are stored.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Records a channel binding applied by `setup`.
    pub fn record_channel_configured(
        &mut self,
        pin: LogicalPin,
        resolution: Resolution,
        timestamp: TInstant,
    ) -> EventId {
        self.last_capture_at = None;
        self.record(
            SampleEventKind::ChannelConfigured(pin),
            SamplePayload::Channel(ChannelTelemetry::new(pin, resolution)),
            timestamp,
        )
    }

    /// Records the trigger being armed.
    pub fn record_trigger_started(&mut self, timestamp: TInstant) -> EventId {
        self.record(SampleEventKind::TriggerStarted, SamplePayload::None, timestamp)
    }

    /// Records the trigger being disarmed.
    pub fn record_trigger_stopped(&mut self, timestamp: TInstant) -> EventId {
        self.record(SampleEventKind::TriggerStopped, SamplePayload::None, timestamp)
    }

    /// Records a captured sample and the elapsed time since the previous one.
    pub fn record_sample(
        &mut self,
        value: u16,
        replaced_fresh: bool,
        timestamp: TInstant,
    ) -> EventId {
        let elapsed = self
            .last_capture_at
            .map(|previous| timestamp.saturating_duration_since(previous));
        self.last_capture_at = Some(timestamp);

        self.record(
            SampleEventKind::SampleCaptured,
            SamplePayload::Capture(CaptureTelemetry::new(value, replaced_fresh, elapsed)),
            timestamp,
        )
    }

    /// Records an arbitrary telemetry event with the supplied payload.
    pub fn record(
        &mut self,
        event: SampleEventKind,
        payload: SamplePayload,
        timestamp: TInstant,
    ) -> EventId {
        let id = self.next_event_id;
        self.next_event_id = self.next_event_id.wrapping_add(1);

        self.ring.write(SampleRecord {
            id,
            timestamp,
            event,
            details: payload,
        });

        id
    }
}

impl<TInstant, const CAPACITY: usize> Default for SampleRecorder<TInstant, CAPACITY>
where
    TInstant: Copy + TelemetryInstant,
{
    fn default() -> Self {
        Self::new()
    }
}
