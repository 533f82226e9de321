use sampler_core::inputs::{BoardInputMap, LogicalPin};
use sampler_core::sampler::{Sampler, SamplerState, ScriptedPeripheral, TriggerError};
use sampler_core::slot::SampleSlot;
use sampler_core::trigger::TriggerConfig;

fn configured_sampler(slot: &SampleSlot, bits: u8) -> Sampler<'_, ScriptedPeripheral> {
    let mut sampler = Sampler::new(ScriptedPeripheral::new(), slot, TriggerConfig::default());
    sampler
        .setup(&BoardInputMap::new(), LogicalPin::new(0), bits)
        .unwrap();
    sampler
}

#[test]
fn start_requires_setup() {
    let slot = SampleSlot::new();
    let mut sampler = Sampler::new(ScriptedPeripheral::<8>::new(), &slot, TriggerConfig::default());

    assert_eq!(sampler.start(), Err(TriggerError::NotConfigured));
    assert_eq!(sampler.stop(), Err(TriggerError::NotConfigured));
}

#[test]
fn start_arms_the_conversion_path() {
    let slot = SampleSlot::new();
    let mut sampler = configured_sampler(&slot, 12);
    assert!(!sampler.peripheral().is_enabled());

    sampler.start().unwrap();
    assert_eq!(sampler.state(), SamplerState::Running);
    assert!(sampler.peripheral().is_enabled());

    // Arming twice is a no-op.
    sampler.start().unwrap();
    assert_eq!(sampler.state(), SamplerState::Running);
}

#[test]
fn completion_publishes_value_and_freshness() {
    let slot = SampleSlot::new();
    let mut sampler = configured_sampler(&slot, 12);
    sampler.start().unwrap();

    sampler.peripheral_mut().queue_sample(2048).unwrap();
    let captured = sampler.service().unwrap();
    assert_eq!(captured.value, 2048);
    assert!(!captured.replaced_fresh);

    assert!(slot.fresh());
    assert_eq!(slot.read(), 2048);
}

#[test]
fn read_is_idempotent_and_side_effect_free() {
    let slot = SampleSlot::new();
    let mut sampler = configured_sampler(&slot, 12);
    sampler.start().unwrap();
    sampler.peripheral_mut().queue_sample(1234).unwrap();
    sampler.service().unwrap();

    for _ in 0..5 {
        assert_eq!(slot.read(), 1234);
        assert!(slot.fresh());
    }
}

#[test]
fn consecutive_completions_keep_only_the_last_sample() {
    let slot = SampleSlot::new();
    let mut sampler = configured_sampler(&slot, 12);
    sampler.start().unwrap();

    sampler.peripheral_mut().queue_sample(100).unwrap();
    sampler.peripheral_mut().queue_sample(200).unwrap();

    sampler.service().unwrap();
    let second = sampler.service().unwrap();
    assert!(second.replaced_fresh, "first sample was never consumed");

    assert_eq!(slot.snapshot(), (200, true));
}

#[test]
fn missed_conversion_leaves_the_slot_stale() {
    let slot = SampleSlot::new();
    let mut sampler = configured_sampler(&slot, 12);
    sampler.start().unwrap();

    sampler.peripheral_mut().queue_sample(321).unwrap();
    sampler.service().unwrap();
    slot.clear();

    // Trigger fires but the peripheral has nothing ready; no publish happens.
    assert!(sampler.service().is_none());
    assert_eq!(slot.snapshot(), (321, false));

    // The next firing proceeds normally.
    sampler.peripheral_mut().queue_sample(322).unwrap();
    assert!(sampler.service().is_some());
    assert_eq!(slot.snapshot(), (322, true));
}

#[test]
fn stop_disarms_without_erasing_the_sample() {
    let slot = SampleSlot::new();
    let mut sampler = configured_sampler(&slot, 12);
    sampler.start().unwrap();
    sampler.peripheral_mut().queue_sample(55).unwrap();
    sampler.service().unwrap();

    sampler.stop().unwrap();
    assert_eq!(sampler.state(), SamplerState::Configured);
    assert!(!sampler.peripheral().is_enabled());

    // No conversions while stopped, even with data queued.
    sampler.peripheral_mut().queue_sample(56).unwrap();
    assert!(sampler.service().is_none());
    assert_eq!(slot.snapshot(), (55, true));

    // Stopping twice is a no-op.
    sampler.stop().unwrap();
    assert_eq!(sampler.state(), SamplerState::Configured);
}

#[test]
fn completion_masks_to_the_bound_width() {
    let slot = SampleSlot::new();
    let mut sampler = configured_sampler(&slot, 8);
    sampler.start().unwrap();

    // A reading wider than the configured resolution keeps only the low bits.
    sampler.peripheral_mut().queue_sample(0x1FF).unwrap();
    let captured = sampler.service().unwrap();
    assert_eq!(captured.value, 0xFF);
    assert_eq!(slot.read(), 0xFF);
}

#[test]
fn poll_consume_cycle_matches_the_reference_scenario() {
    // setup(A0, 12) -> start -> completion(2048) -> fresh/read -> clear.
    let slot = SampleSlot::new();
    let mut sampler = configured_sampler(&slot, 12);
    assert!(!slot.fresh());
    assert_eq!(slot.read(), 0);

    sampler.start().unwrap();
    sampler.peripheral_mut().queue_sample(2048).unwrap();
    sampler.service().unwrap();

    assert!(slot.fresh());
    assert_eq!(slot.read(), 2048);

    slot.clear();
    assert!(!slot.fresh());
    assert_eq!(slot.read(), 2048);
}

#[test]
fn conversions_happen_only_while_running() {
    let slot = SampleSlot::new();
    let mut sampler = configured_sampler(&slot, 12);
    sampler.peripheral_mut().queue_sample(900).unwrap();

    // Configured but never started: the trigger firing is ignored.
    assert!(sampler.service().is_none());
    assert_eq!(sampler.peripheral().conversions(), 0);

    sampler.start().unwrap();
    assert!(sampler.service().is_some());
    assert_eq!(sampler.peripheral().conversions(), 1);
}
