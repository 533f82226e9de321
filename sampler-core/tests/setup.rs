use sampler_core::inputs::{AnalogInput, BoardInputMap, LogicalPin, PinResolver, Resolution};
use sampler_core::sampler::{ConfigError, ConversionPeripheral, Sampler, SamplerState, ScriptedPeripheral};
use sampler_core::slot::SampleSlot;
use sampler_core::trigger::TriggerConfig;

fn sampler(slot: &SampleSlot) -> Sampler<'_, ScriptedPeripheral> {
    Sampler::new(ScriptedPeripheral::new(), slot, TriggerConfig::default())
}

#[test]
fn setup_binds_channel_and_resets_slot() {
    let slot = SampleSlot::new();
    // A stale value from a previous binding must not leak through setup.
    slot.publish(999);

    let mut sampler = sampler(&slot);
    for bits in [6, 8, 10, 12] {
        sampler
            .setup(&BoardInputMap::new(), LogicalPin::new(0), bits)
            .unwrap();

        assert_eq!(sampler.state(), SamplerState::Configured);
        assert!(!slot.fresh());
        assert_eq!(slot.read(), 0);

        let binding = sampler.binding().unwrap();
        assert_eq!(binding.pin(), LogicalPin::new(0));
        assert_eq!(binding.channel(), 0);
        assert_eq!(binding.resolution.bits(), bits);
    }
}

#[test]
fn setup_propagates_binding_to_the_peripheral() {
    let slot = SampleSlot::new();
    let mut sampler = sampler(&slot);
    sampler
        .setup(&BoardInputMap::new(), LogicalPin::new(8), 10)
        .unwrap();

    let applied = sampler.peripheral().binding().unwrap();
    assert_eq!(applied.input.mcu_pin, "PB0");
    assert_eq!(applied.channel(), 8);
    assert_eq!(applied.resolution, Resolution::Bits10);
}

#[test]
fn unsupported_resolutions_fail_without_clamping() {
    let slot = SampleSlot::new();
    let mut sampler = sampler(&slot);

    for bits in [0, 7, 9, 11, 14, 16] {
        let err = sampler
            .setup(&BoardInputMap::new(), LogicalPin::new(0), bits)
            .unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedResolution(bits));
        assert_eq!(sampler.state(), SamplerState::Unconfigured);
        assert!(sampler.binding().is_none());
    }
}

#[test]
fn unrouted_pin_fails_setup() {
    let slot = SampleSlot::new();
    let mut sampler = sampler(&slot);

    let err = sampler
        .setup(&BoardInputMap::new(), LogicalPin::new(42), 12)
        .unwrap_err();
    assert_eq!(err, ConfigError::UnmappedPin(LogicalPin::new(42)));
    assert_eq!(sampler.state(), SamplerState::Unconfigured);
}

#[test]
fn setup_while_running_is_rejected() {
    let slot = SampleSlot::new();
    let mut sampler = sampler(&slot);
    sampler
        .setup(&BoardInputMap::new(), LogicalPin::new(0), 12)
        .unwrap();
    sampler.start().unwrap();

    let err = sampler
        .setup(&BoardInputMap::new(), LogicalPin::new(1), 12)
        .unwrap_err();
    assert_eq!(err, ConfigError::Busy);

    // The original binding is untouched and conversions keep working.
    assert_eq!(sampler.binding().unwrap().pin(), LogicalPin::new(0));
    sampler.peripheral_mut().queue_sample(5).unwrap();
    assert!(sampler.service().is_some());
}

#[test]
fn reconfiguring_switches_channel_after_stop() {
    let slot = SampleSlot::new();
    let mut sampler = sampler(&slot);
    sampler
        .setup(&BoardInputMap::new(), LogicalPin::new(0), 12)
        .unwrap();
    sampler.start().unwrap();
    sampler.peripheral_mut().queue_sample(100).unwrap();
    sampler.service().unwrap();
    sampler.stop().unwrap();

    sampler
        .setup(&BoardInputMap::new(), LogicalPin::new(1), 8)
        .unwrap();

    // The previous channel's sample does not survive the rebind.
    assert_eq!(slot.snapshot(), (0, false));
    let binding = sampler.binding().unwrap();
    assert_eq!(binding.pin(), LogicalPin::new(1));
    assert_eq!(binding.resolution, Resolution::Bits8);
}

#[test]
fn peripheral_rejection_surfaces_as_config_error() {
    struct RefusingPeripheral;

    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    struct NotCalibrated;

    impl ConversionPeripheral for RefusingPeripheral {
        type Error = NotCalibrated;

        fn configure(
            &mut self,
            _: &sampler_core::inputs::PinBinding,
        ) -> Result<(), Self::Error> {
            Err(NotCalibrated)
        }

        fn enable(&mut self) {}

        fn disable(&mut self) {}

        fn convert(&mut self) -> Option<u16> {
            None
        }
    }

    let slot = SampleSlot::new();
    let mut sampler = Sampler::new(RefusingPeripheral, &slot, TriggerConfig::default());
    let err = sampler
        .setup(&BoardInputMap::new(), LogicalPin::new(0), 12)
        .unwrap_err();
    assert_eq!(err, ConfigError::Peripheral(NotCalibrated));
    assert_eq!(sampler.state(), SamplerState::Unconfigured);
}

#[test]
fn custom_resolver_overrides_the_board_catalog() {
    struct SingleInput;

    impl PinResolver for SingleInput {
        fn resolve(&self, pin: LogicalPin) -> Option<AnalogInput> {
            (pin == LogicalPin::new(7)).then_some(AnalogInput::new(pin, "PROBE", "PC4", 17))
        }
    }

    let slot = SampleSlot::new();
    let mut sampler = sampler(&slot);

    let err = sampler.setup(&SingleInput, LogicalPin::new(0), 12).unwrap_err();
    assert_eq!(err, ConfigError::UnmappedPin(LogicalPin::new(0)));

    sampler.setup(&SingleInput, LogicalPin::new(7), 12).unwrap();
    assert_eq!(sampler.binding().unwrap().channel(), 17);
}
