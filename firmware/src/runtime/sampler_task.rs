//! Interrupt-context sampling task.
//!
//! Owns the sampler and its telemetry recorder. Each ticker firing is one
//! trigger request: the conversion runs to completion and the result lands in
//! the shared slot before thread-mode code resumes.

use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Ticker};
use sampler_core::sampler::Sampler;
use sampler_core::telemetry::SampleRecorder;

use crate::analog::AdcSampler;
use crate::control::{CommandReceiver, FirmwareInstant, SamplerCommand};

#[embassy_executor::task]
pub async fn run(
    mut sampler: Sampler<'static, AdcSampler>,
    commands: CommandReceiver<'static>,
) -> ! {
    let mut telemetry = SampleRecorder::<FirmwareInstant>::new();
    if let Some(binding) = sampler.binding() {
        telemetry.record_channel_configured(
            binding.pin(),
            binding.resolution,
            FirmwareInstant::now(),
        );
        defmt::info!(
            "analog: bound {=str} (channel {=u8}) at {=u8} bits",
            binding.input.mcu_pin,
            binding.channel(),
            binding.resolution.bits(),
        );
    }

    let period = Duration::from_micros(sampler.trigger().period().as_micros() as u64);
    let mut ticker = Ticker::every(period);

    loop {
        if sampler.state().is_running() {
            match select(commands.receive(), ticker.next()).await {
                Either::First(command) => {
                    handle(&mut sampler, &mut telemetry, &mut ticker, command);
                }
                Either::Second(()) => {
                    if let Some(captured) = sampler.service() {
                        telemetry.record_sample(
                            captured.value,
                            captured.replaced_fresh,
                            FirmwareInstant::now(),
                        );
                        defmt::trace!("analog: sample {=u16}", captured.value);
                        if captured.replaced_fresh {
                            defmt::warn!("analog: overwrote an unconsumed sample");
                        }
                    }
                }
            }
        } else {
            let command = commands.receive().await;
            handle(&mut sampler, &mut telemetry, &mut ticker, command);
        }
    }
}

fn handle(
    sampler: &mut Sampler<'static, AdcSampler>,
    telemetry: &mut SampleRecorder<FirmwareInstant>,
    ticker: &mut Ticker,
    command: SamplerCommand,
) {
    match command {
        SamplerCommand::Start => {
            if sampler.start().is_ok() {
                ticker.reset();
                telemetry.record_trigger_started(FirmwareInstant::now());
                defmt::info!("analog: trigger started");
            } else {
                defmt::warn!("analog: start requested before setup");
            }
        }
        SamplerCommand::Stop => {
            if sampler.stop().is_ok() {
                telemetry.record_trigger_stopped(FirmwareInstant::now());
                defmt::info!("analog: trigger stopped");
            } else {
                defmt::warn!("analog: stop requested before setup");
            }
        }
    }
}
