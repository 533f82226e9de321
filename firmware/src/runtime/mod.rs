//! Target runtime: executors, shared acquisition state, and task wiring.
//!
//! The sampling task runs on an interrupt-priority executor so conversions
//! and slot updates preempt thread-mode code; the monitor task polls the
//! shared slot from thread mode. The packed [`SampleSlot`] and the command
//! queue are the only state crossing that boundary.

use critical_section::{self, RawRestoreState};
use cortex_m::register::primask;
use defmt_rtt as _;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_stm32 as hal;
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_sync::channel::Channel;
use sampler_core::inputs::{BoardInputMap, Resolution};
use sampler_core::sampler::Sampler;
use sampler_core::slot::SampleSlot;
use sampler_core::trigger::TriggerConfig;

use crate::analog::{self, AdcSampler, AnalogBank};
use crate::control::{CommandQueue, SamplerCommand};

mod monitor_task;
mod sampler_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        cortex_m::interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                cortex_m::interrupt::enable();
            }
        }
    }
}

/// Resolution the power-meter senses are converted at.
pub(super) const SENSE_RESOLUTION: Resolution = Resolution::Bits12;

pub(super) static SAMPLE_SLOT: SampleSlot = SampleSlot::new();
pub(super) static SAMPLER_COMMANDS: CommandQueue = Channel::new();
static SAMPLER_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn USART1() {
    unsafe { SAMPLER_EXECUTOR.on_interrupt() }
}

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        ADC1,
        PA0,
        PA1,
        PA2,
        PA3,
        PA4,
        PA5,
        PA6,
        PA7,
        PB0,
        PB1,
        ..
    } = hal::init(config);

    let bank = AnalogBank::new(PA0, PA1, PA2, PA3, PA4, PA5, PA6, PA7, PB0, PB1);
    let mut sampler = Sampler::new(
        AdcSampler::new(ADC1, bank),
        &SAMPLE_SLOT,
        TriggerConfig::default(),
    );
    sampler
        .setup(
            &BoardInputMap::new(),
            analog::VBUS_SENSE,
            SENSE_RESOLUTION.bits(),
        )
        .expect("analog channel setup");

    interrupt::USART1.set_priority(Priority::P1);
    let sampler_spawner = SAMPLER_EXECUTOR.start(interrupt::USART1);
    sampler_spawner
        .spawn(sampler_task::run(sampler, SAMPLER_COMMANDS.receiver()))
        .expect("failed to spawn sampler task");

    spawner
        .spawn(monitor_task::run())
        .expect("failed to spawn monitor task");

    // Conversions begin only on an explicit start request.
    SAMPLER_COMMANDS.send(SamplerCommand::Start).await;

    core::future::pending::<()>().await;
}
