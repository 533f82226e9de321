//! Thread-mode consumer of the shared sample slot.
//!
//! Demonstrates the intended polling pattern: check `fresh`, then `read`
//! followed by `clear` to consume each sample exactly once. Stale polls are
//! simply skipped.

use embassy_time::{Duration, Timer};

use super::{SAMPLE_SLOT, SENSE_RESOLUTION};

/// How often the monitor polls for a fresh sample.
const POLL_PERIOD: Duration = Duration::from_millis(250);

/// Millivolts at the converter's full scale.
const VREF_MV: u32 = 3_300;

#[embassy_executor::task]
pub async fn run() -> ! {
    loop {
        Timer::after(POLL_PERIOD).await;
        if SAMPLE_SLOT.fresh() {
            let raw = SAMPLE_SLOT.read();
            SAMPLE_SLOT.clear();
            let millivolts = u32::from(raw) * VREF_MV / u32::from(SENSE_RESOLUTION.max_value());
            defmt::info!("vbus: {=u32}mV (raw {=u16})", millivolts, raw);
        }
    }
}
