//! Chamber pressure sampling over the STM32G0 ADC.
//!
//! Both transducers feed single-ended ADC channels. Reads are blocking and
//! raw; the control loop transmits unscaled counts, matching what the ground
//! station expects.

use embassy_stm32::adc::{Adc, AnyAdcChannel, SampleTime};
use embassy_stm32::peripherals::ADC1;
use pad_core::pressure::{PressureReading, PressureSensors};

use crate::status;

/// Embassy ADC wrapper that samples both launch chambers.
pub struct ChamberAdc<'d> {
    adc: Adc<'d, ADC1>,
    chamber1: AnyAdcChannel<ADC1>,
    chamber2: AnyAdcChannel<ADC1>,
    discard_next: bool,
}

impl<'d> ChamberAdc<'d> {
    /// Constructs a sampler over the two transducer channels.
    pub fn new(
        mut adc: Adc<'d, ADC1>,
        chamber1: AnyAdcChannel<ADC1>,
        chamber2: AnyAdcChannel<ADC1>,
    ) -> Self {
        adc.set_sample_time(SampleTime::CYCLES160_5);
        Self {
            adc,
            chamber1,
            chamber2,
            discard_next: true,
        }
    }
}

impl PressureSensors for ChamberAdc<'_> {
    fn sample(&mut self) -> PressureReading {
        // The first conversion after power-up reads low while the sampling
        // capacitor settles.
        if self.discard_next {
            let _ = self.adc.blocking_read(&mut self.chamber1);
            self.discard_next = false;
        }

        let reading = PressureReading::new(
            self.adc.blocking_read(&mut self.chamber1),
            self.adc.blocking_read(&mut self.chamber2),
        );
        status::record_pressures(reading);
        reading
    }
}
