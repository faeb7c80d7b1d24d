use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::adc::{Adc, AdcChannel};
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_sync::channel::Channel;
use pad_core::controller::{LaunchPadController, TimingConfig};

use crate::hw::pressure::ChamberAdc;
use crate::link::{InboundQueue, OutboundQueue, RadioLink};
use crate::pad::panel::HardwarePanel;
use crate::pad::{EmbassyHoldTimer, FirmwareInstant};

mod control_task;
mod radio_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

pub(super) static INBOUND_QUEUE: InboundQueue = Channel::new();
pub(super) static OUTBOUND_QUEUE: OutboundQueue = Channel::new();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA0,
        PA1,
        PA4,
        PA5,
        PA6,
        PA7,
        PB0,
        PB1,
        PB2,
        ADC1,
        USART5,
        ..
    } = hal::init(config);

    // Everything de-energized and dark until the controller takes over.
    let panel = HardwarePanel::new(
        Output::new(PA6, Level::Low, Speed::Low),
        Output::new(PA7, Level::Low, Speed::Low),
        Output::new(PA4, Level::Low, Speed::Low),
        Output::new(PA5, Level::Low, Speed::Low),
        Output::new(PB2, Level::Low, Speed::Low),
    );

    let sensors = ChamberAdc::new(Adc::new(ADC1), PA0.degrade_adc(), PA1.degrade_adc());

    let link = RadioLink::new(INBOUND_QUEUE.receiver(), OUTBOUND_QUEUE.sender());

    let controller = LaunchPadController::new(
        FirmwareInstant::now(),
        TimingConfig::default(),
        link,
        panel,
        sensors,
        EmbassyHoldTimer::new(),
    );

    spawner
        .spawn(control_task::run(controller))
        .expect("failed to spawn control task");
    spawner
        .spawn(radio_task::run(
            &INBOUND_QUEUE,
            &OUTBOUND_QUEUE,
            USART5,
            PB0,
            PB1,
        ))
        .expect("failed to spawn radio task");

    core::future::pending::<()>().await;
}
