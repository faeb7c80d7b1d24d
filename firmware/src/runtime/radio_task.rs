use embassy_futures::join::join;
use embassy_stm32 as hal;
use embassy_stm32::Peri;
use embassy_stm32::usart::{BufferedUart, Config as UartConfig, DataBits, Parity, StopBits};
use embassy_time::{Duration, Timer};
use embedded_io_async::{Read, Write};
use static_cell::StaticCell;

use crate::link::codec::{self, CommandDeframer, TELEMETRY_FRAME_LEN};
use crate::link::{InboundQueue, OutboundQueue, OUTBOUND_QUEUE_DEPTH};

const RADIO_UART_BAUD: u32 = 57_600;
const RADIO_UART_BUFFER_SIZE: usize = TELEMETRY_FRAME_LEN * OUTBOUND_QUEUE_DEPTH;

static UART_TX_BUFFER: StaticCell<[u8; RADIO_UART_BUFFER_SIZE]> = StaticCell::new();
static UART_RX_BUFFER: StaticCell<[u8; RADIO_UART_BUFFER_SIZE]> = StaticCell::new();

embassy_stm32::bind_interrupts!(struct UartIrqs {
    USART3_4_5_6_LPUART1 => embassy_stm32::usart::BufferedInterruptHandler<hal::peripherals::USART5>;
});

#[embassy_executor::task]
pub async fn run(
    inbound: &'static InboundQueue,
    outbound: &'static OutboundQueue,
    usart: Peri<'static, hal::peripherals::USART5>,
    tx_pin: Peri<'static, hal::peripherals::PB0>,
    rx_pin: Peri<'static, hal::peripherals::PB1>,
) -> ! {
    let mut config = UartConfig::default();
    config.baudrate = RADIO_UART_BAUD;
    config.data_bits = DataBits::DataBits8;
    config.stop_bits = StopBits::STOP1;
    config.parity = Parity::ParityNone;

    let uart = BufferedUart::new(
        usart,
        rx_pin,
        tx_pin,
        UART_TX_BUFFER.init([0; RADIO_UART_BUFFER_SIZE]),
        UART_RX_BUFFER.init([0; RADIO_UART_BUFFER_SIZE]),
        UartIrqs,
        config,
    )
    .expect("failed to initialize radio UART");

    let (mut uart_tx, mut uart_rx) = uart.split();

    let command_sender = inbound.sender();
    let telemetry_receiver = outbound.receiver();

    let receive = async move {
        let mut deframer = CommandDeframer::new();
        let mut ingress = [0u8; RADIO_UART_BUFFER_SIZE];
        loop {
            match uart_rx.read(&mut ingress).await {
                Ok(count) if count > 0 => {
                    for byte in &ingress[..count] {
                        if let Some(snapshot) = deframer.push(*byte) {
                            command_sender.send(snapshot).await;
                        }
                    }
                }
                Ok(_) => {}
                Err(_) => {
                    defmt::warn!("radio: UART read error");
                    Timer::after(Duration::from_millis(5)).await;
                }
            }
        }
    };

    let transmit = async move {
        loop {
            let frame = telemetry_receiver.receive().await;
            let encoded = codec::encode_telemetry(&frame);

            let mut written = 0usize;
            while written < encoded.len() {
                match uart_tx.write(&encoded[written..]).await {
                    Ok(count) if count > 0 => {
                        written += count;
                    }
                    Ok(_) => {}
                    Err(_) => {
                        defmt::warn!("radio: UART write error");
                        Timer::after(Duration::from_millis(5)).await;
                        break;
                    }
                }
            }

            if written == encoded.len() && uart_tx.flush().await.is_err() {
                defmt::warn!("radio: UART flush error");
                Timer::after(Duration::from_millis(5)).await;
            }
        }
    };

    join(receive, transmit).await;
    loop {
        core::future::pending::<()>().await;
    }
}
