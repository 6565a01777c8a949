#![no_std]
#![no_main]

use defmt::{error, info};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_time::Timer;
use embassy_usb::class::cdc_acm::State;
use embassy_usb::class::web_usb::{Config as WebUsbConfig, State as WebUsbState};
use embassy_usb::{Builder, Config as UsbConfig, UsbDevice};
use gblink_trade::{
    cdc_host, configure_usb_cdc, configure_web_usb, host_channels, web_usb_config,
    CommandDispatcher, EngineConfig, GpioLink, HostBridge, HostCommands, HostRoute, HostStatus,
    LedStatus, Response, SpeciesTemplate, TradeEngine, TrainerProfile, UsbDriver,
    UsbStatusHandler, WebSerialState,
};
use static_cell::StaticCell;

#[cfg(feature = "dev-panic")]
use panic_probe as _;
#[cfg(feature = "prod-panic")]
use panic_reset as _;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => embassy_rp::usb::InterruptHandler<USB>;
});

#[cfg(not(feature = "species-pikachu"))]
const OFFERED: &SpeciesTemplate = &gblink_trade::MAGIKARP;
#[cfg(feature = "species-pikachu")]
const OFFERED: &SpeciesTemplate = &gblink_trade::PIKACHU;

const TRAINER: TrainerProfile = TrainerProfile {
    name: "RP2040",
    id: 0x1234,
    species: OFFERED,
};

type TradeBridge =
    HostBridge<HostCommands<'static>, HostStatus<'static>, GpioLink<'static>, RoscRng>;

/// LED mode shared by the USB handler, host task and LED task.
static LED_STATUS: LedStatus = LedStatus::new();

/// Web serial connection, set by the USB handler.
static WEB_SERIAL: WebSerialState = WebSerialState::new();

/// Channel that responses go back on.
static HOST_ROUTE: HostRoute = HostRoute::new();

/// USB device configuration buffer.
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// CDC-ACM state.
static CDC_STATE: StaticCell<State> = StaticCell::new();

/// WebUSB state and configuration.
static WEB_USB_STATE: StaticCell<WebUsbState> = StaticCell::new();
static WEB_USB_CONFIG: StaticCell<WebUsbConfig<'static>> = StaticCell::new();

static USB_HANDLER: StaticCell<UsbStatusHandler> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("gblink-trade starting...");

    let p = embassy_rp::init(embassy_rp::config::Config::default());

    // --- USB Setup ---
    let usb_driver = Driver::new(p.USB, Irqs);

    let mut usb_config = UsbConfig::new(0x1209, 0x0001); // pid.codes test VID/PID
    usb_config.manufacturer = Some("Rust Link Cable");
    usb_config.product = Some("Game Boy Trade Bridge");
    usb_config.serial_number = Some("001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    // Composite device: CDC-ACM plus the WebUSB vendor interface
    usb_config.device_class = 0xEF;
    usb_config.device_sub_class = 0x02;
    usb_config.device_protocol = 0x01;
    usb_config.composite_with_iads = true;

    let config_descriptor = CONFIG_DESCRIPTOR.init([0; 256]);
    let bos_descriptor = BOS_DESCRIPTOR.init([0; 256]);
    let msos_descriptor = MSOS_DESCRIPTOR.init([0; 256]);
    let control_buf = CONTROL_BUF.init([0; 64]);

    let mut builder = Builder::new(
        usb_driver,
        usb_config,
        config_descriptor,
        bos_descriptor,
        msos_descriptor,
        control_buf,
    );

    builder.handler(USB_HANDLER.init(UsbStatusHandler::new(&LED_STATUS, &WEB_SERIAL)));

    // Configure CDC-ACM class
    let cdc_state = CDC_STATE.init(State::new());
    let class = configure_usb_cdc(&mut builder, cdc_state);

    // Configure WebUSB vendor interface
    let web_state = WEB_USB_STATE.init(WebUsbState::new());
    let web_config = WEB_USB_CONFIG.init(web_usb_config());
    let web = configure_web_usb(&mut builder, web_state, web_config, &WEB_SERIAL);

    // Build the USB device
    let usb_device = builder.build();

    // --- Link + trade engine ---
    let link = GpioLink::new(p.PIN_0, p.PIN_1, p.PIN_2);
    let engine = TradeEngine::new(link, RoscRng, EngineConfig::default());
    let dispatcher = CommandDispatcher::new(engine, TRAINER);

    let (commands, status) = host_channels(cdc_host(class), web, &HOST_ROUTE, &LED_STATUS);
    let bridge = HostBridge::new(commands, status, dispatcher);

    // On-board LED on Pico
    let led = Output::new(p.PIN_25, Level::Low);

    // Spawn tasks (unwrap the SpawnToken, then spawn)
    spawner.spawn(usb_task(usb_device).unwrap());
    spawner.spawn(led_task(led, &LED_STATUS).unwrap());
    spawner.spawn(host_task(bridge).unwrap());

    info!("gblink-trade initialized, offering {}", OFFERED.name);
}

/// USB device task - runs the USB stack.
#[embassy_executor::task]
async fn usb_task(mut device: UsbDevice<'static, UsbDriver>) {
    device.run().await;
}

/// Host task - serves host commands and runs trades.
///
/// A trade blocks the executor until it completes or fails; USB and LED
/// tasks resume afterwards.
#[embassy_executor::task]
async fn host_task(mut bridge: TradeBridge) {
    loop {
        match bridge.process_one().await {
            Ok(Response::Trade(outcome)) => {
                info!("Trade complete: {:?}", outcome.record);
            }
            Ok(Response::TradeFailed(e)) => {
                error!("Trade failed: {:?}", e);
            }
            Ok(_) => {}
            Err(e) => {
                error!("Host error: {:?}", e);
            }
        }

        if LED_STATUS.is_trading() {
            LED_STATUS.set_trading(false);
        }
    }
}

/// LED task - blinks at the rate of the current mode, solid while trading.
#[embassy_executor::task]
async fn led_task(mut led: Output<'static>, status: &'static LedStatus) {
    let mut mode = status.current();

    loop {
        match mode.blink_interval() {
            None => {
                led.set_high();
                mode = status.wait().await;
            }
            Some(interval) => {
                led.toggle();
                if let Either::First(next) = select(status.wait(), Timer::after(interval)).await {
                    mode = next;
                }
            }
        }
    }
}
