#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those     holding buffers for the duration of a data transfer."
)]

use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Delay;
use esp_hal::clock::CpuClock;
use esp_hal::gpio::{Input, InputConfig, Pull};
use esp_hal::i2c::master::I2c;
use esp_hal::time::Rate;
use esp_hal::timer::systimer::SystemTimer;
use esp_hal::Async;
use esp_println::println;
use log::{error, info, warn};
use static_cell::StaticCell;

use elan_i2c_touchpad_async::{
    ChannelSink, I2cTransport, PowerState, TouchEvent, Touchpad, TouchpadConfig,
};

type Pad = Touchpad<CriticalSectionRawMutex, I2cTransport<I2c<'static, Async>>, Delay>;

static TOUCHPAD: StaticCell<Pad> = StaticCell::new();
static EVENTS: Channel<CriticalSectionRawMutex, TouchEvent, 8> = Channel::new();

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    println!("{}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[esp_hal_embassy::main]
async fn main(spawner: Spawner) {
    esp_println::logger::init_logger(log::LevelFilter::Debug);
    info!("Logger initialized");

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timer0 = SystemTimer::new(peripherals.SYSTIMER);
    esp_hal_embassy::init(timer0.alarm0);

    let touch_int = Input::new(
        peripherals.GPIO12,
        InputConfig::default().with_pull(Pull::Up),
    );
    let mut sleep_button = Input::new(
        peripherals.GPIO0,
        InputConfig::default().with_pull(Pull::Up),
    );

    let config = esp_hal::i2c::master::Config::default().with_frequency(Rate::from_khz(400));
    let touch_i2c = I2c::new(peripherals.I2C0, config)
        .unwrap()
        .with_sda(peripherals.GPIO13)
        .with_scl(peripherals.GPIO14)
        .into_async();

    let touchpad = match Pad::attach(
        I2cTransport::new(touch_i2c),
        Delay,
        TouchpadConfig::default(),
    )
    .await
    {
        Ok(touchpad) => touchpad,
        Err(err) => {
            error!("Touchpad did not come online: {err:?}");
            loop {
                embassy_time::Timer::after_secs(1).await;
            }
        }
    };
    let touchpad: &'static Pad = TOUCHPAD.init(touchpad);

    spawner.spawn(watch_interrupt(touchpad, touch_int)).unwrap();
    spawner.spawn(report_worker(touchpad)).unwrap();

    info!("Touchpad ready. Press BOOT to toggle sleep.");
    loop {
        match select(EVENTS.receive(), sleep_button.wait_for_falling_edge()).await {
            Either::First(event) => {
                for slot in event.slots.active() {
                    info!(
                        "finger {} at ({}, {}) pressure {} button {}",
                        slot.slot_index, slot.x, slot.y, slot.pressure, slot.button_down
                    );
                }
                if event.contact_count == 0 {
                    info!("all fingers lifted");
                }
            }
            Either::Second(()) => {
                let result = match touchpad.power_state() {
                    PowerState::Awake => touchpad.suspend().await,
                    _ => touchpad.resume().await,
                };
                match result {
                    Ok(()) => info!("Touchpad is now {:?}", touchpad.power_state()),
                    Err(err) => warn!("Power transition failed: {err:?}"),
                }
            }
        }
    }
}

/// Admits a report cycle on every falling edge of the touchpad interrupt.
#[embassy_executor::task]
async fn watch_interrupt(touchpad: &'static Pad, mut int: Input<'static>) {
    touchpad.watch_interrupt_line(&mut int).await
}

/// Runs admitted report cycles and queues the decoded frames.
#[embassy_executor::task]
async fn report_worker(touchpad: &'static Pad) {
    let mut sink = ChannelSink::new(&EVENTS);
    touchpad.run(&mut sink).await
}
