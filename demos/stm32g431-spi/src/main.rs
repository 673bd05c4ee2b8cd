#![no_std]
#![no_main]

use defmt::*;
use embassy_embedded_hal::shared_bus::asynch::spi::SpiDevice;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::spi::{Config, Spi};
use embassy_stm32::time::Hertz;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle};

use sh110x_async::{Color, Config as DisplayConfig, Rotation, Sh110x, SpiInterface};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

const WIDTH: u16 = 128;
const HEIGHT: u16 = 128;

// 16 pages of 128 columns
static FRAMEBUFFER: StaticCell<[u8; WIDTH as usize * HEIGHT as usize / 8]> = StaticCell::new();

static DISPLAY_SPI_BUS: StaticCell<Mutex<CriticalSectionRawMutex, Spi<'static, embassy_stm32::mode::Async>>> =
    StaticCell::new();

struct EmbassyTimer;

impl sh110x_async::Timer for EmbassyTimer {
    async fn delay_ms(milliseconds: u64) {
        embassy_time::Timer::after_millis(milliseconds).await;
    }
}

// Arrow pointing at the logical top edge, 8x8, MSB first
const ARROW: [u8; 8] = [
    0b0001_1000,
    0b0011_1100,
    0b0111_1110,
    0b1111_1111,
    0b0001_1000,
    0b0001_1000,
    0b0001_1000,
    0b0001_1000,
];

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("SH1107 display example starting...");

    let p = embassy_stm32::init(Default::default());

    let mut spi_config = Config::default();
    spi_config.frequency = Hertz(8_000_000);

    let spi_bus = Spi::new_txonly(
        p.SPI1,
        p.PB3,      // SCK
        p.PB5,      // MOSI
        p.DMA1_CH3, // TX DMA
        spi_config,
    );
    let spi_bus = DISPLAY_SPI_BUS.init(Mutex::new(spi_bus));

    let dc = Output::new(p.PC14, Level::Low, Speed::High);
    let rst = Output::new(p.PC15, Level::High, Speed::High);
    let cs = Output::new(p.PA15, Level::High, Speed::High);

    let interface = SpiInterface::new(SpiDevice::new(spi_bus, cs), dc);
    let buffer = FRAMEBUFFER.init([0; WIDTH as usize * HEIGHT as usize / 8]);

    let mut display = Sh110x::<_, _, EmbassyTimer>::new(
        DisplayConfig::sh1107(WIDTH, HEIGHT),
        interface,
        Some(rst),
        buffer,
    );

    if let Err(_e) = display.begin(true).await {
        error!("Display initialization failed");
        return;
    }
    info!("Display initialized");

    let mut rotation = Rotation::Deg0;
    loop {
        display.set_rotation(rotation);
        let (width, height) = display.dimensions();
        info!("Rotation {}°: {}x{}", rotation.degrees(), width, height);

        display.clear_buffer();
        let _ = Rectangle::new(Point::zero(), Size::new(width as u32, height as u32))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut display);
        let _ = Circle::with_center(Point::new(width as i32 / 2, height as i32 / 2), 40)
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 2))
            .draw(&mut display);
        display.blit(width as i32 / 2 - 4, 4, &ARROW, 8, 8, Color::On);

        if let Err(_e) = display.display().await {
            error!("Flush failed");
        }
        embassy_time::Timer::after_secs(2).await;

        // Only the arrow's window goes out on this flush
        display.blit(width as i32 / 2 - 4, 4, &ARROW, 8, 8, Color::Invert);
        let _ = display.display().await;
        embassy_time::Timer::after_millis(500).await;

        rotation = rotation.next();
    }
}
