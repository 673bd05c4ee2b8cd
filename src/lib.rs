//! SH110X (SH1106 / SH1107) monochrome OLED driver based on embedded-hal.
//!
//! Drawing goes into a page-layout framebuffer owned by the driver; only the
//! window touched since the last [`Sh110x::display`] call is sent to the
//! controller. The driver implements `DrawTarget<Color = BinaryColor>`, so
//! embedded-graphics primitives can draw into it directly.
#![no_std]

#[cfg(test)]
extern crate std;

use core::convert::Infallible;
use core::marker::PhantomData;

use embedded_graphics_core::Pixel;
use embedded_graphics_core::draw_target::DrawTarget;
use embedded_graphics_core::geometry::{OriginDimensions, Size};
use embedded_graphics_core::pixelcolor::BinaryColor;
use embedded_hal::digital::{ErrorType, OutputPin};

pub mod command;
pub mod config;
pub mod framebuffer;
pub mod interface;
pub mod rotation;
pub mod sequencer;

pub use command::{AddressMode, Command, CommandList};
pub use config::{Config, Variant};
pub use framebuffer::{Color, DirtyRegion, Framebuffer, Geometry};
pub use interface::{
    ALTERNATE_I2C_ADDRESS, DEFAULT_I2C_ADDRESS, I2cInterface, Interface, SpiInterface,
};
pub use rotation::Rotation;

use sequencer::{send_commands, send_data};

// Reset pulse: idle high, low, high again, 10 ms each
const RESET_PULSE_MS: u64 = 10;
// Settle time between the init list and display-on
const INIT_SETTLE_MS: u64 = 100;

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E = ()> {
    /// Communication error
    Comm(E),
    /// Pin setting error
    Pin,
    /// Framebuffer storage missing or smaller than the panel needs
    Allocation,
    /// Panel size not supported by the configured controller
    InvalidGeometry,
    /// Operation not valid in the current power state
    InvalidState,
}

/// Controller power state, advanced by [`Sh110x::begin`] and [`Sh110x::display_on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerState {
    Uninitialized,
    Resetting,
    Configuring,
    On,
    Off,
}

/// Reset pin placeholder for modules whose reset line is not wired.
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub struct Sh110x<'b, DI, RST, TIMER> {
    interface: DI,
    rst: Option<RST>,
    config: Config,
    storage: Option<&'b mut [u8]>,
    framebuffer: Option<Framebuffer<'b>>,
    rotation: Rotation,
    state: PowerState,
    _timer: PhantomData<TIMER>,
}

impl<'b, DI, RST, TIMER> Sh110x<'b, DI, RST, TIMER> {
    /// Create the driver. Nothing is sent and `buffer` is not touched until
    /// [`begin`](Self::begin); it must hold at least
    /// [`Geometry::buffer_len`] bytes.
    pub fn new(config: Config, interface: DI, rst: Option<RST>, buffer: &'b mut [u8]) -> Self {
        Self {
            interface,
            rst,
            config,
            storage: Some(buffer),
            framebuffer: None,
            rotation: config.rotation,
            state: PowerState::Uninitialized,
            _timer: PhantomData,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn power_state(&self) -> PowerState {
        self.state
    }

    /// Set the current rotation. The framebuffer layout is unaffected; only
    /// later drawing calls are mapped differently.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        #[cfg(feature = "defmt")]
        defmt::debug!("sh110x: rotation {=u16} degrees", rotation.degrees());
        self.rotation = rotation;
    }

    /// Get current rotation
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Get logical screen dimensions (after rotation)
    pub fn dimensions(&self) -> (u16, u16) {
        self.rotation
            .logical_dimensions(self.config.width, self.config.height)
    }

    /// Set, clear or flip one pixel in logical coordinates.
    ///
    /// Points outside the logical surface are ignored, as are all writes
    /// before [`begin`](Self::begin) has bound the framebuffer.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        let Some(framebuffer) = self.framebuffer.as_mut() else {
            return;
        };
        let geometry = framebuffer.geometry();
        if let Some((px, py)) = self
            .rotation
            .transform(x, y, geometry.width(), geometry.height())
        {
            framebuffer.set_pixel(px, py, color);
        }
    }

    /// Pixel state in logical coordinates
    pub fn get_pixel(&self, x: i32, y: i32) -> bool {
        let Some(framebuffer) = self.framebuffer.as_ref() else {
            return false;
        };
        let geometry = framebuffer.geometry();
        self.rotation
            .transform(x, y, geometry.width(), geometry.height())
            .is_some_and(|(px, py)| framebuffer.pixel(px, py))
    }

    /// Draw a 1-bit bitmap with its top-left corner at `(x, y)`.
    ///
    /// Rows are packed MSB-first and padded to whole bytes. Set bits are drawn
    /// with `color`, clear bits leave the framebuffer alone. Parts falling off
    /// the surface are clipped.
    pub fn blit(&mut self, x: i32, y: i32, bitmap: &[u8], width: u16, height: u16, color: Color) {
        let stride = width.div_ceil(8) as usize;
        for row in 0..height {
            for col in 0..width {
                let Some(bits) = bitmap.get(row as usize * stride + col as usize / 8) else {
                    return;
                };
                if bits & (0x80 >> (col % 8)) == 0 {
                    continue;
                }
                // Origins near the i32 limits land off the surface
                let px = x.checked_add(i32::from(col));
                let py = y.checked_add(i32::from(row));
                if let (Some(px), Some(py)) = (px, py) {
                    self.set_pixel(px, py, color);
                }
            }
        }
    }

    /// Blank the framebuffer and schedule a full retransmission.
    pub fn clear_buffer(&mut self) {
        if let Some(framebuffer) = self.framebuffer.as_mut() {
            framebuffer.clear();
        }
    }

    /// Raw page-layout framebuffer, `None` before [`begin`](Self::begin)
    pub fn buffer(&self) -> Option<&[u8]> {
        self.framebuffer.as_ref().map(Framebuffer::as_bytes)
    }

    /// Window waiting for the next [`display`](Self::display)
    pub fn dirty_region(&self) -> Option<DirtyRegion> {
        self.framebuffer
            .as_ref()
            .and_then(Framebuffer::dirty_region)
    }

    pub fn release(self) -> (DI, Option<RST>) {
        (self.interface, self.rst)
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "Sh110x",),
    async(feature = "async", keep_self)
)]
impl<'b, DI, RST, E, TIMER> Sh110x<'b, DI, RST, TIMER>
where
    DI: Interface<Error = E>,
    RST: OutputPin,
    TIMER: Timer,
{
    /// Bring the controller from power-on to a lit panel.
    ///
    /// With `reset` set and a reset pin configured, the panel is pulsed
    /// first. The framebuffer is bound on the first call. A bus failure
    /// leaves the driver in [`PowerState::Configuring`] and `begin` may be
    /// called again.
    pub async fn begin(&mut self, reset: bool) -> Result<(), Error<E>> {
        if !matches!(
            self.state,
            PowerState::Uninitialized | PowerState::Configuring
        ) {
            return Err(Error::InvalidState);
        }
        let geometry = self.config.geometry().ok_or(Error::InvalidGeometry)?;

        if reset && self.rst.is_some() && self.state == PowerState::Uninitialized {
            self.state = PowerState::Resetting;
            if let Err(e) = self.hardware_reset().await {
                self.state = PowerState::Uninitialized;
                return Err(e);
            }
        }
        self.state = PowerState::Configuring;

        self.allocate(geometry)?;

        let init = self.config.init_sequence();
        #[cfg(feature = "defmt")]
        defmt::debug!("sh110x: sending {=usize} init bytes", init.len());
        send_commands(&mut self.interface, init.as_bytes()).await?;

        TIMER::delay_ms(INIT_SETTLE_MS).await;
        self.command(Command::DisplayOn(true)).await?;
        self.state = PowerState::On;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "sh110x: {}x{} panel on",
            self.config.width,
            self.config.height
        );
        Ok(())
    }

    async fn hardware_reset(&mut self) -> Result<(), Error<E>> {
        let Some(rst) = self.rst.as_mut() else {
            return Ok(());
        };
        #[cfg(feature = "defmt")]
        defmt::debug!("sh110x: hardware reset");

        rst.set_high().map_err(|_| Error::Pin)?;
        TIMER::delay_ms(RESET_PULSE_MS).await;
        rst.set_low().map_err(|_| Error::Pin)?;
        TIMER::delay_ms(RESET_PULSE_MS).await;
        rst.set_high().map_err(|_| Error::Pin)?;
        TIMER::delay_ms(RESET_PULSE_MS).await; // Wait for reset to complete
        Ok(())
    }

    fn allocate(&mut self, geometry: Geometry) -> Result<(), Error<E>> {
        if self.framebuffer.is_some() {
            return Ok(());
        }
        let framebuffer = self
            .storage
            .take()
            .and_then(|storage| Framebuffer::new(geometry, storage));
        match framebuffer {
            Some(framebuffer) => {
                self.framebuffer = Some(framebuffer);
                Ok(())
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::error!(
                    "sh110x: framebuffer needs {=usize} bytes",
                    geometry.buffer_len()
                );
                Err(Error::Allocation)
            }
        }
    }

    /// Push the dirty window to the controller RAM.
    ///
    /// Pages are written top to bottom, each preceded by its page and column
    /// address. The window is cleared only after every page went out; on a
    /// bus error it is kept so the next call resends it in full.
    pub async fn display(&mut self) -> Result<(), Error<E>> {
        let Some(region) = self.dirty_region() else {
            return Ok(());
        };
        #[cfg(feature = "defmt")]
        defmt::trace!("sh110x: flush {}", region);

        if let Err(e) = self.write_window(region).await {
            #[cfg(feature = "defmt")]
            defmt::warn!("sh110x: flush failed, window kept");
            return Err(e);
        }
        if let Some(framebuffer) = self.framebuffer.as_mut() {
            framebuffer.mark_clean();
        }
        Ok(())
    }

    async fn write_window(&mut self, region: DirtyRegion) -> Result<(), Error<E>> {
        let Some(framebuffer) = self.framebuffer.as_ref() else {
            return Ok(());
        };
        let column = region.min_column + self.config.variant.column_offset();

        for page in region.min_page..=region.max_page {
            let addressing =
                CommandList::new([Command::PageAddress(page), Command::ColumnAddress(column)]);
            send_commands(&mut self.interface, addressing.as_bytes()).await?;
            send_data(
                &mut self.interface,
                framebuffer.page_run(page, region.min_column, region.max_column),
            )
            .await?;
        }
        Ok(())
    }

    /// Switch the panel output on or off. RAM content is kept while off.
    pub async fn display_on(&mut self, on: bool) -> Result<(), Error<E>> {
        if !matches!(self.state, PowerState::On | PowerState::Off) {
            return Err(Error::InvalidState);
        }
        self.command(Command::DisplayOn(on)).await?;
        self.state = if on { PowerState::On } else { PowerState::Off };
        Ok(())
    }

    pub async fn set_contrast(&mut self, level: u8) -> Result<(), Error<E>> {
        self.command(Command::Contrast(level)).await
    }

    /// Swap lit and dark pixels in hardware, without touching the framebuffer
    pub async fn invert_display(&mut self, invert: bool) -> Result<(), Error<E>> {
        self.command(Command::Invert(invert)).await
    }

    /// Send a single controller command
    pub async fn command(&mut self, command: Command) -> Result<(), Error<E>> {
        let (bytes, len) = command.encode();
        send_commands(&mut self.interface, &bytes[..len]).await
    }
}

impl<DI, RST, TIMER> OriginDimensions for Sh110x<'_, DI, RST, TIMER> {
    fn size(&self) -> Size {
        let (width, height) = self.dimensions();
        Size::new(width as u32, height as u32)
    }
}

impl<DI, RST, TIMER> DrawTarget for Sh110x<'_, DI, RST, TIMER> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color.is_on().into());
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        if let Some(framebuffer) = self.framebuffer.as_mut() {
            framebuffer.fill(color.is_on());
        }
        Ok(())
    }
}

#[maybe_async_cfg::maybe(
    sync(cfg(not(feature = "async")), self = "Timer",),
    async(feature = "async", keep_self)
)]
/// Simplified timer trait for delay operations.
pub trait Timer {
    /// Delay for the specified number of milliseconds.
    async fn delay_ms(milliseconds: u64);
}

/// [`Timer`] backed by the embassy time driver.
#[cfg(feature = "embassy-time")]
pub struct EmbassyTimer;

#[cfg(feature = "embassy-time")]
impl Timer for EmbassyTimer {
    async fn delay_ms(milliseconds: u64) {
        embassy_time::Timer::after_millis(milliseconds).await;
    }
}
