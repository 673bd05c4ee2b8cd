use crate::command::{AddressMode, Command, CommandList};
use crate::framebuffer::Geometry;
use crate::rotation::Rotation;

/// Controller family member driving the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Variant {
    /// SH1107: 128 columns × 16 pages
    Sh1107,
    /// SH1106G: 132-column RAM, 128 visible columns starting at column 2, 8 pages
    Sh1106,
}

impl Variant {
    /// Largest panel `(width, height)` the controller can drive
    pub fn max_dimensions(self) -> (u16, u16) {
        match self {
            Variant::Sh1107 => (128, 128),
            Variant::Sh1106 => (128, 64),
        }
    }

    /// RAM column holding the first visible pixel column
    pub fn column_offset(self) -> u8 {
        match self {
            Variant::Sh1107 => 0,
            Variant::Sh1106 => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub variant: Variant,
    /// Physical width in pixels (columns)
    pub width: u16,
    /// Physical height in pixels (8 rows per page)
    pub height: u16,
    /// Orientation applied at construction
    pub rotation: Rotation,
}

impl Default for Config {
    /// 64×128 SH1107 FeatherWing panel
    fn default() -> Self {
        Self::sh1107(64, 128)
    }
}

impl Config {
    pub fn sh1107(width: u16, height: u16) -> Self {
        Self {
            variant: Variant::Sh1107,
            width,
            height,
            rotation: Rotation::Deg0,
        }
    }

    pub fn sh1106(width: u16, height: u16) -> Self {
        Self {
            variant: Variant::Sh1106,
            width,
            height,
            rotation: Rotation::Deg0,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Validated panel size, `None` if the variant cannot drive it
    pub fn geometry(&self) -> Option<Geometry> {
        let (max_width, max_height) = self.variant.max_dimensions();
        if self.width > max_width || self.height > max_height {
            return None;
        }
        Geometry::new(self.width, self.height)
    }

    /// Bring-up commands sent between reset and display-on.
    ///
    /// Expects a geometry already accepted by [`Config::geometry`].
    pub fn init_sequence(&self) -> CommandList {
        match self.variant {
            Variant::Sh1107 => CommandList::new([
                Command::DisplayOn(false),
                Command::ClockDivider(0x51),
                Command::AddressMode(AddressMode::Page),
                Command::Contrast(0x4F),
                Command::DcDc(0x8A),
                Command::SegmentRemap(false),
                Command::ReverseComScan(false),
                Command::DisplayStartLine(0x00),
                // The 64-column FeatherWing glass sits at COM 96
                Command::DisplayOffset(if self.width == 64 { 0x60 } else { 0x00 }),
                Command::PrechargePeriod(0x22),
                Command::VcomDetect(0x35),
                Command::Multiplex((self.width - 1) as u8),
                Command::AllPixelsOn(false),
                Command::Invert(false),
            ]),
            Variant::Sh1106 => CommandList::new([
                Command::DisplayOn(false),
                Command::ClockDivider(0x80),
                Command::Multiplex((self.height - 1) as u8),
                Command::DisplayOffset(0x00),
                Command::StartLine(0),
                Command::DcDc(0x8B),
                Command::SegmentRemap(true),
                Command::ReverseComScan(true),
                Command::ComPins(0x12),
                Command::Contrast(0xFF),
                Command::PrechargePeriod(0x1F),
                Command::VcomDetect(0x40),
                // 9V
                Command::PumpVoltage(3),
                Command::Invert(false),
                Command::AllPixelsOn(false),
            ]),
        }
    }
}
