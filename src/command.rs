//! SH110X controller operations.
//!
//! Every operation the driver issues is a [`Command`] value; the opcode table
//! only exists inside [`Command::encode`].

/// Largest encoded command list the driver builds in one go.
pub const LIST_CAPACITY: usize = 32;

/// Addressing mode of the display RAM pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressMode {
    /// Column pointer auto-increments within a page (20h)
    Page,
    /// Page pointer auto-increments within a column (21h)
    Vertical,
}

/// Controller operations with their argument shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Display On/Off (AEh/AFh) - Panel output enable
    DisplayOn(bool),
    /// Contrast Control (81h) - 1 argument byte
    Contrast(u8),
    /// Memory Addressing Mode (20h/21h)
    AddressMode(AddressMode),
    /// DC-DC Control (ADh) - Internal charge pump setting, 1 argument byte
    DcDc(u8),
    /// Pump Voltage (30h-33h) - SH1106 charge pump output level, 0..=3
    PumpVoltage(u8),
    /// Segment Remap (A0h/A1h) - Mirror columns when set
    SegmentRemap(bool),
    /// COM Scan Direction (C0h/C8h) - Reverse row scan when set
    ReverseComScan(bool),
    /// Display Start Line (DCh) - SH1107 form, 1 argument byte
    DisplayStartLine(u8),
    /// Start Line (40h-7Fh) - SH1106 form, 0..=63
    StartLine(u8),
    /// Display Offset (D3h) - 1 argument byte
    DisplayOffset(u8),
    /// Display Clock Divide Ratio / Oscillator Frequency (D5h) - 1 argument byte
    ClockDivider(u8),
    /// Pre-charge Period (D9h) - 1 argument byte
    PrechargePeriod(u8),
    /// VCOM Deselect Level (DBh) - 1 argument byte
    VcomDetect(u8),
    /// Multiplex Ratio (A8h) - Number of driven rows minus one
    Multiplex(u8),
    /// COM Pins Hardware Configuration (DAh) - 1 argument byte
    ComPins(u8),
    /// Entire Display On (A4h/A5h) - `false` resumes RAM content
    AllPixelsOn(bool),
    /// Normal/Reverse Display (A6h/A7h)
    Invert(bool),
    /// Page Address (B0h-BFh) - Page pointer for the next data bytes
    PageAddress(u8),
    /// Column Address (00h-0Fh, 10h-17h) - Low and high nibble
    ColumnAddress(u8),
}

impl Command {
    /// Encode the operation as opcode plus argument bytes.
    ///
    /// Returns the scratch array and how many of its bytes are used.
    pub fn encode(self) -> ([u8; 2], usize) {
        match self {
            Command::DisplayOn(on) => ([0xAE | on as u8, 0], 1),
            Command::Contrast(level) => ([0x81, level], 2),
            Command::AddressMode(AddressMode::Page) => ([0x20, 0], 1),
            Command::AddressMode(AddressMode::Vertical) => ([0x21, 0], 1),
            Command::DcDc(setting) => ([0xAD, setting], 2),
            Command::PumpVoltage(level) => ([0x30 | (level & 0x03), 0], 1),
            Command::SegmentRemap(remap) => ([0xA0 | remap as u8, 0], 1),
            Command::ReverseComScan(reverse) => ([if reverse { 0xC8 } else { 0xC0 }, 0], 1),
            Command::DisplayStartLine(line) => ([0xDC, line], 2),
            Command::StartLine(line) => ([0x40 | (line & 0x3F), 0], 1),
            Command::DisplayOffset(offset) => ([0xD3, offset], 2),
            Command::ClockDivider(ratio) => ([0xD5, ratio], 2),
            Command::PrechargePeriod(period) => ([0xD9, period], 2),
            Command::VcomDetect(level) => ([0xDB, level], 2),
            Command::Multiplex(ratio) => ([0xA8, ratio], 2),
            Command::ComPins(config) => ([0xDA, config], 2),
            Command::AllPixelsOn(on) => ([0xA4 | on as u8, 0], 1),
            Command::Invert(inverted) => ([0xA6 | inverted as u8, 0], 1),
            Command::PageAddress(page) => ([0xB0 | (page & 0x0F), 0], 1),
            Command::ColumnAddress(column) => ([0x10 | (column >> 4), column & 0x0F], 2),
        }
    }
}

/// A run of encoded commands, sent back to back in one command stream.
#[derive(Clone)]
pub struct CommandList {
    bytes: [u8; LIST_CAPACITY],
    len: usize,
}

impl CommandList {
    /// Encode `commands` in order.
    ///
    /// Every command is at most two bytes, so the array length is checked
    /// against [`LIST_CAPACITY`] at compile time.
    pub fn new<const N: usize>(commands: [Command; N]) -> Self {
        const { assert!(N * 2 <= LIST_CAPACITY) };

        let mut bytes = [0u8; LIST_CAPACITY];
        let mut len = 0;
        for command in commands {
            let (encoded, n) = command.encode();
            bytes[len..len + n].copy_from_slice(&encoded[..n]);
            len += n;
        }
        Self { bytes, len }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
