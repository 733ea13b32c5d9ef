//! # Printer Protocol Layer
//!
//! Binary command builders for the two opcode families lucero targets:
//!
//! - [`starprnt`]: Star line mode / StarPRNT commands (Star Micronics
//!   thermal and impact printers)
//! - [`escpos`]: ESC/POS commands (Epson-compatible printers and the Star
//!   mobile printers running ESC/POS emulation)
//!
//! The [`CommandSet`] trait is the seam between the command compiler and
//! the opcode families: the compiler works entirely in terms of protocol
//! enums and trait calls, and the selected emulation decides which set of
//! bytes comes out the other end.
//!
//! ## Escape Sequence Structure
//!
//! Both families are escape-sequence protocols. Commands are byte
//! sequences introduced by control characters (`ESC`, `GS`, `RS`), with
//! multi-byte integers encoded **little-endian**: a `u16` value 0x1234 is
//! sent as `[0x34, 0x12]`.

use crate::raster::BitRaster;

pub mod escpos;
pub mod starprnt;

pub use escpos::EscPosCommands;
pub use starprnt::StarLineCommands;

// ============================================================================
// CONTROL BYTES
// ============================================================================

/// ESC (Escape) - command prefix byte
pub const ESC: u8 = 0x1B;

/// GS (Group Separator) - extended command prefix
pub const GS: u8 = 0x1D;

/// RS (Record Separator) - configuration command prefix / terminator
pub const RS: u8 = 0x1E;

/// FS (File Separator) - NV image commands (ESC/POS)
pub const FS: u8 = 0x1C;

/// LF (Line Feed) - print and advance one line
pub const LF: u8 = 0x0A;

/// HT (Horizontal Tab) - advance to next tab position
pub const HT: u8 = 0x09;

/// Encode a u16 value as little-endian bytes [low, high]
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// PROTOCOL ENUMERATIONS
// ============================================================================

/// Character font selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    /// Font A: 12×24 dots (the wider receipt font)
    #[default]
    A = 0,
    /// Font B: 9×24 dots (more columns per line)
    B = 1,
}

/// Text alignment positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left = 0,
    Center = 1,
    Right = 2,
}

/// Paper cut actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutAction {
    /// Full cut at the current position
    FullCut,
    /// Feed to the cutter position, then full cut
    FullCutWithFeed,
    /// Partial cut (leaves a hinge) at the current position
    PartialCut,
    /// Feed to the cutter position, then partial cut
    #[default]
    PartialCutWithFeed,
}

/// Peripheral (cash drawer) drive channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeripheralChannel {
    #[default]
    No1 = 1,
    No2 = 2,
}

/// Black mark detection mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlackMarkMode {
    /// Black mark detection enabled
    #[default]
    Valid = 1,
    /// Black mark detection disabled
    Invalid = 0,
    /// Detection enabled and a mark is sought immediately
    ValidWithDetection = 2,
}

/// NV logo print magnification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogoSize {
    #[default]
    Normal,
    DoubleWidth,
    DoubleHeight,
    DoubleWidthDoubleHeight,
}

impl LogoSize {
    /// Horizontal and vertical scale factors (1 or 2 each).
    pub fn scale(&self) -> (u8, u8) {
        match self {
            LogoSize::Normal => (1, 1),
            LogoSize::DoubleWidth => (2, 1),
            LogoSize::DoubleHeight => (1, 2),
            LogoSize::DoubleWidthDoubleHeight => (2, 2),
        }
    }
}

/// International character set (ESC R n)
///
/// Selects which national variant replaces the dozen code points that
/// differ between regions (#, $, @, brackets, tilde...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InternationalSet {
    #[default]
    Usa = 0,
    France = 1,
    Germany = 2,
    Uk = 3,
    Denmark = 4,
    Sweden = 5,
    Italy = 6,
    Spain = 7,
    Japan = 8,
    Norway = 9,
    Denmark2 = 10,
    Spain2 = 11,
    LatinAmerica = 12,
    Korea = 13,
    Ireland = 14,
    Legal = 15,
}

/// 1D barcode symbology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarcodeSymbology {
    /// UPC-E (6 digits, compressed UPC-A)
    UpcE,
    /// UPC-A (12 digits)
    UpcA,
    /// JAN-8 / EAN-8 (8 digits)
    Jan8,
    /// JAN-13 / EAN-13 (13 digits)
    Jan13,
    /// Code39 (A-Z, 0-9, space, -.$/%+)
    Code39,
    /// ITF (Interleaved 2 of 5, numeric pairs)
    Itf,
    /// Code128 (full ASCII, high density)
    #[default]
    Code128,
    /// Code93 (full ASCII, more compact than Code39)
    Code93,
    /// NW-7 / Codabar
    Nw7,
}

/// Barcode module width mode (narrow bar width selection)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarcodeWidth {
    Mode1 = 1,
    #[default]
    Mode2 = 2,
    Mode3 = 3,
    Mode4 = 4,
    Mode5 = 5,
    Mode6 = 6,
    Mode7 = 7,
    Mode8 = 8,
    Mode9 = 9,
}

/// Device code page (byte → glyph mapping selected on the printer).
///
/// The device-side identifier differs between the Star and ESC/POS
/// families; each [`CommandSet`] owns its own mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub enum CodePage {
    Cp437,
    Cp737,
    Cp772,
    Cp774,
    Cp851,
    Cp852,
    Cp855,
    Cp857,
    Cp858,
    Cp860,
    Cp861,
    Cp862,
    Cp863,
    Cp864,
    Cp865,
    Cp869,
    Cp874,
    Cp928,
    Cp932,
    /// The printer's hardware-default page
    #[default]
    Cp998,
    Cp999,
    Cp1001,
    Cp1250,
    Cp1251,
    Cp1252,
    Cp2001,
    Cp3001,
    Cp3002,
    Cp3011,
    Cp3012,
    Cp3021,
    Cp3041,
    Cp3840,
    Cp3841,
    Cp3843,
    Cp3845,
    Cp3846,
    Cp3847,
    Cp3848,
    Utf8,
    Blank,
}

// ============================================================================
// COMMAND SET TRAIT
// ============================================================================

/// One opcode family's command builders.
///
/// Every method returns the exact bytes for one device command; the
/// compiler concatenates them in descriptor order. Implementations must be
/// pure: same inputs, same bytes.
pub trait CommandSet: Sync {
    /// Initialize the printer to its power-on default state.
    fn initialize(&self) -> Vec<u8>;

    /// Set the spacing between characters, in dots.
    fn character_space(&self, dots: u8) -> Vec<u8>;

    /// Select a device code page.
    fn code_page(&self, page: CodePage) -> Vec<u8>;

    /// Select an international character set.
    fn international(&self, set: InternationalSet) -> Vec<u8>;

    /// Enable or disable emphasized (bold) printing.
    fn emphasis(&self, enabled: bool) -> Vec<u8>;

    /// Enable or disable inverted (white-on-black) printing.
    fn invert(&self, enabled: bool) -> Vec<u8>;

    /// Enable or disable underlined printing.
    fn underline(&self, enabled: bool) -> Vec<u8>;

    /// Select the character font.
    fn font_style(&self, font: FontStyle) -> Vec<u8>;

    /// Set character magnification. `width`/`height` are 1-based
    /// multipliers (1 = normal); implementations clamp to their range.
    fn magnification(&self, width: u8, height: u8) -> Vec<u8>;

    /// Print and feed `lines` lines.
    fn line_feed(&self, lines: u8) -> Vec<u8>;

    /// Feed paper by `units` device motion units.
    fn unit_feed(&self, units: u8) -> Vec<u8>;

    /// Set the line spacing, in dots.
    fn line_space(&self, dots: u8) -> Vec<u8>;

    /// Cut the paper.
    fn cut(&self, action: CutAction) -> Vec<u8>;

    /// Fire a peripheral (cash drawer) channel.
    fn peripheral(&self, channel: PeripheralChannel) -> Vec<u8>;

    /// Configure black mark detection.
    fn black_mark(&self, mode: BlackMarkMode) -> Vec<u8>;

    /// Move the print position to an absolute dot offset.
    fn absolute_position(&self, position: u16) -> Vec<u8>;

    /// Set line alignment.
    fn alignment(&self, position: Alignment) -> Vec<u8>;

    /// Set horizontal tab stops (column numbers, applied verbatim).
    fn tab_positions(&self, stops: &[u8]) -> Vec<u8>;

    /// Print a logo stored in the device's non-volatile memory.
    fn logo(&self, number: u8, size: LogoSize) -> Vec<u8>;

    /// Print a 1D barcode. `data` has already been encoded by the caller.
    fn barcode(
        &self,
        data: &[u8],
        symbology: BarcodeSymbology,
        width: BarcodeWidth,
        height: u8,
        hri: bool,
    ) -> Vec<u8>;

    /// Print a packed monochrome raster.
    fn raster(&self, raster: &BitRaster) -> Vec<u8>;
}

// ============================================================================
// TESTS
// ============================================================================
