//! # Star Line Mode Commands
//!
//! Command builders for the Star line mode protocol spoken by Star
//! Micronics thermal and dot-impact receipt printers (TSP650II, TSP700II,
//! SP700, the portable SM series in StarPRNT emulation, ...).
//!
//! ## Protocol Overview
//!
//! Star line mode is an ESC/POS-like protocol where commands are byte
//! sequences starting with escape characters:
//!
//! - Single byte: `LF`, `HT`, `BEL`
//! - Two bytes: `ESC @`, `ESC E`, `ESC F`
//! - Multi-byte with parameters: `ESC d n`, `ESC b n1 n2 n3 n4 data RS`
//!
//! Multi-byte integers use **little-endian** encoding.
//!
//! ## Reference
//!
//! Based on "StarPRNT Command Specifications Rev. 4.10" by
//! Star Micronics Co., Ltd.

use super::{
    Alignment, BarcodeSymbology, BarcodeWidth, BlackMarkMode, CodePage, CommandSet, CutAction,
    ESC, FontStyle, GS, InternationalSet, LogoSize, PeripheralChannel, RS, u16_le,
};
use crate::raster::BitRaster;

/// Maximum raster rows per ESC GS S command. Large images are split so a
/// slow transport cannot overflow the printer's receive buffer.
const RASTER_CHUNK_ROWS: usize = 256;

// ============================================================================
// PRINTER CONTROL
// ============================================================================

/// Initialize printer (ESC @). Clears the line buffer and resets text
/// formatting to power-on defaults; NV graphics and configuration survive.
///
/// | Format | Bytes |
/// |--------|-------|
/// | ASCII  | ESC @ |
/// | Hex    | 1B 40 |
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Cut Paper (ESC d n)
///
/// | n | Action |
/// |---|--------|
/// | 0 | Full cut at current position |
/// | 1 | Partial cut at current position |
/// | 2 | Feed to cutter position, full cut |
/// | 3 | Feed to cutter position, partial cut |
///
/// StarPRNT Command Spec Rev 4.10, Section 2.3.9
#[inline]
pub fn cut(action: CutAction) -> Vec<u8> {
    let n = match action {
        CutAction::FullCut => 0,
        CutAction::PartialCut => 1,
        CutAction::FullCutWithFeed => 2,
        CutAction::PartialCutWithFeed => 3,
    };
    vec![ESC, b'd', n]
}

/// Print and feed n lines (ESC a n).
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'a', n]
}

/// Feed paper by n motion units (ESC J n).
#[inline]
pub fn feed_units(n: u8) -> Vec<u8> {
    vec![ESC, b'J', n]
}

/// Set line spacing to n dots (ESC z n).
#[inline]
pub fn line_space(n: u8) -> Vec<u8> {
    vec![ESC, b'z', n]
}

/// Set character spacing to n dots (ESC SP n).
#[inline]
pub fn character_space(n: u8) -> Vec<u8> {
    vec![ESC, b' ', n]
}

/// # Drive Peripheral Unit
///
/// Star printers fire external devices (cash drawers) with bare control
/// bytes: BEL (0x07) pulses channel 1, SUB (0x1A) pulses channel 2.
///
/// StarPRNT Command Spec Rev 4.10, Section 2.3.10
#[inline]
pub fn peripheral(channel: PeripheralChannel) -> Vec<u8> {
    match channel {
        PeripheralChannel::No1 => vec![0x07],
        PeripheralChannel::No2 => vec![0x1A],
    }
}

/// Black mark control (ESC GS # n). n selects detection off / on /
/// on-with-immediate-seek.
#[inline]
pub fn black_mark(mode: BlackMarkMode) -> Vec<u8> {
    vec![ESC, GS, b'#', mode as u8]
}

// ============================================================================
// TEXT STYLING
// ============================================================================

/// Enable emphasis (ESC E) / disable emphasis (ESC F).
#[inline]
pub fn emphasis(enabled: bool) -> Vec<u8> {
    if enabled {
        vec![ESC, b'E']
    } else {
        vec![ESC, b'F']
    }
}

/// Enable inverted printing (ESC 4) / disable (ESC 5).
#[inline]
pub fn invert(enabled: bool) -> Vec<u8> {
    if enabled {
        vec![ESC, b'4']
    } else {
        vec![ESC, b'5']
    }
}

/// # Set Underline Mode (ESC - n)
///
/// `n = 1` underlines subsequent text; `n = 0` turns it off. Underline
/// does not affect spaces or horizontal tabs.
///
/// StarPRNT Command Spec Rev 4.10, Section 2.3.3
#[inline]
pub fn underline(enabled: bool) -> Vec<u8> {
    vec![ESC, b'-', enabled as u8]
}

/// # Select Font (ESC RS F n)
///
/// | Font | Char size | Columns (72mm) |
/// |------|-----------|----------------|
/// | A | 12×24 dots | 48 |
/// | B | 9×24 dots | 64 |
///
/// StarPRNT Command Spec Rev 4.10, Section 2.3.1
#[inline]
pub fn font(f: FontStyle) -> Vec<u8> {
    vec![ESC, RS, b'F', f as u8]
}

/// # Set Character Expansion (ESC i n1 n2)
///
/// `n1` is the vertical and `n2` the horizontal multiplier, both
/// zero-based (0 = 1×, 1 = 2×, ... up to 7 = 8×).
///
/// StarPRNT Command Spec Rev 4.10, Section 2.3.3
pub fn expansion(height_mult: u8, width_mult: u8) -> Vec<u8> {
    vec![ESC, b'i', height_mult.min(7), width_mult.min(7)]
}

/// # Set Code Page (ESC GS t n)
///
/// Selects the byte-to-glyph mapping for subsequent single-byte text.
///
/// StarPRNT Command Spec Rev 4.10, Section 2.3.2
#[inline]
pub fn code_page(n: u8) -> Vec<u8> {
    vec![ESC, GS, b't', n]
}

/// Select international character set (ESC R n).
#[inline]
pub fn international(set: InternationalSet) -> Vec<u8> {
    vec![ESC, b'R', set as u8]
}

// ============================================================================
// POSITIONING
// ============================================================================

/// # Set Absolute Print Position (ESC GS A n1 n2)
///
/// Moves the horizontal print position to `position` dots from the left
/// margin, little-endian encoded.
///
/// StarPRNT Command Spec Rev 4.10, Section 2.3.4
pub fn absolute_position(position: u16) -> Vec<u8> {
    let [n1, n2] = u16_le(position);
    vec![ESC, GS, b'A', n1, n2]
}

/// # Set Alignment (ESC GS a n)
///
/// 0 = left, 1 = center, 2 = right. Takes effect at the start of the next
/// line; reset by ESC @.
///
/// StarPRNT Command Spec Rev 4.10, Section 2.3.4
#[inline]
pub fn alignment(position: Alignment) -> Vec<u8> {
    vec![ESC, GS, b'a', position as u8]
}

/// # Set Horizontal Tab Positions (ESC D n1 .. nk NUL)
///
/// Stops are column numbers, applied in the order given. An empty list
/// clears all stops.
pub fn tab_positions(stops: &[u8]) -> Vec<u8> {
    let mut cmd = Vec::with_capacity(3 + stops.len());
    cmd.push(ESC);
    cmd.push(b'D');
    cmd.extend_from_slice(stops);
    cmd.push(0x00);
    cmd
}

// ============================================================================
// BARCODES
// ============================================================================

/// # Print 1D Barcode (ESC b n1 n2 n3 n4 data RS)
///
/// | Param | Meaning |
/// |-------|---------|
/// | n1 | Symbology ('0'..'8') |
/// | n2 | HRI mode: '1' = none, '2' = under (Font A), line feed executed |
/// | n3 | Width mode: '0' + mode number |
/// | n4 | Height in dots |
///
/// StarPRNT Command Spec Rev 4.10, Section 2.3.14
pub fn barcode(
    data: &[u8],
    symbology: BarcodeSymbology,
    width: BarcodeWidth,
    height: u8,
    hri: bool,
) -> Vec<u8> {
    let n1 = match symbology {
        BarcodeSymbology::UpcE => b'0',
        BarcodeSymbology::UpcA => b'1',
        BarcodeSymbology::Jan8 => b'2',
        BarcodeSymbology::Jan13 => b'3',
        BarcodeSymbology::Code39 => b'4',
        BarcodeSymbology::Itf => b'5',
        BarcodeSymbology::Code128 => b'6',
        BarcodeSymbology::Code93 => b'7',
        BarcodeSymbology::Nw7 => b'8',
    };
    let n2 = if hri { b'2' } else { b'1' };
    let n3 = b'0' + width as u8;
    let n4 = height.max(1);

    let mut cmd = Vec::with_capacity(6 + data.len() + 1);
    cmd.extend([ESC, b'b', n1, n2, n3, n4]);
    cmd.extend_from_slice(data);
    cmd.push(RS);
    cmd
}

// ============================================================================
// GRAPHICS
// ============================================================================

/// # Print Raster Graphics (ESC GS S m xL xH yL yH n d1...dk)
///
/// | Param | Meaning |
/// |-------|---------|
/// | m | 1 = monochrome, 1 bit per dot |
/// | xL xH | Width in bytes, little-endian |
/// | yL yH | Height in dots, little-endian |
/// | n | 0 = black |
///
/// Data is row-major; in each byte bit 7 is the leftmost dot and a set
/// bit prints black.
///
/// StarPRNT Command Spec Rev 4.10, Section 2.3.12
pub fn raster(width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8);
    debug_assert_eq!(
        data.len(),
        width_bytes as usize * height as usize,
        "raster data length must be width_bytes * height"
    );

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(9 + data.len());
    cmd.extend([ESC, GS, b'S', 1, xl, xh, yl, yh, 0]);
    cmd.extend_from_slice(data);
    cmd
}

/// # Print NV Logo (ESC GS ( L ... fn 69)
///
/// Prints a logo stored in the printer's non-volatile memory under a
/// two-character key code. Logo `number` maps to the two-digit key
/// `('0' + n / 10, '0' + n % 10)`; the final two parameters are the
/// horizontal and vertical magnification (1 or 2).
///
/// StarPRNT Command Spec Rev 4.10, Section 2.3.13
pub fn logo(number: u8, size: LogoSize) -> Vec<u8> {
    let kc1 = b'0' + (number / 10) % 10;
    let kc2 = b'0' + number % 10;
    let (x, y) = size.scale();
    vec![ESC, GS, b'(', b'L', 6, 0, 48, 69, kc1, kc2, x, y]
}

// ============================================================================
// COMMAND SET
// ============================================================================

/// The Star line mode [`CommandSet`].
pub struct StarLineCommands;

/// Device code page identifier for ESC GS t.
fn code_page_value(page: CodePage) -> u8 {
    match page {
        CodePage::Cp998 => 0,
        CodePage::Cp437 => 1,
        CodePage::Cp932 => 2,
        CodePage::Cp858 => 4,
        CodePage::Cp852 => 5,
        CodePage::Cp860 => 6,
        CodePage::Cp861 => 7,
        CodePage::Cp863 => 8,
        CodePage::Cp865 => 9,
        CodePage::Cp855 => 11,
        CodePage::Cp857 => 12,
        CodePage::Cp862 => 13,
        CodePage::Cp864 => 14,
        CodePage::Cp737 => 15,
        CodePage::Cp851 => 16,
        CodePage::Cp869 => 17,
        CodePage::Cp928 => 18,
        CodePage::Cp772 => 19,
        CodePage::Cp774 => 20,
        CodePage::Cp874 => 21,
        CodePage::Cp1252 => 32,
        CodePage::Cp1250 => 33,
        CodePage::Cp1251 => 34,
        CodePage::Cp3840 => 64,
        CodePage::Cp3841 => 65,
        CodePage::Cp3843 => 66,
        CodePage::Cp3845 => 67,
        CodePage::Cp3846 => 68,
        CodePage::Cp3847 => 69,
        CodePage::Cp3848 => 70,
        CodePage::Cp1001 => 96,
        CodePage::Cp2001 => 97,
        CodePage::Cp3001 => 98,
        CodePage::Cp3002 => 99,
        CodePage::Cp3011 => 100,
        CodePage::Cp3012 => 101,
        CodePage::Cp3021 => 102,
        CodePage::Cp3041 => 103,
        CodePage::Utf8 => 0xFF,
        CodePage::Blank => 0xFE,
        CodePage::Cp999 => 0xFD,
    }
}

impl CommandSet for StarLineCommands {
    fn initialize(&self) -> Vec<u8> {
        init()
    }

    fn character_space(&self, dots: u8) -> Vec<u8> {
        character_space(dots)
    }

    fn code_page(&self, page: CodePage) -> Vec<u8> {
        code_page(code_page_value(page))
    }

    fn international(&self, set: InternationalSet) -> Vec<u8> {
        international(set)
    }

    fn emphasis(&self, enabled: bool) -> Vec<u8> {
        emphasis(enabled)
    }

    fn invert(&self, enabled: bool) -> Vec<u8> {
        invert(enabled)
    }

    fn underline(&self, enabled: bool) -> Vec<u8> {
        underline(enabled)
    }

    fn font_style(&self, f: FontStyle) -> Vec<u8> {
        font(f)
    }

    fn magnification(&self, width: u8, height: u8) -> Vec<u8> {
        // ESC i is zero-based; the trait speaks 1-based multipliers.
        expansion(height.saturating_sub(1), width.saturating_sub(1))
    }

    fn line_feed(&self, lines: u8) -> Vec<u8> {
        feed_lines(lines)
    }

    fn unit_feed(&self, units: u8) -> Vec<u8> {
        feed_units(units)
    }

    fn line_space(&self, dots: u8) -> Vec<u8> {
        line_space(dots)
    }

    fn cut(&self, action: CutAction) -> Vec<u8> {
        cut(action)
    }

    fn peripheral(&self, channel: PeripheralChannel) -> Vec<u8> {
        peripheral(channel)
    }

    fn black_mark(&self, mode: BlackMarkMode) -> Vec<u8> {
        black_mark(mode)
    }

    fn absolute_position(&self, position: u16) -> Vec<u8> {
        absolute_position(position)
    }

    fn alignment(&self, position: Alignment) -> Vec<u8> {
        alignment(position)
    }

    fn tab_positions(&self, stops: &[u8]) -> Vec<u8> {
        tab_positions(stops)
    }

    fn logo(&self, number: u8, size: LogoSize) -> Vec<u8> {
        logo(number, size)
    }

    fn barcode(
        &self,
        data: &[u8],
        symbology: BarcodeSymbology,
        width: BarcodeWidth,
        height: u8,
        hri: bool,
    ) -> Vec<u8> {
        barcode(data, symbology, width, height, hri)
    }

    fn raster(&self, bits: &BitRaster) -> Vec<u8> {
        // Chunk tall images so the receive buffer never overflows.
        let width_bytes = (bits.width_dots as usize).div_ceil(8);
        let total_height = bits.height as usize;
        let mut out = Vec::with_capacity(bits.data.len() + 9);

        let mut row = 0;
        while row < total_height {
            let chunk_height = (total_height - row).min(RASTER_CHUNK_ROWS);
            let start = row * width_bytes;
            let end = (row + chunk_height) * width_bytes;
            out.extend(raster(
                bits.width_dots,
                chunk_height as u16,
                &bits.data[start..end],
            ));
            row += chunk_height;
        }

        out
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init() {
        assert_eq!(init(), vec![0x1B, 0x40]);
    }

    #[test]
    fn test_cut_actions() {
        assert_eq!(cut(CutAction::FullCut), vec![0x1B, 0x64, 0x00]);
        assert_eq!(cut(CutAction::PartialCut), vec![0x1B, 0x64, 0x01]);
        assert_eq!(cut(CutAction::FullCutWithFeed), vec![0x1B, 0x64, 0x02]);
        assert_eq!(cut(CutAction::PartialCutWithFeed), vec![0x1B, 0x64, 0x03]);
    }

    #[test]
    fn test_feeds() {
        assert_eq!(feed_lines(3), vec![0x1B, 0x61, 3]);
        assert_eq!(feed_units(12), vec![0x1B, 0x4A, 12]);
        assert_eq!(line_space(32), vec![0x1B, 0x7A, 32]);
    }

    #[test]
    fn test_styles() {
        assert_eq!(emphasis(true), vec![0x1B, 0x45]);
        assert_eq!(emphasis(false), vec![0x1B, 0x46]);
        assert_eq!(invert(true), vec![0x1B, 0x34]);
        assert_eq!(invert(false), vec![0x1B, 0x35]);
        assert_eq!(underline(true), vec![0x1B, 0x2D, 0x01]);
        assert_eq!(underline(false), vec![0x1B, 0x2D, 0x00]);
    }

    #[test]
    fn test_font() {
        assert_eq!(font(FontStyle::A), vec![0x1B, 0x1E, 0x46, 0x00]);
        assert_eq!(font(FontStyle::B), vec![0x1B, 0x1E, 0x46, 0x01]);
    }

    #[test]
    fn test_expansion_clamps() {
        assert_eq!(expansion(1, 1), vec![0x1B, 0x69, 0x01, 0x01]);
        assert_eq!(expansion(10, 10), vec![0x1B, 0x69, 0x07, 0x07]);
    }

    #[test]
    fn test_magnification_is_one_based() {
        let set = StarLineCommands;
        // 2x2 multiplier -> ESC i 1 1
        assert_eq!(set.magnification(2, 2), vec![0x1B, 0x69, 0x01, 0x01]);
        // 1x1 multiplier -> ESC i 0 0
        assert_eq!(set.magnification(1, 1), vec![0x1B, 0x69, 0x00, 0x00]);
        // 0 does not underflow
        assert_eq!(set.magnification(0, 0), vec![0x1B, 0x69, 0x00, 0x00]);
    }

    #[test]
    fn test_positioning() {
        assert_eq!(absolute_position(576), vec![0x1B, 0x1D, 0x41, 0x40, 0x02]);
        assert_eq!(alignment(Alignment::Center), vec![0x1B, 0x1D, 0x61, 0x01]);
        assert_eq!(alignment(Alignment::Left), vec![0x1B, 0x1D, 0x61, 0x00]);
    }

    #[test]
    fn test_tab_positions_verbatim() {
        assert_eq!(
            tab_positions(&[8, 16, 24]),
            vec![0x1B, 0x44, 8, 16, 24, 0x00]
        );
        // Empty list clears all stops
        assert_eq!(tab_positions(&[]), vec![0x1B, 0x44, 0x00]);
    }

    #[test]
    fn test_peripheral_bytes() {
        assert_eq!(peripheral(PeripheralChannel::No1), vec![0x07]);
        assert_eq!(peripheral(PeripheralChannel::No2), vec![0x1A]);
    }

    #[test]
    fn test_barcode_code128_hri() {
        let cmd = barcode(
            b"HELLO",
            BarcodeSymbology::Code128,
            BarcodeWidth::Mode2,
            40,
            true,
        );
        assert_eq!(&cmd[..6], &[0x1B, 0x62, b'6', b'2', b'2', 40]);
        assert_eq!(&cmd[6..11], b"HELLO");
        assert_eq!(*cmd.last().unwrap(), 0x1E); // RS terminator
    }

    #[test]
    fn test_barcode_no_hri() {
        let cmd = barcode(
            b"123",
            BarcodeSymbology::Code39,
            BarcodeWidth::Mode3,
            80,
            false,
        );
        assert_eq!(&cmd[..6], &[0x1B, 0x62, b'4', b'1', b'3', 80]);
    }

    #[test]
    fn test_raster_header() {
        let data = vec![0xAA; 72 * 10];
        let cmd = raster(576, 10, &data);
        assert_eq!(&cmd[..9], &[0x1B, 0x1D, 0x53, 1, 72, 0, 10, 0, 0]);
        assert_eq!(&cmd[9..], &data[..]);
    }

    #[test]
    fn test_raster_chunking() {
        let set = StarLineCommands;
        // 300 rows at 8 dots wide: one 256-row chunk plus one 44-row chunk.
        let bits = BitRaster {
            width_dots: 8,
            height: 300,
            data: vec![0xFF; 300],
        };
        let out = set.raster(&bits);
        assert_eq!(out.len(), 9 + 256 + 9 + 44);
        assert_eq!(&out[..9], &[0x1B, 0x1D, 0x53, 1, 1, 0, 0, 1, 0]); // 256 rows
        let second = 9 + 256;
        assert_eq!(
            &out[second..second + 9],
            &[0x1B, 0x1D, 0x53, 1, 1, 0, 44, 0, 0]
        );
    }

    #[test]
    fn test_logo_key_code() {
        assert_eq!(
            logo(1, LogoSize::Normal),
            vec![0x1B, 0x1D, 0x28, 0x4C, 6, 0, 48, 69, b'0', b'1', 1, 1]
        );
        assert_eq!(
            logo(42, LogoSize::DoubleWidthDoubleHeight),
            vec![0x1B, 0x1D, 0x28, 0x4C, 6, 0, 48, 69, b'4', b'2', 2, 2]
        );
    }

    #[test]
    fn test_code_page_values() {
        let set = StarLineCommands;
        assert_eq!(set.code_page(CodePage::Cp437), vec![0x1B, 0x1D, 0x74, 1]);
        assert_eq!(set.code_page(CodePage::Cp1252), vec![0x1B, 0x1D, 0x74, 32]);
        assert_eq!(set.code_page(CodePage::Cp998), vec![0x1B, 0x1D, 0x74, 0]);
    }
}
