//! # ESC/POS Commands
//!
//! Command builders for the ESC/POS protocol used by Epson-compatible
//! receipt printers and by Star printers running the `EscPos` /
//! `EscPosMobile` emulations.
//!
//! The command vocabulary overlaps heavily with Star line mode but the
//! byte sequences differ in detail: alignment is `ESC a` rather than
//! `ESC GS a`, cuts go through `GS V`, barcodes through `GS k` with
//! separate height/width/HRI setup commands, and raster images through
//! `GS v 0`.
//!
//! ## Reference
//!
//! Based on the Epson "ESC/POS Application Programming Guide".

use super::{
    Alignment, BarcodeSymbology, BarcodeWidth, BlackMarkMode, CodePage, CommandSet, CutAction,
    ESC, FS, FontStyle, GS, InternationalSet, PeripheralChannel, u16_le,
};
use crate::raster::BitRaster;

// ============================================================================
// PRINTER CONTROL
// ============================================================================

/// Initialize printer (ESC @).
#[inline]
pub fn init() -> Vec<u8> {
    vec![ESC, b'@']
}

/// # Cut Paper (GS V)
///
/// | Action | Bytes |
/// |--------|-------|
/// | Full cut | GS V 0 |
/// | Partial cut | GS V 1 |
/// | Feed + full cut | GS V 65 0 |
/// | Feed + partial cut | GS V 66 0 |
#[inline]
pub fn cut(action: CutAction) -> Vec<u8> {
    match action {
        CutAction::FullCut => vec![GS, b'V', 0],
        CutAction::PartialCut => vec![GS, b'V', 1],
        CutAction::FullCutWithFeed => vec![GS, b'V', 65, 0],
        CutAction::PartialCutWithFeed => vec![GS, b'V', 66, 0],
    }
}

/// Print and feed n lines (ESC d n).
#[inline]
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, b'd', n]
}

/// Feed paper by n motion units (ESC J n).
#[inline]
pub fn feed_units(n: u8) -> Vec<u8> {
    vec![ESC, b'J', n]
}

/// Set line spacing to n motion units (ESC 3 n).
#[inline]
pub fn line_space(n: u8) -> Vec<u8> {
    vec![ESC, b'3', n]
}

/// Set right-side character spacing to n dots (ESC SP n).
#[inline]
pub fn character_space(n: u8) -> Vec<u8> {
    vec![ESC, b' ', n]
}

/// # Generate Drawer Pulse (ESC p m t1 t2)
///
/// `m` selects connector pin 2 (channel 1) or pin 5 (channel 2); the
/// pulse is t1×2ms on, t2×2ms off.
#[inline]
pub fn drawer_pulse(channel: PeripheralChannel) -> Vec<u8> {
    let m = match channel {
        PeripheralChannel::No1 => 0,
        PeripheralChannel::No2 => 1,
    };
    vec![ESC, b'p', m, 50, 200]
}

// ============================================================================
// TEXT STYLING
// ============================================================================

/// Turn emphasized (bold) mode on/off (ESC E n).
#[inline]
pub fn emphasis(enabled: bool) -> Vec<u8> {
    vec![ESC, b'E', enabled as u8]
}

/// Turn white/black reverse printing on/off (GS B n).
#[inline]
pub fn invert(enabled: bool) -> Vec<u8> {
    vec![GS, b'B', enabled as u8]
}

/// Turn underline mode on/off (ESC - n).
#[inline]
pub fn underline(enabled: bool) -> Vec<u8> {
    vec![ESC, b'-', enabled as u8]
}

/// Select character font (ESC M n). 0 = Font A (12×24), 1 = Font B (9×17).
#[inline]
pub fn font(f: FontStyle) -> Vec<u8> {
    vec![ESC, b'M', f as u8]
}

/// # Select Character Size (GS ! n)
///
/// The high nibble holds the width multiplier and the low nibble the
/// height multiplier, both zero-based (0 = 1×, up to 7 = 8×).
pub fn char_size(width_mult: u8, height_mult: u8) -> Vec<u8> {
    let n = (width_mult.min(7) << 4) | height_mult.min(7);
    vec![GS, b'!', n]
}

/// Select character code table (ESC t n).
#[inline]
pub fn code_table(n: u8) -> Vec<u8> {
    vec![ESC, b't', n]
}

/// Select international character set (ESC R n).
#[inline]
pub fn international(set: InternationalSet) -> Vec<u8> {
    vec![ESC, b'R', set as u8]
}

// ============================================================================
// POSITIONING
// ============================================================================

/// Set absolute print position (ESC $ nL nH), in dots from the left margin.
pub fn absolute_position(position: u16) -> Vec<u8> {
    let [nl, nh] = u16_le(position);
    vec![ESC, b'$', nl, nh]
}

/// Select justification (ESC a n). 0 = left, 1 = center, 2 = right.
#[inline]
pub fn alignment(position: Alignment) -> Vec<u8> {
    vec![ESC, b'a', position as u8]
}

/// Set horizontal tab positions (ESC D n1 .. nk NUL).
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

/// # Print 1D Barcode
///
/// ESC/POS splits barcode printing across setup commands followed by
/// `GS k m n data` (function B, explicit length):
///
/// 1. `GS H n` — HRI position (0 = none, 2 = below)
/// 2. `GS w n` — module width (clamped to the printable 2..6 range)
/// 3. `GS h n` — height in dots
/// 4. `GS k m n d1..dn` — symbology `m` (65..73) and the data itself
pub fn barcode(
    data: &[u8],
    symbology: BarcodeSymbology,
    width: BarcodeWidth,
    height: u8,
    hri: bool,
) -> Vec<u8> {
    let m = match symbology {
        BarcodeSymbology::UpcA => 65,
        BarcodeSymbology::UpcE => 66,
        BarcodeSymbology::Jan13 => 67,
        BarcodeSymbology::Jan8 => 68,
        BarcodeSymbology::Code39 => 69,
        BarcodeSymbology::Itf => 70,
        BarcodeSymbology::Nw7 => 71,
        BarcodeSymbology::Code93 => 72,
        BarcodeSymbology::Code128 => 73,
    };
    let data_len = data.len().min(255) as u8;

    let mut cmd = Vec::with_capacity(13 + data.len());
    cmd.extend([GS, b'H', if hri { 2 } else { 0 }]);
    cmd.extend([GS, b'w', (width as u8).clamp(2, 6)]);
    cmd.extend([GS, b'h', height.max(1)]);
    cmd.extend([GS, b'k', m, data_len]);
    cmd.extend_from_slice(&data[..data_len as usize]);
    cmd
}

// ============================================================================
// GRAPHICS
// ============================================================================

/// # Print Raster Bit Image (GS v 0 m xL xH yL yH d1...dk)
///
/// `m = 0` selects normal density. Width is given in bytes and height in
/// dots, both little-endian. Data is row-major, bit 7 leftmost, set bit
/// prints black.
pub fn raster(width_dots: u16, height: u16, data: &[u8]) -> Vec<u8> {
    let width_bytes = width_dots.div_ceil(8);
    debug_assert_eq!(
        data.len(),
        width_bytes as usize * height as usize,
        "raster data length must be width_bytes * height"
    );

    let [xl, xh] = u16_le(width_bytes);
    let [yl, yh] = u16_le(height);

    let mut cmd = Vec::with_capacity(8 + data.len());
    cmd.extend([GS, b'v', b'0', 0, xl, xh, yl, yh]);
    cmd.extend_from_slice(data);
    cmd
}

/// Print NV bit image n with mode m (FS p n m). Mode 0..3 maps to
/// normal / double-width / double-height / quadruple.
#[inline]
pub fn nv_image(number: u8, mode: u8) -> Vec<u8> {
    vec![FS, b'p', number, mode.min(3)]
}

// ============================================================================
// COMMAND SET
// ============================================================================

/// The ESC/POS [`CommandSet`].
pub struct EscPosCommands;

/// Character code table identifier for ESC t. Pages with no ESC/POS
/// equivalent fall back to the power-on table (CP437).
fn code_table_value(page: CodePage) -> u8 {
    match page {
        CodePage::Cp437 => 0,
        CodePage::Cp932 => 1,
        CodePage::Cp860 => 3,
        CodePage::Cp863 => 4,
        CodePage::Cp865 => 5,
        CodePage::Cp1252 => 16,
        CodePage::Cp852 => 18,
        CodePage::Cp858 => 19,
        CodePage::Cp874 => 21,
        CodePage::Cp1250 => 45,
        CodePage::Cp1251 => 46,
        CodePage::Cp928 => 47,
        _ => 0,
    }
}

impl CommandSet for EscPosCommands {
    fn initialize(&self) -> Vec<u8> {
        init()
    }

    fn character_space(&self, dots: u8) -> Vec<u8> {
        character_space(dots)
    }

    fn code_page(&self, page: CodePage) -> Vec<u8> {
        code_table(code_table_value(page))
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
        // GS ! is zero-based; the trait speaks 1-based multipliers.
        char_size(width.saturating_sub(1), height.saturating_sub(1))
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
        drawer_pulse(channel)
    }

    fn black_mark(&self, mode: BlackMarkMode) -> Vec<u8> {
        // ESC/POS has no realtime black mark selection; the feature is
        // configured through printer memory switches instead.
        log::debug!("black mark mode {mode:?} ignored by ESC/POS dialect");
        Vec::new()
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

    fn logo(&self, number: u8, size: crate::protocol::LogoSize) -> Vec<u8> {
        let mode = match size.scale() {
            (1, 1) => 0,
            (2, 1) => 1,
            (1, 2) => 2,
            _ => 3,
        };
        nv_image(number, mode)
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
        raster(bits.width_dots, bits.height, &bits.data)
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
        assert_eq!(cut(CutAction::FullCut), vec![0x1D, 0x56, 0]);
        assert_eq!(cut(CutAction::PartialCut), vec![0x1D, 0x56, 1]);
        assert_eq!(cut(CutAction::FullCutWithFeed), vec![0x1D, 0x56, 65, 0]);
        assert_eq!(cut(CutAction::PartialCutWithFeed), vec![0x1D, 0x56, 66, 0]);
    }

    #[test]
    fn test_styles() {
        assert_eq!(emphasis(true), vec![0x1B, 0x45, 1]);
        assert_eq!(emphasis(false), vec![0x1B, 0x45, 0]);
        assert_eq!(invert(true), vec![0x1D, 0x42, 1]);
        assert_eq!(underline(false), vec![0x1B, 0x2D, 0]);
        assert_eq!(font(FontStyle::B), vec![0x1B, 0x4D, 1]);
    }

    #[test]
    fn test_char_size_nibbles() {
        // 2x width, 3x height -> high nibble 1, low nibble 2
        assert_eq!(char_size(1, 2), vec![0x1D, 0x21, 0x12]);
        assert_eq!(char_size(0, 0), vec![0x1D, 0x21, 0x00]);
        assert_eq!(char_size(9, 9), vec![0x1D, 0x21, 0x77]);
    }

    #[test]
    fn test_positioning() {
        assert_eq!(absolute_position(576), vec![0x1B, 0x24, 0x40, 0x02]);
        assert_eq!(alignment(Alignment::Right), vec![0x1B, 0x61, 2]);
    }

    #[test]
    fn test_barcode_layout() {
        let cmd = barcode(
            b"12345",
            BarcodeSymbology::Code128,
            BarcodeWidth::Mode2,
            40,
            true,
        );
        // GS H 2, GS w 2, GS h 40, GS k 73 5 data
        assert_eq!(&cmd[..3], &[0x1D, 0x48, 2]);
        assert_eq!(&cmd[3..6], &[0x1D, 0x77, 2]);
        assert_eq!(&cmd[6..9], &[0x1D, 0x68, 40]);
        assert_eq!(&cmd[9..13], &[0x1D, 0x6B, 73, 5]);
        assert_eq!(&cmd[13..], b"12345");
    }

    #[test]
    fn test_barcode_width_clamped() {
        let cmd = barcode(
            b"1",
            BarcodeSymbology::UpcA,
            BarcodeWidth::Mode9,
            40,
            false,
        );
        assert_eq!(cmd[2], 0); // no HRI
        assert_eq!(cmd[5], 6); // width clamped to 6
    }

    #[test]
    fn test_raster_header() {
        let data = vec![0x00; 48 * 2];
        let cmd = raster(384, 2, &data);
        assert_eq!(&cmd[..8], &[0x1D, 0x76, 0x30, 0, 48, 0, 2, 0]);
        assert_eq!(cmd.len(), 8 + 48 * 2);
    }

    #[test]
    fn test_black_mark_is_silent_noop() {
        let set = EscPosCommands;
        assert!(set.black_mark(BlackMarkMode::Valid).is_empty());
    }

    #[test]
    fn test_nv_image_modes() {
        let set = EscPosCommands;
        assert_eq!(
            set.logo(1, crate::protocol::LogoSize::Normal),
            vec![0x1C, 0x70, 1, 0]
        );
        assert_eq!(
            set.logo(2, crate::protocol::LogoSize::DoubleWidthDoubleHeight),
            vec![0x1C, 0x70, 2, 3]
        );
    }
}
