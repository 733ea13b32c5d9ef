//! # Enumeration Resolvers
//!
//! One resolver per protocol enumeration family. Every resolver is a pure,
//! total function over all input strings: unrecognized or absent tokens
//! resolve to the family's documented default rather than failing. The
//! families are independent closed tables; nothing here consults state.
//!
//! | Family | Default |
//! |--------|---------|
//! | font style | `A` |
//! | alignment | `Left` |
//! | cut action | `PartialCutWithFeed` |
//! | barcode symbology | `Code128` |
//! | barcode width | `Mode2` |
//! | bitmap rotation | `Normal` |
//! | peripheral channel | `No1` |
//! | black mark | `Valid` |
//! | logo size | `Normal` |
//! | international set | `Usa` |
//! | code page | `Cp998` (hardware default page) |

use crate::protocol::{
    Alignment, BarcodeSymbology, BarcodeWidth, BlackMarkMode, CodePage, CutAction, FontStyle,
    InternationalSet, LogoSize, PeripheralChannel,
};
use crate::raster::BitmapRotation;

/// Resolve a font style token.
pub fn font_style(token: &str) -> FontStyle {
    match token {
        "B" => FontStyle::B,
        _ => FontStyle::A,
    }
}

/// Resolve an alignment token.
pub fn alignment(token: &str) -> Alignment {
    match token {
        "Center" => Alignment::Center,
        "Right" => Alignment::Right,
        _ => Alignment::Left,
    }
}

/// Resolve a cut action token.
pub fn cut_action(token: &str) -> CutAction {
    match token {
        "FullCut" => CutAction::FullCut,
        "FullCutWithFeed" => CutAction::FullCutWithFeed,
        "PartialCut" => CutAction::PartialCut,
        _ => CutAction::PartialCutWithFeed,
    }
}

/// Resolve a barcode symbology token.
pub fn barcode_symbology(token: &str) -> BarcodeSymbology {
    match token {
        "Code39" => BarcodeSymbology::Code39,
        "Code93" => BarcodeSymbology::Code93,
        "ITF" => BarcodeSymbology::Itf,
        "JAN8" => BarcodeSymbology::Jan8,
        "JAN13" => BarcodeSymbology::Jan13,
        "NW7" => BarcodeSymbology::Nw7,
        "UPCA" => BarcodeSymbology::UpcA,
        "UPCE" => BarcodeSymbology::UpcE,
        _ => BarcodeSymbology::Code128,
    }
}

/// Resolve a barcode width mode token.
pub fn barcode_width(token: &str) -> BarcodeWidth {
    match token {
        "Mode1" => BarcodeWidth::Mode1,
        "Mode3" => BarcodeWidth::Mode3,
        "Mode4" => BarcodeWidth::Mode4,
        "Mode5" => BarcodeWidth::Mode5,
        "Mode6" => BarcodeWidth::Mode6,
        "Mode7" => BarcodeWidth::Mode7,
        "Mode8" => BarcodeWidth::Mode8,
        "Mode9" => BarcodeWidth::Mode9,
        _ => BarcodeWidth::Mode2,
    }
}

/// Resolve a bitmap rotation token.
pub fn rotation(token: &str) -> BitmapRotation {
    match token {
        "Left90" => BitmapRotation::Left90,
        "Right90" => BitmapRotation::Right90,
        "Rotate180" => BitmapRotation::Rotate180,
        _ => BitmapRotation::Normal,
    }
}

/// Resolve a peripheral (cash drawer) channel number.
pub fn peripheral_channel(channel: i64) -> PeripheralChannel {
    match channel {
        2 => PeripheralChannel::No2,
        _ => PeripheralChannel::No1,
    }
}

/// Resolve a black mark mode token.
pub fn black_mark(token: &str) -> BlackMarkMode {
    match token {
        "Invalid" => BlackMarkMode::Invalid,
        "ValidWithDetection" => BlackMarkMode::ValidWithDetection,
        _ => BlackMarkMode::Valid,
    }
}

/// Resolve a logo size token.
pub fn logo_size(token: &str) -> LogoSize {
    match token {
        "DoubleWidth" => LogoSize::DoubleWidth,
        "DoubleHeight" => LogoSize::DoubleHeight,
        "DoubleWidthDoubleHeight" => LogoSize::DoubleWidthDoubleHeight,
        _ => LogoSize::Normal,
    }
}

/// Resolve an international character set token.
pub fn international(token: &str) -> InternationalSet {
    match token {
        "UK" => InternationalSet::Uk,
        "France" => InternationalSet::France,
        "Germany" => InternationalSet::Germany,
        "Denmark" => InternationalSet::Denmark,
        "Sweden" => InternationalSet::Sweden,
        "Italy" => InternationalSet::Italy,
        "Spain" => InternationalSet::Spain,
        "Japan" => InternationalSet::Japan,
        "Norway" => InternationalSet::Norway,
        "Denmark2" => InternationalSet::Denmark2,
        "Spain2" => InternationalSet::Spain2,
        "LatinAmerica" => InternationalSet::LatinAmerica,
        "Korea" => InternationalSet::Korea,
        "Ireland" => InternationalSet::Ireland,
        "Legal" => InternationalSet::Legal,
        _ => InternationalSet::Usa,
    }
}

/// Resolve a code page token.
pub fn code_page(token: &str) -> CodePage {
    match token {
        "CP437" => CodePage::Cp437,
        "CP737" => CodePage::Cp737,
        "CP772" => CodePage::Cp772,
        "CP774" => CodePage::Cp774,
        "CP851" => CodePage::Cp851,
        "CP852" => CodePage::Cp852,
        "CP855" => CodePage::Cp855,
        "CP857" => CodePage::Cp857,
        "CP858" => CodePage::Cp858,
        "CP860" => CodePage::Cp860,
        "CP861" => CodePage::Cp861,
        "CP862" => CodePage::Cp862,
        "CP863" => CodePage::Cp863,
        "CP864" => CodePage::Cp864,
        "CP865" => CodePage::Cp865,
        "CP869" => CodePage::Cp869,
        "CP874" => CodePage::Cp874,
        "CP928" => CodePage::Cp928,
        "CP932" => CodePage::Cp932,
        "CP999" => CodePage::Cp999,
        "CP1001" => CodePage::Cp1001,
        "CP1250" => CodePage::Cp1250,
        "CP1251" => CodePage::Cp1251,
        "CP1252" => CodePage::Cp1252,
        "CP2001" => CodePage::Cp2001,
        "CP3001" => CodePage::Cp3001,
        "CP3002" => CodePage::Cp3002,
        "CP3011" => CodePage::Cp3011,
        "CP3012" => CodePage::Cp3012,
        "CP3021" => CodePage::Cp3021,
        "CP3041" => CodePage::Cp3041,
        "CP3840" => CodePage::Cp3840,
        "CP3841" => CodePage::Cp3841,
        "CP3843" => CodePage::Cp3843,
        "CP3845" => CodePage::Cp3845,
        "CP3846" => CodePage::Cp3846,
        "CP3847" => CodePage::Cp3847,
        "CP3848" => CodePage::Cp3848,
        "UTF8" => CodePage::Utf8,
        "Blank" => CodePage::Blank,
        _ => CodePage::Cp998,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Every family must return its documented default for tokens it has
    // never heard of, including the empty string.
    #[test]
    fn test_unknown_tokens_resolve_to_defaults() {
        for garbage in ["", "bogus", "code128", "LEFT", "💥"] {
            assert_eq!(font_style(garbage), FontStyle::A);
            assert_eq!(alignment(garbage), Alignment::Left);
            assert_eq!(cut_action(garbage), CutAction::PartialCutWithFeed);
            assert_eq!(barcode_symbology(garbage), BarcodeSymbology::Code128);
            assert_eq!(barcode_width(garbage), BarcodeWidth::Mode2);
            assert_eq!(rotation(garbage), BitmapRotation::Normal);
            assert_eq!(black_mark(garbage), BlackMarkMode::Valid);
            assert_eq!(logo_size(garbage), LogoSize::Normal);
            assert_eq!(international(garbage), InternationalSet::Usa);
            assert_eq!(code_page(garbage), CodePage::Cp998);
        }
    }

    #[test]
    fn test_known_tokens() {
        assert_eq!(font_style("B"), FontStyle::B);
        assert_eq!(alignment("Center"), Alignment::Center);
        assert_eq!(alignment("Right"), Alignment::Right);
        assert_eq!(cut_action("FullCutWithFeed"), CutAction::FullCutWithFeed);
        assert_eq!(barcode_symbology("NW7"), BarcodeSymbology::Nw7);
        assert_eq!(barcode_width("Mode9"), BarcodeWidth::Mode9);
        assert_eq!(rotation("Rotate180"), BitmapRotation::Rotate180);
        assert_eq!(black_mark("ValidWithDetection"), BlackMarkMode::ValidWithDetection);
        assert_eq!(logo_size("DoubleWidth"), LogoSize::DoubleWidth);
        assert_eq!(international("LatinAmerica"), InternationalSet::LatinAmerica);
        assert_eq!(code_page("CP1252"), CodePage::Cp1252);
        assert_eq!(code_page("UTF8"), CodePage::Utf8);
    }

    #[test]
    fn test_peripheral_channel() {
        assert_eq!(peripheral_channel(1), PeripheralChannel::No1);
        assert_eq!(peripheral_channel(2), PeripheralChannel::No2);
        // Out-of-range channels fall back to channel 1.
        assert_eq!(peripheral_channel(0), PeripheralChannel::No1);
        assert_eq!(peripheral_channel(99), PeripheralChannel::No1);
    }
}
