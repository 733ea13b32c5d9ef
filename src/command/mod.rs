//! # Print Command Model
//!
//! Declarative print commands and the boundary that produces them.
//!
//! Callers describe a print job as an ordered list of flat JSON maps, each
//! carrying exactly one *primary* key naming the operation (`append`,
//! `appendBarcode`, `appendCutPaper`, ...) plus auxiliary modifier keys
//! (`width`, `alignment`, `absolutePosition`, ...). The wire format is
//! dynamically typed; this module converts it **once**, at the boundary,
//! into the closed [`PrintCommand`] sum type so the compiler's match is
//! exhaustive and statically checked.
//!
//! ## Dispatch Rules
//!
//! - Primary keys are tested in a fixed order; the first present key wins.
//! - A map with no recognized primary key is a silent no-op (`None`), not
//!   an error — unknown or future keys are tolerated by design.
//! - Auxiliary values that fail to parse fall back to the family default;
//!   a primary value that fails to parse drops the one descriptor.

pub mod compiler;
pub mod encoding;
pub mod resolve;

use serde_json::{Map, Value};

pub use compiler::compile;
pub use encoding::TextEncoding;

use crate::protocol::{
    Alignment, BarcodeSymbology, BarcodeWidth, BlackMarkMode, CodePage, CutAction, FontStyle,
    InternationalSet, LogoSize, PeripheralChannel,
};
use crate::raster::BitmapRotation;

// ============================================================================
// COMMAND TYPES
// ============================================================================

/// Placement of a barcode or bitmap on the line.
///
/// When a descriptor carries both an `absolutePosition` and an
/// `alignment` key, absolute position takes precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    None,
    Absolute(u16),
    Aligned(Alignment),
}

/// Where bitmap pixels come from.
#[derive(Debug, Clone, PartialEq)]
pub enum BitmapSource {
    /// A filesystem path or URL, resolved through the
    /// [`crate::raster::ImageSource`].
    Location(String),
    /// A string rendered to pixels in a monospace font.
    Text { content: String, font_size: f32 },
    /// An in-memory encoded image (PNG, JPEG, ...).
    Bytes(Vec<u8>),
}

/// One declarative print operation.
///
/// `Encoding` is *state-setting*: it changes how every later text-bearing
/// command is encoded and emits no bytes itself. `CodePage` emits a
/// device opcode but leaves the host-side encoding state alone. Everything
/// else emits bytes immediately.
#[derive(Debug, Clone, PartialEq)]
pub enum PrintCommand {
    CharacterSpace(u8),
    Encoding(TextEncoding),
    CodePage(CodePage),
    Text(String),
    RawText(String),
    Multiple {
        text: String,
        width: u8,
        height: u8,
    },
    EmphasisText(String),
    EmphasisEnable(bool),
    InvertText(String),
    InvertEnable(bool),
    UnderlineText(String),
    UnderlineEnable(bool),
    International(InternationalSet),
    LineFeed(u8),
    UnitFeed(u8),
    LineSpace(u8),
    FontStyle(FontStyle),
    CutPaper(CutAction),
    CashDrawer(PeripheralChannel),
    BlackMark(BlackMarkMode),
    Bytes(String),
    RawBytes(String),
    AbsolutePosition {
        data: Option<String>,
        position: u16,
    },
    Alignment {
        data: Option<String>,
        position: Alignment,
    },
    HorizontalTabPositions(Vec<u8>),
    Logo {
        number: u8,
        size: LogoSize,
    },
    Barcode {
        data: String,
        symbology: BarcodeSymbology,
        width: BarcodeWidth,
        height: u8,
        hri: bool,
        placement: Placement,
    },
    Bitmap {
        source: BitmapSource,
        diffusion: bool,
        width: u16,
        both_scale: bool,
        rotation: BitmapRotation,
        placement: Placement,
    },
}

// ============================================================================
// VALUE COERCION
// ============================================================================

// The wire format is untyped, so values arrive as whatever the caller's
// serializer produced: `"40"`, `40`, and `40.0` all mean forty. These
// helpers mirror the original surface's tolerant coercion.

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_u8(value: &Value) -> Option<u8> {
    as_i64(value).map(|n| n.clamp(0, u8::MAX as i64) as u8)
}

fn as_u16(value: &Value) -> Option<u16> {
    as_i64(value).map(|n| n.clamp(0, u16::MAX as i64) as u16)
}

fn as_f32(value: &Value) -> Option<f32> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f as f32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn as_byte_array(value: &Value) -> Option<Vec<u8>> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(as_u8).collect())
}

// ============================================================================
// BOUNDARY PARSING
// ============================================================================

impl PrintCommand {
    /// Decide which operation a descriptor map denotes.
    ///
    /// Returns `None` for descriptors with no recognized primary key (a
    /// tolerated no-op) and for descriptors whose primary value cannot be
    /// coerced (the one command is dropped, the job continues).
    pub fn from_descriptor(map: &Map<String, Value>) -> Option<PrintCommand> {
        use PrintCommand::*;

        if let Some(v) = map.get("appendCharacterSpace") {
            return as_u8(v).map(CharacterSpace);
        }
        if let Some(v) = map.get("appendEncoding") {
            return Some(Encoding(TextEncoding::resolve(&as_string(v)?)));
        }
        if let Some(v) = map.get("appendCodePage") {
            return Some(CodePage(resolve::code_page(&as_string(v)?)));
        }
        if let Some(v) = map.get("append") {
            return as_string(v).map(Text);
        }
        if let Some(v) = map.get("appendRaw") {
            return as_string(v).map(RawText);
        }
        if let Some(v) = map.get("appendMultiple") {
            return Some(Multiple {
                text: as_string(v)?,
                width: map.get("width").and_then(as_u8).unwrap_or(2),
                height: map.get("height").and_then(as_u8).unwrap_or(2),
            });
        }
        if let Some(v) = map.get("appendEmphasis") {
            return as_string(v).map(EmphasisText);
        }
        if let Some(v) = map.get("enableEmphasis") {
            return as_bool(v).map(EmphasisEnable);
        }
        if let Some(v) = map.get("appendInvert") {
            return as_string(v).map(InvertText);
        }
        if let Some(v) = map.get("enableInvert") {
            return as_bool(v).map(InvertEnable);
        }
        if let Some(v) = map.get("appendUnderline") {
            return as_string(v).map(UnderlineText);
        }
        if let Some(v) = map.get("enableUnderline") {
            return as_bool(v).map(UnderlineEnable);
        }
        if let Some(v) = map.get("appendInternational") {
            return Some(International(resolve::international(&as_string(v)?)));
        }
        if let Some(v) = map.get("appendLineFeed") {
            return as_u8(v).map(LineFeed);
        }
        if let Some(v) = map.get("appendUnitFeed") {
            return as_u8(v).map(UnitFeed);
        }
        if let Some(v) = map.get("appendLineSpace") {
            return as_u8(v).map(LineSpace);
        }
        if let Some(v) = map.get("appendFontStyle") {
            return Some(FontStyle(resolve::font_style(&as_string(v)?)));
        }
        if let Some(v) = map.get("appendCutPaper") {
            return Some(CutPaper(resolve::cut_action(&as_string(v)?)));
        }
        if let Some(v) = map.get("openCashDrawer") {
            return Some(CashDrawer(resolve::peripheral_channel(as_i64(v)?)));
        }
        if let Some(v) = map.get("appendBlackMark") {
            return Some(BlackMark(resolve::black_mark(&as_string(v)?)));
        }
        if let Some(v) = map.get("appendBytes") {
            return as_string(v).map(Bytes);
        }
        if let Some(v) = map.get("appendRawBytes") {
            return as_string(v).map(RawBytes);
        }
        if let Some(v) = map.get("appendAbsolutePosition") {
            return Some(AbsolutePosition {
                data: map.get("data").and_then(as_string),
                position: as_u16(v)?,
            });
        }
        if let Some(v) = map.get("appendAlignment") {
            return Some(Alignment {
                data: map.get("data").and_then(as_string),
                position: resolve::alignment(&as_string(v)?),
            });
        }
        if let Some(v) = map.get("appendHorizontalTabPosition") {
            return as_byte_array(v).map(HorizontalTabPositions);
        }
        if let Some(v) = map.get("appendLogo") {
            return Some(Logo {
                number: as_u8(v)?,
                size: map
                    .get("logoSize")
                    .and_then(as_string)
                    .map(|s| resolve::logo_size(&s))
                    .unwrap_or_default(),
            });
        }
        if let Some(v) = map.get("appendBarcode") {
            return Some(Barcode {
                data: as_string(v)?,
                symbology: map
                    .get("BarcodeSymbology")
                    .and_then(as_string)
                    .map(|s| resolve::barcode_symbology(&s))
                    .unwrap_or_default(),
                width: map
                    .get("BarcodeWidth")
                    .and_then(as_string)
                    .map(|s| resolve::barcode_width(&s))
                    .unwrap_or_default(),
                height: map.get("height").and_then(as_u8).unwrap_or(40),
                hri: map.get("hri").and_then(as_bool).unwrap_or(true),
                placement: placement(map),
            });
        }
        if let Some(v) = map.get("appendBitmap") {
            return Some(bitmap(map, BitmapSource::Location(as_string(v)?)));
        }
        if let Some(v) = map.get("appendBitmapText") {
            let content = as_string(v)?;
            let font_size = map.get("fontSize").and_then(as_f32).unwrap_or(25.0);
            return Some(bitmap(map, BitmapSource::Text { content, font_size }));
        }
        if let Some(v) = map.get("appendBitmapByteArray") {
            return Some(bitmap(map, BitmapSource::Bytes(as_byte_array(v)?)));
        }

        None
    }
}

/// Shared auxiliary parsing for the three bitmap descriptor forms.
fn bitmap(map: &Map<String, Value>, source: BitmapSource) -> PrintCommand {
    PrintCommand::Bitmap {
        source,
        diffusion: map.get("diffusion").and_then(as_bool).unwrap_or(true),
        width: map.get("width").and_then(as_u16).unwrap_or(576),
        both_scale: map.get("bothScale").and_then(as_bool).unwrap_or(true),
        rotation: map
            .get("rotation")
            .and_then(as_string)
            .map(|s| resolve::rotation(&s))
            .unwrap_or_default(),
        placement: placement(map),
    }
}

/// Absolute position wins over alignment when both keys are present.
fn placement(map: &Map<String, Value>) -> Placement {
    if let Some(pos) = map.get("absolutePosition").and_then(as_u16) {
        return Placement::Absolute(pos);
    }
    if let Some(token) = map.get("alignment").and_then(as_string) {
        return Placement::Aligned(resolve::alignment(&token));
    }
    Placement::None
}

/// Parse a caller-supplied descriptor list, dropping no-ops.
///
/// Order is preserved; non-object entries and unrecognized descriptors
/// vanish without error.
pub fn parse_commands(descriptors: &[Value]) -> Vec<PrintCommand> {
    descriptors
        .iter()
        .filter_map(|entry| entry.as_object())
        .filter_map(PrintCommand::from_descriptor)
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
