//! # Text Encodings
//!
//! Host-side string encoding for text-bearing print commands. This is
//! distinct from the device code page: the code page tells the *printer*
//! how to draw bytes, while the text encoding tells *us* how to turn a
//! Rust string into those bytes. A job that selects CP1252 on the device
//! normally pairs it with `Windows-1252` here.
//!
//! ## Fallback Behavior
//!
//! Encoding selection is total. Unknown tokens resolve to 7-bit ASCII,
//! and a legacy charset whose encoder cannot be obtained at runtime falls
//! back silently to UTF-8. The fallback is lossy-compatible: output stays
//! printable, accented glyphs may come out as multi-byte sequences the
//! selected code page renders differently.

use encoding_rs::Encoding;

/// Supported text encodings for print command payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// 7-bit US-ASCII; non-ASCII scalars encode as `?`
    #[default]
    Ascii,
    /// Windows-1252 (French, German, Portuguese, Spanish)
    Windows1252,
    /// Shift-JIS (Japanese)
    ShiftJis,
    /// Windows-1251 (Russian)
    Windows1251,
    /// GB2312 (Simplified Chinese)
    Gb2312,
    /// Big5 (Traditional Chinese)
    Big5,
    Utf8,
}

impl TextEncoding {
    /// Resolve an encoding token. Total: unknown tokens yield
    /// [`TextEncoding::Ascii`].
    pub fn resolve(token: &str) -> Self {
        match token {
            "Windows-1252" => TextEncoding::Windows1252,
            "Shift-JIS" => TextEncoding::ShiftJis,
            "Windows-1251" => TextEncoding::Windows1251,
            "GB2312" => TextEncoding::Gb2312,
            "Big5" => TextEncoding::Big5,
            "UTF-8" => TextEncoding::Utf8,
            _ => TextEncoding::Ascii,
        }
    }

    /// The WHATWG label used to look up the legacy encoder, if any.
    fn label(&self) -> Option<&'static [u8]> {
        match self {
            TextEncoding::Windows1252 => Some(b"windows-1252"),
            TextEncoding::ShiftJis => Some(b"shift_jis"),
            TextEncoding::Windows1251 => Some(b"windows-1251"),
            TextEncoding::Gb2312 => Some(b"gb2312"),
            TextEncoding::Big5 => Some(b"big5"),
            TextEncoding::Ascii | TextEncoding::Utf8 => None,
        }
    }

    /// Encode `text` under this encoding. Never fails: unmappable
    /// characters degrade per encoding family, and a missing legacy
    /// encoder falls back to UTF-8.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            TextEncoding::Utf8 => text.as_bytes().to_vec(),
            TextEncoding::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect(),
            legacy => {
                let label = legacy
                    .label()
                    .unwrap_or(b"utf-8");
                match Encoding::for_label(label) {
                    Some(encoding) => {
                        let (bytes, _, _) = encoding.encode(text);
                        bytes.into_owned()
                    }
                    None => {
                        // Documented lossy-compatibility fallback; the job
                        // still prints, so nothing is surfaced.
                        log::warn!(
                            "encoding {legacy:?} unavailable, falling back to UTF-8"
                        );
                        text.as_bytes().to_vec()
                    }
                }
            }
        }
    }
}
