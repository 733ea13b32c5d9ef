//! # Command Compiler
//!
//! Translates an ordered [`PrintCommand`] sequence into the exact binary
//! stream for one emulation. The compiler owns the only cross-command
//! state in the pipeline — the active text encoding — and threads it
//! through a single pass:
//!
//! ```text
//! descriptors ──► boundary (command::parse_commands)
//!                     │
//!                     ▼
//!              Vec<PrintCommand> ──► compile() ──► Vec<u8>
//!                                        │
//!                              CommandSet (per dialect)
//! ```
//!
//! Image acquisition failures are deliberately non-fatal: the offending
//! operation is logged and skipped so one broken asset cannot abort a
//! whole receipt.

use crate::emulation::Emulation;
use crate::protocol::CommandSet;
use crate::raster::{self, ImageSource};

use super::{BitmapSource, Placement, PrintCommand, TextEncoding};

/// Compile `commands` for `emulation`, resolving bitmap sources through
/// `images`.
///
/// Opens a document (device initialize), consumes the commands strictly
/// in order, and returns the accumulated bytes. Never fails; every
/// recoverable problem degrades to a default or a skip.
pub fn compile(
    emulation: Emulation,
    commands: &[PrintCommand],
    images: &dyn ImageSource,
) -> Vec<u8> {
    let mut builder = DocumentBuilder::new(emulation.command_set(), images);
    builder.begin();
    for command in commands {
        builder.append(command);
    }
    builder.finish()
}

/// The mutable compilation context: the open byte buffer plus the active
/// text encoding. Owned by exactly one compilation pass.
struct DocumentBuilder<'a> {
    set: &'static dyn CommandSet,
    images: &'a dyn ImageSource,
    encoding: TextEncoding,
    buf: Vec<u8>,
}

impl<'a> DocumentBuilder<'a> {
    fn new(set: &'static dyn CommandSet, images: &'a dyn ImageSource) -> Self {
        Self {
            set,
            images,
            encoding: TextEncoding::default(),
            buf: Vec::new(),
        }
    }

    fn begin(&mut self) {
        self.buf.extend(self.set.initialize());
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }

    /// Encode text under the *currently active* encoding.
    fn encode(&self, text: &str) -> Vec<u8> {
        self.encoding.encode(text)
    }

    /// Emit the cursor-control prefix for a placed barcode/bitmap.
    fn emit_placement(&mut self, placement: Placement) {
        match placement {
            Placement::None => {}
            Placement::Absolute(position) => {
                self.buf.extend(self.set.absolute_position(position));
            }
            Placement::Aligned(position) => {
                self.buf.extend(self.set.alignment(position));
            }
        }
    }

    fn append(&mut self, command: &PrintCommand) {
        match command {
            PrintCommand::CharacterSpace(dots) => {
                self.buf.extend(self.set.character_space(*dots));
            }

            // State-setting: changes how later text encodes, emits nothing.
            PrintCommand::Encoding(encoding) => {
                log::debug!("text encoding set to {encoding:?}");
                self.encoding = *encoding;
            }

            // Device opcode only; host-side encoding state is untouched.
            PrintCommand::CodePage(page) => {
                self.buf.extend(self.set.code_page(*page));
            }

            PrintCommand::Text(text)
            | PrintCommand::RawText(text)
            | PrintCommand::Bytes(text)
            | PrintCommand::RawBytes(text) => {
                let bytes = self.encode(text);
                self.buf.extend(bytes);
            }

            PrintCommand::Multiple {
                text,
                width,
                height,
            } => {
                let bytes = self.encode(text);
                self.buf.extend(self.set.magnification(*width, *height));
                self.buf.extend(bytes);
                self.buf.extend(self.set.magnification(1, 1));
            }

            PrintCommand::EmphasisText(text) => {
                let bytes = self.encode(text);
                self.buf.extend(self.set.emphasis(true));
                self.buf.extend(bytes);
                self.buf.extend(self.set.emphasis(false));
            }
            PrintCommand::EmphasisEnable(enabled) => {
                self.buf.extend(self.set.emphasis(*enabled));
            }

            PrintCommand::InvertText(text) => {
                let bytes = self.encode(text);
                self.buf.extend(self.set.invert(true));
                self.buf.extend(bytes);
                self.buf.extend(self.set.invert(false));
            }
            PrintCommand::InvertEnable(enabled) => {
                self.buf.extend(self.set.invert(*enabled));
            }

            PrintCommand::UnderlineText(text) => {
                let bytes = self.encode(text);
                self.buf.extend(self.set.underline(true));
                self.buf.extend(bytes);
                self.buf.extend(self.set.underline(false));
            }
            PrintCommand::UnderlineEnable(enabled) => {
                self.buf.extend(self.set.underline(*enabled));
            }

            PrintCommand::International(set) => {
                self.buf.extend(self.set.international(*set));
            }
            PrintCommand::LineFeed(lines) => {
                self.buf.extend(self.set.line_feed(*lines));
            }
            PrintCommand::UnitFeed(units) => {
                self.buf.extend(self.set.unit_feed(*units));
            }
            PrintCommand::LineSpace(dots) => {
                self.buf.extend(self.set.line_space(*dots));
            }
            PrintCommand::FontStyle(font) => {
                self.buf.extend(self.set.font_style(*font));
            }
            PrintCommand::CutPaper(action) => {
                self.buf.extend(self.set.cut(*action));
            }
            PrintCommand::CashDrawer(channel) => {
                self.buf.extend(self.set.peripheral(*channel));
            }
            PrintCommand::BlackMark(mode) => {
                self.buf.extend(self.set.black_mark(*mode));
            }

            PrintCommand::AbsolutePosition { data, position } => {
                self.buf.extend(self.set.absolute_position(*position));
                if let Some(text) = data {
                    let bytes = self.encode(text);
                    self.buf.extend(bytes);
                }
            }
            PrintCommand::Alignment { data, position } => {
                self.buf.extend(self.set.alignment(*position));
                if let Some(text) = data {
                    let bytes = self.encode(text);
                    self.buf.extend(bytes);
                }
            }

            PrintCommand::HorizontalTabPositions(stops) => {
                self.buf.extend(self.set.tab_positions(stops));
            }

            PrintCommand::Logo { number, size } => {
                self.buf.extend(self.set.logo(*number, *size));
            }

            PrintCommand::Barcode {
                data,
                symbology,
                width,
                height,
                hri,
                placement,
            } => {
                let bytes = self.encode(data);
                self.emit_placement(*placement);
                self.buf
                    .extend(self.set.barcode(&bytes, *symbology, *width, *height, *hri));
            }

            PrintCommand::Bitmap {
                source,
                diffusion,
                width,
                both_scale,
                rotation,
                placement,
            } => {
                let image = match source {
                    BitmapSource::Location(location) => self.images.load(location),
                    BitmapSource::Text { content, font_size } => {
                        self.images.render_text(content, *font_size, *width as u32)
                    }
                    BitmapSource::Bytes(bytes) => raster::decode_bytes(bytes),
                };
                let image = match image {
                    Ok(image) => image,
                    Err(e) => {
                        // One bad asset never aborts the job.
                        log::error!("skipping bitmap command: {e}");
                        return;
                    }
                };

                let prepared = raster::prepare(&image, *width as u32, *both_scale, *rotation);
                let bits = raster::to_monochrome(&prepared, *diffusion);
                self.emit_placement(*placement);
                self.buf.extend(self.set.raster(&bits));
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
