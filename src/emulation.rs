//! # Emulation Dialects
//!
//! The protocol emulation a target printer speaks. Selecting an emulation
//! decides two things that must never diverge:
//!
//! 1. which opcode family the command compiler targets
//!    ([`Emulation::command_set`]), and
//! 2. which transport configuration string the port is opened with
//!    ([`Emulation::port_settings`]).
//!
//! Both are derived from the single resolved [`Emulation`] value, so a
//! protocol/configuration mismatch cannot be expressed.

use crate::protocol::{CommandSet, EscPosCommands, StarLineCommands};

static STAR_LINE: StarLineCommands = StarLineCommands;
static ESC_POS: EscPosCommands = EscPosCommands;

/// Supported protocol emulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emulation {
    /// StarPRNT (portable printers, line mode)
    StarPrnt,
    /// StarPRNT with the extended portable command set
    StarPrntL,
    /// Star line mode (desktop thermal printers)
    #[default]
    StarLine,
    /// Star graphic mode (raster-only desktop printers)
    StarGraphic,
    /// ESC/POS (Epson-compatible desktop printers)
    EscPos,
    /// ESC/POS mobile (portable Epson-compatible printers)
    EscPosMobile,
    /// Star dot-impact kitchen printers
    StarDotImpact,
}

impl Emulation {
    /// Resolve an emulation token. Unrecognized tokens fall back to
    /// [`Emulation::StarLine`]; this resolver never fails.
    pub fn resolve(token: &str) -> Self {
        match token {
            "StarPRNT" => Emulation::StarPrnt,
            "StarPRNTL" => Emulation::StarPrntL,
            "StarLine" => Emulation::StarLine,
            "StarGraphic" => Emulation::StarGraphic,
            "EscPos" => Emulation::EscPos,
            "EscPosMobile" => Emulation::EscPosMobile,
            "StarDotImpact" => Emulation::StarDotImpact,
            _ => Emulation::StarLine,
        }
    }

    /// The canonical token for this emulation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Emulation::StarPrnt => "StarPRNT",
            Emulation::StarPrntL => "StarPRNTL",
            Emulation::StarLine => "StarLine",
            Emulation::StarGraphic => "StarGraphic",
            Emulation::EscPos => "EscPos",
            Emulation::EscPosMobile => "EscPosMobile",
            Emulation::StarDotImpact => "StarDotImpact",
        }
    }

    /// The transport configuration string used when opening a port for
    /// this emulation.
    ///
    /// | Emulation | Settings |
    /// |-----------|----------|
    /// | EscPosMobile | `mini` |
    /// | EscPos | `escpos` |
    /// | StarPRNT / StarPRNTL | `Portable;l` |
    /// | all others | the emulation token unchanged |
    pub fn port_settings(&self) -> &'static str {
        match self {
            Emulation::EscPosMobile => "mini",
            Emulation::EscPos => "escpos",
            Emulation::StarPrnt | Emulation::StarPrntL => "Portable;l",
            other => other.as_str(),
        }
    }

    /// The opcode family the compiler emits for this emulation.
    pub fn command_set(&self) -> &'static dyn CommandSet {
        match self {
            Emulation::EscPos | Emulation::EscPosMobile => &ESC_POS,
            _ => &STAR_LINE,
        }
    }
}
