// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! Protocol constants shared by the frame and command codecs

/// The two MEP frame formats, plus the delimiter-less UoPTB variant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameKind {
    /// Basic framed format. No CRC, no delimiters.
    Pptp,
    /// UoPTB: address + CRC, DLE stuffed, bracketed by STX/ETX.
    Uptb,
    /// UoPTB without the STX/ETX bytes. Framing is up to the caller.
    UptbNoStx,
}

/// MEP commands. The gzip variants are not supported.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Set = 0x80,
    Get = 0x81,
    Del = 0x82,
    Dat = 0x83,
}

impl Command {
    /// Validates a wire byte. Anything outside `0x80..=0x83` is rejected.
    pub fn from_wire(byte: u8) -> Option<Command> {
        match byte {
            0x80 => Some(Command::Set),
            0x81 => Some(Command::Get),
            0x82 => Some(Command::Del),
            0x83 => Some(Command::Dat),
            _ => None,
        }
    }
}

/// Start of transmission delimiter.
pub const STX: u8 = 0x02;
/// End of transmission delimiter.
pub const ETX: u8 = 0x03;
/// Escape byte. Reserved bytes inside a UoPTB body are sent as `DLE, byte + 0x80`.
pub const DLE: u8 = 0x10;

/// Added to a reserved byte when it is escaped.
pub(crate) const ESCAPE_INC: u8 = 0x80;

/// Ceiling for a complete frame, delimiters included.
pub const MAX_FRAME_SIZE: usize = 0x4000;
/// Ceiling for the payload carried by a single frame.
pub const MAX_DATA_SIZE: usize = 0x1FF7;

/// Minimum byte count of a well formed UoPTB frame.
pub const MIN_SIZE_UPTB: usize = 0x000D;
/// Minimum byte count of a well formed PPTP frame.
pub const MIN_SIZE_PPTP: usize = 0x0007;

/// Address that reaches every device on the line.
pub const BROADCAST_ADDRESS: u16 = 0xFFFE;

// Wire sizes of the command record headers.
pub(crate) const SET_HEADER_SIZE: usize = 8;
pub(crate) const GET_CMD_SIZE: usize = 6;
pub(crate) const DEL_CMD_SIZE: usize = 2;
pub(crate) const DAT_HEADER_SIZE: usize = 9;
pub(crate) const VIS_EXT_PAGE_HEADER_SIZE: usize = 5;
