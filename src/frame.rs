// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! Builds and parses the two MEP frame formats
//!
//! A PPTP frame is the bare command envelope:
//!
//! `[payload len: u16 | transaction: u16 | cmd: u8 | payload]`
//!
//! A UoPTB frame wraps the same envelope with a device address and a CRC,
//! stuffs the reserved bytes and brackets everything with STX/ETX:
//!
//! `[STX | esc( addr: u16 | payload len: u16 | transaction: u16 | cmd: u8 | payload | crc: u16 ) | ETX]`
//!
//! All multi byte fields travel big endian. The CRC covers the raw,
//! pre-escape body, CRC bytes excluded.

use super::constant::{
    Command, FrameKind, DLE, ESCAPE_INC, ETX, MAX_DATA_SIZE, MAX_FRAME_SIZE, MIN_SIZE_PPTP,
    MIN_SIZE_UPTB, STX,
};
use super::error::Error;
use byteorder::{BigEndian, ByteOrder};

const CRC_POLY: u16 = 0x1021;
const CRC_INIT: u16 = 0xFFFF;

/// A decoded PPTP frame, host ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PptpFrame {
    pub tran: u16,
    pub cmd: Command,
    pub payload: Vec<u8>,
}

/// A decoded UoPTB frame, host ordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UptbFrame {
    /// CRC as received. Always equals the recomputed value after a
    /// successful parse.
    pub crc: u16,
    pub addr: u16,
    pub pptp: PptpFrame,
}

/// Folds one byte into a CRC-16 accumulator.
/// Polynomial `0x1021`, MSB first, no final xor.
pub(crate) fn crc_byte(byte: u8, crc: &mut u16) {
    *crc ^= (byte as u16) << 8;
    for _ in 0..8 {
        if *crc & 0x8000 != 0 {
            *crc = (*crc << 1) ^ CRC_POLY;
        } else {
            *crc <<= 1;
        }
    }
}

/// CRC-16 of a whole buffer, starting from the protocol's `0xFFFF` seed.
pub fn crc_sum(data: &[u8]) -> u16 {
    let mut crc = CRC_INIT;
    for &b in data {
        crc_byte(b, &mut crc);
    }
    crc
}

fn is_reserved(byte: u8) -> bool {
    byte == STX || byte == ETX || byte == DLE
}

/// DLE-stuffs a raw body, optionally bracketing it with STX/ETX.
fn escape(raw: &[u8], delimiters: bool) -> Result<Vec<u8>, Error> {
    let stuffed = raw.iter().filter(|&&b| is_reserved(b)).count();
    let total = raw.len() + stuffed + if delimiters { 2 } else { 0 };

    if total > MAX_FRAME_SIZE {
        return Err(Error::BadFrame {
            reason: "escaped frame exceeds the frame ceiling",
        });
    }

    let mut out = Vec::with_capacity(total);
    if delimiters {
        out.push(STX);
    }
    for &b in raw {
        if is_reserved(b) {
            out.push(DLE);
            out.push(b.wrapping_add(ESCAPE_INC));
        } else {
            out.push(b);
        }
    }
    if delimiters {
        out.push(ETX);
    }

    Ok(out)
}

/// Unstuffs bytes from `src` until `dest` is full, folding each produced
/// byte into `crc` when one is given. Returns the number of source bytes
/// consumed. Stops without filling `dest` on ETX or source exhaustion,
/// which is an error here: the caller always knows how many bytes it wants.
fn unescape_into(src: &[u8], dest: &mut [u8], mut crc: Option<&mut u16>) -> Result<usize, Error> {
    let mut i = 0;
    let mut j = 0;

    while j < dest.len() && i < src.len() && src[i] != ETX {
        let byte = if src[i] == DLE {
            if i + 1 == src.len() {
                return Err(Error::MalformedSequence {
                    reason: "partial escape at end of input",
                });
            }
            i += 1;
            match src[i] {
                b if b == STX.wrapping_add(ESCAPE_INC)
                    || b == ETX.wrapping_add(ESCAPE_INC)
                    || b == DLE.wrapping_add(ESCAPE_INC) =>
                {
                    b.wrapping_sub(ESCAPE_INC)
                }
                _ => {
                    return Err(Error::BadFrame {
                        reason: "illegal byte after DLE",
                    })
                }
            }
        } else {
            src[i]
        };

        dest[j] = byte;
        if let Some(acc) = crc.as_deref_mut() {
            crc_byte(byte, acc);
        }
        i += 1;
        j += 1;
    }

    if j != dest.len() {
        return Err(Error::MalformedSequence {
            reason: "frame ended before the expected byte count",
        });
    }

    Ok(i)
}

/// Assembles a complete frame of the requested kind.
///
/// Rejects payloads above [`MAX_DATA_SIZE`](crate::constant::MAX_DATA_SIZE)
/// and frames that would exceed
/// [`MAX_FRAME_SIZE`](crate::constant::MAX_FRAME_SIZE) once escaped.
///
/// # Examples
///
/// ```
/// use mep::constant::{Command, FrameKind};
/// use mep::frame;
///
/// // GET clock, transaction 0x0100
/// let payload = [0x75, 0x31, 0, 0, 0, 0];
/// let frame = frame::build_frame(FrameKind::Pptp, 0xFFFE, 0x0100, Command::Get, &payload).unwrap();
/// assert_eq!(frame, vec![0x00, 0x06, 0x01, 0x00, 0x81, 0x75, 0x31, 0, 0, 0, 0]);
/// ```
pub fn build_frame(
    kind: FrameKind,
    addr: u16,
    tran: u16,
    cmd: Command,
    payload: &[u8],
) -> Result<Vec<u8>, Error> {
    if payload.len() > MAX_DATA_SIZE {
        return Err(Error::BadFrame {
            reason: "payload exceeds the data ceiling",
        });
    }

    match kind {
        FrameKind::Pptp => {
            let mut raw = Vec::with_capacity(5 + payload.len());
            raw.extend_from_slice(&(payload.len() as u16).to_be_bytes());
            raw.extend_from_slice(&tran.to_be_bytes());
            raw.push(cmd as u8);
            raw.extend_from_slice(payload);
            Ok(raw)
        }
        FrameKind::Uptb | FrameKind::UptbNoStx => {
            let mut raw = Vec::with_capacity(9 + payload.len());
            raw.extend_from_slice(&addr.to_be_bytes());
            raw.extend_from_slice(&(payload.len() as u16).to_be_bytes());
            raw.extend_from_slice(&tran.to_be_bytes());
            raw.push(cmd as u8);
            raw.extend_from_slice(payload);
            let crc = crc_sum(&raw);
            raw.extend_from_slice(&crc.to_be_bytes());
            escape(&raw, kind == FrameKind::Uptb)
        }
    }
}

/// Validates a PPTP frame and returns a host ordered copy.
pub fn parse_pptp(frame: &[u8]) -> Result<PptpFrame, Error> {
    if frame.len() < MIN_SIZE_PPTP {
        return Err(Error::BadFrame {
            reason: "frame shorter than the PPTP minimum",
        });
    }

    let cmd = Command::from_wire(frame[4]).ok_or(Error::BadFrame {
        reason: "unknown command",
    })?;

    let dlen = BigEndian::read_u16(&frame[0..2]) as usize;
    if dlen > MAX_DATA_SIZE || dlen != frame.len() - 5 {
        return Err(Error::BadFrame {
            reason: "payload length does not match the frame",
        });
    }

    Ok(PptpFrame {
        tran: BigEndian::read_u16(&frame[2..4]),
        cmd,
        payload: frame[5..].to_vec(),
    })
}

/// Decodes and validates a UoPTB frame: delimiters, escape sequences,
/// declared sizes and CRC. Frames without STX/ETX are not accepted here;
/// they cannot be told apart from stream noise.
pub fn parse_uptb(frame: &[u8]) -> Result<UptbFrame, Error> {
    if frame.len() < MIN_SIZE_UPTB || frame[0] != STX || frame[frame.len() - 1] != ETX {
        return Err(Error::BadFrame {
            reason: "missing delimiters or below the UoPTB minimum",
        });
    }

    let mut crc_acc = CRC_INIT;
    let mut pos = 1;

    // addr, payload len, transaction, cmd
    let mut header = [0u8; 7];
    pos += unescape_into(&frame[pos..], &mut header, Some(&mut crc_acc))?;

    let cmd = Command::from_wire(header[6]).ok_or(Error::BadFrame {
        reason: "unknown command",
    })?;

    let addr = BigEndian::read_u16(&header[0..2]);
    let dlen = BigEndian::read_u16(&header[2..4]) as usize;
    let tran = BigEndian::read_u16(&header[4..6]);

    if dlen > MAX_DATA_SIZE {
        return Err(Error::BadFrame {
            reason: "payload exceeds the data ceiling",
        });
    }

    let mut payload = vec![0u8; dlen];
    pos += unescape_into(&frame[pos..], &mut payload, Some(&mut crc_acc))?;

    let mut crc_buf = [0u8; 2];
    pos += unescape_into(&frame[pos..], &mut crc_buf, None)?;

    // Only the ETX may remain.
    if pos + 1 != frame.len() {
        return Err(Error::MalformedSequence {
            reason: "trailing bytes before ETX",
        });
    }

    let crc = BigEndian::read_u16(&crc_buf);
    if crc != crc_acc {
        return Err(Error::BadFrame {
            reason: "CRC mismatch",
        });
    }

    Ok(UptbFrame {
        crc,
        addr,
        pptp: PptpFrame { tran, cmd, payload },
    })
}
