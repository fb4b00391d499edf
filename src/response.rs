// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! Parses DAT response frames into typed items
//!
//! A response is a DAT frame: a global status byte followed by one DAT
//! record per code the device answered. The first record's code classifies
//! the whole response; requests built by this library lead with a
//! `CUSTOM_*` pseudo code, so that code comes back here as the group.
//! Records flagged "code not supported" are dropped.

use super::command::read_next_dat;
use super::constant::{Command, FrameKind};
use super::error::Error;
use super::frame::{parse_pptp, parse_uptb};
use super::registry::{self, ValueType};
use byteorder::{BigEndian, ByteOrder};

/// One answered code in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseItem {
    pub code: u16,
    /// Per record error flags, see
    /// [`DatCmd::flags`](crate::command::DatCmd::flags). 0 is ok.
    pub flag: u8,
    /// From the code registry, or derived from the data length for codes
    /// this library does not know.
    pub value_type: ValueType,
    pub data: Vec<u8>,
}

/// A parsed response, items in the order the device sent them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub tran: u16,
    /// The first record's code. For grouped requests this is the
    /// `CUSTOM_*` pseudo code the request led with.
    pub group: u16,
    pub items: Vec<ResponseItem>,
}

/// A response value interpreted according to its [`ValueType`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Binary(Vec<u8>),
    Text(String),
}

// Types for codes the registry does not know, picked by data length.
fn fallback_type(length: usize) -> ValueType {
    match length {
        0 => ValueType::Void,
        1 => ValueType::Uint8,
        2 => ValueType::Uint16,
        3 | 4 => ValueType::Binary,
        _ => ValueType::Uint32,
    }
}

impl ResponseItem {
    /// Interprets the raw bytes per the item's type. `None` for empty
    /// values and for data shorter than the type requires.
    pub fn value(&self) -> Option<Value> {
        match self.value_type {
            ValueType::Void => None,
            ValueType::Bool => self.data.first().map(|&b| Value::Bool(b != 0)),
            ValueType::Int8 => self.data.first().map(|&b| Value::Int8(b as i8)),
            ValueType::Uint8 => self.data.first().map(|&b| Value::Uint8(b)),
            ValueType::Int16 => {
                if self.data.len() < 2 {
                    return None;
                }
                Some(Value::Int16(BigEndian::read_i16(&self.data)))
            }
            ValueType::Uint16 => {
                if self.data.len() < 2 {
                    return None;
                }
                Some(Value::Uint16(BigEndian::read_u16(&self.data)))
            }
            ValueType::Int32 => {
                if self.data.len() < 4 {
                    return None;
                }
                Some(Value::Int32(BigEndian::read_i32(&self.data)))
            }
            ValueType::Uint32 => {
                if self.data.len() < 4 {
                    return None;
                }
                Some(Value::Uint32(BigEndian::read_u32(&self.data)))
            }
            ValueType::Binary => {
                if self.data.is_empty() {
                    return None;
                }
                Some(Value::Binary(self.data.clone()))
            }
            ValueType::String | ValueType::Ustring => {
                if self.data.is_empty() {
                    return None;
                }
                Some(Value::Text(String::from_utf8_lossy(&self.data).into_owned()))
            }
        }
    }
}

/// Parses a received frame as a DAT response.
///
/// `kind` says how the frame is framed; `UptbNoStx` responses cannot be
/// told apart from stream noise and are rejected. The frame must carry a
/// DAT command with a zero status byte.
pub fn parse_response(frame: &[u8], kind: FrameKind) -> Result<Response, Error> {
    let pptp = match kind {
        FrameKind::Pptp => parse_pptp(frame)?,
        FrameKind::Uptb => parse_uptb(frame)?.pptp,
        FrameKind::UptbNoStx => {
            return Err(Error::InvalidArgument {
                reason: "UoPTB frames without delimiters cannot be parsed".to_string(),
            })
        }
    };

    if pptp.cmd != Command::Dat {
        return Err(Error::NotPermitted {
            reason: "frame is not a DAT response",
        });
    }

    let status = *pptp.payload.first().ok_or(Error::BadFrame {
        reason: "DAT response without a status byte",
    })?;
    if status != 0 {
        return Err(Error::NotPermitted {
            reason: "device reported a global error",
        });
    }

    let mut response = Response {
        tran: pptp.tran,
        group: 0,
        items: Vec::new(),
    };

    let mut offset = 1;
    let mut first = true;
    while let Some(dat) = read_next_dat(&pptp.payload, &mut offset)? {
        if first {
            response.group = dat.code;
            first = false;
        }

        // the device does not know this code, nothing to report
        if dat.flags == 1 {
            continue;
        }

        let value_type = if dat.data.is_empty() {
            ValueType::Void
        } else {
            match registry::properties(dat.code) {
                Some(prop) => prop.value_type,
                None => fallback_type(dat.data.len()),
            }
        };

        response.items.push(ResponseItem {
            code: dat.code,
            flag: dat.flags,
            value_type,
            data: dat.data,
        });
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::{Command, FrameKind, BROADCAST_ADDRESS};
    use crate::frame::build_frame;

    fn dat_record(payload: &mut Vec<u8>, code: u16, flags: u8, data: &[u8]) {
        payload.extend_from_slice(&code.to_be_bytes());
        payload.extend_from_slice(&0u32.to_be_bytes());
        payload.push(flags);
        payload.extend_from_slice(&(data.len() as u16).to_be_bytes());
        payload.extend_from_slice(data);
    }

    fn dat_frame(kind: FrameKind, tran: u16, payload: &[u8]) -> Vec<u8> {
        build_frame(kind, BROADCAST_ADDRESS, tran, Command::Dat, payload).unwrap()
    }

    #[test]
    fn test_unsupported_records_are_dropped() {
        let mut payload = vec![0x00];
        dat_record(&mut payload, registry::CLOCK, 0, &[20, 7, 15, 12, 30, 0]);
        dat_record(&mut payload, registry::TEMP_1, 1, &[]);
        dat_record(&mut payload, registry::HUMIDITY_1, 0, &[55]);

        let response = parse_response(&dat_frame(FrameKind::Pptp, 9, &payload), FrameKind::Pptp).unwrap();
        assert_eq!(response.tran, 9);
        assert_eq!(response.group, registry::CLOCK);
        assert_eq!(response.items.len(), 2);
        assert_eq!(response.items[0].code, registry::CLOCK);
        assert_eq!(response.items[0].value_type, ValueType::Binary);
        assert_eq!(response.items[1].code, registry::HUMIDITY_1);
        assert_eq!(response.items[1].value(), Some(Value::Uint8(55)));
    }

    #[test]
    fn test_group_is_first_record_code() {
        let mut payload = vec![0x00];
        dat_record(&mut payload, registry::CUSTOM_TEMPERATURE_INFO_DATA, 1, &[]);
        dat_record(&mut payload, registry::TEMP_1, 0, &[0xF8]);

        let response = parse_response(&dat_frame(FrameKind::Pptp, 1, &payload), FrameKind::Pptp).unwrap();
        // the pseudo code classifies the response even though its own
        // record was dropped
        assert_eq!(response.group, registry::CUSTOM_TEMPERATURE_INFO_DATA);
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].value(), Some(Value::Int8(-8)));
    }

    #[test]
    fn test_uptb_response_round_trip() {
        let mut payload = vec![0x00];
        dat_record(&mut payload, registry::DOORS_OPEN, 0, &[1]);

        let frame = dat_frame(FrameKind::Uptb, 3, &payload);
        let response = parse_response(&frame, FrameKind::Uptb).unwrap();
        assert_eq!(response.tran, 3);
        assert_eq!(response.items[0].value(), Some(Value::Bool(true)));

        assert!(parse_response(&frame, FrameKind::UptbNoStx).is_err());
    }

    #[test]
    fn test_nonzero_status_fails() {
        let mut payload = vec![0x0F];
        dat_record(&mut payload, registry::CLOCK, 0, &[]);
        let err =
            parse_response(&dat_frame(FrameKind::Pptp, 1, &payload), FrameKind::Pptp).unwrap_err();
        assert!(matches!(err, Error::NotPermitted { .. }));
    }

    #[test]
    fn test_non_dat_frame_fails() {
        let frame = build_frame(FrameKind::Pptp, BROADCAST_ADDRESS, 1, Command::Get, &[0; 6]).unwrap();
        let err = parse_response(&frame, FrameKind::Pptp).unwrap_err();
        assert!(matches!(err, Error::NotPermitted { .. }));
    }

    #[test]
    fn test_fallback_typing_by_length() {
        let mut payload = vec![0x00];
        dat_record(&mut payload, 0x6000, 0, &[1]);
        dat_record(&mut payload, 0x6001, 0, &[1, 2]);
        dat_record(&mut payload, 0x6002, 0, &[1, 2, 3]);
        dat_record(&mut payload, 0x6003, 0, &[1, 2, 3, 4]);
        dat_record(&mut payload, 0x6004, 0, &[1, 2, 3, 4, 5]);
        dat_record(&mut payload, 0x6005, 0, &[]);

        let response = parse_response(&dat_frame(FrameKind::Pptp, 1, &payload), FrameKind::Pptp).unwrap();
        let types: Vec<ValueType> = response.items.iter().map(|i| i.value_type).collect();
        assert_eq!(
            types,
            vec![
                ValueType::Uint8,
                ValueType::Uint16,
                ValueType::Binary,
                ValueType::Binary,
                ValueType::Uint32,
                ValueType::Void,
            ]
        );
        // a known code keeps its registry type even at an odd length
        let mut payload = vec![0x00];
        dat_record(&mut payload, registry::CLOCK, 0, &[1, 2]);
        let response = parse_response(&dat_frame(FrameKind::Pptp, 1, &payload), FrameKind::Pptp).unwrap();
        assert_eq!(response.items[0].value_type, ValueType::Binary);
    }

    #[test]
    fn test_truncated_record_fails() {
        let mut payload = vec![0x00];
        dat_record(&mut payload, registry::CLOCK, 0, &[20, 7, 15, 12, 30, 0]);
        payload.truncate(payload.len() - 2);
        assert!(parse_response(&dat_frame(FrameKind::Pptp, 1, &payload), FrameKind::Pptp).is_err());
    }

    #[test]
    fn test_value_interpretation() {
        let item = |vt, data: &[u8]| ResponseItem {
            code: 0,
            flag: 0,
            value_type: vt,
            data: data.to_vec(),
        };

        assert_eq!(item(ValueType::Uint16, &[0x01, 0x02]).value(), Some(Value::Uint16(0x0102)));
        assert_eq!(
            item(ValueType::Uint32, &[0, 0, 0x30, 0x39]).value(),
            Some(Value::Uint32(12345))
        );
        assert_eq!(item(ValueType::Int8, &[0xFF]).value(), Some(Value::Int8(-1)));
        assert_eq!(
            item(ValueType::String, b"HG300").value(),
            Some(Value::Text("HG300".to_string()))
        );
        assert_eq!(item(ValueType::Bool, &[0]).value(), Some(Value::Bool(false)));
        assert_eq!(item(ValueType::Void, &[]).value(), None);
        // short data never panics
        assert_eq!(item(ValueType::Uint32, &[1]).value(), None);
        assert_eq!(item(ValueType::Uint16, &[]).value(), None);
    }
}
