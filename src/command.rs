// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! Encodes and decodes the command records carried in a frame payload
//!
//! A payload holds one or more records of a single command back to back:
//!
//! - SET: `code(2) | offset(4) | length(2) | data(length)`
//! - GET: `code(2) | offset(4)`
//! - DEL: `code(2)`
//! - DAT: `code(2) | offset(4) | flags(1) | length(2) | data(length)`
//!
//! The `read_next_*` functions stream records out of a payload through a
//! caller owned cursor. DAT payloads carry a global status byte before the
//! first record, so DAT iteration starts at offset 1; everything else at 0.

use super::constant::{
    DAT_HEADER_SIZE, DEL_CMD_SIZE, GET_CMD_SIZE, SET_HEADER_SIZE, VIS_EXT_PAGE_HEADER_SIZE,
};
use super::error::Error;
use byteorder::{BigEndian, ByteOrder};

/// One SET record read back from a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCmd {
    pub code: u16,
    pub offset: u32,
    pub data: Vec<u8>,
}

/// One GET record read back from a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetCmd {
    pub code: u16,
    pub offset: u32,
}

/// One DAT record read back from a response payload.
///
/// The low four bits of `flags` carry the per record error code (0 = ok,
/// 1 = code does not exist, 2 = offset does not exist, 3 = cannot
/// read/write, 4 = wrong length, 5 = wrong data, 6 = operation unexpected,
/// 15 = generic). Bit 4 set means more data exists beyond the requested
/// offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatCmd {
    pub code: u16,
    pub offset: u32,
    pub flags: u8,
    pub data: Vec<u8>,
}

/// One VisExtensible page read back from a publication blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisExtPage {
    pub duration: u8,
    /// bit 0 flashing lamps, bit 1 time unit (0 seconds, 1 tenths),
    /// bit 2 part of an extended publication
    pub params: u8,
    /// 0: page defined by buffer, 1: page defined by pictogram code
    pub page_type: u8,
    pub page_def: Vec<u8>,
}

/// Cursor state handed out by [`read_next_vis_ext`]. `id` is the id of the
/// group the last returned page belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisExtData {
    pub id: u8,
    pub page: Option<VisExtPage>,
}

fn get_u16(payload: &[u8], offset: &mut usize) -> u16 {
    let v = BigEndian::read_u16(&payload[*offset..]);
    *offset += 2;
    v
}

fn get_u32(payload: &[u8], offset: &mut usize) -> u32 {
    let v = BigEndian::read_u32(&payload[*offset..]);
    *offset += 4;
    v
}

pub(crate) fn put_set(buf: &mut Vec<u8>, code: u16, offset: u32, data: &[u8]) {
    put_set_header(buf, code, offset, data.len() as u16);
    buf.extend_from_slice(data);
}

/// Writes a SET record header with an explicit length field. Used where the
/// data area is written separately from the declared length.
pub(crate) fn put_set_header(buf: &mut Vec<u8>, code: u16, offset: u32, length: u16) {
    buf.extend_from_slice(&code.to_be_bytes());
    buf.extend_from_slice(&offset.to_be_bytes());
    buf.extend_from_slice(&length.to_be_bytes());
}

pub(crate) fn put_get(buf: &mut Vec<u8>, code: u16, offset: u32) {
    buf.extend_from_slice(&code.to_be_bytes());
    buf.extend_from_slice(&offset.to_be_bytes());
}

pub(crate) fn put_del(buf: &mut Vec<u8>, code: u16) {
    buf.extend_from_slice(&code.to_be_bytes());
}

fn record_fits(payload: &[u8], offset: usize, need: usize) -> Result<bool, Error> {
    if payload.len() < need {
        return Err(Error::BadFrame {
            reason: "payload shorter than one record",
        });
    }
    if offset >= payload.len() {
        return Ok(false);
    }
    if offset + need > payload.len() {
        return Err(Error::BadFrame {
            reason: "truncated record",
        });
    }
    Ok(true)
}

fn take_data(payload: &[u8], offset: &mut usize, length: usize) -> Result<Vec<u8>, Error> {
    if length == 0 {
        return Ok(Vec::new());
    }
    if *offset + length > payload.len() {
        return Err(Error::BadFrame {
            reason: "record data runs past the payload",
        });
    }
    let data = payload[*offset..*offset + length].to_vec();
    *offset += length;
    Ok(data)
}

/// Reads the next SET record. `Ok(None)` means the payload is exhausted.
/// The cursor must start at 0.
pub fn read_next_set(payload: &[u8], offset: &mut usize) -> Result<Option<SetCmd>, Error> {
    if !record_fits(payload, *offset, SET_HEADER_SIZE)? {
        return Ok(None);
    }

    let code = get_u16(payload, offset);
    let data_offset = get_u32(payload, offset);
    let length = get_u16(payload, offset) as usize;
    let data = take_data(payload, offset, length)?;

    Ok(Some(SetCmd {
        code,
        offset: data_offset,
        data,
    }))
}

/// Reads the next GET record. The cursor must start at 0.
pub fn read_next_get(payload: &[u8], offset: &mut usize) -> Result<Option<GetCmd>, Error> {
    if !record_fits(payload, *offset, GET_CMD_SIZE)? {
        return Ok(None);
    }

    let code = get_u16(payload, offset);
    let data_offset = get_u32(payload, offset);

    Ok(Some(GetCmd {
        code,
        offset: data_offset,
    }))
}

/// Reads the next DEL record, which is a bare code. The cursor must start
/// at 0.
pub fn read_next_del(payload: &[u8], offset: &mut usize) -> Result<Option<u16>, Error> {
    if !record_fits(payload, *offset, DEL_CMD_SIZE)? {
        return Ok(None);
    }

    Ok(Some(get_u16(payload, offset)))
}

/// Reads the next DAT record. The first payload byte is the global status
/// byte, which this function does not examine; the cursor must start at 1
/// to skip it.
pub fn read_next_dat(payload: &[u8], offset: &mut usize) -> Result<Option<DatCmd>, Error> {
    if !record_fits(payload, *offset, DAT_HEADER_SIZE)? {
        return Ok(None);
    }

    let code = get_u16(payload, offset);
    let data_offset = get_u32(payload, offset);
    let flags = payload[*offset];
    *offset += 1;
    let length = get_u16(payload, offset) as usize;
    let data = take_data(payload, offset, length)?;

    Ok(Some(DatCmd {
        code,
        offset: data_offset,
        flags,
        data,
    }))
}

/// Streams VisExtensible pages out of a publication blob, normally the data
/// of a VIS_EXTENSIBLE SET record.
///
/// The blob starts with the declared page count, followed by groups of
/// `id(1) | pages_in_group(1) | page...`. `elements` is a caller owned
/// cookie that must start at 0: the high byte counts group headers
/// consumed (checked against the declared count when the blob ends), the
/// low byte counts pages remaining in the current group. `offset` must
/// start at 1. `data` keeps the current group id between calls.
///
/// Returns `Ok(true)` when `data` was filled with the next entry,
/// `Ok(false)` at the end of the blob.
pub fn read_next_vis_ext(
    payload: &[u8],
    offset: &mut usize,
    elements: &mut u16,
    data: &mut VisExtData,
) -> Result<bool, Error> {
    if payload.is_empty() {
        return Err(Error::BadFrame {
            reason: "empty publication blob",
        });
    }

    // A single zero byte is the cleared publication.
    if payload[0] == 0 {
        if payload.len() > 1 {
            return Err(Error::BadFrame {
                reason: "cleared publication with trailing bytes",
            });
        }
        return Ok(false);
    }

    data.page = None;
    let mut groups = (*elements >> 8) as u8;
    let mut remaining = (*elements & 0xFF) as u8;

    if *offset >= payload.len() {
        if groups != payload[0] {
            return Err(Error::BadFrame {
                reason: "page count does not match the declared total",
            });
        }
        return Ok(false);
    }

    if remaining == 0 {
        if *offset + 2 > payload.len() {
            return Err(Error::BadFrame {
                reason: "truncated page group header",
            });
        }
        data.id = payload[*offset];
        remaining = payload[*offset + 1];
        *offset += 2;

        groups = groups.wrapping_add(1);
        *elements = (*elements & 0x00FF) | ((groups as u16) << 8);

        if remaining == 0 {
            return Ok(true);
        }
    }

    if *offset + VIS_EXT_PAGE_HEADER_SIZE > payload.len() {
        return Err(Error::BadFrame {
            reason: "truncated page header",
        });
    }

    let header = &payload[*offset..*offset + VIS_EXT_PAGE_HEADER_SIZE];
    let size = BigEndian::read_u16(&header[3..5]) as usize;

    if *offset + VIS_EXT_PAGE_HEADER_SIZE + size > payload.len() {
        return Err(Error::BadFrame {
            reason: "page definition runs past the blob",
        });
    }

    data.page = Some(VisExtPage {
        duration: header[0],
        params: header[1],
        page_type: header[2],
        page_def: payload
            [*offset + VIS_EXT_PAGE_HEADER_SIZE..*offset + VIS_EXT_PAGE_HEADER_SIZE + size]
            .to_vec(),
    });
    *offset += VIS_EXT_PAGE_HEADER_SIZE + size;

    remaining -= 1;
    *elements = (*elements & 0xFF00) | remaining as u16;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_round_trip() {
        let mut payload = Vec::new();
        put_set(&mut payload, 0x7531, 0, &[20, 7, 15, 12, 30, 0]);
        put_set(&mut payload, 0x7D01, 0, &[128]);

        let mut offset = 0;
        let first = read_next_set(&payload, &mut offset).unwrap().unwrap();
        assert_eq!(first.code, 0x7531);
        assert_eq!(first.data, vec![20, 7, 15, 12, 30, 0]);

        let second = read_next_set(&payload, &mut offset).unwrap().unwrap();
        assert_eq!(second.code, 0x7D01);
        assert_eq!(second.data, vec![128]);

        assert!(read_next_set(&payload, &mut offset).unwrap().is_none());
    }

    #[test]
    fn test_get_round_trip() {
        let mut payload = Vec::new();
        put_get(&mut payload, 0x2711, 0);
        put_get(&mut payload, 0x2775, 4);

        let mut offset = 0;
        let first = read_next_get(&payload, &mut offset).unwrap().unwrap();
        assert_eq!((first.code, first.offset), (0x2711, 0));
        let second = read_next_get(&payload, &mut offset).unwrap().unwrap();
        assert_eq!((second.code, second.offset), (0x2775, 4));
        assert!(read_next_get(&payload, &mut offset).unwrap().is_none());
    }

    #[test]
    fn test_del_round_trip() {
        let mut payload = Vec::new();
        put_del(&mut payload, 0x000A);
        put_del(&mut payload, 0x7562);

        let mut offset = 0;
        assert_eq!(read_next_del(&payload, &mut offset).unwrap(), Some(0x000A));
        assert_eq!(read_next_del(&payload, &mut offset).unwrap(), Some(0x7562));
        assert_eq!(read_next_del(&payload, &mut offset).unwrap(), None);
    }

    #[test]
    fn test_dat_skips_status_byte() {
        // status byte, then one record with two data bytes
        let payload = [0x00, 0x52, 0x17, 0, 0, 0, 0, 0x00, 0x00, 0x02, 0xAB, 0xCD];
        let mut offset = 1;
        let dat = read_next_dat(&payload, &mut offset).unwrap().unwrap();
        assert_eq!(dat.code, 0x5217);
        assert_eq!(dat.flags, 0);
        assert_eq!(dat.data, vec![0xAB, 0xCD]);
        assert!(read_next_dat(&payload, &mut offset).unwrap().is_none());
    }

    #[test]
    fn test_truncated_records_error() {
        // header claims 4 data bytes, only 1 present
        let payload = [0x03, 0xEE, 0, 0, 0, 0, 0x00, 0x04, 0xAA];
        let mut offset = 0;
        assert!(read_next_set(&payload, &mut offset).is_err());

        // record header cut short
        let payload = [0x03, 0xEE, 0, 0];
        let mut offset = 0;
        assert!(read_next_get(&payload, &mut offset).is_err());
    }

    #[test]
    fn test_vis_ext_single_page() {
        // declared total 1, group id 0 with 1 page of 2 definition bytes
        let payload = [0x01, 0x00, 0x01, 0x05, 0x01, 0x01, 0x00, 0x02, 0x30, 0x39];
        let mut offset = 1;
        let mut elements = 0u16;
        let mut data = VisExtData::default();

        assert!(read_next_vis_ext(&payload, &mut offset, &mut elements, &mut data).unwrap());
        let page = data.page.as_ref().unwrap();
        assert_eq!(data.id, 0);
        assert_eq!(page.duration, 5);
        assert_eq!(page.params, 1);
        assert_eq!(page.page_type, 1);
        assert_eq!(page.page_def, vec![0x30, 0x39]);

        assert!(!read_next_vis_ext(&payload, &mut offset, &mut elements, &mut data).unwrap());
    }

    #[test]
    fn test_vis_ext_cleared_publication() {
        let mut offset = 1;
        let mut elements = 0u16;
        let mut data = VisExtData::default();
        assert!(!read_next_vis_ext(&[0x00], &mut offset, &mut elements, &mut data).unwrap());
        assert!(read_next_vis_ext(&[0x00, 0x01], &mut offset, &mut elements, &mut data).is_err());
    }

    #[test]
    fn test_vis_ext_count_mismatch() {
        // declares 2 pages but carries a single one-page group
        let payload = [0x02, 0x00, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00];
        let mut offset = 1;
        let mut elements = 0u16;
        let mut data = VisExtData::default();

        assert!(read_next_vis_ext(&payload, &mut offset, &mut elements, &mut data).unwrap());
        assert!(read_next_vis_ext(&payload, &mut offset, &mut elements, &mut data).is_err());
    }

    #[test]
    fn test_vis_ext_truncated_page() {
        // page claims 4 definition bytes, blob ends after 1
        let payload = [0x01, 0x00, 0x01, 0x05, 0x00, 0x00, 0x00, 0x04, 0xAA];
        let mut offset = 1;
        let mut elements = 0u16;
        let mut data = VisExtData::default();
        assert!(read_next_vis_ext(&payload, &mut offset, &mut elements, &mut data).is_err());
    }
}
