// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! Builders for complete MEP request frames
//!
//! Every function here returns a ready to send frame of the requested
//! [`FrameKind`](crate::constant::FrameKind), addressed to the broadcast
//! address. Group requests lead with a `CUSTOM_*` pseudo code; the device
//! echoes it in its DAT response and the response parser uses it to
//! classify the whole response.

use super::command::{put_del, put_get, put_set, put_set_header};
use super::constant::{Command, FrameKind, BROADCAST_ADDRESS};
use super::error::Error;
use super::frame::build_frame;
use super::registry::{self, CodeIo};

const TEMP_CODES: [u16; 8] = [
    registry::TEMP_1,
    registry::TEMP_2,
    registry::TEMP_3,
    registry::TEMP_4,
    registry::TEMP_5,
    registry::TEMP_6,
    registry::TEMP_7,
    registry::TEMP_8,
];

const HUMIDITY_CODES: [u16; 4] = [
    registry::HUMIDITY_1,
    registry::HUMIDITY_2,
    registry::HUMIDITY_3,
    registry::HUMIDITY_4,
];

const BRIGHTNESS_CODES: [u16; 4] = [
    registry::BRIGHTNESS_1,
    registry::BRIGHTNESS_2,
    registry::BRIGHTNESS_3,
    registry::BRIGHTNESS_4,
];

const TRAFFIC_CODES: [u16; 4] = [
    registry::TRAFFIC_LIGHT_STATUS_1,
    registry::TRAFFIC_LIGHT_STATUS_2,
    registry::TRAFFIC_LIGHT_STATUS_3,
    registry::TRAFFIC_LIGHT_STATUS_4,
];

const ENV_BRIGHTNESS_CODES: [u16; 8] = [
    registry::ENVIRONMENTAL_BRIGHTNESS_1,
    registry::ENVIRONMENTAL_BRIGHTNESS_2,
    registry::ENVIRONMENTAL_BRIGHTNESS_3,
    registry::ENVIRONMENTAL_BRIGHTNESS_4,
    registry::ENVIRONMENTAL_BRIGHTNESS_5,
    registry::ENVIRONMENTAL_BRIGHTNESS_6,
    registry::ENVIRONMENTAL_BRIGHTNESS_7,
    registry::ENVIRONMENTAL_BRIGHTNESS_8,
];

fn get_frame(kind: FrameKind, tran: u16, codes: &[u16]) -> Result<Vec<u8>, Error> {
    let mut payload = Vec::with_capacity(codes.len() * 6);
    for &code in codes {
        put_get(&mut payload, code, 0);
    }
    build_frame(kind, BROADCAST_ADDRESS, tran, Command::Get, &payload)
}

/// Builds a request for one code of a family, or for the whole family with
/// its grouping pseudo code when `code` is 0.
fn family_info(
    kind: FrameKind,
    tran: u16,
    code: u16,
    group: u16,
    family: &[u16],
) -> Result<Vec<u8>, Error> {
    if code != 0 {
        if !family.contains(&code) {
            return Err(Error::InvalidArgument {
                reason: format!("code {:#06X} is not in the requested family", code),
            });
        }
        return get_frame(kind, tran, &[code]);
    }

    let mut codes = Vec::with_capacity(family.len() + 1);
    codes.push(group);
    codes.extend_from_slice(family);
    get_frame(kind, tran, &codes)
}

/// Request the device clock.
///
/// # Examples
///
/// ```
/// use mep::constant::FrameKind;
/// use mep::message;
///
/// let frame = message::build_clock_info(FrameKind::Pptp, 0x0100).unwrap();
/// assert_eq!(frame, vec![0x00, 0x06, 0x01, 0x00, 0x81, 0x75, 0x31, 0, 0, 0, 0]);
/// ```
pub fn build_clock_info(kind: FrameKind, tran: u16) -> Result<Vec<u8>, Error> {
    get_frame(kind, tran, &[registry::CLOCK])
}

/// Request hardware and firmware identification, device id and description.
pub fn build_device_info(kind: FrameKind, tran: u16) -> Result<Vec<u8>, Error> {
    get_frame(
        kind,
        tran,
        &[
            registry::CUSTOM_DEVICE_INFO_DATA,
            registry::HARDWARE_MODEL,
            registry::FIRMWARE_MODEL,
            registry::FIRMWARE_VERSION,
            registry::FIRMWARE_RELEASE,
            registry::FIRMWARE_DEVICE_TYPE,
            registry::DEVICE_ID,
            registry::DEVICE_DESCRIPTION,
        ],
    )
}

/// Request the device status group. The codes that come back depend on the
/// firmware on the device.
pub fn build_dev_status_info(kind: FrameKind, tran: u16) -> Result<Vec<u8>, Error> {
    get_frame(
        kind,
        tran,
        &[registry::CUSTOM_STATUS_INFO_DATA, registry::STATUS],
    )
}

/// Request the diagnostic group: doors, power saving, battery, fans,
/// heating, siren and the broken element counters.
pub fn build_diagnostic_info(kind: FrameKind, tran: u16) -> Result<Vec<u8>, Error> {
    get_frame(
        kind,
        tran,
        &[
            registry::CUSTOM_DIAGNOSTIC_INFO_DATA,
            registry::DOORS_OPEN,
            registry::POWER_SAVING_STATUS,
            registry::BATTERY_LEVEL,
            registry::FANS_ACTIVE,
            registry::SIREN_ACTIVE,
            registry::HEATING_ACTIVE,
            registry::BROKEN_FANS_NUMBER,
            registry::BROKEN_BACKLIGHTS_NUMBER,
            registry::INTERNAL_ERROR_CODE,
            registry::NUM_BROKEN_LED_BOARDS,
            registry::BROKEN_LEDS_NUMBER,
        ],
    )
}

/// Ask whether the device restarted since the flag was last cleared.
pub fn build_dev_restarted_info(kind: FrameKind, tran: u16) -> Result<Vec<u8>, Error> {
    get_frame(kind, tran, &[registry::DEVICE_RESTARTED])
}

/// Request the remember-last-publication flag.
pub fn build_last_publication_info(kind: FrameKind, tran: u16) -> Result<Vec<u8>, Error> {
    get_frame(kind, tran, &[registry::REMEMBER_LAST_PUBLICATION])
}

/// Request one temperature probe, or all of them when `code` is 0.
pub fn build_temp_info(kind: FrameKind, tran: u16, code: u16) -> Result<Vec<u8>, Error> {
    family_info(
        kind,
        tran,
        code,
        registry::CUSTOM_TEMPERATURE_INFO_DATA,
        &TEMP_CODES,
    )
}

/// Request one humidity probe, or all of them when `code` is 0.
pub fn build_humidity_info(kind: FrameKind, tran: u16, code: u16) -> Result<Vec<u8>, Error> {
    family_info(
        kind,
        tran,
        code,
        registry::CUSTOM_HUMIDITY_INFO_DATA,
        &HUMIDITY_CODES,
    )
}

/// Request one brightness channel, or all of them when `code` is 0.
pub fn build_brightness_info(kind: FrameKind, tran: u16, code: u16) -> Result<Vec<u8>, Error> {
    family_info(
        kind,
        tran,
        code,
        registry::CUSTOM_BRIGHTNESS_INFO_DATA,
        &BRIGHTNESS_CODES,
    )
}

/// Request one traffic light head, or all of them when `code` is 0.
pub fn build_traffic_light_info(kind: FrameKind, tran: u16, code: u16) -> Result<Vec<u8>, Error> {
    family_info(
        kind,
        tran,
        code,
        registry::CUSTOM_TRAFFIC_INFO_DATA,
        &TRAFFIC_CODES,
    )
}

/// Request one environmental brightness sensor, or all of them when `code`
/// is 0.
pub fn build_env_brightness_info(kind: FrameKind, tran: u16, code: u16) -> Result<Vec<u8>, Error> {
    family_info(
        kind,
        tran,
        code,
        registry::CUSTOM_EBRIGHTNESS_INFO_DATA,
        &ENV_BRIGHTNESS_CODES,
    )
}

/// Reset the device.
pub fn build_reset_device(kind: FrameKind, tran: u16) -> Result<Vec<u8>, Error> {
    let mut payload = Vec::with_capacity(8);
    put_set(&mut payload, registry::RESET, 0, &[]);
    build_frame(kind, BROADCAST_ADDRESS, tran, Command::Set, &payload)
}

/// Blank the sign by writing an empty publication.
///
/// The write travels inside a nice-begin / nice-end bracket: zero length
/// VIS_EXTENSIBLE records around the data record, with the trailing one at
/// the data size, so the firmware commits the publication atomically.
pub fn build_clear_publication(kind: FrameKind, tran: u16) -> Result<Vec<u8>, Error> {
    let mut payload = Vec::with_capacity(33);
    put_set(&mut payload, registry::CUSTOM_CLEAR_PUB, 0, &[]);
    put_set(&mut payload, registry::VIS_EXTENSIBLE, 0, &[]);
    put_set(&mut payload, registry::VIS_EXTENSIBLE, 0, &[0x00]);
    put_set(&mut payload, registry::VIS_EXTENSIBLE, 1, &[]);
    build_frame(kind, BROADCAST_ADDRESS, tran, Command::Set, &payload)
}

/// Delete a code's stored value on the device. Refused for codes the
/// registry marks read only.
pub fn build_delete_code(kind: FrameKind, tran: u16, code: u16) -> Result<Vec<u8>, Error> {
    match registry::properties(code) {
        Some(prop) if prop.io != CodeIo::Read => {}
        _ => {
            return Err(Error::InvalidArgument {
                reason: format!("code {:#06X} is unknown or not writable", code),
            })
        }
    }

    let mut payload = Vec::with_capacity(4);
    put_del(&mut payload, registry::CUSTOM_DELETE_CODE);
    put_del(&mut payload, code);
    build_frame(kind, BROADCAST_ADDRESS, tran, Command::Del, &payload)
}

/// Set the device clock. `clock` is `[year, month, day, hour, minute,
/// second]` as raw bytes.
///
/// The validator accepts day 29 in every month, not just February; the
/// firmware has always tolerated it and callers rely on the leniency.
pub fn build_clock(kind: FrameKind, tran: u16, clock: &[u8; 6]) -> Result<Vec<u8>, Error> {
    const DAYS_PER_MONTH: [u8; 12] = [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

    let (month, day) = (clock[1], clock[2]);
    if month == 0
        || month > 12
        || day == 0
        || day > DAYS_PER_MONTH[month as usize - 1]
        || clock[3] > 24
        || clock[4] > 59
        || clock[5] > 59
    {
        return Err(Error::InvalidArgument {
            reason: format!("invalid clock value {:?}", clock),
        });
    }

    let mut payload = Vec::with_capacity(14);
    put_set(&mut payload, registry::CLOCK, 0, clock);
    build_frame(kind, BROADCAST_ADDRESS, tran, Command::Set, &payload)
}

/// Set the brightness channels 1..=4.
///
/// Per channel: 0 means automatic, 1..=255 a fixed level, anything above
/// 255 skips the channel entirely. At least one channel must be written.
pub fn build_brightness(kind: FrameKind, tran: u16, values: [u16; 4]) -> Result<Vec<u8>, Error> {
    let mut payload = Vec::with_capacity(8 + 9 * 4);
    put_set(&mut payload, registry::CUSTOM_SET_BRIGHTNESS, 0, &[]);

    let mut written = 0;
    for (i, &value) in values.iter().enumerate() {
        if value <= 255 {
            put_set(&mut payload, BRIGHTNESS_CODES[i], 0, &[value as u8]);
            written += 1;
        }
    }

    if written == 0 {
        return Err(Error::InvalidArgument {
            reason: "no brightness channel selected".to_string(),
        });
    }

    build_frame(kind, BROADCAST_ADDRESS, tran, Command::Set, &payload)
}

/// Tell the device whether to restore the last publication after a reboot.
pub fn build_last_publication_status(
    kind: FrameKind,
    tran: u16,
    remember: bool,
) -> Result<Vec<u8>, Error> {
    let mut payload = Vec::with_capacity(9);
    put_set(
        &mut payload,
        registry::REMEMBER_LAST_PUBLICATION,
        0,
        &[remember as u8],
    );
    build_frame(kind, BROADCAST_ADDRESS, tran, Command::Set, &payload)
}

// The id and description writes frame a fixed size data area and declare
// the real string length in the record header, exactly as the firmware
// expects them.
fn string_set(
    kind: FrameKind,
    tran: u16,
    group: u16,
    code: u16,
    max: usize,
    value: &[u8],
) -> Result<Vec<u8>, Error> {
    let len = value.len().min(max);

    let mut payload = Vec::with_capacity(16 + max);
    put_set(&mut payload, group, 0, &[]);
    put_set_header(&mut payload, code, 0, len as u16);
    payload.extend_from_slice(&value[..len]);
    payload.resize(16 + max, 0);

    build_frame(kind, BROADCAST_ADDRESS, tran, Command::Set, &payload)
}

/// Set the device id string. Silently truncated to 16 bytes.
pub fn build_device_id(kind: FrameKind, tran: u16, id: &[u8]) -> Result<Vec<u8>, Error> {
    string_set(kind, tran, registry::CUSTOM_SET_DEVID, registry::DEVICE_ID, 16, id)
}

/// Set the device description string. Silently truncated to 64 bytes.
pub fn build_device_description(kind: FrameKind, tran: u16, desc: &[u8]) -> Result<Vec<u8>, Error> {
    string_set(
        kind,
        tran,
        registry::CUSTOM_SET_DEVDESC,
        registry::DEVICE_DESCRIPTION,
        64,
        desc,
    )
}

/// Set one traffic light head.
///
/// The high byte of `value` selects the steady lamp, the low byte the
/// flashing one; in each byte exactly one of the lamp bits (1 = red,
/// 2 = orange, 4 = green) must be set.
pub fn build_traffic_light_status(
    kind: FrameKind,
    tran: u16,
    code: u16,
    value: u16,
) -> Result<Vec<u8>, Error> {
    if !TRAFFIC_CODES.contains(&code) {
        return Err(Error::InvalidArgument {
            reason: format!("code {:#06X} is not a traffic light head", code),
        });
    }

    let steady = ((value >> 8) & 0x07) as u8;
    let flashing = (value & 0x07) as u8;
    for lamp in [steady, flashing].iter() {
        if *lamp != 1 && *lamp != 2 && *lamp != 4 {
            return Err(Error::InvalidArgument {
                reason: format!("lamp pattern {:#04X} selects none or several lamps", lamp),
            });
        }
    }

    let mut payload = Vec::with_capacity(18);
    put_set(&mut payload, registry::CUSTOM_SET_TRAFFIC, 0, &[]);
    put_set(&mut payload, code, 0, &[steady, flashing]);
    build_frame(kind, BROADCAST_ADDRESS, tran, Command::Set, &payload)
}

/// Publish a pictogram by its device side code.
pub fn build_pictogram(
    kind: FrameKind,
    tran: u16,
    flashing_lamps: bool,
    picto_code: u16,
) -> Result<Vec<u8>, Error> {
    // one group, id 0, one page defined by code
    let mut blob = Vec::with_capacity(10);
    blob.extend_from_slice(&[0x01, 0x00, 0x01]);
    blob.extend_from_slice(&[0x05, flashing_lamps as u8, 0x01, 0x00, 0x02]);
    blob.extend_from_slice(&picto_code.to_be_bytes());

    let mut payload = Vec::with_capacity(42);
    put_set(&mut payload, registry::CUSTOM_SET_PICTO, 0, &[]);
    put_set(&mut payload, registry::VIS_EXTENSIBLE, 0, &[]);
    put_set(&mut payload, registry::VIS_EXTENSIBLE, 0, &blob);
    put_set(&mut payload, registry::VIS_EXTENSIBLE, blob.len() as u32, &[]);
    build_frame(kind, BROADCAST_ADDRESS, tran, Command::Set, &payload)
}
