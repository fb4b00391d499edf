// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! The MEP codes known to this library and their static properties

/// The MEP data types a code can carry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValueType {
    Void,
    Bool,
    Int8,
    Int16,
    Int32,
    Uint8,
    Uint16,
    Uint32,
    Binary,
    String,
    Ustring,
}

/// The I/O operations a code supports on the device.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CodeIo {
    Read = 1,
    Write,
    ReadWrite,
}

pub const STATUS: u16 = 0x0000;
pub const HARDWARE_MODEL: u16 = 0x0001;
pub const FIRMWARE_MODEL: u16 = 0x0002;
pub const FIRMWARE_VERSION: u16 = 0x0003;
pub const FIRMWARE_RELEASE: u16 = 0x0004;
pub const FIRMWARE_DEVICE_TYPE: u16 = 0x0005;
pub const DEVICE_ID: u16 = 0x000A;
pub const DEVICE_DESCRIPTION: u16 = 0x000B;
pub const RESET: u16 = 0x0066;
pub const VIS_EXTENSIBLE: u16 = 0x03EE;
pub const TEMP_1: u16 = 0x2711;
pub const TEMP_2: u16 = 0x2712;
pub const TEMP_3: u16 = 0x2713;
pub const TEMP_4: u16 = 0x2714;
pub const TEMP_5: u16 = 0x2715;
pub const TEMP_6: u16 = 0x2716;
pub const TEMP_7: u16 = 0x2717;
pub const TEMP_8: u16 = 0x2718;
pub const HUMIDITY_1: u16 = 0x2775;
pub const HUMIDITY_2: u16 = 0x2776;
pub const HUMIDITY_3: u16 = 0x2777;
pub const HUMIDITY_4: u16 = 0x2778;
pub const ENVIRONMENTAL_BRIGHTNESS_1: u16 = 0x27D9;
pub const ENVIRONMENTAL_BRIGHTNESS_2: u16 = 0x27DA;
pub const ENVIRONMENTAL_BRIGHTNESS_3: u16 = 0x27DB;
pub const ENVIRONMENTAL_BRIGHTNESS_4: u16 = 0x27DC;
pub const ENVIRONMENTAL_BRIGHTNESS_5: u16 = 0x27DD;
pub const ENVIRONMENTAL_BRIGHTNESS_6: u16 = 0x27DE;
pub const ENVIRONMENTAL_BRIGHTNESS_7: u16 = 0x27DF;
pub const ENVIRONMENTAL_BRIGHTNESS_8: u16 = 0x27E0;
pub const LED_BRIGHTNESS_OUTPUT: u16 = 0x4E84;
pub const LED_OUTPUT_PERCENTAGE: u16 = 0x4E85;
pub const DEVICE_RESTARTED: u16 = 0x5209;
pub const DOORS_OPEN: u16 = 0x520A;
pub const INTERNAL_ERROR_CODE: u16 = 0x5217;
pub const POWER_SAVING_STATUS: u16 = 0x521C;
pub const BATTERY_LEVEL: u16 = 0x521D;
pub const FANS_ACTIVE: u16 = 0x55F1;
pub const HEATING_ACTIVE: u16 = 0x55F2;
pub const SIREN_ACTIVE: u16 = 0x55F3;
pub const BROKEN_FANS_NUMBER: u16 = 0x59D9;
pub const BROKEN_LEDS_NUMBER: u16 = 0x59DB;
pub const BROKEN_BACKLIGHTS_NUMBER: u16 = 0x59DD;
pub const NUM_BROKEN_LED_BOARDS: u16 = 0x59DF;
pub const CLOCK: u16 = 0x7531;
pub const COLORS_CALIBRATION: u16 = 0x7562;
pub const BRIGHTNESS_1: u16 = 0x7D01;
pub const BRIGHTNESS_2: u16 = 0x7D02;
pub const BRIGHTNESS_3: u16 = 0x7D03;
pub const BRIGHTNESS_4: u16 = 0x7D04;
pub const REMEMBER_LAST_PUBLICATION: u16 = 0x811A;
pub const TRAFFIC_LIGHT_STATUS_1: u16 = 0x814C;
pub const TRAFFIC_LIGHT_STATUS_2: u16 = 0x814D;
pub const TRAFFIC_LIGHT_STATUS_3: u16 = 0x814E;
pub const TRAFFIC_LIGHT_STATUS_4: u16 = 0x814F;

// Pseudo codes grouping a set of MEP codes. A device echoes the leading
// pseudo code of a request back in its DAT response, which is how the
// response parser classifies a whole response.
pub const CUSTOM_SET_TEXT: u16 = 0xFDE8;
pub const CUSTOM_SET_PICTO: u16 = 0xFDE9;
pub const CUSTOM_SET_DEVID: u16 = 0xFDEA;
pub const CUSTOM_SET_TRAFFIC: u16 = 0xFDEB;
pub const CUSTOM_SET_DEVDESC: u16 = 0xFDEC;
pub const CUSTOM_SET_BRIGHTNESS: u16 = 0xFDED;
pub const CUSTOM_CLEAR_PUB: u16 = 0xFDEE;
pub const CUSTOM_DELETE_CODE: u16 = 0xFDEF;
pub const CUSTOM_STATUS_INFO_DATA: u16 = 0xFDF0;
pub const CUSTOM_DEVICE_INFO_DATA: u16 = 0xFDF1;
pub const CUSTOM_TRAFFIC_INFO_DATA: u16 = 0xFDF2;
pub const CUSTOM_HUMIDITY_INFO_DATA: u16 = 0xFDF3;
pub const CUSTOM_BRIGHTNESS_INFO_DATA: u16 = 0xFDF4;
pub const CUSTOM_DIAGNOSTIC_INFO_DATA: u16 = 0xFDF5;
pub const CUSTOM_TEMPERATURE_INFO_DATA: u16 = 0xFDF6;
pub const CUSTOM_EBRIGHTNESS_INFO_DATA: u16 = 0xFDF7;

/// Static properties of one MEP code.
#[derive(Debug, Copy, Clone)]
pub struct CodeProperties {
    pub code: u16,
    /// Whether the code supports the nice-begin / nice-end write idiom.
    pub nice_begin_end: bool,
    pub io: CodeIo,
    pub value_type: ValueType,
}

const fn row(code: u16, nice_begin_end: bool, io: CodeIo, value_type: ValueType) -> CodeProperties {
    CodeProperties {
        code,
        nice_begin_end,
        io,
        value_type,
    }
}

// Sorted by code so lookups can binary search.
static CODE_TABLE: [CodeProperties; 53] = [
    row(STATUS, false, CodeIo::Read, ValueType::Void),
    row(HARDWARE_MODEL, false, CodeIo::Read, ValueType::String),
    row(FIRMWARE_MODEL, false, CodeIo::Read, ValueType::String),
    row(FIRMWARE_VERSION, false, CodeIo::Read, ValueType::String),
    row(FIRMWARE_RELEASE, false, CodeIo::Read, ValueType::String),
    row(FIRMWARE_DEVICE_TYPE, false, CodeIo::ReadWrite, ValueType::Uint8),
    row(DEVICE_ID, false, CodeIo::ReadWrite, ValueType::String),
    row(DEVICE_DESCRIPTION, true, CodeIo::ReadWrite, ValueType::String),
    row(RESET, false, CodeIo::Write, ValueType::Void),
    row(VIS_EXTENSIBLE, false, CodeIo::ReadWrite, ValueType::Binary),
    row(TEMP_1, false, CodeIo::Read, ValueType::Int8),
    row(TEMP_2, false, CodeIo::Read, ValueType::Int8),
    row(TEMP_3, false, CodeIo::Read, ValueType::Int8),
    row(TEMP_4, false, CodeIo::Read, ValueType::Int8),
    row(TEMP_5, false, CodeIo::Read, ValueType::Int8),
    row(TEMP_6, false, CodeIo::Read, ValueType::Int8),
    row(TEMP_7, false, CodeIo::Read, ValueType::Int8),
    row(TEMP_8, false, CodeIo::Read, ValueType::Int8),
    row(HUMIDITY_1, false, CodeIo::Read, ValueType::Uint8),
    row(HUMIDITY_2, false, CodeIo::Read, ValueType::Uint8),
    row(HUMIDITY_3, false, CodeIo::Read, ValueType::Uint8),
    row(HUMIDITY_4, false, CodeIo::Read, ValueType::Uint8),
    row(ENVIRONMENTAL_BRIGHTNESS_1, false, CodeIo::Read, ValueType::Uint8),
    row(ENVIRONMENTAL_BRIGHTNESS_2, false, CodeIo::Read, ValueType::Uint8),
    row(ENVIRONMENTAL_BRIGHTNESS_3, false, CodeIo::Read, ValueType::Uint8),
    row(ENVIRONMENTAL_BRIGHTNESS_4, false, CodeIo::Read, ValueType::Uint8),
    row(ENVIRONMENTAL_BRIGHTNESS_5, false, CodeIo::Read, ValueType::Uint8),
    row(ENVIRONMENTAL_BRIGHTNESS_6, false, CodeIo::Read, ValueType::Uint8),
    row(ENVIRONMENTAL_BRIGHTNESS_7, false, CodeIo::Read, ValueType::Uint8),
    row(ENVIRONMENTAL_BRIGHTNESS_8, false, CodeIo::Read, ValueType::Uint8),
    row(DEVICE_RESTARTED, false, CodeIo::Read, ValueType::Bool),
    row(DOORS_OPEN, false, CodeIo::Read, ValueType::Bool),
    row(INTERNAL_ERROR_CODE, false, CodeIo::Read, ValueType::Uint16),
    row(POWER_SAVING_STATUS, false, CodeIo::Read, ValueType::Uint8),
    row(BATTERY_LEVEL, false, CodeIo::ReadWrite, ValueType::Uint8),
    row(FANS_ACTIVE, false, CodeIo::Read, ValueType::Bool),
    row(HEATING_ACTIVE, false, CodeIo::Read, ValueType::Bool),
    row(SIREN_ACTIVE, false, CodeIo::Read, ValueType::Bool),
    row(BROKEN_FANS_NUMBER, false, CodeIo::Read, ValueType::Uint8),
    row(BROKEN_LEDS_NUMBER, false, CodeIo::Read, ValueType::Uint32),
    row(BROKEN_BACKLIGHTS_NUMBER, false, CodeIo::Read, ValueType::Uint8),
    row(NUM_BROKEN_LED_BOARDS, false, CodeIo::Read, ValueType::Uint16),
    row(CLOCK, false, CodeIo::ReadWrite, ValueType::Binary),
    row(COLORS_CALIBRATION, false, CodeIo::ReadWrite, ValueType::Binary),
    row(BRIGHTNESS_1, false, CodeIo::ReadWrite, ValueType::Uint8),
    row(BRIGHTNESS_2, false, CodeIo::ReadWrite, ValueType::Uint8),
    row(BRIGHTNESS_3, false, CodeIo::ReadWrite, ValueType::Uint8),
    row(BRIGHTNESS_4, false, CodeIo::ReadWrite, ValueType::Uint8),
    row(REMEMBER_LAST_PUBLICATION, false, CodeIo::ReadWrite, ValueType::Bool),
    row(TRAFFIC_LIGHT_STATUS_1, false, CodeIo::ReadWrite, ValueType::Binary),
    row(TRAFFIC_LIGHT_STATUS_2, false, CodeIo::ReadWrite, ValueType::Binary),
    row(TRAFFIC_LIGHT_STATUS_3, false, CodeIo::ReadWrite, ValueType::Binary),
    row(TRAFFIC_LIGHT_STATUS_4, false, CodeIo::ReadWrite, ValueType::Binary),
];

/// Looks up the properties of a code. `None` means the code is unknown to
/// this library, not that the device will reject it.
pub fn properties(code: u16) -> Option<&'static CodeProperties> {
    CODE_TABLE
        .binary_search_by_key(&code, |p| p.code)
        .ok()
        .map(|i| &CODE_TABLE[i])
}

/// All codes in the table, in code order. Useful to enumerate what the
/// library understands.
pub fn known_codes() -> impl Iterator<Item = &'static CodeProperties> {
    CODE_TABLE.iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        // binary_search is only sound over a sorted table
        for pair in CODE_TABLE.windows(2) {
            assert!(pair[0].code < pair[1].code, "table out of order at {:#06X}", pair[1].code);
        }
    }

    #[test]
    fn test_lookup() {
        let clock = properties(CLOCK).unwrap();
        assert_eq!(clock.value_type, ValueType::Binary);
        assert_eq!(clock.io, CodeIo::ReadWrite);

        let desc = properties(DEVICE_DESCRIPTION).unwrap();
        assert!(desc.nice_begin_end);

        assert!(properties(0x1234).is_none());
        // declared codes that the table deliberately leaves out
        assert!(properties(LED_BRIGHTNESS_OUTPUT).is_none());
        assert!(properties(LED_OUTPUT_PERCENTAGE).is_none());
        // pseudo codes have no properties either
        assert!(properties(CUSTOM_SET_TEXT).is_none());
    }

    #[test]
    fn test_read_only_codes_are_marked() {
        assert_eq!(properties(TEMP_1).unwrap().io, CodeIo::Read);
        assert_eq!(properties(RESET).unwrap().io, CodeIo::Write);
    }
}
