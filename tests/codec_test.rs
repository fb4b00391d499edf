extern crate mep;

use mep::command::{read_next_dat, read_next_get};
use mep::constant::{Command, FrameKind, BROADCAST_ADDRESS, DLE, ETX, STX};
use mep::frame::{build_frame, crc_sum, parse_pptp, parse_uptb};
use mep::layout::{build_text, HAlign, PanelData, TextPage, TextRow, VAlign};
use mep::message;
use mep::registry;
use mep::response::parse_response;
use proptest::prelude::*;

fn dat_record(payload: &mut Vec<u8>, code: u16, flags: u8, data: &[u8]) {
    payload.extend_from_slice(&code.to_be_bytes());
    payload.extend_from_slice(&0u32.to_be_bytes());
    payload.push(flags);
    payload.extend_from_slice(&(data.len() as u16).to_be_bytes());
    payload.extend_from_slice(data);
}

// S1: a PPTP clock request byte for byte, and back
#[test]
fn test_pptp_get_round_trip() {
    let frame = message::build_clock_info(FrameKind::Pptp, 0x0100).unwrap();
    assert_eq!(hex::encode(&frame), "0006010081753100000000");

    let parsed = parse_pptp(&frame).unwrap();
    assert_eq!(parsed.payload.len(), 6);
    assert_eq!(parsed.tran, 0x0100);
    assert_eq!(parsed.cmd, Command::Get);

    let mut offset = 0;
    let get = read_next_get(&parsed.payload, &mut offset).unwrap().unwrap();
    assert_eq!(get.code, 0x7531);
    assert_eq!(get.offset, 0);
}

// S2: a code containing the ETX byte travels stuffed and comes back intact
#[test]
fn test_uptb_escape_round_trip() {
    let frame = build_frame(
        FrameKind::Uptb,
        BROADCAST_ADDRESS,
        0x0002,
        Command::Del,
        &[0x00, 0x03],
    )
    .unwrap();

    assert!(frame.windows(2).any(|w| w == [0x10, 0x83]));

    let parsed = parse_uptb(&frame).unwrap();
    assert_eq!(parsed.addr, 0xFFFE);
    assert_eq!(parsed.pptp.tran, 0x0002);
    assert_eq!(parsed.pptp.payload, vec![0x00, 0x03]);

    // the received CRC matches a recomputation over the raw body
    let mut raw = Vec::new();
    raw.extend_from_slice(&parsed.addr.to_be_bytes());
    raw.extend_from_slice(&(parsed.pptp.payload.len() as u16).to_be_bytes());
    raw.extend_from_slice(&parsed.pptp.tran.to_be_bytes());
    raw.push(parsed.pptp.cmd as u8);
    raw.extend_from_slice(&parsed.pptp.payload);
    assert_eq!(parsed.crc, crc_sum(&raw));
}

// S3: an unsupported record disappears, the rest survive in order
#[test]
fn test_response_drops_unsupported_record() {
    let mut payload = vec![0x00];
    dat_record(&mut payload, registry::CLOCK, 0, &[20, 7, 15, 12, 30, 0]);
    dat_record(&mut payload, registry::TEMP_1, 1, &[]);
    dat_record(&mut payload, registry::HUMIDITY_1, 0, &[60]);

    let frame = build_frame(
        FrameKind::Pptp,
        BROADCAST_ADDRESS,
        0x0007,
        Command::Dat,
        &payload,
    )
    .unwrap();

    let response = parse_response(&frame, FrameKind::Pptp).unwrap();
    assert_eq!(response.group, registry::CLOCK);
    assert_eq!(response.items.len(), 2);
    assert_eq!(response.items[0].code, registry::CLOCK);
    assert_eq!(response.items[1].code, registry::HUMIDITY_1);
}

// S4: brightness channels above 255 are skipped
#[test]
fn test_brightness_partial_set_sizes() {
    let frame = message::build_brightness(FrameKind::Pptp, 1, [300, 0, 255, 128]).unwrap();
    let parsed = parse_pptp(&frame).unwrap();
    assert_eq!(parsed.payload.len(), 8 + 3 * 9);
}

// S5: alignment arithmetic lands the cursor where the sign expects it
#[test]
fn test_text_page_alignment() {
    let panel = PanelData {
        fans: 0,
        back_lights: 0,
        led_boards: 0,
        ops_humidity: 0,
        ops_temp: [0, 0],
        font_size: [5, 7],
        panel_size: [60, 16],
    };

    let mut page = TextPage::new(vec![TextRow::new(b"HI".to_vec()), TextRow::new(b"OK".to_vec())]);
    page.row_spacing = 1;
    page.v_align = VAlign::Center;
    for row in page.rows.iter_mut() {
        row.col_spacing = 1;
        row.h_align = HAlign::Center;
    }

    let frame = build_text(FrameKind::Pptp, 1, &[page], &panel).unwrap();
    let payload = parse_pptp(&frame).unwrap().payload;

    let expect_row1 = b"\x17\x51\x30\x30\x30\x30\x31\x38"; // 000,018
    let expect_row2 = b"\x17\x51\x30\x30\x38\x30\x31\x38"; // 008,018
    assert!(payload.windows(8).any(|w| w == expect_row1));
    assert!(payload.windows(8).any(|w| w == expect_row2));
}

// S6: a flipped payload bit fails the CRC
#[test]
fn test_crc_tamper_detected() {
    let frame = build_frame(
        FrameKind::Uptb,
        BROADCAST_ADDRESS,
        0x0001,
        Command::Set,
        &[0x75, 0x31, 0x00, 0x00, 0x00, 0x00, 0x00, 0x06],
    )
    .unwrap();
    assert!(parse_uptb(&frame).is_ok());

    // no reserved bytes in header or payload, so the payload starts at
    // index 8 of the escaped stream; flip a bit that cannot create one
    let mut tampered = frame.clone();
    tampered[9] ^= 0x40;
    assert!(parse_uptb(&tampered).is_err());
}

proptest! {
    // Stuffed frames always decode back to the bytes that went in, and
    // stuffing costs at most one extra byte per reserved byte.
    #[test]
    fn prop_escape_round_trip(payload in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let frame = build_frame(FrameKind::Uptb, BROADCAST_ADDRESS, 0x1234, Command::Set, &payload).unwrap();
        prop_assert_eq!(frame[0], STX);
        prop_assert_eq!(frame[frame.len() - 1], ETX);

        let raw_len = 9 + payload.len() + 2;
        let reserved = payload.iter().filter(|&&b| b == STX || b == ETX || b == DLE).count();
        // header and CRC contribute at most 9 more stuffed bytes
        prop_assert!(frame.len() <= 2 + raw_len + reserved + 9);

        let parsed = parse_uptb(&frame).unwrap();
        prop_assert_eq!(parsed.pptp.payload, payload);
    }

    // Parsing is deterministic: the same frame yields the same normal form.
    #[test]
    fn prop_parse_deterministic(payload in proptest::collection::vec(any::<u8>(), 0..512), tran in any::<u16>()) {
        let frame = build_frame(FrameKind::Uptb, BROADCAST_ADDRESS, tran, Command::Dat, &payload).unwrap();
        let first = parse_uptb(&frame).unwrap();
        let second = parse_uptb(&frame).unwrap();
        prop_assert_eq!(first, second);
    }

    // Any command byte outside 0x80..=0x83 is rejected by both parsers.
    #[test]
    fn prop_invalid_cmd_rejected(cmd in any::<u8>().prop_filter("outside the command range", |c| !(0x80..=0x83).contains(c))) {
        let mut pptp = build_frame(FrameKind::Pptp, 0, 1, Command::Get, &[0; 6]).unwrap();
        pptp[4] = cmd;
        prop_assert!(parse_pptp(&pptp).is_err());
    }

    // The ceiling holds for every kind.
    #[test]
    fn prop_ceiling_enforced(extra in 1usize..64) {
        let payload = vec![0u8; 0x1FF7 + extra];
        prop_assert!(build_frame(FrameKind::Pptp, 0, 0, Command::Set, &payload).is_err());
        prop_assert!(build_frame(FrameKind::Uptb, 0, 0, Command::Set, &payload).is_err());
        prop_assert!(build_frame(FrameKind::UptbNoStx, 0, 0, Command::Set, &payload).is_err());
    }

    // The traffic light builder accepts exactly the one-lamp-per-byte
    // patterns.
    #[test]
    fn prop_traffic_light_guard(value in any::<u16>()) {
        let steady = (value >> 8) & 0x07;
        let flashing = value & 0x07;
        let valid = [1, 2, 4].contains(&steady) && [1, 2, 4].contains(&flashing);

        let built = message::build_traffic_light_status(
            FrameKind::Pptp,
            1,
            registry::TRAFFIC_LIGHT_STATUS_2,
            value,
        );
        prop_assert_eq!(built.is_ok(), valid);
    }

    // DAT payloads built from records always stream back out record by
    // record.
    #[test]
    fn prop_dat_stream_round_trip(records in proptest::collection::vec((any::<u16>(), proptest::collection::vec(any::<u8>(), 0..32)), 1..8)) {
        let mut payload = vec![0x00];
        for (code, data) in records.iter() {
            dat_record(&mut payload, *code, 0, data);
        }

        let mut offset = 1;
        let mut seen = Vec::new();
        while let Some(dat) = read_next_dat(&payload, &mut offset).unwrap() {
            seen.push((dat.code, dat.data));
        }
        prop_assert_eq!(seen, records);
    }
}
