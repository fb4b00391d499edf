// Copyright 2019 Petar Dambovaliev. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! Builds multi page text publications positioned by panel geometry
//!
//! A text publication is a VIS_EXTENSIBLE write whose blob carries one
//! VisExtensible page per [`TextPage`]. Each page is an inline stream of
//! drawing commands (`0x17`-prefixed escape sequences for color, blinking,
//! scrolling, cursor position, spacing and font selection) interleaved with
//! the literal row bytes. The cursor position for every row comes from the
//! alignment arithmetic over the panel and font dimensions.

use super::command::{put_set, put_set_header};
use super::constant::{Command, FrameKind, BROADCAST_ADDRESS, MAX_DATA_SIZE};
use super::error::Error;
use super::frame::build_frame;
use super::registry;
use byteorder::{BigEndian, ByteOrder};

/// Physical description of the panel the text is laid out for.
///
/// `font_size` and `panel_size` are `[horizontal, vertical]` led counts.
/// `ops_temp` is `[coldest, hottest]` operating temperature in °C.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelData {
    pub fans: u8,
    pub back_lights: u8,
    pub led_boards: u16,
    /// Maximum operating humidity, percent.
    pub ops_humidity: u16,
    pub ops_temp: [i8; 2],
    pub font_size: [u16; 2],
    pub panel_size: [u16; 2],
}

/// Horizontal alignment of one row.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

/// Vertical alignment of a page.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

/// Basic text colors for panels without RGBY support.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BasicColor {
    Red = 1,
    Green,
    Blue,
    Yellow,
    White,
}

/// Row color selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Color {
    /// Leave the panel default.
    None,
    Basic(BasicColor),
    /// Red, green, blue, yellow intensity as ASCII hex digits `'0'..='F'`.
    /// Ignored unless all four bytes are hex digits.
    Rgby([u8; 4]),
}

/// One row of a text page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRow {
    pub text: Vec<u8>,
    /// Led columns between letters, 0..=9. Out of range values fall back
    /// to 0.
    pub col_spacing: u8,
    pub h_align: HAlign,
    /// Proportional font. Disables horizontal alignment and truncation for
    /// the row, letter widths vary.
    pub compact_font: bool,
    /// 0 static, 1 slow .. 9 fast.
    pub scrolling_speed: u8,
    pub color: Color,
}

impl TextRow {
    pub fn new(text: impl Into<Vec<u8>>) -> TextRow {
        TextRow {
            text: text.into(),
            col_spacing: 0,
            h_align: HAlign::Left,
            compact_font: false,
            scrolling_speed: 0,
            color: Color::None,
        }
    }
}

/// One page of a publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPage {
    pub rows: Vec<TextRow>,
    /// Led rows between text rows, 0..=9. Out of range values fall back
    /// to 0.
    pub row_spacing: u8,
    pub v_align: VAlign,
    /// Drop rows and columns that do not fit the panel.
    pub truncate: bool,
    /// Page display time before the next page. 0 is coerced to 1.
    pub duration: u8,
    /// Interpret `duration` in tenths of a second instead of seconds.
    pub duration_in_tenths: bool,
    pub blinking_text: bool,
    /// 0 off, 1..=9 strength. Only honored by panels that support it.
    pub antialiasing: u8,
    pub flashing_lamps: bool,
}

impl TextPage {
    pub fn new(rows: Vec<TextRow>) -> TextPage {
        TextPage {
            rows,
            row_spacing: 0,
            v_align: VAlign::Top,
            truncate: false,
            duration: 1,
            duration_in_tenths: false,
            blinking_text: false,
            antialiasing: 0,
            flashing_lamps: false,
        }
    }
}

fn append(buffer: &mut Vec<u8>, bytes: &[u8]) -> Result<(), Error> {
    if buffer.len() + bytes.len() > MAX_DATA_SIZE {
        return Err(Error::BadFrame {
            reason: "publication exceeds the data ceiling",
        });
    }
    buffer.extend_from_slice(bytes);
    Ok(())
}

/// Emits the drawing command stream for one page into `buffer`.
fn add_text_properties(
    buffer: &mut Vec<u8>,
    page: &TextPage,
    panel: &PanelData,
) -> Result<(), Error> {
    if page.rows.is_empty() {
        return Err(Error::InvalidArgument {
            reason: "page without rows".to_string(),
        });
    }

    if page.blinking_text {
        append(buffer, &[0x17, 0x41])?;
    }
    if page.antialiasing >= 1 && page.antialiasing <= 9 {
        append(buffer, &[0x17, 0x42, b'0' + page.antialiasing])?;
    }

    let total_rows = page.rows.len() as u32;
    let row_spacing = if page.row_spacing > 9 || total_rows == 1 {
        0u32
    } else {
        page.row_spacing as u32
    };

    // vertical layout: rows that fit, then the first row's led position
    let lpdv = panel.font_size[1] as u32 + row_spacing;
    let rows = if page.truncate {
        ((panel.panel_size[1] as u32 + row_spacing) / lpdv)
            .max(1)
            .min(total_rows)
    } else {
        total_rows
    };

    let v_remainder = (panel.panel_size[1] as u32)
        .checked_sub(lpdv * rows - row_spacing)
        .unwrap_or(0);
    let mut v_pos = match page.v_align {
        VAlign::Top => 0,
        VAlign::Center => v_remainder / 2,
        VAlign::Bottom => v_remainder,
    };

    for row in page.rows.iter().take(rows as usize) {
        let col_spacing = if row.col_spacing > 9 { 0u32 } else { row.col_spacing as u32 };
        let lpdh = panel.font_size[0] as u32 + col_spacing;
        let cols = if page.truncate && !row.compact_font {
            ((panel.panel_size[0] as u32 + col_spacing) / lpdh)
                .max(1)
                .min(row.text.len() as u32)
        } else {
            row.text.len() as u32
        };

        // compact font letters vary in width, horizontal alignment is
        // meaningless there
        let h_remainder = (panel.panel_size[0] as u32)
            .checked_sub(lpdh * cols - col_spacing)
            .unwrap_or(0);
        let h_pos = if row.compact_font {
            0
        } else {
            match row.h_align {
                HAlign::Left => 0,
                HAlign::Center => h_remainder / 2,
                HAlign::Right => h_remainder,
            }
        };

        match &row.color {
            Color::Basic(color) => append(buffer, &[0x17, 0x43, b'0' + *color as u8])?,
            Color::Rgby(rgby) if rgby.iter().all(|b| b.is_ascii_hexdigit()) => {
                append(buffer, &[0x17, 0x44])?;
                append(buffer, rgby)?;
            }
            _ => {}
        }

        if row.scrolling_speed >= 1 && row.scrolling_speed <= 9 {
            append(buffer, &[0x17, 0x53, 0x48, b'0' + row.scrolling_speed])?;
        }

        append(buffer, &[0x17, 0x51])?;
        append(buffer, format!("{:03X}{:03X}", v_pos, h_pos).as_bytes())?;
        append(
            buffer,
            &[0x17, 0x46, 0x31, b'0' + col_spacing as u8, b'0' + row_spacing as u8],
        )?;

        if row.compact_font {
            append(buffer, &[0x17, 0x4F])?;
        }

        append(buffer, &row.text[..cols as usize])?;
        v_pos += lpdv;
    }

    Ok(())
}

/// Publish up to 255 pages of text.
///
/// The pages travel as one nice-begin / nice-end bracketed VIS_EXTENSIBLE
/// write; each page's VisExtensible header is sized from the drawing
/// command stream emitted for it. Fails when the publication would exceed
/// the payload ceiling, a page has no rows, or the font geometry is zero.
pub fn build_text(
    kind: FrameKind,
    tran: u16,
    pages: &[TextPage],
    panel: &PanelData,
) -> Result<Vec<u8>, Error> {
    if pages.is_empty() || pages.len() > 255 {
        return Err(Error::InvalidArgument {
            reason: format!("page count {} out of range", pages.len()),
        });
    }
    if panel.font_size[0] == 0 || panel.font_size[1] == 0 {
        return Err(Error::InvalidArgument {
            reason: "font geometry is zero".to_string(),
        });
    }

    let mut payload = Vec::new();
    put_set(&mut payload, registry::CUSTOM_SET_TEXT, 0, &[]);
    put_set(&mut payload, registry::VIS_EXTENSIBLE, 0, &[]);
    // data record header, length patched once the blob size is known
    put_set_header(&mut payload, registry::VIS_EXTENSIBLE, 0, 0);
    // one group holding every page
    payload.extend_from_slice(&[0x01, 0x00, pages.len() as u8]);

    for page in pages {
        let header_pos = payload.len();
        append(&mut payload, &[0u8; 5])?;

        let stream_start = payload.len();
        add_text_properties(&mut payload, page, panel)?;
        let stream_size = (payload.len() - stream_start) as u16;

        payload[header_pos] = if page.duration == 0 { 1 } else { page.duration };
        payload[header_pos + 1] =
            page.flashing_lamps as u8 | (page.duration_in_tenths as u8) << 1;
        payload[header_pos + 2] = 0;
        BigEndian::write_u16(&mut payload[header_pos + 3..header_pos + 5], stream_size);
    }

    if payload.len() + 8 > MAX_DATA_SIZE {
        return Err(Error::BadFrame {
            reason: "publication exceeds the data ceiling",
        });
    }

    let blob_size = (payload.len() - 24) as u32;
    BigEndian::write_u16(&mut payload[22..24], blob_size as u16);
    put_set_header(&mut payload, registry::VIS_EXTENSIBLE, blob_size, 0);

    build_frame(kind, BROADCAST_ADDRESS, tran, Command::Set, &payload)
}
