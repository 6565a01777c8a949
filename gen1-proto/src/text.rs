//! Gen-I character set and fixed-length name fields.
//!
//! Names are stored as fixed-size byte arrays in the game's own character
//! set. The content is followed by [`TERMINATOR`] bytes up to the end of the
//! field, and the last byte of a field is always a terminator.

use heapless::String;

/// Terminates and pads name fields. Not a C string terminator.
pub const TERMINATOR: u8 = 0x50;

/// Space character.
pub const SPACE: u8 = 0x7F;

/// `?`, used for characters the charset cannot represent.
pub const UNKNOWN: u8 = 0xE6;

/// Encode one character into the Gen-I charset.
///
/// Characters outside the supported subset become [`UNKNOWN`].
#[must_use]
pub fn encode_char(c: char) -> u8 {
    match c {
        'A'..='Z' => 0x80 + (c as u8 - b'A'),
        '(' => 0x9A,
        ')' => 0x9B,
        ':' => 0x9C,
        ';' => 0x9D,
        '[' => 0x9E,
        ']' => 0x9F,
        'a'..='z' => 0xA0 + (c as u8 - b'a'),
        '\'' => 0xE0,
        '-' => 0xE3,
        '?' => 0xE6,
        '!' => 0xE7,
        '.' => 0xE8,
        '/' => 0xF3,
        ',' => 0xF4,
        '0'..='9' => 0xF6 + (c as u8 - b'0'),
        ' ' => SPACE,
        _ => UNKNOWN,
    }
}

/// Decode one Gen-I charset byte, if it maps to a printable character.
#[must_use]
pub fn decode_char(byte: u8) -> Option<char> {
    Some(match byte {
        0x80..=0x99 => (b'A' + (byte - 0x80)) as char,
        0x9A => '(',
        0x9B => ')',
        0x9C => ':',
        0x9D => ';',
        0x9E => '[',
        0x9F => ']',
        0xA0..=0xB9 => (b'a' + (byte - 0xA0)) as char,
        0xE0 => '\'',
        0xE3 => '-',
        0xE6 => '?',
        0xE7 => '!',
        0xE8 => '.',
        0xF3 => '/',
        0xF4 => ',',
        0xF6..=0xFF => (b'0' + (byte - 0xF6)) as char,
        SPACE => ' ',
        _ => return None,
    })
}

/// Fill `field` with `content` followed by terminator padding.
///
/// At most `field.len() - 1` content bytes are copied, so the last byte is
/// always [`TERMINATOR`] even when `content` fills or overflows the field.
pub fn pad_into(field: &mut [u8], content: &[u8]) {
    field.fill(TERMINATOR);
    let len = content.len().min(field.len().saturating_sub(1));
    field[..len].copy_from_slice(&content[..len]);
}

/// Encode ASCII text into a padded name field of `N` bytes.
#[must_use]
pub fn encode_name<const N: usize>(text: &str) -> [u8; N] {
    let mut field = [TERMINATOR; N];
    for (slot, c) in field[..N.saturating_sub(1)].iter_mut().zip(text.chars()) {
        *slot = encode_char(c);
    }
    field
}

/// Number of content bytes before the first terminator (or zero byte).
#[must_use]
pub fn content_len(field: &[u8]) -> usize {
    field
        .iter()
        .position(|&b| b == TERMINATOR || b == 0)
        .unwrap_or(field.len())
}

/// Decode a name field for display.
///
/// Stops at the first terminator or zero byte; bytes without a printable
/// mapping are skipped.
#[must_use]
pub fn decode_name<const N: usize>(field: &[u8]) -> String<N> {
    let mut out = String::new();
    for c in field[..content_len(field)].iter().filter_map(|&b| decode_char(b)) {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
