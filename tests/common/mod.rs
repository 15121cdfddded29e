//! Hand-rolled msgpack packer for building partition fixtures.
//!
//! Mirrors the wire format the crate decodes; fixtures reproduce the
//! original partition corpus shapes (a header of column names followed by
//! data rows).

#![allow(dead_code)]

pub fn pack_array_header(buf: &mut Vec<u8>, len: usize) {
    match len {
        0..=15 => buf.push(0x90 | len as u8),
        16..=0xffff => {
            buf.push(0xdc);
            buf.extend_from_slice(&(len as u16).to_be_bytes());
        }
        _ => {
            buf.push(0xdd);
            buf.extend_from_slice(&(len as u32).to_be_bytes());
        }
    }
}

pub fn pack_map_header(buf: &mut Vec<u8>, len: usize) {
    assert!(len <= 15, "fixture maps are small");
    buf.push(0x80 | len as u8);
}

pub fn pack_int(buf: &mut Vec<u8>, value: i64) {
    match value {
        0..=0x7f => buf.push(value as u8),
        -32..=-1 => buf.push(value as u8),
        0x80..=0xff => {
            buf.push(0xcc);
            buf.push(value as u8);
        }
        0x100..=0xffff => {
            buf.push(0xcd);
            buf.extend_from_slice(&(value as u16).to_be_bytes());
        }
        _ => {
            buf.push(0xd3);
            buf.extend_from_slice(&value.to_be_bytes());
        }
    }
}

pub fn pack_f64(buf: &mut Vec<u8>, value: f64) {
    buf.push(0xcb);
    buf.extend_from_slice(&value.to_be_bytes());
}

pub fn pack_str(buf: &mut Vec<u8>, value: &str) {
    let bytes = value.as_bytes();
    match bytes.len() {
        0..=31 => buf.push(0xa0 | bytes.len() as u8),
        32..=0xff => {
            buf.push(0xd9);
            buf.push(bytes.len() as u8);
        }
        _ => {
            buf.push(0xda);
            buf.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
        }
    }
    buf.extend_from_slice(bytes);
}

pub fn pack_header(buf: &mut Vec<u8>, columns: &[&str]) {
    pack_array_header(buf, columns.len());
    for column in columns {
        pack_str(buf, column);
    }
}

/// Tagged temporal wrapper: `{marker: true, "as_str": payload}`.
pub fn pack_tagged(buf: &mut Vec<u8>, marker: &str, payload: &str) {
    pack_map_header(buf, 2);
    pack_str(buf, marker);
    buf.push(0xc3); // true
    pack_str(buf, "as_str");
    pack_str(buf, payload);
}

/// `(rowid int, col1 int)` partition with 100 rows valued `[i, i]`.
pub fn int_partition() -> Vec<u8> {
    let mut buf = Vec::new();
    pack_header(&mut buf, &["rowid", "col1"]);
    for i in 0..100 {
        pack_array_header(&mut buf, 2);
        pack_int(&mut buf, i);
        pack_int(&mut buf, i);
    }
    buf
}

/// `(rowid int, col1 str)` partition with 100 rows valued `[i, "i"]`.
pub fn str_partition() -> Vec<u8> {
    let mut buf = Vec::new();
    pack_header(&mut buf, &["rowid", "col1"]);
    for i in 0..100 {
        pack_array_header(&mut buf, 2);
        pack_int(&mut buf, i);
        pack_str(&mut buf, &i.to_string());
    }
    buf
}

/// `(rowid int, col1 <tagged>)` partition with one tagged value per row.
pub fn tagged_partition(marker: &str, payloads: &[&str]) -> Vec<u8> {
    let mut buf = Vec::new();
    pack_header(&mut buf, &["rowid", "col1"]);
    for (i, payload) in payloads.iter().enumerate() {
        pack_array_header(&mut buf, 2);
        pack_int(&mut buf, i as i64);
        pack_tagged(&mut buf, marker, payload);
    }
    buf
}

pub fn scan_columns() -> Vec<String> {
    vec!["rowid".to_owned(), "col1".to_owned()]
}
