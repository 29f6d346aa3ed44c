use serde::Serialize;

use crate::error::TlvError;

/// Two-digit decimal length field caps values at 99 bytes.
pub const MAX_VALUE_LEN: usize = 99;

const HEADER_LEN: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tlv {
    pub t: String,
    pub v: String,
}

impl Tlv {
    pub fn new(t: &str, v: impl Into<String>) -> Self {
        Self {
            t: t.to_string(),
            v: v.into(),
        }
    }
}

fn check_tag(tag: &str) -> Result<(), TlvError> {
    if tag.len() == 2 && tag.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(TlvError::InvalidTag(tag.to_string()))
    }
}

pub fn build_tlv(tag: &str, value: &str) -> Result<String, TlvError> {
    check_tag(tag)?;

    if value.len() > MAX_VALUE_LEN {
        return Err(TlvError::ValueTooLong {
            tag: tag.to_string(),
            len: value.len(),
        });
    }

    Ok(format!("{}{:02}{}", tag, value.len(), value))
}

pub fn build_tlvs(elements: &[Tlv]) -> Result<String, TlvError> {
    let mut out = String::new();

    for el in elements {
        out.push_str(&build_tlv(&el.t, &el.v)?);
    }

    Ok(out)
}

pub fn parse_tlv(input: &str) -> Result<Vec<Tlv>, TlvError> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < input.len() {
        if i + HEADER_LEN > input.len() {
            return Err(TlvError::Truncated { offset: i });
        }

        // Tag and length are four ASCII digits
        let header = &input.as_bytes()[i..i + HEADER_LEN];
        if !header[..2].iter().all(u8::is_ascii_digit) {
            return Err(TlvError::InvalidTag(input[i..].chars().take(2).collect()));
        }

        let tag = &input[i..i + 2];

        let len_field = &header[2..];
        if !len_field.iter().all(u8::is_ascii_digit) {
            return Err(TlvError::InvalidLength { offset: i + 2 });
        }
        let len = usize::from(len_field[0] - b'0') * 10 + usize::from(len_field[1] - b'0');

        let start = i + HEADER_LEN;
        let end = start + len;

        if end > input.len() {
            return Err(TlvError::Truncated { offset: start });
        }

        let value = input
            .get(start..end)
            .ok_or(TlvError::NotCharBoundary { offset: end })?;

        result.push(Tlv::new(tag, value));
        i = end;
    }

    Ok(result)
}
