//! Recursive-length-prefix encoding: byte strings and arbitrarily nested
//! lists, each prefixed with a type/length marker. Scalars travel as minimal
//! big-endian byte strings, with zero as the empty string. Decoding accepts
//! only the canonical form.

use super::*;

#[derive(Debug, PartialEq, Clone)]
pub enum Item {
  Bytes(Vec<u8>),
  List(Vec<Item>),
}

impl Item {
  pub fn bytes(bytes: impl AsRef<[u8]>) -> Item {
    Item::Bytes(bytes.as_ref().to_vec())
  }

  pub fn uint(value: U256) -> Item {
    let bytes = value.to_be_bytes::<32>();
    let first = bytes.iter().position(|&byte| byte != 0).unwrap_or(32);
    Item::Bytes(bytes[first..].to_vec())
  }
}

pub fn encode(item: &Item) -> Vec<u8> {
  let mut buffer = Vec::new();
  encode_to_vec(item, &mut buffer);
  buffer
}

fn encode_to_vec(item: &Item, buffer: &mut Vec<u8>) {
  match item {
    Item::Bytes(bytes) => {
      if bytes.len() == 1 && bytes[0] < 0x80 {
        buffer.push(bytes[0]);
      } else {
        encode_length(0x80, bytes.len(), buffer);
        buffer.extend_from_slice(bytes);
      }
    }
    Item::List(items) => {
      let mut payload = Vec::new();
      for item in items {
        encode_to_vec(item, &mut payload);
      }
      encode_length(0xc0, payload.len(), buffer);
      buffer.extend_from_slice(&payload);
    }
  }
}

fn encode_length(offset: u8, length: usize, buffer: &mut Vec<u8>) {
  if length < 56 {
    buffer.push(offset + length as u8);
  } else {
    let bytes = length.to_be_bytes();
    let first = bytes.iter().position(|&byte| byte != 0).unwrap_or(bytes.len());
    buffer.push(offset + 55 + (bytes.len() - first) as u8);
    buffer.extend_from_slice(&bytes[first..]);
  }
}

/// Decodes exactly one item spanning the whole buffer.
pub fn decode(buffer: &[u8]) -> Result<Item, Error> {
  let (item, consumed) = decode_item(buffer)?;

  if consumed != buffer.len() {
    return Err(Error::Trailing);
  }

  Ok(item)
}

fn decode_item(buffer: &[u8]) -> Result<(Item, usize), Error> {
  let &prefix = buffer.first().ok_or(Error::Truncated)?;

  match prefix {
    0x00..=0x7f => Ok((Item::Bytes(vec![prefix]), 1)),
    0x80..=0xb7 => {
      let length = usize::from(prefix - 0x80);
      let payload = payload(buffer, 1, length)?;

      if length == 1 && payload[0] < 0x80 {
        return Err(Error::NonCanonical);
      }

      Ok((Item::Bytes(payload.to_vec()), 1 + length))
    }
    0xb8..=0xbf => {
      let (length, header) = decode_length(buffer, prefix - 0xb7)?;
      let payload = payload(buffer, header, length)?;
      Ok((Item::Bytes(payload.to_vec()), header + length))
    }
    0xc0..=0xf7 => {
      let length = usize::from(prefix - 0xc0);
      let payload = payload(buffer, 1, length)?;
      Ok((Item::List(decode_list(payload)?), 1 + length))
    }
    0xf8..=0xff => {
      let (length, header) = decode_length(buffer, prefix - 0xf7)?;
      let payload = payload(buffer, header, length)?;
      Ok((Item::List(decode_list(payload)?), header + length))
    }
  }
}

fn decode_list(mut payload: &[u8]) -> Result<Vec<Item>, Error> {
  let mut items = Vec::new();

  while !payload.is_empty() {
    let (item, consumed) = decode_item(payload)?;
    items.push(item);
    payload = &payload[consumed..];
  }

  Ok(items)
}

fn decode_length(buffer: &[u8], length_of_length: u8) -> Result<(usize, usize), Error> {
  let length_of_length = usize::from(length_of_length);
  let bytes = payload(buffer, 1, length_of_length)?;

  if bytes[0] == 0 {
    return Err(Error::NonCanonical);
  }

  let mut length = 0u64;
  for &byte in bytes {
    length = length << 8 | u64::from(byte);
  }

  let length = usize::try_from(length).map_err(|_| Error::Oversize)?;

  if length < 56 {
    return Err(Error::NonCanonical);
  }

  Ok((length, 1 + length_of_length))
}

fn payload(buffer: &[u8], offset: usize, length: usize) -> Result<&[u8], Error> {
  let end = offset.checked_add(length).ok_or(Error::Oversize)?;
  buffer.get(offset..end).ok_or(Error::Truncated)
}

#[derive(Debug, PartialEq)]
pub enum Error {
  Truncated,
  Trailing,
  NonCanonical,
  Oversize,
}

impl Display for Error {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Self::Truncated => write!(f, "truncated"),
      Self::Trailing => write!(f, "trailing bytes"),
      Self::NonCanonical => write!(f, "non-canonical encoding"),
      Self::Oversize => write!(f, "length out of range"),
    }
  }
}

impl std::error::Error for Error {}
