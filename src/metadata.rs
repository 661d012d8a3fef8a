use super::*;

/// Metadata annotates a transaction with up to 32 bytes of free text. The
/// wire format reserves a fixed 32-byte slot, so the UTF-8 bytes are
/// left-padded with zeros and an absent annotation is all zeros, never an
/// absent field.
pub const NULL_METADATA: B256 = B256::ZERO;

pub fn encode(string: &str) -> Result<B256> {
  let bytes = string.as_bytes();

  if bytes.len() > 32 {
    return Err(Error::MetadataTooLarge { len: bytes.len() });
  }

  let mut metadata = B256::ZERO;
  metadata[32 - bytes.len()..].copy_from_slice(bytes);

  Ok(metadata)
}

pub fn decode(metadata: B256) -> Result<String> {
  let start = metadata.iter().position(|&byte| byte != 0).unwrap_or(32);

  String::from_utf8(metadata[start..].to_vec()).map_err(|err| Error::InvalidArgument {
    reason: format!("metadata is not valid utf-8: {err}"),
  })
}
