use super::*;

/// A 65-byte `r ‖ s ‖ v` signature with the legacy recovery id, displayed as
/// 0x-prefixed hex.
#[derive(Debug, PartialEq, Copy, Clone, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub struct Signature(pub [u8; 65]);

impl Signature {
  pub fn from_slice(bytes: &[u8]) -> Option<Signature> {
    Some(Signature(bytes.try_into().ok()?))
  }

  pub fn r(&self) -> &[u8] {
    &self.0[..32]
  }

  pub fn s(&self) -> &[u8] {
    &self.0[32..64]
  }

  pub fn v(&self) -> u8 {
    self.0[64]
  }
}

impl AsRef<[u8]> for Signature {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

impl Display for Signature {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "0x{}", hex::encode(self.0))
  }
}

impl FromStr for Signature {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(Error::Hex)?;

    Self::from_slice(&bytes).ok_or(Error::Length(bytes.len()))
  }
}

#[derive(Debug, PartialEq)]
pub enum Error {
  Hex(hex::FromHexError),
  Length(usize),
}

impl Display for Error {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Self::Hex(err) => write!(f, "invalid hex: {err}"),
      Self::Length(length) => write!(f, "signature must be 65 bytes, got {length}"),
    }
  }
}

impl std::error::Error for Error {}
