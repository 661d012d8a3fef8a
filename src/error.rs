use super::*;

#[derive(Debug, PartialEq, Error)]
pub enum Error {
  #[error("amount overflows 256 bits")]
  AmountOverflow,
  #[error("malformed transaction bytes: {0}")]
  Decode(#[from] DecodeError),
  #[error("insufficient funds for currency {currency}: short {shortfall}")]
  InsufficientFunds { currency: Address, shortfall: U256 },
  #[error("invalid argument: {reason}")]
  InvalidArgument { reason: String },
  #[error("metadata exceeds 32 bytes: {len}")]
  MetadataTooLarge { len: usize },
  #[error("invalid utxo position: {0}")]
  Position(#[from] utxo_pos::Error),
  #[error("invalid signature: {0}")]
  Signature(#[from] secp256k1::Error),
  #[error("transaction has too many inputs: {0}")]
  TooManyInputs(usize),
  #[error("transaction has too many outputs: {0}")]
  TooManyOutputs(usize),
}
