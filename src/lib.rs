//! Transaction construction, encoding, and signing for a Plasma childchain.
//!
//! Given a snapshot of spendable outputs held by an owner, this crate selects
//! inputs covering the requested payments and fee, builds a canonical
//! transaction body, computes its EIP-712 signing hash, signs it, and
//! serializes the result to the RLP wire format the settlement contract and
//! watcher verify independently. Submission of the resulting bytes is the
//! caller's concern; everything here is pure computation over immutable
//! values.

use {
  self::rlp::Item,
  alloy_primitives::{address, b256, Address, B256, U256},
  log::trace,
  secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, PublicKey, SecretKey, SECP256K1,
  },
  serde::{Deserialize, Serialize},
  serde_with::{DeserializeFromStr, SerializeDisplay},
  sha3::{Digest, Keccak256},
  std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
    num::ParseIntError,
    str::FromStr,
  },
  thiserror::Error,
};

pub use self::{
  builder::{merge_utxos, Fee, Payment, TransactionBuilder},
  encoding::{DecodeError, DecodedTransaction},
  error::Error,
  metadata::NULL_METADATA,
  signature::Signature,
  signer::sign_transaction,
  transaction::{Output, SignedTransaction, TransactionBody, NULL_INPUT, NULL_OUTPUT},
  utxo::Utxo,
  utxo_pos::UtxoPos,
};


#[cfg(test)]
use self::test::*;

pub mod builder;
pub mod encoding;
mod error;
pub mod metadata;
pub mod rlp;
mod signature;
pub mod signer;
mod transaction;
pub mod typed_data;
mod utxo;
pub mod utxo_pos;

pub const MAX_INPUTS: usize = 4;
pub const MAX_OUTPUTS: usize = 4;

/// The all-zero currency address denotes the network's native asset.
pub const NATIVE_CURRENCY: Address = Address::ZERO;

type Result<T = (), E = Error> = std::result::Result<T, E>;

pub(crate) fn keccak256(data: impl AsRef<[u8]>) -> B256 {
  B256::from_slice(&Keccak256::digest(data.as_ref()))
}
