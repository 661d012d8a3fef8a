//! ECDSA signing of the EIP-712 hash. Every input is signed over the same
//! hash, one signature per private key, in input order. Matching the key
//! count to the input count is the caller's contract; the watcher recovers
//! each input's owner from its signature and rejects mismatches.

use super::*;

pub fn sign(hash: B256, keys: &[SecretKey]) -> Vec<Signature> {
  keys.iter().map(|key| sign_one(hash, key)).collect()
}

/// Builds the signed transaction in one step: hash the body under the
/// settlement contract's domain, then sign with each owner key.
pub fn sign_transaction(
  body: &TransactionBody,
  keys: &[SecretKey],
  verifying_contract: Address,
) -> SignedTransaction {
  let hash = typed_data::signing_hash(body, verifying_contract);

  SignedTransaction {
    body: body.clone(),
    signatures: sign(hash, keys),
  }
}

pub fn recover(hash: B256, signature: &Signature) -> Result<Address> {
  let recovery_id = RecoveryId::from_i32(i32::from(signature.v()) - 27)?;
  let signature = RecoverableSignature::from_compact(&signature.0[..64], recovery_id)?;
  let public_key = SECP256K1.recover_ecdsa(&Message::from_digest(hash.0), &signature)?;

  Ok(address_of(&public_key))
}

pub fn address(key: &SecretKey) -> Address {
  address_of(&key.public_key(SECP256K1))
}

fn sign_one(hash: B256, key: &SecretKey) -> Signature {
  let signature = SECP256K1.sign_ecdsa_recoverable(&Message::from_digest(hash.0), key);
  let (recovery_id, compact) = signature.serialize_compact();

  let mut bytes = [0; 65];
  bytes[..64].copy_from_slice(&compact);
  bytes[64] = 27 + u8::try_from(recovery_id.to_i32()).expect("recovery id is 0 through 3");

  Signature(bytes)
}

fn address_of(public_key: &PublicKey) -> Address {
  Address::from_slice(&keccak256(&public_key.serialize_uncompressed()[1..])[12..])
}
