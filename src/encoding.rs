//! Wire encoding of transactions. The unsigned form is the RLP list
//! `[txType, inputs, outputs, metadata]`; the signed form prepends the
//! signature list. Bodies are padded to the canonical 4/4 slot shape and the
//! null slots are then omitted from the wire lists, which is what the
//! settlement contract and watcher expect; decoding returns the slots present
//! on the wire and makes no attempt to reconstruct padded nulls.

use super::*;

#[derive(Debug, PartialEq)]
pub struct DecodedTransaction {
  pub body: TransactionBody,
  pub signatures: Option<Vec<Signature>>,
}

pub fn encode(body: &TransactionBody) -> Vec<u8> {
  rlp::encode(&Item::List(unsigned_items(body)))
}

pub fn encode_signed(body: &TransactionBody, signatures: &[Signature]) -> Vec<u8> {
  let mut items = unsigned_items(body);

  items.insert(
    0,
    Item::List(
      signatures
        .iter()
        .map(|signature| Item::bytes(signature))
        .collect(),
    ),
  );

  rlp::encode(&Item::List(items))
}

pub fn decode(bytes: &[u8]) -> Result<DecodedTransaction> {
  Ok(decode_transaction(bytes)?)
}

fn unsigned_items(body: &TransactionBody) -> Vec<Item> {
  let mut inputs = Vec::new();
  for input in body.padded_inputs() {
    if input.is_null() {
      continue;
    }

    inputs.push(Item::List(vec![
      Item::uint(U256::from(input.blknum)),
      Item::uint(U256::from(input.txindex)),
      Item::uint(U256::from(input.oindex)),
    ]));
  }

  let mut outputs = Vec::new();
  for output in body.padded_outputs() {
    if output.is_null() {
      continue;
    }

    outputs.push(Item::List(vec![
      Item::uint(U256::from(output.output_type)),
      Item::bytes(output.output_guard),
      Item::bytes(output.currency),
      Item::uint(output.amount),
    ]));
  }

  vec![
    Item::uint(U256::from(body.tx_type)),
    Item::List(inputs),
    Item::List(outputs),
    Item::bytes(body.metadata),
  ]
}

fn decode_transaction(bytes: &[u8]) -> Result<DecodedTransaction, DecodeError> {
  let top = rlp::decode(bytes)?;
  let items = expect_list(&top)?;

  let (signatures, body) = match items.len() {
    4 => (None, items),
    5 => {
      let signatures = expect_list(&items[0])?
        .iter()
        .map(decode_signature)
        .collect::<Result<Vec<Signature>, DecodeError>>()?;

      (Some(signatures), &items[1..])
    }
    arity => return Err(DecodeError::Arity(arity)),
  };

  let inputs = expect_list(&body[1])?;
  if inputs.len() > MAX_INPUTS {
    return Err(DecodeError::InputCount(inputs.len()));
  }

  let outputs = expect_list(&body[2])?;
  if outputs.len() > MAX_OUTPUTS {
    return Err(DecodeError::OutputCount(outputs.len()));
  }

  Ok(DecodedTransaction {
    body: TransactionBody {
      tx_type: decode_integer(&body[0])?,
      inputs: inputs
        .iter()
        .map(decode_input)
        .collect::<Result<Vec<UtxoPos>, DecodeError>>()?,
      outputs: outputs
        .iter()
        .map(decode_output)
        .collect::<Result<Vec<Output>, DecodeError>>()?,
      tx_data: 0,
      metadata: decode_metadata(&body[3])?,
    },
    signatures,
  })
}

fn decode_input(item: &Item) -> Result<UtxoPos, DecodeError> {
  let fields = expect_list(item)?;

  if fields.len() != 3 {
    return Err(DecodeError::InputArity(fields.len()));
  }

  Ok(UtxoPos {
    blknum: decode_integer(&fields[0])?,
    txindex: decode_integer(&fields[1])?,
    oindex: decode_integer(&fields[2])?,
  })
}

fn decode_output(item: &Item) -> Result<Output, DecodeError> {
  let fields = expect_list(item)?;

  if fields.len() != 4 {
    return Err(DecodeError::OutputArity(fields.len()));
  }

  Ok(Output {
    output_type: decode_integer(&fields[0])?,
    output_guard: decode_address(&fields[1])?,
    currency: decode_address(&fields[2])?,
    amount: decode_uint(&fields[3])?,
  })
}

fn decode_signature(item: &Item) -> Result<Signature, DecodeError> {
  let bytes = expect_bytes(item)?;

  Signature::from_slice(bytes).ok_or(DecodeError::SignatureLength(bytes.len()))
}

fn decode_address(item: &Item) -> Result<Address, DecodeError> {
  let bytes = expect_bytes(item)?;

  if bytes.len() != 20 {
    return Err(DecodeError::AddressLength(bytes.len()));
  }

  Ok(Address::from_slice(bytes))
}

fn decode_metadata(item: &Item) -> Result<B256, DecodeError> {
  let bytes = expect_bytes(item)?;

  if bytes.len() != 32 {
    return Err(DecodeError::MetadataLength(bytes.len()));
  }

  Ok(B256::from_slice(bytes))
}

fn decode_uint(item: &Item) -> Result<U256, DecodeError> {
  let bytes = expect_bytes(item)?;

  if bytes.first() == Some(&0) {
    return Err(DecodeError::LeadingZero);
  }

  U256::try_from_be_slice(bytes).ok_or(DecodeError::ScalarOverflow)
}

fn decode_integer<T: TryFrom<U256>>(item: &Item) -> Result<T, DecodeError> {
  T::try_from(decode_uint(item)?).map_err(|_| DecodeError::ScalarOverflow)
}

fn expect_bytes(item: &Item) -> Result<&[u8], DecodeError> {
  match item {
    Item::Bytes(bytes) => Ok(bytes),
    Item::List(_) => Err(DecodeError::ExpectedBytes),
  }
}

fn expect_list(item: &Item) -> Result<&[Item], DecodeError> {
  match item {
    Item::List(items) => Ok(items),
    Item::Bytes(_) => Err(DecodeError::ExpectedList),
  }
}

#[derive(Debug, PartialEq, Error)]
pub enum DecodeError {
  #[error("address must be 20 bytes, got {0}")]
  AddressLength(usize),
  #[error("transaction must have 4 or 5 items, got {0}")]
  Arity(usize),
  #[error("expected a byte string")]
  ExpectedBytes,
  #[error("expected a list")]
  ExpectedList,
  #[error("input must have 3 items, got {0}")]
  InputArity(usize),
  #[error("more than 4 inputs: {0}")]
  InputCount(usize),
  #[error("scalar has leading zero bytes")]
  LeadingZero,
  #[error("metadata must be 32 bytes, got {0}")]
  MetadataLength(usize),
  #[error("output must have 4 items, got {0}")]
  OutputArity(usize),
  #[error("more than 4 outputs: {0}")]
  OutputCount(usize),
  #[error("rlp: {0}")]
  Rlp(#[from] rlp::Error),
  #[error("scalar out of range")]
  ScalarOverflow,
  #[error("signature must be 65 bytes, got {0}")]
  SignatureLength(usize),
}
