//! EIP-712 structured hashing of transaction bodies. The settlement contract
//! recomputes this hash to check input signatures, so the domain constants,
//! the type signatures, and the fixed 4/4 slot shape of the message all have
//! to match it exactly.

use super::*;

pub const DOMAIN_NAME: &str = "OMG Network";
pub const DOMAIN_VERSION: &str = "1";
pub const DOMAIN_SALT: B256 =
  b256!("0xfad5c7f626d80f9256ef01929f3beb96e058b8b4b0e3fe52d84f054c0e2a7a83");

/// The domain hash depends on the verifying contract, so it is recomputed
/// per call rather than cached process-wide; a client talking to two plasma
/// frameworks must not see one contract's domain under the other's hash.
pub fn signing_hash(body: &TransactionBody, verifying_contract: Address) -> B256 {
  let mut preimage = Vec::with_capacity(66);
  preimage.extend_from_slice(&[0x19, 0x01]);
  preimage.extend_from_slice(domain(verifying_contract).hash().as_slice());
  preimage.extend_from_slice(message(body).hash().as_slice());

  keccak256(preimage)
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
  Uint(U256),
  Address(Address),
  Bytes20(Address),
  Bytes32(B256),
  String(&'static str),
  Struct(Struct),
}

impl Value {
  fn type_name(&self) -> &'static str {
    match self {
      Self::Uint(_) => "uint256",
      Self::Address(_) => "address",
      Self::Bytes20(_) => "bytes20",
      Self::Bytes32(_) => "bytes32",
      Self::String(_) => "string",
      Self::Struct(composite) => composite.name,
    }
  }

  /// Every field encodes to one 32-byte word: scalars at native width,
  /// addresses left-padded, fixed bytes right-padded, dynamic and composite
  /// values by their hash.
  fn encode(&self) -> B256 {
    match self {
      Self::Uint(value) => B256::from(value.to_be_bytes::<32>()),
      Self::Address(address) => address.into_word(),
      Self::Bytes20(guard) => {
        let mut word = B256::ZERO;
        word[..20].copy_from_slice(guard.as_slice());
        word
      }
      Self::Bytes32(bytes) => *bytes,
      Self::String(string) => keccak256(string),
      Self::Struct(composite) => composite.hash(),
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
struct Struct {
  name: &'static str,
  fields: Vec<(&'static str, Value)>,
}

impl Struct {
  fn signature(&self) -> String {
    format!(
      "{}({})",
      self.name,
      self
        .fields
        .iter()
        .map(|(name, value)| format!("{} {name}", value.type_name()))
        .collect::<Vec<String>>()
        .join(","),
    )
  }

  fn dependencies(&self, signatures: &mut BTreeMap<&'static str, String>) {
    for (_, value) in &self.fields {
      if let Value::Struct(composite) = value {
        if !signatures.contains_key(composite.name) {
          signatures.insert(composite.name, composite.signature());
          composite.dependencies(signatures);
        }
      }
    }
  }

  /// The primary type's signature followed by the signatures of every type
  /// it references, sorted alphabetically.
  fn encode_type(&self) -> String {
    let mut encoded = self.signature();

    let mut dependencies = BTreeMap::new();
    self.dependencies(&mut dependencies);
    dependencies.remove(self.name);

    for signature in dependencies.values() {
      encoded.push_str(signature);
    }

    encoded
  }

  fn hash(&self) -> B256 {
    let mut preimage = Vec::with_capacity(32 * (self.fields.len() + 1));
    preimage.extend_from_slice(keccak256(self.encode_type()).as_slice());

    for (_, value) in &self.fields {
      preimage.extend_from_slice(value.encode().as_slice());
    }

    keccak256(preimage)
  }
}

fn domain(verifying_contract: Address) -> Struct {
  Struct {
    name: "EIP712Domain",
    fields: vec![
      ("name", Value::String(DOMAIN_NAME)),
      ("version", Value::String(DOMAIN_VERSION)),
      ("verifyingContract", Value::Address(verifying_contract)),
      ("salt", Value::Bytes32(DOMAIN_SALT)),
    ],
  }
}

fn input(position: UtxoPos) -> Value {
  Value::Struct(Struct {
    name: "Input",
    fields: vec![
      ("blknum", Value::Uint(U256::from(position.blknum))),
      ("txindex", Value::Uint(U256::from(position.txindex))),
      ("oindex", Value::Uint(U256::from(position.oindex))),
    ],
  })
}

fn output(output: &Output) -> Value {
  Value::Struct(Struct {
    name: "Output",
    fields: vec![
      ("outputType", Value::Uint(U256::from(output.output_type))),
      ("outputGuard", Value::Bytes20(output.output_guard)),
      ("currency", Value::Address(output.currency)),
      ("amount", Value::Uint(output.amount)),
    ],
  })
}

fn message(body: &TransactionBody) -> Struct {
  let inputs = body.padded_inputs();
  let outputs = body.padded_outputs();

  Struct {
    name: "Transaction",
    fields: vec![
      ("txType", Value::Uint(U256::from(body.tx_type))),
      ("input0", input(inputs[0])),
      ("input1", input(inputs[1])),
      ("input2", input(inputs[2])),
      ("input3", input(inputs[3])),
      ("output0", output(&outputs[0])),
      ("output1", output(&outputs[1])),
      ("output2", output(&outputs[2])),
      ("output3", output(&outputs[3])),
      ("txData", Value::Uint(U256::from(body.tx_data))),
      ("metadata", Value::Bytes32(body.metadata)),
    ],
  }
}
