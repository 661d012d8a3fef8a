use super::*;

pub const NULL_INPUT: UtxoPos = UtxoPos {
  blknum: 0,
  txindex: 0,
  oindex: 0,
};

pub const NULL_OUTPUT: Output = Output {
  output_type: 0,
  output_guard: Address::ZERO,
  currency: Address::ZERO,
  amount: U256::ZERO,
};

/// A new utxo being created. `output_guard` is the beneficiary address;
/// `output_type` is 1 for payment outputs.
#[derive(Debug, PartialEq, Copy, Clone, Eq, Serialize, Deserialize)]
pub struct Output {
  pub output_type: u8,
  pub output_guard: Address,
  pub currency: Address,
  pub amount: U256,
}

impl Output {
  const PAYMENT: u8 = 1;

  pub fn payment(owner: Address, currency: Address, amount: U256) -> Output {
    Output {
      output_type: Self::PAYMENT,
      output_guard: owner,
      currency,
      amount,
    }
  }

  pub fn is_null(&self) -> bool {
    self.amount == U256::ZERO
  }
}

/// The canonical in-memory transaction: a variable-length list of inputs and
/// outputs plus a fixed 32-byte metadata slot. Inputs and outputs stay at
/// their logical lengths here; the fixed 4/4-slot shape the hasher needs is
/// produced only at that boundary.
#[derive(Debug, PartialEq, Clone, Eq, Serialize, Deserialize)]
pub struct TransactionBody {
  pub tx_type: u8,
  pub inputs: Vec<UtxoPos>,
  pub outputs: Vec<Output>,
  pub tx_data: u8,
  pub metadata: B256,
}

impl TransactionBody {
  const PAYMENT: u8 = 1;

  pub fn new(inputs: Vec<UtxoPos>, outputs: Vec<Output>, metadata: B256) -> TransactionBody {
    TransactionBody {
      tx_type: Self::PAYMENT,
      inputs,
      outputs,
      tx_data: 0,
      metadata,
    }
  }

  /// A deposit spends nothing on the childchain: zero inputs and a single
  /// output crediting the depositor. The settlement contract accepts its
  /// encoding directly.
  pub fn deposit(owner: Address, currency: Address, amount: U256) -> TransactionBody {
    TransactionBody::new(
      Vec::new(),
      vec![Output::payment(owner, currency, amount)],
      NULL_METADATA,
    )
  }

  pub fn is_deposit(&self) -> bool {
    self.inputs.is_empty()
  }

  /// Structural invariants only; no padding or truncation happens here.
  /// Metadata is exactly 32 bytes by construction.
  pub fn validate(&self) -> Result {
    if self.inputs.len() > MAX_INPUTS {
      return Err(Error::TooManyInputs(self.inputs.len()));
    }

    if self.outputs.len() > MAX_OUTPUTS {
      return Err(Error::TooManyOutputs(self.outputs.len()));
    }

    if self.inputs.is_empty() && self.outputs.len() != 1 {
      return Err(Error::InvalidArgument {
        reason: "a transaction with no inputs must be a single-output deposit".into(),
      });
    }

    Ok(())
  }

  pub fn encode(&self) -> Vec<u8> {
    encoding::encode(self)
  }

  pub fn signing_hash(&self, verifying_contract: Address) -> B256 {
    typed_data::signing_hash(self, verifying_contract)
  }

  pub(crate) fn padded_inputs(&self) -> [UtxoPos; MAX_INPUTS] {
    let mut slots = [NULL_INPUT; MAX_INPUTS];

    for (slot, input) in slots.iter_mut().zip(&self.inputs) {
      *slot = *input;
    }

    slots
  }

  pub(crate) fn padded_outputs(&self) -> [Output; MAX_OUTPUTS] {
    let mut slots = [NULL_OUTPUT; MAX_OUTPUTS];

    for (slot, output) in slots.iter_mut().zip(&self.outputs) {
      *slot = *output;
    }

    slots
  }
}

/// A transaction body together with one signature per input, ready to encode
/// and submit.
#[derive(Debug, PartialEq, Clone, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
  pub body: TransactionBody,
  pub signatures: Vec<Signature>,
}

impl SignedTransaction {
  pub fn encode(&self) -> Vec<u8> {
    encoding::encode_signed(&self.body, &self.signatures)
  }
}
