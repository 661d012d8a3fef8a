use super::*;

/// A spendable output as reported by the watcher. Utxos are a read-only
/// snapshot: the library selects from them but never mutates one, and a utxo
/// stops being spendable the moment a transaction consuming it is accepted by
/// the settlement layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
  pub blknum: u64,
  pub txindex: u32,
  pub oindex: u16,
  pub owner: Address,
  pub currency: Address,
  pub amount: U256,
}

impl Utxo {
  pub fn position(&self) -> UtxoPos {
    UtxoPos {
      blknum: self.blknum,
      txindex: self.txindex,
      oindex: self.oindex,
    }
  }
}
