use super::*;

/// A utxo position identifies an output by its location in the childchain:
/// block number, transaction index within the block, and output index within
/// the transaction. On chain the position travels as the single integer
/// `blknum * 10^9 + txindex * 10^4 + oindex`; the string representation is
/// `blknum:txindex:oindex`.
///
/// The same triple doubles as a transaction input, since an input is nothing
/// more than a reference to the utxo it spends.
#[derive(
  Debug,
  PartialEq,
  Copy,
  Clone,
  Hash,
  Eq,
  Ord,
  PartialOrd,
  Default,
  DeserializeFromStr,
  SerializeDisplay,
)]
pub struct UtxoPos {
  pub blknum: u64,
  pub txindex: u32,
  pub oindex: u16,
}

const BLOCK_OFFSET: U256 = U256::from_limbs([1_000_000_000, 0, 0, 0]);
const TX_OFFSET: U256 = U256::from_limbs([10_000, 0, 0, 0]);

impl UtxoPos {
  /// Both indices must fit under the position multipliers; block numbers are
  /// unbounded.
  pub fn new(blknum: u64, txindex: u32, oindex: u16) -> Option<UtxoPos> {
    if txindex >= 10_000 || oindex >= 10_000 {
      return None;
    }

    Some(UtxoPos {
      blknum,
      txindex,
      oindex,
    })
  }

  /// Nothing spendable lives in block zero, so a zero block number marks the
  /// null input sentinel.
  pub fn is_null(self) -> bool {
    self.blknum == 0
  }

  pub fn encode(self) -> U256 {
    U256::from(self.blknum) * BLOCK_OFFSET
      + U256::from(self.txindex) * TX_OFFSET
      + U256::from(self.oindex)
  }

  pub fn decode(position: U256) -> Result<UtxoPos, Error> {
    Ok(UtxoPos {
      blknum: u64::try_from(position / BLOCK_OFFSET).map_err(|_| Error::Overflow(position))?,
      // the remainders are below 10^5 and 10^4, so the narrowing cannot drop bits
      txindex: ((position % BLOCK_OFFSET) / TX_OFFSET).to::<u32>(),
      oindex: (position % TX_OFFSET).to::<u16>(),
    })
  }
}

impl Display for UtxoPos {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(f, "{}:{}:{}", self.blknum, self.txindex, self.oindex)
  }
}

impl FromStr for UtxoPos {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (blknum, rest) = s.split_once(':').ok_or(Error::Separator)?;
    let (txindex, oindex) = rest.split_once(':').ok_or(Error::Separator)?;

    Self::new(
      blknum.parse().map_err(Error::Blknum)?,
      txindex.parse().map_err(Error::Txindex)?,
      oindex.parse().map_err(Error::Oindex)?,
    )
    .ok_or(Error::Range)
  }
}

#[derive(Debug, PartialEq)]
pub enum Error {
  Separator,
  Blknum(ParseIntError),
  Txindex(ParseIntError),
  Oindex(ParseIntError),
  Range,
  Overflow(U256),
}

impl Display for Error {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    match self {
      Self::Separator => write!(f, "missing separator"),
      Self::Blknum(err) => write!(f, "invalid block number: {err}"),
      Self::Txindex(err) => write!(f, "invalid transaction index: {err}"),
      Self::Oindex(err) => write!(f, "invalid output index: {err}"),
      Self::Range => write!(f, "transaction and output indices must be below 10000"),
      Self::Overflow(position) => write!(f, "block number of position {position} exceeds 64 bits"),
    }
  }
}

impl std::error::Error for Error {}
