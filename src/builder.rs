//! Coin selection and body construction.
//!
//! Selection runs per currency, in the order currencies are first referenced
//! by the payments and then the fee. Within a currency the engine is a
//! bounded greedy pass, not an optimizer: when more than `MAX_INPUTS` utxos
//! are available it sorts ascending by amount and keeps only the largest
//! `MAX_INPUTS`, then consumes the kept list front to back until the
//! requirement is covered. Which utxos get spent is observable downstream,
//! so the pass must stay exactly this shape.
//!
//! Each payment becomes one output, and each currency with excess selection
//! gets exactly one change output back to the sender, after the payment
//! outputs. A currency covered exactly produces no change output.

use super::*;

/// An instruction to pay `amount` of `currency` to `owner`. Never serialized;
/// consumed by the builder.
#[derive(Debug, PartialEq, Clone, Eq, Serialize, Deserialize)]
pub struct Payment {
  pub owner: Address,
  pub currency: Address,
  pub amount: U256,
}

#[derive(Debug, PartialEq, Copy, Clone, Eq, Serialize, Deserialize)]
pub struct Fee {
  pub currency: Address,
  pub amount: U256,
}

#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
  owner: Address,
  utxos: Vec<Utxo>,
  payments: Vec<Payment>,
  fee: Option<Fee>,
  metadata: B256,
}

impl TransactionBuilder {
  pub fn new(owner: Address, utxos: Vec<Utxo>) -> Self {
    Self {
      owner,
      utxos,
      payments: Vec::new(),
      fee: None,
      metadata: NULL_METADATA,
    }
  }

  pub fn payment(mut self, payment: Payment) -> Self {
    self.payments.push(payment);
    self
  }

  pub fn fee(mut self, fee: Fee) -> Self {
    self.fee = Some(fee);
    self
  }

  pub fn metadata(mut self, metadata: B256) -> Self {
    self.metadata = metadata;
    self
  }

  pub fn build(self) -> Result<TransactionBody> {
    let mut inputs = Vec::new();
    let mut change = Vec::new();

    for (currency, required) in self.required_amounts()? {
      if required.is_zero() {
        continue;
      }

      let (selected, total) = select(&self.utxos, currency, required)?;

      trace!(
        "selected {} inputs totaling {total} of {required} required for currency {currency}",
        selected.len(),
      );

      if total > required {
        change.push(Output::payment(self.owner, currency, total - required));
      }

      inputs.extend(selected.iter().map(|utxo| utxo.position()));
    }

    if inputs.len() > MAX_INPUTS {
      return Err(Error::TooManyInputs(inputs.len()));
    }

    let mut outputs = self
      .payments
      .iter()
      .map(|payment| Output::payment(payment.owner, payment.currency, payment.amount))
      .collect::<Vec<Output>>();

    outputs.extend(change);

    if outputs.len() > MAX_OUTPUTS {
      return Err(Error::TooManyOutputs(outputs.len()));
    }

    let body = TransactionBody::new(inputs, outputs, self.metadata);

    body.validate()?;

    Ok(body)
  }

  /// Requirements keyed by currency, in first-reference order across the
  /// payments and then the fee.
  fn required_amounts(&self) -> Result<Vec<(Address, U256)>> {
    let mut required: Vec<(Address, U256)> = Vec::new();

    let fee = self.fee.map(|fee| (fee.currency, fee.amount));

    for (currency, amount) in self
      .payments
      .iter()
      .map(|payment| (payment.currency, payment.amount))
      .chain(fee)
    {
      match required.iter_mut().find(|(known, _)| *known == currency) {
        Some((_, total)) => *total = total.checked_add(amount).ok_or(Error::AmountOverflow)?,
        None => required.push((currency, amount)),
      }
    }

    Ok(required)
  }
}

/// Merges 2 to `MAX_INPUTS` utxos of one owner and one currency into a
/// single output of their combined amount, freeing up utxo slots.
pub fn merge_utxos(utxos: &[Utxo], metadata: B256) -> Result<TransactionBody> {
  if utxos.len() < 2 || utxos.len() > MAX_INPUTS {
    return Err(Error::InvalidArgument {
      reason: format!(
        "merge requires between 2 and {MAX_INPUTS} utxos, got {}",
        utxos.len(),
      ),
    });
  }

  let owner = utxos[0].owner;
  let currency = utxos[0].currency;

  if utxos.iter().any(|utxo| utxo.currency != currency) {
    return Err(Error::InvalidArgument {
      reason: "merged utxos must share a currency".into(),
    });
  }

  if utxos.iter().any(|utxo| utxo.owner != owner) {
    return Err(Error::InvalidArgument {
      reason: "merged utxos must share an owner".into(),
    });
  }

  let mut amount = U256::ZERO;
  for utxo in utxos {
    amount = amount.checked_add(utxo.amount).ok_or(Error::AmountOverflow)?;
  }

  Ok(TransactionBody::new(
    utxos.iter().map(|utxo| utxo.position()).collect(),
    vec![Output::payment(owner, currency, amount)],
    metadata,
  ))
}

fn select(utxos: &[Utxo], currency: Address, required: U256) -> Result<(Vec<Utxo>, U256)> {
  let mut candidates = utxos
    .iter()
    .filter(|utxo| utxo.currency == currency)
    .cloned()
    .collect::<Vec<Utxo>>();

  if candidates.len() > MAX_INPUTS {
    trace!(
      "keeping the largest {MAX_INPUTS} of {} candidate utxos for currency {currency}",
      candidates.len(),
    );

    candidates.sort_by(|a, b| a.amount.cmp(&b.amount));
    candidates = candidates.split_off(candidates.len() - MAX_INPUTS);
  }

  let mut selected = Vec::new();
  let mut total = U256::ZERO;

  for utxo in candidates {
    if total >= required {
      break;
    }

    total = total.checked_add(utxo.amount).ok_or(Error::AmountOverflow)?;
    selected.push(utxo);
  }

  if total < required {
    return Err(Error::InsufficientFunds {
      currency,
      shortfall: required - total,
    });
  }

  Ok((selected, total))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn payment_with_exact_coverage_emits_no_change() {
    let body = TransactionBuilder::new(alice(), vec![utxo(1000, 100)])
      .payment(payment(100))
      .build()
      .unwrap();

    pretty_assert_eq!(
      body,
      TransactionBody::new(
        vec![UtxoPos::new(1000, 0, 0).unwrap()],
        vec![Output::payment(bob(), NATIVE_CURRENCY, U256::from(100))],
        NULL_METADATA,
      )
    );
  }

  #[test]
  fn excess_coverage_returns_one_change_output_to_the_sender() {
    let body = TransactionBuilder::new(alice(), vec![utxo(1000, 100), utxo(2000, 60)])
      .payment(payment(130))
      .build()
      .unwrap();

    pretty_assert_eq!(
      body,
      TransactionBody::new(
        vec![
          UtxoPos::new(1000, 0, 0).unwrap(),
          UtxoPos::new(2000, 0, 0).unwrap(),
        ],
        vec![
          Output::payment(bob(), NATIVE_CURRENCY, U256::from(130)),
          Output::payment(alice(), NATIVE_CURRENCY, U256::from(30)),
        ],
        NULL_METADATA,
      )
    );
  }

  #[test]
  fn utxos_are_consumed_in_snapshot_order_when_no_truncation_is_needed() {
    let body = TransactionBuilder::new(alice(), vec![utxo(1000, 10), utxo(2000, 200)])
      .payment(payment(15))
      .build()
      .unwrap();

    assert_eq!(
      body.inputs,
      vec![
        UtxoPos::new(1000, 0, 0).unwrap(),
        UtxoPos::new(2000, 0, 0).unwrap(),
      ],
    );
  }

  #[test]
  fn truncation_keeps_the_largest_utxos_in_ascending_order() {
    let amounts = [1, 5, 3, 9, 7, 2];

    let utxos = amounts
      .iter()
      .enumerate()
      .map(|(i, &amount)| utxo(1000 * (i as u64 + 1), amount))
      .collect::<Vec<Utxo>>();

    let body = TransactionBuilder::new(alice(), utxos)
      .payment(payment(20))
      .build()
      .unwrap();

    // largest four are 3, 5, 7, 9, consumed smallest first
    assert_eq!(
      body.inputs,
      vec![
        UtxoPos::new(3000, 0, 0).unwrap(),
        UtxoPos::new(2000, 0, 0).unwrap(),
        UtxoPos::new(5000, 0, 0).unwrap(),
        UtxoPos::new(4000, 0, 0).unwrap(),
      ],
    );

    assert_eq!(
      body.outputs[1],
      Output::payment(alice(), NATIVE_CURRENCY, U256::from(4)),
    );
  }

  #[test]
  fn selection_is_deterministic() {
    let utxos = vec![utxo(1000, 8), utxo(2000, 8), utxo(3000, 8)];

    let build = || {
      TransactionBuilder::new(alice(), utxos.clone())
        .payment(payment(12))
        .build()
        .unwrap()
    };

    assert_eq!(build(), build());
  }

  #[test]
  fn fee_is_charged_on_top_of_payments() {
    let body = TransactionBuilder::new(alice(), vec![utxo(1000, 100)])
      .payment(payment(90))
      .fee(Fee {
        currency: NATIVE_CURRENCY,
        amount: U256::from(3),
      })
      .build()
      .unwrap();

    // 100 in, 90 paid, 3 fee, 7 change
    pretty_assert_eq!(
      body.outputs,
      vec![
        Output::payment(bob(), NATIVE_CURRENCY, U256::from(90)),
        Output::payment(alice(), NATIVE_CURRENCY, U256::from(7)),
      ],
    );
  }

  #[test]
  fn fee_in_a_separate_currency_selects_its_own_inputs() {
    let body = TransactionBuilder::new(alice(), vec![token_utxo(1000, 50), utxo(2000, 10)])
      .payment(Payment {
        owner: bob(),
        currency: token(),
        amount: U256::from(50),
      })
      .fee(Fee {
        currency: NATIVE_CURRENCY,
        amount: U256::from(4),
      })
      .build()
      .unwrap();

    // token inputs first, then the fee currency
    assert_eq!(
      body.inputs,
      vec![
        UtxoPos::new(1000, 0, 0).unwrap(),
        UtxoPos::new(2000, 0, 0).unwrap(),
      ],
    );

    pretty_assert_eq!(
      body.outputs,
      vec![
        Output::payment(bob(), token(), U256::from(50)),
        Output::payment(alice(), NATIVE_CURRENCY, U256::from(6)),
      ],
    );
  }

  #[test]
  fn conservation_holds_per_currency() {
    let fee = U256::from(2);

    let body = TransactionBuilder::new(
      alice(),
      vec![utxo(1000, 75), utxo(2000, 75), token_utxo(3000, 40)],
    )
    .payment(payment(100))
    .payment(Payment {
      owner: carol(),
      currency: token(),
      amount: U256::from(25),
    })
    .fee(Fee {
      currency: NATIVE_CURRENCY,
      amount: fee,
    })
    .build()
    .unwrap();

    for currency in [NATIVE_CURRENCY, token()] {
      let outputs = body
        .outputs
        .iter()
        .filter(|output| output.currency == currency)
        .map(|output| output.amount)
        .sum::<U256>();

      let inputs = [utxo(1000, 75), utxo(2000, 75), token_utxo(3000, 40)]
        .iter()
        .filter(|utxo| {
          utxo.currency == currency && body.inputs.contains(&utxo.position())
        })
        .map(|utxo| utxo.amount)
        .sum::<U256>();

      let charged = if currency == NATIVE_CURRENCY {
        fee
      } else {
        U256::ZERO
      };

      assert_eq!(inputs, outputs + charged, "currency {currency}");
    }
  }

  #[test]
  fn insufficient_funds_reports_the_shortfall() {
    assert_eq!(
      TransactionBuilder::new(alice(), vec![utxo(1000, 10)])
        .payment(payment(100))
        .build(),
      Err(Error::InsufficientFunds {
        currency: NATIVE_CURRENCY,
        shortfall: U256::from(90),
      }),
    );
  }

  #[test]
  fn coverage_needing_more_than_max_inputs_fails() {
    let utxos = (1..=6).map(|i| utxo(1000 * i, 1)).collect::<Vec<Utxo>>();

    // six 1-unit utxos cannot cover 6 within the four-input bound
    assert_eq!(
      TransactionBuilder::new(alice(), utxos).payment(payment(6)).build(),
      Err(Error::InsufficientFunds {
        currency: NATIVE_CURRENCY,
        shortfall: U256::from(2),
      }),
    );
  }

  #[test]
  fn too_many_inputs_across_currencies() {
    let currencies = [token(), carol(), plasma_contract()];

    let mut utxos = Vec::new();
    let mut builder = TransactionBuilder::new(alice(), Vec::new());

    for (i, &currency) in currencies.iter().enumerate() {
      let blknum = 1000 * (i as u64 + 1);
      utxos.push(utxo_for(alice(), currency, blknum, 5));
      utxos.push(utxo_for(alice(), currency, blknum + 1, 5));

      builder = builder.payment(Payment {
        owner: bob(),
        currency,
        amount: U256::from(10),
      });
    }

    assert_eq!(
      TransactionBuilder {
        utxos,
        ..builder
      }
      .build(),
      Err(Error::TooManyInputs(6)),
    );
  }

  #[test]
  fn too_many_outputs_across_currencies() {
    let currencies = [token(), carol(), plasma_contract()];

    let mut utxos = Vec::new();
    let mut builder = TransactionBuilder::new(alice(), Vec::new());

    for (i, &currency) in currencies.iter().enumerate() {
      utxos.push(utxo_for(alice(), currency, 1000 * (i as u64 + 1), 15));

      builder = builder.payment(Payment {
        owner: bob(),
        currency,
        amount: U256::from(10),
      });
    }

    // three payments plus three change outputs
    assert_eq!(
      TransactionBuilder {
        utxos,
        ..builder
      }
      .build(),
      Err(Error::TooManyOutputs(6)),
    );
  }

  #[test]
  fn metadata_is_carried_into_the_body() {
    let metadata = metadata::encode("rent").unwrap();

    let body = TransactionBuilder::new(alice(), vec![utxo(1000, 100)])
      .payment(payment(100))
      .metadata(metadata)
      .build()
      .unwrap();

    assert_eq!(body.metadata, metadata);
  }

  #[test]
  fn building_without_payments_or_fee_fails() {
    assert!(matches!(
      TransactionBuilder::new(alice(), vec![utxo(1000, 100)]).build(),
      Err(Error::InvalidArgument { .. }),
    ));
  }

  #[test]
  fn merge_combines_utxos_into_one_output() {
    let body = merge_utxos(
      &[utxo(1000, 10), utxo(2000, 20), utxo(3000, 30)],
      NULL_METADATA,
    )
    .unwrap();

    pretty_assert_eq!(
      body,
      TransactionBody::new(
        vec![
          UtxoPos::new(1000, 0, 0).unwrap(),
          UtxoPos::new(2000, 0, 0).unwrap(),
          UtxoPos::new(3000, 0, 0).unwrap(),
        ],
        vec![Output::payment(alice(), NATIVE_CURRENCY, U256::from(60))],
        NULL_METADATA,
      )
    );
  }

  #[test]
  fn merge_rejects_out_of_range_counts() {
    assert!(matches!(
      merge_utxos(&[utxo(1000, 10)], NULL_METADATA),
      Err(Error::InvalidArgument { .. }),
    ));

    let five = (1..=5).map(|i| utxo(1000 * i, 1)).collect::<Vec<Utxo>>();

    assert!(matches!(
      merge_utxos(&five, NULL_METADATA),
      Err(Error::InvalidArgument { .. }),
    ));
  }

  #[test]
  fn merge_rejects_mixed_currencies() {
    assert!(matches!(
      merge_utxos(&[utxo(1000, 10), token_utxo(2000, 10)], NULL_METADATA),
      Err(Error::InvalidArgument { .. }),
    ));
  }

  #[test]
  fn merge_rejects_mixed_owners() {
    assert!(matches!(
      merge_utxos(
        &[utxo(1000, 10), utxo_for(bob(), NATIVE_CURRENCY, 2000, 10)],
        NULL_METADATA,
      ),
      Err(Error::InvalidArgument { .. }),
    ));
  }
}
