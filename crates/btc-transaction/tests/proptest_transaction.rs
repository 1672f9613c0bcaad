use proptest::prelude::*;

use btc_script::{Address, Script};
use btc_transaction::builder;
use btc_transaction::selection::{CoinSelector, FirstFit, LargestFirst};
use btc_transaction::{
    Transaction, TransactionError, TransactionInput, TransactionOutput, UnspentOutput,
};

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    let arb_input = (
        prop::array::uniform32(any::<u8>()),
        any::<u32>(),
        prop::collection::vec(any::<u8>(), 0..300),
        any::<u32>(),
    )
        .prop_map(|(txid, vout, script, seq)| {
            let mut input = TransactionInput::new(txid, vout);
            input.unlocking_script = Script::from_bytes(&script);
            input.sequence_number = seq;
            input
        });

    let arb_output = (any::<u64>(), prop::collection::vec(any::<u8>(), 0..300))
        .prop_map(|(sats, script)| TransactionOutput::new(sats, Script::from_bytes(&script)));

    (
        any::<u32>(),
        prop::collection::vec(arb_input, 0..5),
        prop::collection::vec(arb_output, 0..5),
        any::<u32>(),
    )
        .prop_map(|(version, inputs, outputs, lock_time)| Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
}

/// Candidates with distinct outpoints.
fn arb_candidates() -> impl Strategy<Value = Vec<UnspentOutput>> {
    prop::collection::vec(1u64..2_000_000, 0..12).prop_map(|values| {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                UnspentOutput::new([i as u8; 32], i as u32, v, Script::new_p2pkh(&[0x42; 20]))
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn wire_roundtrip(tx in arb_transaction()) {
        let bytes = tx.to_bytes();
        prop_assert_eq!(bytes.len(), tx.size());
        let parsed = Transaction::from_bytes(&bytes).unwrap();
        prop_assert_eq!(&parsed, &tx);
        prop_assert_eq!(Transaction::from_hex(&tx.to_hex()).unwrap().tx_id(), tx.tx_id());
    }

    #[test]
    fn first_fit_selects_shortest_sufficient_prefix(
        candidates in arb_candidates(),
        amount in 1u64..5_000_000,
        fee in 0u64..50_000,
    ) {
        let target = amount + fee;
        match FirstFit.select(&candidates, amount, fee) {
            Ok(sel) => {
                prop_assert!(sel.total >= target);
                prop_assert_eq!(&sel.utxos[..], &candidates[..sel.len()]);
                let without_last: u64 =
                    sel.utxos[..sel.len() - 1].iter().map(|u| u.satoshis).sum();
                prop_assert!(without_last < target);
            }
            Err(TransactionError::InsufficientFunds { available, required }) => {
                let sum: u64 = candidates.iter().map(|u| u.satoshis).sum();
                prop_assert!(sum < target);
                prop_assert_eq!(available, sum);
                prop_assert_eq!(required, target);
            }
            Err(e) => prop_assert!(false, "unexpected error {:?}", e),
        }
    }

    #[test]
    fn largest_first_never_uses_more_inputs(
        candidates in arb_candidates(),
        amount in 1u64..5_000_000,
    ) {
        if let (Ok(ff), Ok(lf)) = (
            FirstFit.select(&candidates, amount, 0),
            LargestFirst.select(&candidates, amount, 0),
        ) {
            prop_assert!(lf.len() <= ff.len());
            prop_assert!(lf.total >= amount);
        }
    }

    #[test]
    fn assembled_fee_is_exact(
        candidates in arb_candidates(),
        amount in 1u64..5_000_000,
        fee in 0u64..50_000,
    ) {
        let to = Address::from_public_key_hash(&[0x01; 20]);
        let change = Address::from_public_key_hash(&[0x02; 20]);
        if let Ok(sel) = FirstFit.select(&candidates, amount, fee) {
            let tx = builder::build(&sel, &to, amount, fee, &change).unwrap();
            prop_assert_eq!(tx.fee().unwrap(), fee);
            prop_assert_eq!(tx.input_count(), sel.len());
            let expected_outputs = if sel.total == amount + fee { 1 } else { 2 };
            prop_assert_eq!(tx.output_count(), expected_outputs);
        }
    }
}
