//! Property-Based Tests — Domain Layer Invariants
//!
//! Uses `proptest` to verify that odds conversion, order hashing and
//! fill-set selection hold their invariants across random inputs.

use alloy::primitives::{Address, B256, U256};
use alloy::signers::SignerSync;
use alloy::signers::local::PrivateKeySigner;
use proptest::prelude::*;

use sportx_order_engine::domain::eip712::{SigningDomain, recover_signer};
use sportx_order_engine::domain::selection::{SelectionPolicy, TakerIntent, select_orders};
use sportx_order_engine::domain::{
    BookOrder, Order, SignedOrder, from_protocol_odds, odds_scale, to_protocol_odds_f64,
};

fn domain() -> SigningDomain {
    SigningDomain::new("SportX", "1.0", 137, Address::repeat_byte(0x01))
}

fn key(seed: u64) -> PrivateKeySigner {
    PrivateKeySigner::from_bytes(&B256::from(U256::from(seed + 1))).unwrap()
}

fn order(maker: Address, size: u64, odds_bps: u64, salt: u64) -> Order {
    Order {
        market_hash: B256::repeat_byte(0x11),
        base_token: Address::repeat_byte(0x22),
        total_bet_size: U256::from(size),
        percentage_odds: odds_scale() * U256::from(odds_bps) / U256::from(10_000u64),
        is_maker_betting_outcome_one: true,
        expiry: 2_000_000_000,
        salt: U256::from(salt),
        maker,
        relayer_fee_address: Address::ZERO,
    }
}

fn book_order(seed: u64, size: u64, odds_bps: u64) -> BookOrder {
    let signer = key(seed);
    let order = order(signer.address(), size, odds_bps, seed);
    let signature = signer
        .sign_hash_sync(&order.order_struct_hash(&domain()))
        .unwrap();
    BookOrder {
        signed: SignedOrder::new(order, signature, &domain()).unwrap(),
        fill_amount: U256::ZERO,
    }
}

// ── Odds Conversion Properties ──────────────────────────────

proptest! {
    /// Display odds survive a trip through the protocol form.
    #[test]
    fn odds_round_trip_within_tolerance(p in 0.0001f64..0.9999) {
        let protocol = to_protocol_odds_f64(p).unwrap();
        let back = from_protocol_odds(protocol);
        prop_assert!(
            (back - p).abs() <= p * 1e-15 + f64::EPSILON,
            "round trip drifted: {p} -> {back}"
        );
    }

    /// Protocol odds always stay strictly inside (0, 10^20).
    #[test]
    fn protocol_odds_in_range(p in 0.0001f64..0.9999) {
        let protocol = to_protocol_odds_f64(p).unwrap();
        prop_assert!(!protocol.is_zero());
        prop_assert!(protocol < odds_scale());
    }

    /// Odds of 1 or more, or below 0, never convert.
    #[test]
    fn out_of_range_odds_rejected(p in prop_oneof![1.0f64..10.0, -10.0f64..-0.0001]) {
        prop_assert!(to_protocol_odds_f64(p).is_err());
    }
}

// ── Order Hash Properties ───────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any change of salt changes the order hash.
    #[test]
    fn salt_changes_hash(a in any::<u64>(), b in any::<u64>()) {
        prop_assume!(a != b);
        let maker = Address::repeat_byte(0x44);
        let first = order(maker, 100, 5_000, a).order_struct_hash(&domain());
        let second = order(maker, 100, 5_000, b).order_struct_hash(&domain());
        prop_assert_ne!(first, second);
    }

    /// A maker signature always recovers to the maker.
    #[test]
    fn signature_recovers_to_maker(seed in 0u64..10_000, size in 1u64..1_000_000) {
        let book = book_order(seed, size, 5_000);
        let recovered = recover_signer(book.order_hash(), book.signed.signature()).unwrap();
        prop_assert_eq!(recovered, book.signed.maker());
    }
}

// ── Selection Properties ────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// A suggestion covers exactly the desired stake and never exceeds any
    /// leg's remaining size.
    #[test]
    fn suggestion_covers_exact_stake(
        sizes in prop::collection::vec(1u64..1_000, 1..6),
        odds in prop::collection::vec(1_000u64..9_000, 6),
        fraction in 1u64..=100,
    ) {
        let book: Vec<BookOrder> = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| book_order(i as u64, *size, odds[i]))
            .collect();
        let available = book
            .iter()
            .fold(U256::ZERO, |acc, b| acc + b.remaining_size());
        prop_assume!(!available.is_zero());

        let desired = (available * U256::from(fraction) / U256::from(100u8)).max(U256::from(1u8));
        let intent = TakerIntent {
            market_hash: B256::repeat_byte(0x11),
            base_token: Address::repeat_byte(0x22),
            taker: Address::repeat_byte(0x99),
            is_taker_betting_outcome_one: false,
            desired_stake: desired,
        };
        let suggestion = select_orders(&book, &intent, &SelectionPolicy::default(), 1_000).unwrap();
        prop_assert_eq!(suggestion.total, desired);

        let sum = suggestion.legs.iter().fold(U256::ZERO, |acc, leg| acc + leg.stake);
        prop_assert_eq!(sum, desired);
        for leg in &suggestion.legs {
            let source = book.iter().find(|b| b.order_hash() == leg.order_hash).unwrap();
            prop_assert!(!leg.stake.is_zero());
            prop_assert!(leg.stake <= source.remaining_size());
        }
    }
}
