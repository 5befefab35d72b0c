//! Taker fills against existing maker orders.

use std::collections::HashSet;

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::convert::TokenAmount;
use super::eip712;
use super::errors::{Result, SportxError};
use super::order::{BookOrder, fresh_salt};

/// A locally validated match of taker stakes against maker orders.
///
/// Construction enforces the bounds; the relayer still decides what is
/// actually filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub order_hashes: Vec<B256>,
    pub taker_amounts: Vec<TokenAmount>,
    pub fill_salt: U256,
}

impl Fill {
    /// Check `orders` and `stakes` are parallel, non-empty, name each
    /// order once and stay within each order's remaining taker-side size.
    ///
    /// # Errors
    /// `LengthMismatch`, `EmptyOrderSet`, `DuplicateOrder` or
    /// `StakeExceedsRemaining`.
    pub fn new(orders: &[BookOrder], stakes: &[TokenAmount]) -> Result<Self> {
        if orders.len() != stakes.len() {
            return Err(SportxError::LengthMismatch {
                orders: orders.len(),
                stakes: stakes.len(),
            });
        }
        if orders.is_empty() {
            return Err(SportxError::EmptyOrderSet);
        }
        let mut seen = HashSet::with_capacity(orders.len());
        for (index, (book, stake)) in orders.iter().zip(stakes).enumerate() {
            if !seen.insert(book.order_hash()) {
                return Err(SportxError::DuplicateOrder {
                    index,
                    order_hash: book.order_hash(),
                });
            }
            let remaining = book.remaining_size();
            if stake.is_zero() || *stake > remaining {
                return Err(SportxError::StakeExceedsRemaining {
                    index,
                    stake: *stake,
                    remaining,
                });
            }
        }
        Ok(Self {
            order_hashes: orders.iter().map(BookOrder::order_hash).collect(),
            taker_amounts: stakes.to_vec(),
            fill_salt: fresh_salt(),
        })
    }

    pub fn total_stake(&self) -> TokenAmount {
        self.taker_amounts
            .iter()
            .fold(U256::ZERO, |acc, amount| acc.saturating_add(*amount))
    }

    /// Typed-data view the taker signs.
    pub fn typed(&self, taker: Address) -> eip712::Fill {
        eip712::Fill {
            taker,
            orderHashes: self.order_hashes.clone(),
            takerAmounts: self.taker_amounts.clone(),
            fillSalt: self.fill_salt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::convert::odds_scale;
    use crate::domain::eip712::SigningDomain;
    use crate::domain::order::{Order, SignedOrder};
    use alloy::signers::SignerSync;
    use alloy::signers::local::PrivateKeySigner;

    fn book_order(total: u64, fill: u64) -> BookOrder {
        let key = PrivateKeySigner::from_bytes(&B256::from(U256::from(7u8))).unwrap();
        let domain = SigningDomain::new("SportX", "1.0", 137, Address::ZERO);
        let order = Order {
            market_hash: B256::repeat_byte(0x11),
            base_token: Address::repeat_byte(0x22),
            total_bet_size: U256::from(total),
            percentage_odds: odds_scale() / U256::from(2u8),
            is_maker_betting_outcome_one: true,
            expiry: 2_000_000_000,
            salt: U256::from(total),
            maker: key.address(),
            relayer_fee_address: Address::ZERO,
        };
        let sig = key.sign_hash_sync(&order.order_struct_hash(&domain)).unwrap();
        BookOrder {
            signed: SignedOrder::new(order, sig, &domain).unwrap(),
            fill_amount: U256::from(fill),
        }
    }

    #[test]
    fn test_length_mismatch() {
        let orders = vec![book_order(100, 0)];
        let err = Fill::new(&orders, &[U256::from(1u8), U256::from(1u8)]).unwrap_err();
        assert!(matches!(
            err,
            SportxError::LengthMismatch {
                orders: 1,
                stakes: 2
            }
        ));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            Fill::new(&[], &[]),
            Err(SportxError::EmptyOrderSet)
        ));
    }

    #[test]
    fn test_stake_bounded_by_remaining() {
        let orders = vec![book_order(100, 0), book_order(100, 30)];
        assert!(Fill::new(&orders, &[U256::from(100u8), U256::from(70u8)]).is_ok());

        let err = Fill::new(&orders, &[U256::from(100u8), U256::from(71u8)]).unwrap_err();
        match err {
            SportxError::StakeExceedsRemaining {
                index, remaining, ..
            } => {
                assert_eq!(index, 1);
                assert_eq!(remaining, U256::from(70u8));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_repeated_order_cannot_stack_stakes() {
        let order = book_order(100, 0);
        let orders = vec![order.clone(), order.clone()];
        let err = Fill::new(&orders, &[U256::from(100u8), U256::from(100u8)]).unwrap_err();
        match err {
            SportxError::DuplicateOrder { index, order_hash } => {
                assert_eq!(index, 1);
                assert_eq!(order_hash, order.order_hash());
            }
            other => panic!("unexpected {other:?}"),
        }

        // Splitting within the remaining size is still refused.
        let err = Fill::new(&orders, &[U256::from(50u8), U256::from(50u8)]).unwrap_err();
        assert!(matches!(err, SportxError::DuplicateOrder { .. }));
    }

    #[test]
    fn test_total_and_typed_view() {
        let orders = vec![book_order(100, 0), book_order(200, 0)];
        let fill = Fill::new(&orders, &[U256::from(40u8), U256::from(60u8)]).unwrap();
        assert_eq!(fill.total_stake(), U256::from(100u8));

        let typed = fill.typed(Address::repeat_byte(0x99));
        assert_eq!(typed.orderHashes, fill.order_hashes);
        assert_eq!(typed.fillSalt, fill.fill_salt);
    }
}
