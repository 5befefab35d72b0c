//! EIP-712 typed structures and the signing domain.
//!
//! Orders, cancellations and fills each carry a distinct type tag, so a
//! signature produced for one shape can never validate as another.

use std::borrow::Cow;

use alloy::primitives::{Address, B256, Signature, U256};
use alloy::sol;
use alloy::sol_types::{Eip712Domain, SolStruct};

use super::errors::{Result, SportxError};

sol! {
    /// Maker order as it is hashed and signed.
    #[derive(Debug, PartialEq, Eq)]
    struct Order {
        bytes32 marketHash;
        address baseToken;
        uint256 totalBetSize;
        uint256 percentageOdds;
        uint256 expiry;
        uint256 salt;
        address maker;
        address relayerFeeAddress;
        bool isMakerBettingOutcomeOne;
    }

    /// Cancellation request covering one or more maker orders.
    #[derive(Debug, PartialEq, Eq)]
    struct Cancel {
        string message;
        bytes32[] orderHashes;
    }

    /// Taker commitment to fill existing maker orders.
    #[derive(Debug, PartialEq, Eq)]
    struct Fill {
        address taker;
        bytes32[] orderHashes;
        uint256[] takerAmounts;
        uint256 fillSalt;
    }
}

/// Immutable signing domain resolved once from network configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningDomain {
    inner: Eip712Domain,
}

impl SigningDomain {
    /// Build the domain from protocol name/version, chain and verifier.
    pub fn new(name: &str, version: &str, chain_id: u64, verifying_contract: Address) -> Self {
        Self {
            inner: Eip712Domain::new(
                Some(Cow::Owned(name.to_string())),
                Some(Cow::Owned(version.to_string())),
                Some(U256::from(chain_id)),
                Some(verifying_contract),
                None,
            ),
        }
    }

    /// The EIP-712 domain separator.
    pub fn separator(&self) -> B256 {
        self.inner.separator()
    }

    /// Domain-separated digest of any typed struct.
    pub fn digest<T: SolStruct>(&self, value: &T) -> B256 {
        value.eip712_signing_hash(&self.inner)
    }

    /// Digest of a cancellation payload.
    pub fn cancellation_digest(&self, message: &str, order_hashes: &[B256]) -> B256 {
        self.digest(&Cancel {
            message: message.to_string(),
            orderHashes: order_hashes.to_vec(),
        })
    }
}

/// Recover the address that produced `signature` over `digest`.
///
/// # Errors
/// `SigningUnavailable` when the signature is not a valid secp256k1
/// recoverable signature.
pub fn recover_signer(digest: B256, signature: &Signature) -> Result<Address> {
    signature
        .recover_address_from_prehash(&digest)
        .map_err(|e| SportxError::SigningUnavailable(format!("unrecoverable signature: {e}")))
}

/// Parse a `0x`-prefixed 65-byte `r || s || v` signature.
///
/// # Errors
/// `MalformedResponse` when the hex or the signature bytes are invalid.
pub fn parse_signature(hex: &str) -> Result<Signature> {
    let bytes = alloy::hex::decode(hex)
        .map_err(|e| SportxError::MalformedResponse(format!("signature hex: {e}")))?;
    Signature::from_raw(&bytes)
        .map_err(|e| SportxError::MalformedResponse(format!("signature bytes: {e}")))
}

/// Hex form of a signature as the relayer expects it.
pub fn format_signature(signature: &Signature) -> String {
    alloy::hex::encode_prefixed(signature.as_bytes())
}
