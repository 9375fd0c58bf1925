//! # Domain Value Objects
//!
//! Immutable value types for Coin Selection: identities, tokens, amounts,
//! output references and claim identifiers.

use super::errors::SelectionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Hash type (32-byte transaction hash).
pub type Hash = [u8; 32];

/// Identity of a party: owner, issuer, recipient or notary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartyId(pub [u8; 20]);

impl PartyId {
    /// Create a party identity from raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}..", hex::encode(&self.0[..4]))
    }
}

/// What is being counted (currency or asset code).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TokenType(pub String);

impl TokenType {
    /// Create a token type from its code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the token code.
    pub fn code(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A token as issued by a specific party.
///
/// Two `Issued` values with the same token but different issuers are not
/// fungible and are never summed together.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Issued {
    /// Party that created the value.
    pub issuer: PartyId,
    /// Underlying token.
    pub token: TokenType,
}

impl Issued {
    /// Create an issued token.
    pub fn new(issuer: PartyId, token: TokenType) -> Self {
        Self { issuer, token }
    }
}

impl fmt::Display for Issued {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} issued by {}", self.token, self.issuer)
    }
}

/// Fixed-point quantity of a token.
///
/// `T` is either a bare [`TokenType`] or an [`Issued`] token. Arithmetic is
/// checked: mismatched tokens fail with `MixedType`, overflow and underflow
/// fail with `AmountOverflow`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount<T> {
    /// Quantity in the token's smallest unit.
    pub quantity: u64,
    /// Token being counted.
    pub token: T,
}

impl<T> Amount<T>
where
    T: Clone + PartialEq + fmt::Display,
{
    /// Create an amount.
    pub fn new(quantity: u64, token: T) -> Self {
        Self { quantity, token }
    }

    /// Zero of the given token.
    pub fn zero(token: T) -> Self {
        Self { quantity: 0, token }
    }

    /// Check if the quantity is zero.
    pub fn is_zero(&self) -> bool {
        self.quantity == 0
    }

    /// Add two amounts of the same token.
    pub fn checked_add(&self, other: &Self) -> Result<Self, SelectionError> {
        self.ensure_same_token(other)?;
        let quantity = self
            .quantity
            .checked_add(other.quantity)
            .ok_or(SelectionError::AmountOverflow)?;
        Ok(Self::new(quantity, self.token.clone()))
    }

    /// Subtract an amount of the same token; fails on underflow.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, SelectionError> {
        self.ensure_same_token(other)?;
        let quantity = self
            .quantity
            .checked_sub(other.quantity)
            .ok_or(SelectionError::AmountOverflow)?;
        Ok(Self::new(quantity, self.token.clone()))
    }

    /// Sum amounts, starting from zero of `token`.
    pub fn sum_of<'a, I>(token: T, amounts: I) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = &'a Self>,
        T: 'a,
    {
        amounts
            .into_iter()
            .try_fold(Self::zero(token), |acc, amount| acc.checked_add(amount))
    }

    fn ensure_same_token(&self, other: &Self) -> Result<(), SelectionError> {
        if self.token != other.token {
            return Err(SelectionError::MixedType {
                expected: self.token.to_string(),
                found: other.token.to_string(),
            });
        }
        Ok(())
    }
}

impl Amount<Issued> {
    /// Drop the issuer, keeping the bare token.
    pub fn without_issuer(&self) -> Amount<TokenType> {
        Amount::new(self.quantity, self.token.token.clone())
    }

    /// Issuer of this amount.
    pub fn issuer(&self) -> PartyId {
        self.token.issuer
    }
}

impl Amount<TokenType> {
    /// Attribute this amount to an issuer.
    pub fn issued_by(&self, issuer: PartyId) -> Amount<Issued> {
        Amount::new(self.quantity, Issued::new(issuer, self.token.clone()))
    }
}

impl<T: fmt::Display> fmt::Display for Amount<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.quantity, self.token)
    }
}

/// Stable reference to a single output record.
///
/// Ordered by transaction hash, then output index. Ascending `StateRef`
/// order is the default selection order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateRef {
    /// Hash of the transaction that created the output.
    pub tx_hash: Hash,
    /// Output index within that transaction.
    pub index: u32,
}

impl StateRef {
    /// Create a state reference.
    pub fn new(tx_hash: Hash, index: u32) -> Self {
        Self { tx_hash, index }
    }
}

impl fmt::Display for StateRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..({})", hex::encode(&self.tx_hash[..4]), self.index)
    }
}

/// Correlation token grouping a sequence of reservation attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimId(pub Uuid);

impl ClaimId {
    /// Generate a fresh random claim id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ClaimId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
