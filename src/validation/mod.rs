//! Format Validation Module
//!
//! Pure predicates guarding every identifier that enters the ledger. None of
//! these functions fail or touch state; the controller turns a `false` into the
//! error kind for the role being checked.
//!
//! Signature checks are format-only. Cryptographic verification against a
//! message and key happens in the validator agent before submission.

use crate::types::{PAYOUT_ADDRESS_LEN, SIGNATURE_LEN, SOURCE_SENDER_LEN, TX_HASH_LEN};

// ============================================================================
// ACCOUNT IDENTITY
// ============================================================================

/// Crockford-style base32 alphabet used by destination-chain addresses
const C32_ALPHABET: &str = "0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Address version characters (mainnet/testnet, single-sig/multi-sig)
const PRINCIPAL_VERSIONS: [char; 4] = ['P', 'M', 'T', 'N'];

/// Accepted length range of the c32 body following `S` + version
const PRINCIPAL_BODY_MIN: usize = 37;
const PRINCIPAL_BODY_MAX: usize = 40;

/// Maximum contract name length for contract principals
const CONTRACT_NAME_MAX: usize = 40;

/// Returns true if `identity` is a well-formed destination-chain principal.
///
/// Standard principals look like `ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM`;
/// contract principals append `.contract-name`.
pub fn is_valid_account_identity(identity: &str) -> bool {
    let (address, contract) = match identity.split_once('.') {
        Some((address, contract)) => (address, Some(contract)),
        None => (identity, None),
    };

    if !is_valid_standard_address(address) {
        return false;
    }

    match contract {
        Some(name) => is_valid_contract_name(name),
        None => true,
    }
}

fn is_valid_standard_address(address: &str) -> bool {
    let mut chars = address.chars();
    if chars.next() != Some('S') {
        return false;
    }
    match chars.next() {
        Some(version) if PRINCIPAL_VERSIONS.contains(&version) => {}
        _ => return false,
    }

    let body = chars.as_str();
    (PRINCIPAL_BODY_MIN..=PRINCIPAL_BODY_MAX).contains(&body.len())
        && body.chars().all(|c| C32_ALPHABET.contains(c))
}

fn is_valid_contract_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    name.len() <= CONTRACT_NAME_MAX
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// ============================================================================
// SOURCE-CHAIN FORMATS
// ============================================================================

/// Role of a source-chain address; the two roles use different encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceAddressRole {
    /// Deposit sender, a compressed public key (33 bytes)
    Sender,
    /// Withdrawal payout address (34 bytes)
    Payout,
}

impl SourceAddressRole {
    pub fn expected_len(self) -> usize {
        match self {
            SourceAddressRole::Sender => SOURCE_SENDER_LEN,
            SourceAddressRole::Payout => PAYOUT_ADDRESS_LEN,
        }
    }
}

/// Returns true if `bytes` has the length expected for the given role.
pub fn is_valid_source_address(bytes: &[u8], role: SourceAddressRole) -> bool {
    bytes.len() == role.expected_len()
}

/// Returns true if `bytes` is exactly 32 bytes.
pub fn is_valid_tx_hash(bytes: &[u8]) -> bool {
    bytes.len() == TX_HASH_LEN
}

/// Returns true if `bytes` is exactly 65 bytes.
pub fn is_valid_signature_format(bytes: &[u8]) -> bool {
    bytes.len() == SIGNATURE_LEN
}

// ============================================================================
// AMOUNTS
// ============================================================================

/// Inclusive amount range applied to deposits and withdrawals alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountRange {
    pub min: u64,
    pub max: u64,
}

impl AmountRange {
    pub fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, amount: u64) -> bool {
        self.min <= amount && amount <= self.max
    }
}
