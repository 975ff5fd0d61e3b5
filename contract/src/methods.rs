//! Method codes and handlers of the sample contract
//!
//! Handlers never raise on guard failures: a disallowed call is reported as
//! [`Outcome::Skipped`] and changes nothing. The only errors are ledger
//! faults coming back from a send.

use testbed_program_runtime::{AccountId, Amount, AssetId, Message, Result, TxId, NATIVE_ASSET};
use testbed_syscalls::HostEnvironment;

use crate::state::{ContractState, MAX_PERCENTAGE};

/// Forward a share of the attached amount to the account in word 1
pub const FORWARD_PERCENTAGE: i64 = 1;
/// Set the forwarded percentage to word 1 (creator only)
pub const UPDATE_PERCENTAGE: i64 = 2;
/// Store word 2 under map key `(MAP_KEY_EXAMPLE, word 1)`
pub const SET_MAP_VALUE: i64 = 3;
/// Withdraw the whole balance of asset word 1 to the creator (creator only)
pub const PULL_FUNDS: i64 = 4;

/// Primary key of the map written by `SET_MAP_VALUE`
pub const MAP_KEY_EXAMPLE: i64 = 1;

/// Methods understood by the contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// See [`FORWARD_PERCENTAGE`]
    ForwardPercentage,
    /// See [`UPDATE_PERCENTAGE`]
    UpdatePercentage,
    /// See [`SET_MAP_VALUE`]
    SetMapValue,
    /// See [`PULL_FUNDS`]
    PullFunds,
}

impl Method {
    /// Decode a method code; unknown codes yield `None`
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            FORWARD_PERCENTAGE => Some(Method::ForwardPercentage),
            UPDATE_PERCENTAGE => Some(Method::UpdatePercentage),
            SET_MAP_VALUE => Some(Method::SetMapValue),
            PULL_FUNDS => Some(Method::PullFunds),
            _ => None,
        }
    }

    /// Wire code of the method
    pub fn code(self) -> i64 {
        match self {
            Method::ForwardPercentage => FORWARD_PERCENTAGE,
            Method::UpdatePercentage => UPDATE_PERCENTAGE,
            Method::SetMapValue => SET_MAP_VALUE,
            Method::PullFunds => PULL_FUNDS,
        }
    }
}

/// Result of a handler that did not fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The handler ran and its effects were kept
    Applied,
    /// The handler returned early without touching any state
    Skipped(SkipReason),
}

/// Why a transaction was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Sender is not the creator of the contract
    Unauthorized,
    /// Method code is not one of the known methods
    UnknownMethod,
    /// Forward requested while the percentage is 0
    ZeroPercentage,
}

/// The transaction being handled, as read through the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentTx {
    /// Transaction id
    pub id: TxId,
    /// Sending account
    pub sender: AccountId,
    /// Message words; word 0 is the method code
    pub message: Message,
}

impl CurrentTx {
    /// Read sender and message of `id` from the host
    pub fn read<H: HostEnvironment + ?Sized>(host: &H, id: TxId) -> Self {
        let mut message = Message::default();
        host.read_message(id, 0, &mut message);
        Self { id, sender: host.get_sender(id), message }
    }

    /// Method code
    pub fn code(&self) -> i64 {
        self.message[0]
    }

    /// Message word `idx`, 0 when out of range
    pub fn arg(&self, idx: usize) -> i64 {
        self.message.get(idx).copied().unwrap_or(0)
    }
}

/// Route a transaction to its handler
pub fn dispatch<H: HostEnvironment + ?Sized>(
    state: &mut ContractState,
    host: &mut H,
    tx: &CurrentTx,
) -> Result<Outcome> {
    match Method::from_code(tx.code()) {
        Some(Method::ForwardPercentage) => forward_percentage(state, host, tx, word_to_id(tx.arg(1))),
        Some(Method::UpdatePercentage) => Ok(update_percentage(state, tx, tx.arg(1))),
        Some(Method::SetMapValue) => Ok(set_map_value(host, tx.arg(1), tx.arg(2))),
        Some(Method::PullFunds) => pull_funds(state, host, tx, word_to_id(tx.arg(1))),
        None => Ok(Outcome::Skipped(SkipReason::UnknownMethod)),
    }
}

/// Send `percentage`% of the transaction's attached amount to `recipient`
///
/// Anyone may trigger a forward.
pub fn forward_percentage<H: HostEnvironment + ?Sized>(
    state: &ContractState,
    host: &mut H,
    tx: &CurrentTx,
    recipient: AccountId,
) -> Result<Outcome> {
    if state.percentage() == 0 {
        return Ok(Outcome::Skipped(SkipReason::ZeroPercentage));
    }
    let amount = percentage_of(host.get_amount(tx.id), state.percentage());
    host.send_amount(amount, recipient)?;
    Ok(Outcome::Applied)
}

/// Store a new percentage, clamped into `0..=100` (creator only)
pub fn update_percentage(state: &mut ContractState, tx: &CurrentTx, new_percentage: i64) -> Outcome {
    if tx.sender != state.creator {
        return Outcome::Skipped(SkipReason::Unauthorized);
    }
    state.set_percentage(new_percentage);
    Outcome::Applied
}

/// Write `(MAP_KEY_EXAMPLE, key) = value`
///
/// Any sender may write; the map is public.
pub fn set_map_value<H: HostEnvironment + ?Sized>(host: &mut H, key: i64, value: i64) -> Outcome {
    host.set_map_value(MAP_KEY_EXAMPLE, key, value);
    Outcome::Applied
}

/// Withdraw the contract's entire balance of `asset` to the creator (creator only)
pub fn pull_funds<H: HostEnvironment + ?Sized>(
    state: &ContractState,
    host: &mut H,
    tx: &CurrentTx,
    asset: AssetId,
) -> Result<Outcome> {
    if tx.sender != state.creator {
        return Ok(Outcome::Skipped(SkipReason::Unauthorized));
    }
    if asset == NATIVE_ASSET {
        host.send_balance(state.creator)?;
    } else {
        let held = host.get_asset_balance(asset);
        host.send_quantity(held, asset, state.creator)?;
    }
    Ok(Outcome::Applied)
}

/// Floor of `amount * percentage / 100`
fn percentage_of(amount: Amount, percentage: i64) -> Amount {
    let pct = u128::try_from(percentage.clamp(0, MAX_PERCENTAGE)).unwrap_or(0);
    let share = u128::from(amount)
        .saturating_mul(pct)
        .checked_div(100)
        .unwrap_or(0);
    // share never exceeds amount
    Amount::try_from(share).unwrap_or(amount)
}

/// Message words carrying ids are reinterpreted bit-for-bit
fn word_to_id(word: i64) -> u64 {
    word as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use testbed_program_runtime::RuntimeError;

    const CONTRACT: AccountId = 100;
    const CREATOR: AccountId = 1;
    const STRANGER: AccountId = 2;

    /// Host double recording sends instead of touching a ledger
    #[derive(Default)]
    struct MockHost {
        amount: Amount,
        native: Amount,
        assets: BTreeMap<AssetId, Amount>,
        sent: Vec<(Amount, AssetId, AccountId)>,
        map: BTreeMap<(i64, i64), i64>,
    }

    impl HostEnvironment for MockHost {
        fn get_next_tx(&mut self) -> TxId {
            0
        }
        fn get_sender(&self, _tx_id: TxId) -> AccountId {
            0
        }
        fn get_amount(&self, _tx_id: TxId) -> Amount {
            self.amount
        }
        fn read_message(&self, _tx_id: TxId, _offset: usize, buffer: &mut [i64]) {
            buffer.fill(0);
        }
        fn get_creator(&self) -> AccountId {
            CREATOR
        }
        fn get_block_height(&self) -> u64 {
            0
        }
        fn get_current_balance(&self) -> Amount {
            self.native
        }
        fn get_asset_balance(&self, asset: AssetId) -> Amount {
            self.assets.get(&asset).copied().unwrap_or(0)
        }
        fn send_amount(&mut self, amount: Amount, recipient: AccountId) -> Result<()> {
            self.send_quantity(amount, NATIVE_ASSET, recipient)
        }
        fn send_balance(&mut self, recipient: AccountId) -> Result<()> {
            self.send_quantity(self.native, NATIVE_ASSET, recipient)
        }
        fn send_quantity(&mut self, amount: Amount, asset: AssetId, recipient: AccountId) -> Result<()> {
            let held = if asset == NATIVE_ASSET { self.native } else { self.get_asset_balance(asset) };
            if held < amount {
                return Err(RuntimeError::InsufficientFunds { account: CONTRACT, asset, balance: held, amount });
            }
            self.sent.push((amount, asset, recipient));
            Ok(())
        }
        fn get_map_value(&self, key1: i64, key2: i64) -> i64 {
            self.map.get(&(key1, key2)).copied().unwrap_or(0)
        }
        fn set_map_value(&mut self, key1: i64, key2: i64, value: i64) {
            self.map.insert((key1, key2), value);
        }
    }

    fn tx(sender: AccountId, message: Message) -> CurrentTx {
        CurrentTx { id: 1, sender, message }
    }

    #[test]
    fn test_method_codes() {
        for method in [Method::ForwardPercentage, Method::UpdatePercentage, Method::SetMapValue, Method::PullFunds] {
            assert_eq!(Method::from_code(method.code()), Some(method));
        }
        assert_eq!(Method::from_code(0), None);
        assert_eq!(Method::from_code(99), None);
    }

    #[test]
    fn test_percentage_of_floors() {
        assert_eq!(percentage_of(100, 100), 100);
        assert_eq!(percentage_of(99, 50), 49);
        assert_eq!(percentage_of(1, 99), 0);
        assert_eq!(percentage_of(u64::MAX, 100), u64::MAX);
        assert_eq!(percentage_of(u64::MAX, 50), u64::MAX / 2);
    }

    #[test]
    fn test_forward_with_zero_percentage_is_skipped() {
        let state = ContractState::new(CONTRACT, CREATOR);
        let mut host = MockHost { amount: 100, native: 100, ..Default::default() };

        let outcome = forward_percentage(&state, &mut host, &tx(STRANGER, [1, 9, 0, 0]), 9).unwrap();
        assert_eq!(outcome, Outcome::Skipped(SkipReason::ZeroPercentage));
        assert!(host.sent.is_empty());
    }

    #[test]
    fn test_forward_by_anyone() {
        let state = ContractState::new(CONTRACT, CREATOR).with_percentage(30);
        let mut host = MockHost { amount: 1_000, native: 1_000, ..Default::default() };

        let outcome = forward_percentage(&state, &mut host, &tx(STRANGER, [1, 9, 0, 0]), 9).unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(host.sent, vec![(300, NATIVE_ASSET, 9)]);
    }

    #[test]
    fn test_update_percentage_requires_creator() {
        let mut state = ContractState::new(CONTRACT, CREATOR);

        let outcome = update_percentage(&mut state, &tx(STRANGER, [2, 50, 0, 0]), 50);
        assert_eq!(outcome, Outcome::Skipped(SkipReason::Unauthorized));
        assert_eq!(state.percentage(), 0);

        assert_eq!(update_percentage(&mut state, &tx(CREATOR, [2, 50, 0, 0]), 50), Outcome::Applied);
        assert_eq!(state.percentage(), 50);
    }

    #[test]
    fn test_set_map_value_is_public() {
        let mut state = ContractState::new(CONTRACT, CREATOR);
        let mut host = MockHost::default();

        let outcome = dispatch(&mut state, &mut host, &tx(STRANGER, [3, 42, -8, 0])).unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(host.get_map_value(MAP_KEY_EXAMPLE, 42), -8);
    }

    #[test]
    fn test_pull_funds_asset() {
        let state = ContractState::new(CONTRACT, CREATOR);
        let mut host = MockHost::default();
        host.assets.insert(7, 25);

        let outcome = pull_funds(&state, &mut host, &tx(CREATOR, [4, 7, 0, 0]), 7).unwrap();
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(host.sent, vec![(25, 7, CREATOR)]);
    }

    #[test]
    fn test_pull_funds_by_stranger_is_skipped() {
        let state = ContractState::new(CONTRACT, CREATOR);
        let mut host = MockHost { native: 500, ..Default::default() };

        let outcome = pull_funds(&state, &mut host, &tx(STRANGER, [4, 0, 0, 0]), NATIVE_ASSET).unwrap();
        assert_eq!(outcome, Outcome::Skipped(SkipReason::Unauthorized));
        assert!(host.sent.is_empty());
    }

    #[test]
    fn test_unknown_method() {
        let mut state = ContractState::new(CONTRACT, CREATOR);
        let mut host = MockHost::default();

        let outcome = dispatch(&mut state, &mut host, &tx(CREATOR, [99, 1, 2, 3])).unwrap();
        assert_eq!(outcome, Outcome::Skipped(SkipReason::UnknownMethod));
        assert!(host.map.is_empty());
        assert!(host.sent.is_empty());
    }

    #[test]
    fn test_negative_word_as_id() {
        assert_eq!(word_to_id(-1), u64::MAX);
        assert_eq!(word_to_id(42), 42);
    }
}
