//! Balance and transfer intrinsics
//!
//! Every send debits the running contract's own account. Sending zero is a
//! no-op, so draining an empty balance never faults.

use testbed_program_runtime::{AccountId, Amount, AssetId, InvokeContext, Result, NATIVE_ASSET};

use crate::syscall_names;

/// Native balance of the running contract
pub fn get_current_balance(invoke_context: &InvokeContext) -> Amount {
    invoke_context.balance_of(invoke_context.contract_id, NATIVE_ASSET)
}

/// Balance of `asset` held by the running contract
pub fn get_asset_balance(invoke_context: &InvokeContext, asset: AssetId) -> Amount {
    invoke_context.balance_of(invoke_context.contract_id, asset)
}

/// Send native currency from the contract to `recipient`
///
/// # Errors
/// - `InsufficientFunds` - If the contract holds less than `amount`
/// - `Overflow` - If the recipient's balance would overflow
pub fn send_amount(invoke_context: &mut InvokeContext, amount: Amount, recipient: AccountId) -> Result<()> {
    send(invoke_context, syscall_names::SEND_AMOUNT, amount, NATIVE_ASSET, recipient)
}

/// Send the contract's entire native balance to `recipient`
pub fn send_balance(invoke_context: &mut InvokeContext, recipient: AccountId) -> Result<()> {
    let amount = get_current_balance(invoke_context);
    send(invoke_context, syscall_names::SEND_BALANCE, amount, NATIVE_ASSET, recipient)
}

/// Send `amount` of `asset` from the contract to `recipient`
///
/// Asset id 0 sends native currency.
pub fn send_quantity(
    invoke_context: &mut InvokeContext,
    amount: Amount,
    asset: AssetId,
    recipient: AccountId,
) -> Result<()> {
    send(invoke_context, syscall_names::SEND_QUANTITY, amount, asset, recipient)
}

fn send(
    invoke_context: &mut InvokeContext,
    name: &str,
    amount: Amount,
    asset: AssetId,
    recipient: AccountId,
) -> Result<()> {
    if invoke_context.debug_mode {
        log::debug!("{}: {} of asset {} to {}", name, amount, asset, recipient);
    }
    if amount == 0 {
        return Ok(());
    }
    let contract = invoke_context.contract_id;
    invoke_context.transfer(contract, recipient, asset, amount)
}
