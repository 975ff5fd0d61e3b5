//! Testbed sample contract
//!
//! A contract that forwards a share of incoming payments, lets its creator
//! tune that share and withdraw funds, and exposes a public key-value map.
//! It is written against [`testbed_syscalls::HostEnvironment`], so it runs on
//! the real invocation context or on any host double.
//!
//! # Methods
//!
//! | Code | Method | Arguments | Creator only |
//! |------|--------|-----------|--------------|
//! | 1 | ForwardPercentage | recipient | no |
//! | 2 | UpdatePercentage | new percentage | yes |
//! | 3 | SetMapValue | key, value | no |
//! | 4 | PullFunds | asset id (0 = native) | yes |
//!
//! Unknown codes are ignored.
//!
//! # Example
//!
//! ```rust
//! use testbed_contract::{ContractRuntime, ContractState, UPDATE_PERCENTAGE};
//! use testbed_program_runtime::{InvokeContext, Ledger, MemoryStorage, TransactionQueue};
//!
//! let mut ledger = Ledger::new();
//! let mut storage = MemoryStorage::new();
//! let mut queue = TransactionQueue::new();
//! queue.push(1, 0, [UPDATE_PERCENTAGE, 40, 0, 0]);
//!
//! let mut runtime = ContractRuntime::new(ContractState::new(100, 1));
//! let mut context = InvokeContext::new(100, 1, &mut ledger, &mut storage, &mut queue);
//! runtime.process_block(&mut context);
//! assert_eq!(runtime.state().percentage(), 40);
//! ```

#![warn(missing_docs)]
#![deny(clippy::arithmetic_side_effects)]

pub mod methods;
pub mod runtime;
pub mod state;

pub use methods::{
    Method, Outcome, SkipReason, FORWARD_PERCENTAGE, MAP_KEY_EXAMPLE, PULL_FUNDS, SET_MAP_VALUE,
    UPDATE_PERCENTAGE,
};
pub use runtime::{BlockReport, ContractRuntime, Receipt, RuntimeStatus};
pub use state::ContractState;
