//! Testbed Program Runtime
//!
//! This crate provides the chain-side primitives that testbed contracts are
//! compiled against: balances, per-contract storage, the per-block
//! transaction queue, and the invocation context that ties them together.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          Testbed host                   │
//! │  (block assembly, attached amounts)     │
//! └────────────────┬────────────────────────┘
//!                  │
//!                  │ push transactions
//!                  │ create InvokeContext
//!                  ▼
//! ┌─────────────────────────────────────────┐
//! │  testbed-program-runtime (this crate)   │
//! │  ┌─────────────────────────────────┐    │
//! │  │    InvokeContext                │    │
//! │  │  - Current transaction          │    │
//! │  │  - Per-transaction journal      │    │
//! │  └─────────────────────────────────┘    │
//! │  ┌──────────┐ ┌───────────┐ ┌───────┐   │
//! │  │ Ledger   │ │ Storage   │ │ Queue │   │
//! │  └──────────┘ └───────────┘ └───────┘   │
//! └─────────────────────────────────────────┘
//!               │
//!               ▼
//! ┌─────────────────────────────────────────┐
//! │       testbed-syscalls (separate)       │
//! │  - get_next_tx, send_amount, ...        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use testbed_program_runtime::{
//!     Checkpoint, InvokeContext, Ledger, MemoryStorage, TransactionQueue, NATIVE_ASSET,
//! };
//!
//! let mut ledger = Ledger::new();
//! ledger.set_balance(100, NATIVE_ASSET, 1_000);
//! let mut storage = MemoryStorage::new();
//! let mut queue = TransactionQueue::new();
//! queue.push(7, 0, [1, 7, 0, 0]);
//!
//! let mut context = InvokeContext::new(100, 7, &mut ledger, &mut storage, &mut queue);
//! while context.next_transaction() != 0 {
//!     context.begin_transaction();
//!     context.transfer(100, 7, NATIVE_ASSET, 10).unwrap();
//!     context.commit_transaction();
//! }
//! ```

#![warn(missing_docs)]
#![deny(clippy::arithmetic_side_effects)]

pub mod error;
pub mod invoke_context;
pub mod ledger;
pub mod queue;
pub mod snapshot;
pub mod storage;

// Re-export main types
pub use error::{Result, RuntimeError};
pub use invoke_context::{Checkpoint, InvokeContext};
pub use ledger::{Account, AccountId, Amount, AssetId, Ledger, NATIVE_ASSET};
pub use queue::{Message, Transaction, TransactionQueue, TxId, MESSAGE_WORDS, NO_TRANSACTION};
pub use snapshot::ChainSnapshot;
pub use storage::{AccountProvider, MapKey, MemoryStorage, StorageProvider};
