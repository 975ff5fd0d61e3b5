//! Contract map intrinsics

use testbed_program_runtime::InvokeContext;

use crate::syscall_names;

/// Read `(key1, key2)` from the running contract's map (0 if never written)
pub fn get_map_value(invoke_context: &InvokeContext, key1: i64, key2: i64) -> i64 {
    invoke_context.get_storage(key1, key2)
}

/// Write `(key1, key2) = value` to the running contract's map
pub fn set_map_value(invoke_context: &mut InvokeContext, key1: i64, key2: i64, value: i64) {
    if invoke_context.debug_mode {
        log::debug!("{}({}, {}) = {}", syscall_names::SET_MAP_VALUE, key1, key2, value);
    }
    invoke_context.set_storage(key1, key2, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use testbed_program_runtime::{Ledger, MemoryStorage, StorageProvider, TransactionQueue};

    #[test]
    fn test_set_then_get() {
        let mut ledger = Ledger::new();
        let mut storage = MemoryStorage::new();
        let mut queue = TransactionQueue::new();
        {
            let mut context = InvokeContext::new(100, 1, &mut ledger, &mut storage, &mut queue);
            assert_eq!(get_map_value(&context, 1, 5), 0);
            set_map_value(&mut context, 1, 5, 77);
            assert_eq!(get_map_value(&context, 1, 5), 77);
        }
        // Written under the contract's own id
        assert_eq!(storage.get(100, 1, 5), 77);
        assert_eq!(storage.get(101, 1, 5), 0);
    }
}
