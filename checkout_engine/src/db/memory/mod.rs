mod ledger;
mod menu;

pub use ledger::MemoryLedger;
pub use menu::MemoryMenuStore;
