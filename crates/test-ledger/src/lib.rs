pub mod ledger;
pub mod notify;

pub use ledger::ScriptedLedger;
pub use notify::CapturingEmitter;
