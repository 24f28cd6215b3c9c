pub mod config;
pub mod ledger_end;
pub mod snapshot;
pub mod stream_updates;
pub mod submit_commands;
pub mod testutils;
