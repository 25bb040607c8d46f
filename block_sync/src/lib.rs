//! Block synchronization for a block-linked ledger.
//!
//! Peers deliver blocks in any order. This crate decides, for each one,
//! whether it extends the chain, extends a competing branch or has to wait
//! for a missing parent, and reconnects waiting blocks once they can link.
//!
//! - **Block Store**: pending pool of orphans, indexed by hash, parent and number
//! - **Node Information**: which peers are known to have which blocks
//! - **Sync Service**: connects delivered blocks and cascades through the pool
//! - **Block Processor**: single-consumer queue feeding the sync service
//!
//! ## Block States
//!
//! - **UNSEEN**: never delivered, or evicted from the pool
//! - **PENDING**: buffered until its parent connects
//! - **CONNECTED**: accepted by the chain on some branch
//! - **BEST**: connected and the current head
pub mod block_store;
pub mod config;
pub mod node_information;
pub mod processor;
pub mod service;
pub mod states;
pub mod types;

pub use block_store::BlockStore;
pub use config::SyncConfig;
pub use node_information::BlockNodeInformation;
pub use processor::{BlockProcessor, ProcessorStats};
pub use service::{BlockSyncService, ProcessOutcome, ProcessResult, SyncStats};
pub use states::BlockState;
pub use types::{ChainMessage, ChainMessageSink, ChainMessageSource};

#[cfg(test)]
mod tests;
