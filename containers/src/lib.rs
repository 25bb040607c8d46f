pub mod block;
pub mod number;
pub mod serde_helpers;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod generator;

pub use block::{Block, BlockError, BlockHeader};
pub use number::BlockNumber;
pub use types::Bytes32;

#[cfg(any(test, feature = "test-utils"))]
pub use generator::BlockGenerator;
