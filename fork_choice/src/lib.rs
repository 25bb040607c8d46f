pub mod blockchain;
pub mod handlers;
pub mod helpers;
pub mod store;
pub mod weight;

pub use blockchain::*;
pub use handlers::*;
pub use helpers::*;
pub use store::*;
pub use weight::*;
