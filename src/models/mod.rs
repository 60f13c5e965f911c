mod order;
mod transaction;

pub use order::*;
pub use transaction::*;
