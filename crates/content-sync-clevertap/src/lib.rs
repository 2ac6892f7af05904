pub mod client;
pub mod region;
pub mod wire;

pub use client::{ClevertapClient, ClevertapConfig};
pub use region::Region;
