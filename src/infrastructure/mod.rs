//! Infrastructure adapters for the domain ports: order stores, the
//! settlement authority client, and the merchant webhook dispatcher.

pub mod in_memory;
pub mod paytm;
#[cfg(feature = "store-redis")]
pub mod redis;
pub mod webhook;
