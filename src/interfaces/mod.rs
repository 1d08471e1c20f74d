//! Edge interfaces: the HTTP API surface exposed to merchants and paying
//! clients.

pub mod http;
