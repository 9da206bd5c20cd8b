//! Account keys and addresses
//!
//! This module handles private key storage and message signing.
//! The private key NEVER leaves this module.

mod address;
mod signer;

pub use address::Address;
pub use signer::{derive_address, LocalAccount};
