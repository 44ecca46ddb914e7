//! USPS Addresses API v3: OAuth token exchange and per-record address lookup.

mod model;
pub mod token;
pub mod verify;

pub use token::TokenProvider;
pub use verify::AddressVerifier;
