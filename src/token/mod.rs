//! Token model and token endpoint decoding.

pub mod endpoint;
pub mod token;

pub use token::Token;
