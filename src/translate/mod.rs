pub mod client;
pub mod endpoint;
pub mod error;
#[cfg(test)]
pub mod mock;
