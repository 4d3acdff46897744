pub mod account;
pub mod config;
pub mod corpus;
pub mod error;
pub mod generator;
pub mod mutator;
pub mod node;
pub mod recovery;
pub mod spammer;
pub mod strategy;
pub mod tx;

pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;
