//! Output registry clients
//!
//! - `OutputRegistry` trait with default-value fallback
//! - `MemoryOutputRegistry` for tests and dry runs
//! - `CloudFormationRegistry` for deployed stacks (`aws` feature)

mod traits;
mod memory;
#[cfg(feature = "aws")]
mod cloudformation;

pub use traits::{OutputRegistry, RegistryError, RegistryResult};
pub use memory::MemoryOutputRegistry;
#[cfg(feature = "aws")]
pub use cloudformation::CloudFormationRegistry;
