//! Shared runtime types

mod cancellation;

pub use cancellation::CancellationToken;
