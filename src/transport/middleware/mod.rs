//! Transport middleware layers.

pub mod retry;

#[cfg(feature = "async")]
pub mod retry_async;
#[cfg(feature = "blocking")]
pub mod retry_blocking;

#[cfg(feature = "async")]
pub mod hook_async;
#[cfg(feature = "blocking")]
pub mod hook_blocking;

#[cfg(feature = "async")]
pub use retry_async::RetryAsync;
#[cfg(feature = "blocking")]
pub use retry_blocking::RetryBlocking;

pub use retry::RetryConfig;

#[cfg(feature = "async")]
pub use hook_async::HookAsync;
#[cfg(feature = "blocking")]
pub use hook_blocking::HookBlocking;
