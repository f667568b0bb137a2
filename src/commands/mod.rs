// Command handlers module
pub mod session;
pub mod youtube;

// Re-exports for cleaner imports
pub use session::{dispatch, DownloadHandler, Flow, Handler, Invocation, Mode};
