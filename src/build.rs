mod auto;
mod context;
pub mod paths;
mod pipeline;
mod registry;
mod step;
mod steps;
mod watch;

pub use auto::{AutoBuilder, WatchSummary};
pub use context::SiteContext;
pub use pipeline::Pipeline;
pub use registry::WatchRegistry;
pub use watch::FileWatcher;
