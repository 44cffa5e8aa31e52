mod error;
mod traits;
mod types;

pub use error::BackendError;
pub use traits::{CommandRunner, ToolInvocation, ToolOutput};
pub use types::{SYSTEM_VERSION, VersionIdentifier, VersionItem, VersionManagerState};
