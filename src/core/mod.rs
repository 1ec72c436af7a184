pub mod config;
pub mod de;
pub mod error;
pub mod types;

pub use config::{AgentConfig, SwitchPolicy};
pub use error::{AgentError, Result};
pub use types::{Condition, SideId, StatStages, Status};
