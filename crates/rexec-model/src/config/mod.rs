mod task;
pub use task::{RunConfig, TaskConfig, TaskInputConfig, TaskOutputConfig};

mod request;
pub use request::{BuildRequest, PlannedInput};
