mod kv;
pub use kv::KeyValue;

mod task_params;
pub use task_params::TaskParams;

mod build_id;
pub use build_id::BuildId;

mod build_status;
pub use build_status::BuildStatus;

mod build_handle;
pub use build_handle::BuildHandle;

mod binding;
pub use binding::{InputBinding, OutputBinding, SourceRef};

mod pair;
pub use pair::NamedPath;

mod job;
pub use job::{JobInput, JobRef};

mod event;
pub use event::BuildEvent;

/// Name of a task input or output as declared in the task config.
pub type ArtifactName = String;

/// Exit status reported by the remote task.
pub type ExitStatus = i32;
