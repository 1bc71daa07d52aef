use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{ArtifactName, ModelError, SourceRef};

/// `PIPELINE/JOB` value of the `--inputs-from` flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRef {
    pub pipeline: String,
    pub job: String,
}

impl FromStr for JobRef {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((pipeline, job))
                if !pipeline.is_empty() && !job.is_empty() && !job.contains('/') =>
            {
                Ok(Self {
                    pipeline: pipeline.to_string(),
                    job: job.to_string(),
                })
            }
            _ => Err(ModelError::InvalidJob(s.to_string())),
        }
    }
}

impl fmt::Display for JobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.pipeline, self.job)
    }
}

/// One input of a job's latest build, as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInput {
    pub name: ArtifactName,
    pub source: SourceRef,
}
