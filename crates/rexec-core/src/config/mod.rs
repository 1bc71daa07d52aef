use std::path::Path;

use rexec_model::TaskConfig;
use tracing::{debug, instrument};

use crate::error::CoreError;

/// Load and validate the task config at `path`.
///
/// `extra_args` are appended to `run.args`; declared params are overridden from the process environment.
pub async fn load_task_config(path: &Path, extra_args: &[String]) -> Result<TaskConfig, CoreError> {
    load_task_config_with(path, extra_args, |key| std::env::var(key).ok()).await
}

/// Same as [`load_task_config`] with an explicit param lookup.
#[instrument(level = "debug", skip(extra_args, lookup), fields(path = %path.display()))]
pub async fn load_task_config_with<F>(
    path: &Path,
    extra_args: &[String],
    lookup: F,
) -> Result<TaskConfig, CoreError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CoreError::ConfigLoad(format!("{}: {e}", path.display())))?;

    let mut config: TaskConfig = serde_yaml::from_str(&raw)
        .map_err(|e| CoreError::ConfigLoad(format!("{}: {e}", path.display())))?;

    config.run.args.extend(extra_args.iter().cloned());
    config.params.override_with(lookup);
    config.validate()?;

    debug!(
        inputs = config.inputs.len(),
        outputs = config.outputs.len(),
        "task config loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn appends_args_and_overrides_params() {
        let file = write_config(
            "platform: linux\nparams:\n  FOO: config\n  BAR: kept\nrun:\n  path: make\n  args: [build]\n",
        );

        let cfg = load_task_config_with(file.path(), &["-j4".to_string()], |key| {
            (key == "FOO").then(|| "env".to_string())
        })
        .await
        .unwrap();

        assert_eq!(cfg.run.args, vec!["build", "-j4"]);
        assert_eq!(cfg.params.get("FOO"), Some("env"));
        assert_eq!(cfg.params.get("BAR"), Some("kept"));
    }

    #[tokio::test]
    async fn missing_file_is_config_load_error() {
        let err = load_task_config(Path::new("/definitely/not/here.yml"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ConfigLoad(_)));
    }

    #[tokio::test]
    async fn invalid_yaml_is_config_load_error() {
        let file = write_config("platform: [unterminated\n");
        let err = load_task_config_with(file.path(), &[], |_| None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ConfigLoad(_)));
    }

    #[tokio::test]
    async fn validation_failure_is_config_load_error() {
        let file = write_config("run:\n  path: ls\n");
        let err = load_task_config_with(file.path(), &[], |_| None)
            .await
            .unwrap_err();
        match err {
            CoreError::ConfigLoad(msg) => assert!(msg.contains("platform")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
