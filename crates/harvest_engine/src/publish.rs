use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use harvest_core::{sanitize_name, Category};
use harvest_logging::harvest_debug;
use tokio::process::Command;

use crate::PublishError;

pub const DEFAULT_REINDEX_URL: &str = "http://localhost:8080/api/knowledge/rebuild";

/// Hands artifacts to the downstream knowledge store.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    /// Copy `artifact` into the ingestion location for `category`.
    /// Returns a description of where it landed.
    async fn publish(&self, artifact: &Path, category: &Category) -> Result<String, PublishError>;

    /// Ask the store to rebuild its index. Called at most once per run.
    async fn notify_reindex(&self) -> Result<(), PublishError>;

    /// Whether [`Publisher::notify_reindex`] would actually reach a store.
    fn reindex_enabled(&self) -> bool {
        true
    }
}

/// Category → downstream subdirectory. Unmapped categories use their sanitized name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDirs {
    dirs: BTreeMap<String, String>,
}

impl CategoryDirs {
    pub fn new(dirs: BTreeMap<String, String>) -> Self {
        Self { dirs }
    }

    pub fn subdir_for(&self, category: &Category) -> String {
        self.dirs
            .get(category.as_str())
            .map(|dir| sanitize_name(dir))
            .unwrap_or_else(|| sanitize_name(category.as_str()))
    }
}

fn file_name_of(artifact: &Path) -> Result<&std::ffi::OsStr, PublishError> {
    artifact.file_name().ok_or_else(|| PublishError::Copy {
        from: artifact.to_path_buf(),
        to: PathBuf::new(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "artifact has no file name"),
    })
}

/// POSTs an empty request to the store's rebuild endpoint.
#[derive(Debug, Clone)]
pub struct ReindexNotifier {
    url: String,
    client: reqwest::Client,
}

impl ReindexNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub async fn notify(&self) -> Result<(), PublishError> {
        let response = self
            .client
            .post(&self.url)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    PublishError::Timeout("reindex request")
                } else {
                    PublishError::Reindex(err.to_string())
                }
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(PublishError::Reindex(format!("{} returned {status}", self.url)));
        }
        Ok(())
    }
}

async fn notify_optional(reindex: Option<&ReindexNotifier>) -> Result<(), PublishError> {
    match reindex {
        Some(notifier) => notifier.notify().await,
        None => {
            harvest_debug!("no reindex endpoint configured");
            Ok(())
        }
    }
}

/// Copies artifacts into `{root}/{category dir}/` on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirectoryPublisher {
    root: PathBuf,
    dirs: CategoryDirs,
    reindex: Option<ReindexNotifier>,
}

impl DirectoryPublisher {
    pub fn new(root: PathBuf, dirs: CategoryDirs) -> Self {
        Self {
            root,
            dirs,
            reindex: None,
        }
    }

    pub fn with_reindex(mut self, notifier: ReindexNotifier) -> Self {
        self.reindex = Some(notifier);
        self
    }

    pub fn destination_dir(&self, category: &Category) -> PathBuf {
        self.root.join(self.dirs.subdir_for(category))
    }
}

#[async_trait::async_trait]
impl Publisher for DirectoryPublisher {
    async fn publish(&self, artifact: &Path, category: &Category) -> Result<String, PublishError> {
        let dir = self.destination_dir(category);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| PublishError::CreateDir {
                path: dir.clone(),
                source,
            })?;

        let target = dir.join(file_name_of(artifact)?);
        tokio::fs::copy(artifact, &target)
            .await
            .map_err(|source| PublishError::Copy {
                from: artifact.to_path_buf(),
                to: target.clone(),
                source,
            })?;
        Ok(target.display().to_string())
    }

    async fn notify_reindex(&self) -> Result<(), PublishError> {
        notify_optional(self.reindex.as_ref()).await
    }

    fn reindex_enabled(&self) -> bool {
        self.reindex.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ContainerSettings {
    /// Container CLI, `docker` by default.
    pub program: String,
    pub container: String,
    /// Upload root inside the container.
    pub root: String,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            program: "docker".to_string(),
            container: "openwebui".to_string(),
            root: "/app/backend/data/uploads".to_string(),
        }
    }
}

/// Copies artifacts into a running container with `exec mkdir -p` and `cp`.
#[derive(Debug, Clone)]
pub struct ContainerPublisher {
    settings: ContainerSettings,
    dirs: CategoryDirs,
    reindex: Option<ReindexNotifier>,
}

impl ContainerPublisher {
    pub fn new(settings: ContainerSettings, dirs: CategoryDirs) -> Self {
        Self {
            settings,
            dirs,
            reindex: None,
        }
    }

    pub fn with_reindex(mut self, notifier: ReindexNotifier) -> Self {
        self.reindex = Some(notifier);
        self
    }

    fn container_dir(&self, category: &Category) -> String {
        format!(
            "{}/{}",
            self.settings.root.trim_end_matches('/'),
            self.dirs.subdir_for(category)
        )
    }

    /// Argument lists for the two commands run per artifact.
    pub fn commands(&self, artifact: &Path, category: &Category) -> Result<[Vec<String>; 2], PublishError> {
        let dir = self.container_dir(category);
        let file_name = file_name_of(artifact)?.to_string_lossy().into_owned();
        let mkdir = vec![
            "exec".to_string(),
            self.settings.container.clone(),
            "mkdir".to_string(),
            "-p".to_string(),
            dir.clone(),
        ];
        let copy = vec![
            "cp".to_string(),
            artifact.display().to_string(),
            format!("{}:{}/{}", self.settings.container, dir, file_name),
        ];
        Ok([mkdir, copy])
    }

    async fn run(&self, args: &[String]) -> Result<(), PublishError> {
        // Dropping the future on a stage timeout must stop the child too.
        let output = Command::new(&self.settings.program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| PublishError::Spawn {
                program: self.settings.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(PublishError::Command {
                program: format!("{} {}", self.settings.program, args.join(" ")),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Publisher for ContainerPublisher {
    async fn publish(&self, artifact: &Path, category: &Category) -> Result<String, PublishError> {
        let [mkdir, copy] = self.commands(artifact, category)?;
        self.run(&mkdir).await?;
        self.run(&copy).await?;
        Ok(copy[2].clone())
    }

    async fn notify_reindex(&self) -> Result<(), PublishError> {
        notify_optional(self.reindex.as_ref()).await
    }

    fn reindex_enabled(&self) -> bool {
        self.reindex.is_some()
    }
}
