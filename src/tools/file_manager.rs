//! File manager tool - workspace-scoped file operations
//!
//! All paths are resolved inside a configured workspace root; anything that
//! escapes it is rejected before touching the filesystem.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{HandlerError, ToolHandler};

/// Workspace-scoped file operations
pub struct FileManagerTool {
    workspace: PathBuf,
}

impl FileManagerTool {
    /// Create a file manager rooted at the given workspace directory
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }

    /// Resolve a relative path inside the workspace
    ///
    /// Rejects absolute paths and any traversal (`..`) component, so the
    /// check holds even for files that do not exist yet.
    fn resolve(&self, path: &str) -> Result<PathBuf, HandlerError> {
        let relative = Path::new(path);

        if relative.is_absolute() {
            return Err(HandlerError::PathEscape {
                path: path.to_string(),
            });
        }

        for component in relative.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => {
                    return Err(HandlerError::PathEscape {
                        path: path.to_string(),
                    });
                }
            }
        }

        Ok(self.workspace.join(relative))
    }

    fn required_path<'a>(params: &'a Value) -> Result<&'a str, HandlerError> {
        params["path"]
            .as_str()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| HandlerError::invalid("missing 'path' parameter"))
    }

    async fn read_file(&self, path: &str) -> Result<Value, HandlerError> {
        let full = self.resolve(path)?;
        let content = tokio::fs::read_to_string(&full).await.map_err(|_| HandlerError::NotFound {
            what: format!("file '{}'", path),
        })?;

        Ok(json!({
            "path": path,
            "content": content,
            "size": content.len()
        }))
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<Value, HandlerError> {
        let full = self.resolve(path)?;

        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, content).await?;

        Ok(json!({
            "path": path,
            "size": content.len()
        }))
    }

    async fn list_files(&self, path: &str) -> Result<Value, HandlerError> {
        let full = self.resolve(path)?;
        let mut entries = tokio::fs::read_dir(&full).await.map_err(|_| HandlerError::NotFound {
            what: format!("directory '{}'", path),
        })?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            files.push(json!({
                "name": entry.file_name().to_string_lossy(),
                "type": if metadata.is_dir() { "directory" } else { "file" },
                "size": if metadata.is_file() { metadata.len() } else { 0 }
            }));
        }

        let count = files.len();
        Ok(json!({
            "path": path,
            "files": files,
            "count": count
        }))
    }

    async fn delete_file(&self, path: &str) -> Result<Value, HandlerError> {
        let full = self.resolve(path)?;
        tokio::fs::remove_file(&full).await.map_err(|_| HandlerError::NotFound {
            what: format!("file '{}'", path),
        })?;

        Ok(json!({ "path": path, "deleted": true }))
    }

    async fn file_exists(&self, path: &str) -> Result<Value, HandlerError> {
        let full = self.resolve(path)?;
        let exists = tokio::fs::try_exists(&full).await.unwrap_or(false);

        Ok(json!({ "path": path, "exists": exists }))
    }
}

#[async_trait]
impl ToolHandler for FileManagerTool {
    fn name(&self) -> &'static str {
        "file_manager"
    }

    fn description(&self) -> &'static str {
        "Read, write, list, and manage files in the workspace"
    }

    fn keywords(&self) -> &'static [&'static str] {
        &["file", "read", "write", "save", "open", "delete", "folder", "directory"]
    }

    async fn execute(&self, action: &str, params: &Value) -> Result<Value, HandlerError> {
        match action {
            "read" => self.read_file(Self::required_path(params)?).await,
            "write" => {
                let path = Self::required_path(params)?;
                let content = params["content"]
                    .as_str()
                    .ok_or_else(|| HandlerError::invalid("missing 'content' parameter"))?;
                self.write_file(path, content).await
            }
            "list" | "execute" => {
                let path = params["path"].as_str().unwrap_or(".");
                self.list_files(path).await
            }
            "delete" => self.delete_file(Self::required_path(params)?).await,
            "exists" => self.file_exists(Self::required_path(params)?).await,
            other => Err(HandlerError::UnknownAction {
                action: other.to_string(),
            }),
        }
    }
}
