//! Working-directory confinement shared by every tool.
//!
//! The sandbox root is fixed when the process starts. Tools receive it from the
//! dispatcher, never from the model.

use std::path::{Component, Path, PathBuf};

use anyhow::Context;

use crate::error::ToolError;

/// The directory every tool call is confined to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    /// Create a sandbox rooted at `root`. The directory must exist.
    pub fn new(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let root = root.as_ref();
        let canonical = root
            .canonicalize()
            .with_context(|| format!("failed to resolve working directory {}", root.display()))?;
        if !canonical.is_dir() {
            anyhow::bail!("working directory {} is not a directory", canonical.display());
        }
        Ok(Self { root: canonical })
    }

    /// Canonical absolute path of the root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a model-supplied path against the root.
    ///
    /// `.` and `..` are applied lexically first. The deepest existing prefix is
    /// then canonicalized (resolving symlinks) and the missing tail appended.
    /// Anything that lands outside the root is rejected, as is a tail that
    /// starts at a dangling symlink.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, ToolError> {
        let joined = self.root.join(relative);
        let resolved = canonicalize_lenient(&joined).ok_or_else(|| ToolError::OutOfSandbox {
            path: relative.to_string(),
        })?;

        if !resolved.starts_with(&self.root) {
            return Err(ToolError::OutOfSandbox {
                path: relative.to_string(),
            });
        }
        Ok(resolved)
    }
}

/// Drop `.` and apply `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Canonicalize the longest existing prefix of `path` and append the missing
/// components.
///
/// Returns `None` when a component after that prefix exists on disk anyway,
/// which means it is a symlink `canonicalize` could not follow.
fn canonicalize_lenient(path: &Path) -> Option<PathBuf> {
    let normalized = normalize_lexically(path);
    let components: Vec<Component<'_>> = normalized.components().collect();

    for split in (1..=components.len()).rev() {
        let base: PathBuf = components[..split].iter().collect();
        let Ok(mut resolved) = base.canonicalize() else {
            continue;
        };
        for component in &components[split..] {
            resolved.push(component);
            if resolved.symlink_metadata().is_ok() {
                return None;
            }
        }
        return Some(resolved);
    }

    None
}
