use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Check every report or subsystem file about to be written: none may be a
/// directory, and none may resolve to a config file being read.
pub fn ensure_outputs_clear(targets: &[&Path], inputs: &[&Path]) -> Result<()> {
    let inputs = inputs
        .iter()
        .map(|input| Ok((*input, resolve(input)?)))
        .collect::<Result<Vec<_>>>()?;

    for target in targets {
        if target.is_dir() {
            bail!("cannot write {}: it is a directory", target.display());
        }
        let resolved = resolve(target)?;
        if let Some((input, _)) = inputs.iter().find(|(_, path)| *path == resolved) {
            bail!(
                "refusing to overwrite {}: it is the input config {}",
                target.display(),
                input.display()
            );
        }
    }
    Ok(())
}

/// Absolute form of `path`. A file that does not exist yet is resolved
/// through its parent directory so that `..` and symlinks still collapse.
fn resolve(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return path
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", path.display()));
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir()
            .context("failed to read the working directory")?
            .join(path)
    };
    match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) if parent.is_dir() => Ok(parent
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", parent.display()))?
            .join(name)),
        _ => Ok(absolute),
    }
}
