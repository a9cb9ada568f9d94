use super::paths::BundleLayout;
use crate::common::error::ServiceError;
use std::fs;
use std::path::PathBuf;

/// Copy a bundled asset into the temp directory and make it executable.
///
/// Bundles are often mounted read-only or `noexec` (AppImage, signed .app),
/// so scripts are always run from the staged copy. An existing copy is
/// overwritten; assets are static, so concurrent staging of the same name
/// writes identical bytes.
pub fn materialize(layout: &BundleLayout, file_name: &str) -> Result<PathBuf, ServiceError> {
    let source = layout.source_path(file_name);
    if !source.is_file() {
        return Err(ServiceError::ScriptNotFound(source));
    }

    let target = layout.staged_path(file_name);
    if source != target {
        fs::copy(&source, &target)?;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&target, fs::Permissions::from_mode(0o755))?;
    }

    log::debug!("Staged {:?} at {:?}", source, target);
    Ok(target)
}
