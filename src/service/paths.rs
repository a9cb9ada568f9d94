use crate::config::AppConfig;
use std::path::{Path, PathBuf};

/// Where bundled service assets are read from and where they are staged for execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLayout {
    pub scripts_dir: PathBuf,
    pub temp_dir: PathBuf,
}

impl BundleLayout {
    pub fn new(scripts_dir: PathBuf, temp_dir: PathBuf) -> Self {
        Self {
            scripts_dir,
            temp_dir,
        }
    }

    /// Scripts straight from the source tree
    pub fn development() -> Self {
        Self::new(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("scripts"),
            std::env::temp_dir(),
        )
    }

    /// Scripts shipped as bundle resources
    pub fn packaged(resource_dir: &Path) -> Self {
        Self::new(resource_dir.join("scripts"), std::env::temp_dir())
    }

    /// Pick the layout for this run. A configured override wins, then
    /// the source tree in debug builds, then the bundle resource dir.
    pub fn resolve(config: &AppConfig, resource_dir: Option<&Path>) -> Self {
        if let Some(dir) = &config.scripts_dir_override {
            return Self::new(dir.clone(), std::env::temp_dir());
        }

        if cfg!(debug_assertions) {
            return Self::development();
        }

        match resource_dir {
            Some(dir) => Self::packaged(dir),
            None => {
                log::warn!("Resource directory unavailable, falling back to source scripts");
                Self::development()
            }
        }
    }

    pub fn source_path(&self, file_name: &str) -> PathBuf {
        self.scripts_dir.join(file_name)
    }

    pub fn staged_path(&self, file_name: &str) -> PathBuf {
        self.temp_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let mut config = AppConfig::default();
        config.scripts_dir_override = Some(PathBuf::from("/opt/custom/scripts"));

        let layout = BundleLayout::resolve(&config, Some(Path::new("/bundle/resources")));
        assert_eq!(layout.scripts_dir, PathBuf::from("/opt/custom/scripts"));
    }

    #[test]
    fn test_packaged_layout_uses_resource_scripts() {
        let layout = BundleLayout::packaged(Path::new("/bundle/resources"));
        assert_eq!(
            layout.source_path("get_ip.sh"),
            PathBuf::from("/bundle/resources/scripts/get_ip.sh")
        );
        assert_eq!(layout.temp_dir, std::env::temp_dir());
    }

    #[test]
    fn test_development_layout_points_at_source_tree() {
        let layout = BundleLayout::development();
        assert!(layout.source_path("get_ip.sh").exists());
    }
}
