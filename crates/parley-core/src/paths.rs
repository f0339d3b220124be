use std::path::{Path, PathBuf};

pub const PARLEY_DIR: &str = ".parley";
pub const CONFIG_FILE: &str = ".parley/config.yaml";

pub fn parley_dir(root: &Path) -> PathBuf {
    root.join(PARLEY_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_lives_under_parley_dir() {
        let root = Path::new("/tmp/project");
        assert!(config_path(root).starts_with(parley_dir(root)));
        assert_eq!(
            config_path(root),
            Path::new("/tmp/project/.parley/config.yaml")
        );
    }
}
