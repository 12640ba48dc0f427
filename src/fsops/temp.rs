use crate::config::DevConfig;
use crate::fsops::FsError;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::Builder;

/// Secure temporary files and directories under a configured base
///
/// In secure mode resources are created through the platform
/// mktemp-equivalent, which on unix already applies owner-only modes
/// atomically; permissions are tightened explicitly afterwards so the
/// contract holds everywhere. The base directory and created directories
/// end up 0o700, files 0o600.
#[derive(Debug)]
pub struct TempWorkspace {
    base: PathBuf,
    secure: bool,
}

impl TempWorkspace {
    pub fn new(config: &DevConfig) -> Result<Self, FsError> {
        let base = config.tmp_base_dir();
        let secure = config.use_secure_tmp();
        Self::prepare_base(&base, secure)?;

        Ok(Self { base, secure })
    }

    /// Create the base directory, owner-only in secure mode so the base
    /// itself satisfies the temp permission guardrail
    fn prepare_base(base: &Path, secure: bool) -> Result<(), FsError> {
        fs::create_dir_all(base)?;
        if secure {
            set_mode(base, 0o700)?;
        }
        Ok(())
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Create a temporary directory and return its path
    pub fn create_dir(&self, prefix: &str) -> Result<PathBuf, FsError> {
        let path = if self.secure {
            let dir = Builder::new().prefix(prefix).tempdir_in(&self.base)?;
            let path = dir.keep();
            set_mode(&path, 0o700)?;
            path
        } else {
            let path = self.base.join(format!("{}{}", prefix, unique_suffix()));
            fs::create_dir_all(&path)?;
            path
        };
        Ok(path)
    }

    /// Create a temporary file and return its path
    pub fn create_file(&self, suffix: &str, prefix: &str) -> Result<PathBuf, FsError> {
        let path = if self.secure {
            let file = Builder::new()
                .prefix(prefix)
                .suffix(suffix)
                .tempfile_in(&self.base)?;
            let (handle, path) = file.keep().map_err(|e| e.error)?;
            drop(handle);
            set_mode(&path, 0o600)?;
            path
        } else {
            let path = self
                .base
                .join(format!("{}{}{}", prefix, unique_suffix(), suffix));
            fs::write(&path, b"")?;
            path
        };
        Ok(path)
    }

    /// Remove a single temp file or directory; missing paths are fine
    pub fn cleanup(&self, path: &Path) -> Result<(), FsError> {
        if !path.exists() {
            return Ok(());
        }
        if path.is_file() {
            fs::remove_file(path)?;
        } else {
            fs::remove_dir_all(path)?;
        }
        Ok(())
    }

    /// Remove everything under the base directory and recreate it empty
    pub fn clean_all(&self) -> Result<(), FsError> {
        if self.base.exists() {
            fs::remove_dir_all(&self.base)?;
        }
        Self::prepare_base(&self.base, self.secure)
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(mode);
    fs::set_permissions(path, perms)
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("{:08x}{:04x}", nanos, std::process::id() & 0xffff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace(base: &Path, secure: bool) -> TempWorkspace {
        let main = format!(
            "[filesystem]\ntmp_base_dir = \"{}\"\nuse_secure_tmp = {}\n",
            base.display(),
            secure
        );
        let config = DevConfig::from_toml_str(&main, "").unwrap();
        TempWorkspace::new(&config).unwrap()
    }

    #[cfg(unix)]
    fn mode_of(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[test]
    fn test_secure_dir_permissions() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path(), true);

        let dir = ws.create_dir("test-").unwrap();
        assert!(dir.is_dir());
        assert!(dir.starts_with(temp.path()));
        assert!(dir.file_name().unwrap().to_string_lossy().starts_with("test-"));

        #[cfg(unix)]
        assert_eq!(mode_of(&dir), 0o700);
    }

    #[test]
    fn test_secure_file_permissions() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path(), true);

        let file = ws.create_file(".txt", "test-").unwrap();
        assert!(file.is_file());
        let name = file.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("test-"));
        assert!(name.ends_with(".txt"));

        #[cfg(unix)]
        assert_eq!(mode_of(&file), 0o600);
    }

    #[test]
    fn test_insecure_mode_still_creates() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path(), false);

        let dir = ws.create_dir("loose-").unwrap();
        assert!(dir.is_dir());

        let file = ws.create_file(".log", "loose-").unwrap();
        assert!(file.is_file());
    }

    #[test]
    fn test_cleanup_file_and_dir() {
        let temp = TempDir::new().unwrap();
        let ws = workspace(temp.path(), true);

        let dir = ws.create_dir("d-").unwrap();
        let file = ws.create_file("", "f-").unwrap();

        ws.cleanup(&dir).unwrap();
        ws.cleanup(&file).unwrap();
        assert!(!dir.exists());
        assert!(!file.exists());

        // Cleaning an already-removed path is fine
        ws.cleanup(&dir).unwrap();
    }

    #[test]
    fn test_clean_all_recreates_base() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("scratch");
        let ws = workspace(&base, true);

        ws.create_dir("d-").unwrap();
        ws.create_file("", "f-").unwrap();

        ws.clean_all().unwrap();
        assert!(base.is_dir());
        assert_eq!(fs::read_dir(&base).unwrap().count(), 0);
    }

    #[test]
    #[cfg(unix)]
    fn test_secure_base_is_owner_only() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("scratch");
        let ws = workspace(&base, true);
        assert_eq!(mode_of(ws.base()), 0o700);

        // Recreating the base keeps it tight
        ws.clean_all().unwrap();
        assert_eq!(mode_of(ws.base()), 0o700);
    }

    #[test]
    fn test_base_created_on_construction() {
        let temp = TempDir::new().unwrap();
        let base = temp.path().join("deep/nested/tmp");
        let ws = workspace(&base, true);

        assert!(ws.base().is_dir());
    }
}
