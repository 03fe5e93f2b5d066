//! Host detection.
//!
//! Everything the enumerator needs to know about the machine is captured
//! once in a [`HostEnv`] value. Filesystem existence checks go through
//! [`Probe`] so the detection branches can run against a fake tree.

use anyhow::{Context, Result};
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const NDK_ROOT_VAR: &str = "ANDROID_NDK_ROOT";
pub const PROGRAM_FILES_X86_VAR: &str = "ProgramFiles(x86)";

/// Local NDK install checked on Windows when `ANDROID_NDK_ROOT` is unset.
const WINDOWS_NDK_FALLBACK: &str = r"D:\sdk\android-ndk-r11b";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    Linux,
    Other,
}

impl HostOs {
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

/// Read-only filesystem queries.
pub trait Probe {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
}

/// [`Probe`] backed by the real filesystem.
pub struct FsProbe;

impl Probe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Snapshot of the host: OS, address width and the environment variables
/// that steer configuration.
#[derive(Clone, Debug)]
pub struct HostEnv {
    pub os: HostOs,
    pub pointer_width: u32,
    pub ndk_root: Option<OsString>,
    pub program_files_x86: Option<OsString>,
    pub path: Option<OsString>,
}

impl HostEnv {
    pub fn detect() -> Self {
        Self {
            os: HostOs::current(),
            pointer_width: usize::BITS,
            ndk_root: env::var_os(NDK_ROOT_VAR),
            program_files_x86: env::var_os(PROGRAM_FILES_X86_VAR),
            path: env::var_os("PATH"),
        }
    }

    /// Resolve the Android NDK root, if one is installed.
    ///
    /// `ANDROID_NDK_ROOT` wins; on Windows an unset variable falls back to
    /// [`WINDOWS_NDK_FALLBACK`]. The result must exist on disk.
    pub fn ndk_root(&self, probe: &dyn Probe) -> Option<PathBuf> {
        let mut root = self
            .ndk_root
            .as_ref()
            .filter(|r| !r.is_empty())
            .map(PathBuf::from);

        if root.is_none() && self.os == HostOs::Windows {
            let candidate = Path::new(WINDOWS_NDK_FALLBACK);
            if probe.is_dir(candidate) {
                root = Some(candidate.to_path_buf());
            }
        }

        root.filter(|r| probe.exists(r))
    }

    /// `PATH` for the external tools.
    ///
    /// On Windows the CMake bundled under `ProgramFiles(x86)` is appended so
    /// it is found even when not installed system-wide. The process
    /// environment itself is left alone.
    pub fn search_path(&self) -> Result<Option<OsString>> {
        let mut dirs: Vec<PathBuf> = self
            .path
            .as_deref()
            .map(|p| env::split_paths(p).collect())
            .unwrap_or_default();

        if self.os == HostOs::Windows {
            if let Some(pf) = &self.program_files_x86 {
                dirs.push(Path::new(pf).join("CMake").join("bin"));
            }
        }

        if dirs.is_empty() {
            return Ok(None);
        }
        let joined = env::join_paths(dirs).context("Building tool search path")?;
        Ok(Some(joined))
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::Probe;
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};

    /// In-memory [`Probe`]: a set of files and a set of directories.
    #[derive(Default)]
    pub(crate) struct FakeProbe {
        files: HashSet<PathBuf>,
        dirs: HashSet<PathBuf>,
    }

    impl FakeProbe {
        pub(crate) fn with_file(mut self, path: &str) -> Self {
            self.files.insert(PathBuf::from(path));
            self
        }

        pub(crate) fn with_dir(mut self, path: &str) -> Self {
            self.dirs.insert(PathBuf::from(path));
            self
        }
    }

    impl Probe for FakeProbe {
        fn exists(&self, path: &Path) -> bool {
            self.files.contains(path) || self.dirs.contains(path)
        }

        fn is_dir(&self, path: &Path) -> bool {
            self.dirs.contains(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeProbe;
    use super::*;

    fn host(os: HostOs) -> HostEnv {
        HostEnv {
            os,
            pointer_width: 64,
            ndk_root: None,
            program_files_x86: None,
            path: None,
        }
    }

    #[test]
    fn test_ndk_root_from_env() {
        let probe = FakeProbe::default().with_dir("/opt/ndk");
        let mut h = host(HostOs::Linux);
        h.ndk_root = Some("/opt/ndk".into());
        assert_eq!(h.ndk_root(&probe), Some(PathBuf::from("/opt/ndk")));
    }

    #[test]
    fn test_ndk_root_must_exist() {
        let mut h = host(HostOs::Linux);
        h.ndk_root = Some("/opt/missing".into());
        assert_eq!(h.ndk_root(&FakeProbe::default()), None);
    }

    #[test]
    fn test_empty_ndk_var_is_unset() {
        let probe = FakeProbe::default().with_dir("");
        let mut h = host(HostOs::Linux);
        h.ndk_root = Some(OsString::new());
        assert_eq!(h.ndk_root(&probe), None);
    }

    #[test]
    fn test_windows_falls_back_to_local_ndk() {
        let probe = FakeProbe::default().with_dir(WINDOWS_NDK_FALLBACK);
        assert_eq!(
            host(HostOs::Windows).ndk_root(&probe),
            Some(PathBuf::from(WINDOWS_NDK_FALLBACK))
        );
        // The fallback is a Windows convenience only.
        assert_eq!(host(HostOs::Linux).ndk_root(&probe), None);
    }

    #[test]
    fn test_env_beats_windows_fallback() {
        let probe = FakeProbe::default()
            .with_dir(WINDOWS_NDK_FALLBACK)
            .with_dir("E:/ndk");
        let mut h = host(HostOs::Windows);
        h.ndk_root = Some("E:/ndk".into());
        assert_eq!(h.ndk_root(&probe), Some(PathBuf::from("E:/ndk")));
    }

    #[test]
    fn test_search_path_unchanged_off_windows() -> Result<()> {
        let mut h = host(HostOs::Linux);
        let inherited = env::join_paths(["/usr/bin", "/bin"])?;
        h.path = Some(inherited.clone());
        h.program_files_x86 = Some("/pf".into());
        assert_eq!(h.search_path()?, Some(inherited));
        Ok(())
    }

    #[test]
    fn test_search_path_appends_bundled_cmake_on_windows() -> Result<()> {
        let mut h = host(HostOs::Windows);
        h.path = Some(env::join_paths(["/usr/bin"])?);
        h.program_files_x86 = Some("/pf".into());

        let joined = h.search_path()?.context("search path")?;
        let dirs: Vec<PathBuf> = env::split_paths(&joined).collect();
        assert_eq!(dirs.len(), 2);
        assert_eq!(dirs[0], PathBuf::from("/usr/bin"));
        assert!(dirs[1].ends_with(Path::new("CMake").join("bin")));
        Ok(())
    }

    #[test]
    fn test_search_path_none_when_nothing_known() -> Result<()> {
        assert_eq!(host(HostOs::Windows).search_path()?, None);
        Ok(())
    }
}
