//! Configuration enumeration.
//!
//! The host is classified into an ordered list of [`HostProfile`]s; each
//! profile expands into its own block of configurations. Mobile comes
//! first, then at most one of the desktop/unix profiles.

use crate::catalog::{Arch, BuildConfiguration, Platform};
use crate::host::{HostEnv, HostOs, Probe};
use std::path::{Path, PathBuf};

/// Visual Studio toolsets in ascending version order, keyed by the
/// `vcvarsall.bat` that marks an installation.
const DESKTOP_TOOLSETS: &[(Platform, &str)] = &[
    (
        Platform::Vs2013,
        r"C:\Program Files (x86)\Microsoft Visual Studio 12.0\VC\vcvarsall.bat",
    ),
    (
        Platform::Vs2015,
        r"C:\Program Files (x86)\Microsoft Visual Studio 14.0\VC\vcvarsall.bat",
    ),
    (
        Platform::Vs2017,
        r"C:\Program Files (x86)\Microsoft Visual Studio\2017\Community\VC\Auxiliary\Build\vcvarsall.bat",
    ),
];

/// Android arch x C++ runtime matrix. `None` keeps the NDK default STL.
const MOBILE_MATRIX: &[(Arch, Option<&str>)] = &[
    (Arch::Armv7a, None),
    (Arch::Armv7a, Some("stlport_static")),
    (Arch::Armv7a, Some("c++_static")),
    (Arch::Arm64, None),
    (Arch::X86, None),
    (Arch::X64, None),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostProfile {
    /// Android NDK found at `root`.
    MobileToolchain { root: PathBuf },
    /// Windows: every installed Visual Studio toolset.
    DesktopToolsetSequence,
    /// Linux: a single native build.
    UnixDefault { pointer_width: u32 },
}

impl HostProfile {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MobileToolchain { .. } => "android-ndk",
            Self::DesktopToolsetSequence => "visual-studio",
            Self::UnixDefault { .. } => "unix",
        }
    }

    pub fn configurations(&self, probe: &dyn Probe) -> Vec<BuildConfiguration> {
        match self {
            Self::MobileToolchain { root } => {
                let root_arg = format!("-DROOT={}", root.display());
                MOBILE_MATRIX
                    .iter()
                    .map(|&(arch, stl)| {
                        let mut args = vec![root_arg.clone()];
                        args.extend(stl.map(|stl| format!("-DSTL={stl}")));
                        BuildConfiguration::with_args(Platform::Android, arch, args)
                    })
                    .collect()
            }
            Self::DesktopToolsetSequence => DESKTOP_TOOLSETS
                .iter()
                .filter(|(_, vcvars)| probe.exists(Path::new(vcvars)))
                .flat_map(|&(toolset, _)| {
                    [
                        BuildConfiguration::new(toolset, Arch::X86),
                        BuildConfiguration::new(toolset, Arch::X64),
                    ]
                })
                .collect(),
            Self::UnixDefault { pointer_width } => {
                let arch = if *pointer_width > 32 {
                    Arch::X64
                } else {
                    Arch::X86
                };
                vec![BuildConfiguration::new(Platform::Linux, arch)]
            }
        }
    }
}

/// Classify the host. Hosts that are neither Windows nor Linux only get
/// the mobile profile, if any.
pub fn profiles(host: &HostEnv, probe: &dyn Probe) -> Vec<HostProfile> {
    let mut profiles = Vec::new();
    if let Some(root) = host.ndk_root(probe) {
        profiles.push(HostProfile::MobileToolchain { root });
    }
    match host.os {
        HostOs::Windows => profiles.push(HostProfile::DesktopToolsetSequence),
        HostOs::Linux => profiles.push(HostProfile::UnixDefault {
            pointer_width: host.pointer_width,
        }),
        HostOs::Other => {}
    }
    profiles
}

/// Every configuration this host should build, in build order.
pub fn enumerate(host: &HostEnv, probe: &dyn Probe) -> Vec<BuildConfiguration> {
    profiles(host, probe)
        .iter()
        .flat_map(|p| p.configurations(probe))
        .collect()
}
