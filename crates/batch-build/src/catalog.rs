//! Build configuration catalog.
//!
//! Platforms and architectures are closed sets; a configuration can only
//! name tags the configure script understands.

use serde::Serialize;
use std::fmt;

/// Target OS / toolset family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Platform {
    #[serde(rename = "android")]
    Android,
    #[serde(rename = "vs2013")]
    Vs2013,
    #[serde(rename = "vs2015")]
    Vs2015,
    #[serde(rename = "vs2017")]
    Vs2017,
    #[serde(rename = "linux")]
    Linux,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Vs2013 => "vs2013",
            Self::Vs2015 => "vs2015",
            Self::Vs2017 => "vs2017",
            Self::Linux => "linux",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Target instruction set / ABI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Arch {
    #[serde(rename = "armv7-a")]
    Armv7a,
    #[serde(rename = "arm64")]
    Arm64,
    #[serde(rename = "x86")]
    X86,
    #[serde(rename = "x64")]
    X64,
}

impl Arch {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Armv7a => "armv7-a",
            Self::Arm64 => "arm64",
            Self::X86 => "x86",
            Self::X64 => "x64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// One target build: platform, architecture and pass-through configure flags.
///
/// Immutable after construction. `extra_args` are appended after the fixed
/// configure arguments, so they win wherever the configure tool lets later
/// definitions override earlier ones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BuildConfiguration {
    platform: Platform,
    arch: Arch,
    extra_args: Vec<String>,
}

impl BuildConfiguration {
    pub fn new(platform: Platform, arch: Arch) -> Self {
        Self::with_args(platform, arch, Vec::new())
    }

    pub fn with_args(platform: Platform, arch: Arch, extra_args: Vec<String>) -> Self {
        Self {
            platform,
            arch,
            extra_args,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn arch(&self) -> Arch {
        self.arch
    }

    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }

    /// `<platform>_<arch>`, also the name of the output directory.
    pub fn name(&self) -> String {
        format!("{}_{}", self.platform, self.arch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_joins_platform_and_arch() {
        let cfg = BuildConfiguration::new(Platform::Android, Arch::Armv7a);
        assert_eq!(cfg.name(), "android_armv7-a");
        assert!(cfg.extra_args().is_empty());
    }

    #[test]
    fn test_serializes_tags_not_variant_names() -> anyhow::Result<()> {
        let cfg = BuildConfiguration::with_args(
            Platform::Vs2015,
            Arch::X64,
            vec!["-DFOO=1".to_string()],
        );
        let json = serde_json::to_value(&cfg)?;
        assert_eq!(
            json,
            serde_json::json!({
                "platform": "vs2015",
                "arch": "x64",
                "extra_args": ["-DFOO=1"],
            })
        );
        Ok(())
    }
}
