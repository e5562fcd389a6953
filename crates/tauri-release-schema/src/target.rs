//! Compiled build targets and the update platforms they serve.
//!
//! A [`BuildTarget`] is what a build job produced; a [`Platform`] is what an
//! update client asks for. The mapping is a fixed table: every target serves
//! exactly one platform, except `universal-apple-darwin` which serves both
//! macOS platforms at once.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between the target prefix and the rest of a canonical asset name.
pub const TARGET_SEPARATOR: char = '.';

/// Operating system half of a [`Platform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// macOS.
    Darwin,
    /// Linux (AppImage bundles).
    Linux,
    /// Windows (NSIS and MSI installers).
    Windows,
}

impl Os {
    /// Name used in platform keys (`darwin`, `linux`, `windows`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::Windows => "windows",
        }
    }
}

/// CPU architecture half of a [`Platform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// ARM 64-bit.
    Aarch64,
    /// ARM 32-bit, hard float.
    Armv7,
    /// Intel 32-bit.
    I686,
    /// Intel/AMD 64-bit.
    X86_64,
}

impl Arch {
    /// Rust-convention architecture name, as used in platform keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aarch64 => "aarch64",
            Self::Armv7 => "armv7",
            Self::I686 => "i686",
            Self::X86_64 => "x86_64",
        }
    }
}

/// Error returned when parsing an unknown target or platform string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TargetError {
    /// The string is not one of the supported build targets.
    #[error("unknown build target: {0}")]
    UnknownTarget(String),

    /// The string is not one of the supported `<os>-<arch>` platforms.
    #[error("unknown platform: {0}")]
    UnknownPlatform(String),
}

/// Canonical `(os, arch)` pair an update client queries by.
///
/// Rendered and serialized as `<os>-<arch>`, e.g. `darwin-aarch64`. Only the
/// combinations that some [`BuildTarget`] produces are constructible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Platform {
    os: Os,
    arch: Arch,
}

impl Platform {
    /// Apple Silicon macOS.
    pub const DARWIN_AARCH64: Self = Self::new(Os::Darwin, Arch::Aarch64);
    /// Intel macOS.
    pub const DARWIN_X86_64: Self = Self::new(Os::Darwin, Arch::X86_64);
    /// ARM 64-bit Linux.
    pub const LINUX_AARCH64: Self = Self::new(Os::Linux, Arch::Aarch64);
    /// ARM 32-bit Linux.
    pub const LINUX_ARMV7: Self = Self::new(Os::Linux, Arch::Armv7);
    /// Intel 32-bit Linux.
    pub const LINUX_I686: Self = Self::new(Os::Linux, Arch::I686);
    /// Intel/AMD 64-bit Linux.
    pub const LINUX_X86_64: Self = Self::new(Os::Linux, Arch::X86_64);
    /// ARM 64-bit Windows.
    pub const WINDOWS_AARCH64: Self = Self::new(Os::Windows, Arch::Aarch64);
    /// Intel 32-bit Windows.
    pub const WINDOWS_I686: Self = Self::new(Os::Windows, Arch::I686);
    /// Intel/AMD 64-bit Windows.
    pub const WINDOWS_X86_64: Self = Self::new(Os::Windows, Arch::X86_64);

    const fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Operating system of this platform.
    pub fn os(&self) -> Os {
        self.os
    }

    /// Architecture of this platform.
    pub fn arch(&self) -> Arch {
        self.arch
    }

    /// The build target that serves exactly this platform.
    ///
    /// Never returns the universal pseudo-target; callers that want the
    /// universal fallback consult [`BuildTarget::UniversalAppleDarwin`]
    /// separately.
    pub fn specific_target(&self) -> BuildTarget {
        BuildTarget::SPECIFIC
            .iter()
            .copied()
            .find(|target| target.platforms().contains(self))
            .unwrap_or(BuildTarget::UniversalAppleDarwin)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.os.as_str(), self.arch.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildTarget::SPECIFIC
            .iter()
            .flat_map(|target| target.platforms().iter().copied())
            .find(|platform| platform.to_string() == s)
            .ok_or_else(|| TargetError::UnknownPlatform(s.to_string()))
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.to_string()
    }
}

impl TryFrom<String> for Platform {
    type Error = TargetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A compiled build target (Rust target triple), plus the macOS universal
/// pseudo-target that bundles both architectures into one binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildTarget {
    /// `aarch64-apple-darwin`
    #[serde(rename = "aarch64-apple-darwin")]
    Aarch64AppleDarwin,
    /// `x86_64-apple-darwin`
    #[serde(rename = "x86_64-apple-darwin")]
    X86_64AppleDarwin,
    /// `universal-apple-darwin`
    #[serde(rename = "universal-apple-darwin")]
    UniversalAppleDarwin,
    /// `aarch64-pc-windows-msvc`
    #[serde(rename = "aarch64-pc-windows-msvc")]
    Aarch64PcWindowsMsvc,
    /// `i686-pc-windows-msvc`
    #[serde(rename = "i686-pc-windows-msvc")]
    I686PcWindowsMsvc,
    /// `x86_64-pc-windows-msvc`
    #[serde(rename = "x86_64-pc-windows-msvc")]
    X86_64PcWindowsMsvc,
    /// `aarch64-unknown-linux-gnu`
    #[serde(rename = "aarch64-unknown-linux-gnu")]
    Aarch64UnknownLinuxGnu,
    /// `armv7-unknown-linux-gnueabihf`
    #[serde(rename = "armv7-unknown-linux-gnueabihf")]
    Armv7UnknownLinuxGnueabihf,
    /// `i686-unknown-linux-gnu`
    #[serde(rename = "i686-unknown-linux-gnu")]
    I686UnknownLinuxGnu,
    /// `x86_64-unknown-linux-gnu`
    #[serde(rename = "x86_64-unknown-linux-gnu")]
    X86_64UnknownLinuxGnu,
}

impl BuildTarget {
    /// Every target that maps to exactly one platform.
    pub const SPECIFIC: [Self; 9] = [
        Self::Aarch64AppleDarwin,
        Self::X86_64AppleDarwin,
        Self::Aarch64PcWindowsMsvc,
        Self::I686PcWindowsMsvc,
        Self::X86_64PcWindowsMsvc,
        Self::Aarch64UnknownLinuxGnu,
        Self::Armv7UnknownLinuxGnueabihf,
        Self::I686UnknownLinuxGnu,
        Self::X86_64UnknownLinuxGnu,
    ];

    /// Every known target, universal included.
    pub const ALL: [Self; 10] = [
        Self::Aarch64AppleDarwin,
        Self::X86_64AppleDarwin,
        Self::UniversalAppleDarwin,
        Self::Aarch64PcWindowsMsvc,
        Self::I686PcWindowsMsvc,
        Self::X86_64PcWindowsMsvc,
        Self::Aarch64UnknownLinuxGnu,
        Self::Armv7UnknownLinuxGnueabihf,
        Self::I686UnknownLinuxGnu,
        Self::X86_64UnknownLinuxGnu,
    ];

    /// The target triple string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aarch64AppleDarwin => "aarch64-apple-darwin",
            Self::X86_64AppleDarwin => "x86_64-apple-darwin",
            Self::UniversalAppleDarwin => "universal-apple-darwin",
            Self::Aarch64PcWindowsMsvc => "aarch64-pc-windows-msvc",
            Self::I686PcWindowsMsvc => "i686-pc-windows-msvc",
            Self::X86_64PcWindowsMsvc => "x86_64-pc-windows-msvc",
            Self::Aarch64UnknownLinuxGnu => "aarch64-unknown-linux-gnu",
            Self::Armv7UnknownLinuxGnueabihf => "armv7-unknown-linux-gnueabihf",
            Self::I686UnknownLinuxGnu => "i686-unknown-linux-gnu",
            Self::X86_64UnknownLinuxGnu => "x86_64-unknown-linux-gnu",
        }
    }

    /// Platforms an update built for this target can serve.
    pub fn platforms(&self) -> &'static [Platform] {
        match self {
            Self::Aarch64AppleDarwin => &[Platform::DARWIN_AARCH64],
            Self::X86_64AppleDarwin => &[Platform::DARWIN_X86_64],
            Self::UniversalAppleDarwin => &[Platform::DARWIN_AARCH64, Platform::DARWIN_X86_64],
            Self::Aarch64PcWindowsMsvc => &[Platform::WINDOWS_AARCH64],
            Self::I686PcWindowsMsvc => &[Platform::WINDOWS_I686],
            Self::X86_64PcWindowsMsvc => &[Platform::WINDOWS_X86_64],
            Self::Aarch64UnknownLinuxGnu => &[Platform::LINUX_AARCH64],
            Self::Armv7UnknownLinuxGnueabihf => &[Platform::LINUX_ARMV7],
            Self::I686UnknownLinuxGnu => &[Platform::LINUX_I686],
            Self::X86_64UnknownLinuxGnu => &[Platform::LINUX_X86_64],
        }
    }

    /// Short architecture token used in bundle file names
    /// (`aarch64`, `x64`, `universal`, ...).
    ///
    /// Distinct from the triple: this is what the bundler writes into
    /// versioned file names, and what we synthesize for macOS `.app` bundles
    /// that come out of the build without one.
    pub fn arch_suffix(&self) -> &'static str {
        match self {
            Self::Aarch64AppleDarwin | Self::Aarch64UnknownLinuxGnu => "aarch64",
            Self::X86_64AppleDarwin | Self::X86_64PcWindowsMsvc => "x64",
            Self::UniversalAppleDarwin => "universal",
            Self::Aarch64PcWindowsMsvc => "arm64",
            Self::I686PcWindowsMsvc => "x86",
            Self::Armv7UnknownLinuxGnueabihf => "armhf",
            Self::I686UnknownLinuxGnu => "i386",
            Self::X86_64UnknownLinuxGnu => "amd64",
        }
    }

    /// Real rustc targets that must be installed to build this target.
    pub fn rustc_targets(&self) -> &'static [&'static str] {
        match self {
            Self::UniversalAppleDarwin => &["aarch64-apple-darwin", "x86_64-apple-darwin"],
            Self::Aarch64AppleDarwin => &["aarch64-apple-darwin"],
            Self::X86_64AppleDarwin => &["x86_64-apple-darwin"],
            Self::Aarch64PcWindowsMsvc => &["aarch64-pc-windows-msvc"],
            Self::I686PcWindowsMsvc => &["i686-pc-windows-msvc"],
            Self::X86_64PcWindowsMsvc => &["x86_64-pc-windows-msvc"],
            Self::Aarch64UnknownLinuxGnu => &["aarch64-unknown-linux-gnu"],
            Self::Armv7UnknownLinuxGnueabihf => &["armv7-unknown-linux-gnueabihf"],
            Self::I686UnknownLinuxGnu => &["i686-unknown-linux-gnu"],
            Self::X86_64UnknownLinuxGnu => &["x86_64-unknown-linux-gnu"],
        }
    }

    /// Recover the producing target from an uploaded asset name.
    ///
    /// Matches only when the name starts with a known triple immediately
    /// followed by [`TARGET_SEPARATOR`]; anything else yields `None`.
    pub fn from_asset_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|target| {
            name.strip_prefix(target.as_str())
                .is_some_and(|rest| rest.starts_with(TARGET_SEPARATOR))
        })
    }
}

impl std::fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BuildTarget {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|target| target.as_str() == s)
            .ok_or_else(|| TargetError::UnknownTarget(s.to_string()))
    }
}
