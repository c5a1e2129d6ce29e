//! Prediction of RTMR[1] from the boot artifacts: kernel, initrd and command line.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::measurement::{digest, replay};
use crate::types::{MeasurementRegister, TdReport};

pub const DEFAULT_BOOT_DIR: &str = "/boot";
pub const DEFAULT_CMDLINE_PATH: &str = "/proc/cmdline";

const KERNEL_PREFIX: &str = "vmlinuz-";

/// Strips trailing newlines from a kernel command line. Nothing else is trimmed.
pub fn trim_cmdline(cmdline: &[u8]) -> &[u8] {
    let end = cmdline
        .iter()
        .rposition(|b| *b != b'\n')
        .map_or(0, |i| i + 1);
    &cmdline[..end]
}

/// Replays kernel, initrd and command line, in that order, onto a zeroed register.
pub fn replay_boot_measurements(
    kernel: &[u8],
    initrd: &[u8],
    cmdline: &[u8],
) -> MeasurementRegister {
    let measurements = [
        digest(kernel),
        digest(initrd),
        digest(trim_cmdline(cmdline)),
    ];
    replay(&measurements)
}

/// Boot artifacts read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootArtifacts {
    pub kernel: Vec<u8>,
    pub initrd: Vec<u8>,
    pub cmdline: Vec<u8>,
}

impl BootArtifacts {
    pub fn expected_rtmr1(&self) -> MeasurementRegister {
        replay_boot_measurements(&self.kernel, &self.initrd, &self.cmdline)
    }

    /// Whether the replayed value equals the RTMR[1] attested in `report`.
    pub fn matches(&self, report: &TdReport) -> bool {
        self.expected_rtmr1() == *report.boot_register()
    }
}

/// A kernel image and the initrd built for the same version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootFiles {
    pub version: String,
    pub kernel: PathBuf,
    pub initrd: PathBuf,
}

impl BootFiles {
    pub fn load(&self, cmdline_path: &Path) -> Result<BootArtifacts> {
        Ok(BootArtifacts {
            kernel: read(&self.kernel)?,
            initrd: read(&self.initrd)?,
            cmdline: read(cmdline_path)?,
        })
    }
}

/// Finds the highest kernel version in `dir` that has a matching initrd.
///
/// Kernels are `vmlinuz-<version>`; the initrd is `initrd.img-<version>` or
/// `initramfs-<version>.img`.
pub fn locate_boot_files(dir: &Path) -> Result<BootFiles> {
    let entries = fs::read_dir(dir).map_err(|source| Error::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut versions: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            name.strip_prefix(KERNEL_PREFIX)
                .filter(|version| !version.is_empty())
                .map(str::to_owned)
        })
        .collect();
    versions.sort_by(|a, b| compare_versions(b, a));

    for version in versions {
        let kernel = dir.join(format!("{KERNEL_PREFIX}{version}"));
        let initrd = [
            dir.join(format!("initrd.img-{version}")),
            dir.join(format!("initramfs-{version}.img")),
        ]
        .into_iter()
        .find(|path| path.is_file());

        match initrd {
            Some(initrd) => {
                info!(%version, kernel = %kernel.display(), initrd = %initrd.display(), "found boot files");
                return Ok(BootFiles {
                    version,
                    kernel,
                    initrd,
                });
            }
            None => debug!(%version, "kernel has no matching initrd"),
        }
    }

    Err(Error::NoBootFiles {
        dir: dir.to_path_buf(),
    })
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum VersionPart<'a> {
    Number(u64),
    Text(&'a str),
}

fn version_parts(version: &str) -> Vec<VersionPart<'_>> {
    let mut parts = Vec::new();
    let mut rest = version;
    while let Some(first) = rest.chars().next() {
        let is_digit = first.is_ascii_digit();
        let end = rest
            .find(|c: char| c.is_ascii_digit() != is_digit)
            .unwrap_or(rest.len());
        let (chunk, tail) = rest.split_at(end);
        parts.push(match chunk.parse() {
            Ok(n) if is_digit => VersionPart::Number(n),
            _ => VersionPart::Text(chunk),
        });
        rest = tail;
    }
    parts
}

/// Orders kernel versions numerically, so `6.10.0` sorts after `6.9.0`.
fn compare_versions(a: &str, b: &str) -> Ordering {
    version_parts(a).cmp(&version_parts(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    #[test]
    fn trims_only_trailing_newlines() {
        assert_eq!(trim_cmdline(b"C\n"), b"C");
        assert_eq!(trim_cmdline(b"C\n\n"), b"C");
        assert_eq!(trim_cmdline(b" C \n"), b" C ");
        assert_eq!(trim_cmdline(b"a\nb"), b"a\nb");
        assert_eq!(trim_cmdline(b"\n"), b"");
        assert_eq!(trim_cmdline(b""), b"");
    }

    #[test]
    fn single_byte_artifacts() {
        let expected = hex!("3c1e43a254dbde6e206edf55753deb76a06f7ebee2e8309c1f764cbe530d3d24ccb994533a44164a88634a4966027558");
        assert_eq!(replay_boot_measurements(b"K", b"I", b"C\n").0, expected);
        assert_eq!(replay_boot_measurements(b"K", b"I", b"C").0, expected);
        assert_ne!(replay_boot_measurements(b"I", b"K", b"C").0, expected);
    }

    #[test]
    fn artifacts_match_attested_register() {
        let artifacts = BootArtifacts {
            kernel: b"K".to_vec(),
            initrd: b"I".to_vec(),
            cmdline: b"C\n".to_vec(),
        };
        let mut report = TdReport::default();
        assert!(!artifacts.matches(&report));

        report.rtmr[1] = artifacts.expected_rtmr1();
        assert!(artifacts.matches(&report));
    }

    #[test]
    fn versions_compare_numerically() {
        assert_eq!(compare_versions("6.10.0-1-amd64", "6.9.0-1-amd64"), Ordering::Greater);
        assert_eq!(compare_versions("6.8.0-45-generic", "6.8.0-100-generic"), Ordering::Less);
        assert_eq!(compare_versions("6.8.0", "6.8.0"), Ordering::Equal);
    }

    #[test]
    fn locates_highest_version_with_initrd() {
        let dir = tempfile::tempdir().unwrap();
        let touch = |name: &str| fs::write(dir.path().join(name), name).unwrap();

        touch("vmlinuz-6.8.0-45-generic");
        touch("initrd.img-6.8.0-45-generic");
        touch("vmlinuz-6.8.0-100-generic");
        touch("initrd.img-6.8.0-100-generic");
        // Newest kernel, but no initrd for it.
        touch("vmlinuz-6.11.0-1-generic");
        touch("config-6.11.0-1-generic");

        let files = locate_boot_files(dir.path()).unwrap();
        assert_eq!(files.version, "6.8.0-100-generic");
        assert_eq!(files.kernel, dir.path().join("vmlinuz-6.8.0-100-generic"));
        assert_eq!(files.initrd, dir.path().join("initrd.img-6.8.0-100-generic"));
    }

    #[test]
    fn accepts_initramfs_naming() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("vmlinuz-6.12.1"), b"K").unwrap();
        fs::write(dir.path().join("initramfs-6.12.1.img"), b"I").unwrap();
        let cmdline = dir.path().join("cmdline");
        fs::write(&cmdline, b"C\n").unwrap();

        let files = locate_boot_files(dir.path()).unwrap();
        let artifacts = files.load(&cmdline).unwrap();
        assert_eq!(
            artifacts.expected_rtmr1(),
            replay_boot_measurements(b"K", b"I", b"C")
        );
    }

    #[test]
    fn no_pair_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("vmlinuz-6.1.0"), b"K").unwrap();

        assert!(matches!(
            locate_boot_files(dir.path()),
            Err(Error::NoBootFiles { .. })
        ));
        assert!(matches!(
            locate_boot_files(&dir.path().join("missing")),
            Err(Error::Io { .. })
        ));
    }
}
