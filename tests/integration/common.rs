//! Shared helpers: sandboxes, fixture archives and project files.

use anyhow::Result;
use assert_cmd::Command;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use depwright::build_dir::BuildDirectory;
use depwright::core::{Platform, Target};
use depwright::invocation::Invocation;
use depwright::registry::{ProjectMetadata, Registry};
use depwright::test_utils::{init_test_logging, sandbox};

/// A temporary source root with its build directory.
pub struct Sandbox {
    pub temp: TempDir,
    pub invocation: Invocation,
    pub build_dir: BuildDirectory,
}

impl Sandbox {
    pub fn new(platform: Platform) -> Result<Self> {
        init_test_logging(None);
        let temp = TempDir::new()?;
        let (invocation, build_dir) = sandbox(temp.path(), Target::new(platform, "x86_64"));
        Ok(Self {
            temp,
            invocation,
            build_dir,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn prefix(&self) -> &Path {
        self.build_dir.prefix()
    }

    /// Writes `content` under the sandbox root, creating parents.
    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        write_file(&self.path().join(relative), content)
    }

    /// Writes `content` under the install prefix.
    pub fn install_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        write_file(&self.prefix().join(relative), content)
    }

    pub fn ledger_json(&self) -> Option<serde_json::Value> {
        let content = fs::read_to_string(&self.build_dir.ledger).ok()?;
        serde_json::from_str(&content).ok()
    }
}

pub fn write_file(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(path.to_path_buf())
}

/// Writes a `.tar.gz` holding `entries` (path, content).
pub fn write_tar_gz(path: &Path, entries: &[(&str, &str)]) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let encoder = GzEncoder::new(fs::File::create(path)?, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, content.as_bytes())?;
    }
    builder.into_inner()?.finish()?;
    Ok(path.to_path_buf())
}

/// Writes a `.zip` holding `entries` (path, content).
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut zip = zip::ZipWriter::new(fs::File::create(path)?);
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in entries {
        zip.start_file(*name, options)?;
        zip.write_all(content.as_bytes())?;
    }
    zip.finish()?;
    Ok(path.to_path_buf())
}

pub fn registry(json: &str) -> Result<Registry> {
    Ok(ProjectMetadata::parse(json, "project.json")?.registry)
}

/// The binary, isolated from the user's global config.
pub fn depwright(sandbox: &Path) -> Command {
    let mut command = Command::cargo_bin("depwright").expect("binary is built");
    command
        .env("DEPWRIGHT_CONFIG", sandbox.join("no-config.toml"))
        .env_remove("DEPWRIGHT_SOURCE_ROOT")
        .env_remove("RUST_LOG")
        .env_remove("GITHUB_TOKEN");
    command
}
