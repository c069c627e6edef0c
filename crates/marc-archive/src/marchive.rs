//! Archive orchestrator
//!
//! Creation: entries → container buffer → (optional) envelope → tag → file.
//! Opening runs the same steps backwards. Extraction writes every entry under
//! its bare file name; directory components stored in names are dropped.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use tracing::{debug, info, warn};

use marc_container::ArchiveReader;
use marc_core::config::MarcConfig;
use marc_core::{Algorithm, Entry, MarcError, MarcResult, NameEncoding, ARCHIVE_EXTENSION};
use marc_storage::FileSystem;

use crate::report::{EntryInfo, ExtractFailure, ExtractReport};
use crate::tag::{append_tag, split_tag};

/// Progress callback type (entries_done, entries_total, entry_name)
pub type ProgressFn = Box<dyn Fn(u64, u64, &str) + Send + Sync>;

/// Archive operations over a file-system collaborator.
#[derive(Debug, Clone)]
pub struct Marchive<F> {
    fs: F,
    name_encoding: NameEncoding,
    algorithm: Algorithm,
    output_dir: Option<PathBuf>,
}

impl<F: FileSystem> Marchive<F> {
    /// UTF-8 names, AES when a password is given, extraction into the
    /// current directory.
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            name_encoding: NameEncoding::default(),
            algorithm: Algorithm::default(),
            output_dir: None,
        }
    }

    pub fn from_config(fs: F, config: &MarcConfig) -> Self {
        Self {
            fs,
            name_encoding: config.archive.name_encoding,
            algorithm: config.crypto.algorithm,
            output_dir: config.archive.output_dir.clone(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_name_encoding(mut self, encoding: NameEncoding) -> Self {
        self.name_encoding = encoding;
        self
    }

    pub fn file_system(&self) -> &F {
        &self.fs
    }

    /// Pack `entries` into `archive_name.mar`.
    ///
    /// Returns `None` without touching the file system when `entries` is
    /// empty. Names are validated before anything is written.
    pub fn create(
        &self,
        entries: &[Entry],
        archive_name: impl AsRef<Path>,
        password: Option<&SecretString>,
    ) -> MarcResult<Option<PathBuf>> {
        let buffer = marc_container::encode(entries, self.name_encoding)?;
        if buffer.is_empty() {
            debug!("no entries, nothing to write");
            return Ok(None);
        }

        let (mut file, algorithm) = match (password, self.algorithm) {
            (None, _) => (buffer, Algorithm::None),
            (Some(_), Algorithm::None) => return Err(MarcError::EncryptionDisabled),
            (Some(password), Algorithm::Aes) => {
                (marc_crypto::encrypt(&buffer, password)?, Algorithm::Aes)
            }
        };
        append_tag(&mut file, algorithm);

        let path = archive_path(archive_name.as_ref());
        self.fs.save_file(&path, &file)?;

        info!(
            path = %path.display(),
            entries = entries.len(),
            bytes = file.len(),
            algorithm = %algorithm,
            "archive created"
        );
        Ok(Some(path))
    }

    /// Read each file and pack it under the path it was given by.
    pub fn archive_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        archive_name: impl AsRef<Path>,
        password: Option<&SecretString>,
    ) -> MarcResult<Option<PathBuf>> {
        let mut entries = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let name = path.to_str().ok_or_else(|| {
                MarcError::invalid_name(&path.to_string_lossy(), "path is not valid UTF-8")
            })?;
            let content = self.fs.read_all_bytes(path)?;
            debug!(entry = name, bytes = content.len(), "adding file");
            entries.push(Entry::new(name, content));
        }
        self.create(&entries, archive_name, password)
    }

    /// Read, authenticate and decode an archive.
    pub fn open(
        &self,
        archive_name: impl AsRef<Path>,
        password: Option<&SecretString>,
    ) -> MarcResult<Vec<Entry>> {
        let path = archive_path(archive_name.as_ref());
        let buffer = self.load(&path, password)?;
        marc_container::decode(&buffer, self.name_encoding)?
            .map(|entry| entry.map(Entry::from))
            .collect()
    }

    /// Names and sizes of the entries, without writing anything.
    pub fn list(
        &self,
        archive_name: impl AsRef<Path>,
        password: Option<&SecretString>,
    ) -> MarcResult<Vec<EntryInfo>> {
        let path = archive_path(archive_name.as_ref());
        let buffer = self.load(&path, password)?;
        marc_container::decode(&buffer, self.name_encoding)?
            .map(|entry| {
                entry.map(|e| EntryInfo {
                    size: e.content.len() as u64,
                    name: e.name,
                })
            })
            .collect()
    }

    /// Write every entry to `output_dir/<basename>`.
    ///
    /// A parse or authentication failure aborts before anything is written.
    /// A name without a usable basename, or a failed write, is recorded in the
    /// report and extraction moves on to the next entry.
    pub fn extract(
        &self,
        archive_name: impl AsRef<Path>,
        output_dir: Option<&Path>,
        password: Option<&SecretString>,
    ) -> MarcResult<ExtractReport> {
        self.extract_with_progress(archive_name, output_dir, password, None)
    }

    /// [`Marchive::extract`] with a callback before each entry is written.
    pub fn extract_with_progress(
        &self,
        archive_name: impl AsRef<Path>,
        output_dir: Option<&Path>,
        password: Option<&SecretString>,
        progress: Option<&ProgressFn>,
    ) -> MarcResult<ExtractReport> {
        let path = archive_path(archive_name.as_ref());
        let output_dir = match output_dir.or(self.output_dir.as_deref()) {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir()?,
        };

        let buffer = self.load(&path, password)?;
        let entries = ArchiveReader::new(&buffer, self.name_encoding)?
            .entries()
            .collect::<MarcResult<Vec<_>>>()?;
        let total = entries.len();

        let mut report = ExtractReport {
            archive: path.clone(),
            output_dir: output_dir.clone(),
            ..Default::default()
        };

        for (i, entry) in entries.iter().enumerate() {
            if let Some(cb) = progress {
                cb(i as u64, total as u64, &entry.name);
            }

            let Some(basename) = safe_basename(&entry.name) else {
                warn!(name = %entry.name, "entry has no usable file name, skipping");
                report.failures.push(ExtractFailure {
                    name: entry.name.clone(),
                    reason: "entry has no usable file name".into(),
                });
                continue;
            };

            let target = output_dir.join(basename);
            match self.fs.save_file(&target, entry.content) {
                Ok(()) => {
                    info!(
                        name = %entry.name,
                        path = %target.display(),
                        bytes = entry.content.len(),
                        "entry extracted"
                    );
                    report.extracted.push(target);
                }
                Err(e) => {
                    warn!(name = %entry.name, path = %target.display(), "extract failed: {e}");
                    report.failures.push(ExtractFailure {
                        name: entry.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if let Some(cb) = progress {
            cb(total as u64, total as u64, "done");
        }

        info!(
            archive = %path.display(),
            extracted = report.success_count(),
            total,
            "{}/{} files extracted",
            report.success_count(),
            total
        );
        Ok(report)
    }

    /// Read the file, strip the tag and undo the envelope if there is one.
    fn load(&self, path: &Path, password: Option<&SecretString>) -> MarcResult<Vec<u8>> {
        let file = self.fs.read_all_bytes(path)?;
        let (payload, algorithm) = split_tag(&file)?;
        debug!(path = %path.display(), bytes = file.len(), algorithm = %algorithm, "loaded archive");

        match (algorithm, password) {
            (Algorithm::Aes, None) => Err(MarcError::InvalidKey),
            (Algorithm::Aes, Some(password)) => marc_crypto::decrypt(payload, password),
            (Algorithm::None, Some(_)) => {
                warn!(path = %path.display(), "archive is not encrypted, ignoring password");
                Ok(payload.to_vec())
            }
            (Algorithm::None, None) => Ok(payload.to_vec()),
        }
    }
}

/// `name` with the archive extension appended, unless it already has it.
pub fn archive_path(name: &Path) -> PathBuf {
    if name.to_string_lossy().ends_with(ARCHIVE_EXTENSION) {
        return name.to_path_buf();
    }
    let mut path = OsString::from(name.as_os_str());
    path.push(ARCHIVE_EXTENSION);
    PathBuf::from(path)
}

/// Last component of `name` after splitting on both `/` and `\`.
///
/// `None` for names that would not produce a file inside the output
/// directory (empty, `.`, `..`).
pub fn safe_basename(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next()?;
    match base {
        "" | "." | ".." => None,
        _ => Some(base),
    }
}
