//! Integration test: create → open/extract round-trips on the local disk
//!
//! Covers plain and encrypted archives, password handling, the trailing tag,
//! path stripping on extraction, and per-entry failure reporting.

use std::path::{Path, PathBuf};

use marc_archive::Marchive;
use marc_core::{Algorithm, Entry, MarcError, MarcResult};
use marc_storage::{FileSystem, LocalFileSystem};
use secrecy::SecretString;
use tempfile::TempDir;

fn sample() -> Vec<Entry> {
    vec![Entry::new("a.txt", "hello"), Entry::new("b.bin", "world!")]
}

fn write_test_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write test file");
    path
}

#[test]
fn plain_archive_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let marchive = Marchive::new(LocalFileSystem);
    let name = tmp.path().join("plain");

    let path = marchive.create(&sample(), &name, None).unwrap().unwrap();
    assert_eq!(path, tmp.path().join("plain.mar"));

    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(on_disk.len(), 1043 + 4);
    // header value is 8 + len("hello") + len("world!")
    assert_eq!(&on_disk[..8], &19u64.to_le_bytes());
    assert_eq!(&on_disk[1043..], &0u32.to_le_bytes());

    assert_eq!(marchive.open(&name, None).unwrap(), sample());
    // the extension is optional when opening
    assert_eq!(marchive.open(&path, None).unwrap(), sample());
}

#[test]
fn encrypted_archive_roundtrip() {
    let tmp = TempDir::new().unwrap();
    let marchive = Marchive::new(LocalFileSystem);
    let password = SecretString::from("OneSymmetricKey");
    let name = tmp.path().join("secret");

    let path = marchive
        .create(&sample(), &name, Some(&password))
        .unwrap()
        .unwrap();

    let on_disk = std::fs::read(&path).unwrap();
    assert_eq!(&on_disk[on_disk.len() - 4..], &1u32.to_le_bytes());
    assert!(
        !on_disk.windows(5).any(|w| w == b"hello"),
        "content must not appear in the clear"
    );

    assert_eq!(marchive.open(&name, Some(&password)).unwrap(), sample());
}

#[test]
fn wrong_or_missing_password_is_invalid_key() {
    let tmp = TempDir::new().unwrap();
    let marchive = Marchive::new(LocalFileSystem);
    let name = tmp.path().join("locked");
    marchive
        .create(&sample(), &name, Some(&SecretString::from("right")))
        .unwrap();

    let wrong = SecretString::from("wrong");
    assert!(matches!(
        marchive.open(&name, Some(&wrong)),
        Err(MarcError::InvalidKey)
    ));
    assert!(matches!(
        marchive.open(&name, None),
        Err(MarcError::InvalidKey)
    ));

    let out = tmp.path().join("out");
    assert!(matches!(
        marchive.extract(&name, Some(&out), Some(&wrong)),
        Err(MarcError::InvalidKey)
    ));
    assert!(!out.exists(), "nothing is written when authentication fails");
}

#[test]
fn password_on_plain_archive_is_ignored() {
    let tmp = TempDir::new().unwrap();
    let marchive = Marchive::new(LocalFileSystem);
    let name = tmp.path().join("open");
    marchive.create(&sample(), &name, None).unwrap();

    let password = SecretString::from("unneeded");
    assert_eq!(marchive.open(&name, Some(&password)).unwrap(), sample());
}

#[test]
fn empty_input_writes_no_file() {
    let tmp = TempDir::new().unwrap();
    let marchive = Marchive::new(LocalFileSystem);
    let name = tmp.path().join("nothing");

    assert_eq!(marchive.create(&[], &name, None).unwrap(), None);
    assert!(!tmp.path().join("nothing.mar").exists());
}

#[test]
fn bad_name_writes_no_file() {
    let tmp = TempDir::new().unwrap();
    let marchive = Marchive::new(LocalFileSystem);
    let name = tmp.path().join("bad");
    let entries = vec![Entry::new("ok", "1"), Entry::new("n".repeat(497), "2")];

    assert!(matches!(
        marchive.create(&entries, &name, None),
        Err(MarcError::NameTooLong { len: 497, .. })
    ));
    assert!(!tmp.path().join("bad.mar").exists());
}

#[test]
fn password_with_encryption_disabled_fails() {
    let tmp = TempDir::new().unwrap();
    let marchive = Marchive::new(LocalFileSystem).with_algorithm(Algorithm::None);
    let name = tmp.path().join("disabled");

    let result = marchive.create(&sample(), &name, Some(&SecretString::from("pw")));
    assert!(matches!(result, Err(MarcError::EncryptionDisabled)));
    assert!(!tmp.path().join("disabled.mar").exists());

    // without a password the plain archive is still written
    assert!(marchive.create(&sample(), &name, None).unwrap().is_some());
}

#[test]
fn unknown_tag_and_truncated_file() {
    let tmp = TempDir::new().unwrap();
    let marchive = Marchive::new(LocalFileSystem);

    let name = tmp.path().join("tagged");
    let path = marchive.create(&sample(), &name, None).unwrap().unwrap();
    let mut bytes = std::fs::read(&path).unwrap();
    let len = bytes.len();
    bytes[len - 4..].copy_from_slice(&9u32.to_le_bytes());
    std::fs::write(&path, &bytes).unwrap();
    assert!(matches!(
        marchive.open(&name, None),
        Err(MarcError::UnknownAlgorithm(9))
    ));

    let short = write_test_file(tmp.path(), "short.mar", &[0, 0, 0]);
    assert!(matches!(
        marchive.open(&short, None),
        Err(MarcError::MalformedArchive(_))
    ));

    // tag says plain, but the container is cut short
    let mut truncated = std::fs::read(&path).unwrap();
    truncated.truncate(100);
    truncated.extend_from_slice(&0u32.to_le_bytes());
    let cut = write_test_file(tmp.path(), "cut.mar", &truncated);
    assert!(matches!(
        marchive.open(&cut, None),
        Err(MarcError::MalformedArchive(_))
    ));
}

#[test]
fn missing_archive_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let marchive = Marchive::new(LocalFileSystem);
    let result = marchive.open(tmp.path().join("ghost"), None);
    assert!(matches!(result, Err(MarcError::NotFound(p)) if p == tmp.path().join("ghost.mar")));
}

#[test]
fn archive_files_and_extract_strip_directories() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    std::fs::create_dir_all(src.join("nested")).unwrap();
    let a = write_test_file(&src, "a.txt", b"alpha");
    let b = write_test_file(&src.join("nested"), "b.txt", b"beta");

    let marchive = Marchive::new(LocalFileSystem);
    let password = SecretString::from("files");
    let name = tmp.path().join("bundle");
    marchive
        .archive_files(&[&a, &b], &name, Some(&password))
        .unwrap()
        .unwrap();

    // stored names are the paths as given
    let listed = marchive.list(&name, Some(&password)).unwrap();
    assert_eq!(listed[0].name, a.to_str().unwrap());
    assert_eq!(listed[1].size, 4);

    let out = tmp.path().join("out");
    let report = marchive.extract(&name, Some(&out), Some(&password)).unwrap();

    assert!(report.is_complete());
    assert_eq!(report.extracted, vec![out.join("a.txt"), out.join("b.txt")]);
    assert_eq!(std::fs::read(out.join("a.txt")).unwrap(), b"alpha");
    assert_eq!(std::fs::read(out.join("b.txt")).unwrap(), b"beta");
}

#[test]
fn archive_files_missing_source_is_not_found() {
    let tmp = TempDir::new().unwrap();
    let marchive = Marchive::new(LocalFileSystem);
    let missing = tmp.path().join("missing.txt");

    let result = marchive.archive_files(&[&missing], tmp.path().join("x"), None);
    assert!(matches!(result, Err(MarcError::NotFound(p)) if p == missing));
    assert!(!tmp.path().join("x.mar").exists());
}

#[test]
fn traversal_names_stay_inside_output_dir() {
    let tmp = TempDir::new().unwrap();
    let marchive = Marchive::new(LocalFileSystem);
    let name = tmp.path().join("evil");
    let entries = vec![
        Entry::new("../../escape.txt", "1"),
        Entry::new("..\\..\\win.txt", "2"),
        Entry::new("dir/..", "3"),
    ];
    marchive.create(&entries, &name, None).unwrap();

    let out = tmp.path().join("jail");
    let report = marchive.extract(&name, Some(&out), None).unwrap();

    assert_eq!(
        report.extracted,
        vec![out.join("escape.txt"), out.join("win.txt")]
    );
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].name, "dir/..");
    assert!(!tmp.path().join("escape.txt").exists());
}

/// Local disk that refuses to write one particular file name.
struct RefusingFileSystem {
    refuse: &'static str,
}

impl FileSystem for RefusingFileSystem {
    fn read_all_bytes(&self, path: &Path) -> MarcResult<Vec<u8>> {
        LocalFileSystem.read_all_bytes(path)
    }

    fn save_file(&self, path: &Path, bytes: &[u8]) -> MarcResult<()> {
        if path.file_name().is_some_and(|n| n == self.refuse) {
            return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into());
        }
        LocalFileSystem.save_file(path, bytes)
    }
}

#[test]
fn write_failure_is_recorded_and_extraction_continues() {
    let tmp = TempDir::new().unwrap();
    let name = tmp.path().join("partial");
    let entries = vec![
        Entry::new("first", "1"),
        Entry::new("blocked", "2"),
        Entry::new("third", "3"),
    ];
    Marchive::new(LocalFileSystem)
        .create(&entries, &name, None)
        .unwrap();

    let marchive = Marchive::new(RefusingFileSystem { refuse: "blocked" });
    let out = tmp.path().join("out");
    let report = marchive.extract(&name, Some(&out), None).unwrap();

    assert_eq!(report.total(), 3);
    assert_eq!(report.success_count(), 2);
    assert_eq!(report.failures[0].name, "blocked");
    assert!(report.failures[0].reason.contains("read-only"));
    assert!(out.join("third").exists());
}

#[test]
fn extract_report_serializes() {
    let tmp = TempDir::new().unwrap();
    let marchive = Marchive::new(LocalFileSystem);
    let name = tmp.path().join("json");
    marchive.create(&sample(), &name, None).unwrap();

    let report = marchive
        .extract(&name, Some(&tmp.path().join("o")), None)
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["extracted"].as_array().unwrap().len(), 2);
    assert!(json["failures"].as_array().unwrap().is_empty());
}
