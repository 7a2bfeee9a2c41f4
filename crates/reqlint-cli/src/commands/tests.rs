//! Command handler tests over temporary manifest files.

use super::*;
use crate::OutputFormat;
use reqlint_core::error::ReqlintError;
use std::io::Write;

fn write_manifest(dir: &tempfile::TempDir, content: &str) -> Utf8PathBuf {
    let path = dir.path().join("requirements.txt");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    Utf8PathBuf::from_path_buf(path).unwrap()
}

#[test]
fn test_check_clean_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, "flake8==4.0.1\nscipy>=1.4.1, <=1.10.1\n");
    let ctx = CommandContext::new().unwrap();

    let result =
        tokio_test::block_on(check::execute(path, OutputFormat::Text, false, &ctx));
    assert!(result.is_ok());
}

#[test]
fn test_check_json_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, "pandas==1.3.5; python_version >= '3.7'\n");
    let ctx = CommandContext::new().unwrap();

    let result = tokio_test::block_on(check::execute(path, OutputFormat::Json, false, &ctx));
    assert!(result.is_ok());
}

#[test]
fn test_check_missing_file() {
    let ctx = CommandContext::new().unwrap();
    let result = tokio_test::block_on(check::execute(
        Utf8PathBuf::from("/nonexistent/requirements.txt"),
        OutputFormat::Text,
        false,
        &ctx,
    ));
    assert!(matches!(result, Err(ReqlintError::Io { .. })));
}

#[test]
fn test_list_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, "flake8==4.0.1\npandas==1.3.5\n");
    let ctx = CommandContext::new().unwrap();

    let result = tokio_test::block_on(list::execute(path, false, "3.12".to_string(), &ctx));
    assert!(result.is_ok());
}

#[test]
fn test_list_applicable_filter() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, "old-pkg==1.0; python_version < '3.0'\n");
    let ctx = CommandContext::new().unwrap();

    let result = tokio_test::block_on(list::execute(path, true, "3.12".to_string(), &ctx));
    assert!(result.is_ok());
}

#[test]
fn test_show_known_package() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, "Flake8_Docstrings==1.6.0\n");
    let ctx = CommandContext::new().unwrap();

    // matched under normalization
    let result = tokio_test::block_on(show::execute(path, "flake8-docstrings".to_string(), &ctx));
    assert!(result.is_ok());
}

#[test]
fn test_show_unknown_package() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_manifest(&dir, "flake8==4.0.1\n");
    let ctx = CommandContext::new().unwrap();

    let result = tokio_test::block_on(show::execute(path, "pandas".to_string(), &ctx));
    assert!(matches!(result, Err(ReqlintError::PackageNotFound { .. })));
}

#[test]
fn test_resolve_relative_path() {
    let ctx = CommandContext::new().unwrap();
    let resolved = ctx.resolve(Utf8Path::new("requirements.txt"));
    assert!(resolved.is_absolute());

    let absolute = Utf8Path::new("/tmp/requirements.txt");
    assert_eq!(ctx.resolve(absolute), absolute);
}
