// Primitives for writing the generated document.

use std::fs;
use std::path::Path;

use text_diff::print_diff;

use crate::xls::config_reader::ConversionSettings;
use crate::xls::*;

/// Fails if one of the files the conversion would create already exists and
/// overwriting is not allowed.
pub fn check_targets(settings: &ConversionSettings) -> XlsResult<()> {
    if settings.overwrite {
        return Ok(());
    }
    for target in settings.targets() {
        debug!("check_targets: {:?} exists: {}", target, target.exists());
        ensure!(
            !target.exists(),
            OutputExistsSnafu {
                path: target.display().to_string()
            }
        );
    }
    Ok(())
}

/// Writes the document in one go.
///
/// The content goes to a temporary file next to the destination, which is then renamed.
/// The destination is never left half-written.
pub fn write_document(path: &Path, content: &str) -> XlsResult<()> {
    let path_s = path.display().to_string();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(WritingOutputSnafu {
            path: parent.display().to_string(),
        })?;
    }
    let tmp_path = path.with_extension("tex.tmp");
    if let Err(e) = fs::write(&tmp_path, content) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).context(WritingOutputSnafu { path: path_s });
    }
    fs::rename(&tmp_path, path).context(WritingOutputSnafu { path: path_s })?;
    Ok(())
}

/// Compares the document with a reference file and prints the differences.
pub fn check_reference(reference_path: &str, content: &str) -> XlsResult<()> {
    let reference = fs::read_to_string(reference_path)
        .with_whatever_context(|_| format!("Cannot read the reference {}", reference_path))?;
    if reference != content {
        warn!("Found differences with the reference document");
        print_diff(reference.as_str(), content, "\n");
        return ReferenceMismatchSnafu {
            path: reference_path,
        }
        .fail();
    }
    info!("check_reference: the document matches {}", reference_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn settings(dir: &Path, overwrite: bool) -> ConversionSettings {
        ConversionSettings {
            instrument_path: PathBuf::from("instrument.xlsx"),
            output_directory: dir.to_path_buf(),
            survey_name: "S".to_string(),
            identifiers: vec![],
            american_date_format: false,
            overwrite,
            reshape_output_path: None,
            string_force_pattern: None,
            numeric_force_pattern: None,
        }
    }

    #[test]
    fn guard() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_targets(&settings(dir.path(), false)).is_ok());
        fs::write(dir.path().join("manuscript.tex"), "old").unwrap();
        assert!(matches!(
            check_targets(&settings(dir.path(), false)),
            Err(XlsError::OutputExists { .. })
        ));
        assert!(check_targets(&settings(dir.path(), true)).is_ok());
    }

    #[test]
    fn writes_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("manuscript.tex");
        write_document(&path, "content").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "content");
        assert!(!path.with_extension("tex.tmp").exists());
        write_document(&path, "new content").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new content");
    }

    #[test]
    fn reference() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("reference.tex");
        fs::write(&reference, "a\nb\n").unwrap();
        let reference_s = reference.display().to_string();
        assert!(check_reference(&reference_s, "a\nb\n").is_ok());
        assert!(matches!(
            check_reference(&reference_s, "a\nc\n"),
            Err(XlsError::ReferenceMismatch { .. })
        ));
        assert!(matches!(
            check_reference("/nonexistent/reference.tex", "a"),
            Err(XlsError::Whatever { .. })
        ));
    }
}
