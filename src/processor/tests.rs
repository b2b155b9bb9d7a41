use super::{FileOutcome, FolderProcessor, WRITE_CHECK_FILE, ensure_writable, temp_sibling};
use crate::config::Config;
use crate::error::{ProcessError, StartupError};
use crate::test_support::{
    A4, LETTER, SAMPLE_INFO, SAMPLE_XMP, TestResult, info_field, page_sizes, write_sample_pdf,
};
use crate::watch::StopSignal;
use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn config_for(root: &Path) -> Config {
    Config {
        watch_folder: root.to_path_buf(),
        ..Config::default()
    }
}

fn leftover_temp_files(root: &Path) -> Vec<std::path::PathBuf> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().to_string_lossy().ends_with(".tmp"))
        .map(|entry| entry.into_path())
        .collect()
}

#[test]
fn new_creates_missing_watch_root() -> TestResult {
    let dir = tempdir()?;
    let root = dir.path().join("entrada").join("pdfs");

    let processor = FolderProcessor::new(&config_for(&root))?;

    assert!(root.is_dir());
    assert_eq!(processor.root(), root.as_path());
    Ok(())
}

#[test]
fn new_fails_when_root_cannot_be_created() -> TestResult {
    let dir = tempdir()?;
    let blocker = dir.path().join("archivo.txt");
    fs::write(&blocker, b"no soy un directorio")?;

    let result = FolderProcessor::new(&config_for(&blocker.join("entrada")));

    assert!(matches!(result, Err(StartupError::CreateRoot { .. })));
    Ok(())
}

#[test]
fn new_fails_when_root_is_a_file() -> TestResult {
    let dir = tempdir()?;
    let file = dir.path().join("entrada.pdf");
    fs::write(&file, b"x")?;

    let result = FolderProcessor::new(&config_for(&file));

    assert!(matches!(result, Err(StartupError::NotADirectory { .. })));
    Ok(())
}

#[test]
fn process_file_replaces_original_in_place() -> TestResult {
    let dir = tempdir()?;
    let processor = FolderProcessor::new(&config_for(dir.path()))?;
    let pdf = dir.path().join("informe.pdf");
    write_sample_pdf(&pdf, &[A4, LETTER], &SAMPLE_INFO, Some(SAMPLE_XMP))?;
    let sizes_before = page_sizes(&pdf);

    let outcome = processor.process_file(&pdf)?;

    assert_eq!(outcome, FileOutcome::Stripped);
    assert_eq!(info_field(&pdf, "Title"), Some(Vec::new()));
    assert_eq!(info_field(&pdf, "Author"), Some("Ana Pérez".as_bytes().to_vec()));
    assert_eq!(page_sizes(&pdf), sizes_before);
    assert!(!temp_sibling(&pdf).exists());
    Ok(())
}

#[test]
fn process_file_leaves_blank_documents_untouched() -> TestResult {
    let dir = tempdir()?;
    let processor = FolderProcessor::new(&config_for(dir.path()))?;
    let pdf = dir.path().join("limpio.pdf");
    write_sample_pdf(&pdf, &[A4], &[("Title", ""), ("Producer", "Writer")], None)?;
    let before = fs::read(&pdf)?;

    let outcome = processor.process_file(&pdf)?;

    assert_eq!(outcome, FileOutcome::AlreadyBlank);
    assert_eq!(fs::read(&pdf)?, before);
    Ok(())
}

#[test]
fn failed_transform_keeps_original_and_removes_temp() -> TestResult {
    let dir = tempdir()?;
    let processor = FolderProcessor::new(&config_for(dir.path()))?;
    let pdf = dir.path().join("roto.pdf");
    fs::write(&pdf, b"contenido corrupto")?;
    fs::write(temp_sibling(&pdf), b"resto de una ejecucion anterior")?;

    let result = processor.process_file(&pdf);

    assert!(matches!(result, Err(ProcessError::Transform { .. })));
    if let Err(error) = result {
        assert_eq!(error.path(), pdf.as_path());
    }
    assert_eq!(fs::read(&pdf)?, b"contenido corrupto");
    assert!(!temp_sibling(&pdf).exists());
    Ok(())
}

#[test]
fn blank_document_clears_stale_temp() -> TestResult {
    let dir = tempdir()?;
    let processor = FolderProcessor::new(&config_for(dir.path()))?;
    let pdf = dir.path().join("limpio.pdf");
    write_sample_pdf(&pdf, &[A4], &[("Title", "")], None)?;
    fs::write(temp_sibling(&pdf), b"resto de una ejecucion anterior")?;

    let outcome = processor.process_file(&pdf)?;

    assert_eq!(outcome, FileOutcome::AlreadyBlank);
    assert!(!temp_sibling(&pdf).exists());
    Ok(())
}

#[test]
fn failed_replace_keeps_original_and_removes_temp() -> TestResult {
    let dir = tempdir()?;
    let processor = FolderProcessor::new(&config_for(dir.path()))?;
    let target = dir.path().join("informe.pdf");
    fs::create_dir(&target)?;
    fs::write(target.join("anexo.txt"), b"contenido")?;
    let temp = temp_sibling(&target);
    write_sample_pdf(&temp, &[A4], &[("Title", "")], None)?;

    let result = processor.commit(&temp, &target);

    assert!(matches!(result, Err(ProcessError::Replace { .. })));
    if let Err(error) = result {
        assert_eq!(error.path(), target.as_path());
    }
    assert_eq!(fs::read(target.join("anexo.txt"))?, b"contenido");
    assert!(!temp.exists());
    Ok(())
}

#[test]
fn write_check_leaves_no_scratch_file() -> TestResult {
    let dir = tempdir()?;

    FolderProcessor::new(&config_for(dir.path()))?;

    assert!(!dir.path().join(WRITE_CHECK_FILE).exists());
    assert_eq!(fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[test]
fn write_check_fails_where_files_cannot_be_created() -> TestResult {
    let dir = tempdir()?;

    let result = ensure_writable(&dir.path().join("no-existe"));

    assert!(matches!(result, Err(StartupError::NotWritable { .. })));
    Ok(())
}

#[test]
fn run_once_isolates_failures() -> TestResult {
    let dir = tempdir()?;
    let processor = FolderProcessor::new(&config_for(dir.path()))?;
    let nested = dir.path().join("clientes").join("2024");
    fs::create_dir_all(&nested)?;

    let valid = nested.join("VALIDO.PDF");
    let corrupt = dir.path().join("corrupto.pdf");
    let ignored = dir.path().join("notas.txt");
    write_sample_pdf(&valid, &[A4], &SAMPLE_INFO, None)?;
    fs::write(&corrupt, b"no es un pdf")?;
    fs::write(&ignored, b"texto")?;

    let summary = processor.run_once();

    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.stripped, 1);
    assert_eq!(summary.already_blank, 0);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].path(), corrupt.as_path());
    assert_eq!(summary.processed(), 2);
    assert!(!summary.interrupted);

    assert_eq!(info_field(&valid, "Title"), Some(Vec::new()));
    assert_eq!(fs::read(&corrupt)?, b"no es un pdf");
    assert_eq!(fs::read(&ignored)?, b"texto");
    assert!(leftover_temp_files(dir.path()).is_empty());
    Ok(())
}

#[test]
fn second_pass_finds_nothing_to_strip() -> TestResult {
    let dir = tempdir()?;
    let processor = FolderProcessor::new(&config_for(dir.path()))?;
    let pdf = dir.path().join("informe.pdf");
    write_sample_pdf(&pdf, &[A4], &SAMPLE_INFO, Some(SAMPLE_XMP))?;

    let first = processor.run_once();
    let bytes_after_first = fs::read(&pdf)?;
    let second = processor.run_once();

    assert_eq!(first.stripped, 1);
    assert_eq!(second.stripped, 0);
    assert_eq!(second.already_blank, 1);
    assert_eq!(fs::read(&pdf)?, bytes_after_first);
    Ok(())
}

#[test]
fn run_forever_returns_when_already_stopped() -> TestResult {
    let dir = tempdir()?;
    let processor = FolderProcessor::new(&config_for(dir.path()))?;
    let stop = StopSignal::new();
    stop.stop();

    let passes = processor.run_forever(Duration::from_secs(3600), &stop);

    assert_eq!(passes, 1);
    Ok(())
}

#[test]
fn stopped_pass_is_interrupted_before_processing() -> TestResult {
    let dir = tempdir()?;
    let processor = FolderProcessor::new(&config_for(dir.path()))?;
    let pdf = dir.path().join("informe.pdf");
    write_sample_pdf(&pdf, &[A4], &SAMPLE_INFO, None)?;
    let stop = StopSignal::new();
    stop.stop();

    let passes = processor.run_forever(Duration::from_secs(3600), &stop);

    assert_eq!(passes, 0);
    assert_eq!(
        info_field(&pdf, "Title"),
        Some(b"Informe Trimestral".to_vec())
    );
    Ok(())
}

#[test]
fn run_forever_picks_up_new_files_and_stops_on_signal() -> TestResult {
    let dir = tempdir()?;
    let processor = FolderProcessor::new(&config_for(dir.path()))?;
    let stop = StopSignal::new();

    let late = dir.path().join("tardio.pdf");
    let writer_stop = stop.clone();
    let writer_path = late.clone();
    let writer = thread::spawn(move || -> Result<(), String> {
        thread::sleep(Duration::from_millis(50));
        write_sample_pdf(&writer_path, &[A4], &SAMPLE_INFO, None).map_err(|e| e.to_string())?;

        let deadline = Instant::now() + Duration::from_secs(30);
        while info_field(&writer_path, "Title") != Some(Vec::new()) {
            if Instant::now() > deadline {
                writer_stop.stop();
                return Err("el archivo nuevo no se procesó a tiempo".to_string());
            }
            thread::sleep(Duration::from_millis(10));
        }
        writer_stop.stop();
        Ok(())
    });

    let passes = processor.run_forever(Duration::from_millis(20), &stop);

    writer
        .join()
        .map_err(|_| "el hilo auxiliar falló")?
        .map_err(|e| Box::<dyn std::error::Error>::from(e))?;
    assert!(passes >= 1);
    assert_eq!(info_field(&late, "Title"), Some(Vec::new()));
    Ok(())
}
