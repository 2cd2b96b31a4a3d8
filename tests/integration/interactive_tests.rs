use ccdupe::actions::{run_interactive, DeleteConfig, TerminalPrompt};
use ccdupe::duplicates::DuplicateFinder;
use std::fs;
use std::io::Cursor;
use tempfile::tempdir;

fn run(dir: &std::path::Path, answers: &str) -> (ccdupe::actions::InteractiveReport, String) {
    let result = DuplicateFinder::with_defaults().find_duplicates(dir).unwrap();
    let mut prompt = TerminalPrompt::new(Cursor::new(answers.to_string()), Vec::new(), false);
    let mut remover = DeleteConfig::permanent();

    let report = run_interactive(&result.groups, &mut prompt, &mut remover).unwrap();
    let output = String::from_utf8(prompt.into_output()).unwrap();
    (report, output)
}

#[test]
fn test_delete_second_of_pair() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, b"hello").unwrap();
    fs::write(&b, b"hello").unwrap();
    fs::write(dir.path().join("c.txt"), b"world").unwrap();

    let (report, output) = run(dir.path(), "2\n");

    assert_eq!(report.pairs_prompted, 1);
    assert_eq!(report.deleted, vec![b.clone()]);
    assert!(a.exists());
    assert!(!b.exists());
    assert!(output.contains(&format!("Duplicates: {}|{}", a.display(), b.display())));
    assert!(output.contains(&format!("Deleted: {}", b.display())));
}

#[test]
fn test_group_of_three_skips_deleted_member() {
    let dir = tempdir().unwrap();
    for name in ["a", "b", "c"] {
        fs::write(dir.path().join(name), b"triplicate").unwrap();
    }

    // Delete "a" on (a, b); the pair (a, c) is never asked; keep (b, c)
    let (report, output) = run(dir.path(), "1\n3\n");

    assert_eq!(report.pairs_prompted, 2);
    assert_eq!(report.deleted, vec![dir.path().join("a")]);
    assert_eq!(report.kept, 1);
    assert_eq!(output.matches("Which file should be deleted?").count(), 2);
    assert!(dir.path().join("b").exists());
    assert!(dir.path().join("c").exists());
}

#[test]
fn test_vanished_file_reports_error_and_continues() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, b"same").unwrap();
    fs::write(&b, b"same").unwrap();
    fs::write(dir.path().join("x1"), b"other").unwrap();
    fs::write(dir.path().join("x2"), b"other").unwrap();

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    fs::remove_file(&a).unwrap();

    let mut prompt = TerminalPrompt::new(Cursor::new("1\n1\n"), Vec::new(), false);
    let mut remover = DeleteConfig::permanent();
    let report = run_interactive(&result.groups, &mut prompt, &mut remover).unwrap();
    let output = String::from_utf8(prompt.into_output()).unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.deleted, vec![dir.path().join("x1")]);
    assert!(output.contains(&format!("Error deleting file {}", a.display())));
}

#[test]
fn test_end_of_input_keeps_everything() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"same").unwrap();
    fs::write(dir.path().join("b"), b"same").unwrap();

    let (report, _) = run(dir.path(), "");

    assert_eq!(report.kept, 1);
    assert!(report.deleted.is_empty());
    assert!(dir.path().join("a").exists());
    assert!(dir.path().join("b").exists());
}

#[cfg(unix)]
#[test]
fn test_followed_link_protects_its_target() {
    use ccdupe::duplicates::FinderConfig;
    use ccdupe::scanner::ScanConfig;

    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let link = dir.path().join("z_link");
    fs::write(&a, b"hello").unwrap();
    std::os::unix::fs::symlink(&a, &link).unwrap();

    let config =
        FinderConfig::default().with_scan_config(ScanConfig::default().with_follow_symlinks(true));
    let result = DuplicateFinder::new(config).find_duplicates(dir.path()).unwrap();
    assert_eq!(result.groups.len(), 1);

    let mut prompt = TerminalPrompt::new(Cursor::new("1\n"), Vec::new(), false);
    let mut remover = DeleteConfig::permanent();
    let report = run_interactive(&result.groups, &mut prompt, &mut remover).unwrap();
    let output = String::from_utf8(prompt.into_output()).unwrap();

    assert_eq!(report.refused, 1);
    assert!(report.deleted.is_empty());
    assert!(a.exists());
    assert_eq!(fs::read(&link).unwrap(), b"hello");
    assert!(output.contains(&format!(
        "Refusing to delete {}: {} links to it",
        a.display(),
        link.display()
    )));
}
