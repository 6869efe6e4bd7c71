use kiln::constants::IGNORE_FILE;
use kiln::ignore::parse_ignore_file;
use std::fs::File;
use std::io::Write;
use tempfile::TempDir;

#[test]
fn test_parse_ignore_file() {
    let temp_dir = TempDir::new().unwrap();

    // Without .kilnignore
    let glob_set = parse_ignore_file(temp_dir.path()).unwrap();
    assert!(glob_set.is_match("src/.DS_Store"));
    assert!(glob_set.is_match(IGNORE_FILE));
    assert!(!glob_set.is_match("src/app.ts"));

    // With .kilnignore
    let mut file = File::create(temp_dir.path().join(IGNORE_FILE)).unwrap();
    writeln!(file, "# scratch files\n*.orig\n\ndrafts/**").unwrap();

    let glob_set = parse_ignore_file(temp_dir.path()).unwrap();
    assert!(glob_set.is_match("app.ts.orig"));
    assert!(glob_set.is_match("drafts/notes.md"));
    assert!(glob_set.is_match("docs/Thumbs.db"));
    assert!(!glob_set.is_match("# scratch files"));
}
