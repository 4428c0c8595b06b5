use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use designdump::cli;
use designdump::config::{DumpConfig, SelectionRequest};

const DESIGN: &str = "\
#%design_format_version=1.0
#%design_type=grid-3k
#%lib_set_name=demo
#%lib_set_version=4
#%private_note=internal only
#%header0=group_id\ttype\tname
#%header1=element_pos
#%header2=unit_id\tlength
5\tmain->v1\talpha
\t0
\t\t501\t25
";

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn preamble_value<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    let prefix = format!("#%{key}=");
    text.lines()
        .find(|line| line.starts_with(&prefix))
        .map(|line| &line[prefix.len()..])
}

#[test]
fn preamble_carries_run_identity_and_allow_listed_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let design_path = write_file(dir.path(), "chip.design", DESIGN);
    let out_path = dir.path().join("report.txt");
    let config = DumpConfig::new(
        design_path,
        None,
        out_path.clone(),
        false,
        SelectionRequest::Full,
        "designdump -d chip.design -o report.txt".to_string(),
    )
    .unwrap();
    cli::execute(&config).unwrap();
    let text = fs::read_to_string(&out_path).unwrap();

    let guid = preamble_value(&text, "guid").unwrap();
    let exec_guid = preamble_value(&text, "exec_guid").unwrap();
    assert!(!guid.is_empty());
    assert!(!exec_guid.is_empty());
    assert_ne!(guid, exec_guid);
    assert_eq!(preamble_value(&text, "exec_version"), Some(cli::VERSION));
    assert!(preamble_value(&text, "create_date").is_some());
    assert_eq!(
        preamble_value(&text, "cmd"),
        Some("designdump -d chip.design -o report.txt")
    );

    // Allow-listed design headers pass through; everything else is dropped.
    assert_eq!(preamble_value(&text, "design_type"), Some("grid-3k"));
    assert_eq!(preamble_value(&text, "lib_set_name"), Some("demo"));
    assert_eq!(preamble_value(&text, "lib_set_version"), Some("4"));
    assert_eq!(preamble_value(&text, "private_note"), None);
    assert_eq!(preamble_value(&text, "design_format_version"), None);
}

#[test]
fn preamble_precedes_a_single_header_line_and_data() {
    let dir = tempfile::tempdir().unwrap();
    let design_path = write_file(dir.path(), "chip.design", DESIGN);
    let out_path = dir.path().join("report.txt");
    let config = DumpConfig::new(
        design_path,
        None,
        out_path.clone(),
        false,
        SelectionRequest::Full,
        "designdump test".to_string(),
    )
    .unwrap();
    cli::execute(&config).unwrap();
    let text = fs::read_to_string(&out_path).unwrap();

    let mut lines = text.lines();
    let mut preamble = 0;
    let header = loop {
        let line = lines.next().unwrap();
        if line.starts_with("#%") {
            preamble += 1;
            continue;
        }
        break line;
    };
    assert!(preamble >= 5, "expected a metadata preamble, saw {preamble} lines");
    assert_eq!(header, "group_id\ttype\tname\telement_pos\tunit_id\tlength");
    assert_eq!(lines.next(), Some("5\tmain->v1\talpha\t0\t501\t25"));
    assert_eq!(lines.next(), None);
}

#[test]
fn run_dump_drives_a_full_run_from_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let design_path = write_file(dir.path(), "chip.design", DESIGN);
    let out_path = dir.path().join("report.txt");
    cli::run_dump([
        "designdump".to_string(),
        "--design-file".to_string(),
        design_path.display().to_string(),
        "--out-file".to_string(),
        out_path.display().to_string(),
        "--groups-only".to_string(),
    ])
    .unwrap();
    let text = fs::read_to_string(&out_path).unwrap();
    assert!(text.ends_with("5\tmain->v1\talpha\n"));
    let cmd = preamble_value(&text, "cmd").unwrap();
    assert!(cmd.starts_with("designdump --design-file"));
}

#[test]
fn run_dump_rejects_mixed_selection_modes() {
    let dir = tempfile::tempdir().unwrap();
    let design_path = write_file(dir.path(), "chip.design", DESIGN);
    let ids_path = write_file(dir.path(), "ids.txt", "group_id\n5\n");
    let result = cli::run_dump([
        "designdump".to_string(),
        "--design-file".to_string(),
        design_path.display().to_string(),
        "--out-file".to_string(),
        dir.path().join("report.txt").display().to_string(),
        "--group-ids".to_string(),
        ids_path.display().to_string(),
        "--group-type".to_string(),
        "main".to_string(),
    ]);
    assert!(result.is_err());
}

#[test]
fn run_dump_help_is_a_clean_exit() {
    cli::run_dump(["designdump".to_string(), "--help".to_string()]).unwrap();
}
