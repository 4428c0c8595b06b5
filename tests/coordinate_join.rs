use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use designdump::config::{DumpConfig, SelectionRequest};
use designdump::{CoordinateResolver, DumpError, LayoutSource, UnitPoint, cli};

// Unit ids stay within the 2x3 regular grid of REGULAR_LAYOUT.
const DESIGN: &str = "\
#%header0=group_id\ttype\tname
#%header1=element_pos
#%header2=unit_id\tlength
5\tmain->v1\talpha
\t0
\t\t1\t25
\t\t2\t26
9\tmain->rescue->v1\tbeta
\t0
\t\t5\t30
";

const REGULAR_LAYOUT: &str = "\
#%layout_format_version=1.0
#%rows=2
#%cols=3
#%sequential=1
#%order=row_major
#%header0=unit_id\tx\ty
1\t0\t0
2\t1\t0
3\t2\t0
4\t0\t1
5\t1\t1
6\t2\t1
";

const IRREGULAR_LAYOUT: &str = "\
#%layout_format_version=1.0
#%header0=unit_id\tx\ty
1\t10\t20
5\t11\t21
";

const DUPLICATE_LAYOUT: &str = "\
#%layout_format_version=1.0
#%header0=unit_id\tx\ty
1\t10\t20
1\t12\t22
5\t11\t21
";

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

fn run_with_layout(
    dir: &Path,
    layout: &str,
    groups_only: bool,
) -> Result<String, DumpError> {
    let design_path = write_file(dir, "chip.design", DESIGN);
    let layout_path = write_file(dir, "chip.layout", layout);
    let out_path = dir.join("report.txt");
    let config = DumpConfig::new(
        design_path,
        Some(layout_path),
        out_path.clone(),
        groups_only,
        SelectionRequest::Full,
        "designdump test".to_string(),
    )
    .unwrap();
    cli::execute(&config)?;
    Ok(fs::read_to_string(out_path).unwrap())
}

fn header_line(text: &str) -> &str {
    text.lines().find(|line| !line.starts_with('#')).unwrap()
}

fn data_lines(text: &str) -> Vec<&str> {
    text.lines()
        .filter(|line| !line.starts_with('#'))
        .skip(1)
        .collect()
}

#[test]
fn regular_layout_joins_coordinates_arithmetically() {
    let dir = tempfile::tempdir().unwrap();
    let text = run_with_layout(dir.path(), REGULAR_LAYOUT, false).unwrap();
    assert_eq!(
        header_line(&text),
        "group_id\ttype\tname\telement_pos\tunit_id\tlength\tx\ty"
    );
    assert_eq!(
        data_lines(&text),
        vec![
            "5\tmain->v1\talpha\t0\t1\t25\t0\t0",
            "5\tmain->v1\talpha\t0\t2\t26\t1\t0",
            "9\tmain->rescue->v1\tbeta\t0\t5\t30\t1\t1",
        ]
    );
}

#[test]
fn irregular_layout_joins_through_the_index_with_blank_absences() {
    let dir = tempfile::tempdir().unwrap();
    let text = run_with_layout(dir.path(), IRREGULAR_LAYOUT, false).unwrap();
    // Unit 2 is absent from the layout: two empty trailing fields, not zeros.
    assert_eq!(
        data_lines(&text),
        vec![
            "5\tmain->v1\talpha\t0\t1\t25\t10\t20",
            "5\tmain->v1\talpha\t0\t2\t26\t\t",
            "9\tmain->rescue->v1\tbeta\t0\t5\t30\t11\t21",
        ]
    );
}

#[test]
fn duplicate_unit_id_in_an_indexed_layout_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_with_layout(dir.path(), DUPLICATE_LAYOUT, false).unwrap_err();
    match err {
        DumpError::NonUniqueIndex { column, key, .. } => {
            assert_eq!(column, "unit_id");
            assert_eq!(key, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn groups_only_ignores_the_layout_columns() {
    let dir = tempfile::tempdir().unwrap();
    let text = run_with_layout(dir.path(), REGULAR_LAYOUT, true).unwrap();
    assert_eq!(header_line(&text), "group_id\ttype\tname");
    assert_eq!(
        data_lines(&text),
        vec!["5\tmain->v1\talpha", "9\tmain->rescue->v1\tbeta"]
    );
}

#[test]
fn arithmetic_and_indexed_strategies_agree_on_a_regular_layout() {
    let dir = tempfile::tempdir().unwrap();
    let layout_path = write_file(dir.path(), "chip.layout", REGULAR_LAYOUT);

    let mut arithmetic =
        CoordinateResolver::from_layout(LayoutSource::open(&layout_path).unwrap()).unwrap();
    assert!(matches!(arithmetic, CoordinateResolver::Arithmetic(_)));
    let mut indexed =
        CoordinateResolver::indexed(LayoutSource::open(&layout_path).unwrap()).unwrap();

    for unit_id in 0..=8 {
        let expected = indexed.resolve(unit_id).unwrap();
        assert_eq!(
            arithmetic.resolve(unit_id).unwrap(),
            expected,
            "strategies disagree for unit {unit_id}"
        );
    }
}

#[test]
fn arithmetic_resolution_matches_known_positions() {
    let dir = tempfile::tempdir().unwrap();
    let layout_path = write_file(dir.path(), "chip.layout", REGULAR_LAYOUT);
    let mut resolver =
        CoordinateResolver::from_layout(LayoutSource::open(&layout_path).unwrap()).unwrap();
    assert_eq!(
        resolver.resolve(4).unwrap(),
        Some(UnitPoint { x: 0, y: 1 })
    );
    assert_eq!(resolver.resolve(7).unwrap(), None);
    assert_eq!(resolver.resolve(0).unwrap(), None);
}

#[test]
fn layout_without_x_and_y_columns_cannot_be_indexed() {
    let dir = tempfile::tempdir().unwrap();
    let layout_path = write_file(
        dir.path(),
        "chip.layout",
        "#%header0=unit_id\tposition\n1\t44\n",
    );
    let err = CoordinateResolver::indexed(LayoutSource::open(&layout_path).unwrap()).unwrap_err();
    assert!(matches!(err, DumpError::Schema { .. }));
}

#[test]
fn layout_must_lead_with_the_unit_id_column() {
    let dir = tempfile::tempdir().unwrap();
    let layout_path = write_file(
        dir.path(),
        "chip.layout",
        "#%header0=x\ty\tunit_id\n0\t0\t1\n",
    );
    let err = LayoutSource::open(&layout_path).unwrap_err();
    assert!(matches!(err, DumpError::Schema { .. }));
}
