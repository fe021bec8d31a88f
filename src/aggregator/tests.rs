use std::path::{Path, PathBuf};

use polars::prelude::*;

use super::*;
use crate::result_parser::ResultLog;

fn log(name: &str, content: &str) -> ResultLog {
    ResultLog::parse(Path::new(name), content).unwrap()
}

fn render(logs: &[ResultLog], alignment: Alignment) -> String {
    let df = merged_dataframe(logs, alignment).unwrap();
    render_table(&df).unwrap()
}

#[test]
fn test_two_logs_keyed() {
    let logs = [
        log("A.txt", "i1;3.0\ni2;4.5\n"),
        log("B.txt", "i1;5.0\ni2;6.25\n"),
    ];
    assert_eq!(
        render(&logs, Alignment::Keyed),
        "instance;A;B\ni1;3,0;5,0\ni2;4,5;6,25\n"
    );
    assert_eq!(
        render(&logs, Alignment::Positional),
        "instance;A;B\ni1;3,0;5,0\ni2;4,5;6,25\n"
    );
}

#[test]
fn test_keyed_follows_reference_order() {
    let logs = [
        log("A.txt", "i2;4.5\ni1;3.0\ni3;1\n"),
        log("B.txt", "i1;5.0\ni3;2\ni2;6.25\n"),
    ];
    assert_eq!(
        render(&logs, Alignment::Keyed),
        "instance;A;B\ni2;4,5;6,25\ni1;3,0;5,0\ni3;1;2\n"
    );
}

#[test]
fn test_shape() {
    let logs = [
        log("GUROBI_Results.txt", "a;1.5\nb;2\nc;3\nd;4\n"),
        log("BranchAndBoundResults.txt", "a;1\nb;2\nc;3\nd;4.25\n"),
        log("GA0Results.txt", "a;1\nb;2\nc;3\nd;4\n"),
    ];
    let df = merged_dataframe(&logs, Alignment::Keyed).unwrap();
    assert_eq!(df.shape(), (4, 4));
    assert_eq!(
        df.get_column_names(),
        &["instance", "GUROBI_Results", "BranchAndBoundResults", "GA0Results"]
    );
    assert_eq!(
        df["BranchAndBoundResults"],
        Series::new("BranchAndBoundResults", &["1", "2", "3", "4,25"])
    );
    let table = render(&logs, Alignment::Keyed);
    assert_eq!(table.lines().count(), 5);
    assert!(table.lines().all(|l| l.split(';').count() == 4));
    assert!(table.starts_with("instance;GUROBI_Results;BranchAndBoundResults;"));
}

#[test]
fn test_missing_instance_is_alignment_error() {
    let logs = [log("A.txt", "i1;3.0\ni2;4.5\n"), log("C.txt", "i1;7.0\n")];
    assert!(matches!(
        merged_dataframe(&logs, Alignment::Keyed),
        Err(BatchError::AlignmentMismatch(_))
    ));
    assert!(matches!(
        merged_dataframe(&logs, Alignment::Positional),
        Err(BatchError::AlignmentMismatch(_))
    ));
}

#[test]
fn test_extra_instance_is_alignment_error() {
    let logs = [log("A.txt", "i1;3.0\n"), log("B.txt", "i1;7.0\ni9;1.0\n")];
    let err = merged_dataframe(&logs, Alignment::Keyed).unwrap_err();
    assert!(err.to_string().contains("i9"), "{err}");
}

#[test]
fn test_repeated_runs_need_positional_alignment() {
    let logs = [
        log("A.txt", "i1;3.0\ni1;3.5\n"),
        log("B.txt", "i1;5.0\ni1;5.5\n"),
    ];
    assert!(matches!(
        merged_dataframe(&logs, Alignment::Keyed),
        Err(BatchError::AlignmentMismatch(_))
    ));
    assert_eq!(
        render(&logs, Alignment::Positional),
        "instance;A;B\ni1;3,0;5,0\ni1;3,5;5,5\n"
    );
}

#[test]
fn test_duplicate_column_names() {
    let logs = [log("run1/A.txt", "i1;1\n"), log("run2/A.csv", "i1;2\n")];
    match merged_dataframe(&logs, Alignment::Keyed).unwrap_err() {
        BatchError::DuplicateColumn {
            column,
            first,
            second,
        } => {
            assert_eq!(column, "A");
            assert_eq!(first, PathBuf::from("run1/A.txt"));
            assert_eq!(second, PathBuf::from("run2/A.csv"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_no_logs() {
    assert!(matches!(
        merged_dataframe(&[], Alignment::Keyed),
        Err(BatchError::NoResultLogs)
    ));
    assert!(matches!(read_result_logs(&[]), Err(BatchError::NoResultLogs)));
}

#[test]
fn test_empty_logs_give_header_only() {
    let logs = [log("A.txt", ""), log("B.txt", "")];
    assert_eq!(render(&logs, Alignment::Keyed), "instance;A;B\n");
}

#[test]
fn test_cells_are_written_verbatim() {
    let logs = [
        log("A.txt", "i1;\ni2;say \"hi\"\ni3;1.5\n"),
        log("B.txt", "i1;2\ni2;3\ni3;,x\n"),
    ];
    let expected = "instance;A;B\ni1;;2\ni2;say \"hi\";3\ni3;1,5;,x\n";
    assert_eq!(render(&logs, Alignment::Positional), expected);
    assert_eq!(render(&logs, Alignment::Keyed), expected);
}

#[test]
fn test_log_named_instance_collides_with_key_column() {
    let logs = [log("A.txt", "i1;1\n"), log("runs/instance.txt", "i1;2\n")];
    match merged_dataframe(&logs, Alignment::Keyed).unwrap_err() {
        BatchError::DuplicateColumn {
            column,
            first,
            second,
        } => {
            assert_eq!(column, "instance");
            assert_eq!(first, PathBuf::from("A.txt"));
            assert_eq!(second, PathBuf::from("runs/instance.txt"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
