use std::{
    collections::{HashMap, HashSet},
    fs,
    path::PathBuf,
};

use itertools::Itertools;
use log::{info, warn};
use polars::{lazy::dsl::GetOutput, prelude::*};

use crate::datastructures::{Alignment, MergeConfig};
use crate::error::{BatchError, Result};
use crate::result_parser::{localize_decimal, ResultLog};

/// Header of the key column of the merged table.
pub const INSTANCE_COLUMN: &str = "instance";

pub fn read_result_logs(paths: &[PathBuf]) -> Result<Vec<ResultLog>> {
    if paths.is_empty() {
        return Err(BatchError::NoResultLogs);
    }
    paths.iter().map(|path| ResultLog::read(path)).collect()
}

/// Reads every configured log, merges them and overwrites `config.out`.
/// Nothing is written unless the whole table could be built.
pub fn merge_results(config: &MergeConfig) -> Result<DataFrame> {
    let logs = read_result_logs(&config.result_logs)?;
    let merged = merged_dataframe(&logs, config.alignment)?;
    let table = render_table(&merged)?;
    fs::write(&config.out, table)
        .map_err(|e| BatchError::io(&config.out, e))?;
    info!(
        "Wrote {} instances x {} methods to {:?}",
        merged.height(),
        logs.len(),
        config.out
    );
    Ok(merged)
}

/// One row per instance of the first log, one column per log, values with
/// comma as decimal separator.
pub fn merged_dataframe(
    logs: &[ResultLog],
    alignment: Alignment,
) -> Result<DataFrame> {
    let reference = logs.first().ok_or(BatchError::NoResultLogs)?;
    let value_columns = column_names(logs)?;
    let merged = match alignment {
        Alignment::Keyed => keyed_merge(logs, &value_columns)?,
        Alignment::Positional => positional_merge(logs, &value_columns)?,
    };
    info!(
        "Merged {} result logs on the {} instances of {:?}",
        logs.len(),
        reference.len(),
        reference.path
    );
    Ok(merged
        .with_columns(
            value_columns
                .iter()
                .map(|name| {
                    col(name).apply(
                        |s: Series| {
                            Ok(s.utf8()?
                                .into_no_null_iter()
                                .map(localize_decimal)
                                .collect())
                        },
                        GetOutput::from_type(DataType::Utf8),
                    )
                })
                .collect_vec(),
        )
        .collect()?)
}

/// Semicolon separated table with a header row. Cells are written as they
/// are, without CSV quoting.
pub fn render_table(df: &DataFrame) -> Result<String> {
    let columns = df
        .get_columns()
        .iter()
        .map(|s| s.utf8())
        .collect::<PolarsResult<Vec<_>>>()?;
    let mut table = df.get_column_names().join(";");
    table.push('\n');
    for row in 0..df.height() {
        table.push_str(
            &columns
                .iter()
                .map(|column| column.get(row).unwrap_or_default())
                .join(";"),
        );
        table.push('\n');
    }
    Ok(table)
}

fn column_names(logs: &[ResultLog]) -> Result<Vec<String>> {
    let mut seen: HashMap<String, &PathBuf> = HashMap::new();
    // the instance column is taken from the first log
    if let Some(reference) = logs.first() {
        seen.insert(INSTANCE_COLUMN.to_string(), &reference.path);
    }
    for log in logs {
        let name = log.column_name();
        if let Some(first) = seen.get(&name) {
            return Err(BatchError::DuplicateColumn {
                column: name,
                first: first.to_path_buf(),
                second: log.path.clone(),
            });
        }
        seen.insert(name, &log.path);
    }
    Ok(logs.iter().map(ResultLog::column_name).collect())
}

fn log_frame(log: &ResultLog, name: &str) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        Series::new(INSTANCE_COLUMN, log.instances()),
        Series::new(name, log.values()),
    ])?)
}

fn keyed_merge(logs: &[ResultLog], names: &[String]) -> Result<LazyFrame> {
    for log in logs {
        if let Some(duplicate) = log.instances().iter().duplicates().next() {
            return Err(BatchError::AlignmentMismatch(format!(
                "instance {duplicate:?} appears more than once in {:?}, \
                 use positional alignment for logs with repeated runs",
                log.path
            )));
        }
    }
    let reference = &logs[0];
    let reference_instances: HashSet<String> =
        reference.instances().into_iter().collect();
    for log in &logs[1..] {
        let instances: HashSet<String> = log.instances().into_iter().collect();
        if let Some(missing) = reference
            .instances()
            .into_iter()
            .find(|i| !instances.contains(i))
        {
            return Err(BatchError::AlignmentMismatch(format!(
                "instance {missing:?} of {:?} is missing from {:?}",
                reference.path, log.path
            )));
        }
        if let Some(extra) = log
            .instances()
            .into_iter()
            .find(|i| !reference_instances.contains(i))
        {
            return Err(BatchError::AlignmentMismatch(format!(
                "instance {extra:?} of {:?} is not in {:?}",
                log.path, reference.path
            )));
        }
    }

    let mut merged = log_frame(reference, &names[0])?.lazy();
    for (log, name) in logs.iter().zip(names).skip(1) {
        merged = merged.join(
            log_frame(log, name)?.lazy(),
            vec![col(INSTANCE_COLUMN)],
            vec![col(INSTANCE_COLUMN)],
            JoinType::Left,
        );
    }
    Ok(merged)
}

fn positional_merge(logs: &[ResultLog], names: &[String]) -> Result<LazyFrame> {
    let reference = &logs[0];
    if let Some(log) = logs.iter().find(|log| log.len() != reference.len()) {
        return Err(BatchError::AlignmentMismatch(format!(
            "{:?} has {} rows but {:?} has {}",
            reference.path,
            reference.len(),
            log.path,
            log.len()
        )));
    }
    for log in &logs[1..] {
        if let Some((row, (expected, found))) = reference
            .rows
            .iter()
            .zip(&log.rows)
            .map(|(r, l)| (&r.instance, &l.instance))
            .find_position(|(r, l)| r != l)
        {
            warn!(
                "Row {} of {:?} is {found:?}, expected {expected:?}",
                row + 1,
                log.path
            );
        }
    }
    let columns = [
        vec![Series::new(INSTANCE_COLUMN, reference.instances())],
        logs.iter()
            .zip(names)
            .map(|(log, name)| Series::new(name, log.values()))
            .collect_vec(),
    ]
    .concat();
    Ok(DataFrame::new(columns)?.lazy())
}

#[cfg(test)]
mod tests;
