//! File-backed source configuration and session behavior.

mod common;

use std::collections::HashMap;

use futures::TryStreamExt;
use packscan::{Error, PartitionSource, Qual, Row, RowSource, Value};

fn write_partition(bytes: &[u8]) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    std::fs::write(file.path(), bytes).expect("write fixture");
    file
}

fn options_for(file: &tempfile::NamedTempFile) -> HashMap<String, String> {
    HashMap::from([(
        "filename".to_owned(),
        file.path().to_string_lossy().into_owned(),
    )])
}

#[test]
fn missing_filename_fails_at_configure_time() {
    let err = PartitionSource::configure(&HashMap::new()).unwrap_err();
    assert!(matches!(err, Error::MissingOption("filename")));
}

#[tokio::test]
async fn scans_a_partition_file() {
    let file = write_partition(&common::int_partition());
    let source = PartitionSource::configure(&options_for(&file)).expect("configure");

    let rows: Vec<Row> = source
        .open(&[], &common::scan_columns())
        .try_collect()
        .await
        .expect("scan");
    assert_eq!(rows.len(), 100);
    assert_eq!(rows[0], vec![Value::Int(0), Value::Int(0)]);
}

#[tokio::test]
async fn pushdown_applies_at_the_source() {
    let file = write_partition(&common::str_partition());
    let source = PartitionSource::configure(&options_for(&file)).expect("configure");

    let rows: Vec<Row> = source
        .open(&[Qual::new("col1", "~~", "9%")], &common::scan_columns())
        .try_collect()
        .await
        .expect("scan");
    assert_eq!(rows.len(), 11);
    assert_eq!(rows[0], vec![Value::Int(9), Value::from("9")]);
}

#[tokio::test]
async fn each_open_is_an_independent_session() {
    let file = write_partition(&common::int_partition());
    let source = PartitionSource::configure(&options_for(&file)).expect("configure");
    let columns = common::scan_columns();

    let first: Vec<Row> = source.open(&[], &columns).try_collect().await.expect("scan");
    let second: Vec<Row> = source.open(&[], &columns).try_collect().await.expect("scan");
    assert_eq!(first.len(), 100);
    assert_eq!(first, second);
}

#[tokio::test]
async fn early_drop_releases_the_session() {
    let file = write_partition(&common::int_partition());
    let source = PartitionSource::configure(&options_for(&file)).expect("configure");
    let columns = common::scan_columns();

    {
        let stream = source.open(&[], &columns);
        futures::pin_mut!(stream);
        use futures::StreamExt;
        let first = stream.next().await.expect("one row").expect("row");
        assert_eq!(first, vec![Value::Int(0), Value::Int(0)]);
        // Stop requesting rows; dropping the stream closes the file.
    }

    // A fresh session still reads the whole partition.
    let rows: Vec<Row> = source.open(&[], &columns).try_collect().await.expect("scan");
    assert_eq!(rows.len(), 100);
}

#[tokio::test]
async fn missing_file_surfaces_as_io_error() {
    let options = HashMap::from([(
        "filename".to_owned(),
        "/nonexistent/partition.msg".to_owned(),
    )]);
    let source = PartitionSource::configure(&options).expect("configure");

    let result: Result<Vec<Row>, _> = source
        .open(&[], &common::scan_columns())
        .try_collect()
        .await;
    assert!(matches!(result, Err(Error::Io(_))));
}
