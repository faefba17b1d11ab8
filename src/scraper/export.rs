use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use log::info;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::config::ScraperConfig;
use crate::schema::{AssetRow, Dataset};

/// Writes both export formats to their configured destinations.
pub fn export_all(dataset: &Dataset, cfg: &ScraperConfig) -> Result<()> {
    export_csv(dataset, Path::new(&cfg.csv_path))?;
    export_parquet(dataset, Path::new(&cfg.parquet_dir))?;
    Ok(())
}

/// Semicolon-delimited CSV, UTF-8 with byte-order mark.
///
/// The BOM keeps accented company names intact when the file is
/// opened in spreadsheet tools. Headers come from the row's serde
/// column names.
pub fn export_csv(dataset: &Dataset, path: &Path) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    file.write_all(b"\xEF\xBB\xBF")?;

    let mut writer = csv::WriterBuilder::new().delimiter(b';').from_writer(file);
    for row in dataset.rows() {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!("wrote {} rows to {}", dataset.len(), path.display());
    Ok(())
}

/// Columnar export, hive-partitioned by capture date:
///
/// ```text
/// <dir>/ano=Y/mes=M/dia=D/dados-0.parquet
/// ```
///
/// Partition columns are encoded in the directory names and excluded
/// from the file body. One snappy-compressed file per partition; a
/// normal run has a single capture date and thus a single partition.
pub fn export_parquet(dataset: &Dataset, dir: &Path) -> Result<()> {
    let mut partitions: BTreeMap<(i32, u32, u32), Vec<&AssetRow>> = BTreeMap::new();
    for row in dataset.rows() {
        partitions
            .entry((row.year, row.month, row.day))
            .or_default()
            .push(row);
    }

    for ((year, month, day), rows) in partitions {
        let part_dir = dir
            .join(format!("ano={year}"))
            .join(format!("mes={month}"))
            .join(format!("dia={day}"));
        fs::create_dir_all(&part_dir)
            .with_context(|| format!("creating {}", part_dir.display()))?;

        let batch = partition_batch(&rows)?;
        let out = part_dir.join("dados-0.parquet");
        let file = File::create(&out).with_context(|| format!("creating {}", out.display()))?;

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))?;
        writer.write(&batch)?;
        writer.close()?;

        info!("wrote {} rows to {}", rows.len(), out.display());
    }

    Ok(())
}

fn partition_batch(rows: &[&AssetRow]) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("codigo", DataType::Utf8, false),
        Field::new("acao", DataType::Utf8, false),
        Field::new("tipo", DataType::Utf8, false),
        Field::new("qtde_teorica", DataType::UInt64, false),
        Field::new("participacao_percentual", DataType::Float64, false),
    ]));

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.code.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.name.as_str()),
        )),
        Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.asset_type.as_str()),
        )),
        Arc::new(UInt64Array::from_iter_values(
            rows.iter().map(|r| r.theoretical_qty),
        )),
        Arc::new(Float64Array::from_iter_values(
            rows.iter().map(|r| r.participation_pct),
        )),
    ];

    RecordBatch::try_new(schema, arrays).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    fn sample_dataset() -> Dataset {
        let mut ds = Dataset::new();
        ds.push_page(vec![
            AssetRow {
                code: "PETR4".to_string(),
                name: "PETROBRAS".to_string(),
                asset_type: "PN".to_string(),
                theoretical_qty: 4_602_905_437,
                participation_pct: 6.837,
                year: 2026,
                month: 8,
                day: 28,
            },
            AssetRow {
                code: "VALE3".to_string(),
                name: "VALE".to_string(),
                asset_type: "ON".to_string(),
                theoretical_qty: 4_539_007_580,
                participation_pct: 10.771,
                year: 2026,
                month: 8,
                day: 28,
            },
        ]);
        ds
    }

    #[test]
    fn csv_export_has_bom_semicolons_and_upstream_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        export_csv(&sample_dataset(), &path).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], b"\xEF\xBB\xBF");

        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "codigo;acao;tipo;qtde_teorica;participacao_percentual;ano;mes;dia"
        );
        assert_eq!(lines.clone().count(), 2);
        assert!(lines.next().unwrap().starts_with("PETR4;PETROBRAS;PN;"));
    }

    #[test]
    fn parquet_export_partitions_by_capture_date() {
        let dir = tempfile::tempdir().unwrap();

        export_parquet(&sample_dataset(), dir.path()).unwrap();

        let out = dir
            .path()
            .join("ano=2026")
            .join("mes=8")
            .join("dia=28")
            .join("dados-0.parquet");
        assert!(out.exists());

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&out).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let total: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn empty_dataset_writes_header_only_csv_and_no_partitions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        export_csv(&Dataset::new(), &path).unwrap();
        export_parquet(&Dataset::new(), &dir.path().join("pq")).unwrap();

        let bytes = fs::read(&path).unwrap();
        // BOM only: serde-based headers are emitted on first row.
        assert_eq!(bytes.len(), 3);
        assert!(!dir.path().join("pq").exists());
    }
}
