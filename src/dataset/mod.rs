//! CSV loading and writing.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use flate2::read::GzDecoder;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::models::Row;

pub const STREET_COLUMN: &str = "street";
pub const NEIGHBORHOOD_COLUMN: &str = "neighborhood";

/// Which columns carry coordinates, and how cells are separated
#[derive(Debug, Clone)]
pub struct DatasetLayout {
    pub latitude_column: String,
    pub longitude_column: String,
    pub delimiter: u8,
}

impl Default for DatasetLayout {
    fn default() -> Self {
        Self {
            latitude_column: "latitude".to_string(),
            longitude_column: "longitude".to_string(),
            delimiter: b',',
        }
    }
}

/// Loaded rows plus the header they were read with
#[derive(Debug, Clone)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub latitude_idx: usize,
    pub longitude_idx: usize,
    pub rows: Vec<Row>,
    /// Set once lookup results have been merged; adds the street/neighborhood columns
    pub enriched: bool,
}

impl Dataset {
    /// Read a CSV file, transparently un-gzipping `.gz` paths
    pub fn load(path: &Path, layout: &DatasetLayout) -> Result<Self> {
        if !path.exists() {
            return Err(PipelineError::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        info!("Loading dataset from {}", path.display());

        let file = File::open(path)?;
        let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(layout.delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let latitude_idx = find_column(&headers, &layout.latitude_column, path)?;
        let longitude_idx = find_column(&headers, &layout.longitude_column, path)?;

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(Row::new(record.iter().map(String::from).collect()));
        }

        info!("Loaded {} rows", rows.len());
        Ok(Self {
            headers,
            latitude_idx,
            longitude_idx,
            rows,
            enriched: false,
        })
    }

    /// True once lookup results have been merged, even into zero rows
    pub fn is_enriched(&self) -> bool {
        self.enriched
    }

    /// Header row as it will be written
    pub fn output_headers(&self) -> Vec<String> {
        let mut headers = self.headers.clone();
        if self.is_enriched() {
            headers.push(STREET_COLUMN.to_string());
            headers.push(NEIGHBORHOOD_COLUMN.to_string());
        }
        headers
    }

    /// One output record: source cells with repaired coordinates, then the lookup columns
    pub fn output_record(&self, row: &Row) -> Vec<String> {
        let mut record: Vec<String> = (0..self.headers.len().max(row.fields.len()))
            .map(|i| row.raw(i).to_string())
            .collect();
        record[self.latitude_idx] = format_coordinate(row.latitude);
        record[self.longitude_idx] = format_coordinate(row.longitude);

        if self.is_enriched() {
            match &row.lookup {
                Some(lookup) => {
                    record.push(lookup.street.clone());
                    record.push(lookup.neighborhood.clone());
                }
                None => {
                    record.push(String::new());
                    record.push(String::new());
                }
            }
        }
        record
    }

    pub fn write(&self, path: &Path, delimiter: u8) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_path(path)?;

        writer.write_record(self.output_headers())?;
        for row in &self.rows {
            writer.write_record(self.output_record(row))?;
        }
        writer.flush()?;

        info!("Wrote {} rows to {}", self.rows.len(), path.display());
        Ok(())
    }
}

fn find_column(headers: &[String], name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| PipelineError::MissingColumn {
            column: name.to_string(),
            path: PathBuf::from(path),
        })
}

fn format_coordinate(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LookupResult;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_finds_columns_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "in.csv",
            "\u{feff}Nome,Latitude,LONGITUDE\nRua A,2334567,-0466333\nRua B,,\n",
        );

        let dataset = Dataset::load(&path, &DatasetLayout::default()).unwrap();
        assert_eq!(dataset.headers, vec!["Nome", "Latitude", "LONGITUDE"]);
        assert_eq!(dataset.latitude_idx, 1);
        assert_eq!(dataset.longitude_idx, 2);
        assert_eq!(dataset.rows.len(), 2);
        assert_eq!(dataset.rows[0].raw(1), "2334567");
        assert_eq!(dataset.rows[1].raw(2), "");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::load(&dir.path().join("nope.csv"), &DatasetLayout::default())
            .unwrap_err();
        assert!(matches!(err, PipelineError::InputNotFound { .. }));
    }

    #[test]
    fn test_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "in.csv", "name,lat,lon\nA,1,2\n");
        let err = Dataset::load(&path, &DatasetLayout::default()).unwrap_err();
        match err {
            PipelineError::MissingColumn { column, .. } => assert_eq!(column, "latitude"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_semicolon_delimiter_and_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.csv.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder
            .write_all(b"name;latitude;longitude\nRua A;-23,5;-46,6\n")
            .unwrap();
        encoder.finish().unwrap();

        let layout = DatasetLayout {
            delimiter: b';',
            ..DatasetLayout::default()
        };
        let dataset = Dataset::load(&path, &layout).unwrap();
        assert_eq!(dataset.rows.len(), 1);
        assert_eq!(dataset.rows[0].raw(1), "-23,5");
    }

    #[test]
    fn test_write_appends_lookup_columns() {
        let dir = tempfile::tempdir().unwrap();
        let mut dataset = Dataset {
            headers: vec!["name".into(), "latitude".into(), "longitude".into()],
            latitude_idx: 1,
            longitude_idx: 2,
            rows: vec![Row::new(vec!["A".into(), "235".into(), "-466".into()])],
            enriched: true,
        };
        dataset.rows[0].latitude = Some(23.5);
        dataset.rows[0].longitude = None;
        dataset.rows[0].lookup = Some(LookupResult::new("Rua X", "Bairro Y"));

        let out = dir.path().join("out.csv");
        dataset.write(&out, b',').unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(
            written,
            "name,latitude,longitude,street,neighborhood\nA,23.5,,Rua X,Bairro Y\n"
        );
    }

    #[test]
    fn test_enriched_empty_dataset_still_has_lookup_columns() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = Dataset {
            headers: vec!["name".into(), "latitude".into(), "longitude".into()],
            latitude_idx: 1,
            longitude_idx: 2,
            rows: Vec::new(),
            enriched: true,
        };

        let out = dir.path().join("out.csv");
        dataset.write(&out, b',').unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "name,latitude,longitude,street,neighborhood\n"
        );
    }

    #[test]
    fn test_write_without_lookups_keeps_original_columns() {
        let dir = tempfile::tempdir().unwrap();
        let mut dataset = Dataset {
            headers: vec!["latitude".into(), "longitude".into()],
            latitude_idx: 0,
            longitude_idx: 1,
            rows: vec![Row::new(vec!["235".into(), "-0466".into()])],
            enriched: false,
        };
        dataset.rows[0].latitude = Some(23.5);
        dataset.rows[0].longitude = Some(-46.6);

        let out = dir.path().join("out.csv");
        dataset.write(&out, b',').unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "latitude,longitude\n23.5,-46.6\n"
        );
    }
}
