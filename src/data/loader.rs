use crate::data::matrix::{PriceMatrix, RawMatrix};
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use indexmap::IndexMap;
use std::path::Path;

//reads a wide date-indexed csv: first column "date", one column per
//instrument, empty cells for nulls
fn read_wide_csv<P: AsRef<Path>>(
    path: P,
) -> Result<(Vec<NaiveDate>, IndexMap<String, Vec<Option<f64>>>)> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let headers = reader
        .headers()
        .context(format!("Failed to read CSV headers from {:?}", path))?
        .clone();

    if headers.is_empty() {
        bail!("CSV file {:?} has no columns", path);
    }

    let instruments: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    let mut dates = Vec::new();
    let mut columns: IndexMap<String, Vec<Option<f64>>> = instruments
        .iter()
        .map(|code| (code.clone(), Vec::new()))
        .collect();

    for (index, result) in reader.records().enumerate() {
        let record = result.context(format!(
            "Failed to parse CSV record at line {} in {:?}",
            index + 2,
            path
        ))?;

        let date_field = record
            .get(0)
            .context(format!("Missing date at line {}", index + 2))?;
        let date = NaiveDate::parse_from_str(date_field, "%Y-%m-%d").context(format!(
            "Failed to parse date '{}' at line {}",
            date_field,
            index + 2
        ))?;
        dates.push(date);

        for (col, (code, cells)) in columns.iter_mut().enumerate() {
            let field = record.get(col + 1).unwrap_or("").trim();
            let cell = if field.is_empty() {
                None
            } else {
                Some(field.parse::<f64>().context(format!(
                    "Failed to parse value '{}' for '{}' at line {}",
                    field,
                    code,
                    index + 2
                ))?)
            };
            cells.push(cell);
        }
    }

    Ok((dates, columns))
}

//loads a closing-price matrix from a wide csv file
pub fn load_price_csv<P: AsRef<Path>>(path: P) -> Result<PriceMatrix> {
    let path = path.as_ref();
    let (dates, columns) = read_wide_csv(path)?;
    let prices = PriceMatrix::new(dates, columns)
        .context(format!("Invalid price matrix in {:?}", path))?;
    Ok(prices)
}

//loads a raw event-value matrix from a wide csv file
pub fn load_raw_csv<P: AsRef<Path>>(path: P) -> Result<RawMatrix> {
    let path = path.as_ref();
    let (dates, columns) = read_wide_csv(path)?;
    let raw =
        RawMatrix::new(dates, columns).context(format!("Invalid event matrix in {:?}", path))?;
    Ok(raw)
}

//loads a benchmark per-period return series from a two-column csv
//(date,return), ascending by date
pub fn load_benchmark_csv<P: AsRef<Path>>(path: P) -> Result<Vec<(NaiveDate, f64)>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .context(format!("Failed to open CSV file: {:?}", path))?;

    let mut series = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let record = result.context(format!(
            "Failed to parse CSV record at line {} in {:?}",
            index + 2,
            path
        ))?;

        let date_field = record
            .get(0)
            .context(format!("Missing date at line {}", index + 2))?;
        let date = NaiveDate::parse_from_str(date_field, "%Y-%m-%d").context(format!(
            "Failed to parse date '{}' at line {}",
            date_field,
            index + 2
        ))?;

        let ret_field = record
            .get(1)
            .context(format!("Missing return at line {}", index + 2))?;
        let ret: f64 = ret_field.trim().parse().context(format!(
            "Failed to parse return '{}' at line {}",
            ret_field,
            index + 2
        ))?;

        if let Some((prev, _)) = series.last() {
            if date <= *prev {
                bail!(
                    "Benchmark dates not strictly increasing at line {}: {} followed by {}",
                    index + 2,
                    prev,
                    date
                );
            }
        }

        series.push((date, ret));
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_wide_price_csv_with_gaps() {
        let file = write_csv("date,2330,2317\n2024-01-02,100.0,\n2024-01-03,110.0,95.5\n");
        let prices = load_price_csv(file.path()).unwrap();

        let d2: NaiveDate = "2024-01-02".parse().unwrap();
        let d3: NaiveDate = "2024-01-03".parse().unwrap();
        assert_eq!(prices.dates(), &[d2, d3]);
        assert_eq!(prices.price_on(d2, "2330"), Some(100.0));
        assert_eq!(prices.price_on(d2, "2317"), None);
        assert_eq!(prices.price_on(d3, "2317"), Some(95.5));
    }

    #[test]
    fn rejects_unsorted_price_csv() {
        let file = write_csv("date,2330\n2024-01-03,100.0\n2024-01-02,99.0\n");
        assert!(load_price_csv(file.path()).is_err());
    }

    #[test]
    fn rejects_unparseable_cell() {
        let file = write_csv("date,2330\n2024-01-02,abc\n");
        assert!(load_raw_csv(file.path()).is_err());
    }

    #[test]
    fn loads_benchmark_series() {
        let file = write_csv("date,return\n2024-01-02,0.01\n2024-01-03,-0.005\n");
        let series = load_benchmark_csv(file.path()).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].1, 0.01);
        assert_eq!(series[1].1, -0.005);
    }

    #[test]
    fn rejects_unsorted_benchmark() {
        let file = write_csv("date,return\n2024-01-03,0.01\n2024-01-02,0.02\n");
        assert!(load_benchmark_csv(file.path()).is_err());
    }
}
