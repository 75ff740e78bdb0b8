use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use thiserror::Error;

use super::model::{Dataset, Dimension, Measure, Record};

/// Columns every input file must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "curso",
    "cidade",
    "tipo_curso",
    "turno",
    "modalidade",
    "vagas",
    "inscricoes",
];

/// Structural problems in an input file.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("row {row}: '{column}' is empty")]
    EmptyField { row: usize, column: &'static str },
    #[error("row {row}: '{column}' must be a non-negative integer, got {value}")]
    InvalidCount {
        row: usize,
        column: &'static str,
        value: f64,
    },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the admission table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the column names of [`REQUIRED_COLUMNS`]
///   plus optional `candidatos_por_vaga` / `taxa_ocupacao`
/// * `.json`    – `[{ "curso": "...", "vagas": 40, ... }, ...]`
/// * `.parquet` – same columns, any numeric/string physical type
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => read_csv(File::open(path).context("opening CSV")?),
        "json" => read_json(File::open(path).context("opening JSON")?),
        "parquet" | "pq" => read_parquet(File::open(path).context("opening parquet file")?),
        other => Err(SchemaError::UnsupportedExtension(other.to_string()).into()),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    if dataset.is_empty() {
        log::warn!("{} has a header but no rows", path.display());
    }

    log::info!(
        "Loaded {} offerings from {} ({} courses, {} cities)",
        dataset.len(),
        path.display(),
        dataset.distinct_count(Dimension::Curso),
        dataset.distinct_count(Dimension::Cidade),
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Row conversion shared by every format
// ---------------------------------------------------------------------------

/// One row as it appears in the file. Counts are read as floats so that
/// files written with a float dtype still load; they are validated below.
#[derive(Debug, Deserialize)]
struct RawRecord {
    curso: String,
    cidade: String,
    tipo_curso: String,
    turno: String,
    modalidade: String,
    vagas: f64,
    inscricoes: f64,
    #[serde(default)]
    candidatos_por_vaga: Option<f64>,
    #[serde(default)]
    taxa_ocupacao: Option<f64>,
}

#[derive(Default)]
struct DerivedCounter {
    candidatos_por_vaga: usize,
    taxa_ocupacao: usize,
}

impl DerivedCounter {
    fn report(&self) {
        for (measure, n) in [
            (Measure::CandidatosPorVaga, self.candidatos_por_vaga),
            (Measure::TaxaOcupacao, self.taxa_ocupacao),
        ] {
            if n > 0 {
                log::warn!("{n} rows had no usable '{}'; derived from counts", measure.column_name());
            }
        }
    }
}

fn to_count(value: f64, row: usize, column: &'static str) -> Result<u32, SchemaError> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
        return Err(SchemaError::InvalidCount { row, column, value });
    }
    Ok(value as u32)
}

fn require_text(value: &str, row: usize, column: &'static str) -> Result<(), SchemaError> {
    if value.trim().is_empty() {
        return Err(SchemaError::EmptyField { row, column });
    }
    Ok(())
}

/// A ratio read from the file is kept only when it is finite and
/// non-negative. `-0.0` is stored as `0.0` so ties sort in dataset order.
fn usable_ratio(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0).map(f64::abs)
}

impl RawRecord {
    /// `row` is the 1-based data row, header excluded.
    fn into_record(self, row: usize, derived: &mut DerivedCounter) -> Result<Record, SchemaError> {
        require_text(&self.curso, row, "curso")?;
        require_text(&self.cidade, row, "cidade")?;
        require_text(&self.tipo_curso, row, "tipo_curso")?;
        require_text(&self.turno, row, "turno")?;
        require_text(&self.modalidade, row, "modalidade")?;
        let vagas = to_count(self.vagas, row, "vagas")?;
        let inscricoes = to_count(self.inscricoes, row, "inscricoes")?;

        let mut record = Record::new(
            self.curso,
            self.cidade,
            self.tipo_curso,
            self.turno,
            self.modalidade,
            vagas,
            inscricoes,
        );
        match usable_ratio(self.candidatos_por_vaga) {
            Some(v) => record.candidatos_por_vaga = v,
            None => derived.candidatos_por_vaga += 1,
        }
        match usable_ratio(self.taxa_ocupacao) {
            Some(v) => record.taxa_ocupacao = v,
            None => derived.taxa_ocupacao += 1,
        }
        Ok(record)
    }
}

fn check_columns<'h>(headers: impl IntoIterator<Item = &'h str>) -> Result<(), SchemaError> {
    let headers: Vec<&str> = headers.into_iter().collect();
    match REQUIRED_COLUMNS.iter().find(|c| !headers.contains(*c)) {
        Some(missing) => Err(SchemaError::MissingColumn(missing.to_string())),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one offering per row.
/// Extra columns are ignored.
pub fn read_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers().context("reading CSV headers")?.clone();
    check_columns(headers.iter())?;

    let mut derived = DerivedCounter::default();
    let mut records = Vec::new();

    for (idx, result) in reader.deserialize::<RawRecord>().enumerate() {
        let row_no = idx + 1;
        let raw = result.with_context(|| format!("CSV row {row_no}"))?;
        records.push(raw.into_record(row_no, &mut derived)?);
    }

    derived.report();
    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the layout of `df.to_json(orient='records')`.
pub fn read_json<R: Read>(input: R) -> Result<Dataset> {
    let rows: Vec<RawRecord> = serde_json::from_reader(input).context("parsing JSON")?;

    let mut derived = DerivedCounter::default();
    let records = rows
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| raw.into_record(idx + 1, &mut derived))
        .collect::<Result<Vec<_>, _>>()?;

    derived.report();
    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Parquet file with the CSV column names. Columns are cast to Utf8 /
/// Float64 first, so files written by Pandas and Polars both work.
pub fn read_parquet(file: File) -> Result<Dataset> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    {
        let schema = builder.schema();
        check_columns(schema.fields().iter().map(|f| f.name().as_str()))?;
    }
    let reader = builder.build().context("building parquet reader")?;

    let mut derived = DerivedCounter::default();
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let first_row = records.len() + 1;
        for raw in batch_rows(&batch).with_context(|| format!("parquet batch at row {first_row}"))? {
            let row_no = records.len() + 1;
            records.push(raw.into_record(row_no, &mut derived)?);
        }
    }

    derived.report();
    Ok(Dataset::from_records(records))
}

fn column(batch: &RecordBatch, name: &str, to: &DataType) -> Result<Option<ArrayRef>> {
    let Ok(idx) = batch.schema().index_of(name) else {
        return Ok(None);
    };
    let array = cast(batch.column(idx), to).with_context(|| format!("casting '{name}' to {to:?}"))?;
    Ok(Some(array))
}

fn required(batch: &RecordBatch, name: &str, to: &DataType) -> Result<ArrayRef> {
    column(batch, name, to)?.ok_or_else(|| SchemaError::MissingColumn(name.to_string()).into())
}

/// Convert one Arrow batch into raw rows. Nulls become empty text or NaN,
/// which row validation then rejects or replaces.
fn batch_rows(batch: &RecordBatch) -> Result<Vec<RawRecord>> {
    let text: Vec<ArrayRef> = ["curso", "cidade", "tipo_curso", "turno", "modalidade"]
        .iter()
        .map(|name| required(batch, name, &DataType::Utf8))
        .collect::<Result<_>>()?;
    let counts: Vec<ArrayRef> = ["vagas", "inscricoes"]
        .iter()
        .map(|name| required(batch, name, &DataType::Float64))
        .collect::<Result<_>>()?;
    let ratio = column(batch, Measure::CandidatosPorVaga.column_name(), &DataType::Float64)?;
    let occupancy = column(batch, Measure::TaxaOcupacao.column_name(), &DataType::Float64)?;

    let text_at = |col: usize, row: usize| -> String {
        let array = text[col].as_string::<i32>();
        if array.is_null(row) {
            String::new()
        } else {
            array.value(row).to_string()
        }
    };
    let float_at = |array: &ArrayRef, row: usize| -> f64 {
        let values = array.as_primitive::<Float64Type>();
        if values.is_null(row) {
            f64::NAN
        } else {
            values.value(row)
        }
    };

    Ok((0..batch.num_rows())
        .map(|row| RawRecord {
            curso: text_at(0, row),
            cidade: text_at(1, row),
            tipo_curso: text_at(2, row),
            turno: text_at(3, row),
            modalidade: text_at(4, row),
            vagas: float_at(&counts[0], row),
            inscricoes: float_at(&counts[1], row),
            candidatos_por_vaga: ratio.as_ref().map(|a| float_at(a, row)),
            taxa_ocupacao: occupancy.as_ref().map(|a| float_at(a, row)),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    const CSV: &str = "\
curso,cidade,tipo_curso,turno,modalidade,vagas,inscricoes,candidatos_por_vaga,taxa_ocupacao
Sistemas de Informação,Goiânia,Bacharelado,Noturno,Presencial,40,120,3.0,100.0
Pedagogia,Anápolis,Licenciatura,Matutino,Presencial,30,15,,
Sistemas de Informação,Anápolis,Bacharelado,Noturno,Presencial,20,0,0.0,0.0
";

    #[test]
    fn csv_loads_and_fills_missing_ratios() {
        let ds = read_csv(CSV.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);
        let pedagogia = &ds.records()[1];
        assert_eq!(pedagogia.candidatos_por_vaga, 0.5);
        assert_eq!(pedagogia.taxa_ocupacao, 50.0);
        assert_eq!(ds.records()[0].candidatos_por_vaga, 3.0);
    }

    #[test]
    fn csv_without_ratio_columns_derives_them() {
        let csv = "curso,cidade,tipo_curso,turno,modalidade,vagas,inscricoes,extra\n\
                   Física,Formosa,Licenciatura,Noturno,Presencial,0,4,x\n";
        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.records()[0].candidatos_por_vaga, 0.0);
        assert_eq!(ds.records()[0].inscricoes, 4);
    }

    #[test]
    fn csv_missing_column_is_schema_error() {
        let csv = "curso,cidade,tipo_curso,turno,vagas,inscricoes\nA,B,C,D,1,2\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::MissingColumn(c)) if c == "modalidade"
        ));
    }

    #[test]
    fn negative_count_is_rejected() {
        let csv = "curso,cidade,tipo_curso,turno,modalidade,vagas,inscricoes\nA,B,C,D,E,-1,2\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::InvalidCount { column: "vagas", .. })
        ));
    }

    #[test]
    fn empty_course_is_rejected() {
        let csv = "curso,cidade,tipo_curso,turno,modalidade,vagas,inscricoes\n,B,C,D,E,1,2\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::EmptyField { row: 1, column: "curso" })
        ));
    }

    #[test]
    fn float_encoded_counts_are_accepted() {
        let csv = "curso,cidade,tipo_curso,turno,modalidade,vagas,inscricoes\nA,B,C,D,E,40.0,10.0\n";
        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.records()[0].vagas, 40);
    }

    #[test]
    fn json_records_load() {
        let json = r#"[
            {"curso": "Pedagogia", "cidade": "Anápolis", "tipo_curso": "Licenciatura",
             "turno": "Matutino", "modalidade": "Presencial", "vagas": 30, "inscricoes": 15}
        ]"#;
        let ds = read_json(json.as_bytes()).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].candidatos_por_vaga, 0.5);
    }

    #[test]
    fn unsupported_extension_fails() {
        let err = load_file(Path::new("dados.xlsx")).unwrap_err();
        assert!(format!("{err:#}").contains("unsupported file extension"));
    }

    #[test]
    fn missing_file_fails() {
        assert!(load_file(Path::new("/nonexistent/dados.csv")).is_err());
    }

    #[test]
    fn parquet_with_integer_counts_loads() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("curso", DataType::Utf8, false),
            Field::new("cidade", DataType::Utf8, false),
            Field::new("tipo_curso", DataType::Utf8, false),
            Field::new("turno", DataType::Utf8, false),
            Field::new("modalidade", DataType::Utf8, false),
            Field::new("vagas", DataType::Int64, false),
            Field::new("inscricoes", DataType::Int64, false),
            Field::new("candidatos_por_vaga", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Sistemas de Informação", "Pedagogia"])),
                Arc::new(StringArray::from(vec!["Goiânia", "Anápolis"])),
                Arc::new(StringArray::from(vec!["Bacharelado", "Licenciatura"])),
                Arc::new(StringArray::from(vec!["Noturno", "Matutino"])),
                Arc::new(StringArray::from(vec!["Presencial", "Presencial"])),
                Arc::new(Int64Array::from(vec![40, 30])),
                Arc::new(Int64Array::from(vec![120, 15])),
                Arc::new(Float64Array::from(vec![Some(3.0), None])),
            ],
        )
        .unwrap();

        let path = std::env::temp_dir().join(format!("vestibular-loader-{}.parquet", std::process::id()));
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].inscricoes, 120);
        assert_eq!(ds.records()[1].candidatos_por_vaga, 0.5);
        assert_eq!(ds.records()[1].taxa_ocupacao, 50.0);
    }

    #[test]
    fn empty_category_fields_are_rejected() {
        for (line, column) in [
            ("A,B,,D,E,1,2", "tipo_curso"),
            ("A,B,C,,E,1,2", "turno"),
            ("A,B,C,D, ,1,2", "modalidade"),
        ] {
            let csv = format!("curso,cidade,tipo_curso,turno,modalidade,vagas,inscricoes\nA,B,C,D,E,1,2\n{line}\n");
            let err = read_csv(csv.as_bytes()).unwrap_err();
            match err.downcast_ref::<SchemaError>() {
                Some(SchemaError::EmptyField { row, column: c }) => {
                    assert_eq!(*row, 2);
                    assert_eq!(*c, column);
                }
                other => panic!("expected empty {column}, got {other:?}"),
            }
        }
    }

    #[test]
    fn negative_ratios_are_rederived() {
        let csv = "curso,cidade,tipo_curso,turno,modalidade,vagas,inscricoes,candidatos_por_vaga,taxa_ocupacao\n\
                   A,X,T,N,P,10,5,-3.0,-1.0\n";
        let ds = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(ds.records()[0].candidatos_por_vaga, 0.5);
        assert_eq!(ds.records()[0].taxa_ocupacao, 50.0);
    }

    #[test]
    fn negative_zero_ratio_ties_keep_dataset_order() {
        use crate::data::filter::Selection;
        use crate::data::rank::{top_n, Direction};

        let csv = "curso,cidade,tipo_curso,turno,modalidade,vagas,inscricoes,candidatos_por_vaga\n\
                   A,X,T,N,P,10,0,0.0\n\
                   B,X,T,N,P,10,0,-0.0\n";
        let ds = read_csv(csv.as_bytes()).unwrap();
        let b = ds.records()[1].candidatos_por_vaga;
        assert!(b == 0.0 && b.is_sign_positive());

        let order: Vec<&str> = top_n(&Selection::all(&ds), Measure::CandidatosPorVaga, 2, Direction::Smallest)
            .iter()
            .map(|r| r.curso.as_str())
            .collect();
        assert_eq!(order, vec!["A", "B"]);
    }

    #[test]
    fn error_rows_are_one_based() {
        let csv = "curso,cidade,tipo_curso,turno,modalidade,vagas,inscricoes\nA,B,C,D,E,1,2\nA,B,C,D,E,1.5,2\n";
        let err = read_csv(csv.as_bytes()).unwrap_err();
        assert!(format!("{err}").starts_with("row 2:"));
    }
}
