use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// Same columns as the dashboard's input file.
#[derive(Debug, Serialize)]
struct Offering {
    curso: String,
    cidade: String,
    tipo_curso: String,
    turno: String,
    modalidade: String,
    vagas: i64,
    inscricoes: i64,
    candidatos_por_vaga: f64,
    taxa_ocupacao: f64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Bernoulli trial with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

const COURSES: [(&str, &str, f64); 12] = [
    ("Sistemas de Informação", "Bacharelado", 3.2),
    ("Engenharia Civil", "Bacharelado", 2.4),
    ("Administração", "Bacharelado", 1.8),
    ("Direito", "Bacharelado", 4.1),
    ("Enfermagem", "Bacharelado", 3.6),
    ("Pedagogia", "Licenciatura", 1.2),
    ("Letras - Português/Inglês", "Licenciatura", 0.9),
    ("Matemática", "Licenciatura", 0.6),
    ("Física", "Licenciatura", 0.4),
    ("História", "Licenciatura", 0.8),
    ("Tecnologia em Sistemas para Internet", "Tecnólogo", 1.5),
    ("Tecnologia em Gastronomia", "Tecnólogo", 1.1),
];

const CITIES: [&str; 10] = [
    "Anápolis",
    "Goiânia",
    "Formosa",
    "Itumbiara",
    "Jataí",
    "Luziânia",
    "Morrinhos",
    "Porangatu",
    "Quirinópolis",
    "Uruaçu",
];

const SHIFTS: [&str; 4] = ["Matutino", "Vespertino", "Noturno", "Integral"];
const MODES: [&str; 2] = ["Presencial", "EaD"];
const SEAT_SIZES: [i64; 5] = [20, 30, 40, 50, 60];

fn generate(rng: &mut SimpleRng) -> Vec<Offering> {
    let mut rows = Vec::new();
    for &(curso, tipo, demand) in &COURSES {
        for &cidade in &CITIES {
            // Not every course is offered everywhere.
            if !rng.chance(0.55) {
                continue;
            }
            let turno = *rng.pick(&SHIFTS);
            let modalidade = if rng.chance(0.85) { MODES[0] } else { MODES[1] };
            // A few suspended offerings with no seats.
            let vagas = if rng.chance(0.02) { 0 } else { *rng.pick(&SEAT_SIZES) };
            let inscricoes = if rng.chance(0.08) {
                0
            } else {
                (vagas as f64 * demand * (0.3 + 1.4 * rng.next_f64())).round() as i64
            };

            let (candidatos_por_vaga, taxa_ocupacao) = if vagas == 0 {
                (0.0, 0.0)
            } else {
                (
                    inscricoes as f64 / vagas as f64,
                    inscricoes.min(vagas) as f64 / vagas as f64 * 100.0,
                )
            };

            rows.push(Offering {
                curso: curso.to_string(),
                cidade: cidade.to_string(),
                tipo_curso: tipo.to_string(),
                turno: turno.to_string(),
                modalidade: modalidade.to_string(),
                vagas,
                inscricoes,
                candidatos_por_vaga,
                taxa_ocupacao,
            });
        }
    }
    rows
}

fn write_csv(rows: &[Offering], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[Offering], path: &str) -> Result<()> {
    let text = |f: fn(&Offering) -> &str| StringArray::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("curso", DataType::Utf8, false),
        Field::new("cidade", DataType::Utf8, false),
        Field::new("tipo_curso", DataType::Utf8, false),
        Field::new("turno", DataType::Utf8, false),
        Field::new("modalidade", DataType::Utf8, false),
        Field::new("vagas", DataType::Int64, false),
        Field::new("inscricoes", DataType::Int64, false),
        Field::new("candidatos_por_vaga", DataType::Float64, false),
        Field::new("taxa_ocupacao", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(text(|r| r.curso.as_str())),
            Arc::new(text(|r| r.cidade.as_str())),
            Arc::new(text(|r| r.tipo_curso.as_str())),
            Arc::new(text(|r| r.turno.as_str())),
            Arc::new(text(|r| r.modalidade.as_str())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.vagas).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.inscricoes).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.candidatos_por_vaga).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.taxa_ocupacao).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(2026);
    let rows = generate(&mut rng);

    write_csv(&rows, "amostra_vestibular.csv")?;
    write_parquet(&rows, "amostra_vestibular.parquet")?;

    let total: i64 = rows.iter().map(|r| r.inscricoes).sum();
    println!(
        "Wrote {} offerings ({total} registrations) to amostra_vestibular.csv and amostra_vestibular.parquet",
        rows.len()
    );
    Ok(())
}
