use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Uniform Likert response in 1..=7.
    fn likert(&mut self) -> i64 {
        (self.next_u64() % 7) as i64 + 1
    }
}

fn to_likert(v: f64) -> i64 {
    (v.round() as i64).clamp(1, 7)
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let constructs: [(&str, &[&str]); 3] = [
        ("Engagement", &["q1", "q2", "q3", "q4"]),
        ("Satisfaction", &["q5", "q6", "q7"]),
        ("Burnout", &["q8", "q9", "q10", "q11"]),
    ];
    let items: Vec<&str> = constructs.iter().flat_map(|(_, vars)| vars.iter().copied()).collect();

    let n_respondents = 60;
    let mut ids: Vec<String> = Vec::with_capacity(n_respondents);
    let mut responses: Vec<Vec<i64>> = vec![Vec::with_capacity(n_respondents); items.len()];

    for r in 0..n_respondents {
        ids.push(format!("R{:03}", r + 1));

        let row: Vec<i64> = if r % 9 == 8 {
            // careless responder: uniform noise
            (0..items.len()).map(|_| rng.likert()).collect()
        } else if r % 7 == 6 {
            // straight-liner: same answer everywhere
            let v = rng.likert();
            vec![v; items.len()]
        } else {
            constructs
                .iter()
                .flat_map(|(_, vars)| {
                    let trait_level = rng.gauss(4.0, 1.3);
                    vars.iter()
                        .map(|_| to_likert(rng.gauss(trait_level, 0.6)))
                        .collect::<Vec<_>>()
                })
                .collect()
        };

        for (col, v) in row.into_iter().enumerate() {
            responses[col].push(v);
        }
    }

    // CSV
    let csv_path = "sample_responses.csv";
    let mut writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    let header: Vec<&str> = std::iter::once("respondent").chain(items.iter().copied()).collect();
    writer.write_record(&header).expect("Failed to write CSV header");
    for (r, id) in ids.iter().enumerate() {
        let record: Vec<String> = std::iter::once(id.clone())
            .chain(responses.iter().map(|col| col[r].to_string()))
            .collect();
        writer.write_record(&record).expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV file");

    // Parquet
    let mut fields = vec![Field::new("respondent", DataType::Utf8, false)];
    fields.extend(items.iter().map(|name| Field::new(*name, DataType::Int64, false)));
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(
        ids.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
    ))];
    columns.extend(
        responses
            .iter()
            .map(|col| Arc::new(Int64Array::from(col.clone())) as ArrayRef),
    );
    let batch = RecordBatch::try_new(schema.clone(), columns).expect("Failed to create RecordBatch");

    let parquet_path = "sample_responses.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    // Config
    let config_path = "constructs.json";
    let mut construct_map = serde_json::Map::new();
    for (name, vars) in &constructs {
        construct_map.insert(name.to_string(), json!(vars.join(", ")));
    }
    let config = json!({
        "value_range": { "min": 1, "max": 7 },
        "constructs": construct_map,
    });
    let text = serde_json::to_string_pretty(&config).expect("Failed to serialize config");
    std::fs::write(config_path, text).expect("Failed to write config");

    println!(
        "Wrote {n_respondents} respondents ({} items) to {csv_path} and {parquet_path}, constructs to {config_path}",
        items.len()
    );
}
