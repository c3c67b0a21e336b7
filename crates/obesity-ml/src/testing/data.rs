use ndarray::{Array1, Array2};
use rand::prelude::*;

use crate::data::schema::TARGET_COLUMN;
use crate::data::{Column, ColumnValues, RawTable};

/// Typical BMI per target class, lightest first.
const CLASS_BMI: [(&str, f64); 7] = [
    ("Insufficient_Weight", 17.0),
    ("Normal_Weight", 22.0),
    ("Overweight_Level_I", 26.0),
    ("Overweight_Level_II", 28.5),
    ("Obesity_Type_I", 32.5),
    ("Obesity_Type_II", 37.0),
    ("Obesity_Type_III", 43.0),
];

const CAEC: [&str; 4] = ["no", "Sometimes", "Frequently", "Always"];
const CALC: [&str; 3] = ["no", "Sometimes", "Frequently"];
const MTRANS: [&str; 5] = ["Public_Transportation", "Walking", "Automobile", "Motorbike", "Bike"];

fn uniform(rng: &mut StdRng, min: f64, max: f64) -> f64 {
    min + rng.gen::<f64>() * (max - min)
}

fn pick(rng: &mut StdRng, choices: &[&str]) -> Option<String> {
    choices.choose(rng).map(|s| s.to_string())
}

fn yes_no(rng: &mut StdRng, p_yes: f64) -> Option<String> {
    Some(if rng.gen_bool(p_yes) { "yes" } else { "no" }.to_string())
}

/// Generate a raw dataset with every column of the obesity survey.
///
/// Rows cycle through the seven target classes, so every class is present
/// when `n_rows >= 14`. Weight follows the class's typical BMI, which makes
/// the target learnable. A handful of extreme ages and weights trigger
/// outlier capping, and every 50th row has a missing `FCVC` and `CAEC`.
pub fn synthetic_table(n_rows: usize, seed: u64) -> RawTable {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut gender = Vec::with_capacity(n_rows);
    let mut age = Vec::with_capacity(n_rows);
    let mut height = Vec::with_capacity(n_rows);
    let mut weight = Vec::with_capacity(n_rows);
    let mut family = Vec::with_capacity(n_rows);
    let mut favc = Vec::with_capacity(n_rows);
    let mut fcvc = Vec::with_capacity(n_rows);
    let mut ncp = Vec::with_capacity(n_rows);
    let mut caec = Vec::with_capacity(n_rows);
    let mut smoke = Vec::with_capacity(n_rows);
    let mut ch2o = Vec::with_capacity(n_rows);
    let mut scc = Vec::with_capacity(n_rows);
    let mut faf = Vec::with_capacity(n_rows);
    let mut tue = Vec::with_capacity(n_rows);
    let mut calc = Vec::with_capacity(n_rows);
    let mut mtrans = Vec::with_capacity(n_rows);
    let mut target = Vec::with_capacity(n_rows);

    for row in 0..n_rows {
        let class = row % CLASS_BMI.len();
        let (label, class_bmi) = CLASS_BMI[class];
        let heaviness = class as f64 / (CLASS_BMI.len() - 1) as f64;

        let male = rng.gen_bool(0.5);
        let h = if male { uniform(&mut rng, 1.65, 1.90) } else { uniform(&mut rng, 1.50, 1.75) };
        let mut w = (class_bmi + uniform(&mut rng, -1.0, 1.0)) * h * h;
        let mut a = uniform(&mut rng, 18.0, 45.0).round();
        if row % 97 == 13 {
            a = 80.0 + uniform(&mut rng, 0.0, 10.0).round();
            w *= 1.6;
        }

        gender.push(Some(if male { "Male" } else { "Female" }.to_string()));
        age.push(a);
        height.push(h);
        weight.push(w);
        family.push(yes_no(&mut rng, 0.2 + 0.7 * heaviness));
        favc.push(yes_no(&mut rng, 0.5 + 0.4 * heaviness));
        fcvc.push(if row % 50 == 7 { f64::NAN } else { uniform(&mut rng, 1.0, 3.0) });
        ncp.push(uniform(&mut rng, 1.0, 4.0).round());
        caec.push(if row % 50 == 7 { None } else { pick(&mut rng, &CAEC) });
        smoke.push(yes_no(&mut rng, 0.05));
        ch2o.push(uniform(&mut rng, 1.0, 3.0));
        scc.push(yes_no(&mut rng, 0.1 * (1.0 - heaviness)));
        faf.push(uniform(&mut rng, 0.0, 3.0 * (1.0 - 0.6 * heaviness)));
        tue.push(uniform(&mut rng, 0.0, 2.0));
        calc.push(pick(&mut rng, &CALC));
        mtrans.push(pick(&mut rng, &MTRANS));
        target.push(Some(label.to_string()));
    }

    let columns = vec![
        Column::text("Gender", gender),
        Column::numeric("Age", age),
        Column::numeric("Height", height),
        Column::numeric("Weight", weight),
        Column::text("family_history_with_overweight", family),
        Column::text("FAVC", favc),
        Column::numeric("FCVC", fcvc),
        Column::numeric("NCP", ncp),
        Column::text("CAEC", caec),
        Column::text("SMOKE", smoke),
        Column::numeric("CH2O", ch2o),
        Column::text("SCC", scc),
        Column::numeric("FAF", faf),
        Column::numeric("TUE", tue),
        Column::text("CALC", calc),
        Column::text("MTRANS", mtrans),
        Column::text(TARGET_COLUMN, target),
    ];
    RawTable::from_columns(columns).unwrap_or_default()
}

/// Render a table as CSV text with a header row. Missing cells are empty.
pub fn to_csv(table: &RawTable) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let header: Vec<&str> = table.column_names().collect();
    writer.write_record(&header).unwrap_or_default();
    for row in 0..table.n_rows() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|column| match &column.values {
                ColumnValues::Numeric(v) if v[row].is_nan() => String::new(),
                ColumnValues::Numeric(v) => v[row].to_string(),
                ColumnValues::Text(v) => v[row].clone().unwrap_or_default(),
            })
            .collect();
        writer.write_record(&record).unwrap_or_default();
    }
    writer
        .into_inner()
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_default()
}

/// Well-separated Gaussian-like clusters, one per class.
///
/// Class `k` is centred at `4k` on every feature with noise in `[-1, 1]`.
/// Rows cycle through classes so each one is present when
/// `n_rows >= n_classes`.
pub fn blobs(n_rows: usize, n_classes: usize, n_features: usize, seed: u64) -> (Array2<f64>, Array1<usize>) {
    assert!(n_classes > 0 && n_features > 0);
    let mut rng = StdRng::seed_from_u64(seed);
    let labels = Array1::from_shape_fn(n_rows, |row| row % n_classes);
    let features = Array2::from_shape_fn((n_rows, n_features), |(row, _)| {
        let centre = 4.0 * labels[row] as f64;
        let noise: f64 = (0..3).map(|_| rng.gen::<f64>() * 2.0 - 1.0).sum::<f64>() / 3.0;
        centre + noise
    });
    (features, labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_table_is_deterministic() {
        assert_eq!(synthetic_table(50, 1), synthetic_table(50, 1));
        assert_ne!(synthetic_table(50, 1), synthetic_table(50, 2));
    }

    #[test]
    fn csv_round_trips_through_loader() {
        let table = synthetic_table(60, 4);
        let loaded = RawTable::from_csv_reader(to_csv(&table).as_bytes()).unwrap();
        assert_eq!(loaded.n_rows(), 60);
        assert_eq!(loaded.n_columns(), 17);
        assert_eq!(loaded.column("CAEC").unwrap().values.n_missing(), 2);
    }

    #[test]
    fn blobs_cover_every_class() {
        let (x, y) = blobs(20, 4, 2, 0);
        assert_eq!(x.dim(), (20, 2));
        assert!((0..4).all(|k| y.iter().any(|&l| l == k)));
    }
}
