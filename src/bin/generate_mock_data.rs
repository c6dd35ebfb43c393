// Dev utility: write random count records for manual ingestion tests.
//
// Usage:
//   cargo run --bin generate_mock_data -- [output_path] [--business-id N] [--judgement TEXT]
//
// Output is a JSON array accepted by POST /api/countrecords(_counttray).

use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use production_count::domain::count_record::NewCountRecord;
use production_count::domain::types::{DIRECTION_IN, DIRECTION_OUT};
use rand::Rng;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;

const LOT_COUNT: usize = 20;
const FIRST_MACHINE: i64 = 3;
const LAST_MACHINE: i64 = 10;

#[derive(Debug, Default)]
struct Options {
    output: String,
    business_id: Option<i64>,
    judgement: Option<String>,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Options, Box<dyn Error>> {
    let mut options = Options {
        output: "mockup_data.json".to_string(),
        ..Options::default()
    };
    let mut args = args;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--business-id" => {
                let raw = args.next().ok_or("--business-id requires a value")?;
                options.business_id = Some(raw.parse()?);
            }
            "--judgement" => {
                options.judgement = Some(args.next().ok_or("--judgement requires a value")?);
            }
            _ => options.output = arg,
        }
    }
    Ok(options)
}

fn random_timestamp<R: Rng>(
    rng: &mut R,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> NaiveDateTime {
    let span = (end - start).num_seconds().max(0);
    start + Duration::seconds(rng.random_range(0..=span))
}

/// 每个批次在 3..=10 号机台各生成 in/out 两条
fn generate<R: Rng>(rng: &mut R, options: &Options, now: NaiveDateTime) -> Vec<NewCountRecord> {
    let start = NaiveDate::from_ymd_opt(2023, 10, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(now);

    let mut data = Vec::with_capacity(LOT_COUNT * 16);
    for _ in 0..LOT_COUNT {
        let lot_id = format!(
            "Y{}TL.{:02}",
            rng.random_range(10000..=99999),
            rng.random_range(0..=12)
        );
        for machine_id in FIRST_MACHINE..=LAST_MACHINE {
            for direction in [DIRECTION_IN, DIRECTION_OUT] {
                let good: i64 = rng.random_range(5000..=6000);
                let ng: i64 = rng.random_range(0..=30);

                let mut record = NewCountRecord::new(
                    &lot_id,
                    direction,
                    random_timestamp(rng, start, now),
                    machine_id,
                );
                record.assy_input = Some(rng.random_range(18000..=20000));
                record.good_count = Some(good);
                record.ng_count = Some(ng);
                record.ttl = Some(good + ng);
                record.substrate = Some(0);
                record.badmark = Some(0);
                record.business_id = options.business_id;
                record.judgement = options.judgement.clone();
                data.push(record);
            }
        }
    }
    data
}

fn main() -> Result<(), Box<dyn Error>> {
    let options = parse_args(std::env::args().skip(1))?;
    let records = generate(&mut rand::rng(), &options, Local::now().naive_local());

    let writer = BufWriter::new(File::create(&options.output)?);
    serde_json::to_writer_pretty(writer, &records)?;

    println!("Data written to {} ({} records)", options.output, records.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_records_follow_ranges() {
        let options = Options {
            output: "unused.json".to_string(),
            business_id: Some(1),
            judgement: Some("Correct".to_string()),
        };
        let now = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let records = generate(&mut rand::rng(), &options, now);

        assert_eq!(records.len(), 20 * 8 * 2);
        for r in &records {
            assert!(r.check_required().is_ok());
            assert!((3..=10).contains(&r.machine_id));
            assert_eq!(r.ttl, Some(r.good_count.unwrap() + r.ng_count.unwrap()));
            assert!((18000..=20000).contains(&r.assy_input.unwrap()));
            assert!(r.lot_id.starts_with('Y') && r.lot_id.contains("TL."));
            assert!(r.timestamp <= now);
            assert_eq!(r.business_id, Some(1));
        }
    }

    #[test]
    fn test_parse_args() {
        let args = ["out.json", "--business-id", "4", "--judgement", "NG"]
            .into_iter()
            .map(String::from);
        let options = parse_args(args).unwrap();
        assert_eq!(options.output, "out.json");
        assert_eq!(options.business_id, Some(4));
        assert_eq!(options.judgement.as_deref(), Some("NG"));

        let bad = ["--business-id"].into_iter().map(String::from);
        assert!(parse_args(bad).is_err());
    }
}
