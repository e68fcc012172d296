//! Save the weather dataset to a parquet file, one row per location and date.

use std::{fs::File, path::Path, sync::Arc};

use anyhow::Result;
use arrow::{
    array::{ArrayRef, Date32Array, Float64Array, RecordBatch, StringArray, UInt16Array, UInt8Array},
    datatypes::{DataType, Field, Schema},
};
use chrono::{Datelike, NaiveDate};
use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};

use crate::{cli::create_progress_bar, dataset::Dataset};

pub fn save_dataset(dataset: &Dataset, file_path: &Path) -> Result<usize> {
    let total_rows: usize = dataset.iter().map(|(_, history)| history.len()).sum();

    let file = File::create(file_path)?;

    let schema = Arc::new(Schema::new(vec![
        Field::new("location", DataType::Utf8, false),
        Field::new("date", DataType::Date32, false),
        Field::new("temperature_c", DataType::Float64, false),
        Field::new("wind_speed_mps", DataType::Float64, false),
        Field::new("gust_speed_mps", DataType::Float64, false),
        Field::new("wind_degree", DataType::UInt16, false),
        Field::new("wind_dir", DataType::Utf8, false),
        Field::new("pressure_mb", DataType::Float64, false),
        Field::new("humidity", DataType::UInt8, false),
        Field::new("uv", DataType::Float64, false),
    ]));

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    let mut locations = Vec::with_capacity(total_rows);
    let mut dates = Vec::with_capacity(total_rows);
    let mut temperatures = Vec::with_capacity(total_rows);
    let mut wind_speeds = Vec::with_capacity(total_rows);
    let mut gust_speeds = Vec::with_capacity(total_rows);
    let mut wind_degrees = Vec::with_capacity(total_rows);
    let mut wind_dirs = Vec::with_capacity(total_rows);
    let mut pressures = Vec::with_capacity(total_rows);
    let mut humidities = Vec::with_capacity(total_rows);
    let mut uvs = Vec::with_capacity(total_rows);

    let pb = create_progress_bar(total_rows as u64, "Preparing rows".to_string());

    for (location, history) in dataset.iter() {
        for (date, record) in history.iter() {
            locations.push(location.as_str());
            dates.push(to_date32(*date));
            temperatures.push(record.temperature_celsius);
            wind_speeds.push(record.wind_speed_mps);
            gust_speeds.push(record.gust_speed_mps);
            wind_degrees.push(record.wind_degree);
            wind_dirs.push(record.wind_direction.as_str());
            pressures.push(record.pressure_mb);
            humidities.push(record.humidity_percent);
            uvs.push(record.uv_index);
            pb.inc(1);
        }
    }

    let columns: Vec<(&str, ArrayRef)> = vec![
        ("location", Arc::new(StringArray::from(locations))),
        ("date", Arc::new(Date32Array::from(dates))),
        ("temperature_c", Arc::new(Float64Array::from(temperatures))),
        ("wind_speed_mps", Arc::new(Float64Array::from(wind_speeds))),
        ("gust_speed_mps", Arc::new(Float64Array::from(gust_speeds))),
        ("wind_degree", Arc::new(UInt16Array::from(wind_degrees))),
        ("wind_dir", Arc::new(StringArray::from(wind_dirs))),
        ("pressure_mb", Arc::new(Float64Array::from(pressures))),
        ("humidity", Arc::new(UInt8Array::from(humidities))),
        ("uv", Arc::new(Float64Array::from(uvs))),
    ];

    let batch = RecordBatch::try_from_iter(columns)?;
    writer.write(&batch)?;
    writer.close()?;

    pb.finish_with_message("Finished writing Parquet file");

    Ok(total_rows)
}

/// Days since the Unix epoch.
fn to_date32(date: NaiveDate) -> i32 {
    const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

// -- Tests -------------------------------------------------------------------
