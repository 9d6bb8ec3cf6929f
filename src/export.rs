use std::io::Write;
use std::path::Path;

use chrono_tz::Tz;

use crate::error::{Context, Result};
use crate::models::CandleSeries;
use crate::utils::time::format_exchange_time;

const CSV_HEADER: [&str; 7] = ["timestamp", "time", "open", "high", "low", "close", "volume"];

impl CandleSeries {
    /// Write the series as CSV, with `time` rendered in exchange-local time.
    pub fn write_csv<W: Write>(&self, writer: W, tz: Tz) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(CSV_HEADER)?;

        for candle in &self.candles {
            writer.write_record(&[
                candle.timestamp.to_string(),
                format_exchange_time(candle.timestamp, tz),
                candle.open.to_string(),
                candle.high.to_string(),
                candle.low.to_string(),
                candle.close.to_string(),
                candle.volume.to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn save_csv<P: AsRef<Path>>(&self, path: P, tz: Tz) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create CSV file {}", path.display()))?;
        self.write_csv(file, tz)
    }
}
