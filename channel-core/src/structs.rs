use serde::{Deserialize, Serialize};

/// 单个信道的一次测量记录
///
/// Missing fields in a request body default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiFiChannel {
    pub channel_number: i32,
    pub frequency_band: f64, // GHz，例如 2.4 / 5 / 6
    pub usage: i32,
    pub interference: i32,
    pub noise: i32,
    pub transmission_power: i32,
    pub channel_width: i32, // MHz
}

impl WiFiChannel {
    /// Registry identity of this record, e.g. `6-2.4`.
    pub fn key(&self) -> String {
        channel_key(self.channel_number, self.frequency_band)
    }

    /// Ranking score; the registry treats the lowest value as the best channel.
    ///
    /// Widened to `i64` so that extreme field values cannot overflow.
    pub fn score(&self) -> i64 {
        i64::from(self.usage) - i64::from(self.interference) + i64::from(self.noise)
            - i64::from(self.transmission_power)
            + i64::from(self.channel_width)
    }
}

/// Builds the derived key from a channel number and a band in GHz.
/// The band is always rendered with one decimal place.
pub fn channel_key(channel_number: i32, frequency_band: f64) -> String {
    format!("{}-{:.1}", channel_number, frequency_band)
}

/// Human label for a band: `2.4GHz`, `5GHz`, `6GHz`.
pub fn band_label(frequency_band: f64) -> String {
    let rendered = format!("{:.1}", frequency_band);
    let trimmed = rendered.strip_suffix(".0").unwrap_or(&rendered);
    format!("{}GHz", trimmed)
}

/// Bands that always appear in the per-band summary, even when empty.
pub const STANDARD_BANDS: [f64; 3] = [2.4, 5.0, 6.0];
