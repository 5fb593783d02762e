//! Current weather for London via the Open-Meteo API.

use crate::errors::ToolError;
use serde_json::{json, Value};
use std::time::Duration;

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const LONDON_LAT: f64 = 51.5072;
const LONDON_LON: f64 = -0.1276;

/// WMO weather interpretation codes
fn describe_code(code: i64) -> &'static str {
    match code {
        0 => "clear sky",
        1 => "mainly clear",
        2 => "partly cloudy",
        3 => "overcast",
        45 => "foggy",
        48 => "depositing rime fog",
        51 => "light drizzle",
        53 => "moderate drizzle",
        55 => "dense drizzle",
        56 => "light freezing drizzle",
        57 => "dense freezing drizzle",
        61 => "slight rain",
        63 => "moderate rain",
        65 => "heavy rain",
        66 => "light freezing rain",
        67 => "heavy freezing rain",
        71 => "slight snow",
        73 => "moderate snow",
        75 => "heavy snow",
        77 => "snow grains",
        80 => "slight rain showers",
        81 => "moderate rain showers",
        82 => "violent rain showers",
        85 => "slight snow showers",
        86 => "heavy snow showers",
        95 => "thunderstorm",
        96 => "thunderstorm with slight hail",
        99 => "thunderstorm with heavy hail",
        _ => "unknown conditions",
    }
}

/// Fetch current London weather and annotate the raw observation with a
/// human-readable condition.
pub async fn current_london_weather() -> Result<Value, ToolError> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let resp = http
        .get(FORECAST_URL)
        .query(&[
            ("latitude", LONDON_LAT.to_string()),
            ("longitude", LONDON_LON.to_string()),
            ("current_weather", "true".to_string()),
        ])
        .send()
        .await?;

    if !resp.status().is_success() {
        return Err(ToolError::Transport(format!(
            "weather API returned {}",
            resp.status()
        )));
    }

    let body: Value = resp
        .json()
        .await
        .map_err(|e| ToolError::Transport(format!("weather response decode: {}", e)))?;

    let current = body
        .get("current_weather")
        .cloned()
        .ok_or_else(|| ToolError::Transport("weather response missing current_weather".into()))?;

    let code = current.get("weathercode").and_then(Value::as_i64).unwrap_or(0);

    Ok(json!({
        "temperature": current.get("temperature"),
        "weathercode": code,
        "condition": describe_code(code),
        "is_day": current.get("is_day").and_then(Value::as_i64).unwrap_or(1),
        "windspeed": current.get("windspeed"),
        "winddirection": current.get("winddirection"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_have_descriptions() {
        assert_eq!(describe_code(0), "clear sky");
        assert_eq!(describe_code(63), "moderate rain");
        assert_eq!(describe_code(99), "thunderstorm with heavy hail");
    }

    #[test]
    fn unknown_code_falls_back() {
        assert_eq!(describe_code(42), "unknown conditions");
    }
}
