use skycheck_core::WeatherResult;

/// Human-readable summary, one line per field.
pub fn render(info: &WeatherResult) -> String {
    let temperature = match &info.temperature_c {
        Some(t) => format!(" Temperature: {t}°C"),
        None => " Temperature: N/A".to_string(),
    };
    let humidity = match &info.humidity_pct {
        Some(h) => format!(" Humidity: {h}%"),
        None => " Humidity: N/A".to_string(),
    };
    let description = match info.description.as_deref().filter(|d| !d.is_empty()) {
        Some(d) => format!(" Description: {}", capitalize(d)),
        None => " Description: N/A".to_string(),
    };

    format!("Weather in {}:\n{temperature}\n{humidity}\n{description}", info.city)
}

pub fn render_json(info: &WeatherResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(info)?)
}

/// First character uppercased, the rest lowercased.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
