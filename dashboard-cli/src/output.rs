use dashboard_core::{
    City, CurrentWeather, InsightResponse, WeatherRecord,
    model::ForecastResponse,
    view::{
        AnalyticsView, EmptyState,
        home::{format_local_time, format_temperature, format_visibility},
    },
};

const MISSING: &str = "--";
const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

pub fn print_current(weather: &CurrentWeather) {
    let condition = weather
        .primary_condition()
        .map(|c| c.description.as_str())
        .unwrap_or(MISSING);

    println!("{}, {}", weather.name, weather.sys.country);
    println!("{}", format_local_time(weather.dt, weather.timezone));
    println!();
    println!("  {:<12}{}", "Temperature", format_temperature(weather.main.temp));
    println!("  {:<12}{condition}", "Conditions");
    println!("  {:<12}{}", "Feels like", format_temperature(weather.main.feels_like));
    println!(
        "  {:<12}{} / {}",
        "Min / Max",
        format_temperature(weather.main.temp_min),
        format_temperature(weather.main.temp_max)
    );
    println!("  {:<12}{}%", "Humidity", weather.main.humidity);
    println!("  {:<12}{} m/s ({}°)", "Wind", weather.wind.speed, weather.wind.deg);
    println!("  {:<12}{} hPa", "Pressure", weather.main.pressure);
    println!("  {:<12}{}", "Visibility", format_visibility(weather.visibility));
    println!("  {:<12}{}%", "Clouds", weather.clouds.all);
    println!(
        "  {:<12}{} / {}",
        "Sun",
        format_local_time(weather.sys.sunrise, weather.timezone),
        format_local_time(weather.sys.sunset, weather.timezone)
    );
}

pub fn print_forecast(forecast: &ForecastResponse) {
    println!("{}, {}", forecast.city.name, forecast.city.country);
    for item in &forecast.list {
        let condition = item
            .weather
            .first()
            .map(|c| c.description.as_str())
            .unwrap_or(MISSING);
        println!(
            "  {:<20} {:>7}  {:>3.0}% rain  {condition}",
            item.dt_txt,
            format_temperature(item.main.temp),
            item.pop * 100.0
        );
    }
}

pub fn print_cities(cities: &[City]) {
    if cities.is_empty() {
        println!("No cities yet.");
        return;
    }
    for city in cities {
        println!("  {:>4}  {:<24} {}", city.id, city.name, city.country);
    }
}

pub fn print_record(record: &WeatherRecord) {
    let at = record
        .recorded_at_utc()
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| record.recorded_at.clone());

    println!("{}, {} at {at}", record.city_name, record.country);
    println!("  {:<12}{}", "Temperature", format_temperature(record.temperature));
    println!("  {:<12}{}", "Conditions", record.weather_description);
    println!("  {:<12}{}%", "Humidity", record.humidity);
    println!("  {:<12}{} m/s", "Wind", record.wind_speed);
}

pub fn print_analytics(view: &AnalyticsView) {
    match view.empty_state() {
        Some(EmptyState::NoCitySelected) => {
            println!("Could not resolve that city; search for another one.");
            return;
        }
        Some(EmptyState::NoRecords) | None => {}
    }

    if let Some(city) = view.city() {
        println!("Viewing analytics for: {}, {} ({})", city.name, city.country, view.window());
    }

    if let Some(summary) = view.analytics() {
        println!();
        println!("  {:<20}{:.1}°C", "Average temperature", summary.avg_temperature);
        println!(
            "  {:<20}{:.1}° - {:.1}°",
            "Temperature range", summary.min_temperature, summary.max_temperature
        );
        println!("  {:<20}{:.0}%", "Average humidity", summary.avg_humidity);
        println!("  {:<20}{}", "Most common", summary.most_common_condition);
    }

    if let Some(total) = view.low_data_advisory() {
        let plural = if total == 1 { "" } else { "s" };
        println!();
        println!("Limited historical data: only {total} weather record{plural} for this city.");
        println!(
            "Analytics will show the same values across periods until more data is collected."
        );
    }

    let points = view.chart_points();
    if points.is_empty() {
        if let Some(city) = view.city() {
            println!();
            println!("No historical data available for {} yet.", city.name);
        }
        return;
    }

    let temps: Vec<f64> = points.iter().map(|p| p.temperature).collect();
    println!();
    println!("Temperature trend  {}", sparkline(&temps));
    println!();
    println!(
        "  {:<14} {:>8} {:>10} {:>8} {:>8} {:>8}",
        "Time", "Temp", "Feels", "Humid", "Wind", "hPa"
    );
    for p in &points {
        println!(
            "  {:<14} {:>8.1} {:>10.1} {:>7}% {:>8.1} {:>8}",
            p.time, p.temperature, p.feels_like, p.humidity, p.wind_speed, p.pressure
        );
    }
}

pub fn print_insights(history: &[InsightResponse]) {
    for insight in history {
        println!();
        if insight.query.is_empty() {
            println!("{}", insight.city_name);
        } else {
            println!("{}: \"{}\"", insight.city_name, insight.query);
        }
        println!("{}", insight.insight);
    }
}

fn sparkline(values: &[f64]) -> String {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    values
        .iter()
        .map(|v| {
            if span <= f64::EPSILON {
                return SPARKS[SPARKS.len() / 2];
            }
            let idx = ((v - min) / span * (SPARKS.len() - 1) as f64).round() as usize;
            SPARKS[idx.min(SPARKS.len() - 1)]
        })
        .collect()
}
