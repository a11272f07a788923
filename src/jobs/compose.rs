//! Message templates

use chrono::NaiveDate;

use super::Template;
use crate::sources::Forecast;

/// Decoration lines fetched for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extras {
    pub holiday: Option<String>,
    pub fact: Option<String>,
    pub joke: Option<String>,
}

/// Render the message body for one recipient
///
/// `greeting` is already addressed to the recipient; `name` is used for the
/// daily sign-off.
#[must_use]
pub fn compose(
    template: Template,
    date: NaiveDate,
    name: &str,
    greeting: Option<&str>,
    forecast: &Forecast,
    extras: &Extras,
) -> String {
    match template {
        Template::Forecast => forecast_message(greeting, forecast, extras),
        Template::Daily => daily_message(date, name, greeting, forecast, extras),
    }
}

fn forecast_message(greeting: Option<&str>, forecast: &Forecast, extras: &Extras) -> String {
    let mut body = format!(
        "{} Today's temperature is {}°F, with a high of {}°F and a low of {}°F.",
        greeting.unwrap_or("Good morning!"),
        forecast.day,
        forecast.max,
        forecast.min,
    );
    if let Some(uv) = forecast.uv_index {
        body.push_str(&format!(" The UV index is {uv}."));
    }
    body.push_str(&format!(" Summary: {}.", forecast.summary));

    if let Some(holiday) = &extras.holiday {
        body.push_str(&format!("\nIt's {holiday} today!"));
    }
    if let Some(fact) = &extras.fact {
        body.push_str(&format!("\nFun fact: {}", sentence(fact)));
    }
    if let Some(joke) = &extras.joke {
        body.push_str(&format!("\nJoke: {}", sentence(joke)));
    }
    body
}

fn daily_message(
    date: NaiveDate,
    name: &str,
    greeting: Option<&str>,
    forecast: &Forecast,
    extras: &Extras,
) -> String {
    let mut lines = vec![format!("📆 Today is {}.", date.format("%B %d, %Y"))];
    if let Some(greeting) = greeting {
        lines.push(greeting.to_string());
    }
    lines.push("Here's your daily scoop:".to_string());
    lines.push(format!(
        "🌡️ The day's looking to be about {}°F. Expect highs of {}°F and lows around {}°F.",
        forecast.day, forecast.max, forecast.min
    ));
    if let Some(uv) = forecast.uv_index {
        lines.push(format!("🧴 UV index: {uv}."));
    }
    lines.push(format!("☀️ Weather's saying: {}.", forecast.summary));
    if let Some(holiday) = &extras.holiday {
        lines.push(format!("🎉 And guess what? It's {holiday} today!"));
    }
    if let Some(fact) = &extras.fact {
        lines.push(format!("🤓 Fun Fact of the Day: {}", sentence(fact)));
    }
    if let Some(joke) = &extras.joke {
        lines.push(format!("😂 Joke of the Day: {}", sentence(joke)));
    }
    lines.push(format!("Make it a great one, {name}!"));
    lines.join("\n")
}

/// Close a line with a period unless it already ends in punctuation
fn sentence(text: &str) -> String {
    let text = text.trim();
    if text.ends_with(['.', '!', '?']) {
        text.to_string()
    } else {
        format!("{text}.")
    }
}
