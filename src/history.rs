//! "On this day" fact fetchers (Wikipedia, Britannica, onthisday.com).
//!
//! Each fetcher returns a plain text block of facts; scraping failures
//! fold into an error string the model can narrate, matching the
//! best-effort nature of these sources. Parsing is separated from
//! fetching so it can be tested against static HTML.

use crate::errors::ToolError;
use chrono::{Datelike, Local};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Collapse an element's text into one whitespace-normalized line
fn text_of(el: ElementRef) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

async fn fetch_html(url: &str, user_agent: &str) -> Result<String, ToolError> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?;

    let resp = http.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(ToolError::Transport(format!(
            "{} returned {}",
            url,
            resp.status()
        )));
    }
    Ok(resp.text().await?)
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

/// Historical events from Britannica's on-this-day page.
pub async fn get_history_britannica() -> String {
    let now = Local::now();
    let url = format!(
        "https://www.britannica.com/on-this-day/{}-{}",
        month_name(now.month()),
        now.day()
    );

    match fetch_html(&url, BROWSER_UA).await {
        Ok(html) => parse_britannica(&html),
        Err(e) => format!("Error fetching Britannica: {}", e),
    }
}

pub fn parse_britannica(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut facts = vec!["--- BRITANNICA EVENTS ---".to_string()];

    if let Some(featured) = doc.select(&sel("div.otd-featured-event")).next() {
        let year = featured.select(&sel("div.date-label")).next();
        let title = featured.select(&sel("div.title")).next();
        if let (Some(year), Some(title)) = (year, title) {
            facts.push(format!("Featured: {}: {}", text_of(year), text_of(title)));
        }
    }

    for event in doc.select(&sel("div.md-history-event")).take(5) {
        let year = event.select(&sel("div.date-label")).next();
        let body = event.select(&sel("div.card-body")).next();
        if let (Some(year), Some(body)) = (year, body) {
            let mut text = text_of(body);
            if let Some(cut) = text.find("Read today's edition") {
                text.truncate(cut);
                text = text.trim_end().to_string();
            }
            facts.push(format!("{}: {}", text_of(year), text));
        }
    }

    for born in doc.select(&sel("div.md-history-born")).take(5) {
        let year = born.select(&sel("div.date-label")).next();
        let name = born.select(&sel("a.font-weight-bold")).next();
        if let (Some(year), Some(name)) = (year, name) {
            let mut info = format!("Birth: {} - {}", text_of(year), text_of(name));
            if let Some(desc) = born.select(&sel("div.identifier")).next() {
                info.push_str(&format!(" ({})", text_of(desc)));
            }
            facts.push(info);
        }
    }

    if facts.len() > 1 {
        facts.join("\n")
    } else {
        "No Britannica facts found.".to_string()
    }
}

/// Historical events from Wikipedia's "On this day" page.
pub async fn get_history_today() -> String {
    let url = "https://en.wikipedia.org/wiki/Wikipedia:On_this_day/Today";
    match fetch_html(url, "polybot/0.3").await {
        Ok(html) => parse_wikipedia(&html),
        Err(e) => format!("Error fetching Wikipedia: {}", e),
    }
}

pub fn parse_wikipedia(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut facts = vec!["--- WIKIPEDIA EVENTS ---".to_string()];

    let Some(content) = doc.select(&sel("div.mw-parser-output")).next() else {
        return "No Wikipedia facts found.".to_string();
    };

    // First list under the page body holds the main events
    if let Some(events) = content.select(&sel("ul")).find(|ul| ul.select(&sel("li")).next().is_some())
    {
        for item in events.select(&sel("li")).take(8) {
            facts.push(text_of(item));
        }
    }

    // Births and deaths live in hlist sections
    for hlist in content.select(&sel("div.hlist")) {
        for li in hlist.select(&sel("li")).take(5) {
            let text = text_of(li);
            let lower = text.to_lowercase();
            if text.contains("b.") || lower.contains("born") {
                facts.push(format!("Birth: {}", text));
            } else if text.contains("d.") || lower.contains("died") {
                facts.push(format!("Death: {}", text));
            }
        }
    }

    if facts.len() > 1 {
        facts.join("\n")
    } else {
        "No Wikipedia facts found.".to_string()
    }
}

/// Historical events from onthisday.com's front page.
pub async fn get_history_on_this_day() -> String {
    match fetch_html("https://www.onthisday.com/", BROWSER_UA).await {
        Ok(html) => parse_onthisday(&html),
        Err(e) => format!("Error fetching OnThisDay: {}", e),
    }
}

pub fn parse_onthisday(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut facts = vec!["--- ONTHISDAY.COM EVENTS ---".to_string()];

    if let Some(events) = doc.select(&sel("ul.event-list")).next() {
        for li in events.select(&sel("li.event")).take(8) {
            facts.push(text_of(li));
        }
    }

    if let Some(birthdays) = doc.select(&sel("ul.photo-list")).next() {
        for li in birthdays.select(&sel("li")).take(5) {
            facts.push(format!("Birth: {}", text_of(li)));
        }
    }

    if facts.len() > 1 {
        facts.join("\n")
    } else {
        "No OnThisDay facts found.".to_string()
    }
}
