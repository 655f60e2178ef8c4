//! Plain text rendering of the feed page.

use crate::{
    api::Session,
    composer::{Composer, PLACEHOLDER},
};
use emojifeed_common::model::feed::FeedEntry;
use std::fmt::Write;
use time::{Duration, OffsetDateTime};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
// Average Gregorian month and year, in seconds.
const MONTH: i64 = 2_629_746;
const YEAR: i64 = 12 * MONTH;

fn rounded(seconds: i64, unit: i64) -> i64 {
    (seconds + unit / 2) / unit
}

/// Humanized distance between `time` and `now`, e.g. "3 hours ago".
///
/// Units switch at the usual thresholds: under 45 seconds is "a few seconds",
/// under 45 minutes counts minutes, under 22 hours counts hours, under 26 days
/// counts days, under 11 months counts months.
#[must_use]
pub fn relative_time(time: OffsetDateTime, now: OffsetDateTime) -> String {
    let distance: Duration = now - time;
    let seconds = distance.whole_seconds().abs();

    let minutes = rounded(seconds, MINUTE);
    let hours = rounded(seconds, HOUR);
    let days = rounded(seconds, DAY);
    let months = rounded(seconds, MONTH);

    let amount = if seconds < 45 {
        "a few seconds".to_owned()
    } else if seconds < 90 {
        "a minute".to_owned()
    } else if minutes < 45 {
        format!("{minutes} minutes")
    } else if minutes < 90 {
        "an hour".to_owned()
    } else if hours < 22 {
        format!("{hours} hours")
    } else if hours < 36 {
        "a day".to_owned()
    } else if days < 26 {
        format!("{days} days")
    } else if days < 46 {
        "a month".to_owned()
    } else if months < 11 {
        format!("{months} months")
    } else if months < 18 {
        "a year".to_owned()
    } else {
        format!("{} years", rounded(seconds, YEAR).max(2))
    };

    if distance.is_negative() {
        format!("in {amount}")
    } else {
        format!("{amount} ago")
    }
}

#[must_use]
pub fn render_entry(entry: &FeedEntry, now: OffsetDateTime) -> String {
    format!(
        "[{}] @{} · {}\n{}",
        entry.author.image_url,
        entry.author.username,
        relative_time(entry.post.created_at, now),
        entry.post.content.get(),
    )
}

/// Feed part of the page: the entries, or a failure notice.
#[must_use]
pub fn render_feed<E>(feed: Result<&[FeedEntry], E>, now: OffsetDateTime) -> String {
    match feed {
        Ok(entries) => entries
            .iter()
            .map(|entry| render_entry(entry, now))
            .collect::<Vec<_>>()
            .join("\n\n"),
        Err(_) => "Something went wrong".to_owned(),
    }
}

/// The whole page. Without a session the composer is replaced by a sign in
/// prompt; the feed is shown either way.
#[must_use]
pub fn render_home<E>(
    session: Option<&Session>,
    composer: &Composer,
    feed: Result<&[FeedEntry], E>,
    now: OffsetDateTime,
) -> String {
    let mut page = String::new();

    if session.is_some() {
        let input = if composer.input().is_empty() {
            PLACEHOLDER
        } else {
            composer.input()
        };
        let _ = writeln!(page, "> {input}  [Post!]");
    } else {
        let _ = writeln!(page, "[Sign in]");
    }
    page.push_str("────────\n");
    page.push_str(&render_feed(feed, now));

    page
}
