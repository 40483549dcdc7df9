//! Background task that nudges the user to log their day.

use std::time::Duration as StdDuration;

use time::{Duration, OffsetDateTime, Time};

use crate::notify::Telegram;

const REMINDER_TEXT: &str = "Time to log today's spending and meals.";

/// Send a reminder to `chat_id` once a day at `hour` (UTC) until the server
/// shuts down.
///
/// Delivery failures are logged and skipped so a Telegram outage never takes
/// the task down with it.
///
/// # Panics
/// Panics if `hour` is not in [0, 23]; the CLI validates it before this task
/// is spawned.
pub async fn run_daily_reminder(telegram: Telegram, chat_id: i64, hour: u8) {
    loop {
        let wait = until_next(OffsetDateTime::now_utc(), hour);

        tracing::debug!("next reminder in {} seconds", wait.as_secs());
        tokio::time::sleep(wait).await;

        if let Err(error) = telegram.send_message(chat_id, REMINDER_TEXT).await {
            tracing::warn!("could not send the daily reminder: {error}");
        }
    }
}

/// How long after `now` the next occurrence of `hour` o'clock (UTC) is.
fn until_next(now: OffsetDateTime, hour: u8) -> StdDuration {
    let today_at = now.replace_time(Time::from_hms(hour, 0, 0).expect("hour is in [0, 23]"));
    let next = if today_at > now {
        today_at
    } else {
        today_at + Duration::days(1)
    };

    let wait = (next - now).whole_seconds().max(1);

    StdDuration::from_secs(wait as u64)
}

#[cfg(test)]
mod reminder_tests {
    use time::macros::datetime;

    use super::until_next;

    #[test]
    fn later_today_when_the_hour_is_still_ahead() {
        let wait = until_next(datetime!(2025-04-15 08:00 UTC), 19);

        assert_eq!(wait.as_secs(), 11 * 60 * 60);
    }

    #[test]
    fn tomorrow_when_the_hour_has_passed() {
        let wait = until_next(datetime!(2025-04-15 20:00 UTC), 19);

        assert_eq!(wait.as_secs(), 23 * 60 * 60);
    }

    #[test]
    fn never_zero_even_exactly_on_the_hour() {
        let wait = until_next(datetime!(2025-04-15 19:00 UTC), 19);

        assert!(wait.as_secs() >= 1);
    }
}
