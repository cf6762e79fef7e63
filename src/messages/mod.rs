//! Message Rendering
//!
//! English text for the open poll, the closing tally, and voter display
//! names. Rendering is pure; the transport decides how the text reaches the
//! chat.

use crate::rounds::{OptionTally, RoundSummary};

/// Derive the name shown in voter lists and tallies.
///
/// Fallback order: `@username`, then the concatenated first/last name with an
/// id suffix, then a bare id placeholder. Newlines are replaced so one voter
/// cannot break the list layout.
pub fn display_name(
    username: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
    id: i64,
) -> String {
    if let Some(username) = username.filter(|u| !u.is_empty()) {
        return format!("@{username}");
    }

    let full_name = [first_name, last_name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if full_name.is_empty() {
        return format!("id:{id}");
    }
    format!("{} (id:{id})", full_name.replace('\n', " "))
}

/// Render the open poll message.
///
/// `timer_seconds` adds the countdown warning line once the round is armed.
pub fn open_poll_text(
    option_a: &str,
    option_b: &str,
    voters: &[String],
    timer_seconds: Option<u64>,
) -> String {
    let warning = match timer_seconds {
        Some(seconds) => format!("⚠️ {seconds} seconds left!\n\n"),
        None => String::new(),
    };
    let voters_block = if voters.is_empty() {
        "no one has voted yet".to_string()
    } else {
        format!(
            "{}: {}",
            count_noun(voters.len(), "participant"),
            voters.join(", ")
        )
    };
    format!(
        "{warning}Would you rather…\n\n🔵 {option_a}\n🔴 {option_b}\n\n👥 Voted so far — {voters_block}"
    )
}

/// Render the closing tally.
pub fn closing_text(summary: &RoundSummary) -> String {
    format!(
        "Voting is over!\n\n{}\n\n{}",
        option_block("🔵", &summary.option_a),
        option_block("🔴", &summary.option_b)
    )
}

fn option_block(marker: &str, tally: &OptionTally) -> String {
    let names = if tally.voters.is_empty() {
        "no one".to_string()
    } else {
        tally.voters.join(", ")
    };
    format!(
        "{marker} {}\n   {}% ({})\n   Participants: {names}",
        tally.text,
        tally.percent,
        count_noun(tally.count, "vote")
    )
}

fn count_noun(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_username() {
        let name = display_name(Some("alice"), Some("Alice"), Some("Liddell"), 7);
        assert_eq!(name, "@alice");
    }

    #[test]
    fn test_display_name_concatenates_names() {
        let name = display_name(None, Some("Alice"), Some("Liddell"), 7);
        assert_eq!(name, "Alice Liddell (id:7)");
        let first_only = display_name(None, Some("Alice"), None, 7);
        assert_eq!(first_only, "Alice (id:7)");
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        assert_eq!(display_name(None, None, None, 7), "id:7");
        assert_eq!(display_name(Some(""), Some(""), None, 7), "id:7");
    }

    #[test]
    fn test_display_name_strips_newlines() {
        let name = display_name(None, Some("A\nB"), None, 7);
        assert_eq!(name, "A B (id:7)");
    }

    #[test]
    fn test_open_poll_text_without_votes() {
        let text = open_poll_text("fly", "swim", &[], None);
        assert!(text.starts_with("Would you rather…"));
        assert!(text.contains("🔵 fly"));
        assert!(text.contains("🔴 swim"));
        assert!(text.contains("no one has voted yet"));
    }

    #[test]
    fn test_open_poll_text_with_votes_and_timer() {
        let voters = vec!["@a".to_string(), "@b".to_string()];
        let text = open_poll_text("fly", "swim", &voters, Some(20));
        assert!(text.starts_with("⚠️ 20 seconds left!"));
        assert!(text.contains("2 participants: @a, @b"));
    }

    #[test]
    fn test_open_poll_text_singular_participant() {
        let voters = vec!["@a".to_string()];
        let text = open_poll_text("fly", "swim", &voters, None);
        assert!(text.contains("1 participant: @a"));
    }

    #[test]
    fn test_closing_text() {
        let summary = RoundSummary {
            option_a: OptionTally {
                text: "fly".to_string(),
                voters: vec!["@a".to_string(), "@b".to_string()],
                count: 2,
                percent: 66,
            },
            option_b: OptionTally {
                text: "swim".to_string(),
                voters: vec!["@c".to_string()],
                count: 1,
                percent: 33,
            },
            total_votes: 3,
        };
        let text = closing_text(&summary);
        assert!(text.starts_with("Voting is over!"));
        assert!(text.contains("🔵 fly\n   66% (2 votes)\n   Participants: @a, @b"));
        assert!(text.contains("🔴 swim\n   33% (1 vote)\n   Participants: @c"));
    }

    #[test]
    fn test_closing_text_empty_round() {
        let summary = RoundSummary {
            option_a: OptionTally {
                text: "fly".to_string(),
                voters: vec![],
                count: 0,
                percent: 0,
            },
            option_b: OptionTally {
                text: "swim".to_string(),
                voters: vec![],
                count: 0,
                percent: 0,
            },
            total_votes: 0,
        };
        let text = closing_text(&summary);
        assert!(text.contains("0% (0 votes)"));
        assert!(text.contains("Participants: no one"));
    }
}
