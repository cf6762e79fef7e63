//! Result aggregation.
//!
//! Computes the closing tally from a round's votes: per-option voter lists in
//! arrival order, counts, and truncated percentages.

use super::round::{Choice, Round};

/// Tally for one of the two options.
#[derive(Debug, Clone)]
pub struct OptionTally {
    /// The option's text.
    pub text: String,
    /// Voter display names in arrival order.
    pub voters: Vec<String>,
    /// Number of votes for this option.
    pub count: usize,
    /// Share of the total, truncated to a whole percent. 0 when nobody voted.
    pub percent: u8,
}

/// The closing summary of a round.
#[derive(Debug, Clone)]
pub struct RoundSummary {
    /// Tally for the first option.
    pub option_a: OptionTally,
    /// Tally for the second option.
    pub option_b: OptionTally,
    /// Total number of votes cast.
    pub total_votes: usize,
}

/// Summarize a round's votes.
pub fn summarize(round: &Round) -> RoundSummary {
    let mut first = Vec::new();
    let mut second = Vec::new();
    for vote in round.votes.values() {
        match vote.choice {
            Choice::First => first.push(vote.display_name.clone()),
            Choice::Second => second.push(vote.display_name.clone()),
        }
    }

    let total_votes = round.vote_count();
    RoundSummary {
        option_a: tally(round.option_a.clone(), first, total_votes),
        option_b: tally(round.option_b.clone(), second, total_votes),
        total_votes,
    }
}

fn tally(text: String, voters: Vec<String>, total: usize) -> OptionTally {
    let count = voters.len();
    let percent = if total == 0 {
        0
    } else {
        (count * 100 / total) as u8
    };
    OptionTally {
        text,
        voters,
        count,
        percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::questions::PickedQuestion;
    use crate::rounds::round::{RoundKey, Vote};

    fn round_with_votes(votes: &[(i64, Choice, &str)]) -> Round {
        let mut round = Round::new(
            RoundKey::new(1, 100),
            &PickedQuestion {
                index: 0,
                option_a: "fly".to_string(),
                option_b: "swim".to_string(),
            },
        );
        for (id, choice, name) in votes {
            round.votes.insert(
                *id,
                Vote {
                    choice: *choice,
                    display_name: name.to_string(),
                },
            );
        }
        round
    }

    #[test]
    fn test_zero_votes_is_all_zero() {
        let summary = summarize(&round_with_votes(&[]));
        assert_eq!(summary.total_votes, 0);
        assert_eq!(summary.option_a.count, 0);
        assert_eq!(summary.option_a.percent, 0);
        assert_eq!(summary.option_b.count, 0);
        assert_eq!(summary.option_b.percent, 0);
    }

    #[test]
    fn test_three_to_one_split() {
        let summary = summarize(&round_with_votes(&[
            (1, Choice::First, "@a"),
            (2, Choice::First, "@b"),
            (3, Choice::Second, "@c"),
            (4, Choice::First, "@d"),
        ]));
        assert_eq!(summary.total_votes, 4);
        assert_eq!(summary.option_a.count, 3);
        assert_eq!(summary.option_a.percent, 75);
        assert_eq!(summary.option_b.count, 1);
        assert_eq!(summary.option_b.percent, 25);
    }

    #[test]
    fn test_percentages_truncate() {
        let summary = summarize(&round_with_votes(&[
            (1, Choice::First, "@a"),
            (2, Choice::First, "@b"),
            (3, Choice::Second, "@c"),
        ]));
        assert_eq!(summary.option_a.percent, 66);
        assert_eq!(summary.option_b.percent, 33);
    }

    #[test]
    fn test_voter_lists_preserve_arrival_order() {
        let summary = summarize(&round_with_votes(&[
            (1, Choice::Second, "@first"),
            (2, Choice::First, "@second"),
            (3, Choice::Second, "@third"),
        ]));
        assert_eq!(summary.option_a.voters, vec!["@second"]);
        assert_eq!(summary.option_b.voters, vec!["@first", "@third"]);
        assert_eq!(summary.option_a.text, "fly");
        assert_eq!(summary.option_b.text, "swim");
    }
}
