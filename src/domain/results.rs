use crate::domain::model::{Poll, PollOption, PollStatus};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Status facet for poll listings. `Expired` matches everything that is not
/// open for voting, covering closed polls as well as naturally expired ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Expired,
}

/// Share of the total vote for one option, rounded to one decimal place.
/// Zero when the poll has no votes at all.
pub fn percentage_of(option: &PollOption, poll: &Poll) -> f64 {
    if poll.total_votes <= 0 {
        return 0.0;
    }
    let share = option.vote_count as f64 / poll.total_votes as f64 * 100.0;
    (share * 10.0).round() / 10.0
}

/// The option with the strictly greatest count; the first one in stored
/// order on a tie. No winner while the poll has no votes.
pub fn winner(poll: &Poll) -> Option<&PollOption> {
    if poll.total_votes == 0 {
        return None;
    }
    poll.options.iter().reduce(|best, candidate| {
        if candidate.vote_count > best.vote_count {
            candidate
        } else {
            best
        }
    })
}

/// Options sorted descending by vote count into a fresh sequence; ties keep
/// their stored relative order and the source poll is left untouched.
pub fn ranked_options(poll: &Poll) -> Vec<PollOption> {
    let mut ranked = poll.options.clone();
    ranked.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));
    ranked
}

/// Search plus status facet over a poll collection. The search term matches
/// case-insensitively against question or description; a blank term matches
/// everything.
pub fn filter_polls<'a>(
    polls: &'a [Poll],
    search: &str,
    status: StatusFilter,
    now: DateTime<Utc>,
) -> Vec<&'a Poll> {
    let needle = search.trim().to_lowercase();
    polls
        .iter()
        .filter(|poll| {
            needle.is_empty()
                || poll.question.to_lowercase().contains(&needle)
                || poll.description.to_lowercase().contains(&needle)
        })
        .filter(|poll| match status {
            StatusFilter::All => true,
            StatusFilter::Active => poll.status(now) == PollStatus::Active,
            StatusFilter::Expired => poll.status(now) != PollStatus::Active,
        })
        .collect()
}

pub fn count_active(polls: &[Poll], now: DateTime<Utc>) -> usize {
    polls
        .iter()
        .filter(|poll| poll.status(now) == PollStatus::Active)
        .count()
}

pub fn sum_votes(polls: &[Poll]) -> i64 {
    polls.iter().map(|poll| poll.total_votes).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn option(text: &str, vote_count: i64) -> PollOption {
        PollOption {
            id: Uuid::new_v4(),
            text: text.to_string(),
            vote_count,
        }
    }

    fn poll_with(options: Vec<PollOption>) -> Poll {
        let total_votes = options.iter().map(|o| o.vote_count).sum();
        Poll {
            id: Uuid::new_v4(),
            question: "Which option do you prefer?".to_string(),
            description: String::new(),
            created_at: Utc::now(),
            expires_at: None,
            is_active: true,
            options,
            total_votes,
        }
    }

    #[test]
    fn percentage_is_zero_without_votes() {
        let poll = poll_with(vec![option("Red", 0), option("Blue", 0)]);
        for opt in &poll.options {
            assert_eq!(percentage_of(opt, &poll), 0.0);
        }
    }

    #[test]
    fn percentage_rounds_to_one_decimal() {
        let poll = poll_with(vec![option("Red", 1), option("Blue", 2)]);
        assert_eq!(percentage_of(&poll.options[0], &poll), 33.3);
        assert_eq!(percentage_of(&poll.options[1], &poll), 66.7);
    }

    #[test]
    fn winner_is_none_without_votes() {
        let poll = poll_with(vec![option("Red", 0), option("Blue", 0)]);
        assert!(winner(&poll).is_none());
    }

    #[test]
    fn winner_tie_keeps_first_stored_option() {
        let poll = poll_with(vec![option("Red", 4), option("Blue", 4), option("Green", 1)]);
        assert_eq!(winner(&poll).map(|o| o.text.as_str()), Some("Red"));
    }

    #[test]
    fn ranked_options_sorts_descending_with_stable_ties() {
        let poll = poll_with(vec![option("A", 3), option("B", 5), option("C", 5)]);
        let ranked = ranked_options(&poll);
        let texts: Vec<&str> = ranked.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, vec!["B", "C", "A"]);
    }

    #[test]
    fn ranked_options_leaves_source_order_alone() {
        let poll = poll_with(vec![option("A", 1), option("B", 9)]);
        let first = ranked_options(&poll);
        let second = ranked_options(&poll);
        assert_eq!(poll.options[0].text, "A");
        assert_eq!(poll.options[1].text, "B");
        assert_eq!(
            first.iter().map(|o| o.id).collect::<Vec<_>>(),
            second.iter().map(|o| o.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn poll_without_options_projects_empty_results() {
        let poll = poll_with(Vec::new());
        assert!(ranked_options(&poll).is_empty());
        assert!(winner(&poll).is_none());
        assert_eq!(sum_votes(&[poll]), 0);
    }

    #[test]
    fn active_filter_excludes_a_just_expired_poll() {
        let now = Utc::now();
        let mut poll = poll_with(vec![option("Red", 1), option("Blue", 0)]);
        poll.expires_at = Some(now - Duration::seconds(1));
        // is_active stays true; expiry alone pushes it out of the facet
        let polls = vec![poll];
        assert!(filter_polls(&polls, "", StatusFilter::Active, now).is_empty());
        assert_eq!(filter_polls(&polls, "", StatusFilter::Expired, now).len(), 1);
    }

    #[test]
    fn expired_filter_includes_inactive_polls() {
        let now = Utc::now();
        let mut poll = poll_with(vec![option("Red", 1), option("Blue", 0)]);
        poll.is_active = false;
        let polls = vec![poll];
        assert_eq!(filter_polls(&polls, "", StatusFilter::Expired, now).len(), 1);
        assert!(filter_polls(&polls, "", StatusFilter::Active, now).is_empty());
    }

    #[test]
    fn search_matches_question_or_description_case_insensitively() {
        let now = Utc::now();
        let mut lunch = poll_with(vec![option("Soup", 0), option("Salad", 0)]);
        lunch.question = "Where should we eat lunch?".to_string();
        let mut editor = poll_with(vec![option("Vim", 0), option("Emacs", 0)]);
        editor.question = "Pick a tool".to_string();
        editor.description = "The eternal EDITOR debate".to_string();
        let polls = vec![lunch, editor];

        let by_question = filter_polls(&polls, "LUNCH", StatusFilter::All, now);
        assert_eq!(by_question.len(), 1);
        assert_eq!(by_question[0].question, "Where should we eat lunch?");

        let by_description = filter_polls(&polls, "editor", StatusFilter::All, now);
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].question, "Pick a tool");

        assert!(filter_polls(&polls, "breakfast", StatusFilter::All, now).is_empty());
    }

    #[test]
    fn aggregates_fold_over_the_collection() {
        let now = Utc::now();
        let open = poll_with(vec![option("Red", 3), option("Blue", 2)]);
        let mut closed = poll_with(vec![option("Yes", 4), option("No", 1)]);
        closed.is_active = false;
        let polls = vec![open, closed];
        assert_eq!(count_active(&polls, now), 1);
        assert_eq!(sum_votes(&polls), 10);
    }

    #[test]
    fn accepted_draft_round_trips_through_projection() {
        use crate::domain::validation::{clean_options, validate, PollDraft};

        let now = Utc::now();
        let draft = PollDraft {
            question: "Which language should we learn next?".to_string(),
            description: "Team vote".to_string(),
            options: vec!["Rust".into(), " Go ".into(), "Zig".into()],
            expires_at: None,
        };
        assert!(validate(&draft, now).is_empty());

        // Hypothetical accepted response: stored order follows the draft,
        // with some votes tallied by the server.
        let texts = clean_options(&draft.options);
        let counts = [2_i64, 2, 1];
        let options: Vec<PollOption> = texts
            .into_iter()
            .zip(counts)
            .map(|(text, vote_count)| option(text, vote_count))
            .collect();
        let poll = poll_with(options);

        assert_eq!(poll.status(now), PollStatus::Active);
        assert_eq!(poll.total_votes, 5);
        assert_eq!(winner(&poll).map(|o| o.text.as_str()), Some("Rust"));
        assert_eq!(percentage_of(&poll.options[0], &poll), 40.0);
        assert_eq!(percentage_of(&poll.options[2], &poll), 20.0);
        let ranked = ranked_options(&poll);
        let ranked_texts: Vec<&str> = ranked.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(ranked_texts, vec!["Rust", "Go", "Zig"]);
    }
}
