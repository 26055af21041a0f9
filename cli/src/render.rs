//! Plain-text rendering of command results.

use std::fmt::Write;
use votekit_ballot::ValidationFailure;
use votekit_client::{AnonymousVerification, BulletinBoardPage, VoteLookup};
use votekit_results::PieChart;
use votekit_verification::VerificationOutcome;

const BAR_WIDTH: usize = 30;

pub fn outcome(outcome: &VerificationOutcome) -> String {
    if let Some(failure) = outcome.failure() {
        return format!("✗ {failure}\n");
    }
    match outcome {
        VerificationOutcome::Receipt(Ok(v)) | VerificationOutcome::Hash(Ok(v)) => lookup(v),
        VerificationOutcome::Bulletin(Ok(page)) => bulletin(page),
        VerificationOutcome::Anonymous(Ok(v)) => anonymous(v),
        _ => String::new(),
    }
}

fn lookup(v: &VoteLookup) -> String {
    format!(
        "✓ Vote found\n  Election:  {}\n  Vote ID:   {}\n  Vote hash: {}\n",
        v.election_title, v.voting_id, v.vote_hash
    )
}

fn bulletin(page: &BulletinBoardPage) -> String {
    let mut out = format!(
        "{} - {} vote(s) on the bulletin board\n",
        page.election_title, page.total_votes
    );
    for entry in &page.votes {
        let kind = if entry.anonymous { "anonymous" } else { "verified" };
        let _ = writeln!(out, "  {:<24} {:<24} {kind}", entry.voting_id, entry.receipt_id);
    }
    out
}

fn anonymous(v: &AnonymousVerification) -> String {
    let mut out = String::from("✓ Anonymous vote proof accepted; ballot contents were not revealed\n");
    if let Some(title) = &v.election_title {
        let _ = writeln!(out, "  Election:    {title}");
    }
    if let Some(at) = &v.verified_at {
        let _ = writeln!(out, "  Verified at: {at}");
    }
    out
}

pub fn chart(chart: &PieChart) -> String {
    if chart.is_empty() {
        return "No votes yet.\n".to_string();
    }
    let mut out = String::new();
    if !chart.question_text.is_empty() {
        let _ = writeln!(out, "{}", chart.question_text);
    }
    for segment in &chart.segments {
        let filled = ((segment.percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
        let marker = if segment.leading { " ★" } else { "" };
        let _ = writeln!(
            out,
            "  {:<20} {:<width$} {:>5.1}% ({}){marker}",
            segment.label,
            "█".repeat(filled),
            segment.display_percentage(),
            segment.count,
            width = BAR_WIDTH,
        );
    }
    let _ = writeln!(out, "  Total votes: {}", chart.total);
    out
}

pub fn failures(failures: &[ValidationFailure]) -> String {
    let mut out = String::from("Ballot is incomplete:\n");
    for f in failures {
        let _ = writeln!(out, "  {f}");
    }
    out
}
