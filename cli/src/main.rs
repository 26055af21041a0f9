//! votekit: command-line client for the election backend.

mod answers;
mod config;
mod render;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use config::ClientConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use votekit_client::{ElectionApi, ElectionBallot, HttpElectionClient};
use votekit_receipt::ReceiptDocument;
use votekit_results::{LivePoller, PollTarget};
use votekit_submission::{SubmissionCoordinator, SubmissionSession, SubmitOutcome};
use votekit_types::{ElectionId, QuestionId, VoteRecord};
use votekit_utils::{format_duration, init_logging, LogFormat};
use votekit_verification::{MethodInput, VerificationDriver, VerificationOutcome};

#[derive(Parser)]
#[command(name = "votekit", about = "Election client: vote, verify, and follow live results")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "VOTEKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Backend API base URL.
    #[arg(long, env = "VOTEKIT_API_URL")]
    api_url: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "VOTEKIT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "VOTEKIT_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Prove a past vote.
    Verify {
        #[command(subcommand)]
        method: VerifyMethod,
    },

    /// List the public bulletin board of an election.
    Bulletin {
        election: String,

        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Page size (defaults to `bulletin_page_size` from the config).
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show live results for a question.
    Results {
        election: String,

        /// Question to chart; defaults to the first question.
        #[arg(long)]
        question: Option<String>,

        /// Keep polling and redraw on every change until interrupted.
        #[arg(long)]
        watch: bool,

        /// Seconds between polls (overrides `poll_interval_secs`).
        #[arg(long, env = "VOTEKIT_POLL_INTERVAL")]
        interval: Option<u64>,
    },

    /// Validate and submit a ballot.
    Submit {
        /// Election to fetch the ballot for.
        #[arg(long, required_unless_present = "ballot", conflicts_with = "ballot")]
        election: Option<String>,

        /// Ballot JSON file (an election object as served by the backend).
        #[arg(long)]
        ballot: Option<PathBuf>,

        /// Answers JSON file: `{"question-id": "option-id" | ["option-id", ...]}`.
        #[arg(long)]
        answers: PathBuf,

        /// Vote anonymously, when the election allows it.
        #[arg(long)]
        anonymous: bool,

        /// Write the vote record as JSON to this file.
        #[arg(long)]
        record_out: Option<PathBuf>,

        /// Write the text receipt to this file.
        #[arg(long)]
        receipt_out: Option<PathBuf>,
    },

    /// Print the receipt for a saved vote record.
    Receipt {
        /// Vote record JSON written by `submit --record-out`.
        #[arg(long)]
        record: PathBuf,

        #[arg(long, default_value = "")]
        title: String,

        #[arg(long)]
        lottery_ticket: Option<String>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum VerifyMethod {
    /// Look a vote up by its receipt id.
    Receipt { receipt_id: String },

    /// Look a vote up by its hash.
    Hash { vote_hash: String },

    /// Check an anonymous vote proof without revealing the ballot.
    Anonymous {
        #[arg(long)]
        receipt_id: String,

        #[arg(long)]
        vote_token: String,

        #[arg(long)]
        verification_code: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::from_toml_file(path)?,
        None => ClientConfig::default(),
    };
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    let api = HttpElectionClient::with_timeouts(
        &config.api_url,
        config.request_timeout(),
        config.connect_timeout(),
    )?;

    match cli.command {
        Command::Verify { method } => {
            let input = match method {
                VerifyMethod::Receipt { receipt_id } => MethodInput::receipt(receipt_id),
                VerifyMethod::Hash { vote_hash } => MethodInput::hash(vote_hash),
                VerifyMethod::Anonymous {
                    receipt_id,
                    vote_token,
                    verification_code,
                } => MethodInput::anonymous(receipt_id, vote_token, verification_code),
            };
            verify(&api, input).await
        }
        Command::Bulletin {
            election,
            page,
            limit,
        } => {
            let limit = limit.unwrap_or(config.bulletin_page_size);
            verify(&api, MethodInput::bulletin(election, page, limit)).await
        }
        Command::Results {
            election,
            question,
            watch,
            interval,
        } => {
            let mut target = PollTarget::new(ElectionId::new(election)).interval(
                interval
                    .map(|s| std::time::Duration::from_secs(s.max(1)))
                    .unwrap_or_else(|| config.poll_interval()),
            );
            if let Some(q) = question {
                target = target.question(QuestionId::new(q));
            }
            results(api, target, watch).await
        }
        Command::Submit {
            election,
            ballot,
            answers,
            anonymous,
            record_out,
            receipt_out,
        } => {
            let fetched = match (election, ballot) {
                (_, Some(path)) => {
                    let text = std::fs::read_to_string(&path)
                        .with_context(|| format!("reading ballot {}", path.display()))?;
                    serde_json::from_str::<ElectionBallot>(&text)
                        .with_context(|| format!("parsing ballot {}", path.display()))?
                }
                (Some(id), None) => api.fetch_election(&ElectionId::new(id)).await?,
                (None, None) => bail!("either --election or --ballot is required"),
            };
            let answers = std::fs::read_to_string(&answers)
                .with_context(|| format!("reading answers {}", answers.display()))?;
            submit(&api, fetched, &answers, anonymous, record_out, receipt_out).await
        }
        Command::Receipt {
            record,
            title,
            lottery_ticket,
            json,
        } => {
            let text = std::fs::read_to_string(&record)
                .with_context(|| format!("reading vote record {}", record.display()))?;
            let record: VoteRecord = serde_json::from_str(&text).context("parsing vote record")?;
            let doc = ReceiptDocument::from_record(&record, title, lottery_ticket);
            if json {
                println!("{}", doc.to_json()?);
            } else {
                print!("{doc}");
            }
            Ok(())
        }
    }
}

async fn verify(api: &HttpElectionClient, input: MethodInput) -> anyhow::Result<()> {
    let driver = VerificationDriver::default();
    let outcome: VerificationOutcome = match driver.verify(api, input).await? {
        Some(outcome) => outcome,
        None => bail!("verification was superseded"),
    };
    print!("{}", render::outcome(&outcome));
    match outcome.failure() {
        Some(failure) => bail!("{}", failure.message),
        None => Ok(()),
    }
}

async fn results(api: HttpElectionClient, target: PollTarget, watch: bool) -> anyhow::Result<()> {
    let every = format_duration(target.interval);
    let poller = LivePoller::spawn(Arc::new(api), target);
    let mut updates = poller.subscribe();

    // Each poll is bounded by the client's request timeout, so the first
    // update arrives either as a chart or as an error.
    let first = tokio::select! {
        changed = updates.changed() => {
            changed.context("results poller stopped")?;
            updates.borrow_and_update().clone()
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("received SIGINT, stopping");
            return Ok(());
        }
    };
    match (&first.last_error, first.polls) {
        (Some(error), 0) if !watch => bail!("could not fetch live results: {error}"),
        (Some(error), _) => eprintln!("Poll failed: {error}"),
        (None, _) => print!("{}", render::chart(&first.chart)),
    }
    if !watch {
        return Ok(());
    }

    eprintln!("Refreshing every {every}; press Ctrl-C to stop.");
    let started = Instant::now();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = updates.borrow_and_update().clone();
                if let Some(error) = &latest.last_error {
                    eprintln!("Poll failed: {error}");
                    continue;
                }
                println!("\n--- poll {} ({} elapsed) ---", latest.polls, format_duration(started.elapsed()));
                print!("{}", render::chart(&latest.chart));
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("received SIGINT, stopping");
                break;
            }
        }
    }
    poller.stop();
    Ok(())
}

async fn submit(
    api: &HttpElectionClient,
    election: ElectionBallot,
    answers_json: &str,
    anonymous: bool,
    record_out: Option<PathBuf>,
    receipt_out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let title = election.metadata.title.clone();
    let answers = answers::parse_answers(election.ballot.voting_type, answers_json)?;

    let mut coordinator = SubmissionCoordinator::for_ballot(election.ballot, election.metadata);
    for (question, answer) in answers {
        coordinator
            .set_answer(question.clone(), answer)
            .with_context(|| format!("answer for question {question}"))?;
    }
    if anonymous && !coordinator.set_anonymous(true) {
        tracing::warn!("this election does not support anonymous voting; submitting a verified vote");
    }

    let session = SubmissionSession::new(coordinator);
    let record = match session.submit(api).await? {
        SubmitOutcome::Submitted(record) | SubmitOutcome::AlreadySubmitted(record) => record,
        SubmitOutcome::Invalid(failures) => {
            eprint!("{}", render::failures(&failures));
            bail!("ballot was not submitted");
        }
        SubmitOutcome::Failed(reason) => bail!("vote submission failed: {reason}"),
        SubmitOutcome::InFlight => bail!("a submission is already in progress"),
    };
    let lottery = session.lock().await.lottery_ticket().map(str::to_owned);

    if let Some(path) = record_out {
        let json = serde_json::to_string_pretty(&record)?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    }
    let receipt = ReceiptDocument::from_record(&record, title, lottery);
    if let Some(path) = receipt_out {
        receipt.save_text(&path)?;
    }
    print!("{receipt}");
    Ok(())
}
