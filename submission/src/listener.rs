//! Notifications emitted after a successful submission.
//!
//! Delivery is best effort: listeners are invoked once, inline, after the vote
//! record exists. A listener failure is logged and never undoes the vote.

use thiserror::Error;
use tokio::sync::mpsc;
use votekit_types::{ElectionId, ReceiptId, VotingId};

/// Emitted once per successful submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteSubmitted {
    pub election_id: ElectionId,
    pub voting_id: VotingId,
    pub receipt_id: ReceiptId,
    pub anonymous: bool,
    /// Ticket number when the backend issued one inline.
    pub lottery_ticket: Option<String>,
}

#[derive(Debug, Error)]
#[error("listener {listener} failed: {reason}")]
pub struct NotifyError {
    pub listener: String,
    pub reason: String,
}

/// A collaborator interested in completed submissions (e.g. lottery-ticket issuance).
pub trait SubmissionListener: Send + Sync {
    fn name(&self) -> &str;

    fn vote_submitted(&self, event: &VoteSubmitted) -> Result<(), NotifyError>;
}

/// Forwards events into an unbounded channel for an async consumer.
pub struct ChannelListener {
    name: String,
    tx: mpsc::UnboundedSender<VoteSubmitted>,
}

impl ChannelListener {
    pub fn new(name: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<VoteSubmitted>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                name: name.into(),
                tx,
            },
            rx,
        )
    }
}

impl SubmissionListener for ChannelListener {
    fn name(&self) -> &str {
        &self.name
    }

    fn vote_submitted(&self, event: &VoteSubmitted) -> Result<(), NotifyError> {
        self.tx.send(event.clone()).map_err(|_| NotifyError {
            listener: self.name.clone(),
            reason: "receiver dropped".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> VoteSubmitted {
        VoteSubmitted {
            election_id: "e1".into(),
            voting_id: "v1".into(),
            receipt_id: "r1".into(),
            anonymous: false,
            lottery_ticket: None,
        }
    }

    #[test]
    fn channel_listener_forwards_events() {
        let (listener, mut rx) = ChannelListener::new("lottery");
        listener.vote_submitted(&event()).unwrap();
        assert_eq!(rx.try_recv().unwrap(), event());
    }

    #[test]
    fn dropped_receiver_is_an_error() {
        let (listener, rx) = ChannelListener::new("lottery");
        drop(rx);
        let err = listener.vote_submitted(&event()).unwrap_err();
        assert_eq!(err.listener, "lottery");
    }
}
