use crate::error::ReceiptError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use votekit_types::{ElectionId, ReceiptId, Timestamp, VoteHash, VoteRecord, VotingId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    Anonymous,
    Verified,
}

impl VoteType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Anonymous => "Anonymous",
            Self::Verified => "Verified",
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDocument {
    pub election_id: ElectionId,
    pub election_title: String,
    pub vote_type: VoteType,
    pub voting_id: VotingId,
    pub receipt_id: ReceiptId,
    pub submitted_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lottery_ticket: Option<String>,
    /// Always the full hash, never the shortened form.
    pub vote_hash: VoteHash,
}

impl ReceiptDocument {
    pub fn from_record(
        record: &VoteRecord,
        election_title: impl Into<String>,
        lottery_ticket: Option<String>,
    ) -> Self {
        Self {
            election_id: record.election_id().clone(),
            election_title: election_title.into(),
            vote_type: if record.is_anonymous() {
                VoteType::Anonymous
            } else {
                VoteType::Verified
            },
            voting_id: record.voting_id().clone(),
            receipt_id: record.receipt_id().clone(),
            submitted_at: record.submitted_at(),
            lottery_ticket,
            vote_hash: record.vote_hash().clone(),
        }
    }

    /// Suggested file name, e.g. `vote-receipt-r1.txt`.
    pub fn file_name(&self) -> String {
        let safe: String = self
            .receipt_id
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("vote-receipt-{safe}.txt")
    }

    pub fn render_text(&self) -> String {
        let title = if self.election_title.trim().is_empty() {
            self.election_id.as_str()
        } else {
            self.election_title.as_str()
        };
        let mut out = String::new();
        out.push_str("VOTE RECEIPT\n");
        out.push_str("============\n\n");
        out.push_str(&format!("Election:     {title}\n"));
        out.push_str(&format!("Vote type:    {}\n", self.vote_type));
        out.push_str(&format!("Vote ID:      {}\n", self.voting_id));
        out.push_str(&format!("Receipt ID:   {}\n", self.receipt_id));
        out.push_str(&format!("Submitted:    {}\n", self.submitted_at.to_utc_string()));
        if let Some(ticket) = &self.lottery_ticket {
            out.push_str(&format!("Lottery:      ticket #{ticket}\n"));
        }
        out.push_str(&format!("\nVote hash:\n{}\n", self.vote_hash));
        out.push_str("\nKeep this receipt to verify that your vote was counted.\n");
        out
    }

    pub fn to_json(&self) -> Result<String, ReceiptError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ReceiptError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the text rendering to `path`.
    pub fn save_text(&self, path: &Path) -> Result<(), ReceiptError> {
        fs::write(path, self.render_text())?;
        tracing::info!(path = %path.display(), receipt = %self.receipt_id, "receipt saved");
        Ok(())
    }
}

impl fmt::Display for ReceiptDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(anonymous: bool) -> VoteRecord {
        VoteRecord::new(
            "e1".into(),
            "v1".into(),
            "0123456789abcdef0123456789abcdef".into(),
            "r1".into(),
            "c1".into(),
            anonymous,
            Timestamp::new(1_709_210_096),
        )
    }

    #[test]
    fn text_contains_every_field() {
        let doc = ReceiptDocument::from_record(&record(false), "Board election", Some("42".into()));
        let text = doc.render_text();
        assert!(text.contains("Election:     Board election"));
        assert!(text.contains("Vote type:    Verified"));
        assert!(text.contains("Vote ID:      v1"));
        assert!(text.contains("Receipt ID:   r1"));
        assert!(text.contains("Submitted:    2024-02-29 12:34:56 UTC"));
        assert!(text.contains("ticket #42"));
        assert!(text.contains("0123456789abcdef0123456789abcdef"));
    }

    #[test]
    fn anonymous_vote_type_and_no_lottery_line() {
        let doc = ReceiptDocument::from_record(&record(true), "Board election", None);
        let text = doc.render_text();
        assert!(text.contains("Vote type:    Anonymous"));
        assert!(!text.contains("Lottery"));
    }

    #[test]
    fn verification_code_is_not_printed() {
        let doc = ReceiptDocument::from_record(&record(false), "Board", None);
        assert!(!doc.to_json().unwrap().contains("\"c1\""));
    }

    #[test]
    fn blank_title_falls_back_to_election_id() {
        let doc = ReceiptDocument::from_record(&record(false), "  ", None);
        assert!(doc.render_text().contains("Election:     e1"));
    }

    #[test]
    fn json_uses_camel_case() {
        let doc = ReceiptDocument::from_record(&record(true), "Board", None);
        let value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(value["receiptId"], "r1");
        assert_eq!(value["voteType"], "anonymous");
        assert_eq!(value["submittedAt"], 1_709_210_096);
        assert!(value.get("lotteryTicket").is_none());
        assert_eq!(ReceiptDocument::from_json(&doc.to_json().unwrap()).unwrap(), doc);
    }

    #[test]
    fn file_name_is_path_safe() {
        let rec = VoteRecord::new(
            "e1".into(),
            "v1".into(),
            "h".into(),
            "r/1 x".into(),
            "c".into(),
            false,
            Timestamp::EPOCH,
        );
        let doc = ReceiptDocument::from_record(&rec, "Board", None);
        assert_eq!(doc.file_name(), "vote-receipt-r_1_x.txt");
    }

    #[test]
    fn save_writes_text() {
        let dir = tempfile::tempdir().unwrap();
        let doc = ReceiptDocument::from_record(&record(false), "Board", None);
        let path = dir.path().join(doc.file_name());
        doc.save_text(&path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), doc.render_text());
    }
}
