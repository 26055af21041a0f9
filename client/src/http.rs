//! HTTP implementation of [`ElectionApi`].

use crate::api::ElectionApi;
use crate::error::ApiError;
use crate::wire::{
    AnonymousEnvelope, AnonymousProofRequest, AnonymousVerification, BulletinBoardPage,
    BulletinEnvelope, ElectionBallot, ElectionEnvelope, HashEnvelope, ReceiptEnvelope,
    ResultsSnapshot, SubmitVoteRequest, SubmitVoteResponse, VoteLookup,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use votekit_types::{ElectionId, QuestionId, ReceiptId, VoteHash};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the election backend.
///
/// Wraps `reqwest::Client` with the API base URL (e.g. `https://vote.example.org/api`)
/// and provides one typed method per endpoint.
#[derive(Clone, Debug)]
pub struct HttpElectionClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpElectionClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeouts(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!(%url, "GET");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        read_response(response).await
    }

    async fn post<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ApiError> {
        tracing::debug!(%url, "POST");
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        read_response(response).await
    }
}

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(format!("failed to read body: {e}")))?;
    decode_body(status.as_u16(), status.canonical_reason(), &body)
}

/// Turn a raw HTTP response into `T` or a typed error.
///
/// Non-2xx bodies are searched for a server-provided `message` / `error`
/// string. A 2xx body carrying `"success": false` is a rejection as well.
pub fn decode_body<T: DeserializeOwned>(
    status: u16,
    reason: Option<&str>,
    body: &str,
) -> Result<T, ApiError> {
    let json: Option<serde_json::Value> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let message = json
            .as_ref()
            .and_then(server_message)
            .or_else(|| reason.map(str::to_owned))
            .unwrap_or_else(|| format!("HTTP {status}"));
        return Err(ApiError::Status { status, message });
    }

    let json = json.ok_or_else(|| ApiError::Decode("response body is not JSON".into()))?;

    if json.get("success").and_then(|v| v.as_bool()) == Some(false) {
        let message = server_message(&json).unwrap_or_else(|| "request was rejected".into());
        return Err(ApiError::Rejected(message));
    }

    serde_json::from_value(json).map_err(|e| ApiError::Decode(e.to_string()))
}

fn server_message(json: &serde_json::Value) -> Option<String> {
    let text = |v: &serde_json::Value| v.as_str().map(str::to_owned);
    json.get("message")
        .and_then(text)
        .or_else(|| json.get("error").and_then(text))
        .or_else(|| {
            json.get("error")
                .and_then(|e| e.get("message"))
                .and_then(text)
        })
}

impl ElectionApi for HttpElectionClient {
    async fn fetch_election(&self, election: &ElectionId) -> Result<ElectionBallot, ApiError> {
        let url = self.endpoint(&["elections", election.as_str()])?;
        let env: ElectionEnvelope = self.get(url).await?;
        Ok(env.election)
    }

    async fn submit_vote(
        &self,
        request: &SubmitVoteRequest,
    ) -> Result<SubmitVoteResponse, ApiError> {
        let url = self.endpoint(&["votes"])?;
        self.post(url, request).await
    }

    async fn verify_receipt(&self, receipt: &ReceiptId) -> Result<VoteLookup, ApiError> {
        let url = self.endpoint(&["verify", "receipt", receipt.as_str()])?;
        let env: ReceiptEnvelope = self.get(url).await?;
        Ok(env.receipt)
    }

    async fn verify_hash(&self, hash: &VoteHash) -> Result<VoteLookup, ApiError> {
        let url = self.endpoint(&["verify", "hash", hash.as_str()])?;
        let env: HashEnvelope = self.get(url).await?;
        Ok(env.vote)
    }

    async fn bulletin_board(
        &self,
        election: &ElectionId,
        page: u32,
        limit: u32,
    ) -> Result<BulletinBoardPage, ApiError> {
        let mut url = self.endpoint(&["bulletin-board", election.as_str()])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());
        let env: BulletinEnvelope = self.get(url).await?;
        Ok(env.bulletin_board)
    }

    async fn verify_anonymous(
        &self,
        request: &AnonymousProofRequest,
    ) -> Result<AnonymousVerification, ApiError> {
        let url = self.endpoint(&["verify", "anonymous-vote"])?;
        let env: AnonymousEnvelope = self.post(url, request).await?;
        Ok(env.verification)
    }

    async fn live_results(
        &self,
        election: &ElectionId,
        question: Option<&QuestionId>,
    ) -> Result<ResultsSnapshot, ApiError> {
        let mut url = self.endpoint(&["results"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("electionId", election.as_str());
            if let Some(q) = question {
                query.append_pair("questionId", q.as_str());
            }
        }
        self.get(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_encodes_segments() {
        let client = HttpElectionClient::new("http://127.0.0.1:8080/api/").unwrap();
        let url = client.endpoint(&["verify", "receipt", "r 1/x"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/api/verify/receipt/r%201%2Fx");
    }

    #[test]
    fn endpoint_without_trailing_slash() {
        let client = HttpElectionClient::new("http://localhost/api").unwrap();
        let url = client.endpoint(&["results"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost/api/results");
    }

    #[test]
    fn rejects_non_base_url() {
        assert!(matches!(
            HttpElectionClient::new("mailto:someone@example.org"),
            Err(ApiError::InvalidUrl(_))
        ));
        assert!(HttpElectionClient::new("not a url").is_err());
    }

    #[test]
    fn error_status_uses_server_message() {
        let err = decode_body::<VoteLookup>(404, Some("Not Found"), r#"{"message":"Receipt not found"}"#)
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 404,
                message: "Receipt not found".into()
            }
        );
        assert_eq!(err.user_message(), "Receipt not found");
    }

    #[test]
    fn error_status_falls_back_to_reason() {
        let err = decode_body::<VoteLookup>(502, Some("Bad Gateway"), "<html>").unwrap_err();
        assert_eq!(err.user_message(), "Bad Gateway");
    }

    #[test]
    fn nested_error_message_is_found() {
        let err = decode_body::<VoteLookup>(400, None, r#"{"error":{"message":"bad hash"}}"#)
            .unwrap_err();
        assert_eq!(err.user_message(), "bad hash");
    }

    #[test]
    fn success_false_is_a_rejection() {
        let err = decode_body::<SubmitVoteResponse>(
            200,
            Some("OK"),
            r#"{"success":false,"message":"Already voted"}"#,
        )
        .unwrap_err();
        assert_eq!(err, ApiError::Rejected("Already voted".into()));
    }

    #[test]
    fn receipt_envelope_decodes() {
        let env: ReceiptEnvelope = decode_body(
            200,
            Some("OK"),
            r#"{"receipt":{"election_title":"Board","voting_id":"v1","vote_hash":"h1"}}"#,
        )
        .unwrap();
        assert_eq!(env.receipt.voting_id.as_str(), "v1");
        assert_eq!(env.receipt.election_title, "Board");
    }

    #[test]
    fn bulletin_envelope_decodes() {
        let env: BulletinEnvelope = decode_body(
            200,
            None,
            r#"{"bulletinBoard":{"electionTitle":"Board","totalVotes":1,"votes":[{"voting_id":"v1","receipt_id":"r1","is_anonymous":true}]}}"#,
        )
        .unwrap();
        assert_eq!(env.bulletin_board.votes.len(), 1);
    }

    #[test]
    fn submit_response_decodes() {
        let resp: SubmitVoteResponse = decode_body(
            201,
            None,
            r#"{"votingId":"v1","voteHash":"h1","receiptId":"r1","verificationCode":"c1"}"#,
        )
        .unwrap();
        assert_eq!(resp.receipt_id.as_str(), "r1");
        assert!(resp.lottery_ticket.is_none());
    }
}
