//! Verification results: one success or failure per method.

use crate::method::VerificationMethod;
use std::fmt;
use votekit_client::{AnonymousVerification, ApiError, BulletinBoardPage, VoteLookup};

/// Why a verification did not succeed, as shown to the voter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationFailure {
    pub method: VerificationMethod,
    pub message: String,
    /// HTTP status, when the backend answered.
    pub status: Option<u16>,
}

impl VerificationFailure {
    pub fn from_api(method: VerificationMethod, error: &ApiError) -> Self {
        Self {
            method,
            message: error.user_message(),
            status: error.status(),
        }
    }
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} verification failed: {}", self.method, self.message)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    Receipt(Result<VoteLookup, VerificationFailure>),
    Hash(Result<VoteLookup, VerificationFailure>),
    Bulletin(Result<BulletinBoardPage, VerificationFailure>),
    Anonymous(Result<AnonymousVerification, VerificationFailure>),
}

impl VerificationOutcome {
    pub fn receipt(response: Result<VoteLookup, ApiError>) -> Self {
        Self::Receipt(response.map_err(|e| VerificationFailure::from_api(VerificationMethod::Receipt, &e)))
    }

    pub fn hash(response: Result<VoteLookup, ApiError>) -> Self {
        Self::Hash(response.map_err(|e| VerificationFailure::from_api(VerificationMethod::Hash, &e)))
    }

    pub fn bulletin(response: Result<BulletinBoardPage, ApiError>) -> Self {
        Self::Bulletin(response.map_err(|e| VerificationFailure::from_api(VerificationMethod::Bulletin, &e)))
    }

    /// A proof the backend answered but did not accept is a failure too.
    pub fn anonymous(response: Result<AnonymousVerification, ApiError>) -> Self {
        let method = VerificationMethod::Anonymous;
        Self::Anonymous(match response {
            Ok(v) if v.is_valid => Ok(v),
            Ok(v) => Err(VerificationFailure {
                method,
                message: v
                    .message
                    .unwrap_or_else(|| "the anonymous vote proof was not accepted".into()),
                status: None,
            }),
            Err(e) => Err(VerificationFailure::from_api(method, &e)),
        })
    }

    pub fn method(&self) -> VerificationMethod {
        match self {
            Self::Receipt(_) => VerificationMethod::Receipt,
            Self::Hash(_) => VerificationMethod::Hash,
            Self::Bulletin(_) => VerificationMethod::Bulletin,
            Self::Anonymous(_) => VerificationMethod::Anonymous,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure().is_none()
    }

    pub fn failure(&self) -> Option<&VerificationFailure> {
        match self {
            Self::Receipt(r) | Self::Hash(r) => r.as_ref().err(),
            Self::Bulletin(r) => r.as_ref().err(),
            Self::Anonymous(r) => r.as_ref().err(),
        }
    }

    /// The vote found by a receipt or hash lookup.
    pub fn lookup(&self) -> Option<&VoteLookup> {
        match self {
            Self::Receipt(Ok(v)) | Self::Hash(Ok(v)) => Some(v),
            _ => None,
        }
    }

    pub fn bulletin_page(&self) -> Option<&BulletinBoardPage> {
        match self {
            Self::Bulletin(Ok(page)) => Some(page),
            _ => None,
        }
    }
}
