use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Wire status token.
///
/// The status alone determines which fields a message carries: requests have
/// a key (and PUT optionally a value), success responses have key and value,
/// error responses have only a diagnostic text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Get,
    Put,
    GetSuccess,
    GetError,
    PutSuccess,
    PutUpdate,
    PutError,
    DeleteSuccess,
    DeleteError,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Get => "GET",
            Status::Put => "PUT",
            Status::GetSuccess => "GET_SUCCESS",
            Status::GetError => "GET_ERROR",
            Status::PutSuccess => "PUT_SUCCESS",
            Status::PutUpdate => "PUT_UPDATE",
            Status::PutError => "PUT_ERROR",
            Status::DeleteSuccess => "DELETE_SUCCESS",
            Status::DeleteError => "DELETE_ERROR",
        }
    }

    /// True for the two client-originated statuses.
    pub fn is_request(&self) -> bool {
        matches!(self, Status::Get | Status::Put)
    }

    /// True for the error-response statuses (key omitted on the wire).
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Status::GetError | Status::PutError | Status::DeleteError
        )
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Status::Get),
            "PUT" => Ok(Status::Put),
            "GET_SUCCESS" => Ok(Status::GetSuccess),
            "GET_ERROR" => Ok(Status::GetError),
            "PUT_SUCCESS" => Ok(Status::PutSuccess),
            "PUT_UPDATE" => Ok(Status::PutUpdate),
            "PUT_ERROR" => Ok(Status::PutError),
            "DELETE_SUCCESS" => Ok(Status::DeleteSuccess),
            "DELETE_ERROR" => Ok(Status::DeleteError),
            _ => Err(Error::Protocol(format!("invalid status token: {}", s))),
        }
    }
}

/// One protocol message, request or response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub status: Status,
    pub key: Option<String>,
    pub value: Option<String>,
}

impl Message {
    /// GET request for a key.
    pub fn get(key: impl Into<String>) -> Self {
        Self {
            status: Status::Get,
            key: Some(key.into()),
            value: None,
        }
    }

    /// PUT request; a missing value requests a delete.
    pub fn put(key: impl Into<String>, value: Option<String>) -> Self {
        Self {
            status: Status::Put,
            key: Some(key.into()),
            value,
        }
    }

    /// Success response echoing key and value.
    pub fn success(status: Status, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            status,
            key: Some(key.into()),
            value: Some(value.into()),
        }
    }

    /// Error response carrying only a diagnostic text.
    pub fn error(status: Status, text: impl Into<String>) -> Self {
        Self {
            status,
            key: None,
            value: Some(text.into()),
        }
    }
}
