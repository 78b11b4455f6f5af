/* This file is part of the Murphy Video Proxy project
*
*  Copyright (C) 2025 Murphy Video Proxy contributors
*
*  This program is free software: you can redistribute it and/or modify
*  it under the terms of the GNU Affero General Public License as published by
*  the Free Software Foundation, either version 3 of the License, or
*  (at your option) any later version.
*
*  This program is distributed in the hope that it will be useful,
*  but WITHOUT ANY WARRANTY; without even the implied warranty of
*  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
*  GNU Affero General Public License for more details.
*
*  You should have received a copy of the GNU Affero General Public License
*  along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use std::fmt::{Debug, Display};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use cloneable_errors::{ErrorContext, IntoErrorIterator};

/// This extension will be present on a response if the response contains
/// a [`cloneable_errors::SerializableError`] encoded as json
pub struct SerializableErrorResponseMarker;

pub enum Error {
    Context(ErrorContext, StatusCode),
    EmptyStatus(StatusCode),
}

impl Error {
    pub fn set_status(self, status: StatusCode) -> Self {
        match self {
            Error::Context(err, _) => Error::Context(err, status),
            Error::EmptyStatus(..) => Error::EmptyStatus(status),
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Context(ref err, _) => Debug::fmt(err, f),
            Error::EmptyStatus(status) => f.debug_tuple("Error::EmptyStatus").field(status).finish(),
        }
    }
}
impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Context(ref err, _) => Display::fmt(err, f),
            Error::EmptyStatus(status) => write!(f, "{status}"),
        }
    }
}
impl From<ErrorContext> for Error {
    fn from(value: ErrorContext) -> Self {
        Error::Context(value, StatusCode::INTERNAL_SERVER_ERROR)
    }
}
impl std::error::Error for Error {}
impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        let (Error::Context(_, status) | Error::EmptyStatus(status)) = self;
        *status
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            Error::Context(err, _) => {
                builder.extensions_mut().insert(SerializableErrorResponseMarker);
                builder.json(err.serializable_copy())
            },
            Error::EmptyStatus(..) => builder.finish(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use cloneable_errors::anyhow;

    #[test]
    fn context_errors_default_to_internal_server_error() {
        let err = Error::from(anyhow!("boom"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.set_status(StatusCode::NOT_FOUND).status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn error_responses_carry_the_serialized_chain() {
        let resp = Error::from(anyhow!("boom")).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp.extensions().get::<SerializableErrorResponseMarker>().is_some());
    }

    #[test]
    fn empty_status_has_no_body_marker() {
        let resp = Error::EmptyStatus(StatusCode::NOT_FOUND).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.extensions().get::<SerializableErrorResponseMarker>().is_none());
    }
}
