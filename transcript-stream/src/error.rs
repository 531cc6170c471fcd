//! Internal error helpers for mapping HTTP/reqwest errors to [`TransportError`].

use transcript_types::TransportError;

/// Map a non-success HTTP status from the backend to a [`TransportError`].
pub(crate) fn map_http_status(status: reqwest::StatusCode, body: &str) -> TransportError {
    TransportError::Http {
        status: status.as_u16(),
        body: body.to_string(),
    }
}

/// Map a [`reqwest::Error`] raised while sending the request.
pub(crate) fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(Box::new(err))
    }
}

/// Map a [`reqwest::Error`] raised while reading the response body.
pub(crate) fn map_body_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Stream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_preserved() {
        let err = map_http_status(reqwest::StatusCode::BAD_GATEWAY, "bad gateway");
        assert!(matches!(
            err,
            TransportError::Http { status: 502, ref body } if body == "bad gateway"
        ));
    }

    #[test]
    fn empty_body_preserved_in_error() {
        let err = map_http_status(reqwest::StatusCode::BAD_REQUEST, "");
        assert!(matches!(err, TransportError::Http { status: 400, ref body } if body.is_empty()));
    }

    #[test]
    fn display_includes_status() {
        let err = map_http_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom");
        let msg = err.to_string();
        assert!(msg.contains("500"), "expected status in message: {msg}");
        assert!(msg.contains("boom"), "expected body in message: {msg}");
    }
}
