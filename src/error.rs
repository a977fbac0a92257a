use thiserror::Error;

/// Failures returned by [`crate::tmdb::TmdbClient`].
///
/// Transport, HTTP status and decode problems are kept apart so callers can
/// tell a dead network from an invalid key or a changed response shape.
#[derive(Debug, Error)]
pub enum TmdbError {
    /// The request never produced a complete response (DNS, connect, timeout, body read).
    #[error("TMDB request failed ({endpoint}): {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// TMDB answered with a non-2xx status.
    #[error("TMDB API error: {status} ({endpoint})")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The body was not the JSON we expected.
    #[error("TMDB response decode failed ({endpoint}): {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TmdbError {
    pub fn endpoint(&self) -> &str {
        match self {
            TmdbError::Transport { endpoint, .. }
            | TmdbError::HttpStatus { endpoint, .. }
            | TmdbError::Decode { endpoint, .. } => endpoint,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TmdbError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_message_includes_code() {
        let err = TmdbError::HttpStatus {
            endpoint: "/person/3087".to_string(),
            status: 401,
            body: "{}".to_string(),
        };
        assert_eq!(err.to_string(), "TMDB API error: 401 (/person/3087)");
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.endpoint(), "/person/3087");
    }

    #[test]
    fn decode_message_names_endpoint() {
        let source = serde_json::from_str::<serde_json::Value>("{")
            .err()
            .expect("truncated json must fail");
        let err = TmdbError::Decode {
            endpoint: "/movie/1".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("TMDB response decode failed (/movie/1)"));
        assert_eq!(err.status(), None);
    }
}
