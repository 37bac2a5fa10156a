use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not original article.")]
    NotOriginalArticle,

    #[error("Missing mandatory field: {0}")]
    MissingField(&'static str),

    #[error("Invalid publish timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("{url} responded with {status}")]
    HttpStatus { url: String, status: reqwest::StatusCode },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{} is not exist.", .0.display())]
    InputNotFound(PathBuf),
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Io {
            path: path.into(),
            source,
        }
    }

    /// Errors after which the run cannot meaningfully continue.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::Io { .. } | AppError::Config(_) | AppError::InputNotFound(_)
        )
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Fetch {
            url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_message_matches_cli_wording() {
        let err = AppError::InputNotFound(PathBuf::from("urls.txt"));
        assert_eq!(err.to_string(), "urls.txt is not exist.");
        assert!(err.is_fatal());
    }

    #[test]
    fn page_level_errors_are_not_fatal() {
        assert!(!AppError::NotOriginalArticle.is_fatal());
        assert!(!AppError::MissingField("title").is_fatal());
        assert!(
            !AppError::HttpStatus {
                url: "https://mp.weixin.qq.com/s/x".into(),
                status: reqwest::StatusCode::NOT_FOUND,
            }
            .is_fatal()
        );
    }

    #[test]
    fn io_errors_abort_the_run() {
        let err = AppError::io(
            "pic",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.is_fatal());
        assert!(err.to_string().contains("pic"));
    }
}
