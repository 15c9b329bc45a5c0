//! Error types for lumina.

use thiserror::Error;

/// Result type alias using lumina's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for lumina operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Media record not found
    #[error("Media not found: {0}")]
    MediaNotFound(uuid::Uuid),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_database() {
        let err = Error::Database(sqlx::Error::PoolClosed);
        assert!(err.to_string().starts_with("Database error:"));
    }

    #[test]
    fn test_error_display_media_not_found() {
        let id = Uuid::nil();
        let err = Error::MediaNotFound(id);
        assert_eq!(err.to_string(), format!("Media not found: {}", id));
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("negative threshold".to_string());
        assert_eq!(err.to_string(), "Invalid input: negative threshold");
    }

    #[test]
    fn test_media_not_found_with_random_uuid() {
        let id = Uuid::new_v4();
        let err = Error::MediaNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_from_sqlx_error() {
        let err: Error = sqlx::Error::RowNotFound.into();
        match err {
            Error::Database(_) => {}
            _ => panic!("Expected Database error"),
        }
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        let result = get_result();
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_error_debug_format() {
        let err = Error::InvalidInput("test".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("InvalidInput"));
    }
}
