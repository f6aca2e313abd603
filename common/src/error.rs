use thiserror::Error;

pub type Res<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    // === CONVERSION ERRORS ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === APPLICATION ERRORS ===
    #[error("Missing required field: {0}")]
    ValidationMissing(String),

    #[error("Subscriber not found: {0}")]
    NotFound(String),

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Field is read-only: {0}")]
    Forbidden(String),
}

impl AppError {
    /// Message shown to the operator.
    ///
    /// Conversion errors are logged and only described in debug builds;
    /// application errors are always shown as-is.
    pub fn to_user_message(&self) -> String {
        let is_dev = cfg!(debug_assertions);

        let to_internal_message = |err_msg: &str| {
            if is_dev {
                err_msg.to_string()
            } else {
                "Internal error".to_string()
            }
        };

        match self {
            // === CONVERSION ERRORS ===
            AppError::Io(error) => {
                log::error!("I/O error: {}", error);
                to_internal_message(&error.to_string())
            }
            AppError::Json(error) => {
                log::error!("JSON error: {}", error);
                to_internal_message(&error.to_string())
            }

            // === APPLICATION ERRORS ===
            AppError::ValidationMissing(_)
            | AppError::NotFound(_)
            | AppError::MalformedSnapshot(_)
            | AppError::Forbidden(_) => self.to_string(),
        }
    }
}
