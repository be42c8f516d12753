use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    InvalidInput(String),
    InvalidData(String),
    Io(String),
    Parse(String),
    Validation(String),
    NotFound(String),
    Ambiguous(String),
    NoCurrentTask(String),
    AlreadyWorking(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn parse<M: Into<String>>(message: M) -> Self {
        Self::Parse(message.into())
    }

    pub fn validation<M: Into<String>>(message: M) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found<M: Into<String>>(message: M) -> Self {
        Self::NotFound(message.into())
    }

    pub fn ambiguous<M: Into<String>>(message: M) -> Self {
        Self::Ambiguous(message.into())
    }

    pub fn no_current_task<M: Into<String>>(message: M) -> Self {
        Self::NoCurrentTask(message.into())
    }

    pub fn already_working<M: Into<String>>(message: M) -> Self {
        Self::AlreadyWorking(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
            Self::Parse(_) => "parse_error",
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Ambiguous(_) => "ambiguous",
            Self::NoCurrentTask(_) => "no_current_task",
            Self::AlreadyWorking(_) => "already_working",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(message)
            | Self::InvalidData(message)
            | Self::Io(message)
            | Self::Parse(message)
            | Self::Validation(message)
            | Self::NotFound(message)
            | Self::Ambiguous(message)
            | Self::NoCurrentTask(message)
            | Self::AlreadyWorking(message) => message,
        }
    }

    /// Process exit status used by the CLI surface.
    pub fn exit_status(&self) -> i32 {
        match self {
            Self::NotFound(_) => 2,
            Self::AlreadyWorking(_) => 3,
            Self::NoCurrentTask(_) => 4,
            Self::Ambiguous(_) => 5,
            Self::Parse(_) | Self::Validation(_) => 6,
            _ => 1,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {}
