use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    InvalidInput(String),
    InvalidData(String),
    Io(String),
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

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(message) => message,
            Self::InvalidData(message) => message,
            Self::Io(message) => message,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidInput(err.message().to_string())
    }
}

/// Rejection reasons for a new task, reported one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    EmptyText,
    TooShort,
    TooLong,
    DuplicateTask,
    MissingDate,
    InvalidDate,
    PastDate,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyText => "empty_text",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::DuplicateTask => "duplicate_task",
            Self::MissingDate => "missing_date",
            Self::InvalidDate => "invalid_date",
            Self::PastDate => "past_date",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::EmptyText => "Task cannot be empty",
            Self::TooShort => "Task must be at least 3 characters long",
            Self::TooLong => "Task must be less than 100 characters",
            Self::DuplicateTask => "This task already exists",
            Self::MissingDate => "Please select a due date",
            Self::InvalidDate => "Due date must be a valid YYYY-MM-DD date",
            Self::PastDate => "Due date cannot be in the past",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ValidationError {}
