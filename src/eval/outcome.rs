use serde::Serialize;

/// Classification of how an evaluation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    GenericError,
    CommandNotFound,
    InvalidArguments,
    SyntaxError,
    #[serde(rename = "io_error")]
    IoError,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::GenericError => "generic_error",
            Status::CommandNotFound => "command_not_found",
            Status::InvalidArguments => "invalid_arguments",
            Status::SyntaxError => "syntax_error",
            Status::IoError => "io_error",
        }
    }

    /// Line printed to stderr by the read-loop when a directive fails.
    pub fn message(self) -> &'static str {
        match self {
            Status::Success => "ok",
            Status::GenericError => "error occurred",
            Status::CommandNotFound => "command not found",
            Status::InvalidArguments => "invalid number of arguments",
            Status::SyntaxError => "input is not recognized",
            Status::IoError => "file I/O error",
        }
    }

    /// Process exit code for one-shot mode.
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Success => 0,
            Status::GenericError => 1,
            Status::InvalidArguments => 2,
            Status::SyntaxError => 3,
            Status::IoError => 4,
            Status::CommandNotFound => 127,
        }
    }
}

/// What one evaluation produced: a status and, optionally, text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub status: Status,
    pub output: Option<String>,
}

impl Outcome {
    pub fn success(output: Option<String>) -> Self {
        Self {
            status: Status::Success,
            output,
        }
    }

    /// A failure carrying a diagnostic line.
    pub fn failure_with(status: Status, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if !message.ends_with('\n') {
            message.push('\n');
        }
        Self {
            status,
            output: Some(message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
