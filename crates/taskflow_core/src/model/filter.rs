use crate::error::AppError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    #[default]
    All,
    Completed,
    Pending,
    Overdue,
}

impl Filter {
    pub const ALL: [Filter; 4] = [
        Filter::All,
        Filter::Completed,
        Filter::Pending,
        Filter::Overdue,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::Overdue => "overdue",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Filter {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|filter| filter.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                AppError::invalid_input(format!(
                    "unknown filter '{trimmed}' (expected all, completed, pending or overdue)"
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
}
