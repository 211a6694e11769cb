use crate::error::ValidationError;
use crate::model::{ISO_DATE, Task};
use time::Date;

pub const MIN_TEXT_LEN: usize = 3;
pub const MAX_TEXT_LEN: usize = 100;

pub fn validate_text(tasks: &[Task], text: &str) -> Result<(), ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyText);
    }

    let len = trimmed.chars().count();
    if len < MIN_TEXT_LEN {
        return Err(ValidationError::TooShort);
    }
    if len > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong);
    }

    let needle = trimmed.to_lowercase();
    let duplicate = tasks
        .iter()
        .any(|task| !task.completed && task.text.trim().to_lowercase() == needle);
    if duplicate {
        return Err(ValidationError::DuplicateTask);
    }

    Ok(())
}

pub fn validate_due_date(due_date: Option<Date>, today: Date) -> Result<(), ValidationError> {
    let due_date = due_date.ok_or(ValidationError::MissingDate)?;
    if due_date < today {
        return Err(ValidationError::PastDate);
    }
    Ok(())
}

/// Text rules first, then the date; only the first failure is reported.
pub fn validate_new_task(
    tasks: &[Task],
    text: &str,
    due_date: Option<Date>,
    today: Date,
) -> Result<(), ValidationError> {
    validate_text(tasks, text)?;
    validate_due_date(due_date, today)
}

/// Blank input means no date was chosen.
pub fn parse_due_date(raw: &str) -> Result<Option<Date>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    Date::parse(trimmed, ISO_DATE)
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate)
}

#[cfg(test)]
mod tests {
    use super::{parse_due_date, validate_due_date, validate_new_task, validate_text};
    use crate::error::ValidationError;
    use crate::model::Task;
    use time::Duration;
    use time::macros::{date, datetime};

    fn task(id: u64, text: &str, completed: bool) -> Task {
        Task {
            id,
            text: text.to_string(),
            due_date: date!(2025 - 12 - 24),
            completed,
            created_at: datetime!(2025-12-20 00:00 UTC),
            completed_at: None,
        }
    }

    #[test]
    fn text_length_boundaries() {
        assert_eq!(validate_text(&[], "   "), Err(ValidationError::EmptyText));
        assert_eq!(validate_text(&[], "ab"), Err(ValidationError::TooShort));
        assert_eq!(validate_text(&[], "abc"), Ok(()));
        assert_eq!(validate_text(&[], &"x".repeat(100)), Ok(()));
        assert_eq!(
            validate_text(&[], &"x".repeat(101)),
            Err(ValidationError::TooLong)
        );
    }

    #[test]
    fn length_is_measured_after_trimming() {
        assert_eq!(validate_text(&[], "  ab  "), Err(ValidationError::TooShort));
        let padded = format!("  {}  ", "y".repeat(100));
        assert_eq!(validate_text(&[], &padded), Ok(()));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        assert_eq!(validate_text(&[], "äöü"), Ok(()));
        assert_eq!(
            validate_text(&[], &"é".repeat(101)),
            Err(ValidationError::TooLong)
        );
    }

    #[test]
    fn duplicate_check_ignores_case_and_completed_tasks() {
        let tasks = vec![task(1, "Buy milk", false), task(2, "Walk dog", true)];

        assert_eq!(
            validate_text(&tasks, "  buy MILK "),
            Err(ValidationError::DuplicateTask)
        );
        assert_eq!(validate_text(&tasks, "walk dog"), Ok(()));
    }

    #[test]
    fn due_date_rules() {
        let today = date!(2025 - 12 - 20);

        assert_eq!(
            validate_due_date(None, today),
            Err(ValidationError::MissingDate)
        );
        assert_eq!(
            validate_due_date(Some(today - Duration::days(1)), today),
            Err(ValidationError::PastDate)
        );
        assert_eq!(validate_due_date(Some(today), today), Ok(()));
    }

    #[test]
    fn reports_first_violation_only() {
        let today = date!(2025 - 12 - 20);
        let err = validate_new_task(&[], "ab", None, today).unwrap_err();
        assert_eq!(err, ValidationError::TooShort);
    }

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_due_date(""), Ok(None));
        assert_eq!(parse_due_date(" 2025-12-24 "), Ok(Some(date!(2025 - 12 - 24))));
        assert_eq!(parse_due_date("24/12/2025"), Err(ValidationError::InvalidDate));
        assert_eq!(parse_due_date("2025-02-30"), Err(ValidationError::InvalidDate));
    }
}
