use crate::error::AppError;

pub const MAX_TITLE_CHARS: usize = 150;
pub const MAX_SEASON_CHARS: usize = 50;

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Validate a trimmed title (1-150 Unicode characters).
pub fn validate_title(title: &str) -> Result<(), AppError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::Validation(format!(
            "Title must be 1-{MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(())
}

/// Validate that a required free-text field is not blank.
pub fn validate_non_blank(value: &str, name: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }
    Ok(())
}

/// Validate a trimmed season label (1-50 Unicode characters).
pub fn validate_season(season: &str) -> Result<(), AppError> {
    let season = season.trim();
    if season.is_empty() || season.chars().count() > MAX_SEASON_CHARS {
        return Err(AppError::Validation(format!(
            "Season must be 1-{MAX_SEASON_CHARS} characters"
        )));
    }
    Ok(())
}
