use crate::constants::{
    MAX_GOAL_TEXT_LEN, MAX_LONG_BREAK_INTERVAL, MAX_NOTES_LEN, MAX_SESSION_NAME_LEN,
    MAX_LINK_NAME_LEN, MAX_LINK_URL_LEN, MAX_TIMER_SECS, UNTITLED_SESSION_NAME,
};
use crate::error::AppError;
use crate::models::Settings;
use url::Url;

/// Validate a session name. Blank names become the untitled placeholder.
pub fn validate_session_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Ok(UNTITLED_SESSION_NAME.to_string());
    }
    if name.chars().count() > MAX_SESSION_NAME_LEN {
        return Err(AppError::InvalidInput {
            field: "name",
            reason: format!("cannot exceed {MAX_SESSION_NAME_LEN} characters"),
        });
    }
    Ok(name.to_string())
}

/// Validate goal text.
pub fn validate_goal_text(text: &str) -> Result<&str, AppError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::InvalidInput {
            field: "goal",
            reason: "cannot be empty".into(),
        });
    }
    if text.chars().count() > MAX_GOAL_TEXT_LEN {
        return Err(AppError::InvalidInput {
            field: "goal",
            reason: format!("cannot exceed {MAX_GOAL_TEXT_LEN} characters"),
        });
    }
    Ok(text)
}

/// Validate a description or reflection.
pub fn validate_notes(field: &'static str, text: &str) -> Result<(), AppError> {
    if text.chars().count() > MAX_NOTES_LEN {
        return Err(AppError::InvalidInput {
            field,
            reason: format!("cannot exceed {MAX_NOTES_LEN} characters"),
        });
    }
    Ok(())
}

/// Validate a timer duration in seconds.
pub fn validate_timer_secs(field: &'static str, secs: u32) -> Result<(), AppError> {
    if secs == 0 {
        return Err(AppError::InvalidInput {
            field,
            reason: "must be positive".into(),
        });
    }
    if secs > MAX_TIMER_SECS {
        return Err(AppError::InvalidInput {
            field,
            reason: "cannot exceed 24 hours".into(),
        });
    }
    Ok(())
}

/// Validate the number of work phases between long breaks.
pub fn validate_long_break_interval(interval: u32) -> Result<(), AppError> {
    if !(1..=MAX_LONG_BREAK_INTERVAL).contains(&interval) {
        return Err(AppError::InvalidInput {
            field: "longBreakInterval",
            reason: format!("must be 1-{MAX_LONG_BREAK_INTERVAL}"),
        });
    }
    Ok(())
}

/// Validate every numeric field of a settings record.
pub fn validate_settings(settings: &Settings) -> Result<(), AppError> {
    let pomodoro = &settings.pomodoro_settings;
    validate_timer_secs("standardTimerDuration", settings.standard_timer_duration)?;
    validate_timer_secs("workDuration", pomodoro.work_duration)?;
    validate_timer_secs("shortBreakDuration", pomodoro.short_break_duration)?;
    validate_timer_secs("longBreakDuration", pomodoro.long_break_duration)?;
    validate_long_break_interval(pomodoro.long_break_interval)?;
    Ok(())
}

/// Validate the display name of a blocked site or study material.
pub fn validate_link_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput {
            field: "name",
            reason: "cannot be empty".into(),
        });
    }
    if name.chars().count() > MAX_LINK_NAME_LEN {
        return Err(AppError::InvalidInput {
            field: "name",
            reason: format!("cannot exceed {MAX_LINK_NAME_LEN} characters"),
        });
    }
    Ok(name)
}

/// Reduce a user-entered site address to its lowercase host.
///
/// Accepts bare hosts (`reddit.com`) as well as full URLs; a leading `www.`
/// is dropped so both spellings name the same site.
pub fn normalize_site_url(input: &str) -> Result<String, AppError> {
    let err = |reason: &str| AppError::InvalidInput {
        field: "url",
        reason: reason.into(),
    };

    let input = input.trim();
    if input.is_empty() {
        return Err(err("cannot be empty"));
    }
    if input.len() > MAX_LINK_URL_LEN {
        return Err(err("too long"));
    }

    let with_scheme = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{input}")
    };
    let parsed = Url::parse(&with_scheme).map_err(|e| err(&e.to_string()))?;
    let host = parsed.host_str().ok_or_else(|| err("missing host"))?;
    let host = host.strip_prefix("www.").unwrap_or(host);

    if !host.contains('.') {
        return Err(err("must include a domain, e.g. example.com"));
    }
    Ok(host.to_string())
}

/// Normalize a study material link to a full http(s) URL.
///
/// A missing scheme defaults to `https://`.
pub fn normalize_material_url(input: &str) -> Result<String, AppError> {
    let err = |reason: &str| AppError::InvalidInput {
        field: "url",
        reason: reason.into(),
    };

    let input = input.trim();
    if input.is_empty() {
        return Err(err("cannot be empty"));
    }
    if input.len() > MAX_LINK_URL_LEN {
        return Err(err("too long"));
    }

    let with_scheme = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{input}")
    };
    let parsed = Url::parse(&with_scheme).map_err(|e| err(&e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(err(&format!("unsupported scheme '{other}'"))),
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(err("missing host"));
    }
    Ok(parsed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_session_name_trims() {
        assert_eq!(validate_session_name("  Calculus  ").unwrap(), "Calculus");
    }

    #[test]
    fn test_validate_session_name_blank_becomes_untitled() {
        assert_eq!(validate_session_name("   ").unwrap(), UNTITLED_SESSION_NAME);
    }

    #[test]
    fn test_validate_session_name_too_long() {
        let name = "x".repeat(MAX_SESSION_NAME_LEN + 1);
        assert!(validate_session_name(&name).is_err());
    }

    #[test]
    fn test_validate_goal_text() {
        assert_eq!(validate_goal_text(" Finish set 4 ").unwrap(), "Finish set 4");
        assert!(validate_goal_text("").is_err());
        assert!(validate_goal_text("   ").is_err());
    }

    #[test]
    fn test_validate_timer_secs() {
        assert!(validate_timer_secs("workDuration", 1).is_ok());
        assert!(validate_timer_secs("workDuration", MAX_TIMER_SECS).is_ok());
        assert!(validate_timer_secs("workDuration", 0).is_err());
        assert!(validate_timer_secs("workDuration", MAX_TIMER_SECS + 1).is_err());
    }

    #[test]
    fn test_validate_long_break_interval() {
        assert!(validate_long_break_interval(1).is_ok());
        assert!(validate_long_break_interval(4).is_ok());
        assert!(validate_long_break_interval(0).is_err());
        assert!(validate_long_break_interval(MAX_LONG_BREAK_INTERVAL + 1).is_err());
    }

    #[test]
    fn test_validate_settings_defaults_ok() {
        assert!(validate_settings(&Settings::default()).is_ok());
    }

    #[test]
    fn test_validate_settings_rejects_zero_break() {
        let mut settings = Settings::default();
        settings.pomodoro_settings.short_break_duration = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_normalize_site_url() {
        assert_eq!(normalize_site_url("reddit.com").unwrap(), "reddit.com");
        assert_eq!(normalize_site_url("https://www.YouTube.com/watch?v=1").unwrap(), "youtube.com");
        assert_eq!(normalize_site_url("http://news.ycombinator.com/").unwrap(), "news.ycombinator.com");
    }

    #[test]
    fn test_normalize_site_url_invalid() {
        assert!(normalize_site_url("").is_err());
        assert!(normalize_site_url("localhost").is_err());
        assert!(normalize_site_url("https://").is_err());
    }

    #[test]
    fn test_normalize_material_url() {
        assert_eq!(
            normalize_material_url("docs.rs/serde").unwrap(),
            "https://docs.rs/serde"
        );
        assert_eq!(
            normalize_material_url(" http://Example.com/notes.pdf ").unwrap(),
            "http://example.com/notes.pdf"
        );
        assert!(normalize_material_url("").is_err());
        assert!(normalize_material_url("ftp://example.com/file").is_err());
        assert!(normalize_material_url("javascript://alert(1)").is_err());
    }

    #[test]
    fn test_validate_link_name() {
        assert_eq!(validate_link_name(" Reddit ").unwrap(), "Reddit");
        assert!(validate_link_name(" ").is_err());
    }
}
