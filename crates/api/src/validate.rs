//! Input checks run before a request is built. A failure here means no
//! network call was made.

use ssm_core::{Result, SsmError};

/// Shortest password the registration and reset forms accept.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Invite code with surrounding whitespace removed; blank codes are rejected.
pub fn token_code(raw: &str) -> Result<&str> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(SsmError::Validation("please enter a token code".into()));
    }
    Ok(code)
}

pub fn email(raw: &str) -> Result<&str> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(SsmError::Validation("email is required".into()));
    }
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(SsmError::Validation(format!("'{email}' is not a valid email address"))),
    }
}

pub fn password(raw: &str) -> Result<&str> {
    if raw.is_empty() {
        return Err(SsmError::Validation("password is required".into()));
    }
    Ok(raw)
}

/// New password plus its confirmation, as on the register and reset forms.
pub fn new_password<'a>(password: &'a str, confirm: &str) -> Result<&'a str> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(SsmError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password != confirm {
        return Err(SsmError::Validation("passwords do not match".into()));
    }
    Ok(password)
}

pub fn duration_days(days: u32) -> Result<u32> {
    if days == 0 {
        return Err(SsmError::Validation("duration must be at least one day".into()));
    }
    Ok(days)
}

/// Game types the backend knows how to install.
pub const GAME_TYPES: [&str; 2] = ["ASE", "ASA"];

pub fn game_type(raw: &str) -> Result<&'static str> {
    let wanted = raw.trim();
    GAME_TYPES
        .into_iter()
        .find(|g| g.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| {
            SsmError::Validation(format!("game type must be one of {}", GAME_TYPES.join(", ")))
        })
}

pub fn server_name(raw: &str) -> Result<&str> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(SsmError::Validation("server name is required".into()));
    }
    Ok(name)
}

pub fn port(port: u16) -> Result<u16> {
    if port == 0 {
        return Err(SsmError::Validation("port must be between 1 and 65535".into()));
    }
    Ok(port)
}
