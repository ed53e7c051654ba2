//! Viewer sign-in.
//!
//! A viewer signs in with the display name of one of the generated voters
//! (`User1`, `User2`, ...) and that voter's secret. There is no token and
//! no expiry: the only state is whether a viewer is currently signed in.

use log::{debug, info};
use std::error::Error;
use std::fmt::Display;

use crate::config::{VoterId, VoterRecord};

/// The literal prefix of every viewer identifier.
pub const USER_PREFIX: &str = "User";

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AuthError {
    /// The identifier is not `User` followed by a positive number.
    Format { identifier: String },
    /// The identifier is well formed but no voter has this number.
    NotFound { identifier: String },
    /// The secret does not match the one of the voter.
    Credential { id: VoterId },
    /// A viewer is already signed in.
    SessionActive { id: VoterId },
}

impl AuthError {
    /// The message shown to the viewer.
    ///
    /// Unknown voters and wrong secrets produce the same message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Format { .. } => {
                format!(
                    "Username must be in format: {}1, {}2, etc.",
                    USER_PREFIX, USER_PREFIX
                )
            }
            AuthError::NotFound { .. } | AuthError::Credential { .. } => {
                "Incorrect username or password.".to_string()
            }
            AuthError::SessionActive { .. } => "Log out before signing in again.".to_string(),
        }
    }
}

impl Error for AuthError {}

impl Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Format { identifier } => {
                write!(f, "malformed identifier {:?}", identifier)
            }
            AuthError::NotFound { identifier } => write!(f, "no voter for {:?}", identifier),
            AuthError::Credential { id } => write!(f, "wrong secret for voter {}", id),
            AuthError::SessionActive { id } => write!(f, "voter {} is already signed in", id),
        }
    }
}

/// Parses `User<digits>` into a voter id.
///
/// The digits may not start with a zero. Returns `Ok(None)` when the
/// identifier is well formed but the number is too large to be a voter id.
pub fn parse_identifier(identifier: &str) -> Result<Option<VoterId>, AuthError> {
    let format_error = || AuthError::Format {
        identifier: identifier.to_string(),
    };
    let digits = identifier.strip_prefix(USER_PREFIX).ok_or_else(format_error)?;
    let well_formed = !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0');
    if !well_formed {
        return Err(format_error());
    }
    Ok(digits.parse::<VoterId>().ok())
}

/// Checks an identifier and secret against the voter roll.
///
/// Surrounding whitespace is ignored in both inputs.
pub fn authenticate<'a>(
    identifier_text: &str,
    secret: &str,
    records: &'a [VoterRecord],
) -> Result<&'a VoterRecord, AuthError> {
    let identifier = identifier_text.trim();
    let not_found = || AuthError::NotFound {
        identifier: identifier.to_string(),
    };
    let id = parse_identifier(identifier)?.ok_or_else(not_found)?;
    let record = records.iter().find(|r| r.id == id).ok_or_else(not_found)?;
    if record.secret != secret.trim() {
        debug!("authenticate: wrong secret for voter {}", id);
        return Err(AuthError::Credential { id });
    }
    Ok(record)
}

/// The sign-in state of the single viewer.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub enum Session {
    #[default]
    LoggedOut,
    LoggedIn(VoterId),
}

impl Session {
    pub fn login<'a>(
        &mut self,
        identifier_text: &str,
        secret: &str,
        records: &'a [VoterRecord],
    ) -> Result<&'a VoterRecord, AuthError> {
        if let Session::LoggedIn(id) = *self {
            return Err(AuthError::SessionActive { id });
        }
        let record = authenticate(identifier_text, secret, records)?;
        info!("Session: {} signed in", record.name);
        *self = Session::LoggedIn(record.id);
        Ok(record)
    }

    /// Signs the viewer out. Returns the voter that was signed in, if any.
    pub fn logout(&mut self) -> Option<VoterId> {
        let previous = self.current();
        if let Some(id) = previous {
            info!("Session: voter {} signed out", id);
        }
        *self = Session::LoggedOut;
        previous
    }

    pub fn current(&self) -> Option<VoterId> {
        match self {
            Session::LoggedOut => None,
            Session::LoggedIn(id) => Some(*id),
        }
    }
}
