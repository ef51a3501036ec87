//! Authentication primitives: login credentials and registration requests.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::UserValidationError;
use super::{Email, FieldErrors, Role, Username};

/// Message shown for any blank required form field.
pub const REQUIRED_MESSAGE: &str = "This field is required.";
/// Message shown when the password confirmation differs.
pub const PASSWORD_MISMATCH_MESSAGE: &str = "Field must be equal to password.";
/// Message shown when the username is already registered.
pub const DUPLICATE_USERNAME_MESSAGE: &str = "Please use a different username.";
/// Message shown when the email is already registered.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "Please use a different email address.";

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

impl From<LoginValidationError> for FieldErrors {
    fn from(error: LoginValidationError) -> Self {
        let field = match error {
            LoginValidationError::EmptyUsername => "username",
            LoginValidationError::EmptyPassword => "password",
        };
        let mut errors = FieldErrors::new();
        errors.push(field, "required", REQUIRED_MESSAGE);
        errors
    }
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but keeps caller-provided
///   whitespace.
///
/// # Examples
/// ```
/// use medlink::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" alice ", "pw").unwrap();
/// assert_eq!(creds.username(), "alice");
/// assert_eq!(creds.password(), "pw");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Raw registration form fields, exactly as submitted.
#[derive(Debug, Clone, Copy)]
pub struct RegistrationForm<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub password2: &'a str,
    pub role: &'a str,
}

/// Username and email from a registration form that passed their own shape
/// checks, whatever happened to the other fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimedIdentity {
    pub username: Option<Username>,
    pub email: Option<Email>,
}

/// A registration form that failed shape validation.
#[derive(Debug, Clone)]
pub struct RejectedRegistration {
    /// Every failing field, in form order.
    pub errors: FieldErrors,
    /// Identity fields that were well formed, for uniqueness checks.
    pub identity: ClaimedIdentity,
}

/// A registration request whose fields passed shape validation.
///
/// Uniqueness of the username and email is checked later against the user
/// store.
///
/// # Examples
/// ```
/// use medlink::domain::{Registration, RegistrationForm, Role};
///
/// let registration = Registration::validate(RegistrationForm {
///     username: "bob",
///     email: "B@X.com",
///     password: "pw",
///     password2: "pw",
///     role: "doctor",
/// })
/// .unwrap();
/// assert_eq!(registration.email().as_ref(), "b@x.com");
/// assert_eq!(registration.role(), Role::Doctor);
/// ```
#[derive(Debug, Clone)]
pub struct Registration {
    username: Username,
    email: Email,
    password: Zeroizing<String>,
    role: Role,
}

impl Registration {
    /// Validate every field, collecting all failures.
    pub fn validate(form: RegistrationForm<'_>) -> Result<Self, RejectedRegistration> {
        let mut errors = FieldErrors::new();

        let username = Username::new(form.username)
            .map_err(|err| errors.push("username", code_for(&err), err.to_string()))
            .ok();
        let email = Email::new(form.email)
            .map_err(|err| errors.push("email", code_for(&err), err.to_string()))
            .ok();

        if form.password.is_empty() {
            errors.push("password", "required", REQUIRED_MESSAGE);
        }
        if form.password2.is_empty() {
            errors.push("password2", "required", REQUIRED_MESSAGE);
        } else if form.password2 != form.password {
            errors.push("password2", "mismatch", PASSWORD_MISMATCH_MESSAGE);
        }

        let role = form
            .role
            .parse::<Role>()
            .map_err(|err| errors.push("role", code_for(&err), err.to_string()))
            .ok();

        match (username, email, role) {
            (Some(username), Some(email), Some(role)) if errors.is_empty() => Ok(Self {
                username,
                email,
                password: Zeroizing::new(form.password.to_owned()),
                role,
            }),
            (username, email, _) => Err(RejectedRegistration {
                errors,
                identity: ClaimedIdentity { username, email },
            }),
        }
    }

    /// The username and email this registration claims.
    pub fn identity(&self) -> ClaimedIdentity {
        ClaimedIdentity {
            username: Some(self.username.clone()),
            email: Some(self.email.clone()),
        }
    }

    /// Requested login name.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Normalised contact address.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Plaintext password to hash.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Requested role.
    pub fn role(&self) -> Role {
        self.role
    }
}

fn code_for(error: &UserValidationError) -> &'static str {
    match error {
        UserValidationError::EmptyUsername
        | UserValidationError::EmptyEmail
        | UserValidationError::EmptyRole
        | UserValidationError::EmptyId => "required",
        UserValidationError::UsernameTooLong { .. } | UserValidationError::EmailTooLong { .. } => {
            "too_long"
        }
        UserValidationError::InvalidEmail => "invalid_email",
        UserValidationError::UnknownRole { .. } => "invalid_role",
        UserValidationError::InvalidId => "invalid",
    }
}
