// Signup payload rules: presence, type, trim, length, then email format
//
// Fail-fast: the first violation in rule order wins, and within a rule the
// first field in declared order wins. Uniqueness is checked by the service
// because it needs the store.

use serde_json::Value;

use crate::auth::models::ValidatedRegistration;
use crate::validation::{char_len, first_missing, is_untrimmed, string_field, ValidationError};

pub const REQUIRED_FIELDS: [&str; 3] = ["email", "password", "cellphone"];
const TRIMMED_FIELDS: [&str; 2] = ["email", "password"];

pub const EMAIL_MIN_LEN: usize = 7;
pub const PASSWORD_MIN_LEN: usize = 10;
pub const PASSWORD_MAX_LEN: usize = 72;
pub const CELLPHONE_DIGITS: usize = 10;

/// Size bounds per field, in declared order
struct SizedField {
    name: &'static str,
    min: Option<usize>,
    max: Option<usize>,
}

const SIZED_FIELDS: [SizedField; 3] = [
    SizedField {
        name: "email",
        min: Some(EMAIL_MIN_LEN),
        max: None,
    },
    SizedField {
        name: "password",
        min: Some(PASSWORD_MIN_LEN),
        max: Some(PASSWORD_MAX_LEN),
    },
    SizedField {
        name: "cellphone",
        min: Some(CELLPHONE_DIGITS),
        max: Some(CELLPHONE_DIGITS),
    },
];

/// Validate a raw signup payload
pub fn validate_registration(body: &Value) -> Result<ValidatedRegistration, ValidationError> {
    if let Some(location) = first_missing(body, &REQUIRED_FIELDS) {
        return Err(ValidationError::MissingField { location });
    }

    let email = string_field(body, "email")?;
    let password = string_field(body, "password")?;
    let cellphone = match body.get("cellphone") {
        Some(Value::Number(number)) => number.as_u64(),
        _ => {
            return Err(ValidationError::InvalidType {
                location: "cellphone",
                expected: "number",
            })
        }
    };

    let text = |field: &str| if field == "email" { email } else { password };

    if let Some(location) = TRIMMED_FIELDS
        .iter()
        .copied()
        .find(|field| is_untrimmed(text(*field)))
    {
        return Err(ValidationError::UntrimmedField { location });
    }

    // Negative and fractional numbers have no digit count
    let cellphone = cellphone.ok_or_else(|| ValidationError::OutOfRange {
        location: "cellphone",
        message: "Must be a positive whole number".to_string(),
    })?;

    let length_of = |field: &str| match field {
        "cellphone" => cellphone.to_string().len(),
        other => char_len(text(other)),
    };

    let too_small = SIZED_FIELDS
        .iter()
        .find(|f| f.min.is_some_and(|min| length_of(f.name) < min));
    if let Some(field) = too_small {
        return Err(ValidationError::too_short(field.name, field.min.unwrap_or_default()));
    }

    let too_large = SIZED_FIELDS
        .iter()
        .find(|f| f.max.is_some_and(|max| length_of(f.name) > max));
    if let Some(field) = too_large {
        return Err(ValidationError::too_long(field.name, field.max.unwrap_or_default()));
    }

    if !validator::validate_email(email) {
        return Err(ValidationError::InvalidFormat {
            location: "email",
            message: "Must be a valid email address",
        });
    }

    let cellphone = i64::try_from(cellphone)
        .map_err(|_| ValidationError::too_long("cellphone", CELLPHONE_DIGITS))?;

    Ok(ValidatedRegistration {
        email: email.to_string(),
        password: password.to_string(),
        cellphone,
    })
}
