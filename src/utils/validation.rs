use crate::utils::error::FieldError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^\S+@\S+\.\S+$").unwrap();
    // Dot-atom local part: no quoting, no leading, trailing or doubled dots
    static ref EMAIL_LOCAL_RE: Regex =
        Regex::new(r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*$").unwrap();
    static ref DOMAIN_LABEL_RE: Regex = Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").unwrap();
    static ref TLD_RE: Regex = Regex::new(r"^(?:[A-Za-z]{2,63}|xn--[A-Za-z0-9-]{2,59})$").unwrap();
    /// Indian mobile numbers: 10 ASCII digits, leading 6-9.
    static ref PHONE_RE: Regex = Regex::new(r"^[6-9][0-9]{9}$").unwrap();
}

pub const NAME_MIN_LEN: usize = 3;
pub const EMAIL_MIN_LEN: usize = 5;
pub const PASSWORD_MIN_LEN: usize = 6;

const EMAIL_MAX_LEN: usize = 254;
const LOCAL_PART_MAX_LEN: usize = 64;

/// Address shape plus the stored-document rules (minimum length, `x@y.z`).
pub fn is_valid_email(email: &str) -> bool {
    email.chars().count() >= EMAIL_MIN_LEN && EMAIL_RE.is_match(email) && is_address(email)
}

fn is_address(email: &str) -> bool {
    if email.len() > EMAIL_MAX_LEN {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    if local.len() > LOCAL_PART_MAX_LEN || !EMAIL_LOCAL_RE.is_match(local) {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    match labels.split_last() {
        Some((tld, rest)) if !rest.is_empty() => {
            TLD_RE.is_match(tld) && rest.iter().all(|label| DOMAIN_LABEL_RE.is_match(label))
        }
        _ => false,
    }
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Collects field errors in request order.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    // First failure per field wins
    fn fail(&mut self, path: &str, value: Option<&str>, msg: &str) {
        if self.errors.iter().any(|e| e.path == path) {
            return;
        }
        self.errors.push(FieldError::body(path, value, msg));
    }

    pub fn not_empty(&mut self, path: &str, value: Option<&str>, msg: &str) -> &mut Self {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.fail(path, value, msg);
        }
        self
    }

    pub fn min_len(&mut self, path: &str, value: Option<&str>, min: usize, msg: &str) -> &mut Self {
        if value.map_or(true, |v| v.chars().count() < min) {
            self.fail(path, value, msg);
        }
        self
    }

    pub fn email(&mut self, path: &str, value: Option<&str>, msg: &str) -> &mut Self {
        if !value.map_or(false, is_valid_email) {
            self.fail(path, value, msg);
        }
        self
    }

    pub fn phone(&mut self, path: &str, value: Option<&str>, msg: &str) -> &mut Self {
        if !value.map_or(false, is_valid_phone) {
            self.fail(path, value, msg);
        }
        self
    }

    /// Like `min_len` but never echoes the value back.
    pub fn secret_min_len(&mut self, path: &str, value: Option<&str>, min: usize, msg: &str) -> &mut Self {
        if value.map_or(true, |v| v.chars().count() < min) {
            self.fail(path, None, msg);
        }
        self
    }

    pub fn secret_not_empty(&mut self, path: &str, value: Option<&str>, msg: &str) -> &mut Self {
        if value.map_or(true, str::is_empty) {
            self.fail(path, None, msg);
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }
}
