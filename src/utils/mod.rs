pub mod redact;
pub mod url_validation;
