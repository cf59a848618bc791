//! Backend HTTP routes

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left as-is in a path component
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn trim_base(base: &str) -> &str {
    base.trim_end_matches('/')
}

/// `POST` route setting a trainer's ERG target
pub fn erg_route(base: &str, device: &str, watts: u16) -> String {
    format!(
        "{}/sensors/{}/erg/{}",
        trim_base(base),
        utf8_percent_encode(device, COMPONENT),
        watts
    )
}

/// `GET` route returning all sensor readings
pub fn telemetry_route(base: &str) -> String {
    format!("{}/sensors/data", trim_base(base))
}
