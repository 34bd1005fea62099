//! Token + cookie state of one client.
//!
//! The server hands out a token inside an HTML fragment and binds it to a
//! short lived cookie. The token itself carries no expiry, so the cookie's
//! remaining lifetime decides when to log in again.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use regex::Regex;

/// Cookies closer than this to expiry are treated as already expired.
pub const COOKIE_SAFETY_MARGIN_MS: i64 = 5000;

lazy_static::lazy_static! {
    // <html><div id='token' style='display:none;'>TOKEN</div></html>
    static ref TOKEN_REGEX: Regex = Regex::new(r">([^<]+)<").unwrap();
}

/// First `>...<` span of the token page.
pub fn extract_token(body: &str) -> Option<&str> {
    TOKEN_REGEX
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    /// `None` for a browser-session cookie, which never expires on our side
    pub expires: Option<DateTime<Utc>>,
}

impl SessionCookie {
    /// Parses one `Set-Cookie` header. `Max-Age` wins over `Expires`.
    pub fn parse(header: &str, now: DateTime<Utc>) -> Option<Self> {
        let mut parts = header.split(';');
        let (name, value) = parts.next()?.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let value = value.trim().trim_matches('"');

        let mut max_age = None;
        let mut expires = None;
        for attr in parts {
            let (key, val) = match attr.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => continue,
            };
            if key.eq_ignore_ascii_case("max-age") {
                max_age = val.parse::<i64>().ok();
            } else if key.eq_ignore_ascii_case("expires") {
                expires = parse_http_date(val);
            }
        }
        let expires = match max_age {
            Some(secs) => {
                TimeDelta::try_seconds(secs.max(0)).and_then(|d| now.checked_add_signed(d))
            }
            None => expires,
        };

        Some(Self {
            name: name.to_string(),
            value: value.to_string(),
            expires,
        })
    }

    /// Remaining lifetime, `None` meaning unbounded.
    pub fn ttl(&self, now: DateTime<Utc>) -> Option<TimeDelta> {
        self.expires.map(|e| e - now)
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.ttl(now) {
            Some(ttl) => ttl.num_milliseconds() < COOKIE_SAFETY_MARGIN_MS,
            None => false,
        }
    }

    /// Value for the `Cookie` request header
    pub fn header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

fn parse_http_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc2822(s) {
        return Some(t.with_timezone(&Utc));
    }
    // netscape style, `Wed, 21-Oct-2015 07:28:00 GMT`
    NaiveDateTime::parse_from_str(s, "%a, %d-%b-%Y %H:%M:%S GMT")
        .ok()
        .map(|t| t.and_utc())
}

/// What one authenticated request needs to carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Credentials {
    pub token: String,
    pub cookie: Option<String>,
}

#[derive(Debug, Default)]
pub struct Session {
    token: Option<String>,
    cookie: Option<SessionCookie>,
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn cookie(&self) -> Option<&SessionCookie> {
        self.cookie.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Replaces the whole session at once; there is no partial update.
    pub(crate) fn establish(&mut self, token: String, cookie: Option<SessionCookie>) {
        self.token = Some(token);
        self.cookie = cookie;
    }

    pub fn reset(&mut self) {
        self.token = None;
        self.cookie = None;
    }

    /// Drops the session when its cookie is about to expire. Returns whether
    /// anything was dropped.
    pub fn expire_stale(&mut self, now: DateTime<Utc>) -> bool {
        match &self.cookie {
            Some(cookie) if cookie.is_stale(now) => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn credentials(&self) -> Option<Credentials> {
        let token = self.token.clone()?;
        Some(Credentials {
            token,
            cookie: self.cookie.as_ref().map(SessionCookie::header_value),
        })
    }
}
