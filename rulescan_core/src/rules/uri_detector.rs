//! URI detection conforming to RFC 3986 / RFC 3987
//!
//! The detector is a hand-written recursive-descent scanner over the IRI
//! grammar. Each production handler consumes from the front of a slice and
//! reports how many bytes it ate; productions marked nullable may eat zero.
//! IPv6 literal bodies are not parsed (matching the behavior this engine
//! was ported from); IPvFuture and IPv4 literals are.

use crate::rules::{HashTable, RuleError};
use std::ops::Range;
use std::sync::{Arc, OnceLock};

// ---------------------------------------------------------------------------
// Production handlers. `Option<usize>` handlers fail with None; `usize`
// handlers are nullable and may return 0.
// ---------------------------------------------------------------------------

fn first_char(s: &str) -> Option<char> {
    s.chars().next()
}

// sub-delims = "!" / "$" / "&" / "'" / "(" / ")" / "*" / "+" / "," / ";" / "="
fn sub_delims(s: &str) -> Option<usize> {
    match first_char(s)? {
        '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '=' => Some(1),
        _ => None,
    }
}

// unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"
fn unreserved(s: &str) -> Option<usize> {
    match first_char(s)? {
        c if c.is_ascii_alphanumeric() => Some(1),
        '-' | '.' | '_' | '~' => Some(1),
        _ => None,
    }
}

// pct-encoded = "%" HEXDIG HEXDIG
fn pct_encoded(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.len() >= 3
        && bytes[0] == b'%'
        && bytes[1].is_ascii_hexdigit()
        && bytes[2].is_ascii_hexdigit()
    {
        Some(3)
    } else {
        None
    }
}

// ucschar = %xA0-D7FF / %xF900-FDCF / %xFDF0-FFEF
//         / planes 1-D minus noncharacters / %xE1000-EFFFD
fn ucschar(s: &str) -> Option<usize> {
    let c = first_char(s)?;
    let v = c as u32;
    let plane = v >> 16;
    let ok = (0x00a0..=0xd7ff).contains(&v)
        || (0xf900..=0xfdcf).contains(&v)
        || (0xfdf0..=0xffef).contains(&v)
        || ((1..=0xd).contains(&plane) && (v & 0xffff) <= 0xfffd)
        || (0xe1000..=0xefffd).contains(&v);
    if ok {
        Some(c.len_utf8())
    } else {
        None
    }
}

// iprivate = %xE000-F8FF / %xF0000-FFFFD / %x100000-10FFFD
fn iprivate(s: &str) -> Option<usize> {
    let c = first_char(s)?;
    let v = c as u32;
    let ok = (0xe000..=0xf8ff).contains(&v)
        || (0xf0000..=0xffffd).contains(&v)
        || (0x100000..=0x10fffd).contains(&v);
    if ok {
        Some(c.len_utf8())
    } else {
        None
    }
}

// iunreserved = unreserved / ucschar
fn iunreserved(s: &str) -> Option<usize> {
    unreserved(s).or_else(|| ucschar(s))
}

// ipchar = iunreserved / pct-encoded / sub-delims / ":" / "@"
fn pchar(s: &str) -> Option<usize> {
    iunreserved(s)
        .or_else(|| pct_encoded(s))
        .or_else(|| sub_delims(s))
        .or_else(|| match first_char(s)? {
            ':' | '@' => Some(1),
            _ => None,
        })
}

// isegment = *ipchar   [nullable]
fn segment(s: &str) -> usize {
    let mut at = 0;
    while let Some(n) = pchar(&s[at..]) {
        at += n;
    }
    at
}

// isegment-nz = 1*ipchar
fn segment_nz(s: &str) -> Option<usize> {
    match segment(s) {
        0 => None,
        n => Some(n),
    }
}

// ipath-abempty = *( "/" isegment )   [nullable]
fn path_abempty(s: &str) -> usize {
    let mut at = 0;
    while s[at..].starts_with('/') {
        at += 1 + segment(&s[at + 1..]);
    }
    at
}

// ipath-rootless = isegment-nz *( "/" isegment )
fn path_rootless(s: &str) -> Option<usize> {
    let n = segment_nz(s)?;
    Some(n + path_abempty(&s[n..]))
}

// ipath-absolute = "/" [ isegment-nz *( "/" isegment ) ]
fn path_absolute(s: &str) -> Option<usize> {
    if s.starts_with('/') {
        path_rootless(&s[1..]).map(|n| n + 1)
    } else {
        None
    }
}

// dec-octet = "0"-"9" / "10"-"99" / "100"-"255"
fn dec_octet(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut len = 0;
    while len < bytes.len() && len < 3 && bytes[len].is_ascii_digit() {
        len += 1;
    }
    match len {
        0 => None,
        1 => Some(1),
        2 => {
            if bytes[0] == b'0' {
                Some(1)
            } else {
                Some(2)
            }
        }
        _ => {
            let value = s[..3].parse::<u32>().ok()?;
            if bytes[0] == b'0' {
                Some(1)
            } else if value <= 255 {
                Some(3)
            } else {
                Some(2)
            }
        }
    }
}

// IPv4address = dec-octet "." dec-octet "." dec-octet "." dec-octet
fn ipv4_address(s: &str) -> Option<usize> {
    let mut at = dec_octet(s)?;
    for _ in 0..3 {
        if !s[at..].starts_with('.') {
            return None;
        }
        at += 1;
        at += dec_octet(&s[at..])?;
    }
    Some(at)
}

// IPvFuture = "v" 1*HEXDIG "." 1*( unreserved / sub-delims / ":" )
fn ipv_future(s: &str) -> Option<usize> {
    if !s.starts_with('v') {
        return None;
    }
    let bytes = s.as_bytes();
    let mut at = 1;
    while at < bytes.len() && bytes[at].is_ascii_hexdigit() {
        at += 1;
    }
    if at == 1 || !s[at..].starts_with('.') {
        return None;
    }
    at += 1;
    let body_start = at;
    loop {
        let rest = &s[at..];
        if let Some(n) = unreserved(rest).or_else(|| sub_delims(rest)) {
            at += n;
        } else if rest.starts_with(':') {
            at += 1;
        } else {
            break;
        }
    }
    if at > body_start {
        Some(at)
    } else {
        None
    }
}

// IP-literal = "[" ( IPv6address / IPvFuture ) "]"
// IPv6 bodies are not parsed, only IPvFuture is accepted here.
fn ip_literal(s: &str) -> Option<usize> {
    if !s.starts_with('[') {
        return None;
    }
    let n = ipv_future(&s[1..])?;
    if s[1 + n..].starts_with(']') {
        Some(n + 2)
    } else {
        None
    }
}

// ireg-name = *( iunreserved / pct-encoded / sub-delims )   [nullable]
fn reg_name(s: &str) -> usize {
    let mut at = 0;
    loop {
        let rest = &s[at..];
        match iunreserved(rest)
            .or_else(|| pct_encoded(rest))
            .or_else(|| sub_delims(rest))
        {
            Some(n) => at += n,
            None => return at,
        }
    }
}

// ihost = IP-literal / IPv4address / ireg-name   [nullable]
fn host(s: &str) -> usize {
    ip_literal(s)
        .or_else(|| ipv4_address(s))
        .unwrap_or_else(|| reg_name(s))
}

// port = *DIGIT   [nullable]
fn port(s: &str) -> usize {
    s.bytes().take_while(|b| b.is_ascii_digit()).count()
}

// iuserinfo = *( iunreserved / pct-encoded / sub-delims / ":" )   [nullable]
fn userinfo(s: &str) -> usize {
    let mut at = 0;
    loop {
        let rest = &s[at..];
        if let Some(n) = iunreserved(rest)
            .or_else(|| pct_encoded(rest))
            .or_else(|| sub_delims(rest))
        {
            at += n;
        } else if rest.starts_with(':') {
            at += 1;
        } else {
            return at;
        }
    }
}

// iauthority = [ iuserinfo "@" ] ihost [ ":" port ]   [nullable]
fn authority(s: &str) -> usize {
    let mut at = 0;
    let info = userinfo(s);
    if s[info..].starts_with('@') {
        at = info + 1;
    }
    at += host(&s[at..]);
    if s[at..].starts_with(':') {
        at += 1;
        at += port(&s[at..]);
    }
    at
}

// ihier-part = "//" iauthority ipath-abempty / ipath-absolute
//            / ipath-rootless / ipath-empty   [nullable]
fn hier_part(s: &str) -> usize {
    if s.starts_with("//") {
        let n = 2 + authority(&s[2..]);
        return n + path_abempty(&s[n..]);
    }
    path_absolute(s)
        .or_else(|| path_rootless(s))
        .unwrap_or(0)
}

// iquery = *( ipchar / iprivate / "/" / "?" )   [nullable]
fn query(s: &str) -> usize {
    let mut at = 0;
    loop {
        let rest = &s[at..];
        if let Some(n) = pchar(rest).or_else(|| iprivate(rest)) {
            at += n;
        } else if rest.starts_with('/') || rest.starts_with('?') {
            at += 1;
        } else {
            return at;
        }
    }
}

// ifragment = *( ipchar / "/" / "?" )   [nullable]
fn fragment(s: &str) -> usize {
    let mut at = 0;
    loop {
        let rest = &s[at..];
        if let Some(n) = pchar(rest) {
            at += n;
        } else if rest.starts_with('/') || rest.starts_with('?') {
            at += 1;
        } else {
            return at;
        }
    }
}

// scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn scheme(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.is_empty() || !bytes[0].is_ascii_alphabetic() {
        return None;
    }
    let mut at = 1;
    while at < bytes.len()
        && (bytes[at].is_ascii_alphanumeric()
            || bytes[at] == b'+'
            || bytes[at] == b'-'
            || bytes[at] == b'.')
    {
        at += 1;
    }
    Some(at)
}

// IRI = scheme ":" ihier-part [ "?" iquery ] [ "#" ifragment ]
fn iri(s: &str) -> Option<usize> {
    let mut at = scheme(s)?;
    if !s[at..].starts_with(':') {
        return None;
    }
    at += 1;
    at += hier_part(&s[at..]);
    if s[at..].starts_with('?') {
        at += 1;
        at += query(&s[at..]);
    }
    if s[at..].starts_with('#') {
        at += 1;
        at += fragment(&s[at..]);
    }
    Some(at)
}

// ---------------------------------------------------------------------------
// URIDetector
// ---------------------------------------------------------------------------

/// Detects and searches URIs in line text.
///
/// With no scheme restriction any syntactically valid scheme is accepted;
/// [`URIDetector::set_valid_schemes`] narrows detection to a fixed set.
#[derive(Debug, Clone, Default)]
pub struct URIDetector {
    valid_schemes: Option<HashTable>,
}

impl URIDetector {
    /// Create a detector that accepts any valid scheme.
    pub fn new() -> Self {
        Self {
            valid_schemes: None,
        }
    }

    /// Restrict detection to the given scheme names.
    ///
    /// RFC 3986 section 3.1 says schemes compare case-insensitively; pass
    /// `case_sensitive = true` only when you need the stricter comparison.
    pub fn set_valid_schemes<I, S>(
        &mut self,
        schemes: I,
        case_sensitive: bool,
    ) -> Result<&mut Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let schemes: Vec<String> = schemes
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        for name in &schemes {
            if scheme(name) != Some(name.len()) {
                return Err(RuleError::InvalidScheme(name.clone()));
            }
        }
        self.valid_schemes = Some(HashTable::from_words(schemes, case_sensitive)?);
        Ok(self)
    }

    /// Restrict detection to schemes listed in a separator-delimited string.
    pub fn set_valid_schemes_separated(
        &mut self,
        schemes: &str,
        separator: char,
        case_sensitive: bool,
    ) -> Result<&mut Self, RuleError> {
        self.set_valid_schemes(
            schemes.split(separator).filter(|s| !s.is_empty()),
            case_sensitive,
        )
    }

    /// Return the end offset of a URI that starts at offset 0 of `text`,
    /// or `None` when the text does not begin with one.
    pub fn detect(&self, text: &str) -> Option<usize> {
        if text.is_empty() {
            return None;
        }
        // check the scheme before committing to a full IRI parse
        let scheme_len = scheme(text)?;
        if !text[scheme_len..].starts_with(':') {
            return None;
        }
        if let Some(table) = &self.valid_schemes {
            if scheme_len > table.maximum_length() || !table.matches(&text[..scheme_len]) {
                return None;
            }
        }
        // a scheme terminated by end of text is an <ipath-empty> URI
        if scheme_len + 1 == text.len() {
            return Some(text.len());
        }
        match iri(text) {
            Some(end) if end > scheme_len + 1 => Some(end),
            _ => None,
        }
    }

    /// Search `text` for the first URI anywhere in it.
    pub fn search(&self, text: &str) -> Option<Range<usize>> {
        for (colon, _) in text.char_indices().filter(|(_, c)| *c == ':') {
            // the candidate scheme is the run of scheme characters ending
            // at the colon, trimmed until it starts with a letter
            let mut start = colon;
            while start > 0 {
                let prev = text[..start].chars().next_back().unwrap();
                if prev.is_ascii_alphanumeric() || prev == '+' || prev == '-' || prev == '.' {
                    start -= prev.len_utf8();
                } else {
                    break;
                }
            }
            while start < colon && !text.as_bytes()[start].is_ascii_alphabetic() {
                start += 1;
            }
            if start == colon {
                continue;
            }
            if let Some(len) = self.detect(&text[start..]) {
                return Some(start..start + len);
            }
        }
        None
    }

    /// Shared detector accepting any syntactically valid scheme.
    pub fn default_generic() -> Arc<URIDetector> {
        static INSTANCE: OnceLock<Arc<URIDetector>> = OnceLock::new();
        Arc::clone(INSTANCE.get_or_init(|| Arc::new(URIDetector::new())))
    }

    /// Shared detector accepting the URI schemes registered with IANA.
    pub fn default_iana() -> Arc<URIDetector> {
        static INSTANCE: OnceLock<Arc<URIDetector>> = OnceLock::new();
        Arc::clone(INSTANCE.get_or_init(|| {
            let mut detector = URIDetector::new();
            // permanent schemes first, then provisional and historical ones
            const SCHEMES: &str = concat!(
                "aaa|aaas|acap|cap|cid|crid|data|dav|dict|dns|fax|file|ftp|go|gopher|h323",
                "|http|https|icap|im|imap|info|ipp|iris|iris.beep|iris.xpc|iris.xpcs|iris.lwz",
                "|ldap|mailto|mid|modem|msrp|msrps|mtqp|mupdate|news|nfs|nntp|opaquelocktoken",
                "|pop|pres|rtsp|service|shttp|sip|sips|snmp|soap.beep|soap.beeps|tag|tel",
                "|telnet|tftp|thismessage|tip|tv|urn|vemmi|xmlrpc.beep|xmlrpc.beeps|xmpp",
                "|z39.50r|z39.50s",
                "|afs|dtn|iax2|mailserver|pack|tn3270|prospero|wais",
            );
            detector
                .set_valid_schemes_separated(SCHEMES, '|', false)
                .expect("builtin scheme list is valid");
            Arc::new(detector)
        }))
    }
}
