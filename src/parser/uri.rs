//! URI form: `postgresql://[user[:password]@][host][:port][,...][/dbname][?param=value&...]`
//!
//! Every component is percent-decoded. Multiple `host[:port]` entries are
//! kept as one comma-joined `host` value and one comma-joined `port` value,
//! positionally aligned.

use crate::catalog::Catalog;
use crate::config::Settings;
use crate::error::{ConninfoError, Result};

/// Byte-indexed view of the input that reports errors as character offsets
struct Uri<'a> {
    input: &'a str,
}

impl Uri<'_> {
    fn offset(&self, byte: usize) -> usize {
        self.input.get(..byte).map_or(byte, |head| head.chars().count())
    }

    fn tail(&self, byte: usize) -> &str {
        self.input.get(byte..).unwrap_or_default()
    }

    fn slice(&self, start: usize, end: usize) -> &str {
        self.input.get(start..end).unwrap_or_default()
    }

    fn char_at(&self, byte: usize) -> Option<char> {
        self.tail(byte).chars().next()
    }

    /// Byte index of the first of `delimiters` at or after `from`, or the end
    fn find_from(&self, from: usize, delimiters: &[char]) -> usize {
        self.tail(from)
            .find(delimiters)
            .map_or(self.input.len(), |i| from + i)
    }
}

pub(super) fn parse_uri(
    input: &str,
    prefix_len: usize,
    catalog: &Catalog,
) -> Result<Settings> {
    let uri = Uri { input };
    let mut settings = Settings::new();
    let mut pos = prefix_len;

    // userinfo is present only when '@' comes before any '/'
    let userinfo_end = uri.find_from(pos, &['@', '/']);
    if uri.char_at(userinfo_end) == Some('@') {
        let userinfo = uri.slice(pos, userinfo_end);
        let (user, password) = match userinfo.split_once(':') {
            Some((user, password)) => (user, Some(password)),
            None => (userinfo, None),
        };
        if !user.is_empty() {
            store(&mut settings, catalog, "user", percent_decode(user, uri.offset(pos))?)?;
        }
        if let Some(password) = password {
            let at = uri.offset(pos + user.len() + 1);
            store(&mut settings, catalog, "password", percent_decode(password, at)?)?;
        }
        pos = userinfo_end + 1;
    }

    let hosts_start = pos;
    let mut hosts = String::new();
    let mut ports = String::new();
    let mut delimiter;
    loop {
        if uri.char_at(pos) == Some('[') {
            let close = uri
                .tail(pos + 1)
                .find(']')
                .map(|i| pos + 1 + i)
                .ok_or_else(|| {
                    ConninfoError::parse_at(
                        "end of string reached when looking for matching \"]\" in IPv6 host address in URI",
                        uri.offset(pos),
                    )
                })?;
            let host = uri.slice(pos + 1, close);
            if host.is_empty() {
                return Err(ConninfoError::parse_at(
                    "IPv6 host address may not be empty in URI",
                    uri.offset(pos),
                ));
            }
            hosts.push_str(host);
            pos = close + 1;

            let unexpected = uri
                .char_at(pos)
                .filter(|ch| !matches!(ch, ':' | '/' | '?' | ','));
            if let Some(ch) = unexpected {
                let offset = uri.offset(pos);
                return Err(ConninfoError::parse_at(
                    format!(
                        "unexpected character \"{ch}\" at position {} in URI (expected \":\" or \"/\")",
                        offset + 1
                    ),
                    offset,
                ));
            }
        } else {
            let end = uri.find_from(pos, &[':', '/', '?', ',']);
            hosts.push_str(uri.slice(pos, end));
            pos = end;
        }

        delimiter = uri.char_at(pos);
        if delimiter == Some(':') {
            let end = uri.find_from(pos + 1, &['/', '?', ',']);
            ports.push_str(uri.slice(pos + 1, end));
            pos = end;
            delimiter = uri.char_at(pos);
        }

        if delimiter != Some(',') {
            break;
        }
        pos += 1;
        hosts.push(',');
        ports.push(',');
    }

    let hosts_offset = uri.offset(hosts_start);
    if !hosts.is_empty() {
        store(&mut settings, catalog, "host", percent_decode(&hosts, hosts_offset)?)?;
    }
    if !ports.is_empty() {
        store(&mut settings, catalog, "port", percent_decode(&ports, hosts_offset)?)?;
    }

    if delimiter == Some('/') {
        let end = uri.find_from(pos + 1, &['?']);
        let dbname = uri.slice(pos + 1, end);
        if !dbname.is_empty() {
            let dbname = percent_decode(dbname, uri.offset(pos + 1))?;
            store(&mut settings, catalog, "dbname", dbname)?;
        }
        pos = end;
        delimiter = uri.char_at(pos);
    }

    if delimiter == Some('?') {
        parse_query(&uri, pos + 1, catalog, &mut settings)?;
    }

    Ok(settings)
}

fn parse_query(
    uri: &Uri<'_>,
    start: usize,
    catalog: &Catalog,
    settings: &mut Settings,
) -> Result<()> {
    let query = uri.tail(start);
    let mut segment_start = start;
    let mut segments = query.split('&').peekable();

    while let Some(segment) = segments.next() {
        let offset = uri.offset(segment_start);
        segment_start += segment.len() + 1;

        // a single trailing '&' is tolerated
        if segment.is_empty() && segments.peek().is_none() {
            break;
        }

        let (raw_key, raw_value) = segment.split_once('=').ok_or_else(|| {
            ConninfoError::parse_at(
                format!("missing key/value separator \"=\" in URI query parameter: \"{segment}\""),
                offset,
            )
        })?;
        if raw_value.contains('=') {
            return Err(ConninfoError::parse_at(
                format!("extra key/value separator \"=\" in URI query parameter: \"{segment}\""),
                offset,
            ));
        }

        let mut key = percent_decode(raw_key, offset)?;
        let mut value = percent_decode(raw_value, offset + raw_key.chars().count() + 1)?;

        if key == "ssl" && value == "true" {
            key = "sslmode".to_string();
            value = "require".to_string();
        }

        let spec = catalog.lookup(&key).ok_or_else(|| {
            ConninfoError::parse_at(
                format!("invalid URI query parameter: \"{key}\""),
                offset,
            )
        })?;
        settings.set(spec.keyword, value);
    }

    Ok(())
}

fn store(
    settings: &mut Settings,
    catalog: &Catalog,
    keyword: &str,
    value: String,
) -> Result<()> {
    let spec = catalog.lookup(keyword).ok_or_else(|| {
        ConninfoError::parse(format!("invalid connection option \"{keyword}\""))
    })?;
    settings.set(spec.keyword, value);
    Ok(())
}

/// Decode `%XX` escapes; `position` is the character offset of `component`
fn percent_decode(component: &str, position: usize) -> Result<String> {
    if !component.contains('%') {
        return Ok(component.to_string());
    }

    let bytes = component.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while let Some(&byte) = bytes.get(i) {
        if byte != b'%' {
            decoded.push(byte);
            i += 1;
            continue;
        }

        let high = bytes.get(i + 1).copied().and_then(hex_value);
        let low = bytes.get(i + 2).copied().and_then(hex_value);
        let (Some(high), Some(low)) = (high, low) else {
            return Err(ConninfoError::parse_at(
                format!("invalid percent-encoded token: \"{component}\""),
                position,
            ));
        };

        let value = (high << 4) | low;
        if value == 0 {
            return Err(ConninfoError::parse_at(
                format!("forbidden value %00 in percent-encoded value: \"{component}\""),
                position,
            ));
        }
        decoded.push(value);
        i += 3;
    }

    String::from_utf8(decoded).map_err(|_| {
        ConninfoError::parse_at(
            format!("percent-encoded value is not valid UTF-8: \"{component}\""),
            position,
        )
    })
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_settings;
    use super::*;

    fn settings(input: &str) -> Settings {
        parse_settings(input, &Catalog::standard()).unwrap()
    }

    fn parse_error(input: &str) -> ConninfoError {
        parse_settings(input, &Catalog::standard()).unwrap_err()
    }

    #[test]
    fn test_full_uri() {
        let s = settings("postgresql://u:p@h:5432/db?sslmode=require");
        assert_eq!(s.get("user"), Some("u"));
        assert_eq!(s.get("password"), Some("p"));
        assert_eq!(s.get("host"), Some("h"));
        assert_eq!(s.get("port"), Some("5432"));
        assert_eq!(s.get("dbname"), Some("db"));
        assert_eq!(s.get("sslmode"), Some("require"));
        assert_eq!(s.len(), 6);
    }

    #[test]
    fn test_short_scheme() {
        let s = settings("postgres://localhost/mydb");
        assert_eq!(s.get("host"), Some("localhost"));
        assert_eq!(s.get("dbname"), Some("mydb"));
    }

    #[test]
    fn test_bare_scheme_sets_nothing() {
        assert!(settings("postgresql://").is_empty());
        assert!(settings("postgresql:///").is_empty());
        assert!(settings("postgresql://?").is_empty());
    }

    #[test]
    fn test_user_without_password() {
        let s = settings("postgresql://alice@localhost");
        assert_eq!(s.get("user"), Some("alice"));
        assert_eq!(s.get("password"), None);
    }

    #[test]
    fn test_empty_password_is_explicit() {
        let s = settings("postgresql://alice:@localhost");
        assert_eq!(s.get("password"), Some(""));
    }

    #[test]
    fn test_password_may_contain_colon() {
        let s = settings("postgresql://alice:a:b@localhost");
        assert_eq!(s.get("user"), Some("alice"));
        assert_eq!(s.get("password"), Some("a:b"));
    }

    #[test]
    fn test_percent_decoding() {
        let s = settings("postgresql://us%40er:p%20w@h%2Dx/my%20db?application_name=a%26b");
        assert_eq!(s.get("user"), Some("us@er"));
        assert_eq!(s.get("password"), Some("p w"));
        assert_eq!(s.get("host"), Some("h-x"));
        assert_eq!(s.get("dbname"), Some("my db"));
        assert_eq!(s.get("application_name"), Some("a&b"));
    }

    #[test]
    fn test_plus_is_not_space() {
        let s = settings("postgresql:///db?options=a+b");
        assert_eq!(s.get("options"), Some("a+b"));
    }

    #[test]
    fn test_multibyte_decoding() {
        let s = settings("postgresql:///caf%C3%A9");
        assert_eq!(s.get("dbname"), Some("café"));
    }

    #[test]
    fn test_multi_host() {
        let s = settings("postgresql://a:1,b:2/db");
        assert_eq!(s.get("host"), Some("a,b"));
        assert_eq!(s.get("port"), Some("1,2"));
        assert_eq!(s.get("dbname"), Some("db"));
    }

    #[test]
    fn test_multi_host_partial_ports_stay_aligned() {
        let s = settings("postgresql://a,b:5433");
        assert_eq!(s.get("host"), Some("a,b"));
        assert_eq!(s.get("port"), Some(",5433"));

        let s = settings("postgresql://a:5432,b");
        assert_eq!(s.get("port"), Some("5432,"));
    }

    #[test]
    fn test_port_without_host() {
        let s = settings("postgresql://:5433/db");
        assert_eq!(s.get("host"), None);
        assert_eq!(s.get("port"), Some("5433"));
    }

    #[test]
    fn test_ipv6_hosts() {
        let s = settings("postgresql://[::1]:5432,[2001:db8::7]/db");
        assert_eq!(s.get("host"), Some("::1,2001:db8::7"));
        assert_eq!(s.get("port"), Some("5432,"));
    }

    #[test]
    fn test_ipv6_unterminated() {
        let err = parse_error("postgresql://[::1/db");
        assert!(err.message().contains(r#"looking for matching "]" in IPv6 host address"#));
        assert_eq!(err.position(), Some(13));
    }

    #[test]
    fn test_ipv6_empty() {
        let err = parse_error("postgresql://[]/db");
        assert!(err.message().contains("IPv6 host address may not be empty in URI"));
    }

    #[test]
    fn test_ipv6_unexpected_character() {
        let err = parse_error("postgresql://[::1]x/db");
        assert!(err.message().contains(r#"unexpected character "x" at position 19 in URI"#));
        assert_eq!(err.position(), Some(18));
    }

    #[test]
    fn test_query_parameters() {
        let s = settings("postgresql://h/db?connect_timeout=10&application_name=myapp");
        assert_eq!(s.get("connect_timeout"), Some("10"));
        assert_eq!(s.get("application_name"), Some("myapp"));
    }

    #[test]
    fn test_query_overrides_authority() {
        let s = settings("postgresql://h/db?host=other&dbname=db2");
        assert_eq!(s.get("host"), Some("other"));
        assert_eq!(s.get("dbname"), Some("db2"));
    }

    #[test]
    fn test_query_without_path() {
        let s = settings("postgresql://h?port=6000");
        assert_eq!(s.get("host"), Some("h"));
        assert_eq!(s.get("port"), Some("6000"));
    }

    #[test]
    fn test_ssl_true_alias() {
        let s = settings("postgresql://h/db?ssl=true");
        assert_eq!(s.get("sslmode"), Some("require"));
    }

    #[test]
    fn test_trailing_ampersand_tolerated() {
        let s = settings("postgresql://h/db?sslmode=disable&");
        assert_eq!(s.get("sslmode"), Some("disable"));
    }

    #[test]
    fn test_unknown_query_parameter() {
        let err = parse_error("postgresql://h/db?fake=1");
        assert!(err.message().contains(r#"invalid URI query parameter: "fake""#));
        assert_eq!(err.position(), Some(18));
    }

    #[test]
    fn test_query_parameter_without_separator() {
        let err = parse_error("postgresql://h/db?sslmode");
        assert!(err
            .message()
            .contains(r#"missing key/value separator "=" in URI query parameter: "sslmode""#));

        let err = parse_error("postgresql://h/db?&sslmode=require");
        assert!(err.message().contains("missing key/value separator"));
    }

    #[test]
    fn test_query_parameter_extra_separator() {
        let err = parse_error("postgresql://h/db?options=a=b");
        assert!(err
            .message()
            .contains(r#"extra key/value separator "=" in URI query parameter: "options=a=b""#));
    }

    #[test]
    fn test_invalid_percent_encoding() {
        let err = parse_error("postgresql://h/d%zzb");
        assert!(err.message().contains(r#"invalid percent-encoded token: "d%zzb""#));
        assert_eq!(err.position(), Some(15));

        let err = parse_error("postgresql://h/db%4");
        assert!(err.message().contains("invalid percent-encoded token"));
    }

    #[test]
    fn test_percent_encoded_nul_forbidden() {
        let err = parse_error("postgresql://h/d%00b");
        assert!(err.message().contains("forbidden value %00 in percent-encoded value"));
    }

    #[test]
    fn test_percent_encoded_invalid_utf8() {
        let err = parse_error("postgresql://h/%FF");
        assert!(err.message().contains("not valid UTF-8"));
    }

    #[test]
    fn test_hex_value() {
        assert_eq!(hex_value(b'0'), Some(0));
        assert_eq!(hex_value(b'a'), Some(10));
        assert_eq!(hex_value(b'F'), Some(15));
        assert_eq!(hex_value(b'g'), None);
    }
}
