use std::fmt;

/// Ordered list of header fields; lookups ignore ASCII case
#[derive(Debug, Clone, Default)]
pub struct Headers {
    fields: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// First value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replace every existing value for `name`
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.remove(name);
        self.fields.push((name.to_string(), value.into()));
    }

    pub fn add(&mut self, name: &str, value: impl Into<String>) {
        self.fields.push((name.to_string(), value.into()));
    }

    pub fn remove(&mut self, name: &str) {
        self.fields.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Parse headers from raw `Name: value` lines
    pub fn from_lines<'a, I>(lines: I) -> Result<Self, HeaderParseError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut headers = Headers::new();

        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| HeaderParseError::MissingColon(line.to_string()))?;

            let name = name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(HeaderParseError::InvalidName(line.to_string()));
            }

            headers.add(name, value.trim());
        }

        Ok(headers)
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.fields {
            write!(f, "{}: {}\r\n", name, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum HeaderParseError {
    #[error("Header line without ':': {0}")]
    MissingColon(String),

    #[error("Invalid header name in: {0}")]
    InvalidName(String),
}

pub mod names {
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const CONTENT_LENGTH: &str = "Content-Length";
    pub const TRANSFER_ENCODING: &str = "Transfer-Encoding";
    pub const CONNECTION: &str = "Connection";
    pub const HOST: &str = "Host";
    pub const SERVER: &str = "Server";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_case_insensitive() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/html");
        assert_eq!(headers.get("content-type"), Some("text/html"));
        assert!(headers.contains("CONTENT-TYPE"));
    }

    #[test]
    fn test_set_replaces_all_values() {
        let mut headers = Headers::new();
        headers.add("Accept", "text/html");
        headers.add("accept", "application/json");
        assert_eq!(headers.get_all("Accept").count(), 2);

        headers.set("Accept", "*/*");
        assert_eq!(headers.get_all("accept").collect::<Vec<_>>(), vec!["*/*"]);
    }

    #[test]
    fn test_headers_parsing() {
        let headers =
            Headers::from_lines(["Content-Type: text/html", "Content-Length:  123 "]).unwrap();
        assert_eq!(headers.get("Content-Type"), Some("text/html"));
        assert_eq!(headers.get("Content-Length"), Some("123"));

        assert!(Headers::from_lines(["no colon here"]).is_err());
        assert!(Headers::from_lines(["Bad Name: x"]).is_err());
    }

    #[test]
    fn test_display_preserves_order() {
        let mut headers = Headers::new();
        headers.add("Server", "switchyard");
        headers.add("Content-Length", "0");
        assert_eq!(headers.to_string(), "Server: switchyard\r\nContent-Length: 0\r\n");
    }
}
