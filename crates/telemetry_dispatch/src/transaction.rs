use std::collections::HashMap;
use std::net::SocketAddr;

/// Transport-neutral view of one inbound HTTP request.
///
/// Header names are stored lower-cased; the body is kept as raw bytes so the
/// auth validator can run before anything is parsed.
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    headers: HashMap<String, String>,
    remote_addr: Option<SocketAddr>,
    body: Vec<u8>,
}

impl Transaction {
    /// Creates a transaction carrying `body` and no headers.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            headers: HashMap::new(),
            remote_addr: None,
            body: body.into(),
        }
    }

    /// Adds a header. Later values for the same name replace earlier ones.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    pub fn insert_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Looks up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Replaces the body, for transports that read it after authorization.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_case_insensitive() {
        let transaction = Transaction::new("{}").with_header("X-Telemetry-Token", "abc");
        assert_eq!(transaction.header("x-telemetry-token"), Some("abc"));
        assert_eq!(transaction.header("X-TELEMETRY-TOKEN"), Some("abc"));
        assert_eq!(transaction.header("authorization"), None);
    }

    #[test]
    fn test_body_filled_in_later() {
        let mut transaction = Transaction::default().with_header("Authorization", "t");
        assert!(transaction.body().is_empty());

        transaction.set_body("{\"id\":1}");
        assert_eq!(transaction.body(), b"{\"id\":1}");
        assert_eq!(transaction.header("authorization"), Some("t"));
    }

    #[test]
    fn test_remote_addr_is_optional() {
        let transaction = Transaction::new(Vec::new());
        assert!(transaction.remote_addr().is_none());

        let addr: SocketAddr = "10.0.0.2:41000".parse().unwrap();
        let transaction = transaction.with_remote_addr(addr);
        assert_eq!(transaction.remote_addr(), Some(addr));
    }
}
