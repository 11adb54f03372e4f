use std::fmt;

/// Lookup identity of a route: exact path plus ASCII-uppercased method.
///
/// `RouteKey::new("/x", "get") == RouteKey::new("/x", "GET")`, while paths
/// compare case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey(String);

impl RouteKey {
    pub fn new(path: &str, method: &str) -> Self {
        RouteKey(make_key(path, method))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical `path:METHOD` string for a route
pub fn make_key(path: &str, method: &str) -> String {
    let mut key = String::with_capacity(path.len() + 1 + method.len());
    key.push_str(path);
    key.push(':');
    key.push_str(&method.to_ascii_uppercase());
    key
}
