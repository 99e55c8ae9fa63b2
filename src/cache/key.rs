//! Request Key Module
//!
//! Builds cache keys from upstream request parameters.

// == Request Key ==
/// Builds a stable cache key for an upstream request.
///
/// Parameters are sorted by name (then value) and empty values are dropped,
/// so requests that differ only in parameter order or in unset options map
/// to the same key. Separator characters inside names and values are
/// percent-escaped to keep distinct requests from colliding.
///
/// ```
/// use response_cache::cache::request_key;
///
/// let a = request_key("search", [("type", "movie"), ("query", "heat")]);
/// let b = request_key("search", [("query", "heat"), ("type", "movie"), ("year", "")]);
/// assert_eq!(a, b);
/// assert_eq!(a, "search?query=heat&type=movie");
/// ```
pub fn request_key<I, K, V>(endpoint: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs: Vec<(String, String)> = params
        .into_iter()
        .filter(|(_, value)| !value.as_ref().is_empty())
        .map(|(name, value)| (escape(name.as_ref()), escape(value.as_ref())))
        .collect();

    if pairs.is_empty() {
        return escape(endpoint);
    }

    pairs.sort();

    let query = pairs
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("&");

    format!("{}?{}", escape(endpoint), query)
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3D"),
            '?' => out.push_str("%3F"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_only() {
        let params: [(&str, &str); 0] = [];
        assert_eq!(request_key("sync/history", params), "sync/history");
    }

    #[test]
    fn test_parameter_order_is_irrelevant() {
        let a = request_key("sync/watchlist", [("type", "shows"), ("page", "2")]);
        let b = request_key("sync/watchlist", [("page", "2"), ("type", "shows")]);
        assert_eq!(a, b);
        assert_eq!(a, "sync/watchlist?page=2&type=shows");
    }

    #[test]
    fn test_empty_values_dropped() {
        let key = request_key("search", vec![("query", "alien".to_string()), ("year", String::new())]);
        assert_eq!(key, "search?query=alien");
    }

    #[test]
    fn test_separators_are_escaped() {
        let injected = request_key("search", [("query", "a&type=show")]);
        let honest = request_key("search", [("query", "a"), ("type", "show")]);
        assert_ne!(injected, honest);
        assert_eq!(injected, "search?query=a%26type%3Dshow");
    }

    #[test]
    fn test_distinct_values_distinct_keys() {
        let a = request_key("search", [("query", "heat")]);
        let b = request_key("search", [("query", "heat 1995")]);
        assert_ne!(a, b);
    }
}
