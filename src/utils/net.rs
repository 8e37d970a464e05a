/// accept either `host:port` or a full `http(s)://host:port` URI
pub fn address_str(addr: &str) -> String {
    if addr.starts_with("https://") {
        return addr.to_string();
    }
    let normalized = addr.trim_start_matches("http://");
    format!("http://{}", normalized)
}
