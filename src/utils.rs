use actix_web::HttpRequest;

/// Origin the share link should point at. Prefers the browser's `Origin`
/// header and falls back to what the connection says about itself.
pub fn request_origin(req: &HttpRequest) -> String {
    if let Some(origin) = req
        .headers()
        .get("origin")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty() && *value != "null")
    {
        return origin.trim_end_matches('/').to_string();
    }

    let info = req.connection_info();
    format!("{}://{}", info.scheme(), info.host())
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
