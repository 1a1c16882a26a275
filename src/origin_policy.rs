use url::Url;

fn origin_of(url: &Url) -> Option<(String, String, u16)> {
    Some((
        url.scheme().to_string(),
        url.host_str()?.to_ascii_lowercase(),
        url.port_or_known_default()?,
    ))
}

/// True when `page_url` is served from the same scheme, host and port as the backend.
pub fn is_backend_origin(backend_url: &str, page_url: &Url) -> bool {
    let Ok(backend) = Url::parse(backend_url) else {
        return false;
    };
    match (origin_of(&backend), origin_of(page_url)) {
        (Some(expected), Some(actual)) => expected == actual,
        _ => false,
    }
}

pub fn should_inject_host_bridge(backend_url: &str, page_url: &Url) -> bool {
    is_backend_origin(backend_url, page_url)
}

/// The window may only navigate within the backend's origin.
pub fn allow_navigation(backend_url: &str, target: &Url) -> bool {
    is_backend_origin(backend_url, target)
}
