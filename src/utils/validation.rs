use crate::utils::error::{PhaseError, Result};
use std::net::SocketAddr;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> PhaseError {
    PhaseError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

/// A template must carry the `{n}` placeholder and render to a valid URL.
pub fn validate_url_template(field_name: &str, template: &str, placeholder: &str) -> Result<()> {
    if !template.contains(placeholder) {
        return Err(invalid(
            field_name,
            template,
            format!("Template must contain the {} placeholder", placeholder),
        ));
    }

    validate_url(field_name, &template.replace(placeholder, "0"))
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

pub fn validate_mount_path(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;

    if !path.starts_with('/') || path == "/" {
        return Err(invalid(
            field_name,
            path,
            "Mount path must start with '/' and name a sub-path",
        ));
    }

    Ok(())
}

pub fn validate_socket_addr(field_name: &str, value: &str) -> Result<SocketAddr> {
    value
        .parse::<SocketAddr>()
        .map_err(|e| invalid(field_name, value, format!("Invalid socket address: {}", e)))
}

pub fn validate_origin(field_name: &str, origin: &str) -> Result<()> {
    if origin == "*" {
        return Ok(());
    }

    validate_url(field_name, origin)?;

    // Origins are scheme://host[:port] without a path.
    if origin.trim_end_matches('/').matches('/').count() > 2 {
        return Err(invalid(field_name, origin, "Origin cannot contain a path"));
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}
