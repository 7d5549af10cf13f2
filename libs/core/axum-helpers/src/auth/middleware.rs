use super::jwt::JwtAuth;
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Cookie carrying the access token for browser clients
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Extract JWT from the Authorization header or the access token cookie
fn extract_token_from_request(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("cookie")
                .and_then(|v| v.to_str().ok())
                .and_then(|cookies| {
                    cookies.split(';').find_map(|cookie| {
                        let (name, value) = cookie.trim().split_once('=')?;
                        (name == ACCESS_TOKEN_COOKIE).then(|| value.to_string())
                    })
                })
        })
        .filter(|token| !token.is_empty())
}

/// `Set-Cookie` value for an issued access token.
pub fn access_token_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Lax",
        ACCESS_TOKEN_COOKIE, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that expires the access token cookie immediately.
pub fn expired_access_token_cookie(secure: bool) -> String {
    access_token_cookie("", 0, secure)
}

/// JWT authentication middleware
///
/// Rejects the request with 401 unless a valid token is present, otherwise
/// inserts [`super::JwtClaims`] into request extensions.
pub async fn jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token_from_request(&headers).ok_or_else(|| {
        tracing::debug!("No JWT found in Authorization header or cookie");
        AppError::Unauthorized("No token provided".to_string())
    })?;

    let claims = auth.verify_token(&token).map_err(|e| {
        tracing::debug!("JWT verification failed: {}", e);
        AppError::Unauthorized("Invalid token".to_string())
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Optional JWT authentication middleware
///
/// Never rejects: valid claims are attached, anything else passes through
/// anonymously so public routes keep working.
pub async fn optional_jwt_auth_middleware(
    State(auth): State<JwtAuth>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token_from_request(&headers) {
        match auth.verify_token(&token) {
            Ok(claims) => {
                request.extensions_mut().insert(claims);
            }
            Err(e) => tracing::debug!("Ignoring invalid JWT: {}", e),
        }
    }

    next.run(request).await
}
