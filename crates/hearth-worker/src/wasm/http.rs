use std::fmt::Display;

use serde::Serialize;
use worker::{Headers, Request, Response, Result};

use crate::error::{ServiceError, ServiceResult};

fn cors_headers(req: &Request) -> Result<Headers> {
    let headers = Headers::new();

    // Reflect Origin so credentialed requests from the web client carry cookies.
    let origin = req.headers().get("Origin")?.unwrap_or_else(|| "*".to_string());

    headers.set("Access-Control-Allow-Origin", &origin)?;
    headers.set("Vary", "Origin")?;
    headers.set("Access-Control-Allow-Credentials", "true")?;
    headers.set("Access-Control-Allow-Methods", "GET,POST,PUT,PATCH,DELETE,OPTIONS")?;
    headers.set(
        "Access-Control-Allow-Headers",
        "Authorization,Content-Type,Accept,X-Requested-With",
    )?;

    Ok(headers)
}

pub fn json_with_cors(req: &Request, mut resp: Response) -> Result<Response> {
    let headers = cors_headers(req)?;
    let resp_headers = resp.headers_mut();
    for (k, v) in headers.entries() {
        resp_headers.set(&k, &v)?;
    }

    Ok(resp)
}

pub fn json_response<T: Serialize>(req: &Request, status: u16, body: &T) -> Result<Response> {
    let resp = Response::from_json(body)?.with_status(status);
    json_with_cors(req, resp)
}

pub fn no_content(req: &Request) -> Result<Response> {
    json_with_cors(req, Response::empty()?.with_status(204))
}

/// Serialize a service result, mapping failures to the shared error body.
pub fn respond<T: Serialize>(req: &Request, status: u16, result: ServiceResult<T>) -> Result<Response> {
    match result {
        Ok(body) => json_response(req, status, &body),
        Err(e) => service_error_response(req, &e),
    }
}

pub fn error_response(req: &Request, status: u16, code: &str, message: &str) -> Result<Response> {
    let body = serde_json::json!({
        "success": false,
        "error": {
            "code": code,
            "message": message
        }
    });

    let resp = Response::from_json(&body)?.with_status(status);
    json_with_cors(req, resp)
}

pub fn service_error_response(req: &Request, err: &ServiceError) -> Result<Response> {
    if err.is_internal() {
        return internal_error_response(req, "Service failure", err);
    }

    let mut resp = error_response(req, err.status(), err.code(), &err.public_message())?;
    if let ServiceError::RateLimited { retry_after } = err {
        resp.headers_mut().set("Retry-After", &retry_after.to_string())?;
    }
    Ok(resp)
}

pub fn internal_error_response<E: Display>(req: &Request, context: &str, err: &E) -> Result<Response> {
    worker::console_log!("{context}: {err}");
    error_response(req, 500, "internal_error", "Internal server error")
}

pub fn invalid_json<E: Display>(req: &Request, context: &str, err: &E) -> Result<Response> {
    worker::console_log!("Invalid JSON in {context}: {err}");
    error_response(req, 400, "invalid_json", "Invalid JSON body")
}

pub fn not_found(req: &Request) -> Result<Response> {
    error_response(req, 404, "not_found", "Not found")
}

pub fn method_not_allowed(req: &Request) -> Result<Response> {
    error_response(req, 405, "method_not_allowed", "Method not allowed")
}

pub fn query_param(req: &Request, key: &str) -> Result<Option<String>> {
    Ok(req
        .url()?
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned()))
}

pub fn header(req: &Request, name: &str) -> Result<Option<String>> {
    req.headers().get(name)
}

pub fn set_cookie(resp: &mut Response, cookie: &str) -> Result<()> {
    resp.headers_mut().append("Set-Cookie", cookie)
}
