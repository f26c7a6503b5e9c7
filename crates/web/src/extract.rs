//! Request parameter extraction shared by the search endpoints.

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{Method, header},
};
use marcus_core::QueryParams;

use crate::error::AppError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Parameters from the URL query, followed by those of a form-encoded body
/// on `POST`. Lookups of single values therefore prefer the URL.
#[derive(Debug, Clone, Default)]
pub struct Params(pub QueryParams);

fn is_form(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
}

impl<S> FromRequest<S> for Params
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut params = QueryParams::parse(request.uri().query().unwrap_or_default());
        if request.method() != Method::POST {
            return Ok(Self(params));
        }

        let form = is_form(&request);
        let body = Bytes::from_request(request, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        if body.is_empty() {
            return Ok(Self(params));
        }
        if !form {
            return Err(AppError::UnsupportedMediaType(format!(
                "expected {FORM_CONTENT_TYPE}"
            )));
        }

        let text = std::str::from_utf8(&body)
            .map_err(|e| AppError::BadRequest(format!("form body is not UTF-8: {e}")))?;
        for (key, value) in QueryParams::parse(text).iter() {
            params.push(key, value);
        }
        Ok(Self(params))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use axum::body::Body;

    use super::*;

    async fn extract(request: Request) -> Result<QueryParams, AppError> {
        Params::from_request(request, &()).await.map(|Params(params)| params)
    }

    fn post(uri: &str, content_type: &str, body: &'static [u8]) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_reads_query_only() {
        let request = Request::builder()
            .uri("/search?q=bergen&index=wab")
            .body(Body::from("q=ignored"))
            .unwrap();
        let params = extract(request).await.unwrap();
        assert_eq!(params.get("q"), Some("bergen"));
        assert_eq!(params.len(), 2);
    }

    #[tokio::test]
    async fn test_post_appends_form_body_after_query() {
        let request = post(
            "/search?q=url",
            "application/x-www-form-urlencoded; charset=UTF-8",
            b"q=form&filter=type%23Brev&index=wab",
        );
        let params = extract(request).await.unwrap();
        assert_eq!(params.get("q"), Some("url"));
        assert_eq!(params.get_all("q"), vec!["url", "form"]);
        assert_eq!(params.get("filter"), Some("type#Brev"));
        assert_eq!(params.get("index"), Some("wab"));
    }

    #[tokio::test]
    async fn test_post_rejects_other_bodies() {
        let json = extract(post("/search", "application/json", b"{\"q\":1}")).await;
        assert!(matches!(json, Err(AppError::UnsupportedMediaType(_))));

        let latin1 = extract(post("/search", FORM_CONTENT_TYPE, b"q=\xf8l")).await;
        assert!(matches!(latin1, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_post_without_body_uses_query() {
        let params = extract(post("/suggest?q=ber", "text/plain", b""))
            .await
            .unwrap();
        assert_eq!(params.get("q"), Some("ber"));
    }
}
