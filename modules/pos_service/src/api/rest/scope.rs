//! Caller scope taken from request headers

use super::error::Problem;
use crate::contract::TenantScope;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const STORE_HEADER: &str = "x-store-id";
pub const ACTOR_HEADER: &str = "x-actor";

/// `x-tenant-id` is required; `x-store-id` pins the caller to one store;
/// `x-actor` names the user recorded on documents
#[derive(Debug, Clone)]
pub struct Scope(pub TenantScope);

impl<S> FromRequestParts<S> for Scope
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant_id = header_uuid(parts, TENANT_HEADER)?
            .ok_or_else(|| {
                Problem::bad_request(format!("missing {} header", TENANT_HEADER))
                    .with_instance(parts.uri.path())
            })?;
        let store_id = header_uuid(parts, STORE_HEADER)?;
        let actor = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Ok(Scope(TenantScope {
            tenant_id,
            store_id,
            actor,
        }))
    }
}

fn header_uuid(parts: &Parts, name: &str) -> Result<Option<Uuid>, Problem> {
    let Some(value) = parts.headers.get(name) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .map(Some)
        .ok_or_else(|| {
            Problem::bad_request(format!("{} header must be a UUID", name))
                .with_instance(parts.uri.path())
        })
}
