//! Server-sent events for realtime invalidation notices

use super::dto::{ChannelStatsDto, InvalidationDto, ListResponse};
use super::error::Problem;
use super::mapper::parse_name;
use super::scope::Scope;
use crate::contract::model::ChangeTable;
use crate::domain::realtime::{ChannelManager, Subscription};
use axum::{
    extract::Path,
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use futures::stream::{self, Stream};
use uuid::Uuid;

/// Event name carried by every notice
pub const INVALIDATION_EVENT: &str = "invalidation";

/// Stream notices of one table for the caller's tenant
///
/// A store-pinned caller only sees notices touching its store (or carrying
/// no store at all, like resyncs).
pub async fn stream_table(
    Extension(channels): Extension<ChannelManager>,
    Scope(scope): Scope,
    Path(table): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, Problem> {
    let table: ChangeTable = parse_name("table", &table)?;
    let subscription = channels.subscribe(scope.tenant_id, table);
    tracing::debug!(
        channel = %subscription.channel_name(),
        store_id = ?scope.store_id,
        "sse subscriber connected"
    );

    let stream = notices(subscription, scope.store_id);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn notices(
    subscription: Subscription,
    store_id: Option<Uuid>,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    stream::unfold(subscription, move |mut subscription| async move {
        loop {
            let notice = subscription.recv().await?;
            if store_id.map_or(true, |store_id| notice.touches_store(store_id)) {
                let event = Event::default()
                    .event(INVALIDATION_EVENT)
                    .json_data(InvalidationDto::from(&notice));
                return Some((event, subscription));
            }
        }
    })
}

pub async fn channel_stats(
    Extension(channels): Extension<ChannelManager>,
    Scope(scope): Scope,
) -> Json<ListResponse<ChannelStatsDto>> {
    let stats: Vec<_> = channels
        .stats()
        .into_iter()
        .filter(|s| s.tenant_id == scope.tenant_id)
        .collect();
    Json(ListResponse::from_models(stats))
}
