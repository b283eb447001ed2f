use std::{sync::Arc, time::Instant};

use chrono::Utc;
use shared::{
    domain::{CurrentSlide, Element, ElementId, Response},
    error::ApiError,
    protocol::{
        Ack, ElementListing, HealthReport, ResponseListing, ResultsPayload, SaveElementRequest,
        ServerEvent, SubmitAck, SubmitResponseRequest,
    },
};
use storage::{AppendPolicy, Storage, StoreError};
use tokio::sync::Mutex;
use tracing::{info, warn};

pub mod gate;
pub mod notify;
pub mod results;

pub use gate::{AdminGate, DenyAll, SharedSecretGate};
pub use notify::{BroadcastNotifier, ChangeNotifier, PollNotifier};

/// Handle shared by every request handler. All mutations go through one
/// write sequencer so that the notification order matches the order in
/// which readers observe the changes; reads never take it.
#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub notifier: Arc<dyn ChangeNotifier>,
    pub admin: Arc<dyn AdminGate>,
    pub append_policy: AppendPolicy,
    started_at: Instant,
    writes: Arc<Mutex<()>>,
}

impl ApiContext {
    pub fn new(
        storage: Storage,
        notifier: Arc<dyn ChangeNotifier>,
        admin: Arc<dyn AdminGate>,
    ) -> Self {
        Self {
            storage,
            notifier,
            admin,
            append_policy: AppendPolicy::Permissive,
            started_at: Instant::now(),
            writes: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_append_policy(mut self, policy: AppendPolicy) -> Self {
        self.append_policy = policy;
        self
    }
}

pub async fn change_slide(
    ctx: &ApiContext,
    slide_name: Option<&str>,
) -> Result<CurrentSlide, ApiError> {
    let name = slide_name.unwrap_or_default();
    let _write = ctx.writes.lock().await;
    let slide = ctx.storage.set_slide(name).await.map_err(store_error)?;
    info!(slide = %slide.current_slide, "slide changed");
    ctx.notifier.publish(ServerEvent::SlideChanged {
        slide: slide.clone(),
    });
    Ok(slide)
}

pub async fn current_slide(ctx: &ApiContext) -> CurrentSlide {
    ctx.storage.current_slide().await
}

pub async fn save_element(ctx: &ApiContext, req: SaveElementRequest) -> Result<Element, ApiError> {
    let _write = ctx.writes.lock().await;
    let element = ctx
        .storage
        .save_element(
            req.id.as_deref().unwrap_or_default(),
            req.kind.as_deref().unwrap_or_default(),
            req.title.as_deref().unwrap_or_default(),
            req.options.unwrap_or_default(),
        )
        .await
        .map_err(store_error)?;
    info!(
        element_id = %element.id,
        kind = %element.kind,
        options = element.options.len(),
        "element saved"
    );
    ctx.notifier.publish(ServerEvent::ElementSaved {
        element: element.clone(),
    });
    Ok(element)
}

pub async fn list_elements(ctx: &ApiContext) -> ElementListing {
    ctx.storage.list_elements().await
}

pub async fn get_element(ctx: &ApiContext, id: &ElementId) -> Result<Element, ApiError> {
    ctx.storage.element(id).await.map_err(store_error)
}

pub async fn delete_element(ctx: &ApiContext, id: &ElementId) -> Result<Ack, ApiError> {
    let _write = ctx.writes.lock().await;
    let deleted = ctx.storage.delete_element(id).await.map_err(store_error)?;
    info!(
        element_id = %id,
        responses_removed = deleted.responses_removed,
        "element deleted"
    );
    ctx.notifier.publish(ServerEvent::ElementDeleted {
        element_id: id.clone(),
    });
    Ok(Ack::ok(format!("element '{id}' deleted")))
}

/// Records one submission. Re-submitting creates an additional response;
/// callers that need deduplication must do it themselves.
pub async fn submit_response(
    ctx: &ApiContext,
    req: SubmitResponseRequest,
) -> Result<SubmitAck, ApiError> {
    let element_id = ElementId::new(req.element_id.unwrap_or_default());
    let response = Response {
        user: req.user.unwrap_or_default(),
        timestamp: Utc::now(),
        response: req.response,
        option: req.option,
        option_text: req.option_text,
    };

    let _write = ctx.writes.lock().await;
    let count = ctx
        .storage
        .append_response(&element_id, response, ctx.append_policy)
        .await
        .map_err(store_error)?;
    info!(element_id = %element_id, count, "response recorded");
    ctx.notifier.publish(ServerEvent::ResponseAdded {
        element_id: element_id.clone(),
        count,
    });
    Ok(SubmitAck {
        success: true,
        element_id,
        count,
    })
}

pub async fn list_responses(ctx: &ApiContext, element_id: &ElementId) -> ResponseListing {
    let responses = ctx.storage.responses(element_id).await;
    ResponseListing {
        element_id: element_id.clone(),
        count: responses.len(),
        responses,
    }
}

pub async fn get_results(
    ctx: &ApiContext,
    element_id: &ElementId,
) -> Result<ResultsPayload, ApiError> {
    let (element, responses) = ctx
        .storage
        .element_with_responses(element_id)
        .await
        .map_err(store_error)?;
    let results = results::aggregate(&element, &responses);
    Ok(ResultsPayload {
        element,
        results,
        timestamp: Utc::now(),
    })
}

pub fn authorize_admin(ctx: &ApiContext, proof: Option<&str>) -> Result<(), ApiError> {
    if ctx.admin.authorize(proof) {
        Ok(())
    } else {
        Err(ApiError::unauthorized("valid admin key required"))
    }
}

pub async fn clear_responses(ctx: &ApiContext, proof: Option<&str>) -> Result<Ack, ApiError> {
    if let Err(err) = authorize_admin(ctx, proof) {
        warn!("rejected unauthorized response clear");
        return Err(err);
    }

    let _write = ctx.writes.lock().await;
    let removed = ctx.storage.clear_all_responses().await;
    info!(removed, "all responses cleared");
    ctx.notifier.publish(ServerEvent::ResponsesCleared);
    Ok(Ack::ok(format!("cleared {removed} responses")))
}

pub async fn health(ctx: &ApiContext) -> HealthReport {
    let slide = ctx.storage.current_slide().await;
    let counts = ctx.storage.counts().await;
    HealthReport {
        status: "ok".into(),
        uptime: ctx.started_at.elapsed().as_secs_f64(),
        current_slide: slide.current_slide,
        elements_count: counts.elements,
        responses_count: counts.responses,
        subscribers: ctx.notifier.subscriber_count(),
    }
}

fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::Validation(message) => ApiError::validation(message),
        StoreError::NotFound(message) => ApiError::not_found(message),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
