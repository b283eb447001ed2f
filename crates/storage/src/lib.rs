use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;
use shared::domain::{CurrentSlide, Element, ElementId, Response};
use thiserror::Error;
use tokio::sync::RwLock;

mod elements;
mod responses;
mod slide;

use elements::ElementStore;
use responses::ResponseStore;
use slide::SlideState;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
}

/// Whether a response may be recorded against an id with no live element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppendPolicy {
    #[default]
    Permissive,
    RequireElement,
}

#[derive(Debug, Clone)]
pub struct DeletedElement {
    pub element: Element,
    pub responses_removed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    pub elements: usize,
    pub responses: usize,
}

/// Elements and responses share one lock so that a cascade delete or a
/// global clear is never observed half-applied.
#[derive(Debug, Default)]
struct Collections {
    elements: ElementStore,
    responses: ResponseStore,
}

/// Process-wide presentation state. Cloning yields another handle to the
/// same state; nothing is persisted.
#[derive(Clone, Default)]
pub struct Storage {
    collections: Arc<RwLock<Collections>>,
    slide: Arc<RwLock<SlideState>>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_slide(&self, name: &str) -> Result<CurrentSlide, StoreError> {
        let mut slide = self.slide.write().await;
        slide.set(name, Utc::now())
    }

    pub async fn current_slide(&self) -> CurrentSlide {
        self.slide.read().await.get()
    }

    pub async fn save_element(
        &self,
        id: &str,
        kind: &str,
        title: &str,
        options: Vec<String>,
    ) -> Result<Element, StoreError> {
        let mut collections = self.collections.write().await;
        collections
            .elements
            .save(id, kind, title, options, Utc::now())
    }

    pub async fn element(&self, id: &ElementId) -> Result<Element, StoreError> {
        let collections = self.collections.read().await;
        collections.elements.get(id).cloned()
    }

    pub async fn list_elements(&self) -> BTreeMap<ElementId, Element> {
        self.collections.read().await.elements.snapshot()
    }

    /// Removes the element and every response keyed to it in one step.
    pub async fn delete_element(&self, id: &ElementId) -> Result<DeletedElement, StoreError> {
        let mut collections = self.collections.write().await;
        let element = collections.elements.remove(id)?;
        let responses_removed = collections.responses.clear_one(id);
        Ok(DeletedElement {
            element,
            responses_removed,
        })
    }

    /// Records a response and returns the element's new response count.
    pub async fn append_response(
        &self,
        element_id: &ElementId,
        response: Response,
        policy: AppendPolicy,
    ) -> Result<usize, StoreError> {
        let mut collections = self.collections.write().await;
        if policy == AppendPolicy::RequireElement
            && !element_id.is_blank()
            && !collections.elements.contains(element_id)
        {
            return Err(StoreError::NotFound(format!(
                "element '{element_id}' not found"
            )));
        }
        collections.responses.append(element_id, response)
    }

    pub async fn responses(&self, element_id: &ElementId) -> Vec<Response> {
        self.collections.read().await.responses.list(element_id)
    }

    /// Reads an element and its responses under the same lock.
    pub async fn element_with_responses(
        &self,
        id: &ElementId,
    ) -> Result<(Element, Vec<Response>), StoreError> {
        let collections = self.collections.read().await;
        let element = collections.elements.get(id)?.clone();
        Ok((element, collections.responses.list(id)))
    }

    pub async fn clear_responses(&self, element_id: &ElementId) -> usize {
        self.collections.write().await.responses.clear_one(element_id)
    }

    /// Empties every response sequence. Callers are responsible for the
    /// admin check.
    pub async fn clear_all_responses(&self) -> usize {
        self.collections.write().await.responses.clear_all()
    }

    pub async fn counts(&self) -> StoreCounts {
        let collections = self.collections.read().await;
        StoreCounts {
            elements: collections.elements.len(),
            responses: collections.responses.total(),
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
