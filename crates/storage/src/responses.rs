use std::collections::HashMap;

use shared::domain::{ElementId, Response};

use crate::StoreError;

/// Append-only response log per element id. Insertion order is submission
/// order.
#[derive(Debug, Default)]
pub(crate) struct ResponseStore {
    by_element: HashMap<ElementId, Vec<Response>>,
}

impl ResponseStore {
    pub(crate) fn append(
        &mut self,
        element_id: &ElementId,
        response: Response,
    ) -> Result<usize, StoreError> {
        if element_id.is_blank() {
            return Err(StoreError::Validation("elementId is required".into()));
        }
        if response.user.trim().is_empty() {
            return Err(StoreError::Validation("user is required".into()));
        }

        let entries = self.by_element.entry(element_id.clone()).or_default();
        entries.push(response);
        Ok(entries.len())
    }

    pub(crate) fn list(&self, element_id: &ElementId) -> Vec<Response> {
        self.by_element.get(element_id).cloned().unwrap_or_default()
    }

    pub(crate) fn clear_one(&mut self, element_id: &ElementId) -> usize {
        self.by_element
            .remove(element_id)
            .map(|entries| entries.len())
            .unwrap_or(0)
    }

    pub(crate) fn clear_all(&mut self) -> usize {
        let removed = self.total();
        self.by_element.clear();
        removed
    }

    pub(crate) fn total(&self) -> usize {
        self.by_element.values().map(Vec::len).sum()
    }
}
