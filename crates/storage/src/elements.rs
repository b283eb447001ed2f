use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use shared::domain::{Element, ElementId, ElementKind};

use crate::StoreError;

/// Element definitions keyed by caller-supplied id. Saving an existing id
/// overwrites it.
#[derive(Debug, Default)]
pub(crate) struct ElementStore {
    elements: HashMap<ElementId, Element>,
}

impl ElementStore {
    pub(crate) fn save(
        &mut self,
        id: &str,
        kind: &str,
        title: &str,
        options: Vec<String>,
        now: DateTime<Utc>,
    ) -> Result<Element, StoreError> {
        let id = required("id", id)?;
        let kind = required("type", kind)?;
        let title = required("title", title)?;

        let element = Element {
            id: ElementId::new(id),
            kind: ElementKind::from(kind),
            title: title.to_string(),
            options,
            created_at: now,
        };
        self.elements.insert(element.id.clone(), element.clone());
        Ok(element)
    }

    pub(crate) fn get(&self, id: &ElementId) -> Result<&Element, StoreError> {
        self.elements
            .get(id)
            .ok_or_else(|| StoreError::NotFound(format!("element '{id}' not found")))
    }

    pub(crate) fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub(crate) fn remove(&mut self, id: &ElementId) -> Result<Element, StoreError> {
        self.elements
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(format!("element '{id}' not found")))
    }

    pub(crate) fn snapshot(&self) -> BTreeMap<ElementId, Element> {
        self.elements
            .iter()
            .map(|(id, element)| (id.clone(), element.clone()))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.elements.len()
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{field} is required")));
    }
    Ok(value)
}
