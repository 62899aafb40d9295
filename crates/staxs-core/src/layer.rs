//! Drawing layers.

use crate::id::LayerId;
use serde::{Deserialize, Serialize};

/// A named, toggleable group of paths and text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
        }
    }
}

/// Ordered layers plus the one new drawings go to.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStack {
    layers: Vec<Layer>,
    active: Option<LayerId>,
}

impl Default for LayerStack {
    fn default() -> Self {
        let first = Layer::new(LayerId::new("layer-1"), "Layer 1");
        Self {
            active: Some(first.id.clone()),
            layers: vec![first],
        }
    }
}

impl LayerStack {
    /// A stack with the given layers; the first one becomes active.
    pub fn from_layers(layers: Vec<Layer>) -> Self {
        let active = layers.first().map(|l| l.id.clone());
        Self { layers, active }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| &l.id == id)
    }

    pub fn contains(&self, id: &LayerId) -> bool {
        self.get(id).is_some()
    }

    /// The active layer id, if any layer is active.
    pub fn active(&self) -> Option<&LayerId> {
        self.active.as_ref()
    }

    /// Append a layer named after its position and make it active.
    pub fn add(&mut self) -> LayerId {
        let layer = Layer::new(LayerId::generate(), format!("Layer {}", self.layers.len() + 1));
        let id = layer.id.clone();
        self.layers.push(layer);
        self.active = Some(id.clone());
        id
    }

    /// Make `id` active. Unknown ids are ignored.
    pub fn select(&mut self, id: &LayerId) -> bool {
        if self.contains(id) {
            self.active = Some(id.clone());
            true
        } else {
            false
        }
    }

    /// Remove a layer. If it was active, the first remaining layer takes
    /// over (or none, when the stack is now empty).
    pub fn remove(&mut self, id: &LayerId) -> Option<Layer> {
        let index = self.layers.iter().position(|l| &l.id == id)?;
        let removed = self.layers.remove(index);
        let active_gone = self.active.as_ref().is_none_or(|active| !self.contains(active));
        if active_gone {
            self.active = self.layers.first().map(|l| l.id.clone());
        }
        Some(removed)
    }

    pub fn toggle_visible(&mut self, id: &LayerId) -> Option<bool> {
        let layer = self.layers.iter_mut().find(|l| &l.id == id)?;
        layer.visible = !layer.visible;
        Some(layer.visible)
    }

    pub fn rename(&mut self, id: &LayerId, name: impl Into<String>) -> bool {
        match self.layers.iter_mut().find(|l| &l.id == id) {
            Some(layer) => {
                layer.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Whether content on `id` should be drawn. Unknown layers are hidden.
    pub fn is_visible(&self, id: &LayerId) -> bool {
        self.get(id).is_some_and(|l| l.visible)
    }

    /// Replace all layers, keeping the active layer when it survives.
    pub fn replace(&mut self, layers: Vec<Layer>) {
        let keep = self
            .active
            .as_ref()
            .filter(|active| layers.iter().any(|l| &l.id == *active))
            .cloned();
        self.active = keep.or_else(|| layers.first().map(|l| l.id.clone()));
        self.layers = layers;
    }
}
