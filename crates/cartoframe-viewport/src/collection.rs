//! Ordered z-stack of map layers.
//!
//! The collection owns the layers, assigns their identifiers, and fixes
//! the draw order: index 0 is the bottom of the stack and layers are
//! painted bottom to top.

use cartoframe_core::{Extent, LayerId};
use tracing::debug;

use crate::layer::MapLayer;

/// The ordered set of layers composing the map.
#[derive(Debug, Default)]
pub struct LayerCollection {
    layers: Vec<MapLayer>,
    next_id: LayerId,
}

impl LayerCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            next_id: 1,
        }
    }

    /// Hands out the next layer identifier.
    pub fn allocate_id(&mut self) -> LayerId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Appends a layer on top of the stack, assigning it an identifier if
    /// it does not carry one yet. Returns the layer's identifier.
    pub fn add(&mut self, mut layer: MapLayer) -> LayerId {
        if layer.id == 0 {
            layer.id = self.allocate_id();
        }
        debug!("Added layer {} ({:?})", layer.name, layer.id);
        let id = layer.id;
        self.layers.push(layer);
        id
    }

    /// Inserts a layer at a z-position (0 = bottom). Positions past the top
    /// clamp to an append.
    pub fn insert(&mut self, position: usize, mut layer: MapLayer) -> LayerId {
        if layer.id == 0 {
            layer.id = self.allocate_id();
        }
        let id = layer.id;
        let position = position.min(self.layers.len());
        self.layers.insert(position, layer);
        id
    }

    /// Removes a layer by identifier, returning it if present.
    pub fn remove(&mut self, id: LayerId) -> Option<MapLayer> {
        let index = self.layers.iter().position(|l| l.id == id)?;
        let layer = self.layers.remove(index);
        debug!("Removed layer {} ({:?})", layer.name, layer.id);
        Some(layer)
    }

    /// Looks up a layer by identifier.
    pub fn get(&self, id: LayerId) -> Option<&MapLayer> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Mutable lookup by identifier.
    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut MapLayer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Sets a layer's visibility flag. Returns whether the flag changed.
    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> bool {
        match self.get_mut(id) {
            Some(layer) if layer.visible != visible => {
                layer.visible = visible;
                true
            }
            _ => false,
        }
    }

    /// Moves a layer to a new z-position (0 = bottom). Returns whether the
    /// order changed.
    pub fn move_to(&mut self, id: LayerId, position: usize) -> bool {
        let Some(index) = self.layers.iter().position(|l| l.id == id) else {
            return false;
        };
        let position = position.min(self.layers.len() - 1);
        if position == index {
            return false;
        }
        let layer = self.layers.remove(index);
        self.layers.insert(position, layer);
        true
    }

    /// Iterates layers bottom to top, in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &MapLayer> {
        self.layers.iter()
    }

    /// Mutable iteration bottom to top.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MapLayer> {
        self.layers.iter_mut()
    }

    /// Number of top-level layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// True when the collection holds no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Union of the extents of all layers that have content.
    pub fn extent(&self) -> Option<Extent> {
        let mut acc: Option<Extent> = None;
        for layer in &self.layers {
            if let Some(e) = layer.extent() {
                acc = Some(match acc {
                    Some(a) => a.union(&e),
                    None => e,
                });
            }
        }
        acc
    }
}
