use crate::{
    layers::base::{LayerId, LayerTrait},
    prelude::HashMap,
};

/// Owns the layers on a map and the order they are drawn in.
pub struct LayerManager {
    layers: HashMap<LayerId, Box<dyn LayerTrait>>,
    /// Ascending z-index; ties keep insertion order.
    render_order: Vec<LayerId>,
}

impl LayerManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::default(),
            render_order: Vec::new(),
        }
    }

    /// Adds a layer under an id chosen by the caller
    pub fn add_layer(&mut self, id: LayerId, layer: Box<dyn LayerTrait>) {
        let z_index = layer.z_index();
        self.layers.insert(id, layer);
        self.render_order.retain(|existing| *existing != id);

        // after every layer with the same or lower z-index
        let insert_pos = self
            .render_order
            .iter()
            .position(|other| {
                self.layers
                    .get(other)
                    .map(|l| l.z_index() > z_index)
                    .unwrap_or(false)
            })
            .unwrap_or(self.render_order.len());

        self.render_order.insert(insert_pos, id);
    }

    pub fn remove_layer(&mut self, id: LayerId) -> Option<Box<dyn LayerTrait>> {
        self.render_order.retain(|existing| *existing != id);
        self.layers.remove(&id)
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    pub fn get_layer(&self, id: LayerId) -> Option<&dyn LayerTrait> {
        self.layers.get(&id).map(|l| l.as_ref())
    }

    /// Runs `f` on the layer if it exists.
    pub fn with_layer_mut<F, R>(&mut self, id: LayerId, f: F) -> Option<R>
    where
        F: FnOnce(&mut dyn LayerTrait) -> R,
    {
        self.layers.get_mut(&id).map(|layer| f(layer.as_mut()))
    }

    /// Bottom-most first.
    pub fn layers(&self) -> Vec<(LayerId, &dyn LayerTrait)> {
        self.render_order
            .iter()
            .filter_map(|id| self.layers.get(id).map(|l| (*id, l.as_ref())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl Default for LayerManager {
    fn default() -> Self {
        Self::new()
    }
}
