use crate::{
    core::map::Map,
    layers::base::{LayerId, LayerTrait},
    Result,
};

/// A throwaway bundle of layers that are attached to the map together.
///
/// The group itself never lives on the surface; [`FeatureGroup::add_to`]
/// consumes it and hands back the surface ids of its members in insertion order.
#[derive(Default)]
pub struct FeatureGroup {
    layers: Vec<Box<dyn LayerTrait>>,
}

impl FeatureGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, layer: impl LayerTrait + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn add_to(self, map: &mut Map) -> Result<Vec<LayerId>> {
        self.layers
            .into_iter()
            .map(|layer| map.add_layer(layer))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::{LatLng, Point};
    use crate::layers::{marker::Marker, vector::Circle};

    #[test]
    fn test_group_members_get_distinct_ids() {
        let mut map = Map::new(LatLng::new(0.0, 0.0), 2.0, Point::new(400.0, 300.0));
        let group = FeatureGroup::new()
            .with_layer(Circle::new(LatLng::new(1.0, 1.0), 10.0))
            .with_layer(Marker::new(LatLng::new(1.0, 1.0)));
        assert_eq!(group.len(), 2);

        let ids = group.add_to(&mut map).unwrap();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert!(ids.iter().all(|id| map.has_layer(*id)));
    }
}
