//! Ordered layer storage for one editing session
//!
//! Index 0 is always the background (mat) layer and index 1 the decorative
//! border. User content follows in insertion order, so later layers render on
//! top.

use crate::domain::{
    BaseShape, ContentLayer, Layer, LayerContent, LayerId, Point, Rgba, Selection, Transform,
    canvas,
};
use crate::error::DesignError;

/// Number of permanent layers at the bottom of the stack
pub const BASE_LAYER_COUNT: usize = 2;

#[derive(Debug, Clone)]
pub struct SceneStore {
    layers: Vec<Layer>,
    surface_color: Rgba,
    next_id: u64,
}

impl SceneStore {
    /// Create a store holding only the two base layers
    pub fn new(backing: Rgba) -> Self {
        let mut store = Self {
            layers: Vec::with_capacity(8),
            surface_color: backing,
            next_id: 0,
        };

        let background = Layer {
            id: store.allocate_id(),
            transform: Transform::at(canvas::BACKGROUND_INSET, canvas::BACKGROUND_INSET),
            content: LayerContent::Background(BaseShape::background(backing)),
        };
        let border = Layer {
            id: store.allocate_id(),
            transform: Transform::at(canvas::BORDER_INSET, canvas::BORDER_INSET),
            content: LayerContent::Border(BaseShape::border()),
        };
        store.layers.push(background);
        store.layers.push(border);
        store
    }

    fn allocate_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Append a content layer on top of the stack
    pub fn add_layer(&mut self, content: ContentLayer, transform: Transform) -> LayerId {
        let id = self.allocate_id();
        self.layers.push(Layer {
            id,
            transform,
            content: content.into(),
        });
        log::debug!("Added layer {:?}, {} layers total", id, self.layers.len());
        id
    }

    /// Remove a content layer
    ///
    /// Returns `Ok(None)` if no layer has this id. Removing a base layer is a
    /// programming error and is rejected without touching the store.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<Option<Layer>, DesignError> {
        let Some(index) = self.index_of(id) else {
            return Ok(None);
        };
        if index < BASE_LAYER_COUNT {
            return Err(DesignError::InvalidOperation("base layers cannot be removed"));
        }
        Ok(Some(self.layers.remove(index)))
    }

    /// Set the mat fill and the surface background to the same color
    pub fn replace_base_fill(&mut self, color: Rgba) {
        if let LayerContent::Background(shape) = &mut self.layers[0].content {
            shape.fill = color;
        }
        self.surface_color = color;
    }

    /// Remove every content layer, returning how many were removed
    pub fn clear_content_layers(&mut self) -> usize {
        let removed = self.layers.len() - BASE_LAYER_COUNT;
        self.layers.truncate(BASE_LAYER_COUNT);
        removed
    }

    /// All layers in render order, bottom to top
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// User content layers in render order
    pub fn content_layers(&self) -> &[Layer] {
        &self.layers[BASE_LAYER_COUNT..]
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Never true: the base layers are always present
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn surface_color(&self) -> Rgba {
        self.surface_color
    }

    /// The background layer's shape
    pub fn background(&self) -> Option<&BaseShape> {
        match &self.layers[0].content {
            LayerContent::Background(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.id == id)
    }

    fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    /// Look up the selected layer
    ///
    /// Yields `None` for an empty selection, a stale id, or a base layer id.
    pub fn resolve(&self, selection: &Selection) -> Option<&Layer> {
        let id = selection.id()?;
        self.content_layers().iter().find(|layer| layer.id == id)
    }

    /// Topmost content layer whose transformed box contains `point`
    ///
    /// Base layers are not hit-testable.
    pub fn hit_test(&self, point: Point) -> Option<LayerId> {
        self.content_layers()
            .iter()
            .rev()
            .find(|layer| layer.transform.contains(layer.size(), point))
            .map(Layer::id)
    }

    /// Check the base-layer invariant
    pub fn base_layers_intact(&self) -> bool {
        self.layers.len() >= BASE_LAYER_COUNT
            && matches!(self.layers[0].content, LayerContent::Background(_))
            && matches!(self.layers[1].content, LayerContent::Border(_))
            && self.content_layers().iter().all(|layer| !layer.is_base())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LayerKind, Size, TextLayer, TextStyle};

    fn text(content: &str) -> ContentLayer {
        ContentLayer::Text(TextLayer {
            content: content.to_string(),
            style: TextStyle::default(),
            size: Size::new(100.0, 50.0),
        })
    }

    #[test]
    fn test_new_store_has_base_layers() {
        let store = SceneStore::new(Rgba::rgb(0x1a, 0x1a, 0x1a));
        assert_eq!(store.len(), 2);
        assert_eq!(store.layers()[0].kind(), LayerKind::Background);
        assert_eq!(store.layers()[1].kind(), LayerKind::Border);
        assert!(store.content_layers().is_empty());
        assert!(store.base_layers_intact());
    }

    #[test]
    fn test_add_appends_on_top_with_unique_ids() {
        let mut store = SceneStore::new(Rgba::BLACK);
        let a = store.add_layer(text("a"), Transform::at(0.0, 0.0));
        let b = store.add_layer(text("b"), Transform::at(0.0, 0.0));
        assert_ne!(a, b);
        assert_eq!(store.layers()[2].id(), a);
        assert_eq!(store.layers()[3].id(), b);
    }

    #[test]
    fn test_remove_base_layer_is_rejected() {
        let mut store = SceneStore::new(Rgba::BLACK);
        let background = store.layers()[0].id();
        let border = store.layers()[1].id();

        assert!(matches!(
            store.remove_layer(background),
            Err(DesignError::InvalidOperation(_))
        ));
        assert!(store.remove_layer(border).is_err());
        assert!(store.base_layers_intact());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_remove_missing_id_is_none() {
        let mut store = SceneStore::new(Rgba::BLACK);
        let id = store.add_layer(text("x"), Transform::at(0.0, 0.0));
        assert!(store.remove_layer(id).unwrap().is_some());
        assert!(store.remove_layer(id).unwrap().is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_clear_keeps_exactly_base_layers() {
        let mut store = SceneStore::new(Rgba::BLACK);
        for i in 0..5 {
            store.add_layer(text(&i.to_string()), Transform::at(0.0, 0.0));
        }
        assert_eq!(store.clear_content_layers(), 5);
        assert_eq!(store.len(), 2);
        assert!(store.base_layers_intact());
        assert_eq!(store.clear_content_layers(), 0);
    }

    #[test]
    fn test_replace_base_fill_updates_surface() {
        let mut store = SceneStore::new(Rgba::BLACK);
        let red = Rgba::rgb(0x8b, 0, 0);
        store.replace_base_fill(red);
        assert_eq!(store.background().unwrap().fill, red);
        assert_eq!(store.surface_color(), red);
    }

    #[test]
    fn test_hit_test_prefers_topmost_and_skips_base() {
        let mut store = SceneStore::new(Rgba::BLACK);
        // Inside the mat but outside any content: base layers are not hit
        assert_eq!(store.hit_test(Point::new(60.0, 60.0)), None);

        let lower = store.add_layer(text("lower"), Transform::at(100.0, 100.0));
        let upper = store.add_layer(text("upper"), Transform::at(150.0, 120.0));
        assert_eq!(store.hit_test(Point::new(160.0, 130.0)), Some(upper));
        assert_eq!(store.hit_test(Point::new(110.0, 110.0)), Some(lower));
        assert_eq!(store.hit_test(Point::new(400.0, 300.0)), None);
    }

    #[test]
    fn test_resolve_ignores_stale_and_base_ids() {
        let mut store = SceneStore::new(Rgba::BLACK);
        let id = store.add_layer(text("x"), Transform::at(0.0, 0.0));

        let selection = Selection::Selected(id);
        assert_eq!(store.resolve(&selection).map(Layer::id), Some(id));

        let base = Selection::Selected(store.layers()[0].id());
        assert!(store.resolve(&base).is_none());

        store.remove_layer(id).unwrap();
        assert!(store.resolve(&selection).is_none());
        assert!(store.resolve(&Selection::Empty).is_none());
    }
}
