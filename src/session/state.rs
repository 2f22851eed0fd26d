use crate::config::DesignerConfig;
use crate::domain::{Layer, Selection, TextStyle};
use crate::export::{Exporter, RasterSnapshot};
use crate::render::{FontBook, RenderOptions, pixmap_to_rgba, render_scene};
use crate::scene::SceneStore;
use crate::widget::surface::Gesture;

/// One editing session: the scene, the selection and the export consumer
///
/// All state changes go through the mutation operations; every committed
/// change ends with exactly one export.
#[derive(Debug)]
pub struct Designer {
    pub(crate) scene: SceneStore,
    pub(crate) selection: Selection,
    pub(crate) fonts: FontBook,
    pub(crate) text_style: TextStyle,
    pub(crate) exporter: Exporter,
    pub(crate) gesture: Option<Gesture>,
}

impl Designer {
    /// Start a session with the given configuration and export consumer
    pub fn new(
        config: &DesignerConfig,
        fonts: FontBook,
        on_design_change: impl FnMut(RasterSnapshot) + 'static,
    ) -> Self {
        log::debug!("Starting design session, backing {}", config.backing_color);
        Self {
            scene: SceneStore::new(config.backing_color),
            selection: Selection::Empty,
            fonts,
            text_style: config.text_style,
            exporter: Exporter::new(on_design_change),
            gesture: None,
        }
    }

    /// Session with default configuration, drawing text with the bundled font
    pub fn with_defaults(on_design_change: impl FnMut(RasterSnapshot) + 'static) -> Self {
        Self::new(&DesignerConfig::default(), FontBook::bundled(), on_design_change)
    }

    pub fn scene(&self) -> &SceneStore {
        &self.scene
    }

    /// All layers in render order (bottom to top)
    pub fn layers(&self) -> &[Layer] {
        self.scene.layers()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// The selected layer, if the selection still resolves
    pub fn selected_layer(&self) -> Option<&Layer> {
        self.scene.resolve(&self.selection)
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Style the text controls currently hold
    pub fn text_style(&self) -> TextStyle {
        self.text_style
    }

    pub fn set_text_style(&mut self, style: TextStyle) {
        self.text_style = style;
    }

    /// Number of snapshots pushed to the consumer so far
    pub fn exports(&self) -> u64 {
        self.exporter.exports()
    }

    /// Render the current frame including any in-flight drag and the
    /// selection overlay. Never exported.
    pub fn render_preview(&self) -> Option<image::RgbaImage> {
        let selected = self.selected_layer();
        let preview = self.gesture.as_ref().and_then(|gesture| {
            self.scene
                .get(gesture.target)
                .map(|layer| (layer, gesture.current))
        });
        let options = RenderOptions { preview, selected };
        render_scene(&self.scene, &self.fonts, options).map(|pixmap| pixmap_to_rgba(&pixmap))
    }

    pub(crate) fn export(&mut self) {
        debug_assert!(self.scene.base_layers_intact());
        self.exporter.export(&self.scene, &self.fonts);
    }
}
