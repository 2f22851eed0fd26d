//! Design mutation operations
//!
//! Each operation either applies completely and then exports exactly once,
//! or leaves the session untouched and exports nothing.

use crate::domain::{
    ContentLayer, FontFamily, FontSize, ImageLayer, LayerContent, LayerId, Rgba, StyleDelta,
    TextLayer, TextStyle, Transform, canvas,
};
use crate::error::DesignError;
use crate::session::messages::{DesignMsg, PointerEvent};
use crate::session::state::Designer;
use crate::upload::{DecodedImage, decode_image};

/// Handle a DesignMsg, modifying the designer
///
/// Only an image upload can fail; every other message either applies or is
/// a silent no-op.
pub fn handle_design_msg(designer: &mut Designer, msg: DesignMsg) -> Result<(), DesignError> {
    match msg {
        DesignMsg::AddText { content, style } => {
            designer.add_text(&content, style.family, style.size, style.fill);
        }
        DesignMsg::AddImage(bytes) => {
            designer.add_image(&bytes)?;
        }
        DesignMsg::UpdateSelectedStyle(delta) => {
            designer.update_selected_style(delta);
        }
        DesignMsg::DeleteSelected => {
            designer.delete_selected();
        }
        DesignMsg::SetBackingColor(color) => designer.set_backing_color(color),
        DesignMsg::ClearAll => designer.clear_all(),
        DesignMsg::Pointer(PointerEvent::Down(p)) => designer.pointer_down(p),
        DesignMsg::Pointer(PointerEvent::Move(p)) => {
            designer.pointer_move(p);
        }
        DesignMsg::Pointer(PointerEvent::Up(p)) => {
            designer.pointer_up(p);
        }
    }
    Ok(())
}

impl Designer {
    /// Dispatch a control or pointer message
    pub fn update(&mut self, msg: DesignMsg) -> Result<(), DesignError> {
        handle_design_msg(self, msg)
    }

    /// Add a text label and select it
    ///
    /// Blank content is ignored. Returns the new layer's id.
    pub fn add_text(
        &mut self,
        content: &str,
        family: FontFamily,
        size: FontSize,
        fill: Rgba,
    ) -> Option<LayerId> {
        if content.trim().is_empty() {
            return None;
        }

        let style = TextStyle { family, size, fill };
        let text = TextLayer {
            content: content.to_string(),
            style,
            size: self.fonts.measure(content, &style),
        };
        let (x, y) = canvas::TEXT_ORIGIN;
        let id = self
            .scene
            .add_layer(ContentLayer::Text(text), Transform::at(x, y));
        self.selection.select(id);
        self.export();
        Some(id)
    }

    /// Add a text label using the style held by the text controls
    pub fn add_text_with_current_style(&mut self, content: &str) -> Option<LayerId> {
        let style = self.text_style;
        self.add_text(content, style.family, style.size, style.fill)
    }

    /// Decode an uploaded image, add it fitted to the insertion box and select it
    ///
    /// On a decode failure nothing changes and nothing is exported.
    pub fn add_image(&mut self, bytes: &[u8]) -> Result<LayerId, DesignError> {
        let decoded = match decode_image(bytes) {
            Ok(decoded) => decoded,
            Err(err) => {
                log::info!("Rejected image upload: {}", err);
                return Err(err);
            }
        };
        Ok(self.insert_image(decoded))
    }

    /// Add an already decoded image, fitted to the insertion box, and select it
    pub fn insert_image(&mut self, image: DecodedImage) -> LayerId {
        let fit_scale = image.fit_scale();
        let (x, y) = canvas::IMAGE_ORIGIN;
        let layer = ImageLayer {
            pixels: image.rgba,
            fit_scale,
        };
        let id = self.scene.add_layer(
            ContentLayer::Image(layer),
            Transform::at(x, y).with_scale(fit_scale),
        );
        self.selection.select(id);
        self.export();
        id
    }

    /// Restyle the selected text label
    ///
    /// Ignored when nothing is selected, the selection is not text, or the
    /// delta changes nothing. Returns whether the scene changed.
    pub fn update_selected_style(&mut self, delta: StyleDelta) -> bool {
        if delta.is_empty() {
            return false;
        }
        let Some(id) = self.selection.id() else {
            return false;
        };
        let fonts = &self.fonts;
        let Some(layer) = self.scene.get_mut(id) else {
            return false;
        };
        let LayerContent::Text(text) = &mut layer.content else {
            return false;
        };

        text.style = delta.applied_to(text.style);
        text.size = fonts.measure(&text.content, &text.style);
        self.export();
        true
    }

    /// Remove the selected layer; returns whether anything was removed
    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selection.id() else {
            return false;
        };
        match self.scene.remove_layer(id) {
            Ok(Some(_)) => {
                self.selection.forget(id);
                self.gesture = None;
                self.export();
                true
            }
            Ok(None) => {
                // Stale selection; nothing left to delete
                self.selection.clear();
                false
            }
            Err(err) => {
                log::error!("Refusing to delete {:?}: {}", id, err);
                self.selection.clear();
                false
            }
        }
    }

    /// Change the mat color (and the surface behind it)
    pub fn set_backing_color(&mut self, color: Rgba) {
        self.scene.replace_base_fill(color);
        self.export();
    }

    /// Remove every user layer, keeping the mat and border
    pub fn clear_all(&mut self) {
        let removed = self.scene.clear_content_layers();
        log::debug!("Cleared {} layers", removed);
        self.selection.clear();
        self.gesture = None;
        self.export();
    }

    /// Store a new transform for the selected layer
    ///
    /// Only the selected content layer can be transformed; anything else, or
    /// a transform equal to the current one, is ignored. Returns whether the
    /// scene changed.
    pub fn commit_transform(&mut self, id: LayerId, transform: Transform) -> bool {
        if !self.selection.is_selected(id) {
            return false;
        }
        if self.scene.resolve(&self.selection).is_none() {
            return false;
        }
        let Some(layer) = self.scene.get_mut(id) else {
            return false;
        };
        if layer.transform == transform {
            return false;
        }
        layer.transform = transform;
        self.export();
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::domain::{LayerKind, Selection};
    use crate::export::RasterSnapshot;
    use crate::upload::decode_image_async;
    use crate::upload::tests::png_fixture;

    pub(crate) type Received = Rc<RefCell<Vec<RasterSnapshot>>>;

    pub(crate) fn designer() -> (Designer, Received) {
        let received: Received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        let designer = Designer::with_defaults(move |snap| sink.borrow_mut().push(snap));
        (designer, received)
    }

    fn white() -> Rgba {
        "#FFFFFF".parse().unwrap()
    }

    fn assert_invariants(designer: &Designer) {
        let layers = designer.layers();
        assert!(layers.len() >= 2);
        assert_eq!(layers[0].kind(), LayerKind::Background);
        assert_eq!(layers[1].kind(), LayerKind::Border);
        if let Some(id) = designer.selection().id() {
            let layer = designer.scene().get(id).expect("selected id must exist");
            assert!(!layer.is_base());
        }
    }

    #[test]
    fn test_add_text_selects_and_exports_once() {
        let (mut d, received) = designer();
        d.set_backing_color("#1a1a1a".parse().unwrap());
        let id = d
            .add_text("RS3", FontFamily::Arial, FontSize::Px48, white())
            .unwrap();

        assert_eq!(d.layers().len(), 3);
        assert_eq!(d.selection(), Selection::Selected(id));
        assert_eq!(received.borrow().len(), 2);

        // The new text shows up in the exported composition
        let snapshots = received.borrow();
        assert_ne!(snapshots[0], snapshots[1]);
        let size = d.scene().get(id).unwrap().size();
        let pixels = snapshots[1].decode().unwrap();
        let white_in_box = (150..150 + size.width as u32)
            .flat_map(|x| (150..150 + size.height as u32).map(move |y| (x, y)))
            .any(|(x, y)| pixels.get_pixel(x, y).0 == [255, 255, 255, 255]);
        assert!(white_in_box);

        let layer = d.scene().get(id).unwrap();
        assert_eq!(layer.transform(), Transform::at(150.0, 150.0));
        let text = layer.as_text().unwrap();
        assert_eq!(text.content, "RS3");
        assert_eq!(text.style.fill, white());
        assert_invariants(&d);
    }

    #[test]
    fn test_huge_text_label_still_exports() {
        let (mut d, received) = designer();
        let content = format!("{}\n", "W".repeat(700)).repeat(700);
        let id = d
            .add_text(&content, FontFamily::Arial, FontSize::Px96, white())
            .unwrap();
        assert_eq!(received.borrow().len(), 1);

        // Shrinking it right down re-renders the whole label onto the canvas
        let tiny = Transform::at(40.0, 40.0).with_scale(0.05);
        assert!(d.commit_transform(id, tiny));
        assert_eq!(received.borrow().len(), 2);
        let snapshots = received.borrow();
        assert_eq!((snapshots[1].width, snapshots[1].height), (500, 350));
    }

    #[test]
    fn test_blank_text_is_a_silent_no_op() {
        let (mut d, received) = designer();
        assert!(d.add_text("", FontFamily::Arial, FontSize::Px48, white()).is_none());
        assert!(
            d.add_text("  \t\n", FontFamily::Impact, FontSize::Px24, white())
                .is_none()
        );
        assert_eq!(d.layers().len(), 2);
        assert!(d.selection().is_empty());
        assert!(received.borrow().is_empty());
    }

    #[test]
    fn test_add_image_downscales_to_fit() {
        let (mut d, received) = designer();
        let id = d.add_image(&png_fixture(300, 200, [255, 0, 0, 255])).unwrap();

        let layer = d.scene().get(id).unwrap();
        let image = layer.as_image().unwrap();
        assert_eq!(image.fit_scale, 0.5);
        assert_eq!(layer.transform(), Transform::at(200.0, 120.0).with_scale(0.5));
        let on_canvas = layer.size().scaled(layer.transform().scale);
        assert_eq!((on_canvas.width, on_canvas.height), (150.0, 100.0));
        assert_eq!(d.selection(), Selection::Selected(id));
        assert_eq!(received.borrow().len(), 1);
    }

    #[test]
    fn test_add_image_upscales_small_images() {
        let (mut d, _) = designer();
        let id = d.add_image(&png_fixture(60, 60, [0, 0, 255, 255])).unwrap();
        let layer = d.scene().get(id).unwrap();
        assert_eq!(layer.as_image().unwrap().fit_scale, 2.5);
        let on_canvas = layer.size().scaled(layer.transform().scale);
        assert_eq!((on_canvas.width, on_canvas.height), (150.0, 150.0));
    }

    #[test]
    fn test_add_image_decode_failure_changes_nothing() {
        let (mut d, received) = designer();
        let text = d
            .add_text("keep", FontFamily::Arial, FontSize::Px32, white())
            .unwrap();
        let before = d.layers().to_vec();

        let err = d.add_image(b"GIF89a-but-not-really").unwrap_err();
        assert!(matches!(err, DesignError::Decode(_)));
        assert_eq!(d.layers(), &before[..]);
        assert_eq!(d.selection(), Selection::Selected(text));
        assert_eq!(received.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_overlapping_decodes_insert_in_completion_order() {
        let (mut d, received) = designer();
        let mut wide = Box::pin(decode_image_async(png_fixture(600, 300, [255, 0, 0, 255])));
        let mut tall = Box::pin(decode_image_async(png_fixture(30, 60, [0, 0, 255, 255])));

        let mut inserted = Vec::new();
        let (mut wide_done, mut tall_done) = (false, false);
        while !(wide_done && tall_done) {
            tokio::select! {
                decoded = &mut wide, if !wide_done => {
                    wide_done = true;
                    inserted.push(d.insert_image(decoded.unwrap()));
                }
                decoded = &mut tall, if !tall_done => {
                    tall_done = true;
                    inserted.push(d.insert_image(decoded.unwrap()));
                }
            }
        }

        // Each upload lands as its own layer, stacked in the order it finished
        let stacked: Vec<LayerId> = d.scene().content_layers().iter().map(|l| l.id()).collect();
        assert_eq!(stacked, inserted);
        assert_eq!(d.selection(), Selection::Selected(inserted[1]));
        assert_eq!(received.borrow().len(), 2);

        let mut fits: Vec<f32> = d
            .scene()
            .content_layers()
            .iter()
            .map(|l| l.as_image().unwrap().fit_scale)
            .collect();
        fits.sort_by(f32::total_cmp);
        assert_eq!(fits, vec![0.25, 2.5]);
        assert_invariants(&d);
    }

    #[test]
    fn test_delete_selected_removes_and_clears() {
        let (mut d, received) = designer();
        d.add_text("one", FontFamily::Arial, FontSize::Px48, white());
        let two = d
            .add_text("two", FontFamily::Arial, FontSize::Px48, white())
            .unwrap();
        let exports_before = received.borrow().len();

        assert!(d.delete_selected());
        assert_eq!(d.layers().len(), 3);
        assert!(d.scene().get(two).is_none());
        assert!(d.selection().is_empty());
        assert_eq!(received.borrow().len(), exports_before + 1);

        // Nothing selected any more
        assert!(!d.delete_selected());
        assert_eq!(received.borrow().len(), exports_before + 1);
        assert_invariants(&d);
    }

    #[test]
    fn test_update_style_requires_selected_text() {
        let (mut d, received) = designer();
        let delta = StyleDelta {
            fill: Some(Rgba::rgb(255, 0, 0)),
            ..Default::default()
        };

        // Empty selection
        assert!(!d.update_selected_style(delta));
        assert!(received.borrow().is_empty());

        // Image selected
        d.add_image(&png_fixture(10, 10, [0, 0, 0, 255])).unwrap();
        let image_layers = d.layers().to_vec();
        assert!(!d.update_selected_style(delta));
        assert_eq!(d.layers(), &image_layers[..]);
        assert_eq!(received.borrow().len(), 1);
    }

    #[test]
    fn test_update_style_applies_delta_and_remeasures() {
        let (mut d, received) = designer();
        let id = d
            .add_text("Golf", FontFamily::Arial, FontSize::Px24, white())
            .unwrap();
        let small = d.scene().get(id).unwrap().size();

        let delta = StyleDelta {
            family: Some(FontFamily::Georgia),
            size: Some(FontSize::Px96),
            fill: None,
        };
        assert!(d.update_selected_style(delta));

        let text = d.scene().get(id).unwrap().as_text().unwrap().clone();
        assert_eq!(text.style.family, FontFamily::Georgia);
        assert_eq!(text.style.size, FontSize::Px96);
        assert_eq!(text.style.fill, white());
        assert!(text.size.width > small.width);
        assert_eq!(received.borrow().len(), 2);

        // An empty delta is not a change
        assert!(!d.update_selected_style(StyleDelta::default()));
        assert_eq!(received.borrow().len(), 2);
    }

    #[test]
    fn test_set_backing_color_exports_without_content() {
        let (mut d, received) = designer();
        let red: Rgba = "#8B0000".parse().unwrap();
        d.set_backing_color(red);

        assert_eq!(d.scene().background().unwrap().fill, red);
        assert_eq!(d.scene().background().unwrap().fill.to_string(), "#8B0000");
        assert_eq!(d.scene().surface_color(), red);
        assert_eq!(received.borrow().len(), 1);

        let pixels = received.borrow()[0].decode().unwrap();
        assert_eq!(pixels.get_pixel(250, 175).0, [0x8b, 0, 0, 255]);
    }

    #[test]
    fn test_clear_all_leaves_base_layers() {
        let (mut d, received) = designer();
        d.add_text("a", FontFamily::Arial, FontSize::Px48, white());
        d.add_image(&png_fixture(20, 10, [0, 255, 0, 255])).unwrap();
        d.add_text("b", FontFamily::Verdana, FontSize::Px72, white());

        d.clear_all();
        assert_eq!(d.layers().len(), 2);
        assert!(d.selection().is_empty());
        assert_eq!(received.borrow().len(), 4);

        // Also exports on an already empty design
        d.clear_all();
        assert_eq!(received.borrow().len(), 5);
        assert_invariants(&d);
    }

    #[test]
    fn test_commit_transform_requires_selection() {
        let (mut d, received) = designer();
        let first = d
            .add_text("first", FontFamily::Arial, FontSize::Px48, white())
            .unwrap();
        let second = d
            .add_text("second", FontFamily::Arial, FontSize::Px48, white())
            .unwrap();
        assert_eq!(received.borrow().len(), 2);

        // `first` is not selected
        assert!(!d.commit_transform(first, Transform::at(10.0, 10.0)));
        // Same transform as stored
        assert!(!d.commit_transform(second, Transform::at(150.0, 150.0)));
        assert_eq!(received.borrow().len(), 2);

        let moved = Transform::at(60.0, 70.0).with_angle(15.0);
        assert!(d.commit_transform(second, moved));
        assert_eq!(d.scene().get(second).unwrap().transform(), moved);
        assert_eq!(received.borrow().len(), 3);
    }

    #[test]
    fn test_base_layers_cannot_be_targeted() {
        let (mut d, received) = designer();
        let background = d.layers()[0].id();

        // Even a forged selection of a base layer is inert
        d.selection = Selection::Selected(background);
        assert!(!d.commit_transform(background, Transform::at(0.0, 0.0)));
        assert!(!d.update_selected_style(StyleDelta::from_style(TextStyle::default())));
        assert!(!d.delete_selected());
        assert!(d.selection().is_empty());
        assert_eq!(d.layers().len(), 2);
        assert!(received.borrow().is_empty());
    }

    #[test]
    fn test_message_dispatch() {
        let (mut d, received) = designer();
        d.update(DesignMsg::AddText {
            content: "VW".into(),
            style: TextStyle::default(),
        })
        .unwrap();
        d.update(DesignMsg::SetBackingColor(Rgba::rgb(0x33, 0x33, 0x33)))
            .unwrap();
        assert!(d.update(DesignMsg::AddImage(vec![1, 2, 3])).is_err());
        d.update(DesignMsg::DeleteSelected).unwrap();
        d.update(DesignMsg::UpdateSelectedStyle(StyleDelta::default()))
            .unwrap();
        d.update(DesignMsg::ClearAll).unwrap();

        assert_eq!(d.layers().len(), 2);
        assert_eq!(received.borrow().len(), 4);
        assert_eq!(d.exports(), 4);
        assert_invariants(&d);
    }

    #[test]
    fn test_mixed_sequence_keeps_invariants() {
        let (mut d, _) = designer();
        let ops: [fn(&mut Designer); 7] = [
            |d: &mut Designer| {
                d.add_text("A", FontFamily::Impact, FontSize::Px64, Rgba::WHITE);
            },
            |d: &mut Designer| {
                d.add_image(&png_fixture(40, 80, [1, 1, 1, 255])).unwrap();
            },
            |d: &mut Designer| {
                d.delete_selected();
            },
            |d: &mut Designer| d.clear_all(),
            |d: &mut Designer| d.set_backing_color(Rgba::rgb(0xd2, 0xb4, 0x8c)),
            |d: &mut Designer| {
                d.update_selected_style(StyleDelta::from_style(TextStyle::default()));
            },
            |d: &mut Designer| d.pointer_down(crate::domain::Point::new(10.0, 10.0)),
        ];
        for round in 0..3 {
            for (i, op) in ops.iter().enumerate() {
                if (i + round) % 2 == 0 {
                    op(&mut d);
                }
                assert_invariants(&d);
            }
        }
    }
}
