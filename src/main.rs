use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, bail};
use mat_designer::{
    DesignMsg, Designer, DesignerConfig, FontBook, RasterSnapshot, decode_image_async,
};

const USAGE: &str = "usage: mat-designer OUTPUT.png [TEXT] [IMAGE...]";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = std::env::args().skip(1);
    let Some(output) = args.next().map(PathBuf::from) else {
        bail!(USAGE);
    };
    let text = args.next();
    let images: Vec<PathBuf> = args.map(PathBuf::from).collect();

    let config = DesignerConfig::load();
    let fonts = FontBook::from_config(&config);

    let latest: Rc<RefCell<Option<RasterSnapshot>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&latest);
    let mut designer = Designer::new(&config, fonts, move |snapshot| {
        *sink.borrow_mut() = Some(snapshot);
    });

    // Export the empty mat too, so there is always something to write
    designer.update(DesignMsg::SetBackingColor(config.backing_color))?;

    if let Some(content) = text {
        let style = designer.text_style();
        designer.update(DesignMsg::AddText { content, style })?;
    }

    for path in images {
        let bytes =
            std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
        match decode_image_async(bytes).await {
            Ok(decoded) => {
                designer.insert_image(decoded);
            }
            Err(err) => log::warn!("Skipping {}: {}", path.display(), err),
        }
    }

    let snapshot = latest
        .borrow_mut()
        .take()
        .context("no design was exported")?;
    snapshot
        .save(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    log::info!(
        "Wrote {}x{} design to {}",
        snapshot.width,
        snapshot.height,
        output.display()
    );
    Ok(())
}
