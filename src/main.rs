//! hexpane - render a window of a binary file as a hex dump

use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;

use hexpane::annotations::{build_regions, Annotations, BuildOptions};
use hexpane::cli::CliArgs;
use hexpane::clipboard::SystemClipboard;
use hexpane::config::ViewConfig;
use hexpane::config_paths::ConfigPaths;
use hexpane::messages::{ClipboardMsg, CursorMsg, Msg, ScrollMsg};
use hexpane::model::{DocumentView, FontMetrics, HighlightSource, ScreenArea};
use hexpane::storage::{ByteSource, FileSource};
use hexpane::surface::{Surface, TextSurface};
use hexpane::tracing::LayoutSnapshot;
use hexpane::update::update;

fn main() -> Result<()> {
    let args = CliArgs::parse();
    let _log_guard = hexpane::tracing::init();

    if args.log_path {
        match ConfigPaths::discover() {
            Some(paths) => println!("{}", paths.log_file().display()),
            None => eprintln!("No log directory available"),
        }
        return Ok(());
    }

    let config = ViewConfig::load();
    let mut options = config.display.clone();
    args.apply_to(&mut options);

    let source: Rc<dyn ByteSource> = Rc::new(FileSource::open(&args.file)?);

    let annotations = match &args.annotations {
        Some(path) => Annotations::load(path)?,
        None => Annotations::default(),
    };
    let highlighter = (!annotations.highlights.is_empty())
        .then(|| Rc::new(annotations.highlight_map()) as Rc<dyn HighlightSource>);
    let regions = build_regions(
        source.len(),
        &annotations.comments,
        highlighter,
        BuildOptions::default(),
    );

    let mut surface = TextSurface::new(args.width.max(1), args.lines.max(1));
    let metrics = FontMetrics::from_surface(&surface);
    let (width, height) = surface.client_size();

    let mut view = DocumentView::new(source, options, metrics, width, height);
    view.set_timing(config.timing());
    update(&mut view, Msg::ReplaceRegions(regions));
    update(&mut view, Msg::Cursor(CursorMsg::Goto(args.offset)));

    // Put the requested byte's line at the top of the window
    if let Some(rect) = view.offset_document_rect(view.cursor_position(), ScreenArea::Hex) {
        update(&mut view, Msg::Scroll(ScrollMsg::ToLine(rect.y.max(0) as u64)));
    }

    if let Some(length) = args.copy {
        view.set_selection(args.offset, length);
        let copied = match update(&mut view, Msg::Clipboard(ClipboardMsg::Copy)) {
            Some(cmd) => cmd.deliver_clipboard(&mut SystemClipboard::new()?)?,
            None => 0,
        };
        if copied == 0 {
            eprintln!("Nothing to copy at offset {}", args.offset);
        }
        return Ok(());
    }

    if args.dump_layout {
        let json = serde_json::to_string_pretty(&LayoutSnapshot::capture(&view))
            .context("Failed to serialize layout")?;
        println!("{}", json);
        return Ok(());
    }

    view.paint(&mut surface);
    println!("{}", surface.render());
    Ok(())
}
