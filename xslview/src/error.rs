use xslview_render::{decode_source, Error};

/// Report `e` on stderr, with the offending source excerpt when the error
/// points into a file.
pub(crate) fn render_error(e: &Error) -> std::io::Result<()> {
    let (Some(path), Some(span)) = (e.source_path(), e.span()) else {
        eprintln!("error: {e}");
        return Ok(());
    };
    let Some(src) = std::fs::read(path)
        .ok()
        .and_then(|bytes| decode_source(&bytes).ok())
    else {
        eprintln!("error: {e}");
        return Ok(());
    };

    let name = path.display().to_string();
    let span = clamp(span, src.len());
    let red = ariadne::Color::Red;
    ariadne::Report::build(ariadne::ReportKind::Error, (name.as_str(), span.clone()))
        .with_message(e.to_string())
        .with_label(
            ariadne::Label::new((name.as_str(), span))
                .with_message(format!("{:?}", e.kind()))
                .with_color(red),
        )
        .finish()
        .eprint((name.as_str(), ariadne::Source::from(src.as_str())))
}

// ariadne wants a span inside the source, even for errors at end of input
fn clamp(span: std::ops::Range<usize>, len: usize) -> std::ops::Range<usize> {
    let start = span.start.min(len);
    start..span.end.clamp(start, len)
}
