//! HTML pages for the browser front end: the upload form and the results page.

use std::time::Duration;

use crate::mosaic::MosaicStats;

/// Everything the results page shows.
#[derive(Debug)]
pub struct ResultsView<'a> {
    /// Client-side file name of the upload
    pub filename: Option<&'a str>,

    /// Tile size used for the build
    pub tile_size: u32,

    /// Original image as base64 JPEG
    pub original_base64: String,

    /// Mosaic as base64 JPEG
    pub mosaic_base64: String,

    /// Time spent building the mosaic
    pub duration: Duration,

    /// Build statistics
    pub stats: MosaicStats,
}

/// Escape HTML special characters to prevent XSS attacks.
fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

const STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            background: #0f0f0f;
            color: #eee;
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, sans-serif;
            padding: 32px;
        }
        h1 { font-size: 20px; font-weight: 600; margin-bottom: 16px; }
        form, .meta {
            background: rgba(255, 255, 255, 0.05);
            border: 1px solid rgba(255, 255, 255, 0.1);
            border-radius: 8px;
            padding: 16px 20px;
            margin-bottom: 24px;
            font-size: 13px;
            line-height: 1.8;
        }
        label { display: block; margin-bottom: 8px; }
        input[type=number] { width: 80px; }
        .images { display: flex; gap: 24px; flex-wrap: wrap; }
        .images figure { flex: 1 1 400px; }
        .images img { width: 100%; image-rendering: pixelated; border-radius: 4px; }
        figcaption { font-size: 12px; color: #999; margin-top: 6px; }
        a { color: #6cf; }
"#;

/// Generate the upload form page.
///
/// The form posts `multipart/form-data` with fields `image` and `tile_size`
/// to `/mosaic`.
pub fn upload_page(default_tile_size: u32, tile_count: usize) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Mosaic</title>
    <style>{STYLE}</style>
</head>
<body>
    <h1>Photo mosaic</h1>
    <form action="/mosaic" method="post" enctype="multipart/form-data">
        <label>Image <input type="file" name="image" accept="image/*" required></label>
        <label>Tile size <input type="number" name="tile_size" min="1" value="{default_tile_size}"> px</label>
        <button type="submit">Build mosaic</button>
    </form>
    <div class="meta">{tile_count} tiles in library</div>
</body>
</html>"##
    )
}

/// Generate the results page with both images embedded as data URIs.
pub fn results_page(view: &ResultsView<'_>) -> String {
    let filename = html_escape(view.filename.unwrap_or("upload"));
    let duration_ms = view.duration.as_secs_f64() * 1000.0;
    let fallbacks = view.stats.exhausted + view.stats.recovered;

    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Mosaic - {filename}</title>
    <style>{STYLE}</style>
</head>
<body>
    <h1>{filename}</h1>
    <div class="meta">
        Tile size: {tile_size} px<br>
        Blocks: {blocks} ({matched} matched, {fallbacks} fallback)<br>
        Built in {duration_ms:.1} ms<br>
        <a href="/">Make another</a>
    </div>
    <div class="images">
        <figure>
            <img src="data:image/jpeg;base64,{original}" alt="original">
            <figcaption>Original</figcaption>
        </figure>
        <figure>
            <img src="data:image/jpeg;base64,{mosaic}" alt="mosaic">
            <figcaption>Mosaic</figcaption>
        </figure>
    </div>
</body>
</html>"##,
        tile_size = view.tile_size,
        blocks = view.stats.blocks,
        matched = view.stats.matched,
        original = view.original_base64,
        mosaic = view.mosaic_base64,
    )
}
