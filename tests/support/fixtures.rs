//! Page and payload builders shaped like the real playlist markup.

use serde_json::{Value, json};

/// One playlist row.
pub fn row_html(id: &str, title: &str, length: &str) -> String {
    format!(
        r#"<tr class="pl-video yt-uix-tile" data-video-id="{id}" data-title="{title}">
  <td class="pl-video-handle"></td>
  <td class="pl-video-index"></td>
  <td class="pl-video-thumbnail"><span class="pl-video-thumb"><a href="/watch?v={id}"><span class="video-thumb"><span class="yt-thumb-simple"><span><img alt="" data-thumb="https://i.ytimg.com/vi/{id}/hqdefault.jpg" src="/yts/img/pixel.gif" width="72"></span></span></span></a></span></td>
  <td class="pl-video-title"><a class="pl-video-title-link" href="/watch?v={id}&amp;list=PL1">
      {title}
    </a><div class="pl-video-owner">by <a href="/channel/UC{id}">Owner &amp; {id}</a></div></td>
  <td class="pl-video-badges"></td>
  <td class="pl-video-edit"></td>
  <td class="pl-video-time"><div class="more-menu-wrapper"><div class="timestamp"><span aria-label="{length}">{length}</span></div></div></td>
</tr>
"#
    )
}

/// `count` rows with ids `{prefix}0..`.
pub fn rows(prefix: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|index| row_html(&format!("{prefix}{index}"), &format!("Title {prefix}{index}"), "3:07"))
        .collect()
}

/// The "load more" control carrying a continuation reference.
pub fn load_more_button(reference: &str) -> String {
    format!(
        r#"<button class="yt-uix-button load-more-button" data-uix-load-more-href="{reference}" data-uix-load-more-target-id="pl-load-more-destination"><span>Load more</span></button>"#
    )
}

/// Full initial page: `preamble` filler blocks, the header, `rows`, then `control`.
pub fn initial_page(preamble: usize, rows: &[String], control: &str) -> String {
    initial_page_with_header(preamble, rows, control, r#"id="pl-header""#)
}

/// Like [`initial_page`] with custom header attributes.
pub fn initial_page_with_header(
    preamble: usize,
    rows: &[String],
    control: &str,
    header_attrs: &str,
) -> String {
    let filler: String = (0..preamble)
        .map(|index| {
            format!(
                "<div class=\"yt-masthead\"><a href=\"/feed/{index}\">Feed</a><span>menu &amp; more</span><br></div>\n"
            )
        })
        .collect();
    let count = rows.len();
    let rows: String = rows.concat();
    format!(
        r#"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8"><title>Mix - YouTube</title>
<script>var ytcfg = {{"a": "<div id=\"\">"}}; if (1 < 2) {{}}</script>
<style>.x > .y {{ color: red }}</style>
</head><body>
<!-- masthead -->
{filler}<div id="">
<div {header_attrs} class="branded-page-box">
  <div class="pl-header-thumb"><img src="https://i.ytimg.com/vi/pl/hqdefault.jpg" alt=""></div>
  <div class="pl-header-content">
    <h1 class="pl-header-title">
      Greatest &amp; Latest
    </h1>
    <ul class="pl-header-details"><li><a href="/user/someone">Some One</a></li><li>{count} videos</li><li>1,234 views</li><li>Updated today</li></ul>
    <div class="pl-header-description"><span class="pl-header-description-text">  A mix of things.  </span></div>
  </div>
</div>
<div class="pl-video-list">
  <div id="browse-items-primary">
    <div class="pl-video-list-inner">
      <table id="pl-video-table" class="pl-video-table"><tbody id="pl-load-more-destination">
{rows}</tbody></table>
      {control}
    </div>
  </div>
</div>
</div>
<div id="footer"><a href="/about">About</a></div>
</body></html>
"#
    )
}

/// Continuation payload with `rows` and an optional next reference.
pub fn continuation_payload(rows: &[String], next: Option<&str>) -> Value {
    let widget = next.map(load_more_button).unwrap_or_default();
    json!({
        "content_html": rows.concat(),
        "load_more_widget_html": format!("\n\n{widget}\n\n"),
    })
}
