use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::command::remove_link;
use crate::store::DisplayMode;

/// One site as it appears on the generated page
#[derive(Debug, Clone, Copy)]
pub struct Tile<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub visits: i64,
    /// `data:` url of the screenshot or placeholder
    pub image: &'a str,
    /// `data:` url of the remove icon
    pub remove_icon: &'a str,
}

pub fn data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Appends the markup for one tile in the layout `mode` expects.
pub fn render_tile(mode: DisplayMode, tile: &Tile, out: &mut String) {
    let url = escape_html(tile.url);
    let title = escape_html(tile.title);
    let remove = escape_html(&remove_link(tile.url));
    let visits = tile.visits;
    let image = tile.image;
    let icon = tile.remove_icon;

    match mode {
        DisplayMode::CoverFlow => {
            out.push_str(&format!("<div class=\"item\" href=\"{url}\">"));
            out.push_str(&format!(
                "<img class=\"content\" title=\"{title}\" src=\"{image}\" alt=\"{title}\" visitcount=\"{visits}\">"
            ));
            out.push_str("<div class=\"caption\">");
            out.push_str(&format!(
                "<h4><a href=\"{remove}\"><img src=\"{icon}\"></a>&nbsp;<a href=\"{url}\">{title}</a></h4>"
            ));
            out.push_str("</div>");
            out.push_str("</div>");
        }
        DisplayMode::Grid => {
            out.push_str("<li class=\"clearfix\">");
            out.push_str(&format!("<a href=\"{url}\"><img src=\"{image}\" visitcount=\"{visits}\"></a>"));
            out.push_str(&format!("<div class=\"meta\"><h4>{title}</h4></div>"));
            out.push_str(&format!(
                "<div class=\"remove\"><span><a href=\"{remove}\"><img src=\"{icon}\"></a></span></div>"
            ));
            out.push_str("</li>");
        }
    }
}
