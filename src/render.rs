use crate::diagram::{RenderedDiagram, Sizing};

const BACKGROUND: &str = "#FFFFFF";
const TEXT_COLOR: &str = "#333333";
const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";
const LINK_OPACITY: f32 = 0.57;

/// Serializes a diagram to a standalone SVG document.
pub fn render_svg(diagram: &RenderedDiagram) -> String {
    let layout = &diagram.layout;
    let title_band = match &diagram.title_text {
        Some(_) => diagram.label_font_size * 1.8,
        None => 0.0,
    };
    let width = layout.width.max(200.0);
    let height = layout.height.max(200.0) + title_band;

    let mut svg = String::new();
    match diagram.sizing {
        Sizing::Fixed => svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        )),
        Sizing::StretchWidth => svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"100%\" viewBox=\"0 0 {width} {height}\" preserveAspectRatio=\"xMidYMid meet\">",
        )),
    }

    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{BACKGROUND}\"/>"
    ));

    if let Some(title) = &diagram.title_text {
        let title_y = diagram.label_font_size * 1.2;
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{title_y:.2}\" text-anchor=\"middle\" font-family=\"{FONT_FAMILY}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{TEXT_COLOR}\">{}</text>",
            width / 2.0,
            diagram.label_font_size,
            escape_xml(title)
        ));
    }

    svg.push_str(&format!("<g transform=\"translate(0 {title_band:.2})\">"));

    for link in &layout.links {
        let (sx, sy) = link.start;
        let (ex, ey) = link.end;
        let mid_x = (sx + ex) / 2.0;
        svg.push_str(&format!(
            "<path d=\"M {sx:.2} {sy:.2} C {mid_x:.2} {sy:.2} {mid_x:.2} {ey:.2} {ex:.2} {ey:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-opacity=\"{LINK_OPACITY}\"/>",
            link.color, link.thickness
        ));
    }

    // Value labels on top of the ribbons so wide flows do not hide them.
    for link in &layout.links {
        if link.label.is_empty() {
            continue;
        }
        let (sx, sy) = link.start;
        let (ex, ey) = link.end;
        let x = (sx + ex) / 2.0;
        let y = (sy + ey) / 2.0 + diagram.fontsize / 3.0;
        svg.push_str(&format!(
            "<text x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"middle\" font-family=\"{FONT_FAMILY}\" font-size=\"{}\" fill=\"{TEXT_COLOR}\">{}</text>",
            diagram.fontsize,
            escape_xml(&link.label)
        ));
    }

    let last_rank = layout.nodes.iter().map(|node| node.rank).max().unwrap_or(0);
    for node in &layout.nodes {
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
            node.x, node.y, layout.node_width, node.height, node.color
        ));
        // Labels sit right of the bar, except for the final column where
        // they would leave the canvas.
        let (label_x, anchor) = if node.rank == last_rank && last_rank > 0 {
            (node.x - 6.0, "end")
        } else {
            (node.x + layout.node_width + 6.0, "start")
        };
        let label_y = node.y + node.height / 2.0 + diagram.label_font_size / 3.0;
        svg.push_str(&format!(
            "<text x=\"{label_x:.2}\" y=\"{label_y:.2}\" text-anchor=\"{anchor}\" font-family=\"{FONT_FAMILY}\" font-size=\"{}\" fill=\"{TEXT_COLOR}\">{}</text>",
            diagram.label_font_size,
            escape_xml(&node.name)
        ));
    }

    svg.push_str("</g></svg>");
    svg
}

/// Wraps one diagram into a standalone interactive page.
pub fn render_page(diagram: &RenderedDiagram, page_title: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_xml(page_title)));
    html.push_str(
        "<style>body{margin:0;padding:1rem;font-family:Helvetica,Arial,sans-serif}\
         .chart{width:100%}.toolbar{padding:0.3rem 0;font-size:0.9rem}</style>\n",
    );
    html.push_str("</head>\n<body>\n");
    if diagram.toolbar_enabled {
        html.push_str(
            "<div class=\"toolbar\"><a href=\"#\" onclick=\"const s=document.querySelector('svg');\
             const b=new Blob([s.outerHTML],{type:'image/svg+xml'});\
             this.href=URL.createObjectURL(b);this.download='sankey.svg';\">Download SVG</a></div>\n",
        );
    }
    html.push_str("<div class=\"chart\">\n");
    html.push_str(&render_svg(diagram));
    html.push_str("\n</div>\n</body>\n</html>\n");
    html
}

/// One page stacking every successful diagram of a batch in a single
/// stretch-width column. An empty batch yields a page with an empty grid.
pub fn render_combined_page(diagrams: &[RenderedDiagram], page_title: &str) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_xml(page_title)));
    html.push_str(
        "<style>body{margin:0;padding:1rem;font-family:Helvetica,Arial,sans-serif}\
         .grid{display:grid;grid-template-columns:1fr;gap:2rem}\
         section{width:100%}h2{margin:0 0 0.5rem 0}</style>\n",
    );
    html.push_str("</head>\n<body>\n<div class=\"grid\">\n");
    for diagram in diagrams {
        html.push_str("<section>\n");
        html.push_str(&format!("<h2>{}</h2>\n", escape_xml(&diagram.title)));
        html.push_str(&render_svg(diagram));
        html.push_str("\n</section>\n");
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
