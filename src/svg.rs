//! SVG export of a [`Surface`], with the tooltip wired up by an embedded script.

use crate::surface::{Anchor, Element, Layer, Paint, Shape, Surface};
use crate::tooltip::{FADE_IN_MS, FADE_OUT_MS, POINTER_OFFSET, VISIBLE_OPACITY};

const CLIP_ID: &str = "plot-clip";

const LAYERS: [(Layer, &str); 5] = [
    (Layer::Tracks, "tracks"),
    (Layer::Fragments, "fragments"),
    (Layer::Labels, "labels"),
    (Layer::Axis, "axis"),
    (Layer::Legend, "legend"),
];

/// Escape special XML characters
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Two decimals at most, without trailing zeros.
fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn anchor(a: Anchor) -> &'static str {
    match a {
        Anchor::Start => "start",
        Anchor::Middle => "middle",
        Anchor::End => "end",
    }
}

fn paint(surface: &Surface, p: &Paint) -> String {
    match p {
        Paint::Solid(color) => color.to_string(),
        Paint::Gradient(index) => match surface.gradients.get(*index) {
            Some(gradient) => format!("url(#{})", escape_xml(&gradient.id)),
            None => crate::color::SENTINEL.to_string(),
        },
    }
}

fn write_element(svg: &mut String, surface: &Surface, element: &Element) {
    match &element.shape {
        Shape::Rect { x, y, width, height, fill, stroke } => {
            let stroke = match stroke {
                Some((color, w)) => format!(r#" stroke="{}" stroke-width="{}""#, color, num(*w)),
                None => String::new(),
            };
            let tooltip = element.hooks.and_then(|h| surface.tooltips.get(h.tooltip));
            match tooltip {
                Some(content) => {
                    let text = escape_xml(&content.to_plain_text());
                    // attribute values lose raw newlines
                    let data = text.replace('\n', "&#10;");
                    svg.push_str(&format!(
                        r#"<rect class="fragment" x="{}" y="{}" width="{}" height="{}" fill="{}"{} data-tooltip="{}"><title>{}</title></rect>"#,
                        num(*x), num(*y), num(*width), num(*height), paint(surface, fill), stroke, data, text
                    ));
                }
                None => {
                    svg.push_str(&format!(
                        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"{}/>"#,
                        num(*x), num(*y), num(*width), num(*height), paint(surface, fill), stroke
                    ));
                }
            }
        }
        Shape::Text { x, y, text, anchor: a, font_size, dy } => {
            svg.push_str(&format!(
                r#"<text x="{}" y="{}" dy="{}em" text-anchor="{}" font-size="{}">{}</text>"#,
                num(*x), num(*y), dy, anchor(*a), num(*font_size), escape_xml(text)
            ));
        }
        Shape::Line { x1, y1, x2, y2, stroke, width } => {
            svg.push_str(&format!(
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
                num(*x1), num(*y1), num(*x2), num(*y2), stroke, num(*width)
            ));
        }
    }
    svg.push('\n');
}

fn tooltip_script() -> String {
    format!(
        r#"<g id="tooltip" opacity="0" pointer-events="none" style="transition: opacity 0ms">
<rect id="tooltip-box" fill="white" stroke="black" stroke-width="0.5" rx="4"/>
<text id="tooltip-text" font-size="11"></text>
</g>
<script><![CDATA[
(function () {{
  var svg = document.documentElement;
  var tip = document.getElementById("tooltip");
  var box = document.getElementById("tooltip-box");
  var text = document.getElementById("tooltip-text");
  function place(evt) {{
    var p = svg.createSVGPoint();
    p.x = evt.clientX; p.y = evt.clientY;
    p = p.matrixTransform(svg.getScreenCTM().inverse());
    tip.setAttribute("transform", "translate(" + (p.x + {ox}) + "," + (p.y + {oy}) + ")");
  }}
  function show(evt) {{
    while (text.firstChild) text.removeChild(text.firstChild);
    evt.target.getAttribute("data-tooltip").split("\n").forEach(function (row, i) {{
      var line = document.createElementNS("http://www.w3.org/2000/svg", "tspan");
      line.setAttribute("x", 6);
      line.setAttribute("dy", i === 0 ? "1.2em" : "1.1em");
      line.textContent = row;
      text.appendChild(line);
    }});
    var b = text.getBBox();
    box.setAttribute("width", b.width + 12);
    box.setAttribute("height", b.height + 8);
    place(evt);
    tip.style.transition = "opacity {fade_in}ms";
    tip.setAttribute("opacity", "{opacity}");
  }}
  function hide() {{
    tip.style.transition = "opacity {fade_out}ms";
    tip.setAttribute("opacity", "0");
  }}
  Array.prototype.forEach.call(document.querySelectorAll("rect.fragment"), function (r) {{
    var title = r.querySelector("title");
    if (title) r.removeChild(title);
    r.addEventListener("mouseover", show);
    r.addEventListener("mousemove", place);
    r.addEventListener("mouseout", hide);
  }});
}})();
]]></script>
"#,
        ox = POINTER_OFFSET.0,
        oy = POINTER_OFFSET.1,
        fade_in = FADE_IN_MS,
        fade_out = FADE_OUT_MS,
        opacity = VISIBLE_OPACITY,
    )
}

/// Serialize the surface as a self-contained SVG document.
pub fn render_svg(surface: &Surface) -> String {
    let (width, height) = (num(surface.width), num(surface.height));
    let mut svg = String::new();

    svg.push_str(&format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">
<style>
  text {{ font-family: 'DejaVu Sans', Arial, sans-serif; }}
</style>
<rect width="100%" height="100%" fill="white"/>
"#,
        width, height, width, height
    ));

    if let Some(ref placeholder) = surface.placeholder {
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" text-anchor="middle" font-size="14">{}</text>"#,
            num(surface.width / 2.0),
            num(surface.height / 2.0),
            escape_xml(placeholder)
        ));
        svg.push_str("\n</svg>\n");
        return svg;
    }

    svg.push_str("<defs>\n");
    if let Some((x, y, w, h)) = surface.clip {
        svg.push_str(&format!(
            r#"<clipPath id="{}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath>"#,
            CLIP_ID, num(x), num(y), num(w), num(h)
        ));
        svg.push('\n');
    }
    for gradient in &surface.gradients {
        svg.push_str(&format!(
            r#"<linearGradient id="{}" x1="0%" y1="0%" x2="100%" y2="0%">"#,
            escape_xml(&gradient.id)
        ));
        for stop in &gradient.stops {
            svg.push_str(&format!(
                r#"<stop offset="{}%" stop-color="{}"/>"#,
                num(stop.offset * 100.0),
                stop.color
            ));
        }
        svg.push_str("</linearGradient>\n");
    }
    svg.push_str("</defs>\n");

    svg.push_str(&format!(
        r#"<g transform="translate({},{})">"#,
        num(surface.origin.0),
        num(surface.origin.1)
    ));
    svg.push('\n');
    for (layer, class) in LAYERS {
        let clip = if layer.is_clipped() && surface.clip.is_some() {
            format!(r#" clip-path="url(#{})""#, CLIP_ID)
        } else {
            String::new()
        };
        svg.push_str(&format!(r#"<g class="{}"{}>"#, class, clip));
        svg.push('\n');
        for element in surface.layer(layer) {
            write_element(&mut svg, surface, element);
        }
        svg.push_str("</g>\n");
    }
    svg.push_str("</g>\n");

    if !surface.tooltips.is_empty() {
        svg.push_str(&tooltip_script());
    }

    svg.push_str("</svg>\n");
    svg
}
