//! A minimal SVG document builder: circles, polylines, and text, each with
//! fill/stroke attributes, rendered with a fixed two-space indent.

use std::fmt::Write as _;

use rgb::RGB8;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, bitcode::Encode, bitcode::Decode)]
pub enum Color {
    None,
    Named(String),
    Rgb(u8, u8, u8),
    Rgba(u8, u8, u8, f64),
}

impl Color {
    pub fn from_rgb8(c: RGB8) -> Self {
        Color::Rgb(c.r, c.g, c.b)
    }

    fn render(&self) -> String {
        match self {
            Color::None => "none".to_string(),
            Color::Named(s) => s.clone(),
            Color::Rgb(r, g, b) => format!("rgb({r},{g},{b})"),
            Color::Rgba(r, g, b, a) => format!("rgba({r},{g},{b},{a})"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PathProps {
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: Option<f64>,
    pub stroke_linecap: Option<&'static str>,
    pub stroke_linejoin: Option<&'static str>,
}

impl PathProps {
    fn render_attrs(&self, out: &mut String) {
        if let Some(fill) = &self.fill {
            write!(out, " fill=\"{}\"", fill.render()).unwrap();
        }
        if let Some(stroke) = &self.stroke {
            write!(out, " stroke=\"{}\"", stroke.render()).unwrap();
        }
        if let Some(width) = self.stroke_width {
            write!(out, " stroke-width=\"{width}\"").unwrap();
        }
        if let Some(cap) = self.stroke_linecap {
            write!(out, " stroke-linecap=\"{cap}\"").unwrap();
        }
        if let Some(join) = self.stroke_linejoin {
            write!(out, " stroke-linejoin=\"{join}\"").unwrap();
        }
    }
}

pub struct Circle {
    pub center: Point,
    pub radius: f64,
    pub props: PathProps,
}

pub struct Polyline {
    pub points: Vec<Point>,
    pub props: PathProps,
}

pub struct Text {
    pub position: Point,
    pub offset: Point,
    pub font_size: u32,
    pub font_family: Option<String>,
    pub font_weight: Option<String>,
    pub data: String,
    pub props: PathProps,
}

pub enum Object {
    Circle(Circle),
    Polyline(Polyline),
    Text(Text),
}

/// Escapes `&`, `"`, `'`, `<`, `>` in that order, matching the replacement
/// order that avoids double-escaping an emitted `&amp;`.
pub fn escape(data: &str) -> String {
    data.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

impl Object {
    fn render(&self, out: &mut String, indent: usize) {
        let pad = " ".repeat(indent);
        match self {
            Object::Circle(c) => {
                write!(out, "{pad}<circle cx=\"{}\" cy=\"{}\" r=\"{}\"", c.center.x, c.center.y, c.radius).unwrap();
                c.props.render_attrs(out);
                out.push_str("/>\n");
            }
            Object::Polyline(p) => {
                write!(out, "{pad}<polyline points=\"").unwrap();
                let pts: Vec<String> = p.points.iter().map(|pt| format!("{},{}", pt.x, pt.y)).collect();
                out.push_str(&pts.join(" "));
                out.push('"');
                p.props.render_attrs(out);
                out.push_str("/>\n");
            }
            Object::Text(t) => {
                write!(
                    out,
                    "{pad}<text{attrs} x=\"{x}\" y=\"{y}\" dx=\"{dx}\" dy=\"{dy}\" font-size=\"{fs}\"",
                    attrs = {
                        let mut s = String::new();
                        t.props.render_attrs(&mut s);
                        s
                    },
                    x = t.position.x,
                    y = t.position.y,
                    dx = t.offset.x,
                    dy = t.offset.y,
                    fs = t.font_size,
                )
                .unwrap();
                if let Some(family) = &t.font_family {
                    write!(out, " font-family=\"{family}\"").unwrap();
                }
                if let Some(weight) = &t.font_weight {
                    write!(out, " font-weight=\"{weight}\"").unwrap();
                }
                write!(out, ">{}</text>\n", escape(&t.data)).unwrap();
            }
        }
    }
}

#[derive(Default)]
pub struct Document {
    objects: Vec<Object>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: Object) {
        self.objects.push(object);
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n");
        out.push_str("<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\">\n");
        for object in &self.objects {
            object.render(&mut out, 2);
        }
        out.push_str("</svg>");
        out
    }
}
