//! SVG export for pen plotters.
//!
//! The document layout follows plotter conventions: an optional background
//! rectangle, one group of hatch lines per style tag, and the outline layer
//! on top. Plotter software can then assign a pen per group.
//!
//! Coordinates are written with Rust's shortest round-trip `f64` formatting,
//! so every value in the file parses back to exactly what the geometry
//! produced. No rounding, no unit conversion.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::chain::{ChainConfig, chain_segments, chain_to_path_data};
use crate::error::{GeometryError, Result};
use crate::geometry::{Line, Polygon};
use crate::hatch::{HatchMode, HatchPattern, hatch_scene};
use crate::outline::{Segment, silhouette};
use crate::shape::{Shape, StyleTag};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Stroke settings for the two layers.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub hatch_color: String,
    pub hatch_width: f64,
    pub outline_color: String,
    pub outline_width: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            hatch_color: "black".to_string(),
            hatch_width: 1.0,
            outline_color: "black".to_string(),
            outline_width: 10.0,
        }
    }
}

/// How the silhouette is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlineStyle {
    /// One `<line>` per silhouette piece.
    Lines,
    /// Pieces chained into `<path>` elements.
    #[default]
    Paths,
    /// No outline layer.
    None,
}

impl OutlineStyle {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "lines" => Some(OutlineStyle::Lines),
            "paths" => Some(OutlineStyle::Paths),
            "none" => Some(OutlineStyle::None),
            _ => None,
        }
    }
}

/// Hatch lines for one style tag, optionally clipped to the group's shapes.
#[derive(Debug, Clone)]
pub struct HatchGroup {
    pub style: StyleTag,
    pub lines: Vec<Line>,
    pub clip: Vec<Polygon>,
}

#[derive(Debug, Clone)]
enum OutlineLayer {
    Lines(Vec<Line>),
    Paths(Vec<String>),
}

/// Builder for a plotter SVG document.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: f64,
    height: f64,
    background: Option<String>,
    stroke: StrokeStyle,
    groups: Vec<HatchGroup>,
    outline: Option<OutlineLayer>,
}

impl SvgDocument {
    /// Empty document with a white background.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: Some("white".to_string()),
            stroke: StrokeStyle::default(),
            groups: Vec::new(),
            outline: None,
        }
    }

    /// Background fill; `None` leaves the canvas transparent.
    pub fn with_background(mut self, background: Option<String>) -> Self {
        self.background = background;
        self
    }

    pub fn with_stroke(mut self, stroke: StrokeStyle) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn add_hatch_group(&mut self, style: StyleTag, lines: Vec<Line>) {
        self.groups.push(HatchGroup { style, lines, clip: Vec::new() });
    }

    /// A hatch group clipped to `clip` via a `<clipPath>`.
    pub fn add_clipped_hatch_group(
        &mut self,
        style: StyleTag,
        lines: Vec<Line>,
        clip: Vec<Polygon>,
    ) {
        self.groups.push(HatchGroup { style, lines, clip });
    }

    pub fn set_outline_lines(&mut self, lines: Vec<Line>) {
        self.outline = Some(OutlineLayer::Lines(lines));
    }

    /// Outline as ready-made path data strings.
    pub fn set_outline_paths(&mut self, paths: Vec<String>) {
        self.outline = Some(OutlineLayer::Paths(paths));
    }

    /// Total number of hatch lines across all groups.
    pub fn hatch_line_count(&self) -> usize {
        self.groups.iter().map(|g| g.lines.len()).sum()
    }

    /// Serialize the document.
    pub fn render(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))
            .map_err(xml_error)?;

        let width = fmt_num(self.width);
        let height = fmt_num(self.height);
        let view_box = format!("0 0 {} {}", width, height);

        let mut svg = BytesStart::new("svg");
        svg.push_attribute(("xmlns", SVG_NS));
        svg.push_attribute(("width", width.as_str()));
        svg.push_attribute(("height", height.as_str()));
        svg.push_attribute(("viewBox", view_box.as_str()));
        writer.write_event(Event::Start(svg)).map_err(xml_error)?;

        self.write_clip_paths(&mut writer)?;

        if let Some(background) = &self.background {
            let mut rect = BytesStart::new("rect");
            rect.push_attribute(("width", width.as_str()));
            rect.push_attribute(("height", height.as_str()));
            rect.push_attribute(("fill", background.as_str()));
            writer.write_event(Event::Empty(rect)).map_err(xml_error)?;
        }

        for group in &self.groups {
            self.write_hatch_group(&mut writer, group)?;
        }

        if let Some(outline) = &self.outline {
            self.write_outline(&mut writer, outline)?;
        }

        writer.write_event(Event::End(BytesEnd::new("svg"))).map_err(xml_error)?;

        String::from_utf8(writer.into_inner()).map_err(xml_error)
    }

    fn write_clip_paths(&self, writer: &mut Writer<Vec<u8>>) -> Result<()> {
        let clipped: Vec<&HatchGroup> = self.groups.iter().filter(|g| !g.clip.is_empty()).collect();
        if clipped.is_empty() {
            return Ok(());
        }

        writer.write_event(Event::Start(BytesStart::new("defs"))).map_err(xml_error)?;
        for group in clipped {
            let id = clip_id(group.style);
            let mut clip_path = BytesStart::new("clipPath");
            clip_path.push_attribute(("id", id.as_str()));
            writer.write_event(Event::Start(clip_path)).map_err(xml_error)?;

            for polygon in &group.clip {
                let d = polygon_to_path_data(polygon);
                let mut path = BytesStart::new("path");
                path.push_attribute(("d", d.as_str()));
                writer.write_event(Event::Empty(path)).map_err(xml_error)?;
            }

            writer.write_event(Event::End(BytesEnd::new("clipPath"))).map_err(xml_error)?;
        }
        writer.write_event(Event::End(BytesEnd::new("defs"))).map_err(xml_error)?;
        Ok(())
    }

    fn write_hatch_group(&self, writer: &mut Writer<Vec<u8>>, group: &HatchGroup) -> Result<()> {
        let id = group_id(group.style);
        let stroke_width = fmt_num(self.stroke.hatch_width);
        let clip_ref = format!("url(#{})", clip_id(group.style));

        let comment = format!(" style group {} ", group.style.0);
        writer
            .write_event(Event::Comment(BytesText::new(&comment)))
            .map_err(xml_error)?;

        let mut g = BytesStart::new("g");
        g.push_attribute(("id", id.as_str()));
        g.push_attribute(("stroke", self.stroke.hatch_color.as_str()));
        g.push_attribute(("stroke-width", stroke_width.as_str()));
        g.push_attribute(("fill", "none"));
        if !group.clip.is_empty() {
            g.push_attribute(("clip-path", clip_ref.as_str()));
        }
        writer.write_event(Event::Start(g)).map_err(xml_error)?;

        for line in &group.lines {
            write_line(writer, line)?;
        }

        writer.write_event(Event::End(BytesEnd::new("g"))).map_err(xml_error)?;
        Ok(())
    }

    fn write_outline(&self, writer: &mut Writer<Vec<u8>>, outline: &OutlineLayer) -> Result<()> {
        let stroke_width = fmt_num(self.stroke.outline_width);

        let mut g = BytesStart::new("g");
        g.push_attribute(("id", "outlines"));
        g.push_attribute(("stroke", self.stroke.outline_color.as_str()));
        g.push_attribute(("stroke-width", stroke_width.as_str()));
        g.push_attribute(("stroke-linejoin", "round"));
        g.push_attribute(("fill", "none"));
        writer.write_event(Event::Start(g)).map_err(xml_error)?;

        match outline {
            OutlineLayer::Lines(lines) => {
                for line in lines {
                    write_line(writer, line)?;
                }
            }
            OutlineLayer::Paths(paths) => {
                for d in paths {
                    let mut path = BytesStart::new("path");
                    path.push_attribute(("d", d.as_str()));
                    writer.write_event(Event::Empty(path)).map_err(xml_error)?;
                }
            }
        }

        writer.write_event(Event::End(BytesEnd::new("g"))).map_err(xml_error)?;
        Ok(())
    }
}

fn write_line(writer: &mut Writer<Vec<u8>>, line: &Line) -> Result<()> {
    let (x1, y1, x2, y2) = (fmt_num(line.x1), fmt_num(line.y1), fmt_num(line.x2), fmt_num(line.y2));
    let mut el = BytesStart::new("line");
    el.push_attribute(("x1", x1.as_str()));
    el.push_attribute(("y1", y1.as_str()));
    el.push_attribute(("x2", x2.as_str()));
    el.push_attribute(("y2", y2.as_str()));
    writer.write_event(Event::Empty(el)).map_err(xml_error)
}

fn xml_error<E: std::fmt::Display>(e: E) -> GeometryError {
    GeometryError::Svg(e.to_string())
}

/// Shortest representation that parses back to the same `f64`.
#[inline]
fn fmt_num(value: f64) -> String {
    format!("{}", value)
}

pub fn group_id(style: StyleTag) -> String {
    format!("style-{}", style.0)
}

fn clip_id(style: StyleTag) -> String {
    format!("clip-style-{}", style.0)
}

/// Closed path data for a polygon outline.
pub fn polygon_to_path_data(polygon: &Polygon) -> String {
    let mut chain = polygon.points.clone();
    if let Some(first) = chain.first().copied() {
        chain.push(first);
    }
    chain_to_path_data(&chain, 0.0)
}

// ============================================================================
// SCENE EXPORT
// ============================================================================

/// Everything the one-call scene export needs besides the shapes.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub width: f64,
    pub height: f64,
    pub background: Option<String>,
    pub mode: HatchMode,
    pub outline: OutlineStyle,
    /// Add a `<clipPath>` per style group built from the group's shapes.
    pub clip_groups: bool,
    pub chain: ChainConfig,
    pub stroke: StrokeStyle,
}

impl ExportOptions {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            background: Some("white".to_string()),
            mode: HatchMode::default(),
            outline: OutlineStyle::default(),
            clip_groups: false,
            chain: ChainConfig::default(),
            stroke: StrokeStyle::default(),
        }
    }
}

/// Silhouette segments chained into path data strings.
pub fn outline_paths(segments: &[Segment], chain: &ChainConfig) -> Vec<String> {
    let lines: Vec<Line> = segments.iter().map(Segment::to_line).collect();
    chain_segments(&lines, chain)
        .iter()
        .map(|c| chain_to_path_data(c, chain.tolerance))
        .collect()
}

/// Build the document from hatch groups and silhouette segments that were
/// already computed. `outline` is ignored when the options ask for none.
pub fn assemble_scene_document(
    scene: &[Shape],
    groups: Vec<(StyleTag, Vec<Line>)>,
    outline: &[Segment],
    options: &ExportOptions,
) -> SvgDocument {
    let mut doc = SvgDocument::new(options.width, options.height)
        .with_background(options.background.clone())
        .with_stroke(options.stroke.clone());

    for (style, lines) in groups {
        if options.clip_groups {
            let clip = scene.iter().filter(|s| s.style == style).map(Shape::outline).collect();
            doc.add_clipped_hatch_group(style, lines, clip);
        } else {
            doc.add_hatch_group(style, lines);
        }
    }

    match options.outline {
        OutlineStyle::Lines => {
            doc.set_outline_lines(outline.iter().map(Segment::to_line).collect())
        }
        OutlineStyle::Paths => doc.set_outline_paths(outline_paths(outline, &options.chain)),
        OutlineStyle::None => {}
    }

    doc
}

/// Hatch a scene and build its SVG document.
///
/// `pattern_for` maps each style tag to its hatch pattern.
pub fn build_scene_document<F>(
    scene: &[Shape],
    options: &ExportOptions,
    pattern_for: F,
) -> SvgDocument
where
    F: Fn(StyleTag) -> HatchPattern,
{
    let groups = hatch_scene(scene, options.mode, pattern_for);
    let outline = match options.outline {
        OutlineStyle::None => Vec::new(),
        OutlineStyle::Lines | OutlineStyle::Paths => silhouette(scene),
    };
    assemble_scene_document(scene, groups, &outline, options)
}

/// Full pipeline with the built-in pattern presets.
pub fn scene_to_svg(scene: &[Shape], options: &ExportOptions) -> Result<String> {
    build_scene_document(scene, options, HatchPattern::for_style).render()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use quick_xml::Reader;

    /// (element name, attributes) for every start/empty element.
    fn elements(svg: &str) -> Vec<(String, Vec<(String, String)>)> {
        let mut reader = Reader::from_str(svg);
        let mut out = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) | Event::Empty(e) => {
                    let name = String::from_utf8(e.name().as_ref().to_vec()).unwrap();
                    let attrs = e
                        .attributes()
                        .map(|a| {
                            let a = a.unwrap();
                            (
                                String::from_utf8(a.key.as_ref().to_vec()).unwrap(),
                                String::from_utf8(a.value.to_vec()).unwrap(),
                            )
                        })
                        .collect();
                    out.push((name, attrs));
                }
                Event::Eof => break,
                _ => {}
            }
        }
        out
    }

    fn attr<'a>(attrs: &'a [(String, String)], key: &str) -> &'a str {
        attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str()).unwrap()
    }

    #[test]
    fn document_layout() {
        let mut doc = SvgDocument::new(1200.0, 1800.0);
        doc.add_hatch_group(StyleTag(2), vec![Line::new(0.0, 0.0, 10.0, 0.0)]);
        doc.set_outline_lines(vec![Line::new(1.0, 1.0, 2.0, 2.0)]);
        let svg = doc.render().unwrap();

        assert!(svg.starts_with("<?xml"));
        let els = elements(&svg);
        let names: Vec<&str> = els.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["svg", "rect", "g", "line", "g", "line"]);

        assert_eq!(attr(&els[0].1, "viewBox"), "0 0 1200 1800");
        assert_eq!(attr(&els[2].1, "id"), "style-2");
        assert_eq!(attr(&els[2].1, "stroke-width"), "1");
        assert_eq!(attr(&els[4].1, "id"), "outlines");
        assert_eq!(attr(&els[4].1, "stroke-width"), "10");
    }

    #[test]
    fn coordinates_are_written_exactly() {
        let line = Line::new(0.1 + 0.2, 1.0 / 3.0, 123456.789012345, -2.5e-7);
        let mut doc = SvgDocument::new(100.0, 100.0).with_background(None);
        doc.add_hatch_group(StyleTag(0), vec![line]);
        let svg = doc.render().unwrap();

        let els = elements(&svg);
        let (_, attrs) = els.iter().find(|(n, _)| n == "line").unwrap();
        let parsed = Line::new(
            attr(attrs, "x1").parse().unwrap(),
            attr(attrs, "y1").parse().unwrap(),
            attr(attrs, "x2").parse().unwrap(),
            attr(attrs, "y2").parse().unwrap(),
        );
        assert_eq!(parsed, line);
        assert!(!els.iter().any(|(n, _)| n == "rect"), "background disabled");
    }

    #[test]
    fn clipped_group_references_its_clip_path() {
        let square = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        let mut doc = SvgDocument::new(50.0, 50.0);
        let lines = vec![Line::new(0.0, 5.0, 10.0, 5.0)];
        doc.add_clipped_hatch_group(StyleTag(4), lines, vec![square]);
        let els = elements(&doc.render().unwrap());

        let (_, clip) = els.iter().find(|(n, _)| n == "clipPath").unwrap();
        assert_eq!(attr(clip, "id"), "clip-style-4");
        let (_, path) = els.iter().find(|(n, _)| n == "path").unwrap();
        assert_eq!(attr(path, "d"), "M0,0 L10,0 L10,10 L0,10 Z");
        let (_, g) = els.iter().find(|(n, _)| n == "g").unwrap();
        assert_eq!(attr(g, "clip-path"), "url(#clip-style-4)");
    }

    #[test]
    fn scene_export_groups_by_style() {
        let scene = vec![
            Shape::square(300.0, 300.0, 400.0).unwrap().with_style(StyleTag(0)),
            Shape::circle(800.0, 300.0, 200.0).unwrap().with_style(StyleTag(1)).with_z_index(1),
            Shape::circle(350.0, 520.0, 100.0).unwrap().with_style(StyleTag(2)).with_z_index(2),
        ];
        let svg = scene_to_svg(&scene, &ExportOptions::new(1200.0, 1800.0)).unwrap();
        let els = elements(&svg);

        let group_ids: Vec<&str> = els
            .iter()
            .filter(|(n, _)| n == "g")
            .map(|(_, a)| attr(a, "id"))
            .collect();
        assert_eq!(group_ids, vec!["style-0", "style-1", "style-2", "outlines"]);
        assert!(els.iter().filter(|(n, _)| n == "line").count() > 20);
        // Square and small circle overlap into one outline, big circle is alone
        assert_eq!(els.iter().filter(|(n, _)| n == "path").count(), 2);
    }

    #[test]
    fn assembled_document_matches_one_call_build() {
        let scene = vec![
            Shape::square(0.0, 0.0, 100.0).unwrap(),
            Shape::circle(60.0, 0.0, 80.0).unwrap().with_style(StyleTag(1)).with_z_index(1),
        ];
        let options = ExportOptions::new(300.0, 300.0);

        let groups = hatch_scene(&scene, options.mode, HatchPattern::for_style);
        let outline = silhouette(&scene);
        let assembled = assemble_scene_document(&scene, groups, &outline, &options);

        assert_eq!(assembled.render().unwrap(), scene_to_svg(&scene, &options).unwrap());
    }

    #[test]
    fn outline_style_names() {
        assert_eq!(OutlineStyle::from_name("Lines"), Some(OutlineStyle::Lines));
        assert_eq!(OutlineStyle::from_name("none"), Some(OutlineStyle::None));
        assert_eq!(OutlineStyle::from_name("dots"), None);
    }

    #[test]
    fn empty_scene_still_renders() {
        let svg = scene_to_svg(&[], &ExportOptions::new(10.0, 10.0)).unwrap();
        assert!(svg.contains("<svg"));
        assert!(!svg.contains("<line"));
    }
}
