use super::{Figure, FIGURE_SIZE};
use crate::report::PieData;
use crate::style::{ApplyStyle, FigureStyle};
use kurbo::{Affine, CircleSegment, Point, Rect};
use piet::{RenderContext, Text, TextLayout, TextLayoutBuilder};
use std::f64::consts::PI;

/// Outer undecorated ring, relative to the labelled pie.
const RING_SCALE: f64 = 1.4;
/// Where labels sit along the wedge bisector, relative to the labelled pie.
const LABEL_DISTANCE: f64 = 0.9;
const TITLE_PAD: f64 = 40.;
const PADDING: f64 = 10.;

/// Panel rectangles as fractions of the figure, top-left origin.
const TEXT_PANEL: (f64, f64, f64, f64) = (0.02, 0.03, 0.32, 0.98);
const PIE_PANEL: (f64, f64, f64, f64) = (0.35, 0.03, 0.95, 0.98);

fn panel((x0, y0, x1, y1): (f64, f64, f64, f64)) -> Rect {
    Rect::new(
        x0 * FIGURE_SIZE.width,
        y0 * FIGURE_SIZE.height,
        x1 * FIGURE_SIZE.width,
        y1 * FIGURE_SIZE.height,
    )
}

pub fn render<RC: RenderContext>(
    figure: &Figure,
    style: &FigureStyle,
    ctx: &mut RC,
) -> Result<(), piet::Error> {
    let title = ctx
        .text()
        .new_text_layout(figure.title.clone())
        .apply_style(&style.title)
        .build()?;

    ctx.clear(None, style.background_color);

    ctx.with_save(|ctx| {
        let text_panel = panel(TEXT_PANEL);
        ctx.clip(text_panel);
        ctx.transform(Affine::translate(text_panel.origin().to_vec2()));
        draw_summary(figure, style, ctx)
    })?;

    // title centred over the pie panel
    let pie_panel = panel(PIE_PANEL);
    let title_size = title.size();
    let title_tl = Point {
        x: pie_panel.center().x - title_size.width * 0.5,
        y: pie_panel.y0,
    };
    ctx.draw_text(&title, title_tl);

    let pie_top = pie_panel.y0 + title_size.height + TITLE_PAD;
    let ring_radius =
        (pie_panel.width().min(pie_panel.y1 - pie_top) * 0.5 - PADDING).max(0.);
    let center = Point {
        x: pie_panel.center().x,
        y: pie_top + (pie_panel.y1 - pie_top) * 0.5,
    };

    let brushes = (0..figure.pie.len())
        .map(|idx| {
            let color = style.segment_colors.color(idx, figure.pie.len());
            ctx.solid_brush(color)
        })
        .collect::<Vec<_>>();

    // the ring is the same pie, drawn larger and without labels
    draw_pie(figure, style, ctx, center, ring_radius, &brushes, false)?;
    draw_pie(
        figure,
        style,
        ctx,
        center,
        ring_radius / RING_SCALE,
        &brushes,
        true,
    )
}

/// Draw the summary text top-left aligned at (0, 0), one layout per line.
fn draw_summary<RC: RenderContext>(
    figure: &Figure,
    style: &FigureStyle,
    ctx: &mut RC,
) -> Result<(), piet::Error> {
    let line_height = style.summary.line_height();
    let mut top = 0.;
    for line in figure.summary.lines() {
        if !line.is_empty() {
            let layout = ctx
                .text()
                .new_text_layout(line.to_owned())
                .apply_style(&style.summary)
                .build()?;
            ctx.draw_text(&layout, Point::new(0., top));
        }
        top += line_height;
    }
    Ok(())
}

/// One pie slice in screen space, plus the maths-orientation angle of its bisector.
struct Wedge {
    segment: CircleSegment,
    bisector: f64,
}

/// Slices start at 3 o'clock and run counter-clockwise.
fn wedges(pie: &PieData, center: Point, radius: f64) -> Vec<Wedge> {
    let total = pie.total() as f64;
    // counter-clockwise angle already covered, in maths orientation
    let mut covered = 0.;

    pie.sizes
        .iter()
        .map(|size| {
            let segment_sweep = PI * 2. * (*size as f64 / total);
            // screen y points down, so the maths range [covered, covered + sweep] starts at
            // -(covered + sweep) on screen
            let wedge = Wedge {
                segment: CircleSegment {
                    center,
                    outer_radius: radius,
                    inner_radius: 0.,
                    start_angle: -(covered + segment_sweep),
                    sweep_angle: segment_sweep,
                },
                bisector: covered + segment_sweep * 0.5,
            };
            covered += segment_sweep;
            wedge
        })
        .collect()
}

/// Draw the pie around `center`, with a label per slice if `with_labels` is set.
fn draw_pie<RC: RenderContext>(
    figure: &Figure,
    style: &FigureStyle,
    ctx: &mut RC,
    center: Point,
    radius: f64,
    color_brushes: &[RC::Brush],
    with_labels: bool,
) -> Result<(), piet::Error> {
    if figure.pie.is_empty() {
        return Ok(());
    }

    let wedges = wedges(&figure.pie, center, radius);
    for ((wedge, label), brush) in wedges.iter().zip(&figure.pie.labels).zip(color_brushes) {
        ctx.fill(&wedge.segment, brush);

        if let (true, Some(label_style)) = (with_labels, &style.segment_label) {
            let layout = ctx
                .text()
                .new_text_layout(label.clone())
                .apply_style(label_style)
                .build()?;
            let layout_size = layout.size();

            let anchor = Point {
                x: center.x + wedge.bisector.cos() * radius * LABEL_DISTANCE,
                y: center.y - wedge.bisector.sin() * radius * LABEL_DISTANCE,
            };
            // labels grow away from the centre
            let x = if anchor.x >= center.x {
                anchor.x
            } else {
                anchor.x - layout_size.width
            };
            ctx.draw_text(&layout, Point::new(x, anchor.y - layout_size.height * 0.5));
        }
    }

    Ok(())
}
