use crate::classify::LaneClass;
use crate::error::RenderError;
use crate::extrapolate::LaneLine;
use crate::geometry::{Line, Point, Vector};
use crate::imagery::RGB;
use image::{Rgb, RgbImage};
use std::collections::HashSet;

/// Distance between samples along a stroke, in pixels.
const STEP_SIZE: f64 = 0.5;

/// Strokes drawn and strokes skipped for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderOutcome {
    pub drawn: Vec<LaneClass>,
    pub failed: Vec<(LaneClass, RenderError)>,
}

/// Draws every line onto the canvas. A failing stroke is logged and recorded,
/// the others are still drawn.
pub fn draw_lines(canvas: &mut RgbImage, lines: &[LaneLine], thickness: u32) -> RenderOutcome {
    lines
        .iter()
        .fold(RenderOutcome::default(), |mut outcome, line| {
            match draw_stroke(canvas, line.from, line.to, line.color, thickness) {
                Ok(()) => outcome.drawn.push(line.class),
                Err(err) => {
                    log::warn!("skipping {} lane stroke: {}", line.class, err);
                    outcome.failed.push((line.class, err));
                }
            }
            outcome
        })
}

/// Paints a straight stroke `thickness` pixels wide. Pixels falling outside the
/// canvas are clipped.
pub fn draw_stroke(
    canvas: &mut RgbImage,
    from: Point,
    to: Point,
    color: RGB,
    thickness: u32,
) -> Result<(), RenderError> {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyCanvas);
    }
    if thickness == 0 {
        return Err(RenderError::ZeroThickness);
    }

    // Beyond the canvas diagonal every radius paints the same pixels.
    let diagonal = (width as f64).hypot(height as f64);
    let radius = (thickness as f64 / 2.0).min(diagonal);
    let min = Vector::new(-radius, -radius);
    let max = Vector::new(width as f64 - 1.0 + radius, height as f64 - 1.0 + radius);
    let off_canvas = || RenderError::OffCanvas {
        from,
        to,
        width,
        height,
    };

    let line = Line::from((from, to)).clip(min, max).ok_or_else(off_canvas)?;
    let pixels = stroke_pixels(line, radius, width, height);
    if pixels.is_empty() {
        return Err(off_canvas());
    }

    let color: Rgb<u8> = color.into();
    pixels
        .into_iter()
        .for_each(|p| canvas.put_pixel(p.x as u32, p.y as u32, color));
    Ok(())
}

fn stroke_pixels(line: Line, radius: f64, width: u32, height: u32) -> HashSet<Point> {
    let reach = radius.ceil() as i32;
    let brush: Vec<(i32, i32)> = (-reach..=reach)
        .flat_map(|dy| (-reach..=reach).map(move |dx| (dx, dy)))
        .filter(|(dx, dy)| {
            let (dx, dy) = (*dx as f64, *dy as f64);
            dx * dx + dy * dy <= radius * radius
        })
        .collect();

    // The end point is chained explicitly since stepping may stop just short of it.
    line.iter(STEP_SIZE)
        .chain(std::iter::once(line.1))
        .filter_map(Point::from_vector)
        .flat_map(|center| {
            brush
                .iter()
                .map(move |(dx, dy)| Point::new(center.x + dx, center.y + dy))
        })
        .filter(|p| p.x >= 0 && p.y >= 0 && (p.x as u32) < width && (p.y as u32) < height)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn lane(class: LaneClass, from: Point, to: Point) -> LaneLine {
        LaneLine {
            class,
            from,
            to,
            color: RGB::red(),
        }
    }

    fn painted(canvas: &RgbImage) -> usize {
        canvas.pixels().filter(|p| **p != Rgb([0, 0, 0])).count()
    }

    #[test]
    fn test_thin_horizontal_stroke() {
        let mut canvas = RgbImage::new(10, 5);
        draw_stroke(&mut canvas, Point::new(1, 2), Point::new(8, 2), RGB::red(), 1).unwrap();
        assert_eq!(8, painted(&canvas));
        assert_eq!(&Rgb([255, 0, 0]), canvas.get_pixel(1, 2));
        assert_eq!(&Rgb([255, 0, 0]), canvas.get_pixel(8, 2));
        assert_eq!(&Rgb([0, 0, 0]), canvas.get_pixel(9, 2));
    }

    #[test]
    fn test_thick_stroke_covers_neighbours() {
        let mut canvas = RgbImage::new(20, 20);
        draw_stroke(&mut canvas, Point::new(10, 2), Point::new(10, 17), RGB::red(), 5).unwrap();
        for x in 8..=12 {
            assert_eq!(&Rgb([255, 0, 0]), canvas.get_pixel(x, 10));
        }
        assert_eq!(&Rgb([0, 0, 0]), canvas.get_pixel(7, 10));
        assert_eq!(&Rgb([0, 0, 0]), canvas.get_pixel(13, 10));
    }

    #[test]
    fn test_partially_visible_stroke_is_clipped() {
        let mut canvas = RgbImage::new(10, 10);
        draw_stroke(&mut canvas, Point::new(-100, 5), Point::new(5, 5), RGB::red(), 1).unwrap();
        assert_eq!(6, painted(&canvas));
    }

    #[test]
    fn test_far_away_endpoints_are_clipped() {
        let mut canvas = RgbImage::new(10, 10);
        draw_stroke(
            &mut canvas,
            Point::new(-1_000_000_000, 5),
            Point::new(1_000_000_000, 5),
            RGB::red(),
            1,
        )
        .unwrap();
        assert_eq!(10, painted(&canvas));
    }

    #[test]
    fn test_stroke_outside_canvas_fails_without_painting() {
        let mut canvas = RgbImage::new(10, 10);
        let result = draw_stroke(&mut canvas, Point::new(20, 0), Point::new(30, 9), RGB::red(), 3);
        assert!(matches!(result, Err(RenderError::OffCanvas { .. })));
        assert_eq!(0, painted(&canvas));
    }

    #[test]
    fn test_degenerate_targets() {
        let mut empty = RgbImage::new(0, 0);
        assert_eq!(
            Err(RenderError::EmptyCanvas),
            draw_stroke(&mut empty, Point::new(0, 0), Point::new(1, 1), RGB::red(), 1)
        );
        let mut canvas = RgbImage::new(4, 4);
        assert_eq!(
            Err(RenderError::ZeroThickness),
            draw_stroke(&mut canvas, Point::new(0, 0), Point::new(3, 3), RGB::red(), 0)
        );
    }

    #[test]
    fn test_oversized_thickness_fills_small_canvas() {
        let mut canvas = RgbImage::new(64, 48);
        draw_stroke(&mut canvas, Point::new(40, 10), Point::new(30, 20), RGB::red(), u32::MAX)
            .unwrap();
        assert_eq!(64 * 48, painted(&canvas));

        let mut canvas = RgbImage::new(64, 48);
        let lines = [lane(LaneClass::Left, Point::new(40, 10), Point::new(30, 20))];
        let outcome = draw_lines(&mut canvas, &lines, 200_000);
        assert_eq!(vec![LaneClass::Left], outcome.drawn);
        assert_eq!(64 * 48, painted(&canvas));
    }

    #[test]
    fn test_failed_stroke_does_not_abort_the_others() {
        let mut canvas = RgbImage::new(10, 10);
        let lines = [
            lane(LaneClass::Left, Point::new(50, 50), Point::new(60, 60)),
            lane(LaneClass::Right, Point::new(0, 9), Point::new(9, 0)),
        ];
        let outcome = draw_lines(&mut canvas, &lines, 1);
        assert_eq!(vec![LaneClass::Right], outcome.drawn);
        assert_eq!(1, outcome.failed.len());
        assert_eq!(LaneClass::Left, outcome.failed[0].0);
        assert!(painted(&canvas) > 0);
    }

    #[test]
    fn test_no_lines_leaves_canvas_untouched() {
        let mut canvas = RgbImage::new(10, 10);
        let outcome = draw_lines(&mut canvas, &[], 5);
        assert_eq!(RenderOutcome::default(), outcome);
        assert_eq!(0, painted(&canvas));
    }
}
