use egui::{Color32, Pos2, Vec2};

use super::{Drawable, DrawingOptions};
use crate::geometry::{catmull_rom, path_length};
use crate::id_generator::generate_id;
use crate::input::PointerSample;
use crate::surface::Surface;

const VELOCITY_WINDOW: usize = 5;
const MIN_LINE_WIDTH: f32 = 0.5;
const VELOCITY_FACTOR: f32 = 0.9;
const INITIAL_LINE_WIDTH: f32 = 5.0;
const SPLINE_STEPS: usize = 10;

const ARROW_TAIL_FRACTION: f32 = 0.2;
const ARROW_WING_ANGLE: f32 = std::f32::consts::FRAC_PI_6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenMode {
    Line,
    Arrow,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointWithWidth {
    pub pos: Pos2,
    pub width: f32,
    /// Part of an arrowhead appended on release; skipped by the spline pass.
    pub arrow: bool,
}

/// Freehand pen whose width thins as the pointer speeds up.
#[derive(Debug, Clone)]
pub struct SmoothedPen {
    id: usize,
    pub points: Vec<PointWithWidth>,
    color: Color32,
    size: f32,
    mode: PenMode,
    last_time: Option<f64>,
    velocities: Vec<f32>,
    current_width: f32,
}

impl SmoothedPen {
    pub fn new(options: DrawingOptions, mode: PenMode) -> Self {
        Self {
            id: generate_id(),
            points: Vec::new(),
            color: options.color,
            size: options.size,
            mode,
            last_time: None,
            velocities: Vec::with_capacity(VELOCITY_WINDOW + 1),
            current_width: INITIAL_LINE_WIDTH,
        }
    }

    pub fn mode(&self) -> PenMode {
        self.mode
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    fn average_velocity(&self) -> f32 {
        if self.velocities.is_empty() {
            return 0.0;
        }
        self.velocities.iter().sum::<f32>() / self.velocities.len() as f32
    }

    fn next_width(&self, velocity: f32) -> f32 {
        let target = (self.size - velocity * VELOCITY_FACTOR).max(MIN_LINE_WIDTH);
        self.current_width * 0.9 + target * 0.1
    }

    pub fn add_sample(&mut self, sample: PointerSample) {
        let last = self.points.last().map_or(sample.pos, |p| p.pos);
        let velocity = match self.last_time {
            Some(t) if sample.time_ms > t => last.distance(sample.pos) / (sample.time_ms - t) as f32,
            _ => 0.0,
        };

        self.velocities.push(velocity);
        if self.velocities.len() > VELOCITY_WINDOW {
            self.velocities.remove(0);
        }

        let width = self.next_width(self.average_velocity());
        self.current_width = width;
        self.points.push(PointWithWidth {
            pos: sample.pos,
            width,
            arrow: false,
        });
        self.last_time = Some(sample.time_ms);
    }

    /// Appends wing, tip, wing after the last point, aimed along the average
    /// direction of the trailing part of the stroke.
    fn append_arrowhead(&mut self) {
        let n = self.points.len();
        if n < 2 {
            return;
        }
        let tail_len = ((n as f32 * ARROW_TAIL_FRACTION).round() as usize).clamp(2, 10).min(n);
        let tail: Vec<Pos2> = self.points[n - tail_len..].iter().map(|p| p.pos).collect();
        let direction = tail.windows(2).fold(Vec2::ZERO, |acc, w| acc + (w[1] - w[0]));
        if direction.length_sq() == 0.0 {
            return;
        }
        let direction = direction.normalized();
        let tail_length = path_length(&tail);
        let head = (3.0 * self.size).max((0.3 * tail_length).min(30.0));

        let tip = tail[tail.len() - 1];
        let back = -direction * head;
        let wing = |angle: f32| {
            let (sin, cos) = angle.sin_cos();
            tip + Vec2::new(back.x * cos - back.y * sin, back.x * sin + back.y * cos)
        };
        let width = self.size;
        for pos in [wing(ARROW_WING_ANGLE), tip, wing(-ARROW_WING_ANGLE)] {
            self.points.push(PointWithWidth { pos, width, arrow: true });
        }
    }

    fn draw_spline(&self, surface: &mut Surface) {
        let pts: Vec<&PointWithWidth> = self.points.iter().filter(|p| !p.arrow).collect();
        if pts.len() < 4 {
            return;
        }
        for i in 0..pts.len() - 3 {
            let p0 = if i > 0 { pts[i - 1] } else { pts[i] };
            let (p1, p2, p3) = (pts[i], pts[i + 1], pts[i + 2]);
            let curve: Vec<Pos2> = (0..=SPLINE_STEPS)
                .map(|s| {
                    let t = s as f32 / SPLINE_STEPS as f32;
                    catmull_rom(p0.pos, p1.pos, p2.pos, p3.pos, t)
                })
                .collect();
            let width = (p1.width + p2.width) / 2.0;
            surface.stroke_polyline(&curve, self.color, width);
        }
    }
}

impl Drawable for SmoothedPen {
    fn id(&self) -> usize {
        self.id
    }

    fn kind(&self) -> &'static str {
        match self.mode {
            PenMode::Line => "pen",
            PenMode::Arrow => "arrow",
        }
    }

    fn draw(&self, surface: &mut Surface) {
        match self.points.as_slice() {
            [] => {}
            [only] => surface.stroke_polyline(&[only.pos], self.color, only.width),
            points => {
                for pair in points.windows(2) {
                    surface.stroke_polyline(&[pair[0].pos, pair[1].pos], self.color, pair[1].width);
                }
            }
        }
        self.draw_spline(surface);
    }

    fn on_mouse_move(&mut self, sample: PointerSample) {
        self.add_sample(sample);
    }

    fn on_mouse_up(&mut self) {
        if self.mode == PenMode::Arrow {
            self.append_arrowhead();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn pen(mode: PenMode) -> SmoothedPen {
        SmoothedPen::new(DrawingOptions { color: Color32::RED, size: 15.0 }, mode)
    }

    #[test]
    fn width_eases_toward_size_when_still() {
        let mut p = pen(PenMode::Line);
        p.add_sample(PointerSample::new(pos2(0.0, 0.0), 0.0));
        p.add_sample(PointerSample::new(pos2(0.0, 0.0), 16.0));
        let w = p.points[1].width;
        assert!(w > INITIAL_LINE_WIDTH && w < 15.0);
    }

    #[test]
    fn fast_motion_thins_the_line() {
        let mut slow = pen(PenMode::Line);
        let mut fast = pen(PenMode::Line);
        for i in 0..6 {
            slow.add_sample(PointerSample::new(pos2(i as f32, 0.0), i as f64 * 16.0));
            fast.add_sample(PointerSample::new(pos2(i as f32 * 80.0, 0.0), i as f64 * 16.0));
        }
        assert!(fast.points[5].width < slow.points[5].width);
        assert!(fast.points.iter().all(|p| p.width >= MIN_LINE_WIDTH));
    }

    #[test]
    fn arrow_release_appends_three_points() {
        let mut p = pen(PenMode::Arrow);
        p.add_sample(PointerSample::new(pos2(10.0, 10.0), 0.0));
        p.add_sample(PointerSample::new(pos2(110.0, 10.0), 16.0));
        p.on_mouse_up();
        assert_eq!(p.points.len(), 5);
        assert_eq!(p.points[3].pos, pos2(110.0, 10.0));
        assert!(p.points[2..].iter().all(|q| q.arrow));
        // Wings point backwards from the tip
        assert!(p.points[2].pos.x < 110.0 && p.points[4].pos.x < 110.0);
    }

    #[test]
    fn line_release_adds_nothing() {
        let mut p = pen(PenMode::Line);
        p.add_sample(PointerSample::new(pos2(10.0, 10.0), 0.0));
        p.add_sample(PointerSample::new(pos2(50.0, 10.0), 16.0));
        p.on_mouse_up();
        assert_eq!(p.points.len(), 2);
    }
}
