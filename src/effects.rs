//! The closed catalog of transition effects.
//!
//! Each variant carries a small typed state struct resolved once per request
//! from the raw config params. Resolution applies the documented defaults,
//! range-clamps out-of-range values with a [`RenderWarning`] instead of
//! failing, and precomputes everything seed-derived (shuffle orders, per-bar
//! speeds, shape placements) so per-frame rendering is pure and read-only.
//!
//! [`RenderWarning`]: crate::config::RenderWarning

use crate::{
    config::{Diagnostics, TransitionSpec, get_bool, get_f64, get_str, get_u64},
    error::{GlissadeError, GlissadeResult},
    frame::{CoverageMask, Frame, FrameSize, composite_masked, crossfade},
    mask_blur::MaskBlur,
    raster,
    rng::RandomSequence,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlideDir {
    LeftToRight,
    RightToLeft,
    TopToBottom,
    BottomToTop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoomMode {
    In,
    Out,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealOrder {
    Row,
    Col,
    Diag,
    InvDiag,
    Random,
}

#[derive(Clone, Debug)]
pub struct SliderState {
    pub dir: SlideDir,
}

#[derive(Clone, Debug)]
pub struct WipeState {
    pub dir: SlideDir,
}

#[derive(Clone, Debug)]
pub struct BarndoorState {
    pub orientation: Orientation,
}

#[derive(Clone, Debug)]
pub struct RadialState {
    pub cx: f64,
    pub cy: f64,
    pub max_r: f64,
}

#[derive(Clone, Debug)]
pub struct PieState {
    pub cx: f64,
    pub cy: f64,
    pub start_deg: f64,
    pub ccw: bool,
    pub max_r: f64,
}

#[derive(Clone, Debug)]
pub struct PieAdvancedState {
    pub cx: f64,
    pub cy: f64,
    pub start_deg: f64,
    pub ccw: bool,
    pub r0_frac: f64,
    pub r1_frac: f64,
    pub sweep_deg: f64,
    pub max_r: f64,
}

#[derive(Clone, Debug)]
pub struct ZoomState {
    pub mode: ZoomMode,
}

#[derive(Clone, Debug)]
pub struct CheckerboardState {
    pub rows: u32,
    pub cols: u32,
    pub stepwise: bool,
    /// Seeded reveal rank per cell, row-major. Rank k flips k-th.
    pub rank: Vec<u32>,
}

#[derive(Clone, Debug)]
pub struct MovingBarsState {
    pub axis: Axis,
    pub dir: SlideDir,
    /// Effective per-bar speeds, seeded, floored at 1.0 so every bar has
    /// finished by t = 1.
    pub speeds: Vec<f64>,
}

#[derive(Clone, Debug)]
pub struct InterleaveState {
    pub bands: u32,
}

#[derive(Clone, Debug)]
pub struct ShapeSeed {
    pub x: f64,
    pub y: f64,
    /// Reveal start time in [0, 0.6); the shape grows from here to full
    /// frame reach at t = 1.
    pub start: f64,
}

#[derive(Clone, Debug)]
pub struct RandomShapesState {
    pub circles: bool,
    pub shapes: Vec<ShapeSeed>,
}

#[derive(Clone, Debug)]
pub struct BlindsState {
    pub axis: Axis,
    pub dir: SlideDir,
    pub count: u32,
    pub wave_amplitude: f64,
    pub wave_phase: f64,
}

#[derive(Clone, Debug)]
pub struct AnimatedCheckerboardState {
    pub rows: u32,
    pub cols: u32,
    /// Reveal rank per cell, row-major, baked from the configured order.
    pub rank: Vec<u32>,
}

/// Per-request resolved effect. Deterministic given (config, frame geometry)
/// and read-only while rendering, which is what makes frame rendering safe to
/// parallelize.
#[derive(Clone, Debug)]
pub enum EffectState {
    Slider(SliderState),
    Fade,
    AppearRight,
    Wipe(WipeState),
    Barndoor(BarndoorState),
    Radial(RadialState),
    Pie(PieState),
    PieAdvanced(PieAdvancedState),
    Zoom(ZoomState),
    Blur,
    Checkerboard(CheckerboardState),
    MovingBars(MovingBarsState),
    Interleave(InterleaveState),
    RandomShapes(RandomShapesState),
    Blinds(BlindsState),
    CheckerboardAnimated(AnimatedCheckerboardState),
}

pub fn resolve_effect(
    spec: &TransitionSpec,
    size: FrameSize,
    diag: &mut Diagnostics,
) -> GlissadeResult<EffectState> {
    let kind = spec.kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(GlissadeError::config("transition type must be non-empty"));
    }
    let p = &spec.params;
    let w = size.width as f64;
    let h = size.height as f64;

    match kind.as_str() {
        "slider" => {
            let dir = parse_slide_dir(
                &get_str(p, "direction", "right-to-left")?,
                SlideDir::RightToLeft,
                diag,
            );
            Ok(EffectState::Slider(SliderState { dir }))
        }
        // Backward-compatible alias.
        "slideright" => Ok(EffectState::Slider(SliderState {
            dir: SlideDir::RightToLeft,
        })),
        "fade" => Ok(EffectState::Fade),
        "appearright" => Ok(EffectState::AppearRight),
        "wipe" => {
            let dir = parse_slide_dir(
                &get_str(p, "direction", "left-to-right")?,
                SlideDir::LeftToRight,
                diag,
            );
            Ok(EffectState::Wipe(WipeState { dir }))
        }
        "barndoor" => {
            let orientation = if get_str(p, "orientation", "horizontal")?.starts_with('v') {
                Orientation::Vertical
            } else {
                Orientation::Horizontal
            };
            Ok(EffectState::Barndoor(BarndoorState { orientation }))
        }
        "radial" => {
            let cx = get_f64(p, "center_x", w / 2.0)?;
            let cy = get_f64(p, "center_y", h / 2.0)?;
            Ok(EffectState::Radial(RadialState {
                cx,
                cy,
                max_r: max_corner_dist(cx, cy, w, h),
            }))
        }
        "pie" => {
            let cx = get_f64(p, "center_x", w / 2.0)?;
            let cy = get_f64(p, "center_y", h / 2.0)?;
            Ok(EffectState::Pie(PieState {
                cx,
                cy,
                start_deg: get_f64(p, "start_angle", -90.0)?,
                ccw: get_str(p, "direction", "ccw")?.contains("ccw"),
                max_r: max_corner_dist(cx, cy, w, h),
            }))
        }
        "pieadvanced" | "piesweep" => {
            let cx = get_f64(p, "center_x", w / 2.0)?;
            let cy = get_f64(p, "center_y", h / 2.0)?;
            let mut r0_frac = get_f64(p, "r0_frac", 0.0)?;
            let mut r1_frac = get_f64(p, "r1_frac", 1.0)?;
            if !(0.0..=1.0).contains(&r0_frac) {
                diag.warn(format!("r0_frac {r0_frac} clamped to [0, 1]"));
                r0_frac = r0_frac.clamp(0.0, 1.0);
            }
            if !(0.0..=1.0).contains(&r1_frac) {
                diag.warn(format!("r1_frac {r1_frac} clamped to [0, 1]"));
                r1_frac = r1_frac.clamp(0.0, 1.0);
            }
            if r1_frac < r0_frac {
                diag.warn("r1_frac < r0_frac, swapping");
                std::mem::swap(&mut r0_frac, &mut r1_frac);
            }
            Ok(EffectState::PieAdvanced(PieAdvancedState {
                cx,
                cy,
                start_deg: get_f64(p, "start_angle", -90.0)?,
                ccw: get_str(p, "direction", "ccw")?.contains("ccw"),
                r0_frac,
                r1_frac,
                sweep_deg: get_f64(p, "sweep_deg", 360.0)?,
                max_r: max_corner_dist(cx, cy, w, h),
            }))
        }
        "zoom" => {
            let mode = match get_str(p, "mode", "in")?.as_str() {
                "in" => ZoomMode::In,
                "out" => ZoomMode::Out,
                other => {
                    diag.warn(format!("unknown zoom mode '{other}', using 'in'"));
                    ZoomMode::In
                }
            };
            Ok(EffectState::Zoom(ZoomState { mode }))
        }
        "blur" => Ok(EffectState::Blur),
        "checkerboard" | "damier" => {
            let squares = get_u64(p, "squares", 8)?;
            let rows = grid_extent(get_u64(p, "rows", squares)?, "rows", diag);
            let cols = grid_extent(get_u64(p, "cols", squares)?, "cols", diag);
            let seed = get_u64(p, "seed", 1234)?;
            let mut rank: Vec<u32> = (0..rows * cols).collect();
            RandomSequence::new(seed).shuffle(&mut rank);
            Ok(EffectState::Checkerboard(CheckerboardState {
                rows,
                cols,
                stepwise: get_bool(p, "stepwise", true)?,
                rank,
            }))
        }
        "movingbars" | "bars" => {
            let axis = parse_axis(&get_str(p, "axis", "horizontal")?);
            let count = shape_count(get_u64(p, "count", 16)?, "count", diag);
            let direction = get_str(p, "direction", "bottom")?;
            let dir = match axis {
                Axis::Vertical => {
                    if direction.starts_with('t') {
                        SlideDir::BottomToTop
                    } else {
                        SlideDir::TopToBottom
                    }
                }
                Axis::Horizontal => {
                    if direction.starts_with('r') {
                        SlideDir::LeftToRight
                    } else {
                        SlideDir::RightToLeft
                    }
                }
            };
            let speed_min = get_f64(p, "speed_min", 0.5)?;
            let mut speed_max = get_f64(p, "speed_max", 1.5)?;
            if speed_max < speed_min {
                diag.warn(format!(
                    "speed_max {speed_max} < speed_min {speed_min}, raising to speed_min"
                ));
                speed_max = speed_min;
            }
            let seed = get_u64(p, "seed", 42)?;
            let mut rng = RandomSequence::new(seed);
            // Floor at 1.0: a slower bar would never finish its sweep.
            let speeds = (0..count)
                .map(|_| rng.next_range(speed_min, speed_max).max(1.0))
                .collect();
            Ok(EffectState::MovingBars(MovingBarsState {
                axis,
                dir,
                speeds,
            }))
        }
        "interleave" => {
            let bands = get_u64(p, "bands", 10)?;
            let bands = if bands < 2 {
                diag.warn(format!("bands {bands} raised to minimum 2"));
                2
            } else {
                bands as u32
            };
            Ok(EffectState::Interleave(InterleaveState { bands }))
        }
        "randomcircles" | "randomsquares" => {
            let count = shape_count(get_u64(p, "count", 20)?, "count", diag);
            let seed = get_u64(p, "seed", 12345)?;
            let mut rng = RandomSequence::new(seed);
            let shapes = (0..count)
                .map(|_| ShapeSeed {
                    x: rng.next_f64() * w,
                    y: rng.next_f64() * h,
                    start: rng.next_f64() * 0.6,
                })
                .collect();
            Ok(EffectState::RandomShapes(RandomShapesState {
                circles: kind == "randomcircles",
                shapes,
            }))
        }
        "blinds" => {
            let axis = parse_axis(&get_str(p, "axis", "vertical")?);
            let count = shape_count(get_u64(p, "count", 16)?, "count", diag);
            let direction = get_str(p, "direction", "left")?;
            let dir = match axis {
                Axis::Vertical => {
                    if direction.starts_with('l') {
                        SlideDir::LeftToRight
                    } else {
                        SlideDir::RightToLeft
                    }
                }
                Axis::Horizontal => {
                    if direction.starts_with('t') {
                        SlideDir::TopToBottom
                    } else {
                        SlideDir::BottomToTop
                    }
                }
            };
            let mut wave_amplitude = get_f64(p, "wave_amplitude", 0.0)?;
            if !(0.0..=0.49).contains(&wave_amplitude) {
                diag.warn(format!("wave_amplitude {wave_amplitude} clamped to [0, 0.49]"));
                wave_amplitude = wave_amplitude.clamp(0.0, 0.49);
            }
            Ok(EffectState::Blinds(BlindsState {
                axis,
                dir,
                count: count as u32,
                wave_amplitude,
                wave_phase: get_f64(p, "wave_phase", 0.0)?,
            }))
        }
        "checkerboardanimated" | "checkerboard_anim" | "checkerboard-animated" => {
            let squares = get_u64(p, "squares", 10)?;
            let rows = grid_extent(get_u64(p, "rows", squares)?, "rows", diag);
            let cols = grid_extent(get_u64(p, "cols", squares)?, "cols", diag);
            let order = match get_str(p, "order", "row")?.as_str() {
                "row" | "rows" => RevealOrder::Row,
                "col" | "column" | "columns" => RevealOrder::Col,
                "diag" | "diagonal" => RevealOrder::Diag,
                "invdiag" | "invdiagonal" => RevealOrder::InvDiag,
                "random" => RevealOrder::Random,
                other => {
                    diag.warn(format!("unknown reveal order '{other}', using 'row'"));
                    RevealOrder::Row
                }
            };
            let seed = get_u64(p, "seed", 1234)?;
            Ok(EffectState::CheckerboardAnimated(
                AnimatedCheckerboardState {
                    rows,
                    cols,
                    rank: build_reveal_rank(rows, cols, order, seed),
                },
            ))
        }
        _ => Err(GlissadeError::config(format!(
            "unknown transition type '{}'",
            spec.kind
        ))),
    }
}

/// Every transition type string the resolver accepts, aliases included.
pub fn known_kinds() -> &'static [&'static str] {
    &[
        "slider",
        "slideright",
        "fade",
        "appearright",
        "wipe",
        "barndoor",
        "radial",
        "pie",
        "pieadvanced",
        "piesweep",
        "zoom",
        "blur",
        "checkerboard",
        "damier",
        "movingbars",
        "bars",
        "interleave",
        "randomcircles",
        "randomsquares",
        "blinds",
        "checkerboardanimated",
        "checkerboard_anim",
        "checkerboard-animated",
    ]
}

impl EffectState {
    /// Slider, zoom and blur rasterize the output frame directly; everything
    /// else goes through a coverage mask (and the mask-blur post-process).
    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Slider(_) | Self::Zoom(_) | Self::Blur)
    }

    pub fn render(&self, t: f64, a: &Frame, b: &Frame, mask_blur: &MaskBlur) -> Frame {
        match self {
            Self::Slider(s) => slide_composite(s.dir, t, a, b),
            Self::Zoom(s) => zoom_composite(s.mode, t, a, b),
            Self::Blur => blur_composite(t, a, b),
            _ => {
                let mut mask = CoverageMask::new(a.width, a.height);
                self.fill_mask(t, &mut mask);
                mask_blur.apply(&mut mask, t);
                composite_masked(a, b, &mask)
            }
        }
    }

    /// Coverage toward B at progress `t` for the mask-based variants. Direct
    /// variants leave the mask untouched.
    pub fn fill_mask(&self, t: f64, mask: &mut CoverageMask) {
        let w = mask.width as f64;
        let h = mask.height as f64;
        match self {
            Self::Slider(_) | Self::Zoom(_) | Self::Blur => {}
            Self::Fade => mask.fill(t as f32),
            Self::AppearRight => raster::fill_rect(mask, w - t * w, 0.0, w, h),
            Self::Wipe(s) => match s.dir {
                SlideDir::LeftToRight => raster::fill_rect(mask, 0.0, 0.0, t * w, h),
                SlideDir::RightToLeft => raster::fill_rect(mask, w - t * w, 0.0, w, h),
                SlideDir::TopToBottom => raster::fill_rect(mask, 0.0, 0.0, w, t * h),
                SlideDir::BottomToTop => raster::fill_rect(mask, 0.0, h - t * h, w, h),
            },
            Self::Barndoor(s) => match s.orientation {
                Orientation::Horizontal => {
                    let half = 0.5 * t * w;
                    raster::fill_rect(mask, w / 2.0 - half, 0.0, w / 2.0 + half, h);
                }
                Orientation::Vertical => {
                    let half = 0.5 * t * h;
                    raster::fill_rect(mask, 0.0, h / 2.0 - half, w, h / 2.0 + half);
                }
            },
            Self::Radial(s) => raster::fill_circle(mask, s.cx, s.cy, t * s.max_r),
            Self::Pie(s) => {
                let sweep = 360.0 * t * if s.ccw { 1.0 } else { -1.0 };
                raster::fill_sector(mask, s.cx, s.cy, s.max_r, s.start_deg, sweep);
            }
            Self::PieAdvanced(s) => {
                let r = (s.r0_frac + (s.r1_frac - s.r0_frac) * t) * s.max_r;
                let sweep = s.sweep_deg * t * if s.ccw { 1.0 } else { -1.0 };
                raster::fill_sector(mask, s.cx, s.cy, r, s.start_deg, sweep);
            }
            Self::Checkerboard(s) => {
                if s.stepwise {
                    fill_ranked_cells(mask, s.rows, s.cols, &s.rank, t);
                } else if t >= 0.5 {
                    mask.fill(1.0);
                }
            }
            Self::CheckerboardAnimated(s) => fill_ranked_cells(mask, s.rows, s.cols, &s.rank, t),
            Self::MovingBars(s) => {
                let count = s.speeds.len() as u32;
                for (i, speed) in s.speeds.iter().enumerate() {
                    let tt = (t * speed).clamp(0.0, 1.0);
                    match s.axis {
                        Axis::Vertical => {
                            let (x0, x1) = tile_span(mask.width, i as u32, count);
                            match s.dir {
                                SlideDir::BottomToTop => {
                                    raster::fill_rect(mask, x0, h - tt * h, x1, h);
                                }
                                _ => raster::fill_rect(mask, x0, 0.0, x1, tt * h),
                            }
                        }
                        Axis::Horizontal => {
                            let (y0, y1) = tile_span(mask.height, i as u32, count);
                            match s.dir {
                                SlideDir::LeftToRight => {
                                    raster::fill_rect(mask, 0.0, y0, tt * w, y1);
                                }
                                _ => raster::fill_rect(mask, w - tt * w, y0, w, y1),
                            }
                        }
                    }
                }
            }
            Self::Interleave(s) => {
                let tt = t.clamp(0.0, 1.0);
                for i in 0..s.bands {
                    let (x0, x1) = tile_span(mask.width, i, s.bands);
                    let extent = (x1 - x0) * tt;
                    if i % 2 == 0 {
                        raster::fill_rect(mask, x0, 0.0, x0 + extent, h);
                    } else {
                        raster::fill_rect(mask, x1 - extent, 0.0, x1, h);
                    }
                }
            }
            Self::RandomShapes(s) => {
                let reach = (w * w + h * h).sqrt() + 1.0;
                for shape in &s.shapes {
                    let local = ((t - shape.start) / (1.0 - shape.start)).clamp(0.0, 1.0);
                    if local <= 0.0 {
                        continue;
                    }
                    if s.circles {
                        raster::fill_circle(mask, shape.x, shape.y, local * reach);
                    } else {
                        raster::fill_square(mask, shape.x, shape.y, local * reach);
                    }
                }
            }
            Self::Blinds(s) => {
                let amp = s.wave_amplitude;
                let count = s.count as f64;
                for i in 0..s.count {
                    let local = if amp > 0.0 {
                        let phase = s.wave_phase + std::f64::consts::TAU * i as f64 / count;
                        let offset = amp * phase.sin();
                        // Renormalized so every slat reaches 1.0 at t = 1
                        // regardless of its wave offset.
                        (t - amp + offset) / (1.0 - 2.0 * amp)
                    } else {
                        t
                    }
                    .clamp(0.0, 1.0);
                    match s.axis {
                        Axis::Vertical => {
                            let (x0, x1) = tile_span(mask.width, i, s.count);
                            let extent = (x1 - x0) * local;
                            match s.dir {
                                SlideDir::LeftToRight => {
                                    raster::fill_rect(mask, x0, 0.0, x0 + extent, h);
                                }
                                _ => raster::fill_rect(mask, x1 - extent, 0.0, x1, h),
                            }
                        }
                        Axis::Horizontal => {
                            let (y0, y1) = tile_span(mask.height, i, s.count);
                            let extent = (y1 - y0) * local;
                            match s.dir {
                                SlideDir::TopToBottom => {
                                    raster::fill_rect(mask, 0.0, y0, w, y0 + extent);
                                }
                                _ => raster::fill_rect(mask, 0.0, y1 - extent, w, y1),
                            }
                        }
                    }
                }
            }
        }
    }
}

fn parse_slide_dir(s: &str, default: SlideDir, diag: &mut Diagnostics) -> SlideDir {
    match s {
        "left-to-right" | "ltr" | "left" => SlideDir::LeftToRight,
        "right-to-left" | "rtl" | "right" => SlideDir::RightToLeft,
        "top-to-bottom" | "ttb" | "top" => SlideDir::TopToBottom,
        "bottom-to-top" | "btt" | "bottom" => SlideDir::BottomToTop,
        other => {
            diag.warn(format!("unknown direction '{other}', using default"));
            default
        }
    }
}

fn parse_axis(s: &str) -> Axis {
    if s.starts_with('v') {
        Axis::Vertical
    } else {
        Axis::Horizontal
    }
}

/// Largest accepted grid extent per axis. Finer than one cell per pixel on
/// any realistic frame, and keeps the cell count comfortably inside u32.
const MAX_GRID_EXTENT: u32 = 1024;

fn grid_extent(value: u64, key: &str, diag: &mut Diagnostics) -> u32 {
    if value < 2 {
        diag.warn(format!("{key} {value} raised to minimum 2"));
        2
    } else if value > MAX_GRID_EXTENT as u64 {
        diag.warn(format!("{key} {value} lowered to maximum {MAX_GRID_EXTENT}"));
        MAX_GRID_EXTENT
    } else {
        value as u32
    }
}

fn shape_count(value: u64, key: &str, diag: &mut Diagnostics) -> usize {
    if value < 1 {
        diag.warn(format!("{key} {value} raised to minimum 1"));
        1
    } else {
        value as usize
    }
}

fn max_corner_dist(cx: f64, cy: f64, w: f64, h: f64) -> f64 {
    [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)]
        .into_iter()
        .map(|(x, y)| ((x - cx).powi(2) + (y - cy).powi(2)).sqrt())
        .fold(0.0, f64::max)
}

/// Cells with reveal rank below `floor(t * n)` are flipped to B; exactly one
/// more cell flips per 1/n of progress, and all n are flipped at t = 1.
///
/// Cell edges snap to whole pixels so that abutting cells tile the frame
/// without seams (the mask accumulates with max, not sum).
fn fill_ranked_cells(mask: &mut CoverageMask, rows: u32, cols: u32, rank: &[u32], t: f64) {
    let n = (rows * cols) as f64;
    let revealed = (t * n).floor().clamp(0.0, n) as u32;
    if revealed == 0 {
        return;
    }
    for r in 0..rows {
        for c in 0..cols {
            if rank[(r * cols + c) as usize] < revealed {
                let (x0, x1) = tile_span(mask.width, c, cols);
                let (y0, y1) = tile_span(mask.height, r, rows);
                raster::fill_rect(mask, x0, y0, x1, y1);
            }
        }
    }
}

/// Pixel-snapped bounds of tile `i` of `count` along an axis of `extent`
/// pixels. Tiles partition the axis exactly.
fn tile_span(extent: u32, i: u32, count: u32) -> (f64, f64) {
    let lo = extent as u64 * i as u64 / count as u64;
    let hi = extent as u64 * (i as u64 + 1) / count as u64;
    (lo as f64, hi as f64)
}

fn build_reveal_rank(rows: u32, cols: u32, order: RevealOrder, seed: u64) -> Vec<u32> {
    let n = (rows * cols) as usize;
    let mut rank = vec![0u32; n];
    match order {
        RevealOrder::Row => {
            for (i, slot) in rank.iter_mut().enumerate() {
                *slot = i as u32;
            }
        }
        RevealOrder::Col => {
            for r in 0..rows {
                for c in 0..cols {
                    rank[(r * cols + c) as usize] = c * rows + r;
                }
            }
        }
        RevealOrder::Diag => {
            let mut next = 0u32;
            for s in 0..(rows + cols - 1) {
                for r in 0..rows {
                    let c = s as i64 - r as i64;
                    if (0..cols as i64).contains(&c) {
                        rank[(r * cols + c as u32) as usize] = next;
                        next += 1;
                    }
                }
            }
        }
        RevealOrder::InvDiag => {
            let mut next = 0u32;
            for s in 0..(rows + cols - 1) {
                for r in 0..rows {
                    let c = s as i64 - r as i64;
                    if (0..cols as i64).contains(&c) {
                        let rr = rows - 1 - r;
                        let cc = cols - 1 - c as u32;
                        rank[(rr * cols + cc) as usize] = next;
                        next += 1;
                    }
                }
            }
        }
        RevealOrder::Random => {
            for (i, slot) in rank.iter_mut().enumerate() {
                *slot = i as u32;
            }
            RandomSequence::new(seed).shuffle(&mut rank);
        }
    }
    rank
}

/// Frame B translated into view along the slide direction; pixels not yet
/// covered by B's current offset still show A. Overshooting easings push the
/// offset past rest, which is exactly the bounce look.
fn slide_composite(dir: SlideDir, t: f64, a: &Frame, b: &Frame) -> Frame {
    let w = a.width as i64;
    let h = a.height as i64;
    let (dx, dy) = match dir {
        SlideDir::RightToLeft => (((1.0 - t) * w as f64).round() as i64, 0),
        SlideDir::LeftToRight => (((t - 1.0) * w as f64).round() as i64, 0),
        SlideDir::BottomToTop => (0, ((1.0 - t) * h as f64).round() as i64),
        SlideDir::TopToBottom => (0, ((t - 1.0) * h as f64).round() as i64),
    };

    let mut out = a.clone();
    let x_start = dx.max(0);
    let x_end = (dx + w).min(w);
    if x_start >= x_end {
        return out;
    }
    for y in 0..h {
        let sy = y - dy;
        if !(0..h).contains(&sy) {
            continue;
        }
        let dst_row = ((y * w + x_start) as usize) * 4;
        let src_row = ((sy * w + (x_start - dx)) as usize) * 4;
        let len = ((x_end - x_start) as usize) * 4;
        out.data[dst_row..dst_row + len].copy_from_slice(&b.data[src_row..src_row + len]);
    }
    out
}

fn zoom_composite(mode: ZoomMode, t: f64, a: &Frame, b: &Frame) -> Frame {
    let scale = match mode {
        ZoomMode::In => 0.5 + 0.5 * t,
        ZoomMode::Out => 1.5 - 0.5 * t,
    };
    let zoomed = raster::scale_about_center(b, scale);
    crossfade(a, &zoomed, t)
}

/// Cross-blur: A blurs in while B sharpens, faded at alpha t. Kernel sizes
/// follow the `floor(progress * 15) * 8 + 1` ramp (always odd).
fn blur_composite(t: f64, a: &Frame, b: &Frame) -> Frame {
    let tc = t.clamp(0.0, 1.0);
    let k_a = (tc * 15.0).floor() as usize * 8 + 1;
    let k_b = ((1.0 - tc) * 15.0).floor() as usize * 8 + 1;
    let blurred_a = raster::blur_frame(a, k_a, 0.0);
    let blurred_b = raster::blur_frame(b, k_b, 0.0);
    crossfade(&blurred_a, &blurred_b, t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransitionSpec;
    use serde_json::json;

    fn resolve_at(kind: &str, params: serde_json::Value, size: FrameSize) -> EffectState {
        let mut spec = TransitionSpec::new(kind);
        if let serde_json::Value::Object(map) = params {
            spec.params = map;
        }
        let mut diag = Diagnostics::new();
        resolve_effect(&spec, size, &mut diag).unwrap()
    }

    fn resolve(kind: &str, params: serde_json::Value) -> EffectState {
        resolve_at(kind, params, FrameSize::new(64, 48))
    }

    fn mask_for(state: &EffectState, t: f64, w: u32, h: u32) -> CoverageMask {
        let mut mask = CoverageMask::new(w, h);
        state.fill_mask(t, &mut mask);
        mask
    }

    fn assert_uniform(mask: &CoverageMask, value: f32) {
        for &v in &mask.data {
            assert!((v - value).abs() < 1e-6, "expected {value}, got {v}");
        }
    }

    #[test]
    fn unknown_kind_is_a_config_error() {
        let spec = TransitionSpec::new("teleport");
        let mut diag = Diagnostics::new();
        let err = resolve_effect(&spec, FrameSize::new(8, 8), &mut diag).unwrap_err();
        assert!(err.to_string().contains("unknown transition type"));
    }

    #[test]
    fn all_known_kinds_resolve() {
        for kind in known_kinds() {
            let spec = TransitionSpec::new(*kind);
            let mut diag = Diagnostics::new();
            resolve_effect(&spec, FrameSize::new(32, 24), &mut diag)
                .unwrap_or_else(|e| panic!("{kind}: {e}"));
        }
    }

    #[test]
    fn fade_mask_is_uniform_progress() {
        let state = resolve("fade", json!({}));
        assert_uniform(&mask_for(&state, 0.37, 8, 6), 0.37);
    }

    #[test]
    fn wipe_endpoints_are_empty_and_full() {
        let state = resolve("wipe", json!({ "direction": "ttb" }));
        assert_uniform(&mask_for(&state, 0.0, 8, 8), 0.0);
        assert_uniform(&mask_for(&state, 1.0, 8, 8), 1.0);
    }

    #[test]
    fn wipe_half_covers_left_half() {
        let state = resolve("wipe", json!({}));
        let mask = mask_for(&state, 0.5, 8, 4);
        assert_eq!(mask.at(1, 1), 1.0);
        assert_eq!(mask.at(6, 1), 0.0);
    }

    #[test]
    fn barndoor_opens_from_the_center() {
        let state = resolve("barndoor", json!({}));
        let mask = mask_for(&state, 0.5, 16, 8);
        assert_eq!(mask.at(8, 4), 1.0);
        assert_eq!(mask.at(0, 4), 0.0);
        assert_eq!(mask.at(15, 4), 0.0);
    }

    #[test]
    fn radial_defaults_center_and_completes() {
        let state = resolve("radial", json!({}));
        let mask = mask_for(&state, 0.2, 64, 48);
        assert!(mask.at(32, 24) > 0.99);
        assert_eq!(mask.at(0, 0), 0.0);
        assert_uniform(&mask_for(&state, 1.0, 64, 48), 1.0);
    }

    #[test]
    fn pie_full_sweep_is_full_coverage() {
        let state = resolve("pie", json!({}));
        assert_uniform(&mask_for(&state, 1.0, 32, 32), 1.0);
    }

    #[test]
    fn pie_half_sweep_leaves_half_uncovered() {
        // Resolve at the same geometry the mask is rasterized at, so the
        // baked center and radius line up with the 33x33 grid.
        // Start at -90 (straight up), ccw sweep of 180 covers one side.
        let state = resolve_at("pie", json!({}), FrameSize::new(33, 33));
        let mask = mask_for(&state, 0.5, 33, 33);
        let covered: usize = mask.data.iter().filter(|&&v| v > 0.5).count();
        let total = mask.data.len();
        assert!(covered > total / 3 && covered < 2 * total / 3, "{covered}/{total}");
    }

    #[test]
    fn pieadvanced_limits_sweep() {
        let state = resolve_at(
            "pieadvanced",
            json!({ "sweep_deg": 90.0 }),
            FrameSize::new(33, 33),
        );
        let mask = mask_for(&state, 1.0, 33, 33);
        let covered: usize = mask.data.iter().filter(|&&v| v > 0.5).count();
        assert!(covered < mask.data.len() / 2, "{covered}");
    }

    #[test]
    fn checkerboard_stepwise_reveals_one_cell_per_step() {
        let state = resolve(
            "checkerboard",
            json!({ "rows": 2, "cols": 2, "stepwise": true, "seed": 1234 }),
        );
        let EffectState::Checkerboard(cb) = &state else {
            panic!("wrong variant");
        };
        let mut sorted = cb.rank.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2, 3]);

        let mut previous = 0usize;
        for step in 0..=4u32 {
            let mask = mask_for(&state, step as f64 / 4.0, 8, 8);
            let covered = mask.data.iter().filter(|&&v| v >= 1.0).count();
            assert_eq!(covered, (mask.data.len() / 4) * step as usize);
            assert!(covered >= previous);
            previous = covered;
        }
    }

    #[test]
    fn oversized_grid_is_clamped_with_warnings() {
        let mut spec = TransitionSpec::new("checkerboard");
        spec.params = json!({ "rows": 70000, "cols": 70000 })
            .as_object()
            .cloned()
            .unwrap();
        let mut diag = Diagnostics::new();
        let state = resolve_effect(&spec, FrameSize::new(32, 24), &mut diag).unwrap();
        let EffectState::Checkerboard(cb) = &state else {
            panic!("wrong variant");
        };
        assert_eq!((cb.rows, cb.cols), (MAX_GRID_EXTENT, MAX_GRID_EXTENT));
        assert_eq!(cb.rank.len(), (MAX_GRID_EXTENT * MAX_GRID_EXTENT) as usize);
        assert_eq!(diag.warnings().len(), 2);
    }

    #[test]
    fn checkerboard_plain_flips_at_half() {
        let state = resolve("checkerboard", json!({ "stepwise": false }));
        assert_uniform(&mask_for(&state, 0.49, 8, 8), 0.0);
        assert_uniform(&mask_for(&state, 0.5, 8, 8), 1.0);
    }

    #[test]
    fn movingbars_speeds_are_seeded_and_floored() {
        let state = resolve("movingbars", json!({ "count": 8, "seed": 42 }));
        let EffectState::MovingBars(mb) = &state else {
            panic!("wrong variant");
        };
        assert_eq!(mb.speeds.len(), 8);
        for &s in &mb.speeds {
            assert!((1.0..=1.5).contains(&s));
        }

        let again = resolve("movingbars", json!({ "count": 8, "seed": 42 }));
        let EffectState::MovingBars(mb2) = &again else {
            panic!("wrong variant");
        };
        assert_eq!(mb.speeds, mb2.speeds);
    }

    #[test]
    fn movingbars_completes() {
        let state = resolve("movingbars", json!({}));
        assert_uniform(&mask_for(&state, 1.0, 32, 32), 1.0);
        assert_uniform(&mask_for(&state, 0.0, 32, 32), 0.0);
    }

    #[test]
    fn interleave_alternates_edges() {
        let state = resolve("interleave", json!({ "bands": 2 }));
        let mask = mask_for(&state, 0.5, 16, 4);
        // Band 0 reveals from its left edge, band 1 from its right edge.
        assert_eq!(mask.at(0, 0), 1.0);
        assert_eq!(mask.at(6, 0), 0.0);
        assert_eq!(mask.at(9, 0), 0.0);
        assert_eq!(mask.at(15, 0), 1.0);
    }

    #[test]
    fn random_shapes_are_empty_then_full() {
        for kind in ["randomcircles", "randomsquares"] {
            let state = resolve(kind, json!({}));
            assert_uniform(&mask_for(&state, 0.0, 24, 18), 0.0);
            assert_uniform(&mask_for(&state, 1.0, 24, 18), 1.0);
        }
    }

    #[test]
    fn random_shapes_grow_monotonically() {
        let state = resolve("randomcircles", json!({ "count": 5, "seed": 12345 }));
        let mut last = 0.0f64;
        for i in 0..=10 {
            let mask = mask_for(&state, i as f64 / 10.0, 32, 24);
            let total: f64 = mask.data.iter().map(|&v| v as f64).sum();
            assert!(total >= last);
            last = total;
        }
    }

    #[test]
    fn blinds_with_wave_still_completes() {
        let state = resolve(
            "blinds",
            json!({ "count": 6, "wave_amplitude": 0.3, "wave_phase": 1.0 }),
        );
        assert_uniform(&mask_for(&state, 0.0, 30, 20), 0.0);
        assert_uniform(&mask_for(&state, 1.0, 30, 20), 1.0);
    }

    #[test]
    fn blinds_wave_staggers_slats() {
        let state = resolve("blinds", json!({ "count": 4, "wave_amplitude": 0.3 }));
        let mask = mask_for(&state, 0.5, 40, 10);
        let slat_cov = |i: u32| {
            let x0 = i * 10;
            (0..10).map(|dx| mask.at(x0 + dx, 5) as f64).sum::<f64>()
        };
        let covs: Vec<f64> = (0..4).map(slat_cov).collect();
        assert!(covs.iter().any(|&c| (c - covs[0]).abs() > 0.5), "{covs:?}");
    }

    #[test]
    fn animated_checkerboard_orders_differ() {
        let row = resolve("checkerboardanimated", json!({ "rows": 2, "cols": 2 }));
        let col = resolve(
            "checkerboardanimated",
            json!({ "rows": 2, "cols": 2, "order": "col" }),
        );
        let (EffectState::CheckerboardAnimated(r), EffectState::CheckerboardAnimated(c)) =
            (&row, &col)
        else {
            panic!("wrong variant");
        };
        assert_eq!(r.rank, vec![0, 1, 2, 3]);
        assert_eq!(c.rank, vec![0, 2, 1, 3]);
    }

    #[test]
    fn animated_checkerboard_diag_order() {
        let state = resolve(
            "checkerboardanimated",
            json!({ "rows": 2, "cols": 3, "order": "diag" }),
        );
        let EffectState::CheckerboardAnimated(s) = &state else {
            panic!("wrong variant");
        };
        // Anti-diagonals: (0,0); (0,1),(1,0); (0,2),(1,1); (1,2).
        assert_eq!(s.rank, vec![0, 1, 3, 2, 4, 5]);
    }

    #[test]
    fn animated_checkerboard_random_is_reproducible() {
        let a = resolve("checkerboardanimated", json!({ "order": "random", "seed": 9 }));
        let b = resolve("checkerboardanimated", json!({ "order": "random", "seed": 9 }));
        let (EffectState::CheckerboardAnimated(sa), EffectState::CheckerboardAnimated(sb)) =
            (&a, &b)
        else {
            panic!("wrong variant");
        };
        assert_eq!(sa.rank, sb.rank);
    }

    #[test]
    fn slider_endpoints() {
        let a = Frame::filled(8, 4, [10, 10, 10, 255]);
        let b = Frame::filled(8, 4, [200, 200, 200, 255]);
        let state = resolve("slider", json!({}));
        let blur = MaskBlur::disabled();
        assert_eq!(state.render(0.0, &a, &b, &blur), a);
        assert_eq!(state.render(1.0, &a, &b, &blur), b);
    }

    #[test]
    fn slider_halfway_shows_both() {
        let a = Frame::filled(8, 4, [10, 10, 10, 255]);
        let b = Frame::filled(8, 4, [200, 200, 200, 255]);
        let state = resolve("slider", json!({}));
        let out = state.render(0.5, &a, &b, &MaskBlur::disabled());
        assert_eq!(out.pixel(0, 0), [10, 10, 10, 255]);
        assert_eq!(out.pixel(7, 0), [200, 200, 200, 255]);
    }

    #[test]
    fn zoom_endpoints() {
        let a = Frame::filled(6, 6, [0, 0, 0, 255]);
        let b = Frame::filled(6, 6, [255, 0, 0, 255]);
        let state = resolve("zoom", json!({ "mode": "out" }));
        let blur = MaskBlur::disabled();
        assert_eq!(state.render(0.0, &a, &b, &blur), a);
        assert_eq!(state.render(1.0, &a, &b, &blur), b);
    }

    #[test]
    fn blur_endpoints() {
        let a = Frame::filled(5, 5, [40, 80, 120, 255]);
        let b = Frame::filled(5, 5, [200, 160, 120, 255]);
        let state = resolve("blur", json!({}));
        let blur = MaskBlur::disabled();
        assert_eq!(state.render(0.0, &a, &b, &blur), a);
        assert_eq!(state.render(1.0, &a, &b, &blur), b);
    }
}
