//! Responsive sizing for the monitor selection view.
//!
//! Given the monitor set, [`plan`] picks a dialog size and one uniform scale
//! factor so every monitor can be drawn as a proportional widget that keeps
//! its real position relative to the others. A single scale keeps aspect
//! ratios and relative offsets intact; separate x/y factors would not.
//!
//! Callers skip planning entirely when only one monitor is present.

use crate::geometry::{self, Monitor, MonitorId};

/// Margin around the widget area, in dialog pixels.
pub const WIDGET_MARGIN: f64 = 50.0;
/// Smallest readable widget size.
pub const MIN_WIDGET_WIDTH: f64 = 150.0;
pub const MIN_WIDGET_HEIGHT: f64 = 110.0;

/// Size of the dialog container, in dialog pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Base, minimum and maximum dialog size used by [`plan`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerLimits {
    pub base: Size,
    pub min: Size,
    pub max: Size,
}

impl Default for ContainerLimits {
    fn default() -> Self {
        Self {
            base: Size::new(800.0, 600.0),
            min: Size::new(800.0, 600.0),
            max: Size::new(1400.0, 1000.0),
        }
    }
}

/// Shape of the virtual desktop, from its aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrangement {
    Horizontal,
    Vertical,
    Mixed,
}

impl Arrangement {
    pub fn classify(width: i32, height: i32) -> Self {
        let ratio = if height == 0 {
            1.0
        } else {
            width as f64 / height as f64
        };
        if ratio > 2.0 {
            Arrangement::Horizontal
        } else if ratio < 0.5 {
            Arrangement::Vertical
        } else {
            Arrangement::Mixed
        }
    }
}

/// Monitor count bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    pub fn classify(count: usize) -> Self {
        match count {
            0..=2 => Complexity::Simple,
            3..=4 => Complexity::Moderate,
            _ => Complexity::Complex,
        }
    }
}

/// One monitor's scaled representation inside the dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorWidget {
    pub id: MonitorId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl MonitorWidget {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Result of [`plan`]: dialog geometry plus positioned widgets.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub arrangement: Arrangement,
    pub complexity: Complexity,
    /// Overall dialog size.
    pub dialog: Size,
    /// Area reserved for the monitor widgets.
    pub available: Size,
    /// Extent of the widget area including margins, never smaller than `available`.
    pub content: Size,
    pub scale: f64,
    pub widgets: Vec<MonitorWidget>,
}

impl LayoutPlan {
    pub fn widget_at(&self, x: f64, y: f64) -> Option<&MonitorWidget> {
        self.widgets.iter().find(|w| w.contains(x, y))
    }
}

/// Computes the dialog size, uniform scale and widget positions.
///
/// Returns `None` for an empty monitor set.
pub fn plan(monitors: &[Monitor], limits: &ContainerLimits) -> Option<LayoutPlan> {
    let bounds = geometry::bounds_of(monitors)?;
    let (total_w, total_h) = (bounds.width(), bounds.height());
    let count = monitors.len();

    let arrangement = Arrangement::classify(total_w, total_h);
    let complexity = Complexity::classify(count);
    let dialog = dialog_size(arrangement, complexity, count, limits);

    let available = Size::new(
        (dialog.width - 100.0).max(400.0),
        (dialog.height - 250.0).max(300.0),
    );
    let scale = uniform_scale(arrangement, complexity, total_w, total_h, available);

    let widgets: Vec<MonitorWidget> = monitors
        .iter()
        .map(|m| MonitorWidget {
            id: m.id.clone(),
            x: (m.x - bounds.min_x) as f64 * scale + WIDGET_MARGIN,
            y: (m.y - bounds.min_y) as f64 * scale + WIDGET_MARGIN,
            width: (m.width as f64 * scale).max(MIN_WIDGET_WIDTH),
            height: (m.height as f64 * scale).max(MIN_WIDGET_HEIGHT),
        })
        .collect();

    let right = widgets.iter().map(|w| w.x + w.width).fold(0.0, f64::max);
    let bottom = widgets.iter().map(|w| w.y + w.height).fold(0.0, f64::max);
    let content = Size::new(
        (right + WIDGET_MARGIN).max(available.width),
        (bottom + WIDGET_MARGIN).max(available.height),
    );

    Some(LayoutPlan {
        arrangement,
        complexity,
        dialog,
        available,
        content,
        scale,
        widgets,
    })
}

fn dialog_size(
    arrangement: Arrangement,
    complexity: Complexity,
    count: usize,
    limits: &ContainerLimits,
) -> Size {
    let n = count as f64;
    let base = limits.base;
    let (mut width, mut height) = match arrangement {
        Arrangement::Horizontal => ((base.width + n * 100.0).min(1200.0), base.height),
        Arrangement::Vertical => (base.width, (base.height + n * 80.0).min(900.0)),
        Arrangement::Mixed => (
            (base.width + n * 50.0).min(1000.0),
            (base.height + n * 40.0).min(800.0),
        ),
    };

    if complexity == Complexity::Complex {
        width *= 1.2;
        height *= 1.2;
    }

    Size::new(
        width.clamp(limits.min.width, limits.max.width),
        height.clamp(limits.min.height, limits.max.height),
    )
}

fn uniform_scale(
    arrangement: Arrangement,
    complexity: Complexity,
    total_w: i32,
    total_h: i32,
    available: Size,
) -> f64 {
    let sx = if total_w > 0 {
        available.width / total_w as f64
    } else {
        0.1
    };
    let sy = if total_h > 0 {
        available.height / total_h as f64
    } else {
        0.1
    };

    let scale = match arrangement {
        Arrangement::Horizontal => sx.min(sy * 1.2).min(0.25),
        Arrangement::Vertical => (sx * 1.2).min(sy).min(0.25),
        Arrangement::Mixed => sx.min(sy).min(0.2),
    };

    let floor = if complexity == Complexity::Complex {
        0.05
    } else {
        0.08
    };
    scale.max(floor)
}
