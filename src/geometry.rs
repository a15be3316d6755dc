//! Monitor topology and coordinate transforms.
//!
//! Every monitor is a rectangle in one shared *global* (virtual desktop) space,
//! measured in logical units. Origins may be negative when a monitor sits to the
//! left of or above the primary one. Shapes are stored in *monitor-local*
//! coordinates, so converting between the two spaces is a pure translation by
//! the monitor origin and is exactly invertible.
//!
//! Device pixel ratio and DPI are carried on [`Monitor`] but never applied here;
//! consumers that care about physical pixels (magnifier sampling, the monitor
//! selection view) read them explicitly.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Logical DPI of a monitor at a device pixel ratio of 1.0.
pub const BASE_DPI: f64 = 96.0;

/// A point with integer coordinates, either global or monitor-local depending
/// on context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Rounds a fractional surface position to the nearest pixel.
    pub fn from_f64(x: f64, y: f64) -> Self {
        Self {
            x: x.round() as i32,
            y: y.round() as i32,
        }
    }
}

/// Stable identity of a monitor, derived from connector name, make and model.
///
/// Shapes carry the id of the monitor they were drawn on. If the monitor is
/// unplugged and later returns with the same id, its shapes render again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonitorId(pub String);

impl MonitorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable snapshot of one monitor at enumeration time.
#[derive(Debug, Clone, PartialEq)]
pub struct Monitor {
    pub id: MonitorId,
    /// Human-readable name (connector name or make/model description).
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Logical to physical pixel scale, never below 1.0.
    pub scale: f64,
    /// Physical panel size in millimetres, when the compositor reports one.
    pub physical_size_mm: Option<(i32, i32)>,
    /// Refresh rate in Hz (0.0 when unknown).
    pub refresh_hz: f64,
    pub primary: bool,
}

impl Monitor {
    /// Creates a monitor with scale 1.0 and no physical size information.
    pub fn new(id: impl Into<String>, x: i32, y: i32, width: i32, height: i32) -> Self {
        let id = MonitorId::new(id);
        Self {
            name: id.0.clone(),
            id,
            x,
            y,
            width,
            height,
            scale: 1.0,
            physical_size_mm: None,
            refresh_hz: 0.0,
            primary: false,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns true if the global point lies on this monitor.
    pub fn contains(&self, global: Point) -> bool {
        global.x >= self.x
            && global.x < self.x + self.width
            && global.y >= self.y
            && global.y < self.y + self.height
    }

    pub fn device_pixel_ratio(&self) -> f64 {
        self.scale.max(1.0)
    }

    pub fn logical_dpi(&self) -> f64 {
        BASE_DPI * self.device_pixel_ratio()
    }

    /// Physical DPI computed from the reported panel width, if any.
    pub fn physical_dpi(&self) -> Option<f64> {
        let (width_mm, _) = self.physical_size_mm?;
        if width_mm <= 0 {
            return None;
        }
        let physical_px = self.width as f64 * self.device_pixel_ratio();
        Some(physical_px / (width_mm as f64 / 25.4))
    }
}

/// Smallest rectangle enclosing every monitor, in global coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualDesktopBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl VirtualDesktopBounds {
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }
}

/// Computes the virtual desktop bounds. Returns `None` when no monitor with a
/// positive size is present.
pub fn bounds_of(monitors: &[Monitor]) -> Option<VirtualDesktopBounds> {
    monitors
        .iter()
        .filter(|m| m.width > 0 && m.height > 0)
        .fold(None, |acc: Option<VirtualDesktopBounds>, m| {
            let (right, bottom) = (m.x + m.width, m.y + m.height);
            Some(match acc {
                None => VirtualDesktopBounds {
                    min_x: m.x,
                    min_y: m.y,
                    max_x: right,
                    max_y: bottom,
                },
                Some(b) => VirtualDesktopBounds {
                    min_x: b.min_x.min(m.x),
                    min_y: b.min_y.min(m.y),
                    max_x: b.max_x.max(right),
                    max_y: b.max_y.max(bottom),
                },
            })
        })
}

/// Converts a global point to coordinates relative to `monitor`'s origin.
pub fn to_monitor_local(global: Point, monitor: &Monitor) -> Point {
    Point::new(global.x.wrapping_sub(monitor.x), global.y.wrapping_sub(monitor.y))
}

/// Converts a monitor-local point back to global coordinates.
pub fn to_global(local: Point, monitor: &Monitor) -> Point {
    Point::new(local.x.wrapping_add(monitor.x), local.y.wrapping_add(monitor.y))
}

/// Finds the monitor containing the global point.
pub fn monitor_at(monitors: &[Monitor], global: Point) -> Option<&Monitor> {
    monitors.iter().find(|m| m.contains(global))
}

pub fn find_monitor<'a>(monitors: &'a [Monitor], id: &MonitorId) -> Option<&'a Monitor> {
    monitors.iter().find(|m| &m.id == id)
}

/// Orders monitors left-to-right, top-to-bottom and marks exactly one as
/// primary: the monitor containing the global origin, or the first one.
pub fn normalize(monitors: &mut Vec<Monitor>) {
    monitors.sort_by(|a, b| (a.x, a.y, &a.id).cmp(&(b.x, b.y, &b.id)));

    let origin = Point::new(0, 0);
    let primary_index = monitors
        .iter()
        .position(|m| m.contains(origin))
        .unwrap_or(0);
    for (index, monitor) in monitors.iter_mut().enumerate() {
        monitor.primary = index == primary_index;
    }
}

/// Difference between two enumerations of the monitor set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologyChange {
    /// Ids present only in the new enumeration.
    pub added: Vec<MonitorId>,
    /// Ids present only in the old enumeration.
    pub removed: Vec<MonitorId>,
    /// Ids present in both whose geometry or scale differs.
    pub changed: Vec<MonitorId>,
}

impl TopologyChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Compares two monitor snapshots by id.
pub fn diff_topology(old: &[Monitor], new: &[Monitor]) -> TopologyChange {
    let old_ids: HashSet<&MonitorId> = old.iter().map(|m| &m.id).collect();
    let new_ids: HashSet<&MonitorId> = new.iter().map(|m| &m.id).collect();

    let added = new
        .iter()
        .filter(|m| !old_ids.contains(&m.id))
        .map(|m| m.id.clone())
        .collect();
    let removed = old
        .iter()
        .filter(|m| !new_ids.contains(&m.id))
        .map(|m| m.id.clone())
        .collect();
    let changed = new
        .iter()
        .filter_map(|m| {
            let before = find_monitor(old, &m.id)?;
            let moved = (before.x, before.y, before.width, before.height)
                != (m.x, m.y, m.width, m.height);
            (moved || before.scale != m.scale).then(|| m.id.clone())
        })
        .collect();

    TopologyChange {
        added,
        removed,
        changed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_monitors() -> Vec<Monitor> {
        vec![
            Monitor::new("DP-1", -1920, 0, 1920, 1080),
            Monitor::new("DP-2", 0, 0, 2560, 1440),
            Monitor::new("HDMI-A-1", 2560, -200, 1080, 1920),
        ]
    }

    #[test]
    fn bounds_cover_negative_origins() {
        let bounds = bounds_of(&three_monitors()).unwrap();
        assert_eq!(bounds.min_x, -1920);
        assert_eq!(bounds.min_y, -200);
        assert_eq!(bounds.max_x, 3640);
        assert_eq!(bounds.max_y, 1720);
        assert!(bounds.max_x > bounds.min_x && bounds.max_y > bounds.min_y);
    }

    #[test]
    fn bounds_of_empty_set_is_none() {
        assert!(bounds_of(&[]).is_none());
        assert!(bounds_of(&[Monitor::new("ghost", 0, 0, 0, 0)]).is_none());
    }

    #[test]
    fn local_global_round_trip_is_exact() {
        let monitors = three_monitors();
        let samples = [
            Point::new(0, 0),
            Point::new(-1920, 0),
            Point::new(-1, -1),
            Point::new(5000, -7000),
            Point::new(i32::MAX / 4, i32::MIN / 4),
        ];
        for monitor in &monitors {
            for &p in &samples {
                assert_eq!(to_global(to_monitor_local(p, monitor), monitor), p);
                assert_eq!(to_monitor_local(to_global(p, monitor), monitor), p);
            }
        }
    }

    #[test]
    fn round_trip_survives_i32_extremes() {
        let monitor = Monitor::new("DP-9", -1920, 1080, 1920, 1080);
        for p in [
            Point::new(i32::MIN, i32::MIN),
            Point::new(i32::MAX, i32::MAX),
            Point::new(i32::MIN, i32::MAX),
        ] {
            assert_eq!(to_global(to_monitor_local(p, &monitor), &monitor), p);
            assert_eq!(to_monitor_local(to_global(p, &monitor), &monitor), p);
        }
    }

    #[test]
    fn monitor_at_resolves_edges() {
        let monitors = three_monitors();
        assert_eq!(
            monitor_at(&monitors, Point::new(-1, 500)).unwrap().id.as_str(),
            "DP-1"
        );
        assert_eq!(
            monitor_at(&monitors, Point::new(0, 0)).unwrap().id.as_str(),
            "DP-2"
        );
        assert!(monitor_at(&monitors, Point::new(0, 1500)).is_none());
    }

    #[test]
    fn normalize_marks_origin_monitor_primary() {
        let mut monitors = three_monitors();
        monitors.reverse();
        normalize(&mut monitors);
        assert_eq!(monitors[0].id.as_str(), "DP-1");
        let primaries: Vec<_> = monitors.iter().filter(|m| m.primary).collect();
        assert_eq!(primaries.len(), 1);
        assert_eq!(primaries[0].id.as_str(), "DP-2");
    }

    #[test]
    fn normalize_falls_back_to_first_monitor() {
        let mut monitors = vec![
            Monitor::new("B", 3000, 0, 800, 600),
            Monitor::new("A", 2000, 0, 800, 600),
        ];
        normalize(&mut monitors);
        assert!(monitors[0].primary);
        assert_eq!(monitors[0].id.as_str(), "A");
    }

    #[test]
    fn dpi_is_exposed_not_applied() {
        let mut monitor = Monitor::new("eDP-1", 0, 0, 1440, 900);
        monitor.scale = 2.0;
        monitor.physical_size_mm = Some((286, 179));
        assert_eq!(monitor.width, 1440);
        assert_eq!(monitor.logical_dpi(), 192.0);
        let dpi = monitor.physical_dpi().unwrap();
        assert!((dpi - 255.77).abs() < 0.1);
    }

    #[test]
    fn diff_reports_added_removed_and_changed() {
        let old = three_monitors();
        let mut new = old.clone();
        new.remove(0);
        new[0].scale = 1.5;
        new.push(Monitor::new("DP-3", 3640, 0, 1920, 1080));

        let change = diff_topology(&old, &new);
        assert_eq!(change.added, vec![MonitorId::new("DP-3")]);
        assert_eq!(change.removed, vec![MonitorId::new("DP-1")]);
        assert_eq!(change.changed, vec![MonitorId::new("DP-2")]);
        assert!(diff_topology(&old, &old).is_empty());
    }
}
