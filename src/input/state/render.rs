use crate::draw::{Shape, clear_surface, render_shape, render_shapes, render_text};
use crate::effects::paint_effects;
use crate::geometry::{self, Monitor};
use crate::ui;
use std::time::Instant;

use super::{DrawingState, InputState};

impl InputState {
    /// Returns the shape the current drag would commit, for live preview.
    pub fn provisional_shape(&self) -> Option<Shape> {
        if let DrawingState::Drawing {
            tool,
            monitor,
            start,
            current,
        } = &self.state
        {
            self.shape_for_drag(*tool, monitor, *start, *current)
        } else {
            None
        }
    }

    /// Paints one monitor's surface from scratch.
    ///
    /// Layers, bottom to top: committed shapes, the drag preview, the text
    /// being typed, cursor effects, the floating menu, the pass-through
    /// indicator.
    pub fn render_monitor(&self, ctx: &cairo::Context, monitor: &Monitor, now: Instant) {
        clear_surface(ctx);
        let (width, height) = (monitor.width as f64, monitor.height as f64);

        render_shapes(ctx, self.canvas.document().shapes_on(&monitor.id));

        if let Some(shape) = self.provisional_shape()
            && shape.monitor == monitor.id
        {
            render_shape(ctx, &shape);
        }

        if let DrawingState::TextInput {
            monitor: text_monitor,
            x,
            y,
            buffer,
        } = &self.state
            && *text_monitor == monitor.id
        {
            let preview = if self.caret_visible(now) {
                format!("{}_", buffer)
            } else {
                buffer.clone()
            };
            render_text(ctx, *x, *y, &preview, self.colors.text, self.font_size, &self.font);
        }

        if !self.passthrough
            && self.effects.any_active()
            && let Some(cursor) = self.cursor
        {
            let local = geometry::to_monitor_local(cursor, monitor);
            let halo_color = self
                .colors
                .for_tool(self.tool)
                .with_alpha(self.opacity.alpha());
            paint_effects(
                ctx,
                &self.effects,
                (local.x as f64, local.y as f64),
                (width, height),
                halo_color,
                true,
            );
        }

        if self.menu.is_drawn() && self.menu_monitor.as_ref() == Some(&monitor.id) {
            self.menu.render(ctx, width, &self.menu_highlights(), now);
        }

        if self.passthrough && self.show_passthrough_indicator {
            ui::render_passthrough_indicator(ctx, width, height);
        }
    }
}
