//! Toast notification overlay
//!
//! Toasts stack upward from the bottom-right corner and dismiss themselves.
//! Errors stay on screen longer than successes.

use crate::events::{Toast, ToastVariant};
use crate::tui::style;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

const SUCCESS_DURATION: Duration = Duration::from_secs(3);
const ERROR_DURATION: Duration = Duration::from_secs(6);

/// Widest a toast may get, borders included
const MAX_WIDTH: u16 = 48;

pub struct ToastView {
    pub toast: Toast,
    created_at: Instant,
    duration: Duration,
}

impl ToastView {
    pub fn new(toast: Toast) -> Self {
        let duration = match toast.variant {
            ToastVariant::Success => SUCCESS_DURATION,
            ToastVariant::Error => ERROR_DURATION,
        };
        Self {
            toast,
            created_at: Instant::now(),
            duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }

    fn color(&self) -> ratatui::style::Color {
        match self.toast.variant {
            ToastVariant::Success => style::SUCCESS,
            ToastVariant::Error => style::ERROR,
        }
    }

    /// Cells needed for the message, borders and padding included
    fn width(&self, available: u16) -> u16 {
        let text = self.toast.message.width().max(self.toast.title.width() + 2) as u16;
        (text + 4).min(MAX_WIDTH).min(available)
    }
}

/// Render the visible toasts, newest at the bottom
pub fn render(f: &mut Frame, area: Rect, toasts: &[ToastView]) {
    let mut bottom = area.bottom().saturating_sub(1);

    for view in toasts.iter().rev() {
        let width = view.width(area.width.saturating_sub(4));
        let inner_width = width.saturating_sub(2).max(1) as usize;
        let lines = view.toast.message.width().div_ceil(inner_width).max(1) as u16;
        let height = lines + 2;
        if bottom < area.top() + height {
            break;
        }

        let x = area.right().saturating_sub(width + 2);
        let y = bottom - height;
        let toast_area = Rect::new(x, y, width, height);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(view.color()))
            .title(Line::from(format!(" {} ", view.toast.title)).style(style::title()));

        let text = Paragraph::new(view.toast.message.as_str())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);

        f.render_widget(Clear, toast_area);
        f.render_widget(text, toast_area);
        bottom = y;
    }
}
