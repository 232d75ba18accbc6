//! Master–stack tiling.
//!
//! The first window of a workspace (the *master*) takes the left half of
//! the screen; the others share the right half in equal-height rows.  A
//! lone window takes the whole screen.
//!
//! Geometry is recomputed from scratch on every call, so the result only
//! depends on the window order and the screen size.

use crate::event::{Rect, ScreenSize, Window};
use crate::traits::{DisplayServer, TransportError};
use log::{debug, trace};

/// Computes and applies the layout of one workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilingEngine {
    screen: ScreenSize,
}

impl TilingEngine {
    pub fn new(screen: ScreenSize) -> Self {
        Self { screen }
    }

    /// Geometry for each window of `windows`, in order.
    ///
    /// Stack heights use integer division: with `H = 1080` and four stacked
    /// windows every row is 270 px; with seven rows the last 2 px of the
    /// screen stay uncovered.
    pub fn layout(&self, windows: &[Window]) -> Vec<(Window, Rect)> {
        let ScreenSize { width, height } = self.screen;
        match windows {
            [] => Vec::new(),
            [only] => vec![(*only, self.screen.full())],
            [master, stack @ ..] => {
                let master_width = width / 2;
                let stack_width = width - master_width;
                let row_height = height / stack.len() as u32;
                let x = master_width as i32;

                let mut out = Vec::with_capacity(windows.len());
                out.push((*master, Rect::new(0, 0, master_width, height)));
                out.extend(stack.iter().enumerate().map(|(i, w)| {
                    let y = (i as u32 * row_height) as i32;
                    (*w, Rect::new(x, y, stack_width, row_height))
                }));
                out
            }
        }
    }

    /// Push the layout of `windows` to the display server, one configure
    /// request per window.
    pub fn arrange(
        &self,
        windows: &[Window],
        display: &impl DisplayServer,
    ) -> Result<(), TransportError> {
        if windows.is_empty() {
            debug!("no windows to arrange");
            return Ok(());
        }
        for (window, rect) in self.layout(windows) {
            trace!("window 0x{:x} -> {}", window, rect);
            display.configure_window(window, rect)?;
        }
        Ok(())
    }
}
