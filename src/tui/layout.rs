/// Width breakpoints deciding which panels fit next to the results table.
///
/// Single source of truth for width thresholds; render code asks the
/// breakpoint instead of comparing widths itself.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Breakpoint {
    /// < 80 cols: results table only
    Narrow,
    /// 80-119 cols: table plus the near-me panel
    Normal,
    /// 120+ cols: room for the description column too
    Wide,
}

impl Breakpoint {
    pub fn from_width(width: u16) -> Self {
        match width {
            0..=79 => Breakpoint::Narrow,
            80..=119 => Breakpoint::Normal,
            _ => Breakpoint::Wide,
        }
    }

    pub fn at_least(self, min: Breakpoint) -> bool {
        self >= min
    }

    pub fn shows_map(self) -> bool {
        self.at_least(Breakpoint::Normal)
    }

    pub fn shows_description(self) -> bool {
        self.at_least(Breakpoint::Wide)
    }
}
