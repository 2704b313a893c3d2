/// A laid-out block of note text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextBlock {
    /// Wrapped lines.
    pub lines: Vec<String>,
    /// Block width in pixels.
    pub width: u32,
    /// Block height in pixels.
    pub height: u32,
}

/// Fixed-metric text layout that aims for a wide, short block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextLayout {
    /// Advance of one character, in pixels.
    pub char_width: u32,
    /// Height of one line, in pixels.
    pub char_height: u32,
    /// Preferred width/height ratio.
    pub target_ratio: f64,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            char_width: 6,
            char_height: 12,
            target_ratio: 3.0,
        }
    }
}

impl TextLayout {
    /// Pick the line count whose block ratio is closest to `target_ratio`, then word-wrap.
    pub fn layout(&self, text: &str) -> TextBlock {
        let total = text.chars().count() as u32;
        if total == 0 {
            return TextBlock {
                lines: Vec::new(),
                width: 0,
                height: 0,
            };
        }

        let max_width = total * self.char_width;
        let mut best: Option<(f64, u32, u32)> = None;
        for n in 1..=total {
            let per_line = total.div_ceil(n);
            let width = per_line * self.char_width;
            if width > max_width {
                break;
            }
            let height = n * self.char_height;
            let score = (f64::from(width) / f64::from(height) - self.target_ratio).abs();
            if best.is_none_or(|(s, _, _)| score < s) {
                best = Some((score, width, height));
            }
        }
        let (_, width, mut height) = best.unwrap_or((0.0, max_width, self.char_height));

        let budget = ((width + self.char_height) / self.char_width) as usize;
        let lines = wrap_words(text, budget);
        height = height.max(self.char_height * lines.len() as u32);

        TextBlock {
            lines,
            width,
            height,
        }
    }
}

// Greedy wrap; each placed word also consumes one separator column.
fn wrap_words(text: &str, budget: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut used = 0usize;
    for word in text.split_whitespace() {
        let len = word.chars().count();
        if used + len <= budget || current.is_empty() {
            current.push(word);
            used += len + 1;
        } else {
            lines.push(current.join(" "));
            current = vec![word];
            used = len + 1;
        }
    }
    if !current.is_empty() {
        lines.push(current.join(" "));
    }
    lines
}

#[cfg(test)]
#[path = "../../tests/unit/technique/text_layout.rs"]
mod tests;
