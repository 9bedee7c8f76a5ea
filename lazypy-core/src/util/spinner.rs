//! Cosmetic progress spinner.
//!
//! Purely visual: the style is reshuffled from caller-provided entropy and
//! the frame advances on every tick. Nothing else reads it.

#[derive(Debug)]
pub struct SpinnerStyle {
    pub name: &'static str,
    pub frames: &'static [&'static str],
}

pub const STYLES: &[SpinnerStyle] = &[
    SpinnerStyle { name: "dot", frames: &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"] },
    SpinnerStyle { name: "globe", frames: &["🌍", "🌎", "🌏"] },
    SpinnerStyle { name: "line", frames: &["|", "/", "-", "\\"] },
    SpinnerStyle { name: "mini-dot", frames: &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"] },
    SpinnerStyle { name: "jump", frames: &["⢄", "⢂", "⢁", "⡁", "⡈", "⡐", "⡠"] },
    SpinnerStyle { name: "ellipsis", frames: &["", ".", "..", "..."] },
    SpinnerStyle { name: "meter", frames: &["▱▱▱", "▰▱▱", "▰▰▱", "▰▰▰", "▰▰▱", "▰▱▱"] },
    SpinnerStyle { name: "monkey", frames: &["🙈", "🙉", "🙊"] },
    SpinnerStyle { name: "moon", frames: &["🌑", "🌒", "🌓", "🌔", "🌕", "🌖", "🌗", "🌘"] },
    SpinnerStyle { name: "points", frames: &["∙∙∙", "●∙∙", "∙●∙", "∙∙●"] },
    SpinnerStyle { name: "pulse", frames: &["█", "▓", "▒", "░"] },
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spinner {
    style: usize,
    frame: usize,
    reshuffle: bool,
}

impl Spinner {
    pub fn with_seed(seed: u32) -> Self {
        Self {
            style: seed as usize % STYLES.len(),
            frame: 0,
            reshuffle: false,
        }
    }

    fn style(&self) -> &'static SpinnerStyle {
        &STYLES[self.style % STYLES.len()]
    }

    pub fn glyph(&self) -> &'static str {
        let frames = self.style().frames;
        frames[self.frame % frames.len()]
    }

    #[cfg(test)]
    fn style_name(&self) -> &'static str {
        self.style().name
    }

    /// Pick a new style on the next tick.
    pub fn request_reshuffle(&mut self) {
        self.reshuffle = true;
    }

    pub fn tick(&mut self, entropy: u32) {
        if self.reshuffle {
            *self = Self::with_seed(entropy);
        } else {
            self.frame = (self.frame + 1) % self.style().frames.len();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_cycle() {
        let mut spinner = Spinner::with_seed(2); // line
        assert_eq!(spinner.style_name(), "line");
        let glyphs: Vec<&str> = (0..5)
            .map(|_| {
                let g = spinner.glyph();
                spinner.tick(0);
                g
            })
            .collect();
        assert_eq!(glyphs, vec!["|", "/", "-", "\\", "|"]);
    }

    #[test]
    fn test_reshuffle_uses_entropy_once() {
        let mut spinner = Spinner::with_seed(0);
        spinner.request_reshuffle();
        spinner.tick(7);
        assert_eq!(spinner.style_name(), "monkey");
        spinner.tick(3);
        assert_eq!(spinner.style_name(), "monkey");
    }
}
