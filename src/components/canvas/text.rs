//! Label measurement and greedy line breaking.

/// Measures rendered text width in canvas units.
pub trait TextMeasure {
	/// Width of `text` at `font_size` pixels.
	fn width(&self, text: &str, font_size: f64) -> f64;
}

/// Fixed advance per character. Used off-screen and in tests.
#[derive(Clone, Copy, Debug)]
pub struct MonospaceMeasure {
	/// Advance as a fraction of the font size.
	pub advance: f64,
}

impl Default for MonospaceMeasure {
	fn default() -> Self {
		Self { advance: 0.6 }
	}
}

impl TextMeasure for MonospaceMeasure {
	fn width(&self, text: &str, font_size: f64) -> f64 {
		text.chars().count() as f64 * font_size * self.advance
	}
}

/// Break `text` into lines no wider than `max_width`.
///
/// Words are appended to the current line while it still fits; a single word
/// wider than the limit gets a line of its own.
pub fn wrap_words(text: &str, max_width: f64, font_size: f64, measure: &dyn TextMeasure) -> Vec<String> {
	let mut lines = Vec::new();
	let mut current = String::new();
	for word in text.split_whitespace() {
		if current.is_empty() {
			current.push_str(word);
			continue;
		}
		let candidate = format!("{current} {word}");
		if measure.width(&candidate, font_size) < max_width {
			current = candidate;
		} else {
			lines.push(std::mem::replace(&mut current, word.to_string()));
		}
	}
	if !current.is_empty() {
		lines.push(current);
	}
	lines
}

/// Baseline offsets that center `count` lines vertically around zero.
pub fn centered_offsets(count: usize, line_height: f64) -> Vec<f64> {
	let first = -(count.saturating_sub(1) as f64) * line_height / 2.0;
	(0..count).map(|i| first + i as f64 * line_height).collect()
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	// 10 units per character at size 10
	const MEASURE: MonospaceMeasure = MonospaceMeasure { advance: 1.0 };

	#[test]
	fn short_labels_stay_on_one_line() {
		assert_eq!(wrap_words("fox", 100.0, 10.0, &MEASURE), vec!["fox"]);
	}

	#[test]
	fn words_wrap_greedily() {
		// "the quick" = 90 < 100, "the quick brown" = 150
		assert_eq!(
			wrap_words("the quick brown fox jumps", 100.0, 10.0, &MEASURE),
			vec!["the quick", "brown fox", "jumps"]
		);
	}

	#[test]
	fn oversized_word_gets_its_own_line() {
		assert_eq!(
			wrap_words("a incomprehensibilities b", 100.0, 10.0, &MEASURE),
			vec!["a", "incomprehensibilities", "b"]
		);
	}

	#[test]
	fn blank_labels_have_no_lines() {
		assert!(wrap_words("   ", 100.0, 10.0, &MEASURE).is_empty());
	}

	#[test]
	fn offsets_are_centered() {
		assert_eq!(centered_offsets(1, 14.0), vec![0.0]);
		assert_eq!(centered_offsets(3, 14.0), vec![-14.0, 0.0, 14.0]);
		assert_eq!(centered_offsets(2, 10.0), vec![-5.0, 5.0]);
	}
}
