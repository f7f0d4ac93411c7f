use unicode_normalization::UnicodeNormalization;
use unicode_properties::{GeneralCategory, UnicodeGeneralCategory};

/// Canonicalizes corpus text before it is split into words.
///
/// - Lowercases the input
/// - Decomposes it (NFD) and drops every nonspacing mark (`Mn`)
/// - Recomposes the remainder (NFC)
///
/// Lowercasing happens first because some uppercase letters lowercase into
/// a base letter plus a combining mark (`İ` → `i̇`); doing it last would
/// leave marks behind and break idempotence.
pub fn normalize(text: &str) -> String {
	let lowered = text.to_lowercase();
	lowered
		.nfd()
		.filter(|c| c.general_category() != GeneralCategory::NonspacingMark)
		.nfc()
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn strips_diacritics_and_lowercases() {
		assert_eq!(normalize("Crème Brûlée"), "creme brulee");
		assert_eq!(normalize("ÀÉÎÕÜ ñ"), "aeiou n");
	}

	#[test]
	fn leaves_plain_ascii_alone() {
		assert_eq!(normalize("the cat sat."), "the cat sat.");
	}

	#[test]
	fn is_idempotent() {
		for input in ["İstanbul", "Ça va? Déjà vu!", "ﬁ ǅ Ω Å", "naïve\tcafé\n", ""] {
			let once = normalize(input);
			assert_eq!(normalize(&once), once, "input {input:?}");
		}
	}

	#[test]
	fn keeps_whitespace_layout() {
		assert_eq!(normalize("A  b\n\nC"), "a  b\n\nc");
	}
}
