//! Small text helpers shared by rendering and topic naming

/// Title-case a string: the first letter of every alphanumeric run is
/// uppercased and the rest lowercased
///
/// ```
/// use mailsift_domain::text::title_case;
///
/// assert_eq!(title_case("invoice payment due"), "Invoice Payment Due");
/// assert_eq!(title_case("AI trends"), "Ai Trends");
/// ```
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
