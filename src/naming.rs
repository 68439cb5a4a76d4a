//! Case conversion (C1).
//!
//! Four pure functions over an identifier: `pascal`, `camel`, `kebab`,
//! `snake`. All four share one tokenizer: a lower-to-upper transition starts
//! a new token, `-`, `_` and whitespace are separators, and empty tokens are
//! dropped.

/// Splits an identifier into lower-case tokens using the shared rule: a
/// lower-to-upper transition is a boundary, `-`/`_`/whitespace are
/// separators. A run of uppercase letters followed by a lowercase letter
/// (e.g. `HTTPServer`) treats the last uppercase letter as the start of the
/// next token, so acronyms don't get split one character at a time.
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = input.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == '_' || c.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower);
            if boundary {
                tokens.push(std::mem::take(&mut current));
            }
        }

        current.push(c.to_ascii_lowercase());
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// `PascalCase`: every token capitalized and concatenated.
pub fn pascal(input: &str) -> String {
    tokenize(input).iter().map(|t| capitalize(t)).collect()
}

/// `camelCase`: pascal with the first character lower-cased.
pub fn camel(input: &str) -> String {
    let p = pascal(input);
    let mut chars = p.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// `kebab-case`: tokens joined by `-`, all lower-case.
pub fn kebab(input: &str) -> String {
    tokenize(input).join("-")
}

/// `snake_case`: tokens joined by `_`, all lower-case.
pub fn snake(input: &str) -> String {
    tokenize(input).join("_")
}
