//! Prompt rendering.
//!
//! Single-pass substitution of the three article placeholders. `{{` and `}}`
//! produce literal braces, any other brace sequence is copied through as is.
//! Substituted text is never re-scanned, and no escaping is applied to it.

pub const TITLE: &str = "{title}";
pub const DESCRIPTION: &str = "{description}";
pub const CONTENT: &str = "{content}";

/// Placeholders every prompt template must contain.
pub const PLACEHOLDERS: [&str; 3] = [TITLE, DESCRIPTION, CONTENT];

pub fn render(template: &str, title: &str, description: &str, content: &str) -> String {
    let mut rendered = String::with_capacity(
        template.len() + title.len() + description.len() + content.len(),
    );
    let mut rest = template;

    while let Some(position) = rest.find(['{', '}']) {
        rendered.push_str(&rest[..position]);
        rest = &rest[position..];

        if rest.starts_with("{{") {
            rendered.push('{');
            rest = &rest[2..];
        } else if rest.starts_with("}}") {
            rendered.push('}');
            rest = &rest[2..];
        } else if let Some(after) = rest.strip_prefix(TITLE) {
            rendered.push_str(title);
            rest = after;
        } else if let Some(after) = rest.strip_prefix(DESCRIPTION) {
            rendered.push_str(description);
            rest = after;
        } else if let Some(after) = rest.strip_prefix(CONTENT) {
            rendered.push_str(content);
            rest = after;
        } else {
            rendered.push_str(&rest[..1]);
            rest = &rest[1..];
        }
    }

    rendered.push_str(rest);
    rendered
}
