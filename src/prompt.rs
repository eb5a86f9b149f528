//! Prompt rendering.
//!
//! Templates use `{text}` as their substitution point. `{{` and `}}` render
//! as literal braces, so JSON examples inside a template must double their
//! braces. Placeholder names are matched exactly, so `{ text }` is not the
//! input placeholder. Any other placeholder, an empty `{}`, or an unbalanced
//! brace makes the template malformed and nothing is rendered.

use thiserror::Error;

/// Name of the placeholder that receives the aggregated input.
pub const PLACEHOLDER: &str = "text";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("unmatched '{{' at position {position} in template")]
    UnmatchedOpen { position: usize },

    #[error("single '}}' at position {position} in template")]
    UnmatchedClose { position: usize },

    #[error("empty placeholder '{{}}' at position {position} in template")]
    EmptyPlaceholder { position: usize },

    #[error("unknown placeholder '{name}' at position {position}, only '{{text}}' is supported")]
    UnknownPlaceholder { name: String, position: usize },

    #[error("template has no '{{text}}' placeholder")]
    MissingPlaceholder,
}

/// Substitutes `text` into every `{text}` of `template`.
pub fn render(template: &str, text: &str) -> Result<String, RenderError> {
    let mut out = String::with_capacity(template.len() + text.len());
    let mut chars = template.char_indices().peekable();
    let mut substitutions = 0usize;

    while let Some((pos, ch)) = chars.next() {
        match ch {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some((_, '}')) => break,
                        Some((_, '{')) | None => {
                            return Err(RenderError::UnmatchedOpen { position: pos });
                        }
                        Some((_, c)) => name.push(c),
                    }
                }
                if name.is_empty() {
                    return Err(RenderError::EmptyPlaceholder { position: pos });
                }
                if name != PLACEHOLDER {
                    return Err(RenderError::UnknownPlaceholder {
                        name,
                        position: pos,
                    });
                }
                out.push_str(text);
                substitutions += 1;
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                out.push('}');
            }
            '}' => return Err(RenderError::UnmatchedClose { position: pos }),
            c => out.push(c),
        }
    }

    if substitutions == 0 {
        return Err(RenderError::MissingPlaceholder);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_placeholder() {
        assert_eq!(
            render("Summarize: {text}", "raw data").unwrap(),
            "Summarize: raw data"
        );
    }

    #[test]
    fn input_braces_are_not_interpreted() {
        assert_eq!(
            render("In: {text}", "{\"a\": 1} }{").unwrap(),
            "In: {\"a\": 1} }{"
        );
    }

    #[test]
    fn escaped_braces_render_literally() {
        assert_eq!(
            render("Return {{\"items\": []}} for {text}", "x").unwrap(),
            "Return {\"items\": []} for x"
        );
    }

    #[test]
    fn repeated_placeholder_gets_same_text() {
        assert_eq!(render("{text}|{text}", "a").unwrap(), "a|a");
    }

    #[test]
    fn placeholder_name_is_matched_exactly() {
        assert_eq!(
            render("{ text }", "a").unwrap_err(),
            RenderError::UnknownPlaceholder {
                name: " text ".into(),
                position: 0
            }
        );
    }

    #[test]
    fn malformed_templates_fail() {
        assert_eq!(
            render("Hi {text", "x").unwrap_err(),
            RenderError::UnmatchedOpen { position: 3 }
        );
        assert_eq!(
            render("Hi } {text}", "x").unwrap_err(),
            RenderError::UnmatchedClose { position: 3 }
        );
        assert_eq!(
            render("{} {text}", "x").unwrap_err(),
            RenderError::EmptyPlaceholder { position: 0 }
        );
        assert_eq!(
            render("{text} {topic}", "x").unwrap_err(),
            RenderError::UnknownPlaceholder {
                name: "topic".into(),
                position: 7
            }
        );
    }

    #[test]
    fn bundled_demo_templates_render() {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/prompt_templates");
        for entry in std::fs::read_dir(dir).unwrap() {
            let template = std::fs::read_to_string(entry.unwrap().path()).unwrap();
            let rendered = render(&template, "FIELDS").unwrap();
            assert!(rendered.contains("FIELDS"));
        }
    }

    #[test]
    fn template_without_placeholder_fails() {
        assert_eq!(
            render("No input here", "x").unwrap_err(),
            RenderError::MissingPlaceholder
        );
    }
}
