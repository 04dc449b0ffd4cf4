//! Rendering [`crate::lexer::LexError`] and [`crate::parser::Error`] as
//! human-readable diagnostics.
//!
//! Grounded on `yash-syntax/src/source/pretty.rs`'s conversion of a parser
//! error into an `annotate_snippets::Group`, narrowed to this crate's two
//! concrete error types (`LexError`, `parser::Error`) instead of the
//! teacher's open-ended `MessageBase` trait, since nothing else in this
//! crate needs to plug an arbitrary error type into the renderer.

use crate::lexer::LexError;
use crate::parser::Error as ParseError;
use crate::source::Location;

/// A diagnostic ready to be rendered: a one-line title plus, when the error
/// has one, the source location it is about.
pub struct Diagnostic {
    pub title: String,
    pub location: Option<Location>,
}

impl From<&LexError> for Diagnostic {
    fn from(e: &LexError) -> Self {
        Diagnostic {
            title: e.message.clone(),
            location: Some(e.location.clone()),
        }
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(e: &ParseError) -> Self {
        match e {
            ParseError::Lex(lex) => Diagnostic::from(lex),
            ParseError::Incomplete => Diagnostic {
                title: e.to_string(),
                location: None,
            },
            ParseError::Unexpected { location, .. } => Diagnostic {
                title: e.to_string(),
                location: Some(location.clone()),
            },
        }
    }
}

#[cfg(feature = "annotate")]
mod render {
    use super::Diagnostic;
    use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};

    impl Diagnostic {
        /// Renders this diagnostic as a multi-line string with a source
        /// snippet under the annotated span, or just the title if this
        /// diagnostic has no location (e.g. ran out of input mid-token).
        pub fn render(&self) -> String {
            let Some(location) = &self.location else {
                return self.title.clone();
            };
            let origin = location.code.source.to_string();
            let range = location.byte_range();
            let snippet = Snippet::source(&location.code.value)
            .line_start(location.code.line as usize)
            .path(&origin)
            .annotation(AnnotationKind::Primary.span(range).label(&self.title));
            let group = Level::ERROR.primary_title(&self.title).element(snippet);
            format!("{}", Renderer::styled().render(&[group]))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::super::*;
        use crate::lexer::{Lexer, LexOutcome};

        #[test]
        fn renders_a_lex_error_with_a_snippet() {
            let mut lexer = Lexer::from_str_unattributed("${.}");
            let LexOutcome::Error(err) = lexer.next_token(true) else {
                panic!("expected an invalid-parameter-name lex error");
            };
            let diagnostic = Diagnostic::from(&err);
            let rendered = diagnostic.render();
            assert!(rendered.contains(&err.message));
        }
    }
}
