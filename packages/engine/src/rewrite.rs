use std::iter::Peekable;
use std::str::CharIndices;

use crate::PrepareError;

/// One placeholder occurrence: the binding name feeding `position`.
///
/// `position` is the zero-based index of the `?` marker in left-to-right
/// emission order. The same name may appear at several positions, each
/// resolving independently against the binding.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ParameterReference {
    pub name: String,
    pub position: usize,
}

/// SQL text with every named parameter replaced by a single `?`, plus the
/// ordered record of which name each placeholder came from. Produced
/// atomically: either the whole statement rewrites or nothing is returned.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RewrittenStatement {
    pub sql: String,
    pub parameters: Vec<ParameterReference>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InQuote,
}

/// Rewrites `:name` tokens into positional `?` placeholders in one pass.
///
/// Everything that is not a recognized named-parameter token is copied
/// verbatim: text inside single-quoted literals (even `':lookalikes'`),
/// `$`-bearing identifiers such as `v$session`, whitespace, and arbitrary
/// punctuation. A `:` followed by anything that cannot start an identifier
/// fails the whole rewrite; no partial statement is ever produced. A
/// literal still open at end of input is treated as implicitly closed.
pub fn rewrite_statement(sql: &str) -> Result<RewrittenStatement, PrepareError> {
    let mut out = String::with_capacity(sql.len());
    let mut parameters: Vec<ParameterReference> = Vec::new();
    let mut state = ScanState::Normal;
    let mut chars = sql.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        match state {
            ScanState::InQuote => {
                out.push(ch);
                if ch == '\'' {
                    state = ScanState::Normal;
                }
            }
            ScanState::Normal => match ch {
                '\'' => {
                    out.push(ch);
                    state = ScanState::InQuote;
                }
                ':' => match take_parameter_name(&mut chars) {
                    Some(name) => {
                        parameters.push(ParameterReference {
                            name,
                            position: parameters.len(),
                        });
                        out.push('?');
                    }
                    None => return Err(PrepareError::malformed(sql, offset)),
                },
                _ => out.push(ch),
            },
        }
    }

    Ok(RewrittenStatement { sql: out, parameters })
}

// Consumes the maximal identifier run after a `:`. The run must start with
// an ASCII letter or underscore and may continue with letters, digits, or
// underscores; anything else ends the name without being consumed.
fn take_parameter_name(chars: &mut Peekable<CharIndices<'_>>) -> Option<String> {
    let mut name = String::new();
    match chars.peek() {
        Some(&(_, first)) if first.is_ascii_alphabetic() || first == '_' => {
            name.push(first);
            chars.next();
        }
        _ => return None,
    }
    while let Some(&(_, ch)) = chars.peek() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            name.push(ch);
            chars.next();
        } else {
            break;
        }
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::{rewrite_statement, ParameterReference};
    use crate::PrepareError;

    fn references(pairs: &[(&str, usize)]) -> Vec<ParameterReference> {
        pairs
            .iter()
            .map(|(name, position)| ParameterReference {
                name: name.to_string(),
                position: *position,
            })
            .collect()
    }

    #[test]
    fn rewrites_single_named_parameter_across_newlines() {
        let rewritten = rewrite_statement("select * from something\n where id = :id")
            .expect("rewrite should succeed");
        assert_eq!(rewritten.sql, "select * from something\n where id = ?");
        assert_eq!(rewritten.parameters, references(&[("id", 0)]));
    }

    #[test]
    fn rewrites_parameters_around_odd_characters() {
        let rewritten =
            rewrite_statement(":boo ':nope' _%&^& *@ :id").expect("rewrite should succeed");
        assert_eq!(rewritten.sql, "? ':nope' _%&^& *@ ?");
        assert_eq!(rewritten.parameters, references(&[("boo", 0), ("id", 1)]));
    }

    #[test]
    fn allows_digits_after_the_first_character() {
        let rewritten =
            rewrite_statement(":bo0 ':nope' _%&^& *@ :id").expect("rewrite should succeed");
        assert_eq!(rewritten.sql, "? ':nope' _%&^& *@ ?");
        assert_eq!(rewritten.parameters, references(&[("bo0", 0), ("id", 1)]));
    }

    #[test]
    fn passes_dollar_sign_identifiers_through() {
        let rewritten = rewrite_statement("select * from v$session").expect("rewrite should succeed");
        assert_eq!(rewritten.sql, "select * from v$session");
        assert!(rewritten.parameters.is_empty());
    }

    #[test]
    fn fails_on_token_that_cannot_start_an_identifier() {
        let error = rewrite_statement(
            "select * from something\n where id = :\u{87}\u{8e}\u{92}\u{97}\u{9c}",
        )
        .expect_err("control characters after ':' should fail the rewrite");
        match error {
            PrepareError::MalformedParameterName {
                fragment, offset, ..
            } => {
                assert_eq!(fragment, ":\u{87}\u{8e}\u{92}\u{97}\u{9c}");
                assert_eq!(offset, 36);
            }
            other => panic!("expected MalformedParameterName, got {other:?}"),
        }
    }

    #[test]
    fn leaves_parameterless_sql_untouched() {
        let sql = "select a, b from t where a > 10 order by b";
        let rewritten = rewrite_statement(sql).expect("rewrite should succeed");
        assert_eq!(rewritten.sql, sql);
        assert!(rewritten.parameters.is_empty());
    }

    #[test]
    fn never_rewrites_inside_quoted_literals() {
        let rewritten = rewrite_statement("select 'it''s :not_a_param' where x = :x")
            .expect("rewrite should succeed");
        assert_eq!(rewritten.sql, "select 'it''s :not_a_param' where x = ?");
        assert_eq!(rewritten.parameters, references(&[("x", 0)]));
    }

    #[test]
    fn repeated_names_get_distinct_positions() {
        let rewritten =
            rewrite_statement("select :id, :other, :id").expect("rewrite should succeed");
        assert_eq!(rewritten.sql, "select ?, ?, ?");
        assert_eq!(
            rewritten.parameters,
            references(&[("id", 0), ("other", 1), ("id", 2)])
        );
    }

    #[test]
    fn underscore_may_start_a_name() {
        let rewritten = rewrite_statement("where k = :_key").expect("rewrite should succeed");
        assert_eq!(rewritten.sql, "where k = ?");
        assert_eq!(rewritten.parameters, references(&[("_key", 0)]));
    }

    #[test]
    fn name_ends_at_first_non_identifier_character() {
        let rewritten = rewrite_statement("select :a$b").expect("rewrite should succeed");
        assert_eq!(rewritten.sql, "select ?$b");
        assert_eq!(rewritten.parameters, references(&[("a", 0)]));
    }

    #[test]
    fn fails_on_double_colon() {
        let error = rewrite_statement("select x::text from t")
            .expect_err("a bare ':' before another ':' should fail");
        match error {
            PrepareError::MalformedParameterName { offset, .. } => assert_eq!(offset, 8),
            other => panic!("expected MalformedParameterName, got {other:?}"),
        }
    }

    #[test]
    fn fails_on_trailing_bare_colon() {
        let error =
            rewrite_statement("select :").expect_err("':' at end of input should fail");
        match error {
            PrepareError::MalformedParameterName {
                fragment, offset, ..
            } => {
                assert_eq!(fragment, ":");
                assert_eq!(offset, 7);
            }
            other => panic!("expected MalformedParameterName, got {other:?}"),
        }
    }

    #[test]
    fn treats_unterminated_literal_as_implicitly_closed() {
        let rewritten =
            rewrite_statement("select ':oops where id = :id").expect("rewrite should succeed");
        assert_eq!(rewritten.sql, "select ':oops where id = :id");
        assert!(rewritten.parameters.is_empty());
    }

    #[test]
    fn placeholder_count_matches_parameter_list() {
        let rewritten = rewrite_statement(
            "insert into t (a, b, c) values (:a, ':b literal', :b)",
        )
        .expect("rewrite should succeed");
        let placeholder_count = rewritten.sql.matches('?').count();
        assert_eq!(placeholder_count, rewritten.parameters.len());
        for (index, parameter) in rewritten.parameters.iter().enumerate() {
            assert_eq!(parameter.position, index);
        }
    }

    #[test]
    fn preserves_utf8_text_outside_tokens() {
        let rewritten = rewrite_statement("select 'München é🙂' where name = :name")
            .expect("rewrite should succeed");
        assert_eq!(rewritten.sql, "select 'München é🙂' where name = ?");
        assert_eq!(rewritten.parameters, references(&[("name", 0)]));
    }

    #[test]
    fn fails_on_non_ascii_name_start() {
        let error =
            rewrite_statement("where name = :héllo").expect_err("non-ASCII start should fail");
        assert!(matches!(
            error,
            PrepareError::MalformedParameterName { .. }
        ));
    }

    #[test]
    fn empty_input_rewrites_to_empty_output() {
        let rewritten = rewrite_statement("").expect("rewrite should succeed");
        assert_eq!(rewritten.sql, "");
        assert!(rewritten.parameters.is_empty());
    }
}
