//! Environment templating for definition files
//!
//! Definition files are rendered as Handlebars templates in strict mode
//! with two helpers:
//! - `{{ env "NAME" }}` expands to the variable, or an empty string
//! - `{{ env "NAME" "default" }}` falls back to `default` when unset
//! - `{{ must_env "NAME" }}` fails when the variable is unset
//!
//! Output is not HTML-escaped. Text outside actions is copied unchanged.

#![allow(clippy::result_large_err)]

use crate::errors::{definition_error, Result};
use handlebars::{
    no_escape, Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    RenderError,
};

/// Variable resolver shared by the template helpers
pub type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

struct EnvHelper<'a> {
    lookup: &'a Lookup,
    required: bool,
}

impl EnvHelper<'_> {
    fn name(&self) -> &'static str {
        if self.required {
            "must_env"
        } else {
            "env"
        }
    }

    fn string_param(
        &self,
        h: &Helper<'_, '_>,
        idx: usize,
    ) -> std::result::Result<String, RenderError> {
        h.param(idx)
            .and_then(|p| p.value().as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                RenderError::new(format!("{} expects quoted string arguments", self.name()))
            })
    }
}

impl HelperDef for EnvHelper<'_> {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let max_params = if self.required { 1 } else { 2 };
        if h.params().is_empty() || h.params().len() > max_params {
            return Err(RenderError::new(format!(
                "wrong number of arguments to {}",
                self.name()
            )));
        }

        let name = self.string_param(h, 0)?;
        let value = match (self.lookup)(&name) {
            Some(value) => value,
            None if self.required => {
                return Err(RenderError::new(format!(
                    "environment variable {} is not set",
                    name
                )))
            }
            None if h.params().len() == 2 => self.string_param(h, 1)?,
            None => String::new(),
        };
        out.write(&value)?;
        Ok(())
    }
}

/// Expand all template actions in `input`, resolving variables via `lookup`
pub fn expand_template(input: &str, lookup: &Lookup) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars.register_escape_fn(no_escape);
    handlebars.register_helper(
        "env",
        Box::new(EnvHelper {
            lookup,
            required: false,
        }),
    );
    handlebars.register_helper(
        "must_env",
        Box::new(EnvHelper {
            lookup,
            required: true,
        }),
    );

    handlebars
        .render_template(input, &())
        .map_err(|e| definition_error(format!("template error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnroll_core::ExErrorKind;

    fn vars(name: &str) -> Option<String> {
        match name {
            "STAGE" => Some("prod".to_string()),
            "ROLE_ARN" => Some("arn:aws:iam::123:role/fn".to_string()),
            "QUOTED" => Some("<a & \"b\">".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_plain_text_is_unchanged() {
        assert_eq!(expand_template("{\"a\": 1}", &vars).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_env_with_and_without_default() {
        let out = expand_template(
            r#"{{ env "STAGE" }}-{{ env "MISSING" "dev" }}-{{ env "MISSING" }}."#,
            &vars,
        )
        .unwrap();
        assert_eq!(out, "prod-dev-.");
    }

    #[test]
    fn test_must_env_present() {
        let out = expand_template(r#"{{ must_env "ROLE_ARN" }}"#, &vars).unwrap();
        assert_eq!(out, "arn:aws:iam::123:role/fn");
    }

    #[test]
    fn test_values_are_not_html_escaped() {
        let out = expand_template(r#"{{ env "QUOTED" }}"#, &vars).unwrap();
        assert_eq!(out, "<a & \"b\">");
    }

    #[test]
    fn test_must_env_missing_fails() {
        let err = expand_template(r#"{{ must_env "NOPE" }}"#, &vars).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::ConfigLoad);
        assert!(err.message().contains("NOPE"));
    }

    #[test]
    fn test_wrong_argument_count_fails() {
        let err = expand_template(r#"{{ must_env "STAGE" "x" }}"#, &vars).unwrap_err();
        assert!(err.message().contains("wrong number of arguments to must_env"));
    }

    #[test]
    fn test_unclosed_action_fails() {
        assert!(expand_template(r#"{{ env "STAGE" "#, &vars).is_err());
    }

    #[test]
    fn test_unknown_function_fails() {
        let err = expand_template(r#"{{ file "x" }}"#, &vars).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::ConfigLoad);
        assert!(err.message().contains("template error"));
    }

    #[test]
    fn test_unknown_variable_fails_in_strict_mode() {
        assert!(expand_template("{{ stage }}", &vars).is_err());
    }

    #[test]
    fn test_unterminated_string_fails() {
        assert!(expand_template(r#"{{ env "STAGE }}"#, &vars).is_err());
    }
}
