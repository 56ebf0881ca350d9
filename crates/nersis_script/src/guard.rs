//! Argument guard
//!
//! Every value a script hands to a binding passes through [`validate`]
//! before anything native sees it. Validation is driven entirely by the
//! binding's declared [`ArgSpec`]s, so a binding cannot opt out of it.

use std::fmt;

use nersis_core::Color;
use thiserror::Error;

use crate::value::ScriptValue;

/// Kind of value a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Number,
    String,
    /// Four numbers: `[r, g, b, a]`. When it is a binding's only parameter
    /// the four components may also be passed as separate arguments.
    Rgba,
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArgKind::Number => "number",
            ArgKind::String => "string",
            ArgKind::Rgba => "rgba array of 4 numbers",
        })
    }
}

/// A converted, native-typed argument.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeArg {
    Number(f64),
    Str(String),
    Color(Color),
}

/// Declared parameter: a name for diagnostics, a kind, and optionally the
/// value substituted when the script passes nil.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
    pub default: Option<NativeArg>,
}

impl ArgSpec {
    pub const fn number(name: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::Number,
            default: None,
        }
    }

    pub const fn string(name: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::String,
            default: None,
        }
    }

    pub const fn rgba(name: &'static str) -> Self {
        Self {
            name,
            kind: ArgKind::Rgba,
            default: None,
        }
    }

    /// Allow nil, replacing it with `default`.
    pub fn or(mut self, default: NativeArg) -> Self {
        self.default = Some(default);
        self
    }

    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

/// Value returned to the script.
#[derive(Debug, Clone, PartialEq)]
pub enum ReturnValue {
    Nothing,
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    /// `index` is the first missing position, or the first surplus one.
    #[error("{binding}: argument {index}: expected {} argument(s), got {found}", arity_range(.min, .max))]
    ArityMismatch {
        binding: &'static str,
        index: usize,
        min: usize,
        max: usize,
        found: usize,
    },

    #[error("{binding}: argument {index} (`{param}`) expected {expected}, got {found}")]
    TypeMismatch {
        binding: &'static str,
        index: usize,
        param: &'static str,
        expected: ArgKind,
        found: &'static str,
    },

    #[error("{binding}: {reason}")]
    Handler {
        binding: &'static str,
        reason: String,
    },
}

fn arity_range(min: &usize, max: &usize) -> String {
    if min == max {
        min.to_string()
    } else {
        format!("{min} to {max}")
    }
}

impl BindingError {
    pub fn binding(&self) -> &'static str {
        match self {
            BindingError::ArityMismatch { binding, .. }
            | BindingError::TypeMismatch { binding, .. }
            | BindingError::Handler { binding, .. } => binding,
        }
    }

    /// Offending argument position. Handler failures have none.
    pub fn index(&self) -> Option<usize> {
        match self {
            BindingError::ArityMismatch { index, .. } | BindingError::TypeMismatch { index, .. } => {
                Some(*index)
            }
            BindingError::Handler { .. } => None,
        }
    }
}

/// Accepted argument count: trailing parameters with a default may be left
/// out, which is the same as passing nil.
pub fn arity(specs: &[ArgSpec]) -> (usize, usize) {
    let min = specs
        .iter()
        .rposition(|spec| !spec.is_optional())
        .map_or(0, |last_required| last_required + 1);
    (min, specs.len())
}

/// Check `args` against `specs` and convert them.
///
/// Arity is checked before any argument is looked at. On success the result
/// has exactly one entry per spec, in declaration order.
pub fn validate(
    binding: &'static str,
    specs: &[ArgSpec],
    args: Vec<ScriptValue>,
) -> Result<Vec<NativeArg>, BindingError> {
    if let [spec] = specs {
        if spec.kind == ArgKind::Rgba && args.len() == 4 {
            return spread_rgba(binding, spec, &args).map(|color| vec![NativeArg::Color(color)]);
        }
    }

    let (min, max) = arity(specs);
    if args.len() < min || args.len() > max {
        return Err(BindingError::ArityMismatch {
            binding,
            index: args.len().min(max),
            min,
            max,
            found: args.len(),
        });
    }

    let mut args = args.into_iter();
    specs
        .iter()
        .enumerate()
        .map(|(index, spec)| convert(binding, index, spec, args.next().unwrap_or(ScriptValue::Nil)))
        .collect()
}

fn convert(
    binding: &'static str,
    index: usize,
    spec: &ArgSpec,
    value: ScriptValue,
) -> Result<NativeArg, BindingError> {
    let mismatch = |found: &'static str| BindingError::TypeMismatch {
        binding,
        index,
        param: spec.name,
        expected: spec.kind,
        found,
    };

    match (spec.kind, value) {
        (_, ScriptValue::Nil) => spec.default.clone().ok_or_else(|| mismatch("nil")),
        (ArgKind::Number, ScriptValue::Number(n)) => Ok(NativeArg::Number(n)),
        (ArgKind::String, ScriptValue::String(s)) => Ok(NativeArg::Str(s)),
        (ArgKind::Rgba, ScriptValue::Array(items)) => {
            rgba_components(&items).map(NativeArg::Color).ok_or_else(|| mismatch("array"))
        }
        (_, other) => Err(mismatch(other.kind_name())),
    }
}

fn rgba_components(items: &[ScriptValue]) -> Option<Color> {
    match items {
        [ScriptValue::Number(r), ScriptValue::Number(g), ScriptValue::Number(b), ScriptValue::Number(a)] => {
            Some(Color::new(*r as f32, *g as f32, *b as f32, *a as f32))
        }
        _ => None,
    }
}

fn spread_rgba(
    binding: &'static str,
    spec: &ArgSpec,
    args: &[ScriptValue],
) -> Result<Color, BindingError> {
    let mut c = [0.0f32; 4];
    for (index, (slot, value)) in c.iter_mut().zip(args).enumerate() {
        match value {
            ScriptValue::Number(n) => *slot = *n as f32,
            other => {
                return Err(BindingError::TypeMismatch {
                    binding,
                    index,
                    param: spec.name,
                    expected: ArgKind::Number,
                    found: other.kind_name(),
                })
            }
        }
    }
    Ok(Color::from(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ScriptValue::{Nil, Number};

    fn color_spec() -> Vec<ArgSpec> {
        vec![ArgSpec::rgba("color")]
    }

    #[test]
    fn spread_rgba_is_accepted() {
        let out = validate("clear", &color_spec(), vec![Number(1.0), Number(0.0), Number(0.0), Number(1.0)]).unwrap();
        assert_eq!(out, vec![NativeArg::Color(Color::new(1.0, 0.0, 0.0, 1.0))]);
    }

    #[test]
    fn array_rgba_is_accepted() {
        let arr = ScriptValue::Array(vec![Number(0.0), Number(0.5), Number(1.0), Number(1.0)]);
        let out = validate("clear", &color_spec(), vec![arr]).unwrap();
        assert_eq!(out, vec![NativeArg::Color(Color::new(0.0, 0.5, 1.0, 1.0))]);
    }

    #[test]
    fn nil_rgba_is_a_type_mismatch() {
        let err = validate("clear", &color_spec(), vec![Nil]).unwrap_err();
        assert_eq!(
            err,
            BindingError::TypeMismatch {
                binding: "clear",
                index: 0,
                param: "color",
                expected: ArgKind::Rgba,
                found: "nil",
            }
        );
    }

    #[test]
    fn short_array_is_a_type_mismatch() {
        let arr = ScriptValue::Array(vec![Number(0.0), Number(0.5)]);
        let err = validate("clear", &color_spec(), vec![arr]).unwrap_err();
        assert_eq!(err.index(), Some(0));
    }

    #[test]
    fn bad_spread_component_reports_its_index() {
        let err = validate(
            "clear",
            &color_spec(),
            vec![Number(1.0), Number(0.0), ScriptValue::String("x".into()), Number(1.0)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BindingError::TypeMismatch { index: 2, found: "string", .. }
        ));
    }

    #[test]
    fn wrong_count_is_an_arity_mismatch() {
        let err = validate("clear", &color_spec(), vec![]).unwrap_err();
        assert!(matches!(
            err,
            BindingError::ArityMismatch { index: 0, min: 1, max: 1, found: 0, .. }
        ));
        assert_eq!(err.index(), Some(0));

        let err = validate("clear", &color_spec(), vec![Number(1.0), Number(1.0)]).unwrap_err();
        assert!(matches!(err, BindingError::ArityMismatch { index: 1, found: 2, .. }));
    }

    #[test]
    fn arity_index_points_at_first_missing_argument() {
        let specs = vec![
            ArgSpec::number("r"),
            ArgSpec::number("g"),
            ArgSpec::number("b"),
            ArgSpec::number("a").or(NativeArg::Number(1.0)),
        ];
        let err = validate("setBackgroundColor", &specs, vec![Number(1.0)]).unwrap_err();
        assert_eq!(err.index(), Some(1));
        assert_eq!(
            err.to_string(),
            "setBackgroundColor: argument 1: expected 3 to 4 argument(s), got 1"
        );

        let five = vec![Number(1.0); 5];
        assert_eq!(validate("setBackgroundColor", &specs, five).unwrap_err().index(), Some(4));
    }

    #[test]
    fn nil_takes_the_default() {
        let specs = vec![ArgSpec::number("x"), ArgSpec::number("a").or(NativeArg::Number(1.0))];
        let out = validate("f", &specs, vec![Number(3.0), Nil]).unwrap();
        assert_eq!(out, vec![NativeArg::Number(3.0), NativeArg::Number(1.0)]);
    }

    #[test]
    fn omitted_optional_tail_takes_the_default() {
        let specs = vec![ArgSpec::number("x"), ArgSpec::number("a").or(NativeArg::Number(1.0))];
        assert_eq!(arity(&specs), (1, 2));
        let out = validate("f", &specs, vec![Number(3.0)]).unwrap();
        assert_eq!(out, vec![NativeArg::Number(3.0), NativeArg::Number(1.0)]);
    }

    #[test]
    fn optional_in_the_middle_still_counts_toward_arity() {
        let specs = vec![
            ArgSpec::number("x").or(NativeArg::Number(0.0)),
            ArgSpec::number("y"),
        ];
        assert_eq!(arity(&specs), (2, 2));
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let specs = vec![ArgSpec::string("message")];
        let err = validate("print", &specs, vec![Number(1.0)]).unwrap_err();
        assert!(matches!(
            err,
            BindingError::TypeMismatch { index: 0, expected: ArgKind::String, found: "number", .. }
        ));
        assert_eq!(err.binding(), "print");
    }

    #[test]
    fn messages_name_binding_and_index() {
        let err = validate("print", &[ArgSpec::string("message")], vec![Nil]).unwrap_err();
        assert_eq!(err.to_string(), "print: argument 0 (`message`) expected string, got nil");

        let err = validate("getWidth", &[], vec![Nil]).unwrap_err();
        assert_eq!(err.to_string(), "getWidth: argument 0: expected 0 argument(s), got 1");
    }
}
