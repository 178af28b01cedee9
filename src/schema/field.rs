use serde_json::{Number, Value};

use super::error::FieldError;

/// Hook run on a present value before type coercion.
pub type Preprocess = fn(Value) -> Value;

// Integral floats in [-2^63, 2^63) convert to i64 exactly
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    Any,
}

impl FieldType {
    /// Coerce a JSON value into this type.
    ///
    /// Coercion is lenient with text because query-string parameters always
    /// arrive as strings: `"10"` is a valid `Integer`, `"true"` a valid `Boolean`.
    pub fn coerce(&self, value: Value) -> Result<Value, (&'static str, &'static str)> {
        match self {
            FieldType::Any => Ok(value),
            FieldType::String => match value {
                Value::String(_) => Ok(value),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                Value::Bool(b) => Ok(Value::String(b.to_string())),
                _ => Err(("str type expected", "type_error.str")),
            },
            FieldType::Integer => {
                let err = ("value is not a valid integer", "type_error.integer");
                match value {
                    Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::Number(n)),
                    Value::Number(n) => match n.as_f64() {
                        Some(f) if f.fract() == 0.0 && (I64_LOWER..I64_UPPER).contains(&f) => Ok(Value::from(f as i64)),
                        _ => Err(err),
                    },
                    Value::String(s) => s.trim().parse::<i64>().map(Value::from).map_err(|_| err),
                    _ => Err(err),
                }
            }
            FieldType::Number => {
                let err = ("value is not a valid float", "type_error.float");
                match value {
                    Value::Number(n) => Ok(Value::Number(n)),
                    Value::String(s) => {
                        let trimmed = s.trim();
                        if let Ok(i) = trimmed.parse::<i64>() {
                            return Ok(Value::from(i));
                        }
                        trimmed
                            .parse::<f64>()
                            .ok()
                            .and_then(Number::from_f64)
                            .map(Value::Number)
                            .ok_or(err)
                    }
                    _ => Err(err),
                }
            }
            FieldType::Boolean => {
                let err = ("value could not be parsed to a boolean", "type_error.bool");
                match value {
                    Value::Bool(b) => Ok(Value::Bool(b)),
                    Value::Number(n) => match n.as_i64() {
                        Some(0) => Ok(Value::Bool(false)),
                        Some(1) => Ok(Value::Bool(true)),
                        _ => Err(err),
                    },
                    Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                        "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
                        "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
                        _ => Err(err),
                    },
                    _ => Err(err),
                }
            }
            FieldType::Array => match value {
                Value::Array(_) => Ok(value),
                _ => Err(("value is not a valid list", "type_error.list")),
            },
            FieldType::Object => match value {
                Value::Object(_) => Ok(value),
                _ => Err(("value is not a valid dict", "type_error.dict")),
            },
        }
    }
}

/// One declared field of a [`Schema`](super::Schema).
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) ty: FieldType,
    pub(crate) items: Option<FieldType>,
    pub(crate) required: bool,
    pub(crate) default: Option<Value>,
    pub(crate) ge: Option<f64>,
    pub(crate) pre: Option<Preprocess>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            items: None,
            required: false,
            default: None,
            ge: None,
            pre: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Element type for `Array` fields.
    pub fn items(mut self, ty: FieldType) -> Self {
        self.items = Some(ty);
        self
    }

    /// Lower bound (inclusive) for `Integer` and `Number` fields.
    pub fn ge(mut self, bound: f64) -> Self {
        self.ge = Some(bound);
        self
    }

    pub fn pre(mut self, hook: Preprocess) -> Self {
        self.pre = Some(hook);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> FieldType {
        self.ty
    }

    pub fn item_type(&self) -> Option<FieldType> {
        self.items
    }

    /// Validate the value found under this field's name, if any.
    ///
    /// `None` means the field is absent from the output record.
    pub(crate) fn validate(&self, value: Option<&Value>, errors: &mut Vec<FieldError>) -> Option<Value> {
        let value = match value {
            Some(v) => match self.pre {
                Some(hook) => hook(v.clone()),
                None => v.clone(),
            },
            None => {
                if self.required {
                    errors.push(FieldError::new(&self.name, "field required", "value_error.missing"));
                }
                return self.default.clone();
            }
        };

        if value.is_null() {
            if self.required {
                errors.push(FieldError::new(
                    &self.name,
                    "none is not an allowed value",
                    "type_error.none.not_allowed",
                ));
                return None;
            }
            return Some(Value::Null);
        }

        let coerced = match self.ty.coerce(value) {
            Ok(v) => v,
            Err((msg, kind)) => {
                errors.push(FieldError::new(&self.name, msg, kind));
                return None;
            }
        };

        if let (Some(bound), Some(n)) = (self.ge, coerced.as_f64()) {
            if n < bound {
                errors.push(FieldError::new(
                    &self.name,
                    format!("ensure this value is greater than or equal to {}", bound),
                    "value_error.number.not_ge",
                ));
                return None;
            }
        }

        match (self.items, coerced) {
            (Some(item_ty), Value::Array(items)) => {
                let before = errors.len();
                let items: Vec<Value> = items
                    .into_iter()
                    .enumerate()
                    .filter_map(|(i, item)| match item_ty.coerce(item) {
                        Ok(v) => Some(v),
                        Err((msg, kind)) => {
                            errors.push(FieldError::new(format!("{}.{}", self.name, i), msg, kind));
                            None
                        }
                    })
                    .collect();
                (errors.len() == before).then_some(Value::Array(items))
            }
            (_, coerced) => Some(coerced),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integer_accepts_decimal_strings() {
        assert_eq!(FieldType::Integer.coerce(json!("42")), Ok(json!(42)));
        assert_eq!(FieldType::Integer.coerce(json!(7.0)), Ok(json!(7)));
        assert!(FieldType::Integer.coerce(json!("4.5")).is_err());
        assert!(FieldType::Integer.coerce(json!(true)).is_err());
    }

    #[test]
    fn number_keeps_integers_integral() {
        assert_eq!(FieldType::Number.coerce(json!("30")), Ok(json!(30)));
        assert_eq!(FieldType::Number.coerce(json!("2.5")), Ok(json!(2.5)));
        assert!(FieldType::Number.coerce(json!("abc")).is_err());
    }

    #[test]
    fn boolean_parses_common_spellings() {
        assert_eq!(FieldType::Boolean.coerce(json!("yes")), Ok(json!(true)));
        assert_eq!(FieldType::Boolean.coerce(json!("False")), Ok(json!(false)));
        assert_eq!(FieldType::Boolean.coerce(json!(1)), Ok(json!(true)));
        assert!(FieldType::Boolean.coerce(json!("maybe")).is_err());
    }

    #[test]
    fn string_stringifies_scalars() {
        assert_eq!(FieldType::String.coerce(json!(12)), Ok(json!("12")));
        assert_eq!(FieldType::String.coerce(json!(false)), Ok(json!("false")));
        assert!(FieldType::String.coerce(json!({"a": 1})).is_err());
        assert!(FieldType::String.coerce(json!([1])).is_err());
    }

    #[test]
    fn integer_rejects_floats_outside_i64() {
        assert_eq!(FieldType::Integer.coerce(json!(3.0)), Ok(json!(3)));
        assert_eq!(
            FieldType::Integer.coerce(json!(1e300)),
            Err(("value is not a valid integer", "type_error.integer"))
        );
        assert!(FieldType::Integer.coerce(json!(-1e19)).is_err());
    }

    #[test]
    fn missing_field_uses_default_without_error() {
        let field = Field::new("limit", FieldType::Integer).default_value(100);
        let mut errors = vec![];
        assert_eq!(field.validate(None, &mut errors), Some(json!(100)));
        assert!(errors.is_empty());
    }

    #[test]
    fn lower_bound_is_inclusive() {
        let field = Field::new("offset", FieldType::Integer).ge(0.0);
        let mut errors = vec![];
        assert_eq!(field.validate(Some(&json!("0")), &mut errors), Some(json!(0)));
        assert_eq!(field.validate(Some(&json!(-1)), &mut errors), None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, "value_error.number.not_ge");
    }

    #[test]
    fn array_items_report_their_index() {
        let field = Field::new("tags", FieldType::Array).items(FieldType::String);
        let mut errors = vec![];
        assert_eq!(field.validate(Some(&json!(["a", {"b": 1}])), &mut errors), None);
        assert_eq!(errors[0].loc, "tags.1");
    }
}
