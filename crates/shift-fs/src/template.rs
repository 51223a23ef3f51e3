//! Text templates over serializable data
//!
//! A template is plain text with `{{ ... }}` actions. Supported actions:
//!
//! | Action          | Meaning                                  |
//! |-----------------|------------------------------------------|
//! | `{{ . }}`       | The whole data value                     |
//! | `{{ .Name }}`   | Field `Name` of the data value           |
//! | `{{ .A.B }}`    | Nested field lookup                      |
//!
//! Lookups are strict: referencing a key the data does not provide fails
//! the render instead of producing an empty string.

use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// Render `template` with `data` bound as the root value.
pub fn render<T: Serialize + ?Sized>(template: &str, data: &T) -> Result<String> {
    let value = serde_json::to_value(data)?;
    render_value(template, &value)
}

/// Render `template` against an already-converted JSON value.
pub fn render_value(template: &str, data: &Value) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut remaining = template;
    let mut offset = 0;

    while let Some(start) = remaining.find("{{") {
        result.push_str(&remaining[..start]);

        let Some(end) = remaining[start..].find("}}") else {
            return Err(Error::UnterminatedAction {
                offset: offset + start,
            });
        };
        let action = remaining[start + 2..start + end].trim();
        push_value(&mut result, lookup(data, action)?);

        let end_abs = start + end + 2;
        offset += end_abs;
        remaining = &remaining[end_abs..];
    }

    result.push_str(remaining);
    Ok(result)
}

fn lookup<'a>(data: &'a Value, action: &str) -> Result<&'a Value> {
    if action == "." {
        return Ok(data);
    }
    let Some(path) = action.strip_prefix('.') else {
        return Err(Error::InvalidAction {
            action: action.to_string(),
        });
    };

    let mut current = data;
    for key in path.split('.') {
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(Error::InvalidAction {
                action: action.to_string(),
            });
        }
        current = current
            .as_object()
            .and_then(|map| map.get(key))
            .ok_or_else(|| Error::MissingTemplateKey {
                key: path.to_string(),
            })?;
    }
    Ok(current)
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        Value::Bool(b) => out.push_str(&b.to_string()),
        Value::Number(n) => out.push_str(&n.to_string()),
        other => out.push_str(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Named {
        #[serde(rename = "Name")]
        name: String,
    }

    #[derive(Serialize)]
    struct Empty {}

    #[test]
    fn renders_field() {
        let data = Named { name: "x".into() };
        assert_eq!(render("Hello {{.Name}}", &data).unwrap(), "Hello x");
    }

    #[test]
    fn missing_field_is_an_error() {
        let err = render("Hello {{.Name}}", &Empty {}).unwrap_err();
        assert!(matches!(err, Error::MissingTemplateKey { ref key } if key == "Name"));
    }

    #[test]
    fn unit_data_has_no_fields() {
        assert!(render("{{ .Name }}", &()).is_err());
    }

    #[test]
    fn nested_lookup_and_spacing() {
        let data = json!({"Service": {"Port": 8080, "Public": true}});
        let out = render_value("port={{ .Service.Port }} public={{.Service.Public}}", &data).unwrap();
        assert_eq!(out, "port=8080 public=true");
    }

    #[test]
    fn dot_renders_whole_value() {
        assert_eq!(render("[{{ . }}]", "abc").unwrap(), "[abc]");
    }

    #[test]
    fn text_without_actions_is_unchanged() {
        let text = "FROM alpine\nRUN echo hi\n";
        assert_eq!(render(text, &()).unwrap(), text);
    }

    #[test]
    fn unterminated_action_reports_offset() {
        let err = render_value("ab{{ .X", &json!({"X": 1})).unwrap_err();
        assert!(matches!(err, Error::UnterminatedAction { offset: 2 }));
    }

    #[test]
    fn action_without_leading_dot_is_invalid() {
        let err = render_value("{{ Name }}", &json!({"Name": 1})).unwrap_err();
        assert!(matches!(err, Error::InvalidAction { .. }));
    }

    #[test]
    fn replacement_is_not_rescanned() {
        let data = json!({"A": "{{ .B }}"});
        assert_eq!(render_value("{{.A}}", &data).unwrap(), "{{ .B }}");
    }
}
