use crate::config::ResponsePart;
use crate::fields::FieldRegistry;
use indexmap::IndexMap;

/// Runs every custom field definition over a response
///
/// `headers` holds one `Name: value` line per header. Fields without any
/// match are left out of the returned mapping; fields and values keep
/// definition and match order.
pub fn extract_custom_fields(
    registry: &FieldRegistry,
    headers: &str,
    body: &str,
) -> IndexMap<String, Vec<String>> {
    let mut fields = IndexMap::new();
    let mut full_response: Option<String> = None;

    for definition in registry.custom_fields() {
        let text = match definition.part {
            ResponsePart::Header => headers,
            ResponsePart::Body => body,
            ResponsePart::Response => full_response
                .get_or_insert_with(|| format!("{}\n\n{}", headers, body))
                .as_str(),
        };

        let values = definition.extract(text);
        if !values.is_empty() {
            fields.insert(definition.name.clone(), values);
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CustomFieldConfig;

    fn registry() -> FieldRegistry {
        FieldRegistry::new(&[
            CustomFieldConfig {
                name: "server".to_string(),
                part: ResponsePart::Header,
                patterns: vec![r"(?m)^server: (.+)$".to_string()],
                group: 1,
            },
            CustomFieldConfig {
                name: "email".to_string(),
                part: ResponsePart::Body,
                patterns: vec![r"[a-z0-9.]+@[a-z0-9.]+\.[a-z]+".to_string()],
                group: 0,
            },
            CustomFieldConfig {
                name: "anywhere".to_string(),
                part: ResponsePart::Response,
                patterns: vec!["nginx|admin".to_string()],
                group: 0,
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_extracts_each_part() {
        let headers = "content-type: text/html\nserver: nginx";
        let body = "<p>mail admin@example.com or ops@example.org</p>";

        let fields = extract_custom_fields(&registry(), headers, body);

        assert_eq!(fields["server"], vec!["nginx".to_string()]);
        assert_eq!(
            fields["email"],
            vec!["admin@example.com".to_string(), "ops@example.org".to_string()]
        );
        assert_eq!(
            fields["anywhere"],
            vec!["nginx".to_string(), "admin".to_string()]
        );
    }

    #[test]
    fn test_header_only_field_ignores_body() {
        let fields = extract_custom_fields(&registry(), "", "server: apache");
        assert!(!fields.contains_key("server"));
    }

    #[test]
    fn test_unmatched_fields_omitted() {
        let fields = extract_custom_fields(&registry(), "", "nothing here");
        assert!(fields.is_empty());
    }
}
