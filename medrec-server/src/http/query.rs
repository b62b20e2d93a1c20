//! Query-string decoding for list, autocomplete and destroy requests
//!
//! Lists use bracketed keys: `filter[name]=x`, `filter[visitDateRange][]=a`
//! or `filter[visitDateRange][0]=a`. Pairs are folded into a JSON object and
//! then deserialized into the entity's filter type.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::error::ApiError;
use super::extractors::parse_uuid;
use crate::service::ListQuery;

/// Split `outer[inner]rest` into `(outer, inner, rest)`.
fn split_brackets(key: &str) -> Option<(&str, &str, &str)> {
    let open = key.find('[')?;
    let close = open + key[open..].find(']')?;
    Some((&key[..open], &key[open + 1..close], &key[close + 1..]))
}

/// Highest `[n]` index accepted; ranges only use `[0]` and `[1]`.
const MAX_SLOT: usize = 1;

/// Index of an array suffix: `[]` appends, `[n]` places at `n`.
enum Slot {
    Scalar,
    Append,
    At(usize),
}

fn slot(rest: &str) -> Result<Slot, ApiError> {
    match rest {
        "" => Ok(Slot::Scalar),
        "[]" => Ok(Slot::Append),
        _ => rest
            .strip_prefix('[')
            .and_then(|r| r.strip_suffix(']'))
            .and_then(|n| n.parse().ok())
            .filter(|i| *i <= MAX_SLOT)
            .map(Slot::At)
            .ok_or_else(|| bad_request(format!("unsupported query key suffix '{rest}'"))),
    }
}

fn bad_request(message: String) -> ApiError {
    ApiError::BadRequest { message }
}

fn place(map: &mut Map<String, Value>, key: &str, slot: Slot, value: &str) {
    let value = Value::String(value.to_owned());
    match slot {
        Slot::Scalar => {
            map.insert(key.to_owned(), value);
        }
        Slot::Append | Slot::At(_) => {
            let entry = map
                .entry(key.to_owned())
                .or_insert_with(|| Value::Array(Vec::new()));
            if !entry.is_array() {
                *entry = Value::Array(vec![entry.take()]);
            }
            if let Value::Array(items) = entry {
                match slot {
                    Slot::At(i) => {
                        if items.len() <= i {
                            items.resize(i + 1, Value::String(String::new()));
                        }
                        items[i] = value;
                    }
                    _ => items.push(value),
                }
            }
        }
    }
}

fn number(field: &str, value: &str) -> Result<Option<u32>, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| bad_request(format!("{field} must be a non-negative integer")))
}

/// Decode `filter[...]`, `limit`, `offset` and `orderBy`.
pub fn list_query<F: DeserializeOwned>(pairs: &[(String, String)]) -> Result<ListQuery<F>, ApiError> {
    let mut filter = Map::new();
    let mut limit = None;
    let mut offset = None;
    let mut order_by = None;

    for (key, value) in pairs {
        match key.as_str() {
            "limit" => limit = number("limit", value)?,
            "offset" => offset = number("offset", value)?,
            "orderBy" => order_by = Some(value.clone()).filter(|v| !v.trim().is_empty()),
            _ => {
                if let Some(("filter", field, rest)) = split_brackets(key) {
                    place(&mut filter, field, slot(rest)?, value);
                }
            }
        }
    }

    let filter = serde_json::from_value(Value::Object(filter))
        .map_err(|e| bad_request(format!("invalid filter: {e}")))?;

    Ok(ListQuery {
        filter,
        limit,
        offset,
        order_by,
    })
}

/// Ids of a destroy request given as `ids=..`, `ids[]=..` or `ids[n]=..`.
pub fn ids_from_query(pairs: &[(String, String)]) -> Result<Vec<Uuid>, ApiError> {
    pairs
        .iter()
        .filter(|(key, _)| key == "ids" || key.starts_with("ids["))
        .map(|(_, value)| parse_uuid("ids", value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MedicineInventoryFilter, PatientFilter};

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn scalar_and_range_filters() {
        let q: ListQuery<PatientFilter> = list_query(&pairs(&[
            ("filter[fullName]", "doe"),
            ("filter[ageRange][]", "18"),
            ("filter[ageRange][]", "65"),
            ("filter[createdAtRange][1]", "2024-12-31"),
            ("limit", "20"),
            ("offset", "40"),
            ("orderBy", "fullName_ASC"),
        ]))
        .unwrap();

        assert_eq!(q.filter.full_name.as_deref(), Some("doe"));
        assert_eq!(q.filter.age_range, Some(vec!["18".into(), "65".into()]));
        assert_eq!(
            q.filter.common.created_at_range,
            Some(vec![String::new(), "2024-12-31".into()])
        );
        assert_eq!((q.limit, q.offset), (Some(20), Some(40)));
        assert_eq!(q.order_by.as_deref(), Some("fullName_ASC"));
    }

    #[test]
    fn empty_query_uses_defaults() {
        let q: ListQuery<MedicineInventoryFilter> = list_query(&[]).unwrap();
        assert!(q.filter.medicine.is_none());
        assert_eq!((q.limit, q.offset, q.order_by), (None, None, None));
    }

    #[test]
    fn rejects_bad_limit() {
        let err = list_query::<PatientFilter>(&pairs(&[("limit", "-1")])).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest { .. }));
    }

    #[test]
    fn rejects_out_of_range_index() {
        for key in [
            "filter[ageRange][2]",
            "filter[ageRange][20000000]",
            "filter[ageRange][18446744073709551615]",
            "filter[ageRange][x]",
        ] {
            let err = list_query::<PatientFilter>(&pairs(&[(key, "1")])).unwrap_err();
            assert!(matches!(err, ApiError::BadRequest { .. }), "{key}");
        }
    }

    #[test]
    fn ids_in_any_style() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (a_str, b_str) = (a.to_string(), b.to_string());
        let ids = ids_from_query(&pairs(&[
            ("ids[]", a_str.as_str()),
            ("ids", b_str.as_str()),
            ("other", "x"),
        ]))
        .unwrap();
        assert_eq!(ids, vec![a, b]);
    }
}
