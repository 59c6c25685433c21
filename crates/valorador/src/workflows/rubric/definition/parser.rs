use super::normalizer::criterion_key;
use super::RubricLoadError;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::io::Read;

/// Entry exactly as written in the source; required fields are checked by the loader.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawEntry {
    #[serde(default)]
    pub(crate) section: Option<String>,
    #[serde(default)]
    pub(crate) item: Option<String>,
    #[serde(default)]
    pub(crate) criterion: Option<String>,
    #[serde(default)]
    pub(crate) scale: Option<RawScale>,
    #[serde(default)]
    pub(crate) minimum: Option<i64>,
}

/// Scale levels in document order. Accepts `{label: value}` or `[[label, value], ...]`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct RawScale(pub(crate) Vec<(String, i64)>);

impl<'de> Deserialize<'de> for RawScale {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ScaleVisitor;

        impl<'de> Visitor<'de> for ScaleVisitor {
            type Value = RawScale;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of label to integer or a list of [label, integer] pairs")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut levels = Vec::new();
                while let Some((label, value)) = map.next_entry::<String, i64>()? {
                    levels.push((label, value));
                }
                Ok(RawScale(levels))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut levels = Vec::new();
                while let Some((label, value)) = seq.next_element::<(String, i64)>()? {
                    levels.push((label, value));
                }
                Ok(RawScale(levels))
            }
        }

        deserializer.deserialize_any(ScaleVisitor)
    }
}

/// Top-level document: a bare list of entries or `{ items: [...] }`.
struct RawDocument(Vec<RawEntry>);

impl<'de> Deserialize<'de> for RawDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DocumentVisitor;

        impl<'de> Visitor<'de> for DocumentVisitor {
            type Value = RawDocument;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of rubric entries or an object with an `items` list")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some(entry) = seq.next_element::<RawEntry>()? {
                    entries.push(entry);
                }
                Ok(RawDocument(entries))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut items = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key != "items" {
                        return Err(de::Error::unknown_field(&key, &["items"]));
                    }
                    if items.is_some() {
                        return Err(de::Error::duplicate_field("items"));
                    }
                    items = Some(map.next_value::<Vec<RawEntry>>()?);
                }
                items
                    .map(RawDocument)
                    .ok_or_else(|| de::Error::missing_field("items"))
            }
        }

        deserializer.deserialize_any(DocumentVisitor)
    }
}

pub(crate) fn parse_json<R: Read>(reader: R) -> Result<Vec<RawEntry>, RubricLoadError> {
    let document: RawDocument = serde_json::from_reader(reader)?;
    Ok(document.0)
}

pub(crate) fn parse_yaml<R: Read>(reader: R) -> Result<Vec<RawEntry>, RubricLoadError> {
    let document: RawDocument = serde_yaml::from_reader(reader)?;
    Ok(document.0)
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    section: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    item: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    criterion: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    scale: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    minimum: Option<String>,
}

impl CsvRow {
    /// Best available name for error messages before the criterion key is settled.
    fn identity(&self, position: usize) -> String {
        self.criterion
            .as_deref()
            .or(self.item.as_deref())
            .map(criterion_key)
            .filter(|key| !key.is_empty())
            .unwrap_or_else(|| format!("row {position}"))
    }
}

/// CSV rubric with columns `section,item,criterion,scale,minimum`; scale is `Label=1;Label=2`.
pub(crate) fn parse_csv<R: Read>(reader: R) -> Result<Vec<RawEntry>, RubricLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut entries = Vec::new();

    for (index, record) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let row = record?;
        let position = index + 1;

        let scale = row
            .scale
            .as_deref()
            .map(parse_inline_scale)
            .transpose()
            .map_err(|reason| RubricLoadError::MalformedItem {
                criterion: row.identity(position),
                reason,
            })?;

        let minimum = row
            .minimum
            .as_deref()
            .map(|raw| {
                raw.parse::<i64>()
                    .map_err(|_| format!("minimum '{raw}' is not an integer"))
            })
            .transpose()
            .map_err(|reason| RubricLoadError::MalformedItem {
                criterion: row.identity(position),
                reason,
            })?;

        entries.push(RawEntry {
            section: row.section,
            item: row.item,
            criterion: row.criterion,
            scale,
            minimum,
        });
    }

    Ok(entries)
}

fn parse_inline_scale(raw: &str) -> Result<RawScale, String> {
    let mut levels = Vec::new();
    for part in raw.split(';').map(str::trim).filter(|part| !part.is_empty()) {
        let (label, value) = part
            .split_once('=')
            .ok_or_else(|| format!("scale level '{part}' must be written as Label=points"))?;
        let value = value
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("scale level '{part}' has a non-integer value"))?;
        levels.push((label.trim().to_string(), value));
    }
    Ok(RawScale(levels))
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
