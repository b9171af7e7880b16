//! Decoding of the registry's JSON page envelope.
//!
//! ```json
//! {"response": {
//!     "header": {"resultCode": "00", "resultMsg": "NORMAL SERVICE."},
//!     "body": {"items": {"item": [ ... ]}, "numOfRows": 30, "pageNo": 1, "totalCount": 1234}
//! }}
//! ```
//!
//! `item` is an array for multi-record pages but a bare object when exactly one record matches,
//! and `items` degrades to `""` when nothing matches. Any other string is rejected.

use serde::{Deserialize, Deserializer};
use shelterlist::{AnimalRecord, FetchError, Sex};

const RESULT_OK: &str = "00";

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Response,
}

#[derive(Debug, Deserialize)]
struct Response {
    header: Header,
    #[serde(default)]
    body: Option<Body>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Header {
    #[serde(deserialize_with = "string_or_number")]
    result_code: String,
    #[serde(default)]
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct Body {
    #[serde(default)]
    items: Option<Items>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Items {
    Wrapped {
        #[serde(default)]
        item: Option<OneOrMany<RawRecord>>,
    },
    Blank(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(v) => v,
            Self::One(t) => vec![t],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    #[serde(deserialize_with = "string_or_number")]
    desertion_no: String,
    #[serde(default)]
    up_kind_cd: Option<String>,
    #[serde(default)]
    kind_cd: Option<String>,
    #[serde(default)]
    age: Option<String>,
    #[serde(default)]
    sex_cd: Option<String>,
    #[serde(default)]
    happen_dt: Option<String>,
    #[serde(default)]
    happen_place: Option<String>,
    #[serde(default)]
    popfile1: Option<String>,
    #[serde(default)]
    popfile2: Option<String>,
    #[serde(default)]
    popfile3: Option<String>,
    #[serde(default)]
    popfile4: Option<String>,
    #[serde(default)]
    popfile5: Option<String>,
    #[serde(default)]
    popfile6: Option<String>,
    #[serde(default)]
    popfile7: Option<String>,
    #[serde(default)]
    popfile8: Option<String>,
    #[serde(default)]
    care_nm: Option<String>,
    #[serde(default)]
    care_reg_no: Option<String>,
    #[serde(default)]
    process_state: Option<String>,
}

impl From<RawRecord> for AnimalRecord {
    fn from(raw: RawRecord) -> Self {
        let images = [
            raw.popfile1,
            raw.popfile2,
            raw.popfile3,
            raw.popfile4,
            raw.popfile5,
            raw.popfile6,
            raw.popfile7,
            raw.popfile8,
        ]
        .into_iter()
        .flatten()
        .filter(|url| !url.trim().is_empty())
        .take(AnimalRecord::MAX_IMAGES)
        .collect();

        AnimalRecord {
            desertion_no: raw.desertion_no,
            species_code: raw.up_kind_cd,
            breed: raw.kind_cd,
            age: raw.age,
            sex: raw.sex_cd.as_deref().and_then(Sex::from_code),
            rescue_date: raw.happen_dt,
            rescue_place: raw.happen_place,
            images,
            shelter_name: raw.care_nm,
            shelter_reg_no: raw.care_reg_no,
            process_state: raw.process_state,
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Str(String),
        Num(u64),
    }
    Ok(match Repr::deserialize(deserializer)? {
        Repr::Str(s) => s,
        Repr::Num(n) => n.to_string(),
    })
}

/// Decodes one page of records.
///
/// A non-`00` result code is reported as a transport failure (the service refused the call);
/// anything that does not match the envelope is [`FetchError::Malformed`].
pub fn decode_page(bytes: &[u8]) -> Result<Vec<AnimalRecord>, FetchError> {
    let envelope: Envelope =
        serde_json::from_slice(bytes).map_err(|e| FetchError::malformed(e.to_string()))?;
    let Response { header, body } = envelope.response;

    if header.result_code != RESULT_OK {
        return Err(FetchError::transport(format!(
            "service error {}: {}",
            header.result_code, header.result_msg
        )));
    }

    let Some(body) = body else {
        return Err(FetchError::malformed("response has no body"));
    };

    let raw = match body.items {
        None | Some(Items::Wrapped { item: None }) => Vec::new(),
        Some(Items::Blank(text)) if text.trim().is_empty() => Vec::new(),
        Some(Items::Blank(text)) => {
            return Err(FetchError::malformed(format!("unexpected items: {text:?}")));
        }
        Some(Items::Wrapped { item: Some(item) }) => item.into_vec(),
    };
    Ok(raw.into_iter().map(AnimalRecord::from).collect())
}
