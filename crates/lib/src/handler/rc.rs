//! Version-info resource scripts.
//!
//! A resource script is rendered from a template carrying three
//! placeholders: `#fileVersion#` and `#productVersion#` (comma form) and
//! `#fileInfoBlock#` (one `VALUE` line per non-empty field).

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::RC_TEMPLATE_FILENAME;
use crate::handler::Metadata;

/// Template used when the resource directory carries none.
pub const BUILTIN_TEMPLATE: &str = include_str!("../../res/version_info.rc");

const FILE_VERSION_PLACEHOLDER: &str = "#fileVersion#";
const PRODUCT_VERSION_PLACEHOLDER: &str = "#productVersion#";
const FILE_INFO_PLACEHOLDER: &str = "#fileInfoBlock#";
const EMPTY_VERSION: &str = "0,0,0,0";

/// `StringFileInfo` fields of a version resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct RcData {
  pub file_description: Option<String>,
  pub file_version: Option<String>,
  pub internal_name: Option<String>,
  pub legal_copyright: Option<String>,
  pub original_filename: Option<String>,
  pub product_name: Option<String>,
  pub product_version: Option<String>,
  /// Any other `StringFileInfo` key, e.g. `CompanyName` or `Comments`.
  #[serde(flatten)]
  pub extra: BTreeMap<String, String>,
}

impl RcData {
  pub fn from_metadata(metadata: &Metadata) -> Self {
    let exe_name = metadata.name.as_ref().map(|name| format!("{}.exe", name));

    Self {
      file_description: metadata.description.clone(),
      file_version: metadata.version.clone(),
      internal_name: exe_name.clone(),
      legal_copyright: metadata.legal.clone(),
      original_filename: exe_name,
      product_name: metadata.name.clone(),
      product_version: metadata.version.clone(),
      extra: BTreeMap::new(),
    }
  }

  /// Non-empty fields: the named ones in resource order, then the extra
  /// keys.
  pub fn entries(&self) -> Vec<(&str, &str)> {
    [
      ("FileDescription", &self.file_description),
      ("FileVersion", &self.file_version),
      ("InternalName", &self.internal_name),
      ("LegalCopyright", &self.legal_copyright),
      ("OriginalFilename", &self.original_filename),
      ("ProductName", &self.product_name),
      ("ProductVersion", &self.product_version),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
    .chain(self.extra.iter().map(|(key, value)| (key.as_str(), value.as_str())))
    .filter(|(_, value)| !value.is_empty())
    .collect()
  }
}

/// Convert a dotted version to the comma form resource scripts use.
///
/// `1.2.3.4` -> `1,2,3,4`; anything else loses its `-suffix` and gets a
/// trailing zero group: `1.1.11` -> `1,1,11,0`, `1.2.3-beta` -> `1,2,3,0`.
pub fn to_comma_version(version: &str) -> String {
  let groups: Vec<&str> = version.split('.').collect();
  let strict = groups.len() == 4
    && groups
      .iter()
      .all(|g| !g.is_empty() && g.chars().all(|c| c.is_ascii_digit()));

  if strict {
    return groups.join(",");
  }

  let base = version.split('-').next().unwrap_or_default();
  format!("{},0", base.split('.').collect::<Vec<_>>().join(","))
}

/// Substitute every placeholder in `template`.
pub fn render(template: &str, data: &RcData) -> String {
  let version = |v: &Option<String>| {
    v.as_deref()
      .filter(|v| !v.is_empty())
      .map(to_comma_version)
      .unwrap_or_else(|| EMPTY_VERSION.to_string())
  };

  let block: String = data
    .entries()
    .into_iter()
    .map(|(key, value)| format!("\t\tVALUE \"{}\", \"{}\"\n", key, value))
    .collect();

  template
    .replace(FILE_VERSION_PLACEHOLDER, &version(&data.file_version))
    .replace(PRODUCT_VERSION_PLACEHOLDER, &version(&data.product_version))
    .replace(FILE_INFO_PLACEHOLDER, &block)
}

/// Template from `res_dir`, or the built-in one.
pub async fn load_template(res_dir: &Path) -> io::Result<String> {
  let path = res_dir.join(RC_TEMPLATE_FILENAME);

  match tokio::fs::read_to_string(&path).await {
    Ok(template) => {
      debug!(path = %path.display(), "using resource template");
      Ok(template)
    }
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BUILTIN_TEMPLATE.to_string()),
    Err(e) => Err(e),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn comma_version_pads_short_versions() {
    assert_eq!(to_comma_version("1.1.11"), "1,1,11,0");
    assert_eq!(to_comma_version("1.2.3-beta"), "1,2,3,0");
  }

  #[test]
  fn comma_version_keeps_four_groups() {
    assert_eq!(to_comma_version("1.2.3.4"), "1,2,3,4");
    assert_eq!(to_comma_version("10.0.19041.1"), "10,0,19041,1");
  }

  #[test]
  fn metadata_maps_to_fields() {
    let data = RcData::from_metadata(&Metadata {
      name: Some("app".to_string()),
      version: Some("1.0.0".to_string()),
      description: Some("An app".to_string()),
      legal: Some("(c) acme".to_string()),
      icon: None,
    });

    assert_eq!(data.internal_name.as_deref(), Some("app.exe"));
    assert_eq!(data.original_filename.as_deref(), Some("app.exe"));
    assert_eq!(data.product_name.as_deref(), Some("app"));
    assert_eq!(data.product_version.as_deref(), Some("1.0.0"));
    assert_eq!(data.entries().len(), 7);
  }

  #[test]
  fn render_substitutes_placeholders() {
    let data = RcData {
      file_version: Some("1.1.11".to_string()),
      product_name: Some("app".to_string()),
      ..Default::default()
    };

    let rendered = render(
      "FILEVERSION #fileVersion#\nPRODUCTVERSION #productVersion#\n#fileInfoBlock#",
      &data,
    );

    assert_eq!(
      rendered,
      "FILEVERSION 1,1,11,0\nPRODUCTVERSION 0,0,0,0\n\t\tVALUE \"FileVersion\", \"1.1.11\"\n\t\tVALUE \"ProductName\", \"app\"\n"
    );
  }

  #[test]
  fn explicit_data_keeps_unknown_keys() {
    let data: RcData =
      serde_json::from_str(r#"{"CompanyName": "acme", "ProductName": "app", "Comments": ""}"#).unwrap();

    assert_eq!(data.product_name.as_deref(), Some("app"));
    assert_eq!(data.extra["CompanyName"], "acme");

    let rendered = render("#fileInfoBlock#", &data);

    assert_eq!(
      rendered,
      "\t\tVALUE \"ProductName\", \"app\"\n\t\tVALUE \"CompanyName\", \"acme\"\n"
    );
  }

  #[test]
  fn builtin_template_has_placeholders() {
    assert!(BUILTIN_TEMPLATE.contains(FILE_VERSION_PLACEHOLDER));
    assert!(BUILTIN_TEMPLATE.contains(PRODUCT_VERSION_PLACEHOLDER));
    assert!(BUILTIN_TEMPLATE.contains(FILE_INFO_PLACEHOLDER));
  }

  #[tokio::test]
  async fn template_prefers_resource_dir() {
    let temp = TempDir::new().unwrap();
    assert_eq!(load_template(temp.path()).await.unwrap(), BUILTIN_TEMPLATE);

    std::fs::write(temp.path().join(RC_TEMPLATE_FILENAME), "custom #fileVersion#").unwrap();
    assert_eq!(load_template(temp.path()).await.unwrap(), "custom #fileVersion#");
  }
}
