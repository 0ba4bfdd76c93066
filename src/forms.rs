use serde::{Deserialize, Serialize};

use crate::prelude::*;

pub const NAME_MAX_LEN: usize = 255;

/// Raw build form as submitted by the browser.
#[derive(Debug, Default, Deserialize)]
pub struct BuildForm {
  #[serde(default)]
  pub name: Option<String>,
}

/// Attributes of a build that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBuild {
  pub name: String,
}

#[derive(Debug, Serialize)]
pub struct Field {
  pub name: &'static str,
  pub required: bool,
  pub max_length: usize,
}

pub const BUILD_FIELDS: &[Field] =
  &[Field { name: "name", required: true, max_length: NAME_MAX_LEN }];

fn valid_name(value: Option<&str>) -> Result<String, FieldError> {
  let name = value.map(str::trim).unwrap_or_default();

  if name.is_empty() {
    Err(FieldError::new("name", "This field is required."))
  } else if name.chars().count() > NAME_MAX_LEN {
    Err(FieldError::new(
      "name",
      format!("Field cannot be longer than {NAME_MAX_LEN} characters."),
    ))
  } else {
    Ok(name.to_string())
  }
}

impl BuildForm {
  pub fn validate(&self) -> Result<NewBuild> {
    let name = valid_name(self.name.as_deref())
      .map_err(|err| Error::Validation(vec![err]))?;
    Ok(NewBuild { name })
  }
}

/// Release candidate announced by the process producing releases.
#[derive(Debug, Deserialize)]
pub struct ReleaseForm {
  pub build_id: i32,
  #[serde(default)]
  pub name: Option<String>,
}

impl ReleaseForm {
  /// The trimmed release name.
  pub fn validate(&self) -> Result<String> {
    valid_name(self.name.as_deref())
      .map_err(|err| Error::Validation(vec![err]))
  }
}
