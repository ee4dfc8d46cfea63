use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{Entity, EntityKind};
use crate::schema::{FieldRule, JsonKind, Schema};

/// A named, timestamped log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Log {
  pub uuid: String,
  pub date: DateTime<Utc>,
  pub name: String,
}

/// Write payload for [`Log`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogDto {
  pub name: String,
}

impl Log {
  pub fn schema() -> Schema {
    Schema::new().field("name", FieldRule::kind(&[JsonKind::String]))
  }
}

impl Entity for Log {
  type Dto = LogDto;

  const KIND: EntityKind = EntityKind::Log;

  fn create(dto: LogDto) -> Self {
    Self::from_object(Uuid::new_v4().to_string(), dto)
  }

  fn from_object(uuid: String, dto: LogDto) -> Self {
    Self {
      uuid,
      date: Utc::now(),
      name: dto.name,
    }
  }

  fn uuid(&self) -> Option<&str> {
    Some(self.uuid.as_str())
  }
}

impl fmt::Display for Log {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} - {} - {}", self.uuid, self.date.to_rfc3339(), self.name)
  }
}
